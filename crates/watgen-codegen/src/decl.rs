//! Function declarations: signature, locals and visibility.

use watgen_types::ValueType;

/// An ordered name → type list.
///
/// Insertion order is kept.  Inserting a name that is already present
/// replaces its type in place, so names stay unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ValueType)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: ValueType) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = ty,
            None => self.entries.push((name, ty)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<ValueType> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.entries.iter().map(|(n, ty)| (n.as_str(), *ty))
    }

    /// Header tokens such as `(param $a i32)` for keyword `param`.
    pub(crate) fn tokens(&self, keyword: &str) -> impl Iterator<Item = String> + '_ {
        let keyword = keyword.to_string();
        self.entries
            .iter()
            .map(move |(name, ty)| format!("({keyword} ${name} {ty})"))
    }
}

impl<S: Into<String>> FromIterator<(S, ValueType)> for Params {
    fn from_iter<I: IntoIterator<Item = (S, ValueType)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, ty) in iter {
            params.insert(name, ty);
        }
        params
    }
}

/// Everything about a function except its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Params,
    pub locals: Params,
    pub result: Option<ValueType>,
    /// Whether an export node is emitted for the function.  Defaults to
    /// `true`.
    pub exported: bool,
}

impl FuncDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
            locals: Params::new(),
            result: None,
            exported: true,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.params.insert(name, ty);
        self
    }

    pub fn local(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.locals.insert(name, ty);
        self
    }

    pub fn params<S: Into<String>>(mut self, params: impl IntoIterator<Item = (S, ValueType)>) -> Self {
        for (name, ty) in params {
            self.params.insert(name, ty);
        }
        self
    }

    pub fn locals<S: Into<String>>(mut self, locals: impl IntoIterator<Item = (S, ValueType)>) -> Self {
        for (name, ty) in locals {
            self.locals.insert(name, ty);
        }
        self
    }

    pub fn result(mut self, ty: ValueType) -> Self {
        self.result = Some(ty);
        self
    }

    /// Keep the function out of the export table.
    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }
}
