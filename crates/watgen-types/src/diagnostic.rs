use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before the rest are only counted.
pub const MAX_DIAGNOSTICS: usize = 20;

/// The symbol namespaces of a module.
///
/// Names in different namespaces never collide: a local `$x` and a global
/// `$x` are distinct symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Func,
    Global,
    Local,
    Table,
    Label,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func => write!(f, "function"),
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
            Self::Table => write!(f, "table"),
            Self::Label => write!(f, "label"),
        }
    }
}

/// What went wrong with a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UndeclaredSymbol,
    DuplicateDeclaration,
    ArityMismatch,
}

impl DiagnosticKind {
    /// Stable numeric code (W100–W102).
    pub fn code(self) -> DiagnosticCode {
        match self {
            Self::UndeclaredSymbol => DiagnosticCode::UNDECLARED_SYMBOL,
            Self::DuplicateDeclaration => DiagnosticCode::DUPLICATE_DECLARATION,
            Self::ArityMismatch => DiagnosticCode::ARITY_MISMATCH,
        }
    }
}

/// Numeric diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagnosticCode(pub u16);

impl DiagnosticCode {
    pub const UNDECLARED_SYMBOL: Self = Self(100);
    pub const DUPLICATE_DECLARATION: Self = Self(101);
    pub const ARITY_MISMATCH: Self = Self(102);
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// A structured symbol diagnostic.
///
/// Consumers should match on `kind`/`code`, not on `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: DiagnosticCode,
    pub namespace: Namespace,
    /// The symbol name without the `$` sigil.
    pub name: String,
    /// Enclosing function, if the problem is inside one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        namespace: Namespace,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: kind.code(),
            namespace,
            name: name.into(),
            function: None,
            message: message.into(),
        }
    }

    /// Attach the enclosing function name.
    pub fn in_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(func) => write!(f, "{} in ${}: {}", self.code, func, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// The collected result of a symbol check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub total_errors: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add a diagnostic, respecting the [`MAX_DIAGNOSTICS`] limit.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.errors.len() < MAX_DIAGNOSTICS {
            self.errors.push(diagnostic);
        }
        self.total_errors += 1;
    }

    /// Count of stored diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.errors.iter().filter(|d| d.kind == kind).count()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Diagnostics> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} symbol error(s)", self.total_errors)?;
        for diagnostic in &self.errors {
            write!(f, "\n  {diagnostic}")?;
        }
        if self.total_errors > self.errors.len() {
            write!(f, "\n  ... and {} more", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_determines_code() {
        let d = Diagnostic::new(
            DiagnosticKind::ArityMismatch,
            Namespace::Func,
            "fib",
            "call to $fib passes 2 arguments, expected 1",
        );
        assert_eq!(d.code, DiagnosticCode::ARITY_MISMATCH);
        assert_eq!(d.code.to_string(), "W102");
    }

    #[test]
    fn display_includes_enclosing_function() {
        let d = Diagnostic::new(
            DiagnosticKind::UndeclaredSymbol,
            Namespace::Local,
            "x",
            "undeclared local $x",
        )
        .in_function("main");
        assert_eq!(d.to_string(), "W100 in $main: undeclared local $x");
    }

    #[test]
    fn push_caps_stored_entries() {
        let mut diags = Diagnostics::empty();
        for i in 0..25 {
            diags.push(Diagnostic::new(
                DiagnosticKind::UndeclaredSymbol,
                Namespace::Global,
                format!("g{i}"),
                "undeclared",
            ));
        }
        assert_eq!(diags.errors.len(), MAX_DIAGNOSTICS);
        assert_eq!(diags.total_errors, 25);
        assert!(diags.to_string().contains("... and 5 more"));
        assert!(diags.into_result().is_err());
    }

    #[test]
    fn empty_is_ok() {
        let diags = Diagnostics::empty();
        assert!(!diags.has_errors());
        assert_eq!(diags.into_result(), Ok(()));
    }

    #[test]
    fn json_uses_snake_case_kinds() {
        let d = Diagnostic::new(
            DiagnosticKind::DuplicateDeclaration,
            Namespace::Table,
            "t",
            "duplicate table $t",
        );
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"duplicate_declaration\""));
        assert!(json.contains("\"table\""));
        assert!(!json.contains("\"function\""));
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
