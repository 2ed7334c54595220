//! The module builder.
//!
//! A [`Generator`] is created once per output artifact.  Operations return
//! [`Node`] values; operands are nodes and bodies are `Vec<Node>`, so the
//! shape of the tree follows ordinary Rust evaluation.  Only literal
//! registration ([`Generator::string`], [`Generator::data`]) mutates the
//! generator, because it advances the allocation cursor.
//!
//! ```
//! use watgen_codegen::{FuncDecl, Generator};
//! use watgen_types::ValueType::Int;
//!
//! let mut gen = Generator::new("out/add");
//! gen.module(|g| {
//!     let decl = FuncDecl::new("add").param("a", Int).param("b", Int).result(Int);
//!     vec![g.func(decl, vec![g.return_value(g.add(Int, g.get("a"), g.get("b")))])]
//! });
//! assert!(gen.stringify().contains("(export \"add\" (func $add))"));
//! ```

use watgen_types::{Namespace, RefType, ValueType};

use crate::checker;
use crate::data::DataAllocator;
use crate::decl::FuncDecl;
use crate::emitter::{self, EmitOptions};
use crate::error::{CodegenError, CodegenResult};
use crate::node::{quoted, sigil, Node, ScopeKind, SymbolUse};

// ══════════════════════════════════════════════════════════════════════════════
// Module state
// ══════════════════════════════════════════════════════════════════════════════

/// Where the generator is in its single module construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// No module built yet.
    Empty,
    /// Inside the `module` body callback.
    Open,
    /// The module has been built; only output retrieval remains.
    Closed,
}

// ══════════════════════════════════════════════════════════════════════════════
// Generator
// ══════════════════════════════════════════════════════════════════════════════

/// Builds one module's text.
#[derive(Debug)]
pub struct Generator {
    /// Destination identifier, without extension.
    location: String,
    options: EmitOptions,
    pub(crate) data: DataAllocator,
    state: ModuleState,
    /// Top-level nodes, in emission order.
    items: Vec<Node>,
}

impl Generator {
    pub fn new(location: impl Into<String>) -> Self {
        Self::with_options(location, EmitOptions::default())
    }

    pub fn with_options(location: impl Into<String>, options: EmitOptions) -> Self {
        Self {
            location: location.into(),
            options,
            data: DataAllocator::new(),
            state: ModuleState::Empty,
            items: Vec::new(),
        }
    }

    /// Destination identifier given at construction.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn options(&self) -> EmitOptions {
        self.options
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// Next free data offset; after [`Generator::allocate`] this is the
    /// declared memory size.
    pub fn allocation(&self) -> u32 {
        self.data.cursor()
    }

    /// Top-level nodes built so far.
    pub fn items(&self) -> &[Node] {
        &self.items
    }

    // ── Module assembly ──────────────────────────────────────────────────

    /// Build the module: runs `body` with the module open and wraps the
    /// nodes it returns in a `module` group.
    ///
    /// A generator holds a single module.  Calling this again, from inside
    /// the body or after it, is ignored.
    pub fn module<F>(&mut self, body: F)
    where
        F: FnOnce(&mut Self) -> Vec<Node>,
    {
        if self.state != ModuleState::Empty {
            tracing::warn!(state = ?self.state, location = %self.location, "module already started, ignoring");
            return;
        }
        self.state = ModuleState::Open;
        let children = body(self);
        self.state = ModuleState::Closed;
        tracing::debug!(
            location = %self.location,
            items = children.len(),
            allocation = self.data.cursor(),
            "module closed"
        );
        self.items.push(Node::group(["module"], children));
    }

    /// Append a top-level node outside of [`Generator::module`].
    ///
    /// Nothing checks that the result is a well-formed module.
    pub fn emit(&mut self, node: Node) {
        self.items.push(node);
    }

    // ── Output ───────────────────────────────────────────────────────────

    /// Render everything built so far.  Calling it again without building
    /// more returns the same text.
    pub fn stringify(&self) -> String {
        emitter::render(&self.items, self.options)
    }

    /// Run the symbol check over everything built so far.
    pub fn check(&self) -> Result<(), watgen_types::Diagnostics> {
        checker::check(&self.items)
    }

    /// Check symbols, then render.  Requires a closed module.
    pub fn finish(&self) -> CodegenResult<String> {
        if self.state != ModuleState::Closed {
            return Err(CodegenError::ModuleNotClosed(self.state));
        }
        if self.data.overflowed() {
            return Err(CodegenError::DataOverflow {
                cursor: self.data.cursor(),
            });
        }
        self.check()?;
        Ok(self.stringify())
    }

    // ── Declarations ─────────────────────────────────────────────────────

    /// Import a host function as `$alias`.
    ///
    /// Imports only declare parameter types; they never declare a result.
    pub fn import(&self, library: &str, name: &str, alias: &str, params: &[ValueType]) -> Node {
        let func = if params.is_empty() {
            format!("(func ${alias})")
        } else {
            let types: Vec<&str> = params.iter().map(|ty| ty.mnemonic()).collect();
            format!("(func ${alias} (param {}))", types.join(" "))
        };
        Node::form(["import".to_string(), quoted(library), quoted(name), func])
            .with_symbol(SymbolUse::declare(Namespace::Func, alias).with_arity(params.len()))
    }

    /// A function and, unless the declaration is private, an export of it
    /// under its own name.
    pub fn func(&self, decl: FuncDecl, body: Vec<Node>) -> Node {
        let mut header = vec!["func".to_string(), sigil(&decl.name)];
        header.extend(decl.params.tokens("param"));
        header.extend(decl.locals.tokens("local"));
        if let Some(result) = decl.result {
            header.push(format!("(result {result})"));
        }

        let mut func = Node::group(header, body)
            .with_scope(ScopeKind::Function(decl.name.clone()))
            .with_symbol(SymbolUse::declare(Namespace::Func, &decl.name).with_arity(decl.params.len()));
        for (name, _) in decl.params.iter().chain(decl.locals.iter()) {
            func = func.with_symbol(SymbolUse::declare(Namespace::Local, name));
        }

        let mut nodes = vec![func];
        if decl.exported {
            nodes.push(Node::form([
                "export".to_string(),
                quoted(&decl.name),
                format!("(func ${})", decl.name),
            ]));
        }
        Node::fragment(nodes)
    }

    /// Call `$name` with the given argument nodes.
    pub fn call(&self, name: &str, args: Vec<Node>) -> Node {
        let arity = args.len();
        Node::group(["call".to_string(), sigil(name)], args)
            .with_symbol(SymbolUse::reference(Namespace::Func, name).with_arity(arity))
    }

    /// A table of `size` references.
    pub fn table(&self, name: &str, size: u32, elements: RefType) -> Node {
        Node::form([
            "table".to_string(),
            sigil(name),
            size.to_string(),
            elements.to_string(),
        ])
        .with_symbol(SymbolUse::declare(Namespace::Table, name))
    }

    /// Initialise table slots starting at `offset` with function references.
    pub fn elements(&self, offset: Node, references: &[&str]) -> Node {
        let mut children = vec![offset];
        children.extend(references.iter().map(|name| {
            Node::leaf(sigil(name)).with_symbol(SymbolUse::reference(Namespace::Func, *name))
        }));
        Node::group(["elem"], children)
    }

    /// Run `$name` when the module is instantiated.  It must take and return
    /// nothing.
    pub fn start(&self, name: &str) -> Node {
        Node::form(["start".to_string(), sigil(name)])
            .with_symbol(SymbolUse::reference(Namespace::Func, name))
    }

    // ── Variables & constants ────────────────────────────────────────────

    /// A typed constant.  `value` is written with `Display`; a float NaN is
    /// spelled `nan` as the text format expects.
    pub fn constant(&self, ty: ValueType, value: impl std::fmt::Display) -> Node {
        Node::form([format!("{ty}.const {}", literal(ty, value.to_string()))])
    }

    /// A `local` declaration for the enclosing function.
    pub fn declare_local(&self, name: &str, ty: ValueType) -> Node {
        Node::form(["local".to_string(), sigil(name), ty.to_string()])
            .with_symbol(SymbolUse::declare(Namespace::Local, name))
    }

    /// An immutable global, optionally with an initializer expression.
    pub fn declare_global(&self, name: &str, ty: ValueType, init: Option<Node>) -> Node {
        global(name, ty.to_string(), init)
    }

    /// A mutable global, so `global.set` may target it.
    pub fn declare_mutable_global(&self, name: &str, ty: ValueType, init: Option<Node>) -> Node {
        global(name, format!("(mut {ty})"), init)
    }

    pub fn set(&self, name: &str, value: Node) -> Node {
        Node::group(["local.set".to_string(), sigil(name)], vec![value])
            .with_symbol(SymbolUse::reference(Namespace::Local, name))
    }

    pub fn set_global(&self, name: &str, value: Node) -> Node {
        Node::group(["global.set".to_string(), sigil(name)], vec![value])
            .with_symbol(SymbolUse::reference(Namespace::Global, name))
    }

    pub fn get(&self, name: &str) -> Node {
        Node::form(["local.get".to_string(), sigil(name)])
            .with_symbol(SymbolUse::reference(Namespace::Local, name))
    }

    pub fn get_global(&self, name: &str) -> Node {
        Node::form(["global.get".to_string(), sigil(name)])
            .with_symbol(SymbolUse::reference(Namespace::Global, name))
    }
}

fn literal(ty: ValueType, text: String) -> String {
    if ty.is_float() {
        match text.as_str() {
            "NaN" => return "nan".to_string(),
            "-NaN" => return "-nan".to_string(),
            _ => {}
        }
    }
    text
}

fn global(name: &str, ty: String, init: Option<Node>) -> Node {
    let header = ["global".to_string(), sigil(name), ty];
    let node = match init {
        Some(init) => Node::group(header, vec![init]),
        None => Node::form(header),
    };
    node.with_symbol(SymbolUse::declare(Namespace::Global, name))
}
