//! The in-memory node tree.
//!
//! Operations build [`Node`] values; the [`Emitter`](crate::emitter::Emitter)
//! renders them in a second pass.  Nodes also carry symbol annotations that
//! the [checker](crate::checker) reads.  Annotations never show up in the
//! rendered text.

use watgen_types::Namespace;

/// Shape of a node, which determines how it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A bare line, e.g. `memory.size` or `offset=8`.
    Leaf(String),
    /// A self-closed form on one line: `(i32.const 1)`.
    Form(Vec<String>),
    /// An open line, the indented children, then a closing `)` line.
    Group(Vec<String>, Vec<Node>),
    /// Children emitted at the current depth with no wrapper of their own.
    Fragment(Vec<Node>),
}

/// A declaration or reference of a named symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolUse {
    Declare {
        namespace: Namespace,
        name: String,
        /// Parameter count, for functions.
        arity: Option<usize>,
    },
    Reference {
        namespace: Namespace,
        name: String,
        /// Argument count, for calls.
        arity: Option<usize>,
    },
}

impl SymbolUse {
    pub fn declare(namespace: Namespace, name: impl Into<String>) -> Self {
        Self::Declare {
            namespace,
            name: name.into(),
            arity: None,
        }
    }

    pub fn reference(namespace: Namespace, name: impl Into<String>) -> Self {
        Self::Reference {
            namespace,
            name: name.into(),
            arity: None,
        }
    }

    /// Set the arity of a declaration or reference.
    pub fn with_arity(self, n: usize) -> Self {
        match self {
            Self::Declare {
                namespace, name, ..
            } => Self::Declare {
                namespace,
                name,
                arity: Some(n),
            },
            Self::Reference {
                namespace, name, ..
            } => Self::Reference {
                namespace,
                name,
                arity: Some(n),
            },
        }
    }
}

/// Lexical scope opened by a node for its own declarations and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    /// A function body; holds params and locals.
    Function(String),
    /// A `block` or `loop`; holds its label.
    Label,
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub symbols: Vec<SymbolUse>,
    pub scope: Option<ScopeKind>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            symbols: Vec::new(),
            scope: None,
        }
    }

    pub fn leaf(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Leaf(text.into()))
    }

    pub fn form<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(NodeKind::Form(header.into_iter().map(Into::into).collect()))
    }

    pub fn group<I, S>(header: I, children: Vec<Node>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(NodeKind::Group(
            header.into_iter().map(Into::into).collect(),
            children,
        ))
    }

    pub fn fragment(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Fragment(children))
    }

    /// Attach a symbol annotation.
    pub fn with_symbol(mut self, symbol: SymbolUse) -> Self {
        self.symbols.push(symbol);
        self
    }

    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Header tokens, for forms and groups.
    pub fn header(&self) -> Option<&[String]> {
        match &self.kind {
            NodeKind::Form(header) | NodeKind::Group(header, _) => Some(header),
            NodeKind::Leaf(_) | NodeKind::Fragment(_) => None,
        }
    }

    /// Nested nodes, for groups and fragments.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Group(_, children) | NodeKind::Fragment(children) => children,
            NodeKind::Leaf(_) | NodeKind::Form(_) => &[],
        }
    }

    /// First header token (`i32.add`, `func`, ...), or the leaf text.
    pub fn head(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf(text) => Some(text),
            NodeKind::Form(header) | NodeKind::Group(header, _) => {
                header.first().map(String::as_str)
            }
            NodeKind::Fragment(_) => None,
        }
    }

    /// Number of groups in this subtree, which is the number of open
    /// (and of close) lines it renders to.
    pub fn group_count(&self) -> usize {
        let own = usize::from(matches!(self.kind, NodeKind::Group(..)));
        own + self.children().iter().map(Node::group_count).sum::<usize>()
    }
}

/// Format a symbol name with the `$` sigil.
pub(crate) fn sigil(name: &str) -> String {
    format!("${name}")
}

/// Format a string literal token.
pub(crate) fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}
