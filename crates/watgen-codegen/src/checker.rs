//! Symbol checker: walks a built node tree and validates every symbol.
//!
//! Entry point: [`check`].
//!
//! Two passes:
//! 1. Collect module-level declarations (functions, imports, globals,
//!    tables).  References to these may appear before the declaration.
//! 2. Walk each function with a [`ScopeStack`], declaring params, locals
//!    and labels as they appear and resolving every reference.
//!
//! Diagnostics emitted:
//! - W100: undeclared symbol
//! - W101: duplicate declaration
//! - W102: call arity mismatch

use std::collections::{HashMap, HashSet};

use watgen_types::{Diagnostic, DiagnosticKind, Diagnostics, Namespace};

use crate::node::{Node, SymbolUse};
use crate::scope::ScopeStack;

/// Check every symbol in `items`.
pub fn check(items: &[Node]) -> Result<(), Diagnostics> {
    let mut checker = SymbolChecker::new();
    for item in items {
        checker.collect(item);
    }
    for item in items {
        checker.walk(item);
    }
    if checker.diagnostics.has_errors() {
        tracing::debug!(errors = checker.diagnostics.total_errors, "symbol check failed");
    }
    checker.diagnostics.into_result()
}

// ══════════════════════════════════════════════════════════════════════════════
// SymbolChecker
// ══════════════════════════════════════════════════════════════════════════════

struct SymbolChecker {
    /// Function name → parameter count.
    functions: HashMap<String, Option<usize>>,
    globals: HashSet<String>,
    tables: HashSet<String>,
    scopes: ScopeStack,
    diagnostics: Diagnostics,
}

impl SymbolChecker {
    fn new() -> Self {
        Self {
            functions: HashMap::new(),
            globals: HashSet::new(),
            tables: HashSet::new(),
            scopes: ScopeStack::new(),
            diagnostics: Diagnostics::empty(),
        }
    }

    // ── Pass 1: module-level declarations ────────────────────────────────

    fn collect(&mut self, node: &Node) {
        for symbol in &node.symbols {
            let SymbolUse::Declare {
                namespace,
                name,
                arity,
            } = symbol
            else {
                continue;
            };
            let fresh = match namespace {
                Namespace::Func => self.functions.insert(name.clone(), *arity).is_none(),
                Namespace::Global => self.globals.insert(name.clone()),
                Namespace::Table => self.tables.insert(name.clone()),
                Namespace::Local | Namespace::Label => continue,
            };
            if !fresh {
                self.duplicate(*namespace, name);
            }
        }
        for child in node.children() {
            self.collect(child);
        }
    }

    // ── Pass 2: scoped walk ──────────────────────────────────────────────

    fn walk(&mut self, node: &Node) {
        if let Some(scope) = &node.scope {
            self.scopes.push(scope.clone());
        }

        for symbol in &node.symbols {
            match symbol {
                SymbolUse::Declare {
                    namespace: Namespace::Local,
                    name,
                    ..
                } => {
                    if self.scopes.current_function().is_some() && !self.scopes.define_local(name) {
                        self.duplicate(Namespace::Local, name);
                    }
                }
                SymbolUse::Declare {
                    namespace: Namespace::Label,
                    name,
                    ..
                } => {
                    self.scopes.define_label(name);
                }
                SymbolUse::Declare { .. } => {}
                SymbolUse::Reference {
                    namespace,
                    name,
                    arity,
                } => self.resolve(*namespace, name, *arity),
            }
        }

        for child in node.children() {
            self.walk(child);
        }

        if node.scope.is_some() {
            self.scopes.pop();
        }
    }

    fn resolve(&mut self, namespace: Namespace, name: &str, arity: Option<usize>) {
        let found = match namespace {
            Namespace::Func => match self.functions.get(name).copied() {
                Some(declared) => {
                    if let (Some(expected), Some(actual)) = (declared, arity) {
                        if expected != actual {
                            self.report(Diagnostic::new(
                                DiagnosticKind::ArityMismatch,
                                namespace,
                                name,
                                format!(
                                    "call to ${name} passes {actual} argument(s), expected {expected}"
                                ),
                            ));
                        }
                    }
                    true
                }
                None => false,
            },
            Namespace::Global => self.globals.contains(name),
            Namespace::Table => self.tables.contains(name),
            Namespace::Local => self.scopes.has_local(name),
            Namespace::Label => self.scopes.has_label(name),
        };
        if !found {
            self.report(Diagnostic::new(
                DiagnosticKind::UndeclaredSymbol,
                namespace,
                name,
                format!("undeclared {namespace} ${name}"),
            ));
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn duplicate(&mut self, namespace: Namespace, name: &str) {
        self.report(Diagnostic::new(
            DiagnosticKind::DuplicateDeclaration,
            namespace,
            name,
            format!("duplicate {namespace} ${name}"),
        ));
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match self.scopes.current_function() {
            Some(func) => diagnostic.in_function(func),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }
}
