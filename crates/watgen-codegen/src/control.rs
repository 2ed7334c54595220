//! Structured control flow.

use watgen_types::{Namespace, ValueType};

use crate::generator::Generator;
use crate::node::{sigil, Node, ScopeKind, SymbolUse};

impl Generator {
    /// `if` with an optional result type.
    ///
    /// The condition comes first, then a `then` group, then an `else` group
    /// only when `otherwise` is given.
    pub fn if_then(
        &self,
        result: Option<ValueType>,
        condition: Node,
        then: Vec<Node>,
        otherwise: Option<Vec<Node>>,
    ) -> Node {
        let mut header = vec!["if".to_string()];
        if let Some(ty) = result {
            header.push(format!("(result {ty})"));
        }

        let mut children = vec![condition, Node::group(["then"], then)];
        if let Some(otherwise) = otherwise {
            children.push(Node::group(["else"], otherwise));
        }
        Node::group(header, children)
    }

    /// A do-while loop labelled `$label`.
    ///
    /// The body runs first; a trailing `br_if` jumps back to the label while
    /// `condition` is non-zero.
    pub fn loop_while(&self, label: &str, condition: Node, body: Vec<Node>) -> Node {
        let mut children = body;
        children.push(self.break_if(label, condition));
        labelled("loop", label, children)
    }

    /// A `block` labelled `$label`; branching to it exits the block.
    pub fn block(&self, label: &str, body: Vec<Node>) -> Node {
        labelled("block", label, body)
    }

    /// Unconditional branch to `$label`.
    pub fn break_to(&self, label: &str) -> Node {
        Node::leaf(format!("br ${label}")).with_symbol(SymbolUse::reference(Namespace::Label, label))
    }

    /// Branch to `$label` when `condition` is non-zero.
    pub fn break_if(&self, label: &str, condition: Node) -> Node {
        Node::group(["br_if".to_string(), sigil(label)], vec![condition])
            .with_symbol(SymbolUse::reference(Namespace::Label, label))
    }

    pub fn return_value(&self, value: Node) -> Node {
        Node::group(["return"], vec![value])
    }

    /// `return` with nothing on the stack.
    pub fn return_void(&self) -> Node {
        Node::form(["return"])
    }

    /// `a` if `condition` is non-zero, else `b`.
    pub fn select(&self, a: Node, b: Node, condition: Node) -> Node {
        Node::group(["select"], vec![a, b, condition])
    }

    /// Evaluate `value` and discard it.
    pub fn drop(&self, value: Node) -> Node {
        Node::group(["drop"], vec![value])
    }
}

fn labelled(keyword: &str, label: &str, children: Vec<Node>) -> Node {
    Node::group([keyword.to_string(), sigil(label)], children)
        .with_scope(ScopeKind::Label)
        .with_symbol(SymbolUse::declare(Namespace::Label, label))
}
