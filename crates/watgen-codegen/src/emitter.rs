//! Text rendering of the node tree.
//!
//! The emitter owns the output buffer and the current indentation depth.
//! Depth always equals the number of groups that have been opened but not
//! yet closed, so it is back at zero once a complete tree has been emitted.

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeKind};

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Spaces of indentation per nesting level.
    pub indent_width: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { indent_width: 1 }
    }
}

/// Appends rendered lines to a text buffer.
#[derive(Debug)]
pub struct Emitter {
    options: EmitOptions,
    buffer: String,
    depth: usize,
    opened: usize,
    closed: usize,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        Self {
            options,
            buffer: String::new(),
            depth: 0,
            opened: 0,
            closed: 0,
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of group lines opened so far.
    pub fn opened(&self) -> usize {
        self.opened
    }

    /// Number of group lines closed so far.
    pub fn closed(&self) -> usize {
        self.closed
    }

    /// Append `text` as one line at the current depth.
    pub fn emit_line(&mut self, text: &str) {
        let indent = self.depth * self.options.indent_width;
        self.buffer.push_str(&" ".repeat(indent));
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Emit `(header)` on one line when `children` is `None`; otherwise an
    /// open line, each child one level deeper in order, and a closing line.
    pub fn emit_node(&mut self, header: &[String], children: Option<&[Node]>) {
        let header = header.join(" ");
        match children {
            None => self.emit_line(&format!("({header})")),
            Some(children) => {
                self.emit_line(&format!("({header}"));
                self.opened += 1;
                self.depth += 1;
                for child in children {
                    self.emit(child);
                }
                self.depth -= 1;
                self.closed += 1;
                self.emit_line(")");
            }
        }
    }

    /// Emit a whole subtree.
    pub fn emit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Leaf(text) => self.emit_line(text),
            NodeKind::Form(header) => self.emit_node(header, None),
            NodeKind::Group(header, children) => self.emit_node(header, Some(children)),
            NodeKind::Fragment(children) => {
                for child in children {
                    self.emit(child);
                }
            }
        }
    }

    /// Consume the emitter and return the text.
    pub fn finish(self) -> String {
        debug_assert_eq!(self.depth, 0, "unbalanced emission");
        debug_assert_eq!(self.opened, self.closed);
        self.buffer
    }
}

/// Render a list of top-level nodes.
pub fn render(nodes: &[Node], options: EmitOptions) -> String {
    let mut emitter = Emitter::new(options);
    for node in nodes {
        emitter.emit(node);
    }
    emitter.finish()
}
