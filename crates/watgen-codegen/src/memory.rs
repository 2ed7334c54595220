//! Linear memory: loads, stores, growth and data literals.

use crate::data;
use crate::generator::Generator;
use crate::node::{quoted, Node};
use watgen_types::ValueType;

impl Generator {
    /// Store `value` at `address + offset`.
    pub fn store(&self, ty: ValueType, offset: u32, address: Node, value: Node) -> Node {
        Node::group(
            [ty.instr("store")],
            vec![Node::leaf(format!("offset={offset}")), address, value],
        )
    }

    /// Load from `address + offset`.
    pub fn load(&self, ty: ValueType, offset: u32, address: Node) -> Node {
        Node::group(
            [ty.instr("load")],
            vec![Node::leaf(format!("offset={offset}")), address],
        )
    }

    /// Current memory size in pages.
    pub fn size(&self) -> Node {
        Node::leaf("memory.size")
    }

    /// Grow memory by `pages`; yields the previous size or -1.
    pub fn grow(&self, pages: Node) -> Node {
        Node::group(["memory.grow"], vec![pages])
    }

    /// Register a NUL-terminated string literal and return its `data` node.
    pub fn string(&mut self, text: &str) -> Node {
        let (offset, bytes) = self.data.register_str(text);
        data_node(offset, &bytes)
    }

    /// Register raw bytes and return their `data` node.
    pub fn data(&mut self, bytes: &[u8]) -> Node {
        let offset = self.data.register(bytes);
        data_node(offset, bytes)
    }

    /// Lay out the data region.
    ///
    /// `body` registers literals (through [`Generator::string`] or
    /// [`Generator::data`]) and returns their nodes.  They are followed by a
    /// `memory` declaration sized to the allocation cursor and an export of
    /// that memory as `"memory"`.
    pub fn allocate<F>(&mut self, body: F) -> Node
    where
        F: FnOnce(&mut Self) -> Vec<Node>,
    {
        let mut children = body(self);
        let size = self.data.cursor();
        tracing::debug!(size, literals = self.data.regions().len(), "declaring memory");
        children.push(Node::form([
            "memory".to_string(),
            "$memory".to_string(),
            size.to_string(),
        ]));
        children.push(Node::form([
            "export".to_string(),
            quoted("memory"),
            "(memory $memory)".to_string(),
        ]));
        Node::fragment(children)
    }
}

fn data_node(offset: u32, bytes: &[u8]) -> Node {
    Node::form([
        "data".to_string(),
        format!("(i32.const {offset})"),
        quoted(&data::escape(bytes)),
    ])
}
