//! Lexical scopes for the symbol checker.
//!
//! [`ScopeStack`] holds one frame per open function or labelled block.
//! Locals always land in the innermost function frame; labels land in the
//! frame of the `block`/`loop` that declares them.

use std::collections::HashSet;

use crate::node::ScopeKind;

#[derive(Debug)]
struct Frame {
    kind: ScopeKind,
    locals: HashSet<String>,
    labels: HashSet<String>,
}

/// A stack of function and label scopes.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ScopeKind) {
        self.frames.push(Frame {
            kind,
            locals: HashSet::new(),
            labels: HashSet::new(),
        });
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "no scope to pop");
        self.frames.pop();
    }

    /// Name of the innermost enclosing function.
    pub fn current_function(&self) -> Option<&str> {
        self.frames.iter().rev().find_map(|f| match &f.kind {
            ScopeKind::Function(name) => Some(name.as_str()),
            ScopeKind::Label => None,
        })
    }

    fn function_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames
            .iter_mut()
            .rev()
            .find(|f| matches!(f.kind, ScopeKind::Function(_)))
    }

    /// Frames from the innermost outwards, stopping at the function boundary.
    fn frames_in_function(&self) -> impl Iterator<Item = &Frame> {
        let mut crossed = false;
        self.frames.iter().rev().take_while(move |f| {
            if crossed {
                return false;
            }
            crossed = matches!(f.kind, ScopeKind::Function(_));
            true
        })
    }

    /// Declare a local in the enclosing function.
    ///
    /// Returns `false` when the name is already declared there, or when there
    /// is no enclosing function.
    pub fn define_local(&mut self, name: &str) -> bool {
        match self.function_frame_mut() {
            Some(frame) => frame.locals.insert(name.to_string()),
            None => false,
        }
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.frames_in_function()
            .any(|f| matches!(f.kind, ScopeKind::Function(_)) && f.locals.contains(name))
    }

    /// Declare a label in the innermost frame.
    pub fn define_label(&mut self, name: &str) -> bool {
        match self.frames.last_mut() {
            Some(frame) => frame.labels.insert(name.to_string()),
            None => false,
        }
    }

    /// Whether a branch to `name` from here resolves.
    pub fn has_label(&self, name: &str) -> bool {
        self.frames_in_function().any(|f| f.labels.contains(name))
    }
}
