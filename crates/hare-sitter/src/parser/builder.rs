//! Bottom-up construction of a [`Tree`].

use crate::language::{KindId, Language, ERROR_KIND};
use crate::tree::{NodeData, Tree};
use std::ops::Range;

/// A position among the children of the innermost open node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint(usize);

#[derive(Debug)]
struct OpenNode {
    kind: KindId,
    children: Vec<usize>,
    // Span of tokens that belong to the node but produce no child.
    hidden: Option<Range<usize>>,
}

/// Collects nodes as the parser recognises them.
///
/// Children are finished before their parents, so a node's index is only
/// allocated when it is closed.
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    language: &'static Language,
    nodes: Vec<NodeData>,
    stack: Vec<OpenNode>,
    root: Option<usize>,
    // End of the last token consumed; missing nodes are placed here.
    pos: usize,
}

impl TreeBuilder {
    pub(crate) fn new(language: &'static Language) -> Self {
        Self {
            language,
            nodes: Vec::new(),
            stack: Vec::new(),
            root: None,
            pos: 0,
        }
    }

    fn kind(&self, name: &str, named: bool) -> KindId {
        self.language
            .id_for_node_kind(name, named)
            .unwrap_or_else(|| {
                tracing::warn!(kind = name, named, "unknown node kind");
                ERROR_KIND
            })
    }

    pub(crate) fn start_node(&mut self, kind: &str) {
        let kind = self.kind(kind, true);
        self.stack.push(OpenNode {
            kind,
            children: Vec::new(),
            hidden: None,
        });
    }

    pub(crate) fn start_error(&mut self) {
        self.stack.push(OpenNode {
            kind: ERROR_KIND,
            children: Vec::new(),
            hidden: None,
        });
    }

    pub(crate) fn finish_node(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let range = self.span(&open.children, open.hidden);
        let index = self.push(open.kind, true, range, open.children);
        self.attach(index);
    }

    /// A named leaf such as `identifier`.
    pub(crate) fn leaf(&mut self, range: Range<usize>, kind: &str) {
        let kind = self.kind(kind, true);
        self.token_node(range, kind, true);
    }

    /// An anonymous leaf whose kind is its own text.
    pub(crate) fn token(&mut self, range: Range<usize>, text: &str) {
        let kind = self.kind(text, false);
        self.token_node(range, kind, false);
    }

    /// A comment.
    pub(crate) fn extra(&mut self, range: Range<usize>) {
        let kind = self.kind("comment", true);
        self.pos = range.end;
        let index = self.push(kind, true, range, Vec::new());
        self.nodes[index].extra = true;
        self.attach(index);
    }

    /// Consumes input that widens the open node without becoming a child.
    pub(crate) fn hidden(&mut self, range: Range<usize>) {
        self.pos = range.end;
        if let Some(open) = self.stack.last_mut() {
            open.hidden = Some(match open.hidden.take() {
                Some(hidden) => hidden.start.min(range.start)..hidden.end.max(range.end),
                None => range,
            });
        }
    }

    /// A zero-width node standing in for an absent token.
    pub(crate) fn missing(&mut self, kind: &str, named: bool) {
        let kind = self.kind(kind, named);
        let index = self.push(kind, named, self.pos..self.pos, Vec::new());
        self.nodes[index].missing = true;
        self.nodes[index].has_error = true;
        self.attach(index);
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.stack.last().map_or(0, |open| open.children.len()))
    }

    /// Moves the children added since `checkpoint` into a new node.
    pub(crate) fn wrap(&mut self, checkpoint: Checkpoint, kind: &str) {
        let kind = self.kind(kind, true);
        let Some(open) = self.stack.last_mut() else {
            return;
        };
        let children = open.children.split_off(checkpoint.0.min(open.children.len()));
        let range = self.span(&children, None);
        let index = self.push(kind, true, range, children);
        self.attach(index);
    }

    /// Labels every non-extra child added since `checkpoint`.
    pub(crate) fn label_since(&mut self, checkpoint: Checkpoint, field: &str) {
        let Some(field) = self.language.field_id_for_name(field) else {
            tracing::warn!(field, "unknown field");
            return;
        };
        let Some(open) = self.stack.last() else {
            return;
        };
        for &child in open.children.iter().skip(checkpoint.0) {
            let data = &mut self.nodes[child];
            if !data.extra {
                data.field = Some(field);
            }
        }
    }

    pub(crate) fn finish(mut self, source: String) -> Tree {
        while !self.stack.is_empty() {
            self.finish_node();
        }
        let root = match self.root {
            Some(root) => root,
            None => {
                let kind = self.kind("module", true);
                self.push(kind, true, 0..0, Vec::new())
            }
        };
        self.nodes[root].range = 0..source.len();
        Tree::new(self.language, source, self.nodes, root)
    }

    fn token_node(&mut self, range: Range<usize>, kind: KindId, named: bool) {
        self.pos = range.end;
        let index = self.push(kind, named, range, Vec::new());
        self.attach(index);
    }

    fn span(&self, children: &[usize], hidden: Option<Range<usize>>) -> Range<usize> {
        let first = children.first().map(|&c| self.nodes[c].range.start);
        let last = children.last().map(|&c| self.nodes[c].range.end);
        let start = match (first, &hidden) {
            (Some(a), Some(h)) => a.min(h.start),
            (Some(a), None) => a,
            (None, Some(h)) => h.start,
            (None, None) => self.pos,
        };
        let end = match (last, &hidden) {
            (Some(a), Some(h)) => a.max(h.end),
            (Some(a), None) => a,
            (None, Some(h)) => h.end,
            (None, None) => self.pos,
        };
        start..end
    }

    fn push(&mut self, kind: KindId, named: bool, range: Range<usize>, children: Vec<usize>) -> usize {
        let index = self.nodes.len();
        let has_error = kind == ERROR_KIND || children.iter().any(|&c| self.nodes[c].has_error);
        for &child in &children {
            self.nodes[child].parent = Some(index);
        }
        self.nodes.push(NodeData {
            kind,
            named,
            range,
            parent: None,
            children,
            field: None,
            extra: false,
            missing: false,
            has_error,
        });
        index
    }

    fn attach(&mut self, index: usize) {
        match self.stack.last_mut() {
            Some(open) => open.children.push(index),
            None => self.root = Some(index),
        }
    }
}
