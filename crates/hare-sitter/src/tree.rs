//! Concrete syntax trees.
//!
//! A [`Tree`] owns its source text and a flat arena of nodes. [`Node`] is a
//! cheap copyable cursor into that arena; navigation never allocates.

use crate::language::{FieldId, KindId, Language, ERROR_KIND};
use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// A zero-based row and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    /// Line number, counting `\n` terminated lines from zero.
    pub row: usize,
    /// Byte offset from the start of the line.
    pub column: usize,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: KindId,
    pub(crate) named: bool,
    pub(crate) range: Range<usize>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) field: Option<FieldId>,
    pub(crate) extra: bool,
    pub(crate) missing: bool,
    pub(crate) has_error: bool,
}

/// The result of a parse.
#[derive(Clone)]
pub struct Tree {
    language: &'static Language,
    source: String,
    rope: Rope,
    nodes: Vec<NodeData>,
    root: usize,
}

impl Tree {
    pub(crate) fn new(
        language: &'static Language,
        source: String,
        nodes: Vec<NodeData>,
        root: usize,
    ) -> Self {
        let rope = Rope::from_str(&source);
        Self {
            language,
            source,
            rope,
            nodes,
            root,
        }
    }

    /// The top-level `module` node. It always spans the whole source.
    #[must_use]
    pub fn root_node(&self) -> Node<'_> {
        Node {
            tree: self,
            index: self.root,
        }
    }

    /// The language the tree was parsed with.
    #[must_use]
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// The parsed text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Length of the source in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the source is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Total number of nodes, anonymous and extra nodes included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Visits every node in document order, parents before children.
    #[must_use]
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
        }
    }

    fn point(&self, byte: usize) -> Point {
        let row = self.rope.byte_to_line(byte);
        Point::new(row, byte - self.rope.line_to_byte(row))
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Tree {:?}}}", self.root_node())
    }
}

/// A node within a [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    index: usize,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.index]
    }

    fn at(&self, index: usize) -> Node<'t> {
        Node {
            tree: self.tree,
            index,
        }
    }

    /// An id unique among the nodes of this tree.
    #[must_use]
    pub fn id(&self) -> usize {
        self.index
    }

    /// The node's kind, e.g. `"call_expression"` or `";"`.
    #[must_use]
    pub fn kind(&self) -> &'t str {
        self.tree
            .language
            .node_kind_for_id(self.data().kind)
            .unwrap_or("ERROR")
    }

    /// The numeric id of [`Node::kind`].
    #[must_use]
    pub fn kind_id(&self) -> KindId {
        self.data().kind
    }

    /// Whether the node comes from a named rule rather than a literal token.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.data().named
    }

    /// Whether the node is a comment that may appear anywhere.
    #[must_use]
    pub fn is_extra(&self) -> bool {
        self.data().extra
    }

    /// Whether the node is an `ERROR` node holding unexpected input.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.data().kind == ERROR_KIND
    }

    /// Whether the parser inserted this zero-width node for an absent token.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.data().missing
    }

    /// Whether this node or any descendant is an error or missing node.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    /// Byte offset where the node starts.
    #[must_use]
    pub fn start_byte(&self) -> usize {
        self.data().range.start
    }

    /// Byte offset where the node ends.
    #[must_use]
    pub fn end_byte(&self) -> usize {
        self.data().range.end
    }

    /// The node's byte range.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.data().range.clone()
    }

    /// Row and column where the node starts.
    #[must_use]
    pub fn start_position(&self) -> Point {
        self.tree.point(self.start_byte())
    }

    /// Row and column where the node ends.
    #[must_use]
    pub fn end_position(&self) -> Point {
        self.tree.point(self.end_byte())
    }

    /// The source text the node covers.
    #[must_use]
    pub fn text(&self) -> &'t str {
        &self.tree.source[self.byte_range()]
    }

    /// The enclosing node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|i| self.at(i))
    }

    /// Number of children, anonymous and extra nodes included.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// The child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.data().children.get(index).map(|&i| self.at(i))
    }

    /// All children in order.
    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&index| Node { tree, index })
    }

    /// Named children only.
    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        self.children().filter(Node::is_named)
    }

    /// Number of named children.
    #[must_use]
    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    /// The named child at `index`, counting named children only.
    #[must_use]
    pub fn named_child(&self, index: usize) -> Option<Node<'t>> {
        self.named_children().nth(index)
    }

    /// The first child labelled `field`.
    #[must_use]
    pub fn child_by_field_name(&self, field: &str) -> Option<Node<'t>> {
        self.children_by_field_name(field).next()
    }

    /// Every child labelled `field`.
    pub fn children_by_field_name(&self, field: &str) -> impl Iterator<Item = Node<'t>> + 't {
        let id = self.tree.language.field_id_for_name(field);
        self.children()
            .filter(move |child| id.is_some() && child.data().field == id)
    }

    /// The field label of the child at `index`.
    #[must_use]
    pub fn field_name_for_child(&self, index: usize) -> Option<&'t str> {
        let child = self.child(index)?;
        child.field_name()
    }

    /// The field label this node carries within its parent.
    #[must_use]
    pub fn field_name(&self) -> Option<&'t str> {
        let id = self.data().field?;
        self.tree.language.field_name_for_id(id)
    }

    fn position_in_parent(&self) -> Option<(Node<'t>, usize)> {
        let parent = self.parent()?;
        let position = parent
            .data()
            .children
            .iter()
            .position(|&i| i == self.index)?;
        Some((parent, position))
    }

    /// The following sibling.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let (parent, position) = self.position_in_parent()?;
        parent.child(position + 1)
    }

    /// The preceding sibling.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let (parent, position) = self.position_in_parent()?;
        parent.child(position.checked_sub(1)?)
    }

    /// The following named sibling.
    #[must_use]
    pub fn next_named_sibling(&self) -> Option<Node<'t>> {
        let mut node = self.next_sibling()?;
        while !node.is_named() {
            node = node.next_sibling()?;
        }
        Some(node)
    }

    /// The preceding named sibling.
    #[must_use]
    pub fn prev_named_sibling(&self) -> Option<Node<'t>> {
        let mut node = self.prev_sibling()?;
        while !node.is_named() {
            node = node.prev_sibling()?;
        }
        Some(node)
    }

    /// The smallest node within this one that spans `start..end`.
    #[must_use]
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'t>> {
        self.descend(start, end, false)
    }

    /// The smallest named node within this one that spans `start..end`.
    #[must_use]
    pub fn named_descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'t>> {
        self.descend(start, end, true)
    }

    fn descend(&self, start: usize, end: usize, named_only: bool) -> Option<Node<'t>> {
        let spans = |node: &Node<'_>| node.start_byte() <= start && end <= node.end_byte();
        if start > end || !spans(self) {
            return None;
        }

        let mut node = *self;
        let mut last_named = self.is_named().then_some(*self);
        // Zero-width children only match zero-width queries.
        while let Some(child) = node
            .children()
            .find(|c| spans(c) && (c.start_byte() < c.end_byte() || start == end))
        {
            node = child;
            if child.is_named() {
                last_named = Some(child);
            }
        }

        if named_only {
            last_named
        } else {
            Some(node)
        }
    }

    /// Renders the subtree as an S-expression of named nodes.
    ///
    /// Anonymous tokens are left out, fields are written as `name: ` prefixes
    /// and inserted tokens as `(MISSING kind)`.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn shows_in_sexp(&self) -> bool {
        self.is_named() || self.is_missing()
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        if self.is_missing() {
            out.push_str("MISSING ");
            if self.is_named() {
                out.push_str(self.kind());
            } else {
                out.push('"');
                out.push_str(self.kind());
                out.push('"');
            }
        } else {
            out.push_str(self.kind());
        }

        for child in self.children().filter(Node::shows_in_sexp) {
            out.push(' ');
            if let Some(field) = child.field_name() {
                out.push_str(field);
                out.push_str(": ");
            }
            child.write_sexp(out);
        }
        out.push(')');
    }
}

/// Pre-order traversal returned by [`Tree::walk`].
#[derive(Debug)]
pub struct PreOrder<'t> {
    tree: &'t Tree,
    stack: Vec<usize>,
}

impl<'t> Iterator for PreOrder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[index].children.iter().rev());
        Some(Node {
            tree: self.tree,
            index,
        })
    }
}
