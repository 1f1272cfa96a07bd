//! Concrete syntax tree.

use std::fmt::Write as _;
use std::ops::Range;
use std::rc::Rc;

use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Module,
    FunctionDecl,
    ParamList,
    Param,
    TypeRef,
    Block,
    Statement,
    BinaryExpr,
    CallExpr,
    ArgList,
    Argument,
    Literal,
    Name,
    Operator,
    Keyword,
    Error,
}

impl SyntaxKind {
    /// Kinds that can stand where an expression is expected.
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::BinaryExpr | SyntaxKind::CallExpr | SyntaxKind::Literal | SyntaxKind::Name
        )
    }
}

/// A node of the concrete syntax tree.
///
/// Leaves (`Name`, `Literal`, `Operator`, `Keyword`) have no children; their
/// text is recovered from the source with [`SyntaxNode::text`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
    pub children: Vec<Rc<SyntaxNode>>,
}

impl SyntaxNode {
    pub fn leaf(kind: SyntaxKind, range: Range<usize>) -> Rc<Self> {
        Rc::new(Self {
            kind,
            range,
            children: Vec::new(),
        })
    }

    /// Build an interior node whose range covers all children.
    ///
    /// `fallback` is used as the (empty) range when there are no children.
    pub fn branch(kind: SyntaxKind, children: Vec<Rc<SyntaxNode>>, fallback: usize) -> Rc<Self> {
        let start = children.first().map_or(fallback, |c| c.range.start);
        let end = children.last().map_or(fallback, |c| c.range.end);
        Rc::new(Self {
            kind,
            range: start..end,
            children,
        })
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.range.clone()).unwrap_or("")
    }

    /// First child of the given kind.
    pub fn child(&self, kind: SyntaxKind) -> Option<&Rc<SyntaxNode>> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of(&self, kind: SyntaxKind) -> impl Iterator<Item = &Rc<SyntaxNode>> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Whether a keyword child with the given text is present.
    pub fn has_keyword(&self, source: &str, keyword: &str) -> bool {
        self.children_of(SyntaxKind::Keyword)
            .any(|k| k.text(source) == keyword)
    }

    /// Render the tree as an indented outline, one node per line.
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        self.dump_into(source, 0, &mut out);
        out
    }

    fn dump_into(&self, source: &str, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        if self.children.is_empty() && self.kind != SyntaxKind::Error {
            let _ = writeln!(
                out,
                "{indent}{}@{:?} {:?}",
                self.kind,
                self.range,
                self.text(source)
            );
        } else {
            let _ = writeln!(out, "{indent}{}@{:?}", self.kind, self.range);
        }
        for child in &self.children {
            child.dump_into(source, depth + 1, out);
        }
    }
}
