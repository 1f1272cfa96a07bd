//! Recursive-descent parser producing a [`SyntaxNode`] tree.
//!
//! Errors never abort parsing. Each one is recorded as a [`ParseError`] and
//! the parser skips to the next `;` or `}`, leaving an `Error` node behind.
//! Mandatory children that could not be parsed are simply left out.

use std::ops::Range;
use std::rc::Rc;

use derive_more::{Display, Error};

use crate::cst::{SyntaxKind, SyntaxNode};
use crate::lexer::{Token, tokenize};

#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
#[display("{message}")]
pub struct ParseError {
    pub message: String,
    pub range: Range<usize>,
}

/// Result of parsing one source text.
#[derive(Clone, Debug)]
pub struct Parse {
    pub root: Rc<SyntaxNode>,
    pub errors: Vec<ParseError>,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn parse(source: &str) -> Parse {
    let mut errors = Vec::new();
    let mut tokens = Vec::new();
    for (token, range) in tokenize(source) {
        match token {
            Ok(token) => tokens.push((token, range)),
            Err(()) => errors.push(ParseError {
                message: format!("unexpected character `{}`", &source[range.clone()]),
                range,
            }),
        }
    }

    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        last_end: 0,
        errors,
    };
    let root = parser.module();
    Parse {
        root,
        errors: parser.errors,
    }
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    /// End offset of the last consumed token.
    last_end: usize,
    errors: Vec<ParseError>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(token, _)| *token)
    }

    fn peek_range(&self) -> Range<usize> {
        match self.tokens.get(self.pos) {
            Some((_, range)) => range.clone(),
            None => self.source.len()..self.source.len(),
        }
    }

    fn at(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    fn bump(&mut self) -> Range<usize> {
        let range = self.peek_range();
        if self.pos < self.tokens.len() {
            self.pos += 1;
            self.last_end = range.end;
        }
        range
    }

    fn eat(&mut self, token: Token) -> Option<Range<usize>> {
        self.at(token).then(|| self.bump())
    }

    fn expected(&mut self, what: &str) {
        let found = match self.peek() {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        };
        self.errors.push(ParseError {
            message: format!("expected {what}, found {found}"),
            range: self.peek_range(),
        });
    }

    /// Skip to just past the next `;`, or up to (not including) the next `}`.
    fn recover(&mut self) -> Rc<SyntaxNode> {
        let start = self.peek_range().start;
        while let Some(token) = self.peek() {
            match token {
                Token::Semi => {
                    self.bump();
                    break;
                }
                Token::RBrace => break,
                _ => {
                    self.bump();
                }
            }
        }
        SyntaxNode::leaf(SyntaxKind::Error, start..self.last_end.max(start))
    }

    fn module(&mut self) -> Rc<SyntaxNode> {
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            if token == Token::RBrace {
                self.errors.push(ParseError {
                    message: "unmatched `}`".to_string(),
                    range: self.peek_range(),
                });
                let range = self.bump();
                items.push(SyntaxNode::leaf(SyntaxKind::Error, range));
                continue;
            }
            items.push(self.item());
        }
        Rc::new(SyntaxNode {
            kind: SyntaxKind::Module,
            range: 0..self.source.len(),
            children: items,
        })
    }

    fn item(&mut self) -> Rc<SyntaxNode> {
        match self.peek() {
            Some(Token::Fn | Token::Pure) => self.function(),
            _ => self.statement(),
        }
    }

    fn function(&mut self) -> Rc<SyntaxNode> {
        let mut children = Vec::new();
        if let Some(range) = self.eat(Token::Pure) {
            children.push(SyntaxNode::leaf(SyntaxKind::Keyword, range));
        }
        match self.eat(Token::Fn) {
            Some(range) => children.push(SyntaxNode::leaf(SyntaxKind::Keyword, range)),
            None => {
                self.expected("`fn`");
                children.push(self.recover());
                return SyntaxNode::branch(SyntaxKind::FunctionDecl, children, self.last_end);
            }
        }
        match self.eat(Token::Name) {
            Some(range) => children.push(SyntaxNode::leaf(SyntaxKind::Name, range)),
            None => self.expected("function name"),
        }
        children.push(self.param_list());
        if self.eat(Token::Colon).is_some() {
            children.push(self.type_ref());
        }
        if self.at(Token::LBrace) {
            children.push(self.block());
        } else {
            self.expected("`{`");
            children.push(self.recover());
        }
        SyntaxNode::branch(SyntaxKind::FunctionDecl, children, self.last_end)
    }

    fn param_list(&mut self) -> Rc<SyntaxNode> {
        let start = self.peek_range().start;
        if self.eat(Token::LParen).is_none() {
            self.expected("`(`");
            return SyntaxNode::branch(SyntaxKind::ParamList, Vec::new(), self.last_end);
        }
        let mut params = Vec::new();
        while self.at(Token::Name) {
            params.push(self.param());
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        if self.eat(Token::RParen).is_none() {
            self.expected("`)`");
            let skipped = self.peek_range().start;
            while let Some(token) = self.peek() {
                match token {
                    Token::RParen => {
                        self.bump();
                        break;
                    }
                    Token::LBrace | Token::RBrace | Token::Semi => break,
                    _ => {
                        self.bump();
                    }
                }
            }
            params.push(SyntaxNode::leaf(
                SyntaxKind::Error,
                skipped..self.last_end.max(skipped),
            ));
        }
        Rc::new(SyntaxNode {
            kind: SyntaxKind::ParamList,
            range: start..self.last_end,
            children: params,
        })
    }

    fn param(&mut self) -> Rc<SyntaxNode> {
        let name = SyntaxNode::leaf(SyntaxKind::Name, self.bump());
        let mut children = vec![name];
        if self.eat(Token::Colon).is_some() {
            children.push(self.type_ref());
        } else {
            self.expected("`:`");
        }
        SyntaxNode::branch(SyntaxKind::Param, children, self.last_end)
    }

    fn type_ref(&mut self) -> Rc<SyntaxNode> {
        let mut children = Vec::new();
        if let Some(range) = self.eat(Token::Unsigned) {
            children.push(SyntaxNode::leaf(SyntaxKind::Keyword, range));
        }
        match self.eat(Token::Name) {
            Some(range) => children.push(SyntaxNode::leaf(SyntaxKind::Name, range)),
            None => self.expected("type name"),
        }
        SyntaxNode::branch(SyntaxKind::TypeRef, children, self.last_end)
    }

    fn block(&mut self) -> Rc<SyntaxNode> {
        let start = self.bump().start;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    self.expected("`}`");
                    break;
                }
                Some(Token::RBrace) => {
                    self.bump();
                    break;
                }
                Some(_) => items.push(self.item()),
            }
        }
        Rc::new(SyntaxNode {
            kind: SyntaxKind::Block,
            range: start..self.last_end,
            children: items,
        })
    }

    fn statement(&mut self) -> Rc<SyntaxNode> {
        let start = self.peek_range().start;
        let mut children = Vec::new();
        if let Some(Token::Out | Token::Return) = self.peek() {
            children.push(SyntaxNode::leaf(SyntaxKind::Keyword, self.bump()));
        }
        if !self.at(Token::Semi) {
            match self.expr() {
                Some(expr) => children.push(expr),
                None => {
                    children.push(self.recover());
                    return self.finish_statement(start, children);
                }
            }
        }
        if self.eat(Token::Semi).is_none() {
            self.expected("`;`");
            children.push(self.recover());
        }
        self.finish_statement(start, children)
    }

    fn finish_statement(&self, start: usize, children: Vec<Rc<SyntaxNode>>) -> Rc<SyntaxNode> {
        Rc::new(SyntaxNode {
            kind: SyntaxKind::Statement,
            range: start..self.last_end.max(start),
            children,
        })
    }

    fn expr(&mut self) -> Option<Rc<SyntaxNode>> {
        self.binary(&[Token::Plus, Token::Minus], Self::term)
    }

    fn term(&mut self) -> Option<Rc<SyntaxNode>> {
        self.binary(&[Token::Star, Token::Slash], Self::primary)
    }

    /// Left-associative binary chain over `operators`.
    ///
    /// A missing right operand ends the chain with a two-child `BinaryExpr`.
    fn binary(
        &mut self,
        operators: &[Token],
        operand: fn(&mut Self) -> Option<Rc<SyntaxNode>>,
    ) -> Option<Rc<SyntaxNode>> {
        let mut lhs = operand(self)?;
        while let Some(token) = self.peek() {
            if !operators.contains(&token) {
                break;
            }
            let op = SyntaxNode::leaf(SyntaxKind::Operator, self.bump());
            let mut children = vec![lhs, op];
            let rhs = operand(self);
            let complete = rhs.is_some();
            children.extend(rhs);
            lhs = SyntaxNode::branch(SyntaxKind::BinaryExpr, children, self.last_end);
            if !complete {
                break;
            }
        }
        Some(lhs)
    }

    fn primary(&mut self) -> Option<Rc<SyntaxNode>> {
        match self.peek() {
            Some(Token::Int) => Some(SyntaxNode::leaf(SyntaxKind::Literal, self.bump())),
            Some(Token::Name) => {
                let name = SyntaxNode::leaf(SyntaxKind::Name, self.bump());
                if self.at(Token::LParen) {
                    Some(self.call(name))
                } else {
                    Some(name)
                }
            }
            Some(Token::LParen) => {
                self.bump();
                let inner = self.expr()?;
                if self.eat(Token::RParen).is_none() {
                    self.expected("`)`");
                }
                Some(inner)
            }
            _ => {
                self.expected("expression");
                None
            }
        }
    }

    fn call(&mut self, name: Rc<SyntaxNode>) -> Rc<SyntaxNode> {
        let start = self.bump().start;
        let mut args = Vec::new();
        let mut failed = false;
        while !self.at(Token::RParen) && self.peek().is_some() {
            match self.expr() {
                Some(expr) => args.push(SyntaxNode::branch(
                    SyntaxKind::Argument,
                    vec![expr],
                    self.last_end,
                )),
                None => {
                    failed = true;
                    break;
                }
            }
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        if !failed && self.eat(Token::RParen).is_none() {
            self.expected("`)`");
        }
        let arg_list = Rc::new(SyntaxNode {
            kind: SyntaxKind::ArgList,
            range: start..self.last_end,
            children: args,
        });
        SyntaxNode::branch(SyntaxKind::CallExpr, vec![name, arg_list], self.last_end)
    }
}
