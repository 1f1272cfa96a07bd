//! Token definitions for the Sable lexer.

use std::ops::Range;

use derive_more::Display;
use logos::Logos;

#[derive(Logos, Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*)")]
pub enum Token {
    // === Keywords ===
    #[token("fn")]
    #[display("`fn`")]
    Fn,
    #[token("pure")]
    #[display("`pure`")]
    Pure,
    #[token("out")]
    #[display("`out`")]
    Out,
    #[token("return")]
    #[display("`return`")]
    Return,
    #[token("unsigned")]
    #[display("`unsigned`")]
    Unsigned,

    // === Literals and names ===
    #[regex(r"[0-9][0-9_]*")]
    #[display("integer literal")]
    Int,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    #[display("name")]
    Name,

    // === Operators ===
    #[token("+")]
    #[display("`+`")]
    Plus,
    #[token("-")]
    #[display("`-`")]
    Minus,
    #[token("*")]
    #[display("`*`")]
    Star,
    #[token("/")]
    #[display("`/`")]
    Slash,

    // === Punctuation ===
    #[token("(")]
    #[display("`(`")]
    LParen,
    #[token(")")]
    #[display("`)`")]
    RParen,
    #[token("{")]
    #[display("`{{`")]
    LBrace,
    #[token("}")]
    #[display("`}}`")]
    RBrace,
    #[token(",")]
    #[display("`,`")]
    Comma,
    #[token(":")]
    #[display("`:`")]
    Colon,
    #[token(";")]
    #[display("`;`")]
    Semi,
}

impl Token {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Token::Fn | Token::Pure | Token::Out | Token::Return | Token::Unsigned
        )
    }

    pub fn is_operator(self) -> bool {
        matches!(self, Token::Plus | Token::Minus | Token::Star | Token::Slash)
    }
}

/// Split `source` into tokens.
///
/// Characters the lexer does not recognize are returned as `Err` with their
/// byte range, so the parser can report them and keep going.
pub fn tokenize(source: &str) -> Vec<(Result<Token, ()>, Range<usize>)> {
    Token::lexer(source).spanned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .map(|(token, _)| token.unwrap())
            .collect()
    }

    #[test]
    fn test_keywords_win_over_names() {
        assert_eq!(
            kinds("pure fn outer out unsigned"),
            vec![Token::Pure, Token::Fn, Token::Name, Token::Out, Token::Unsigned]
        );
    }

    #[test]
    fn test_skips_comments_and_whitespace() {
        let source = "out 1_000; // trailing\n\t// whole line\nreturn;";
        assert_eq!(
            kinds(source),
            vec![Token::Out, Token::Int, Token::Semi, Token::Return, Token::Semi]
        );
    }

    #[test]
    fn test_spans_are_byte_ranges() {
        let tokens = tokenize("add(2, 3)");
        let ranges: Vec<_> = tokens.into_iter().map(|(_, range)| range).collect();
        assert_eq!(ranges, vec![0..3, 3..4, 4..5, 5..6, 7..8, 8..9]);
    }

    #[test]
    fn test_unknown_character_is_error() {
        let tokens = tokenize("out 1 % 2;");
        assert_eq!(tokens[2], (Err(()), 6..7));
    }
}
