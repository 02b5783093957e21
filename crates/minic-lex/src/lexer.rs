use minic_util::{Span, Symbol};

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Hand-written scanner over Mini source text (spec.md §6's lexicon).
/// Produces a flat token stream; whitespace and `//` line comments are
/// skipped and never appear as tokens.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenize the whole input, ending with one [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        if self.cursor.is_eof() {
            return Ok(Token::new(TokenKind::Eof, self.span(start, line, column)));
        }

        let c = self.cursor.current_char();

        if c.is_ascii_digit() {
            return Ok(self.lex_number(start, line, column));
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.lex_ident_or_keyword(start, line, column));
        }

        self.lex_operator(start, line, column)
    }

    fn skip_trivia(&mut self) {
        loop {
            self.cursor.advance_while(|c| c.is_whitespace());
            if self.cursor.current_char() == '/' && self.cursor.peek() == '/' {
                self.cursor.advance_while(|c| c != '\n');
                continue;
            }
            break;
        }
    }

    fn span(&self, start: usize, line: u32, column: u32) -> Span {
        Span::new(start, self.cursor.position(), line, column)
    }

    fn lex_number(&mut self, start: usize, line: u32, column: u32) -> Token {
        self.cursor.advance_while(|c| c.is_ascii_digit());
        let text = self.cursor.slice(start);
        // Overflow beyond i32 wraps, matching the target ISA's 32-bit words
        // rather than failing compilation over a constant the hardware
        // would happily wrap at runtime.
        let value: i32 = text.parse().unwrap_or_else(|_| {
            text.parse::<i64>().map(|v| v as i32).unwrap_or(i32::MAX)
        });
        Token::new(TokenKind::IntLiteral(value), self.span(start, line, column))
    }

    fn lex_ident_or_keyword(&mut self, start: usize, line: u32, column: u32) -> Token {
        self.cursor
            .advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.cursor.slice(start);
        let kind = match text {
            "struct" => TokenKind::Struct,
            "fun" => TokenKind::Fun,
            "int" => TokenKind::Int,
            "bool" => TokenKind::Bool,
            "new" => TokenKind::New,
            "delete" => TokenKind::Delete,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "print" => TokenKind::Print,
            "println" => TokenKind::Println,
            "read" => TokenKind::Read,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => TokenKind::Ident(Symbol::intern(text)),
        };
        Token::new(kind, self.span(start, line, column))
    }

    fn lex_operator(&mut self, start: usize, line: u32, column: u32) -> Result<Token, LexError> {
        let c = self.cursor.advance();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '<' => self.one_or_two('=', TokenKind::Lt, TokenKind::Le),
            '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::Ge),
            '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::EqEq),
            '!' => self.one_or_two('=', TokenKind::Bang, TokenKind::NotEq),
            '&' if self.cursor.current_char() == '&' => {
                self.cursor.advance();
                TokenKind::AndAnd
            }
            '|' if self.cursor.current_char() == '|' => {
                self.cursor.advance();
                TokenKind::OrOr
            }
            found => {
                return Err(LexError::UnexpectedChar { found, line, column });
            }
        };
        Ok(Token::new(kind, self.span(start, line, column)))
    }

    /// Consume `extra` if present, yielding `two`; otherwise yield `one`.
    fn one_or_two(&mut self, extra: char, one: TokenKind, two: TokenKind) -> TokenKind {
        if self.cursor.current_char() == extra {
            self.cursor.advance();
            two
        } else {
            one
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let kinds = kinds("struct N fun main");
        assert_eq!(kinds[0], TokenKind::Struct);
        assert!(matches!(kinds[1], TokenKind::Ident(_)));
        assert_eq!(kinds[2], TokenKind::Fun);
        assert!(matches!(kinds[3], TokenKind::Ident(_)));
        assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);
    }

    #[test]
    fn lexes_integer_literal() {
        let kinds = kinds("42");
        assert_eq!(kinds[0], TokenKind::IntLiteral(42));
    }

    #[test]
    fn lexes_two_char_operators_greedily() {
        let kinds = kinds("<= >= == != && ||");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_single_and_double_char_variants() {
        assert_eq!(kinds("<")[0], TokenKind::Lt);
        assert_eq!(kinds("=")[0], TokenKind::Eq);
        assert_eq!(kinds("!")[0], TokenKind::Bang);
    }

    #[test]
    fn skips_line_comments_and_whitespace() {
        let kinds = kinds("int x; // trailing comment\n// own line\nint y;");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Ident(Symbol::intern("x")),
                TokenKind::Semi,
                TokenKind::Int,
                TokenKind::Ident(Symbol::intern("y")),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reports_unexpected_character() {
        let err = Lexer::new("int x @ 1;").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedChar { found: '@', .. }));
    }
}
