use super::error::ExprError;
use super::token::{Token, TokenKind};

/// Tokenizes a condition expression source string.
///
/// Whitespace is a separator only. A dotted identifier path (`a.b.c`) lexes
/// as a single [`TokenKind::Field`] token; `and`/`or`/`not` are recognized as
/// keywords only when the scanned identifier is exactly one of those words.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let offset = self.pos;
            let Some(ch) = self.peek_char() else {
                tokens.push(Token::new(TokenKind::Eof, offset));
                break;
            };

            let token = match ch {
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '\'' => self.lex_string()?,
                '0'..='9' => self.lex_number()?,
                c if c.is_ascii_alphabetic() => self.lex_identifier(),
                '=' if self.starts_with("==") => self.double(TokenKind::Eq),
                '!' if self.starts_with("!=") => self.double(TokenKind::Ne),
                '>' if self.starts_with(">=") => self.double(TokenKind::Ge),
                '<' if self.starts_with("<=") => self.double(TokenKind::Le),
                '>' => self.single(TokenKind::Gt),
                '<' => self.single(TokenKind::Lt),
                other => {
                    return Err(ExprError::BadCharacter {
                        offset,
                        ch: other,
                    })
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn remaining(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let offset = self.pos;
        self.pos += 1;
        Token::new(kind, offset)
    }

    fn double(&mut self, kind: TokenKind) -> Token {
        let offset = self.pos;
        self.pos += 2;
        Token::new(kind, offset)
    }

    fn lex_string(&mut self) -> Result<Token, ExprError> {
        let offset = self.pos;
        self.pos += 1; // consume opening '
        let start = self.pos;
        let end = self
            .remaining()
            .find('\'')
            .ok_or(ExprError::BadCharacter { offset, ch: '\'' })?;
        let value = self.src[start..start + end].to_string();
        self.pos = start + end + 1; // consume closing '
        Ok(Token::new(TokenKind::Str(value), offset))
    }

    fn lex_number(&mut self) -> Result<Token, ExprError> {
        let offset = self.pos;
        let start = self.pos;
        let mut saw_dot = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' && !saw_dot {
                saw_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        if saw_dot {
            text.parse::<f64>()
                .map(|n| Token::new(TokenKind::Real(n), offset))
                .map_err(|_| ExprError::InvalidNumber {
                    offset,
                    text: text.to_string(),
                })
        } else {
            text.parse::<i64>()
                .map(|n| Token::new(TokenKind::Int(n), offset))
                .map_err(|_| ExprError::InvalidNumber {
                    offset,
                    text: text.to_string(),
                })
        }
    }

    fn lex_identifier(&mut self) -> Token {
        let offset = self.pos;
        let start = self.pos;
        // First segment: letter followed by letters/digits/underscore.
        self.consume_segment();
        while self.peek_char() == Some('.') {
            self.pos += 1; // consume '.'
            self.consume_segment();
        }
        let text = &self.src[start..self.pos];
        let kind = match text {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => TokenKind::Field(text.to_string()),
        };
        Token::new(kind, offset)
    }

    fn consume_segment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
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
    fn lexes_dotted_field() {
        assert_eq!(
            kinds("qc.fundus_pass"),
            vec![TokenKind::Field("qc.fundus_pass".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_operators_greedily() {
        assert_eq!(
            kinds(">= > <= < == !="),
            vec![
                TokenKind::Ge,
                TokenKind::Gt,
                TokenKind::Le,
                TokenKind::Lt,
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_real_vs_int() {
        assert_eq!(
            kinds("0.70 70"),
            vec![TokenKind::Real(0.70), TokenKind::Int(70), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_keywords_not_fields() {
        assert_eq!(
            kinds("true and not false"),
            vec![
                TokenKind::True,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn rejects_bad_character() {
        assert!(matches!(
            Lexer::new("a == #").tokenize(),
            Err(ExprError::BadCharacter { ch: '#', .. })
        ));
    }

    #[test]
    fn lexes_quoted_string() {
        assert_eq!(
            kinds("'hello world'"),
            vec![TokenKind::Str("hello world".into()), TokenKind::Eof]
        );
    }
}
