//! Tokenizer for filter expressions

use std::fmt;

use crate::application::expression::error::{ExpressionError, ExpressionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Dot,
    Comma,
    LParen,
    RParen,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "name `{name}`"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Int(i) => write!(f, "number {i}"),
            Token::True => f.write_str("`True`"),
            Token::False => f.write_str("`False`"),
            Token::None => f.write_str("`None`"),
            Token::And => f.write_str("`and`"),
            Token::Or => f.write_str("`or`"),
            Token::Not => f.write_str("`not`"),
            Token::In => f.write_str("`in`"),
            Token::Dot => f.write_str("`.`"),
            Token::Comma => f.write_str("`,`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::Eq => f.write_str("`==`"),
            Token::Ne => f.write_str("`!=`"),
            Token::Lt => f.write_str("`<`"),
            Token::Le => f.write_str("`<=`"),
            Token::Gt => f.write_str("`>`"),
            Token::Ge => f.write_str("`>=`"),
            Token::Eof => f.write_str("end of expression"),
        }
    }
}

/// Token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Splits `source` into tokens, always terminated by [`Token::Eof`].
pub fn tokenize(source: &str) -> ExpressionResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    let syntax = |position: usize, message: String| ExpressionError::Syntax {
        expression: source.to_string(),
        position,
        message,
    };

    while let Some(&(pos, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '.' => {
                chars.next();
                Token::Dot
            }
            ',' => {
                chars.next();
                Token::Comma
            }
            '(' => {
                chars.next();
                Token::LParen
            }
            ')' => {
                chars.next();
                Token::RParen
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = chars.next_if(|&(_, n)| n == '=').is_some();
                match (c, followed_by_eq) {
                    ('=', true) => Token::Eq,
                    ('!', true) => Token::Ne,
                    ('<', true) => Token::Le,
                    ('<', false) => Token::Lt,
                    ('>', true) => Token::Ge,
                    ('>', false) => Token::Gt,
                    _ => return Err(syntax(pos, format!("unexpected character {c:?}"))),
                }
            }
            '\'' | '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, esc @ ('\\' | '\'' | '"'))) => value.push(esc),
                            Some((esc_pos, other)) => {
                                return Err(syntax(
                                    esc_pos,
                                    format!("unsupported escape sequence \\{other}"),
                                ))
                            }
                            None => break,
                        },
                        ch => value.push(ch),
                    }
                }
                if !closed {
                    return Err(syntax(pos, "unterminated string literal".to_string()));
                }
                Token::Str(value)
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some((_, d)) = chars.next_if(|&(_, d)| d.is_ascii_digit() || d == '_') {
                    if d != '_' {
                        digits.push(d);
                    }
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|e| syntax(pos, format!("invalid number: {e}")))?;
                Token::Int(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some((_, ch)) = chars.next_if(|&(_, ch)| ch.is_alphanumeric() || ch == '_')
                {
                    ident.push(ch);
                }
                keyword(&ident).unwrap_or(Token::Ident(ident))
            }
            other => return Err(syntax(pos, format!("unexpected character {other:?}"))),
        };
        tokens.push(Spanned {
            token,
            position: pos,
        });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        position: source.len(),
    });
    Ok(tokens)
}

fn keyword(ident: &str) -> Option<Token> {
    let token = match ident {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "True" => Token::True,
        "False" => Token::False,
        "None" => Token::None,
        _ => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn given_default_policy_expression_when_tokenizing_then_yields_expected_tokens() {
        assert_eq!(
            kinds("not name.startswith('_') and default()"),
            vec![
                Token::Not,
                Token::Ident("name".into()),
                Token::Dot,
                Token::Ident("startswith".into()),
                Token::LParen,
                Token::Str("_".into()),
                Token::RParen,
                Token::And,
                Token::Ident("default".into()),
                Token::LParen,
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn given_operators_when_tokenizing_then_distinguishes_two_char_forms() {
        assert_eq!(
            kinds("== != < <= > >="),
            vec![
                Token::Eq,
                Token::Ne,
                Token::Lt,
                Token::Le,
                Token::Gt,
                Token::Ge,
                Token::Eof
            ]
        );
    }

    #[test]
    fn given_escapes_when_tokenizing_then_unescapes_string() {
        assert_eq!(
            kinds(r#""a\"b" 'c\'d' 1_000"#),
            vec![
                Token::Str("a\"b".into()),
                Token::Str("c'd".into()),
                Token::Int(1000),
                Token::Eof
            ]
        );
    }

    #[test]
    fn given_unterminated_string_when_tokenizing_then_reports_position() {
        let err = tokenize("name == 'abc").unwrap_err();
        assert!(matches!(err, ExpressionError::Syntax { position: 8, .. }));
    }

    #[test]
    fn given_unknown_character_when_tokenizing_then_fails() {
        let err = tokenize("name + 1").unwrap_err();
        assert!(matches!(err, ExpressionError::Syntax { position: 5, .. }));
        assert_eq!(err.expression(), "name + 1");
    }

    #[test]
    fn given_single_equals_when_tokenizing_then_fails() {
        assert!(tokenize("name = 'x'").is_err());
    }
}
