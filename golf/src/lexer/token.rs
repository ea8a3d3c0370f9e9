//! Token definitions

use logos::{Lexer, Logos};
use thiserror::Error;

use crate::bigint::Bigint;

/// Why a lexeme could not be read
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub enum LexError {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,

    #[error("unmatched '\"' in string literal")]
    UnterminatedString,

    #[error("unmatched \"'\" in raw string literal")]
    UnterminatedRawString,

    #[error("unmatched '{{' in block")]
    UnterminatedBlock,

    #[error("hex escape needs at least one hex digit")]
    InvalidEscape,

    #[error("invalid integer literal")]
    InvalidInteger,
}

impl LexError {
    /// Whether the error is a delimiter left open at end of input
    pub fn is_unmatched_delimiter(&self) -> bool {
        matches!(
            self,
            Self::UnterminatedString | Self::UnterminatedRawString | Self::UnterminatedBlock
        )
    }
}

/// Golf token
///
/// Identifiers and symbols carry no payload: dispatch reads their text
/// from the token's span.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(source = [u8])]
#[logos(error = LexError)]
#[logos(skip br"[ \t\r\n\f]+")]
#[logos(skip br"#[^\n]*")]
pub enum Token {
    #[regex(br"-?[0-9]+", lex_integer, priority = 3)]
    Integer(Bigint),

    #[regex(br"[A-Za-z_][A-Za-z0-9_]*", priority = 3)]
    Ident,

    /// `"..."` with escapes, or `'...'` raw
    #[token(b"\"", lex_string)]
    #[token(b"'", lex_raw_string)]
    Str(Vec<u8>),

    /// `{...}`, contents kept verbatim
    #[token(b"{", lex_block)]
    Block(Vec<u8>),

    /// Assignment sigil
    #[token(b":")]
    Colon,

    /// Any other single byte
    #[regex(br"[^ \t\r\n\f]", priority = 1)]
    Symbol,
}

impl Token {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Integer(_) => "integer",
            Token::Ident => "identifier",
            Token::Str(_) => "string",
            Token::Block(_) => "block",
            Token::Colon => "colon",
            Token::Symbol => "symbol",
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{n}"),
            Token::Str(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Token::Block(bytes) => write!(f, "{{{}}}", String::from_utf8_lossy(bytes)),
            other => f.write_str(other.kind_name()),
        }
    }
}

fn lex_integer(lex: &mut Lexer<Token>) -> Result<Bigint, LexError> {
    std::str::from_utf8(lex.slice())
        .ok()
        .and_then(|digits| digits.parse().ok())
        .ok_or(LexError::InvalidInteger)
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn escaped(c: u8) -> u8 {
    match c {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'0' => 0,
        b'a' => 0x07,
        b'b' => 0x08,
        b'e' => 0x1b,
        b'f' => 0x0c,
        b'v' => 0x0b,
        other => other,
    }
}

/// Body of a `"` string, after the opening quote
fn lex_string(lex: &mut Lexer<Token>) -> Result<Vec<u8>, LexError> {
    let rest = lex.remainder();
    let mut out = Vec::new();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'"' => {
                lex.bump(i + 1);
                return Ok(out);
            }
            b'\\' if i + 1 < rest.len() => {
                let c = rest[i + 1];
                i += 2;
                if c != b'x' {
                    out.push(escaped(c));
                    continue;
                }
                let mut value = 0u8;
                let mut count = 0;
                while count < 2 {
                    match rest.get(i).copied().and_then(hex_value) {
                        Some(digit) => {
                            value = value * 16 + digit;
                            i += 1;
                            count += 1;
                        }
                        None => break,
                    }
                }
                if count == 0 {
                    lex.bump(i);
                    return Err(LexError::InvalidEscape);
                }
                out.push(value);
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    lex.bump(rest.len());
    Err(LexError::UnterminatedString)
}

/// Body of a `'` string; only `\'` and `\\` are escapes
fn lex_raw_string(lex: &mut Lexer<Token>) -> Result<Vec<u8>, LexError> {
    let rest = lex.remainder();
    let mut out = Vec::new();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\'' => {
                lex.bump(i + 1);
                return Ok(out);
            }
            b'\\' if matches!(rest.get(i + 1), Some(b'\'' | b'\\')) => {
                out.push(rest[i + 1]);
                i += 2;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    lex.bump(rest.len());
    Err(LexError::UnterminatedRawString)
}

/// Balanced brace scan; the contents are not interpreted
fn lex_block(lex: &mut Lexer<Token>) -> Result<Vec<u8>, LexError> {
    let rest = lex.remainder();
    let mut depth = 1usize;
    for (i, &b) in rest.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let body = rest[..i].to_vec();
                    lex.bump(i + 1);
                    return Ok(body);
                }
            }
            _ => {}
        }
    }
    lex.bump(rest.len());
    Err(LexError::UnterminatedBlock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Result<Token, LexError>> {
        Token::lexer(source.as_bytes()).collect()
    }

    fn single(source: &str) -> Token {
        let mut tokens = lex_all(source);
        assert_eq!(tokens.len(), 1, "expected one token in {source:?}");
        tokens.remove(0).unwrap()
    }

    #[test]
    fn test_lex_integers() {
        assert_eq!(single("42"), Token::Integer(Bigint::from(42)));
        assert_eq!(single("-7"), Token::Integer(Bigint::from(-7)));
        assert_eq!(
            single("123456789012345678901234567890").to_string(),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn test_lex_minus_alone_is_symbol() {
        assert_eq!(single("-"), Token::Symbol);
    }

    #[test]
    fn test_lex_minus_binds_to_following_digits() {
        let tokens: Vec<Token> = lex_all("1-1").into_iter().map(Result::unwrap).collect();
        assert_eq!(
            tokens,
            vec![Token::Integer(Bigint::one()), Token::Integer(Bigint::from(-1))]
        );
    }

    #[test]
    fn test_lex_identifiers() {
        assert_eq!(single("puts"), Token::Ident);
        assert_eq!(single("_x9"), Token::Ident);
        assert_eq!(single("a"), Token::Ident);
    }

    #[test]
    fn test_lex_string_escapes() {
        assert_eq!(single(r#""a\nb""#), Token::Str(b"a\nb".to_vec()));
        assert_eq!(single(r#""q\"q""#), Token::Str(b"q\"q".to_vec()));
        assert_eq!(single(r#""\\""#), Token::Str(b"\\".to_vec()));
        assert_eq!(single(r#""\e\0""#), Token::Str(vec![0x1b, 0]));
        assert_eq!(single(r#""\z""#), Token::Str(b"z".to_vec()));
    }

    #[test]
    fn test_lex_hex_escapes() {
        assert_eq!(single(r#""\x41""#), Token::Str(b"A".to_vec()));
        assert_eq!(single(r#""\x9z""#), Token::Str(vec![9, b'z']));
        assert_eq!(single(r#""\x414""#), Token::Str(b"A4".to_vec()));
    }

    #[test]
    fn test_lex_invalid_hex_escape() {
        assert_eq!(lex_all(r#""\xg""#)[0], Err(LexError::InvalidEscape));
    }

    #[test]
    fn test_lex_raw_string() {
        assert_eq!(single(r"'a\nb'"), Token::Str(br"a\nb".to_vec()));
        assert_eq!(single(r"'it\'s'"), Token::Str(b"it's".to_vec()));
        assert_eq!(single(r"'\\'"), Token::Str(b"\\".to_vec()));
    }

    #[test]
    fn test_lex_unterminated_strings() {
        assert_eq!(lex_all("\"abc")[0], Err(LexError::UnterminatedString));
        assert_eq!(lex_all("'abc")[0], Err(LexError::UnterminatedRawString));
        assert_eq!(lex_all("\"ab\\")[0], Err(LexError::UnterminatedString));
    }

    #[test]
    fn test_lex_block_is_balanced() {
        assert_eq!(single("{1{2}3}"), Token::Block(b"1{2}3".to_vec()));
        assert_eq!(single("{}"), Token::Block(Vec::new()));
    }

    #[test]
    fn test_lex_block_contents_not_interpreted() {
        assert_eq!(single("{\"x}"), Token::Block(b"\"x".to_vec()));
    }

    #[test]
    fn test_lex_unterminated_block() {
        assert_eq!(lex_all("{1 2")[0], Err(LexError::UnterminatedBlock));
        assert_eq!(lex_all("{{}")[0], Err(LexError::UnterminatedBlock));
    }

    #[test]
    fn test_lex_symbols_and_colon() {
        let tokens: Vec<Token> = lex_all(":x.+").into_iter().map(Result::unwrap).collect();
        assert_eq!(tokens, vec![Token::Colon, Token::Ident, Token::Symbol, Token::Symbol]);
    }

    #[test]
    fn test_lex_comment_and_whitespace_skipped() {
        let tokens: Vec<Token> = lex_all("1 # two\n\t3").into_iter().map(Result::unwrap).collect();
        assert_eq!(
            tokens,
            vec![Token::Integer(Bigint::one()), Token::Integer(Bigint::from(3))]
        );
        assert!(lex_all("#").is_empty());
    }

    #[test]
    fn test_lex_arbitrary_bytes() {
        let tokens: Vec<_> = Token::lexer(b"\"\xff\x80\" \xfe").collect();
        assert_eq!(
            tokens,
            vec![Ok(Token::Str(vec![0xff, 0x80])), Ok(Token::Symbol)]
        );
        let tokens: Vec<_> = Token::lexer(b"{\xc3}# \xff\n1").collect();
        assert_eq!(
            tokens,
            vec![Ok(Token::Block(vec![0xc3])), Ok(Token::Integer(Bigint::one()))]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Integer(Bigint::from(-3)).to_string(), "-3");
        assert_eq!(Token::Block(b"1+".to_vec()).to_string(), "{1+}");
        assert_eq!(Token::Str(b"hi".to_vec()).to_string(), "\"hi\"");
        assert_eq!(Token::Ident.to_string(), "identifier");
    }

    #[test]
    fn test_unmatched_delimiter_classification() {
        assert!(LexError::UnterminatedBlock.is_unmatched_delimiter());
        assert!(!LexError::InvalidEscape.is_unmatched_delimiter());
    }
}
