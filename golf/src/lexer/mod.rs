//! Lexer implementation using logos

mod token;

pub use token::{LexError, Token};

use crate::error::{GolfError, Result};
use crate::span::{Span, Spanned};
use logos::Logos;

/// Tokenize source bytes, stopping at the first bad lexeme
pub fn lex(source: &[u8]) -> std::result::Result<Vec<(Token, Span)>, Spanned<LexError>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(error) => return Err(Spanned::new(error, span)),
        }
    }

    Ok(tokens)
}

/// Tokenize source code, reporting failures as crate errors
pub fn tokenize(source: &[u8]) -> Result<Vec<(Token, Span)>> {
    lex(source).map_err(|e| GolfError::lexer(e.node, e.span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::Bigint;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source.as_bytes()).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize(b"").unwrap().is_empty());
        assert!(tokenize(b"  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_program() {
        assert_eq!(
            kinds("5 3 +"),
            vec![
                Token::Integer(Bigint::from(5)),
                Token::Integer(Bigint::from(3)),
                Token::Symbol
            ]
        );
    }

    #[test]
    fn test_tokenize_array_literal() {
        let tokens = kinds("[1 2 3][2 3 4]&");
        assert_eq!(tokens.len(), 11);
        assert_eq!(tokens[0], Token::Symbol);
        assert_eq!(tokens[10], Token::Symbol);
    }

    #[test]
    fn test_tokenize_spans() {
        let source = b"10 {.}do puts";
        let tokens = tokenize(source).unwrap();
        let texts: Vec<Vec<u8>> = tokens.iter().map(|(_, span)| span.text(source).to_vec()).collect();
        assert_eq!(texts, vec![b"10".to_vec(), b"{.}".to_vec(), b"do".to_vec(), b"puts".to_vec()]);
    }

    #[test]
    fn test_tokenize_adjacent_operators() {
        let source = b"1,{)}%";
        let tokens = tokenize(source).unwrap();
        let texts: Vec<Vec<u8>> = tokens.iter().map(|(_, span)| span.text(source).to_vec()).collect();
        assert_eq!(texts, vec![b"1".to_vec(), b",".to_vec(), b"{)}".to_vec(), b"%".to_vec()]);
    }

    #[test]
    fn test_tokenize_assignment() {
        assert_eq!(
            kinds("1:a a"),
            vec![Token::Integer(Bigint::one()), Token::Colon, Token::Ident, Token::Ident]
        );
    }

    #[test]
    fn test_tokenize_error_has_span() {
        let err = tokenize(b"1 {2 3").unwrap_err();
        match err {
            GolfError::Lexer { error, span } => {
                assert_eq!(error, LexError::UnterminatedBlock);
                assert_eq!(span, Span::new(2, 6));
            }
            other => panic!("expected lexer error, got {other:?}"),
        }
    }

    #[test]
    fn test_lex_stops_at_first_error() {
        let err = lex(b"\"\\x\" {").unwrap_err();
        assert_eq!(err.node, LexError::InvalidEscape);
        assert_eq!(err.span.start, 0);
    }

    #[test]
    fn test_tokenize_non_ascii_bytes_are_symbols() {
        let source = "1 é".as_bytes();
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].0, Token::Symbol);
        assert_eq!(tokens[1].1.text(source), &[0xc3u8]);
        assert_eq!(tokens[2].1.text(source), &[0xa9u8]);
    }

    #[test]
    fn test_tokenize_invalid_utf8() {
        let tokens = tokenize(b"\xff \"\xfe\"").unwrap();
        assert_eq!(tokens[0].0, Token::Symbol);
        assert_eq!(tokens[1].0, Token::Str(vec![0xfe]));
    }
}
