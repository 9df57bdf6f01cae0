use std::fmt;

use crate::tag::SIGIL;

const SEPARATORS: [char; 4] = [' ', '\t', '\r', '\n'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Raw tag literal, sigil included. Normalized by the parser.
    Tag(String),
    /// Anything that is neither a keyword, a paren nor a tag literal.
    Word(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Tag(s) | Token::Word(s) => write!(f, "{s}"),
            Token::Not => write!(f, "not"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// Split an expression into tokens.
///
/// The input is lower-cased and every paren is padded with spaces before
/// splitting on runs of space, tab, CR and LF, so keywords are
/// case-insensitive and no token straddles a paren. Other whitespace, such
/// as a no-break space, stays inside its token. Token content is not
/// validated here.
pub fn tokenize(input: &str) -> Vec<Token> {
    let spaced = input
        .to_lowercase()
        .replace('(', " ( ")
        .replace(')', " ) ");

    spaced
        .split(SEPARATORS)
        .filter(|word| !word.is_empty())
        .map(|word| match word {
            "(" => Token::LParen,
            ")" => Token::RParen,
            "not" => Token::Not,
            "and" => Token::And,
            "or" => Token::Or,
            _ if word.starts_with(SIGIL) => Token::Tag(word.to_string()),
            _ => Token::Word(word.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            tokenize("#A AND Not #b Or #C"),
            vec![
                Token::Tag("#a".into()),
                Token::And,
                Token::Not,
                Token::Tag("#b".into()),
                Token::Or,
                Token::Tag("#c".into()),
            ]
        );
    }

    #[test]
    fn test_parens_split_from_neighbours() {
        assert_eq!(
            tokenize("not(#a)and(#b)"),
            vec![
                Token::Not,
                Token::LParen,
                Token::Tag("#a".into()),
                Token::RParen,
                Token::And,
                Token::LParen,
                Token::Tag("#b".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_whitespace_runs() {
        assert_eq!(
            tokenize("  #a\t\n and\r\n#b  "),
            vec![Token::Tag("#a".into()), Token::And, Token::Tag("#b".into())]
        );
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_only_ascii_separators_split() {
        assert_eq!(
            tokenize("#a\u{a0}b and\u{2003}#c"),
            vec![
                Token::Tag("#a\u{a0}b".into()),
                Token::Word("and\u{2003}#c".into()),
            ]
        );
    }

    #[test]
    fn test_malformed_words_pass_through() {
        assert_eq!(
            tokenize("not-a-tag #"),
            vec![Token::Word("not-a-tag".into()), Token::Tag("#".into())]
        );
    }
}
