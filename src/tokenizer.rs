use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Colon,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Equal,
    EqualEqual,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier(String),
    String(String),
    Number(f64),

    // Keywords
    And,
    Else,
    False,
    For,
    Fun,
    If,
    Let,
    Not,
    Null,
    Or,
    Print,
    Return,
    True,
    While,

    // End of file
    Eof,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::LeftBracket => write!(f, "["),
            TokenType::RightBracket => write!(f, "]"),
            TokenType::Comma => write!(f, ","),
            TokenType::Dot => write!(f, "."),
            TokenType::Colon => write!(f, ":"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Plus => write!(f, "+"),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::Slash => write!(f, "/"),
            TokenType::Star => write!(f, "*"),
            TokenType::Equal => write!(f, "="),
            TokenType::EqualEqual => write!(f, "=="),
            TokenType::BangEqual => write!(f, "!="),
            TokenType::Greater => write!(f, ">"),
            TokenType::GreaterEqual => write!(f, ">="),
            TokenType::Less => write!(f, "<"),
            TokenType::LessEqual => write!(f, "<="),
            TokenType::Identifier(name) => write!(f, "{}", name),
            TokenType::String(s) => write!(f, "\"{}\"", s),
            TokenType::Number(n) => write!(f, "{}", n),
            TokenType::And => write!(f, "and"),
            TokenType::Else => write!(f, "else"),
            TokenType::False => write!(f, "false"),
            TokenType::For => write!(f, "for"),
            TokenType::Fun => write!(f, "fun"),
            TokenType::If => write!(f, "if"),
            TokenType::Let => write!(f, "let"),
            TokenType::Not => write!(f, "not"),
            TokenType::Null => write!(f, "null"),
            TokenType::Or => write!(f, "or"),
            TokenType::Print => write!(f, "print"),
            TokenType::Return => write!(f, "return"),
            TokenType::True => write!(f, "true"),
            TokenType::While => write!(f, "while"),
            TokenType::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: Span,
}

impl Token {
    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("Unexpected character '{character}' at {line},{column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string starting at {line},{column}")]
    UnterminatedString { line: usize, column: usize },
}

pub fn tokens(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut remaining = source;
    let mut line = 1;
    let mut column = 1;

    loop {
        while let Some(((), rest)) = maximal(&[whitespace, comment], remaining) {
            advance_position(
                &remaining[..remaining.len() - rest.len()],
                &mut line,
                &mut column,
            );
            remaining = rest;
        }

        if remaining.is_empty() {
            tokens.push(Token {
                token_type: TokenType::Eof,
                span: Span {
                    start_line: line,
                    start_column: column,
                    end_line: line,
                    end_column: column,
                },
            });
            return Ok(tokens);
        }

        let Some((token_type, rest)) = maximal(
            &[
                // Single-character tokens
                left_paren,
                right_paren,
                left_brace,
                right_brace,
                left_bracket,
                right_bracket,
                comma,
                dot,
                colon,
                minus,
                plus,
                semicolon,
                slash,
                star,
                // One or two character tokens
                equal,
                equal_equal,
                bang_equal,
                greater,
                greater_equal,
                less,
                less_equal,
                // Keywords
                and,
                else_,
                false_,
                for_,
                fun,
                if_,
                let_,
                not,
                null,
                or,
                print_,
                return_,
                true_,
                while_,
                // Literals
                identifier,
                string,
                number,
            ],
            remaining,
        ) else {
            if remaining.starts_with('"') {
                return Err(TokenizeError::UnterminatedString { line, column });
            }
            return Err(TokenizeError::UnexpectedCharacter {
                character: remaining.chars().next().unwrap(),
                line,
                column,
            });
        };

        let start_line = line;
        let start_column = column;
        advance_position(
            &remaining[..remaining.len() - rest.len()],
            &mut line,
            &mut column,
        );
        tokens.push(Token {
            token_type,
            span: Span {
                start_line,
                start_column,
                end_line: line,
                end_column: column,
            },
        });
        remaining = rest;
    }
}

fn advance_position(consumed: &str, line: &mut usize, column: &mut usize) {
    for c in consumed.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

fn maximal<'a, T: std::fmt::Debug>(
    parsers: &[fn(&str) -> Option<(T, &str)>],
    source: &'a str,
) -> Option<(T, &'a str)> {
    let mut min_left = source.len() + 1;
    let mut max_match = None;

    let matching_parsers = parsers.iter().filter_map(|parser| parser(source));
    for (m, rest) in matching_parsers {
        let left = rest.len();
        if left < min_left {
            min_left = left;
            max_match = Some((m, rest));
        }
    }

    max_match
}

fn whitespace(source: &str) -> Option<((), &str)> {
    let len = source
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    if len > 0 {
        Some(((), &source[len..]))
    } else {
        None
    }
}

fn comment(source: &str) -> Option<((), &str)> {
    if source.starts_with("//") {
        let len = source
            .chars()
            .take_while(|c| *c != '\n')
            .map(char::len_utf8)
            .sum();
        Some(((), &source[len..]))
    } else {
        None
    }
}

macro_rules! match_literal {
    ($name:ident, $word:literal, $token:expr) => {
        fn $name(source: &str) -> Option<(TokenType, &str)> {
            if source.starts_with($word) {
                Some(($token, &source[$word.len()..]))
            } else {
                None
            }
        }
    };
}

match_literal! { left_paren, "(", TokenType::LeftParen }
match_literal! { right_paren, ")", TokenType::RightParen }
match_literal! { left_brace, "{", TokenType::LeftBrace }
match_literal! { right_brace, "}", TokenType::RightBrace }
match_literal! { left_bracket, "[", TokenType::LeftBracket }
match_literal! { right_bracket, "]", TokenType::RightBracket }
match_literal! { comma, ",", TokenType::Comma }
match_literal! { dot, ".", TokenType::Dot }
match_literal! { colon, ":", TokenType::Colon }
match_literal! { minus, "-", TokenType::Minus }
match_literal! { plus, "+", TokenType::Plus }
match_literal! { semicolon, ";", TokenType::Semicolon }
match_literal! { slash, "/", TokenType::Slash }
match_literal! { star, "*", TokenType::Star }
match_literal! { equal, "=", TokenType::Equal }
match_literal! { equal_equal, "==", TokenType::EqualEqual }
match_literal! { bang_equal, "!=", TokenType::BangEqual }
match_literal! { greater, ">", TokenType::Greater }
match_literal! { greater_equal, ">=", TokenType::GreaterEqual }
match_literal! { less, "<", TokenType::Less }
match_literal! { less_equal, "<=", TokenType::LessEqual }
match_literal! { and, "and", TokenType::And }
match_literal! { else_, "else", TokenType::Else }
match_literal! { false_, "false", TokenType::False }
match_literal! { for_, "for", TokenType::For }
match_literal! { fun, "fun", TokenType::Fun }
match_literal! { if_, "if", TokenType::If }
match_literal! { let_, "let", TokenType::Let }
match_literal! { not, "not", TokenType::Not }
match_literal! { null, "null", TokenType::Null }
match_literal! { or, "or", TokenType::Or }
match_literal! { print_, "print", TokenType::Print }
match_literal! { return_, "return", TokenType::Return }
match_literal! { true_, "true", TokenType::True }
match_literal! { while_, "while", TokenType::While }

fn identifier(source: &str) -> Option<(TokenType, &str)> {
    let mut chars = source.chars();

    let first = chars.next()?;
    if !first.is_ascii_alphabetic() && first != '_' {
        return None;
    }

    let len = first.len_utf8()
        + chars
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum::<usize>();

    Some((
        TokenType::Identifier(source[..len].to_string()),
        &source[len..],
    ))
}

fn string(source: &str) -> Option<(TokenType, &str)> {
    if !source.starts_with('"') {
        return None;
    }

    let mut len = 1;
    for c in source.chars().skip(1) {
        len += c.len_utf8();
        if c == '"' {
            return Some((
                TokenType::String(source[1..len - 1].to_string()),
                &source[len..],
            ));
        }
    }
    None
}

fn number(source: &str) -> Option<(TokenType, &str)> {
    let digits = |s: &str| s.chars().take_while(char::is_ascii_digit).count();

    let integer = digits(source);
    if integer == 0 {
        return None;
    }

    // A trailing '.' without digits belongs to property access, not the number.
    let mut len = integer;
    let rest = &source[integer..];
    if rest.starts_with('.') {
        let fraction = digits(&rest[1..]);
        if fraction > 0 {
            len += 1 + fraction;
        }
    }

    Some((
        TokenType::Number(source[..len].parse().ok()?),
        &source[len..],
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    fn token_types(source: &str) -> Vec<TokenType> {
        tokens(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_tokens() {
        let source = "let x = 1;";
        let expected = vec![
            TokenType::Let,
            TokenType::Identifier("x".to_string()),
            TokenType::Equal,
            TokenType::Number(1.0),
            TokenType::Semicolon,
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_tokens_with_comments() {
        let source = "let x = 1; // comment";
        let expected = vec![
            TokenType::Let,
            TokenType::Identifier("x".to_string()),
            TokenType::Equal,
            TokenType::Number(1.0),
            TokenType::Semicolon,
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_tokens_with_string() {
        let source = "let x = \"hello\";";
        let expected = vec![
            TokenType::Let,
            TokenType::Identifier("x".to_string()),
            TokenType::Equal,
            TokenType::String("hello".to_string()),
            TokenType::Semicolon,
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let source = "letter";
        let expected = vec![
            TokenType::Identifier("letter".to_string()),
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_number_then_property() {
        let source = "1.5 a.b";
        let expected = vec![
            TokenType::Number(1.5),
            TokenType::Identifier("a".to_string()),
            TokenType::Dot,
            TokenType::Identifier("b".to_string()),
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_brackets_and_braces() {
        let source = "[1, 2] {a: 3}";
        let expected = vec![
            TokenType::LeftBracket,
            TokenType::Number(1.0),
            TokenType::Comma,
            TokenType::Number(2.0),
            TokenType::RightBracket,
            TokenType::LeftBrace,
            TokenType::Identifier("a".to_string()),
            TokenType::Colon,
            TokenType::Number(3.0),
            TokenType::RightBrace,
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_double_equal() {
        let source = "a==b";
        let expected = vec![
            TokenType::Identifier("a".to_string()),
            TokenType::EqualEqual,
            TokenType::Identifier("b".to_string()),
            TokenType::Eof,
        ];
        assert_eq!(token_types(source), expected);
    }

    #[test]
    fn test_spans_track_lines() {
        let source = "let x;\nx = 1;";
        let tokens = tokens(source).unwrap();
        assert_eq!(tokens[0].span.start_line, 1);
        assert_eq!(tokens[0].span.start_column, 1);
        let x = &tokens[3];
        assert_eq!(x.token_type, TokenType::Identifier("x".to_string()));
        assert_eq!(x.span.start_line, 2);
        assert_eq!(x.span.start_column, 1);
    }

    #[test]
    fn test_unterminated_string() {
        let source = "let x = \"oops";
        assert!(matches!(
            tokens(source),
            Err(TokenizeError::UnterminatedString { line: 1, column: 9 })
        ));
    }

    #[test]
    fn test_unexpected_character() {
        let source = "let x = 1 ! 2;";
        assert!(matches!(
            tokens(source),
            Err(TokenizeError::UnexpectedCharacter { character: '!', .. })
        ));
    }
}
