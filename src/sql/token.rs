// Filter expression tokens for lexical analysis

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Integer(String),
    Hex(String),
    Real(String),
    String(String),
    DateTime(String),
    Guid(String),
    /// `SOURCE:123`
    MeasurementKey(String),
    /// `"TAG"`
    PointTag(String),

    // Keywords
    Filter,
    Top,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Binary,
    And,
    Or,
    Not,
    In,
    Is,
    Null,
    Like,
    True,
    False,
    Xor,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    ShiftLeft,
    ShiftRight,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// `=` or `==`
    Equal,
    /// `===`
    ExactEqual,
    /// `<>` or `!=`
    NotEqual,
    /// `!==`
    ExactNotEqual,
    AndAnd,
    OrOr,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,
    Semicolon,

    // Special
    Eof,
}

impl Token {
    /// Convert a string to a keyword token if it matches
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "FILTER" => Some(Token::Filter),
            "TOP" => Some(Token::Top),
            "WHERE" => Some(Token::Where),
            "ORDER" => Some(Token::Order),
            "BY" => Some(Token::By),
            "ASC" => Some(Token::Asc),
            "DESC" => Some(Token::Desc),
            "BINARY" => Some(Token::Binary),
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "IN" => Some(Token::In),
            "IS" => Some(Token::Is),
            "NULL" => Some(Token::Null),
            "LIKE" => Some(Token::Like),
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),
            "XOR" => Some(Token::Xor),
            _ => None,
        }
    }

    /// Whether this token alone can form a literal-identifier statement
    pub fn is_identifier_literal(&self) -> bool {
        matches!(
            self,
            Token::Guid(_) | Token::MeasurementKey(_) | Token::PointTag(_)
        )
    }

    /// Whether this token ends a statement
    pub fn is_statement_end(&self) -> bool {
        matches!(self, Token::Semicolon | Token::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Integer(s) | Token::Hex(s) | Token::Real(s) => write!(f, "{}", s),
            Token::String(s) => write!(f, "'{}'", s),
            Token::DateTime(s) => write!(f, "#{}#", s),
            Token::Guid(s) => write!(f, "{{{}}}", s),
            Token::MeasurementKey(s) => write!(f, "{}", s),
            Token::PointTag(s) => write!(f, "\"{}\"", s),
            Token::Filter => write!(f, "FILTER"),
            Token::Top => write!(f, "TOP"),
            Token::Where => write!(f, "WHERE"),
            Token::Order => write!(f, "ORDER"),
            Token::By => write!(f, "BY"),
            Token::Asc => write!(f, "ASC"),
            Token::Desc => write!(f, "DESC"),
            Token::Binary => write!(f, "BINARY"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::In => write!(f, "IN"),
            Token::Is => write!(f, "IS"),
            Token::Null => write!(f, "NULL"),
            Token::Like => write!(f, "LIKE"),
            Token::True => write!(f, "TRUE"),
            Token::False => write!(f, "FALSE"),
            Token::Xor => write!(f, "XOR"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::ShiftLeft => write!(f, "<<"),
            Token::ShiftRight => write!(f, ">>"),
            Token::Ampersand => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::Tilde => write!(f, "~"),
            Token::Bang => write!(f, "!"),
            Token::Less => write!(f, "<"),
            Token::LessEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEqual => write!(f, ">="),
            Token::Equal => write!(f, "="),
            Token::ExactEqual => write!(f, "==="),
            Token::NotEqual => write!(f, "<>"),
            Token::ExactNotEqual => write!(f, "!=="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
