// Filter expression lexer - tokenizes filter expression text

use super::token::Token;
use crate::error::{FilterError, Result};
use crate::types::coercion::parse_guid;

const GUID_LENGTH: usize = 36;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        if ch.is_ascii_hexdigit() && self.at_bare_guid() {
            return Ok(self.read_bare_guid());
        }

        let token = match ch {
            '+' => self.single(Token::Plus),
            '-' => {
                self.advance();
                // Check for comments
                if self.current_char == Some('-') {
                    self.skip_comment();
                    return self.next_token();
                }
                Token::Minus
            }
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '%' => self.single(Token::Percent),
            '^' => self.single(Token::Caret),
            '~' => self.single(Token::Tilde),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            ',' => self.single(Token::Comma),
            ';' => self.single(Token::Semicolon),
            '=' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        return Ok(Token::ExactEqual);
                    }
                }
                Token::Equal
            }
            '!' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        return Ok(Token::ExactNotEqual);
                    }
                    Token::NotEqual
                } else {
                    Token::Bang
                }
            }
            '<' => {
                self.advance();
                match self.current_char {
                    Some('=') => self.single(Token::LessEqual),
                    Some('>') => self.single(Token::NotEqual),
                    Some('<') => self.single(Token::ShiftLeft),
                    _ => Token::Less,
                }
            }
            '>' => {
                self.advance();
                match self.current_char {
                    Some('=') => self.single(Token::GreaterEqual),
                    Some('>') => self.single(Token::ShiftRight),
                    _ => Token::Greater,
                }
            }
            '&' => {
                self.advance();
                if self.current_char == Some('&') {
                    self.single(Token::AndAnd)
                } else {
                    Token::Ampersand
                }
            }
            '|' => {
                self.advance();
                if self.current_char == Some('|') {
                    self.single(Token::OrOr)
                } else {
                    Token::Pipe
                }
            }
            '\'' => self.read_string()?,
            '"' => Token::PointTag(self.read_delimited('"', "point tag")?),
            '#' => Token::DateTime(self.read_delimited('#', "date/time literal")?),
            '{' => Token::Guid(self.read_delimited_by('{', '}', "GUID literal")?),
            '.' if self.peek().map_or(false, |c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            c => {
                return Err(FilterError::syntax(format!(
                    "unexpected character '{}' at position {}",
                    c, self.position
                )))
            }
        };

        Ok(token)
    }

    /// Consume the current character and yield `token`
    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comments starting with --
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Whether an unbraced `8-4-4-4-12` GUID starts at the current position
    fn at_bare_guid(&self) -> bool {
        let end = self.position + GUID_LENGTH;
        if end > self.input.len() {
            return false;
        }

        let well_formed = self.input[self.position..end]
            .iter()
            .enumerate()
            .all(|(i, c)| match i {
                8 | 13 | 18 | 23 => *c == '-',
                _ => c.is_ascii_hexdigit(),
            });

        let delimited = self
            .input
            .get(end)
            .map_or(true, |c| !(c.is_alphanumeric() || *c == '_'));

        well_formed && delimited
    }

    fn read_bare_guid(&mut self) -> Token {
        let text: String = self.input[self.position..self.position + GUID_LENGTH]
            .iter()
            .collect();
        for _ in 0..GUID_LENGTH {
            self.advance();
        }
        Token::Guid(text)
    }

    /// Read an identifier, keyword or measurement key
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some(':') && self.peek().map_or(false, |c| c.is_ascii_digit()) {
            identifier.push(':');
            self.advance();
            while let Some(ch) = self.current_char.filter(|c| c.is_ascii_digit()) {
                identifier.push(ch);
                self.advance();
            }
            return Token::MeasurementKey(identifier);
        }

        // Check if it's a keyword
        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read text between a pair of identical delimiters
    fn read_delimited(&mut self, delimiter: char, what: &str) -> Result<String> {
        self.read_delimited_by(delimiter, delimiter, what)
    }

    fn read_delimited_by(&mut self, open: char, close: char, what: &str) -> Result<String> {
        let start = self.position;
        debug_assert_eq!(self.current_char, Some(open));
        self.advance(); // Skip opening delimiter

        let mut text = String::new();
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == close {
                return Ok(text);
            }
            text.push(ch);
        }

        Err(FilterError::syntax(format!(
            "unterminated {} starting at position {}",
            what, start
        )))
    }

    /// Read a string literal; a quoted GUID becomes a GUID token
    fn read_string(&mut self) -> Result<Token> {
        let start = self.position;
        self.advance(); // Skip opening quote
        let mut string = String::new();

        loop {
            match self.current_char {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        // Handle escaped single quotes
                        string.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance(); // Skip closing quote
                        break;
                    }
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
                None => {
                    return Err(FilterError::syntax(format!(
                        "unterminated string literal starting at position {}",
                        start
                    )))
                }
            }
        }

        if parse_guid(&string).is_some() {
            Ok(Token::Guid(string))
        } else {
            Ok(Token::String(string))
        }
    }

    fn read_digits(&mut self, number: &mut String, radix: u32) {
        while let Some(ch) = self.current_char.filter(|c| c.is_digit(radix)) {
            number.push(ch);
            self.advance();
        }
    }

    /// Read a number: integer, `0x` hex, or real with optional exponent
    fn read_number(&mut self) -> Token {
        let mut number = String::new();

        if self.current_char == Some('0')
            && matches!(self.peek(), Some('x') | Some('X'))
            && self
                .input
                .get(self.position + 2)
                .map_or(false, |c| c.is_ascii_hexdigit())
        {
            self.advance();
            self.advance();
            self.read_digits(&mut number, 16);
            return Token::Hex(number);
        }

        let mut real = false;
        self.read_digits(&mut number, 10);

        if self.current_char == Some('.') && self.peek().map_or(false, |c| c.is_ascii_digit()) {
            real = true;
            number.push('.');
            self.advance();
            self.read_digits(&mut number, 10);
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            let sign = matches!(self.peek(), Some('+') | Some('-'));
            let digit_at = self.position + if sign { 2 } else { 1 };
            if self
                .input
                .get(digit_at)
                .map_or(false, |c| c.is_ascii_digit())
            {
                real = true;
                number.push('e');
                self.advance();
                if sign {
                    if let Some(ch) = self.current_char {
                        number.push(ch);
                    }
                    self.advance();
                }
                self.read_digits(&mut number, 10);
            }
        }

        if real {
            Token::Real(number)
        } else {
            Token::Integer(number)
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}
