use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Location, Token, Type};

pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column_offset: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: vec!(),
            start: 0,
            current: 0,
            line: 1,
            column_offset: 0,
        }
    }

    /// Scans the source code and returns a vector of tokens.
    /// Scan errors are reported as they are encountered and scanning
    /// continues, so the stream is as complete as possible.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(
            Token::new(
                Type::EOF,
                String::from(""),
                None,
                Location::new(self.line, self.current - self.column_offset + 1)
            )
        );

        self.tokens.clone()
    }

    /// Returns the location of the current lexeme's first character.
    fn location(&self) -> Location {
        Location::new(self.line, self.start - self.column_offset + 1)
    }

    /// Returns the next character.
    fn advance(&mut self) -> char {
        match self.source.next() {
            Some(char) => {
                self.current += 1;
                char
            },
            None => panic!("tried to advance past end of the file."),
        }
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.source.peek().copied()
    }

    /// Returns the next next character without consuming it.
    fn peek_next(&mut self) -> Option<char> {
        self.source.peek_next().copied()
    }

    /// Returns if the next next character is the expected character.
    fn match_next(&mut self, expected: char) -> bool {
        self.peek_next() == Some(expected)
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, r#type: Type, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, lexeme, literal, self.location()));
    }

    /// Adds a new single char token to the list of tokens.
    fn add_single_char_token(&mut self, r#type: Type) {
        let c = self.advance();
        self.add_token(r#type, c.to_string(), None);
    }

    /// Adds a new double char token to the list of tokens.
    fn add_double_char_token(&mut self, r#type: Type) {
        let first = self.advance();
        let second = self.advance();

        self.add_token(r#type, format!("{first}{second}"), None);
    }

    /// Returns if the scanner has reached the end of the file.
    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    /// Handles a string literal. Strings may span lines; no escape
    /// sequences are processed, the characters are taken verbatim.
    fn string(&mut self) {
        let start = self.location();
        self.advance(); // Move past the starting double quotes.

        let mut value = Vec::new();
        while !self.is_at_end() {
            match self.source.next_if(|&x| x != '"') {
                Some(c) => {
                    self.current += 1;
                    value.push(c);

                    if c == '\n' {
                        self.line += 1;
                        self.column_offset = self.current;
                    }
                },
                None => { break; },
            }
        }

        if self.is_at_end() {
            ScanError {
                location: start,
                message: String::from("Unterminated string"),
            }.throw();
            return;
        }

        self.advance();  // Move to the closing double quotes.

        let value: String = value.into_iter().collect();

        // Literal does not include the double quotes unlike the lexeme.
        self.tokens.push(Token::new(
            Type::String,
            format!("\"{value}\""),
            Some(Literal::String(value)),
            start,
        ));
    }

    /// Handles a number literal. A leading or trailing dot is not part of
    /// the number, so `123.` scans as a number followed by a dot.
    fn number(&mut self) {
        let mut value = Vec::new();

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            value.push(self.advance());
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            value.push(self.advance());  // Consume the dot.

            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                value.push(self.advance());
            }
        }

        let value: String = value.into_iter().collect();
        let value_num: f64 = value.parse().expect("scanned number to parse as a float");

        self.add_token(Type::Number, value, Some(Literal::Number(value_num)));
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self) {
        let mut value = Vec::new();

        // is_alphanumeric does not include underscores.
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            value.push(self.advance());
        }

        let value = String::from_iter(value);
        let token_type = match value.as_str() {
            "and"      => Type::And,
            "class"    => Type::Class,
            "else"     => Type::Else,
            "false"    => Type::False,
            "for"      => Type::For,
            "fun"      => Type::Fun,
            "if"       => Type::If,
            "nil"      => Type::Nil,
            "or"       => Type::Or,
            "print"    => Type::Print,
            "return"   => Type::Return,
            "super"    => Type::Super,
            "this"     => Type::This,
            "true"     => Type::True,
            "var"      => Type::Var,
            "while"    => Type::While,
            _          => Type::Identifier,
        };

        self.add_token(token_type, value, None);
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let c = match self.peek() {
            Some(c) => c,
            None => return,
        };

        match c {
            // One character tokens
            '(' => self.add_single_char_token(Type::LeftParen),
            ')' => self.add_single_char_token(Type::RightParen),
            '{' => self.add_single_char_token(Type::LeftBrace),
            '}' => self.add_single_char_token(Type::RightBrace),
            ',' => self.add_single_char_token(Type::Comma),
            '.' => self.add_single_char_token(Type::Dot),
            '-' => self.add_single_char_token(Type::Minus),
            '+' => self.add_single_char_token(Type::Plus),
            ';' => self.add_single_char_token(Type::Semicolon),
            '*' => self.add_single_char_token(Type::Star),

            // Two character tokens
            '!' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::BangEqual);
                } else {
                    self.add_single_char_token(Type::Bang)
                };
            },
            '=' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::EqualEqual);
                } else {
                    self.add_single_char_token(Type::Equal)
                };
            },
            '<' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::LessEqual);
                } else {
                    self.add_single_char_token(Type::Less)
                };
            },
            '>' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::GreaterEqual);
                } else {
                    self.add_single_char_token(Type::Greater)
                };
            },
            '/' => {
                if self.match_next('/') {
                    // A comment runs until the end of the line.
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                } else {
                    self.add_single_char_token(Type::Slash);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {
                self.advance();
            },

            // Update line counter
            '\n' => {
                self.advance();

                self.line += 1;
                self.column_offset = self.current;
            },

            // String
            '"' => self.string(),

            // Numbers
            c if c.is_ascii_digit() => self.number(),

            // Identifiers
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.advance();

                ScanError {
                    location: self.location(),
                    message: format!("Unexpected character '{c}'"),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn types(source: &str) -> Vec<Type> {
        Scanner::new(source).scan_tokens().iter().map(|t| t.r#type).collect()
    }

    #[test]
    fn scan_punctuation() {
        assert_eq!(
            types("(){},.-+;/*"),
            vec![
                Type::LeftParen, Type::RightParen, Type::LeftBrace, Type::RightBrace,
                Type::Comma, Type::Dot, Type::Minus, Type::Plus, Type::Semicolon,
                Type::Slash, Type::Star, Type::EOF,
            ]
        );
    }

    #[test]
    fn scan_operators_maximal_munch() {
        assert_eq!(
            types("! != = == < <= > >="),
            vec![
                Type::Bang, Type::BangEqual, Type::Equal, Type::EqualEqual,
                Type::Less, Type::LessEqual, Type::Greater, Type::GreaterEqual,
                Type::EOF,
            ]
        );
    }

    #[test]
    fn scan_keywords_and_identifiers() {
        assert_eq!(
            types("and nil fun andy _under score42"),
            vec![
                Type::And, Type::Nil, Type::Fun,
                Type::Identifier, Type::Identifier, Type::Identifier,
                Type::EOF,
            ]
        );
    }

    #[test]
    fn scan_number_literal() {
        let tokens = Scanner::new("123.456").scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.456)));
        assert_eq!(tokens[0].lexeme, "123.456");
    }

    #[test]
    fn scan_trailing_dot_is_not_part_of_number() {
        assert_eq!(
            types("123."),
            vec![Type::Number, Type::Dot, Type::EOF]
        );
    }

    #[test]
    fn scan_string_literal_keeps_raw_characters() {
        let tokens = Scanner::new("\"a\\nb\"").scan_tokens();
        // No escape processing, the backslash and 'n' stay separate.
        assert_eq!(tokens[0].literal, Some(Literal::String(String::from("a\\nb"))));
    }

    #[test]
    fn scan_multiline_string_advances_line() {
        let tokens = Scanner::new("\"a\nb\" x").scan_tokens();
        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[1].location, Location::new(2, 4));
    }

    #[test]
    fn scan_comment_produces_no_token() {
        assert_eq!(
            types("// nothing here\n1"),
            vec![Type::Number, Type::EOF]
        );
    }

    #[test]
    fn lines_are_monotonic() {
        let tokens = Scanner::new("a\nb\n\nc d\ne").scan_tokens();
        let lines: Vec<usize> = tokens.iter().map(|t| t.location.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn lexemes_reassemble_source() {
        let source = "var a = 1 ; print a + 2 ;";
        let tokens = Scanner::new(source).scan_tokens();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes.join(" "), format!("{source} "));
    }
}
