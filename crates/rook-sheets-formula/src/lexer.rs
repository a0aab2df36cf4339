//! Formula tokenizer
//!
//! Converts a formula body (without the leading `=`) into a flat token
//! stream. Tokenizing never fails: characters that start no token are
//! silently skipped, which is long-standing engine behavior that callers
//! depend on.

use lazy_regex::regex_is_match;

/// Tokens produced by [`tokenize`]
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Str(String),

    // References (text is uppercase-normalized)
    CellRef(String),
    /// Greedy `A1:B2` form; only the single two-corner shape, never a list
    RangeRef(String, String),

    /// Identifier that is not a reference or boolean
    FuncName(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Ampersand,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Delimiters
    LParen,
    RParen,
    Comma,
    Colon,

    // End of input
    Eof,
}

/// Tokenize a formula body
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut tokens = Vec::new();

    loop {
        lexer.skip_whitespace();
        let c = match lexer.peek_char() {
            Some(c) => c,
            None => break,
        };

        match c {
            '"' => tokens.push(lexer.scan_string()),
            '0'..='9' => tokens.push(lexer.scan_number()),
            '<' => {
                lexer.advance();
                if lexer.peek_char() == Some('=') {
                    lexer.advance();
                    tokens.push(Token::LessEqual);
                } else if lexer.peek_char() == Some('>') {
                    lexer.advance();
                    tokens.push(Token::NotEqual);
                } else {
                    tokens.push(Token::LessThan);
                }
            }
            '>' => {
                lexer.advance();
                if lexer.peek_char() == Some('=') {
                    lexer.advance();
                    tokens.push(Token::GreaterEqual);
                } else {
                    tokens.push(Token::GreaterThan);
                }
            }
            '=' => {
                lexer.advance();
                tokens.push(Token::Equal);
            }
            '&' => {
                lexer.advance();
                tokens.push(Token::Ampersand);
            }
            '+' => {
                lexer.advance();
                tokens.push(Token::Plus);
            }
            '-' => {
                lexer.advance();
                tokens.push(Token::Minus);
            }
            '*' => {
                lexer.advance();
                tokens.push(Token::Star);
            }
            '/' => {
                lexer.advance();
                tokens.push(Token::Slash);
            }
            '^' => {
                lexer.advance();
                tokens.push(Token::Caret);
            }
            '(' => {
                lexer.advance();
                tokens.push(Token::LParen);
            }
            ')' => {
                lexer.advance();
                tokens.push(Token::RParen);
            }
            ',' => {
                lexer.advance();
                tokens.push(Token::Comma);
            }
            ':' => {
                lexer.advance();
                tokens.push(Token::Colon);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                tokens.push(lexer.scan_identifier());
            }
            _ => {
                // Unrecognized character: skipped without a token or an error
                lexer.advance();
            }
        }
    }

    tokens.push(Token::Eof);
    tokens
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    /// Scan a double-quoted string literal
    ///
    /// Backslash escapes the next character (the backslash is dropped, the
    /// escaped character kept literally). An unterminated literal runs to the
    /// end of input.
    fn scan_string(&mut self) -> Token {
        self.advance(); // opening quote

        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    self.advance();
                    break;
                }
                '\\' => {
                    self.advance();
                    if let Some(escaped) = self.peek_char() {
                        s.push(escaped);
                        self.advance();
                    }
                }
                _ => {
                    s.push(c);
                    self.advance();
                }
            }
        }

        Token::Str(s)
    }

    /// Scan a numeric literal: digits with one optional fraction part.
    /// No exponent notation; a leading sign is the parser's unary rule.
    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num: f64 = self.input[start..self.pos].parse().unwrap_or(0.0);
        Token::Number(num)
    }

    /// Scan an identifier run and classify it: cell reference, range
    /// reference (greedy `A1:B2` lookahead), TRUE/FALSE, or function name.
    fn scan_identifier(&mut self) -> Token {
        let text = self.scan_ident_run();
        let upper = text.to_uppercase();

        if is_cell_pattern(&upper) {
            if self.peek_char() == Some(':') {
                let save = self.pos;
                self.advance(); // ':'
                if self
                    .peek_char()
                    .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
                {
                    let second = self.scan_ident_run().to_uppercase();
                    if is_cell_pattern(&second) {
                        return Token::RangeRef(upper, second);
                    }
                }
                self.pos = save;
            }
            return Token::CellRef(upper);
        }

        match upper.as_str() {
            "TRUE" => Token::Number(1.0),
            "FALSE" => Token::Number(0.0),
            _ => Token::FuncName(text),
        }
    }

    fn scan_ident_run(&mut self) -> String {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }
}

/// Letters-then-digits shape of a cell reference, after uppercasing
fn is_cell_pattern(s: &str) -> bool {
    regex_is_match!(r"^[A-Z]+[0-9]+$", s)
}
