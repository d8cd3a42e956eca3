//! Formula tokenizer.
//!
//! Turns formula text (leading `=` already stripped) into a flat token list
//! terminated by [`Token::Eof`]. The lexer never fails: characters it does not
//! recognize are skipped and malformed input surfaces later as a parse error.

/// A lexical token. Atoms carry their literal text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(String),
    /// Alphabetic run with no trailing digits (a function name).
    Ident(String),
    /// Alphabetic run directly followed by digits, e.g. `A1`, `BC12`.
    CellRef(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Colon,
    Eof,
}

impl Token {
    /// The literal source text of the token.
    pub fn text(&self) -> &str {
        match self {
            Token::Number(s) | Token::Ident(s) | Token::CellRef(s) => s,
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Eof => "",
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn number(&mut self) -> Token {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Number(self.input[start..self.pos].to_string())
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_alphabetic());
        let digits = self.take_while(|c| c.is_ascii_digit());
        let text = self.input[start..self.pos].to_string();
        if digits.is_empty() {
            Token::Ident(text)
        } else {
            Token::CellRef(text)
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            let Some(c) = self.peek() else {
                return Token::Eof;
            };
            let single = match c {
                ' ' | '\t' | '\n' | '\r' => None,
                '+' => Some(Token::Plus),
                '-' => Some(Token::Minus),
                '*' => Some(Token::Star),
                '/' => Some(Token::Slash),
                '(' => Some(Token::LParen),
                ')' => Some(Token::RParen),
                ',' => Some(Token::Comma),
                ':' => Some(Token::Colon),
                c if c.is_ascii_digit() || c == '.' => return self.number(),
                c if c.is_ascii_alphabetic() => return self.word(),
                _ => None,
            };
            self.bump();
            if let Some(tok) = single {
                return tok;
            }
        }
    }
}

/// Tokenize formula text. The result always ends with [`Token::Eof`].
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        let done = tok == Token::Eof;
        tokens.push(tok);
        if done {
            return tokens;
        }
    }
}
