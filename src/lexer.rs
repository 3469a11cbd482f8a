use crate::errors::SyntaxError;
use crate::expression::Ref;
use crate::sourcecode::{Cursor, Position};

type Result<T> = std::result::Result<T, SyntaxError>;

const BLANK: &str = " \n\t\r\u{000C}";
const LEFT_PAREN: &str = "([";
const RIGHT_PAREN: &str = ")]";
const DECIMAL: &str = "0123456789";
const BINARY: &str = "01";
const OCTAL: &str = "01234567";
const HEXADECIMAL: &str = "0123456789abcdefABCDEF";
const NUMBER_PUNCT: &str = ".+-/i";
const SPECIAL: &str = "!@$%^&*_-+=:'/?.>,<";
const QUOTE_START: &str = "`'";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AtomKind {
    Number,
    String,
    Char,
    Boolean,
    Symbol,
    Dot,
    Sharp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuoteKind {
    List,
    Vector,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Atom {
        kind: AtomKind,
        text: String,
        pos: Position,
    },
    List {
        items: Vec<Token>,
        pos: Position,
    },
    Root {
        items: Vec<Token>,
    },
    Quote {
        kind: QuoteKind,
        inner: Box<Token>,
        pos: Position,
    },
}

impl Token {
    pub fn items(&self) -> &[Token] {
        match self {
            Token::List { items, .. } | Token::Root { items } => items,
            _ => &[],
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Atom { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_sharp(&self) -> bool {
        matches!(
            self,
            Token::Atom {
                kind: AtomKind::Sharp,
                ..
            }
        )
    }
}

/// Scan source text into a token tree.
pub fn scan(source: &str, name: Option<&str>) -> Result<Token> {
    Lexer::new(source, name).scan()
}

pub struct Lexer {
    chars: Vec<char>,
    name: Option<Ref<str>>,
    cursor: Cursor,
    round_level: usize,
    square_level: usize,
}

fn is_blank(ch: char) -> bool {
    BLANK.contains(ch)
}

fn is_splitter(ch: char) -> bool {
    is_blank(ch) || LEFT_PAREN.contains(ch) || RIGHT_PAREN.contains(ch)
}

fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || SPECIAL.contains(ch)
}

fn radix_digits(radix: u32) -> &'static str {
    match radix {
        2 => BINARY,
        8 => OCTAL,
        16 => HEXADECIMAL,
        _ => DECIMAL,
    }
}

impl Lexer {
    pub fn new(source: &str, name: Option<&str>) -> Self {
        Lexer {
            chars: source.chars().collect(),
            name: name.map(Ref::from),
            cursor: Cursor::start(),
            round_level: 0,
            square_level: 0,
        }
    }

    /// Consume the whole source and return the top-level token sequence.
    ///
    /// Round and square brackets are counted independently, so `(a]` closes
    /// without complaint as long as some `[` is open.
    pub fn scan(mut self) -> Result<Token> {
        let mut items = vec![];
        while self.has_next(0) {
            if let Some(token) = self.read_node()? {
                items.push(token);
            }
        }
        if self.round_level > 0 || self.square_level > 0 {
            return Err(SyntaxError::MissingRightParen { pos: self.pos() });
        }
        Ok(Token::Root { items })
    }

    fn pos(&self) -> Position {
        self.cursor.position(&self.name)
    }

    fn has_next(&self, ahead: usize) -> bool {
        self.cursor.index + ahead < self.chars.len()
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.cursor.index + ahead).copied()
    }

    fn forward(&mut self, count: usize) {
        for _ in 0..count {
            match self.peek(0) {
                Some(ch) => self.cursor.advance(ch),
                None => break,
            }
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end.min(self.chars.len())].iter().collect()
    }

    fn slice_to_splitter(&self, start: usize) -> String {
        let end = (self.cursor.index..self.chars.len())
            .find(|&i| is_splitter(self.chars[i]))
            .unwrap_or_else(|| self.chars.len());
        self.slice(start, end)
    }

    /// Read the next token. `None` means a closing bracket was consumed or
    /// the input ran out.
    fn read_node(&mut self) -> Result<Option<Token>> {
        loop {
            let ch = match self.peek(0) {
                None => return Ok(None),
                Some(ch) => ch,
            };

            return match ch {
                _ if is_blank(ch) => {
                    self.forward(1);
                    continue;
                }
                ';' => {
                    self.skip_comment();
                    continue;
                }
                '(' => {
                    self.round_level += 1;
                    self.read_list().map(Some)
                }
                '[' => {
                    self.square_level += 1;
                    self.read_list().map(Some)
                }
                ')' => {
                    self.close(false)?;
                    Ok(None)
                }
                ']' => {
                    self.close(true)?;
                    Ok(None)
                }
                '.' => self.read_dot().map(Some),
                '+' | '-' => self.read_number(10, false).map(Some),
                _ if ch.is_ascii_digit() => self.read_number(10, false).map(Some),
                '"' => self.read_string().map(Some),
                '#' => self.read_sharp().map(Some),
                _ if QUOTE_START.contains(ch) => self.read_quote().map(Some),
                _ if is_symbol_char(ch) => self.read_symbol().map(Some),
                _ => Err(SyntaxError::IllegalCharacter { ch, pos: self.pos() }),
            };
        }
    }

    fn close(&mut self, square: bool) -> Result<()> {
        let level = if square {
            &mut self.square_level
        } else {
            &mut self.round_level
        };
        if *level == 0 {
            return Err(SyntaxError::TooMuchRightParen { pos: self.pos() });
        }
        *level -= 1;
        self.forward(1);
        Ok(())
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek(0) {
            if ch == '\n' {
                break;
            }
            self.forward(1);
        }
    }

    fn read_list(&mut self) -> Result<Token> {
        let pos = self.pos();
        self.forward(1);
        let mut items = vec![];
        while self.has_next(0) {
            match self.read_node()? {
                Some(token) => items.push(token),
                None => break,
            }
        }
        Ok(Token::List { items, pos })
    }

    fn read_dot(&mut self) -> Result<Token> {
        match self.peek(1) {
            None => Err(SyntaxError::IllegalCharacter {
                ch: '.',
                pos: self.pos(),
            }),
            Some(ch) if ch.is_ascii_digit() => self.read_number(10, false),
            Some(ch) if is_splitter(ch) => {
                let pos = self.pos();
                self.forward(1);
                Ok(Token::Atom {
                    kind: AtomKind::Dot,
                    text: ".".into(),
                    pos,
                })
            }
            Some(ch) if is_symbol_char(ch) => self.read_symbol(),
            Some(_) => Err(SyntaxError::InvalidSymbolName {
                name: self.slice_to_splitter(self.cursor.index),
                pos: self.pos(),
            }),
        }
    }

    fn read_quote(&mut self) -> Result<Token> {
        let pos = self.pos();
        self.forward(1);
        let incomplete = || SyntaxError::IncompleteQuote { pos: pos.clone() };

        let next = self.read_node()?.ok_or_else(incomplete)?;
        if next.is_sharp() {
            let inner = self.read_node()?.ok_or_else(incomplete)?;
            Ok(Token::Quote {
                kind: QuoteKind::Vector,
                inner: Box::new(inner),
                pos,
            })
        } else {
            Ok(Token::Quote {
                kind: QuoteKind::List,
                inner: Box::new(next),
                pos,
            })
        }
    }

    fn read_string(&mut self) -> Result<Token> {
        let pos = self.pos();
        let mut string = String::new();
        let mut escaping = false;
        self.forward(1);
        loop {
            let ch = match self.peek(0) {
                None => {
                    return Err(SyntaxError::IllegalStringLiteral { text: string, pos });
                }
                Some(ch) => ch,
            };
            self.forward(1);
            match ch {
                '"' if !escaping => break,
                '\\' if !escaping => escaping = true,
                '\\' | '"' => {
                    escaping = false;
                    string.push(ch);
                }
                _ if escaping => {
                    string.push('\\');
                    string.push(ch);
                    return Err(SyntaxError::IllegalStringLiteral { text: string, pos });
                }
                _ => string.push(ch),
            }
        }

        if let Some(ch) = self.peek(0) {
            if !is_splitter(ch) {
                return Err(SyntaxError::IllegalCharacter { ch, pos: self.pos() });
            }
        }

        Ok(Token::Atom {
            kind: AtomKind::String,
            text: string,
            pos,
        })
    }

    fn read_sharp(&mut self) -> Result<Token> {
        let next = match self.peek(1) {
            None => {
                return Err(SyntaxError::IllegalCharacter {
                    ch: '#',
                    pos: self.pos(),
                })
            }
            Some(ch) => ch,
        };

        match next {
            't' | 'f' => self.read_boolean(),
            '\\' => self.read_char(),
            'b' => self.read_number(2, true),
            'o' => self.read_number(8, true),
            'd' => self.read_number(10, true),
            'x' => self.read_number(16, true),
            _ if LEFT_PAREN.contains(next) => {
                let pos = self.pos();
                self.forward(1);
                Ok(Token::Atom {
                    kind: AtomKind::Sharp,
                    text: "#".into(),
                    pos,
                })
            }
            _ => Err(SyntaxError::InvalidSharpPrefix {
                prefix: next,
                pos: self.pos(),
            }),
        }
    }

    fn read_boolean(&mut self) -> Result<Token> {
        let pos = self.pos();
        let start = self.cursor.index;
        self.forward(2);
        if let Some(ch) = self.peek(0) {
            if !is_splitter(ch) {
                return Err(SyntaxError::InvalidSymbolName {
                    name: self.slice_to_splitter(start),
                    pos,
                });
            }
        }
        Ok(Token::Atom {
            kind: AtomKind::Boolean,
            text: self.slice(start, start + 2),
            pos,
        })
    }

    fn read_char(&mut self) -> Result<Token> {
        let pos = self.pos();
        let ch = match self.peek(2) {
            None => {
                return Err(SyntaxError::InvalidSymbolName {
                    name: "#\\".into(),
                    pos,
                })
            }
            Some(ch) => ch,
        };
        self.forward(3);
        if let Some(border) = self.peek(0) {
            if !is_splitter(border) {
                return Err(SyntaxError::IllegalCharacter {
                    ch: border,
                    pos: self.pos(),
                });
            }
        }
        Ok(Token::Atom {
            kind: AtomKind::Char,
            text: ch.to_string(),
            pos,
        })
    }

    /// Read a numeric literal, optionally behind a two-character radix prefix.
    ///
    /// Without a prefix, a span that is not a well-formed number is read
    /// again as a symbol.
    fn read_number(&mut self, radix: u32, prefixed: bool) -> Result<Token> {
        let mark = self.cursor;
        let pos = self.pos();
        if prefixed {
            self.forward(2);
            if self.peek(0).map_or(true, is_splitter) {
                return Err(SyntaxError::InvalidNumber {
                    text: self.slice(mark.index, self.cursor.index),
                    pos,
                });
            }
        }

        let digits = radix_digits(radix);
        let body_start = self.cursor.index;
        while let Some(ch) = self.peek(0) {
            if digits.contains(ch) || NUMBER_PUNCT.contains(ch) {
                self.forward(1);
            } else {
                break;
            }
        }

        let body = self.slice(body_start, self.cursor.index);
        let valid = is_valid_number(&body, digits);
        let end = self.peek(0);

        let ends_in_symbol = end.map_or(false, is_symbol_char);
        if !prefixed && (ends_in_symbol || !valid) {
            self.cursor = mark;
            return self.read_symbol();
        }

        if !valid || end.map_or(false, |ch| !is_splitter(ch)) {
            return Err(SyntaxError::InvalidNumber {
                text: self.slice_to_splitter(mark.index),
                pos,
            });
        }

        Ok(Token::Atom {
            kind: AtomKind::Number,
            text: self.slice(mark.index, self.cursor.index),
            pos,
        })
    }

    fn read_symbol(&mut self) -> Result<Token> {
        let pos = self.pos();
        let start = self.cursor.index;
        while let Some(ch) = self.peek(0) {
            if !is_symbol_char(ch) {
                break;
            }
            self.forward(1);
        }

        if let Some(ch) = self.peek(0) {
            if !is_splitter(ch) {
                return Err(SyntaxError::InvalidSymbolName {
                    name: self.slice_to_splitter(start),
                    pos,
                });
            }
        }

        Ok(Token::Atom {
            kind: AtomKind::Symbol,
            text: self.slice(start, self.cursor.index),
            pos,
        })
    }
}

/// Shape check for a number body (radix prefix already stripped).
fn is_valid_number(body: &str, digits: &str) -> bool {
    let count = |c: char| body.chars().filter(|&x| x == c).count();
    let dots = count('.');
    let slashes = count('/');
    let imag = count('i');

    if !body.chars().any(|c| digits.contains(c)) {
        return false;
    }
    if dots > 1 || slashes > 1 || (dots > 0 && slashes > 0) {
        return false;
    }
    if body.starts_with('/') || body.ends_with('/') {
        return false;
    }
    if imag > 1 || (imag == 1 && !body.ends_with('i')) {
        return false;
    }

    let signs: Vec<usize> = body
        .char_indices()
        .filter(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .collect();

    // at most one sign; an imaginary part needs it
    if imag == 0 {
        signs.iter().all(|&i| i == 0)
    } else {
        signs.len() == 1
    }
}
