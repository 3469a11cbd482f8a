use crate::expression::Ref;

/// Location of a token, syntax node or error in the source text.
///
/// Lines and columns are 1-based. The source name is shared between all
/// positions produced by one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub source: Option<Ref<str>>,
}

impl Position {
    pub fn new(line: usize, column: usize, source: Option<Ref<str>>) -> Self {
        Position {
            line,
            column,
            source,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)?;
        if let Some(src) = &self.source {
            write!(f, ", {}", src)?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
    pub index: usize,
}

impl Cursor {
    pub fn start() -> Self {
        Cursor {
            line: 1,
            column: 1,
            index: 0,
        }
    }

    /// Step over one character.
    pub fn advance(&mut self, ch: char) {
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub fn position(&self, source: &Option<Ref<str>>) -> Position {
        Position::new(self.line, self.column, source.clone())
    }
}
