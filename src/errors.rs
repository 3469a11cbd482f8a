use crate::envref::EnvRef;
use crate::expression::Kind;
use crate::sourcecode::Position;
use crate::symbol::Symbol;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Structural and lexical errors. Always fatal to the current read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("Too much ')', at {pos}")]
    TooMuchRightParen { pos: Position },
    #[error("Missing ')', at {pos}")]
    MissingRightParen { pos: Position },
    #[error("Illegal character: {ch}, at {pos}")]
    IllegalCharacter { ch: char, pos: Position },
    #[error("Invalid symbol name: {name}, at {pos}")]
    InvalidSymbolName { name: String, pos: Position },
    #[error("Invalid sharp prefix: {prefix}, at {pos}")]
    InvalidSharpPrefix { prefix: char, pos: Position },
    #[error("Invalid number: {text}, at {pos}")]
    InvalidNumber { text: String, pos: Position },
    #[error("Incomplete quote, at {pos}")]
    IncompleteQuote { pos: Position },
    #[error("Illegal string literal: {text}, at {pos}")]
    IllegalStringLiteral { text: String, pos: Position },
    #[error("Unexpected dot, at {pos}")]
    UnexpectedDot { pos: Position },
    #[error("Illegal param list, at {pos}")]
    IllegalParamList { pos: Position },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Unbound variable '{0}'")]
    UnboundVariable(Symbol),
    #[error("Cannot apply non procedure '{0}'")]
    ApplyNonProcedure(String),
    #[error("Missing args, required {required}, actual {actual}")]
    MissingArgs { required: usize, actual: usize },
    #[error("Too much args, required {required}, actual {actual}")]
    TooMuchArgs { required: usize, actual: usize },
    #[error("Missing args, at least {at_least}, actual {actual}")]
    MissingArgsForDynamic { at_least: usize, actual: usize },
    #[error("Invalid syntax")]
    InvalidSyntax,
    #[error("Type '{kind}' dismatch for '{procedure}'")]
    TypeMismatch { kind: Kind, procedure: String },
    #[error("Index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("Not implemented: {0}")]
    Unimplemented(&'static str),
    #[error("Empty program")]
    EmptyProgram,
}

/// An evaluation error together with the path it took through nested
/// applications.
#[derive(Clone)]
pub struct RuntimeError {
    kind: RuntimeErrorKind,
    pos: Option<Position>,
    env: Option<EnvRef>,
    frames: Vec<(Position, EnvRef)>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        RuntimeError {
            kind,
            pos: None,
            env: None,
            frames: vec![],
        }
    }

    pub fn at(mut self, pos: &Position) -> Self {
        self.pos = Some(pos.clone());
        self
    }

    pub fn in_env(mut self, env: &EnvRef) -> Self {
        self.env = Some(env.clone());
        self
    }

    pub fn kind(&self) -> &RuntimeErrorKind {
        &self.kind
    }

    pub fn position(&self) -> Option<&Position> {
        self.pos.as_ref()
    }

    pub fn frames(&self) -> &[(Position, EnvRef)] {
        &self.frames
    }

    /// Record that the error passed through an application at `pos` that was
    /// evaluated in `env`. Consecutive passes through the same frame collapse.
    pub fn push_frame(&mut self, pos: &Position, env: &EnvRef) {
        let last_env = match self.frames.last() {
            Some((_, last)) => Some(last),
            None => self.env.as_ref(),
        };
        if last_env.map_or(false, |last| EnvRef::ptr_eq(last, env)) {
            return;
        }
        self.frames.push((pos.clone(), env.clone()));
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}, at ", self.kind)?;
        match &self.pos {
            Some(pos) => write!(f, "{}:{}", pos.line, pos.column)?,
            None => write!(f, "BUILT-IN")?,
        }
        for (pos, _) in &self.frames {
            write!(f, "\n\tat {}", pos)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("RuntimeError")
            .field("kind", &self.kind)
            .field("pos", &self.pos)
            .field(
                "frames",
                &self.frames.iter().map(|(pos, _)| pos).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl std::error::Error for RuntimeError {}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        RuntimeError::new(kind)
    }
}

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Append a propagation frame. Syntax errors carry no trace.
    pub fn traced(self, pos: &Position, env: &EnvRef) -> Self {
        match self {
            Error::Runtime(mut e) => {
                e.push_frame(pos, env);
                Error::Runtime(e)
            }
            e => e,
        }
    }

    pub fn runtime_kind(&self) -> Option<&RuntimeErrorKind> {
        match self {
            Error::Runtime(e) => Some(e.kind()),
            Error::Syntax(_) => None,
        }
    }
}

impl From<RuntimeErrorKind> for Error {
    fn from(kind: RuntimeErrorKind) -> Self {
        Error::Runtime(RuntimeError::new(kind))
    }
}
