use crate::expression::Ref;
use crate::lexer::QuoteKind;
use crate::number::Number;
use crate::sourcecode::Position;
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(Ref<String>),
    Char(char),
    Boolean(bool),
    Number(Number),
    Quote(QuoteKind, Box<Ast>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Special {
    Dot,
    Sharp,
}

/// Abstract syntax tree. Never mutated once built; list children are shared
/// so closures can hold on to their bodies cheaply.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Literal(Literal, Position),
    Symbol(Symbol, Position),
    List(Ref<[Ast]>, Position),
    Root(Ref<[Ast]>),
    Special(Special, Position),
}

impl Ast {
    pub fn position(&self) -> Option<&Position> {
        match self {
            Ast::Literal(_, pos)
            | Ast::Symbol(_, pos)
            | Ast::List(_, pos)
            | Ast::Special(_, pos) => Some(pos),
            Ast::Root(items) => items.first().and_then(Ast::position),
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Ast::Symbol(s, _) => Some(s),
            _ => None,
        }
    }

    pub fn is_named_symbol(&self, name: &str) -> bool {
        self.as_symbol().map_or(false, |s| s == name)
    }

    pub fn as_list(&self) -> Option<&[Ast]> {
        match self {
            Ast::List(items, _) => Some(items),
            _ => None,
        }
    }

    pub fn is_special(&self, special: Special) -> bool {
        matches!(self, Ast::Special(s, _) if *s == special)
    }
}
