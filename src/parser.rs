use crate::errors::*;
use crate::expression::Ref;
use crate::lexer::{scan, AtomKind, Token};
use crate::number::parse_literal;
use crate::symbol::Symbol;
use crate::syntax::{Ast, Literal, Special};

/// Scan and build a whole program.
pub fn parse_str(source: &str, name: Option<&str>) -> Result<Ast> {
    let root = scan(source, name)?;
    Ok(build(root)?)
}

/// Map a token tree to the syntax tree, one node per token.
pub fn build(token: Token) -> std::result::Result<Ast, SyntaxError> {
    match token {
        Token::Atom { kind, text, pos } => build_atom(kind, text, pos),
        Token::List { items, pos } => Ok(Ast::List(build_all(items)?, pos)),
        Token::Root { items } => Ok(Ast::Root(build_all(items)?)),
        Token::Quote { kind, inner, pos } => Ok(Ast::Literal(
            Literal::Quote(kind, Box::new(build(*inner)?)),
            pos,
        )),
    }
}

fn build_all(items: Vec<Token>) -> std::result::Result<Ref<[Ast]>, SyntaxError> {
    items
        .into_iter()
        .map(build)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Ref::from)
}

fn build_atom(
    kind: AtomKind,
    text: String,
    pos: crate::sourcecode::Position,
) -> std::result::Result<Ast, SyntaxError> {
    let literal = match kind {
        AtomKind::Symbol => return Ok(Ast::Symbol(Symbol::new(text), pos)),
        AtomKind::Dot => return Ok(Ast::Special(Special::Dot, pos)),
        AtomKind::Sharp => return Ok(Ast::Special(Special::Sharp, pos)),
        AtomKind::String => Literal::String(Ref::new(text)),
        AtomKind::Boolean => Literal::Boolean(text == "#t"),
        AtomKind::Char => match text.chars().next() {
            Some(ch) => Literal::Char(ch),
            None => return Err(SyntaxError::InvalidSymbolName { name: text, pos }),
        },
        AtomKind::Number => match parse_literal(&text) {
            Some(n) => Literal::Number(n),
            None => return Err(SyntaxError::InvalidNumber { text, pos }),
        },
    };
    Ok(Ast::Literal(literal, pos))
}
