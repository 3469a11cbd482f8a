use crate::envref::EnvRef;
use crate::errors::*;
use crate::expression::{Ref, Value};
use crate::interpreter::{eval_body, Operand};
use crate::sourcecode::Position;
use crate::symbol::{self, Symbol};
use crate::syntax::Ast;

/// A `syntax-rules` transformer.
///
/// Pattern variables are bound in the environment the macro was defined in,
/// not in a fresh frame. Every expansion overwrites the bindings of the
/// previous one, so a macro must not be re-entered while one of its
/// expansions still refers to its variables.
pub struct Macro {
    rules: Vec<SyntaxRule>,
    env: EnvRef,
}

struct SyntaxRule {
    pattern: Vec<Binding>,
    body: Ref<[Ast]>,
}

#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Atom(Symbol),
    Vararg(Symbol),
    Keyword(Symbol),
    List(Vec<Binding>),
}

fn invalid_syntax(pos: &Position, env: &EnvRef) -> Error {
    RuntimeError::new(RuntimeErrorKind::InvalidSyntax)
        .at(pos)
        .in_env(env)
        .into()
}

impl Macro {
    /// Build a macro from the operands of `(syntax-rules (keyword ...) (pattern body ...) ...)`.
    pub fn parse(operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Self> {
        let (keywords, rules) = operands
            .split_first()
            .ok_or_else(|| invalid_syntax(pos, env))?;

        let keywords = keywords
            .node()
            .and_then(Ast::as_list)
            .ok_or_else(|| invalid_syntax(pos, env))?
            .iter()
            .map(|k| k.as_symbol().cloned().ok_or_else(|| invalid_syntax(pos, env)))
            .collect::<Result<Vec<_>>>()?;

        let rules = rules
            .iter()
            .map(|rule| {
                rule.node()
                    .ok_or_else(|| invalid_syntax(pos, env))
                    .and_then(|rule| SyntaxRule::parse(rule, &keywords, env))
            })
            .collect::<Result<_>>()?;

        Ok(Macro {
            rules,
            env: env.clone(),
        })
    }

    /// Select the first rule matching `operands`, bind its variables to
    /// delayed call-site fragments and evaluate its body.
    pub fn expand(&self, operands: &[Operand], env: &EnvRef, pos: &Position) -> Result<Value> {
        let rule = self
            .rules
            .iter()
            .find(|rule| matches(&rule.pattern, operands))
            .ok_or_else(|| invalid_syntax(pos, &self.env))?;

        bind(&rule.pattern, operands, env, &self.env);
        eval_body(&rule.body, &self.env)
    }
}

impl SyntaxRule {
    fn parse(rule: &Ast, keywords: &[Symbol], env: &EnvRef) -> Result<Self> {
        let pos = rule.position().cloned().unwrap_or_else(|| Position::new(0, 0, None));
        let items = rule.as_list().ok_or_else(|| invalid_syntax(&pos, env))?;
        let (pattern, body) = items
            .split_first()
            .ok_or_else(|| invalid_syntax(&pos, env))?;
        if body.is_empty() {
            return Err(invalid_syntax(&pos, env));
        }

        // the leading element names the macro itself and never takes part in matching
        let pattern = pattern.as_list().ok_or_else(|| invalid_syntax(&pos, env))?;
        let pattern = match pattern.split_first() {
            Some((_, rest)) => parse_pattern(rest, keywords).ok_or_else(|| invalid_syntax(&pos, env))?,
            None => vec![],
        };

        Ok(SyntaxRule {
            pattern,
            body: body.to_vec().into(),
        })
    }
}

fn parse_pattern(items: &[Ast], keywords: &[Symbol]) -> Option<Vec<Binding>> {
    let mut pattern = vec![];
    let mut i = 0;
    while i < items.len() {
        let followed_by_ellipsis = items
            .get(i + 1)
            .map_or(false, |next| next.is_named_symbol(symbol::ELLIPSIS));
        let binding = match &items[i] {
            Ast::Symbol(s, _) if *s == *symbol::ELLIPSIS => return None,
            Ast::Symbol(s, _) if followed_by_ellipsis => {
                if i + 2 != items.len() {
                    return None;
                }
                i += 1;
                Binding::Vararg(s.clone())
            }
            Ast::Symbol(s, _) if keywords.contains(s) => Binding::Keyword(s.clone()),
            Ast::Symbol(s, _) => Binding::Atom(s.clone()),
            Ast::List(sub, _) => Binding::List(parse_pattern(sub, keywords)?),
            _ => return None,
        };
        pattern.push(binding);
        i += 1;
    }
    Some(pattern)
}

fn matches(pattern: &[Binding], args: &[Operand]) -> bool {
    let required = pattern
        .iter()
        .filter(|b| !matches!(b, Binding::Vararg(_)))
        .count();
    if args.len() < required {
        return false;
    }

    pattern.iter().zip(args).all(|(binding, arg)| match binding {
        Binding::Atom(_) | Binding::Vararg(_) => true,
        Binding::Keyword(k) => match arg {
            Operand::Value(Value::Symbol(s)) => s == k,
            _ => arg.node().and_then(Ast::as_symbol) == Some(k),
        },
        Binding::List(sub) => arg
            .children()
            .map_or(false, |children| matches(sub, &children)),
    })
}

fn bind(pattern: &[Binding], args: &[Operand], caller: &EnvRef, target: &EnvRef) {
    for (i, binding) in pattern.iter().enumerate() {
        match binding {
            Binding::Atom(name) => target.define(name.clone(), args[i].delay(caller)),
            Binding::Vararg(name) => target.define(
                name.clone(),
                args[i..].iter().map(|arg| arg.delay(caller)).collect(),
            ),
            Binding::Keyword(_) => {}
            Binding::List(sub) => {
                if let Some(children) = args[i].children() {
                    bind(sub, &children, caller, target);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::parse_str;

    fn form(src: &str) -> Ast {
        match parse_str(src, None).unwrap() {
            Ast::Root(items) => items[0].clone(),
            _ => unreachable!(),
        }
    }

    fn pattern(src: &str, keywords: &[&str]) -> Option<Vec<Binding>> {
        let keywords: Vec<Symbol> = keywords.iter().map(|&k| k.into()).collect();
        parse_pattern(form(src).as_list().unwrap(), &keywords)
    }

    fn args(src: &str) -> Vec<Ast> {
        form(src).as_list().unwrap().to_vec()
    }

    fn operands(xs: &[Ast]) -> Vec<Operand> {
        xs.iter().map(Operand::Node).collect()
    }

    #[test]
    fn parse_bindings() {
        assert_eq!(
            Some(vec![
                Binding::Atom("a".into()),
                Binding::Keyword("=>".into()),
                Binding::List(vec![Binding::Atom("b".into()), Binding::Vararg("c".into())]),
            ]),
            pattern("(a => (b c ...))", &["=>"])
        );
    }

    #[test]
    fn ellipsis_must_be_last() {
        assert_eq!(None, pattern("(a ... b)", &[]));
        assert_eq!(None, pattern("(...)", &[]));
        assert_eq!(None, pattern("(1)", &[]));
    }

    #[test]
    fn match_requires_enough_arguments() {
        let pat = pattern("(a b rest ...)", &[]).unwrap();
        let two = args("(1 2)");
        let one = args("(1)");
        assert!(matches(&pat, &operands(&two)));
        assert!(!matches(&pat, &operands(&one)));
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let pat = pattern("(a)", &[]).unwrap();
        let three = args("(1 2 3)");
        assert!(matches(&pat, &operands(&three)));
    }

    #[test]
    fn match_keyword_by_name() {
        let pat = pattern("(x => y)", &["=>"]).unwrap();
        let good = args("(1 => 2)");
        let bad = args("(1 -> 2)");
        assert!(matches(&pat, &operands(&good)));
        assert!(!matches(&pat, &operands(&bad)));
    }

    #[test]
    fn match_nested_list() {
        let pat = pattern("((a b) c)", &[]).unwrap();
        let good = args("((1 2) 3)");
        let bad = args("(1 3)");
        assert!(matches(&pat, &operands(&good)));
        assert!(!matches(&pat, &operands(&bad)));
    }

    #[test]
    fn bindings_are_delayed_in_target_env() {
        let caller: EnvRef = Environment::new(None).into();
        let target: EnvRef = Environment::new(None).into();
        let pat = pattern("((a) b ...)", &[]).unwrap();
        let xs = args("((x) y z)");
        bind(&pat, &operands(&xs), &caller, &target);

        match target.lookup(&"a".into()) {
            Some(Value::Delayed(d)) => {
                assert!(d.node.is_named_symbol("x"));
                assert!(EnvRef::ptr_eq(&d.env, &caller));
            }
            other => panic!("expected delayed binding, got {:?}", other),
        }
        let rest = target.lookup(&"b".into()).unwrap();
        assert_eq!(2, rest.iter_list().count());
        assert!(caller.lookup(&"a".into()).is_none());
    }
}
