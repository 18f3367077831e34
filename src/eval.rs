//! Interpretation of program-graph guards and actions.
//!
//! Building a transition system from a program graph needs two things the graph
//! only carries as text: the effect of an action on a valuation and the truth
//! of a guard. Both are pluggable through [`ActionDef`] and [`ConditionDef`];
//! the first definition that matches a given text is used.

use log::trace;

use crate::channel::{Direction, OneSided};
use crate::error::{FvmError, Result};
use crate::expr::{apply_assignments, evaluate_guard, is_action, parse_action, parse_expr, parse_guard};
use crate::types::Valuation;

pub trait ActionDef {
    fn is_match(&self, action: &str) -> bool;

    /// Valuation after performing `action`, or `None` if the action cannot
    /// fire in `valuation`.
    fn effect(&self, valuation: &Valuation, action: &str) -> Result<Option<Valuation>>;
}

pub trait ConditionDef {
    fn is_match(&self, condition: &str) -> bool;

    fn evaluate(&self, valuation: &Valuation, condition: &str) -> Result<bool>;
}

/// Assignments, `skip`, `atomic{...}` and the empty action.
#[derive(Debug, Default, Copy, Clone)]
pub struct ParserBasedActDef;

impl ActionDef for ParserBasedActDef {
    fn is_match(&self, action: &str) -> bool {
        is_action(action)
    }

    fn effect(&self, valuation: &Valuation, action: &str) -> Result<Option<Valuation>> {
        let assignments = parse_action(action)?;
        apply_assignments(&assignments, valuation).map(Some)
    }
}

/// Boolean expressions; the empty condition is `true`.
#[derive(Debug, Default, Copy, Clone)]
pub struct ParserBasedCondDef;

impl ConditionDef for ParserBasedCondDef {
    fn is_match(&self, condition: &str) -> bool {
        parse_guard(condition).is_ok()
    }

    fn evaluate(&self, valuation: &Valuation, condition: &str) -> Result<bool> {
        evaluate_guard(condition, valuation)
    }
}

/// Joint channel actions `c!e|c?x`.
///
/// The sent expression is evaluated in the pre-state and stored into the
/// receiving variable; `c?` and `c?_` receive without storing.
#[derive(Debug, Default, Copy, Clone)]
pub struct HandshakeActDef;

impl HandshakeActDef {
    fn split(action: &str) -> Option<(OneSided<'_>, OneSided<'_>)> {
        let (lhs, rhs) = action.split_once('|')?;
        let (a, b) = (OneSided::parse(lhs)?, OneSided::parse(rhs)?);
        if a.channel != b.channel {
            return None;
        }
        match (a.direction, b.direction) {
            (Direction::Send, Direction::Receive) => Some((a, b)),
            (Direction::Receive, Direction::Send) => Some((b, a)),
            _ => None,
        }
    }
}

impl ActionDef for HandshakeActDef {
    fn is_match(&self, action: &str) -> bool {
        Self::split(action).is_some()
    }

    fn effect(&self, valuation: &Valuation, action: &str) -> Result<Option<Valuation>> {
        let (send, receive) =
            Self::split(action).ok_or_else(|| FvmError::Parse(format!("not a handshake action: `{}`", action)))?;
        let value = parse_expr(send.payload)?.eval(valuation)?;
        trace!("{}: {} -> {}", send.channel, value, receive.payload);
        let mut result = valuation.clone();
        if !matches!(receive.payload, "" | "_") {
            result.insert(receive.payload.to_string(), value);
        }
        Ok(Some(result))
    }
}

/// Definitions for plain program graphs.
pub fn default_action_defs() -> Vec<Box<dyn ActionDef>> {
    vec![Box::new(ParserBasedActDef)]
}

/// Definitions for composed channel systems: handshakes first.
pub fn channel_action_defs() -> Vec<Box<dyn ActionDef>> {
    vec![Box::new(HandshakeActDef), Box::new(ParserBasedActDef)]
}

pub fn default_condition_defs() -> Vec<Box<dyn ConditionDef>> {
    vec![Box::new(ParserBasedCondDef)]
}

/// Effect of `action` under the first matching definition.
pub fn effect(defs: &[Box<dyn ActionDef>], valuation: &Valuation, action: &str) -> Result<Option<Valuation>> {
    match defs.iter().find(|d| d.is_match(action)) {
        Some(def) => def.effect(valuation, action),
        None => Err(FvmError::Eval(format!("no definition matches action `{}`", action))),
    }
}

/// Truth of `condition` under the first matching definition.
pub fn evaluate(defs: &[Box<dyn ConditionDef>], valuation: &Valuation, condition: &str) -> Result<bool> {
    match defs.iter().find(|d| d.is_match(condition)) {
        Some(def) => def.evaluate(valuation, condition),
        None => Err(FvmError::Eval(format!("no definition matches condition `{}`", condition))),
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::Value;

    fn x_is(n: i64) -> Valuation {
        Valuation::from([("x".to_string(), Value::Int(n))])
    }

    #[test]
    fn test_parser_based() {
        let defs = default_action_defs();
        let v = effect(&defs, &x_is(1), "x := x * 5").unwrap().unwrap();
        assert_eq!(v, x_is(5));
        assert_eq!(effect(&defs, &x_is(1), "").unwrap(), Some(x_is(1)));

        let conds = default_condition_defs();
        assert!(evaluate(&conds, &x_is(1), "x == 1").unwrap());
        assert!(evaluate(&conds, &x_is(1), "").unwrap());
    }

    #[test]
    fn test_handshake() {
        let def = HandshakeActDef;
        assert!(def.is_match("c!x + 1|c?y"));
        assert!(def.is_match("c?y|c!x"));
        assert!(!def.is_match("c!x|d?y"));
        assert!(!def.is_match("c!x"));
        assert!(!def.is_match("x := 1"));

        let v = def.effect(&x_is(2), "c!x + 1|c?y").unwrap().unwrap();
        assert_eq!(v["y"], Value::Int(3));
        let v = def.effect(&x_is(2), "c!x|c?").unwrap().unwrap();
        assert_eq!(v, x_is(2));
    }

    #[test]
    fn test_first_match_wins() {
        let defs = channel_action_defs();
        let v = effect(&defs, &x_is(7), "c!x|c?x").unwrap().unwrap();
        assert_eq!(v, x_is(7));
        let v = effect(&defs, &x_is(7), "x := 0").unwrap().unwrap();
        assert_eq!(v, x_is(0));
    }

    #[test]
    fn test_no_matching_definition() {
        let defs = default_action_defs();
        assert!(matches!(effect(&defs, &x_is(0), "c!1|c?x"), Err(FvmError::Eval(_))));
        let conds = default_condition_defs();
        assert!(matches!(evaluate(&conds, &x_is(0), "x ==="), Err(FvmError::Eval(_))));
    }
}
