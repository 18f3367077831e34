//! Expansion of a structured statement into a program graph.
//!
//! Every location of the resulting graph is the text of a *residual* statement,
//! i.e. what is left to execute. The root location is the whole statement and
//! the exit location (nothing left) is the empty string.
//!
//! For every residual the expansion derives the set of one-step moves
//! `(guard, action, residual')`:
//!
//! ```text
//! a                      { ("", a, exit) }
//! if :: g_i -> s_i fi    { (g_i && h, a, r)         | (h, a, r) in sub(s_i) }
//! do :: g_i -> s_i od    { (g_i && h, a, r;loop)    | (h, a, r) in sub(s_i) }
//!                        ∪ { (!g_1 && ... && !g_n, "", exit) }
//! s1;s2                  { (h, a, r;s2)             | (h, a, r) in sub(s1) }
//! ```
//!
//! where `r;s` is just `s` when `r` is the exit. Moves are memoized per
//! interned statement, and locations are materialized breadth-first from the
//! root.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;
use log::debug;

use crate::program_graph::{PgTransition, ProgramGraph};
use crate::statement::{Stmt, StmtArena, StmtId, StmtNode};
use crate::utils::{conjoin, negate};

/// A residual statement; `None` is the exit.
type Residual = Option<StmtId>;

#[derive(Debug, Clone)]
struct Step {
    guard: String,
    action: String,
    residual: Residual,
}

struct Expander {
    arena: StmtArena,
    memo: HashMap<StmtId, Vec<Step>>,
}

impl Expander {
    fn new() -> Self {
        Self {
            arena: StmtArena::new(),
            memo: HashMap::new(),
        }
    }

    /// `r;tail`, or just `tail` when `r` is the exit.
    fn then(&mut self, r: Residual, tail: StmtId) -> StmtId {
        match r {
            None => tail,
            Some(r) => self.arena.mk_seq(r, tail),
        }
    }

    fn sub(&mut self, id: StmtId) -> Vec<Step> {
        if let Some(steps) = self.memo.get(&id) {
            return steps.clone();
        }

        let steps = match self.arena.get(id).clone() {
            StmtNode::Atomic(action) => vec![Step {
                guard: String::new(),
                action,
                residual: None,
            }],
            StmtNode::If(options) => {
                let mut steps = Vec::new();
                for (guard, body) in options {
                    for step in self.sub(body) {
                        steps.push(Step {
                            guard: conjoin(&guard, &step.guard),
                            ..step
                        });
                    }
                }
                steps
            }
            StmtNode::Do(options) => {
                let mut steps = Vec::new();
                for (guard, body) in &options {
                    for step in self.sub(*body) {
                        let residual = self.then(step.residual, id);
                        steps.push(Step {
                            guard: conjoin(guard, &step.guard),
                            action: step.action,
                            residual: Some(residual),
                        });
                    }
                }
                let exit_guard = options
                    .iter()
                    .fold(String::new(), |acc, (guard, _)| conjoin(&acc, &negate(guard)));
                steps.push(Step {
                    guard: exit_guard,
                    action: String::new(),
                    residual: None,
                });
                steps
            }
            StmtNode::Seq(first, second) => {
                let mut steps = Vec::new();
                for step in self.sub(first) {
                    let residual = self.then(step.residual, second);
                    steps.push(Step {
                        residual: Some(residual),
                        ..step
                    });
                }
                steps
            }
        };

        self.memo.insert(id, steps.clone());
        steps
    }

    fn render(&self, r: Residual) -> String {
        match r {
            None => String::new(),
            Some(id) => self.arena.render(id),
        }
    }
}

/// Builds the program graph of `stmt`.
///
/// The single initial location is the rendering of `stmt` itself. The graph
/// carries no initializations.
pub fn program_graph_from_statement(stmt: &Stmt) -> ProgramGraph<String> {
    let mut expander = Expander::new();
    let root = expander.arena.intern(stmt);

    let mut pg = ProgramGraph::new();
    pg.add_initial_location(expander.render(Some(root)));

    let mut seen: IndexSet<Residual> = IndexSet::from([Some(root)]);
    let mut queue: VecDeque<StmtId> = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let from = expander.render(Some(id));
        for step in expander.sub(id) {
            let to = expander.render(step.residual);
            pg.add_location(to.clone());
            pg.add_transition(PgTransition::new(from.clone(), step.guard, step.action, to));
            if seen.insert(step.residual) {
                if let Some(next) = step.residual {
                    queue.push_back(next);
                }
            }
        }
    }

    debug!(
        "program_graph_from_statement: {} locations, {} transitions, {} interned statements",
        pg.locations().len(),
        pg.transitions().len(),
        expander.arena.len()
    );
    pg
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::statement::GuardedOption;

    fn has(pg: &ProgramGraph<String>, from: &str, guard: &str, action: &str, to: &str) -> bool {
        pg.transitions()
            .contains(&PgTransition::new(from.to_string(), guard, action, to.to_string()))
    }

    #[test]
    fn test_atomic() {
        let pg = program_graph_from_statement(&Stmt::atomic("x := 1"));
        assert_eq!(pg.locations(), &IndexSet::from(["x := 1".to_string(), String::new()]));
        assert_eq!(pg.initial_locations(), &IndexSet::from(["x := 1".to_string()]));
        assert!(has(&pg, "x := 1", "", "x := 1", ""));
    }

    #[test]
    fn test_sequence() {
        let s = Stmt::sequence([Stmt::atomic("x := 1"), Stmt::atomic("y := 2"), Stmt::atomic("z := 3")]).unwrap();
        let pg = program_graph_from_statement(&s);
        assert_eq!(pg.locations().len(), 4);
        assert!(has(&pg, "x := 1;y := 2;z := 3", "", "x := 1", "y := 2;z := 3"));
        assert!(has(&pg, "y := 2;z := 3", "", "y := 2", "z := 3"));
        assert!(has(&pg, "z := 3", "", "z := 3", ""));
    }

    #[test]
    fn test_do_skip_loop() {
        let s = Stmt::do_([GuardedOption::new("true", Stmt::atomic("skip"))]);
        let pg = program_graph_from_statement(&s);
        let root = "do :: true -> skip od";
        assert_eq!(pg.locations(), &IndexSet::from([root.to_string(), String::new()]));
        assert_eq!(pg.transitions().len(), 2);
        assert!(has(&pg, root, "true", "skip", root));
        assert!(has(&pg, root, "!(true)", "", ""));
    }

    #[test]
    fn test_if_conjoins_guards() {
        let inner = Stmt::if_([GuardedOption::new("y > 0", Stmt::atomic("y := 0"))]);
        let s = Stmt::if_([
            GuardedOption::new("x > 0", inner),
            GuardedOption::new("", Stmt::atomic("skip")),
        ]);
        let pg = program_graph_from_statement(&s);
        let root = s.to_string();
        assert!(has(&pg, &root, "(x > 0) && (y > 0)", "y := 0", ""));
        assert!(has(&pg, &root, "", "skip", ""));
    }

    #[test]
    fn test_do_exit_guard_negates_all_options() {
        let s = Stmt::do_([
            GuardedOption::new("x < 3", Stmt::atomic("x := x + 1")),
            GuardedOption::new("y < 3", Stmt::atomic("y := y + 1")),
        ]);
        let pg = program_graph_from_statement(&s);
        assert!(has(&pg, &s.to_string(), "(!(x < 3)) && (!(y < 3))", "", ""));
    }

    #[test]
    fn test_loop_body_sequence_returns_to_loop() {
        let body = Stmt::seq(Stmt::atomic("a"), Stmt::atomic("b"));
        let s = Stmt::seq(Stmt::do_([GuardedOption::new("g", body)]), Stmt::atomic("c"));
        let pg = program_graph_from_statement(&s);
        let root = s.to_string();
        assert_eq!(root, "do :: g -> a;b od;c");
        assert!(has(&pg, &root, "g", "a", "b;do :: g -> a;b od;c"));
        assert!(has(&pg, "b;do :: g -> a;b od;c", "", "b", &root));
        assert!(has(&pg, &root, "!(g)", "", "c"));
        assert!(has(&pg, "c", "", "c", ""));
        assert_eq!(pg.locations().len(), 4);
    }

    #[test]
    fn test_nested_loops_terminate() {
        let inner = Stmt::do_([
            GuardedOption::new("x < 2", Stmt::atomic("x := x + 1")),
            GuardedOption::new("y < 2", Stmt::atomic("y := y + 1")),
        ]);
        let outer = Stmt::do_([
            GuardedOption::new("true", inner),
            GuardedOption::new("z < 1", Stmt::atomic("z := 1")),
        ]);
        let pg = program_graph_from_statement(&outer);
        // outer, inner;outer, exit
        assert_eq!(pg.locations().len(), 3);
        assert!(pg.locations().contains(""));
        for loc in pg.locations().iter().filter(|l| !l.is_empty()) {
            assert!(pg.transitions().iter().any(|t| &t.from == loc));
        }
    }
}
