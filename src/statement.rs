//! Structured statements and their hash-consed arena.
//!
//! [`Stmt`] is the boxed tree a front end produces. [`StmtArena`] interns
//! statements into shared [`StmtNode`]s so that structurally equal statements
//! get the same [`StmtId`]; sequences are kept right-associated, so
//! `(a;b);c` and `a;(b;c)` are the same statement.

use std::fmt::{Display, Formatter};

use indexmap::IndexSet;

/// An option `:: guard -> body` of a choice or loop.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct GuardedOption {
    pub guard: String,
    pub body: Stmt,
}

impl GuardedOption {
    pub fn new(guard: impl Into<String>, body: Stmt) -> Self {
        Self {
            guard: guard.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Stmt {
    /// A single action, e.g. `x := x + 1` or `c!x`.
    Atomic(String),
    /// `s1;s2`
    Seq(Box<Stmt>, Box<Stmt>),
    /// `if :: g1 -> s1 :: g2 -> s2 fi`
    If(Vec<GuardedOption>),
    /// `do :: g1 -> s1 :: g2 -> s2 od`
    Do(Vec<GuardedOption>),
}

impl Stmt {
    pub fn atomic(action: impl Into<String>) -> Self {
        Stmt::Atomic(action.into())
    }

    pub fn seq(first: Self, second: Self) -> Self {
        Stmt::Seq(Box::new(first), Box::new(second))
    }

    /// Right-nested sequence of one or more statements.
    pub fn sequence(stmts: impl IntoIterator<Item = Stmt>) -> Option<Self> {
        let mut stmts: Vec<Stmt> = stmts.into_iter().collect();
        let mut acc = stmts.pop()?;
        while let Some(s) = stmts.pop() {
            acc = Stmt::seq(s, acc);
        }
        Some(acc)
    }

    pub fn if_(options: impl IntoIterator<Item = GuardedOption>) -> Self {
        Stmt::If(options.into_iter().collect())
    }

    pub fn do_(options: impl IntoIterator<Item = GuardedOption>) -> Self {
        Stmt::Do(options.into_iter().collect())
    }
}

fn fmt_block(
    f: &mut Formatter<'_>,
    open: &str,
    options: &[(&str, impl Display)],
    close: &str,
) -> std::fmt::Result {
    write!(f, "{}", open)?;
    for (guard, body) in options {
        write!(f, " :: {} -> {}", guard, body)?;
    }
    write!(f, " {}", close)
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Atomic(a) => write!(f, "{}", a),
            Stmt::Seq(a, b) => write!(f, "{};{}", a, b),
            Stmt::If(options) => fmt_block(f, "if", &pairs(options), "fi"),
            Stmt::Do(options) => fmt_block(f, "do", &pairs(options), "od"),
        }
    }
}

fn pairs(options: &[GuardedOption]) -> Vec<(&str, &Stmt)> {
    options.iter().map(|o| (o.guard.as_str(), &o.body)).collect()
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StmtId(usize);

impl StmtId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A statement node whose children are arena handles.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum StmtNode<I = StmtId> {
    Atomic(String),
    Seq(I, I),
    If(Vec<(String, I)>),
    Do(Vec<(String, I)>),
}

/// Interning arena for statements.
#[derive(Debug, Default)]
pub struct StmtArena {
    nodes: IndexSet<StmtNode>,
}

impl StmtArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: StmtId) -> &StmtNode {
        &self.nodes[id.0]
    }

    fn mk(&mut self, node: StmtNode) -> StmtId {
        let (index, _) = self.nodes.insert_full(node);
        StmtId(index)
    }

    pub fn mk_atomic(&mut self, action: impl Into<String>) -> StmtId {
        self.mk(StmtNode::Atomic(action.into()))
    }

    /// `first;second`, re-associated to the right.
    pub fn mk_seq(&mut self, first: StmtId, second: StmtId) -> StmtId {
        match *self.get(first) {
            StmtNode::Seq(a, b) => {
                let rest = self.mk_seq(b, second);
                self.mk_seq(a, rest)
            }
            _ => self.mk(StmtNode::Seq(first, second)),
        }
    }

    pub fn mk_if(&mut self, options: Vec<(String, StmtId)>) -> StmtId {
        self.mk(StmtNode::If(options))
    }

    pub fn mk_do(&mut self, options: Vec<(String, StmtId)>) -> StmtId {
        self.mk(StmtNode::Do(options))
    }

    /// Interns a statement tree.
    pub fn intern(&mut self, stmt: &Stmt) -> StmtId {
        match stmt {
            Stmt::Atomic(a) => self.mk_atomic(a.as_str()),
            Stmt::Seq(a, b) => {
                let a = self.intern(a);
                let b = self.intern(b);
                self.mk_seq(a, b)
            }
            Stmt::If(options) => {
                let options = self.intern_options(options);
                self.mk_if(options)
            }
            Stmt::Do(options) => {
                let options = self.intern_options(options);
                self.mk_do(options)
            }
        }
    }

    fn intern_options(&mut self, options: &[GuardedOption]) -> Vec<(String, StmtId)> {
        options
            .iter()
            .map(|o| (o.guard.clone(), self.intern(&o.body)))
            .collect()
    }

    /// Source text of an interned statement.
    pub fn render(&self, id: StmtId) -> String {
        self.display(id).to_string()
    }

    fn display(&self, id: StmtId) -> RenderStmt<'_> {
        RenderStmt { arena: self, id }
    }

    fn display_options<'a>(&'a self, options: &'a [(String, StmtId)]) -> Vec<(&'a str, RenderStmt<'a>)> {
        options.iter().map(|(g, s)| (g.as_str(), self.display(*s))).collect()
    }
}

struct RenderStmt<'a> {
    arena: &'a StmtArena,
    id: StmtId,
}

impl Display for RenderStmt<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let arena = self.arena;
        match arena.get(self.id) {
            StmtNode::Atomic(a) => write!(f, "{}", a),
            StmtNode::Seq(a, b) => write!(f, "{};{}", arena.display(*a), arena.display(*b)),
            StmtNode::If(options) => fmt_block(f, "if", &arena.display_options(options), "fi"),
            StmtNode::Do(options) => fmt_block(f, "do", &arena.display_options(options), "od"),
        }
    }
}
