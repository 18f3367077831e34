//! Linear temporal logic formulas.
//!
//! The core connectives are `true`, atomic propositions, negation,
//! conjunction, next and until. Everything else is sugar:
//!
//! ```text
//! false     = !true
//! a || b    = !(!a && !b)
//! a -> b    = !a || b
//! F a       = true U a
//! G a       = !F !a
//! ```

use std::fmt::{Display, Formatter};

use indexmap::IndexSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ltl<P> {
    True,
    Ap(P),
    Not(Box<Ltl<P>>),
    And(Box<Ltl<P>>, Box<Ltl<P>>),
    Next(Box<Ltl<P>>),
    Until(Box<Ltl<P>>, Box<Ltl<P>>),
}

impl<P> Ltl<P> {
    pub fn tt() -> Self {
        Ltl::True
    }

    pub fn ff() -> Self {
        Ltl::not(Ltl::True)
    }

    pub fn ap(p: P) -> Self {
        Ltl::Ap(p)
    }

    /// Negation; `!!a` collapses to `a`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(f: Self) -> Self {
        match f {
            Ltl::Not(inner) => *inner,
            _ => Ltl::Not(Box::new(f)),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Ltl::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Ltl::not(Ltl::and(Ltl::not(lhs), Ltl::not(rhs)))
    }

    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Ltl::or(Ltl::not(lhs), rhs)
    }

    pub fn next(f: Self) -> Self {
        Ltl::Next(Box::new(f))
    }

    pub fn until(lhs: Self, rhs: Self) -> Self {
        Ltl::Until(Box::new(lhs), Box::new(rhs))
    }

    pub fn eventually(f: Self) -> Self {
        Ltl::until(Ltl::True, f)
    }

    pub fn always(f: Self) -> Self {
        Ltl::not(Ltl::eventually(Ltl::not(f)))
    }
}

impl<P: Clone + Eq + std::hash::Hash> Ltl<P> {
    /// Removes double negations and pushes negation below next: `!X a` becomes `X !a`.
    ///
    /// Negated conjunctions and untils are left alone; the closure treats
    /// `!a` as "a does not hold", which is exact for them.
    pub fn normalize(&self) -> Self {
        match self {
            Ltl::True | Ltl::Ap(_) => self.clone(),
            Ltl::Not(inner) => match inner.as_ref() {
                Ltl::Not(f) => f.normalize(),
                Ltl::Next(f) => Ltl::next(Ltl::not(f.as_ref().clone()).normalize()),
                f => Ltl::not(f.normalize()),
            },
            Ltl::And(a, b) => Ltl::and(a.normalize(), b.normalize()),
            Ltl::Next(f) => Ltl::next(f.normalize()),
            Ltl::Until(a, b) => Ltl::until(a.normalize(), b.normalize()),
        }
    }

    /// Distinct positive subformulas in post-order (children before parents).
    ///
    /// Negations are not listed: `!a` holds exactly when `a` does not.
    pub fn subformulas(&self) -> IndexSet<Ltl<P>> {
        let mut result = IndexSet::new();
        self.collect_subformulas(&mut result);
        result
    }

    fn collect_subformulas(&self, acc: &mut IndexSet<Ltl<P>>) {
        match self {
            Ltl::True | Ltl::Ap(_) => {}
            Ltl::Not(f) | Ltl::Next(f) => f.collect_subformulas(acc),
            Ltl::And(a, b) | Ltl::Until(a, b) => {
                a.collect_subformulas(acc);
                b.collect_subformulas(acc);
            }
        }
        if !matches!(self, Ltl::Not(_)) && !acc.contains(self) {
            acc.insert(self.clone());
        }
    }

    /// Atomic propositions occurring in the formula.
    pub fn atomic_propositions(&self) -> IndexSet<P> {
        self.subformulas()
            .into_iter()
            .filter_map(|f| match f {
                Ltl::Ap(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl<P: Display> Display for Ltl<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ltl::True => write!(f, "true"),
            Ltl::Ap(p) => write!(f, "{}", p),
            Ltl::Not(a) => write!(f, "!{}", a),
            Ltl::And(a, b) => write!(f, "({} && {})", a, b),
            Ltl::Next(a) => write!(f, "X {}", a),
            Ltl::Until(a, b) => write!(f, "({} U {})", a, b),
        }
    }
}
