//! Closure of an LTL formula and its elementary sets.
//!
//! An elementary set assigns a truth value to every positive subformula of
//! `φ` in a way that is locally consistent: conjunctions hold iff both
//! conjuncts do, `true` always holds, and an until holds whenever its right
//! operand does and never when neither operand does. A negated subformula
//! holds in a set exactly when the subformula itself does not, so negations
//! need no slot of their own.
//!
//! The sets are enumerated by a single fold over the subformulas in
//! post-order: atomic propositions, nexts and "undecided" untils split every
//! partial assignment in two, all other subformulas are forced.

use std::fmt::Display;

use indexmap::IndexSet;
use log::debug;

use crate::ltl::Ltl;
use crate::types::Element;

/// A truth assignment over the closure, indexed by subformula position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementarySet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of subformulas covered
    len: usize,
}

impl ElementarySet {
    const BITS_PER_WORD: usize = 64;

    /// All subformulas false.
    pub fn new(len: usize) -> Self {
        let num_words = len.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            len,
        }
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Number of subformulas covered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let (word, bit) = Self::word_and_bit(index);
        self.words[word] & (1u64 << bit) != 0
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "index {} out of bounds ({})", index, self.len);
        let (word, bit) = Self::word_and_bit(index);
        if value {
            self.words[word] |= 1u64 << bit;
        } else {
            self.words[word] &= !(1u64 << bit);
        }
    }

    pub fn with(mut self, index: usize, value: bool) -> Self {
        self.set(index, value);
        self
    }

    /// Indices of the subformulas that hold.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.contains(i))
    }
}

#[derive(Debug, Clone)]
pub struct Closure<P> {
    subformulas: IndexSet<Ltl<P>>,
    elements: Vec<ElementarySet>,
}

impl<P: Element + Ord> Closure<P> {
    pub fn new(phi: &Ltl<P>) -> Self {
        let subformulas = phi.subformulas();
        let n = subformulas.len();
        let mut closure = Self {
            subformulas,
            elements: Vec::new(),
        };

        let mut partial = vec![ElementarySet::new(n)];
        for (i, psi) in closure.subformulas.iter().enumerate() {
            partial = partial
                .into_iter()
                .flat_map(|b| {
                    let forced = match psi {
                        Ltl::True => Some(true),
                        Ltl::Ap(_) | Ltl::Next(_) => None,
                        Ltl::And(l, r) => Some(closure.holds(l, &b) && closure.holds(r, &b)),
                        Ltl::Until(l, r) => {
                            if closure.holds(r, &b) {
                                Some(true)
                            } else if closure.holds(l, &b) {
                                None
                            } else {
                                Some(false)
                            }
                        }
                        // Never listed as a subformula.
                        Ltl::Not(_) => Some(false),
                    };
                    match forced {
                        Some(v) => vec![b.with(i, v)],
                        None => vec![b.clone().with(i, false), b.with(i, true)],
                    }
                })
                .collect();
        }

        debug!("Closure::new: {} subformulas, {} elementary sets", n, partial.len());
        closure.elements = partial;
        closure
    }

    pub fn subformulas(&self) -> &IndexSet<Ltl<P>> {
        &self.subformulas
    }

    pub fn elements(&self) -> &[ElementarySet] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn index_of(&self, f: &Ltl<P>) -> Option<usize> {
        self.subformulas.get_index_of(f)
    }

    /// Whether `f` holds in `b`. `f` must be a subformula or a negated one.
    pub fn holds(&self, f: &Ltl<P>, b: &ElementarySet) -> bool {
        match f {
            Ltl::Not(inner) => !self.holds(inner, b),
            _ => self.index_of(f).is_some_and(|i| b.contains(i)),
        }
    }

    /// Renders `b` as the list of subformulas that hold in it.
    pub fn describe(&self, b: &ElementarySet) -> String
    where
        P: Display,
    {
        let items: Vec<String> = b
            .iter()
            .filter_map(|i| self.subformulas.get_index(i))
            .map(|f| f.to_string())
            .collect();
        format!("{{{}}}", items.join(", "))
    }
}
