// admg - Rust library for acyclic directed mixed graphs and causal
//        effect identification
// Copyright (C) 2025 - Aleks Kissinger
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Working form of a probability expression during fixing.
//!
//! A [`Quotient`] is
//!
//! ```text
//!   sum_{mrg} [ p(N1) p(N2) ... / p(D1) p(D2) ... ]
//! ```
//!
//! where every `Ni`, `Di` is a joint term over a set of variables. Fixing a
//! node multiplies in one more ratio of joint terms; [`Quotient::simplify`]
//! then cancels what it can before the result is turned into an [`Expr`].

use crate::expr::{Expr, Factor};
use crate::graph::{Node, NodeSet};
use crate::util::fresh_prime;
use std::cmp::Reverse;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quotient {
    num: Vec<NodeSet>,
    den: Vec<NodeSet>,
    mrg: NodeSet,
}

impl Quotient {
    pub fn new() -> Self {
        Quotient::default()
    }

    /// The joint distribution `p(vars)`.
    pub fn joint(vars: NodeSet) -> Self {
        let mut q = Quotient::new();
        q.push_num(vars);
        q
    }

    /// An empty product summed over `mrg`.
    pub fn with_marginals(mrg: NodeSet) -> Self {
        Quotient {
            mrg,
            ..Default::default()
        }
    }

    pub fn num(&self) -> &[NodeSet] {
        &self.num
    }

    pub fn den(&self) -> &[NodeSet] {
        &self.den
    }

    pub fn mrg(&self) -> &NodeSet {
        &self.mrg
    }

    /// Multiplies by `p(term)`. Empty terms are skipped.
    pub fn push_num(&mut self, term: NodeSet) {
        if !term.is_empty() {
            self.num.push(term);
        }
    }

    /// Divides by `p(term)`. Empty terms are skipped.
    pub fn push_den(&mut self, term: NodeSet) {
        if !term.is_empty() {
            self.den.push(term);
        }
    }

    /// Every variable occurring anywhere in the quotient.
    pub fn vars(&self) -> NodeSet {
        let mut vs = self.mrg.clone();
        for t in self.num.iter().chain(&self.den) {
            vs.extend(t.iter().cloned());
        }
        vs
    }

    /// Fixes `n`, whose district-parents are `blanket`: multiplies by
    /// `p(blanket) / p(blanket ∪ {n})`, or divides by `p(n)` if the blanket is
    /// empty.
    pub fn fix(&mut self, n: &str, blanket: &NodeSet) {
        if blanket.is_empty() {
            self.push_den(NodeSet::from([n.to_string()]));
        } else {
            let mut with_n = blanket.clone();
            with_n.insert(n.to_string());
            self.push_num(blanket.clone());
            self.push_den(with_n);
        }
    }

    /// Fixes a childless node by turning it into a summed dummy variable.
    ///
    /// Returns the dummy's name: `n` with primes appended until it is fresh.
    pub fn fix_marginal(&mut self, n: &str) -> Node {
        let vars = self.vars();
        let new = fresh_prime(n, |v| vars.contains(v));
        self.rename(n, &new);
        self.mrg.insert(new.clone());
        new
    }

    /// Renames every occurrence of `old`.
    pub fn rename(&mut self, old: &str, new: &str) {
        for t in self
            .num
            .iter_mut()
            .chain(self.den.iter_mut())
            .chain(std::iter::once(&mut self.mrg))
        {
            if t.remove(old) {
                t.insert(new.to_string());
            }
        }
    }

    /// Cancels numerator terms against equal denominator terms, one for one.
    ///
    /// Returns true if anything cancelled.
    pub fn cancel(&mut self) -> bool {
        let mut changed = false;
        let mut kept = Vec::with_capacity(self.num.len());
        for t in std::mem::take(&mut self.num) {
            if let Some(i) = self.den.iter().position(|d| *d == t) {
                self.den.remove(i);
                changed = true;
            } else {
                kept.push(t);
            }
        }
        self.num = kept;
        changed
    }

    /// Sums out every marginalized variable that occurs in exactly one
    /// numerator term and in no denominator term.
    ///
    /// Returns true if anything was summed out.
    pub fn marginal(&mut self) -> bool {
        let mut changed = false;
        for v in self.mrg.clone() {
            let hits = self.num.iter().filter(|t| t.contains(&v)).count();
            let in_den = self.den.iter().any(|t| t.contains(&v));
            if hits == 1 && !in_den {
                for t in self.num.iter_mut() {
                    t.remove(&v);
                }
                self.mrg.remove(&v);
                changed = true;
            }
        }
        self.num.retain(|t| !t.is_empty());
        changed
    }

    /// Alternates [`Quotient::cancel`] and [`Quotient::marginal`] until
    /// neither changes anything.
    pub fn simplify(&mut self) {
        loop {
            let cancelled = self.cancel();
            let summed = self.marginal();
            if !cancelled && !summed {
                break;
            }
        }
    }

    /// Multiplies in `other`.
    ///
    /// Summed variables of `other` that clash with summed variables of `self`
    /// are primed first, so the two sums stay independent.
    pub fn absorb(&mut self, mut other: Quotient) {
        let clashes: Vec<Node> = self.mrg.intersection(&other.mrg).cloned().collect();
        for v in clashes {
            let mut taken = self.vars();
            taken.extend(other.vars());
            let new = fresh_prime(&v, |n| taken.contains(n));
            other.rename(&v, &new);
        }
        self.num.append(&mut other.num);
        self.den.append(&mut other.den);
        self.mrg.append(&mut other.mrg);
    }

    /// Reads the quotient as a product of conditional factors.
    ///
    /// Numerator terms are visited largest first. Each is paired with the
    /// first unused denominator term (again largest first) that it contains,
    /// giving `p(num \ den | den)`. Denominator terms left over become
    /// divisor factors.
    pub fn to_expr(&self) -> Expr {
        let mut num = self.num.clone();
        num.sort_by_key(|t| Reverse(t.len()));
        let mut den = self.den.clone();
        den.sort_by_key(|t| Reverse(t.len()));

        let mut terms = Vec::with_capacity(num.len() + den.len());
        for n in num {
            match den.iter().position(|d| d.is_subset(&n)) {
                Some(i) => {
                    let d = den.remove(i);
                    let target = n.difference(&d).cloned().collect();
                    terms.push(Expr::factor(target, d));
                }
                None => terms.push(Expr::factor(n, NodeSet::new())),
            }
        }
        terms.extend(
            den.into_iter()
                .map(|d| Expr::Factor(Factor::inverse(d, NodeSet::new()))),
        );

        let body = Expr::Product(terms);
        if self.mrg.is_empty() {
            body
        } else {
            Expr::Sum {
                over: self.mrg.clone(),
                body: Box::new(body),
            }
        }
    }
}
