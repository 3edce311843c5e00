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

//! Symbolic probability expressions.
//!
//! An [`Expr`] is a tree of products, sums (marginalizations) and
//! conditional probability atoms [`Factor`]. Expressions are values:
//! [`Expr::simplify`] and friends return new trees.

use crate::graph::{Admg, Node, NodeSet};
use crate::util::csep;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A conditional probability term `p(target | given)`.
///
/// A divisor factor stands in the denominator of the product that
/// contains it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Factor {
    pub target: NodeSet,
    pub given: NodeSet,
    pub divisor: bool,
}

impl Factor {
    pub fn new(target: NodeSet, given: NodeSet) -> Self {
        Factor {
            target,
            given,
            divisor: false,
        }
    }

    /// The factor `1 / p(target | given)`.
    pub fn inverse(target: NodeSet, given: NodeSet) -> Self {
        Factor {
            target,
            given,
            divisor: true,
        }
    }

    pub fn vars(&self) -> NodeSet {
        self.target.union(&self.given).cloned().collect()
    }

    fn atom(&self) -> String {
        if self.given.is_empty() {
            format!("p({})", csep(&self.target))
        } else {
            format!("p({}|{})", csep(&self.target), csep(&self.given))
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.divisor {
            write!(f, "1/{}", self.atom())
        } else {
            write!(f, "{}", self.atom())
        }
    }
}

/// The three kinds of expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ExprKind {
    Factor,
    Product,
    Sum,
}

/// Output format for [`Expr::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Style {
    #[default]
    #[display("plain")]
    Plain,
    #[display("latex")]
    Latex,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Expr {
    Factor(Factor),
    /// Product of terms, kept in insertion order. The empty product is 1.
    Product(Vec<Expr>),
    /// Marginalization of `body` over the variables in `over`.
    Sum { over: NodeSet, body: Box<Expr> },
}

impl From<Factor> for Expr {
    fn from(f: Factor) -> Self {
        Expr::Factor(f)
    }
}

impl Expr {
    /// The constant 1, as an empty product.
    pub fn one() -> Self {
        Expr::Product(vec![])
    }

    pub fn factor(target: NodeSet, given: NodeSet) -> Self {
        Expr::Factor(Factor::new(target, given))
    }

    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Factor(_) => ExprKind::Factor,
            Expr::Product(_) => ExprKind::Product,
            Expr::Sum { .. } => ExprKind::Sum,
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Product(ts) if ts.is_empty())
    }

    /// Variables mentioned by the expression and not bound by a sum.
    pub fn free_vars(&self) -> NodeSet {
        match self {
            Expr::Factor(f) => f.vars(),
            Expr::Product(ts) => ts.iter().flat_map(|t| t.free_vars()).collect(),
            Expr::Sum { over, body } => body.free_vars().difference(over).cloned().collect(),
        }
    }

    /// Number of factor leaves.
    pub fn factor_count(&self) -> usize {
        match self {
            Expr::Factor(_) => 1,
            Expr::Product(ts) => ts.iter().map(Expr::factor_count).sum(),
            Expr::Sum { body, .. } => body.factor_count(),
        }
    }

    /// Total number of variables bound by sums, counted over every sum.
    pub fn marginalized_count(&self) -> usize {
        match self {
            Expr::Factor(_) => 0,
            Expr::Product(ts) => ts.iter().map(Expr::marginalized_count).sum(),
            Expr::Sum { over, body } => over.len() + body.marginalized_count(),
        }
    }

    /// The same expression with every product's terms sorted.
    ///
    /// Two expressions that differ only in the order of product terms have
    /// equal canonical forms.
    pub fn canonical(&self) -> Expr {
        match self {
            Expr::Factor(f) => Expr::Factor(f.clone()),
            Expr::Product(ts) => {
                let mut ts: Vec<Expr> = ts.iter().map(Expr::canonical).collect();
                ts.sort();
                Expr::Product(ts)
            }
            Expr::Sum { over, body } => Expr::Sum {
                over: over.clone(),
                body: Box::new(body.canonical()),
            },
        }
    }

    /// Rewrites the expression until no rule applies.
    ///
    /// The result is a fixed point, so simplifying it again returns an equal
    /// expression.
    pub fn simplify(&self) -> Expr {
        let mut e = self.clone();
        loop {
            let next = e.clone().simplify_pass();
            if next == e {
                return e;
            }
            e = next;
        }
    }

    fn simplify_pass(self) -> Expr {
        match self {
            Expr::Factor(f) => {
                if f.target.is_empty() {
                    Expr::one()
                } else {
                    Expr::Factor(f)
                }
            }
            Expr::Product(ts) => {
                let mut flat = Vec::with_capacity(ts.len());
                for t in ts {
                    match t.simplify_pass() {
                        Expr::Product(inner) => flat.extend(inner),
                        t => flat.push(t),
                    }
                }
                cancel_divisors(&mut flat);
                if flat.len() == 1 {
                    flat.remove(0)
                } else {
                    Expr::Product(flat)
                }
            }
            Expr::Sum { over, body } => simplify_sum(over, body.simplify_pass()),
        }
    }

    pub fn render(&self, style: Style) -> String {
        match self {
            Expr::Factor(f) => match (f.divisor, style) {
                (false, _) => f.atom(),
                (true, Style::Plain) => format!("1/{}", f.atom()),
                (true, Style::Latex) => format!("\\frac{{1}}{{{}}}", f.atom()),
            },
            Expr::Product(ts) => {
                if ts.is_empty() {
                    return "1".to_string();
                }
                let mut num = String::new();
                let mut den = vec![];
                for t in ts {
                    match t {
                        Expr::Factor(f) if f.divisor => den.push(f.atom()),
                        t => num.push_str(&t.render(style)),
                    }
                }
                if num.is_empty() {
                    num.push('1');
                }
                match (den.len(), style) {
                    (0, _) => num,
                    (1, Style::Plain) => format!("{num}/{}", den[0]),
                    (_, Style::Plain) => format!("{num}/{{{}}}", den.concat()),
                    (_, Style::Latex) => format!("\\frac{{{num}}}{{{}}}", den.concat()),
                }
            }
            Expr::Sum { over, body } => match style {
                Style::Plain => format!("sum_{{{}}}[{}]", csep(over), body.render(style)),
                Style::Latex => format!(
                    "\\sum_{{{}}}\\left[{}\\right]",
                    csep(over),
                    body.render(style)
                ),
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(Style::Plain))
    }
}

/// Removes pairs of a factor and an identical divisor factor.
fn cancel_divisors(terms: &mut Vec<Expr>) {
    while let Some((i, j)) = cancelling_pair(terms) {
        terms.remove(i.max(j));
        terms.remove(i.min(j));
    }
}

fn cancelling_pair(terms: &[Expr]) -> Option<(usize, usize)> {
    terms.iter().enumerate().find_map(|(i, t)| match t {
        Expr::Factor(f) if !f.divisor => {
            let inv = Expr::Factor(Factor::inverse(f.target.clone(), f.given.clone()));
            terms.iter().position(|u| *u == inv).map(|j| (i, j))
        }
        _ => None,
    })
}

/// One rewrite step for `sum_{over}[body]`, where `body` is already rewritten.
fn simplify_sum(mut over: NodeSet, body: Expr) -> Expr {
    if over.is_empty() {
        return body;
    }
    let mut terms = match body {
        Expr::Sum {
            over: inner,
            body: inner_body,
        } => {
            over.extend(inner);
            return Expr::Sum {
                over,
                body: inner_body,
            };
        }
        Expr::Product(ts) => ts,
        t => vec![t],
    };

    for v in over.clone() {
        let hits: Vec<usize> = (0..terms.len())
            .filter(|&i| terms[i].free_vars().contains(&v))
            .collect();
        match hits[..] {
            [] => {
                over.remove(&v);
            }
            // summing a variable out of the one factor it is the target of
            [i] => {
                if let Expr::Factor(f) = &mut terms[i] {
                    if !f.divisor && f.target.contains(&v) && !f.given.contains(&v) {
                        f.target.remove(&v);
                        over.remove(&v);
                    }
                }
            }
            _ => {}
        }
    }

    if over.is_empty() {
        return Expr::Product(terms);
    }

    let (mut dep, mut outside): (Vec<Expr>, Vec<Expr>) = terms
        .into_iter()
        .partition(|t| !t.free_vars().is_disjoint(&over));
    let body = if dep.len() == 1 {
        dep.remove(0)
    } else {
        Expr::Product(dep)
    };
    let inner = Expr::Sum {
        over,
        body: Box::new(body),
    };
    if outside.is_empty() {
        inner
    } else {
        outside.push(inner);
        Expr::Product(outside)
    }
}

/// Chain-rule factorization of the joint distribution of `g`: one factor
/// `p(n | pa(n))` per node, in the given order.
///
/// `order` should be a topological order of `g`. This is not checked.
pub fn factorize(g: &Admg, order: &[Node]) -> Expr {
    Expr::Product(
        order
            .iter()
            .map(|n| Expr::factor(NodeSet::from([n.clone()]), g.pa([n])))
            .collect(),
    )
}

/// Wraps `e` in a sum over `vars`.
pub fn marginalize(e: Expr, vars: NodeSet) -> Expr {
    Expr::Sum {
        over: vars,
        body: Box::new(e),
    }
}
