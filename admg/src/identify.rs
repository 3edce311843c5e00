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

//! Identification of interventional distributions by fixing.
//!
//! To identify `p_X(Y)` on an ADMG `G` with nodes `V`:
//!
//! 1. Let `Y*` be the ancestors of `Y` in the subgraph on `V \ X`.
//! 2. Split `Y*` into the districts of the subgraph on `Y*`.
//! 3. For each district `D`, find an order in which every node of `V \ D`
//!    can be fixed. Replaying the order on the joint `p(V)` gives a
//!    [`Quotient`] for `D`.
//! 4. Multiply the district quotients and sum out `Y* \ Y`.
//!
//! If some district has no complete fixing order, the effect is not
//! identifiable. This is a normal outcome, reported through
//! [`Identified::identifiable`].

use crate::error::GraphError;
use crate::expr::{Expr, Style};
use crate::graph::{Admg, Node, NodeSet};
use crate::quotient::Quotient;
use crate::util::csep;
use itertools::Itertools;
use rand::Rng;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// How [`idfixall`] picks among the expressions of all fixing sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FixMode {
    /// One result per combination of fixing sequences.
    #[default]
    #[display("all")]
    All,
    /// The result with the fewest factors.
    #[display("shortest")]
    Shortest,
    /// The result with the most summed variables.
    #[display("mostmrg")]
    MostMarginalized,
    /// A result drawn uniformly at random.
    #[display("random")]
    Random,
}

impl FromStr for FixMode {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FixMode::All),
            "shortest" => Ok(FixMode::Shortest),
            "mostmrg" => Ok(FixMode::MostMarginalized),
            "random" => Ok(FixMode::Random),
            _ => Err(GraphError::UnknownMode(s.to_string())),
        }
    }
}

/// An order in which nodes are fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, derive_more::From)]
pub struct FixingSequence(pub Vec<Node>);

impl FixingSequence {
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FixingSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

/// Outcome of a factorization or identification query.
///
/// `text` is `lhs=rhs` in plain notation, e.g. `p_{X}(Y)=sum_{C}[p(Y|C,X)p(C)]`.
/// When `identifiable` is false, `text` is empty and `expr` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identified {
    pub text: String,
    pub expr: Option<Expr>,
    pub quotient: Option<Quotient>,
    pub identifiable: bool,
    /// The fixing sequences used, one per district.
    pub sequences: Vec<FixingSequence>,
}

impl Identified {
    pub(crate) fn found(lhs: String, quotient: Quotient, expr: Expr) -> Self {
        Identified {
            text: format!("{lhs}={}", expr.render(Style::Plain)),
            expr: Some(expr),
            quotient: Some(quotient),
            identifiable: true,
            sequences: vec![],
        }
    }

    pub fn not_identifiable() -> Self {
        Identified {
            text: String::new(),
            expr: None,
            quotient: None,
            identifiable: false,
            sequences: vec![],
        }
    }

    pub fn factor_count(&self) -> usize {
        self.expr.as_ref().map_or(0, Expr::factor_count)
    }

    pub fn marginalized_count(&self) -> usize {
        self.expr.as_ref().map_or(0, Expr::marginalized_count)
    }

    /// The identified expression with `lhs=` prepended, in the given style.
    pub fn render(&self, style: Style) -> String {
        match (&self.expr, self.text.split_once('=')) {
            (Some(e), Some((lhs, _))) => format!("{lhs}={}", e.render(style)),
            _ => String::new(),
        }
    }
}

impl fmt::Display for Identified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The left-hand side `p_{X}(Y)`.
pub(crate) fn interventional(x: &NodeSet, y: &NodeSet) -> String {
    format!("p_{{{}}}({})", csep(x), csep(y))
}

/// Fixes `n` in `g`, recording the step in `q`. Returns the fixed graph.
///
/// A childless node is summed out rather than divided out.
pub fn fix_step(g: &Admg, q: &mut Quotient, n: &str) -> Admg {
    if g.ch([&n.to_string()]).is_empty() {
        q.fix_marginal(n);
    } else {
        q.fix(n, &g.dispa(n));
    }
    g.fix(n)
}

/// Validated cause and effect sets, with `Y*` and its districts.
struct Query {
    x: NodeSet,
    y: NodeSet,
    y_star: NodeSet,
    districts: Vec<NodeSet>,
}

impl Query {
    fn new(g: &Admg, x: &NodeSet, y: &NodeSet) -> Result<Self, GraphError> {
        if x.is_empty() {
            return Err(GraphError::EmptyCause);
        }
        g.check_nodes(x.iter().chain(y))?;
        if let Some(n) = x.intersection(y).next() {
            return Err(GraphError::Overlap(n.clone()));
        }
        if !g.is_dag() {
            return Err(GraphError::Cyclic);
        }

        let rest: NodeSet = g.nodes().difference(x).cloned().collect();
        let y = if y.is_empty() { rest.clone() } else { y.clone() };
        if y.is_empty() {
            return Err(GraphError::EmptyEffect);
        }

        let y_star = g.induced_subgraph(&rest).an(&y);
        let districts = g.induced_subgraph(&y_star).districts();
        log::debug!(
            "Y* = {{{}}}, districts: {}",
            csep(&y_star),
            districts.iter().map(|d| format!("{{{}}}", csep(d))).join(" ")
        );

        Ok(Query {
            x: x.clone(),
            y,
            y_star,
            districts,
        })
    }
}

/// A point in the search where more than one node may be fixed next.
struct ChoicePoint {
    graph: Admg,
    remaining: NodeSet,
    sequence: Vec<Node>,
    /// Untried moves, in reverse order so the next one is at the back.
    moves: Vec<Node>,
}

impl ChoicePoint {
    fn new(graph: Admg, remaining: NodeSet, sequence: Vec<Node>) -> Self {
        let moves = remaining
            .iter()
            .rev()
            .filter(|n| graph.is_fixable(n))
            .cloned()
            .collect();
        ChoicePoint {
            graph,
            remaining,
            sequence,
            moves,
        }
    }
}

/// All orders (at most `limit`, if given) in which every node of `to_fix`
/// can be fixed in `g`, one node at a time.
///
/// Depth-first over an explicit stack. At each choice point moves are tried
/// in label order, so the result order is deterministic.
pub fn fixing_sequences(
    g: &Admg,
    to_fix: &NodeSet,
    limit: Option<usize>,
) -> Vec<FixingSequence> {
    let mut found = vec![];
    let mut stack = vec![ChoicePoint::new(g.clone(), to_fix.clone(), vec![])];

    while let Some(top) = stack.last_mut() {
        if top.remaining.is_empty() {
            found.push(FixingSequence(top.sequence.clone()));
            stack.pop();
            if limit.is_some_and(|l| found.len() >= l) {
                break;
            }
            continue;
        }

        match top.moves.pop() {
            Some(n) => {
                let graph = top.graph.fix(&n);
                let mut remaining = top.remaining.clone();
                remaining.remove(&n);
                let mut sequence = top.sequence.clone();
                sequence.push(n);
                stack.push(ChoicePoint::new(graph, remaining, sequence));
            }
            None => {
                log::trace!(
                    "dead end after [{}], stuck on {{{}}}",
                    top.sequence.iter().join(","),
                    csep(&top.remaining)
                );
                stack.pop();
            }
        }
    }

    found
}

/// Replays `seq` on the joint distribution of `g`.
fn replay(g: &Admg, seq: &FixingSequence) -> Quotient {
    let mut q = Quotient::joint(g.nodes().clone());
    let mut g = g.clone();
    for n in seq.nodes() {
        g = fix_step(&g, &mut q, n);
    }
    q.simplify();
    q
}

/// Identifies `p_X(Y)` once for every combination of per-district fixing
/// sequences. Returns an empty list if some district can't be fixed.
fn identify(g: &Admg, query: &Query, limit: Option<usize>) -> Vec<Identified> {
    let mut per_district: Vec<Vec<(FixingSequence, Quotient)>> = vec![];
    for d in &query.districts {
        let to_fix: NodeSet = g.nodes().difference(d).cloned().collect();
        let seqs = fixing_sequences(g, &to_fix, limit);
        log::debug!("district {{{}}}: {} fixing sequences", csep(d), seqs.len());
        if seqs.is_empty() {
            return vec![];
        }
        per_district.push(
            seqs.into_par_iter()
                .map(|s| {
                    let q = replay(g, &s);
                    (s, q)
                })
                .collect(),
        );
    }

    let lhs = interventional(&query.x, &query.y);
    let mrg: NodeSet = query.y_star.difference(&query.y).cloned().collect();

    per_district
        .iter()
        .map(|v| v.iter())
        .multi_cartesian_product()
        .map(|combo| {
            let mut q = Quotient::with_marginals(mrg.clone());
            let mut sequences = vec![];
            for (s, dq) in combo {
                q.absorb(dq.clone());
                sequences.push(s.clone());
            }
            q.simplify();
            let e = q.to_expr().simplify();
            Identified {
                sequences,
                ..Identified::found(lhs.clone(), q, e)
            }
        })
        .collect()
}

/// Identifies `p_X(Y)` using the first complete fixing sequence of each
/// district.
///
/// An empty `y` stands for every node not in `x`.
pub fn idfixing(g: &Admg, x: &NodeSet, y: &NodeSet) -> Result<Identified, GraphError> {
    let query = Query::new(g, x, y)?;
    Ok(identify(g, &query, Some(1))
        .into_iter()
        .next()
        .unwrap_or_else(Identified::not_identifiable))
}

/// Identifies `p_X(Y)` over every fixing sequence and selects results by
/// `mode`. Random selection uses the thread-local generator.
///
/// Returns an empty list if the effect is not identifiable.
pub fn idfixall(
    g: &Admg,
    x: &NodeSet,
    y: &NodeSet,
    mode: FixMode,
) -> Result<Vec<Identified>, GraphError> {
    idfixall_with_rng(g, x, y, mode, &mut rand::rng())
}

/// As [`idfixall`], drawing random selections from `rng`.
pub fn idfixall_with_rng(
    g: &Admg,
    x: &NodeSet,
    y: &NodeSet,
    mode: FixMode,
    rng: &mut impl Rng,
) -> Result<Vec<Identified>, GraphError> {
    let query = Query::new(g, x, y)?;
    let mut all = identify(g, &query, None);
    log::debug!("{} identified expressions, selecting by {mode}", all.len());

    if all.is_empty() {
        return Ok(all);
    }

    let pick = match mode {
        FixMode::All => return Ok(all),
        FixMode::Shortest => all
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| r.factor_count())
            .map(|(i, _)| i),
        FixMode::MostMarginalized => all
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| Reverse(r.marginalized_count()))
            .map(|(i, _)| i),
        FixMode::Random => Some(rng.random_range(0..all.len())),
    };

    Ok(pick.map(|i| vec![all.swap_remove(i)]).unwrap_or_default())
}
