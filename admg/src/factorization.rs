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

//! Factorizations of joint and interventional distributions.

use crate::error::GraphError;
use crate::graph::{Admg, NodeSet};
use crate::identify::{fix_step, interventional, Identified};
use crate::quotient::Quotient;
use crate::util::csep;

fn joint_lhs(y: &NodeSet) -> String {
    format!("p({})", csep(y))
}

fn effect_or_all(g: &Admg, y: &NodeSet) -> Result<NodeSet, GraphError> {
    g.check_nodes(y)?;
    Ok(if y.is_empty() {
        g.nodes().clone()
    } else {
        y.clone()
    })
}

/// Chain rule in reverse topological order: `p(n, pa(n)) / p(pa(n))` for
/// every node `n`.
fn chain(g: &Admg, order: &[String], q: &mut Quotient) {
    for n in order.iter().rev() {
        let parents = g.pa([n]);
        let mut family = parents.clone();
        family.insert(n.clone());
        q.push_num(family);
        q.push_den(parents);
    }
}

/// Factorizes the joint distribution of a DAG, marginalized to `y`.
///
/// With `simplify` off, the result is the raw chain-rule product (summed
/// over `V \ Y` if `y` is smaller than the graph). An empty `y` means every
/// node.
pub fn dagfactor(g: &Admg, y: &NodeSet, simplify: bool) -> Result<Identified, GraphError> {
    if g.has_latent() {
        return Err(GraphError::Latent("DAG factorization"));
    }
    let order = g.topsort()?;
    let y = effect_or_all(g, y)?;

    let mut q = Quotient::with_marginals(g.nodes().difference(&y).cloned().collect());
    chain(g, &order, &mut q);

    let e = if simplify {
        q.simplify();
        q.to_expr().simplify()
    } else {
        q.to_expr()
    };
    Ok(Identified::found(joint_lhs(&y), q, e))
}

/// Truncated factorization (g-formula) of `p_X(Y)` for a DAG.
///
/// Nodes of `x` are fixed in label order, starting from the chain-rule
/// factorization, or from the unfactored joint if `prefactor` is false.
/// An empty `y` means every node not in `x`. Arguments are checked in the
/// same order as [`crate::idfixing`].
pub fn truncfactor(
    g: &Admg,
    x: &NodeSet,
    y: &NodeSet,
    prefactor: bool,
) -> Result<Identified, GraphError> {
    if x.is_empty() {
        return Err(GraphError::EmptyCause);
    }
    g.check_nodes(x.iter().chain(y))?;
    if let Some(n) = x.intersection(y).next() {
        return Err(GraphError::Overlap(n.clone()));
    }
    if g.has_latent() {
        return Err(GraphError::Latent("Truncated factorization"));
    }
    let order = g.topsort()?;
    let y: NodeSet = if y.is_empty() {
        g.nodes().difference(x).cloned().collect()
    } else {
        y.clone()
    };
    if y.is_empty() {
        return Err(GraphError::EmptyEffect);
    }

    let mut q = if prefactor {
        let mut q = Quotient::new();
        chain(g, &order, &mut q);
        q
    } else {
        Quotient::joint(g.nodes().clone())
    };

    let mut fixed = g.clone();
    for n in x {
        fixed = fix_step(&fixed, &mut q, n);
    }
    q.simplify();

    let mrg = g
        .nodes()
        .iter()
        .filter(|n| !y.contains(*n) && !x.contains(*n))
        .cloned()
        .collect();
    let mut id = Quotient::with_marginals(mrg);
    id.absorb(q);
    id.simplify();

    let e = id.to_expr().simplify();
    Ok(Identified::found(interventional(x, &y), id, e))
}

/// Topological factorization of the joint distribution of an ADMG,
/// marginalized to `y`.
///
/// Each node `n` is conditioned on its district `D` within the nodes up to
/// `n` in topological order, together with the parents of `D`. For a DAG
/// this is the chain rule.
pub fn admgfactor(g: &Admg, y: &NodeSet) -> Result<Identified, GraphError> {
    let order = g.topsort()?;
    let y = effect_or_all(g, y)?;

    let mut q = Quotient::with_marginals(g.nodes().difference(&y).cloned().collect());
    for (i, n) in order.iter().enumerate() {
        let preceding: NodeSet = order[..=i].iter().cloned().collect();
        let dis = g.induced_subgraph(&preceding).district(n);
        let mut shield = g.pa(&dis);
        shield.extend(dis);
        shield.remove(n);

        let mut family = shield.clone();
        family.insert(n.clone());
        q.push_num(family);
        q.push_den(shield);
    }
    q.simplify();

    let e = q.to_expr().simplify();
    Ok(Identified::found(joint_lhs(&y), q, e))
}
