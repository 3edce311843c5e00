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

//! Conditional independence read off a graph: districts, d-separation and
//! the local Markov property.

use crate::error::GraphError;
use crate::graph::{Admg, Node, NodeSet};
use crate::util::csep;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A conditional independence statement `X ⊥ Y | Z`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CondInd {
    pub x: NodeSet,
    pub y: NodeSet,
    pub z: NodeSet,
}

impl CondInd {
    pub fn new(x: NodeSet, y: NodeSet, z: NodeSet) -> Self {
        CondInd { x, y, z }
    }

    pub fn to_latex(&self) -> String {
        let mut s = format!("{} \\perp\\!\\!\\!\\perp {}", csep(&self.x), csep(&self.y));
        if !self.z.is_empty() {
            s.push_str(" \\mid ");
            s.push_str(&csep(&self.z));
        }
        format!("({s})")
    }
}

impl fmt::Display for CondInd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}\u{22a5}{}", csep(&self.x), csep(&self.y))?;
        if !self.z.is_empty() {
            write!(f, "|{}", csep(&self.z))?;
        }
        write!(f, ")")
    }
}

/// Partitions `nodes` into maximal sets connected by bidirected edges inside
/// the subgraph induced on `nodes`.
pub fn districts(g: &Admg, nodes: &NodeSet) -> Result<Vec<NodeSet>, GraphError> {
    g.check_nodes(nodes)?;
    Ok(g.districts_of(nodes))
}

/// Undirected graph with an edge between every pair of nodes joined by a
/// collider path in `g`.
///
/// Two nodes are joined exactly when they both lie in `D ∪ pa(D)` for some
/// district `D`. This covers plain directed and bidirected edges too, so
/// for a DAG it is the usual moral graph.
fn augmented(g: &Admg) -> FxHashMap<&str, FxHashSet<&str>> {
    let mut adj: FxHashMap<&str, FxHashSet<&str>> = g
        .nodes()
        .iter()
        .map(|n| (n.as_str(), FxHashSet::default()))
        .collect();

    for d in g.districts() {
        let mut closed = g.pa(&d);
        closed.extend(d);
        let closed: Vec<&str> = closed
            .iter()
            .filter_map(|n| g.nodes().get(n).map(String::as_str))
            .collect();
        for (&a, &b) in closed.iter().tuple_combinations() {
            adj.entry(a).or_default().insert(b);
            adj.entry(b).or_default().insert(a);
        }
    }

    adj
}

/// Returns true if `x` and `y` are d-separated given `z` in `g`.
///
/// Builds the ancestral subgraph of `x ∪ y ∪ z`, augments it, deletes `z`,
/// and checks that no path joins `x` to `y`. Bidirected edges count as
/// collider-compatible at both ends, so for ADMGs this is m-separation.
pub fn d_separated(
    g: &Admg,
    x: &NodeSet,
    y: &NodeSet,
    z: &NodeSet,
) -> Result<bool, GraphError> {
    g.check_nodes(x.iter().chain(y).chain(z))?;

    let anc = g.an(x.iter().chain(y).chain(z));
    let h = g.induced_subgraph(&anc);
    let adj = augmented(&h);

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut stack: Vec<&str> = vec![];
    for n in x.difference(z) {
        seen.insert(n);
        stack.push(n);
    }

    while let Some(v) = stack.pop() {
        if y.contains(v) {
            return Ok(false);
        }
        if let Some(ws) = adj.get(v) {
            for &w in ws {
                if !z.contains(w) && seen.insert(w) {
                    stack.push(w);
                }
            }
        }
    }

    Ok(true)
}

pub fn d_connected(
    g: &Admg,
    x: &NodeSet,
    y: &NodeSet,
    z: &NodeSet,
) -> Result<bool, GraphError> {
    d_separated(g, x, y, z).map(|sep| !sep)
}

/// The local Markov independences of a DAG: each node is independent of its
/// non-descendants (other than its parents) given its parents.
///
/// Statements come out in topological order. A node whose non-descendants
/// are all parents contributes nothing.
pub fn local_markov(g: &Admg) -> Result<Vec<CondInd>, GraphError> {
    if g.has_latent() {
        return Err(GraphError::Latent("Local Markov enumeration"));
    }

    let mut out = vec![];
    for n in g.topsort()? {
        let single: [&Node; 1] = [&n];
        let parents = g.pa(single);
        let rest: NodeSet = g.nd(single).difference(&parents).cloned().collect();
        if !rest.is_empty() {
            out.push(CondInd::new(NodeSet::from([n.clone()]), rest, parents));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::nodeset;
    use rstest::{fixture, rstest};

    #[fixture]
    fn symptoms() -> Admg {
        Admg::from_edges(
            "Symptoms",
            ["Sinus", "Headache", "Nose", "Flu", "Allergy"],
            [
                ("Flu", "Sinus"),
                ("Allergy", "Sinus"),
                ("Sinus", "Nose"),
                ("Sinus", "Headache"),
            ],
            [],
        )
        .unwrap()
    }

    /// Front-door graph: X -> M -> Y with X <-> Y.
    #[fixture]
    fn front_door() -> Admg {
        Admg::from_edges("", ["X", "M", "Y"], [("X", "M"), ("M", "Y")], [("X", "Y")])
            .unwrap()
    }

    #[rstest]
    #[case::common_cause(&["Nose"], &["Headache"], &[], false)]
    #[case::blocked_fork(&["Nose"], &["Headache"], &["Sinus"], true)]
    #[case::marginal_collider(&["Flu"], &["Allergy"], &[], true)]
    #[case::opened_collider(&["Flu"], &["Allergy"], &["Sinus"], false)]
    #[case::descendant_of_collider(&["Flu"], &["Allergy"], &["Nose"], false)]
    #[case::chain(&["Flu"], &["Nose"], &[], false)]
    #[case::blocked_chain(&["Flu"], &["Nose", "Headache"], &["Sinus"], true)]
    fn d_separation(
        symptoms: Admg,
        #[case] x: &[&str],
        #[case] y: &[&str],
        #[case] z: &[&str],
        #[case] expected: bool,
    ) {
        let (x, y, z) = (
            nodeset(x.iter().copied()),
            nodeset(y.iter().copied()),
            nodeset(z.iter().copied()),
        );
        assert_eq!(d_separated(&symptoms, &x, &y, &z), Ok(expected));
        assert_eq!(d_connected(&symptoms, &x, &y, &z), Ok(!expected));
    }

    #[rstest]
    fn bidirected_edges_connect(front_door: Admg) {
        let x = nodeset(["X"]);
        let y = nodeset(["Y"]);
        // X <-> Y is never blocked
        assert_eq!(d_separated(&front_door, &x, &y, &nodeset(["M"])), Ok(false));
        let g = front_door.fix("Y");
        assert_eq!(d_separated(&g, &x, &y, &nodeset(["M"])), Ok(true));
    }

    #[test]
    fn collider_on_bidirected_path() {
        // A -> B <-> C: B is a collider
        let g = Admg::from_edges("", ["A", "B", "C"], [("A", "B")], [("B", "C")]).unwrap();
        let (a, b, c) = (nodeset(["A"]), nodeset(["B"]), nodeset(["C"]));
        assert_eq!(d_separated(&g, &a, &c, &NodeSet::new()), Ok(true));
        assert_eq!(d_separated(&g, &a, &c, &b), Ok(false));
    }

    #[rstest]
    fn unknown_nodes_are_rejected(symptoms: Admg) {
        let fever = nodeset(["Fever"]);
        let res = d_separated(&symptoms, &fever, &nodeset(["Flu"]), &NodeSet::new());
        assert_eq!(res, Err(GraphError::UnknownNode("Fever".to_string())));
        assert!(districts(&symptoms, &fever).is_err());
    }

    #[test]
    fn district_partition() {
        let g = Admg::from_edges(
            "",
            ["A", "B", "C", "D"],
            [("A", "B")],
            [("A", "C"), ("C", "D")],
        )
        .unwrap();
        assert_eq!(
            districts(&g, &nodeset(["A", "B", "D"])).unwrap(),
            vec![nodeset(["A"]), nodeset(["B"]), nodeset(["D"])]
        );
        assert_eq!(
            districts(&g, g.nodes()).unwrap(),
            vec![nodeset(["A", "C", "D"]), nodeset(["B"])]
        );
    }

    #[rstest]
    fn local_markov_symptoms(symptoms: Admg) {
        let strs: Vec<String> = local_markov(&symptoms)
            .unwrap()
            .iter()
            .map(|ci| ci.to_string())
            .collect();
        assert_eq!(
            strs,
            vec![
                "(Allergy\u{22a5}Flu)",
                "(Flu\u{22a5}Allergy)",
                "(Headache\u{22a5}Allergy,Flu,Nose|Sinus)",
                "(Nose\u{22a5}Allergy,Flu,Headache|Sinus)",
            ]
        );
    }

    #[rstest]
    fn local_markov_holds(symptoms: Admg) {
        for ci in local_markov(&symptoms).unwrap() {
            assert_eq!(d_separated(&symptoms, &ci.x, &ci.y, &ci.z), Ok(true));
        }
    }

    #[rstest]
    fn local_markov_needs_a_dag(front_door: Admg) {
        assert!(matches!(local_markov(&front_door), Err(GraphError::Latent(_))));
    }

    #[test]
    fn latex() {
        let ci = CondInd::new(nodeset(["A"]), nodeset(["B", "C"]), nodeset(["D"]));
        assert_eq!(ci.to_latex(), "(A \\perp\\!\\!\\!\\perp B,C \\mid D)");
        assert_eq!(ci.to_string(), "(A\u{22a5}B,C|D)");
    }
}
