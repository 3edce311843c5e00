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

//! Acyclic directed mixed graphs.
//!
//! An ADMG has directed edges `a -> b` and bidirected edges `a <-> b`. The
//! latter stand for an unobserved common cause of `a` and `b`.
//!
//! Relational queries take a set of nodes and return the union of the
//! relation over that set. Queries are lenient about labels that are not in
//! the graph (they contribute nothing). Operations that validate their
//! arguments call [`Admg::check_nodes`] first.

use crate::error::GraphError;
use crate::util::csep;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A node is identified by its label.
pub type Node = String;

/// Node sets are ordered by label, so iteration over them is deterministic.
pub type NodeSet = BTreeSet<Node>;

type Adjacency = BTreeMap<Node, NodeSet>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAdmg")]
pub struct Admg {
    title: String,
    nodes: NodeSet,
    parents: Adjacency,
    children: Adjacency,
    siblings: Adjacency,
}

/// Serialized form of [`Admg`], validated by [`Admg::check`] on the way in.
#[derive(Deserialize)]
struct RawAdmg {
    #[serde(default)]
    title: String,
    nodes: NodeSet,
    #[serde(default)]
    parents: Adjacency,
    #[serde(default)]
    children: Adjacency,
    #[serde(default)]
    siblings: Adjacency,
}

impl TryFrom<RawAdmg> for Admg {
    type Error = GraphError;

    fn try_from(raw: RawAdmg) -> Result<Self, Self::Error> {
        let mut g = Admg {
            title: raw.title,
            nodes: raw.nodes,
            parents: raw.parents,
            children: raw.children,
            siblings: raw.siblings,
        };
        // nodes without edges may be left out of the adjacency maps
        for n in &g.nodes {
            for adj in [&mut g.parents, &mut g.children, &mut g.siblings] {
                adj.entry(n.clone()).or_default();
            }
        }
        g.check()?;
        Ok(g)
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

fn union_over<'a>(adj: &Adjacency, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
    let mut out = NodeSet::new();
    for n in nodes {
        if let Some(s) = adj.get(n) {
            out.extend(s.iter().cloned());
        }
    }
    out
}

/// Reflexive-transitive closure of `start` under `adj`.
///
/// Uses a visited set, so it terminates on cyclic graphs too.
fn closure<'a>(adj: &Adjacency, start: impl IntoIterator<Item = &'a Node>) -> NodeSet {
    let mut seen: NodeSet = start.into_iter().cloned().collect();
    let mut stack: Vec<&Node> = seen.iter().collect();
    let mut found = vec![];
    while let Some(n) = stack.pop() {
        if let Some(next) = adj.get(n) {
            for m in next {
                if !seen.contains(m) && !found.contains(&m) {
                    found.push(m);
                    stack.push(m);
                }
            }
        }
    }
    seen.extend(found.into_iter().cloned());
    seen
}

impl Admg {
    /// An empty graph with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Admg {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builds a graph from a node list and edge lists.
    pub fn from_edges<'a>(
        title: &str,
        nodes: impl IntoIterator<Item = &'a str>,
        directed: impl IntoIterator<Item = (&'a str, &'a str)>,
        bidirected: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, GraphError> {
        let mut g = Admg::new(title);
        for n in nodes {
            g.add_node(n)?;
        }
        for (p, c) in directed {
            g.add_edge(p, c)?;
        }
        for (a, b) in bidirected {
            g.add_bidirected(a, b)?;
        }
        Ok(g)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Add a new node with no edges
    ///
    /// Returns an error if the label is empty or already in use.
    pub fn add_node(&mut self, name: impl Into<Node>) -> Result<(), GraphError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GraphError::EmptyName);
        }
        if self.nodes.contains(&name) {
            return Err(GraphError::DuplicateNode(name));
        }
        self.parents.insert(name.clone(), NodeSet::new());
        self.children.insert(name.clone(), NodeSet::new());
        self.siblings.insert(name.clone(), NodeSet::new());
        self.nodes.insert(name);
        Ok(())
    }

    /// Add a directed edge `parent -> child`
    ///
    /// Both endpoints must already be nodes of the graph. Adding an edge twice
    /// is a no-op. Longer directed cycles are allowed here and detected by
    /// [`Admg::is_dag`].
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<(), GraphError> {
        self.require(parent)?;
        self.require(child)?;
        if parent == child {
            return Err(GraphError::SelfLoop(parent.to_string()));
        }
        if let Some(ps) = self.parents.get_mut(child) {
            ps.insert(parent.to_string());
        }
        if let Some(cs) = self.children.get_mut(parent) {
            cs.insert(child.to_string());
        }
        Ok(())
    }

    /// Add a bidirected edge `a <-> b`
    ///
    /// The edge is stored symmetrically, so `a <-> b` and `b <-> a` are the
    /// same edge.
    pub fn add_bidirected(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(GraphError::SelfLoop(a.to_string()));
        }
        if let Some(s) = self.siblings.get_mut(a) {
            s.insert(b.to_string());
        }
        if let Some(s) = self.siblings.get_mut(b) {
            s.insert(a.to_string());
        }
        Ok(())
    }

    fn require(&self, n: &str) -> Result<(), GraphError> {
        if self.nodes.contains(n) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(n.to_string()))
        }
    }

    /// Returns an error naming the first label in `nodes` that is not in the graph.
    pub fn check_nodes<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a Node>,
    ) -> Result<(), GraphError> {
        nodes.into_iter().try_for_each(|n| self.require(n))
    }

    /// Checks the structural invariants.
    ///
    /// Graphs built through [`Admg::add_edge`] and [`Admg::add_bidirected`]
    /// always pass. Deserialization runs this check too.
    pub fn check(&self) -> Result<(), GraphError> {
        for n in &self.nodes {
            if n.is_empty() {
                return Err(GraphError::EmptyName);
            }
        }
        for adj in [&self.parents, &self.children, &self.siblings] {
            for (n, others) in adj {
                self.require(n)?;
                self.check_nodes(others)?;
                if others.contains(n) {
                    return Err(GraphError::SelfLoop(n.clone()));
                }
            }
        }
        for (n, sibs) in &self.siblings {
            for s in sibs {
                if !self.siblings.get(s).is_some_and(|back| back.contains(n)) {
                    return Err(GraphError::AsymmetricEdge(format!("{n} <-> {s}")));
                }
            }
        }
        for (c, ps) in &self.parents {
            for p in ps {
                if !self.children.get(p).is_some_and(|cs| cs.contains(c)) {
                    return Err(GraphError::AsymmetricEdge(format!("{p} -> {c}")));
                }
            }
        }
        for (p, cs) in &self.children {
            for c in cs {
                if !self.parents.get(c).is_some_and(|ps| ps.contains(p)) {
                    return Err(GraphError::AsymmetricEdge(format!("{p} -> {c}")));
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, n: &str) -> bool {
        self.nodes.contains(n)
    }

    /// All directed edges `(parent, child)`, sorted.
    pub fn directed_edges(&self) -> Vec<(Node, Node)> {
        self.children
            .iter()
            .flat_map(|(p, cs)| cs.iter().map(move |c| (p.clone(), c.clone())))
            .collect()
    }

    /// All bidirected edges as sorted pairs `(a, b)` with `a < b`.
    pub fn bidirected_edges(&self) -> Vec<(Node, Node)> {
        self.siblings
            .iter()
            .flat_map(|(a, bs)| {
                bs.iter()
                    .filter(move |b| a < *b)
                    .map(move |b| (a.clone(), b.clone()))
            })
            .collect()
    }

    /// Union of the parents of `nodes`.
    pub fn pa<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
        union_over(&self.parents, nodes)
    }

    /// Union of the children of `nodes`.
    pub fn ch<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
        union_over(&self.children, nodes)
    }

    /// Union of the nodes joined to `nodes` by a bidirected edge.
    pub fn sib<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
        union_over(&self.siblings, nodes)
    }

    /// Everything adjacent to `nodes`, by any kind of edge.
    pub fn neighbors<'a>(&self, nodes: impl IntoIterator<Item = &'a Node> + Clone) -> NodeSet {
        let mut out = self.pa(nodes.clone());
        out.extend(self.ch(nodes.clone()));
        out.extend(self.sib(nodes));
        out
    }

    /// Ancestors of `nodes`, including the nodes themselves.
    pub fn an<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
        closure(&self.parents, nodes)
    }

    /// Descendants of `nodes`, including the nodes themselves.
    pub fn de<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
        closure(&self.children, nodes)
    }

    /// Non-descendants of `nodes`.
    pub fn nd<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> NodeSet {
        let de = self.de(nodes);
        self.nodes.difference(&de).cloned().collect()
    }

    /// True if the graph has at least one bidirected edge.
    pub fn has_latent(&self) -> bool {
        self.siblings.values().any(|s| !s.is_empty())
    }

    /// The district (c-component) of `n`: everything reachable from `n`
    /// along bidirected edges.
    pub fn district(&self, n: &str) -> NodeSet {
        closure(&self.siblings, [&n.to_string()])
    }

    /// All districts of the graph, ordered by their smallest label.
    pub fn districts(&self) -> Vec<NodeSet> {
        self.districts_of(&self.nodes)
    }

    /// Partitions `nodes` into the districts of the subgraph induced on them.
    pub fn districts_of(&self, nodes: &NodeSet) -> Vec<NodeSet> {
        let mut comps = vec![];
        let mut left: NodeSet = nodes.clone();
        let mut stack = vec![];

        while let Some(v) = left.pop_first() {
            let mut comp = NodeSet::new();
            stack.push(v);
            while let Some(v) = stack.pop() {
                for w in self.sib([&v]) {
                    if left.remove(&w) {
                        stack.push(w);
                    }
                }
                comp.insert(v);
            }
            comps.push(comp);
        }

        comps
    }

    /// District parents of `n`: its district and the parents of its
    /// district, without `n` itself.
    ///
    /// This is the conditioning set used when `n` is fixed.
    pub fn dispa(&self, n: &str) -> NodeSet {
        let dis = self.district(n);
        let mut out = self.pa(&dis);
        out.extend(dis);
        out.remove(n);
        out
    }

    /// The Markov blanket of `n` in a DAG: parents, children and the other
    /// parents of its children.
    ///
    /// Returns `None` if the graph has bidirected edges.
    pub fn markov_blanket(&self, n: &str) -> Option<NodeSet> {
        if self.has_latent() {
            return None;
        }
        let n = n.to_string();
        let children = self.ch([&n]);
        let mut mb = self.pa([&n]);
        mb.extend(self.pa(&children));
        mb.extend(children);
        mb.remove(&n);
        Some(mb)
    }

    /// Returns true if the directed edges contain no cycle.
    ///
    /// Depth-first search with a three-state mark per node. Reaching a node
    /// that is still in progress closes a cycle.
    pub fn is_dag(&self) -> bool {
        let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
        for root in &self.nodes {
            if marks.contains_key(root.as_str()) {
                continue;
            }
            marks.insert(root.as_str(), Mark::InProgress);
            let mut stack: Vec<(&str, Vec<&str>)> = vec![(root.as_str(), self.child_vec(root))];
            while let Some((v, pending)) = stack.last_mut() {
                let v: &str = *v;
                match pending.pop() {
                    Some(w) => match marks.get(w) {
                        Some(Mark::InProgress) => return false,
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(w, Mark::InProgress);
                            let next = self.child_vec(w);
                            stack.push((w, next));
                        }
                    },
                    None => {
                        marks.insert(v, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        true
    }

    fn child_vec(&self, n: &str) -> Vec<&str> {
        self.children
            .get(n)
            .map(|cs| cs.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// A topological order of the nodes: every parent precedes its children.
    ///
    /// Kahn's algorithm, always emitting the smallest ready label first, so
    /// the order is a deterministic function of the graph. Fails with
    /// [`GraphError::Cyclic`] if the directed edges contain a cycle.
    pub fn topsort(&self) -> Result<Vec<Node>, GraphError> {
        let mut indeg: FxHashMap<&str, usize> = self
            .parents
            .iter()
            .map(|(n, ps)| (n.as_str(), ps.len()))
            .collect();
        let mut ready: BTreeSet<&str> = indeg
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(n) = ready.pop_first() {
            order.push(n.to_string());
            for c in self.child_vec(n) {
                if let Some(d) = indeg.get_mut(c) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(c);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(GraphError::Cyclic)
        }
    }

    /// The subgraph induced on `nodes`: only edges with both endpoints kept.
    pub fn induced_subgraph(&self, nodes: &NodeSet) -> Admg {
        let keep: FxHashSet<&str> = nodes
            .iter()
            .filter(|n| self.nodes.contains(*n))
            .map(String::as_str)
            .collect();
        let restrict = |adj: &Adjacency| -> Adjacency {
            adj.iter()
                .filter(|(n, _)| keep.contains(n.as_str()))
                .map(|(n, s)| {
                    let s = s
                        .iter()
                        .filter(|m| keep.contains(m.as_str()))
                        .cloned()
                        .collect();
                    (n.clone(), s)
                })
                .collect()
        };

        Admg {
            title: self.title.clone(),
            nodes: keep.iter().map(|n| n.to_string()).collect(),
            parents: restrict(&self.parents),
            children: restrict(&self.children),
            siblings: restrict(&self.siblings),
        }
    }

    /// A copy of the graph without `nodes` and their incident edges.
    pub fn remove_nodes(&self, nodes: &NodeSet) -> Admg {
        let keep = self.nodes.difference(nodes).cloned().collect();
        self.induced_subgraph(&keep)
    }

    /// A node can be fixed if none of its proper descendants share its district.
    pub fn is_fixable(&self, n: &str) -> bool {
        let dis = self.district(n);
        let de = self.de([&n.to_string()]);
        dis.intersection(&de).count() == 1
    }

    /// All nodes that can currently be fixed.
    pub fn fixable(&self) -> NodeSet {
        self.nodes
            .iter()
            .filter(|n| self.is_fixable(n))
            .cloned()
            .collect()
    }

    /// A copy of the graph with every edge into `n` removed: incoming
    /// directed edges and all bidirected edges at `n`.
    ///
    /// This is the graphical side of intervening on `n`.
    pub fn fix(&self, n: &str) -> Admg {
        let mut g = self.clone();
        if let Some(ps) = g.parents.get_mut(n) {
            for p in std::mem::take(ps) {
                if let Some(cs) = g.children.get_mut(&p) {
                    cs.remove(n);
                }
            }
        }
        if let Some(ss) = g.siblings.get_mut(n) {
            for s in std::mem::take(ss) {
                if let Some(back) = g.siblings.get_mut(&s) {
                    back.remove(n);
                }
            }
        }
        g
    }
}

impl fmt::Display for Admg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Vars: {}", csep(&self.nodes))?;
        writeln!(f, "Parents:")?;
        for (n, ps) in self.parents.iter().filter(|(_, s)| !s.is_empty()) {
            writeln!(f, "{n} <- {}", csep(ps))?;
        }
        writeln!(f, "Children:")?;
        for (n, cs) in self.children.iter().filter(|(_, s)| !s.is_empty()) {
            writeln!(f, "{n} -> {}", csep(cs))?;
        }
        writeln!(f, "Bidirects:")?;
        for (n, bs) in self.siblings.iter().filter(|(_, s)| !s.is_empty()) {
            writeln!(f, "{n} <-> {}", csep(bs))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::nodeset;
    use rstest::{fixture, rstest};

    /// The symptoms DAG.
    ///
    /// ```text
    /// Flu     Allergy
    ///    \   /
    ///    Sinus
    ///    /   \
    /// Nose  Headache
    /// ```
    #[fixture]
    fn symptoms() -> Admg {
        Admg::from_edges(
            "Symptoms",
            ["Sinus", "Headache", "Nose", "Flu", "Allergy"],
            [
                ("Sinus", "Nose"),
                ("Flu", "Sinus"),
                ("Sinus", "Headache"),
                ("Allergy", "Sinus"),
            ],
            [],
        )
        .unwrap()
    }

    /// Front-door graph: X -> M -> Y with X <-> Y.
    #[fixture]
    fn front_door() -> Admg {
        Admg::from_edges(
            "Front door",
            ["X", "M", "Y"],
            [("X", "M"), ("M", "Y")],
            [("X", "Y")],
        )
        .unwrap()
    }

    #[fixture]
    fn bareinboim() -> Admg {
        Admg::from_edges(
            "Bareinboim 2020",
            ["A", "B", "C", "D", "E", "F"],
            [("A", "B"), ("B", "C"), ("C", "D"), ("B", "E"), ("F", "E")],
            [("B", "D"), ("E", "C")],
        )
        .unwrap()
    }

    #[rstest]
    fn relations(symptoms: Admg) {
        let s = nodeset(["Sinus"]);
        assert_eq!(symptoms.pa(&s), nodeset(["Allergy", "Flu"]));
        assert_eq!(symptoms.ch(&s), nodeset(["Headache", "Nose"]));
        assert!(symptoms.sib(&s).is_empty());
        assert_eq!(
            symptoms.neighbors(&s),
            nodeset(["Allergy", "Flu", "Headache", "Nose"])
        );
        // a member of the query set is reported if another member relates to it
        assert_eq!(
            symptoms.pa(&nodeset(["Sinus", "Nose"])),
            nodeset(["Allergy", "Flu", "Sinus"])
        );
    }

    #[rstest]
    fn closures(symptoms: Admg) {
        assert_eq!(
            symptoms.an(&nodeset(["Headache"])),
            nodeset(["Allergy", "Flu", "Headache", "Sinus"])
        );
        assert_eq!(
            symptoms.de(&nodeset(["Flu"])),
            nodeset(["Flu", "Headache", "Nose", "Sinus"])
        );
        assert_eq!(
            symptoms.nd(&nodeset(["Sinus"])),
            nodeset(["Allergy", "Flu"])
        );
    }

    #[rstest]
    fn closures_are_reflexive(bareinboim: Admg) {
        for n in bareinboim.nodes() {
            let s = nodeset([n.as_str()]);
            assert!(bareinboim.an(&s).is_superset(&s));
            assert!(bareinboim.de(&s).is_superset(&s));
        }
        assert!(bareinboim
            .an(&nodeset(["D"]))
            .is_superset(&nodeset(["A", "B", "C", "D"])));
        assert!(bareinboim
            .de(&nodeset(["B", "F"]))
            .is_superset(&nodeset(["B", "D", "E", "F"])));
    }

    #[test]
    fn closures_terminate_on_cycles() {
        let g = Admg::from_edges("", ["A", "B", "C"], [("A", "B"), ("B", "C"), ("C", "A")], [])
            .unwrap();
        assert_eq!(g.an(&nodeset(["A"])), nodeset(["A", "B", "C"]));
        assert_eq!(g.de(&nodeset(["B"])), nodeset(["A", "B", "C"]));
        assert!(!g.is_dag());
        assert_eq!(g.topsort(), Err(GraphError::Cyclic));
    }

    #[test]
    fn directed_self_loop() {
        let g = Admg::from_edges("", ["A"], [("A", "A")], []);
        assert_eq!(g, Err(GraphError::SelfLoop("A".to_string())));
    }

    #[rstest]
    fn topsort_respects_edges(symptoms: Admg, bareinboim: Admg) {
        assert_eq!(
            symptoms.topsort().unwrap(),
            vec!["Allergy", "Flu", "Sinus", "Headache", "Nose"]
        );
        for g in [symptoms, bareinboim] {
            assert!(g.is_dag());
            let order = g.topsort().unwrap();
            assert_eq!(order.len(), g.num_nodes());
            for (p, c) in g.directed_edges() {
                let ip = order.iter().position(|n| *n == p).unwrap();
                let ic = order.iter().position(|n| *n == c).unwrap();
                assert!(ip < ic, "{p} should precede {c}");
            }
        }
    }

    #[rstest]
    fn districts(bareinboim: Admg, front_door: Admg) {
        assert_eq!(
            bareinboim.districts(),
            vec![
                nodeset(["A"]),
                nodeset(["B", "D"]),
                nodeset(["C", "E"]),
                nodeset(["F"])
            ]
        );
        assert_eq!(front_door.district("Y"), nodeset(["X", "Y"]));
        assert_eq!(
            front_door.districts_of(&nodeset(["M", "Y"])),
            vec![nodeset(["M"]), nodeset(["Y"])]
        );
    }

    #[rstest]
    fn edges_are_canonical(front_door: Admg) {
        let mut g = front_door.clone();
        g.add_bidirected("Y", "X").unwrap();
        assert_eq!(g.bidirected_edges(), vec![("X".to_string(), "Y".to_string())]);
        assert_eq!(g, front_door);
        assert_eq!(
            g.add_bidirected("X", "X"),
            Err(GraphError::SelfLoop("X".to_string()))
        );
        assert_eq!(
            g.add_edge("X", "Q"),
            Err(GraphError::UnknownNode("Q".to_string()))
        );
        assert_eq!(
            g.add_node("M"),
            Err(GraphError::DuplicateNode("M".to_string()))
        );
        assert_eq!(g.add_node(""), Err(GraphError::EmptyName));
    }

    #[rstest]
    fn fixing(front_door: Admg) {
        assert!(!front_door.is_fixable("X"));
        assert!(front_door.is_fixable("Y"));
        assert!(front_door.is_fixable("M"));
        assert_eq!(front_door.fixable(), nodeset(["M", "Y"]));
        assert_eq!(front_door.dispa("Y"), nodeset(["M", "X"]));

        let g = front_door.fix("M");
        assert!(g.pa(&nodeset(["M"])).is_empty());
        assert!(!g.ch(&nodeset(["X"])).contains("M"));
        assert!(g.is_fixable("X"));
        // the original is untouched
        assert!(front_door.ch(&nodeset(["X"])).contains("M"));

        let g = front_door.fix("Y");
        assert!(!g.has_latent());
        assert!(g.check().is_ok());
    }

    #[rstest]
    fn subgraphs(bareinboim: Admg) {
        let g = bareinboim.induced_subgraph(&nodeset(["B", "C", "D", "Q"]));
        assert_eq!(g.nodes(), &nodeset(["B", "C", "D"]));
        assert_eq!(g.pa(&nodeset(["C"])), nodeset(["B"]));
        assert_eq!(g.bidirected_edges().len(), 1);
        assert!(g.check().is_ok());

        let h = bareinboim.remove_nodes(&nodeset(["B"]));
        assert!(!h.contains("B"));
        assert!(h.ch(&nodeset(["A"])).is_empty());
        assert_eq!(h.districts().len(), 4);
    }

    #[rstest]
    fn blanket(symptoms: Admg, front_door: Admg) {
        assert_eq!(
            symptoms.markov_blanket("Flu"),
            Some(nodeset(["Allergy", "Sinus"]))
        );
        assert_eq!(front_door.markov_blanket("X"), None);
    }

    #[rstest]
    fn display(front_door: Admg) {
        let s = front_door.to_string();
        assert!(s.starts_with("Title: Front door\nVars: M,X,Y\n"));
        assert!(s.contains("M <- X\n"));
        assert!(s.contains("X <-> Y\n"));
    }

    #[rstest]
    fn serde_roundtrip(bareinboim: Admg) {
        let s = serde_json::to_string(&bareinboim).unwrap();
        let g: Admg = serde_json::from_str(&s).unwrap();
        assert_eq!(g, bareinboim);
        assert!(g.check().is_ok());
    }

    #[test]
    fn serde_fills_missing_adjacency() {
        let json = r#"{"nodes":["A","B","C"],"parents":{"B":["A"]},"children":{"A":["B"]}}"#;
        let g: Admg = serde_json::from_str(json).unwrap();
        assert_eq!(g.title(), "");
        assert_eq!(g.topsort().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(g, Admg::from_edges("", ["A", "B", "C"], [("A", "B")], []).unwrap());
    }

    #[rstest]
    #[case::bidirected_self_loop(
        r#"{"nodes":["X","Y"],"siblings":{"X":["X"]}}"#,
        GraphError::SelfLoop("X".to_string())
    )]
    #[case::directed_self_loop(
        r#"{"nodes":["X"],"parents":{"X":["X"]},"children":{"X":["X"]}}"#,
        GraphError::SelfLoop("X".to_string())
    )]
    #[case::unknown_parent(
        r#"{"nodes":["X","Y"],"parents":{"Y":["Q"]}}"#,
        GraphError::UnknownNode("Q".to_string())
    )]
    #[case::unknown_key(
        r#"{"nodes":["X"],"siblings":{"Q":[]}}"#,
        GraphError::UnknownNode("Q".to_string())
    )]
    #[case::one_sided_sibling(
        r#"{"nodes":["X","Y"],"siblings":{"X":["Y"]}}"#,
        GraphError::AsymmetricEdge("X <-> Y".to_string())
    )]
    #[case::parent_without_child(
        r#"{"nodes":["X","Y"],"parents":{"Y":["X"]}}"#,
        GraphError::AsymmetricEdge("X -> Y".to_string())
    )]
    #[case::child_without_parent(
        r#"{"nodes":["X","Y"],"children":{"X":["Y"]}}"#,
        GraphError::AsymmetricEdge("X -> Y".to_string())
    )]
    fn serde_rejects_malformed(#[case] json: &str, #[case] expected: GraphError) {
        let err = serde_json::from_str::<Admg>(json).unwrap_err();
        assert!(
            err.to_string().starts_with(&expected.to_string()),
            "unexpected error: {err}"
        );
    }
}
