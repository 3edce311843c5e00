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

//! Errors raised by graph construction and by queries on a graph.
//!
//! Non-identifiability of a causal effect is *not* an error. It is reported
//! through the `identifiable` flag of [`crate::identify::Identified`].

/// A malformed graph, or a query that can't be answered on this graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node label that does not occur in the graph.
    #[error("Node '{0}' does not exist")]
    UnknownNode(String),
    /// A node declared more than once.
    #[error("Node '{0}' is already defined")]
    DuplicateNode(String),
    /// Node labels must be non-empty.
    #[error("Invalid (empty) node name")]
    EmptyName,
    /// An edge recorded at one endpoint but missing at the other.
    #[error("Edge {0} is recorded at only one of its endpoints")]
    AsymmetricEdge(String),
    /// An edge from a node to itself.
    #[error("Self-loop on node '{0}'")]
    SelfLoop(String),
    /// The directed part of the graph contains a cycle.
    #[error("The graph contains a directed cycle")]
    Cyclic,
    /// The operation is only defined for graphs without bidirected edges.
    #[error("{0} requires a graph without bidirected edges")]
    Latent(&'static str),
    /// The set of intervened (cause) nodes is empty.
    #[error("The set of interventional variables must not be empty")]
    EmptyCause,
    /// The set of effect nodes is empty.
    #[error("The set of effect variables must not be empty")]
    EmptyEffect,
    /// A node occurs in both the cause and the effect set.
    #[error("Node '{0}' is both a cause and an effect")]
    Overlap(String),
    /// A fixing mode string that is not one of "all", "shortest", "mostmrg", "random".
    #[error("Unknown fixing mode '{0}'")]
    UnknownMode(String),
    /// The graph description could not be parsed.
    #[error("Syntax error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    /// Reading a graph description from disk failed.
    #[error("Can't read file: {0}")]
    Io(String),
}

impl From<std::io::Error> for GraphError {
    fn from(e: std::io::Error) -> Self {
        GraphError::Io(e.to_string())
    }
}
