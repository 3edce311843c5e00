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

pub mod dsl;
pub mod error;
pub mod expr;
pub mod factorization;
pub mod graph;
pub mod identify;
pub mod quotient;
pub mod separation;
pub mod util;

pub use error::GraphError;
pub use expr::{Expr, ExprKind, Factor, Style};
pub use factorization::{admgfactor, dagfactor, truncfactor};
pub use graph::{Admg, Node, NodeSet};
pub use identify::{idfixall, idfixall_with_rng, idfixing, FixMode, FixingSequence, Identified};
pub use quotient::Quotient;
pub use separation::{d_connected, d_separated, districts, local_markov, CondInd};
