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

//! A small text format for ADMGs.
//!
//! ```text
//! "Front door";
//! X; M; Y;
//! X -> M;
//! M -> Y;
//! X <-> Y;
//! ```
//!
//! An optional quoted title comes first. Every other statement declares a
//! node, a directed edge or a bidirected edge, and ends with `;`. Node names
//! are letters and underscores, optionally followed by digits. Edges may
//! only mention nodes declared earlier.

use crate::error::GraphError;
use crate::graph::Admg;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:(?P<space>[ \t\r\n]+)|(?P<title>"[^"\n]*")|(?P<bi><->)|(?P<dir>->)|(?P<eoc>;)|(?P<node>[A-Za-z_]+[0-9]*))"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Title(&'a str),
    Node(&'a str),
    Directed,
    Bidirected,
    End,
}

fn syntax_error(line: usize, msg: impl Into<String>) -> GraphError {
    GraphError::Parse {
        line,
        msg: msg.into(),
    }
}

/// Splits `source` into tokens, each tagged with its line number (from 1).
fn tokenize(source: &str) -> Result<Vec<(Token<'_>, usize)>, GraphError> {
    let mut tokens = vec![];
    let mut line = 1;
    let mut rest = source;

    while !rest.is_empty() {
        let caps = TOKEN.captures(rest).ok_or_else(|| {
            let near: String = rest.chars().take(12).collect();
            syntax_error(line, format!("unexpected input near '{near}'"))
        })?;
        let len = caps.get(0).map_or(0, |m| m.end());

        if let Some(m) = caps.name("space") {
            line += m.as_str().matches('\n').count();
        } else if let Some(m) = caps.name("title") {
            let s = m.as_str();
            tokens.push((Token::Title(&s[1..s.len() - 1]), line));
        } else if caps.name("bi").is_some() {
            tokens.push((Token::Bidirected, line));
        } else if caps.name("dir").is_some() {
            tokens.push((Token::Directed, line));
        } else if caps.name("eoc").is_some() {
            tokens.push((Token::End, line));
        } else if let Some(m) = caps.name("node") {
            tokens.push((Token::Node(m.as_str()), line));
        }

        rest = &rest[len..];
    }

    Ok(tokens)
}

impl Admg {
    /// Reads a graph from its text description.
    pub fn from_grapl(source: &str) -> Result<Admg, GraphError> {
        let tokens = tokenize(source)?;
        let mut g = Admg::default();
        let mut i = 0;

        if let [(Token::Title(t), _), (Token::End, _), ..] = &tokens[..] {
            g.set_title(*t);
            i = 2;
        }

        while i < tokens.len() {
            let line = tokens[i].1;
            let stmt: Vec<&Token> = tokens[i..]
                .iter()
                .map(|(t, _)| t)
                .take_while(|t| **t != Token::End)
                .collect();
            if i + stmt.len() == tokens.len() {
                return Err(syntax_error(line, "missing ';'"));
            }

            let edge = |res: Result<(), GraphError>| {
                res.map_err(|e| syntax_error(line, e.to_string()))
            };
            match stmt[..] {
                [Token::Node(n)] => edge(g.add_node(*n))?,
                [Token::Node(a), Token::Directed, Token::Node(b)] => edge(g.add_edge(a, b))?,
                [Token::Node(a), Token::Bidirected, Token::Node(b)] => {
                    edge(g.add_bidirected(a, b))?
                }
                [] => return Err(syntax_error(line, "empty statement")),
                _ => return Err(syntax_error(line, "expected a node or an edge")),
            }

            i += stmt.len() + 1;
        }

        Ok(g)
    }

    /// Reads a graph description from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Admg, GraphError> {
        let source = std::fs::read_to_string(path)?;
        Admg::from_grapl(&source)
    }

    /// Writes the graph in the format read by [`Admg::from_grapl`].
    pub fn to_grapl(&self) -> String {
        Grapl(self).to_string()
    }
}

/// Displays a graph in its text format.
struct Grapl<'a>(&'a Admg);

impl fmt::Display for Grapl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.0;
        if !g.title().is_empty() {
            writeln!(f, "\"{}\";", g.title())?;
        }
        for n in g.nodes() {
            writeln!(f, "{n};")?;
        }
        for (p, c) in g.directed_edges() {
            writeln!(f, "{p} -> {c};")?;
        }
        for (a, b) in g.bidirected_edges() {
            writeln!(f, "{a} <-> {b};")?;
        }
        Ok(())
    }
}
