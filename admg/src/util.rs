use crate::graph::{Node, NodeSet};
use itertools::Itertools;

/// Collects anything string-like into a [`NodeSet`].
///
/// ```
/// use admg::util::nodeset;
/// let s = nodeset(["Y", "X", "Y"]);
/// assert_eq!(s.len(), 2);
/// ```
pub fn nodeset<I, S>(items: I) -> NodeSet
where
    I: IntoIterator<Item = S>,
    S: Into<Node>,
{
    items.into_iter().map(Into::into).collect()
}

/// Comma-separated list of node labels, in iteration order.
pub fn csep<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> String {
    nodes.into_iter().join(",")
}

/// Returns `name` with enough prime marks appended that it doesn't clash with
/// anything for which `taken` returns true.
///
/// Primed names stand for dummy variables that are summed over.
pub fn fresh_prime(name: &str, taken: impl Fn(&str) -> bool) -> Node {
    let mut new = format!("{name}'");
    while taken(&new) {
        new.push('\'');
    }
    new
}
