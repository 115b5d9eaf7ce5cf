//! Dependency trees.

use std::borrow::Borrow;
use std::iter::FromIterator;
use std::ops::{Index, IndexMut};

use petgraph::graph::{node_index, DiGraph, NodeIndices, NodeWeightsMut};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::GraphError;
use crate::token::Token;

/// The relation label that attaches the syntactic root to the anchor.
pub const ROOT_RELATION: &str = "root";

/// Dependency tree node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// The anchor: a synthetic node at address 0 without a word of its own.
    Anchor,

    /// Token node.
    Token(Token),
}

impl Node {
    pub fn is_anchor(&self) -> bool {
        !self.is_token()
    }

    pub fn is_token(&self) -> bool {
        match self {
            Node::Anchor => false,
            Node::Token(_) => true,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Node::Anchor => None,
            Node::Token(token) => Some(token),
        }
    }

    pub fn token_mut(&mut self) -> Option<&mut Token> {
        match self {
            Node::Anchor => None,
            Node::Token(token) => Some(token),
        }
    }
}

/// A dependency triple.
///
/// A dependency triple consists of: a head address; a dependent address;
/// and an optional dependency relation label.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DepTriple<S> {
    head: usize,
    dependent: usize,
    relation: Option<S>,
}

impl<S> DepTriple<S> {
    /// Construct a new dependency triple.
    pub fn new(head: usize, relation: Option<S>, dependent: usize) -> Self {
        DepTriple {
            head,
            dependent,
            relation,
        }
    }

    /// Get the dependent.
    pub fn dependent(&self) -> usize {
        self.dependent
    }

    /// Get the head.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Get the relation, consuming the triple.
    pub fn into_relation(self) -> Option<S> {
        self.relation
    }
}

impl<S> DepTriple<S>
where
    S: Borrow<str>,
{
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_ref().map(Borrow::borrow)
    }
}

/// A dependency tree over one sentence.
///
/// `DependencyTree` is a thin wrapper around a `petgraph` `DiGraph`
/// that enforces single-headedness. The anchor occupies address 0;
/// tokens pushed in sentence order occupy the addresses `1..N` with no
/// gaps. Dependency relations are labeled edges from head to dependent.
#[derive(Clone, Debug)]
pub struct DependencyTree {
    graph: DiGraph<Node, Option<String>>,
}

#[allow(clippy::len_without_is_empty)]
impl DependencyTree {
    /// Construct a new tree that only holds the anchor.
    ///
    /// ```
    /// use deptree::graph::{DependencyTree, Node};
    ///
    /// let tree = DependencyTree::new();
    /// assert_eq!(tree[0], Node::Anchor);
    /// ```
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        graph.add_node(Node::Anchor);
        DependencyTree { graph }
    }

    /// Get an iterator over the nodes in the tree, in address order.
    pub fn iter(&self) -> Iter {
        Iter {
            inner: self.graph.node_indices(),
            graph: &self.graph,
        }
    }

    /// Get a mutable iterator over the nodes in the tree.
    pub fn iter_mut(&mut self) -> IterMut {
        IterMut(self.graph.node_weights_mut())
    }

    /// Add a new token to the tree.
    ///
    /// Tokens should always be pushed in sentence order.
    ///
    /// Returns the address of the token. The first pushed token has
    /// address 1, since address 0 is reserved for the anchor.
    pub fn push(&mut self, token: Token) -> usize {
        self.graph.add_node(Node::Token(token)).index()
    }

    /// Get a read-only relation view of the tree.
    pub fn dep_graph(&self) -> DepGraph {
        DepGraph { inner: &self.graph }
    }

    /// Get a mutable relation view of the tree.
    pub fn dep_graph_mut(&mut self) -> DepGraphMut {
        DepGraphMut {
            inner: &mut self.graph,
        }
    }

    /// Get the number of nodes in the tree.
    ///
    /// This is equal to the number of tokens, plus one anchor node.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Find the address of the syntactic root.
    ///
    /// The root is the token attached with the `root` relation. Returns
    /// `None` for trees that do not (or do not yet) have such a token.
    pub fn syntactic_root(&self) -> Option<usize> {
        (1..self.len()).find(|&address| {
            self.dep_graph()
                .head(address)
                .map(|triple| triple.relation() == Some(ROOT_RELATION))
                .unwrap_or(false)
        })
    }
}

impl Default for DependencyTree {
    fn default() -> Self {
        DependencyTree::new()
    }
}

impl FromIterator<Token> for DependencyTree {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Token>,
    {
        let mut tree = DependencyTree::new();
        for token in iter {
            tree.push(token);
        }
        tree
    }
}

/// Iterator over the nodes in a dependency tree.
pub struct Iter<'a> {
    inner: NodeIndices,
    graph: &'a DiGraph<Node, Option<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|idx| &self.graph[idx])
    }
}

impl<'a> IntoIterator for &'a DependencyTree {
    type Item = &'a Node;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable iterator over the nodes in a dependency tree.
pub struct IterMut<'a>(NodeWeightsMut<'a, Node>);

impl<'a> Iterator for IterMut<'a> {
    type Item = &'a mut Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<'a> IntoIterator for &'a mut DependencyTree {
    type Item = &'a mut Node;
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl Eq for DependencyTree {}

impl Index<usize> for DependencyTree {
    type Output = Node;

    fn index(&self, address: usize) -> &Self::Output {
        &self.graph[node_index(address)]
    }
}

impl IndexMut<usize> for DependencyTree {
    fn index_mut(&mut self, address: usize) -> &mut Self::Output {
        &mut self.graph[node_index(address)]
    }
}

impl PartialEq for DependencyTree {
    fn eq(&self, other: &Self) -> bool {
        self.dep_graph() == other.dep_graph()
    }
}

/// A relation view.
///
/// This view can be used to retrieve the dependents of a head or the
/// head relation of a dependent.
pub struct DepGraph<'a> {
    inner: &'a DiGraph<Node, Option<String>>,
}

#[allow(clippy::len_without_is_empty)]
impl<'a> DepGraph<'a> {
    /// Return an iterator over the dependents of `head`.
    pub fn dependents(&self, head: usize) -> impl Iterator<Item = DepTriple<&'a str>> {
        dependents_impl(self.inner, head)
    }

    /// Return the head relation of `dependent`, if any.
    pub fn head(&self, dependent: usize) -> Option<DepTriple<&'a str>> {
        head_impl(self.inner, dependent)
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.inner.node_count()
    }
}

impl<'a> Eq for DepGraph<'a> {}

impl<'a> Index<usize> for DepGraph<'a> {
    type Output = Node;

    fn index(&self, address: usize) -> &Self::Output {
        &self.inner[node_index(address)]
    }
}

impl<'a, 'b> PartialEq<DepGraph<'b>> for DepGraph<'a> {
    fn eq(&self, other: &DepGraph<'b>) -> bool {
        // Cheap checks
        if self.inner.node_count() != other.inner.node_count()
            || self.inner.edge_count() != other.inner.edge_count()
        {
            return false;
        }

        for i in 0..self.len() {
            // Nodes should be equal.
            if self[i] != other[i] {
                return false;
            }

            // Relation to a token's head should be the same.
            if self.head(i) != other.head(i) {
                return false;
            }
        }

        true
    }
}

/// A mutable relation view.
///
/// In addition to the read-only queries, `add_deprel` can be used to
/// attach a dependent to a head.
pub struct DepGraphMut<'a> {
    inner: &'a mut DiGraph<Node, Option<String>>,
}

#[allow(clippy::len_without_is_empty)]
impl<'a> DepGraphMut<'a> {
    /// Add a dependency relation between `head` and `dependent`.
    ///
    /// If `dependent` already has a head relation, this relation is
    /// removed to ensure single-headedness.
    pub fn add_deprel<S>(&mut self, triple: DepTriple<S>) -> Result<(), GraphError>
    where
        S: Into<String>,
    {
        if triple.head() >= self.inner.node_count() {
            return Err(GraphError::HeadOutOfBounds {
                head: triple.head(),
                node_count: self.inner.node_count(),
            });
        }

        if triple.dependent() >= self.inner.node_count() {
            return Err(GraphError::DependentOutOfBounds {
                dependent: triple.dependent(),
                node_count: self.inner.node_count(),
            });
        }

        // Remove an existing head relation (when present).
        if let Some(id) = self
            .inner
            .edges_directed(node_index(triple.dependent), Direction::Incoming)
            .map(|e| e.id())
            .next()
        {
            self.inner.remove_edge(id);
        }

        self.inner.add_edge(
            node_index(triple.head),
            node_index(triple.dependent),
            triple.relation.map(Into::into),
        );

        Ok(())
    }

    /// Return an iterator over the dependents of `head`.
    pub fn dependents(&self, head: usize) -> impl Iterator<Item = DepTriple<&str>> {
        dependents_impl(self.inner, head)
    }

    /// Return the head relation of `dependent`, if any.
    pub fn head(&self, dependent: usize) -> Option<DepTriple<&str>> {
        head_impl(self.inner, dependent)
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.inner.node_count()
    }
}

impl<'a> Index<usize> for DepGraphMut<'a> {
    type Output = Node;

    fn index(&self, address: usize) -> &Self::Output {
        &self.inner[node_index(address)]
    }
}

impl<'a> IndexMut<usize> for DepGraphMut<'a> {
    fn index_mut(&mut self, address: usize) -> &mut Self::Output {
        &mut self.inner[node_index(address)]
    }
}

fn dependents_impl(
    graph: &DiGraph<Node, Option<String>>,
    head: usize,
) -> impl Iterator<Item = DepTriple<&str>> {
    graph
        .edges_directed(node_index(head), Direction::Outgoing)
        .map(|e| {
            DepTriple::new(
                e.source().index(),
                e.weight().as_deref(),
                e.target().index(),
            )
        })
}

fn head_impl(graph: &DiGraph<Node, Option<String>>, dependent: usize) -> Option<DepTriple<&str>> {
    graph
        .edges_directed(node_index(dependent), Direction::Incoming)
        .next()
        .map(|e| {
            DepTriple::new(
                e.source().index(),
                e.weight().as_deref(),
                e.target().index(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::{DepTriple, DependencyTree, Node, Token};

    fn three_tokens() -> DependencyTree {
        let mut tree = DependencyTree::new();
        tree.push(Token::new("hij"));
        tree.push(Token::new("zingt"));
        tree.push(Token::new("vals"));
        tree
    }

    #[test]
    fn add_deprel() {
        let mut tree = three_tokens();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("wrong"), 1))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();

        assert!(tree.dep_graph().head(0).is_none());
        assert_eq!(
            tree.dep_graph().head(1),
            Some(DepTriple::new(0, Some("wrong"), 1))
        );
        assert_eq!(
            tree.dep_graph().head(2),
            Some(DepTriple::new(0, Some("root"), 2))
        );
        assert!(tree.dep_graph().head(3).is_none());

        // Reattachment replaces the previous head relation.
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("nsubj"), 1))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("advmod"), 3))
            .unwrap();
        assert_eq!(
            tree.dep_graph().head(1),
            Some(DepTriple::new(2, Some("nsubj"), 1))
        );
        assert_eq!(
            tree.dep_graph().head(3),
            Some(DepTriple::new(2, Some("advmod"), 3))
        );
    }

    #[test]
    fn dependents() {
        let mut tree = three_tokens();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("nsubj"), 1))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("advmod"), 3))
            .unwrap();

        let deps = tree.dep_graph().dependents(0).collect::<Vec<_>>();
        assert_eq!(&deps, &[DepTriple::new(0, Some("root"), 2)]);

        assert!(tree.dep_graph().dependents(1).next().is_none());

        let mut deps = tree.dep_graph().dependents(2).collect::<Vec<_>>();
        deps.sort();
        assert_eq!(
            &deps,
            &[
                DepTriple::new(2, Some("nsubj"), 1),
                DepTriple::new(2, Some("advmod"), 3),
            ]
        );

        assert!(tree.dep_graph().dependents(3).next().is_none());
    }

    #[test]
    fn syntactic_root() {
        let mut tree = three_tokens();
        assert_eq!(tree.syntactic_root(), None);

        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("nsubj"), 1))
            .unwrap();
        assert_eq!(tree.syntactic_root(), Some(2));
    }

    #[test]
    fn equality() {
        let mut t1 = three_tokens();
        let t2 = t1.clone();
        assert_eq!(t1, t2);

        t1.push(Token::new("!"));
        assert_ne!(t1, t2);

        let mut t3 = t1.clone();
        t1.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();
        assert_ne!(t1, t3);
        t3.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();
        assert_eq!(t1, t3);
        t3.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("punct"), 4))
            .unwrap();
        assert_ne!(t1, t3);

        let mut t4 = t1.clone();
        if let Node::Token(ref mut token) = t4[2] {
            token.set_upos(Some("VERB"));
        }
        assert_ne!(t1, t4);
    }

    #[test]
    #[should_panic(expected = "HeadOutOfBounds")]
    fn incorrect_head_is_rejected() {
        let mut tree = three_tokens();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(4, Some("nsubj"), 3))
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "DependentOutOfBounds")]
    fn incorrect_dependent_is_rejected() {
        let mut tree = three_tokens();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(3, Some("nsubj"), 4))
            .unwrap();
    }
}
