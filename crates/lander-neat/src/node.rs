//! Node and connection genes

use ahash::HashSet;
use std::fmt;

/// Role of a node in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Input,  // Written from the sensor vector each evaluation
    Output, // Read back as the controller's commands
    Hidden, // Created by splitting a connection
}

/// Neuron in a genome
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Scratch value written during evaluation
    pub value: f64,
    /// Node indices this node already has a connection to (enabled or not)
    pub(crate) outgoing: HashSet<usize>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            value: 0.0,
            outgoing: HashSet::default(),
        }
    }

    /// Targets of every connection leaving this node, including disabled ones
    pub fn outgoing(&self) -> &HashSet<usize> {
        &self.outgoing
    }

    /// Check whether a connection from this node to `target` was ever created
    pub fn connects_to(&self, target: usize) -> bool {
        self.outgoing.contains(&target)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node: {:?}", self.kind)
    }
}

/// Weighted, directed edge between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub enabled: bool,
    pub innovation: u64,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [w: {}, e: {}, i: {}]",
            self.from, self.to, self.weight, self.enabled, self.innovation
        )
    }
}
