//! NEAT genome: growable node/connection graph with mutation and evaluation
//!
//! Nodes are addressed by their index in the node sequence. The first
//! `num_inputs` nodes are inputs, the next `num_outputs` are outputs and every
//! later node is hidden, in creation order. Nodes and connections are only ever
//! appended; a connection that is split by `add_node` is disabled, not removed.
//!
//! Evaluation is a single pass over the connections in creation order. It does
//! not sort the graph topologically and it does not reset hidden node values
//! between calls, so a hidden node keeps accumulating what it received on
//! earlier evaluations.

use std::fmt;

use ahash::{HashMap, HashSet};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::node::{Connection, Node, NodeKind};

/// Sampling budget used by the parameterless mutation entry points
pub const DEFAULT_MAX_TRIES: usize = 4;

/// Probability bands used by [`Genome::mutate`]
///
/// `node` is the chance of attempting a connection split, `connection` the
/// chance of attempting a new connection; whatever remains goes to weight
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationRates {
    pub node: f64,
    pub connection: f64,
}

impl Default for MutationRates {
    fn default() -> Self {
        Self {
            node: 0.05,
            connection: 0.15,
        }
    }
}

impl MutationRates {
    pub fn new(node: f64, connection: f64) -> Self {
        Self { node, connection }
    }

    /// Both rates must be probabilities and together may not exceed 1
    pub fn validate(&self) -> Result<(), GenomeError> {
        for (name, rate) in [("node", self.node), ("connection", self.connection)] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(GenomeError::topology(format!(
                    "{name} mutation rate {rate} is not within [0, 1]"
                )));
            }
        }
        if self.node + self.connection > 1.0 {
            return Err(GenomeError::topology(format!(
                "node and connection mutation rates sum to {} (> 1)",
                self.node + self.connection
            )));
        }
        Ok(())
    }

    /// Upper bound of the band that attempts a new connection
    fn connection_threshold(&self) -> f64 {
        self.node + self.connection
    }
}

/// What a call to [`Genome::mutate`] ended up changing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOutcome {
    AddedNode,
    AddedConnection,
    ModifiedWeight,
    Unchanged,
}

/// Evolvable network of nodes and weighted connections
#[derive(Debug, Clone)]
pub struct Genome {
    num_inputs: usize,
    num_outputs: usize,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    next_innovation: u64,
    rates: MutationRates,
}

impl Genome {
    /// Create a genome with only input and output nodes and no connections
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        node_mutation_probability: f64,
        connection_mutation_probability: f64,
    ) -> Result<Self, GenomeError> {
        Self::with_rates(
            num_inputs,
            num_outputs,
            MutationRates::new(node_mutation_probability, connection_mutation_probability),
        )
    }

    /// Same as [`Genome::new`], taking the rates as one value
    pub fn with_rates(
        num_inputs: usize,
        num_outputs: usize,
        rates: MutationRates,
    ) -> Result<Self, GenomeError> {
        if num_inputs == 0 {
            return Err(GenomeError::topology("genome needs at least one input"));
        }
        if num_outputs == 0 {
            return Err(GenomeError::topology("genome needs at least one output"));
        }
        rates.validate()?;

        let mut nodes = Vec::with_capacity(num_inputs + num_outputs);
        nodes.extend((0..num_inputs).map(|_| Node::new(NodeKind::Input)));
        nodes.extend((0..num_outputs).map(|_| Node::new(NodeKind::Output)));

        Ok(Self {
            num_inputs,
            num_outputs,
            nodes,
            connections: Vec::new(),
            next_innovation: 0,
            rates,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Connections in creation order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn rates(&self) -> MutationRates {
        self.rates
    }

    /// Innovation number the next new connection will receive
    pub fn next_innovation(&self) -> u64 {
        self.next_innovation
    }

    pub fn hidden_count(&self) -> usize {
        self.nodes.len() - self.num_inputs - self.num_outputs
    }

    pub fn enabled_count(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Explicit deep copy for reproduction; the copy shares nothing with `self`
    pub fn clone_deep(&self) -> Self {
        self.clone()
    }

    fn issue_innovation(&mut self) -> u64 {
        let innovation = self.next_innovation;
        self.next_innovation += 1;
        innovation
    }

    /// Append an enabled connection and record it in the adjacency index
    fn push_connection(&mut self, from: usize, to: usize, weight: f64) -> u64 {
        let innovation = self.issue_innovation();
        self.connections.push(Connection {
            from,
            to,
            weight,
            enabled: true,
            innovation,
        });
        self.nodes[from].outgoing.insert(to);
        innovation
    }

    /// Add a connection between two existing nodes by hand
    ///
    /// Applies the same rules as [`Genome::add_connection`]: no self-loops, no
    /// input destinations and no second connection for a pair that already has
    /// one. Returns the innovation number of the new connection.
    pub fn connect(&mut self, from: usize, to: usize, weight: f64) -> Result<u64, GenomeError> {
        let len = self.nodes.len();
        if from >= len || to >= len {
            return Err(GenomeError::topology(format!(
                "connection {from} -> {to} references a node outside 0..{len}"
            )));
        }
        if from == to {
            return Err(GenomeError::topology(format!(
                "self-loop on node {from} is not allowed"
            )));
        }
        if to < self.num_inputs {
            return Err(GenomeError::topology(format!(
                "node {to} is an input and cannot be a connection target"
            )));
        }
        if self.nodes[from].connects_to(to) {
            return Err(GenomeError::topology(format!(
                "connection {from} -> {to} already exists"
            )));
        }
        Ok(self.push_connection(from, to, weight))
    }

    /// Enable or disable the connection at `index` (creation order)
    pub fn set_connection_enabled(
        &mut self,
        index: usize,
        enabled: bool,
    ) -> Result<(), GenomeError> {
        let count = self.connections.len();
        let connection = self.connections.get_mut(index).ok_or_else(|| {
            GenomeError::topology(format!("connection index {index} out of range 0..{count}"))
        })?;
        connection.enabled = enabled;
        Ok(())
    }

    /// Zero every node value, including hidden nodes
    pub fn reset_values(&mut self) {
        for node in &mut self.nodes {
            node.value = 0.0;
        }
    }

    // ===== Mutation Operators =====

    /// Sample connections until an enabled one turns up
    ///
    /// Draws at most `max_tries + 1` times. Returns `None` when the genome has
    /// no connections or every draw hit a disabled one.
    fn random_enabled_connection<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_tries: usize,
    ) -> Option<usize> {
        if self.connections.is_empty() {
            return None;
        }
        (0..=max_tries)
            .map(|_| rng.random_range(0..self.connections.len()))
            .find(|&idx| self.connections[idx].enabled)
    }

    /// Split a random enabled connection by inserting a hidden node
    ///
    /// `A -> B (w)` is disabled and replaced by `A -> H (1.0)` and `H -> B (w)`,
    /// so the network computes the same thing right after the split.
    /// Returns true if a node was added.
    pub fn add_node_with<R: Rng + ?Sized>(&mut self, rng: &mut R, max_tries: usize) -> bool {
        let Some(idx) = self.random_enabled_connection(rng, max_tries) else {
            return false;
        };

        self.connections[idx].enabled = false;
        let Connection {
            from, to, weight, ..
        } = self.connections[idx];

        self.nodes.push(Node::new(NodeKind::Hidden));
        let hidden = self.nodes.len() - 1;

        let first = self.push_connection(from, hidden, 1.0);
        let second = self.push_connection(hidden, to, weight);

        log::trace!(
            "split connection {from} -> {to} through node {hidden} (innovations {first}, {second})"
        );
        true
    }

    /// [`Genome::add_node_with`] drawing from the thread-local generator
    pub fn add_node(&mut self, max_tries: usize) -> bool {
        self.add_node_with(&mut rand::rng(), max_tries)
    }

    /// Add a connection between a random pair of nodes that are not yet connected
    ///
    /// Any node may be the source; the target must not be an input node.
    /// Returns true if a connection was added.
    pub fn add_connection_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let len = self.nodes.len();
        let candidates: Vec<(usize, usize)> = (0..len)
            .flat_map(|from| (self.num_inputs..len).map(move |to| (from, to)))
            .filter(|&(from, to)| from != to && !self.nodes[from].connects_to(to))
            .collect();

        if candidates.is_empty() {
            return false;
        }

        let (from, to) = candidates[rng.random_range(0..candidates.len())];
        let weight = rng.random::<f64>();
        let innovation = self.push_connection(from, to, weight);

        log::trace!("added connection {from} -> {to} (w: {weight:.3}, i: {innovation})");
        true
    }

    /// [`Genome::add_connection_with`] drawing from the thread-local generator
    pub fn add_connection(&mut self) -> bool {
        self.add_connection_with(&mut rand::rng())
    }

    /// Pull a random enabled connection's weight toward a fresh random value
    ///
    /// The new weight is `mix * old + (1 - mix) * fresh` with `mix` in
    /// [0, 0.5) and `fresh` in [0, 1), so the fresh value always dominates.
    /// Returns true if a weight was changed.
    pub fn modify_weight_with<R: Rng + ?Sized>(&mut self, rng: &mut R, max_tries: usize) -> bool {
        let Some(idx) = self.random_enabled_connection(rng, max_tries) else {
            return false;
        };

        let fresh = rng.random::<f64>();
        let mix = rng.random::<f64>() / 2.0;
        let connection = &mut self.connections[idx];
        connection.weight = mix * connection.weight + (1.0 - mix) * fresh;
        true
    }

    /// [`Genome::modify_weight_with`] drawing from the thread-local generator
    pub fn modify_weight(&mut self, max_tries: usize) -> bool {
        self.modify_weight_with(&mut rand::rng(), max_tries)
    }

    /// Apply one mutation picked from the configured probability bands
    ///
    /// Each band has a fallback operator that runs when the first choice
    /// cannot be applied.
    pub fn mutate_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MutationOutcome {
        let chance = rng.random::<f64>();

        let outcome = if chance < self.rates.node {
            if self.add_node_with(rng, DEFAULT_MAX_TRIES) {
                MutationOutcome::AddedNode
            } else if self.add_connection_with(rng) {
                MutationOutcome::AddedConnection
            } else {
                MutationOutcome::Unchanged
            }
        } else if chance < self.rates.connection_threshold() {
            if self.add_connection_with(rng) {
                MutationOutcome::AddedConnection
            } else if self.modify_weight_with(rng, DEFAULT_MAX_TRIES) {
                MutationOutcome::ModifiedWeight
            } else {
                MutationOutcome::Unchanged
            }
        } else if self.modify_weight_with(rng, DEFAULT_MAX_TRIES) {
            MutationOutcome::ModifiedWeight
        } else if self.add_connection_with(rng) {
            MutationOutcome::AddedConnection
        } else {
            MutationOutcome::Unchanged
        };

        log::trace!("mutation roll {chance:.3} -> {outcome:?}");
        outcome
    }

    /// [`Genome::mutate_with`] drawing from the thread-local generator
    pub fn mutate(&mut self) -> MutationOutcome {
        self.mutate_with(&mut rand::rng())
    }

    // ===== Evaluation =====

    /// Propagate `inputs` through the enabled connections and read the outputs
    ///
    /// Output nodes start from zero; hidden nodes keep whatever value they held
    /// after the previous call. Connections are visited in creation order.
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, GenomeError> {
        if inputs.len() != self.num_inputs {
            return Err(GenomeError::InvalidInput {
                expected: self.num_inputs,
                actual: inputs.len(),
            });
        }

        for (node, &value) in self.nodes.iter_mut().zip(inputs) {
            node.value = value;
        }
        let outputs = self.num_inputs..self.num_inputs + self.num_outputs;
        for node in &mut self.nodes[outputs.clone()] {
            node.value = 0.0;
        }

        for connection in self.connections.iter().filter(|c| c.enabled) {
            let signal = self.nodes[connection.from].value * connection.weight;
            self.nodes[connection.to].value += signal;
        }

        Ok(self.nodes[outputs].iter().map(|n| n.value).collect())
    }

    // ===== Invariants =====

    /// Check every structural invariant of the genome
    pub fn validate(&self) -> Result<(), GenomeError> {
        let len = self.nodes.len();
        if len < self.num_inputs + self.num_outputs {
            return Err(GenomeError::topology(format!(
                "{len} nodes cannot hold {} inputs and {} outputs",
                self.num_inputs, self.num_outputs
            )));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            let expected = if idx < self.num_inputs {
                NodeKind::Input
            } else if idx < self.num_inputs + self.num_outputs {
                NodeKind::Output
            } else {
                NodeKind::Hidden
            };
            if node.kind != expected {
                return Err(GenomeError::topology(format!(
                    "node {idx} is {:?}, expected {expected:?}",
                    node.kind
                )));
            }
        }

        let mut derived: HashMap<usize, HashSet<usize>> = HashMap::default();
        let mut enabled_pairs: HashSet<(usize, usize)> = HashSet::default();
        let mut last_innovation: Option<u64> = None;

        for connection in &self.connections {
            let (from, to) = (connection.from, connection.to);
            if from >= len || to >= len {
                return Err(GenomeError::topology(format!(
                    "connection {connection} references a missing node"
                )));
            }
            if from == to {
                return Err(GenomeError::topology(format!("self-loop {connection}")));
            }
            if self.nodes[to].kind == NodeKind::Input {
                return Err(GenomeError::topology(format!(
                    "connection {connection} targets an input node"
                )));
            }
            if connection.innovation >= self.next_innovation
                || last_innovation.is_some_and(|last| connection.innovation <= last)
            {
                return Err(GenomeError::topology(format!(
                    "connection {connection} has an out-of-sequence innovation number"
                )));
            }
            last_innovation = Some(connection.innovation);

            if connection.enabled && !enabled_pairs.insert((from, to)) {
                return Err(GenomeError::topology(format!(
                    "more than one enabled connection {from} -> {to}"
                )));
            }
            derived.entry(from).or_default().insert(to);
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            let expected_len = derived.get(&idx).map_or(0, |targets| targets.len());
            let in_sync = node.outgoing.len() == expected_len
                && node
                    .outgoing
                    .iter()
                    .all(|to| derived.get(&idx).is_some_and(|targets| targets.contains(to)));
            if !in_sync {
                return Err(GenomeError::topology(format!(
                    "adjacency index of node {idx} is out of sync with its connections"
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Nodes: {}, Connections: {}",
            self.nodes.len(),
            self.connections.len()
        )?;
        let nodes: Vec<String> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{i}: {n}"))
            .collect();
        writeln!(f, "{}", nodes.join(", "))?;
        let connections: Vec<String> = self.connections.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", connections.join(", "))
    }
}
