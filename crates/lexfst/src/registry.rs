// Node registry: maps the content of a finished node to the address it was
// first encoded at, so identical suffixes are stored once.

use std::hash::Hash;

use hashbrown::HashMap;

use crate::node::{CompiledAddr, Target, UncompiledNode};

/// Everything that determines a node's encoded bytes, per arc. Finality and
/// accrued output of the node itself live on the *incoming* arc, so they
/// are no part of the signature.
#[derive(Debug, PartialEq, Eq, Hash)]
struct ArcSignature<V> {
    label: u32,
    target: CompiledAddr,
    output: V,
    final_output: V,
    is_final: bool,
}

/// Content signature of a finished node.
#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeSignature<V>(Vec<ArcSignature<V>>);

impl<V: Clone + Eq + Hash> NodeSignature<V> {
    /// Capture the signature of a node whose arcs are all resolved.
    pub fn of(node: &UncompiledNode<V>) -> Self {
        Self(
            node.arcs
                .iter()
                .map(|arc| {
                    let target = match &arc.target {
                        Target::Compiled(addr) => *addr,
                        _ => unreachable!("signature taken before arc targets were compiled"),
                    };
                    ArcSignature {
                        label: arc.label,
                        target,
                        output: arc.output.clone(),
                        final_output: arc.final_output.clone(),
                        is_final: arc.is_final,
                    }
                })
                .collect(),
        )
    }
}

/// Signature-to-address map consulted before encoding a node. Purely an
/// optimization: a miss only costs bytes, never correctness.
pub(crate) struct NodeRegistry<V> {
    map: HashMap<NodeSignature<V>, u64>,
}

impl<V: Clone + Eq + Hash> NodeRegistry<V> {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    pub fn get(&self, signature: &NodeSignature<V>) -> Option<u64> {
        self.map.get(signature).copied()
    }

    pub fn insert(&mut self, signature: NodeSignature<V>, address: u64) {
        let previous = self.map.insert(signature, address);
        debug_assert!(previous.is_none());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.map.len()
    }
}
