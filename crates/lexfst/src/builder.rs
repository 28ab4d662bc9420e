// Streaming construction of a minimal transducer from pre-sorted keys.
//
// One mutable node per depth ("the frontier") tracks the current key's
// path. Each added key freezes the frontier nodes below its shared prefix
// with the previous key: they are encoded to the byte store (deduplicated
// through the registry) or pruned, and their parents' arcs are patched to
// the resulting addresses. Minimization happens online in this single pass;
// there is no separate minimize step.

use crate::fst::Transducer;
use crate::node::{CompiledAddr, Target, UncompiledNode};
use crate::outputs::OutputAlgebra;
use crate::registry::{NodeRegistry, NodeSignature};
use crate::{FstError, LabelWidth};

/// Construction knobs. The defaults build an exactly-minimal machine over
/// the full input with node sharing on.
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    /// Prune any node fewer than this many keys pass through. 0 disables.
    pub min_suffix_count_1: u64,
    /// Prune nodes whose surroundings fall below this traffic, keeping the
    /// divergence region; 1 is the completion-style boundary rule. 0
    /// disables.
    pub min_suffix_count_2: u64,
    /// Reuse identical already-encoded nodes via the registry.
    pub share_suffixes: bool,
    /// Share nodes with more than one arc too. Turning this off bounds the
    /// registry while still collapsing single-arc chains.
    pub share_non_singleton_nodes: bool,
    /// Only nodes at most this far from the end of a key are candidates for
    /// sharing.
    pub share_max_tail_length: usize,
    /// Allow the binary-searchable fixed-stride arc layout.
    pub allow_array_arcs: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            min_suffix_count_1: 0,
            min_suffix_count_2: 0,
            share_suffixes: true,
            share_non_singleton_nodes: true,
            share_max_tail_length: usize::MAX,
            allow_array_arcs: true,
        }
    }
}

/// Single-use streaming builder. Keys must arrive in non-decreasing
/// lexicographic order; [`finish`](Self::finish) yields the immutable
/// [`Transducer`].
///
/// Any error out of [`add`](Self::add) is fatal to the whole construction:
/// bytes frozen for earlier keys cannot be retracted, so there is no
/// partial rollback to offer. An abandoned builder needs no cleanup.
pub struct Builder<O: OutputAlgebra> {
    options: BuilderOptions,
    fst: Transducer<O>,
    registry: NodeRegistry<O::Value>,
    /// In-progress node per depth, up to the previous key's length.
    frontier: Vec<UncompiledNode<O::Value>>,
    last_key: Vec<u32>,
}

impl<O: OutputAlgebra> Builder<O> {
    pub fn new(width: LabelWidth, outputs: O) -> Self {
        Self::with_options(width, outputs, BuilderOptions::default())
    }

    pub fn with_options(width: LabelWidth, outputs: O, options: BuilderOptions) -> Self {
        let fst = Transducer::new(width, outputs, options.allow_array_arcs);
        let root = UncompiledNode::new(0, fst.outputs.no_output());
        Self { options, fst, registry: NodeRegistry::new(), frontier: vec![root], last_key: Vec::new() }
    }

    /// Insert one `(key, output)` pair. Keys must be non-decreasing; an
    /// exact repeat of the previous key combines the outputs through the
    /// algebra's `merge`.
    pub fn add(&mut self, key: &[u32], output: O::Value) -> Result<(), FstError> {
        if key < self.last_key.as_slice() {
            return Err(FstError::OutOfOrder {
                previous: self.last_key.clone(),
                current: key.to_vec(),
            });
        }
        let width = self.fst.width;
        for &label in key {
            if label > width.max_label() {
                return Err(FstError::LabelOverflow { label, width });
            }
        }

        if key.is_empty() {
            // Finality lives on incoming arcs, so the empty key is carried
            // on the transducer itself rather than in the byte format.
            self.frontier[0].input_count += 1;
            self.frontier[0].is_final = true;
            let merged = match self.fst.empty_output.take() {
                None => output,
                Some(previous) => self
                    .fst
                    .outputs
                    .merge(&previous, &output)
                    .ok_or(FstError::UnmergeableDuplicate)?,
            };
            self.fst.empty_output = Some(merged);
            return Ok(());
        }

        // Walk the prefix shared with the previous key, counting traffic.
        let mut prefix_len = 0;
        let stop = self.last_key.len().min(key.len());
        loop {
            self.frontier[prefix_len].input_count += 1;
            if prefix_len >= stop || self.last_key[prefix_len] != key[prefix_len] {
                break;
            }
            prefix_len += 1;
        }
        let prefix_len_plus1 = prefix_len + 1;

        while self.frontier.len() < key.len() + 1 {
            let depth = self.frontier.len();
            let no_output = self.fst.outputs.no_output();
            self.frontier.push(UncompiledNode::new(depth, no_output));
        }

        // The previous key's unshared suffix is complete; freeze it.
        self.freeze_tail(prefix_len_plus1)?;

        // Extend the frontier with this key's unshared suffix.
        for idx in prefix_len_plus1..=key.len() {
            let no_output = self.fst.outputs.no_output();
            self.frontier[idx - 1].add_arc(key[idx - 1], no_output.clone(), no_output);
            self.frontier[idx].input_count += 1;
        }

        let is_duplicate = self.last_key.len() == key.len() && prefix_len == key.len();
        if !is_duplicate {
            let deepest = &mut self.frontier[key.len()];
            deepest.is_final = true;
            deepest.output = self.fst.outputs.no_output();
        }

        // Factor the new output against the shared-prefix arcs: the common
        // part stays put, each arc's remainder migrates one level deeper,
        // and the leftover continues down.
        let mut rest = output;
        let no_output = self.fst.outputs.no_output();
        for idx in 1..prefix_len_plus1 {
            let (head, tail) = self.frontier.split_at_mut(idx);
            let parent = &mut head[idx - 1];
            let node = &mut tail[0];

            let arc_output = parent.last_output();
            if *arc_output != no_output {
                let common = self.fst.outputs.common(&rest, arc_output);
                let word_suffix = self.fst.outputs.subtract(arc_output, &common);
                parent.set_last_output(key[idx - 1], common.clone());
                if word_suffix != no_output {
                    for arc in &mut node.arcs {
                        arc.output = self.fst.outputs.add(&word_suffix, &arc.output);
                    }
                    if node.is_final {
                        node.output = self.fst.outputs.add(&word_suffix, &node.output);
                    }
                }
                rest = self.fst.outputs.subtract(&rest, &common);
            }
        }

        if is_duplicate {
            let deepest = &mut self.frontier[key.len()];
            deepest.output = self
                .fst
                .outputs
                .merge(&deepest.output, &rest)
                .ok_or(FstError::UnmergeableDuplicate)?;
        } else {
            // Whatever survived factoring hangs off the first unshared arc.
            self.frontier[prefix_len_plus1 - 1].set_last_output(key[prefix_len_plus1 - 1], rest);
        }

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        Ok(())
    }

    /// [`add`](Self::add) for byte-string keys.
    pub fn add_bytes(&mut self, key: &[u8], output: O::Value) -> Result<(), FstError> {
        let labels: Vec<u32> = key.iter().map(|&b| u32::from(b)).collect();
        self.add(&labels, output)
    }

    /// Freeze frontier depths from the previous key's length down to
    /// `prefix_len_plus1`, deciding prune vs. compile per node.
    fn freeze_tail(&mut self, prefix_len_plus1: usize) -> Result<(), FstError> {
        let down_to = prefix_len_plus1.max(1);
        let min1 = self.options.min_suffix_count_1;
        let min2 = self.options.min_suffix_count_2;

        let mut idx = self.last_key.len();
        while idx >= down_to {
            let no_output = self.fst.outputs.no_output();
            let mut node =
                std::mem::replace(&mut self.frontier[idx], UncompiledNode::new(idx, no_output));

            let mut do_prune = false;
            let do_compile;
            if node.input_count < min1 {
                do_prune = true;
                do_compile = true;
            } else if idx > prefix_len_plus1 {
                // The parent is about to be frozen too; whether this node
                // survives rides on whether the parent makes the cut.
                let parent_count = self.frontier[idx - 1].input_count;
                if parent_count < min2 || (min2 == 1 && parent_count == 1 && idx > 1) {
                    do_prune = true;
                }
                do_compile = true;
            } else {
                // At the divergence depth the node may still gain siblings;
                // it can only compile now when this pruning mode is off.
                do_compile = min2 == 0;
            }

            if node.input_count < min2 || (min2 == 1 && node.input_count == 1 && idx > 1) {
                // Below the traffic floor its subtree goes regardless.
                node.arcs.clear();
            }

            if do_prune {
                self.frontier[idx - 1].delete_last(self.last_key[idx - 1]);
            } else {
                if min2 != 0 {
                    let tail_length = self.last_key.len() - idx;
                    self.compile_parked_targets(&mut node, tail_length)?;
                }
                let final_output = node.output.clone();
                // A childless node compiles as accepting so no lookup can
                // strand on a dead end.
                let is_final = node.is_final || node.arcs.is_empty();

                if do_compile {
                    let tail_length = 1 + self.last_key.len() - idx;
                    let addr = self.compile_node(node, tail_length)?;
                    self.frontier[idx - 1].replace_last(
                        self.last_key[idx - 1],
                        Target::Compiled(addr),
                        final_output,
                        is_final,
                    );
                } else {
                    // Undecided: the parent arc keeps the finished node
                    // until enough siblings settle prune-or-compile. The
                    // fresh frontier node takes over this depth.
                    self.frontier[idx - 1].replace_last(
                        self.last_key[idx - 1],
                        Target::Parked(Box::new(node)),
                        final_output,
                        is_final,
                    );
                }
            }
            idx -= 1;
        }
        Ok(())
    }

    /// Compile any still-parked targets of `node` so it can be encoded.
    fn compile_parked_targets(
        &mut self,
        node: &mut UncompiledNode<O::Value>,
        tail_length: usize,
    ) -> Result<(), FstError> {
        for index in 0..node.arcs.len() {
            if !matches!(node.arcs[index].target, Target::Parked(_)) {
                continue;
            }
            let Target::Parked(parked) =
                std::mem::replace(&mut node.arcs[index].target, Target::Frontier)
            else {
                unreachable!()
            };
            let mut child = *parked;
            if child.arcs.is_empty() {
                node.arcs[index].is_final = true;
                child.is_final = true;
            }
            let addr = self.compile_node(child, tail_length.saturating_sub(1))?;
            node.arcs[index].target = Target::Compiled(addr);
        }
        Ok(())
    }

    /// Encode a frozen node, deduplicating through the registry when node
    /// sharing applies to it. Arcless nodes collapse to the end sentinels
    /// without touching the byte store.
    fn compile_node(
        &mut self,
        node: UncompiledNode<O::Value>,
        tail_length: usize,
    ) -> Result<CompiledAddr, FstError> {
        if node.arcs.is_empty() {
            return Ok(if node.is_final {
                CompiledAddr::FinalEnd
            } else {
                CompiledAddr::NonFinalEnd
            });
        }
        if self.options.share_suffixes
            && (self.options.share_non_singleton_nodes || node.arcs.len() <= 1)
            && tail_length <= self.options.share_max_tail_length
        {
            let signature = NodeSignature::of(&node);
            if let Some(address) = self.registry.get(&signature) {
                return Ok(CompiledAddr::Node(address));
            }
            let address = self.fst.add_node(&node)?;
            self.registry.insert(signature, address);
            Ok(CompiledAddr::Node(address))
        } else {
            Ok(CompiledAddr::Node(self.fst.add_node(&node)?))
        }
    }

    /// Freeze everything left, compile the root, and hand over the finished
    /// transducer. `Ok(None)` means nothing survived: an empty corpus, or
    /// pruning thresholds that consumed every key.
    pub fn finish(mut self) -> Result<Option<Transducer<O>>, FstError> {
        self.freeze_tail(0)?;

        let no_output = self.fst.outputs.no_output();
        let mut root = std::mem::replace(&mut self.frontier[0], UncompiledNode::new(0, no_output));
        let min1 = self.options.min_suffix_count_1;
        let min2 = self.options.min_suffix_count_2;

        if root.input_count < min1 || root.input_count < min2 || root.arcs.is_empty() {
            if self.fst.empty_output.is_none() {
                return Ok(None);
            }
            if min1 > 0 || min2 > 0 {
                // The empty key would have been pruned like anything else.
                return Ok(None);
            }
        } else if min2 != 0 {
            let tail_length = self.last_key.len();
            self.compile_parked_targets(&mut root, tail_length)?;
        }

        let start = self.compile_node(root, self.last_key.len())?;
        let mut fst = self.fst;
        fst.set_start(start)?;
        Ok(Some(fst))
    }
}
