// Builder-side node and arc records: the mutable frontier representation
// that exists only until a node is encoded (or pruned away).

/// Address of a node already encoded to the byte store, or one of the two
/// arcless end sentinels. Sentinels never touch the store, so address 0
/// stays reserved and `Node` addresses are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CompiledAddr {
    /// Accepting node without outgoing arcs.
    FinalEnd,
    /// Rejecting node without outgoing arcs.
    NonFinalEnd,
    Node(u64),
}

/// Where a builder arc points.
#[derive(Debug)]
pub(crate) enum Target<V> {
    /// The in-progress frontier node one level deeper.
    Frontier,
    /// A finished node whose prune-or-compile fate is still undecided; the
    /// arc owns it until enough siblings have been seen to settle it.
    Parked(Box<UncompiledNode<V>>),
    Compiled(CompiledAddr),
}

/// One mutable arc of a frontier node.
#[derive(Debug)]
pub(crate) struct BuilderArc<V> {
    pub label: u32,
    pub target: Target<V>,
    pub output: V,
    pub final_output: V,
    pub is_final: bool,
}

/// One in-progress node of the builder's frontier.
///
/// Arcs are kept in strictly increasing label order; sorted key input makes
/// every mutation a push, replace-last or pop. `input_count` tracks how many
/// keys pass through the node and drives the pruning thresholds.
#[derive(Debug)]
pub(crate) struct UncompiledNode<V> {
    /// Distance from the root; the arc-layout heuristic wants it.
    pub depth: usize,
    pub arcs: Vec<BuilderArc<V>>,
    pub input_count: u64,
    pub is_final: bool,
    /// Accrued final output, moved onto the incoming arc when this node is
    /// frozen.
    pub output: V,
}

impl<V> UncompiledNode<V> {
    pub fn new(depth: usize, no_output: V) -> Self {
        Self { depth, arcs: Vec::new(), input_count: 0, is_final: false, output: no_output }
    }

    /// Append an arc to the frontier node one level deeper.
    pub fn add_arc(&mut self, label: u32, output: V, final_output: V) {
        debug_assert!(
            self.arcs.last().is_none_or(|a| label > a.label),
            "arc labels must be strictly increasing"
        );
        self.arcs.push(BuilderArc {
            label,
            target: Target::Frontier,
            output,
            final_output,
            is_final: false,
        });
    }

    /// Resolve the last arc when its target is frozen: install the target
    /// plus the finality the frozen node accrued.
    pub fn replace_last(&mut self, label: u32, target: Target<V>, final_output: V, is_final: bool) {
        let last = self.arcs.len() - 1;
        let arc = &mut self.arcs[last];
        debug_assert_eq!(arc.label, label);
        arc.target = target;
        arc.final_output = final_output;
        arc.is_final = is_final;
    }

    /// Drop the last arc (its target was pruned).
    pub fn delete_last(&mut self, label: u32) {
        debug_assert_eq!(self.arcs.last().map(|a| a.label), Some(label));
        self.arcs.pop();
    }

    pub fn set_last_output(&mut self, label: u32, output: V) {
        let last = self.arcs.len() - 1;
        let arc = &mut self.arcs[last];
        debug_assert_eq!(arc.label, label);
        arc.output = output;
    }

    pub fn last_output(&self) -> &V {
        &self.arcs[self.arcs.len() - 1].output
    }
}
