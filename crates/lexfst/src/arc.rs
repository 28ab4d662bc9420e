// Arc cursor: one edge of the encoded graph, decoded back from the byte
// store, plus the flag bits of the wire format.

use crate::END_LABEL;

/// Arc flag bits. One flags byte leads every encoded arc.
pub const BIT_LAST_ARC: u8 = 1 << 0;
/// The target node accepts here (the key may end on this arc).
pub const BIT_FINAL_ARC: u8 = 1 << 1;
/// The target is the node compiled immediately before this one, so its
/// address is implied by byte order and not stored.
pub const BIT_TARGET_NEXT: u8 = 1 << 2;
/// The target has no outgoing arcs; no address is stored.
pub const BIT_STOP_NODE: u8 = 1 << 3;
pub const BIT_HAS_OUTPUT: u8 = 1 << 4;
pub const BIT_HAS_FINAL_OUTPUT: u8 = 1 << 5;

/// First byte of a node whose arcs are laid out at a fixed stride for
/// binary search. Real arc flags never carry this bit, so the layouts are
/// distinguishable from one byte.
pub const FIXED_ARRAY_MARKER: u8 = 1 << 6;

/// One arc read back from the encoded transducer.
///
/// A cursor as much as a value: the layout bookkeeping fields let
/// `read_next_arc` resume where decoding left off, for either arc layout.
/// Traversals reuse one `Arc` to avoid churning output allocations.
#[derive(Debug, Clone)]
pub struct Arc<V> {
    pub label: u32,
    /// Output contribution accumulated when the lookup takes this arc.
    pub output: V,
    /// Output added when the key *ends* on this arc (only meaningful when
    /// [`is_final`](Self::is_final) holds).
    pub final_output: V,
    /// Address of the target node's last byte; 0 when the target has no
    /// outgoing arcs.
    pub target: u64,
    pub flags: u8,
    /// Position of the next sibling arc in the compact scan layout.
    pub next_arc: u64,
    /// Index of the next sibling to decode in the fixed-array layout.
    pub arc_index: u32,
    /// Arc count of the enclosing fixed-array node.
    pub num_arcs: u32,
    /// Stride of the enclosing fixed-array node; 0 in the scan layout.
    pub bytes_per_arc: u32,
    /// Position of the first arc of the enclosing fixed-array node.
    pub arcs_start: u64,
}

impl<V: Clone> Arc<V> {
    /// A blank cursor carrying the algebra's empty output.
    pub fn blank(no_output: V) -> Self {
        Self {
            label: 0,
            output: no_output.clone(),
            final_output: no_output,
            target: 0,
            flags: 0,
            next_arc: 0,
            arc_index: 0,
            num_arcs: 0,
            bytes_per_arc: 0,
            arcs_start: 0,
        }
    }
}

impl<V> Arc<V> {
    #[inline]
    pub fn flag(&self, bit: u8) -> bool {
        self.flags & bit != 0
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.flag(BIT_LAST_ARC)
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.flag(BIT_FINAL_ARC)
    }

    /// Whether the target node has outgoing arcs of its own.
    #[inline]
    pub fn target_has_arcs(&self) -> bool {
        self.target > 0
    }

    /// Whether this is the synthetic end-of-key arc.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.label == END_LABEL
    }
}
