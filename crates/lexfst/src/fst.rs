// The finished transducer: binary node/arc encoding, traversal over the
// encoded bytes, and the persisted form.
//
// Nodes are appended arc-by-arc and the span of each finished node is then
// reversed in place, so a node's address is the position of its last byte
// and arcs read front-to-back from there through a reverse cursor. Later
// nodes (closer to the root) reference earlier ones through short varint
// back-references, or implicitly via the target-next flag.

use std::fmt;

use lexfst_bytes::{ByteStore, ReverseReader};

use crate::arc::{
    Arc, BIT_FINAL_ARC, BIT_HAS_FINAL_OUTPUT, BIT_HAS_OUTPUT, BIT_LAST_ARC, BIT_STOP_NODE,
    BIT_TARGET_NEXT, FIXED_ARRAY_MARKER,
};
use crate::format;
use crate::node::{CompiledAddr, Target, UncompiledNode};
use crate::outputs::OutputAlgebra;
use crate::{END_LABEL, FstError, LabelWidth};

/// Nodes at most this deep get the fixed-array layout at the lower arc
/// count threshold; they are hit by nearly every lookup.
pub const ARRAY_SHALLOW_DEPTH: usize = 3;
/// Minimum arc count for the fixed-array layout on shallow nodes.
pub const ARRAY_MIN_ARCS_SHALLOW: usize = 5;
/// Minimum arc count for the fixed-array layout regardless of depth.
pub const ARRAY_MIN_ARCS_DEEP: usize = 10;

/// Labels below this bound may be served from the in-memory root arc cache.
const ROOT_ARC_CACHE_SIZE: usize = 128;

/// An immutable, byte-encoded minimal-acyclic transducer.
///
/// Produced once by [`builder::Builder`](crate::builder::Builder) or
/// [`load`](Self::load), then read-only for its whole lifetime. Traversal
/// state lives in the caller's [`Arc`] and [`ReverseReader`], so independent
/// readers can share one instance freely.
pub struct Transducer<O: OutputAlgebra> {
    pub(crate) width: LabelWidth,
    pub(crate) outputs: O,
    pub(crate) bytes: ByteStore,
    /// Address of the root node; 0 when the transducer holds nothing beyond
    /// a possible empty key.
    pub(crate) start_node: u64,
    pub(crate) empty_output: Option<O::Value>,
    pub(crate) node_count: u64,
    pub(crate) arc_count: u64,
    root_arcs: Option<Vec<Option<Arc<O::Value>>>>,
    // Construction-time state, meaningless after finish/load.
    pub(crate) last_frozen_node: u64,
    pub(crate) allow_array_arcs: bool,
}

impl<O: OutputAlgebra> fmt::Debug for Transducer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transducer")
            .field("width", &self.width)
            .field("size_in_bytes", &self.bytes.len())
            .field("node_count", &self.node_count)
            .field("arc_count", &self.arc_count)
            .field("accepts_empty", &self.empty_output.is_some())
            .finish()
    }
}

impl<O: OutputAlgebra> Transducer<O> {
    pub(crate) fn new(width: LabelWidth, outputs: O, allow_array_arcs: bool) -> Self {
        let mut bytes = ByteStore::new();
        // Address 0 is reserved; no node may start life there.
        bytes.write_byte(0);
        Self {
            width,
            outputs,
            bytes,
            start_node: 0,
            empty_output: None,
            node_count: 0,
            arc_count: 0,
            root_arcs: None,
            last_frozen_node: 0,
            allow_array_arcs,
        }
    }

    #[inline]
    pub fn width(&self) -> LabelWidth {
        self.width
    }

    #[inline]
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Size of the encoded node region in bytes.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Nodes encoded during construction (not restored by [`load`](Self::load)).
    #[inline]
    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    /// Arcs encoded during construction (not restored by [`load`](Self::load)).
    #[inline]
    pub fn arc_count(&self) -> u64 {
        self.arc_count
    }

    /// Output of the empty key, if the transducer accepts it.
    #[inline]
    pub fn empty_output(&self) -> Option<&O::Value> {
        self.empty_output.as_ref()
    }

    /// A fresh read cursor over the encoded bytes. Each concurrent traversal
    /// needs its own.
    pub fn reader(&self) -> ReverseReader<'_> {
        ReverseReader::new(self.bytes.as_slice())
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Encode one frozen node and return its address. All arc targets must
    /// already be compiled.
    pub(crate) fn add_node(&mut self, node: &UncompiledNode<O::Value>) -> Result<u64, FstError> {
        debug_assert!(!node.arcs.is_empty(), "arcless nodes collapse to sentinels");

        let no_output = self.outputs.no_output();
        let start_address = self.bytes.position();
        let use_array = self.should_use_array(node);
        let mut bytes_per_arc: Vec<usize> = Vec::new();

        self.arc_count += node.arcs.len() as u64;
        let last_index = node.arcs.len() - 1;
        let mut arc_start = self.bytes.position();
        let mut max_bytes_per_arc = 0usize;

        for (index, arc) in node.arcs.iter().enumerate() {
            let target = match &arc.target {
                Target::Compiled(addr) => *addr,
                _ => unreachable!("arc target not compiled while encoding"),
            };
            let target_address = match target {
                CompiledAddr::Node(address) => Some(address),
                CompiledAddr::FinalEnd | CompiledAddr::NonFinalEnd => None,
            };

            let mut flags = 0u8;
            if index == last_index {
                flags |= BIT_LAST_ARC;
            }
            match target_address {
                // Fixed-stride slots cannot borrow the implied-address trick:
                // each arc must decode in isolation for binary search.
                Some(address) if self.last_frozen_node == address && !use_array => {
                    flags |= BIT_TARGET_NEXT;
                }
                Some(_) => {}
                None => flags |= BIT_STOP_NODE,
            }
            if arc.is_final {
                flags |= BIT_FINAL_ARC;
                if arc.final_output != no_output {
                    flags |= BIT_HAS_FINAL_OUTPUT;
                }
            } else {
                debug_assert!(arc.final_output == no_output);
            }
            if arc.output != no_output {
                flags |= BIT_HAS_OUTPUT;
            }

            self.bytes.write_byte(flags);
            self.write_label(arc.label)?;
            if flags & BIT_HAS_OUTPUT != 0 {
                self.outputs.write(&arc.output, &mut self.bytes);
            }
            if flags & BIT_HAS_FINAL_OUTPUT != 0 {
                self.outputs.write_final(&arc.final_output, &mut self.bytes);
            }
            if let Some(address) = target_address {
                if flags & BIT_TARGET_NEXT == 0 {
                    self.bytes.write_vu64(address);
                }
            }

            if use_array {
                let len = (self.bytes.position() - arc_start) as usize;
                bytes_per_arc.push(len);
                max_bytes_per_arc = max_bytes_per_arc.max(len);
                arc_start = self.bytes.position();
            }
        }

        if use_array {
            let mut header = Vec::with_capacity(11);
            header.push(FIXED_ARRAY_MARKER);
            lexfst_bytes::write_vu64_into(&mut header, node.arcs.len() as u64);
            lexfst_bytes::write_vu64_into(&mut header, max_bytes_per_arc as u64);

            let packed_len = (self.bytes.position() - start_address) as usize;
            let fixed_len = header.len() + node.arcs.len() * max_bytes_per_arc;
            // Keep the searchable form only while its overhead stays within
            // a quarter of the packed size.
            if fixed_len * 4 <= packed_len * 5 {
                let arcs_start = start_address + header.len() as u64;
                self.bytes.skip(fixed_len - packed_len);
                // Restride from the last arc down so nothing is clobbered
                // before it moves.
                let mut src = start_address + packed_len as u64;
                let mut dst = arcs_start + (node.arcs.len() * max_bytes_per_arc) as u64;
                for &len in bytes_per_arc.iter().rev() {
                    src -= len as u64;
                    dst -= max_bytes_per_arc as u64;
                    if src != dst {
                        debug_assert!(dst > src);
                        self.bytes.copy_bytes(src, dst, len);
                    }
                }
                self.bytes.write_bytes_at(start_address, &header);
            }
        }

        let address = self.bytes.position() - 1;
        self.bytes.reverse(start_address, address);
        self.node_count += 1;
        self.last_frozen_node = address;
        Ok(address)
    }

    fn should_use_array(&self, node: &UncompiledNode<O::Value>) -> bool {
        self.allow_array_arcs
            && ((node.depth <= ARRAY_SHALLOW_DEPTH && node.arcs.len() >= ARRAY_MIN_ARCS_SHALLOW)
                || node.arcs.len() >= ARRAY_MIN_ARCS_DEEP)
    }

    fn write_label(&mut self, label: u32) -> Result<(), FstError> {
        if label > self.width.max_label() {
            return Err(FstError::LabelOverflow { label, width: self.width });
        }
        match self.width {
            LabelWidth::Byte1 => self.bytes.write_byte(label as u8),
            LabelWidth::Byte2 => self.bytes.write_bytes(&(label as u16).to_le_bytes()),
            LabelWidth::Byte4 => self.bytes.write_bytes(&label.to_le_bytes()),
        }
        Ok(())
    }

    fn read_label(&self, reader: &mut ReverseReader<'_>) -> Result<u32, FstError> {
        Ok(match self.width {
            LabelWidth::Byte1 => u32::from(reader.read_byte()?),
            LabelWidth::Byte2 => {
                let b = reader.read_bytes(2)?;
                u32::from(u16::from_le_bytes([b[0], b[1]]))
            }
            LabelWidth::Byte4 => {
                let b = reader.read_bytes(4)?;
                u32::from_le_bytes([b[0], b[1], b[2], b[3]])
            }
        })
    }

    /// Install the root address once construction is complete and warm the
    /// root arc cache.
    pub(crate) fn set_start(&mut self, addr: CompiledAddr) -> Result<(), FstError> {
        self.start_node = match addr {
            CompiledAddr::Node(address) => address,
            CompiledAddr::FinalEnd | CompiledAddr::NonFinalEnd => 0,
        };
        self.cache_root_arcs()
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// The virtual arc into the start node. Carries the empty-key output as
    /// its final output when one exists.
    pub fn first_arc(&self) -> Arc<O::Value> {
        let mut arc = Arc::blank(self.outputs.no_output());
        arc.flags = BIT_LAST_ARC;
        if let Some(empty) = &self.empty_output {
            arc.flags |= BIT_FINAL_ARC;
            if *empty != self.outputs.no_output() {
                arc.flags |= BIT_HAS_FINAL_OUTPUT;
            }
            arc.final_output = empty.clone();
        }
        arc.target = self.start_node;
        arc
    }

    /// Position `arc` on the first outgoing arc of `follow`'s target.
    ///
    /// When `follow` is final this yields the synthetic end-of-key arc
    /// first; [`read_next_arc`](Self::read_next_arc) then continues with the
    /// real arcs.
    pub fn read_first_target_arc(
        &self,
        follow: &Arc<O::Value>,
        arc: &mut Arc<O::Value>,
        reader: &mut ReverseReader<'_>,
    ) -> Result<(), FstError> {
        if follow.is_final() {
            arc.label = END_LABEL;
            arc.output = follow.final_output.clone();
            arc.final_output = self.outputs.no_output();
            arc.flags = BIT_FINAL_ARC;
            if follow.target_has_arcs() {
                // The real arcs follow; remember where to pick them up.
                arc.next_arc = follow.target;
            } else {
                arc.flags |= BIT_LAST_ARC;
            }
            arc.target = 0;
            arc.bytes_per_arc = 0;
            Ok(())
        } else {
            self.read_first_real_arc(follow.target, arc, reader)
        }
    }

    /// Advance `arc` to its next sibling.
    ///
    /// The arc must not be the node's last; check [`Arc::is_last`] first.
    pub fn read_next_arc(
        &self,
        arc: &mut Arc<O::Value>,
        reader: &mut ReverseReader<'_>,
    ) -> Result<(), FstError> {
        if arc.is_end() {
            // Leaving the synthetic end-of-key arc: the stored node address
            // was stashed in next_arc.
            debug_assert!(arc.next_arc > 0, "read_next_arc past the last arc");
            self.read_first_real_arc(arc.next_arc, arc, reader)
        } else {
            self.read_next_real_arc(arc, reader)
        }
    }

    fn read_first_real_arc(
        &self,
        node: u64,
        arc: &mut Arc<O::Value>,
        reader: &mut ReverseReader<'_>,
    ) -> Result<(), FstError> {
        self.check_address(node)?;
        reader.set_position(node);
        if reader.read_byte()? == FIXED_ARRAY_MARKER {
            let (num_arcs, bytes_per_arc) = self.read_array_header(reader)?;
            arc.num_arcs = num_arcs;
            arc.bytes_per_arc = bytes_per_arc;
            arc.arc_index = 0;
            arc.arcs_start = reader.position();
        } else {
            arc.bytes_per_arc = 0;
            arc.next_arc = node;
        }
        self.read_next_real_arc(arc, reader)
    }

    fn read_next_real_arc(
        &self,
        arc: &mut Arc<O::Value>,
        reader: &mut ReverseReader<'_>,
    ) -> Result<(), FstError> {
        if arc.bytes_per_arc != 0 {
            // Fixed stride: seek straight to the slot.
            debug_assert!(arc.arc_index < arc.num_arcs);
            reader.set_position(arc.arcs_start);
            reader.skip(u64::from(arc.arc_index) * u64::from(arc.bytes_per_arc));
            arc.arc_index += 1;
        } else {
            reader.set_position(arc.next_arc);
        }

        let flags_position = reader.position();
        arc.flags = reader.read_byte()?;
        if arc.flags & !(FIXED_ARRAY_MARKER - 1) != 0 {
            return Err(FstError::BadFlags { flags: arc.flags, position: flags_position });
        }
        arc.label = self.read_label(reader)?;
        arc.output = if arc.flag(BIT_HAS_OUTPUT) {
            self.outputs.read(reader)?
        } else {
            self.outputs.no_output()
        };
        arc.final_output = if arc.flag(BIT_HAS_FINAL_OUTPUT) {
            self.outputs.read_final(reader)?
        } else {
            self.outputs.no_output()
        };

        if arc.flag(BIT_STOP_NODE) {
            arc.target = 0;
            arc.next_arc = reader.position();
        } else if arc.flag(BIT_TARGET_NEXT) {
            arc.next_arc = reader.position();
            // The target sits immediately below this node's bytes; skip the
            // remaining siblings to land on its address.
            if !arc.is_last() {
                if arc.bytes_per_arc == 0 {
                    self.seek_to_next_node(reader)?;
                } else {
                    reader.set_position(arc.arcs_start);
                    reader.skip(u64::from(arc.num_arcs) * u64::from(arc.bytes_per_arc));
                }
            }
            arc.target = reader.position();
            self.check_address(arc.target)?;
        } else {
            arc.target = reader.read_vu64()?;
            self.check_address(arc.target)?;
            arc.next_arc = reader.position();
        }
        Ok(())
    }

    /// Locate the outgoing arc of `follow`'s target carrying `label`, into
    /// `arc`. Returns `false` when no arc matches, the ordinary absent-key
    /// result, not an error.
    ///
    /// [`END_LABEL`] matches exactly when `follow` is final and resolves the
    /// key ending there.
    pub fn find_target_arc(
        &self,
        label: u32,
        follow: &Arc<O::Value>,
        arc: &mut Arc<O::Value>,
        reader: &mut ReverseReader<'_>,
    ) -> Result<bool, FstError> {
        if label == END_LABEL {
            if !follow.is_final() {
                return Ok(false);
            }
            arc.label = END_LABEL;
            arc.output = follow.final_output.clone();
            arc.final_output = self.outputs.no_output();
            // Deliberately not flagged final: the ending has been consumed,
            // so a second end-of-key match against this arc must miss.
            arc.flags = if follow.target_has_arcs() {
                arc.next_arc = follow.target;
                0
            } else {
                BIT_LAST_ARC
            };
            arc.target = 0;
            arc.bytes_per_arc = 0;
            return Ok(true);
        }

        // Root arcs may be served from memory.
        if follow.target == self.start_node && (label as usize) < ROOT_ARC_CACHE_SIZE {
            if let Some(cache) = &self.root_arcs {
                return Ok(match &cache[label as usize] {
                    Some(cached) => {
                        arc.clone_from(cached);
                        true
                    }
                    None => false,
                });
            }
        }

        if !follow.target_has_arcs() {
            return Ok(false);
        }
        self.check_address(follow.target)?;
        reader.set_position(follow.target);

        if reader.read_byte()? == FIXED_ARRAY_MARKER {
            let (num_arcs, bytes_per_arc) = self.read_array_header(reader)?;
            arc.num_arcs = num_arcs;
            arc.bytes_per_arc = bytes_per_arc;
            arc.arcs_start = reader.position();

            let mut low = 0i64;
            let mut high = i64::from(num_arcs) - 1;
            while low <= high {
                let mid = ((low + high) >> 1) as u32;
                reader.set_position(arc.arcs_start);
                // +1 steps over the slot's flags byte to its label.
                reader.skip(u64::from(mid) * u64::from(bytes_per_arc) + 1);
                let mid_label = self.read_label(reader)?;
                if mid_label < label {
                    low = i64::from(mid) + 1;
                } else if mid_label > label {
                    high = i64::from(mid) - 1;
                } else {
                    arc.arc_index = mid;
                    self.read_next_real_arc(arc, reader)?;
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        // Linear scan; labels ascend, so overshooting means absent.
        self.read_first_real_arc(follow.target, arc, reader)?;
        loop {
            if arc.label == label {
                return Ok(true);
            }
            if arc.label > label || arc.is_last() {
                return Ok(false);
            }
            self.read_next_real_arc(arc, reader)?;
        }
    }

    /// Position `arc` on the *last* outgoing arc of `follow`'s target
    /// without enumerating the earlier siblings' outputs.
    pub fn read_last_target_arc(
        &self,
        follow: &Arc<O::Value>,
        arc: &mut Arc<O::Value>,
        reader: &mut ReverseReader<'_>,
    ) -> Result<(), FstError> {
        if !follow.target_has_arcs() {
            debug_assert!(follow.is_final());
            arc.label = END_LABEL;
            arc.output = follow.final_output.clone();
            arc.final_output = self.outputs.no_output();
            arc.target = 0;
            arc.flags = BIT_LAST_ARC | BIT_FINAL_ARC;
            arc.bytes_per_arc = 0;
            return Ok(());
        }

        self.check_address(follow.target)?;
        reader.set_position(follow.target);
        let first_byte = reader.read_byte()?;
        if first_byte == FIXED_ARRAY_MARKER {
            let (num_arcs, bytes_per_arc) = self.read_array_header(reader)?;
            arc.num_arcs = num_arcs;
            arc.bytes_per_arc = bytes_per_arc;
            arc.arcs_start = reader.position();
            arc.arc_index = num_arcs - 1;
            self.read_next_real_arc(arc, reader)?;
        } else {
            arc.flags = first_byte;
            arc.bytes_per_arc = 0;
            let mut flags_position = follow.target;
            while !arc.is_last() {
                // Step over this arc without decoding its outputs.
                reader.skip(self.width.byte_len() as u64);
                if arc.flag(BIT_HAS_OUTPUT) {
                    self.outputs.skip(reader)?;
                }
                if arc.flag(BIT_HAS_FINAL_OUTPUT) {
                    self.outputs.skip_final(reader)?;
                }
                if !arc.flag(BIT_STOP_NODE) && !arc.flag(BIT_TARGET_NEXT) {
                    reader.read_vu64()?;
                }
                flags_position = reader.position();
                arc.flags = reader.read_byte()?;
            }
            arc.next_arc = flags_position;
            self.read_next_real_arc(arc, reader)?;
        }
        debug_assert!(arc.is_last());
        Ok(())
    }

    fn seek_to_next_node(&self, reader: &mut ReverseReader<'_>) -> Result<(), FstError> {
        loop {
            let flags = reader.read_byte()?;
            reader.skip(self.width.byte_len() as u64);
            if flags & BIT_HAS_OUTPUT != 0 {
                self.outputs.skip(reader)?;
            }
            if flags & BIT_HAS_FINAL_OUTPUT != 0 {
                self.outputs.skip_final(reader)?;
            }
            if flags & BIT_STOP_NODE == 0 && flags & BIT_TARGET_NEXT == 0 {
                reader.read_vu64()?;
            }
            if flags & BIT_LAST_ARC != 0 {
                return Ok(());
            }
        }
    }

    fn read_array_header(&self, reader: &mut ReverseReader<'_>) -> Result<(u32, u32), FstError> {
        let position = reader.position();
        let num_arcs = reader.read_vu64()?;
        let bytes_per_arc = reader.read_vu64()?;
        if num_arcs == 0 || num_arcs > u64::from(u32::MAX) {
            return Err(FstError::BadArrayHeader { position });
        }
        if bytes_per_arc == 0 || bytes_per_arc > u64::from(u32::MAX) {
            return Err(FstError::BadArrayHeader { position });
        }
        Ok((num_arcs as u32, bytes_per_arc as u32))
    }

    fn check_address(&self, address: u64) -> Result<(), FstError> {
        if address == 0 || address >= self.bytes.len() as u64 {
            return Err(FstError::AddressOutOfRange { address, len: self.bytes.len() });
        }
        Ok(())
    }

    fn cache_root_arcs(&mut self) -> Result<(), FstError> {
        self.root_arcs = None;
        let first = self.first_arc();
        if !first.target_has_arcs() {
            return Ok(());
        }

        let mut cache: Vec<Option<Arc<O::Value>>> = vec![None; ROOT_ARC_CACHE_SIZE];
        let mut reader = ReverseReader::new(self.bytes.as_slice());
        let mut arc = Arc::blank(self.outputs.no_output());
        self.read_first_real_arc(first.target, &mut arc, &mut reader)?;
        let mut cached = 0usize;
        loop {
            debug_assert!(!arc.is_end());
            if (arc.label as usize) < ROOT_ARC_CACHE_SIZE {
                cache[arc.label as usize] = Some(arc.clone());
                cached += 1;
            } else {
                break;
            }
            if arc.is_last() {
                break;
            }
            self.read_next_real_arc(&mut arc, &mut reader)?;
        }

        // Worth holding only for arc-rich roots, and only while the cache
        // stays well under the encoded size itself.
        let cache_cost = ROOT_ARC_CACHE_SIZE * std::mem::size_of::<Arc<O::Value>>();
        if cached >= ARRAY_MIN_ARCS_SHALLOW && cache_cost < self.bytes.len() / 5 {
            self.root_arcs = Some(cache);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Look up one key, accumulating outputs label by label and resolving
    /// the ending through [`END_LABEL`]. `Ok(None)` is the ordinary
    /// absent-key result.
    pub fn get(&self, key: &[u32]) -> Result<Option<O::Value>, FstError> {
        let mut reader = self.reader();
        let mut current = self.first_arc();
        let mut next = Arc::blank(self.outputs.no_output());
        let mut output = self.outputs.no_output();

        for &label in key {
            if !self.find_target_arc(label, &current, &mut next, &mut reader)? {
                return Ok(None);
            }
            std::mem::swap(&mut current, &mut next);
            output = self.outputs.add(&output, &current.output);
        }
        if !self.find_target_arc(END_LABEL, &current, &mut next, &mut reader)? {
            return Ok(None);
        }
        Ok(Some(self.outputs.add(&output, &next.output)))
    }

    /// [`get`](Self::get) for byte-string keys.
    pub fn get_bytes(&self, key: &[u8]) -> Result<Option<O::Value>, FstError> {
        let labels: Vec<u32> = key.iter().map(|&b| u32::from(b)).collect();
        self.get(&labels)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Append the persisted form to `out`. No compression or checksum here;
    /// both belong to whatever container carries the blob.
    pub fn save(&self, out: &mut Vec<u8>) {
        let empty_bytes = self.empty_output.as_ref().map(|value| {
            let mut scratch = ByteStore::new();
            self.outputs.write_final(value, &mut scratch);
            let mut bytes = scratch.into_vec();
            // Stored reversed, like node spans, so the reverse cursor can
            // decode it on load.
            bytes.reverse();
            bytes
        });
        format::write(out, self.width, empty_bytes.as_deref(), self.start_node, self.bytes.as_slice());
    }

    /// Reconstruct a transducer persisted by [`save`](Self::save). The node
    /// bytes are copied into an owned store.
    pub fn load(data: &[u8], outputs: O) -> Result<Self, FstError> {
        let raw = format::parse(data)?;
        let empty_output = match raw.empty_bytes {
            None => None,
            Some(segment) => {
                let mut reader = ReverseReader::new(segment);
                Some(outputs.read_final(&mut reader)?)
            }
        };
        let mut fst = Self {
            width: raw.width,
            outputs,
            bytes: ByteStore::from(raw.body.to_vec()),
            start_node: raw.start_node,
            empty_output,
            node_count: 0,
            arc_count: 0,
            root_arcs: None,
            last_frozen_node: 0,
            allow_array_arcs: true,
        };
        fst.cache_root_arcs()?;
        Ok(fst)
    }
}
