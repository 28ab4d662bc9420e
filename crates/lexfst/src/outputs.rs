// Output algebra: the value types carried along transducer paths and the
// operations that let shared output prefixes be factored to where keys
// diverge.

use std::fmt::Debug;
use std::hash::Hash;

use lexfst_bytes::{ByteStore, ReverseReader, StoreError};

/// Operations the builder and transducer need from an output value type.
///
/// The factoring invariants are the caller's contract: `add(x, no_output())
/// == x`, `common(x, y)` is the longest shared output prefix of `x` and `y`
/// (possibly `no_output()`), and `subtract(x, common(x, y))` is exactly the
/// remainder that reconstructs `x` when added back. The engine relies on
/// these without verifying them beyond debug assertions.
///
/// `merge` combines the outputs of two *identical* keys; an algebra that
/// cannot combine duplicates returns `None` and the builder rejects the
/// second insertion.
///
/// The serialization hooks write one value forward into the store and read
/// it back through the reverse cursor (node spans are stored reversed, so
/// the cursor replays bytes in written order). Final outputs may use a
/// different encoding than mid-path outputs; the defaults reuse it.
pub trait OutputAlgebra {
    type Value: Clone + PartialEq + Eq + Hash + Debug;

    fn no_output(&self) -> Self::Value;
    fn add(&self, prefix: &Self::Value, suffix: &Self::Value) -> Self::Value;
    fn common(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn subtract(&self, value: &Self::Value, prefix: &Self::Value) -> Self::Value;
    fn merge(&self, first: &Self::Value, second: &Self::Value) -> Option<Self::Value>;

    fn write(&self, value: &Self::Value, out: &mut ByteStore);
    fn read(&self, input: &mut ReverseReader<'_>) -> Result<Self::Value, StoreError>;
    fn skip(&self, input: &mut ReverseReader<'_>) -> Result<(), StoreError>;

    fn write_final(&self, value: &Self::Value, out: &mut ByteStore) {
        self.write(value, out);
    }
    fn read_final(&self, input: &mut ReverseReader<'_>) -> Result<Self::Value, StoreError> {
        self.read(input)
    }
    fn skip_final(&self, input: &mut ReverseReader<'_>) -> Result<(), StoreError> {
        self.skip(input)
    }
}

/// The single value of [`NoOutputs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoOutput;

/// Output algebra for transducers that are plain sets: every path carries
/// the same empty output, nothing is ever written to the byte store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOutputs;

impl OutputAlgebra for NoOutputs {
    type Value = NoOutput;

    fn no_output(&self) -> NoOutput {
        NoOutput
    }

    fn add(&self, _prefix: &NoOutput, _suffix: &NoOutput) -> NoOutput {
        NoOutput
    }

    fn common(&self, _a: &NoOutput, _b: &NoOutput) -> NoOutput {
        NoOutput
    }

    fn subtract(&self, _value: &NoOutput, _prefix: &NoOutput) -> NoOutput {
        NoOutput
    }

    /// Duplicate keys without outputs collapse to a single key.
    fn merge(&self, _first: &NoOutput, _second: &NoOutput) -> Option<NoOutput> {
        Some(NoOutput)
    }

    fn write(&self, _value: &NoOutput, _out: &mut ByteStore) {}

    fn read(&self, _input: &mut ReverseReader<'_>) -> Result<NoOutput, StoreError> {
        Ok(NoOutput)
    }

    fn skip(&self, _input: &mut ReverseReader<'_>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Output algebra over unsigned integers.
///
/// The shared prefix of two integers is their minimum, so factoring stores
/// the common part once on the shared path and the differences on the arcs
/// below the divergence. Duplicate keys merge by summation, which is what
/// frequency-style dictionaries want.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntOutputs;

impl OutputAlgebra for IntOutputs {
    type Value = u64;

    fn no_output(&self) -> u64 {
        0
    }

    fn add(&self, prefix: &u64, suffix: &u64) -> u64 {
        prefix + suffix
    }

    fn common(&self, a: &u64, b: &u64) -> u64 {
        (*a).min(*b)
    }

    fn subtract(&self, value: &u64, prefix: &u64) -> u64 {
        debug_assert!(value >= prefix);
        value - prefix
    }

    fn merge(&self, first: &u64, second: &u64) -> Option<u64> {
        Some(first + second)
    }

    fn write(&self, value: &u64, out: &mut ByteStore) {
        out.write_vu64(*value);
    }

    fn read(&self, input: &mut ReverseReader<'_>) -> Result<u64, StoreError> {
        input.read_vu64()
    }

    fn skip(&self, input: &mut ReverseReader<'_>) -> Result<(), StoreError> {
        input.read_vu64().map(|_| ())
    }
}

/// Output algebra over byte strings, factored by longest common prefix.
///
/// Duplicate keys are not mergeable: two byte strings have no canonical
/// combination, so the builder reports the duplicate to the caller instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesOutputs;

impl OutputAlgebra for BytesOutputs {
    type Value = Vec<u8>;

    fn no_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn add(&self, prefix: &Vec<u8>, suffix: &Vec<u8>) -> Vec<u8> {
        if prefix.is_empty() {
            return suffix.clone();
        }
        if suffix.is_empty() {
            return prefix.clone();
        }
        let mut out = Vec::with_capacity(prefix.len() + suffix.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(suffix);
        out
    }

    fn common(&self, a: &Vec<u8>, b: &Vec<u8>) -> Vec<u8> {
        let len = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
        a[..len].to_vec()
    }

    fn subtract(&self, value: &Vec<u8>, prefix: &Vec<u8>) -> Vec<u8> {
        debug_assert!(value.starts_with(prefix));
        value[prefix.len()..].to_vec()
    }

    fn merge(&self, _first: &Vec<u8>, _second: &Vec<u8>) -> Option<Vec<u8>> {
        None
    }

    fn write(&self, value: &Vec<u8>, out: &mut ByteStore) {
        out.write_vu64(value.len() as u64);
        out.write_bytes(value);
    }

    fn read(&self, input: &mut ReverseReader<'_>) -> Result<Vec<u8>, StoreError> {
        let len = input.read_vu64()? as usize;
        input.read_bytes(len)
    }

    fn skip(&self, input: &mut ReverseReader<'_>) -> Result<(), StoreError> {
        let len = input.read_vu64()?;
        input.skip(len);
        Ok(())
    }
}
