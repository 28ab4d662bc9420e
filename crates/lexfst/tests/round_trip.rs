// End-to-end properties of build-then-lookup over the public API.

use std::collections::BTreeSet;

use lexfst::builder::{Builder, BuilderOptions};
use lexfst::fst::Transducer;
use lexfst::outputs::{BytesOutputs, IntOutputs, NoOutput, NoOutputs};
use lexfst::{FstError, LabelWidth};

fn labels(key: &str) -> Vec<u32> {
    key.bytes().map(u32::from).collect()
}

/// Deterministic corpus of unique sorted byte-string keys.
fn corpus(count: usize, key_len: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        state >> 33
    };
    let mut keys = BTreeSet::new();
    while keys.len() < count {
        let len = 1 + (next() as usize % key_len);
        let key: Vec<u8> = (0..len).map(|_| b'a' + (next() % 16) as u8).collect();
        keys.insert(key);
    }
    keys.into_iter().collect()
}

fn build_ints(
    pairs: &[(Vec<u8>, u64)],
    options: BuilderOptions,
) -> Option<Transducer<IntOutputs>> {
    let mut builder = Builder::with_options(LabelWidth::Byte1, IntOutputs, options);
    for (key, output) in pairs {
        builder.add_bytes(key, *output).unwrap();
    }
    builder.finish().unwrap()
}

#[test]
fn concrete_scenario() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add_bytes(b"cat", 1).unwrap();
    builder.add_bytes(b"cats", 2).unwrap();
    builder.add_bytes(b"dog", 3).unwrap();
    let fst = builder.finish().unwrap().unwrap();

    assert_eq!(fst.get_bytes(b"cat").unwrap(), Some(1));
    assert_eq!(fst.get_bytes(b"cats").unwrap(), Some(2));
    assert_eq!(fst.get_bytes(b"dog").unwrap(), Some(3));
    assert_eq!(fst.get_bytes(b"ca").unwrap(), None);
    assert_eq!(fst.get_bytes(b"catss").unwrap(), None);
    assert_eq!(fst.get_bytes(b"").unwrap(), None);
}

#[test]
fn duplicate_key_merges_outputs() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add_bytes(b"cat", 1).unwrap();
    builder.add_bytes(b"cat", 2).unwrap();
    let fst = builder.finish().unwrap().unwrap();
    assert_eq!(fst.get_bytes(b"cat").unwrap(), Some(3));
}

#[test]
fn round_trip_large_corpus() {
    let keys = corpus(5000, 10, 0x5EED);
    let pairs: Vec<(Vec<u8>, u64)> =
        keys.iter().enumerate().map(|(i, k)| (k.clone(), i as u64 * 3 + 1)).collect();
    let fst = build_ints(&pairs, BuilderOptions::default()).unwrap();

    for (key, output) in &pairs {
        assert_eq!(fst.get_bytes(key).unwrap(), Some(*output), "key {key:?}");
    }

    let inserted: BTreeSet<&[u8]> = keys.iter().map(Vec::as_slice).collect();
    for key in &keys {
        // A character outside the corpus alphabet can never match.
        let mut extended = key.clone();
        extended.push(b'~');
        assert_eq!(fst.get_bytes(&extended).unwrap(), None);
        // Chopping the last label leaves a key only when that prefix was
        // itself inserted.
        let prefix = &key[..key.len() - 1];
        if !inserted.contains(prefix) {
            assert_eq!(fst.get_bytes(prefix).unwrap(), None, "prefix {prefix:?}");
        }
    }
}

#[test]
fn node_sharing_never_changes_results() {
    let keys = corpus(800, 8, 0xC0FFEE);
    let pairs: Vec<(Vec<u8>, u64)> =
        keys.iter().enumerate().map(|(i, k)| (k.clone(), i as u64 + 1)).collect();

    let shared = build_ints(&pairs, BuilderOptions::default()).unwrap();
    let unshared = build_ints(
        &pairs,
        BuilderOptions { share_suffixes: false, ..BuilderOptions::default() },
    )
    .unwrap();

    assert!(shared.size_in_bytes() <= unshared.size_in_bytes());
    for (key, output) in &pairs {
        assert_eq!(shared.get_bytes(key).unwrap(), Some(*output));
        assert_eq!(unshared.get_bytes(key).unwrap(), Some(*output));
    }
    let mut probe = b"zzprobe".to_vec();
    probe.push(b'~');
    assert_eq!(shared.get_bytes(&probe).unwrap(), None);
    assert_eq!(unshared.get_bytes(&probe).unwrap(), None);
}

#[test]
fn shared_suffixes_shrink_the_encoding() {
    let build = |share: bool| {
        let mut builder = Builder::with_options(
            LabelWidth::Byte1,
            NoOutputs,
            BuilderOptions { share_suffixes: share, ..BuilderOptions::default() },
        );
        builder.add_bytes(b"resting", NoOutput).unwrap();
        builder.add_bytes(b"testing", NoOutput).unwrap();
        builder.finish().unwrap().unwrap()
    };
    let shared = build(true);
    let unshared = build(false);
    assert!(
        shared.size_in_bytes() < unshared.size_in_bytes(),
        "sharing {} vs {}",
        shared.size_in_bytes(),
        unshared.size_in_bytes()
    );
    for fst in [&shared, &unshared] {
        assert!(fst.get_bytes(b"resting").unwrap().is_some());
        assert!(fst.get_bytes(b"testing").unwrap().is_some());
        assert_eq!(fst.get_bytes(b"esting").unwrap(), None);
    }
}

#[test]
fn pruning_is_monotone_over_inserted_keys() {
    let keys = corpus(300, 6, 0xBEEF);
    let pairs: Vec<(Vec<u8>, u64)> =
        keys.iter().enumerate().map(|(i, k)| (k.clone(), i as u64 + 1)).collect();

    let accepted = |options: BuilderOptions| -> Vec<Option<u64>> {
        match build_ints(&pairs, options) {
            Some(fst) => pairs.iter().map(|(k, _)| fst.get_bytes(k).unwrap()).collect(),
            None => vec![None; pairs.len()],
        }
    };

    for thresholds in [
        [0u64, 1, 2, 4].map(|n| BuilderOptions {
            min_suffix_count_1: n,
            ..BuilderOptions::default()
        }),
        [0u64, 1, 2, 4].map(|n| BuilderOptions {
            min_suffix_count_2: n,
            ..BuilderOptions::default()
        }),
    ] {
        let mut previous: Option<Vec<Option<u64>>> = None;
        for options in thresholds {
            let current = accepted(options);
            if let Some(looser) = &previous {
                for (index, (tight, loose)) in current.iter().zip(looser).enumerate() {
                    if let Some(output) = tight {
                        // Still accepted: must also be accepted under the
                        // looser setting, with the original output.
                        assert_eq!(
                            Some(output),
                            loose.as_ref(),
                            "key {:?} gained or changed under tighter pruning",
                            pairs[index].0
                        );
                        assert_eq!(*output, pairs[index].1);
                    }
                }
            }
            previous = Some(current);
        }
    }
}

#[test]
fn empty_key_only() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add(&[], 42).unwrap();
    let fst = builder.finish().unwrap().unwrap();
    assert_eq!(fst.get(&[]).unwrap(), Some(42));
    assert_eq!(fst.get_bytes(b"a").unwrap(), None);
    assert_eq!(fst.empty_output(), Some(&42));
    // The reserved end-of-key label is not a key of its own.
    assert_eq!(fst.get(&[lexfst::END_LABEL]).unwrap(), None);
}

#[test]
fn empty_key_alongside_others() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add(&[], 7).unwrap();
    builder.add_bytes(b"ox", 3).unwrap();
    let fst = builder.finish().unwrap().unwrap();
    assert_eq!(fst.get(&[]).unwrap(), Some(7));
    assert_eq!(fst.get_bytes(b"ox").unwrap(), Some(3));
    assert_eq!(fst.get_bytes(b"o").unwrap(), None);
}

#[test]
fn wide_labels_round_trip() {
    let mut builder = Builder::new(LabelWidth::Byte2, IntOutputs);
    let keys: [&[u32]; 3] = [&[0x61, 0x3A9], &[0x61, 0x3A9, 0xFFFF], &[0x1000]];
    for (i, key) in keys.iter().enumerate() {
        builder.add(key, i as u64 + 10).unwrap();
    }
    let fst = builder.finish().unwrap().unwrap();
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(fst.get(key).unwrap(), Some(i as u64 + 10));
    }
    assert_eq!(fst.get(&[0x61]).unwrap(), None);

    let mut too_wide = Builder::new(LabelWidth::Byte2, IntOutputs);
    assert!(matches!(
        too_wide.add(&[0x10000], 1),
        Err(FstError::LabelOverflow { label: 0x10000, .. })
    ));

    let mut byte4 = Builder::new(LabelWidth::Byte4, IntOutputs);
    byte4.add(&[0x10FFFF, 0x10000], 5).unwrap();
    let fst4 = byte4.finish().unwrap().unwrap();
    assert_eq!(fst4.get(&[0x10FFFF, 0x10000]).unwrap(), Some(5));
    assert_eq!(fst4.get(&[0x10FFFF]).unwrap(), None);
}

#[test]
fn byte_string_outputs_round_trip() {
    let entries: [(&str, &[u8]); 4] = [
        ("car", b"vehicle"),
        ("card", b"vehicle+d"),
        ("care", b"verb"),
        ("dove", b"bird"),
    ];
    let mut builder = Builder::new(LabelWidth::Byte1, BytesOutputs);
    for (key, output) in entries {
        builder.add(&labels(key), output.to_vec()).unwrap();
    }
    let fst = builder.finish().unwrap().unwrap();
    for (key, output) in entries {
        assert_eq!(fst.get(&labels(key)).unwrap(), Some(output.to_vec()));
    }
    assert_eq!(fst.get(&labels("ca")).unwrap(), None);
    assert_eq!(fst.get(&labels("cards")).unwrap(), None);
}

#[test]
fn save_load_round_trip() {
    let keys = corpus(2000, 9, 0xDECADE);
    let pairs: Vec<(Vec<u8>, u64)> =
        keys.iter().enumerate().map(|(i, k)| (k.clone(), i as u64 + 1)).collect();
    let fst = build_ints(&pairs, BuilderOptions::default()).unwrap();

    let mut blob = Vec::new();
    fst.save(&mut blob);
    let loaded = Transducer::load(&blob, IntOutputs).unwrap();

    assert_eq!(loaded.width(), LabelWidth::Byte1);
    assert_eq!(loaded.size_in_bytes(), fst.size_in_bytes());
    for (key, output) in &pairs {
        assert_eq!(loaded.get_bytes(key).unwrap(), Some(*output));
    }
    let absent = b"absent~".to_vec();
    assert_eq!(loaded.get_bytes(&absent).unwrap(), None);
}

#[test]
fn save_load_preserves_empty_output() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add(&[], 11).unwrap();
    builder.add_bytes(b"yak", 4).unwrap();
    let fst = builder.finish().unwrap().unwrap();

    let mut blob = Vec::new();
    fst.save(&mut blob);
    let loaded = Transducer::load(&blob, IntOutputs).unwrap();
    assert_eq!(loaded.get(&[]).unwrap(), Some(11));
    assert_eq!(loaded.get_bytes(b"yak").unwrap(), Some(4));
    assert_eq!(loaded.empty_output(), Some(&11));
}

#[test]
fn save_load_bytes_outputs() {
    let mut builder = Builder::new(LabelWidth::Byte1, BytesOutputs);
    builder.add(&labels("run"), b"ran".to_vec()).unwrap();
    builder.add(&labels("runs"), b"ran+s".to_vec()).unwrap();
    let fst = builder.finish().unwrap().unwrap();

    let mut blob = Vec::new();
    fst.save(&mut blob);
    let loaded = Transducer::load(&blob, BytesOutputs).unwrap();
    assert_eq!(loaded.get(&labels("run")).unwrap(), Some(b"ran".to_vec()));
    assert_eq!(loaded.get(&labels("runs")).unwrap(), Some(b"ran+s".to_vec()));
}

#[test]
fn loading_corrupt_data_errors_rather_than_misreads() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add_bytes(b"cat", 1).unwrap();
    builder.add_bytes(b"dog", 2).unwrap();
    let fst = builder.finish().unwrap().unwrap();
    let mut blob = Vec::new();
    fst.save(&mut blob);

    assert!(matches!(Transducer::load(&[], IntOutputs), Err(FstError::TooShort { .. })));

    let mut bad_magic = blob.clone();
    bad_magic[0] ^= 0xFF;
    assert!(matches!(Transducer::load(&bad_magic, IntOutputs), Err(FstError::InvalidMagic)));

    // Every truncation of the blob must fail to load, not misread.
    for cut in 0..blob.len() {
        assert!(Transducer::load(&blob[..cut], IntOutputs).is_err(), "cut at {cut}");
    }
}

#[test]
fn traversal_api_walks_arcs_directly() {
    let mut builder = Builder::new(LabelWidth::Byte1, IntOutputs);
    builder.add_bytes(b"ab", 10).unwrap();
    builder.add_bytes(b"ad", 20).unwrap();
    builder.add_bytes(b"ax", 30).unwrap();
    let fst = builder.finish().unwrap().unwrap();

    let mut reader = fst.reader();
    let first = fst.first_arc();
    let mut arc = fst.first_arc();
    fst.read_first_target_arc(&first, &mut arc, &mut reader).unwrap();
    assert_eq!(arc.label, u32::from(b'a'));
    // The common output prefix (10) was factored up onto this shared arc.
    assert_eq!(arc.output, 10);

    // Enumerate the three siblings under 'a' in label order; they carry
    // the per-key remainders.
    let follow = arc.clone();
    let mut sibling = fst.first_arc();
    fst.read_first_target_arc(&follow, &mut sibling, &mut reader).unwrap();
    let mut seen = vec![];
    loop {
        seen.push((sibling.label, sibling.output));
        if sibling.is_last() {
            break;
        }
        fst.read_next_arc(&mut sibling, &mut reader).unwrap();
    }
    assert_eq!(
        seen,
        vec![(u32::from(b'b'), 0), (u32::from(b'd'), 10), (u32::from(b'x'), 20)]
    );

    // The last arc is reachable without enumerating.
    let mut last = fst.first_arc();
    fst.read_last_target_arc(&follow, &mut last, &mut reader).unwrap();
    assert_eq!(last.label, u32::from(b'x'));
    assert_eq!(last.output, 20);
}
