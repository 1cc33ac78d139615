//! Tests for the in-memory BloomFilter
//!
//! These tests verify:
//! - Parameter validation at construction
//! - Reference sizing for n=1000, p=0.01
//! - No false negatives, and absent elements staying absent
//! - Precomputed and custom hashes
//! - Clear and false positive rate estimation
//! - Concurrent adds

use std::sync::Arc;

use bloomstore::{BloomError, BloomFilter, BloomHasher, ChainedDigest, Config, Membership, StorageMode};

// =============================================================================
// Helper Functions
// =============================================================================

fn corpus(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}-{}", prefix, i)).collect()
}

fn filter_with(elements: &[String]) -> BloomFilter {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    for element in elements {
        filter.add(element).unwrap();
    }
    filter
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_reference_parameters() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();

    assert_eq!(filter.number_bits(), 9586);
    assert_eq!(filter.number_hashes(), 7);
    assert_eq!(filter.byte_length(), 1199);
    assert_eq!(filter.elements_added(), 0);
    assert_eq!(filter.estimated_elements(), 1000);
    assert_eq!(filter.false_positive_probability(), 0.01);
    assert_eq!(filter.storage_mode(), StorageMode::InMemory);
    assert!(filter.path().is_none());
}

#[test]
fn test_invalid_parameters_rejected() {
    for (n, p) in [(0u64, 0.01f32), (100, 0.0), (100, 1.0)] {
        let result = BloomFilter::new(n, p);
        assert!(
            matches!(result, Err(BloomError::InvalidParameters(_))),
            "({}, {}) should be rejected",
            n,
            p
        );
    }
}

#[test]
fn test_unallocatable_capacity_rejected() {
    let result = BloomFilter::new(1u64 << 60, 0.01);
    assert!(matches!(result, Err(BloomError::InvalidParameters(_))));
}

#[test]
fn test_with_config() {
    let config = Config::builder()
        .estimated_elements(500)
        .false_positive_rate(0.05)
        .build();
    let filter = BloomFilter::with_config(&config).unwrap();

    assert_eq!(filter.estimated_elements(), 500);
    assert_eq!(filter.false_positive_probability(), 0.05);
}

// =============================================================================
// Add / Check Tests
// =============================================================================

#[test]
fn test_hello_world() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    filter.add("hello").unwrap();

    assert_eq!(filter.check("hello").unwrap(), Membership::PossiblyPresent);
    assert_eq!(filter.check("world").unwrap(), Membership::DefinitelyAbsent);
    assert_eq!(filter.elements_added(), 1);
}

#[test]
fn test_no_false_negatives() {
    let present = corpus("element", 500);
    let filter = filter_with(&present);

    for element in &present {
        assert!(filter.check(element).unwrap().is_possibly_present());
    }
    assert_eq!(filter.elements_added(), 500);
}

#[test]
fn test_absent_corpus_stays_absent() {
    let filter = filter_with(&corpus("element", 500));

    for element in corpus("absent", 500) {
        assert_eq!(
            filter.check(&element).unwrap(),
            Membership::DefinitelyAbsent,
            "{} collided",
            element
        );
    }
}

#[test]
fn test_add_sets_at_most_k_bits() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    filter.add("hello").unwrap();

    let set = filter.count_set_bits();
    assert!(set >= 1 && set <= filter.number_hashes() as u64);
}

#[test]
fn test_bytes_and_str_agree() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    filter.add(b"raw bytes").unwrap();
    assert!(filter.check("raw bytes").unwrap().is_possibly_present());
}

// =============================================================================
// Precomputed Hash Tests
// =============================================================================

#[test]
fn test_compute_hashes_deterministic() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    let a = filter.compute_hashes("hello", 7);
    let b = filter.compute_hashes("hello", 7);

    assert_eq!(a.len(), 7);
    assert_eq!(a, b);
    assert_eq!(a, ChainedDigest.hashes(b"hello", 7));
}

#[test]
fn test_add_with_hashes_matches_add() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    let hashes = filter.compute_hashes("hello", filter.number_hashes());
    filter.add_with_hashes(&hashes).unwrap();

    assert!(filter.check("hello").unwrap().is_possibly_present());
    assert!(filter.check_with_hashes(&hashes).unwrap().is_possibly_present());
}

#[test]
fn test_extra_hashes_ignored() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    let hashes = filter.compute_hashes("hello", 20);
    filter.add_with_hashes(&hashes).unwrap();

    assert!(filter.check("hello").unwrap().is_possibly_present());
}

#[test]
fn test_insufficient_hashes_leaves_filter_untouched() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    filter.add("hello").unwrap();
    let before = filter.export_blob();

    let result = filter.add_with_hashes(&[1, 2, 3]);

    match result {
        Err(BloomError::InsufficientHashes { required, supplied }) => {
            assert_eq!(required, 7);
            assert_eq!(supplied, 3);
        }
        other => panic!("expected InsufficientHashes, got {:?}", other),
    }
    assert_eq!(filter.elements_added(), 1);
    assert_eq!(filter.export_blob(), before);
}

#[test]
fn test_check_with_insufficient_hashes() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    let result = filter.check_with_hashes(&[42]);
    assert!(matches!(result, Err(BloomError::InsufficientHashes { .. })));
}

// =============================================================================
// Custom Hasher Tests
// =============================================================================

#[test]
fn test_custom_hash_function() {
    let hasher = |element: &[u8], count: u32| -> Vec<u64> {
        let base = element.iter().map(|&b| b as u64).sum::<u64>();
        (0..count as u64).map(|i| base * 31 + i).collect()
    };
    let filter = BloomFilter::new(1000, 0.01)
        .unwrap()
        .with_hash_function(Arc::new(hasher));

    assert_eq!(filter.compute_hashes("ab", 2), vec![195 * 31, 195 * 31 + 1]);

    filter.add("ab").unwrap();
    // Same byte sum, same positions
    assert!(filter.check("ba").unwrap().is_possibly_present());
}

#[test]
fn test_short_custom_hasher_rejected() {
    let hasher = |_: &[u8], _: u32| -> Vec<u64> { vec![1] };
    let mut filter = BloomFilter::new(1000, 0.01).unwrap();
    filter.set_hash_function(Arc::new(hasher));

    assert!(matches!(
        filter.add("hello"),
        Err(BloomError::InsufficientHashes { .. })
    ));
    assert_eq!(filter.elements_added(), 0);

    filter.reset_hash_function();
    filter.add("hello").unwrap();
    assert_eq!(filter.elements_added(), 1);
}

// =============================================================================
// Clear / Rate Tests
// =============================================================================

#[test]
fn test_clear_resets_state() {
    let present = corpus("element", 100);
    let mut filter = filter_with(&present);
    assert!(filter.current_false_positive_rate() > 0.0);

    filter.clear().unwrap();

    assert_eq!(filter.elements_added(), 0);
    assert_eq!(filter.count_set_bits(), 0);
    assert_eq!(filter.current_false_positive_rate(), 0.0);
    for element in &present {
        assert_eq!(filter.check(element).unwrap(), Membership::DefinitelyAbsent);
    }
}

#[test]
fn test_current_rate_grows_with_load() {
    let filter = BloomFilter::new(1000, 0.01).unwrap();
    let mut last = filter.current_false_positive_rate();
    for element in corpus("load", 1000) {
        filter.add(&element).unwrap();
        let rate = filter.current_false_positive_rate();
        assert!(rate >= last);
        last = rate;
    }
    assert!(last > 0.005 && last < 0.015, "rate at capacity was {}", last);
}

#[test]
fn test_stats() {
    let filter = filter_with(&corpus("element", 10));
    let stats = filter.stats();

    assert_eq!(stats.number_bits, 9586);
    assert_eq!(stats.number_hashes, 7);
    assert_eq!(stats.elements_added, 10);
    assert_eq!(stats.export_size, 1199 + 20);
    assert!(!stats.on_disk);

    let text = stats.to_string();
    assert!(text.starts_with("BloomFilter"));
    assert!(text.contains("bits: 9586"));
    assert!(text.contains("elements added: 10"));
    assert!(text.contains("is on disk: no"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_adds() {
    let filter = BloomFilter::new(10_000, 0.01).unwrap();
    let threads = 8;
    let per_thread = 500;

    crossbeam::thread::scope(|scope| {
        for t in 0..threads {
            let filter = &filter;
            scope.spawn(move |_| {
                for i in 0..per_thread {
                    filter.add(format!("t{}-{}", t, i)).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(filter.elements_added(), (threads * per_thread) as u64);
    for t in 0..threads {
        for i in 0..per_thread {
            assert!(filter
                .check(format!("t{}-{}", t, i))
                .unwrap()
                .is_possibly_present());
        }
    }
}

#[test]
fn test_shared_across_threads_with_arc() {
    let filter = Arc::new(BloomFilter::new(1000, 0.01).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let filter = Arc::clone(&filter);
            std::thread::spawn(move || filter.add(format!("arc-{}", t)).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(filter.elements_added(), 4);
}
