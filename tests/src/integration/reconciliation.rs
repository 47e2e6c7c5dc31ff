//! # Reconciliation Scenarios
//!
//! Full passes of the engine against a mock chain, checked through the
//! storage layer: what was re-read, what was left alone, what was deleted,
//! and that every pass lands as one atomic commit.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use rm_02_registry_storage::{KeyFilter, RegistryReadApi};
    use rm_03_reconciler::{ReconcileError, ReconcileMode};

    use crate::integration::fixtures::{block, key, module, operator, Harness};

    #[tokio::test]
    async fn test_repeated_passes_are_idempotent() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(1, 2, 3);

        h.engine.update(module(), block(1)).await.unwrap();
        let first = h.store.operator_keys(module(), 0).unwrap();

        h.engine.update(module(), block(2)).await.unwrap();
        h.engine.update(module(), block(3)).await.unwrap();
        let third = h.store.operator_keys(module(), 0).unwrap();

        assert_eq!(first, third);
        let meta = h.store.get_meta(module()).unwrap().unwrap();
        assert_eq!(meta.block_number, 3);
    }

    #[tokio::test]
    async fn test_finalized_rows_are_never_re_read() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(2, 2, 4);
        h.engine.update(module(), block(1)).await.unwrap();
        h.reader.clear_requested_ranges();

        // Corrupt the chain below the finalized boundary. A correct engine
        // never notices, because those indices are not requested again.
        h.reader.replace_key(0, 0, key(0, 0, 200, true));
        h.engine.update(module(), block(2)).await.unwrap();

        assert_eq!(h.reader.requested_ranges(), vec![(0, 2, 4)]);
        let stored = h.store.operator_keys(module(), 0).unwrap();
        assert_eq!(stored[0].key, [10u8; 48]);
    }

    #[tokio::test]
    async fn test_growth_re_reads_only_the_tail() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(3, 3, 3);
        h.engine.update(module(), block(1)).await.unwrap();
        h.reader.clear_requested_ranges();

        // A fourth key appears.
        h.seed_single_operator(3, 3, 4);
        h.engine.update(module(), block(2)).await.unwrap();

        assert_eq!(h.reader.requested_ranges(), vec![(0, 3, 4)]);
        let stored = h.store.operator_keys(module(), 0).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[3].index, 3);
    }

    #[tokio::test]
    async fn test_shrink_truncates_stored_tail() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(0, 0, 3);
        h.engine.update(module(), block(1)).await.unwrap();
        assert_eq!(h.store.operator_keys(module(), 0).unwrap().len(), 3);

        // Unused keys were removed on chain; the mirror follows.
        h.seed_single_operator(0, 0, 2);
        h.engine.update(module(), block(2)).await.unwrap();

        let stored = h.store.operator_keys(module(), 0).unwrap();
        assert_eq!(stored.iter().map(|k| k.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_reorged_unfinalized_tail_heals() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(1, 2, 3);
        h.engine.update(module(), block(1)).await.unwrap();

        // A reorg replaced the unfinalized keys at indices 1 and 2.
        h.reader.replace_key(0, 1, key(0, 1, 101, true));
        h.reader.replace_key(0, 2, key(0, 2, 102, false));
        h.engine.update(module(), block(2)).await.unwrap();

        let stored = h.store.operator_keys(module(), 0).unwrap();
        assert_eq!(stored[1].key, [101u8; 48]);
        assert_eq!(stored[2].key, [102u8; 48]);
        // Below the boundary nothing moved.
        assert_eq!(stored[0].key, [10u8; 48]);
    }

    #[tokio::test]
    async fn test_used_only_mirror_ignores_unused_tail() {
        let h = Harness::new(ReconcileMode::UsedOnly);
        h.seed_single_operator(1, 2, 6);
        h.engine.update(module(), block(1)).await.unwrap();

        let stored = h.store.operator_keys(module(), 0).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|k| k.used));
    }

    #[tokio::test]
    async fn test_multiple_operators_in_one_pass() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.reader.set_operators(vec![
            operator(0, 0, 1, 2),
            operator(1, 0, 0, 1),
            operator(2, 0, 0, 0),
        ]);
        h.reader.set_keys(0, vec![key(0, 0, 10, true), key(0, 1, 11, false)]);
        h.reader.set_keys(1, vec![key(1, 0, 20, false)]);

        h.engine.update(module(), block(1)).await.unwrap();

        assert_eq!(h.store.operator_keys(module(), 0).unwrap().len(), 2);
        assert_eq!(h.store.operator_keys(module(), 1).unwrap().len(), 1);
        assert_eq!(h.store.operator_keys(module(), 2).unwrap().len(), 0);
        assert!(h.store.find_operator(module(), 2).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_pass_leaves_no_partial_state() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        // Claims three keys but only serves two: the fetch phase fails.
        h.reader.set_operators(vec![operator(0, 0, 0, 3)]);
        h.reader.set_keys(0, vec![key(0, 0, 10, false), key(0, 1, 11, false)]);

        let err = h.engine.update(module(), block(1)).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Remote(_)));

        // Not a single row landed, and the module still reports "not ready".
        assert!(h.store.get_meta(module()).unwrap().is_none());
        assert!(h.store.operator_keys(module(), 0).unwrap().is_empty());
        assert!(h.store.find_operator(module(), 0).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivated_operator_is_still_mirrored() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        let mut op = operator(0, 0, 0, 0);
        op.active = false;
        h.reader.set_operators(vec![op]);

        h.engine.update(module(), block(1)).await.unwrap();
        let stored = h.store.find_operator(module(), 0).unwrap().unwrap();
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn test_readers_never_observe_meta_ahead_of_rows() {
        // Pass n commits at block 99 + n with exactly n keys, so any read
        // view whose meta and row set come from different commits is
        // immediately visible as a count mismatch.
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(0, 1, 1);
        h.engine.update(module(), block(100)).await.unwrap();

        let store = h.store.clone();
        let done = Arc::new(AtomicBool::new(false));
        let done_reads = Arc::clone(&done);
        let reads = tokio::task::spawn_blocking(move || {
            while !done_reads.load(Ordering::Relaxed) {
                let (keys, meta) = store.get_keys(module(), KeyFilter::default()).unwrap();
                let meta = meta.unwrap();
                assert_eq!(keys.len() as u64, meta.block_number - 99);
            }
        });

        for n in 2..=25u64 {
            h.seed_single_operator(0, n, n);
            h.engine.update(module(), block(99 + n)).await.unwrap();
        }

        done.store(true, Ordering::Relaxed);
        reads.await.unwrap();
    }
}
