//! # Read API Scenarios
//!
//! Queries and the streaming export, driven through a real reconciliation
//! pass rather than hand-written rows.

#[cfg(test)]
mod tests {
    use rm_02_registry_storage::{KeyFilter, RegistryReadApi};
    use rm_03_reconciler::ReconcileMode;
    use tokio_stream::StreamExt;

    use crate::integration::fixtures::{block, key, module, operator, Harness};

    async fn populated() -> Harness {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.reader.set_operators(vec![
            operator(0, 0, 2, 3),
            operator(1, 0, 1, 2),
        ]);
        h.reader.set_keys(
            0,
            vec![key(0, 0, 10, true), key(0, 1, 11, true), key(0, 2, 12, false)],
        );
        h.reader.set_keys(1, vec![key(1, 0, 20, true), key(1, 1, 21, false)]);
        h.reader.set_nonce(9);
        h.engine.update(module(), block(5)).await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_not_ready_module_has_no_meta() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        let (operators, meta) = h.store.get_operators(module()).unwrap();
        assert!(operators.is_empty());
        assert!(meta.is_none());
    }

    #[tokio::test]
    async fn test_operators_come_back_ordered_with_meta() {
        let h = populated().await;
        let (operators, meta) = h.store.get_operators(module()).unwrap();
        assert_eq!(
            operators.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        let meta = meta.unwrap();
        assert_eq!(meta.block_number, 5);
        assert_eq!(meta.nonce, 9);
    }

    #[tokio::test]
    async fn test_key_filters() {
        let h = populated().await;

        let (all, _) = h.store.get_keys(module(), KeyFilter::default()).unwrap();
        assert_eq!(all.len(), 5);

        let (used, _) = h
            .store
            .get_keys(
                module(),
                KeyFilter {
                    used: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(used.len(), 3);

        let (one_operator, _) = h
            .store
            .get_keys(
                module(),
                KeyFilter {
                    operator_index: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(one_operator.len(), 2);
        assert!(one_operator.iter().all(|k| k.operator_index == 1));
    }

    #[tokio::test]
    async fn test_pubkey_point_lookup() {
        let h = populated().await;

        let (found, meta) = h
            .store
            .get_keys_by_pubkeys(module(), &[[11u8; 48], [20u8; 48]])
            .unwrap();
        assert!(meta.is_some());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].operator_index, 0);
        assert_eq!(found[0].index, 1);
        assert_eq!(found[1].operator_index, 1);

        let (missing, _) = h
            .store
            .get_keys_by_pubkeys(module(), &[[250u8; 48]])
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_pubkey_index_follows_reorg_healing() {
        let h = populated().await;

        // The unfinalized key at (0, 2) changes on chain.
        h.reader.replace_key(0, 2, key(0, 2, 99, false));
        h.engine.update(module(), block(6)).await.unwrap();

        let (stale, _) = h.store.get_keys_by_pubkeys(module(), &[[12u8; 48]]).unwrap();
        assert!(stale.is_empty());
        let (fresh, _) = h.store.get_keys_by_pubkeys(module(), &[[99u8; 48]]).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].index, 2);
    }

    #[tokio::test]
    async fn test_stream_exports_every_key_in_order() {
        let h = populated().await;

        let mut stream = h.store.stream_all_keys(module());
        let mut seen = Vec::new();
        while let Some(item) = stream.next().await {
            let key = item.unwrap();
            seen.push((key.operator_index, key.index));
        }
        assert_eq!(seen, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]);
    }

    #[tokio::test]
    async fn test_stream_of_empty_module_ends_immediately() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        let mut stream = h.store.stream_all_keys(module());
        assert!(stream.next().await.is_none());
    }
}
