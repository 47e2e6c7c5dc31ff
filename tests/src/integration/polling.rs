//! # Polling Scenarios
//!
//! The scheduled loop over the reconciler: outcomes reach subscribers, and
//! the mirror keeps advancing as the mock chain head moves.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rm_03_reconciler::ReconcileMode;
    use rm_04_poller::{MockBlockSource, PollOutcome, PollerConfig, RegistryPoller, Subscription};

    use crate::integration::fixtures::{module, Harness};

    async fn next_outcome(sub: &mut Subscription) -> PollOutcome {
        tokio::time::timeout(Duration::from_secs(5), sub.next())
            .await
            .ok()
            .flatten()
            .unwrap()
    }

    #[tokio::test]
    async fn test_polling_advances_the_mirror() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(1, 2, 3);

        let poller = Arc::new(RegistryPoller::new(
            Arc::new(h.engine),
            Arc::new(MockBlockSource::starting_at(200)),
            PollerConfig::for_testing(vec![module()]),
        ));
        let mut sub = poller.subscribe();
        let handle = Arc::clone(&poller).spawn();

        let first = next_outcome(&mut sub).await;
        let second = next_outcome(&mut sub).await;
        handle.stop().await;

        match (first, second) {
            (PollOutcome::Updated(a), PollOutcome::Updated(b)) => {
                assert_eq!(a.block_number, 200);
                assert!(b.block_number > a.block_number);
            }
            other => panic!("expected two Updated outcomes, got {other:?}"),
        }

        let meta = h.store.get_meta(module()).unwrap().unwrap();
        assert!(meta.block_number >= 201);
        assert_eq!(h.store.operator_keys(module(), 0).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_chain_does_not_stop_the_loop() {
        let h = Harness::new(ReconcileMode::FullRegistry);
        h.seed_single_operator(0, 0, 1);
        h.reader.set_should_fail(true);

        let poller = Arc::new(RegistryPoller::new(
            Arc::new(h.engine),
            Arc::new(MockBlockSource::starting_at(1)),
            PollerConfig::for_testing(vec![module()]),
        ));
        let mut sub = poller.subscribe();
        let handle = Arc::clone(&poller).spawn();

        assert!(matches!(
            next_outcome(&mut sub).await,
            PollOutcome::Failed { .. }
        ));

        h.reader.set_should_fail(false);
        loop {
            if let PollOutcome::Updated(_) = next_outcome(&mut sub).await {
                break;
            }
        }
        handle.stop().await;
    }
}
