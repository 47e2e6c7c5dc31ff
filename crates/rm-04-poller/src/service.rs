//! # Polling Loop
//!
//! Owns a [`Reconciler`] and runs it on the configured schedule. Outcomes
//! are fanned out to subscribers over a broadcast channel; a slow
//! subscriber loses old updates instead of stalling the loop.

use std::sync::Arc;

use chrono::Utc;
use mirror_telemetry::metrics::POLL_TICKS;
use rm_02_registry_storage::KeyValueStore;
use rm_03_reconciler::{ReconcileError, Reconciler, RegistryReader};
use shared_types::{BlockRef, ModuleAddress, RegistryMeta};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::ports::{BlockSource, BlockSourceError};

/// The result of one module pass within a tick.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The pass committed; the mirror now reflects this snapshot.
    Updated(RegistryMeta),
    /// A previous pass for this module was still running; nothing was done.
    Skipped { module: ModuleAddress },
    /// The pass failed; the stored state is unchanged.
    Failed {
        module: ModuleAddress,
        error: Arc<ReconcileError>,
    },
    /// The chain head could not be resolved; the whole tick was skipped.
    HeadUnavailable(BlockSourceError),
}

impl PollOutcome {
    fn label(&self) -> &'static str {
        match self {
            PollOutcome::Updated(_) => "updated",
            PollOutcome::Skipped { .. } => "skipped",
            PollOutcome::Failed { .. } => "failed",
            PollOutcome::HeadUnavailable(_) => "head_unavailable",
        }
    }
}

/// A live subscription to poll outcomes.
pub struct Subscription {
    rx: broadcast::Receiver<PollOutcome>,
}

impl Subscription {
    /// The next outcome, or `None` once the poller is gone.
    ///
    /// Lag (outcomes dropped because this subscriber fell behind) is
    /// skipped silently; the subscriber resumes at the oldest retained
    /// outcome.
    pub async fn next(&mut self) -> Option<PollOutcome> {
        loop {
            match self.rx.recv().await {
                Ok(outcome) => return Some(outcome),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Scheduled polling loop over a reconciler.
pub struct RegistryPoller<KV: KeyValueStore, R, B> {
    reconciler: Arc<Reconciler<KV, R>>,
    blocks: Arc<B>,
    config: PollerConfig,
    events: broadcast::Sender<PollOutcome>,
}

/// Handle to a spawned polling loop.
///
/// Dropping the handle without calling [`stop`](Self::stop) leaves the loop
/// running detached.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the loop, letting an in-flight tick finish first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl<KV, R, B> RegistryPoller<KV, R, B>
where
    KV: KeyValueStore,
    R: RegistryReader + 'static,
    B: BlockSource + 'static,
{
    pub fn new(reconciler: Arc<Reconciler<KV, R>>, blocks: Arc<B>, config: PollerConfig) -> Self {
        let (events, _) = broadcast::channel(config.subscriber_capacity.max(1));
        Self {
            reconciler,
            blocks,
            config,
            events,
        }
    }

    /// Subscribe to outcomes of future ticks.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.events.subscribe(),
        }
    }

    /// Spawn the loop onto the current runtime.
    pub fn spawn(self: Arc<Self>) -> PollerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let poller = Arc::clone(&self);
        let task = tokio::spawn(async move {
            info!(modules = poller.config.modules.len(), "registry poller started");
            loop {
                let delay = poller.config.schedule.next_delay(Utc::now());
                tokio::select! {
                    _ = tokio::time::sleep(delay) => poller.tick().await,
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("registry poller stopped");
        });
        PollerHandle { shutdown, task }
    }

    /// Run one tick: resolve the head once, then pass over every module.
    pub async fn tick(&self) {
        let block = match self.blocks.latest_block().await {
            Ok(block) => block,
            Err(err) => {
                warn!(error = %err, "chain head unavailable, skipping tick");
                self.emit(PollOutcome::HeadUnavailable(err));
                return;
            }
        };

        for module in &self.config.modules {
            self.run_module(*module, block).await;
        }
    }

    async fn run_module(&self, module: ModuleAddress, block: BlockRef) {
        let outcome = match self.reconciler.try_update(module, block).await {
            Ok(meta) => PollOutcome::Updated(meta),
            Err(ReconcileError::InFlight { module }) => {
                debug!(module = %module, "previous pass still running, skipping");
                PollOutcome::Skipped { module }
            }
            Err(err) => PollOutcome::Failed {
                module,
                error: Arc::new(err),
            },
        };
        self.emit(outcome);
    }

    fn emit(&self, outcome: PollOutcome) {
        POLL_TICKS.with_label_values(&[outcome.label()]).inc();
        // No subscribers is fine.
        let _ = self.events.send(outcome);
    }
}
