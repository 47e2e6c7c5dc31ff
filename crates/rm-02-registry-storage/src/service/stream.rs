//! # Streaming Key Export
//!
//! A lazy, forward-only, single-pass export of every key of a module. The
//! producer runs on a blocking task and owns one consistent read view for
//! the duration of the scan; rows flow to the consumer through a bounded
//! channel.
//!
//! Because the read view blocks writers (or pins a snapshot, depending on
//! the adapter), a consumer that stops pulling would hold that resource
//! forever. The producer therefore tracks how long it has been stalled on a
//! full channel and, past the inactivity window, terminates the cursor with
//! a [`StorageError::StreamTimeout`] and releases the view.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use shared_types::{ModuleAddress, RegistryKey};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::warn;

use crate::config::StorageConfig;
use crate::domain::errors::StorageError;
use crate::domain::keyspace;
use crate::domain::rows::decode_row;
use crate::ports::outbound::{KeyValueStore, ScanControl};

use mirror_telemetry::metrics::STREAM_TIMEOUTS;

/// How long the stalled producer naps between channel retries.
const STALL_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Stream of key rows, terminated by at most one error.
pub struct KeyStream {
    rows: ReceiverStream<RegistryKey>,
    terminal: Arc<Mutex<Option<StorageError>>>,
    finished: bool,
}

impl KeyStream {
    /// Spawn the producer and return the consumer half.
    pub(crate) fn spawn<KV: KeyValueStore>(
        kv: Arc<KV>,
        module: ModuleAddress,
        config: StorageConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.stream_channel_capacity.max(1));
        let terminal: Arc<Mutex<Option<StorageError>>> = Arc::new(Mutex::new(None));

        let producer_terminal = Arc::clone(&terminal);
        tokio::task::spawn_blocking(move || {
            produce(kv, module, config, tx, producer_terminal);
        });

        Self {
            rows: ReceiverStream::new(rx),
            terminal,
            finished: false,
        }
    }
}

impl Stream for KeyStream {
    type Item = Result<RegistryKey, StorageError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match Pin::new(&mut self.rows).poll_next(cx) {
            Poll::Ready(Some(row)) => Poll::Ready(Some(Ok(row))),
            Poll::Ready(None) => {
                self.finished = true;
                match self.terminal.lock().take() {
                    Some(err) => Poll::Ready(Some(Err(err))),
                    None => Poll::Ready(None),
                }
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

fn produce<KV: KeyValueStore>(
    kv: Arc<KV>,
    module: ModuleAddress,
    config: StorageConfig,
    tx: mpsc::Sender<RegistryKey>,
    terminal: Arc<Mutex<Option<StorageError>>>,
) {
    let prefix = keyspace::signing_key_prefix(module);
    let window = config.stream_inactivity_window;

    let view_result = kv.with_read_view(&mut |view| {
        let scan_result = view.scan_prefix(&prefix, &mut |key, value| {
            let row: RegistryKey = match decode_row(key, value) {
                Ok(row) => row,
                Err(e) => {
                    *terminal.lock() = Some(e);
                    return ScanControl::Stop;
                }
            };
            push_with_deadline(&tx, row, window, module, &terminal)
        });
        if let Err(e) = scan_result {
            *terminal.lock() = Some(e.into());
        }
    });
    if let Err(e) = view_result {
        *terminal.lock() = Some(e.into());
    }
    // Dropping tx here closes the channel; the consumer then observes the
    // terminal error, if any.
}

fn push_with_deadline(
    tx: &mpsc::Sender<RegistryKey>,
    row: RegistryKey,
    window: Duration,
    module: ModuleAddress,
    terminal: &Mutex<Option<StorageError>>,
) -> ScanControl {
    let stalled_since = Instant::now();
    let mut row = row;
    loop {
        match tx.try_send(row) {
            Ok(()) => return ScanControl::Continue,
            // Consumer dropped the stream: a plain early end, not an error.
            Err(mpsc::error::TrySendError::Closed(_)) => return ScanControl::Stop,
            Err(mpsc::error::TrySendError::Full(back)) => {
                let idle = stalled_since.elapsed();
                if idle >= window {
                    let idle_ms = idle.as_millis() as u64;
                    STREAM_TIMEOUTS.inc();
                    warn!(module = %module, idle_ms, "key stream consumer stalled, terminating cursor");
                    *terminal.lock() = Some(StorageError::StreamTimeout { idle_ms });
                    return ScanControl::Stop;
                }
                row = back;
                std::thread::sleep(STALL_POLL_INTERVAL);
            }
        }
    }
}
