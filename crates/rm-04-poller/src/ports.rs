//! # Poller Ports
//!
//! The chain-head source the polling loop reads before each pass, plus the
//! mock used in tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{BlockHash, BlockRef};
use thiserror::Error;

/// Errors from the chain-head source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockSourceError {
    /// Transport-level failure; the tick is skipped and retried next time.
    #[error("block source unavailable: {0}")]
    Unavailable(String),
}

/// Chain-head source - outbound port.
///
/// One call per tick; every module pass within a tick uses the same block
/// so the tick observes a single chain state.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn latest_block(&self) -> Result<BlockRef, BlockSourceError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

struct MockBlockState {
    number: u64,
    should_fail: bool,
}

/// Mock chain-head source that advances one block per call.
#[derive(Clone)]
pub struct MockBlockSource {
    state: Arc<Mutex<MockBlockState>>,
}

impl MockBlockSource {
    /// Start at `number`; each `latest_block` call returns the next block.
    pub fn starting_at(number: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockBlockState {
                number,
                should_fail: false,
            })),
        }
    }

    /// Make every call fail.
    pub fn set_should_fail(&self, fail: bool) {
        self.state.lock().should_fail = fail;
    }
}

#[async_trait]
impl BlockSource for MockBlockSource {
    async fn latest_block(&self) -> Result<BlockRef, BlockSourceError> {
        let mut state = self.state.lock();
        if state.should_fail {
            return Err(BlockSourceError::Unavailable("mock failure".to_string()));
        }
        let number = state.number;
        state.number += 1;
        Ok(BlockRef::new(
            number,
            BlockHash::repeat_byte((number % 251) as u8),
            number * 12,
        ))
    }
}
