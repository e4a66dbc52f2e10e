use async_trait::async_trait;

use crate::errors::DeskPilotResult;
use crate::perception::types::RawCapture;

/// Boundary to the screen-capture + object-detection backend.
/// Implementations own their retry policy; an `Err` here is fatal to the run.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn capture(&self) -> DeskPilotResult<RawCapture>;
}
