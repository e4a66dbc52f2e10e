use async_trait::async_trait;

use crate::engine::history::HistoryEntry;
use crate::errors::DeskPilotResult;
use crate::perception::types::ScreenSnapshot;
use crate::proposal::types::ActionIntent;

/// Boundary to the language-model backend that turns a task description,
/// the element list, and the screenshot into an ordered intent batch.
///
/// An empty batch means "no action, re-evaluate" and is not an error;
/// an `Err` is fatal to the run.
#[async_trait]
pub trait ActionProposer: Send + Sync {
    async fn propose(
        &self,
        history: &[HistoryEntry],
        task: &str,
        snapshot: &ScreenSnapshot,
        image_png: &[u8],
    ) -> DeskPilotResult<Vec<ActionIntent>>;
}
