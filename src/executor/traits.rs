use async_trait::async_trait;

use crate::executor::types::{ActionOutcome, ResolvedAction};

/// Boundary to the physical mouse/keyboard driver.
///
/// Failures are data, not errors: transport or driver problems come back as
/// a failed [`ActionOutcome`] and abort only the current batch. The engine
/// does not retry within a batch, but the same task is re-attempted on the
/// next step, so implementations must be safe to invoke again.
#[async_trait]
pub trait ActionEffector: Send + Sync {
    async fn execute(&self, action: &ResolvedAction) -> ActionOutcome;
}
