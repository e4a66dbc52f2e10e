//! Maps symbolic targets to concrete screen points against the latest
//! snapshot. Ids from a superseded snapshot are not honored: they either
//! miss (`ElementNotFound`) or, coincidentally, hit a different element —
//! which is why the engine re-resolves against a fresh snapshot every step.

use thiserror::Error;

use crate::perception::types::ScreenSnapshot;
use crate::proposal::types::Target;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Element ID {0} not found in the current snapshot")]
    ElementNotFound(usize),

    #[error("Action requires an element id or explicit coordinates")]
    MissingTarget,
}

/// Resolve a target to integer pixel coordinates. Explicit points pass
/// through verbatim; clamping, if any, is the effector's concern.
pub fn resolve_target(
    target: Option<&Target>,
    snapshot: &ScreenSnapshot,
) -> Result<(i32, i32), ResolveError> {
    match target {
        Some(Target::Element { id }) => snapshot
            .element(*id)
            .map(|e| e.bounds.center())
            .ok_or(ResolveError::ElementNotFound(*id)),
        Some(Target::Point { x, y }) => Ok((*x, *y)),
        None => Err(ResolveError::MissingTarget),
    }
}
