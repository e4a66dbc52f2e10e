use serde::Serialize;

use crate::proposal::types::ScrollDirection;

/// A fully resolved input primitive: every pointer action carries concrete
/// screen coordinates. Produced by the engine, consumed by the effector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedAction {
    MouseMove { x: i32, y: i32 },
    LeftClick { x: i32, y: i32 },
    RightClick { x: i32, y: i32 },
    DoubleClick { x: i32, y: i32 },
    Hover { x: i32, y: i32 },
    DragTo { x: i32, y: i32 },
    TypeText { text: String },
    KeyChord { keys: String },
    Scroll { direction: ScrollDirection },
    Wait { millis: u64 },
}

impl ResolvedAction {
    pub fn name(&self) -> &'static str {
        match self {
            ResolvedAction::MouseMove { .. } => "mouse_move",
            ResolvedAction::LeftClick { .. } => "left_click",
            ResolvedAction::RightClick { .. } => "right_click",
            ResolvedAction::DoubleClick { .. } => "double_click",
            ResolvedAction::Hover { .. } => "hover",
            ResolvedAction::DragTo { .. } => "drag_to",
            ResolvedAction::TypeText { .. } => "type_text",
            ResolvedAction::KeyChord { .. } => "key_chord",
            ResolvedAction::Scroll { .. } => "scroll",
            ResolvedAction::Wait { .. } => "wait",
        }
    }
}

/// Result of executing one primitive. A non-empty failure always implies
/// `succeeded() == false`; the constructors are the only way to build one,
/// so the invariant holds by construction.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    succeeded: bool,
    message: Option<String>,
    failure: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            message: None,
            failure: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: Some(message.into()),
            failure: None,
        }
    }

    pub fn failed(failure: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: None,
            failure: Some(failure.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// History rendering: "Action 'x' executed." or "Action 'x' FAILED. …"
    pub fn render(&self, action_name: &str) -> String {
        let mut line = if self.succeeded {
            format!("Action '{action_name}' executed.")
        } else {
            format!("Action '{action_name}' FAILED.")
        };
        if let Some(msg) = &self.message {
            line.push_str(&format!(" Output: {msg}"));
        }
        if let Some(err) = &self.failure {
            line.push_str(&format!(" Error: {err}"));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_implies_not_succeeded() {
        let outcome = ActionOutcome::failed("no pointer device");
        assert!(!outcome.succeeded());
        assert_eq!(outcome.failure(), Some("no pointer device"));
        assert!(outcome.message().is_none());
    }

    #[test]
    fn success_renders_without_error() {
        let line = ActionOutcome::ok_with("clicked at (10,20)").render("left_click");
        assert!(line.starts_with("Action 'left_click' executed."));
        assert!(line.contains("clicked at (10,20)"));
        assert!(!line.contains("Error"));
    }

    #[test]
    fn failure_renders_with_error() {
        let line = ActionOutcome::failed("timeout").render("type_text");
        assert!(line.contains("FAILED"));
        assert!(line.contains("Error: timeout"));
    }
}
