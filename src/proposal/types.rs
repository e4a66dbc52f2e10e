use serde::{Deserialize, Serialize};

/// Where a pointer action should land: a per-snapshot element id, or an
/// explicit pixel coordinate. Ids are only meaningful against the snapshot
/// the batch was proposed from; stale ids fail resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Element { id: usize },
    Point { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Closed set of action kinds the proposal service may emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentKind {
    MouseMove { target: Option<Target> },
    LeftClick { target: Option<Target> },
    RightClick { target: Option<Target> },
    DoubleClick { target: Option<Target> },
    Hover { target: Option<Target> },
    /// Drag from the current pointer position to the target.
    DragTo { target: Option<Target> },
    TypeText { text: String },
    KeyChord { keys: String },
    Scroll { direction: ScrollDirection },
    Wait {
        #[serde(default = "default_wait_millis")]
        millis: u64,
    },
    /// Abandon the rest of the batch and take a fresh snapshot.
    RequestResnapshot,
    /// The current task is finished; advance the queue after this batch.
    TaskStepComplete,
    /// The entire goal is satisfied; stop the engine.
    GoalComplete,
    /// The current task cannot be completed; skip it.
    AbandonTask,
}

fn default_wait_millis() -> u64 {
    1000
}

impl IntentKind {
    pub fn name(&self) -> &'static str {
        match self {
            IntentKind::MouseMove { .. } => "mouse_move",
            IntentKind::LeftClick { .. } => "left_click",
            IntentKind::RightClick { .. } => "right_click",
            IntentKind::DoubleClick { .. } => "double_click",
            IntentKind::Hover { .. } => "hover",
            IntentKind::DragTo { .. } => "drag_to",
            IntentKind::TypeText { .. } => "type_text",
            IntentKind::KeyChord { .. } => "key_chord",
            IntentKind::Scroll { .. } => "scroll",
            IntentKind::Wait { .. } => "wait",
            IntentKind::RequestResnapshot => "request_resnapshot",
            IntentKind::TaskStepComplete => "task_step_complete",
            IntentKind::GoalComplete => "goal_complete",
            IntentKind::AbandonTask => "abandon_task",
        }
    }
}

/// One proposed action: what to do, and the model's stated reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionIntent {
    #[serde(flatten)]
    pub kind: IntentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl ActionIntent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            rationale: None,
        }
    }

    pub fn with_rationale(kind: IntentKind, rationale: impl Into<String>) -> Self {
        Self {
            kind,
            rationale: Some(rationale.into()),
        }
    }
}

/// One line per intent, recorded in history before the batch executes.
pub fn summarize_batch(batch: &[ActionIntent]) -> String {
    batch
        .iter()
        .map(|intent| {
            let args = serde_json::to_string(&intent.kind).unwrap_or_default();
            format!(
                "Tool: {}, Args: {}, Reasoning: {}",
                intent.kind.name(),
                args,
                intent.rationale.as_deref().unwrap_or("N/A"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_json_round_trips_through_tag() {
        let json = r#"{"kind":"left_click","target":{"id":3},"rationale":"open the menu"}"#;
        let intent: ActionIntent = serde_json::from_str(json).unwrap();
        assert_eq!(
            intent.kind,
            IntentKind::LeftClick {
                target: Some(Target::Element { id: 3 })
            }
        );
        assert_eq!(intent.rationale.as_deref(), Some("open the menu"));
    }

    #[test]
    fn explicit_point_target_parses_untagged() {
        let json = r#"{"kind":"double_click","target":{"x":120,"y":44}}"#;
        let intent: ActionIntent = serde_json::from_str(json).unwrap();
        assert_eq!(
            intent.kind,
            IntentKind::DoubleClick {
                target: Some(Target::Point { x: 120, y: 44 })
            }
        );
    }

    #[test]
    fn wait_defaults_to_one_second() {
        let intent: ActionIntent = serde_json::from_str(r#"{"kind":"wait"}"#).unwrap();
        assert_eq!(intent.kind, IntentKind::Wait { millis: 1000 });
    }

    #[test]
    fn batch_summary_lists_every_intent() {
        let batch = vec![
            ActionIntent::with_rationale(
                IntentKind::LeftClick {
                    target: Some(Target::Element { id: 0 }),
                },
                "focus the field",
            ),
            ActionIntent::new(IntentKind::TypeText {
                text: "hello".into(),
            }),
        ];
        let summary = summarize_batch(&batch);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("left_click"));
        assert!(lines[0].contains("focus the field"));
        assert!(lines[1].contains("type_text"));
        assert!(lines[1].contains("N/A"));
    }
}
