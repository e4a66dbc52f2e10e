//! The task execution step loop.
//!
//! One step = fresh snapshot → intent batch from the proposer → per-intent
//! resolution and dispatch. The loop is strictly sequential: an action
//! changes the very screen the next decision depends on, so capture and
//! execution never overlap. Hosts run [`TaskEngine::run`] on a dedicated
//! task and cancel it cooperatively through the [`StopHandle`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::engine::coords::{resolve_target, ResolveError};
use crate::engine::history::{ConversationHistory, HistoryEntry, Role, SessionLog};
use crate::engine::state::{EngineConfig, RunSummary, StopReason};
use crate::errors::DeskPilotResult;
use crate::executor::traits::ActionEffector;
use crate::executor::types::ResolvedAction;
use crate::perception::resolver::build_snapshot;
use crate::perception::traits::SnapshotSource;
use crate::perception::types::ScreenSnapshot;
use crate::proposal::traits::ActionProposer;
use crate::proposal::types::{summarize_batch, IntentKind};

/// Cooperative cancellation flag, polled at the top of each step and after
/// the snapshot call. Cancellation latency is bounded by the slowest
/// in-flight boundary call.
#[derive(Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one step, from the engine's perspective.
enum StepFlow {
    /// Re-loop against a fresh snapshot; the current task stays queued.
    Continue,
    /// The current task was explicitly completed; pop it.
    AdvanceTask,
    /// The current task was explicitly abandoned; pop it.
    SkipTask,
    /// The whole goal is satisfied; terminate the run.
    GoalComplete,
}

pub struct TaskEngine<S, P, E> {
    snapshots: S,
    proposer: P,
    effector: E,
    tasks: VecDeque<String>,
    history: ConversationHistory,
    session: Option<SessionLog>,
    stop: StopHandle,
    config: EngineConfig,
}

impl<S, P, E> TaskEngine<S, P, E>
where
    S: SnapshotSource,
    P: ActionProposer,
    E: ActionEffector,
{
    pub fn new(snapshots: S, proposer: P, effector: E, config: EngineConfig) -> Self {
        Self {
            snapshots,
            proposer,
            effector,
            tasks: VecDeque::new(),
            history: ConversationHistory::new(config.history_window),
            session: None,
            stop: StopHandle::default(),
            config,
        }
    }

    /// Mirror every history entry into a JSONL transcript.
    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session = Some(log);
        self
    }

    /// Load the task queue and pin the goal + plan so truncation never
    /// drops them. Resets any previous run's conversation.
    pub fn seed(&mut self, goal: &str, plan: Vec<String>) {
        self.history.clear();
        self.history.pin(HistoryEntry::now(Role::User, goal));
        if !plan.is_empty() {
            let rendered = plan
                .iter()
                .enumerate()
                .map(|(i, task)| format!("{i}. {task}"))
                .collect::<Vec<_>>()
                .join("\n");
            self.history
                .pin(HistoryEntry::now(Role::Assistant, format!("Plan:\n{rendered}")));
        }
        self.tasks = plan.into();
        tracing::info!(goal = %goal, tasks = self.tasks.len(), "task queue seeded");
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn tasks_remaining(&self) -> usize {
        self.tasks.len()
    }

    /// Owned copy for host threads; never a live reference into the engine.
    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }

    /// Drive the step loop until the queue drains, the goal completes, the
    /// host raises the stop flag, the step ceiling is hit, or a boundary
    /// fails fatally. Always returns a summary; never panics the run away.
    pub async fn run(&mut self) -> RunSummary {
        let mut steps = 0u32;
        let reason = loop {
            if self.stop.is_stopped() {
                self.record(Role::System, "Stop requested by host.".to_string());
                break StopReason::StopRequested;
            }
            let Some(task) = self.tasks.front().cloned() else {
                break StopReason::QueueDrained;
            };
            if steps >= self.config.max_steps {
                self.record(
                    Role::System,
                    format!("Step ceiling of {} reached. Stopping.", self.config.max_steps),
                );
                break StopReason::StepLimitReached;
            }
            steps += 1;
            tracing::info!(
                step = steps,
                task = %task,
                remaining = self.tasks.len(),
                "step begin"
            );

            match self.step(&task).await {
                Ok(StepFlow::Continue) => {}
                Ok(StepFlow::AdvanceTask) => {
                    self.record(Role::System, format!("Task complete: {task}"));
                    self.tasks.pop_front();
                }
                Ok(StepFlow::SkipTask) => {
                    self.tasks.pop_front();
                }
                Ok(StepFlow::GoalComplete) => break StopReason::GoalComplete,
                Err(e) => {
                    tracing::error!(step = steps, error = %e, "fatal step error");
                    self.record(Role::System, format!("Fatal error during step {steps}: {e}"));
                    break StopReason::Fatal {
                        message: e.to_string(),
                    };
                }
            }

            if self.config.step_pacing_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.step_pacing_ms)).await;
            }
        };

        let summary = RunSummary {
            reason,
            steps,
            tasks_remaining: self.tasks.len(),
            finished_at: Utc::now(),
        };
        tracing::info!(
            reason = ?summary.reason,
            steps = summary.steps,
            tasks_remaining = summary.tasks_remaining,
            "run finished"
        );
        summary
    }

    async fn step(&mut self, task: &str) -> DeskPilotResult<StepFlow> {
        let capture = self.snapshots.capture().await?;
        if self.stop.is_stopped() {
            // The flag was raised during the blocking capture; the loop top
            // turns this into StopRequested.
            return Ok(StepFlow::Continue);
        }

        let snapshot = build_snapshot(&capture, self.config.grid_bucket);
        tracing::debug!(
            elements = snapshot.elements.len(),
            width = snapshot.width,
            height = snapshot.height,
            "snapshot resolved"
        );

        let history = self.history.snapshot();
        let intents = self
            .proposer
            .propose(&history, task, &snapshot, &capture.image_png)
            .await?;

        if intents.is_empty() {
            tracing::warn!("proposer returned no intents; re-observing");
            self.record(
                Role::System,
                "Proposer returned no intents. Re-observing before the next step.".to_string(),
            );
            return Ok(StepFlow::Continue);
        }

        // Record intent before execution so the log reflects what was
        // attempted even if the batch is interrupted.
        self.record(Role::Assistant, summarize_batch(&intents));

        let mut advance_pending = false;
        let mut aborted = false;
        let mut resnapshot = false;
        let mut terminal: Option<StepFlow> = None;

        for intent in &intents {
            if let Some(reason) = &intent.rationale {
                tracing::info!(action = intent.kind.name(), reason = %reason, "proposer rationale");
            }

            match &intent.kind {
                IntentKind::GoalComplete => {
                    tracing::info!("goal reported complete; stopping after this batch");
                    self.record(Role::System, "Goal reported complete.".to_string());
                    terminal = Some(StepFlow::GoalComplete);
                    break;
                }
                IntentKind::TaskStepComplete => {
                    tracing::info!(task = %task, "current task reported complete");
                    advance_pending = true;
                }
                IntentKind::RequestResnapshot => {
                    self.record(
                        Role::System,
                        "Re-snapshot requested. Abandoning remaining intents.".to_string(),
                    );
                    resnapshot = true;
                    break;
                }
                IntentKind::AbandonTask => {
                    let why = intent.rationale.as_deref().unwrap_or("no reason given");
                    tracing::warn!(task = %task, reason = %why, "task abandoned");
                    self.record(Role::System, format!("Skipping task: {task}. Reason: {why}"));
                    terminal = Some(StepFlow::SkipTask);
                    break;
                }
                kind => match to_primitive(kind, &snapshot) {
                    Ok(Some(primitive)) => {
                        tracing::info!(action = primitive.name(), "dispatching to effector");
                        let outcome = self.effector.execute(&primitive).await;
                        self.record(Role::System, outcome.render(primitive.name()));
                        if !outcome.succeeded() {
                            tracing::warn!(
                                action = primitive.name(),
                                error = outcome.failure().unwrap_or("unknown"),
                                "action failed; aborting remainder of batch"
                            );
                            aborted = true;
                            break;
                        }
                    }
                    // Control intents are consumed by the arms above.
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(action = kind.name(), error = %e, "target resolution failed");
                        self.record(Role::System, format!("Action '{}' skipped: {e}", kind.name()));
                        aborted = true;
                        break;
                    }
                },
            }
        }

        if let Some(flow) = terminal {
            return Ok(flow);
        }
        if advance_pending && !aborted && !resnapshot {
            return Ok(StepFlow::AdvanceTask);
        }
        Ok(StepFlow::Continue)
    }

    fn record(&mut self, role: Role, content: String) {
        let entry = HistoryEntry::now(role, content);
        if let Some(log) = &self.session {
            if let Err(e) = log.append(&entry) {
                tracing::warn!(error = %e, "session log append failed");
            }
        }
        self.history.push(entry);
    }
}

/// Lower an ordinary intent to a concrete primitive, resolving its target
/// against the current snapshot. `Ok(None)` for control intents, which the
/// engine consumes before reaching this point.
fn to_primitive(
    kind: &IntentKind,
    snapshot: &ScreenSnapshot,
) -> Result<Option<ResolvedAction>, ResolveError> {
    let action = match kind {
        IntentKind::MouseMove { target } => {
            let (x, y) = resolve_target(target.as_ref(), snapshot)?;
            ResolvedAction::MouseMove { x, y }
        }
        IntentKind::LeftClick { target } => {
            let (x, y) = resolve_target(target.as_ref(), snapshot)?;
            ResolvedAction::LeftClick { x, y }
        }
        IntentKind::RightClick { target } => {
            let (x, y) = resolve_target(target.as_ref(), snapshot)?;
            ResolvedAction::RightClick { x, y }
        }
        IntentKind::DoubleClick { target } => {
            let (x, y) = resolve_target(target.as_ref(), snapshot)?;
            ResolvedAction::DoubleClick { x, y }
        }
        IntentKind::Hover { target } => {
            let (x, y) = resolve_target(target.as_ref(), snapshot)?;
            ResolvedAction::Hover { x, y }
        }
        IntentKind::DragTo { target } => {
            let (x, y) = resolve_target(target.as_ref(), snapshot)?;
            ResolvedAction::DragTo { x, y }
        }
        IntentKind::TypeText { text } => ResolvedAction::TypeText { text: text.clone() },
        IntentKind::KeyChord { keys } => ResolvedAction::KeyChord { keys: keys.clone() },
        IntentKind::Scroll { direction } => ResolvedAction::Scroll {
            direction: *direction,
        },
        IntentKind::Wait { millis } => ResolvedAction::Wait { millis: *millis },
        IntentKind::RequestResnapshot
        | IntentKind::TaskStepComplete
        | IntentKind::GoalComplete
        | IntentKind::AbandonTask => return Ok(None),
    };
    Ok(Some(action))
}
