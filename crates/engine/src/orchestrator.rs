//! Ordered step execution with fail-fast reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use stacksmith_types::{OperationFailure, ProjectState, RunReport, ScaffoldError};

use crate::detect;
use crate::executor::ShellRunner;
use crate::materialize::{self, FileEntry};

/// Wall-clock budget for one external command.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);
/// Budget for the framework scaffold, which downloads an entire template.
pub const SCAFFOLD_TIMEOUT: Duration = Duration::from_secs(600);

/// What a step does once its gate admits it.
pub enum StepAction {
    /// Run an external command in the target directory.
    Command { command: String, timeout: Duration },
    /// Materialize files under the target directory.
    WriteFiles(Vec<FileEntry>),
}

/// Decision returned by a step gate.
pub enum GateDecision {
    Run,
    Skip(String),
}

/// What a gate sees: a fresh capability snapshot plus the target path for
/// explicit precondition probes.
pub struct GateContext<'a> {
    pub state: ProjectState,
    pub target: &'a Path,
}

type GateFn = Box<dyn Fn(&GateContext<'_>) -> GateDecision + Send + Sync>;

/// Applicability of a step. The default is "always applicable".
pub enum Gate {
    Always,
    Check(GateFn),
}

impl Gate {
    pub fn check(gate: impl Fn(&GateContext<'_>) -> GateDecision + Send + Sync + 'static) -> Self {
        Gate::Check(Box::new(gate))
    }

    pub fn decide(&self, context: &GateContext<'_>) -> GateDecision {
        match self {
            Gate::Always => GateDecision::Run,
            Gate::Check(gate) => gate(context),
        }
    }
}

/// One unit in an operation's sequence.
pub struct Step {
    pub description: String,
    pub gate: Gate,
    pub action: StepAction,
    /// Whether a failure here aborts the whole run. Defaults to fatal.
    pub fatal: bool,
}

impl Step {
    pub fn command(description: impl Into<String>, command: impl Into<String>) -> Self {
        Step {
            description: description.into(),
            gate: Gate::Always,
            action: StepAction::Command {
                command: command.into(),
                timeout: COMMAND_TIMEOUT,
            },
            fatal: true,
        }
    }

    pub fn files(description: impl Into<String>, entries: Vec<FileEntry>) -> Self {
        Step {
            description: description.into(),
            gate: Gate::Always,
            action: StepAction::WriteFiles(entries),
            fatal: true,
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let StepAction::Command { timeout: slot, .. } = &mut self.action {
            *slot = timeout;
        }
        self
    }

    pub fn non_fatal(mut self) -> Self {
        self.fatal = false;
        self
    }
}

/// Runs one operation's steps strictly in declared order. No step begins
/// before the previous one has fully completed.
pub struct Orchestrator {
    operation: String,
    target: PathBuf,
    runner: Arc<dyn ShellRunner>,
}

impl Orchestrator {
    pub fn new(operation: impl Into<String>, target: impl Into<PathBuf>, runner: Arc<dyn ShellRunner>) -> Self {
        Orchestrator {
            operation: operation.into(),
            target: target.into(),
            runner,
        }
    }

    /// Execute steps in order. The first fatal failure aborts with a report
    /// of everything that completed before it; applied changes are never
    /// rolled back because the underlying tools cannot be undone safely.
    pub async fn run(&self, steps: Vec<Step>) -> Result<RunReport, OperationFailure> {
        let started = Instant::now();
        let mut completed: Vec<String> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            if let Gate::Check(_) = step.gate {
                // Recomputed per gated step: earlier steps in this run may
                // have installed dependencies or written markers.
                let context = GateContext {
                    state: detect::detect(&self.target),
                    target: &self.target,
                };
                if let GateDecision::Skip(reason) = step.gate.decide(&context) {
                    debug!(step = %step.description, reason, "step skipped");
                    skipped.push(format!("{} ({reason})", step.description));
                    continue;
                }
            }

            info!(step = %step.description, index, "running step");
            match self.execute(step).await {
                Ok(()) => completed.push(step.description.clone()),
                Err(error) if step.fatal => {
                    warn!(step = %step.description, %error, "fatal step failure; aborting run");
                    return Err(OperationFailure {
                        operation: self.operation.clone(),
                        step: step.description.clone(),
                        reason: error.to_string(),
                        target: self.target.clone(),
                        completed,
                    });
                }
                Err(error) => {
                    warn!(step = %step.description, %error, "non-fatal step failure; continuing");
                    skipped.push(format!("{} (failed: {error})", step.description));
                }
            }
        }

        let report = RunReport {
            operation: self.operation.clone(),
            target: self.target.clone(),
            completed,
            skipped,
            elapsed: started.elapsed(),
            capabilities: detect::detect(&self.target).installed(),
        };
        info!(
            operation = %report.operation,
            completed = report.completed.len(),
            skipped = report.skipped.len(),
            "operation finished"
        );
        Ok(report)
    }

    async fn execute(&self, step: &Step) -> Result<(), ScaffoldError> {
        match &step.action {
            StepAction::Command { command, timeout } => {
                self.runner.run(command, &self.target, *timeout).await?;
                Ok(())
            }
            StepAction::WriteFiles(entries) => materialize::write_entries(&self.target, entries),
        }
    }
}
