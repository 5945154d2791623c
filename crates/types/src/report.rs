use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::Capability;

/// Record of one operation run.
///
/// Owned exclusively by the orchestrator while the run is in flight, appended
/// to as steps complete, and handed back to the caller at the end. Never
/// persisted.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub operation: String,
    pub target: PathBuf,
    /// Descriptions of steps that executed successfully, in declared order.
    pub completed: Vec<String>,
    /// Steps that did not apply, with the reason they were skipped.
    pub skipped: Vec<String>,
    pub elapsed: Duration,
    /// Capabilities present in the target after the run.
    pub capabilities: Vec<Capability>,
}

impl RunReport {
    /// Human-readable success summary returned over the tool boundary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "'{}' completed in {:.1}s at {}\n",
            self.operation,
            self.elapsed.as_secs_f64(),
            self.target.display()
        );
        if self.completed.is_empty() {
            out.push_str("No steps needed to run.\n");
        } else {
            out.push_str("Completed steps:\n");
            for step in &self.completed {
                out.push_str(&format!("  - {step}\n"));
            }
        }
        if !self.skipped.is_empty() {
            out.push_str("Skipped:\n");
            for step in &self.skipped {
                out.push_str(&format!("  - {step}\n"));
            }
        }
        if !self.capabilities.is_empty() {
            let labels: Vec<&str> = self.capabilities.iter().map(Capability::label).collect();
            out.push_str(&format!("Capabilities now present: {}\n", labels.join(", ")));
        }
        out
    }
}

/// Structured abort raised when a fatal step fails mid-sequence.
///
/// Carries everything a human needs to resume manually: the failing step, the
/// underlying error, the target, and exactly which steps had already
/// completed. Applied changes are never rolled back because the underlying
/// tools cannot be undone safely.
#[derive(Debug)]
pub struct OperationFailure {
    pub operation: String,
    pub step: String,
    pub reason: String,
    pub target: PathBuf,
    pub completed: Vec<String>,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "'{}' failed at step '{}': {}",
            self.operation, self.step, self.reason
        )?;
        writeln!(f, "Target: {}", self.target.display())?;
        if self.completed.is_empty() {
            writeln!(f, "No steps had completed before the failure.")?;
        } else {
            writeln!(f, "Steps completed before the failure:")?;
            for (index, step) in self.completed.iter().enumerate() {
                writeln!(f, "  {}. {step}", index + 1)?;
            }
        }
        write!(
            f,
            "Completed changes are left in place; fix the underlying issue and re-run."
        )
    }
}

impl std::error::Error for OperationFailure {}
