//! Step-sequencing engine for the Stacksmith scaffolding server.
//!
//! The engine owns everything between the tool boundary and the target
//! directory: validating requests, detecting what a target already has,
//! running external commands, materializing template files, and sequencing
//! the whole thing with fail-fast reporting.

pub mod detect;
pub mod executor;
pub mod materialize;
pub mod ops;
pub mod orchestrator;
pub mod templates;
pub mod validate;

pub use executor::{NoopRunner, ScriptedRunner, ShellRunner, SystemShellRunner};
pub use ops::{DispatchOutcome, OperationRegistry};
pub use orchestrator::{Gate, GateContext, GateDecision, Orchestrator, Step, StepAction};
