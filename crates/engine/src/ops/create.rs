//! Step assembly for the monolithic `create_project` operation.

use stacksmith_types::CreateProjectParams;

use crate::ops::addons;
use crate::orchestrator::{Gate, GateDecision, Step};

/// Ordered steps for one `create_project` run.
///
/// Capability flags gate at build time (a disabled capability contributes no
/// steps); filesystem state gates at run time, one fresh detection per step.
pub fn steps(params: &CreateProjectParams) -> Vec<Step> {
    let pm = params.package_manager;
    let mut all = addons::steps(stacksmith_types::Capability::Framework, pm);
    for capability in addons::ADDONS {
        if !params.enabled(capability) {
            continue;
        }
        all.extend(addon_group(capability, pm));
    }
    all
}

/// A capability's steps, wrapped in the group gate for re-runnable monolithic
/// runs.
fn addon_group(capability: stacksmith_types::Capability, pm: stacksmith_types::PackageManager) -> Vec<Step> {
    addons::steps(capability, pm)
        .into_iter()
        .map(|step| {
            let gate = group_gate(capability.config_marker(), step.gate);
            Step {
                description: step.description,
                gate,
                action: step.action,
                fatal: step.fatal,
            }
        })
        .collect()
}

/// Once the group's final config file exists, the whole group is complete and
/// every step in it skips; a partially applied group re-runs its idempotent
/// tail instead of clobbering a finished one. Any step-specific gate still
/// applies afterwards.
fn group_gate(marker: &'static str, inner: Gate) -> Gate {
    Gate::check(move |context| {
        if context.target.join(marker).exists() {
            return GateDecision::Skip("already configured".into());
        }
        inner.decide(context)
    })
}
