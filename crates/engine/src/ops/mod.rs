//! Operation registry and dispatch.

mod addons;
mod create;

pub use addons::{ADDONS, operation_name};

use std::path::Path;
use std::sync::Arc;

use schemars::{JsonSchema, schema_for};
use serde_json::Value;
use tracing::{info, warn};

use stacksmith_types::{
    AddCapabilityParams, Capability, CreateProjectParams, ProjectState, ProjectStatusParams, ScaffoldError,
};

use crate::detect;
use crate::executor::ShellRunner;
use crate::orchestrator::Orchestrator;
use crate::validate;

/// Uniform outcome handed back to the transport layer: a single text payload
/// plus an error flag, never a raw fault.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub content: String,
    pub is_error: bool,
}

impl DispatchOutcome {
    fn success(content: String) -> Self {
        DispatchOutcome {
            content,
            is_error: false,
        }
    }

    fn failure(content: String) -> Self {
        DispatchOutcome {
            content,
            is_error: true,
        }
    }
}

/// How a registered operation behaves once its parameters check out.
enum OperationKind {
    CreateProject,
    AddCapability(Capability),
    ProjectStatus,
}

/// A registered, externally invocable operation.
pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    schema: Value,
    kind: OperationKind,
}

impl OperationSpec {
    /// Machine-readable parameter schema advertised to external callers.
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

/// Registry of every operation the server advertises. Built once at process
/// start and immutable afterwards.
pub struct OperationRegistry {
    operations: Vec<OperationSpec>,
}

impl OperationRegistry {
    /// The standard operation set: the monolithic create, one `add_*` per
    /// capability, and the read-only status probe.
    pub fn standard() -> Self {
        let mut operations = vec![OperationSpec {
            name: "create_project",
            description: addons::operation_description(Capability::Framework),
            schema: schema_of::<CreateProjectParams>(),
            kind: OperationKind::CreateProject,
        }];
        for capability in addons::ADDONS {
            operations.push(OperationSpec {
                name: addons::operation_name(capability),
                description: addons::operation_description(capability),
                schema: schema_of::<AddCapabilityParams>(),
                kind: OperationKind::AddCapability(capability),
            });
        }
        operations.push(OperationSpec {
            name: "project_status",
            description: "Report which capabilities a target directory already has, without mutating it.",
            schema: schema_of::<ProjectStatusParams>(),
            kind: OperationKind::ProjectStatus,
        });
        OperationRegistry { operations }
    }

    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    pub fn find(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.iter().find(|operation| operation.name == name)
    }

    /// Validate, gate on preconditions, then orchestrate. Every failure mode
    /// is rendered into the uniform outcome shape so the transport layer
    /// never sees a raw fault.
    pub async fn dispatch(&self, name: &str, raw: Value, runner: Arc<dyn ShellRunner>) -> DispatchOutcome {
        info!(operation = name, "dispatching operation");
        match self.dispatch_inner(name, raw, runner).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(operation = name, %error, "operation rejected");
                DispatchOutcome::failure(error.to_string())
            }
        }
    }

    async fn dispatch_inner(
        &self,
        name: &str,
        raw: Value,
        runner: Arc<dyn ShellRunner>,
    ) -> Result<DispatchOutcome, ScaffoldError> {
        let Some(operation) = self.find(name) else {
            return Err(ScaffoldError::UnknownOperation(name.to_string()));
        };
        let violations = validate::check_against_schema(&operation.schema, &raw);
        if !violations.is_empty() {
            return Err(ScaffoldError::Validation(violations));
        }

        match &operation.kind {
            OperationKind::ProjectStatus => {
                let params: ProjectStatusParams = parse_params(raw)?;
                let target = Path::new(&params.target_dir);
                let state = detect::detect(target);
                Ok(DispatchOutcome::success(render_status(target, &state)))
            }
            OperationKind::CreateProject => {
                let params: CreateProjectParams = parse_params(raw)?;
                let target = self.prepare_target(&params.target_dir)?;
                let steps = create::steps(&params);
                self.orchestrate(operation.name, &target, steps, runner).await
            }
            OperationKind::AddCapability(capability) => {
                let params: AddCapabilityParams = parse_params(raw)?;
                let target = self.prepare_target(&params.target_dir)?;
                addons::preflight(*capability, &detect::detect(&target))?;
                let steps = addons::steps(*capability, params.package_manager);
                self.orchestrate(operation.name, &target, steps, runner).await
            }
        }
    }

    fn prepare_target(&self, raw_target: &str) -> Result<std::path::PathBuf, ScaffoldError> {
        let (target, report) = validate::prepare_target(raw_target);
        if !report.is_valid() {
            return Err(ScaffoldError::Validation(report.errors));
        }
        for warning in &report.warnings {
            warn!(warning, "validation warning");
        }
        Ok(target)
    }

    async fn orchestrate(
        &self,
        name: &str,
        target: &Path,
        steps: Vec<crate::orchestrator::Step>,
        runner: Arc<dyn ShellRunner>,
    ) -> Result<DispatchOutcome, ScaffoldError> {
        let orchestrator = Orchestrator::new(name, target, runner);
        match orchestrator.run(steps).await {
            Ok(report) => Ok(DispatchOutcome::success(report.summary())),
            Err(failure) => Ok(DispatchOutcome::failure(failure.to_string())),
        }
    }
}

/// Deserialize already schema-checked parameters; defaults fill omitted
/// fields, caller-supplied fields win.
fn parse_params<T: serde::de::DeserializeOwned>(raw: Value) -> Result<T, ScaffoldError> {
    serde_json::from_value(raw).map_err(|error| ScaffoldError::Validation(vec![error.to_string()]))
}

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

fn render_status(target: &Path, state: &ProjectState) -> String {
    let mut out = format!("Project status for {}:\n", target.display());
    for capability in Capability::ALL {
        let mark = if state.has(capability) { "present" } else { "absent" };
        out.push_str(&format!("  {:<22} {mark}\n", capability.label()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_advertises_every_operation_with_a_schema() {
        let registry = OperationRegistry::standard();
        // create_project + nine capability operations + project_status
        assert_eq!(registry.operations().len(), 11);
        for operation in registry.operations() {
            assert!(!operation.description.is_empty(), "{} lacks a description", operation.name);
            assert!(
                operation.schema().get("properties").is_some(),
                "{} lacks a parameter schema",
                operation.name
            );
        }
        assert!(registry.find("add_auth").is_some());
        assert!(registry.find("nonsense").is_none());
    }
}
