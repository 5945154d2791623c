//! MCP tool handlers bridging the protocol boundary to the operation
//! registry.

use std::sync::Arc;

use anyhow::Result;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router, transport::stdio};
use serde_json::Value;
use tracing::info;

use crate::stats::SessionStats;
use stacksmith_engine::executor::ShellRunner;
use stacksmith_engine::ops::{DispatchOutcome, OperationRegistry};
use stacksmith_types::{AddCapabilityParams, CreateProjectParams, ProjectStatusParams};

/// Shared services for MCP tool handlers.
pub struct McpServices {
    registry: OperationRegistry,
    runner: Arc<dyn ShellRunner>,
}

impl McpServices {
    pub fn new(registry: OperationRegistry, runner: Arc<dyn ShellRunner>) -> Self {
        McpServices { registry, runner }
    }
}

#[derive(Clone)]
pub struct StacksmithMcpCore {
    tool_router: ToolRouter<Self>,
    services: Arc<McpServices>,
    stats: Arc<SessionStats>,
}

#[tool_router]
impl StacksmithMcpCore {
    pub fn new(services: Arc<McpServices>) -> Self {
        StacksmithMcpCore {
            tool_router: Self::tool_router(),
            services,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// Hand one operation to the engine and record the outcome. Every error
    /// kind comes back as an error-flagged text result, never a raw fault.
    async fn dispatch(&self, name: &str, raw: Value) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .services
            .registry
            .dispatch(name, raw, Arc::clone(&self.services.runner))
            .await;
        self.stats.record(name, outcome.is_error);
        Ok(to_tool_result(outcome))
    }

    #[tool(
        description = "Scaffold a complete starter application into target_dir: Next.js base plus every capability left enabled (linting, database, auth, payments, team management, form handling, testing, git hooks, i18n). Re-runnable: finished capability groups are skipped. Input: target_dir, package_manager?, per-capability boolean flags (default all on)."
    )]
    async fn create_project(&self, param: Parameters<CreateProjectParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("create_project", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add the Biome linter and formatter to an existing project. Fails when no framework is present or linting is already installed."
    )]
    async fn add_linting(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_linting", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add Drizzle ORM with a Postgres driver to an existing project. Fails when no framework is present or the ORM is already installed."
    )]
    async fn add_database(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_database", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add better-auth server and client wiring to an existing project. Fails when no framework is present or auth is already installed."
    )]
    async fn add_auth(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_auth", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add the Stripe SDK and a webhook route stub to an existing project. Fails when no framework is present or payments are already installed."
    )]
    async fn add_payments(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_payments", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add organization/team management stubs to an existing project. Requires auth to be installed first."
    )]
    async fn add_team_management(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_team_management", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add react-hook-form with zod resolvers to an existing project. Fails when no framework is present or form handling is already installed."
    )]
    async fn add_form_handling(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_form_handling", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add the Vitest toolchain and test scaffolding to an existing project. Fails when no framework is present or testing is already installed."
    )]
    async fn add_testing(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_testing", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add husky and lint-staged git hooks to an existing project. Skipped with an explanation when the installed git is older than 2.9."
    )]
    async fn add_git_hooks(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_git_hooks", to_raw(&param.0)?).await
    }

    #[tool(
        description = "Add next-intl with locale message catalogs to an existing project. Fails when no framework is present or i18n is already installed."
    )]
    async fn add_i18n(&self, param: Parameters<AddCapabilityParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("add_i18n", to_raw(&param.0)?).await
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Report which capabilities a target directory already has. Pure read; a missing directory reports every capability absent."
    )]
    async fn project_status(&self, param: Parameters<ProjectStatusParams>) -> Result<CallToolResult, ErrorData> {
        self.dispatch("project_status", to_raw(&param.0)?).await
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Report per-session dispatch counters. Diagnostic only; never consulted by the orchestrator."
    )]
    async fn session_stats(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(self.stats.render())]))
    }
}

fn to_raw<T: serde::Serialize>(param: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(param).map_err(|error| ErrorData::internal_error(error.to_string(), None))
}

fn to_tool_result(outcome: DispatchOutcome) -> CallToolResult {
    let content = vec![Content::text(outcome.content)];
    if outcome.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[tool_handler]
impl ServerHandler for StacksmithMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "Stacksmith".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Stacksmith scaffolder".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Scaffolding flow:\n\
                 1) Call project_status to see what the target already has.\n\
                 2) For a fresh directory, call create_project (disable unwanted capabilities via flags).\n\
                 3) For an existing project, call the narrower add_* tool for the missing capability.\n\
                 Capability tools enforce their own preconditions: the framework must exist, the capability must not, and add_team_management additionally requires auth.\n\
                 Failures list exactly which steps completed so a run can be resumed with a narrower tool instead of repeating finished work."
                    .to_string(),
            ),
        }
    }
}

/// Serve the tool surface over stdio until the client disconnects.
pub async fn serve_stdio(runner: Arc<dyn ShellRunner>) -> Result<()> {
    let services = Arc::new(McpServices::new(OperationRegistry::standard(), runner));
    let core = StacksmithMcpCore::new(services);
    info!("starting MCP stdio server");
    let service = core.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksmith_engine::executor::ScriptedRunner;

    fn core() -> StacksmithMcpCore {
        let services = Arc::new(McpServices::new(
            OperationRegistry::standard(),
            Arc::new(ScriptedRunner::new()),
        ));
        StacksmithMcpCore::new(services)
    }

    #[tokio::test]
    async fn precondition_failures_come_back_as_error_results_not_faults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = core()
            .add_auth(Parameters(AddCapabilityParams {
                target_dir: dir.path().to_string_lossy().into_owned(),
                package_manager: stacksmith_types::PackageManager::Npm,
            }))
            .await
            .expect("handler never raises a protocol fault for engine errors");
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn session_stats_reflect_dispatches() {
        let core = core();
        let dir = tempfile::tempdir().expect("tempdir");
        let _ = core
            .project_status(Parameters(ProjectStatusParams {
                target_dir: dir.path().to_string_lossy().into_owned(),
            }))
            .await;

        let stats = core.session_stats().await.expect("stats render");
        assert_eq!(stats.is_error, Some(false));
    }
}
