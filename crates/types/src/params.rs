use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Capability;

/// Package manager driving installs in the target project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Shell command installing runtime dependencies.
    pub fn add(&self, packages: &[&str]) -> String {
        let joined = packages.join(" ");
        match self {
            PackageManager::Npm => format!("npm install {joined}"),
            PackageManager::Pnpm => format!("pnpm add {joined}"),
            PackageManager::Yarn => format!("yarn add {joined}"),
            PackageManager::Bun => format!("bun add {joined}"),
        }
    }

    /// Shell command installing development-only dependencies.
    pub fn add_dev(&self, packages: &[&str]) -> String {
        let joined = packages.join(" ");
        match self {
            PackageManager::Npm => format!("npm install --save-dev {joined}"),
            PackageManager::Pnpm => format!("pnpm add -D {joined}"),
            PackageManager::Yarn => format!("yarn add -D {joined}"),
            PackageManager::Bun => format!("bun add -d {joined}"),
        }
    }

    /// Prefix for one-shot package executions (generator CLIs).
    pub fn dlx(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npx",
            PackageManager::Pnpm => "pnpm dlx",
            PackageManager::Yarn => "yarn dlx",
            PackageManager::Bun => "bunx",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parameters for the monolithic `create_project` operation.
///
/// Every capability flag defaults to on; callers opt features out rather
/// than in.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectParams {
    /// Directory the project is scaffolded into. Created when absent.
    #[schemars(description = "Target directory for the new project. Created when absent.")]
    pub target_dir: String,
    /// Package manager used for every install step.
    #[serde(default)]
    #[schemars(description = "Package manager used for installs: npm, pnpm, yarn, or bun.")]
    pub package_manager: PackageManager,
    #[serde(default = "default_true")]
    #[schemars(description = "Install the Biome linter and formatter.")]
    pub linting: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install Drizzle ORM with a Postgres driver.")]
    pub database: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install better-auth server and client stubs.")]
    pub auth: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install the Stripe SDK and webhook route stub.")]
    pub payments: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install organization/team management stubs. Requires auth.")]
    pub team_management: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install react-hook-form with zod resolvers.")]
    pub form_handling: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install the Vitest toolchain and test scaffolding.")]
    pub testing: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install husky and lint-staged git hooks. Skipped when git is too old.")]
    pub git_hooks: bool,
    #[serde(default = "default_true")]
    #[schemars(description = "Install next-intl with locale message catalogs.")]
    pub i18n: bool,
}

impl CreateProjectParams {
    /// Whether the request asks for the given capability.
    ///
    /// Team management is only meaningful on top of auth, so disabling auth
    /// disables it too.
    pub fn enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::Framework => true,
            Capability::Linter => self.linting,
            Capability::DatabaseOrm => self.database,
            Capability::Auth => self.auth,
            Capability::Payments => self.payments,
            Capability::TeamManagement => self.team_management && self.auth,
            Capability::FormHandling => self.form_handling,
            Capability::Testing => self.testing,
            Capability::GitHooks => self.git_hooks,
            Capability::I18n => self.i18n,
        }
    }
}

/// Parameters shared by every capability-level `add_*` operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddCapabilityParams {
    /// Directory holding an already-scaffolded project.
    #[schemars(description = "Target directory holding an already-scaffolded project.")]
    pub target_dir: String,
    #[serde(default)]
    #[schemars(description = "Package manager used for installs: npm, pnpm, yarn, or bun.")]
    pub package_manager: PackageManager,
}

/// Parameters for the read-only `project_status` operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProjectStatusParams {
    /// Directory to inspect. Reported as all-absent when it does not exist.
    #[schemars(description = "Target directory to inspect.")]
    pub target_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_params_default_every_flag_on() {
        let params: CreateProjectParams =
            serde_json::from_value(serde_json::json!({ "target_dir": "/tmp/app" })).expect("defaults fill in");
        assert_eq!(params.package_manager, PackageManager::Npm);
        for capability in Capability::ALL {
            assert!(params.enabled(capability), "{capability} should default on");
        }
    }

    #[test]
    fn disabling_auth_disables_team_management() {
        let params: CreateProjectParams = serde_json::from_value(
            serde_json::json!({ "target_dir": "/tmp/app", "auth": false }),
        )
        .expect("valid params");
        assert!(!params.enabled(Capability::TeamManagement));
        assert!(params.enabled(Capability::Payments));
    }

    #[test]
    fn package_manager_commands_cover_install_variants() {
        assert_eq!(
            PackageManager::Npm.add_dev(&["vitest"]),
            "npm install --save-dev vitest"
        );
        assert_eq!(PackageManager::Pnpm.add(&["stripe", "zod"]), "pnpm add stripe zod");
        assert_eq!(PackageManager::Bun.dlx(), "bunx");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<AddCapabilityParams, _> = serde_json::from_value(
            serde_json::json!({ "target_dir": "/tmp/app", "projectName": "x" }),
        );
        assert!(result.is_err());
    }
}
