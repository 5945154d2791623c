//! Capability-level operations layered onto an existing project.

use serde_json::json;

use stacksmith_types::{Capability, PackageManager, ProjectState, ScaffoldError};

use crate::materialize::FileEntry;
use crate::orchestrator::{Gate, GateDecision, Step};
use crate::templates;

/// Capabilities that ship as standalone `add_*` operations. The framework is
/// excluded: it is only installed by `create_project`.
pub const ADDONS: [Capability; 9] = [
    Capability::Linter,
    Capability::DatabaseOrm,
    Capability::Auth,
    Capability::Payments,
    Capability::TeamManagement,
    Capability::FormHandling,
    Capability::Testing,
    Capability::GitHooks,
    Capability::I18n,
];

/// Name of the operation that installs the capability.
pub fn operation_name(capability: Capability) -> &'static str {
    match capability {
        Capability::Framework => "create_project",
        Capability::Linter => "add_linting",
        Capability::DatabaseOrm => "add_database",
        Capability::Auth => "add_auth",
        Capability::Payments => "add_payments",
        Capability::TeamManagement => "add_team_management",
        Capability::FormHandling => "add_form_handling",
        Capability::Testing => "add_testing",
        Capability::GitHooks => "add_git_hooks",
        Capability::I18n => "add_i18n",
    }
}

pub fn operation_description(capability: Capability) -> &'static str {
    match capability {
        Capability::Framework => "Scaffold a complete starter application into the target directory.",
        Capability::Linter => "Add the Biome linter and formatter to an existing project.",
        Capability::DatabaseOrm => "Add Drizzle ORM with a Postgres driver to an existing project.",
        Capability::Auth => "Add better-auth server and client wiring to an existing project.",
        Capability::Payments => "Add the Stripe SDK and a webhook route to an existing project.",
        Capability::TeamManagement => "Add organization/team management on top of auth.",
        Capability::FormHandling => "Add react-hook-form with zod resolvers to an existing project.",
        Capability::Testing => "Add the Vitest toolchain and test scaffolding to an existing project.",
        Capability::GitHooks => "Add husky and lint-staged git hooks to an existing project.",
        Capability::I18n => "Add next-intl with locale message catalogs to an existing project.",
    }
}

fn prerequisites(capability: Capability) -> &'static [Capability] {
    match capability {
        Capability::TeamManagement => &[Capability::Auth],
        _ => &[],
    }
}

/// Ordering and non-reentrancy checks for a capability-level operation, run
/// before any step executes. Either failure leaves the target untouched.
pub fn preflight(capability: Capability, state: &ProjectState) -> Result<(), ScaffoldError> {
    if !state.has(Capability::Framework) {
        return Err(ScaffoldError::Precondition(format!(
            "{} requires a scaffolded framework application; run create_project first",
            capability.label()
        )));
    }
    for prerequisite in prerequisites(capability) {
        if !state.has(*prerequisite) {
            return Err(ScaffoldError::Precondition(format!(
                "{} requires {}; run {} first",
                capability.label(),
                prerequisite.label(),
                operation_name(*prerequisite)
            )));
        }
    }
    if state.has(capability) {
        return Err(ScaffoldError::Precondition(format!(
            "{} is already installed in this target",
            capability.label()
        )));
    }
    Ok(())
}

/// Ordered steps installing one capability. Each group ends by writing the
/// capability's config marker, which is what re-run gating keys on.
pub fn steps(capability: Capability, pm: PackageManager) -> Vec<Step> {
    match capability {
        Capability::Framework => framework_steps(pm),
        Capability::Linter => linter_steps(pm),
        Capability::DatabaseOrm => database_steps(pm),
        Capability::Auth => auth_steps(pm),
        Capability::Payments => payments_steps(pm),
        Capability::TeamManagement => team_steps(),
        Capability::FormHandling => form_steps(pm),
        Capability::Testing => testing_steps(pm),
        Capability::GitHooks => git_hooks_steps(pm),
        Capability::I18n => i18n_steps(pm),
    }
}

fn framework_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command(
            "Scaffold Next.js application with create-next-app",
            format!(
                "{} create-next-app@latest . --typescript --tailwind --app --src-dir --import-alias \"@/*\" --yes",
                pm.dlx()
            ),
        )
        .with_timeout(crate::orchestrator::SCAFFOLD_TIMEOUT)
        .gated(Gate::check(|context| {
            if context.state.has(Capability::Framework) {
                GateDecision::Skip("framework already present".into())
            } else {
                GateDecision::Run
            }
        })),
        Step::command("Initialize git repository", "git init")
            .non_fatal()
            .gated(Gate::check(|context| {
                if context.target.join(".git").exists() {
                    GateDecision::Skip("repository already initialized".into())
                } else {
                    GateDecision::Run
                }
            })),
        Step::files(
            "Write environment baseline files",
            vec![
                FileEntry::text(".env.example", templates::ENV_EXAMPLE),
                FileEntry::append_missing(".env", &["# Local environment - not committed"]),
            ],
        ),
    ]
}

fn linter_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command("Install Biome toolchain", pm.add_dev(&["@biomejs/biome"])),
        Step::files(
            "Register lint scripts in the manifest",
            vec![FileEntry::json(
                crate::detect::MANIFEST_FILE,
                json!({ "scripts": { "lint": "biome check .", "format": "biome format --write ." } }),
            )],
        ),
        Step::files(
            "Write Biome configuration",
            vec![FileEntry::json("biome.json", templates::biome_config())],
        ),
    ]
}

fn database_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command("Install Drizzle ORM and Postgres driver", pm.add(&["drizzle-orm", "pg"])),
        Step::command("Install Drizzle Kit", pm.add_dev(&["drizzle-kit", "@types/pg"])),
        Step::files(
            "Write database client and schema stubs",
            vec![
                FileEntry::text("src/db/index.ts", templates::DB_CLIENT),
                FileEntry::text("src/db/schema.ts", templates::DB_SCHEMA),
            ],
        ),
        Step::files(
            "Register database scripts in the manifest",
            vec![FileEntry::json(
                crate::detect::MANIFEST_FILE,
                json!({ "scripts": {
                    "db:generate": "drizzle-kit generate",
                    "db:migrate": "drizzle-kit migrate",
                    "db:studio": "drizzle-kit studio"
                } }),
            )],
        ),
        Step::files(
            "Record DATABASE_URL in the environment file",
            vec![FileEntry::append_missing(
                ".env",
                &["DATABASE_URL=postgres://localhost:5432/app"],
            )],
        ),
        Step::files(
            "Write Drizzle configuration",
            vec![FileEntry::text("drizzle.config.ts", templates::DRIZZLE_CONFIG)],
        ),
    ]
}

fn auth_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command("Install better-auth", pm.add(&["better-auth"])),
        Step::files(
            "Record auth secrets in the environment file",
            vec![FileEntry::append_missing(
                ".env",
                &[
                    "BETTER_AUTH_SECRET=change-me",
                    "BETTER_AUTH_URL=http://localhost:3000",
                ],
            )],
        ),
        Step::files(
            "Write auth server and client stubs",
            vec![
                FileEntry::text("src/lib/auth-client.ts", templates::AUTH_CLIENT),
                FileEntry::text("src/lib/auth.ts", templates::AUTH_SERVER),
            ],
        ),
    ]
}

fn payments_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command("Install Stripe SDK", pm.add(&["stripe", "@stripe/stripe-js"])),
        Step::files(
            "Record Stripe keys in the environment file",
            vec![FileEntry::append_missing(
                ".env",
                &[
                    "STRIPE_SECRET_KEY=sk_test_xxx",
                    "STRIPE_WEBHOOK_SECRET=whsec_xxx",
                    "NEXT_PUBLIC_STRIPE_PUBLISHABLE_KEY=pk_test_xxx",
                ],
            )],
        ),
        Step::files(
            "Write Stripe client and webhook route stubs",
            vec![
                FileEntry::text("src/app/api/webhooks/stripe/route.ts", templates::STRIPE_WEBHOOK_ROUTE),
                FileEntry::text("src/lib/stripe.ts", templates::STRIPE_CLIENT),
            ],
        ),
    ]
}

fn team_steps() -> Vec<Step> {
    vec![
        Step::files(
            "Write membership schema and invitation stubs",
            vec![
                FileEntry::text("src/db/organization-schema.ts", templates::ORGANIZATION_SCHEMA),
                FileEntry::text("src/lib/invitations.ts", templates::INVITATIONS),
            ],
        ),
        Step::files(
            "Write organization plugin wiring",
            vec![FileEntry::text("src/lib/organization.ts", templates::ORGANIZATION)],
        ),
    ]
}

fn form_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command(
            "Install form handling packages",
            pm.add(&["react-hook-form", "zod", "@hookform/resolvers"]),
        ),
        Step::files(
            "Write form helper stubs",
            vec![FileEntry::text("src/lib/forms.ts", templates::FORM_HELPERS)],
        ),
    ]
}

fn testing_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command(
            "Install Vitest toolchain",
            pm.add_dev(&[
                "vitest",
                "@vitejs/plugin-react",
                "@testing-library/react",
                "@testing-library/jest-dom",
                "jsdom",
            ]),
        ),
        Step::files(
            "Register test scripts in the manifest",
            vec![FileEntry::json(
                crate::detect::MANIFEST_FILE,
                json!({ "scripts": { "test": "vitest run", "test:watch": "vitest" } }),
            )],
        ),
        Step::files(
            "Write test scaffolding",
            vec![
                FileEntry::text("src/test/setup.ts", templates::VITEST_SETUP),
                FileEntry::text("src/test/smoke.test.tsx", templates::SAMPLE_TEST),
                FileEntry::keep_dir("src/test/fixtures"),
            ],
        ),
        Step::files(
            "Write Vitest configuration",
            vec![FileEntry::text("vitest.config.ts", templates::VITEST_CONFIG)],
        ),
    ]
}

fn git_hooks_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command("Install husky and lint-staged", pm.add_dev(&["husky", "lint-staged"]))
            .gated(git_version_gate()),
        Step::files(
            "Register hook scripts in the manifest",
            vec![FileEntry::json(
                crate::detect::MANIFEST_FILE,
                json!({
                    "scripts": { "prepare": "husky" },
                    "lint-staged": { "*.{ts,tsx,json}": "biome check --write" }
                }),
            )],
        )
        .gated(git_version_gate()),
        Step::files(
            "Write pre-commit hook",
            vec![FileEntry::text(".husky/pre-commit", templates::PRE_COMMIT_HOOK)],
        )
        .gated(git_version_gate()),
    ]
}

fn i18n_steps(pm: PackageManager) -> Vec<Step> {
    vec![
        Step::command("Install next-intl", pm.add(&["next-intl"])),
        Step::files(
            "Write locale message catalogs",
            vec![
                FileEntry::json("messages/en.json", templates::messages_en()),
                FileEntry::json("messages/de.json", templates::messages_de()),
            ],
        ),
        Step::files(
            "Write i18n request configuration and middleware",
            vec![
                FileEntry::text("src/middleware.ts", templates::I18N_MIDDLEWARE),
                FileEntry::text("src/i18n/request.ts", templates::I18N_REQUEST),
            ],
        ),
    ]
}

/// Minimum git version supporting `core.hooksPath`, which husky relies on.
const MIN_GIT_VERSION: (u32, u32) = (2, 9);

/// Gate skipping hook installation when git is absent or too old. The probe
/// runs synchronously; it reads one version line and never mutates anything.
fn git_version_gate() -> Gate {
    Gate::check(|_context| match installed_git_version() {
        None => GateDecision::Skip("git is not available on PATH".into()),
        Some((major, minor)) if (major, minor) < MIN_GIT_VERSION => GateDecision::Skip(format!(
            "git {major}.{minor} is older than {}.{} required for core.hooksPath",
            MIN_GIT_VERSION.0, MIN_GIT_VERSION.1
        )),
        Some(_) => GateDecision::Run,
    })
}

fn installed_git_version() -> Option<(u32, u32)> {
    let output = std::process::Command::new("git").arg("--version").output().ok()?;
    parse_git_version(&String::from_utf8_lossy(&output.stdout))
}

/// Parse "git version 2.39.2" style output into (major, minor).
fn parse_git_version(raw: &str) -> Option<(u32, u32)> {
    let token = raw
        .split_whitespace()
        .find(|token| token.chars().next().is_some_and(|ch| ch.is_ascii_digit()))?;
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_git_version_lines() {
        assert_eq!(parse_git_version("git version 2.39.2"), Some((2, 39)));
        assert_eq!(parse_git_version("git version 2.9.0.windows.1"), Some((2, 9)));
        assert_eq!(parse_git_version("git version 1.8.3"), Some((1, 8)));
        assert_eq!(parse_git_version("no digits here"), None);
    }

    #[test]
    fn preflight_requires_framework_first() {
        let state = ProjectState::default();
        let error = preflight(Capability::Auth, &state).expect_err("framework missing");
        assert!(error.to_string().contains("create_project"));
    }

    #[test]
    fn preflight_rejects_reinstallation() {
        let mut state = ProjectState::default();
        state.set(Capability::Framework, true);
        state.set(Capability::Linter, true);
        let error = preflight(Capability::Linter, &state).expect_err("already installed");
        assert!(error.to_string().contains("already installed"));
    }

    #[test]
    fn team_management_requires_auth() {
        let mut state = ProjectState::default();
        state.set(Capability::Framework, true);
        let error = preflight(Capability::TeamManagement, &state).expect_err("auth missing");
        assert!(error.to_string().contains("add_auth"));

        state.set(Capability::Auth, true);
        assert!(preflight(Capability::TeamManagement, &state).is_ok());
    }

    #[test]
    fn every_addon_group_ends_with_its_config_marker() {
        for capability in ADDONS {
            let group = steps(capability, PackageManager::Npm);
            let marker = capability.config_marker();
            let writes_marker = group.iter().any(|step| match &step.action {
                crate::orchestrator::StepAction::WriteFiles(entries) => {
                    entries.iter().any(|entry| entry.rel() == marker)
                }
                crate::orchestrator::StepAction::Command { .. } => false,
            });
            assert!(writes_marker, "{capability} group never writes {marker}");
        }
    }
}
