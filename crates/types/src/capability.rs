use std::fmt;

use serde::{Deserialize, Serialize};

/// A feature the scaffolder can install into a target project.
///
/// The set is closed on purpose: detection, gating, and operation naming all
/// key off this enum, so a misspelled capability is a compile error instead
/// of a silently always-false check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Framework,
    Linter,
    DatabaseOrm,
    Auth,
    Payments,
    TeamManagement,
    FormHandling,
    Testing,
    GitHooks,
    I18n,
}

impl Capability {
    /// Every capability, in the order the monolithic run installs them.
    pub const ALL: [Capability; 10] = [
        Capability::Framework,
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

    /// Human-readable label used in reports and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Framework => "framework",
            Capability::Linter => "linting",
            Capability::DatabaseOrm => "database ORM",
            Capability::Auth => "authentication",
            Capability::Payments => "payments",
            Capability::TeamManagement => "team management",
            Capability::FormHandling => "form handling",
            Capability::Testing => "testing",
            Capability::GitHooks => "git hooks",
            Capability::I18n => "internationalization",
        }
    }

    /// Dependency names in the target manifest whose presence signals this
    /// capability.
    pub fn manifest_dependencies(&self) -> &'static [&'static str] {
        match self {
            Capability::Framework => &["next"],
            Capability::Linter => &["@biomejs/biome"],
            Capability::DatabaseOrm => &["drizzle-orm"],
            Capability::Auth => &["better-auth"],
            Capability::Payments => &["stripe"],
            Capability::TeamManagement => &[],
            Capability::FormHandling => &["react-hook-form"],
            Capability::Testing => &["vitest"],
            Capability::GitHooks => &["husky"],
            Capability::I18n => &["next-intl"],
        }
    }

    /// Files or directories under the target whose existence signals this
    /// capability, independent of the manifest.
    pub fn marker_paths(&self) -> &'static [&'static str] {
        match self {
            Capability::Framework => &["next.config.ts", "next.config.js", "next.config.mjs"],
            Capability::Linter => &["biome.json"],
            Capability::DatabaseOrm => &["drizzle.config.ts"],
            Capability::Auth => &["src/lib/auth.ts"],
            Capability::Payments => &["src/lib/stripe.ts"],
            Capability::TeamManagement => &["src/lib/organization.ts"],
            Capability::FormHandling => &["src/lib/forms.ts"],
            Capability::Testing => &["vitest.config.ts"],
            Capability::GitHooks => &[".husky"],
            Capability::I18n => &["src/i18n"],
        }
    }

    /// The file this capability's setup writes last. Its presence means the
    /// whole step group for the capability ran to completion, which is what
    /// re-runs gate on.
    pub fn config_marker(&self) -> &'static str {
        match self {
            Capability::Framework => "next.config.ts",
            Capability::Linter => "biome.json",
            Capability::DatabaseOrm => "drizzle.config.ts",
            Capability::Auth => "src/lib/auth.ts",
            Capability::Payments => "src/lib/stripe.ts",
            Capability::TeamManagement => "src/lib/organization.ts",
            Capability::FormHandling => "src/lib/forms.ts",
            Capability::Testing => "vitest.config.ts",
            Capability::GitHooks => ".husky/pre-commit",
            Capability::I18n => "src/i18n/request.ts",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
