use serde::Serialize;

use crate::Capability;

/// Point-in-time snapshot of which capabilities a target directory already
/// has.
///
/// Always recomputed before use and never cached across steps: earlier steps
/// in the same run install dependencies and write markers, so a stale
/// snapshot would gate later steps on the wrong answer. The shape is fixed so
/// every capability has exactly one field; see [`Capability`] for the closed
/// set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectState {
    pub has_framework: bool,
    pub has_linter: bool,
    pub has_database_orm: bool,
    pub has_auth: bool,
    pub has_payments: bool,
    pub has_team_management: bool,
    pub has_form_handling: bool,
    pub has_testing: bool,
    pub has_git_hooks: bool,
    pub has_i18n: bool,
}

impl ProjectState {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Framework => self.has_framework,
            Capability::Linter => self.has_linter,
            Capability::DatabaseOrm => self.has_database_orm,
            Capability::Auth => self.has_auth,
            Capability::Payments => self.has_payments,
            Capability::TeamManagement => self.has_team_management,
            Capability::FormHandling => self.has_form_handling,
            Capability::Testing => self.has_testing,
            Capability::GitHooks => self.has_git_hooks,
            Capability::I18n => self.has_i18n,
        }
    }

    pub fn set(&mut self, capability: Capability, present: bool) {
        match capability {
            Capability::Framework => self.has_framework = present,
            Capability::Linter => self.has_linter = present,
            Capability::DatabaseOrm => self.has_database_orm = present,
            Capability::Auth => self.has_auth = present,
            Capability::Payments => self.has_payments = present,
            Capability::TeamManagement => self.has_team_management = present,
            Capability::FormHandling => self.has_form_handling = present,
            Capability::Testing => self.has_testing = present,
            Capability::GitHooks => self.has_git_hooks = present,
            Capability::I18n => self.has_i18n = present,
        }
    }

    /// Capabilities currently present, in declaration order.
    pub fn installed(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.has(*capability))
            .collect()
    }
}
