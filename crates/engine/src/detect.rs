//! Capability detection from the target manifest and marker files.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use stacksmith_types::{Capability, ProjectState};

/// Dependency manifest consulted for detection and extended by script merges.
pub const MANIFEST_FILE: &str = "package.json";

/// Inspect `target` and report which capabilities are already present.
///
/// A pure read. A missing directory or an unreadable/unparseable manifest
/// degrades to "nothing detected" rather than an error, so callers can gate
/// the very first step of a run without special-casing fresh targets. A
/// capability counts as present when any of its manifest dependencies is
/// declared or any of its marker paths exists.
pub fn detect(target: &Path) -> ProjectState {
    let dependencies = declared_dependencies(target);
    let mut state = ProjectState::default();
    for capability in Capability::ALL {
        let by_dependency = capability
            .manifest_dependencies()
            .iter()
            .any(|name| dependencies.contains(*name));
        let by_marker = capability
            .marker_paths()
            .iter()
            .any(|marker| target.join(marker).exists());
        state.set(capability, by_dependency || by_marker);
    }
    debug!(target = %target.display(), installed = ?state.installed(), "detected project state");
    state
}

/// Union of `dependencies` and `devDependencies` declared in the manifest.
fn declared_dependencies(target: &Path) -> BTreeSet<String> {
    let manifest_path = target.join(MANIFEST_FILE);
    let Ok(raw) = std::fs::read_to_string(&manifest_path) else {
        return BTreeSet::new();
    };
    let Ok(manifest) = serde_json::from_str::<Value>(&raw) else {
        debug!(path = %manifest_path.display(), "manifest is not valid JSON; treating as empty");
        return BTreeSet::new();
    };
    let mut dependencies = BTreeSet::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(Value::Object(map)) = manifest.get(section) {
            dependencies.extend(map.keys().cloned());
        }
    }
    dependencies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_reports_every_capability_absent() {
        let state = detect(Path::new("/nonexistent/stacksmith-detect-test"));
        assert_eq!(state, ProjectState::default());
        assert!(state.installed().is_empty());
    }

    #[test]
    fn manifest_dependencies_flag_capabilities() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{
                "dependencies": { "next": "15.0.0", "stripe": "17.0.0" },
                "devDependencies": { "vitest": "2.0.0" }
            }"#,
        )
        .expect("write manifest");

        let state = detect(dir.path());
        assert!(state.has(Capability::Framework));
        assert!(state.has(Capability::Payments));
        assert!(state.has(Capability::Testing));
        assert!(!state.has(Capability::Auth));
    }

    #[test]
    fn marker_files_flag_capabilities_without_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("biome.json"), "{}").expect("write marker");
        std::fs::create_dir_all(dir.path().join(".husky")).expect("create marker dir");

        let state = detect(dir.path());
        assert!(state.has(Capability::Linter));
        assert!(state.has(Capability::GitHooks));
        assert!(!state.has(Capability::Framework));
    }

    #[test]
    fn unparseable_manifest_is_tolerated() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(MANIFEST_FILE), "not json {{{").expect("write garbage");
        std::fs::write(dir.path().join("drizzle.config.ts"), "export default {}").expect("write marker");

        let state = detect(dir.path());
        assert!(state.has(Capability::DatabaseOrm), "marker still detected");
        assert!(!state.has(Capability::Framework));
    }
}
