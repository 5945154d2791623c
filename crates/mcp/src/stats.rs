//! Per-session dispatch counters.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Side-channel observer of tool dispatches.
///
/// Reset when the server process starts. Orchestration never reads it, so a
/// counter bug cannot change a run's outcome; it exists purely so callers can
/// ask what happened this session.
#[derive(Debug)]
pub struct SessionStats {
    started: Instant,
    dispatches: AtomicU64,
    failures: AtomicU64,
    per_tool: Mutex<BTreeMap<String, u64>>,
}

impl Default for SessionStats {
    fn default() -> Self {
        SessionStats {
            started: Instant::now(),
            dispatches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            per_tool: Mutex::new(BTreeMap::new()),
        }
    }
}

impl SessionStats {
    pub fn record(&self, tool: &str, failed: bool) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        if let Ok(mut per_tool) = self.per_tool.lock() {
            *per_tool.entry(tool.to_string()).or_insert(0) += 1;
        }
    }

    pub fn render(&self) -> String {
        let dispatches = self.dispatches.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let mut out = format!(
            "Session uptime {}s: {dispatches} dispatches, {failures} failed\n",
            self.started.elapsed().as_secs()
        );
        if let Ok(per_tool) = self.per_tool.lock() {
            for (tool, count) in per_tool.iter() {
                out.push_str(&format!("  {tool}: {count}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_tool() {
        let stats = SessionStats::default();
        stats.record("create_project", false);
        stats.record("add_auth", true);
        stats.record("add_auth", false);

        let rendered = stats.render();
        assert!(rendered.contains("3 dispatches, 1 failed"));
        assert!(rendered.contains("add_auth: 2"));
        assert!(rendered.contains("create_project: 1"));
    }
}
