use std::sync::Arc;

use tracing::debug;

use crate::scheduler::MonitorScheduler;

/// Which pages keep the monitor alive. Pages that show bookings match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPolicy {
    markers: Vec<String>,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self::new(["dashboard", "admin"])
    }
}

impl ActivationPolicy {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|marker: &String| !marker.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.markers.iter().any(|marker| path.contains(marker.as_str()))
    }

    /// Start the monitor for a page at `path`. It stops when the guard is dropped.
    pub fn attach(&self, scheduler: &Arc<MonitorScheduler>, path: &str) -> Option<MonitorGuard> {
        if !self.matches(path) {
            debug!("Page {} does not run the monitor", path);
            return None;
        }

        scheduler.start();
        Some(MonitorGuard {
            scheduler: Arc::clone(scheduler),
        })
    }
}

/// Keeps the monitor running for the lifetime of a page
#[derive(Debug)]
#[must_use = "the monitor stops as soon as the guard is dropped"]
pub struct MonitorGuard {
    scheduler: Arc<MonitorScheduler>,
}

impl MonitorGuard {
    pub fn scheduler(&self) -> &MonitorScheduler {
        &self.scheduler
    }

    /// Stop the monitor and wait for a cycle in flight to finish
    pub async fn detach(self) {
        self.scheduler.shutdown().await;
    }
}

impl Drop for MonitorGuard {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let policy = ActivationPolicy::default();
        assert!(policy.matches("/dashboard.html"));
        assert!(policy.matches("/app/admin.html?tab=alerts"));
        assert!(!policy.matches("/login.html"));
        assert!(!policy.matches("/"));
    }

    #[test]
    fn test_empty_markers_are_ignored() {
        let policy = ActivationPolicy::new(vec!["", "bookings"]);
        assert!(!policy.matches("/index.html"));
        assert!(policy.matches("/bookings"));
    }
}
