use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::SnapshotConfig;
use crate::infrastructure::shutdown::ShutdownListener;

use super::snapshot::{PageSnapshot, SnapshotHost};
use super::MutationBatch;

/// Re-reads the snapshot file on an interval and replays any change into the
/// host, forwarding the synthesized mutations to the watcher. Stands in for
/// the subtree observer a live document would provide.
pub struct SnapshotPoller {
    host: Arc<SnapshotHost>,
    config: SnapshotConfig,
    mutations: UnboundedSender<MutationBatch>,
}

impl SnapshotPoller {
    pub fn new(
        host: Arc<SnapshotHost>,
        config: SnapshotConfig,
        mutations: UnboundedSender<MutationBatch>,
    ) -> Self {
        Self {
            host,
            config,
            mutations,
        }
    }

    pub fn spawn(self, shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: ShutdownListener) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_raw: Option<String> = None;

        tracing::info!(
            target: "host",
            path = %self.config.path.display(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "스냅샷 파일 감시 시작"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.notified() => break,
            }

            let raw = match tokio::fs::read_to_string(&self.config.path).await {
                Ok(raw) => raw,
                Err(err) => {
                    // Absent file is a not-yet-rendered page, not an error.
                    tracing::debug!(
                        target: "host",
                        error = %err,
                        path = %self.config.path.display(),
                        "snapshot file unavailable"
                    );
                    continue;
                }
            };
            if last_raw.as_deref() == Some(raw.as_str()) {
                continue;
            }

            let snapshot: PageSnapshot = match serde_json::from_str(&raw) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::warn!(
                        target: "host",
                        error = %err,
                        "snapshot parse failed; keeping previous page state"
                    );
                    continue;
                }
            };
            last_raw = Some(raw);

            let mutations = self.host.apply(snapshot);
            if mutations.is_empty() {
                continue;
            }
            if self.mutations.send(MutationBatch { mutations }).is_err() {
                break;
            }
        }
        tracing::info!(target: "host", "snapshot poller stopped");
    }
}
