use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc;

use crate::bridge::bus::{CountsQuery, RuntimeBus};
use crate::bridge::messages::OutboundMessage;
use crate::config::WatcherConfig;
use crate::domain::{Category, CategoryCounts, CountsSnapshot, MessageRecord};
use crate::host::{unread, ElementRef, HostPage, MutationBatch, Selector};
use crate::infrastructure::shutdown::ShutdownListener;
use crate::rules::ImportanceRules;

use super::debounce::{self, DebounceSlot};
use super::mutation;

/// Marker added to the host body once the watcher has gone live.
pub const LOADED_MARKER: &str = "inbox-flow-loaded";

static BADGE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,.\s]*").expect("valid badge regex"));

/// Everything the loop accumulates across scans. Owned by one watcher
/// instance; nothing here is ambient or shared.
#[derive(Debug, Default)]
pub struct ScanState {
    pub initialized: bool,
    pub unread_records: Vec<MessageRecord>,
    pub category_counts: CategoryCounts,
}

/// Stateful coordinator: watches host mutations, debounces bursts, re-scans
/// rows through the rule set, and broadcasts aggregate updates.
pub struct InboxWatcher {
    host: Arc<dyn HostPage>,
    rules: Arc<ImportanceRules>,
    bus: RuntimeBus,
    config: WatcherConfig,
    state: ScanState,
    debounce: DebounceSlot,
}

impl InboxWatcher {
    pub fn new(
        host: Arc<dyn HostPage>,
        rules: Arc<ImportanceRules>,
        bus: RuntimeBus,
        config: WatcherConfig,
    ) -> Self {
        let debounce = DebounceSlot::new(config.debounce);
        Self {
            host,
            rules,
            bus,
            config,
            state: ScanState::default(),
            debounce,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Readiness gate: the main container must exist and at least one row
    /// must be rendered before any real work happens.
    pub fn is_host_ready(&self) -> bool {
        self.host.query(Selector::MainInboxContainer).is_some()
            && !self.host.query_all(Selector::EmailRow).is_empty()
    }

    /// One-time NotReady → Ready transition. There is no path back within a
    /// page session.
    fn start(&mut self) {
        if self.state.initialized {
            return;
        }
        tracing::info!(target: "watcher", "호스트 페이지 준비 완료, 받은편지함 감시를 시작합니다");
        self.state.initialized = true;

        if let Some(body) = self.host.query(Selector::Body) {
            self.host.set_marker(body, LOADED_MARKER, true);
        }
        self.bus.publish(OutboundMessage::ContentScriptReady {
            url: self.host.url().unwrap_or_default(),
            timestamp: Utc::now(),
        });
        self.scan();
    }

    /// Full re-scan of the rendered rows. A transient zero-row render leaves
    /// all prior state in place.
    pub fn scan(&mut self) {
        let rows = self.host.query_all(Selector::EmailRow);
        if rows.is_empty() {
            tracing::debug!(target: "watcher", "no rows rendered; keeping previous scan state");
            return;
        }

        let mut unread_records = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let is_unread = unread::detect_unread(self.host.as_ref(), row);
            if !is_unread {
                // Read rows always lose the highlight, marked or not.
                self.host
                    .set_marker(row, &self.config.highlight_class, false);
                continue;
            }

            let sender = self
                .cell_text(row, Selector::Sender)
                .unwrap_or_else(|| "Unknown".to_string());
            let subject = self
                .cell_text(row, Selector::Subject)
                .unwrap_or_else(|| "No Subject".to_string());
            let snippet = self.cell_text(row, Selector::Snippet).unwrap_or_default();

            let is_important = self.rules.is_important(&sender, &subject, &snippet);
            self.host
                .set_marker(row, &self.config.highlight_class, is_important);

            unread_records.push(MessageRecord {
                id: format!("row-{index}"),
                sender,
                subject,
                snippet,
                is_unread: true,
                is_important,
            });
        }

        self.state.unread_records = unread_records;
        self.state.category_counts = self.read_tab_counts();

        tracing::info!(
            target: "watcher",
            visible_unread = self.state.unread_records.len(),
            important = self
                .state
                .unread_records
                .iter()
                .filter(|record| record.is_important)
                .count(),
            badge_total = self.state.category_counts.total(),
            "스캔 완료"
        );

        self.bus.publish(OutboundMessage::UnreadEmailsUpdated {
            total_count: self.state.category_counts.total(),
            tab_counts: self.state.category_counts,
            visible_unread: self.state.unread_records.clone(),
        });
    }

    /// On-demand counts. Badges are re-read every call because they can move
    /// without any observed mutation; the unread list stays as last scanned.
    pub fn get_counts(&self) -> CountsSnapshot {
        let counts = self.read_tab_counts();
        CountsSnapshot {
            total: counts.total(),
            counts,
            visible_unread: self.state.unread_records.clone(),
        }
    }

    fn cell_text(&self, row: ElementRef, selector: Selector) -> Option<String> {
        let cell = self.host.query_within(row, selector)?;
        let text = self.host.text(cell)?;
        let text = text.trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn read_tab_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for category in Category::ALL {
            let badge = self.host.query(Selector::TabBadge(category));
            if badge.is_none() {
                tracing::trace!(target: "watcher", tab = category.label(), "badge missing; counting zero");
            }
            let value = badge
                .and_then(|badge| self.host.text(badge))
                .map(|text| parse_badge(&text))
                .unwrap_or(0);
            counts.set(category, value);
        }
        counts
    }

    fn handle_batch(&mut self, batch: &MutationBatch) {
        if !self.state.initialized {
            if self.is_host_ready() {
                self.start();
            } else {
                tracing::trace!(
                    target: "watcher",
                    container = Selector::MainInboxContainer.css(),
                    "host not ready yet"
                );
            }
            return;
        }
        if mutation::any_relevant(batch) {
            self.debounce.arm();
        }
    }

    /// Single-task cooperative loop: mutations, the armed debounce deadline,
    /// count queries, and shutdown. Scans run to completion; nothing here
    /// overlaps itself.
    pub async fn run(
        mut self,
        mut mutations: mpsc::UnboundedReceiver<MutationBatch>,
        mut queries: mpsc::Receiver<CountsQuery>,
        mut shutdown: ShutdownListener,
    ) {
        if self.is_host_ready() {
            self.start();
        }

        loop {
            let pending = self.debounce.deadline();
            tokio::select! {
                batch = mutations.recv() => match batch {
                    Some(batch) => self.handle_batch(&batch),
                    None => break,
                },
                _ = debounce::elapsed(pending) => {
                    self.debounce.disarm();
                    self.scan();
                }
                query = queries.recv() => match query {
                    Some(CountsQuery { reply }) => {
                        let _ = reply.send(self.get_counts());
                    }
                    None => break,
                },
                _ = shutdown.notified() => break,
            }
        }
        tracing::info!(target: "watcher", "받은편지함 감시 종료");
    }
}

fn parse_badge(text: &str) -> u32 {
    BADGE_NUMBER
        .find(text)
        .map(|found| {
            found
                .as_str()
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::broadcast;
    use tokio::time::timeout;

    use crate::bridge::messages::InboundMessage;
    use crate::host::snapshot::{PageSnapshot, RowSnapshot, SnapshotHost, TabBadges};
    use crate::infrastructure::shutdown::Shutdown;

    use super::*;

    fn unread_row(sender: &str, subject: &str, snippet: &str) -> RowSnapshot {
        RowSnapshot {
            sender: Some(sender.to_string()),
            subject: Some(subject.to_string()),
            snippet: Some(snippet.to_string()),
            row_classes: vec!["zA".to_string(), "zE".to_string()],
            ..RowSnapshot::default()
        }
    }

    fn read_row(sender: &str) -> RowSnapshot {
        RowSnapshot {
            sender: Some(sender.to_string()),
            subject: Some("old subject".to_string()),
            snippet: Some("old snippet".to_string()),
            row_classes: vec!["zA".to_string(), "yO".to_string()],
            ..RowSnapshot::default()
        }
    }

    fn ready_snapshot() -> PageSnapshot {
        PageSnapshot {
            url: "https://mail.google.com/mail/u/0/".to_string(),
            main_container: true,
            rows: vec![
                unread_row("notifications@github.com", "CI failed", "build broke"),
                unread_row("friend@example.org", "lunch?", "are you around"),
                read_row("shop@example.org"),
            ],
            tabs: TabBadges {
                primary: Some("5".to_string()),
                updates: Some("1,234".to_string()),
                ..TabBadges::default()
            },
        }
    }

    fn build_watcher(
        host: Arc<SnapshotHost>,
    ) -> (
        InboxWatcher,
        mpsc::Receiver<CountsQuery>,
        broadcast::Receiver<OutboundMessage>,
        RuntimeBus,
    ) {
        let (bus, query_rx) = RuntimeBus::new(8);
        let updates = bus.subscribe();
        let watcher = InboxWatcher::new(
            host,
            Arc::new(ImportanceRules::default()),
            bus.clone(),
            WatcherConfig {
                debounce: Duration::from_millis(300),
                highlight_class: "inbox-flow-important".to_string(),
            },
        );
        (watcher, query_rx, updates, bus)
    }

    #[test]
    fn scan_classifies_and_marks_unread_rows() {
        let host = Arc::new(SnapshotHost::new(ready_snapshot()));
        let (mut watcher, _queries, _updates, _bus) = build_watcher(host.clone());

        let rows = host.query_all(Selector::EmailRow);
        // Simulate a stale highlight on a row that has since been read.
        host.set_marker(rows[2], "inbox-flow-important", true);

        watcher.scan();

        let records = &watcher.state().unread_records;
        assert_eq!(records.len(), 2);
        assert!(records[0].is_important, "github sender must match");
        assert!(!records[1].is_important);
        assert!(host.has_marker(rows[0], "inbox-flow-important"));
        assert!(!host.has_marker(rows[1], "inbox-flow-important"));
        assert!(
            !host.has_marker(rows[2], "inbox-flow-important"),
            "read rows always lose the highlight"
        );
    }

    #[test]
    fn badge_total_is_independent_of_row_count() {
        let host = Arc::new(SnapshotHost::new(ready_snapshot()));
        let (mut watcher, _queries, _updates, _bus) = build_watcher(host);
        watcher.scan();

        let counts = watcher.state().category_counts;
        assert_eq!(counts.primary, 5);
        assert_eq!(counts.updates, 1234);
        assert_eq!(counts.total(), 1239);
        assert_eq!(watcher.state().unread_records.len(), 2);
    }

    #[test]
    fn zero_rows_preserves_prior_state() {
        let host = Arc::new(SnapshotHost::new(ready_snapshot()));
        let (mut watcher, _queries, _updates, _bus) = build_watcher(host.clone());
        watcher.scan();
        let records_before = watcher.state().unread_records.clone();
        let counts_before = watcher.state().category_counts;

        let mut empty = ready_snapshot();
        empty.rows.clear();
        host.apply(empty);
        watcher.scan();

        assert_eq!(watcher.state().unread_records, records_before);
        assert_eq!(watcher.state().category_counts, counts_before);
    }

    #[test]
    fn scan_is_idempotent_without_host_changes() {
        let host = Arc::new(SnapshotHost::new(ready_snapshot()));
        let (mut watcher, _queries, _updates, _bus) = build_watcher(host);
        watcher.scan();
        let records_first = watcher.state().unread_records.clone();
        let counts_first = watcher.state().category_counts;

        watcher.scan();
        assert_eq!(watcher.state().unread_records, records_first);
        assert_eq!(watcher.state().category_counts, counts_first);
    }

    #[test]
    fn missing_cells_fall_back_to_placeholders() {
        let mut snapshot = ready_snapshot();
        snapshot.rows = vec![RowSnapshot {
            row_classes: vec!["zA".to_string(), "zE".to_string()],
            ..RowSnapshot::default()
        }];
        let host = Arc::new(SnapshotHost::new(snapshot));
        let (mut watcher, _queries, _updates, _bus) = build_watcher(host);
        watcher.scan();

        let record = &watcher.state().unread_records[0];
        assert_eq!(record.sender, "Unknown");
        assert_eq!(record.subject, "No Subject");
        assert_eq!(record.snippet, "");
    }

    #[test]
    fn get_counts_rereads_badges_without_a_scan() {
        let host = Arc::new(SnapshotHost::new(ready_snapshot()));
        let (mut watcher, _queries, _updates, _bus) = build_watcher(host.clone());
        watcher.scan();
        assert_eq!(watcher.get_counts().total, 1239);

        // Badge moves with no relevant mutation observed.
        let mut next = ready_snapshot();
        next.tabs.primary = Some("9".to_string());
        host.apply(next);

        let first = watcher.get_counts();
        let second = watcher.get_counts();
        assert_eq!(first.total, 1243);
        assert_eq!(second.total, 1243);
        // The unread list still reflects the last scan.
        assert_eq!(first.visible_unread.len(), 2);
    }

    #[test]
    fn badge_parsing_strips_separators_and_defaults_to_zero() {
        assert_eq!(parse_badge("1,234"), 1234);
        assert_eq!(parse_badge(" 42 "), 42);
        assert_eq!(parse_badge("99+"), 99);
        assert_eq!(parse_badge("•"), 0);
        assert_eq!(parse_badge(""), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_relevant_mutations_collapses_into_one_scan() {
        let host = Arc::new(SnapshotHost::new(ready_snapshot()));
        let (watcher, query_rx, mut updates, _bus) = build_watcher(host.clone());

        let (mutation_tx, mutation_rx) = mpsc::unbounded_channel();
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(watcher.run(mutation_rx, query_rx, shutdown.listener()));

        // Ready announcement, then the initial scan's update.
        assert!(matches!(
            updates.recv().await.unwrap(),
            OutboundMessage::ContentScriptReady { .. }
        ));
        assert!(matches!(
            updates.recv().await.unwrap(),
            OutboundMessage::UnreadEmailsUpdated { .. }
        ));

        let mut next = ready_snapshot();
        next.rows
            .push(unread_row("x@y.com", "Action Required: renew", ""));
        let first_batch = host.apply(next);
        mutation_tx
            .send(MutationBatch {
                mutations: first_batch,
            })
            .unwrap();
        mutation_tx
            .send(MutationBatch {
                mutations: vec![crate::host::Mutation::ChildList {
                    added: 1,
                    removed: 0,
                }],
            })
            .unwrap();

        // Exactly one debounced scan for the burst.
        let update = timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("debounced scan in time")
            .unwrap();
        match update {
            OutboundMessage::UnreadEmailsUpdated { visible_unread, .. } => {
                assert_eq!(visible_unread.len(), 3);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(
            timeout(Duration::from_secs(2), updates.recv()).await.is_err(),
            "burst must not produce a second scan"
        );

        shutdown.trigger();
        let _ = timeout(Duration::from_secs(2), handle).await;
    }

    #[tokio::test(start_paused = true)]
    async fn readiness_is_announced_once_when_the_host_appears() {
        let host = Arc::new(SnapshotHost::new(PageSnapshot::default()));
        let (watcher, query_rx, mut updates, bus) = build_watcher(host.clone());

        let (mutation_tx, mutation_rx) = mpsc::unbounded_channel();
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(watcher.run(mutation_rx, query_rx, shutdown.listener()));

        // Counts are answerable even before the host is ready.
        let early = bus
            .request(InboundMessage::GetUnreadCounts)
            .await
            .expect("query answered");
        assert_eq!(early.total, 0);
        assert!(early.visible_unread.is_empty());

        let mutations = host.apply(ready_snapshot());
        mutation_tx.send(MutationBatch { mutations }).unwrap();

        assert!(matches!(
            updates.recv().await.unwrap(),
            OutboundMessage::ContentScriptReady { .. }
        ));
        assert!(matches!(
            updates.recv().await.unwrap(),
            OutboundMessage::UnreadEmailsUpdated { .. }
        ));

        // A second readiness-looking batch must not re-announce.
        mutation_tx
            .send(MutationBatch {
                mutations: vec![crate::host::Mutation::ChildList {
                    added: 1,
                    removed: 0,
                }],
            })
            .unwrap();
        let update = timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("debounced scan in time")
            .unwrap();
        assert!(matches!(update, OutboundMessage::UnreadEmailsUpdated { .. }));

        shutdown.trigger();
        let _ = timeout(Duration::from_secs(2), handle).await;
    }
}
