use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::infrastructure::shutdown::ShutdownListener;

use super::bus::RuntimeBus;
use super::messages::{InboundMessage, OutboundMessage};

/// Popup stand-in: asks for counts once on startup the way the popup does
/// when opened, then logs every proactive update it receives.
pub fn spawn(bus: RuntimeBus, shutdown: ShutdownListener) -> JoinHandle<()> {
    tokio::spawn(run(bus, shutdown))
}

async fn run(bus: RuntimeBus, mut shutdown: ShutdownListener) {
    let mut updates = bus.subscribe();

    if let Some(counts) = bus.request(InboundMessage::GetUnreadCounts).await {
        tracing::info!(
            target: "popup",
            total = counts.total,
            visible_unread = counts.visible_unread.len(),
            "초기 카운트 조회 완료"
        );
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(OutboundMessage::ContentScriptReady { url, .. }) => {
                    tracing::info!(target: "popup", url = %url, "콘텐츠 스크립트 준비 완료");
                }
                Ok(OutboundMessage::UnreadEmailsUpdated { total_count, tab_counts, visible_unread }) => {
                    tracing::info!(
                        target: "popup",
                        total = total_count,
                        primary = tab_counts.primary,
                        social = tab_counts.social,
                        promotions = tab_counts.promotions,
                        updates = tab_counts.updates,
                        forums = tab_counts.forums,
                        important = visible_unread.iter().filter(|r| r.is_important).count(),
                        "받은편지함 카운트 갱신"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "popup", skipped, "update stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.notified() => break,
        }
    }
    tracing::info!(target: "popup", "popup listener stopped");
}
