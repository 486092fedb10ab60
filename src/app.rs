use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::{sync::mpsc, task::JoinHandle, time::timeout};

use crate::{
    bridge::{popup, RuntimeBus},
    config::AppConfig,
    host::{poller::SnapshotPoller, PageSnapshot, SnapshotHost},
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    rules::ImportanceRules,
    watcher::InboxWatcher,
};

pub struct InboxFlowApp {
    _paths: ResolvedPaths,
    watcher_handle: JoinHandle<()>,
    poller_handle: JoinHandle<()>,
    popup_handle: JoinHandle<()>,
    shutdown: Shutdown,
}

impl InboxFlowApp {
    pub fn initialize(config: AppConfig, paths: ResolvedPaths, shutdown: Shutdown) -> Result<Self> {
        let rules = Arc::new(ImportanceRules::from_config(&config.rules));
        let host = Arc::new(SnapshotHost::new(PageSnapshot::default()));

        let (mutation_tx, mutation_rx) = mpsc::unbounded_channel();
        let (bus, query_rx) = RuntimeBus::new(8);

        let watcher = InboxWatcher::new(host.clone(), rules, bus.clone(), config.watcher.clone());
        let watcher_handle = tokio::spawn(watcher.run(mutation_rx, query_rx, shutdown.listener()));

        let poller = SnapshotPoller::new(host, config.snapshot.clone(), mutation_tx);
        let poller_handle = poller.spawn(shutdown.listener());

        let popup_handle = popup::spawn(bus, shutdown.listener());

        Ok(Self {
            _paths: paths,
            watcher_handle,
            poller_handle,
            popup_handle,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let InboxFlowApp {
            _paths: _,
            mut watcher_handle,
            poller_handle,
            popup_handle,
            shutdown,
        } = self;

        tracing::info!("받은편지함 감시 서비스 시작");

        let mut shutdown_listener = shutdown.listener();
        let mut watcher_completed = false;

        tokio::select! {
            _ = shutdown_listener.notified() => {
                tracing::info!("종료 신호 감지 (CTRL+C / SIGTERM)");
            }
            res = &mut watcher_handle => {
                watcher_completed = true;
                if let Err(err) = res {
                    if err.is_panic() {
                        tracing::error!("받은편지함 감시 작업이 패닉으로 종료되었습니다");
                    }
                } else {
                    tracing::warn!("받은편지함 감시 작업이 예기치 않게 종료되었습니다");
                }
            }
        }

        shutdown.trigger();

        let shutdown_timeout = Duration::from_secs(5);
        if !watcher_completed {
            join_or_abort("watcher", watcher_handle, shutdown_timeout).await;
        }
        join_or_abort("host", poller_handle, shutdown_timeout).await;
        join_or_abort("popup", popup_handle, shutdown_timeout).await;

        tracing::info!("감시 서비스 종료 완료");
        Ok(())
    }
}

async fn join_or_abort(name: &str, handle: JoinHandle<()>, limit: Duration) {
    let abort = handle.abort_handle();
    match timeout(limit, handle).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            if err.is_panic() {
                tracing::error!(target: "app", task = name, "task ended in a panic");
            }
        }
        Err(_) => {
            tracing::warn!(
                target: "app",
                task = name,
                "task did not stop within {:?}; aborting",
                limit
            );
            abort.abort();
        }
    }
}
