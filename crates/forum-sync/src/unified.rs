//! Unified display count
//!
//! What the UI shows: the synchronizer's count, plus pending guest deltas
//! from the device ledger when the actor is a guest. While this consumer's
//! own toggle is in flight its optimistic count already includes the delta,
//! so the ledger is not added on top.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use forum_cache::{LedgerWatch, LikeCountCache};

use crate::synchronizer::LikeSync;

/// Display count kept current as the view or the ledger changes
pub struct UnifiedLikeCount {
    rx: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl UnifiedLikeCount {
    /// Compute the initial count and start tracking changes
    pub async fn spawn(sync: LikeSync, ledger: Option<Arc<LikeCountCache>>) -> Self {
        let ledger = ledger.filter(|_| sync.actor().is_guest());
        let (tx, rx) = watch::channel(display_count(&sync, ledger.as_deref()).await);
        let task = tokio::spawn(track(sync, ledger, tx));
        Self { rx, task }
    }

    /// Current display count
    pub fn get(&self) -> u64 {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rx.clone()
    }
}

impl Drop for UnifiedLikeCount {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn display_count(sync: &LikeSync, ledger: Option<&LikeCountCache>) -> u64 {
    let view = sync.view();
    match ledger {
        Some(ledger) if !view.pending => ledger.display_count(&sync.post_id(), view.count).await,
        _ => view.count,
    }
}

async fn ledger_changed(watch: &mut Option<LedgerWatch>) -> bool {
    match watch {
        Some(watch) => watch.changed().await,
        None => false,
    }
}

async fn track(sync: LikeSync, ledger: Option<Arc<LikeCountCache>>, tx: watch::Sender<u64>) {
    let mut views = sync.subscribe();
    let mut ledger_watch = ledger.as_ref().map(|ledger| ledger.watch());
    let mut ledger_open = ledger_watch.is_some();

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            open = ledger_changed(&mut ledger_watch), if ledger_open => {
                ledger_open = open;
            }
        }

        let count = display_count(&sync, ledger.as_deref()).await;
        tx.send_if_modified(|current| {
            if *current == count {
                false
            } else {
                *current = count;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::LikePhase;
    use crate::services::{ServiceContext, ServiceContextBuilder};
    use crate::testing::FakeLikeBackend;
    use forum_cache::MemoryStorage;
    use forum_core::{Actor, PostId};
    use std::time::Duration;

    fn post() -> PostId {
        PostId::parse("p1").unwrap()
    }

    fn context(backend: &Arc<FakeLikeBackend>, ledger: &Arc<LikeCountCache>) -> ServiceContext {
        ServiceContextBuilder::new()
            .like_repo(backend.clone())
            .like_feed(backend.clone())
            .ledger(ledger.clone())
            .build()
            .unwrap()
    }

    async fn wait_for(rx: &mut watch::Receiver<u64>, expected: u64) {
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|count| *count == expected))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_guest_sees_other_tab_delta() {
        let backend = Arc::new(FakeLikeBackend::new());
        backend.seed(&post(), &[Actor::authenticated("u1")]);
        let storage = Arc::new(MemoryStorage::default());
        let ledger = Arc::new(LikeCountCache::new(storage.clone()));
        let other_tab = LikeCountCache::new(storage);

        let sync = LikeSync::new(&context(&backend, &ledger), post(), Actor::guest("g1"));
        sync.load().await.unwrap();
        let unified = UnifiedLikeCount::spawn(sync, Some(ledger)).await;
        assert_eq!(unified.get(), 1);

        let mut rx = unified.subscribe();
        other_tab.record(&post(), 1).await;
        wait_for(&mut rx, 2).await;

        other_tab.record(&post(), -1).await;
        wait_for(&mut rx, 1).await;
    }

    #[tokio::test]
    async fn test_own_toggle_is_not_double_counted() {
        let backend = Arc::new(FakeLikeBackend::new());
        let ledger = Arc::new(LikeCountCache::new(Arc::new(MemoryStorage::default())));
        let sync = LikeSync::new(&context(&backend, &ledger), post(), Actor::guest("g1"));
        sync.load().await.unwrap();
        let unified = UnifiedLikeCount::spawn(sync.clone(), Some(ledger.clone())).await;
        let mut rx = unified.subscribe();

        backend.block_writes();
        let in_flight = tokio::spawn({
            let sync = sync.clone();
            async move { sync.toggle().await }
        });
        while ledger.delta(&post()).await == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(sync.phase(), LikePhase::Toggling);
        wait_for(&mut rx, 1).await;

        backend.release_writes();
        in_flight.await.unwrap().unwrap();
        wait_for(&mut rx, 1).await;
        assert_eq!(unified.get(), 1);
    }

    #[tokio::test]
    async fn test_authenticated_ignores_ledger() {
        let backend = Arc::new(FakeLikeBackend::new());
        let storage = Arc::new(MemoryStorage::default());
        let ledger = Arc::new(LikeCountCache::new(storage));
        ledger.record(&post(), 3).await;

        let sync = LikeSync::new(
            &context(&backend, &ledger),
            post(),
            Actor::authenticated("u1"),
        );
        sync.load().await.unwrap();
        let unified = UnifiedLikeCount::spawn(sync, Some(ledger)).await;
        assert_eq!(unified.get(), 0);
    }
}
