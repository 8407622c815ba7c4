//! In-memory like backend for tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use forum_core::traits::{DeleteOutcome, InsertOutcome, LikeChangeFeed, LikeRepository, RepoResult};
use forum_core::{Actor, DomainError, LikeChange, LikeRecord, LikeSubscription, PostId};

/// Subscription lifecycle event recorded by the fake feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOp {
    Subscribe(PostId),
    Unsubscribe(PostId),
}

type Subscribers = Vec<(u64, PostId, mpsc::Sender<LikeChange>)>;

/// Scripted backend implementing both ports
pub struct FakeLikeBackend {
    likes: Mutex<HashMap<PostId, HashSet<Actor>>>,
    subscribers: Arc<Mutex<Subscribers>>,
    feed_log: Arc<Mutex<Vec<FeedOp>>>,
    next_subscriber: AtomicU64,
    failing_reads: AtomicUsize,
    failing_writes: AtomicUsize,
    read_gate: watch::Sender<bool>,
    write_gate: watch::Sender<bool>,
    writes: AtomicUsize,
}

impl FakeLikeBackend {
    pub fn new() -> Self {
        Self {
            likes: Mutex::new(HashMap::new()),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            feed_log: Arc::new(Mutex::new(Vec::new())),
            next_subscriber: AtomicU64::new(0),
            failing_reads: AtomicUsize::new(0),
            failing_writes: AtomicUsize::new(0),
            read_gate: watch::Sender::new(true),
            write_gate: watch::Sender::new(true),
            writes: AtomicUsize::new(0),
        }
    }

    /// Store likes without notifying subscribers
    pub fn seed(&self, post_id: &PostId, actors: &[Actor]) {
        self.likes
            .lock()
            .entry(post_id.clone())
            .or_default()
            .extend(actors.iter().cloned());
    }

    pub fn like_count(&self, post_id: &PostId) -> usize {
        self.likes.lock().get(post_id).map_or(0, HashSet::len)
    }

    /// Make the next `n` count/has-liked calls fail with a transient error
    pub fn fail_next_reads(&self, n: usize) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` insert/delete calls fail with a transient error
    pub fn fail_next_writes(&self, n: usize) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    /// Hold reads until `release_reads`
    pub fn block_reads(&self) {
        self.read_gate.send_replace(false);
    }

    pub fn release_reads(&self) {
        self.read_gate.send_replace(true);
    }

    /// Hold writes until `release_writes`
    pub fn block_writes(&self) {
        self.write_gate.send_replace(false);
    }

    pub fn release_writes(&self) {
        self.write_gate.send_replace(true);
    }

    /// Number of insert/delete calls that reached the backend
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Subscribe/unsubscribe calls in order
    pub fn feed_log(&self) -> Vec<FeedOp> {
        self.feed_log.lock().clone()
    }

    pub fn unsubscribe_count(&self, post_id: &PostId) -> usize {
        self.feed_log
            .lock()
            .iter()
            .filter(|op| **op == FeedOp::Unsubscribe(post_id.clone()))
            .count()
    }

    pub fn subscriber_count(&self, post_id: &PostId) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|(_, post, _)| post == post_id)
            .count()
    }

    /// Push a change to the post's subscribers, as another actor would
    pub fn notify(&self, change: &LikeChange) {
        for (_, post, tx) in self.subscribers.lock().iter() {
            if *post == change.post_id {
                let _ = tx.try_send(change.clone());
            }
        }
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn read(&self) -> RepoResult<()> {
        let mut gate = self.read_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        if Self::take_failure(&self.failing_reads) {
            return Err(DomainError::Backend("injected read failure".to_string()));
        }
        Ok(())
    }

    async fn write(&self) -> RepoResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.write_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        if Self::take_failure(&self.failing_writes) {
            return Err(DomainError::Backend("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl Default for FakeLikeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LikeRepository for FakeLikeBackend {
    async fn count(&self, post_id: &PostId) -> RepoResult<u64> {
        self.read().await?;
        Ok(self.like_count(post_id) as u64)
    }

    async fn has_liked(&self, post_id: &PostId, actor: &Actor) -> RepoResult<bool> {
        self.read().await?;
        Ok(self
            .likes
            .lock()
            .get(post_id)
            .is_some_and(|actors| actors.contains(actor)))
    }

    async fn insert(&self, record: &LikeRecord) -> RepoResult<InsertOutcome> {
        self.write().await?;
        let inserted = self
            .likes
            .lock()
            .entry(record.post_id.clone())
            .or_default()
            .insert(record.actor.clone());

        if !inserted {
            return Ok(InsertOutcome::Duplicate);
        }
        self.notify(&LikeChange::inserted(record.post_id.clone()));
        Ok(InsertOutcome::Inserted)
    }

    async fn delete(&self, post_id: &PostId, actor: &Actor) -> RepoResult<DeleteOutcome> {
        self.write().await?;
        let removed = self
            .likes
            .lock()
            .get_mut(post_id)
            .is_some_and(|actors| actors.remove(actor));

        if !removed {
            return Ok(DeleteOutcome::NotFound);
        }
        self.notify(&LikeChange::deleted(post_id.clone()));
        Ok(DeleteOutcome::Deleted)
    }
}

impl LikeChangeFeed for FakeLikeBackend {
    fn subscribe(&self, post_id: &PostId) -> Result<LikeSubscription, DomainError> {
        let (tx, rx) = mpsc::channel(16);
        let id = self.next_subscriber.fetch_add(1, Ordering::SeqCst);

        self.subscribers.lock().push((id, post_id.clone(), tx));
        self.feed_log.lock().push(FeedOp::Subscribe(post_id.clone()));

        let subscribers = Arc::clone(&self.subscribers);
        let feed_log = Arc::clone(&self.feed_log);
        let key = post_id.clone();
        Ok(LikeSubscription::new(post_id.clone(), rx, move || {
            subscribers.lock().retain(|(sub_id, _, _)| *sub_id != id);
            feed_log.lock().push(FeedOp::Unsubscribe(key));
        }))
    }
}
