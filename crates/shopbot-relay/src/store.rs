// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation tables for the evidence relay.
//!
//! `waits` maps a buyer to the purchase they were asked to prove.
//! `threads` maps the id of the message copied to the operator back to the
//! buyer, so an operator reply can find its way home.

use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

use shopbot_core::types::{MessageId, PurchaseId, UserId};

#[derive(Debug, Clone, Copy)]
struct ThreadEntry {
    user: UserId,
    created: Instant,
}

/// Shared, injectable state for the relay coordinator.
#[derive(Debug, Default)]
pub struct RelayStore {
    waits: DashMap<UserId, PurchaseId>,
    threads: DashMap<MessageId, ThreadEntry>,
    thread_ttl: Option<Duration>,
}

impl RelayStore {
    /// A store whose reply threads never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that forgets reply threads older than `ttl`.
    pub fn with_thread_ttl(ttl: Option<Duration>) -> Self {
        Self {
            thread_ttl: ttl,
            ..Self::default()
        }
    }

    /// Start waiting for evidence from `user`. Returns the overwritten wait.
    pub fn begin_wait(&self, user: UserId, purchase: PurchaseId) -> Option<PurchaseId> {
        self.waits.insert(user, purchase)
    }

    /// Remove and return the wait for `user`.
    pub fn take_wait(&self, user: UserId) -> Option<PurchaseId> {
        self.waits.remove(&user).map(|(_, purchase)| purchase)
    }

    /// Put a consumed wait back unless a newer one has been started since.
    pub fn restore_wait(&self, user: UserId, purchase: PurchaseId) -> bool {
        match self.waits.entry(user) {
            Entry::Vacant(slot) => {
                slot.insert(purchase);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn pending_wait(&self, user: UserId) -> Option<PurchaseId> {
        self.waits.get(&user).map(|p| *p)
    }

    pub fn pending_waits(&self) -> usize {
        self.waits.len()
    }

    /// Remember that `forwarded` (in the operator's chat) belongs to `user`.
    pub fn record_thread(&self, forwarded: MessageId, user: UserId) {
        self.threads.insert(
            forwarded,
            ThreadEntry {
                user,
                created: Instant::now(),
            },
        );
    }

    /// The buyer behind a forwarded message. Expired entries are evicted.
    pub fn thread_user(&self, forwarded: MessageId) -> Option<UserId> {
        if self
            .threads
            .remove_if(&forwarded, |_, entry| self.is_expired(entry))
            .is_some()
        {
            return None;
        }
        self.threads.get(&forwarded).map(|entry| entry.user)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Drop every expired thread. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        if self.thread_ttl.is_none() {
            return 0;
        }
        let before = self.threads.len();
        self.threads.retain(|_, entry| !self.is_expired(entry));
        before.saturating_sub(self.threads.len())
    }

    fn is_expired(&self, entry: &ThreadEntry) -> bool {
        self.thread_ttl
            .is_some_and(|ttl| entry.created.elapsed() >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wait_overwrites_previous() {
        let store = RelayStore::new();
        assert_eq!(store.begin_wait(UserId(5), PurchaseId(1)), None);
        assert_eq!(store.begin_wait(UserId(5), PurchaseId(2)), Some(PurchaseId(1)));
        assert_eq!(store.take_wait(UserId(5)), Some(PurchaseId(2)));
        assert_eq!(store.take_wait(UserId(5)), None);
    }

    #[test]
    fn restore_never_clobbers_a_newer_wait() {
        let store = RelayStore::new();
        assert!(store.restore_wait(UserId(5), PurchaseId(1)));
        assert_eq!(store.pending_wait(UserId(5)), Some(PurchaseId(1)));

        store.begin_wait(UserId(6), PurchaseId(9));
        assert!(!store.restore_wait(UserId(6), PurchaseId(3)));
        assert_eq!(store.pending_wait(UserId(6)), Some(PurchaseId(9)));
    }

    #[test]
    fn threads_without_ttl_are_kept() {
        let store = RelayStore::new();
        store.record_thread(MessageId(10), UserId(5));
        assert_eq!(store.thread_user(MessageId(10)), Some(UserId(5)));
        assert_eq!(store.thread_user(MessageId(10)), Some(UserId(5)));
        assert_eq!(store.thread_user(MessageId(11)), None);
        assert_eq!(store.prune_expired(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_thread_is_evicted_on_lookup() {
        let store = RelayStore::with_thread_ttl(Some(Duration::from_secs(60)));
        store.record_thread(MessageId(10), UserId(5));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(store.thread_user(MessageId(10)), Some(UserId(5)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.thread_user(MessageId(10)), None);
        assert_eq!(store.thread_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn prune_removes_only_expired_threads() {
        let store = RelayStore::with_thread_ttl(Some(Duration::from_secs(10)));
        store.record_thread(MessageId(1), UserId(1));
        tokio::time::advance(Duration::from_secs(6)).await;
        store.record_thread(MessageId(2), UserId(2));
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(store.prune_expired(), 1);
        assert_eq!(store.thread_user(MessageId(2)), Some(UserId(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lookup_leaves_other_threads_alone() {
        let store = RelayStore::with_thread_ttl(Some(Duration::from_secs(10)));
        store.record_thread(MessageId(1), UserId(1));
        tokio::time::advance(Duration::from_secs(11)).await;
        store.record_thread(MessageId(2), UserId(2));

        assert_eq!(store.thread_user(MessageId(1)), None);
        assert_eq!(store.thread_user(MessageId(1)), None);
        assert_eq!(store.thread_count(), 1);
        assert_eq!(store.thread_user(MessageId(2)), Some(UserId(2)));
        assert_eq!(store.thread_user(MessageId(3)), None);
    }
}
