//! Subscription management for views.
//!
//! Subscribers receive a `Snapshot` of the view after every published
//! change: the result tree plus the completion status and error.

use crate::status::{QueryError, QueryStatus};
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use trellis_incremental::Data;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for snapshot notifications.
pub type SnapshotCallback = Rc<dyn Fn(&Snapshot)>;

/// What a view looks like at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub data: Data,
    pub status: QueryStatus,
    pub error: Option<QueryError>,
}

/// A subscription to view snapshots.
pub struct Subscription {
    /// Unique identifier
    id: SubscriptionId,
    /// Callback to invoke on changes
    callback: SnapshotCallback,
    /// Whether this subscription is active
    active: bool,
}

impl Subscription {
    /// Creates a new subscription.
    pub fn new<F>(id: SubscriptionId, callback: F) -> Self
    where
        F: Fn(&Snapshot) + 'static,
    {
        Self {
            id,
            callback: Rc::new(callback),
            active: true,
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether this subscription is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivates this subscription.
    #[inline]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns a handle to the callback.
    pub fn callback(&self) -> SnapshotCallback {
        self.callback.clone()
    }

    /// Notifies this subscription of a snapshot.
    pub fn notify(&self, snapshot: &Snapshot) {
        if self.active {
            (self.callback)(snapshot);
        }
    }
}

/// Manages subscriptions for a view.
pub struct SubscriptionManager {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    next_id: SubscriptionId,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Subscribes with the given callback.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.insert(id, Subscription::new(id, callback));
        id
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Deactivates a subscription without removing it.
    pub fn pause(&mut self, id: SubscriptionId) -> bool {
        match self.subscriptions.get_mut(&id) {
            Some(sub) => {
                sub.deactivate();
                true
            }
            None => false,
        }
    }

    /// Notifies all active subscriptions, oldest first.
    pub fn notify_all(&self, snapshot: &Snapshot) {
        let mut subs: Vec<&Subscription> = self.subscriptions.values().collect();
        subs.sort_unstable_by_key(|sub| sub.id());
        for sub in subs {
            sub.notify(snapshot);
        }
    }

    /// Returns the callbacks of all active subscriptions, oldest first.
    ///
    /// Lets a caller release its borrow of the manager before invoking them.
    pub fn active_callbacks(&self) -> Vec<SnapshotCallback> {
        let mut subs: Vec<&Subscription> =
            self.subscriptions.values().filter(|sub| sub.is_active()).collect();
        subs.sort_unstable_by_key(|sub| sub.id());
        subs.into_iter().map(Subscription::callback).collect()
    }

    /// Returns the number of subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Clears all subscriptions.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}
