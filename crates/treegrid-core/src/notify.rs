//! Change notification for derived table state.
//!
//! Mutators publish a change event after they finish; subscribers (usually
//! the rendering layer) drop their memoized reads in response. Delivery is
//! synchronous and in subscription order.

use std::fmt;

/// Type alias for subscriber callbacks.
type SubscriberFn<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A list of change subscribers.
pub struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, SubscriberFn<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<T> Subscribers<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Deliver `event` to every subscriber.
    pub fn notify(&self, event: &T) {
        for (_, callback) in &self.entries {
            callback(event);
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
