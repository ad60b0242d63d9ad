//! Observable value with explicit subscriptions.
//!
//! A `Store` is owned by whoever creates it and handed to subscribers by
//! reference. Subscribers hold a `watch::Receiver`; dropping it is the
//! unsubscribe. Receivers only ever see the latest value, so intermediate
//! states may be coalesced when a subscriber falls behind.

use tokio::sync::watch;

pub struct Store<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Store<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and wake every subscriber. Never blocks and never
    /// runs subscriber code on the caller's stack.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// New receiver positioned at the current value; `changed()` resolves
    /// on the next `set`.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
