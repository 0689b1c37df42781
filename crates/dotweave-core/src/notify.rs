//! Payload-free change notification.
//!
//! A [`ChangeNotifier`] holds a list of callbacks that are invoked whenever the
//! owning graph or sub-graph changes its membership. Callbacks receive no
//! payload; listeners re-read whatever state they care about.

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use log::trace;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A list of change callbacks with explicit subscribe and unsubscribe.
///
/// The notifier is `Send + Sync` and has no thread affinity. Callbacks are
/// invoked in subscription order on the thread that calls
/// [`notify`](Self::notify), and may subscribe or unsubscribe on the same
/// notifier while they run.
///
/// # Examples
///
/// ```
/// # use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
/// # use dotweave_core::notify::ChangeNotifier;
/// let notifier = ChangeNotifier::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&hits);
/// let id = notifier.subscribe(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// notifier.notify();
/// assert!(notifier.unsubscribe(id));
/// notifier.notify();
///
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback and returns its handle.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks().push((id, Arc::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if the handle was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Invokes every callback registered when the call begins.
    ///
    /// Changes to the subscriber list made by a callback take effect from the
    /// next notification.
    pub fn notify(&self) {
        let callbacks: Vec<Callback> = self
            .callbacks()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        trace!(subscribers = callbacks.len(); "Notifying change");
        for callback in callbacks {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks().len()
    }

    // A panicking callback poisons the lock; the list itself is still consistent.
    fn callbacks(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
