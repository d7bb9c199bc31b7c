//! The reboot notifier chain.
//!
//! An explicit event bus rather than ambient global state: the platform
//! owns a [`RebootNotifier`] and passes it to whichever subsystems want a
//! word before the machine resets. Delivery is synchronous, on the thread
//! driving the reboot, in subscription order.

use alloc::sync::Arc;
use alloc::vec::Vec;

use tachyon_core::SpinLock;

/// Why the system is going down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootReason {
    /// Warm restart back into firmware/bootloader.
    Restart,
    /// Stop all CPUs without cutting power.
    Halt,
    /// Full power-off.
    PowerOff,
}

/// A subscriber's verdict on continuing chain delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierAction {
    /// Deliver the event to the remaining subscribers.
    Continue,
    /// Stop delivery; later subscribers do not see the event.
    Stop,
}

/// Handle identifying one subscription.
///
/// Not `Clone`: unsubscribing consumes the handle, so a subscription can
/// be torn down at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct NotifierHandle {
    id: u64,
}

type Callback = Arc<dyn Fn(RebootReason, Option<&str>) -> NotifierAction + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct Chain {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// The reboot notifier chain.
///
/// Subscribers are invoked outside the chain lock (against a snapshot
/// taken under it), so a callback may freely subscribe, unsubscribe, or
/// take its own locks. A subscription removed before [`notify`] snapshots
/// the chain is guaranteed not to run; one removed while a delivery is in
/// flight may still see that delivery.
///
/// [`notify`]: RebootNotifier::notify
#[derive(Default)]
pub struct RebootNotifier {
    chain: SpinLock<Chain>,
}

impl RebootNotifier {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback` to the chain and returns its handle.
    pub fn subscribe<F>(&self, callback: F) -> NotifierHandle
    where
        F: Fn(RebootReason, Option<&str>) -> NotifierAction + Send + Sync + 'static,
    {
        let mut chain = self.chain.lock();
        let id = chain.next_id;
        chain.next_id += 1;
        chain.subscribers.push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        NotifierHandle { id }
    }

    /// Removes the subscription identified by `handle`.
    ///
    /// Returns whether it was still in the chain.
    pub fn unsubscribe(&self, handle: NotifierHandle) -> bool {
        let mut chain = self.chain.lock();
        let before = chain.subscribers.len();
        chain.subscribers.retain(|s| s.id != handle.id);
        chain.subscribers.len() != before
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.chain.lock().subscribers.len()
    }

    /// Delivers `(reason, cmd)` to subscribers in subscription order,
    /// stopping early if one returns [`NotifierAction::Stop`].
    ///
    /// Returns the number of subscribers invoked.
    pub fn notify(&self, reason: RebootReason, cmd: Option<&str>) -> usize {
        let snapshot: Vec<Callback> = {
            let chain = self.chain.lock();
            chain
                .subscribers
                .iter()
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };

        let mut invoked = 0;
        for callback in snapshot {
            invoked += 1;
            if callback(reason, cmd) == NotifierAction::Stop {
                break;
            }
        }
        invoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn delivers_in_subscription_order() {
        let notifier = RebootNotifier::new();
        let seen = Arc::new(SpinLock::new(Vec::new()));
        for tag in [1, 2, 3] {
            let seen = Arc::clone(&seen);
            notifier.subscribe(move |_, _| {
                seen.lock().push(tag);
                NotifierAction::Continue
            });
        }

        assert_eq!(notifier.notify(RebootReason::Restart, None), 3);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn stop_short_circuits_the_chain() {
        let notifier = RebootNotifier::new();
        notifier.subscribe(|_, _| NotifierAction::Stop);
        let reached = Arc::new(SpinLock::new(false));
        {
            let reached = Arc::clone(&reached);
            notifier.subscribe(move |_, _| {
                *reached.lock() = true;
                NotifierAction::Continue
            });
        }

        assert_eq!(notifier.notify(RebootReason::PowerOff, None), 1);
        assert!(!*reached.lock());
    }

    #[test]
    fn unsubscribe_removes_exactly_one() {
        let notifier = RebootNotifier::new();
        let first = notifier.subscribe(|_, _| NotifierAction::Continue);
        let _second = notifier.subscribe(|_, _| NotifierAction::Continue);
        assert_eq!(notifier.subscriber_count(), 2);

        assert!(notifier.unsubscribe(first));
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn command_payload_reaches_subscribers() {
        let notifier = RebootNotifier::new();
        let got = Arc::new(SpinLock::new(None));
        {
            let got = Arc::clone(&got);
            notifier.subscribe(move |reason, cmd| {
                *got.lock() = Some((reason, cmd.map(alloc::string::String::from)));
                NotifierAction::Continue
            });
        }

        notifier.notify(RebootReason::Restart, Some("recovery"));
        let got = got.lock();
        let (reason, cmd) = got.as_ref().unwrap();
        assert_eq!(*reason, RebootReason::Restart);
        assert_eq!(cmd.as_deref(), Some("recovery"));
    }
}
