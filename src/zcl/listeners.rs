//! Listener registry used to fan out attribute and command notifications.

use parking_lot::RwLock;
use std::sync::Arc;

/// Ordered set of listeners, deduplicated by pointer identity.
///
/// Delivery goes through [`ListenerSet::snapshot`], so no lock is held while
/// a listener runs. A listener removed while a delivery is in flight may
/// still see that one event, never a later one.
pub struct ListenerSet<L: ?Sized> {
    listeners: RwLock<Vec<Arc<L>>>,
}

impl<L: ?Sized> ListenerSet<L> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener. Returns `false` if it was already present.
    pub fn add(&self, listener: Arc<L>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|l| same(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Remove a listener. Returns `false` if it was not present.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !same(l, listener));
        listeners.len() != before
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.listeners.read().iter().any(|l| same(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Copy of the current listeners, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.read().clone()
    }
}

impl<L: ?Sized> Default for ListenerSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

fn same<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    // Compare data pointers only; vtable pointers for the same type may differ.
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Listener: Send + Sync {
        fn id(&self) -> u32;
    }

    struct P(u32);

    impl Listener for P {
        fn id(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_add_is_deduplicated() {
        let set: ListenerSet<dyn Listener> = ListenerSet::new();
        let a: Arc<dyn Listener> = Arc::new(P(1));
        assert!(set.add(a.clone()));
        assert!(!set.add(a.clone()));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let set: ListenerSet<dyn Listener> = ListenerSet::new();
        let a: Arc<dyn Listener> = Arc::new(P(1));
        let b: Arc<dyn Listener> = Arc::new(P(2));
        set.add(a.clone());
        set.add(b.clone());

        assert!(set.remove(&a));
        assert!(!set.remove(&a));
        assert_eq!(set.len(), 1);
        assert_eq!(set.snapshot()[0].id(), 2);
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let set: ListenerSet<dyn Listener> = ListenerSet::new();
        let a: Arc<dyn Listener> = Arc::new(P(7));
        set.add(a.clone());

        let snapshot = set.snapshot();
        set.remove(&a);
        assert!(set.is_empty());
        assert_eq!(snapshot.len(), 1);
    }
}
