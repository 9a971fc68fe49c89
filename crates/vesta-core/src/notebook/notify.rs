//! Change notification.

use std::collections::BTreeMap;

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener registry owned by one notebook.
///
/// Callbacks carry no payload; listeners re-read notebook state after being
/// called. They run synchronously, in registration order.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    callbacks: BTreeMap<u64, Box<dyn FnMut() + Send>>,
    revision: u64,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + Send + 'static) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.insert(id, Box::new(callback));
        ListenerId(id)
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.callbacks.remove(&id.0).is_some()
    }

    pub fn notify(&mut self) {
        self.revision += 1;
        for callback in self.callbacks.values_mut() {
            callback();
        }
    }

    /// Number of notifications fired so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .field("revision", &self.revision)
            .finish()
    }
}
