//! Signal/slot system for Horizon Bind.
//!
//! Signals are the notification primitive underneath [`crate::Model`]: every
//! observable property owns a signal, and listeners are slots connected to it.
//! Slots are invoked directly on the emitting thread, in connection order.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//!
//! # Re-entrancy
//!
//! [`Signal::emit`] snapshots the connected slots before invoking them, so a
//! slot may connect or disconnect slots (including itself) on the same signal.
//! Connections made during an emission are not invoked by that emission.
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is disconnected or the signal
    /// is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots by reference.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Check whether a connection is still registered.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots with `args`.
    ///
    /// Returns the number of slots invoked.
    #[tracing::instrument(skip_all, target = "horizon_bind_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return 0;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in &slots {
            slot(&args);
        }
        slots.len()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        let conn_id = signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!signal.is_connected(conn_id));
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.set_blocked(true);
        assert_eq!(signal.emit(1), 0);
        signal.set_blocked(false);
        assert_eq!(signal.emit(2), 1);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slot_may_disconnect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let count = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(Mutex::new(None::<ConnectionId>));

        let signal_clone = signal.clone();
        let count_clone = count.clone();
        let own_id_clone = own_id.clone();
        let id = signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *own_id_clone.lock() {
                signal_clone.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<u8>::new();
        signal.connect(|_| {});
        signal.connect(|_| {});
        assert_eq!(signal.connection_count(), 2);

        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
        assert_eq!(signal.emit(0), 0);
    }
}
