//! # Notification Channel
//!
//! A small synchronous observer used by [`Memory`](crate::Memory) and
//! [`Simulator`](crate::Simulator) to fan events out to host listeners.
//!
//! - Listeners subscribe to one event kind each; a kind may have many listeners.
//! - Dispatch invokes matching listeners synchronously, in registration order.
//! - Listeners must not re-enter the component that is dispatching. They may
//!   record what they saw, or request a stop through a
//!   [`StopHandle`](crate::StopHandle).
//!
//! # Examples
//!
//! ```
//! use sim6502::events::{Dispatcher, Notification};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Ping }
//!
//! struct Ping(u8);
//!
//! impl Notification for Ping {
//!     type Kind = Kind;
//!     fn kind(&self) -> Kind { Kind::Ping }
//! }
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut dispatcher: Dispatcher<Ping> = Dispatcher::new();
//! let sink = Rc::clone(&seen);
//! dispatcher.subscribe(Kind::Ping, move |p: &Ping| sink.borrow_mut().push(p.0));
//!
//! dispatcher.dispatch(&Ping(7));
//! assert_eq!(*seen.borrow(), vec![7]);
//! ```

use std::fmt;

/// An event that can be routed by kind.
pub trait Notification {
    /// Discriminant used for subscriptions.
    type Kind: Copy + PartialEq + fmt::Debug;

    /// The kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Identifies a registered listener so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Registration<E: Notification> {
    id: ListenerId,
    kind: E::Kind,
    callback: Box<dyn FnMut(&E)>,
}

/// Synchronous fan-out of events to registered listeners.
pub struct Dispatcher<E: Notification> {
    next_id: u64,
    listeners: Vec<Registration<E>>,
}

impl<E: Notification> Dispatcher<E> {
    /// Creates a dispatcher with no listeners.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Registers `callback` for events of `kind`.
    pub fn subscribe<F>(&mut self, kind: E::Kind, callback: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() != before
    }

    /// Invokes every listener registered for the event's kind.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&mut self, event: &E) -> usize {
        let kind = event.kind();
        let mut invoked = 0;
        for registration in self.listeners.iter_mut().filter(|r| r.kind == kind) {
            (registration.callback)(event);
            invoked += 1;
        }
        invoked
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.iter().filter(|r| r.kind == kind).count()
    }

    /// Returns true if at least one listener is registered for `kind`.
    ///
    /// Callers use this to skip building expensive payloads nobody will see.
    pub fn has_listeners(&self, kind: E::Kind) -> bool {
        self.listeners.iter().any(|r| r.kind == kind)
    }
}

impl<E: Notification> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Notification> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
