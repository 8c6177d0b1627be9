// ── Entity subscriptions ──
//
// Change-oriented views over an entity's state slot. A subscriber sees
// transitions (previous -> current), never bare snapshots, and can narrow
// the feed down to the values the device reports.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures_core::Stream;
use serde_json::Value;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::entity::EntityState;

// ── StateChange ─────────────────────────────────────────────────────

/// One observed transition of an entity's state.
///
/// `previous` is the state the subscriber last saw, so several device
/// updates that land between two polls collapse into one change.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub previous: Arc<EntityState>,
    pub current: Arc<EntityState>,
}

impl StateChange {
    /// The device reported a different raw value.
    pub fn value_changed(&self) -> bool {
        self.previous.value_raw != self.current.value_raw
    }

    pub fn availability_changed(&self) -> bool {
        self.previous.available != self.current.available
    }

    pub fn access_changed(&self) -> bool {
        self.previous.access != self.current.access
    }

    /// The device granted writes with this transition: the entity is now
    /// available with a writable access level and was not before.
    pub fn became_writable(&self) -> bool {
        !is_granted(&self.previous) && is_granted(&self.current)
    }

    /// The device withdrew a previously granted write permission.
    pub fn lost_writable(&self) -> bool {
        is_granted(&self.previous) && !is_granted(&self.current)
    }
}

fn is_granted(state: &EntityState) -> bool {
    state.available && state.access.is_writable()
}

// ── Subscription ────────────────────────────────────────────────────

/// A subscriber's cursor over one entity.
pub struct Subscription {
    seen: Arc<EntityState>,
    receiver: watch::Receiver<Arc<EntityState>>,
}

impl Subscription {
    pub(crate) fn new(receiver: watch::Receiver<Arc<EntityState>>) -> Self {
        let seen = receiver.borrow().clone();
        Self { seen, receiver }
    }

    /// The last state this subscriber has seen.
    pub fn seen(&self) -> &Arc<EntityState> {
        &self.seen
    }

    /// Wait for the next update that actually changed the state.
    ///
    /// Updates that leave every field as it was (an empty `EntityUpdate`,
    /// or the device repeating itself) are skipped. Returns `None` once
    /// the entity has been dropped.
    pub async fn next_change(&mut self) -> Option<StateChange> {
        loop {
            self.receiver.changed().await.ok()?;
            let current = self.receiver.borrow_and_update().clone();
            if *current == *self.seen {
                continue;
            }
            let previous = std::mem::replace(&mut self.seen, Arc::clone(&current));
            return Some(StateChange { previous, current });
        }
    }

    /// Display values as the device reports them.
    ///
    /// Yields the current value first if one is known, then a value each
    /// time the raw value changes. Availability and access updates do not
    /// produce items.
    pub fn into_values(self) -> ValueStream {
        ValueStream {
            inner: WatchStream::new(self.receiver),
            last_raw: None,
        }
    }
}

// ── ValueStream ─────────────────────────────────────────────────────

/// `Stream` of display values, deduplicated on the raw value.
pub struct ValueStream {
    inner: WatchStream<Arc<EntityState>>,
    last_raw: Option<Value>,
}

impl Stream for ValueStream {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let Some(state) = ready!(Pin::new(&mut self.inner).poll_next(cx)) else {
                return Poll::Ready(None);
            };
            let (Some(raw), Some(value)) = (&state.value_raw, &state.value) else {
                continue;
            };
            if self.last_raw.as_ref() == Some(raw) {
                continue;
            }
            self.last_raw = Some(raw.clone());
            return Poll::Ready(Some(value.clone()));
        }
    }
}
