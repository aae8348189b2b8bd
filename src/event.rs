//! Gameplay events delivered to a storyboard.
//!
//! The game publishes events on a [`GameEventBus`]; a storyboard holds a [`Subscription`] and
//! drains it once per frame. Dropping the subscription unregisters it, the bus forgets about it
//! on its next publish.

use std::{
    cell::RefCell,
    sync::mpsc::{Receiver, Sender, TryRecvError, channel},
};

use gametime::TimeSpan;

use crate::chart::ChartNote;

/// Scoring state of the play at the moment of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GameState {
    /// Current combo.
    pub combo: i32,
    /// Current score.
    pub score: i32,
}

/// An event of the play session.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A note was cleared.
    NoteClear {
        /// The cleared note.
        note: ChartNote,
        /// Scoring state right after the clear.
        state: GameState,
    },
    /// A frame passed. Holds the time elapsed since the chart started.
    Update(TimeSpan),
    /// The play session ended.
    Disposed,
}

/// Seconds in `span`, as used by compiled state times.
#[must_use]
pub fn span_seconds(span: TimeSpan) -> f32 {
    (span.as_nanos() as f64 / 1_000_000_000.0) as f32
}

/// Identifier of a subscription on a [`GameEventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// The receiving end of a subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<GameEvent>,
    /// Events received by [`Subscription::is_closed`] and not drained yet.
    pending: RefCell<Vec<GameEvent>>,
}

impl Subscription {
    /// The id to unsubscribe with.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Takes every event published since the last call, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = self.pending.take();
        events.extend(self.receiver.try_iter());
        events
    }

    /// Whether the bus has dropped this subscription. Events still queued stay drainable.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let mut pending = self.pending.borrow_mut();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => pending.push(event),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }
}

/// Fan-out of gameplay events to every subscriber.
#[derive(Debug, Default)]
pub struct GameEventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<GameEvent>)>,
}

impl GameEventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (sender, receiver) = channel();
        self.subscribers.push((id, sender));
        Subscription {
            id,
            receiver,
            pending: RefCell::default(),
        }
    }

    /// Unregisters a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscriber, _)| *subscriber != id);
        self.subscribers.len() != before
    }

    /// Sends `event` to every live subscriber and forgets the dropped ones.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&mut self, event: &GameEvent) -> usize {
        self.subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        self.subscribers.len()
    }

    /// Number of registered subscribers, including dropped ones not yet forgotten.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
