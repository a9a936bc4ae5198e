use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::{Actor, MailboxClosed};

/// Helper trait for applying boxed events.
pub trait BoxEvent<S>: Send + Debug + 'static {
    fn apply_box(self: Box<Self>, state: &mut S, actor: &Actor<S>);
}

/// An event that an actor applies to its state.
///
/// Events run one at a time on the actor task, in the order they were
/// posted, and each one runs to completion before the next starts. An
/// event must not block; long-running work should be spawned and report
/// back by posting another event through `actor`.
pub trait Event<S>: BoxEvent<S> {
    /// Applies the event with exclusive access to the actor's state.
    fn apply(self, state: &mut S, actor: &Actor<S>);
}

impl<S, E: Event<S>> BoxEvent<S> for E {
    #[inline]
    fn apply_box(self: Box<Self>, state: &mut S, actor: &Actor<S>) {
        (*self).apply(state, actor)
    }
}

impl<S, E: Event<S> + ?Sized> Event<S> for Box<E> {
    #[inline]
    fn apply(self, state: &mut S, actor: &Actor<S>) {
        self.apply_box(state, actor)
    }
}

pub type EventReceiver<S> = mpsc::UnboundedReceiver<Box<dyn Event<S>>>;

/// The sending half shared by all strong handles of one actor.
///
/// Dropping the last `Mailbox` closes the channel, which is what stops
/// the actor task.
pub struct Mailbox<S> {
    event_tx: mpsc::UnboundedSender<Box<dyn Event<S>>>,
}

impl<S: Send + 'static> Mailbox<S> {
    #[inline]
    pub fn new() -> (Self, EventReceiver<S>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Mailbox { event_tx }, event_rx)
    }

    #[inline]
    pub fn post(&self, event: Box<dyn Event<S>>) -> Result<(), MailboxClosed> {
        self.event_tx.send(event).map_err(|_| MailboxClosed)
    }
}
