use std::sync::{Arc, Weak};

use tracing::Instrument;

use crate::mailbox::Mailbox;
use crate::scheduler::run_actor;
use crate::{Event, MailboxClosed};

/// Strong handle to an actor.
///
/// The actor task keeps running as long as at least one strong handle
/// exists. Cloning a handle is cheap.
pub struct Actor<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + 'static> Actor<S> {
    /// Moves `state` onto a newly spawned task and returns a handle to it.
    ///
    /// `label` is attached to the task's tracing span.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(state: S, label: &'static str) -> Self {
        let (mailbox, event_rx) = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, event_rx)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S>>) -> Self {
        Self { mailbox }
    }

    /// Posts an event to the actor.
    #[inline]
    pub fn post<E: Event<S> + 'static>(
        &self,
        event: E,
    ) -> Result<(), MailboxClosed> {
        self.mailbox.post(Box::new(event))
    }

    /// Creates a weak handle that does not keep the actor alive.
    #[inline]
    pub fn downgrade(&self) -> WeakActor<S> {
        WeakActor {
            mailbox: Arc::downgrade(&self.mailbox),
        }
    }
}

impl<S> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

/// Weak handle to an actor, see [`Actor::downgrade`].
pub struct WeakActor<S> {
    mailbox: Weak<Mailbox<S>>,
}

impl<S: Send + 'static> WeakActor<S> {
    /// Posts an event if the actor is still alive.
    #[inline]
    pub fn post<E: Event<S> + 'static>(
        &self,
        event: E,
    ) -> Result<(), MailboxClosed> {
        let mailbox = self.mailbox.upgrade().ok_or(MailboxClosed)?;
        mailbox.post(Box::new(event))
    }

    /// Attempts to upgrade to a strong handle.
    #[inline]
    pub fn upgrade(&self) -> Option<Actor<S>> {
        self.mailbox.upgrade().map(Actor::from_mailbox)
    }
}

impl<S> Clone for WeakActor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Weak::clone(&self.mailbox),
        }
    }
}
