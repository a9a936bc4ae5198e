mod builder;
mod state;

use support_desk_actor::Actor;
use tokio::sync::watch;

pub use builder::ChatManagerBuilder;
use state::{ChatState, SendTurn};

use crate::conversation::Message;
use crate::error::Error;
use crate::reply::post_with_reply;

/// A point-in-time view of the conversation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatSnapshot {
    /// The id the gateway assigned to the conversation, once known.
    pub conversation_id: Option<String>,
    /// All messages, oldest first.
    pub messages: Vec<Message>,
    /// Whether a chat turn is waiting for the gateway.
    pub is_busy: bool,
    /// Bumped on every clear. Turns remember the generation they were
    /// sent in, and their answers are dropped once it is over.
    generation: u64,
    /// Turns sent but not yet answered, failed or discarded.
    pending_turns: usize,
}

impl ChatSnapshot {
    fn begin_turn(&mut self) {
        self.pending_turns += 1;
        self.is_busy = true;
    }

    fn end_turn(&mut self) {
        self.pending_turns = self.pending_turns.saturating_sub(1);
        self.is_busy = self.pending_turns > 0;
    }
}

/// Keeps the conversation with the remote assistant.
///
/// Every user message is appended as soon as it is sent, before the
/// gateway answers, and it stays there even if the turn fails. At most
/// one turn is in flight at a time; messages sent while waiting are
/// queued and go out in order once the previous answer arrives.
///
/// Local changes are visible as soon as a method returns: the user
/// message and the busy flag right after [`send_message`], the empty
/// conversation right after [`clear_conversation`]. Requests run on the
/// manager's own task and fold their answers in when they arrive.
///
/// [`send_message`]: Self::send_message
/// [`clear_conversation`]: Self::clear_conversation
pub struct ChatManager {
    actor: Actor<ChatState>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
}

impl ChatManager {
    /// Sends a user message and returns a future for the assistant's
    /// answer.
    ///
    /// Surrounding whitespace is trimmed, and a message that is empty
    /// afterwards fails with a `Validation` error without touching the
    /// conversation. Otherwise the message is appended before this method
    /// returns, and the turn is queued, so dropping the future does not
    /// cancel it.
    ///
    /// The future fails with a `Remote` error if the gateway failed, and
    /// with `Discarded` if the conversation was cleared before the answer
    /// arrived. In both cases the user message stays where it was, or is
    /// gone with the rest of a cleared conversation.
    pub fn send_message<S: AsRef<str>>(
        &self,
        text: S,
    ) -> impl Future<Output = Result<Message, Error>> + Send + 'static {
        let text = text.as_ref().trim();
        let mut pending = None;
        if text.is_empty() {
            warn!("refusing to send an empty message");
        } else {
            let text = text.to_owned();
            // Posting under the lock keeps the queue in message order.
            self.snapshot_tx.send_modify(|snapshot| {
                snapshot.messages.push(Message::user(text.clone()));
                snapshot.begin_turn();
                debug!("appended user message #{}", snapshot.messages.len());
                let generation = snapshot.generation;
                pending = Some(post_with_reply(&self.actor, move |reply| {
                    SendTurn {
                        text,
                        generation,
                        reply,
                    }
                }));
            });
        }
        async move {
            match pending {
                Some(pending) => pending.await,
                None => Err(Error::validation("message is empty")),
            }
        }
    }

    /// Drops every message and forgets the conversation id.
    ///
    /// Answers to turns sent before this call are discarded when they
    /// arrive, and turns still waiting in the queue are never sent. The
    /// next message starts a new conversation.
    pub fn clear_conversation(&self) {
        self.snapshot_tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.conversation_id = None;
            snapshot.messages.clear();
            debug!("cleared conversation, generation {}", snapshot.generation);
        });
    }

    /// Returns the latest snapshot of the conversation.
    #[inline]
    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> Vec<Message> {
        self.snapshot_tx.borrow().messages.clone()
    }

    /// Returns the conversation id, once the gateway has assigned one.
    #[inline]
    pub fn conversation_id(&self) -> Option<String> {
        self.snapshot_tx.borrow().conversation_id.clone()
    }

    /// Returns whether a chat turn is waiting for the gateway.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.snapshot_tx.borrow().is_busy
    }

    /// Returns a receiver that is notified whenever the snapshot changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot_tx.subscribe()
    }
}

impl ChatManager {
    fn spawn_from_builder(builder: ChatManagerBuilder) -> Self {
        let ChatManagerBuilder { gateway, caller_id } = builder;

        let snapshot_tx = watch::Sender::new(ChatSnapshot::default());
        let state = ChatState {
            gateway: Some(gateway),
            caller_id,
            queued_turns: Default::default(),
            snapshot_tx: snapshot_tx.clone(),
        };
        Self {
            actor: Actor::spawn(state, "chat"),
            snapshot_tx,
        }
    }
}
