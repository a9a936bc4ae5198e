use std::collections::VecDeque;
use std::fmt::{self, Debug};

use support_desk_actor::{Actor, Event};
use support_desk_gateway::{ChatTurnRequest, ChatTurnResponse};
use tokio::sync::watch;

use super::ChatSnapshot;
use crate::conversation::Message;
use crate::error::Error;
use crate::gateway_client::GatewayClient;
use crate::reply::Reply;

/// State owned by the chat actor.
///
/// The conversation itself lives in the snapshot, which the manager
/// updates too. The actor owns request sequencing: `gateway` is taken
/// while a turn is in flight and put back when its answer arrives, so
/// `None` means a request is out.
///
/// Never borrow `snapshot_tx` inside one of its own `send_modify`
/// closures; the lock is not reentrant.
pub struct ChatState {
    pub(super) gateway: Option<GatewayClient>,
    pub(super) caller_id: String,
    pub(super) queued_turns: VecDeque<QueuedTurn>,
    pub(super) snapshot_tx: watch::Sender<ChatSnapshot>,
}

#[derive(Debug)]
pub struct QueuedTurn {
    text: String,
    generation: u64,
    reply: Reply<Message>,
}

impl ChatState {
    fn dispatch_next_turn(&mut self, actor: &Actor<Self>) {
        let Some(gateway) = self.gateway.take() else {
            // A turn is already in flight. The next one is dispatched
            // automatically when its answer arrives.
            trace!("{} turn(s) waiting", self.queued_turns.len());
            return;
        };

        loop {
            let Some(turn) = self.queued_turns.pop_front() else {
                self.gateway = Some(gateway);
                return;
            };
            let (generation, conversation_id) = {
                let snapshot = self.snapshot_tx.borrow();
                (snapshot.generation, snapshot.conversation_id.clone())
            };
            if turn.generation != generation {
                debug!("dropping a turn queued before the last clear");
                self.finish_turn(turn.reply, Err(Error::discarded()));
                continue;
            }

            let request = ChatTurnRequest {
                message: turn.text,
                conversation_id,
                caller_id: self.caller_id.clone(),
            };
            let fut = gateway.send_chat_turn(request);
            let actor = actor.clone();
            let reply = turn.reply;
            tokio::spawn(async move {
                let response = fut.await;
                actor
                    .post(TurnFinished {
                        gateway,
                        generation,
                        response,
                        reply,
                    })
                    .ok();
            });
            return;
        }
    }

    /// Resolves a turn that never reached the gateway.
    fn finish_turn(
        &self,
        reply: Reply<Message>,
        outcome: Result<Message, Error>,
    ) {
        self.snapshot_tx.send_modify(ChatSnapshot::end_turn);
        reply.send(outcome).ok();
    }
}

fn accept_response(
    snapshot: &mut ChatSnapshot,
    resp: ChatTurnResponse,
) -> Message {
    match snapshot.conversation_id.as_deref() {
        None => {
            debug!("joined conversation {}", resp.conversation_id);
            snapshot.conversation_id = Some(resp.conversation_id.clone());
        }
        Some(id) if id != resp.conversation_id => {
            warn!(
                "ignoring conversation id {}, already in {id}",
                resp.conversation_id
            );
        }
        Some(_) => {}
    }

    let msg = Message::assistant(resp);
    snapshot.messages.push(msg.clone());
    debug!("appended assistant message #{}", snapshot.messages.len());
    msg
}

#[derive(Debug)]
pub struct SendTurn {
    pub text: String,
    pub generation: u64,
    pub reply: Reply<Message>,
}

impl Event<ChatState> for SendTurn {
    #[inline]
    fn apply(self, state: &mut ChatState, actor: &Actor<ChatState>) {
        state.queued_turns.push_back(QueuedTurn {
            text: self.text,
            generation: self.generation,
            reply: self.reply,
        });
        state.dispatch_next_turn(actor);
    }
}

struct TurnFinished {
    gateway: GatewayClient,
    generation: u64,
    response: Result<ChatTurnResponse, Error>,
    reply: Reply<Message>,
}

impl Debug for TurnFinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnFinished")
            .field("generation", &self.generation)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl Event<ChatState> for TurnFinished {
    fn apply(self, state: &mut ChatState, actor: &Actor<ChatState>) {
        let Self {
            gateway,
            generation,
            response,
            reply,
        } = self;
        state.gateway = Some(gateway);

        let mut outcome = Err(Error::discarded());
        state.snapshot_tx.send_modify(|snapshot| {
            snapshot.end_turn();
            if generation != snapshot.generation {
                debug!("discarding an answer from generation {generation}");
                return;
            }
            outcome = match response {
                Ok(resp) => Ok(accept_response(snapshot, resp)),
                Err(err) => {
                    warn!("chat turn failed: {err}");
                    Err(err)
                }
            };
        });

        state.dispatch_next_turn(actor);
        reply.send(outcome).ok();
    }
}
