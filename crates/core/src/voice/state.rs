use support_desk_actor::{Actor, Event};
use support_desk_gateway::{
    EndVoiceRequest, StartVoiceRequest, VoiceSessionEnded, VoiceSessionStarted,
};
use tokio::sync::watch;

use super::ticker::Ticker;
use super::{VoiceSnapshot, VoiceStatus};
use crate::error::Error;
use crate::gateway_client::GatewayClient;
use crate::reply::Reply;

/// State owned by the voice actor.
///
/// The call itself lives in the snapshot; the manager moves it into
/// `Starting` and `Ending`, the actor does everything else.
///
/// `activation` is bumped every time a call becomes active. Ticks carry
/// the activation they were scheduled for, so a tick that was already
/// queued when its call ended never reaches the next call.
pub struct VoiceState {
    pub(super) gateway: GatewayClient,
    pub(super) caller_id: String,
    pub(super) activation: u64,
    pub(super) ticker: Option<Ticker>,
    pub(super) snapshot_tx: watch::Sender<VoiceSnapshot>,
}

impl VoiceState {
    fn reset(&mut self) {
        self.ticker = None;
        self.snapshot_tx.send_modify(VoiceSnapshot::reset);
    }
}

#[derive(Debug)]
pub struct StartSession {
    pub phone_number: String,
    pub reply: Reply<String>,
}

impl Event<VoiceState> for StartSession {
    fn apply(self, state: &mut VoiceState, actor: &Actor<VoiceState>) {
        let fut = state.gateway.start_voice_session(StartVoiceRequest {
            phone_number: self.phone_number,
            caller_id: state.caller_id.clone(),
        });
        let actor = actor.clone();
        let reply = self.reply;
        tokio::spawn(async move {
            let response = fut.await;
            actor.post(StartFinished { response, reply }).ok();
        });
    }
}

#[derive(Debug)]
struct StartFinished {
    response: Result<VoiceSessionStarted, Error>,
    reply: Reply<String>,
}

impl Event<VoiceState> for StartFinished {
    fn apply(self, state: &mut VoiceState, actor: &Actor<VoiceState>) {
        let started = match self.response {
            Ok(started) => started,
            Err(err) => {
                warn!("failed to start a call: {err}");
                state.reset();
                self.reply.send(Err(err)).ok();
                return;
            }
        };

        debug!("call {} is live", started.session_id);
        state.activation += 1;
        state.ticker = Some(Ticker::start(actor.downgrade(), state.activation));
        state.snapshot_tx.send_modify(|snapshot| {
            snapshot.set_status(VoiceStatus::Active);
            snapshot.session_id = Some(started.session_id.clone());
            snapshot.elapsed_seconds = 0;
        });
        self.reply.send(Ok(started.session_id)).ok();
    }
}

#[derive(Debug)]
pub struct EndSession {
    pub session_id: String,
    pub reason: String,
    pub reply: Reply<VoiceSessionEnded>,
}

impl Event<VoiceState> for EndSession {
    fn apply(self, state: &mut VoiceState, actor: &Actor<VoiceState>) {
        state.ticker = None;

        let fut = state.gateway.end_voice_session(EndVoiceRequest {
            session_id: self.session_id,
            reason: self.reason,
        });
        let actor = actor.clone();
        let reply = self.reply;
        tokio::spawn(async move {
            let response = fut.await;
            actor.post(EndFinished { response, reply }).ok();
        });
    }
}

#[derive(Debug)]
struct EndFinished {
    response: Result<VoiceSessionEnded, Error>,
    reply: Reply<VoiceSessionEnded>,
}

impl Event<VoiceState> for EndFinished {
    fn apply(self, state: &mut VoiceState, _actor: &Actor<VoiceState>) {
        // The call is over either way.
        if let Err(err) = &self.response {
            warn!("failed to end the call cleanly: {err}");
        }
        state.reset();
        self.reply.send(self.response).ok();
    }
}

#[derive(Debug)]
pub struct Tick {
    pub activation: u64,
}

impl Event<VoiceState> for Tick {
    #[inline]
    fn apply(self, state: &mut VoiceState, _actor: &Actor<VoiceState>) {
        if self.activation != state.activation {
            trace!("dropping a stale tick");
            return;
        }
        // Hanging up stops the clock before the ticker is dropped.
        state.snapshot_tx.send_if_modified(|snapshot| {
            if snapshot.status != VoiceStatus::Active {
                return false;
            }
            snapshot.elapsed_seconds += 1;
            true
        });
    }
}
