mod builder;
mod state;
mod ticker;

use std::fmt::{self, Display};

use support_desk_actor::Actor;
use support_desk_gateway::VoiceSessionEnded;
use tokio::sync::watch;

pub use builder::VoiceSessionBuilder;
use state::{EndSession, StartSession, VoiceState};

use crate::error::Error;
use crate::reply::post_with_reply;

/// Reason sent when the user hangs up.
pub const USER_ENDED_REASON: &str = "user_ended";

/// Lifecycle of a voice call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoiceStatus {
    /// No call.
    #[default]
    Idle,
    /// Waiting for the gateway to place the call.
    Starting,
    /// The call is live.
    Active,
    /// Waiting for the gateway to hang up.
    Ending,
}

impl Display for VoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceStatus::Idle => write!(f, "idle"),
            VoiceStatus::Starting => write!(f, "starting"),
            VoiceStatus::Active => write!(f, "active"),
            VoiceStatus::Ending => write!(f, "ending"),
        }
    }
}

/// A point-in-time view of the voice call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceSnapshot {
    /// Where the call is in its lifecycle.
    pub status: VoiceStatus,
    /// The gateway's id for the call, present while it is active or
    /// ending.
    pub session_id: Option<String>,
    /// The number being called, present from start until the call ends.
    pub phone_number: Option<String>,
    /// Whole seconds the call has been active.
    pub elapsed_seconds: u64,
}

impl VoiceSnapshot {
    /// Returns whether the manager is waiting for the gateway.
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self.status, VoiceStatus::Starting | VoiceStatus::Ending)
    }

    /// Formats the elapsed time as `MM:SS`.
    ///
    /// Minutes keep counting past an hour, e.g. `61:05`.
    pub fn elapsed_display(&self) -> String {
        let minutes = self.elapsed_seconds / 60;
        let seconds = self.elapsed_seconds % 60;
        format!("{minutes:02}:{seconds:02}")
    }

    fn set_status(&mut self, status: VoiceStatus) {
        debug!("call status: {} -> {status}", self.status);
        self.status = status;
    }

    fn reset(&mut self) {
        self.set_status(VoiceStatus::Idle);
        self.session_id = None;
        self.phone_number = None;
        self.elapsed_seconds = 0;
    }

    fn begin_start(&mut self, phone_number: &str) -> Result<(), Error> {
        if self.status != VoiceStatus::Idle {
            warn!("cannot start a call while {}", self.status);
            let reason = format!("a call is already {}", self.status);
            return Err(Error::usage(reason));
        }
        self.set_status(VoiceStatus::Starting);
        self.phone_number = Some(phone_number.to_owned());
        Ok(())
    }

    fn begin_end(&mut self) -> Result<String, Error> {
        let session_id = match (self.status, &self.session_id) {
            (VoiceStatus::Active, Some(session_id)) => session_id.clone(),
            (status, _) => {
                warn!("cannot end a call while {status}");
                let reason = format!("no call to end, status is {status}");
                return Err(Error::usage(reason));
            }
        };
        // The elapsed time freezes while hanging up.
        self.set_status(VoiceStatus::Ending);
        Ok(session_id)
    }
}

/// Drives a single outbound voice call.
///
/// Only one call exists at a time. A call moves from idle to starting
/// when [`start`](Self::start) is accepted, becomes active once the
/// gateway confirms it, and goes back to idle through ending when
/// [`end`](Self::end) completes. While the call is active, the elapsed
/// time advances once per second.
///
/// Both operations check and move the status before they return, so a
/// second `start` or `end` is rejected right away. Requests run on the
/// manager's own task, like [`ChatManager`](crate::ChatManager)'s.
pub struct VoiceSessionManager {
    actor: Actor<VoiceState>,
    snapshot_tx: watch::Sender<VoiceSnapshot>,
}

impl VoiceSessionManager {
    /// Calls `phone_number` and resolves to the new session id.
    ///
    /// The number is trimmed, and an empty one fails with a `Validation`
    /// error. Starting fails with a `Usage` error unless the manager is
    /// idle; otherwise the status is `Starting` when this returns. If the
    /// gateway fails, the manager returns to idle and the future resolves
    /// to the `Remote` error.
    pub fn start<S: AsRef<str>>(
        &self,
        phone_number: S,
    ) -> impl Future<Output = Result<String, Error>> + Send + 'static {
        let phone_number = phone_number.as_ref().trim();
        let accepted = if phone_number.is_empty() {
            warn!("refusing to call an empty phone number");
            Err(Error::validation("phone number is empty"))
        } else {
            self.transition(|snapshot| snapshot.begin_start(phone_number))
        };
        let pending = accepted.map(|()| {
            let phone_number = phone_number.to_owned();
            post_with_reply(&self.actor, |reply| StartSession {
                phone_number,
                reply,
            })
        });
        async move {
            match pending {
                Ok(pending) => pending.await,
                Err(err) => Err(err),
            }
        }
    }

    /// Hangs up the active call.
    ///
    /// Fails with a `Usage` error unless a call is active. Otherwise the
    /// status is `Ending` and the elapsed time stops when this returns,
    /// and once the gateway answers the manager is idle again, whether or
    /// not the gateway succeeded.
    pub fn end<S: Into<String>>(
        &self,
        reason: S,
    ) -> impl Future<Output = Result<VoiceSessionEnded, Error>> + Send + 'static
    {
        let reason = reason.into();
        let pending =
            self.transition(VoiceSnapshot::begin_end).map(|session_id| {
                post_with_reply(&self.actor, |reply| EndSession {
                    session_id,
                    reason,
                    reply,
                })
            });
        async move {
            match pending {
                Ok(pending) => pending.await,
                Err(err) => Err(err),
            }
        }
    }

    /// Returns the latest snapshot of the call.
    #[inline]
    pub fn snapshot(&self) -> VoiceSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Returns where the call is in its lifecycle.
    #[inline]
    pub fn status(&self) -> VoiceStatus {
        self.snapshot_tx.borrow().status
    }

    /// Returns whether the manager is waiting for the gateway.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.snapshot_tx.borrow().is_busy()
    }

    /// Returns a receiver that is notified whenever the snapshot changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<VoiceSnapshot> {
        self.snapshot_tx.subscribe()
    }
}

impl VoiceSessionManager {
    fn spawn_from_builder(builder: VoiceSessionBuilder) -> Self {
        let VoiceSessionBuilder { gateway, caller_id } = builder;

        let snapshot_tx = watch::Sender::new(VoiceSnapshot::default());
        let state = VoiceState {
            gateway,
            caller_id,
            activation: 0,
            ticker: None,
            snapshot_tx: snapshot_tx.clone(),
        };
        Self {
            actor: Actor::spawn(state, "voice"),
            snapshot_tx,
        }
    }

    /// Applies `f` to the snapshot and notifies subscribers if it
    /// succeeded. A failed transition leaves the snapshot untouched.
    fn transition<T>(
        &self,
        f: impl FnOnce(&mut VoiceSnapshot) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut outcome = Err(Error::closed());
        self.snapshot_tx.send_if_modified(|snapshot| {
            outcome = f(snapshot);
            outcome.is_ok()
        });
        outcome
    }
}
