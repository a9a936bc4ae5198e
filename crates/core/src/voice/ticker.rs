use std::time::Duration;

use support_desk_actor::WeakActor;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use super::state::{Tick, VoiceState};

/// How often the elapsed time of an active call advances.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Posts a [`Tick`] to the voice actor once per [`TICK_PERIOD`], starting
/// one period after it is created.
///
/// The ticker holds only a weak handle, and its task is aborted when the
/// ticker is dropped.
pub struct Ticker {
    task: JoinHandle<()>,
}

impl Ticker {
    pub fn start(actor: WeakActor<VoiceState>, activation: u64) -> Self {
        let task = tokio::spawn(async move {
            let mut interval =
                interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                if actor.post(Tick { activation }).is_err() {
                    break;
                }
            }
            trace!("ticker for activation {activation} stopped");
        });
        Self { task }
    }
}

impl Drop for Ticker {
    #[inline]
    fn drop(&mut self) {
        self.task.abort();
    }
}
