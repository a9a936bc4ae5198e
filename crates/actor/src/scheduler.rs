use std::sync::Weak;

use crate::{Actor, Event};
use crate::mailbox::{EventReceiver, Mailbox};

pub async fn run_actor<S: Send + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    mut event_rx: EventReceiver<S>,
) {
    debug!("started");
    while let Some(event) = event_rx.recv().await {
        trace!("received event: {event:?}");

        // Events may still be buffered after the last handle went away.
        // Nobody can observe their effects anymore, so drop them.
        let Some(mailbox) = mailbox.upgrade() else {
            warn!("all handles have been dropped, discarding {event:?}");
            break;
        };

        let apply_span = trace_span!("apply event");
        apply_span.in_scope(|| {
            event.apply(&mut state, &Actor::from_mailbox(mailbox));
            trace!("finished");
        });
    }
    debug!("will terminate");
}
