use support_desk_actor::{Actor, Event};
use tokio::sync::oneshot;

use crate::error::Error;

/// Where an event sends the outcome of the operation that posted it.
pub type Reply<T> = oneshot::Sender<Result<T, Error>>;

/// Posts the event built by `make_event` right away and returns a future
/// that resolves once the actor replies.
///
/// The event is applied even if the returned future is dropped.
pub fn post_with_reply<S, T, E, F>(
    actor: &Actor<S>,
    make_event: F,
) -> impl Future<Output = Result<T, Error>> + Send + 'static
where
    S: Send + 'static,
    T: Send + 'static,
    E: Event<S> + 'static,
    F: FnOnce(Reply<T>) -> E,
{
    let (reply_tx, reply_rx) = oneshot::channel();
    let posted = actor.post(make_event(reply_tx));
    async move {
        if posted.is_err() {
            return Err(Error::closed());
        }
        // The actor dropped the reply without answering, which only
        // happens while it is shutting down.
        reply_rx.await.unwrap_or_else(|_| Err(Error::closed()))
    }
}
