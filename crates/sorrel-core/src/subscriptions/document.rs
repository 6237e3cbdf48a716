use crate::event::InputEvent;
use crate::subscription::{Subscription, SubscriptionId};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// Marker type identifying document-level listeners.
///
/// A document listener sees every input event regardless of where it
/// happened, the way a handler attached to the whole screen would. The
/// `key` passed to [`document_events`] is usually the owning widget's
/// instance id; listeners with different keys run independently.
pub struct DocumentEvents;

static NEXT_LISTENER_KEY: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique key for [`document_events`].
///
/// Every widget instance that listens at document level takes its key from
/// here, so two listeners never share a subscription id.
pub fn listener_key() -> u64 {
    NEXT_LISTENER_KEY.fetch_add(1, Ordering::Relaxed)
}

/// Create a document-level listener that maps each input event through
/// `map`.
///
/// The listener attaches to the input bus when the subscription starts and
/// detaches when the runtime stops it, so declaring it only from a particular
/// state scopes the listener to that state.
///
/// # Example
///
/// ```rust,ignore
/// fn subscriptions(&self) -> Vec<Subscription<Msg>> {
///     if !self.open {
///         return vec![];
///     }
///     vec![document_events(self.id, |event| {
///         event.is_escape().then_some(Msg::Close)
///     })]
/// }
/// ```
pub fn document_events<Msg: Send + 'static>(
    key: u64,
    map: impl Fn(InputEvent) -> Option<Msg> + Send + Sync + 'static,
) -> Subscription<Msg> {
    let map = Arc::new(map);
    Subscription::from_bus(SubscriptionId::new::<DocumentEvents>(key), move |bus| {
        let stream = BroadcastStream::new(bus.subscribe()).filter_map(move |result| {
            let map = map.clone();
            async move {
                match result {
                    Ok(event) => map(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(key, skipped, "document listener lagged behind input");
                        None
                    }
                }
            }
        });
        Box::pin(stream)
    })
}
