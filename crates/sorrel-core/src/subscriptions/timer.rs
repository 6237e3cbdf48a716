use crate::subscription::{SubscriptionId, SubscriptionSource};
use futures::stream::BoxStream;
use std::time::{Duration, Instant};

/// A one-shot delay that fires once after the specified duration.
///
/// Emits a single [`Instant`] when the delay elapses, then the stream
/// completes. Unkeyed delays are identified by their duration; give each
/// concurrently pending delay its own [`key`](After::keyed) when several may
/// share a duration.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use sorrel_core::subscriptions::After;
/// use sorrel_core::subscription::subscribe;
///
/// let sub = subscribe(After::new(Duration::from_secs(5)).keyed(toast_id))
///     .map(move |at| Msg::Expired { id: toast_id, at });
/// ```
pub struct After {
    /// How long to wait before firing.
    pub duration: Duration,
    key: Option<u64>,
}

impl After {
    /// Create a new one-shot delay for the given duration.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            key: None,
        }
    }

    /// Identify this delay by `key` instead of by its duration.
    pub fn keyed(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }
}

impl SubscriptionSource for After {
    type Output = Instant;

    fn id(&self) -> SubscriptionId {
        let discriminant = self
            .key
            .unwrap_or_else(|| self.duration.as_nanos() as u64);
        SubscriptionId::new::<Self>(discriminant)
    }

    fn stream(self) -> BoxStream<'static, Instant> {
        let stream = futures::stream::once(async move {
            tokio::time::sleep(self.duration).await;
            Instant::now()
        });
        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_delays_differ_by_key() {
        let a = After::new(Duration::from_secs(5)).keyed(1);
        let b = After::new(Duration::from_secs(5)).keyed(2);
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn fires_once_after_the_delay() {
        use futures::StreamExt;

        let start = Instant::now();
        let mut stream = After::new(Duration::from_millis(20)).keyed(7).stream();
        let at = stream.next().await.expect("delay fires");
        assert!(at >= start + Duration::from_millis(20));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn unkeyed_delays_share_identity_by_duration() {
        let a = After::new(Duration::from_millis(10));
        let b = After::new(Duration::from_millis(10));
        assert_eq!(a.id(), b.id());
    }
}
