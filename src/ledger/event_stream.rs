//! Stream of committed catalog events.
//!
//! Subscribers receive events in commit order, for commits made after they
//! subscribed. A subscriber that falls more than the channel capacity behind
//! skips the overwritten events and resumes with the oldest retained one.

use crate::catalog::CatalogEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

/// Events retained for slow subscribers.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Receiving side of a subscription.
pub struct EventStream {
    inner: BroadcastStream<CatalogEvent>,
}

impl Stream for EventStream {
    type Item = CatalogEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                    warn!(skipped, "event subscriber lagged, events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Fan-out of committed events to all live subscribers.
pub struct EventBroadcaster {
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a new subscription.
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            inner: BroadcastStream::new(self.sender.subscribe()),
        }
    }

    /// Deliver an event to every live subscriber. Returns how many received it.
    pub fn publish(&self, event: &CatalogEvent) -> usize {
        // An error only means nobody is subscribed.
        self.sender.send(event.clone()).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
