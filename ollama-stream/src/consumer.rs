//! Async driver that feeds a transport byte stream into a [`StreamSession`].

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::event::{DomainEvent, SessionStatus};
use crate::protocol::Protocol;
use crate::session::StreamSession;

/// A running session as seen by the caller.
///
/// Poll it as a [`Stream`] of [`DomainEvent`]s. The session only advances
/// while it is being polled; the status can be observed from elsewhere
/// through [`StreamHandle::status_watch`].
pub struct StreamHandle {
    protocol: Protocol,
    events: Pin<Box<dyn Stream<Item = DomainEvent> + Send>>,
    cancel: CancellationToken,
    status: watch::Receiver<SessionStatus>,
}

impl StreamHandle {
    /// Protocol of the underlying session.
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Request cancellation. Takes effect at the next read boundary; no
    /// event is delivered after it has been observed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this session when triggered.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current status. [`SessionStatus::Active`] until the loop exits.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Receiver that observes the status from another task.
    #[must_use]
    pub fn status_watch(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Consume all remaining events and return them with the final status.
    pub async fn drain(mut self) -> (Vec<DomainEvent>, SessionStatus) {
        let mut events = Vec::new();
        while let Some(event) = self.events.next().await {
            events.push(event);
        }
        let status = self.status();
        (events, status)
    }
}

impl Stream for StreamHandle {
    type Item = DomainEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("protocol", &self.protocol)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

enum Read<T> {
    Cancelled,
    Item(Option<T>),
}

/// Owns the sending side of the status channel.
///
/// Dropped while the status is still `Active` (the handle went away
/// mid-stream), it publishes `Cancelled`.
struct StatusPublisher(watch::Sender<SessionStatus>);

impl StatusPublisher {
    fn publish(&self, status: SessionStatus) {
        self.0.send_replace(status);
    }
}

impl Drop for StatusPublisher {
    fn drop(&mut self) {
        self.0.send_if_modified(|status| {
            if *status == SessionStatus::Active {
                *status = SessionStatus::Cancelled;
                true
            } else {
                false
            }
        });
    }
}

/// Drive `transport` as a `protocol` session.
///
/// The transport is polled only from the returned handle. It is dropped as
/// soon as the session ends: before the terminal event is yielded, on a read
/// error, at end of stream, or when `cancel` fires. The terminal status is
/// published before the terminal event reaches the caller; dropping the
/// handle mid-stream publishes [`SessionStatus::Cancelled`].
pub fn consume<S, E>(protocol: Protocol, transport: S, cancel: CancellationToken) -> StreamHandle
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let (status_tx, status_rx) = watch::channel(SessionStatus::Active);
    let publisher = StatusPublisher(status_tx);
    let token = cancel.clone();

    let events = async_stream::stream! {
        let mut session = StreamSession::new(protocol);
        let mut cancelled = false;
        let mut transport = Some(Box::pin(transport));

        'read: loop {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(source) = transport.as_mut() else {
                break;
            };

            let read = tokio::select! {
                biased;
                () = token.cancelled() => Read::Cancelled,
                item = source.next() => Read::Item(item),
            };

            let produced = match read {
                Read::Cancelled => {
                    cancelled = true;
                    break;
                }
                Read::Item(Some(Ok(chunk))) => session.feed(&chunk),
                Read::Item(Some(Err(e))) => session.fail(format!("stream read error: {e}")),
                Read::Item(None) => session.finish(),
            };

            for event in produced {
                if token.is_cancelled() {
                    cancelled = true;
                    break 'read;
                }
                if event.is_terminal() {
                    transport = None;
                    publisher.publish(session.status());
                }
                yield event;
            }

            if session.status().is_terminal() {
                break;
            }
        }
        drop(transport);

        let status = if cancelled {
            session.cancel();
            SessionStatus::Cancelled
        } else {
            session.status()
        };
        tracing::debug!(
            protocol = %protocol,
            ?status,
            text_len = protocol.accumulates_text().then(|| session.text().len()),
            decode_errors = session.decode_errors(),
            "stream session finished"
        );
        publisher.publish(status);
    };

    StreamHandle {
        protocol,
        events: Box::pin(events),
        cancel,
        status: status_rx,
    }
}
