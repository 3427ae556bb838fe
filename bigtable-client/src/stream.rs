use std::{
    fmt, mem,
    pin::Pin,
    task::{Context, Poll},
};

use futures::stream::{FusedStream, Stream};

use crate::{
    error::TransportResult,
    method::Method,
    transport::TransportStream,
};

type Launcher<T> = Box<dyn FnOnce() -> TransportResult<TransportStream<T>>>;

/// Where a [ResponseStream] is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Returned to the caller, the transport hasn't been invoked yet
    Created,
    /// The transport was invoked and may produce more responses
    Emitting,
    /// All responses were delivered
    Completed,
    /// The transport failed, its error was delivered
    Terminated,
}

enum Phase<T> {
    Created(Launcher<T>),
    Emitting(TransportStream<T>),
    Completed,
    Terminated,
}

/// The responses of a server streaming call.
///
/// The transport is only invoked once the stream is first polled. Responses
/// are yielded in the order the transport produced them. A transport failure
/// is yielded once as an `Err`, after which the stream is exhausted.
pub struct ResponseStream<T> {
    method: Method,
    phase: Phase<T>,
}

impl<T> ResponseStream<T> {
    pub(crate) fn new<F>(method: Method, launch: F) -> Self
    where
        F: FnOnce() -> TransportResult<TransportStream<T>> + 'static,
    {
        Self {
            method,
            phase: Phase::Created(Box::new(launch)),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn state(&self) -> StreamState {
        match self.phase {
            Phase::Created(_) => StreamState::Created,
            Phase::Emitting(_) => StreamState::Emitting,
            Phase::Completed => StreamState::Completed,
            Phase::Terminated => StreamState::Terminated,
        }
    }
}

impl<T> Stream for ResponseStream<T> {
    type Item = TransportResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match mem::replace(&mut this.phase, Phase::Terminated) {
                Phase::Created(launch) => match launch() {
                    Ok(stream) => {
                        trace!("Transport stream started"; "method" => this.method.name());
                        this.phase = Phase::Emitting(stream);
                    }
                    Err(e) => {
                        debug!("Transport failed to start stream"; "method" => this.method.name(), "error" => %e);
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Phase::Emitting(mut stream) => {
                    return match stream.as_mut().poll_next(cx) {
                        Poll::Pending => {
                            this.phase = Phase::Emitting(stream);
                            Poll::Pending
                        }
                        Poll::Ready(Some(Ok(item))) => {
                            this.phase = Phase::Emitting(stream);
                            Poll::Ready(Some(Ok(item)))
                        }
                        Poll::Ready(Some(Err(e))) => {
                            debug!("Transport stream failed"; "method" => this.method.name(), "error" => %e);
                            Poll::Ready(Some(Err(e)))
                        }
                        Poll::Ready(None) => {
                            trace!("Transport stream completed"; "method" => this.method.name());
                            this.phase = Phase::Completed;
                            Poll::Ready(None)
                        }
                    };
                }
                Phase::Completed => {
                    this.phase = Phase::Completed;
                    return Poll::Ready(None);
                }
                Phase::Terminated => return Poll::Ready(None),
            }
        }
    }
}

impl<T> FusedStream for ResponseStream<T> {
    fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Completed | Phase::Terminated)
    }
}

impl<T> fmt::Debug for ResponseStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("method", &self.method)
            .field("state", &self.state())
            .finish()
    }
}
