use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::events::LifecycleEvent;

/// Handle used by the engine integration to feed lifecycle events.
#[derive(Clone)]
pub struct EventSender(pub(crate) UnboundedSender<LifecycleEvent>);

impl EventSender {
    pub fn send(&self, event: LifecycleEvent) {
        if self.0.send(event).is_err() {
            warn!("Lifecycle event dropped, the event loop is gone");
        }
    }
}

/// Stream of queued lifecycle events. Only one instance can be active at a
/// time, the receiver is handed back when it is dropped.
pub struct EventStream<'a> {
    mutex: &'a Mutex<Option<UnboundedReceiver<LifecycleEvent>>>,
    recv: Option<UnboundedReceiver<LifecycleEvent>>
}

impl<'a> EventStream<'a> {
    pub(crate) fn new(mutex: &'a Mutex<Option<UnboundedReceiver<LifecycleEvent>>>) -> Option<Self> {
        let recv = mutex.lock().take()?;

        Some(Self {
            mutex,
            recv: Some(recv)
        })
    }
}

impl<'a> Stream for EventStream<'a> {
    type Item = LifecycleEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut().recv.as_mut() {
            Some(recv) => recv.poll_recv(cx),
            None => Poll::Ready(None)
        }
    }
}

impl<'a> Drop for EventStream<'a> {
    fn drop(&mut self) {
        *self.mutex.lock() = self.recv.take();
    }
}
