//! Outbound handle onto a peer connection.
//!
//! Each peer connection is owned by a single writer task. Everything else
//! talks to it through a [`PeerLink`]: an mpsc sender plus a shared flag that
//! the writer flips once the transport is ready and back when it goes away.
//! Sends never wait: a link that is not open or whose queue is full rejects
//! the message immediately, so a stalled peer cannot stall its caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Errors raised when pushing a message onto a link.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The peer has not finished connecting, or has already gone away
    #[error("{0} peer is not open")]
    NotOpen(&'static str),

    /// The writer task dropped its receiver
    #[error("{0} peer writer has shut down")]
    Closed(&'static str),

    /// The writer is not keeping up with its queue
    #[error("{0} peer queue is full")]
    Full(&'static str),
}

/// Commands consumed by a peer's writer task.
#[derive(Debug)]
pub enum LinkCommand<M> {
    /// Serialize and transmit a message
    Send(M),
    /// Close the transport
    Close,
}

/// Sending half of a peer connection.
#[derive(Debug)]
pub struct PeerLink<M> {
    name: &'static str,
    tx: mpsc::Sender<LinkCommand<M>>,
    open: Arc<AtomicBool>,
}

impl<M> Clone for PeerLink<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
            open: self.open.clone(),
        }
    }
}

impl<M> PeerLink<M> {
    /// Create a link and the receiver its writer task drains.
    ///
    /// The link starts closed; the writer calls [`LinkReceiver::mark_open`]
    /// once its transport is usable.
    pub fn channel(name: &'static str, capacity: usize) -> (Self, LinkReceiver<M>) {
        let (tx, rx) = mpsc::channel(capacity);
        let open = Arc::new(AtomicBool::new(false));
        (
            Self {
                name,
                tx,
                open: open.clone(),
            },
            LinkReceiver { rx, open },
        )
    }

    /// Whether messages sent now would reach the transport.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    /// Queue a message for the peer without waiting for capacity.
    pub fn send(&self, message: M) -> Result<(), LinkError> {
        if !self.is_open() {
            return Err(LinkError::NotOpen(self.name));
        }
        self.tx
            .try_send(LinkCommand::Send(message))
            .map_err(|e| match e {
                TrySendError::Full(_) => LinkError::Full(self.name),
                TrySendError::Closed(_) => LinkError::Closed(self.name),
            })
    }

    /// Ask the writer to close the transport.
    ///
    /// Only the first call on an open link has any effect. If the queue is
    /// full the writer still stops once every link handle is dropped.
    pub fn close(&self) {
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Err(TrySendError::Full(_)) = self.tx.try_send(LinkCommand::Close) {
            tracing::debug!(peer = self.name, "Link queue full, close deferred to drop");
        }
    }
}

/// Receiving half owned by the peer's writer task.
#[derive(Debug)]
pub struct LinkReceiver<M> {
    rx: mpsc::Receiver<LinkCommand<M>>,
    open: Arc<AtomicBool>,
}

impl<M> LinkReceiver<M> {
    /// Next command, or `None` once every link handle is dropped.
    pub async fn recv(&mut self) -> Option<LinkCommand<M>> {
        self.rx.recv().await
    }

    /// Transport is ready for traffic.
    pub fn mark_open(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Transport is gone; subsequent sends fail with [`LinkError::NotOpen`].
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::Release);
    }
}
