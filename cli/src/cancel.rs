//! Interrupt to cancellation bridge
//!
//! Every submission gets its own [`CancellationToken`] and a short-lived
//! listener task. The listener waits for either an interrupt or the end of
//! the submission:
//!
//! - submission ends first: the listener exits without touching the token;
//! - interrupt first: the token is cancelled, then the listener waits for
//!   the submission to return before it exits.
//!
//! [`ArmedSubmission::retire`] signals completion and joins the listener, so
//! no listener is alive once result handling starts.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub type InterruptFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Something that can tell us the user wants the current batch stopped
pub trait InterruptSource: Send + Sync {
    /// Resolves on the next interrupt
    fn notified(&self) -> InterruptFuture;
}

/// Ctrl+C, plus SIGTERM on unix
pub struct OsInterrupt;

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("[CANCEL] Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(e) => {
            log::warn!("[CANCEL] Unable to listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

impl InterruptSource for OsInterrupt {
    fn notified(&self) -> InterruptFuture {
        Box::pin(async {
            tokio::select! {
                _ = ctrl_c() => {}
                _ = terminate() => {}
            }
        })
    }
}

/// How a submission ended, from the listener's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    Completed,
    Cancelled,
}

#[derive(Clone)]
pub struct CancellationBridge {
    source: Arc<dyn InterruptSource>,
}

impl CancellationBridge {
    pub fn new(source: Arc<dyn InterruptSource>) -> Self {
        Self { source }
    }

    /// Bridge wired to OS signals
    pub fn os() -> Self {
        Self::new(Arc::new(OsInterrupt))
    }

    /// Create the token for one submission and start its listener
    pub fn arm(&self) -> ArmedSubmission {
        let token = CancellationToken::new();
        let (done_tx, mut done_rx) = oneshot::channel::<()>();
        let interrupt = self.source.notified();
        let listener_token = token.clone();

        let listener = tokio::spawn(async move {
            let interrupted = tokio::select! {
                biased;
                _ = &mut done_rx => false,
                _ = interrupt => true,
            };
            if !interrupted {
                return Retirement::Completed;
            }

            log::debug!("[CANCEL] Interrupt received, cancelling in-flight batch");
            listener_token.cancel();
            // Rendezvous: hold on until the submitter has seen the cancellation
            let _ = done_rx.await;
            Retirement::Cancelled
        });

        ArmedSubmission {
            token,
            done: Some(done_tx),
            listener,
        }
    }
}

/// A submission with a live interrupt listener
pub struct ArmedSubmission {
    token: CancellationToken,
    done: Option<oneshot::Sender<()>>,
    listener: JoinHandle<Retirement>,
}

impl ArmedSubmission {
    /// Token to hand to the session
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal completion and wait for the listener to exit
    pub async fn retire(mut self) -> Retirement {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        match self.listener.await {
            Ok(retirement) => retirement,
            Err(e) => {
                log::warn!("[CANCEL] Interrupt listener failed: {}", e);
                if self.token.is_cancelled() {
                    Retirement::Cancelled
                } else {
                    Retirement::Completed
                }
            }
        }
    }
}
