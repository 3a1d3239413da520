//! Responders for native browser dialogs.
//!
//! Chromium pauses page script while an `alert`, `confirm`, `prompt` or
//! `beforeunload` dialog is open, so something must be ready to answer it.
//! The [`DialogRelay`] owns a pump task fed by a [`DialogSource`] and routes
//! each dialog to at most one subscribed responder:
//!
//! - [`DialogRelay::expect_next`] installs a one-shot responder: the next
//!   dialog is accepted, the subscription ends, and the returned future
//!   resolves with the observed [`DialogEvent`].
//! - [`DialogRelay::accept_all`] installs a standing responder: prompts are
//!   accepted with a fixed reply, every other kind is plainly accepted, and
//!   each observed dialog is echoed on the returned channel. A dialog whose
//!   message is empty is echoed but not answered.
//!
//! A dialog that opens while no responder is subscribed is counted, logged
//! and parked; it stays open on the page until the next responder attaches.

use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use anyhow::anyhow;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The kind of native dialog a page opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    BeforeUnload,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogKind::Alert => "alert",
            DialogKind::Confirm => "confirm",
            DialogKind::Prompt => "prompt",
            DialogKind::BeforeUnload => "beforeunload",
        };
        f.write_str(name)
    }
}

/// A dialog as observed when it opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEvent {
    pub kind: DialogKind,
    pub message: String,
    /// Pre-filled input of a `prompt`, absent for the other kinds.
    pub default_prompt: Option<String>,
}

/// How an open dialog gets answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    Accept {
        /// Text typed into a `prompt` before accepting it.
        prompt_text: Option<String>,
    },
    Dismiss,
}

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("a dialog responder is already subscribed to this page")]
    ResponderActive,
}

/// Backend feeding dialogs into a [`DialogRelay`] and applying responses.
///
/// The CDP implementation lives in the `chromium` module; tests script one
/// from channels.
#[async_trait]
pub trait DialogSource: Send + 'static {
    /// Wait for the next dialog to open. `None` means the underlying event
    /// stream has closed and the relay should shut down.
    async fn next_dialog(&mut self) -> Option<DialogEvent>;

    /// Answer the dialog currently open on the page.
    async fn resolve(
        &mut self,
        event: &DialogEvent,
        response: DialogResponse,
    ) -> anyhow::Result<()>;
}

/// Responder slot. At most one subscription is active at a time.
enum Slot {
    Empty,
    Once(oneshot::Sender<DialogEvent>),
    Standing {
        reply: String,
        seen: mpsc::UnboundedSender<DialogEvent>,
    },
}

impl Default for Slot {
    fn default() -> Self {
        Slot::Empty
    }
}

#[derive(Default)]
struct RelayState {
    slot: Slot,
    /// Dialog observed with no responder subscribed, still open on the page.
    parked: Option<DialogEvent>,
}

fn lock_state(state: &Mutex<RelayState>) -> MutexGuard<'_, RelayState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Routes dialog events from a [`DialogSource`] to subscribed responders.
///
/// Dropping the relay aborts the pump task; any dialog open at that point is
/// left unanswered.
pub struct DialogRelay {
    state: Arc<Mutex<RelayState>>,
    wake: Arc<Notify>,
    unhandled: Arc<AtomicUsize>,
    pump: JoinHandle<()>,
}

impl DialogRelay {
    /// Start the pump task over `source`. Pages construct one per target.
    pub fn spawn<S: DialogSource>(source: S) -> Self {
        let state = Arc::new(Mutex::new(RelayState::default()));
        let wake = Arc::new(Notify::new());
        let unhandled = Arc::new(AtomicUsize::new(0));
        let pump = tokio::spawn(pump_dialogs(
            source,
            state.clone(),
            wake.clone(),
            unhandled.clone(),
        ));
        Self {
            state,
            wake,
            unhandled,
            pump,
        }
    }

    /// Subscribe a one-shot responder for the next dialog.
    ///
    /// The dialog is accepted (no prompt text) and the returned future
    /// resolves with what was observed. The subscription is consumed by that
    /// first dialog.
    pub fn expect_next(&self) -> Result<NextDialog, DialogError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut st = lock_state(&self.state);
            if !matches!(st.slot, Slot::Empty) {
                return Err(DialogError::ResponderActive);
            }
            st.slot = Slot::Once(tx);
        }
        self.wake.notify_one();
        Ok(NextDialog { rx })
    }

    /// Subscribe a standing responder that stays attached until released.
    ///
    /// Prompts are accepted with `reply`, other kinds are plainly accepted,
    /// and dialogs with an empty message are left unanswered. Every observed
    /// dialog is echoed on the returned channel after it was answered.
    pub fn accept_all(
        &self,
        reply: impl Into<String>,
    ) -> Result<mpsc::UnboundedReceiver<DialogEvent>, DialogError> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut st = lock_state(&self.state);
            if !matches!(st.slot, Slot::Empty) {
                return Err(DialogError::ResponderActive);
            }
            st.slot = Slot::Standing {
                reply: reply.into(),
                seen: tx,
            };
        }
        self.wake.notify_one();
        Ok(rx)
    }

    /// Drop the active subscription, if any. Returns whether one was active.
    ///
    /// A released one-shot future resolves with a detach error instead of
    /// hanging.
    pub fn release(&self) -> bool {
        let mut st = lock_state(&self.state);
        !matches!(mem::replace(&mut st.slot, Slot::Empty), Slot::Empty)
    }

    /// Number of dialogs that opened while no responder was subscribed.
    pub fn unhandled(&self) -> usize {
        self.unhandled.load(Ordering::Relaxed)
    }
}

impl Drop for DialogRelay {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Future side of [`DialogRelay::expect_next`].
pub struct NextDialog {
    rx: oneshot::Receiver<DialogEvent>,
}

impl Future for NextDialog {
    type Output = anyhow::Result<DialogEvent>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|res| {
            res.map_err(|_| anyhow!("dialog responder detached before a dialog was observed"))
        })
    }
}

enum Claimed {
    Once(oneshot::Sender<DialogEvent>),
    Standing {
        reply: String,
        seen: mpsc::UnboundedSender<DialogEvent>,
    },
}

async fn pump_dialogs<S: DialogSource>(
    mut source: S,
    state: Arc<Mutex<RelayState>>,
    wake: Arc<Notify>,
    unhandled: Arc<AtomicUsize>,
) {
    loop {
        // A parked dialog is retried first; it was already counted and is
        // still open on the page.
        let parked = lock_state(&state).parked.take();
        let (event, fresh) = match parked {
            Some(event) => (event, false),
            None => match source.next_dialog().await {
                Some(event) => (event, true),
                None => break,
            },
        };
        if fresh {
            info!(
                target: "browser.dialog",
                kind = %event.kind,
                message = %event.message,
                "dialog observed"
            );
        }

        let claimed = {
            let mut st = lock_state(&state);
            match mem::replace(&mut st.slot, Slot::Empty) {
                Slot::Empty => None,
                Slot::Once(tx) => Some(Claimed::Once(tx)),
                Slot::Standing { reply, seen } => {
                    st.slot = Slot::Standing {
                        reply: reply.clone(),
                        seen: seen.clone(),
                    };
                    Some(Claimed::Standing { reply, seen })
                }
            }
        };

        match claimed {
            Some(Claimed::Once(tx)) => {
                let response = DialogResponse::Accept { prompt_text: None };
                match source.resolve(&event, response).await {
                    Ok(()) => {
                        let _ = tx.send(event);
                    }
                    Err(err) => {
                        // Dropping the sender detaches the waiting future.
                        warn!(target: "browser.dialog", error = %err, "failed to accept dialog");
                    }
                }
            }
            Some(Claimed::Standing { reply, seen }) => {
                if event.message.is_empty() {
                    warn!(
                        target: "browser.dialog",
                        kind = %event.kind,
                        "dialog with empty message left unresolved"
                    );
                } else {
                    let prompt_text =
                        matches!(event.kind, DialogKind::Prompt).then(|| reply.clone());
                    let response = DialogResponse::Accept { prompt_text };
                    if let Err(err) = source.resolve(&event, response).await {
                        warn!(target: "browser.dialog", error = %err, "failed to accept dialog");
                    }
                }
                let _ = seen.send(event);
            }
            None => {
                if fresh {
                    unhandled.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        target: "browser.dialog",
                        kind = %event.kind,
                        message = %event.message,
                        "dialog observed with no responder subscribed"
                    );
                }
                lock_state(&state).parked = Some(event);
                wake.notified().await;
            }
        }
    }

    // Stream closed: detach whatever responder is still waiting.
    lock_state(&state).slot = Slot::Empty;
}
