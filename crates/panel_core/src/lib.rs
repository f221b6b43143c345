//! Headless core of the door-buzzer intercom panel.
//!
//! [`PanelController`] owns the panel's transient UI state and turns each
//! door-selection into exactly one authenticated request against the
//! intercom server. Frontends subscribe to [`PanelView`] snapshots and
//! render them; all side effects (HTTP, navigation, worker registration) go
//! through constructor-injected seams so the whole flow is testable without
//! a live page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use shared::{
    domain::{ControlId, CsrfToken, DoorId},
    protocol::{self, BuzzReply},
};

pub mod transport;
pub mod view;
pub mod worker;

use transport::{BuzzerTransport, HttpTransport, TransportError};
use view::{ButtonView, LoginSubmitView, PanelControl, PanelView, UiMode};
use worker::WorkerRegistrar;

/// How long success/error feedback stays visible before it is cleared.
pub const AUTO_CLEAR_DELAY: Duration = Duration::from_millis(3000);

const VIEW_CHANNEL_CAPACITY: usize = 64;

/// Host-page navigation seam. Invoked when the server demands a fresh
/// login; implementations are expected to tear the current page down, so the
/// controller stops touching its own state once this fires.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn redirect(&self, location: &str);
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ActivateError {
    /// A buzzer request is already in flight; the panel accepts one at a
    /// time, doors included.
    #[error("another buzzer request is already in flight")]
    RequestInFlight,
}

struct ButtonState {
    control: ControlId,
    door: Option<DoorId>,
    enabled: bool,
}

struct PanelState {
    mode: UiMode,
    buttons: Vec<ButtonState>,
    login_waiting: bool,
}

struct Inner {
    transport: Arc<dyn BuzzerTransport>,
    navigator: Arc<dyn Navigator>,
    registrar: Arc<dyn WorkerRegistrar>,
    state: Mutex<PanelState>,
    auto_clear: Mutex<Option<JoinHandle<()>>>,
    views: broadcast::Sender<PanelView>,
}

/// Cheaply cloneable handle to the panel core; clones share all state.
#[derive(Clone)]
pub struct PanelController {
    inner: Arc<Inner>,
}

impl PanelController {
    pub fn new(
        layout: Vec<PanelControl>,
        transport: Arc<dyn BuzzerTransport>,
        navigator: Arc<dyn Navigator>,
        registrar: Arc<dyn WorkerRegistrar>,
    ) -> Self {
        let (views, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        let buttons = layout
            .into_iter()
            .map(|control| ButtonState {
                control: control.control,
                door: control.door,
                enabled: true,
            })
            .collect();

        Self {
            inner: Arc::new(Inner {
                transport,
                navigator,
                registrar,
                state: Mutex::new(PanelState {
                    mode: UiMode::Idle,
                    buttons,
                    login_waiting: false,
                }),
                auto_clear: Mutex::new(None),
                views,
            }),
        }
    }

    /// Convenience constructor wiring the panel to a real intercom server.
    pub fn with_http_transport(
        layout: Vec<PanelControl>,
        base_url: impl AsRef<str>,
        navigator: Arc<dyn Navigator>,
        registrar: Arc<dyn WorkerRegistrar>,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(base_url)?);
        Ok(Self::new(layout, transport, navigator, registrar))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelView> {
        self.inner.views.subscribe()
    }

    pub async fn view(&self) -> PanelView {
        let state = self.inner.state.lock().await;
        build_view(&state)
    }

    /// Dispatches the buzzer request for `door`.
    ///
    /// Synchronously (before the network is touched) this clears any visible
    /// feedback, switches the panel to [`UiMode::Sending`], and disables
    /// every button. The request itself runs on a spawned task so it always
    /// resolves and applies its outcome exactly once, even if the caller
    /// disappears. Returns [`ActivateError::RequestInFlight`] without side
    /// effects while a previous request is unresolved.
    pub async fn activate_door(
        &self,
        door: DoorId,
        csrf: CsrfToken,
    ) -> Result<(), ActivateError> {
        {
            let mut state = self.inner.state.lock().await;
            if state.mode.is_sending() {
                return Err(ActivateError::RequestInFlight);
            }
            state.mode = UiMode::Sending;
            for button in &mut state.buttons {
                button.enabled = false;
            }
            self.publish(&state);
        }

        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = controller.inner.transport.buzz(&door, &csrf).await;
            controller.apply_outcome(&door, outcome).await;
        });

        Ok(())
    }

    async fn apply_outcome(&self, door: &DoorId, outcome: Result<String, TransportError>) {
        let mode = match outcome {
            Ok(body) => match BuzzReply::classify(&body) {
                BuzzReply::Accepted => {
                    info!(door = door.as_str(), "door buzzer accepted");
                    UiMode::ShowingSuccess
                }
                BuzzReply::LoginRequired => {
                    // Navigation supersedes the local UI: no feedback, no
                    // re-enabling, no auto-clear.
                    info!(door = door.as_str(), "login required, redirecting");
                    self.inner.navigator.redirect(protocol::LOGIN_PATH).await;
                    return;
                }
                BuzzReply::Rejected(body) => {
                    warn!(
                        door = door.as_str(),
                        body = body.as_str(),
                        "server rejected buzzer request"
                    );
                    UiMode::ShowingError
                }
            },
            Err(err) => {
                warn!(door = door.as_str(), error = %err, "buzzer request failed");
                UiMode::ShowingError
            }
        };

        {
            let mut state = self.inner.state.lock().await;
            state.mode = mode;
            for button in &mut state.buttons {
                if button.door.is_some() {
                    button.enabled = true;
                }
            }
            self.publish(&state);
        }

        self.schedule_auto_clear().await;
    }

    /// Arms the feedback auto-clear timer, cancelling any pending one;
    /// last-scheduled wins and the delay window restarts from now.
    pub async fn schedule_auto_clear(&self) {
        let mut pending = self.inner.auto_clear.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let controller = self.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(AUTO_CLEAR_DELAY).await;
            controller.clear_feedback().await;
        }));
    }

    async fn clear_feedback(&self) {
        let mut state = self.inner.state.lock().await;
        // Idempotent: a stale timer firing while idle, or while a later
        // request is in flight, must not disturb anything.
        if state.mode.is_feedback() {
            state.mode = UiMode::Idle;
            self.publish(&state);
        }
    }

    /// Marks the login-submit control as waiting and disabled. Nothing in
    /// the panel re-enables it; the login form's own navigation does.
    pub async fn mark_login_submitting(&self) {
        let mut state = self.inner.state.lock().await;
        state.login_waiting = true;
        self.publish(&state);
    }

    /// Fire-and-forget registration of the well-known background worker
    /// script. The result is logged and otherwise discarded; panel state is
    /// never touched.
    pub fn register_background_worker(&self) {
        if !self.inner.registrar.is_supported() {
            debug!("host has no background worker runtime, skipping registration");
            return;
        }

        let controller = self.clone();
        tokio::spawn(async move {
            match controller
                .inner
                .registrar
                .register(protocol::WORKER_SCRIPT_PATH)
                .await
            {
                Ok(registration) => {
                    debug!(scope = registration.scope.as_str(), "background worker registered");
                }
                Err(err) => {
                    debug!(error = %err, "background worker registration failed");
                }
            }
        });
    }

    fn publish(&self, state: &PanelState) {
        let _ = self.inner.views.send(build_view(state));
    }
}

fn build_view(state: &PanelState) -> PanelView {
    PanelView {
        mode: state.mode,
        success_visible: state.mode == UiMode::ShowingSuccess,
        error_visible: state.mode == UiMode::ShowingError,
        buttons: state
            .buttons
            .iter()
            .map(|button| ButtonView {
                control: button.control.clone(),
                door: button.door.clone(),
                enabled: button.enabled,
            })
            .collect(),
        login_submit: LoginSubmitView {
            waiting: state.login_waiting,
            enabled: !state.login_waiting,
        },
    }
}

#[cfg(test)]
mod tests;
