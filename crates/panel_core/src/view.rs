//! Serializable snapshots of the panel handed to whatever frontend renders
//! the controls. Frontends never mutate these; every change goes through a
//! [`crate::PanelController`] operation.

use serde::{Deserialize, Serialize};
use shared::domain::{ControlId, DoorId};

/// Display state of the control panel. Exactly one variant is active at any
/// time, which is what keeps the success/error/sending indicators mutually
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    #[default]
    Idle,
    Sending,
    ShowingSuccess,
    ShowingError,
}

impl UiMode {
    pub const fn is_feedback(self) -> bool {
        matches!(self, Self::ShowingSuccess | Self::ShowingError)
    }

    pub const fn is_sending(self) -> bool {
        matches!(self, Self::Sending)
    }
}

/// One control in the panel layout as configured by the host. A control with
/// a `door` binding triggers an activation when pressed; a control without
/// one (a logout link styled as a button, say) is only subject to the
/// disable-everything rule while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelControl {
    pub control: ControlId,
    pub door: Option<DoorId>,
}

impl PanelControl {
    pub fn bound(control: impl Into<String>, door: impl Into<String>) -> Self {
        Self {
            control: ControlId::new(control),
            door: Some(DoorId::new(door)),
        }
    }

    pub fn unbound(control: impl Into<String>) -> Self {
        Self {
            control: ControlId::new(control),
            door: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonView {
    pub control: ControlId,
    pub door: Option<DoorId>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSubmitView {
    pub waiting: bool,
    pub enabled: bool,
}

/// Full snapshot published on every observable change.
///
/// `success_visible` and `error_visible` are derived from `mode`; they exist
/// so a dumb frontend can toggle its two feedback boxes without matching on
/// the enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelView {
    pub mode: UiMode,
    pub success_visible: bool,
    pub error_visible: bool,
    pub buttons: Vec<ButtonView>,
    pub login_submit: LoginSubmitView,
}

impl PanelView {
    pub fn button(&self, control: &str) -> Option<&ButtonView> {
        self.buttons.iter().find(|b| b.control.as_str() == control)
    }
}
