//! RSVP lifecycle for one visitor: dialog, party size, submission state and
//! the durable "already confirmed" guard.

use std::sync::Arc;

use shared::{
    config::EndpointConfig,
    domain::{PartySize, CONFIRMATION_FLAG_KEY},
    error::RsvpError,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{endpoint::RsvpEndpoint, flag_store::FlagStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Loading,
    Success,
    /// Visitor-facing message of the classified failure.
    Error(String),
}

/// Why a dialog or confirm action was refused before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfirmRejected {
    #[error("confirmation is disabled until the host finishes the setup")]
    NotConfigured,
    #[error("this device already confirmed attendance")]
    AlreadyConfirmed,
    #[error("a confirmation is already being submitted")]
    InFlight,
    #[error("the confirmation dialog is not open")]
    DialogClosed,
}

pub struct ConfirmationState {
    endpoint: Arc<dyn RsvpEndpoint>,
    flags: Arc<dyn FlagStore>,
    config: EndpointConfig,
    state: SubmissionState,
    dialog: Option<PartySize>,
}

impl ConfirmationState {
    /// Reads the local flag once. A previously confirmed client starts in
    /// `Success` without contacting the endpoint.
    pub async fn restore(
        endpoint: Arc<dyn RsvpEndpoint>,
        flags: Arc<dyn FlagStore>,
        config: EndpointConfig,
    ) -> Self {
        let confirmed = match flags.get(CONFIRMATION_FLAG_KEY).await {
            Ok(confirmed) => confirmed,
            Err(error) => {
                warn!(%error, "failed to read local confirmation flag; assuming not confirmed");
                false
            }
        };

        Self {
            endpoint,
            flags,
            config,
            state: if confirmed {
                SubmissionState::Success
            } else {
                SubmissionState::Idle
            },
            dialog: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn has_confirmed(&self) -> bool {
        self.state == SubmissionState::Success
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Whether the confirm control is enabled.
    pub fn can_confirm(&self) -> bool {
        self.is_configured()
            && !matches!(
                self.state,
                SubmissionState::Loading | SubmissionState::Success
            )
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn party_size(&self) -> Option<PartySize> {
        self.dialog
    }

    /// Opens the dialog with the party size reset to one.
    pub fn open_dialog(&mut self) -> Result<PartySize, ConfirmRejected> {
        self.ensure_can_confirm()?;
        let size = PartySize::default();
        self.dialog = Some(size);
        Ok(size)
    }

    pub fn close_dialog(&mut self) -> Result<(), ConfirmRejected> {
        if self.state == SubmissionState::Loading {
            return Err(ConfirmRejected::InFlight);
        }
        self.dialog = None;
        Ok(())
    }

    pub fn increment(&mut self) -> Result<PartySize, ConfirmRejected> {
        let size = self.dialog.ok_or(ConfirmRejected::DialogClosed)?.increment();
        self.dialog = Some(size);
        Ok(size)
    }

    pub fn decrement(&mut self) -> Result<PartySize, ConfirmRejected> {
        let size = self.dialog.ok_or(ConfirmRejected::DialogClosed)?.decrement();
        self.dialog = Some(size);
        Ok(size)
    }

    /// `idle/error -> loading`. Closes the dialog and hands back the party
    /// size to submit.
    pub fn begin(&mut self) -> Result<PartySize, ConfirmRejected> {
        self.ensure_can_confirm()?;
        let size = self.dialog.take().ok_or(ConfirmRejected::DialogClosed)?;
        self.state = SubmissionState::Loading;
        Ok(size)
    }

    /// `loading -> success|error`.
    pub async fn finish(&mut self, outcome: Result<(), RsvpError>) -> &SubmissionState {
        match outcome {
            Ok(()) => {
                if let Err(error) = self.flags.set(CONFIRMATION_FLAG_KEY, true).await {
                    warn!(%error, "confirmation accepted but the local flag could not be saved");
                }
                info!("attendance confirmed");
                self.state = SubmissionState::Success;
            }
            Err(err) => {
                error!(kind = ?err.kind(), detail = err.detail(), error = %err, "failed to save confirmation");
                self.state = SubmissionState::Error(err.to_string());
            }
        }
        &self.state
    }

    /// Submits the party size chosen in the open dialog.
    pub async fn confirm(&mut self) -> Result<&SubmissionState, ConfirmRejected> {
        let party_size = self.begin()?;
        let outcome = self
            .endpoint
            .submit_confirmation(self.config.url(), party_size)
            .await;
        Ok(self.finish(outcome).await)
    }

    fn ensure_can_confirm(&self) -> Result<(), ConfirmRejected> {
        match self.state {
            SubmissionState::Success => Err(ConfirmRejected::AlreadyConfirmed),
            SubmissionState::Loading => Err(ConfirmRejected::InFlight),
            _ if !self.is_configured() => Err(ConfirmRejected::NotConfigured),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "tests/confirmation_tests.rs"]
mod tests;
