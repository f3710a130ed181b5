//! Attendee total shown on the page, refreshed on a fixed interval.

use std::{sync::Arc, time::Duration};

use shared::{config::EndpointConfig, domain::AttendeeTotal, error::RsvpError};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error};

use crate::endpoint::RsvpEndpoint;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// `tokio::time::interval` panics on a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

const COUNTER_NOT_CONFIGURED: &str =
    "The guest counter will turn on once the host configures the connection.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Error(String),
    Value(AttendeeTotal),
}

/// What a failed refresh does to a number that is already on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Keep showing the last good total; the failure is only recorded.
    #[default]
    KeepLastValue,
    /// Replace the number with the error message.
    ReplaceWithError,
}

#[derive(Debug, Clone)]
pub struct AttendeeTotalDisplay {
    policy: StalePolicy,
    state: DisplayState,
    last_value: Option<AttendeeTotal>,
    last_error: Option<String>,
}

impl AttendeeTotalDisplay {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            policy,
            state: DisplayState::Loading,
            last_value: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn last_value(&self) -> Option<AttendeeTotal> {
        self.last_value
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Only the initial fetch shows the loading indicator, and only while no
    /// number has been shown yet.
    pub fn begin_fetch(&mut self, initial: bool) {
        if initial && self.last_value.is_none() {
            self.state = DisplayState::Loading;
        }
    }

    pub fn apply(&mut self, result: Result<AttendeeTotal, RsvpError>) {
        match result {
            Ok(total) => {
                self.last_value = Some(total);
                self.last_error = None;
                self.state = DisplayState::Value(total);
            }
            Err(err) => {
                let message = match err {
                    RsvpError::NotConfigured => COUNTER_NOT_CONFIGURED.to_string(),
                    other => other.to_string(),
                };
                self.state = match (self.policy, self.last_value) {
                    (StalePolicy::KeepLastValue, Some(total)) => DisplayState::Value(total),
                    _ => DisplayState::Error(message.clone()),
                };
                self.last_error = Some(message);
            }
        }
    }

    pub async fn refresh(
        &mut self,
        endpoint: &dyn RsvpEndpoint,
        url: &str,
        initial: bool,
    ) -> &DisplayState {
        self.begin_fetch(initial);
        let result = endpoint.fetch_attendee_total(url).await;
        if let Err(err) = &result {
            error!(kind = ?err.kind(), detail = err.detail(), error = %err, "failed to load attendee total");
        }
        self.apply(result);
        &self.state
    }
}

/// Owner handle of a running poll loop. Dropping or cancelling it stops the
/// loop.
pub struct TotalPoller {
    task: JoinHandle<()>,
    states: watch::Receiver<DisplayState>,
}

impl TotalPoller {
    pub fn spawn(
        endpoint: Arc<dyn RsvpEndpoint>,
        config: EndpointConfig,
        interval: Duration,
        policy: StalePolicy,
    ) -> Self {
        let (tx, states) = watch::channel(DisplayState::Loading);
        let task = tokio::spawn(async move {
            let mut display = AttendeeTotalDisplay::new(policy);
            let mut ticker = time::interval(interval.max(MIN_POLL_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut initial = true;

            loop {
                ticker.tick().await;
                let state = display
                    .refresh(endpoint.as_ref(), config.url(), initial)
                    .await
                    .clone();
                initial = false;
                debug!(?state, "attendee total refreshed");

                tx.send_if_modified(|current| {
                    if *current == state {
                        false
                    } else {
                        *current = state;
                        true
                    }
                });
            }
        });

        Self { task, states }
    }

    pub fn current(&self) -> DisplayState {
        self.states.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.states.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the loop and waits until it is gone.
    pub async fn cancel(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for TotalPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/display_tests.rs"]
mod tests;
