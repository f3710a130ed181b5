use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use shared::{
    config::require_configured,
    diagnostics::DiagnosticRules,
    domain::{AttendeeTotal, PartySize},
    error::RsvpError,
    protocol::{EndpointAction, EndpointForm, EndpointReply},
};
use tracing::{debug, error};

/// The two remote operations the page performs. Implementations classify
/// every failure into an [`RsvpError`]; nothing is retried.
#[async_trait]
pub trait RsvpEndpoint: Send + Sync {
    async fn fetch_attendee_total(&self, url: &str) -> Result<AttendeeTotal, RsvpError>;
    async fn submit_confirmation(&self, url: &str, party_size: PartySize)
        -> Result<(), RsvpError>;
}

/// Thin wrapper around reqwest for the spreadsheet-backed endpoint.
#[derive(Clone)]
pub struct EndpointClient {
    http: Client,
    diagnostics: DiagnosticRules,
}

impl EndpointClient {
    pub fn new() -> Self {
        Self::with_http(Client::new())
    }

    pub fn with_http(http: Client) -> Self {
        Self {
            http,
            diagnostics: DiagnosticRules::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticRules) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    async fn call(&self, url: &str, action: EndpointAction) -> Result<EndpointReply, RsvpError> {
        let url = require_configured(url)?;
        let action_name = action.name();
        debug!(%url, action = action_name, "calling endpoint");

        let res = self
            .http
            .post(url)
            .form(&EndpointForm::from(action))
            .send()
            .await
            .map_err(|err| {
                error!(%url, action = action_name, error = %err, "network error calling endpoint");
                RsvpError::Transport {
                    detail: err.to_string(),
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            error!(%url, action = action_name, status = status.as_u16(), "endpoint returned HTTP error");
            return Err(RsvpError::Server {
                status: status.as_u16(),
            });
        }

        // A deployment without public access answers with a redirect to a
        // sign-in page instead of the script's JSON.
        let redirected = Url::parse(url).is_ok_and(|requested| *res.url() != requested);
        let final_url = res.url().to_string();
        let html = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/html"));
        if redirected && html {
            error!(%url, action = action_name, %final_url, "endpoint redirected to a web page");
            return Err(RsvpError::Transport {
                detail: format!("redirected to {final_url}"),
            });
        }

        let body = res.text().await.map_err(|err| {
            error!(%url, action = action_name, error = %err, "failed to read endpoint body");
            RsvpError::MalformedResponse {
                detail: err.to_string(),
            }
        })?;

        let reply: EndpointReply = serde_json::from_str(&body).map_err(|err| {
            error!(%url, action = action_name, error = %err, %body, "endpoint reply is not valid JSON");
            if redirected {
                RsvpError::Transport {
                    detail: format!("redirected to {final_url}: {err}"),
                }
            } else {
                RsvpError::MalformedResponse {
                    detail: err.to_string(),
                }
            }
        })?;

        if reply.is_failure() {
            let raw = reply.message.as_deref().unwrap_or("Unknown error.");
            error!(%url, action = action_name, message = raw, "endpoint reported failure");
            return Err(RsvpError::Application {
                message: self.diagnostics.rewrite(raw),
            });
        }

        Ok(reply)
    }
}

impl Default for EndpointClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RsvpEndpoint for EndpointClient {
    async fn fetch_attendee_total(&self, url: &str) -> Result<AttendeeTotal, RsvpError> {
        let reply = self.call(url, EndpointAction::GetTotal).await?;
        Ok(reply.total_attendees.unwrap_or(0))
    }

    async fn submit_confirmation(
        &self,
        url: &str,
        party_size: PartySize,
    ) -> Result<(), RsvpError> {
        self.call(
            url,
            EndpointAction::Confirm {
                quantity: party_size,
            },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/endpoint_tests.rs"]
mod tests;
