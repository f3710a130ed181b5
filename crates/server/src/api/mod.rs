use shared::protocol::{EndpointAction, EndpointForm, EndpointReply};
use storage::Storage;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub fn endpoint_route() -> &'static str {
    "/"
}

/// Dispatches one form submission. Every outcome, including storage
/// failures, is a JSON reply; the transport status stays 200.
pub async fn handle_form(ctx: &ApiContext, form: &EndpointForm) -> EndpointReply {
    let action = match EndpointAction::try_from(form) {
        Ok(action) => action,
        Err(rejection) => {
            warn!(action = ?form.action, quantity = ?form.quantity, "rejected endpoint form");
            return EndpointReply::failure(rejection.message());
        }
    };

    match action {
        EndpointAction::GetTotal => match ctx.storage.total_attendees().await {
            Ok(total) => EndpointReply::total(total),
            Err(err) => {
                error!(error = %err, "failed to compute attendee total");
                EndpointReply::failure(err.to_string())
            }
        },
        EndpointAction::Confirm { quantity } => {
            match ctx.storage.record_confirmation(quantity).await {
                Ok(record) => {
                    info!(party_size = record.party_size.get(), recorded_at = %record.recorded_at, "confirmation recorded");
                    EndpointReply::confirmed()
                }
                Err(err) => {
                    error!(error = %err, "failed to record confirmation");
                    EndpointReply::failure(err.to_string())
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
