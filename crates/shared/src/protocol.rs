use serde::{Deserialize, Serialize};

use crate::domain::{AttendeeTotal, PartySize};

pub const ACTION_GET_TOTAL: &str = "getTotal";
pub const ACTION_CONFIRM: &str = "confirm";
pub const STATUS_CONFIRMED: &str = "confirmed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointAction {
    GetTotal,
    Confirm { quantity: PartySize },
}

impl EndpointAction {
    pub fn name(&self) -> &'static str {
        match self {
            EndpointAction::GetTotal => ACTION_GET_TOTAL,
            EndpointAction::Confirm { .. } => ACTION_CONFIRM,
        }
    }
}

/// Form-encoded request body. Field order is the wire order:
/// `action=getTotal` or `action=confirm&quantity=<n>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl From<EndpointAction> for EndpointForm {
    fn from(action: EndpointAction) -> Self {
        let quantity = match action {
            EndpointAction::GetTotal => None,
            EndpointAction::Confirm { quantity } => Some(quantity.to_string()),
        };
        Self {
            action: Some(action.name().to_string()),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRejection {
    InvalidAction,
    InvalidQuantity,
}

impl FormRejection {
    pub fn message(self) -> &'static str {
        match self {
            FormRejection::InvalidAction => "Invalid action",
            FormRejection::InvalidQuantity => "Invalid quantity",
        }
    }
}

impl TryFrom<&EndpointForm> for EndpointAction {
    type Error = FormRejection;

    fn try_from(form: &EndpointForm) -> Result<Self, Self::Error> {
        match form.action.as_deref().map(str::trim) {
            Some(ACTION_GET_TOTAL) => Ok(EndpointAction::GetTotal),
            Some(ACTION_CONFIRM) => form
                .quantity
                .as_deref()
                .and_then(|raw| raw.trim().parse::<u32>().ok())
                .and_then(PartySize::new)
                .map(|quantity| EndpointAction::Confirm { quantity })
                .ok_or(FormRejection::InvalidQuantity),
            _ => Err(FormRejection::InvalidAction),
        }
    }
}

/// JSON reply of the endpoint. Only an explicit `"success": false` marks a
/// failure; a missing flag is read as success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(
        rename = "totalAsistentes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_attendees: Option<AttendeeTotal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EndpointReply {
    pub fn total(total: AttendeeTotal) -> Self {
        Self {
            success: Some(true),
            total_attendees: Some(total),
            ..Self::default()
        }
    }

    pub fn confirmed() -> Self {
        Self {
            success: Some(true),
            status: Some(STATUS_CONFIRMED.to_string()),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }
}
