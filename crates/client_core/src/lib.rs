//! Client side of the party RSVP: the endpoint client and the state holders
//! the presentation layer renders from.

pub mod confirmation;
pub mod display;
pub mod endpoint;
pub mod flag_store;

pub use confirmation::{ConfirmRejected, ConfirmationState, SubmissionState};
pub use display::{
    AttendeeTotalDisplay, DisplayState, StalePolicy, TotalPoller, DEFAULT_POLL_INTERVAL,
};
pub use endpoint::{EndpointClient, RsvpEndpoint};
pub use flag_store::{FlagStore, MemoryFlagStore};
