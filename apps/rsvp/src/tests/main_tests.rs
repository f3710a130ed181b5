use super::*;
use client_core::MemoryFlagStore;

async fn fresh_holder() -> ConfirmationState {
    ConfirmationState::restore(
        Arc::new(EndpointClient::new()),
        Arc::new(MemoryFlagStore::new()),
        EndpointConfig::new("https://script.google.com/macros/s/AKfy/exec"),
    )
    .await
}

#[tokio::test]
async fn explicit_party_size_becomes_plus_presses() {
    let mut holder = fresh_holder().await;
    let size = DialogPresses::new(Some(4), 0, 0)
        .apply(&mut holder)
        .expect("dialog");
    assert_eq!(size.get(), 4);
    assert_eq!(holder.party_size(), Some(size));
}

#[tokio::test]
async fn minus_presses_never_go_below_one() {
    let mut holder = fresh_holder().await;
    let size = DialogPresses::new(None, 2, 5)
        .apply(&mut holder)
        .expect("dialog");
    assert_eq!(size.get(), 1);
}

#[tokio::test]
async fn unconfigured_endpoint_refuses_the_dialog() {
    let mut holder = ConfirmationState::restore(
        Arc::new(EndpointClient::new()),
        Arc::new(MemoryFlagStore::new()),
        EndpointConfig::default(),
    )
    .await;
    let err = DialogPresses::new(None, 1, 0)
        .apply(&mut holder)
        .expect_err("must refuse");
    assert_eq!(err, ConfirmRejected::NotConfigured);
}

#[test]
fn cli_accepts_ticks_and_button_presses() {
    let cli = Cli::try_parse_from(["rsvp", "watch", "--ticks", "2"]).expect("watch");
    assert!(matches!(cli.command, Command::Watch { ticks: Some(2), .. }));

    let cli = Cli::try_parse_from(["rsvp", "confirm", "--increment", "3", "--decrement", "1"])
        .expect("confirm");
    assert!(matches!(
        cli.command,
        Command::Confirm {
            party_size: None,
            increment: 3,
            decrement: 1
        }
    ));
}

#[test]
fn cli_rejects_party_size_mixed_with_presses_or_zero() {
    assert!(Cli::try_parse_from(["rsvp", "confirm", "--party-size", "2", "--increment", "1"]).is_err());
    assert!(Cli::try_parse_from(["rsvp", "confirm", "--party-size", "0"]).is_err());
}
