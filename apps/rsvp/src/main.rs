use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AttendeeTotalDisplay, ConfirmRejected, ConfirmationState, DisplayState, EndpointClient,
    FlagStore, RsvpEndpoint, StalePolicy, SubmissionState, TotalPoller,
};
use shared::{
    config::EndpointConfig,
    domain::{PartySize, CONFIRMATION_FLAG_KEY},
};
use storage::Storage;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Confirm attendance and follow the guest count of the party")]
struct Cli {
    /// Overrides the configured endpoint URL.
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Where this device remembers that it already confirmed.
    #[arg(long)]
    state_database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current number of confirmed guests.
    Total,
    /// Keep printing the guest count as it changes.
    Watch {
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Stop after this many published states.
        #[arg(long)]
        ticks: Option<usize>,
        /// Show the error instead of the last known count when a refresh fails.
        #[arg(long)]
        replace_on_error: bool,
    },
    /// Confirm attendance, either for an explicit party size or by pressing
    /// the +/- buttons of the dialog, which starts at one.
    Confirm {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..), conflicts_with_all = ["increment", "decrement"])]
        party_size: Option<u32>,
        /// Presses of the "+" button.
        #[arg(long, default_value_t = 0)]
        increment: u32,
        /// Presses of the "-" button, applied after the "+" presses.
        #[arg(long, default_value_t = 0)]
        decrement: u32,
    },
    /// Show whether this device already confirmed.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = cli.endpoint_url {
        settings.endpoint_url = url;
    }
    if let Some(url) = cli.state_database_url {
        settings.state_database_url = url;
    }

    let config = EndpointConfig::new(settings.endpoint_url);
    let endpoint: Arc<dyn RsvpEndpoint> = Arc::new(EndpointClient::new());

    match cli.command {
        Command::Total => {
            let mut display = AttendeeTotalDisplay::new(StalePolicy::default());
            match display.refresh(endpoint.as_ref(), config.url(), true).await {
                DisplayState::Value(total) => println!("{total} confirmed guests"),
                DisplayState::Error(message) => bail!("{message}"),
                DisplayState::Loading => bail!("the guest count did not load"),
            }
        }
        Command::Watch {
            interval_secs,
            ticks,
            replace_on_error,
        } => {
            let interval = interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(settings.poll_interval);
            let policy = if replace_on_error {
                StalePolicy::ReplaceWithError
            } else {
                StalePolicy::KeepLastValue
            };
            watch(endpoint, config, interval, policy, ticks).await;
        }
        Command::Confirm {
            party_size,
            increment,
            decrement,
        } => {
            let flags = open_state(&settings.state_database_url).await?;
            let presses = DialogPresses::new(party_size, increment, decrement);
            confirm(endpoint, flags, config, presses).await?;
        }
        Command::Status => {
            let flags = open_state(&settings.state_database_url).await?;
            if flags.get(CONFIRMATION_FLAG_KEY).await? {
                println!("This device already confirmed attendance.");
            } else {
                println!("This device has not confirmed attendance yet.");
            }
        }
    }

    Ok(())
}

async fn open_state(database_url: &str) -> Result<Arc<Storage>> {
    let storage = Storage::new(database_url)
        .await
        .with_context(|| format!("failed to open local state at '{database_url}'"))?;
    Ok(Arc::new(storage))
}

async fn watch(
    endpoint: Arc<dyn RsvpEndpoint>,
    config: EndpointConfig,
    interval: Duration,
    policy: StalePolicy,
    ticks: Option<usize>,
) {
    let poller = TotalPoller::spawn(endpoint, config, interval, policy);
    let mut states = WatchStream::new(poller.subscribe());
    let mut printed = 0usize;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = states.next() => {
                let Some(state) = next else { break };
                match state {
                    DisplayState::Loading => println!("Looking for footprints..."),
                    DisplayState::Error(message) => println!("{message}"),
                    DisplayState::Value(total) => println!("{total} confirmed guests"),
                }
                printed += 1;
                if ticks.is_some_and(|max| printed >= max) {
                    break;
                }
            }
        }
    }

    poller.cancel().await;
}

/// Button presses that turn the dialog's initial size of one into the party
/// size to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DialogPresses {
    increment: u32,
    decrement: u32,
}

impl DialogPresses {
    fn new(party_size: Option<u32>, increment: u32, decrement: u32) -> Self {
        match party_size {
            Some(size) => Self {
                increment: size.saturating_sub(1),
                decrement: 0,
            },
            None => Self {
                increment,
                decrement,
            },
        }
    }

    fn apply(self, holder: &mut ConfirmationState) -> Result<PartySize, ConfirmRejected> {
        let mut size = holder.open_dialog()?;
        for _ in 0..self.increment {
            size = holder.increment()?;
        }
        for _ in 0..self.decrement {
            size = holder.decrement()?;
        }
        Ok(size)
    }
}

async fn confirm(
    endpoint: Arc<dyn RsvpEndpoint>,
    flags: Arc<Storage>,
    config: EndpointConfig,
    presses: DialogPresses,
) -> Result<()> {
    let mut holder = ConfirmationState::restore(endpoint, flags, config).await;
    if holder.has_confirmed() {
        println!("Attendance already confirmed on this device.");
        return Ok(());
    }

    let party_size = presses.apply(&mut holder)?;

    match holder.confirm().await? {
        SubmissionState::Success => {
            println!("Thanks! Your attendance for {party_size} has been recorded.");
            Ok(())
        }
        SubmissionState::Error(message) => bail!("{message}"),
        other => bail!("confirmation ended in unexpected state {other:?}"),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
