//! Command dispatch: bridges CLI args -> API clients -> output formatting.

pub mod config_cmd;
pub mod items;
pub mod orders;
pub mod stores;
pub mod util;

use rappi_api::{AvailabilityClient, LoginEvent, MarketplaceClient};
use tracing::info;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Orders(args) => {
            let client = marketplace_client(session)?;
            orders::handle(&client, args, session, global).await
        }
        Command::Stores(args) => {
            let client = availability_client(session)?;
            stores::handle(&client, args, global).await
        }
        Command::Items(args) => {
            let client = availability_client(session)?;
            items::handle(&client, args, global).await
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

fn log_login(event: &LoginEvent) {
    info!(
        integration = event.integration,
        expires_at = %event.expires_at,
        "credential refreshed"
    );
}

/// Marketplace client for the active profile.
pub fn marketplace_client(session: &Session) -> Result<MarketplaceClient, CliError> {
    let config = session.marketplace_config()?;
    let client = MarketplaceClient::from_config(&config, session.transport())?;
    Ok(client.with_login_observer(log_login))
}

/// Availability client for the active profile.
pub fn availability_client(session: &Session) -> Result<AvailabilityClient, CliError> {
    let config = session.availability_config()?;
    let client = AvailabilityClient::from_config(&config, session.transport())?;
    Ok(client.with_login_observer(log_login))
}
