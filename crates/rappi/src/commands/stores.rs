//! Store availability handlers.

use rappi_api::AvailabilityClient;

use crate::cli::{GlobalOpts, StoresArgs, StoresCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &AvailabilityClient,
    args: StoresArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StoresCommand::Set(toggle) => {
            let toggle = util::toggle_from_args(toggle)?;
            client.set_store_availability(&toggle).await?;
            if !global.quiet {
                eprintln!(
                    "Stores updated: {} on, {} off",
                    toggle.turn_on.len(),
                    toggle.turn_off.len()
                );
            }
            Ok(())
        }
    }
}
