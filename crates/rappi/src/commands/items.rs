//! Item availability handlers.

use rappi_api::{AvailabilityClient, StoreItemsAvailability};

use crate::cli::{GlobalOpts, ItemsArgs, ItemsCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &AvailabilityClient,
    args: ItemsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ItemsCommand::Set {
            store,
            toggle,
            from_file,
        } => {
            let requests = match (from_file, store) {
                (Some(path), _) => {
                    let requests: Vec<StoreItemsAvailability> = util::read_json_file(&path)?;
                    util::check_item_requests(&requests)?;
                    requests
                }
                (None, Some(store)) => vec![StoreItemsAvailability {
                    store_integration_id: store,
                    items: util::toggle_from_args(toggle)?,
                }],
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "--store".into(),
                        reason: "either --store or --from-file is required".into(),
                    });
                }
            };

            client.set_item_availability(&requests).await?;
            if !global.quiet {
                eprintln!("Items updated in {} store(s)", requests.len());
            }
            Ok(())
        }
    }
}
