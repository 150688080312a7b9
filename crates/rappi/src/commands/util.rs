//! Shared helpers for command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use rappi_api::{AvailabilityToggle, StoreItemsAvailability};

use crate::cli::ToggleArgs;
use crate::error::CliError;

/// Build a toggle from `--on` / `--off`, refusing ids listed on both sides.
pub fn toggle_from_args(args: ToggleArgs) -> Result<AvailabilityToggle, CliError> {
    let toggle = AvailabilityToggle::new(args.turn_on, args.turn_off);
    check_toggle(&toggle, "--on/--off")?;
    Ok(toggle)
}

/// Reject empty toggles and ids that are both turned on and off.
pub fn check_toggle(toggle: &AvailabilityToggle, field: &str) -> Result<(), CliError> {
    if toggle.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "nothing to turn on or off".into(),
        });
    }
    let overlap = toggle.overlapping();
    if !overlap.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: format!("ids both turned on and off: {}", overlap.join(", ")),
        });
    }
    Ok(())
}

/// Validate every per-store request loaded from `--from-file`.
pub fn check_item_requests(requests: &[StoreItemsAvailability]) -> Result<(), CliError> {
    if requests.is_empty() {
        return Err(CliError::Validation {
            field: "from-file".into(),
            reason: "no store requests in file".into(),
        });
    }
    for request in requests {
        let field = format!("store {}", request.store_integration_id);
        check_toggle(&request.items, &field)?;
    }
    Ok(())
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}
