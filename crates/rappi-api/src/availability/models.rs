// Availability service wire types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifiers to switch on and off in one request.
///
/// Order is kept as given and nothing is deduplicated; an id listed in both
/// sets is the caller's mistake, detectable with [`overlapping`](Self::overlapping).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityToggle {
    #[serde(default)]
    pub turn_on: Vec<String>,
    #[serde(default)]
    pub turn_off: Vec<String>,
}

impl AvailabilityToggle {
    pub fn new<I, J, S, T>(turn_on: I, turn_off: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            turn_on: turn_on.into_iter().map(Into::into).collect(),
            turn_off: turn_off.into_iter().map(Into::into).collect(),
        }
    }

    /// Ids present in both `turn_on` and `turn_off`, sorted.
    pub fn overlapping(&self) -> Vec<&str> {
        let on: BTreeSet<&str> = self.turn_on.iter().map(String::as_str).collect();
        let off: BTreeSet<&str> = self.turn_off.iter().map(String::as_str).collect();
        on.intersection(&off).copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.turn_on.is_empty() && self.turn_off.is_empty()
    }
}

/// Item toggles scoped to one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreItemsAvailability {
    pub store_integration_id: String,
    pub items: AvailabilityToggle,
}

/// Body of the client-credentials login.
#[derive(Serialize)]
pub(crate) struct ClientCredentialsGrant<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub audience: &'a str,
    pub grant_type: &'a str,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn store_toggle_serializes_both_lists() {
        let toggle = AvailabilityToggle::new(["S1"], Vec::<String>::new());
        assert_eq!(
            serde_json::to_string(&toggle).unwrap(),
            r#"{"turn_on":["S1"],"turn_off":[]}"#
        );
    }

    #[test]
    fn overlapping_ids_are_reported_once() {
        let toggle = AvailabilityToggle::new(["a", "b", "b", "c"], ["c", "b", "z"]);
        assert_eq!(toggle.overlapping(), vec!["b", "c"]);
        assert_eq!(toggle.turn_on.len(), 4, "duplicates are kept");
    }

    #[test]
    fn item_request_nests_toggle_under_items() {
        let request = StoreItemsAvailability {
            store_integration_id: "900".into(),
            items: AvailabilityToggle::new(["sku-1"], ["sku-2"]),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "store_integration_id": "900",
                "items": { "turn_on": ["sku-1"], "turn_off": ["sku-2"] }
            })
        );
    }

    #[test]
    fn token_response_tolerates_missing_expiry() {
        let parsed: AccessTokenResponse =
            serde_json::from_value(json!({ "access_token": "abc", "token_type": "Bearer" }))
                .unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert!(parsed.expires_in.is_none());
    }
}
