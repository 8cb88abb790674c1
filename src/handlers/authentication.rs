// Allow-list authorization for the description API
//
// This module gates the pipeline endpoints behind a static allow-list of
// caller identities. The list is loaded once at startup and handed to the
// handlers as app data; membership testing is the only operation. The
// check runs before any file is sent to a paid external service.

use log::info;
use std::collections::HashSet;
use std::env;

use crate::error::HandlerError;

/// Default setting for authorization requirement
const DEFAULT_ENABLE_AUTHORIZATION: bool = true;

/// Environment variable holding the comma-separated allow-list
const ENV_AUTHORIZED_EMAILS: &str = "AUTHORIZED_EMAILS";

/// Static set of identities permitted to use the pipeline endpoints
#[derive(Clone, Debug)]
pub struct AllowList {
    enabled: bool,
    entries: HashSet<String>,
}

/// Split a comma-separated allow-list value into trimmed, non-empty entries
fn parse_entries(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

impl AllowList {
    pub fn new(enabled: bool, entries: HashSet<String>) -> Self {
        Self { enabled, entries }
    }

    /// Build the allow-list from environment configuration
    pub fn from_env() -> Self {
        let enabled = env::var("ENABLE_AUTHORIZATION")
            .ok()
            .and_then(|val| val.parse::<bool>().ok())
            .unwrap_or(DEFAULT_ENABLE_AUTHORIZATION);

        let entries = env::var(ENV_AUTHORIZED_EMAILS)
            .map(|raw| parse_entries(&raw))
            .unwrap_or_default();

        if !enabled {
            info!("Authorization requirement is disabled via configuration");
        } else {
            info!("Authorization enabled with {} allowed identities", entries.len());
        }

        Self { enabled, entries }
    }

    /// Check whether an identity may use the pipeline endpoints
    ///
    /// Succeeds iff authorization is disabled, or the identity is present,
    /// non-empty and a member of the set.
    pub fn is_authorized(&self, identity: Option<&str>) -> bool {
        if !self.enabled {
            return true;
        }
        match identity {
            Some(identity) => {
                let identity = identity.trim();
                !identity.is_empty() && self.entries.contains(identity)
            }
            None => false,
        }
    }

    /// `is_authorized` as a short-circuiting handler result
    pub fn authorize(&self, identity: Option<&str>) -> Result<(), HandlerError> {
        if self.is_authorized(identity) {
            Ok(())
        } else {
            Err(HandlerError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list(entries: &[&str]) -> AllowList {
        AllowList::new(true, entries.iter().map(|e| e.to_string()).collect())
    }

    #[test]
    fn parses_comma_separated_entries_with_whitespace() {
        let entries = parse_entries(" a@example.com, b@example.com ,,c@example.com");
        assert_eq!(entries.len(), 3);
        assert!(entries.contains("b@example.com"));
    }

    #[test]
    fn member_identity_is_authorized() {
        let list = allow_list(&["a@example.com"]);
        assert!(list.is_authorized(Some("a@example.com")));
    }

    #[test]
    fn unknown_missing_and_empty_identities_are_rejected() {
        let list = allow_list(&["a@example.com"]);
        assert!(!list.is_authorized(Some("b@example.com")));
        assert!(!list.is_authorized(Some("   ")));
        assert!(!list.is_authorized(None));
    }

    #[test]
    fn empty_list_rejects_everyone() {
        let list = allow_list(&[]);
        assert!(!list.is_authorized(Some("a@example.com")));
    }

    #[test]
    fn disabled_authorization_admits_all() {
        let list = AllowList::new(false, HashSet::new());
        assert!(list.is_authorized(None));
        assert!(list.authorize(Some("whoever")).is_ok());
    }
}
