//! Editor account slot
//!
//! The `adminUsers` slot belongs to the login gate, which lives outside this
//! crate. Only loading and storing the list is provided here.

use crate::error::CacheError;
use crate::store::LocalCache;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cache slot holding editor accounts
pub const ACCOUNTS_SLOT: &str = "adminUsers";

/// One editor account as stored by the login gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_role() -> String {
    "user".to_string()
}

impl EditorAccount {
    /// Create an account stamped with the current time
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: role.into(),
            created_at: Some(Utc::now()),
        }
    }

    /// Whether the account has the administrator role
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Load the account list; a missing slot is an empty list
///
/// # Errors
/// `CacheError` if the slot cannot be read or parsed.
pub async fn load_accounts(cache: &dyn LocalCache) -> Result<Vec<EditorAccount>, CacheError> {
    match cache.read(ACCOUNTS_SLOT).await? {
        Some(blob) => Ok(serde_json::from_str(&blob)?),
        None => Ok(Vec::new()),
    }
}

/// Replace the account list
///
/// # Errors
/// `CacheError` if serialization or the write fails.
pub async fn save_accounts(
    cache: &dyn LocalCache,
    accounts: &[EditorAccount],
) -> Result<(), CacheError> {
    let blob = serde_json::to_string(accounts)?;
    cache.write(ACCOUNTS_SLOT, &blob).await
}
