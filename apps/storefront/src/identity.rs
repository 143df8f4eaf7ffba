//! # Identity and Operator Access
//!
//! The storefront never authenticates anyone. It receives "current user or
//! none" from the identity provider and branches on that.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Option<&User>                                                          │
//! │       │                                                                 │
//! │       ├── None ─────────────────────► AuthenticationRequired            │
//! │       │                                                                 │
//! │       ├── Some(user), email not in GOONJ_ADMIN_EMAILS ─► Forbidden      │
//! │       │                                                                 │
//! │       └── Some(user), listed ──────────────────────────► operator       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use tracing::warn;

use goonj_core::{CoreError, User};

use crate::error::ApiError;

/// Which signed-in users may act as operators.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: HashSet<String>,
}

impl AdminPolicy {
    /// Builds a policy from operator e-mail addresses (case-insensitive).
    pub fn from_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AdminPolicy {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        self.emails.contains(&user.email.trim().to_ascii_lowercase())
    }

    /// Returns the operator, or the reason they may not operate.
    pub fn authorize<'a>(&self, identity: Option<&'a User>) -> Result<&'a User, ApiError> {
        let user = identity.ok_or(CoreError::AuthenticationRequired)?;
        if !self.is_admin(user) {
            warn!(uid = %user.uid, "Operator action refused");
            return Err(ApiError::forbidden("Only store operators may do this"));
        }
        Ok(user)
    }
}

/// Builds the identity the CLI acts as when only an e-mail is known.
pub fn identity_for_email(email: &str) -> User {
    User {
        uid: email.to_string(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        photo_url: None,
    }
}
