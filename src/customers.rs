//! Payer identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::CustomerUuid;

/// Errors that can occur when parsing an [`Email`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is blank.
    #[error("email cannot be empty")]
    Empty,

    /// The input is longer than an address may be.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },

    /// The input does not contain exactly one `@`.
    #[error("email must contain a single @ symbol")]
    MissingAtSymbol,

    /// Nothing before the `@`.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,

    /// The domain is missing or has no dot.
    #[error("email domain is invalid")]
    InvalidDomain,
}

/// A validated, normalised (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalise an email address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first structural problem.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let normalised = input.trim().to_lowercase();

        if normalised.is_empty() {
            return Err(EmailError::Empty);
        }

        if normalised.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let mut parts = normalised.split('@');

        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::MissingAtSymbol);
        };

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        let domain_ok = domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
            && !domain.starts_with('.')
            && !domain.ends_with('.');

        if !domain_ok {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(normalised))
    }

    /// The normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is paying: an authenticated customer or a guest identified by email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Payer {
    /// Authenticated customer.
    Customer(CustomerUuid),

    /// Guest checkout keyed by a validated email.
    Guest(Email),
}

impl Payer {
    /// Identify the payer from what the server knows.
    ///
    /// An authenticated id always wins. A guest email only identifies the
    /// payer when it parses; otherwise the payer stays unknown.
    #[must_use]
    pub fn identify(customer: Option<CustomerUuid>, guest_email: Option<&str>) -> Option<Self> {
        if let Some(customer) = customer {
            return Some(Self::Customer(customer));
        }

        guest_email
            .and_then(|email| Email::parse(email).ok())
            .map(Self::Guest)
    }

    /// The authenticated id, if any.
    #[must_use]
    pub const fn customer(&self) -> Option<CustomerUuid> {
        match self {
            Self::Customer(uuid) => Some(*uuid),
            Self::Guest(_) => None,
        }
    }

    /// The guest email, if any.
    #[must_use]
    pub const fn guest_email(&self) -> Option<&Email> {
        match self {
            Self::Customer(_) => None,
            Self::Guest(email) => Some(email),
        }
    }
}
