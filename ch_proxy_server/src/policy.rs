//! Interpretation of the connection-test charge.
//!
//! The connection test sends a deliberately unfinishable charge. Commerce Hub checks the HMAC signature before it looks
//! at the transaction, so a business rejection (most 4xx codes) means that the credentials were accepted. Only 401 and
//! 403 are taken as authentication failures. Commerce Hub does not document this split; it is an observed
//! behaviour of the certification environment.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionVerdict {
    /// The provider accepted the test charge.
    Accepted,
    /// The signature was accepted, but the transaction was rejected on business grounds.
    AuthenticatedButRejected,
    NotAuthenticated,
}

/// Classify the HTTP status of a connection-test charge. 0 (no response) counts as not authenticated.
pub fn classify_test_charge(status: u16) -> ConnectionVerdict {
    match status {
        200..=299 => ConnectionVerdict::Accepted,
        401 | 403 => ConnectionVerdict::NotAuthenticated,
        400..=499 => ConnectionVerdict::AuthenticatedButRejected,
        _ => ConnectionVerdict::NotAuthenticated,
    }
}

impl ConnectionVerdict {
    pub fn credentials_ok(&self) -> bool {
        !matches!(self, Self::NotAuthenticated)
    }

    pub fn note(&self) -> &'static str {
        match self {
            Self::Accepted => "Credentials authenticated.",
            Self::AuthenticatedButRejected => "Credentials authenticated. Business rejection expected for test.",
            Self::NotAuthenticated => "Could not authenticate.",
        }
    }
}
