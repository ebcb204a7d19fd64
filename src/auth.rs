//! Shared-secret gate in front of the admin commands.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Incorrect admin password")]
    IncorrectPassword,
}

/// Holds the admin password. The comparison is a plain string match.
#[derive(Debug, Clone)]
pub struct AdminGate {
    password: String,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    pub fn verify(&self, attempt: &str) -> Result<(), AuthError> {
        if attempt == self.password {
            Ok(())
        } else {
            warn!("Rejected admin login");
            Err(AuthError::IncorrectPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let gate = AdminGate::new("perfumes");
        assert_eq!(gate.verify("perfumes"), Ok(()));
        assert_eq!(gate.verify("Perfumes"), Err(AuthError::IncorrectPassword));
        assert_eq!(gate.verify(""), Err(AuthError::IncorrectPassword));
    }
}
