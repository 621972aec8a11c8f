//! Outcome of verifying a bearer token.

use crate::domain::entities::Principal;
use crate::errors::VerificationFailure;

/// Either the verified caller or the reason the token was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationResult {
    Valid(Principal),
    Invalid(VerificationFailure),
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            VerificationResult::Valid(principal) => Some(principal),
            VerificationResult::Invalid(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            VerificationResult::Valid(_) => None,
            VerificationResult::Invalid(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<Principal, VerificationFailure> {
        match self {
            VerificationResult::Valid(principal) => Ok(principal),
            VerificationResult::Invalid(reason) => Err(reason),
        }
    }
}

impl From<Result<Principal, VerificationFailure>> for VerificationResult {
    fn from(result: Result<Principal, VerificationFailure>) -> Self {
        match result {
            Ok(principal) => VerificationResult::Valid(principal),
            Err(reason) => VerificationResult::Invalid(reason),
        }
    }
}
