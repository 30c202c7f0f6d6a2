//! Parsing error types
//!
//! Only page-contract configuration problems are errors. Anything caused by
//! the host page's markup degrades to absent or default field values instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector for {role}: {selector} - {reason}")]
    InvalidSelector {
        role: String,
        selector: String,
        reason: String,
    },

    #[error("No valid selector compiled for {role}: {}", errors.join(", "))]
    NoValidSelector { role: String, errors: Vec<String> },
}

impl ParsingError {
    pub fn invalid_selector(role: &str, selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            role: role.to_string(),
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn no_valid_selector(role: &str, errors: Vec<String>) -> Self {
        Self::NoValidSelector {
            role: role.to_string(),
            errors,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
