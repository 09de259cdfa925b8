use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error("Invalid policy table: {reason}")]
    InvalidPolicy { reason: String },

    #[error("Invalid loan amount: {value}")]
    InvalidLoanAmount { value: String },

    #[error("Profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("Tool '{name}' not found")]
    UnknownTool { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoanError {
    pub fn invalid_transaction(reason: impl Into<String>) -> Self {
        Self::InvalidTransaction { reason: reason.into() }
    }

    pub fn invalid_policy(reason: impl Into<String>) -> Self {
        Self::InvalidPolicy { reason: reason.into() }
    }
}

pub type LoanResult<T> = Result<T, LoanError>;
