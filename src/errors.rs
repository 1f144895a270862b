use std::net::IpAddr;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhoisError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IP address {0} is not globally routable")]
    NonRoutableIp(IpAddr),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No record found in WHOIS database: {0}")]
    DomainNotFound(String),

    #[error("WHOIS server could not process the request: {0}")]
    Internal(String),

    /// WHOIS access is intentionally restricted by the registry. The
    /// response is policy-based and does not reflect domain status.
    #[error("WHOIS access restricted by registry policy: {0}")]
    PolicyRestricted(String),

    #[error("WHOIS lookup quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Unknown date format: {0}")]
    UnknownDateFormat(String),

    #[error("whois command exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },

    #[error("Failed parsing WHOIS output: {0}")]
    FailedParsingOutput(String),

    #[error("Response too large")]
    ResponseTooLarge,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<tokio::time::error::Elapsed> for WhoisError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        WhoisError::Network("operation timed out".to_string())
    }
}

impl From<std::io::Error> for WhoisError {
    fn from(err: std::io::Error) -> Self {
        WhoisError::Network(err.to_string())
    }
}
