//! # whois43
//!
//! An async WHOIS client and reply normalizer.
//!
//! ## Features
//!
//! - Per-TLD server selection with an IANA fallback
//! - Recursive referral following to the registrar's WHOIS server
//! - Dual-stack transport with IPv6 preference, source rotation and
//!   optional SOCKS5 proxying via the `SOCKS` environment variable
//! - Indentation-aware reply parsing into a normalized, typed record
//! - Explicit not-found / temporary-failure detection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois43::WhoisClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WhoisClient::new()?;
//!     let record = client.lookup("example.com").await?;
//!
//!     println!("domain: {:?}", record.domain);
//!     println!("expires: {:?}", record.dates.expires);
//!     println!("registrar: {:?}", record.registrar.name);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod errors;
pub mod model;
pub mod net;
pub mod parser;
pub mod target;
pub mod tld_mappings;

// Re-export main types for easy access
pub use client::{LookupFlags, LookupOptions, NicClient};
pub use config::Config;
pub use errors::WhoisError;
pub use model::{Contact, DomainContacts, DomainDates, WhoisDate, WhoisRecord};
pub use net::{Connector, Ipv6SourceCycle, TcpConnector};

use std::time::Duration;

/// High-level WHOIS client: resolves the target to a registrable domain,
/// runs the lookup and parses the reply into a [`WhoisRecord`].
pub struct WhoisClient {
    config: Config,
    client: NicClient,
}

impl WhoisClient {
    /// Create a client from environment-backed configuration.
    pub fn new() -> Result<Self, WhoisError> {
        Ok(Self::with_config(Config::load()?))
    }

    pub fn with_config(config: Config) -> Self {
        let client = NicClient::new(config.clone());
        Self { config, client }
    }

    /// Create a client over a custom connector: a test double, or a
    /// [`TcpConnector`] carrying an IPv6 source-address cycle.
    pub fn with_connector(config: Config, connector: Box<dyn Connector>) -> Self {
        let client = NicClient::with_connector(config.clone(), connector);
        Self { config, client }
    }

    fn default_options(&self) -> LookupOptions {
        LookupOptions {
            ignore_socket_errors: self.config.ignore_socket_errors,
            timeout: Duration::from_secs(self.config.whois_timeout_seconds),
            ..LookupOptions::default()
        }
    }

    /// Look up a domain, hostname or IP address and return the normalized
    /// record.
    pub async fn lookup(&self, target: &str) -> Result<WhoisRecord, WhoisError> {
        let options = self.default_options();
        self.lookup_with_options(target, &options).await
    }

    pub async fn lookup_with_options(
        &self,
        target: &str,
        options: &LookupOptions,
    ) -> Result<WhoisRecord, WhoisError> {
        let text = self.lookup_raw(target, options).await?;
        if text.is_empty() {
            return Err(WhoisError::Internal("whois returned no output".to_string()));
        }
        parser::parse(&text)
    }

    /// Look up a target and return the raw concatenated reply text.
    pub async fn lookup_raw(
        &self,
        target: &str,
        options: &LookupOptions,
    ) -> Result<String, WhoisError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(WhoisError::InvalidQuery("empty target".to_string()));
        }

        let domain = target::extract_domain(target).await?;
        let domain = idna::domain_to_ascii(&domain)
            .map_err(|e| WhoisError::InvalidQuery(format!("IDNA encoding failed: {e:?}")))?;

        let flags = LookupFlags {
            recurse: false,
            quick: options.quick,
        };
        self.client.whois_lookup(options, &domain, flags).await
    }

    /// Delegate the lookup to a system `whois` executable and parse its
    /// output.
    pub async fn lookup_command(
        &self,
        target: &str,
        executable: &str,
        extra_args: &[String],
    ) -> Result<WhoisRecord, WhoisError> {
        let domain = target::extract_domain(target).await?;
        let deadline = Duration::from_secs(self.config.whois_timeout_seconds);
        let text = command::run_native_whois(executable, &domain, extra_args, deadline).await?;
        parser::parse(&text)
    }
}

/// One-shot lookup with default configuration.
pub async fn whois(target: &str) -> Result<WhoisRecord, WhoisError> {
    WhoisClient::new()?.lookup(target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::MockConnector;
    use crate::tld_mappings::IANA_HOST;

    #[test]
    fn whois_client_creation() {
        assert!(WhoisClient::new().is_ok());
    }

    #[tokio::test]
    async fn empty_target_is_rejected() {
        let client = WhoisClient::with_config(Config::default());
        let result = client.lookup("   ").await;
        assert!(matches!(result, Err(WhoisError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn referral_lookup_merges_both_hops() {
        let iana = "% IANA WHOIS server\n\nwhois:        whois.verisign-grs.com\n";
        let first = "Domain Name: EXAMPLE.COM\n\
                     Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\n\
                     Whois Server: whois.example-registrar.tld\n";
        let second = "Registrant Name: Example Owner\n\
                      Registrant Email: owner@example.com\n";

        let connector = MockConnector::default()
            .with_reply(IANA_HOST, iana)
            .with_reply("whois.verisign-grs.com", first)
            .with_reply("whois.example-registrar.tld", second);
        let queries = connector.queries();
        let client = WhoisClient::with_connector(Config::default(), Box::new(connector));

        let record = client.lookup("www.example.com").await.unwrap();

        assert_eq!(record.domain.as_deref(), Some("EXAMPLE.COM"));
        assert_eq!(record.status.len(), 1);
        assert_eq!(
            record.contacts.registrant.name.as_deref(),
            Some("Example Owner")
        );
        assert_eq!(
            record.contacts.registrant.email.as_deref(),
            Some("owner@example.com")
        );

        let queries = queries.lock().unwrap();
        let hosts: Vec<&str> = queries.iter().map(|(host, _)| host.as_str()).collect();
        assert_eq!(
            hosts,
            vec![IANA_HOST, "whois.verisign-grs.com", "whois.example-registrar.tld"]
        );
        // The eTLD+1 is what goes on the wire, not the full hostname.
        assert_eq!(queries[1].1, "example.com");
    }

    #[tokio::test]
    async fn unanswered_lookup_is_reported_as_missing_output() {
        let connector = MockConnector::default().with_reply(IANA_HOST, "% IANA WHOIS server\n");
        let client = WhoisClient::with_connector(Config::default(), Box::new(connector));
        let result = client.lookup("example.nosuchtld").await;
        assert!(matches!(result, Err(WhoisError::Internal(_))));
    }

    #[tokio::test]
    async fn unreachable_server_normalizes_to_domain_not_found() {
        // choose_server resolves statically for .de, the connector then
        // refuses; the sentinel reply parses to an empty record.
        let client =
            WhoisClient::with_connector(Config::default(), Box::new(MockConnector::default()));
        let result = client.lookup("example.de").await;
        assert!(matches!(result, Err(WhoisError::DomainNotFound(_))));
    }
}
