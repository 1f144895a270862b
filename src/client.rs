//! WHOIS wire client: per-server query formatting, the TCP/43 exchange,
//! server selection and one-hop referral recursion.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_TIMEOUT_SECONDS};
use crate::errors::WhoisError;
use crate::net::{Connector, TcpConnector};
use crate::tld_mappings::{
    ARIN_HOST, COUNTRY_HOST_TAIL, CRSNIC_HOST, DENIC_HOST, DK_HOST, HARDCODED_TLD_SERVERS,
    HR_HOST, IANA_HOST, IP_REGISTRY_HOSTS, NORID_HOST, PANDI_HOST, PPUA_HOST,
};

const READ_BUFFER_SIZE: usize = 8192;

static IANA_REFERRAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"whois:\s+(\S+)").unwrap());

/// Lookup behavior switches: `recurse` follows one referral hop,
/// `quick` suppresses recursion entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupFlags {
    pub recurse: bool,
    pub quick: bool,
}

/// Per-lookup options for the driver.
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Query this WHOIS host instead of selecting one.
    pub server: Option<String>,
    /// Query the country NIC at `<country>.whois-servers.net`.
    pub country: Option<String>,
    pub quick: bool,
    /// Encode socket failures as a `"Socket not responding: …"` reply
    /// instead of an error.
    pub ignore_socket_errors: bool,
    pub timeout: Duration,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            server: None,
            country: None,
            quick: false,
            ignore_socket_errors: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

/// Per-server query mutation, applied just before the line is sent.
pub(crate) fn format_query(host: &str, query: &str, many_results: bool) -> String {
    if host == DENIC_HOST {
        format!("-T dn,ace -C UTF-8 {query}")
    } else if host == DK_HOST {
        format!(" --show-handles {query}")
    } else if host.ends_with(".jp") {
        format!("{query}/e")
    } else if host.ends_with(COUNTRY_HOST_TAIL) && many_results {
        format!("={query}")
    } else {
        query.to_string()
    }
}

/// Search a reply for the registrar's WHOIS server. Referral hosts
/// containing `/` are malformed and dropped; first-hop ARIN replies fall
/// back to a scan for the regional IP registries.
pub(crate) fn find_referral(reply: &str, current_host: &str, query: &str) -> Option<String> {
    let pattern = format!(
        r"(?is)Domain Name: {}\s*.*?Whois Server: (\S+)",
        regex::escape(query)
    );
    if let Ok(re) = Regex::new(&pattern) {
        if let Some(captures) = re.captures(reply) {
            let host = captures[1].to_string();
            if host.contains('/') {
                return None;
            }
            return Some(host);
        }
    }

    if current_host == ARIN_HOST {
        return IP_REGISTRY_HOSTS
            .iter()
            .find(|registry| reply.contains(**registry))
            .map(|registry| registry.to_string());
    }

    None
}

pub struct NicClient {
    config: Config,
    connector: Box<dyn Connector>,
}

impl NicClient {
    pub fn new(config: Config) -> Self {
        let connector = Box::new(TcpConnector::new(config.prefer_ipv6));
        Self { config, connector }
    }

    /// Build a client over a custom connector: a SOCKS-free test double,
    /// or a [`TcpConnector`] carrying an IPv6 source cycle.
    pub fn with_connector(config: Config, connector: Box<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// One complete exchange: connect, send the formatted query line, read
    /// to EOF, decode with replacement.
    async fn raw_query(
        &self,
        host: &str,
        query: &str,
        many_results: bool,
        deadline: Duration,
    ) -> Result<String, WhoisError> {
        let mut stream = self.connector.connect(host, deadline).await?;
        let line = format!("{}\r\n", format_query(host, query, many_results));
        debug!("querying {host} with {:?}", line.trim_end());

        timeout(deadline, async {
            stream.write_all(line.as_bytes()).await?;

            let mut response = Vec::new();
            let mut buffer = vec![0u8; READ_BUFFER_SIZE];
            loop {
                let n = stream.read(&mut buffer).await?;
                if n == 0 {
                    break;
                }
                response.extend_from_slice(&buffer[..n]);
                if response.len() > self.config.max_response_size {
                    return Err(WhoisError::ResponseTooLarge);
                }
            }

            Ok(String::from_utf8_lossy(&response).into_owned())
        })
        .await?
    }

    /// Raw query plus the single reformulation pass: servers answering
    /// `with "=xxx"` want the query resent with the `=` prefix.
    async fn query_server(
        &self,
        host: &str,
        query: &str,
        deadline: Duration,
    ) -> Result<String, WhoisError> {
        let text = self.raw_query(host, query, false, deadline).await?;
        if text.contains("with \"=xxx\"") {
            debug!("{host} asked for the =-prefixed form, retrying");
            return self.raw_query(host, query, true, deadline).await;
        }
        Ok(text)
    }

    /// Query `host`, optionally following one referral hop. The referral
    /// is queried with recursion disabled and its reply appended; a
    /// failing referral hop keeps the first reply.
    pub async fn whois(
        &self,
        query: &str,
        host: &str,
        flags: LookupFlags,
        options: &LookupOptions,
    ) -> Result<String, WhoisError> {
        let mut text = match self.query_server(host, query, options.timeout).await {
            Ok(text) => text,
            Err(e @ WhoisError::Network(_)) if options.ignore_socket_errors => {
                warn!("socket error during WHOIS lookup: {e}");
                return Ok(format!("Socket not responding: {e}"));
            }
            Err(e) => return Err(e),
        };

        if flags.recurse && !flags.quick {
            if let Some(referral) = find_referral(&text, host, query) {
                debug!("following referral from {host} to {referral}");
                match self.query_server(&referral, query, options.timeout).await {
                    Ok(more) => text.push_str(&more),
                    Err(e) => warn!("failed to query referral server {referral}: {e}"),
                }
            }
        }

        Ok(text)
    }

    /// Choose the initial NIC host for a domain. Returns `None` when not
    /// even the IANA registry knows a WHOIS server for the TLD.
    pub async fn choose_server(
        &self,
        domain: &str,
        deadline: Duration,
    ) -> Result<Option<String>, WhoisError> {
        let domain = idna::domain_to_ascii(domain)
            .map_err(|e| WhoisError::InvalidQuery(format!("IDNA encoding failed: {e:?}")))?;

        if domain.ends_with("-norid") {
            return Ok(Some(NORID_HOST.to_string()));
        }
        if domain.ends_with(".id") {
            return Ok(Some(PANDI_HOST.to_string()));
        }
        if domain.ends_with(".hr") {
            return Ok(Some(HR_HOST.to_string()));
        }
        if domain.ends_with(".pp.ua") {
            return Ok(Some(PPUA_HOST.to_string()));
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return Ok(None);
        }

        let tld = labels[labels.len() - 1];
        if tld.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            // Reverse-IP query territory.
            return Ok(Some(ARIN_HOST.to_string()));
        }

        if let Some(server) = HARDCODED_TLD_SERVERS.get(tld) {
            return Ok(Some(server.to_string()));
        }

        self.find_server_iana(tld, deadline).await
    }

    /// Ask `whois.iana.org` which server is authoritative for a TLD.
    async fn find_server_iana(
        &self,
        tld: &str,
        deadline: Duration,
    ) -> Result<Option<String>, WhoisError> {
        let reply = self.raw_query(IANA_HOST, tld, false, deadline).await?;
        Ok(IANA_REFERRAL_RE
            .captures(&reply)
            .map(|captures| captures[1].to_string()))
    }

    /// Driver entry point. Without a host or country override the server
    /// is selected per-TLD and one referral hop is followed unless the
    /// quick flag is set.
    pub async fn whois_lookup(
        &self,
        options: &LookupOptions,
        query: &str,
        mut flags: LookupFlags,
    ) -> Result<String, WhoisError> {
        let select_server = options.server.is_none() && options.country.is_none();
        if select_server && !flags.quick && !options.quick {
            flags.recurse = true;
        }

        if let Some(country) = &options.country {
            let host = format!("{country}{COUNTRY_HOST_TAIL}");
            return self.whois(query, &host, flags, options).await;
        }

        if select_server {
            return match self.choose_server(query, options.timeout).await? {
                Some(host) => self.whois(query, &host, flags, options).await,
                None => Ok(String::new()),
            };
        }

        let host = options
            .server
            .clone()
            .unwrap_or_else(|| CRSNIC_HOST.to_string());
        self.whois(query, &host, flags, options).await
    }
}
