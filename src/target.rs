//! Turning user input (domain, hostname or IP) into a WHOIS query term.

use std::net::IpAddr;

use once_cell::sync::Lazy;
use publicsuffix::{List, Psl};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;
use tracing::{debug, warn};

use crate::errors::WhoisError;

// Global PSL instance - shared across all lookups
static PSL: Lazy<List> = Lazy::new(List::new);

/// Check that an address is globally routable: no RFC1918/ULA space,
/// loopback, link-local, CGNAT, protocol-assignment, documentation,
/// benchmarking, multicast or reserved ranges.
pub fn is_global_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            !(octets[0] == 0
                || v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                // 100.64.0.0/10 carrier-grade NAT
                || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
                // 192.0.0.0/24 IETF protocol assignments
                || (octets[0] == 192 && octets[1] == 0 && octets[2] == 0)
                || v4.is_documentation()
                // 198.18.0.0/15 benchmarking
                || (octets[0] == 198 && (octets[1] & 0xfe) == 18)
                || v4.is_multicast()
                // 240.0.0.0/4 reserved, includes the broadcast address
                || octets[0] >= 240)
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_multicast()
                // fc00::/7 unique-local
                || (segments[0] & 0xfe00) == 0xfc00
                // fe80::/10 link-local
                || (segments[0] & 0xffc0) == 0xfe80
                // 2001:db8::/32 documentation
                || (segments[0] == 0x2001 && segments[1] == 0x0db8))
        }
    }
}

/// Resolve a globally routable IP address to its PTR hostname.
pub async fn resolve_ip_to_hostname(ip: IpAddr) -> Result<String, WhoisError> {
    if !is_global_ip(&ip) {
        return Err(WhoisError::NonRoutableIp(ip));
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let response = resolver
        .reverse_lookup(ip)
        .await
        .map_err(|e| WhoisError::Network(format!("failed to resolve IP address {ip}: {e}")))?;

    let name = response
        .iter()
        .next()
        .ok_or_else(|| WhoisError::Network(format!("no PTR record for {ip}")))?;

    Ok(name.to_string().trim_end_matches('.').to_string())
}

/// Registrable domain (eTLD+1) for a hostname, with a simple-split
/// fallback when the suffix list cannot place it.
pub fn registrable_domain(hostname: &str) -> String {
    let normalized = hostname.trim().trim_end_matches('.').to_lowercase();

    if let Some(domain) = PSL.domain(normalized.as_bytes()) {
        if let Ok(domain) = std::str::from_utf8(domain.as_bytes()) {
            return domain.to_string();
        }
    }

    warn!("public suffix extraction failed for {normalized}, using fallback");
    let labels: Vec<&str> = normalized.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        normalized
    }
}

/// Extract the WHOIS query term for an arbitrary target: IPs are
/// reverse-resolved to a hostname first, then reduced to the registrable
/// domain. Does not check that the domain exists in DNS.
pub async fn extract_domain(target: &str) -> Result<String, WhoisError> {
    let mut hostname = target.trim().to_string();

    if let Ok(ip) = hostname.parse::<IpAddr>() {
        hostname = resolve_ip_to_hostname(ip).await?;
        debug!("reverse resolution of {target} gave {hostname}");
    }

    Ok(registrable_domain(&hostname))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_addresses_are_global() {
        for ip in ["8.8.8.8", "198.41.0.4", "2607:f8b0:4006:802::200e"] {
            assert!(is_global_ip(&ip.parse().unwrap()), "{ip} should be global");
        }
    }

    #[test]
    fn special_purpose_ranges_are_not_global() {
        let cases = [
            "0.255.0.1",
            "10.1.2.3",
            "100.64.0.1",
            "127.0.0.1",
            "169.254.10.1",
            "172.16.0.1",
            "192.0.0.5",
            "192.0.2.1",
            "192.168.1.1",
            "198.18.0.1",
            "198.51.100.1",
            "203.0.113.7",
            "224.0.0.1",
            "240.0.0.1",
            "255.255.255.255",
            "::1",
            "::",
            "fc00::1",
            "fe80::1",
            "2001:db8::1",
            "ff02::1",
        ];
        for ip in cases {
            assert!(!is_global_ip(&ip.parse().unwrap()), "{ip} should not be global");
        }
    }

    #[test]
    fn registrable_domain_keeps_the_label_under_the_suffix() {
        assert_eq!(registrable_domain("www.example.com"), "example.com");
        assert_eq!(registrable_domain("a.b.example.net"), "example.net");
        assert_eq!(registrable_domain("EXAMPLE.ORG."), "example.org");
    }

    #[tokio::test]
    async fn non_routable_ip_fails_before_any_network_io() {
        let err = extract_domain("198.51.100.1").await.unwrap_err();
        assert!(matches!(err, WhoisError::NonRoutableIp(_)));
    }

    #[tokio::test]
    async fn plain_domains_pass_straight_through() {
        assert_eq!(extract_domain("example.com").await.unwrap(), "example.com");
    }
}
