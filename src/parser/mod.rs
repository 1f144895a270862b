//! WHOIS reply parsing: tokenization into a labeled tree, section-aware
//! normalization onto the output schema, then post-validation.

pub mod dates;
pub mod matching;
pub mod normalize;
pub mod schema;
pub mod tree;

use crate::errors::WhoisError;
use crate::model::{WhoisDate, WhoisRecord};

/// Parse a raw WHOIS reply into a normalized record.
///
/// Fails with [`WhoisError::DomainNotFound`] when the reply carries an
/// explicit not-found message or normalizes to an empty record, and with
/// [`WhoisError::Internal`] when the server reported a transient failure.
pub fn parse(raw_text: &str) -> Result<WhoisRecord, WhoisError> {
    let tree = tree::parse_tree(raw_text);
    let mut record = normalize::normalize_tree(&tree);

    for slot in [
        &mut record.dates.created,
        &mut record.dates.updated,
        &mut record.dates.expires,
    ] {
        if let Some(date) = slot.take() {
            *slot = Some(match date {
                WhoisDate::Raw(raw) => dates::cast_date(&raw),
                parsed => parsed,
            });
        }
    }

    record.raw_text = raw_text.to_string();

    for pattern in schema::NO_SUCH_RECORD_LABELS {
        if raw_text.contains(pattern) {
            return Err(WhoisError::DomainNotFound(
                "explicit not-found message in reply".to_string(),
            ));
        }
    }

    for pattern in schema::TEMP_ERROR {
        if raw_text.contains(pattern) {
            return Err(WhoisError::Internal(
                "server reported a temporary failure".to_string(),
            ));
        }
    }

    if record.is_empty() {
        return Err(WhoisError::DomainNotFound("reply held no data".to_string()));
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const GTLD_REPLY: &str = "\
Domain Name: EXAMPLE.COM
Registry Domain ID: 2336799_DOMAIN_COM-VRSN
Registrar WHOIS Server: whois.example-registrar.tld
Registrar URL: http://www.example-registrar.tld
Updated Date: 2024-08-14T07:01:44Z
Creation Date: 1995-08-14T04:00:00Z
Registry Expiry Date: 2030-01-01T00:00:00Z
Registrar: Example Registrar LLC
Registrar IANA ID: 376
Registrar Abuse Contact Email: abuse@example-registrar.tld
Registrar Abuse Contact Phone: +1.7035551234
Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
Name Server: A.IANA-SERVERS.NET
Name Server: B.IANA-SERVERS.NET
DNSSEC: signedDelegation
";

    #[test]
    fn gtld_reply_populates_the_record() {
        let record = parse(GTLD_REPLY).unwrap();
        assert_eq!(record.domain.as_deref(), Some("EXAMPLE.COM"));
        assert_eq!(
            record.registrar.name.as_deref(),
            Some("Example Registrar LLC")
        );
        assert_eq!(record.registrar_iana_id.as_deref(), Some("376"));
        assert_eq!(
            record.dates.expires,
            Some(WhoisDate::Timestamp(
                Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
            ))
        );
        assert_eq!(
            record.contacts.abuse.email.as_deref(),
            Some("abuse@example-registrar.tld")
        );
        assert_eq!(
            record.nameservers,
            vec!["A.IANA-SERVERS.NET", "B.IANA-SERVERS.NET"]
        );
        assert_eq!(record.status.len(), 2);
        assert_eq!(record.dnssec.as_deref(), Some("signedDelegation"));
        assert_eq!(record.raw_text, GTLD_REPLY);
    }

    #[test]
    fn unparseable_dates_stay_raw() {
        let record = parse("Domain Name: OLD.NET\nCreated: before Aug-1996\n").unwrap();
        assert_eq!(
            record.dates.created,
            Some(WhoisDate::Raw("before Aug-1996".to_string()))
        );
    }

    #[test]
    fn explicit_no_match_raises_domain_not_found() {
        let reply = "\r\nNo match for \"NOPE.TLD\".\r\n";
        assert!(matches!(
            parse(reply),
            Err(WhoisError::DomainNotFound(_))
        ));
    }

    #[test]
    fn temp_error_sentinel_raises_internal() {
        let reply = "Server can't process your request at the moment\r\n";
        assert!(matches!(parse(reply), Err(WhoisError::Internal(_))));
    }

    #[test]
    fn socket_sentinel_normalizes_to_not_found() {
        let reply = "Socket not responding: connection refused";
        assert!(matches!(
            parse(reply),
            Err(WhoisError::DomainNotFound(_))
        ));
    }

    #[test]
    fn empty_reply_raises_domain_not_found() {
        assert!(matches!(parse(""), Err(WhoisError::DomainNotFound(_))));
    }
}
