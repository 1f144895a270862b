use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A date field from a WHOIS reply: either a coerced UTC timestamp or the
/// original string when the reply used a format we could not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhoisDate {
    Timestamp(DateTime<Utc>),
    Raw(String),
}

impl WhoisDate {
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            WhoisDate::Timestamp(ts) => Some(*ts),
            WhoisDate::Raw(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<WhoisDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<WhoisDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<WhoisDate>,
}

impl DomainDates {
    pub fn is_empty(&self) -> bool {
        self.created.is_none() && self.updated.is_none() && self.expires.is_none()
    }
}

/// One contact role (registrant, admin, tech, billing, abuse) or the
/// registrar. All fields optional; multi-line values are joined with ", ".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

impl Contact {
    /// Field access by schema path segment, for the path-driven writer.
    pub fn field_mut(&mut self, field: &str) -> Option<&mut Option<String>> {
        match field {
            "email" => Some(&mut self.email),
            "name" => Some(&mut self.name),
            "street" => Some(&mut self.street),
            "city" => Some(&mut self.city),
            "postal_code" => Some(&mut self.postal_code),
            "state" => Some(&mut self.state),
            "country" => Some(&mut self.country),
            "organization" => Some(&mut self.organization),
            "phone" => Some(&mut self.phone),
            "fax" => Some(&mut self.fax),
            "handle" => Some(&mut self.handle),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Contact::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainContacts {
    pub registrant: Contact,
    pub administrative: Contact,
    pub technical: Contact,
    pub abuse: Contact,
    pub billing: Contact,
}

impl DomainContacts {
    pub fn is_empty(&self) -> bool {
        self.registrant.is_empty()
            && self.administrative.is_empty()
            && self.technical.is_empty()
            && self.abuse.is_empty()
            && self.billing.is_empty()
    }
}

/// Normalized WHOIS record produced by the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub status: Vec<String>,
    pub dates: DomainDates,
    pub nameservers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<String>,
    pub registrar: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_iana_id: Option<String>,
    pub contacts: DomainContacts,
    pub other: BTreeMap<String, String>,
    #[serde(default)]
    pub raw_text: String,
}

impl WhoisRecord {
    /// True when no schema field carries any value. The `other` catch-all
    /// and `raw_text` do not count: a reply whose every line failed to
    /// resolve holds no record.
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.status.is_empty()
            && self.dates.is_empty()
            && self.nameservers.is_empty()
            && self.dnssec.is_none()
            && self.registrar.is_empty()
            && self.registrar_iana_id.is_none()
            && self.contacts.is_empty()
    }
}
