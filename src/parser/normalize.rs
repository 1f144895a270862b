//! Section-aware mapping of parsed reply trees onto the output schema.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use super::matching::extract_best;
use super::schema::SCHEMA_MAPPING;
use super::tree::{Child, Node, SECTION_BREAK};
use crate::model::{Contact, WhoisDate, WhoisRecord};

const FUZZY_FLOOR: f64 = 90.0;

/// Contact section a reply line can belong to. Alias lists spell the
/// contact roles in their short form ("admin email"), the output schema in
/// the long form ("contacts.administrative.email"); both spellings live
/// here so search terms and write paths stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Registrant,
    Administrative,
    Technical,
    Billing,
    Abuse,
    Registrar,
}

impl Section {
    fn alias_prefix(self) -> &'static str {
        match self {
            Section::Registrant => "registrant",
            Section::Administrative => "admin",
            Section::Technical => "tech",
            Section::Billing => "billing",
            Section::Abuse => "abuse",
            Section::Registrar => "registrar",
        }
    }

    fn path_segment(self) -> &'static str {
        match self {
            Section::Registrant => "registrant",
            Section::Administrative => "administrative",
            Section::Technical => "technical",
            Section::Billing => "billing",
            Section::Abuse => "abuse",
            Section::Registrar => "registrar",
        }
    }

    fn from_trigger_key(key: &str) -> Option<Self> {
        match key {
            "SECTION_ADMIN" => Some(Section::Administrative),
            "SECTION_TECH" => Some(Section::Technical),
            "SECTION_REGISTRANT" => Some(Section::Registrant),
            "SECTION_BILLING" => Some(Section::Billing),
            _ => None,
        }
    }

    /// Sections a `Contact:`/`Contacts:` line can announce through its
    /// value.
    fn from_value_trigger(value: &str) -> Option<Self> {
        match value {
            "registrant" => Some(Section::Registrant),
            "administrative" => Some(Section::Administrative),
            "technical" => Some(Section::Technical),
            "billing" => Some(Section::Billing),
            "abuse" => Some(Section::Abuse),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ResolveResult {
    section_trigger: Option<Section>,
    mapping: Option<String>,
}

struct SchemaMapper {
    section_triggers: HashMap<String, Section>,
    flat_choices: Vec<&'static str>,
}

static MAPPER: Lazy<SchemaMapper> = Lazy::new(SchemaMapper::new);

impl SchemaMapper {
    fn new() -> Self {
        let mut section_triggers = HashMap::new();
        let mut flat_choices = Vec::new();

        for (path, aliases) in SCHEMA_MAPPING {
            flat_choices.extend(aliases.iter().copied());
            if let Some(section) = Section::from_trigger_key(path) {
                for alias in *aliases {
                    section_triggers.insert(alias.to_lowercase(), section);
                }
            }
        }

        Self {
            section_triggers,
            flat_choices,
        }
    }

    fn detect_section_from_value(&self, clean: &str, value: Option<&str>) -> Option<Section> {
        let value = value?;
        if clean == "contact" || clean == "contacts" {
            return Section::from_value_trigger(value.trim().to_lowercase().as_str());
        }
        None
    }

    fn detect_section_from_label(&self, clean: &str) -> Option<Section> {
        if let Some(section) = self.section_triggers.get(clean) {
            return Some(*section);
        }

        if clean == "registrar" || clean == "authorised registrar" {
            return Some(Section::Registrar);
        }
        if clean == "domain registrant" {
            return Some(Section::Registrant);
        }

        // Keyword scan, first match wins.
        for (keyword, section) in [
            ("admin", Section::Administrative),
            ("tech", Section::Technical),
            ("registrant", Section::Registrant),
            ("billing", Section::Billing),
        ] {
            if clean.contains(keyword) {
                return Some(section);
            }
        }

        None
    }

    /// Resolve a label/value pair into a section trigger and/or a schema
    /// path. Search terms are tried section-qualified first, exact matches
    /// over all terms before any fuzzy attempt.
    fn resolve(
        &self,
        label: &str,
        value: Option<&str>,
        current_section: Option<Section>,
    ) -> ResolveResult {
        let clean = label.to_lowercase().replace(':', "").trim().to_string();
        if clean.is_empty() {
            return ResolveResult::default();
        }

        let mut result = ResolveResult::default();

        if let Some(section) = self.detect_section_from_value(&clean, value) {
            debug!(label, value, section = section.path_segment(), "section from value");
            result.section_trigger = Some(section);
            return result;
        }

        let section_from_label = self.detect_section_from_label(&clean);
        if let Some(section) = section_from_label {
            debug!(label, section = section.path_segment(), "section from label");
            result.section_trigger = Some(section);

            let is_plain_header = matches!(
                clean.as_str(),
                "registrar" | "domain registrant" | "authorised registrar"
            );
            if is_plain_header && value.is_some() {
                let path = match section {
                    Section::Registrar => "registrar.name".to_string(),
                    other => format!("contacts.{}.name", other.path_segment()),
                };
                debug!(label, path = %path, "section header carries the name");
                result.mapping = Some(path);
                return result;
            }
        }

        let effective = section_from_label.or(current_section);
        let mut terms: Vec<String> = Vec::new();

        if let Some(section) = effective {
            let prefix = section.alias_prefix();
            if let Some(suffix) = clean.strip_prefix(prefix) {
                let suffix = suffix.trim();
                if !suffix.is_empty() {
                    terms.push(format!("{prefix} {suffix}"));
                }
            }
            terms.push(format!("{} {}", prefix, clean));
        }
        terms.push(clean.clone());

        for term in &terms {
            for (path, aliases) in SCHEMA_MAPPING {
                if path.starts_with("SECTION_") {
                    continue;
                }
                if aliases.iter().any(|a| a.to_lowercase() == *term) {
                    debug!(term = %term, path = %path, "exact match");
                    result.mapping = Some(path.to_string());
                    return result;
                }
            }
        }

        for term in &terms {
            if let Some((best, score)) = extract_best(term, &self.flat_choices) {
                if score > FUZZY_FLOOR {
                    for (path, aliases) in SCHEMA_MAPPING {
                        if path.starts_with("SECTION_") {
                            continue;
                        }
                        if aliases.contains(&best) {
                            debug!(term = %term, best, path = %path, score, "fuzzy match");
                            result.mapping = Some(path.to_string());
                            return result;
                        }
                    }
                }
            }
        }

        debug!(label = %clean, "unresolved label");
        result
    }
}

/// Accumulates the normalized record while tracking the current section.
struct Normalizer {
    current_section: Option<Section>,
    record: WhoisRecord,
}

impl Normalizer {
    fn new() -> Self {
        Self {
            current_section: None,
            record: WhoisRecord::default(),
        }
    }

    fn walk(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn visit(&mut self, node: &Node) {
        let label = node.label.trim();
        let value = node.value.as_deref();

        if label == SECTION_BREAK {
            self.current_section = None;
            return;
        }

        let result = MAPPER.resolve(label, value, self.current_section);

        if let Some(section) = result.section_trigger {
            self.current_section = Some(section);
        }

        match result.mapping {
            Some(path) => {
                // The write runs against the section in effect when the
                // label resolved; global fields reset the section only
                // afterwards, so section-scoped date lines stay suppressed.
                if let Some(value) = value {
                    self.update_value(&path, value);
                }
                let root = path.split('.').next().unwrap_or(&path);
                if root != "contacts" && root != "registrar" {
                    self.current_section = None;
                }
            }
            None => {
                if result.section_trigger.is_none() {
                    if let Some(value) = value {
                        let prefix = self
                            .current_section
                            .map_or("global", Section::path_segment);
                        self.record
                            .other
                            .insert(format!("{prefix}.{label}"), value.to_string());
                    }
                }
            }
        }

        for child in &node.children {
            // Bare continuation text stays in the tree but carries no
            // label to resolve.
            if let Child::Node(child) = child {
                self.visit(child);
            }
        }
    }

    fn update_value(&mut self, path: &str, value: &str) {
        let value = value.trim();
        if value.is_empty()
            || value.eq_ignore_ascii_case("none")
            || value.eq_ignore_ascii_case("no name servers provided")
        {
            return;
        }

        let mut segments = path.split('.');
        match segments.next() {
            Some("dates") => {
                if self.current_section.is_some() {
                    return;
                }
                let slot = match segments.next() {
                    Some("created") => &mut self.record.dates.created,
                    Some("updated") => &mut self.record.dates.updated,
                    Some("expires") => &mut self.record.dates.expires,
                    _ => return,
                };
                if slot.is_none() {
                    *slot = Some(WhoisDate::Raw(value.to_string()));
                }
            }
            Some("nameservers") => push_unique(&mut self.record.nameservers, value),
            Some("status") => push_unique(&mut self.record.status, value),
            Some("domain") => set_if_empty(&mut self.record.domain, value),
            Some("dnssec") => set_if_empty(&mut self.record.dnssec, value),
            Some("registrar_iana_id") => set_if_empty(&mut self.record.registrar_iana_id, value),
            Some("registrar") => {
                if let Some(field) = segments.next() {
                    if let Some(slot) = self.record.registrar.field_mut(field) {
                        join_contact_value(slot, value);
                    }
                }
            }
            Some("contacts") => {
                let contact = match segments.next() {
                    Some("registrant") => &mut self.record.contacts.registrant,
                    Some("administrative") => &mut self.record.contacts.administrative,
                    Some("technical") => &mut self.record.contacts.technical,
                    Some("abuse") => &mut self.record.contacts.abuse,
                    Some("billing") => &mut self.record.contacts.billing,
                    _ => return,
                };
                if let Some(field) = segments.next() {
                    if let Some(slot) = contact.field_mut(field) {
                        join_contact_value(slot, value);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn set_if_empty(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

/// Multi-line contact fields join with ", " in first-seen order; repeats
/// are dropped.
fn join_contact_value(slot: &mut Option<String>, value: &str) {
    match slot {
        None => *slot = Some(value.to_string()),
        Some(existing) => {
            if !existing.contains(value) {
                existing.push_str(", ");
                existing.push_str(value);
            }
        }
    }
}

/// Normalize a parsed reply tree into a record. `raw_text` and date
/// coercion are the caller's job.
pub fn normalize_tree(nodes: &[Node]) -> WhoisRecord {
    let mut normalizer = Normalizer::new();
    normalizer.walk(nodes);
    normalizer.record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree::parse_tree;

    fn normalize(text: &str) -> WhoisRecord {
        normalize_tree(&parse_tree(text))
    }

    #[test]
    fn nameservers_keep_first_seen_order_without_repeats() {
        let record = normalize(
            "Name Server: NS2.EXAMPLE.NET\n\
             Name Server: NS1.EXAMPLE.NET\n\
             Name Server: NS2.EXAMPLE.NET\n",
        );
        assert_eq!(record.nameservers, vec!["NS2.EXAMPLE.NET", "NS1.EXAMPLE.NET"]);
    }

    #[test]
    fn nameserver_sentinel_values_are_discarded() {
        let record = normalize("Name Server: none\nName Server: No name servers provided\n");
        assert!(record.nameservers.is_empty());
    }

    #[test]
    fn status_lines_accumulate() {
        let record = normalize(
            "Domain Status: clientTransferProhibited\n\
             Domain Status: clientDeleteProhibited\n\
             Domain Status: clientTransferProhibited\n",
        );
        assert_eq!(record.status.len(), 2);
    }

    #[test]
    fn dates_inside_contact_sections_are_dropped() {
        let record = normalize(
            "Registrant:\n\
             \tName: Alice Example\n\
             \tCreated: 2001-02-03\n",
        );
        assert!(record.dates.created.is_none());
        assert_eq!(record.contacts.registrant.name.as_deref(), Some("Alice Example"));
    }

    #[test]
    fn top_level_date_before_a_contact_block_is_kept() {
        let record = normalize(
            "Created: 1999-01-01\n\
             \n\
             Registrant:\n\
             \tCreated: 2001-02-03\n",
        );
        assert_eq!(
            record.dates.created,
            Some(WhoisDate::Raw("1999-01-01".to_string()))
        );
    }

    #[test]
    fn scalar_dates_are_first_write_wins() {
        let record = normalize("Created: 1999-01-01\nCreated: 2002-02-02\n");
        assert_eq!(
            record.dates.created,
            Some(WhoisDate::Raw("1999-01-01".to_string()))
        );
    }

    #[test]
    fn repeated_address_lines_join_in_order() {
        let record = normalize(
            "Registrant:\n\
             \tAddress: 1 rue de la Paix\n\
             \tAddress: 75002 Paris\n\
             \tAddress: 1 rue de la Paix\n\
             \tAddress: France\n",
        );
        assert_eq!(
            record.contacts.registrant.street.as_deref(),
            Some("1 rue de la Paix, 75002 Paris, France")
        );
    }

    #[test]
    fn role_qualified_emails_route_without_section_headers() {
        let record = normalize(
            "Registrant Email: owner@example.com\n\
             Admin Email: admin@example.com\n\
             Tech Email: tech@example.com\n",
        );
        assert_eq!(
            record.contacts.registrant.email.as_deref(),
            Some("owner@example.com")
        );
        assert_eq!(
            record.contacts.administrative.email.as_deref(),
            Some("admin@example.com")
        );
        assert_eq!(
            record.contacts.technical.email.as_deref(),
            Some("tech@example.com")
        );
    }

    #[test]
    fn contact_value_line_switches_sections_without_storing() {
        let record = normalize(
            "Contact: technical\n\
             Email: noc@example.org\n",
        );
        assert_eq!(
            record.contacts.technical.email.as_deref(),
            Some("noc@example.org")
        );
        assert!(record.other.is_empty());
    }

    #[test]
    fn registrar_header_with_value_maps_to_registrar_name() {
        let record = normalize("Registrar: Example Registrar LLC\n");
        assert_eq!(
            record.registrar.name.as_deref(),
            Some("Example Registrar LLC")
        );
    }

    #[test]
    fn section_break_resets_the_current_section() {
        let record = normalize(
            "Administrative Contact:\n\
             \tPhone: +33.1234\n\
             \n\
             Phone: +44.5678\n",
        );
        assert_eq!(
            record.contacts.administrative.phone.as_deref(),
            Some("+33.1234")
        );
        // After the break the bare label resolves through the registrant
        // alias for "phone".
        assert_eq!(
            record.contacts.registrant.phone.as_deref(),
            Some("+44.5678")
        );
    }

    #[test]
    fn bare_email_label_in_a_section_follows_the_alias_corpus() {
        // Exact matches over every search term run before any fuzzy
        // attempt, and "email" is a registrant alias.
        let record = normalize(
            "Administrative Contact:\n\
             \tEmail: someone@example.com\n",
        );
        assert_eq!(
            record.contacts.registrant.email.as_deref(),
            Some("someone@example.com")
        );
    }

    #[test]
    fn global_field_match_exits_the_contact_section() {
        let record = normalize(
            "Administrative Contact:\n\
             \tPhone: +33.1234\n\
             Name Server: ns1.example.com\n\
             Created: 2010-01-01\n",
        );
        assert_eq!(record.nameservers, vec!["ns1.example.com"]);
        // The nameserver line left the admin section, so the date is a
        // domain date again.
        assert_eq!(
            record.dates.created,
            Some(WhoisDate::Raw("2010-01-01".to_string()))
        );
    }

    #[test]
    fn unresolved_labels_land_in_other_with_section_prefix() {
        let record = normalize(
            "Registry Domain ID: 2336799_DOMAIN_COM-VRSN\n\
             Administrative Contact:\n\
             \tVAT Number: FR123456\n",
        );
        assert_eq!(
            record.other.get("global.Registry Domain ID").map(String::as_str),
            Some("2336799_DOMAIN_COM-VRSN")
        );
        assert_eq!(
            record.other.get("administrative.VAT Number").map(String::as_str),
            Some("FR123456")
        );
    }

    #[test]
    fn dnssec_and_iana_id_are_global_scalars() {
        let record = normalize(
            "DNSSEC: signedDelegation\n\
             Registrar IANA ID: 1068\n",
        );
        assert_eq!(record.dnssec.as_deref(), Some("signedDelegation"));
        assert_eq!(record.registrar_iana_id.as_deref(), Some("1068"));
    }

    #[test]
    fn domain_name_maps_to_domain() {
        let record = normalize("Domain Name: EXAMPLE.COM\n");
        assert_eq!(record.domain.as_deref(), Some("EXAMPLE.COM"));
    }

    #[test]
    fn extra_blank_lines_do_not_change_the_outcome() {
        let compact = normalize("A: 1\nName Server: ns1.example.com\n");
        let padded = normalize("\n\nA: 1\n\n\n\nName Server: ns1.example.com\n\n");
        assert_eq!(compact.nameservers, padded.nameservers);
        assert_eq!(compact.other, padded.other);
    }
}
