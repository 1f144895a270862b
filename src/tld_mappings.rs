use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const IANA_HOST: &str = "whois.iana.org";
pub const ARIN_HOST: &str = "whois.arin.net";
pub const LACNIC_HOST: &str = "whois.lacnic.net";
pub const RIPE_HOST: &str = "whois.ripe.net";
pub const APNIC_HOST: &str = "whois.apnic.net";
pub const REGISTRO_BR_HOST: &str = "whois.registro.br";
pub const PANDI_HOST: &str = "whois.pandi.or.id";

/// Default host for the generic driver path (legacy InterNIC alias that
/// redirects to the Verisign GRS servers).
pub const CRSNIC_HOST: &str = "whois.crsnic.net";

pub const NORID_HOST: &str = "whois.norid.no";
pub const HR_HOST: &str = "whois.dns.hr";
pub const PPUA_HOST: &str = "whois.pp.ua";
pub const DENIC_HOST: &str = "whois.denic.de";
pub const DK_HOST: &str = "whois.dk-hostmaster.dk";

/// Country-code hosts follow the `<cc>.whois-servers.net` convention.
pub const COUNTRY_HOST_TAIL: &str = ".whois-servers.net";

/// IP registries an ARIN reply may point at without a structured referral
/// line; scanned as plain substrings in first-hop ARIN output.
pub const IP_REGISTRY_HOSTS: &[&str] = &[
    LACNIC_HOST,
    RIPE_HOST,
    APNIC_HOST,
    REGISTRO_BR_HOST,
    PANDI_HOST,
];

// Registries that are missing from IANA referrals or answer faster when
// queried directly. IDN TLDs carry both the U-label and A-label keys;
// lookups happen on the IDNA-encoded domain so the A-label is the one that
// matches in practice.
pub static HARDCODED_TLD_SERVERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert("ai", "whois.nic.ai");
    map.insert("app", "whois.nic.google");
    map.insert("ar", "whois.nic.ar");
    map.insert("bw", "whois.nic.net.bw");
    map.insert("by", "whois.cctld.by");
    map.insert("ca", "whois.ca.fury.ca");
    map.insert("chat", "whois.nic.chat");
    map.insert("cl", "whois.nic.cl");
    map.insert("cm", "whois.netcom.cm");
    map.insert("cr", "whois.nic.cr");
    map.insert("de", DENIC_HOST);
    map.insert("dev", "whois.nic.google");
    map.insert("dk", DK_HOST);
    map.insert("do", "whois.nic.do");
    map.insert("games", "whois.nic.games");
    map.insert("goog", "whois.nic.google");
    map.insert("google", "whois.nic.google");
    map.insert("group", "whois.namecheap.com");
    map.insert("hk", "whois.hkirc.hk");
    map.insert("hn", "whois.nic.hn");
    map.insert("ist", "whois.afilias-srs.net");
    map.insert("jp", "whois.jprs.jp");
    map.insert("kz", "whois.nic.kz");
    map.insert("lat", "whois.nic.lat");
    map.insert("li", "whois.nic.li");
    map.insert("live", "whois.nic.live");
    map.insert("lt", "whois.domreg.lt");
    map.insert("market", "whois.nic.market");
    map.insert("money", "whois.nic.money");
    map.insert("mx", "whois.mx");
    map.insert("ng", "whois.nic.net.ng");
    map.insert("nl", "whois.domain-registry.nl");
    map.insert("online", "whois.nic.online");
    map.insert("ooo", "whois.nic.ooo");
    map.insert("page", "whois.nic.page");
    map.insert("pe", "kero.yachay.pe");
    map.insert("sg", "whois.sgnic.sg");
    map.insert("site", "whois.nic.site");
    map.insert("tn", "whois.ati.tn");
    map.insert("website", "whois.nic.website");
    map.insert("za", "whois.registry.net.za");

    // TCI-operated zones
    map.insert("ru", "whois.tcinet.ru");
    map.insert("su", "whois.tcinet.ru");
    map.insert("bz", "whois.tcinet.ru");
    map.insert("city", "whois.tcinet.ru");
    map.insert("style", "whois.tcinet.ru");
    map.insert("рус", "whois.tcinet.ru");
    map.insert("xn--p1acf", "whois.tcinet.ru");
    map.insert("рф", "whois.registry.tcinet.ru");
    map.insert("xn--p1ai", "whois.registry.tcinet.ru");

    // Identity Digital
    map.insert("direct", "whois.identitydigital.services");
    map.insert("immo", "whois.identitydigital.services");
    map.insert("life", "whois.identitydigital.services");

    // GoDaddy Registry
    map.insert("fashion", "whois.dnrs.godaddy");
    map.insert("vip", "whois.dnrs.godaddy");

    map.insert("shop", "whois.nic.shop");
    map.insert("store", "whois.centralnic.com");
    map.insert("design", "whois.nic.design");
    map.insert("studio", "whois.nic.studio");
    map.insert("sbs", "whois.nic.sbs");
    map.insert("ga", "whois.nic.ga");
    map.insert("xyz", "whois.nic.xyz");

    map.insert("дети", "whois.nic.xn--d1acj3b");
    map.insert("xn--d1acj3b", "whois.nic.xn--d1acj3b");
    map.insert("москва", "whois.registry.nic.xn--80adxhks");
    map.insert("xn--80adxhks", "whois.registry.nic.xn--80adxhks");
    map.insert("орг", "whois.publicinterestregistry.org");
    map.insert("xn--c1avg", "whois.publicinterestregistry.org");
    map.insert("укр", "whois.dotukr.com");
    map.insert("xn--j1amh", "whois.dotukr.com");

    map
});
