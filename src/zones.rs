//! Configured DNS zones and their TSIG keys.

use crate::config::ZoneConfig;
use crate::error::{Error, Result};
use crate::validate::{validate_dns_name, validate_tsig_key};

/// Record name that addresses the zone apex when a record name is given separately.
pub const APEX: &str = "@";

/// A zone name (e.g. `example.com.`) together with the TSIG key that authorizes updates to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    name: String,
    tsig_key: String,
}

impl Zone {
    /// Create a zone, validating and normalizing its name and validating its TSIG key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if the name or the TSIG key is invalid.
    pub fn new(name: &str, tsig_key: &str) -> Result<Self> {
        Ok(Zone {
            name: validate_dns_name(name)?,
            tsig_key: validate_tsig_key(tsig_key)?,
        })
    }

    /// The normalized zone name, always ending with a dot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base64 encoded TSIG key.
    #[must_use]
    pub fn tsig_key(&self) -> &str {
        &self.tsig_key
    }

    /// Returns the record part of an already normalized name if the name lies within this
    /// zone. The record part keeps its trailing dot (`www.`), and is empty for the apex.
    pub(crate) fn record_part<'a>(&self, fqdn: &'a str) -> Option<&'a str> {
        if fqdn == self.name {
            return Some("");
        }
        let record = fqdn.strip_suffix(self.name.as_str())?;
        record.ends_with('.').then_some(record)
    }

    /// Split a fully qualified name into its record name and this zone's name, e.g.
    /// `www.example.com` → (`www.`, `example.com.`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if the name is invalid or not within this zone.
    pub fn split_fqdn(&self, fqdn: &str) -> Result<(String, String)> {
        let fqdn = validate_dns_name(fqdn)?;
        match self.record_part(&fqdn) {
            Some(record) => Ok((record.to_string(), self.name.clone())),
            None => Err(Error::DnsName(format!(
                "The FQDN \"{fqdn}\" is not splitable by the zone \"{}\".",
                self.name
            ))),
        }
    }

    /// Build a fully qualified name from a record name, e.g. `www` → `www.example.com.`.
    /// The record names `@` and the empty string address the zone apex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if the record name is invalid.
    pub fn build_fqdn(&self, record_name: &str) -> Result<String> {
        if record_name.is_empty() || record_name == APEX {
            return Ok(self.name.clone());
        }
        let record_name = validate_dns_name(record_name)?;
        Ok(record_name + &self.name)
    }

    /// Turn either a record name (`www`) or a fully qualified name within this zone
    /// (`www.example.com`) into its absolute form (`www.example.com.`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if the name is invalid.
    pub fn absolute_name(&self, name: &str) -> Result<String> {
        if name.is_empty() || name == APEX {
            return Ok(self.name.clone());
        }
        let normalized = validate_dns_name(name)?;
        if self.record_part(&normalized).is_some() {
            return Ok(normalized);
        }
        Ok(normalized + &self.name)
    }
}

/// An ordered collection of [`Zone`]s, resolving arbitrary names to the zone that owns them.
#[derive(Debug, Clone, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ZonesCollection {
    zones: Vec<Zone>,
}

impl ZonesCollection {
    /// Build the collection from the configured zones, keeping configuration order. A zone
    /// name configured twice replaces the earlier entry in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if a zone name or TSIG key is invalid.
    pub fn new(zones_config: &[ZoneConfig]) -> Result<Self> {
        let mut collection = ZonesCollection::default();
        for zone_config in zones_config {
            collection.insert(Zone::new(&zone_config.name, &zone_config.tsig_key)?);
        }
        Ok(collection)
    }

    fn insert(&mut self, zone: Zone) {
        match self.zones.iter_mut().find(|z| z.name == zone.name) {
            Some(existing) => *existing = zone,
            None => self.zones.push(zone),
        }
    }

    /// Iterate over the zones in configuration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    // Nested zones (example.com. and dyndns.example.com.) both match
    // test.dyndns.example.com.; the shortest record part selects the most specific zone.
    fn find<'a>(&'a self, fqdn: &str) -> Option<(&'a Zone, String)> {
        self.zones
            .iter()
            .filter_map(|zone| zone.record_part(fqdn).map(|r| (zone, r.to_string())))
            .min_by_key(|(_, record)| record.len())
    }

    /// Find the zone owning the given name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if the name is invalid or no configured zone contains it.
    pub fn get_zone(&self, name: &str) -> Result<&Zone> {
        let name = validate_dns_name(name)?;
        self.find(&name)
            .map(|(zone, _)| zone)
            .ok_or_else(|| Error::DnsName(format!("Unknown zone for the name \"{name}\".")))
    }

    /// Split a name into its record name and the name of the zone owning it. Returns
    /// `Ok(None)` if no configured zone contains the name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if the name is invalid.
    pub fn split_fqdn(&self, fqdn: &str) -> Result<Option<(String, String)>> {
        let fqdn = validate_dns_name(fqdn)?;
        Ok(self
            .find(&fqdn)
            .map(|(zone, record)| (record, zone.name.clone())))
    }
}

impl<'a> IntoIterator for &'a ZonesCollection {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_config(name: &str) -> ZoneConfig {
        ZoneConfig {
            name: name.to_string(),
            tsig_key: "tPyvZA==".to_string(),
        }
    }

    fn nested_zones() -> ZonesCollection {
        ZonesCollection::new(&[zone_config("example.com"), zone_config("dyndns.example.com")])
            .unwrap()
    }

    #[test]
    fn zone_is_normalized() {
        let zone = Zone::new("example.com", "tPyvZA==").unwrap();
        assert_eq!(zone.name(), "example.com.");
        assert_eq!(zone.tsig_key(), "tPyvZA==");
    }

    #[test]
    fn zone_rejects_invalid_tsig_key() {
        assert!(matches!(
            Zone::new("example.com", "xxx"),
            Err(Error::DnsName(_))
        ));
    }

    #[test]
    fn split_fqdn() {
        let zone = Zone::new("example.com", "tPyvZA==").unwrap();
        assert_eq!(
            zone.split_fqdn("www.example.com").unwrap(),
            ("www.".to_string(), "example.com.".to_string())
        );
        assert_eq!(
            zone.split_fqdn("a.b.example.com.").unwrap(),
            ("a.b.".to_string(), "example.com.".to_string())
        );
        assert_eq!(
            zone.split_fqdn("example.com").unwrap(),
            (String::new(), "example.com.".to_string())
        );
        assert!(zone.split_fqdn("www.example.org").is_err());
        // Not a label boundary.
        assert!(zone.split_fqdn("myexample.com").is_err());
    }

    #[test]
    fn split_build_round_trip() {
        let zone = Zone::new("dyndns.example.com.", "tPyvZA==").unwrap();
        for record in ["www", "WWW", "a.b", "x-1"] {
            let fqdn = zone.build_fqdn(record).unwrap();
            let (record_name, zone_name) = zone.split_fqdn(&fqdn).unwrap();
            assert_eq!(record_name, validate_dns_name(record).unwrap());
            assert_eq!(zone_name, "dyndns.example.com.");
            assert_eq!(record_name + &zone_name, fqdn);
        }
    }

    #[test]
    fn build_fqdn_apex() {
        let zone = Zone::new("example.com", "tPyvZA==").unwrap();
        assert_eq!(zone.build_fqdn("@").unwrap(), "example.com.");
        assert_eq!(zone.build_fqdn("www").unwrap(), "www.example.com.");
    }

    #[test]
    fn absolute_name() {
        let zone = Zone::new("example.com", "tPyvZA==").unwrap();
        assert_eq!(zone.absolute_name("www").unwrap(), "www.example.com.");
        assert_eq!(zone.absolute_name("www.example.com").unwrap(), "www.example.com.");
        assert_eq!(zone.absolute_name("example.com.").unwrap(), "example.com.");
    }

    #[test]
    fn nested_zones_pick_most_specific() {
        let zones = nested_zones();
        assert_eq!(
            zones.get_zone("test.dyndns.example.com.").unwrap().name(),
            "dyndns.example.com."
        );
        assert_eq!(
            zones.get_zone("test.example.com").unwrap().name(),
            "example.com."
        );
        assert_eq!(
            zones.split_fqdn("test.dyndns.example.com").unwrap(),
            Some(("test.".to_string(), "dyndns.example.com.".to_string()))
        );
        assert_eq!(
            zones.split_fqdn("dyndns.example.com").unwrap(),
            Some((String::new(), "dyndns.example.com.".to_string()))
        );
    }

    #[test]
    fn nested_zones_order_does_not_matter() {
        let zones =
            ZonesCollection::new(&[zone_config("dyndns.example.com"), zone_config("example.com")])
                .unwrap();
        assert_eq!(
            zones.get_zone("test.dyndns.example.com").unwrap().name(),
            "dyndns.example.com."
        );
    }

    #[test]
    fn unknown_zone() {
        let zones = nested_zones();
        assert!(matches!(
            zones.get_zone("www.example.org"),
            Err(Error::DnsName(_))
        ));
        assert_eq!(zones.split_fqdn("www.example.org").unwrap(), None);
    }

    #[test]
    fn iteration_keeps_order_and_replaces_duplicates() {
        let zones = ZonesCollection::new(&[
            zone_config("b.example"),
            zone_config("a.example"),
            ZoneConfig {
                name: "b.example.".to_string(),
                tsig_key: "aGVsbG8=".to_string(),
            },
        ])
        .unwrap();
        let names: Vec<&str> = zones.iter().map(Zone::name).collect();
        assert_eq!(names, vec!["b.example.", "a.example."]);
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.get_zone("b.example").unwrap().tsig_key(), "aGVsbG8=");
    }
}
