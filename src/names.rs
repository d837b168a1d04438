//! Resolve client supplied names into fully qualified names of configured zones.
//!
//! `record_name` + `zone_name` = `fqdn`

use crate::error::{Error, Result};
use crate::validate::validate_dns_name;
use crate::zones::{ZonesCollection, APEX};

/// A name resolved against the configured zones, e.g. `www.example.com.` split into the
/// record name `www.` and the zone name `example.com.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullyQualifiedDomainName {
    /// The fully qualified domain name, e.g. `www.example.com.`.
    pub fqdn: String,
    /// The zone name, e.g. `example.com.`.
    pub zone_name: String,
    /// The record name, e.g. `www.`. Empty for the zone apex.
    pub record_name: String,
    /// The TSIG key of the zone.
    pub tsig_key: String,
}

impl FullyQualifiedDomainName {
    /// Resolve either a `fqdn` or a `zone_name` and `record_name` pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if all three values are given, a required value is missing,
    /// a name is invalid, or no configured zone contains the name.
    pub fn resolve(
        zones: &ZonesCollection,
        fqdn: Option<&str>,
        zone_name: Option<&str>,
        record_name: Option<&str>,
    ) -> Result<Self> {
        let fqdn = fqdn.filter(|s| !s.is_empty());
        let zone_name = zone_name.filter(|s| !s.is_empty());
        let record_name = record_name.filter(|s| !s.is_empty());

        match (fqdn, zone_name, record_name) {
            (Some(_), Some(_), Some(_)) => Err(Error::DnsName(
                "Specify \"fqdn\" or \"zone_name\" and \"record_name\".".to_string(),
            )),
            (Some(fqdn), _, _) => {
                let fqdn = validate_dns_name(fqdn)?;
                let (record_name, zone_name) = zones.split_fqdn(&fqdn)?.ok_or_else(|| {
                    Error::DnsName(format!(
                        "The fqdn \"{fqdn}\" could not be split into a record and a zone name."
                    ))
                })?;
                Self::with_zone(zones, fqdn, record_name, zone_name)
            }
            (None, Some(zone_name), Some(record_name)) => {
                let zone = zones.get_zone(zone_name)?;
                // The zone name may lie below the zone owning it, e.g. `sub.example.com`
                // within `example.com.`, so the name is split again by the owning zone.
                let zone_name = validate_dns_name(zone_name)?;
                let fqdn = if record_name == APEX {
                    zone_name
                } else {
                    validate_dns_name(record_name)? + &zone_name
                };
                let (record_name, zone_name) = zone.split_fqdn(&fqdn)?;
                Self::with_zone(zones, fqdn, record_name, zone_name)
            }
            (None, None, None) => Err(Error::DnsName(
                "The value \"fqdn\" is required.".to_string(),
            )),
            (None, None, Some(_)) => Err(Error::DnsName(
                "The value \"zone_name\" is required.".to_string(),
            )),
            (None, Some(_), None) => Err(Error::DnsName(
                "The value \"record_name\" is required.".to_string(),
            )),
        }
    }

    /// Resolve a fully qualified name.
    ///
    /// # Errors
    ///
    /// See [`FullyQualifiedDomainName::resolve`].
    pub fn from_fqdn(zones: &ZonesCollection, fqdn: &str) -> Result<Self> {
        Self::resolve(zones, Some(fqdn), None, None)
    }

    fn with_zone(
        zones: &ZonesCollection,
        fqdn: String,
        record_name: String,
        zone_name: String,
    ) -> Result<Self> {
        let tsig_key = zones.get_zone(&zone_name)?.tsig_key().to_string();
        Ok(FullyQualifiedDomainName {
            fqdn,
            zone_name,
            record_name,
            tsig_key,
        })
    }
}
