//! The configured service: zones, one [`DnsZoneClient`] per zone, and the update and delete
//! operations offered to clients.

use crate::config::SharedConfig;
use crate::dns::{
    DnsChangeMessage, DnsZoneClient, DynNameserver, RecordType, TsigNameserver, DEFAULT_TTL,
};
use crate::error::{Error, Result};
use crate::ipaddresses::IpAddressContainer;
use crate::names::FullyQualifiedDomainName;
use crate::validate::IpVersion;
use crate::zones::ZonesCollection;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

/// The parameters of an update request, after authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateParams {
    pub fqdn: Option<String>,
    pub zone_name: Option<String>,
    pub record_name: Option<String>,
    pub ip_1: Option<String>,
    pub ip_2: Option<String>,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub ttl: Option<u32>,
}

pub struct ConfiguredEnvironment {
    config: SharedConfig,
    zones: ZonesCollection,
    dns_zones: HashMap<String, DnsZoneClient>,
}

impl ConfiguredEnvironment {
    /// Build the environment talking to the configured nameserver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if a configured zone is invalid.
    pub fn new(config: SharedConfig) -> Result<Self> {
        let nameserver = Arc::new(TsigNameserver::new(
            config.nameserver,
            config.port,
            config.dns_timeout,
        ));
        Self::with_nameserver(config, nameserver)
    }

    /// Build the environment talking to the given nameserver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if a configured zone is invalid.
    pub fn with_nameserver(config: SharedConfig, nameserver: DynNameserver) -> Result<Self> {
        let zones = ZonesCollection::new(&config.zones)?;
        let dns_zones = zones
            .iter()
            .map(|zone| {
                let client = DnsZoneClient::new(nameserver.clone(), zone.clone());
                (zone.name().to_string(), client)
            })
            .collect();
        Ok(ConfiguredEnvironment {
            config,
            zones,
            dns_zones,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    #[must_use]
    pub fn zones(&self) -> &ZonesCollection {
        &self.zones
    }

    /// The client for the zone owning `name`, a zone name or a fully qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] if no configured zone contains the name.
    pub fn dns_for_zone(&self, name: &str) -> Result<&DnsZoneClient> {
        let zone = self.zones.get_zone(name)?;
        self.dns_zones
            .get(zone.name())
            .ok_or_else(|| Error::DnsName(format!("Unknown zone \"{}\".", zone.name())))
    }

    /// # Errors
    ///
    /// Returns [`Error::Parameter`] unless `secret` is the configured secret.
    pub fn authenticate(&self, secret: &str) -> Result<()> {
        if secret != self.config.secret {
            return Err(Error::Parameter(
                "You specified a wrong secret key.".to_string(),
            ));
        }
        Ok(())
    }

    /// Point the A and AAAA records of a name at the requested addresses. A record type
    /// without an address is deleted. Returns one `UPDATED` or `UNCHANGED` line per record
    /// type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or the addresses are invalid, or talking to the
    /// nameserver fails.
    pub async fn update_record(
        &self,
        params: &UpdateParams,
        client_addr: Option<IpAddr>,
    ) -> Result<String> {
        let name = FullyQualifiedDomainName::resolve(
            &self.zones,
            params.fqdn.as_deref(),
            params.zone_name.as_deref(),
            params.record_name.as_deref(),
        )?;
        let ip = IpAddressContainer::new(
            params.ip_1.as_deref(),
            params.ip_2.as_deref(),
            params.ipv4.as_deref(),
            params.ipv6.as_deref(),
            client_addr,
        )?;
        let dns = self.dns_for_zone(&name.zone_name)?;
        let ttl = params.ttl.unwrap_or(DEFAULT_TTL);

        let mut messages = String::new();
        for version in [IpVersion::V4, IpVersion::V6] {
            let record_type = RecordType::for_version(version);
            let message = match ip.get(version) {
                Some(address) => {
                    dns.set_record(&name.fqdn, record_type, address, ttl)
                        .await?
                }
                None => dns.delete_record(&name.fqdn, record_type).await?,
            };
            messages.push_str(&render(&message));
        }
        Ok(messages)
    }

    /// Delete the A and AAAA records of a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, or talking to the nameserver fails.
    pub async fn delete_record(&self, fqdn: &str) -> Result<String> {
        let name = FullyQualifiedDomainName::from_fqdn(&self.zones, fqdn)?;
        let dns = self.dns_for_zone(&name.zone_name)?;
        let is_a = dns.is_a_record(&name.fqdn).await?;
        let is_aaaa = dns.is_aaaa_record(&name.fqdn).await?;

        if is_a || is_aaaa {
            dns.delete_records(&name.fqdn).await?;
            let message = format!(
                "UPDATED: The A and AAAA records of the domain name '{}' were deleted.",
                name.fqdn
            );
            tracing::info!("{message}");
            return Ok(message + "\n");
        }
        let message = format!(
            "UNCHANGED: The deletion of the domain name '{}' was not executed because there \
             were no A or AAAA records.",
            name.fqdn
        );
        tracing::debug!("{message}");
        Ok(message + "\n")
    }

    /// Run [`DnsZoneClient::check`] for every zone, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub async fn check(&self) -> Result<String> {
        let mut outputs = Vec::with_capacity(self.zones.len());
        for zone in &self.zones {
            outputs.push(self.dns_for_zone(zone.name())?.check().await?);
        }
        Ok(outputs.join("\n"))
    }
}

fn render(message: &DnsChangeMessage) -> String {
    message.log();
    format!("{message}\n")
}
