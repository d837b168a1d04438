//! Collect the IPv4 and IPv6 addresses a record should point to.

use crate::error::{Error, Result};
use crate::validate::{validate_ip_address, IpVersion};
use std::net::IpAddr;

/// Holds at most one IPv4 and one IPv6 address.
///
/// Addresses come from the version tagged `ipv4` / `ipv6` parameters, the untagged `ip_1` /
/// `ip_2` parameters, or, if none of those are given, from the peer address of the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAddressContainer {
    /// The IPv4 address to update the A record with.
    pub ipv4: Option<String>,
    /// The IPv6 address to update the AAAA record with.
    pub ipv6: Option<String>,
}

impl IpAddressContainer {
    /// Collect and validate the candidate addresses. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IpAddresses`] if an address is invalid, a tagged address has the wrong
    /// version, two addresses share a version, or no address is available at all.
    pub fn new(
        ip_1: Option<&str>,
        ip_2: Option<&str>,
        ipv4: Option<&str>,
        ipv6: Option<&str>,
        client_addr: Option<IpAddr>,
    ) -> Result<Self> {
        let mut container = IpAddressContainer::default();

        if let Some(ipv4) = present(ipv4) {
            container.ipv4 = Some(validate_ip_address(ipv4, Some(IpVersion::V4))?.0);
        }
        if let Some(ipv6) = present(ipv6) {
            container.ipv6 = Some(validate_ip_address(ipv6, Some(IpVersion::V6))?.0);
        }
        for ip in [ip_1, ip_2].into_iter().filter_map(present) {
            container.set_ip(ip)?;
        }

        if container.is_empty() {
            if let Some(addr) = client_addr.map(unmapped) {
                tracing::debug!("no ip address given, using client address {addr}");
                container.set_ip(&addr.to_string())?;
            }
        }

        if container.is_empty() {
            return Err(Error::IpAddresses("No ip address set.".to_string()));
        }
        Ok(container)
    }

    /// The address stored for the given version.
    #[must_use]
    pub fn get(&self, version: IpVersion) -> Option<&str> {
        match version {
            IpVersion::V4 => self.ipv4.as_deref(),
            IpVersion::V6 => self.ipv6.as_deref(),
        }
    }

    fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    fn set_ip(&mut self, address: &str) -> Result<()> {
        let (ip, version) = validate_ip_address(address, None)?;
        let slot = match version {
            IpVersion::V4 => &mut self.ipv4,
            IpVersion::V6 => &mut self.ipv6,
        };
        if let Some(old) = slot.as_ref() {
            return Err(Error::IpAddresses(format!(
                "The attribute \"ipv{version}\" is already set and has the value \"{old}\"."
            )));
        }
        *slot = Some(ip);
        Ok(())
    }
}

// IPv4 peers of a dual-stack listener show up as `::ffff:a.b.c.d`.
fn unmapped(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
        IpAddr::V4(_) => addr,
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
