//! Reading and updating records on the configured nameserver.
//!
//! # Nameservers
//!
//! All traffic to the nameserver goes through the [`Nameserver`] trait. Two implementations
//! are provided:
//!
//! * [`tsig::TsigNameserver`] talks to a real nameserver. Queries are sent over UDP, updates
//!   are [RFC-2136][RFC-2136] `UPDATE` messages sent over TCP and signed with
//!   [RFC-8945][RFC-8945] TSIG (`hmac-sha512`), using the zone's key. Each zone's key must be
//!   named after the zone, e.g. for BIND:
//!
//!   ```text
//!   ❯ tsig-keygen -a hmac-sha512 dyndns.example.com
//!   key "dyndns.example.com" {
//!           algorithm hmac-sha512;
//!           secret "...";
//!   };
//!   ```
//!
//! * [`memory::InMemoryNameserver`] keeps records in memory. It is not durable and is mostly
//!   useful for testing.
//!
//! # Reconciliation
//!
//! A [`DnsZoneClient`] is bound to one [`Zone`][crate::zones::Zone]. Every change it makes
//! reads the record before and after writing it and reports both values as a
//! [`DnsChangeMessage`]. [`DnsZoneClient::set_record`] skips the write altogether when the
//! record already holds the desired value, so repeating a request is harmless.
//!
//! [RFC-2136]: https://www.rfc-editor.org/rfc/rfc2136
//! [RFC-8945]: https://www.rfc-editor.org/rfc/rfc8945

use crate::error::Error;
use crate::validate::IpVersion;
use crate::zones::Zone;
use std::fmt;
use std::sync::Arc;

pub mod client;
pub mod memory;
pub mod tsig;

pub use client::DnsZoneClient;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryNameserver;
#[allow(clippy::module_name_repetitions)]
pub use tsig::TsigNameserver;

/// TTL in seconds used when a request doesn't specify one.
pub const DEFAULT_TTL: u32 = 300;

/// The record types dyndns reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    A,
    AAAA,
    TXT,
}

impl RecordType {
    /// The address record type for the given IP version.
    #[must_use]
    pub fn for_version(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::AAAA,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::TXT => "TXT",
        })
    }
}

impl From<RecordType> for trust_dns_client::rr::RecordType {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => trust_dns_client::rr::RecordType::A,
            RecordType::AAAA => trust_dns_client::rr::RecordType::AAAA,
            RecordType::TXT => trust_dns_client::rr::RecordType::TXT,
        }
    }
}

/// A single change to send to the nameserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    /// Delete all records of `record_type` at `fqdn`, then add one with `content`.
    Replace {
        fqdn: String,
        record_type: RecordType,
        content: String,
        ttl: u32,
    },
    /// Delete all records of `record_type` at `fqdn`.
    Delete {
        fqdn: String,
        record_type: RecordType,
    },
}

impl RecordUpdate {
    #[must_use]
    pub fn fqdn(&self) -> &str {
        match self {
            RecordUpdate::Replace { fqdn, .. } | RecordUpdate::Delete { fqdn, .. } => fqdn,
        }
    }

    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordUpdate::Replace { record_type, .. } | RecordUpdate::Delete { record_type, .. } => {
                *record_type
            }
        }
    }
}

/// `DynNameserver` is a type alias for a [`Nameserver`] shared between the per zone
/// [`DnsZoneClient`]s through an [`Arc`].
#[allow(clippy::module_name_repetitions)]
pub type DynNameserver = Arc<dyn Nameserver + Send + Sync>;

/// An async trait describing the nameserver holding the records of the configured zones.
#[async_trait::async_trait]
pub trait Nameserver {
    /// Read the first record of the given type at an absolute name. Returns `None` if the name
    /// or the record doesn't exist. For TXT records the first string of the record is returned.
    async fn query(&self, fqdn: &str, record_type: RecordType) -> Result<Option<String>, Error>;

    /// Apply an update to the given zone, authorized by the zone's TSIG key.
    async fn update(&self, zone: &Zone, update: RecordUpdate) -> Result<(), Error>;
}

/// The outcome of reading, changing and re-reading one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsChangeMessage {
    pub fqdn: String,
    pub record_type: RecordType,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl DnsChangeMessage {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.old != self.new
    }

    /// Log the message, `UPDATED` at info and `UNCHANGED` at debug level.
    pub fn log(&self) {
        if self.changed() {
            tracing::info!("{self}");
        } else {
            tracing::debug!("{self}");
        }
    }
}

fn or_none(value: Option<&String>) -> &str {
    value.map_or("None", String::as_str)
}

impl fmt::Display for DnsChangeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed() {
            write!(
                f,
                "UPDATED: {} {} {} -> {}",
                self.fqdn,
                self.record_type,
                or_none(self.old.as_ref()),
                or_none(self.new.as_ref())
            )
        } else {
            write!(
                f,
                "UNCHANGED: {} {} {}",
                self.fqdn,
                self.record_type,
                or_none(self.new.as_ref())
            )
        }
    }
}
