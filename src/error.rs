//! Error types.

use trust_dns_client::error::ClientError;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the possible dyndns error states.
///
/// Every variant maps to one of a small set of [kinds][Error::kind] that the
/// [HTTP API][crate::api] reports back to clients as `<KIND>: <message>`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the configuration file is missing, malformed, or contains
    /// values that don't validate.
    #[error("{0}")]
    Configuration(String),

    /// Returned for malformed DNS names, malformed TSIG keys, and names that don't belong to
    /// any configured zone.
    #[error("{0}")]
    DnsName(String),

    /// Returned for malformed IP addresses, IP version mismatches, two addresses of the same
    /// version, or when no address could be determined at all.
    #[error("{0}")]
    IpAddresses(String),

    /// Returned when a client supplies a wrong secret or unknown request parameters.
    #[error("{0}")]
    Parameter(String),

    /// Returned by [`DnsZoneClient::check`][crate::dns::DnsZoneClient::check] when the
    /// temporary TXT record could not be read back.
    #[error("{0}")]
    Check(String),

    /// Returned when talking to the nameserver fails: the peer rejected the TSIG key, the
    /// operation timed out, or the nameserver answered with an error response code.
    #[error("{0}")]
    DnsServer(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred: {0}")]
    IO(#[from] std::io::Error),

    /// Returned when the configuration file isn't valid YAML or doesn't match the expected
    /// schema.
    #[error("invalid YAML: {0}")]
    InvalidYAML(#[from] serde_yaml::Error),

    /// Returned when the DNS client fails in a way not covered by [`Error::DnsServer`].
    #[error("DNS client error: {0}")]
    DNSClientError(#[from] ClientError),

    /// Returned when building or parsing a DNS message fails.
    #[error("DNS error: {0}")]
    DNSError(#[from] ProtoError),
}

impl Error {
    /// The stable, machine-parseable kind label of the error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) | Error::IO(_) | Error::InvalidYAML(_) => {
                "CONFIGURATION_ERROR"
            }
            Error::DnsName(_) => "DNS_NAME_ERROR",
            Error::IpAddresses(_) => "IP_ADDRESS_ERROR",
            Error::Parameter(_) => "PARAMETER_ERROR",
            Error::Check(_) => "CHECK_ERROR",
            Error::DnsServer(_) | Error::DNSClientError(_) | Error::DNSError(_) => {
                "DNS_SERVER_ERROR"
            }
        }
    }

    /// The HTTP status code used when the error is returned by the [HTTP API][crate::api].
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Error::DnsName(_) => 453,
            Error::IpAddresses(_) => 454,
            Error::Configuration(_) | Error::IO(_) | Error::InvalidYAML(_) => 455,
            Error::Parameter(_) => 456,
            Error::Check(_) => 457,
            Error::DnsServer(_) | Error::DNSClientError(_) | Error::DNSError(_) => 512,
        }
    }

    pub(crate) fn peer_bad_key(nameserver: impl std::fmt::Display, zone: &str) -> Self {
        Error::DnsServer(format!(
            "The peer \"{nameserver}\" didn't know the tsig key we used for the zone \"{zone}\"."
        ))
    }

    pub(crate) fn timed_out(nameserver: impl std::fmt::Display) -> Self {
        Error::DnsServer(format!(
            "The DNS operation to the nameserver \"{nameserver}\" timed out."
        ))
    }
}

/// Convenience alias for results carrying an [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
