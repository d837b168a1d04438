//! Validation of user and configuration supplied values.
//!
//! All validators are pure: they either return the normalized value or an [`Error`] of the
//! kind that the caller is expected to surface.

use crate::error::{Error, Result};
use base64::engine::general_purpose;
use base64::Engine;
use lazy_static::lazy_static;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use trust_dns_client::rr::rdata::tsig::TsigAlgorithm;
use trust_dns_client::rr::Name;
use trust_dns_proto::rr::dnssec::tsig::TSigner;

/// The algorithm used to sign all DNS UPDATE messages.
pub const TSIG_ALGORITHM: TsigAlgorithm = TsigAlgorithm::HmacSha512;

/// Allowed clock skew in seconds for TSIG signed messages.
pub const TSIG_FUDGE: u16 = 300;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const MIN_SECRET_LEN: usize = 8;

lazy_static! {
    // NB: unwrap is safe: a constant, well formed name.
    static ref TSIG_PROBE_NAME: Name = Name::from_ascii("tmp.org.").unwrap();
}

/// Version of an IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("4"),
            IpVersion::V6 => f.write_str("6"),
        }
    }
}

/// Validate the shared secret: at least 8 characters, ASCII alphanumeric only.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the secret is too short or contains other characters.
pub fn validate_secret(secret: &str) -> Result<String> {
    if secret.len() >= MIN_SECRET_LEN && secret.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(secret.to_string());
    }
    Err(Error::Configuration(
        "The secret must be at least 8 characters long and may not contain any \
         non-alpha-numeric characters."
            .to_string(),
    ))
}

/// Validate a DNS name and return it in its canonical absolute form: lower case with exactly
/// one trailing dot.
///
/// # Errors
///
/// Returns [`Error::DnsName`] if the name is empty, longer than 253 characters, has an
/// all-numeric top level label, or contains an invalid label.
pub fn validate_dns_name(name: &str) -> Result<String> {
    // Strip exactly one dot from the right, if present.
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(Error::DnsName("The DNS name must not be empty.".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        let head: String = name.chars().take(10).collect();
        return Err(Error::DnsName(format!(
            "The DNS name \"{head}...\" is longer than {MAX_NAME_LEN} characters."
        )));
    }

    let labels: Vec<&str> = name.split('.').collect();
    if let Some(tld) = labels.last() {
        if tld.chars().all(|c| c.is_ascii_digit()) && !tld.is_empty() {
            return Err(Error::DnsName(format!(
                "The TLD \"{tld}\" of the DNS name \"{name}\" must be not all-numeric."
            )));
        }
    }
    if let Some(label) = labels.iter().find(|l| !valid_label(l)) {
        return Err(Error::DnsName(format!(
            "The label \"{label}\" of the hostname \"{name}\" is invalid."
        )));
    }

    Ok(format!("{}.", name.to_ascii_lowercase()))
}

fn valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LEN).contains(&label.len())
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Decode a base64 TSIG key into its raw secret bytes.
///
/// # Errors
///
/// Returns [`Error::DnsName`] if the key is empty or not valid base64.
pub fn decode_tsig_key(tsig_key: &str) -> Result<Vec<u8>> {
    match general_purpose::STANDARD.decode(tsig_key) {
        Ok(raw) if !raw.is_empty() => Ok(raw),
        _ => Err(Error::DnsName(format!("Invalid tsig key: \"{tsig_key}\"."))),
    }
}

/// Validate a base64 TSIG key by building a throwaway HMAC-SHA512 signer with it.
///
/// # Errors
///
/// Returns [`Error::DnsName`] if the key is empty, not valid base64, or rejected by the
/// signer.
pub fn validate_tsig_key(tsig_key: &str) -> Result<String> {
    let raw = decode_tsig_key(tsig_key)?;
    TSigner::new(raw, TSIG_ALGORITHM, TSIG_PROBE_NAME.clone(), TSIG_FUDGE)
        .map_err(|_| Error::DnsName(format!("Invalid tsig key: \"{tsig_key}\".")))?;
    Ok(tsig_key.to_string())
}

/// Validate an IP address, optionally requiring a specific version. Returns the canonical
/// text form of the address together with its version.
///
/// # Errors
///
/// Returns [`Error::IpAddresses`] if the address doesn't parse, or if it is not of the
/// expected version.
pub fn validate_ip_address(
    address: &str,
    expected: Option<IpVersion>,
) -> Result<(String, IpVersion)> {
    let addr = IpAddr::from_str(address)
        .map_err(|_| Error::IpAddresses(format!("Invalid IP address \"{address}\".")))?;
    let version = IpVersion::of(&addr);
    match expected {
        Some(expected) if expected != version => Err(Error::IpAddresses(format!(
            "IP version \"{expected}\" does not match the address \"{address}\"."
        ))),
        _ => Ok((addr.to_string(), version)),
    }
}

/// Validate a port number.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the number is outside of `0..=65535`.
pub fn validate_port(port: i64) -> Result<u16> {
    u16::try_from(port)
        .map_err(|_| Error::Configuration(format!("Invalid port number: {port}.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_boundaries() {
        assert_eq!(validate_secret("12345678").unwrap(), "12345678");
        assert_eq!(validate_secret("abcDEF789").unwrap(), "abcDEF789");
        assert!(matches!(
            validate_secret("1234567"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            validate_secret("1234567!"),
            Err(Error::Configuration(_))
        ));
        assert!(validate_secret("12345 678").is_err());
    }

    #[test]
    fn dns_name_normalization() {
        assert_eq!(validate_dns_name("www.example.com").unwrap(), "www.example.com.");
        assert_eq!(validate_dns_name("www.example.com.").unwrap(), "www.example.com.");
        assert_eq!(validate_dns_name("WWW.Example.COM").unwrap(), "www.example.com.");
        assert_eq!(validate_dns_name("www").unwrap(), "www.");
    }

    #[test]
    fn dns_name_numeric_tld() {
        let err = validate_dns_name("www.example.777").unwrap_err();
        assert!(matches!(err, Error::DnsName(_)));
        assert!(err.to_string().contains("\"777\""));
    }

    #[test]
    fn dns_name_invalid_labels() {
        for name in ["-www.example.com", "www-.example.com", "w_w.example.com", "a..b", "."] {
            assert!(
                matches!(validate_dns_name(name), Err(Error::DnsName(_))),
                "{name} should be rejected"
            );
        }
        let long_label = "a".repeat(64);
        assert!(validate_dns_name(&format!("{long_label}.com")).is_err());
        assert!(validate_dns_name(&format!("{}.com", "a".repeat(63))).is_ok());
    }

    #[test]
    fn dns_name_length_boundary() {
        let label = "a".repeat(63);
        let name_253 = format!("{label}.{label}.{label}.{}", "b".repeat(61));
        assert_eq!(name_253.len(), 253);
        assert!(validate_dns_name(&name_253).is_ok());
        assert!(validate_dns_name(&format!("{name_253}.")).is_ok());

        let name_254 = format!("{label}.{label}.{label}.{}", "b".repeat(62));
        assert_eq!(name_254.len(), 254);
        let err = validate_dns_name(&name_254).unwrap_err();
        assert!(err.to_string().contains("longer than 253 characters"));
    }

    #[test]
    fn tsig_keys() {
        assert_eq!(validate_tsig_key("tPyvZA==").unwrap(), "tPyvZA==");
        assert!(matches!(validate_tsig_key("xxx"), Err(Error::DnsName(_))));
        assert!(matches!(validate_tsig_key(""), Err(Error::DnsName(_))));
    }

    #[test]
    fn ip_addresses() {
        assert_eq!(
            validate_ip_address("1.2.3.4", None).unwrap(),
            ("1.2.3.4".to_string(), IpVersion::V4)
        );
        assert_eq!(
            validate_ip_address("1::2", Some(IpVersion::V6)).unwrap(),
            ("1::2".to_string(), IpVersion::V6)
        );
        let err = validate_ip_address("1::2", Some(IpVersion::V4)).unwrap_err();
        assert!(matches!(err, Error::IpAddresses(_)));
        assert!(err.to_string().contains("does not match"));
        assert!(matches!(
            validate_ip_address("1.2.3", None),
            Err(Error::IpAddresses(_))
        ));
    }

    #[test]
    fn ports() {
        assert_eq!(validate_port(0).unwrap(), 0);
        assert_eq!(validate_port(53).unwrap(), 53);
        assert_eq!(validate_port(65535).unwrap(), 65535);
        assert!(validate_port(65536).is_err());
        assert!(validate_port(-1).is_err());
    }
}
