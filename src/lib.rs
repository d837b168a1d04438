//! dyndns
//!
//! A small HTTP service that keeps the A and AAAA records of configured zones pointed at the
//! addresses of its clients. Clients authenticate with a shared secret; the records are
//! changed with [RFC-2136][RFC-2136] `UPDATE` messages signed with the zone's
//! [RFC-8945][RFC-8945] TSIG key, and every change is read back to verify it.
//!
//! ```yaml
//! secret: '12345678'
//! nameserver: 127.0.0.1
//! zones:
//!   - name: dyndns.example.com
//!     tsig_key: tPyvZA==
//! ```
//!
//! [RFC-2136]: https://www.rfc-editor.org/rfc/rfc2136
//! [RFC-8945]: https://www.rfc-editor.org/rfc/rfc8945
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod environment;
pub mod error;
pub mod ipaddresses;
pub mod names;
pub mod validate;
pub mod zones;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::{InMemoryNameserver, TsigNameserver};
pub use environment::{ConfiguredEnvironment, UpdateParams};
pub use error::{Error, Result};
