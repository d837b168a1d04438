//! HTTP API for updating the address records of configured zones.
//!
//! All endpoints answer `GET` requests. Successful updates and deletions return HTTP 200 (OK)
//! and a `text/plain` body with one line per record type, e.g.
//!
//! ```text
//! UPDATED: www.example.com. A 1.2.3.4 -> 1.2.3.5
//! UNCHANGED: www.example.com. AAAA None
//! ```
//!
//! Errors return a single `<KIND>: <message>` line with a status code per kind:
//!
//! | Kind                  | Status |
//! |-----------------------|--------|
//! | `DNS_NAME_ERROR`      | 453    |
//! | `IP_ADDRESS_ERROR`    | 454    |
//! | `CONFIGURATION_ERROR` | 455    |
//! | `PARAMETER_ERROR`     | 456    |
//! | `CHECK_ERROR`         | 457    |
//! | `DNS_SERVER_ERROR`    | 512    |
//!
//! # API Endpoints
//!
//! ## `/healthcheck`
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/update-by-path/:secret/:fqdn[/:ip_1[/:ip_2]]`
//!
//!   Sets the A and AAAA records of `fqdn`. `ip_1` and `ip_2` may be IPv4 or IPv6 addresses but
//!   not of the same version. Without any address the peer address of the request is used.
//!   A record type without an address is deleted.
//!
//! ## `/update-by-query`
//!
//!   Like `/update-by-path` with the query arguments `secret`, `fqdn`, `zone_name`,
//!   `record_name`, `ip_1`, `ip_2`, `ipv4`, `ipv6` and `ttl`. Either `fqdn` or `zone_name` and
//!   `record_name` name the record; `record_name=@` addresses the zone apex. Unknown arguments
//!   are rejected with a `PARAMETER_ERROR`.
//!
//! ## `/delete-by-path/:secret/:fqdn`
//!
//!   Deletes the A and AAAA records of `fqdn`.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
