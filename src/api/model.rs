use crate::environment::UpdateParams;
use serde::Deserialize;

/// Path parameters of `/update-by-path/:secret/:fqdn[/:ip_1[/:ip_2]]` and
/// `/delete-by-path/:secret/:fqdn`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct PathRequest {
    pub secret: String,
    pub fqdn: String,
    pub ip_1: Option<String>,
    pub ip_2: Option<String>,
}

impl PathRequest {
    pub fn update_params(self) -> UpdateParams {
        UpdateParams {
            fqdn: Some(self.fqdn),
            ip_1: self.ip_1,
            ip_2: self.ip_2,
            ..UpdateParams::default()
        }
    }
}

/// Query arguments of `/update-by-query`. Any other argument is rejected.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(super) struct QueryRequest {
    #[serde(default)]
    pub secret: String,
    pub fqdn: Option<String>,
    pub zone_name: Option<String>,
    pub record_name: Option<String>,
    pub ip_1: Option<String>,
    pub ip_2: Option<String>,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub ttl: Option<u32>,
}

impl QueryRequest {
    pub fn update_params(self) -> UpdateParams {
        UpdateParams {
            fqdn: self.fqdn,
            zone_name: self.zone_name,
            record_name: self.record_name,
            ip_1: self.ip_1,
            ip_2: self.ip_2,
            ipv4: self.ipv4,
            ipv6: self.ipv6,
            ttl: self.ttl,
        }
    }
}
