//! A [`Nameserver`][super::Nameserver] backed by a real nameserver.
//!
//! Uses the synchronous trust-dns client on tokio's blocking thread pool. Queries go out over
//! UDP, updates over TCP signed with the zone's TSIG key. Both are bounded by the configured
//! timeout.
use crate::dns::{Nameserver, RecordType, RecordUpdate};
use crate::error::Error;
use crate::validate::{decode_tsig_key, TSIG_ALGORITHM, TSIG_FUDGE};
use crate::zones::Zone;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use trust_dns_client::client::{Client, SyncClient};
use trust_dns_client::error::{ClientError, ClientErrorKind};
use trust_dns_client::op::{Message, ResponseCode};
use trust_dns_client::rr::rdata::TXT;
use trust_dns_client::rr::{DNSClass, Name, RData, Record};
use trust_dns_client::tcp::TcpClientConnection;
use trust_dns_client::udp::UdpClientConnection;
use trust_dns_proto::error::{ProtoError, ProtoErrorKind};
use trust_dns_proto::rr::dnssec::tsig::TSigner;

#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TsigNameserver {
    addr: SocketAddr,
    timeout: Duration,
}

impl TsigNameserver {
    #[must_use]
    pub fn new(nameserver: IpAddr, port: u16, timeout: Duration) -> Self {
        TsigNameserver {
            addr: SocketAddr::new(nameserver, port),
            timeout,
        }
    }

    // The key is named after the zone it authorizes, as produced by `tsig-keygen <zone>`.
    fn signer(zone: &Zone) -> Result<TSigner, Error> {
        let key = decode_tsig_key(zone.tsig_key())?;
        let key_name = Name::from_ascii(zone.name())?;
        Ok(TSigner::new(key, TSIG_ALGORITHM, key_name, TSIG_FUDGE)?)
    }

    fn transport_error(&self, err: ClientError, zone: Option<&Zone>) -> Error {
        let timed_out = match err.kind() {
            ClientErrorKind::Timeout => true,
            ClientErrorKind::Proto(proto) => matches!(proto.kind(), ProtoErrorKind::Timeout),
            _ => false,
        };
        if timed_out {
            return Error::timed_out(self.addr.ip());
        }
        // An unsigned BADKEY answer fails verification of the response signature.
        if let Some(zone) = zone {
            if err.to_string().to_ascii_lowercase().contains("tsig") {
                return Error::peer_bad_key(self.addr.ip(), zone.name());
            }
        }
        Error::DNSClientError(err)
    }

    fn rejected(&self, code: ResponseCode, zone: &Zone, update: &RecordUpdate) -> Error {
        if code == ResponseCode::NotAuth {
            return Error::peer_bad_key(self.addr.ip(), zone.name());
        }
        Error::DnsServer(format!(
            "The nameserver \"{}\" rejected the update of the {} record of \"{}\": {code:?}.",
            self.addr.ip(),
            update.record_type(),
            update.fqdn()
        ))
    }
}

fn rdata(record_type: RecordType, content: &str) -> Result<RData, Error> {
    let invalid =
        || Error::IpAddresses(format!("Invalid {record_type} record content \"{content}\"."));
    Ok(match record_type {
        RecordType::A => RData::A(Ipv4Addr::from_str(content).map_err(|_| invalid())?),
        RecordType::AAAA => RData::AAAA(Ipv6Addr::from_str(content).map_err(|_| invalid())?),
        RecordType::TXT => RData::TXT(TXT::new(vec![content.to_string()])),
    })
}

fn rdata_content(rdata: &RData) -> Option<String> {
    match rdata {
        RData::A(addr) => Some(addr.to_string()),
        RData::AAAA(addr) => Some(addr.to_string()),
        RData::TXT(txt) => txt
            .txt_data()
            .first()
            .map(|s| String::from_utf8_lossy(s).into_owned()),
        _ => None,
    }
}

fn first_answer(message: &Message, record_type: RecordType) -> Option<String> {
    let record_type = record_type.into();
    message
        .answers()
        .iter()
        .filter(|record| record.record_type() == record_type)
        .find_map(|record| record.data().and_then(rdata_content))
}

/// The content of the first answer of a query. A missing name or record is `Ok(None)`, any
/// other error code is returned.
fn query_answer(
    message: &Message,
    record_type: RecordType,
) -> Result<Option<String>, ResponseCode> {
    match message.response_code() {
        ResponseCode::NoError => Ok(first_answer(message, record_type)),
        ResponseCode::NXDomain => Ok(None),
        code => Err(code),
    }
}

#[async_trait::async_trait]
impl Nameserver for TsigNameserver {
    async fn query(&self, fqdn: &str, record_type: RecordType) -> Result<Option<String>, Error> {
        let name = Name::from_ascii(fqdn)?;
        let (addr, timeout) = (self.addr, self.timeout);
        let response = tokio::task::spawn_blocking(move || {
            let conn = UdpClientConnection::with_timeout(addr, timeout)?;
            SyncClient::new(conn).query(&name, DNSClass::IN, record_type.into())
        })
        .await
        .map_err(|err| Error::DnsServer(format!("DNS query task failed: {err}")))?
        .map_err(|err| self.transport_error(err, None))?;

        query_answer(&response, record_type).map_err(|code| {
            Error::DnsServer(format!(
                "The nameserver \"{}\" answered the {record_type} query for \"{fqdn}\" with \
                 {code:?}.",
                self.addr.ip()
            ))
        })
    }

    async fn update(&self, zone: &Zone, update: RecordUpdate) -> Result<(), Error> {
        let signer = Self::signer(zone)?;
        let origin = Name::from_ascii(zone.name())?;
        let name = Name::from_ascii(update.fqdn())?;
        let record_type = update.record_type();
        let replacement = match &update {
            RecordUpdate::Replace { content, ttl, .. } => {
                let mut record =
                    Record::from_rdata(name.clone(), *ttl, rdata(record_type, content)?);
                record.set_dns_class(DNSClass::IN);
                Some(record)
            }
            RecordUpdate::Delete { .. } => None,
        };

        tracing::debug!(
            "sending update for {} {record_type} to {}",
            update.fqdn(),
            self.addr
        );
        let (addr, timeout) = (self.addr, self.timeout);
        let response = tokio::task::spawn_blocking(move || {
            let conn = TcpClientConnection::with_timeout(addr, timeout)?;
            let client = SyncClient::with_tsigner(conn, signer);
            let mut rrset = Record::with(name, record_type.into(), 0);
            rrset.set_dns_class(DNSClass::IN);
            let response = client.delete_rrset(rrset, origin.clone())?;
            match replacement {
                Some(record) if response.response_code() == ResponseCode::NoError => {
                    client.append(record, origin, false)
                }
                _ => Ok(response),
            }
        })
        .await
        .map_err(|err| Error::DnsServer(format!("DNS update task failed: {err}")))?
        .map_err(|err| self.transport_error(err, Some(zone)))?;

        match response.response_code() {
            ResponseCode::NoError => Ok(()),
            code => Err(self.rejected(code, zone, &update)),
        }
    }
}
