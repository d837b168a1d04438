use crate::dns::{
    DnsChangeMessage, DynNameserver, Nameserver, RecordType, RecordUpdate, DEFAULT_TTL,
};
use crate::error::{Error, Result};
use crate::zones::Zone;
use rand::Rng;

/// Name of the TXT record written and removed again by [`DnsZoneClient::check`].
pub const CHECK_RECORD_NAME: &str = "dyndns-check-tmp-a841278b-f089-4164-b8e6-f90514e573ec";

const CHECK_CONTENT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CHECK_CONTENT_LEN: usize = 8;

/// Reads and changes the records of one zone.
///
/// Names passed to the methods may either be record names (`www`) or fully qualified names
/// within the zone (`www.example.com`).
#[derive(Clone)]
pub struct DnsZoneClient {
    nameserver: DynNameserver,
    zone: Zone,
}

impl DnsZoneClient {
    #[must_use]
    pub fn new(nameserver: DynNameserver, zone: Zone) -> Self {
        DnsZoneClient { nameserver, zone }
    }

    #[must_use]
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Read the first record of the given type. `None` if there is no such record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsName`] for invalid names, and a DNS server error if the
    /// nameserver can't be queried.
    pub async fn read_record(&self, name: &str, record_type: RecordType) -> Result<Option<String>> {
        let fqdn = self.zone.absolute_name(name)?;
        self.nameserver.query(&fqdn, record_type).await
    }

    /// Read the IPv4 address of the A record.
    ///
    /// # Errors
    ///
    /// See [`DnsZoneClient::read_record`].
    pub async fn read_a_record(&self, name: &str) -> Result<Option<String>> {
        self.read_record(name, RecordType::A).await
    }

    /// Read the IPv6 address of the AAAA record.
    ///
    /// # Errors
    ///
    /// See [`DnsZoneClient::read_record`].
    pub async fn read_aaaa_record(&self, name: &str) -> Result<Option<String>> {
        self.read_record(name, RecordType::AAAA).await
    }

    /// # Errors
    ///
    /// See [`DnsZoneClient::read_record`].
    pub async fn is_a_record(&self, name: &str) -> Result<bool> {
        Ok(self.read_a_record(name).await?.is_some())
    }

    /// # Errors
    ///
    /// See [`DnsZoneClient::read_record`].
    pub async fn is_aaaa_record(&self, name: &str) -> Result<bool> {
        Ok(self.read_aaaa_record(name).await?.is_some())
    }

    /// Replace all records of the given type with a single record holding `content`. The
    /// record is read before and after the update.
    ///
    /// # Errors
    ///
    /// Returns an error if a name or the content is invalid, or the nameserver rejects the
    /// update or can't be reached.
    pub async fn add_record(
        &self,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
    ) -> Result<DnsChangeMessage> {
        let fqdn = self.zone.absolute_name(name)?;
        let old = self.nameserver.query(&fqdn, record_type).await?;
        self.nameserver
            .update(
                &self.zone,
                RecordUpdate::Replace {
                    fqdn: fqdn.clone(),
                    record_type,
                    content: content.to_string(),
                    ttl,
                },
            )
            .await?;
        let new = self.nameserver.query(&fqdn, record_type).await?;
        Ok(DnsChangeMessage {
            fqdn,
            record_type,
            old,
            new,
        })
    }

    /// Delete all records of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, or the nameserver rejects the update or can't
    /// be reached.
    pub async fn delete_record(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<DnsChangeMessage> {
        let fqdn = self.zone.absolute_name(name)?;
        let old = self.nameserver.query(&fqdn, record_type).await?;
        self.nameserver
            .update(
                &self.zone,
                RecordUpdate::Delete {
                    fqdn: fqdn.clone(),
                    record_type,
                },
            )
            .await?;
        Ok(DnsChangeMessage {
            fqdn,
            record_type,
            old,
            new: None,
        })
    }

    /// Delete the A and the AAAA records.
    ///
    /// # Errors
    ///
    /// See [`DnsZoneClient::delete_record`].
    pub async fn delete_records(&self, name: &str) -> Result<()> {
        self.delete_record(name, RecordType::A).await?;
        self.delete_record(name, RecordType::AAAA).await?;
        Ok(())
    }

    /// Make the record hold exactly `content`. Nothing is written if it already does;
    /// otherwise the record is replaced and read back to verify the change.
    ///
    /// # Errors
    ///
    /// Returns a DNS server error if the record doesn't hold `content` after the update, and
    /// the errors of [`DnsZoneClient::add_record`].
    pub async fn set_record(
        &self,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
    ) -> Result<DnsChangeMessage> {
        let fqdn = self.zone.absolute_name(name)?;
        let current = self.nameserver.query(&fqdn, record_type).await?;
        if current.as_deref() == Some(content) {
            return Ok(DnsChangeMessage {
                fqdn,
                record_type,
                old: current.clone(),
                new: current,
            });
        }

        let message = self.add_record(&fqdn, record_type, content, ttl).await?;
        if message.new.as_deref() != Some(content) {
            return Err(Error::DnsServer(format!(
                "The update of the {record_type} record of \"{fqdn}\" to \"{content}\" did not \
                 take effect."
            )));
        }
        Ok(message)
    }

    /// Check the nameserver by writing a TXT record with random content, reading it back and
    /// deleting it again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Check`] if the content can't be read back, and any error raised while
    /// talking to the nameserver.
    pub async fn check(&self) -> Result<String> {
        let content = random_check_content();
        self.delete_record(CHECK_RECORD_NAME, RecordType::TXT).await?;
        self.add_record(CHECK_RECORD_NAME, RecordType::TXT, &content, DEFAULT_TTL)
            .await?;
        let result = self.read_record(CHECK_RECORD_NAME, RecordType::TXT).await?;
        self.delete_record(CHECK_RECORD_NAME, RecordType::TXT).await?;

        match result {
            None => Err(Error::Check("no response".to_string())),
            Some(result) if result != content => Err(Error::Check(format!(
                "check failed: wrote \"{content}\", read \"{result}\""
            ))),
            Some(_) => {
                let message = format!(
                    "The update check passed: A TXT record \"{CHECK_RECORD_NAME}\" with the \
                     content \"{content}\" could be updated on the zone \"{}\".",
                    self.zone.name()
                );
                tracing::info!("{message}");
                Ok(message)
            }
        }
    }
}

fn random_check_content() -> String {
    let mut rng = rand::thread_rng();
    (0..CHECK_CONTENT_LEN)
        .map(|_| char::from(CHECK_CONTENT_CHARSET[rng.gen_range(0..CHECK_CONTENT_CHARSET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{InMemoryNameserver, Nameserver};
    use std::sync::Arc;

    /// Accepts every update and forgets it immediately.
    struct Forgetful;

    #[async_trait::async_trait]
    impl Nameserver for Forgetful {
        async fn query(&self, _: &str, _: RecordType) -> Result<Option<String>> {
            Ok(None)
        }

        async fn update(&self, _: &Zone, _: RecordUpdate) -> Result<()> {
            Ok(())
        }
    }

    fn zone() -> Zone {
        Zone::new("example.com", "tPyvZA==").unwrap()
    }

    fn client() -> (Arc<InMemoryNameserver>, DnsZoneClient) {
        let nameserver = Arc::new(InMemoryNameserver::default());
        let client = DnsZoneClient::new(nameserver.clone(), zone());
        (nameserver, client)
    }

    #[tokio::test]
    async fn read_missing_record() {
        let (_, client) = client();
        assert_eq!(client.read_record("www", RecordType::A).await.unwrap(), None);
        assert!(!client.is_a_record("www").await.unwrap());
        assert!(!client.is_aaaa_record("www.example.com").await.unwrap());
    }

    #[tokio::test]
    async fn add_record_reports_old_and_new() {
        let (nameserver, client) = client();
        nameserver
            .insert("www.example.com.", RecordType::A, "1.2.3.4")
            .await;

        let msg = client
            .add_record("www", RecordType::A, "1.2.3.5", DEFAULT_TTL)
            .await
            .unwrap();
        assert_eq!(msg.fqdn, "www.example.com.");
        assert_eq!(msg.old.as_deref(), Some("1.2.3.4"));
        assert_eq!(msg.new.as_deref(), Some("1.2.3.5"));
        assert_eq!(
            client.read_a_record("www.example.com.").await.unwrap().as_deref(),
            Some("1.2.3.5")
        );
    }

    #[tokio::test]
    async fn delete_record() {
        let (nameserver, client) = client();
        nameserver
            .insert("www.example.com.", RecordType::AAAA, "1::2")
            .await;

        let msg = client.delete_record("www", RecordType::AAAA).await.unwrap();
        assert_eq!(msg.old.as_deref(), Some("1::2"));
        assert_eq!(msg.new, None);
        assert!(msg.changed());
        assert_eq!(client.read_aaaa_record("www").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_records() {
        let (nameserver, client) = client();
        nameserver
            .insert("www.example.com.", RecordType::A, "1.2.3.4")
            .await;
        nameserver
            .insert("www.example.com.", RecordType::AAAA, "1::2")
            .await;
        client.delete_records("www").await.unwrap();
        assert!(!client.is_a_record("www").await.unwrap());
        assert!(!client.is_aaaa_record("www").await.unwrap());
    }

    #[tokio::test]
    async fn set_record_skips_unchanged() {
        let (nameserver, client) = client();
        let first = client
            .set_record("www", RecordType::A, "1.2.3.4", DEFAULT_TTL)
            .await
            .unwrap();
        assert!(first.changed());
        assert_eq!(nameserver.update_count(), 1);

        let second = client
            .set_record("www", RecordType::A, "1.2.3.4", DEFAULT_TTL)
            .await
            .unwrap();
        assert!(!second.changed());
        assert_eq!(second.to_string(), "UNCHANGED: www.example.com. A 1.2.3.4");
        assert_eq!(nameserver.update_count(), 1);
    }

    #[tokio::test]
    async fn rejected_tsig_key() {
        let nameserver = Arc::new(InMemoryNameserver::with_accepted_keys(["aGVsbG8="]));
        let client = DnsZoneClient::new(nameserver, zone());
        let err = client
            .add_record("www", RecordType::A, "1.2.3.4", DEFAULT_TTL)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DNS_SERVER_ERROR");
        assert!(err.to_string().contains("didn't know the tsig key"));
    }

    #[tokio::test]
    async fn check_passes_and_cleans_up() {
        let (_, client) = client();
        let message = client.check().await.unwrap();
        assert!(message.starts_with("The update check passed"));
        assert!(message.contains("\"example.com.\""));
        assert_eq!(
            client
                .read_record(CHECK_RECORD_NAME, RecordType::TXT)
                .await
                .unwrap(),
            None
        );
    }

    #[test]
    fn check_content() {
        let content = random_check_content();
        assert_eq!(content.len(), CHECK_CONTENT_LEN);
        assert!(content
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn check_without_response() {
        let client = DnsZoneClient::new(Arc::new(Forgetful), zone());
        let err = client.check().await.unwrap_err();
        assert!(matches!(err, Error::Check(_)));
        assert_eq!(err.status_code(), 457);
    }

    #[tokio::test]
    async fn set_record_without_effect() {
        let client = DnsZoneClient::new(Arc::new(Forgetful), zone());
        let err = client
            .set_record("www", RecordType::A, "1.2.3.4", DEFAULT_TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DnsServer(_)));
        assert!(err.to_string().contains("did not take effect"));
    }
}
