//! An in-memory implementation of the [`Nameserver`][super::Nameserver] trait.
//!
//! Records are lost on restart. Updates are accepted for any name within the zone they are
//! sent for and, optionally, only when signed with one of a set of known TSIG keys.
use crate::dns::{Nameserver, RecordType, RecordUpdate};
use crate::error::Error;
use crate::zones::Zone;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

const PEER: &str = "in-memory";

#[derive(Default, Debug)]
pub struct InMemoryNameserver {
    records: RwLock<HashMap<(String, RecordType), String>>,
    accepted_keys: Option<HashSet<String>>,
    updates: AtomicUsize,
}

impl InMemoryNameserver {
    /// A nameserver that only accepts updates signed with one of the given base64 TSIG keys.
    pub fn with_accepted_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        InMemoryNameserver {
            accepted_keys: Some(keys.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Set a record directly, bypassing zone and key checks.
    pub async fn insert(&self, fqdn: &str, record_type: RecordType, content: &str) {
        self.records
            .write()
            .await
            .insert((fqdn.to_ascii_lowercase(), record_type), content.to_string());
    }

    /// The number of updates applied so far.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl Nameserver for InMemoryNameserver {
    async fn query(&self, fqdn: &str, record_type: RecordType) -> Result<Option<String>, Error> {
        let key = (fqdn.to_ascii_lowercase(), record_type);
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn update(&self, zone: &Zone, update: RecordUpdate) -> Result<(), Error> {
        if let Some(accepted_keys) = &self.accepted_keys {
            if !accepted_keys.contains(zone.tsig_key()) {
                return Err(Error::peer_bad_key(PEER, zone.name()));
            }
        }
        let fqdn = update.fqdn().to_ascii_lowercase();
        if zone.record_part(&fqdn).is_none() {
            return Err(Error::DnsServer(format!(
                "The name \"{fqdn}\" is outside of the zone \"{}\".",
                zone.name()
            )));
        }

        let key = (fqdn, update.record_type());
        let mut records = self.records.write().await;
        match update {
            RecordUpdate::Replace { content, .. } => {
                records.insert(key, content);
            }
            RecordUpdate::Delete { .. } => {
                records.remove(&key);
            }
        }
        self.updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
