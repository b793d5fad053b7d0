use crate::storage::KeyValueStore;
use crate::utils::validate_address;
use anyhow::Result;
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

fn address_key(namespace: &str, address: &str) -> String {
    format!("{}{}", namespace, address.to_lowercase())
}

/// One async lock per storage key, held across a read-modify-write.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

fn parse_or_log<V: DeserializeOwned>(key: &str, raw: &str) -> Option<V> {
    match serde_json::from_str::<V>(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to parse stored data under {}: {}", key, e);
            None
        }
    }
}

/// Newest-first list of records kept per wallet address.
///
/// Reads never fail on corrupt data: a value that does not parse is logged
/// and treated as an empty list. Writes through one repository are
/// serialized per address, so concurrent updates never drop each other.
pub struct AddressRepository<T> {
    store: Arc<dyn KeyValueStore>,
    namespace: &'static str,
    capacity: usize,
    locks: KeyLocks,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AddressRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &'static str, capacity: usize) -> Self {
        Self {
            store,
            namespace,
            capacity,
            locks: KeyLocks::default(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self, address: &str) -> String {
        address_key(self.namespace, address)
    }

    pub async fn get(&self, address: &str) -> Result<Vec<T>> {
        self.read(&self.key(address)).await
    }

    /// Replace the list, keeping at most `capacity` leading entries.
    pub async fn put(&self, address: &str, items: &[T]) -> Result<()> {
        let key = self.key(address);
        let _guard = self.locks.lock(&key).await;
        self.write(&key, items).await
    }

    pub async fn push_front(&self, address: &str, item: T) -> Result<()> {
        self.update(address, |items| {
            items.insert(0, item);
            Ok(())
        })
        .await
    }

    /// Locked read-modify-write of the whole list. Nothing is written when
    /// `f` fails.
    pub async fn update<F, R>(&self, address: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let key = self.key(address);
        let _guard = self.locks.lock(&key).await;

        let mut items = self.read(&key).await?;
        let result = f(&mut items)?;
        self.write(&key, &items).await?;
        Ok(result)
    }

    pub async fn clear(&self, address: &str) -> Result<()> {
        let key = self.key(address);
        let _guard = self.locks.lock(&key).await;
        self.store.remove(&key).await
    }

    /// Addresses that currently have a list stored.
    pub async fn addresses(&self) -> Result<Vec<String>> {
        let keys = self.store.keys_with_prefix(self.namespace).await?;
        Ok(keys
            .iter()
            .filter_map(|key| key.strip_prefix(self.namespace))
            .filter(|address| validate_address(address))
            .map(str::to_string)
            .collect())
    }

    async fn read(&self, key: &str) -> Result<Vec<T>> {
        Ok(match self.store.get(key).await? {
            Some(raw) => parse_or_log(key, &raw).unwrap_or_default(),
            None => Vec::new(),
        })
    }

    async fn write(&self, key: &str, items: &[T]) -> Result<()> {
        let kept = &items[..items.len().min(self.capacity)];
        let raw = serde_json::to_string(kept)?;
        self.store.set(key, &raw).await
    }
}

/// Single record kept per wallet address.
pub struct AddressRecord<T> {
    store: Arc<dyn KeyValueStore>,
    namespace: &'static str,
    locks: KeyLocks,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AddressRecord<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &'static str) -> Self {
        Self {
            store,
            namespace,
            locks: KeyLocks::default(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self, address: &str) -> String {
        address_key(self.namespace, address)
    }

    pub async fn get(&self, address: &str) -> Result<Option<T>> {
        self.read(&self.key(address)).await
    }

    pub async fn set(&self, address: &str, record: &T) -> Result<()> {
        let key = self.key(address);
        let _guard = self.locks.lock(&key).await;
        self.write(&key, record).await
    }

    /// Locked read-modify-write. `f` gets the current record and returns the
    /// one to store plus a result; nothing is written when it fails.
    pub async fn update<F, R>(&self, address: &str, f: F) -> Result<R>
    where
        F: FnOnce(Option<T>) -> Result<(T, R)>,
    {
        let key = self.key(address);
        let _guard = self.locks.lock(&key).await;

        let (record, result) = f(self.read(&key).await?)?;
        self.write(&key, &record).await?;
        Ok(result)
    }

    pub async fn remove(&self, address: &str) -> Result<()> {
        let key = self.key(address);
        let _guard = self.locks.lock(&key).await;
        self.store.remove(&key).await
    }

    async fn read(&self, key: &str) -> Result<Option<T>> {
        Ok(match self.store.get(key).await? {
            Some(raw) => parse_or_log(key, &raw),
            None => None,
        })
    }

    async fn write(&self, key: &str, record: &T) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.store.set(key, &raw).await
    }
}
