//! The byte-store: a per-node key→ByteArray map with a blocking
//! `wait_and_get`, plus remote dispatch to the owning peer for keys homed
//! elsewhere.
//!
//! The map and the readiness-gate map are deliberately behind one
//! `std::sync::Mutex` rather than a sharded concurrent map: `put` and
//! `wait_and_get` must observe presence-check and gate-install as one
//! atomic step across *both* maps, which a sharded map only gives you
//! within a single map, not across two. Critical sections here are tiny (a
//! hashmap insert, maybe a notify), so a plain mutex costs nothing in
//! practice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use strata_core::key::{Key, NodeId};
use strata_core::wire::KbMessage;
use strata_net::{peer_conn, ClusterDirectory};

use crate::byte_array::ByteArray;
use crate::error::StoreError;
use crate::readiness::ReadinessGate;

#[derive(Default)]
struct LocalState {
    map: HashMap<Key, ByteArray>,
    gates: HashMap<Key, Arc<ReadinessGate>>,
}

pub struct ByteStore {
    self_node: NodeId,
    local: Mutex<LocalState>,
    directory: ClusterDirectory,
}

impl ByteStore {
    pub fn new(self_node: NodeId, directory: ClusterDirectory) -> Self {
        Self { self_node, local: Mutex::new(LocalState::default()), directory }
    }

    pub fn self_node(&self) -> NodeId {
        self.self_node
    }

    pub fn directory(&self) -> &ClusterDirectory {
        &self.directory
    }

    fn is_local(&self, key: &Key) -> bool {
        key.node == self.self_node
    }

    // ── Local operations ─────────────────────────────────────────────────

    fn local_put(&self, key: Key, bytes: ByteArray) {
        let mut state = self.local.lock().expect("byte-store mutex poisoned");
        state.map.insert(key.clone(), bytes);
        if let Some(gate) = state.gates.get(&key) {
            gate.fire();
        }
    }

    fn local_get(&self, key: &Key) -> Option<ByteArray> {
        let state = self.local.lock().expect("byte-store mutex poisoned");
        state.map.get(key).cloned()
    }

    async fn local_wait_and_get(&self, key: &Key) -> ByteArray {
        let gate = {
            let mut state = self.local.lock().expect("byte-store mutex poisoned");
            if let Some(bytes) = state.map.get(key) {
                return bytes.clone();
            }
            // Still holding the lock: install (or reuse) the gate before
            // any concurrent `put` can complete.
            state.gates.entry(key.clone()).or_insert_with(|| Arc::new(ReadinessGate::new())).clone()
        };

        gate.wait().await;

        let state = self.local.lock().expect("byte-store mutex poisoned");
        state.map.get(key).cloned().expect("gate fired implies value is present")
    }

    // ── Public API — dispatches local vs remote by key.node ──────────────

    pub async fn put(&self, key: Key, bytes: ByteArray) -> Result<(), StoreError> {
        if self.is_local(&key) {
            self.local_put(key, bytes);
            return Ok(());
        }

        let addr = self
            .directory
            .addr_of(key.node)
            .await
            .ok_or_else(|| StoreError::UnknownHome(key.clone()))?;
        let request = KbMessage::Put { key, bytes: bytes.into_bytes() };
        match peer_conn::call(addr, request).await? {
            KbMessage::Ack => Ok(()),
            _ => Ok(()),
        }
    }

    pub async fn get(&self, key: &Key) -> Result<Option<ByteArray>, StoreError> {
        if self.is_local(key) {
            return Ok(self.local_get(key));
        }

        let addr = self
            .directory
            .addr_of(key.node)
            .await
            .ok_or_else(|| StoreError::UnknownHome(key.clone()))?;
        let request = KbMessage::Get { key: key.clone() };
        match peer_conn::call(addr, request).await? {
            KbMessage::ResponseData { bytes } if bytes.is_empty() => Ok(None),
            KbMessage::ResponseData { bytes } => Ok(Some(ByteArray::new(bytes))),
            _ => Ok(None),
        }
    }

    pub async fn wait_and_get(&self, key: &Key) -> Result<ByteArray, StoreError> {
        if self.is_local(key) {
            return Ok(self.local_wait_and_get(key).await);
        }

        let addr = self
            .directory
            .addr_of(key.node)
            .await
            .ok_or_else(|| StoreError::UnknownHome(key.clone()))?;
        let request = KbMessage::GetAndWait { key: key.clone() };
        match peer_conn::call(addr, request).await? {
            KbMessage::ResponseData { bytes } => Ok(ByteArray::new(bytes)),
            _ => Err(StoreError::UnknownHome(key.clone())),
        }
    }

    /// Dispatches an inbound `KBMessage` request against the local store
    /// and returns the reply: `Put` replies `Ack`; `Get`/`GetAndWait` reply
    /// `ResponseData`.
    pub async fn dispatch_inbound(&self, msg: KbMessage) -> KbMessage {
        match msg {
            KbMessage::Put { key, bytes } => {
                self.local_put(key, ByteArray::new(bytes));
                KbMessage::Ack
            }
            KbMessage::Get { key } => {
                let bytes = self.local_get(&key).map(ByteArray::into_bytes).unwrap_or_default();
                KbMessage::ResponseData { bytes }
            }
            KbMessage::GetAndWait { key } => {
                let bytes = self.local_wait_and_get(&key).await.into_bytes();
                KbMessage::ResponseData { bytes }
            }
            // A reply type arriving as a request is a protocol violation;
            // there is nothing sensible to answer with locally.
            KbMessage::ResponseData { .. } | KbMessage::Ack => KbMessage::Ack,
        }
    }
}
