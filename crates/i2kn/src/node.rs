//! The Node: one identity bound to one storage root.
//!
//! Save pipeline: parse → address (CID) → serialize → encrypt → sign → store.
//! Load pipeline: read envelope → resolve signer → decrypt → verify signature
//! → recompute CID. Load never trusts anything it read: signer identity and
//! both validity flags are recomputed every time.

use std::collections::HashSet;

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use i2kn_core::{Cid, Codec, NodeIdentity, NodeKey, PeerId, PublicKey, Record};
use i2kn_store::{validate_key, Envelope, FsStore, Store, StoreExt};

use crate::config::{NodeConfig, EMPTY_COLLECTION};
use crate::error::{NodeError, Result};

/// Outcome of loading one envelope.
///
/// A failed check is reported here, not as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Decrypted plaintext, lossily decoded as UTF-8.
    pub plaintext: String,
    /// Chain link as written by the signer. Not verified.
    pub previous_cid: Option<String>,
    /// Identity recomputed from the envelope's public key.
    pub signer: PeerId,
    pub signature_valid: bool,
    pub cid_valid: bool,
}

impl LoadResult {
    /// Both integrity checks passed.
    pub fn is_valid(&self) -> bool {
        self.signature_valid && self.cid_valid
    }

    /// The JSON form handed to UI and network collaborators.
    ///
    /// `cidPrev` is omitted when there is no link.
    pub fn to_json(&self) -> String {
        let mut obj = Map::new();
        obj.insert("item".into(), Value::String(self.plaintext.clone()));
        if let Some(prev) = &self.previous_cid {
            obj.insert("cidPrev".into(), Value::String(prev.clone()));
        }
        obj.insert("byPeerId".into(), Value::String(self.signer.to_string()));
        obj.insert("sigOK".into(), Value::Bool(self.signature_valid));
        obj.insert("cidOK".into(), Value::Bool(self.cid_valid));
        Value::Object(obj).to_string()
    }
}

/// A node's identity and storage, passed explicitly to every operation.
pub struct Node<S: Store> {
    identity: NodeIdentity,
    store: S,
    config: NodeConfig,
}

impl Node<FsStore> {
    /// Open a node on the filesystem under `config.base_dir`.
    ///
    /// The config is validated first, so a `dir_prefix` cannot move the
    /// storage root out of `base_dir`.
    pub fn open(key: NodeKey, config: NodeConfig) -> Result<Self> {
        config.validate()?;
        let identity = NodeIdentity::new(key, config.nonce_strategy)?;
        let store = FsStore::new(config.repo_dir(&identity.peer_id()));
        info!(peer_id = %identity.peer_id(), root = %store.root().display(), "node initialized");
        Ok(Self {
            identity,
            store,
            config,
        })
    }

    /// Open from base64 libp2p private-key material.
    pub fn from_base64(material: &str, config: NodeConfig) -> Result<Self> {
        Self::open(NodeKey::from_base64(material)?, config)
    }

    pub fn repo_dir(&self) -> &std::path::Path {
        self.store.root()
    }
}

impl<S: Store> Node<S> {
    /// Create a node over an arbitrary store.
    pub fn new(key: NodeKey, store: S, config: NodeConfig) -> Result<Self> {
        config.validate()?;
        let identity = NodeIdentity::new(key, config.nonce_strategy)?;
        info!(peer_id = %identity.peer_id(), "node initialized");
        Ok(Self {
            identity,
            store,
            config,
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.identity.peer_id()
    }

    pub fn public_key(&self) -> PublicKey {
        self.identity.public_key()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Repository
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the storage root with empty bootstrap collections.
    ///
    /// Returns `false` if the root already existed; it is left untouched.
    pub async fn create_repo(&self) -> Result<bool> {
        let bootstrap: Vec<(String, Bytes)> = self
            .config
            .bootstrap_collections
            .iter()
            .map(|name| (name.clone(), Bytes::from_static(EMPTY_COLLECTION)))
            .collect();

        let created = self.store.create_root(&bootstrap).await?;
        if created {
            info!(peer_id = %self.peer_id(), collections = bootstrap.len(), "repository created");
        } else {
            debug!(peer_id = %self.peer_id(), "repository already exists");
        }
        Ok(created)
    }

    /// Remove the storage root. Fails with `NotEmpty` if anything is left in it.
    pub async fn erase_dir(&self) -> Result<()> {
        self.store.erase_root().await?;
        info!(peer_id = %self.peer_id(), "repository erased");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a record given as JSON text. Returns its CID.
    pub async fn save(&self, record_json: &str, previous_cid: Option<&Cid>) -> Result<Cid> {
        let record = Record::parse(record_json)?;
        self.save_record(record, previous_cid).await
    }

    /// Address, encrypt, sign and store a record.
    ///
    /// An envelope already stored under the CID is never rewritten; saving
    /// the same content again returns the CID and keeps the first envelope,
    /// including its `previous_cid`.
    pub async fn save_record(&self, record: Record, previous_cid: Option<&Cid>) -> Result<Cid> {
        let (cid, record) = record.address(self.config.codec)?;
        let plaintext = record.to_plaintext()?;

        let sealed = self.identity.cipher().encrypt(&plaintext);
        let signature = self.identity.sign(&plaintext)?;
        let envelope = Envelope::new(
            &sealed,
            &self.identity.public_key(),
            previous_cid.map(Cid::to_string),
            &signature,
        );

        if self.store.put_envelope(&cid, &envelope).await? {
            debug!(%cid, previous = ?previous_cid.map(Cid::to_string), "record saved");
        } else {
            debug!(%cid, "record already stored, envelope kept");
        }
        Ok(cid)
    }

    /// Load and verify the envelope stored under `cid`.
    ///
    /// Errors only when the envelope is missing or structurally unusable.
    pub async fn load(&self, cid: &str) -> Result<LoadResult> {
        let envelope = self.store.get_envelope(cid).await?;

        let sender = PublicKey::from_protobuf(&envelope.sender_public_key()?)?;
        let signer = sender.to_peer_id();

        let ciphertext = envelope.ciphertext()?;
        let nonce = envelope.nonce()?;
        let plaintext = self.identity.cipher().decrypt(&ciphertext, nonce.as_ref())?;

        let signature_valid = envelope
            .signature()
            .is_some_and(|sig| sender.verify(&plaintext, &sig));
        let cid_valid = self.verify_cid(cid, &plaintext);

        if signature_valid && cid_valid {
            debug!(cid, %signer, "record verified");
        } else {
            warn!(cid, %signer, signature_valid, cid_valid, "record failed verification");
        }

        Ok(LoadResult {
            plaintext: String::from_utf8_lossy(&plaintext).into_owned(),
            previous_cid: envelope.previous_cid().map(String::from),
            signer,
            signature_valid,
            cid_valid,
        })
    }

    /// Load `head` and every record reachable through `previous_cid`,
    /// newest first.
    ///
    /// The walk stops at a link that is missing from this store or that
    /// points back into the chain.
    pub async fn history(&self, head: &str) -> Result<Vec<LoadResult>> {
        let mut chain = vec![self.load(head).await?];
        let mut seen = HashSet::from([head.to_string()]);

        while let Some(prev) = chain.last().and_then(|r| r.previous_cid.clone()) {
            if !seen.insert(prev.clone()) {
                warn!(cid = %prev, "chain loops back, stopping");
                break;
            }
            match self.load(&prev).await {
                Ok(result) => chain.push(result),
                Err(NodeError::NotFound(_)) => {
                    debug!(cid = %prev, "chain link not in store, stopping");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(chain)
    }

    fn verify_cid(&self, cid: &str, plaintext: &[u8]) -> bool {
        // Records are checked under the codec named by their own CID.
        let codec = cid.parse::<Cid>().map_or(self.config.codec, |c| c.codec());
        recompute_cid(plaintext, codec).is_some_and(|recomputed| recomputed.to_string() == cid)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clear files
    // ─────────────────────────────────────────────────────────────────────────

    /// Write an unencrypted file under `name`.
    pub async fn save_clear(&self, name: &str, content: &[u8]) -> Result<()> {
        validate_key(name)?;
        self.store.put(name, content).await?;
        debug!(name, bytes = content.len(), "clear file saved");
        Ok(())
    }

    /// Read an unencrypted file.
    pub async fn load_clear(&self, name: &str) -> Result<Bytes> {
        validate_key(name)?;
        Ok(self.store.get(name).await?)
    }
}

fn recompute_cid(plaintext: &[u8], codec: Codec) -> Option<Cid> {
    Record::from_slice(plaintext).ok()?.compute_cid(codec).ok()
}

impl<S: Store> std::fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("peer_id", &self.identity.peer_id())
            .field("codec", &self.config.codec)
            .field("nonce_strategy", &self.config.nonce_strategy)
            .finish_non_exhaustive()
    }
}
