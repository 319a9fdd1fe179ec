//! Golden vectors at the node level.
//!
//! With the static nonce strategy every byte of an envelope is a function of
//! the key and the record (Ed25519 and RSA PKCS#1 v1.5 signatures are
//! deterministic), so whole envelope files can be pinned. These bytes must
//! stay readable by every node on the network.

use anyhow::Result;
use i2kn::{Codec, Files, NodeConfig, NonceStrategy};
use i2kn_testkit::vectors::{
    RSA_ENVELOPE, RSA_KEY_MATERIAL, RSA_PEER_ID, RSA_RECORD, RSA_RECORD_CID,
};
use i2kn_testkit::{all_vectors, identity_vectors, init_tracing};
use tempfile::TempDir;

const SEED: [u8; 32] = [0x42; 32];

const FIRST_CID: &str = "bafyreiauwumyovfnhduz5zj5eialvumwmtkfpr4osspeus3s2tb45tlbdy";
const FIRST_PLAINTEXT: &str = r#"{"cid":"bafyreiauwumyovfnhduz5zj5eialvumwmtkfpr4osspeus3s2tb45tlbdy","content":"hello","id":1,"name":"a"}"#;
const FIRST_ENVELOPE: &str = r#"{"item":"z8ogy9d6UdMl1NzE4anw8VtGa5rN3fqzpboLN3PPYWohs7SsoBl4/OCgEzbetsHNyphPOTr8NmjPL2tvVrhKfl+xMselZxjztH8fN8K4WzaZR2TyBO+Qrg0fuU+SJFLWJtCyGVP/EBzI","byPubkey":"CAESICFS+NGbeR0kRTJC4V8uq2y3z/p7al7TAJeWDgaYgdsS","sig":"F/lsstX/vUImpr9XVs5sb4dn3F5Cc0tkk4dDww0zM+0SFpe57EINrHiNiVG981xw1nAumdqwAwp/LurrhvCPBw=="}"#;

const SECOND_CID: &str = "bafyreiba4bwfkluehcyjgdfvyyqhsh3ewf46tef53g433qcttsjygki7xi";
const SECOND_PLAINTEXT: &str = r#"{"cid":"bafyreiba4bwfkluehcyjgdfvyyqhsh3ewf46tef53g433qcttsjygki7xi","content":"hello, again","id":1,"name":"a"}"#;
const SECOND_ENVELOPE: &str = r#"{"item":"z8ogy9d6UdMl1NzE4anw8k8FfIDS2eCgrroMO2Odf2Zir6S8pBxlovK6AWmOstafkNhbfWy6NDjIaWxnG+pVewqtIselZxjztH8fN8K4WzaZR2TyBOGc7QMa8huBJFLRI5/tCkX/H1/YxGBWijP/PQ==","byPubkey":"CAESICFS+NGbeR0kRTJC4V8uq2y3z/p7al7TAJeWDgaYgdsS","cidPrev":"bafyreiauwumyovfnhduz5zj5eialvumwmtkfpr4osspeus3s2tb45tlbdy","sig":"fPCmR23FTGlOTmtcUUBvm5x0FU6uFX+wqZGvEXUpzAyhdDi2o8R4CHy5D/Femrpg3YMjmybcccl+ynQHN3YeCw=="}"#;

/// Static nonces over dag-cbor CIDs.
fn static_files(dir: &TempDir) -> Files {
    Files::new(NodeConfig {
        nonce_strategy: NonceStrategy::Static,
        codec: Codec::DagCbor,
        ..NodeConfig::with_base_dir(dir.path())
    })
}

/// Static nonces over json CIDs, the default codec.
fn static_json_files(dir: &TempDir) -> Files {
    Files::new(NodeConfig {
        nonce_strategy: NonceStrategy::Static,
        ..NodeConfig::with_base_dir(dir.path())
    })
}

fn key_material() -> &'static str {
    identity_vectors()
        .into_iter()
        .find(|v| v.seed == SEED)
        .map(|v| v.expected_key_material)
        .unwrap()
}

#[tokio::test]
async fn test_static_envelopes_are_byte_exact() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let files = static_files(&dir);
    files.init(key_material())?;
    files.create_repo().await?;

    let first = files
        .save(r#"{"id":1,"name":"a","content":"hello"}"#, None)
        .await?;
    assert_eq!(first.to_string(), FIRST_CID);

    let second = files
        .save(r#"{"content":"hello, again","name":"a","id":1}"#, Some(&first))
        .await?;
    assert_eq!(second.to_string(), SECOND_CID);

    let repo = files.node()?.repo_dir().to_path_buf();
    assert_eq!(std::fs::read_to_string(repo.join(FIRST_CID))?, FIRST_ENVELOPE);
    assert_eq!(std::fs::read_to_string(repo.join(SECOND_CID))?, SECOND_ENVELOPE);
    Ok(())
}

#[tokio::test]
async fn test_golden_envelopes_load() -> Result<()> {
    let dir = TempDir::new()?;
    let files = static_files(&dir);
    let peer_id = files.init(key_material())?;
    files.create_repo().await?;

    // Written by another node with the same key.
    let repo = files.node()?.repo_dir().to_path_buf();
    std::fs::write(repo.join(FIRST_CID), FIRST_ENVELOPE)?;
    std::fs::write(repo.join(SECOND_CID), SECOND_ENVELOPE)?;

    let loaded = files.load(SECOND_CID).await?;
    assert_eq!(loaded.plaintext, SECOND_PLAINTEXT);
    assert_eq!(loaded.previous_cid.as_deref(), Some(FIRST_CID));
    assert_eq!(loaded.signer, peer_id);
    assert!(loaded.signature_valid && loaded.cid_valid);

    let history = files.history(SECOND_CID).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].plaintext, FIRST_PLAINTEXT);
    Ok(())
}

#[tokio::test]
async fn test_random_nonce_node_reads_static_envelopes() -> Result<()> {
    let dir = TempDir::new()?;
    let files = Files::new(NodeConfig {
        codec: Codec::DagCbor,
        ..NodeConfig::with_base_dir(dir.path())
    });
    files.init(key_material())?;
    files.create_repo().await?;

    let repo = files.node()?.repo_dir().to_path_buf();
    std::fs::write(repo.join(FIRST_CID), FIRST_ENVELOPE)?;

    let loaded = files.load(FIRST_CID).await?;
    assert_eq!(loaded.plaintext, FIRST_PLAINTEXT);
    assert!(loaded.signature_valid && loaded.cid_valid);
    Ok(())
}

#[tokio::test]
async fn test_saved_cids_match_cid_vectors() -> Result<()> {
    let node = i2kn_testkit::memory_node(SEED).await;
    for vector in all_vectors() {
        let cid = node.save(vector.record, None).await?;
        assert_eq!(cid.to_string(), vector.expected_cid_json, "{}", vector.name);
        assert!(node.load(&cid.to_string()).await?.is_valid(), "{}", vector.name);
    }
    Ok(())
}

#[tokio::test]
async fn test_rsa_node_identity() -> Result<()> {
    let dir = TempDir::new()?;
    let files = static_json_files(&dir);
    let peer_id = files.init(RSA_KEY_MATERIAL)?;
    assert_eq!(peer_id.to_string(), RSA_PEER_ID);
    assert!(peer_id.to_string().starts_with("Qm"));

    let repo = files.node()?.repo_dir().to_path_buf();
    assert!(repo.ends_with(format!(".i2KnV3-{}", RSA_PEER_ID)));
    Ok(())
}

#[tokio::test]
async fn test_rsa_envelope_loads() -> Result<()> {
    let dir = TempDir::new()?;
    let files = static_json_files(&dir);
    files.init(RSA_KEY_MATERIAL)?;
    files.create_repo().await?;

    let repo = files.node()?.repo_dir().to_path_buf();
    std::fs::write(repo.join(RSA_RECORD_CID), RSA_ENVELOPE)?;

    let loaded = files.load(RSA_RECORD_CID).await?;
    assert_eq!(loaded.signer.to_string(), RSA_PEER_ID);
    assert!(loaded.signer.to_string().starts_with("Qm"));
    assert!(loaded.signature_valid && loaded.cid_valid);
    assert_eq!(loaded.previous_cid, None);
    Ok(())
}

#[tokio::test]
async fn test_rsa_envelope_is_byte_exact() -> Result<()> {
    let dir = TempDir::new()?;
    let files = static_json_files(&dir);
    files.init(RSA_KEY_MATERIAL)?;
    files.create_repo().await?;

    let cid = files.save(RSA_RECORD, None).await?;
    assert_eq!(cid.to_string(), RSA_RECORD_CID);

    let repo = files.node()?.repo_dir().to_path_buf();
    assert_eq!(std::fs::read_to_string(repo.join(RSA_RECORD_CID))?, RSA_ENVELOPE);
    Ok(())
}

#[tokio::test]
async fn test_rsa_envelope_read_by_ed25519_node() -> Result<()> {
    let dir = TempDir::new()?;
    let files = static_json_files(&dir);
    files.init(key_material())?;
    files.create_repo().await?;

    let repo = files.node()?.repo_dir().to_path_buf();
    std::fs::write(repo.join(RSA_RECORD_CID), RSA_ENVELOPE)?;

    // Another node's key: the signer resolves, the checks fail.
    let loaded = files.load(RSA_RECORD_CID).await?;
    assert_eq!(loaded.signer.to_string(), RSA_PEER_ID);
    assert!(!loaded.signature_valid);
    assert!(!loaded.cid_valid);
    Ok(())
}
