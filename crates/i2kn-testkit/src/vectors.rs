//! Golden test vectors for deterministic verification.
//!
//! These vectors pin canonical encoding, CID rendering and peer identity so
//! that other implementations on the network agree on every byte.

use i2kn_core::{canonical_bytes, Codec, NodeKey, Record};

/// A golden CID vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Record as JSON text.
    pub record: &'static str,
    /// Expected dag-cbor canonical bytes (hex).
    pub expected_cbor: &'static str,
    /// Expected CID under dag-cbor.
    pub expected_cid_cbor: &'static str,
    /// Expected CID under json.
    pub expected_cid_json: &'static str,
}

/// A golden peer identity vector.
#[derive(Debug, Clone)]
pub struct IdentityVector {
    pub seed: [u8; 32],
    /// Expected protobuf-marshalled public key (hex).
    pub expected_public_key: &'static str,
    /// Expected base64 marshalled private key.
    pub expected_key_material: &'static str,
    pub expected_peer_id: &'static str,
}

/// Get all golden CID vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "minimal record",
            record: r#"{"id":1,"name":"a","content":"hello"}"#,
            expected_cbor: "a362696401646e616d65616167636f6e74656e746568656c6c6f",
            expected_cid_cbor: "bafyreiauwumyovfnhduz5zj5eialvumwmtkfpr4osspeus3s2tb45tlbdy",
            expected_cid_json: "bagaaierau4plwaegas5lupvzpjr7m56fyjc4t6cs6l4rqxlrj46tnkam4idq",
        },
        GoldenVector {
            name: "nested content, unsorted keys",
            record: r#"{"content":{"title":"t","tags":["x","y"],"body":{"z":1,"a":-2}},"name":"Notes","id":"page-7"}"#,
            expected_cbor: "a362696466706167652d37646e616d65654e6f74657367636f6e74656e74a364626f6479a2616121617a0164746167738261786179657469746c656174",
            expected_cid_cbor: "bafyreihskal2m77vcxxiiz2uzgh57dd3atm2a7tu64da5agrpdy67ngk7i",
            expected_cid_json: "bagaaieranrui6uhs4guixdlvwioekcqlmucxdiuqcnvqcoatf6kfphemqaya",
        },
        GoldenVector {
            name: "missing content field",
            record: r#"{"id":0,"name":"only id and name"}"#,
            expected_cbor: "a262696400646e616d65706f6e6c7920696420616e64206e616d65",
            expected_cid_cbor: "bafyreid4c6epoc4vu2jejvxj5ez4lntds6ran22sipcvlaemvnlhd3dfg4",
            expected_cid_json: "bagaaierarwrkf7fybvtq2ry3hqdwmcqg6iczgeqtu7xizycgl5xgd26tlgva",
        },
        GoldenVector {
            name: "float content",
            record: r#"{"id":2,"name":"price","content":{"amount":9.99,"currency":"EUR","ratio":0.5}}"#,
            expected_cbor: "a362696402646e616d6565707269636567636f6e74656e74a365726174696ffb3fe000000000000066616d6f756e74fb4023fae147ae147b6863757272656e637963455552",
            expected_cid_cbor: "bafyreiasyx24kxf4gauvqlvzeriwtk4lnu76an3hef3cyqzr6ho5eczh3y",
            expected_cid_json: "bagaaierauyjfreueddawy3feeq67efu6cfzi6q3fdnyb4cecdtwiilxlir7a",
        },
    ]
}

/// Get all golden identity vectors.
pub fn identity_vectors() -> Vec<IdentityVector> {
    vec![
        IdentityVector {
            seed: [0x00; 32],
            expected_public_key: "080112203b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
            expected_key_material: "CAESQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAO2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik=",
            expected_peer_id: "12D3KooWDpJ7As7BWAwRMfu1VU2WCqNjvq387JEYKDBj4kx6nXTN",
        },
        IdentityVector {
            seed: [0x01; 32],
            expected_public_key: "080112208a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            expected_key_material: "CAESQAEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBiojj3XQJ8ZX9UtstPLpdcspnCb8dlBIb83SIAbQPb1w=",
            expected_peer_id: "12D3KooWK99VoVxNE7XzyBwXEzW7xhK7Gpv85r9F3V3fyKSUKPH5",
        },
        IdentityVector {
            seed: [0x42; 32],
            expected_public_key: "080112202152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_key_material: "CAESQEJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCIVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=",
            expected_peer_id: "12D3KooWC4T1AXU2s2YBgGJ2FeaYVtsKoHZWJeubnWe9SnuSE7Zb",
        },
    ]
}

/// A 2048-bit RSA node key, as older nodes of the network carry, in base64
/// libp2p-marshalled PKCS#1 form.
pub const RSA_KEY_MATERIAL: &str = "CAASqAkwggSkAgEAAoIBAQC5duyxV3chki8M7PVgJfYv3A1kE7oXOlIFd+ss3unlSCH5Yl5VB9yFdCImEzTYqWwEBOti003AdPjBkldcId8yl0i6fzCclVe5Jh2VSGba13JMpWe5BtTXcjCeTt/8cJuR4MSpDZuxpfPLi41PsSBeFFGtKKC0SL/LlGCtCgONhhzdXG2vZQoVoSR+wwRtk6q1j6lkTDtR/3gvE7/xXzs46MdzjPUA7NKH9G4B9dVRgw8FqJccVU4GHR5/Aw9L3UJQXxcxMbzRBPVS3ZZJA+BAjLjDoSsi6AzRtcKB1FqLhIRcCLIBBrkosjdBhiddgXcsiI/TbwEP25EmzFQyNxwNAgMBAAECggEAKQ0DsvUzL0EWHPxOC6wbY9iHNkGPjRihkwhKC7KDfvaKXpLBYnzM+NUNwfO6XMKTYAheuY8fxJufe+kSYRg2ORJ3TKBeeCouMpMXNTXDXmkVqZVq8e9rKQzjagb3WP7r0Ew5+1lBvv6GieUnsB36lhhVQ8icWYtIuJztESAITUijZagh/NdUHths2rqtJHyZgBKEozb3bsr4bFi3eMHlk3zVl1l1iIQTdbeSWUyUDq8r3U+0c48m1asg/JcYfbf2Faql4naS3Qed3jDYM+A6OalxtLfnjTlIeSJ6CZU4hQ/Rw7l3Uh//Nkw/hs9iqj4Ml9ucdl+ZGByuQtEYN62BQQKBgQDpjf9RMXWoHMFOhXLfmexXOeGtWkfveEq341VWs6q0lag+LeOGFXviyKZvXErgwRNU9r+dDDO93BJTJX8kuC3GrkNpCVoUCVHxzBEz1iFHk+nBnlbAnaFIMF2crQnczmN4QMho/1j8chdo4lWqCFQfrsswBXnbbyo7flvZWQ/PpQKBgQDLScuX3mAHnKwY+uje67HPJcT8HUuVDtq1OZ3xNaIzmQJTemkS1WNiJPk2k1U7u8IG2m7Si3Yf8dETAUZFV9npceGXZ9NUbiVAD+jlhkFB/W8ynboENrGB/AmhHkEnVG+Z3Lh76QTb1sTGn5aJ8JthDtZAiGN9qQ/QkQy3QsxuSQKBgQDB7R7vuwK32VCFM3eDxJoifzQtLcaHR7m64K+Oc1at5YoyPwYp4pLgZr0TwG2IG6lCpjPKYkRgRGiO05az1Z5k13Ovto0uD+MTw98QzJ8LgPzawO/Ftd0iRM6l9mQ3DMQ5KIl/7W5lBxL7CtwYeBvpxsh+Ej3xf2dwyOXZHgNr5QKBgD9LQbWOSk30bOz2Kk1GCz2Y3+UzZdYKIvRr9Q4mCdOQ31WIdnCjuebT5jgk1VPc2MNzfS/Wtjep/dOyAOQUP0fc6kVO0VCnXre8fGICVA0s0FNtIn6vXMNA6uqcVeLd+kVooJQL8DRWgTvqcl+OZ4JnsTO0g22bls30a4YfqTDpAoGBAOSX1qWVoO9aYmYbxKL08kVxKwkWIdbdkCvcIAs93zlXzv3BejArGosxYOgAlq0F0OOmxBUZN4fRQsX3A4MQ8Evswuhj6p4zb5ov2naBM4I9NduS3XrSuG9jpSEYwNg1dvdEo6tUhQ12GT983RZoECkpz1zjQUSNtkCGjr/WCM3w";

/// Peer id of [`RSA_KEY_MATERIAL`]: SHA-256 multihash, hence `Qm`.
pub const RSA_PEER_ID: &str = "QmVLabYWDQf7KmPt2797wGtTPtQVPDqY8QR2Fv6pWHkFLW";

/// Record saved by the RSA node.
pub const RSA_RECORD: &str = r#"{"id":1,"name":"a","content":"hello"}"#;

/// CID of [`RSA_RECORD`] under the json codec.
pub const RSA_RECORD_CID: &str = "bagaaierau4plwaegas5lupvzpjr7m56fyjc4t6cs6l4rqxlrj46tnkam4idq";

/// Envelope the RSA node writes for [`RSA_RECORD`] with static nonces.
pub const RSA_ENVELOPE: &str = r#"{"item":"EHd/eTC7hitVta3x1V1YMxcy8iMNcKsRLuAVGJTvIkQOdtJnYcmTtXHXFDCf8uwhjVTYeFmtkXKELdGHsxxVZUehCn5GdNn4Ozpn+XuAOrGjZC2NcR32A9gOO0SlQFuUJIY9lsVlBgPKN/k=","byPubkey":"CAASpgIwggEiMA0GCSqGSIb3DQEBAQUAA4IBDwAwggEKAoIBAQC5duyxV3chki8M7PVgJfYv3A1kE7oXOlIFd+ss3unlSCH5Yl5VB9yFdCImEzTYqWwEBOti003AdPjBkldcId8yl0i6fzCclVe5Jh2VSGba13JMpWe5BtTXcjCeTt/8cJuR4MSpDZuxpfPLi41PsSBeFFGtKKC0SL/LlGCtCgONhhzdXG2vZQoVoSR+wwRtk6q1j6lkTDtR/3gvE7/xXzs46MdzjPUA7NKH9G4B9dVRgw8FqJccVU4GHR5/Aw9L3UJQXxcxMbzRBPVS3ZZJA+BAjLjDoSsi6AzRtcKB1FqLhIRcCLIBBrkosjdBhiddgXcsiI/TbwEP25EmzFQyNxwNAgMBAAE=","sig":"R3cZd9WIUYOyvsWKh6YXYZvFU1j7K3GXA32zolPs4CwaEHoySrocL9fbLor+nINQs/tN/QnvXYBUSe59y1A0EgnguWqT/bJTrPUfMjcMCqZxd7DOFhGt3VglL5rF4nCVOtEDCR3PNvzW7ZfznxSDP7mPyZj2D9v2PxexvaqnuEnQrpjMlwiSb2t+q5rpdpIpUg0IoXa2Ui1y520FtBWUt/9uP71JogeGknzfAzqJf1X6EYfK4ebj6+Y8LGP6B08N1adO7VKUysA9o1HSNko6rIfj+uMH4hkfkiIV5qirbr7cuO74uH7kzh6v0dMzE//apCC/DjyvUatzCVm4t5C/bA=="}"#;

/// Verify all golden CID vectors.
///
/// Returns `(name, matches, cbor_cid, json_cid)` per vector. An empty
/// expectation always matches, so new vectors can be added before their
/// outputs are pinned.
pub fn verify_all_vectors() -> Vec<(String, bool, String, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let record = Record::parse(v.record).expect("golden record parses");
            let cbor = hex::encode(canonical_bytes(&record, Codec::DagCbor).expect("encodes"));
            let cid_cbor = record.compute_cid(Codec::DagCbor).expect("cid").to_string();
            let cid_json = record.compute_cid(Codec::Json).expect("cid").to_string();

            let matches = (v.expected_cbor.is_empty() || cbor == v.expected_cbor)
                && (v.expected_cid_cbor.is_empty() || cid_cbor == v.expected_cid_cbor)
                && (v.expected_cid_json.is_empty() || cid_json == v.expected_cid_json);

            (v.name.to_string(), matches, cid_cbor, cid_json)
        })
        .collect()
}

/// Verify all identity vectors. Returns `(peer_id, matches)` per vector.
pub fn verify_identity_vectors() -> Vec<(String, bool)> {
    identity_vectors()
        .iter()
        .map(|v| {
            let key = NodeKey::from_seed(&v.seed).expect("seeded key");
            let peer_id = key.peer_id().to_string();
            let matches = key.public_key().to_hex() == v.expected_public_key
                && key.to_base64().expect("encode key").as_str() == v.expected_key_material
                && peer_id == v.expected_peer_id;
            (peer_id, matches)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_vectors_match() {
        for (name, matches, cbor, json) in verify_all_vectors() {
            assert!(matches, "vector '{}' mismatch: {} / {}", name, cbor, json);
        }
    }

    #[test]
    fn test_identity_vectors_match() {
        for (peer_id, matches) in verify_identity_vectors() {
            assert!(matches, "identity vector mismatch: {}", peer_id);
        }
    }

    #[test]
    fn test_key_material_decodes_to_same_identity() {
        for v in identity_vectors() {
            let key = NodeKey::from_base64(v.expected_key_material).unwrap();
            assert_eq!(key.peer_id().to_string(), v.expected_peer_id);
        }
    }

    #[test]
    fn test_rsa_material_identity() {
        let key = NodeKey::from_base64(RSA_KEY_MATERIAL).unwrap();
        assert_eq!(key.peer_id().to_string(), RSA_PEER_ID);
        assert!(RSA_PEER_ID.starts_with("Qm"));

        // RSA material cannot be re-encoded by libp2p; the original bytes are kept.
        assert_eq!(key.to_base64().unwrap().as_str(), RSA_KEY_MATERIAL);

        let sig = key.sign(b"msg").unwrap();
        assert_eq!(sig.as_bytes().len(), 256);
        assert!(key.public_key().verify(b"msg", sig.as_bytes()));
    }

    #[test]
    fn test_rsa_record_cid() {
        let record = Record::parse(RSA_RECORD).unwrap();
        assert_eq!(record.compute_cid(Codec::Json).unwrap().to_string(), RSA_RECORD_CID);
    }

    #[test]
    fn test_vector_cids_are_distinct() {
        let results = verify_all_vectors();
        for (i, a) in results.iter().enumerate() {
            for b in &results[i + 1..] {
                assert_ne!(a.2, b.2, "{} and {} share a CID", a.0, b.0);
            }
        }
    }
}
