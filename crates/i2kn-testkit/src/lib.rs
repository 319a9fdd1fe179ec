//! # i2kn testkit
//!
//! Testing utilities for i2kn.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records and keys with expected CIDs and peer ids
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Temporary nodes and a tracing helper for integration tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use i2kn_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, cid, _) in verify_all_vectors() {
//!     println!("{}: {} ({})", name, cid, matches);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use i2kn_core::{Codec, Record};
//! use i2kn_testkit::generators::{record_json_text, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn cid_ignores_key_order(params: RecordParams) {
//!         let a = Record::parse(&record_json_text(&params, false)).unwrap();
//!         let b = Record::parse(&record_json_text(&params, true)).unwrap();
//!         prop_assert_eq!(a.compute_cid(Codec::Json).unwrap(), b.compute_cid(Codec::Json).unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use i2kn_testkit::fixtures::{sample_record, TestNode};
//!
//! async fn example() {
//!     let fixture = TestNode::new();
//!     fixture.node.create_repo().await.unwrap();
//!     let cid = fixture.node.save(&sample_record(1), None).await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, memory_node, multi_party_nodes, sample_record, TestNode};
pub use generators::{record_from_params, record_json_text, RecordParams};
pub use vectors::{all_vectors, identity_vectors, verify_all_vectors, GoldenVector, IdentityVector};
