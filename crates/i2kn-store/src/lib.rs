//! # i2kn store
//!
//! Storage for i2kn nodes. Provides the on-disk [`Envelope`] format and a
//! trait-based interface over one node's storage root, with filesystem and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Envelope read/write on top of any store
//! - [`FsStore`] - One directory per node, atomic file writes
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Envelope`] - Encrypted record plus signer key, signature and chain link
//!
//! ## Usage
//!
//! ```rust,no_run
//! use i2kn_store::{FsStore, Store};
//!
//! async fn example() -> i2kn_store::Result<()> {
//!     let store = FsStore::new("/home/me/.i2KnV3-12D3KooW...");
//!     store.create_root(&[]).await?;
//!     store.put("notes.txt", b"hello").await?;
//!     let data = store.get("notes.txt").await?;
//!     assert_eq!(&data[..], b"hello");
//!     Ok(())
//! }
//! ```

pub mod envelope;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use envelope::Envelope;
pub use error::{Result, StoreError};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use traits::{validate_key, Store, StoreExt};
