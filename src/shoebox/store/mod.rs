//! # Storage Layer
//!
//! Two independent stores sit under the catalog:
//!
//! - [`files::LocalFileStore`]: the binary images, one file each, in a private
//!   directory. Addressed by stored name only.
//! - [`kv::KeyValueStore`]: durable key-value persistence with atomic per-key
//!   writes. The catalog keeps its whole ordered list under a single key.
//!
//! Neither store knows about the other. Keeping them consistent (no entry
//! without a file, no file without an entry) is the job of the layers above:
//! see [`crate::catalog`] and [`crate::api`].
//!
//! ## Storage Layout
//!
//! ```text
//! <home>/
//! ├── config.json
//! ├── catalog/
//! │   └── assets.json        # FsKeyValueStore, key "assets"
//! └── files/
//!     └── photo-<ms>-<seq>.jpg
//! ```
//!
//! Both stores write through a hidden temporary file first, so readers only ever
//! see complete values.

pub mod files;
pub mod kv;
