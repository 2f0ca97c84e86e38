//! # Shoebox Architecture
//!
//! Shoebox keeps photos on the device first and gets them to a remote endpoint
//! later. Capturing never waits on the network: an image is copied into a
//! private directory and cataloged as `Pending`, and uploads move it through
//! its state machine whenever they run.
//!
//! Like any library with a CLI client, the core makes no terminal assumptions.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cli/, wired by main.rs)                               │
//! │  - Parses arguments, renders results, owns stdout/stderr    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Owns the collaborators, parses selectors, dispatches     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)                                   │
//! │  - add, delete, upload, list, paths, doctor, config         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core                                                       │
//! │  - catalog: ordered asset list, single source of state      │
//! │  - sync: upload state machine and transport                 │
//! │  - store: private file directory, durable key-value store   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//!
//! With no operation in flight, every catalog entry names a file that exists.
//! Adding copies the file before cataloging it; deleting removes the file
//! before the entry, and keeps the entry if the file cannot be removed.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per operation
//! - [`catalog`]: The asset catalog
//! - [`sync`]: Upload synchronizer, transports, progress events
//! - [`store`]: Local file store and durable key-value store
//! - [`capture`]: Where new images come from
//! - [`model`]: `Asset` and `UploadState`
//! - [`index`]: Display indexes (`1`, `2-4`, or a UUID)
//! - [`config`]: Configuration management
//! - [`init`]: Data directory layout and wiring
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod capture;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod init;
pub mod model;
pub mod store;
pub mod sync;
