//! # Commands
//!
//! One module per user-facing operation. Each takes the collaborators it needs
//! as arguments and returns a [`CmdResult`]: the assets it touched or listed,
//! plus leveled messages for whoever presents them. Nothing here writes to a
//! terminal.

use crate::config::ShoeboxConfig;
use crate::index::DisplayAsset;
use crate::model::Asset;
use std::path::PathBuf;

pub mod add;
pub mod config;
pub mod delete;
pub mod doctor;
pub mod helpers;
pub mod list;
pub mod paths;
pub mod upload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_assets: Vec<Asset>,
    pub listed_assets: Vec<DisplayAsset>,
    pub asset_paths: Vec<PathBuf>,
    pub config: Option<ShoeboxConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_assets(mut self, assets: Vec<Asset>) -> Self {
        self.affected_assets = assets;
        self
    }

    pub fn with_listed_assets(mut self, assets: Vec<DisplayAsset>) -> Self {
        self.listed_assets = assets;
        self
    }

    pub fn with_asset_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.asset_paths = paths;
        self
    }

    pub fn with_config(mut self, config: ShoeboxConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether any message reports a failure.
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
