use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use shoebox::api::{CmdMessage, MessageLevel};
use shoebox::config::{ShoeboxConfig, CONFIG_KEYS};
use shoebox::index::DisplayAsset;
use shoebox::model::UploadState;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const STATE_WIDTH: usize = 10;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_assets(assets: &[DisplayAsset]) {
    if assets.is_empty() {
        println!("No assets found.");
        return;
    }
    for da in assets {
        println!("{}", format_asset_line(da, Utc::now()));
    }
}

pub(super) fn print_config(config: &ShoeboxConfig) {
    for key in CONFIG_KEYS {
        let value = config.get(key).unwrap_or_default();
        let shown = if *key == "api-token" {
            mask(&value)
        } else {
            value
        };
        println!("{} = {}", key, shown);
    }
}

/// `  3. sunset-1712345678901-0.jpg        uploaded     2 days ago`
fn format_asset_line(da: &DisplayAsset, now: DateTime<Utc>) -> String {
    let idx_str = format!("{:>3}. ", da.index);
    let time_ago = format_time_ago(da.asset.created_at, now);
    let state = da.asset.upload_state.to_string();

    let fixed_width = idx_str.width() + STATE_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let name = truncate_to_width(&da.asset.stored_name, available);
    let padding = available.saturating_sub(name.width());

    format!(
        "{}{}{}{}{}",
        idx_str,
        name,
        " ".repeat(padding),
        color_state(da.asset.upload_state, &format!("{:>width$}", state, width = STATE_WIDTH)),
        format!("{:>width$}", time_ago, width = TIME_WIDTH).dimmed()
    )
}

fn color_state(state: UploadState, text: &str) -> ColoredString {
    match state {
        UploadState::Pending => text.normal(),
        UploadState::InFlight => text.cyan(),
        UploadState::Uploaded => text.green(),
        UploadState::Failed => text.red(),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
