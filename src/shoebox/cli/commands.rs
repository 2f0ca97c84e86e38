use super::print::{print_assets, print_config, print_messages};
use super::setup::{init_tracing, Cli, Commands, StateFilter};
use clap::Parser;
use shoebox::api::{CmdResult, ConfigAction};
use shoebox::capture::PathCapture;
use shoebox::error::{Result, ShoeboxError};
use shoebox::init::{data_dir, initialize, ShoeboxContext};
use std::path::PathBuf;
use tracing::debug;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let home = data_dir()?;
    debug!(home = %home.display(), "using data directory");
    let ctx = initialize(&home).await?;

    match cli.command {
        Some(Commands::Add { path, name }) => handle_add(&ctx, path, name).await,
        Some(Commands::List { state }) => handle_list(&ctx, state).await,
        Some(Commands::Upload { indexes, all }) => handle_upload(&ctx, indexes, all).await,
        Some(Commands::Delete { indexes }) => handle_delete(&ctx, indexes).await,
        Some(Commands::Path { indexes }) => handle_paths(&ctx, indexes).await,
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        Some(Commands::Doctor) => handle_doctor(&ctx).await,
        None => handle_list(&ctx, None).await,
    }
}

async fn handle_add(ctx: &ShoeboxContext, path: PathBuf, name: Option<String>) -> Result<()> {
    let mut picker = PathCapture::new(path);
    if let Some(name) = name {
        picker = picker.with_name(name);
    }
    let result = ctx.api.capture(&picker).await?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_list(ctx: &ShoeboxContext, state: Option<StateFilter>) -> Result<()> {
    let result = ctx.api.list_assets(state.map(Into::into)).await?;
    print_assets(&result.listed_assets);
    print_messages(&result.messages);
    Ok(())
}

async fn handle_upload(ctx: &ShoeboxContext, indexes: Vec<String>, all: bool) -> Result<()> {
    let result = if all {
        ctx.api.upload_all().await?
    } else {
        ctx.api.upload_assets(&indexes).await?
    };
    print_messages(&result.messages);
    fail_on_errors(&result, "Some uploads failed")
}

async fn handle_delete(ctx: &ShoeboxContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.api.delete_assets(&indexes).await?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_paths(ctx: &ShoeboxContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.api.asset_paths(&indexes).await?;
    for path in &result.asset_paths {
        println!("{}", path.display());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &ShoeboxContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = ctx.api.config(action)?;
    if let Some(config) = &result.config {
        print_config(config);
    }
    print_messages(&result.messages);
    fail_on_errors(&result, "Config not changed")
}

async fn handle_doctor(ctx: &ShoeboxContext) -> Result<()> {
    let result = ctx.api.doctor().await?;
    print_messages(&result.messages);
    Ok(())
}

/// Messages are already printed; this only sets the exit status.
fn fail_on_errors(result: &CmdResult, summary: &str) -> Result<()> {
    if result.has_errors() {
        return Err(ShoeboxError::Api(summary.to_string()));
    }
    Ok(())
}
