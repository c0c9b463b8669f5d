//! Upload command implementation.
//!
//! Validates the file, wires the reader's progress callback to the console
//! and drives the upload session to completion.

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};

use barfi_core::config::Config;
use barfi_core::file::FileInfo;
use barfi_core::progress::ProgressReader;
use barfi_core::upload::{UploadOptions, Uploader};

use super::UploadArgs;
use crate::ui;

/// Run the upload command.
pub async fn run(args: UploadArgs, config: Config, silent: bool) -> Result<()> {
    let options = resolve_options(&args, config);

    let info = FileInfo::from_path(&args.file)?;

    tracing::info!(
        silent,
        endpoint = %options.endpoint,
        directory_id = options.directory_id.as_deref().unwrap_or(""),
        has_token = options.token.is_some(),
        version = barfi_core::VERSION,
        "starting uploader"
    );

    let file = File::open(&info.path)
        .with_context(|| format!("failed to open file '{}'", info.path.display()))?;
    let reader = ProgressReader::new(file, info.size, ui::progress_callback(silent));

    let mut uploader = Uploader::new(Arc::new(reader), &info.name, options)
        .context("failed to init upload")?;

    let result = uploader.upload().await;
    if !silent {
        ui::finish_progress_line();
    }
    let id = result.context("upload failed with error")?;

    println!("{}", uploader.share_link(&id));
    Ok(())
}

/// Merge flags over the config file. Flags (and their env vars) win.
fn resolve_options(args: &UploadArgs, config: Config) -> UploadOptions {
    let mut options = UploadOptions {
        endpoint: args
            .endpoint
            .clone()
            .unwrap_or(config.general.endpoint),
        directory_id: args.directory_id.clone().or(config.auth.directory_id),
        token: args.token.clone().or(config.auth.token),
        ..Default::default()
    };
    if let Some(chunk_size) = args.chunk_size {
        options.chunk_size = chunk_size;
    }
    options
}
