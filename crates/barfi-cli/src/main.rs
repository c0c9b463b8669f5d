//! Barfi CLI - Upload a file to a file-hosting service
//!
//! Barfi pushes a single local file through the service's chunked upload
//! protocol and prints a shareable link when the upload completes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Upload a file anonymously
//! barfi upload ./movie.mkv
//!
//! # Upload into a directory of your account
//! barfi upload --token <TOKEN> --dir <DIRECTORY_ID> ./movie.mkv
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

use std::process::ExitCode;

use clap::Parser;

mod commands;
pub mod ui;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = commands::load_config();

    let silent = cli.silent || config.ui.silent;
    init_logging(cli.debug, silent);

    let result = match cli.command {
        Command::Upload(args) => commands::upload::run(args, config, silent).await,
        Command::Config(args) => commands::config::run(args),
        Command::Completions(args) => {
            commands::completions::run(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool, silent: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if silent {
        "error"
    } else if debug {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,barfi={level},barfi_core={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
