//! # Barfi Core Library
//!
//! `barfi-core` provides the upload engine behind the `barfi` command-line
//! tool: it pushes a single local file to a file-hosting service using the
//! service's chunked upload protocol and reports a shareable link.
//!
//! ## Features
//!
//! - **Chunked uploads**: Large files are split into fixed-size parts, each
//!   sent to its own pre-signed URL
//! - **Progress reporting**: Byte-level progress through a callback on the
//!   reader that feeds the HTTP bodies
//! - **Strict sequencing**: Parts are transferred one at a time, in order,
//!   and finalized as a contiguous list
//!
//! ## Modules
//!
//! - [`config`] - Configuration management
//! - [`mod@file`] - File metadata and size formatting
//! - [`progress`] - Progress-tracking reader and bounded section views
//! - [`upload`] - Upload session protocol client
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use barfi_core::{file::FileInfo, progress::ProgressReader, upload::{UploadOptions, Uploader}};
//!
//! let info = FileInfo::from_path("movie.mkv")?;
//! let reader = ProgressReader::open(&info.path, |read, size| println!("{read}/{size}"))?;
//! let mut uploader = Uploader::new(Arc::new(reader), &info.name, UploadOptions::default())?;
//! let id = uploader.upload().await?;
//! println!("{}", uploader.share_link(&id));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod error;
pub mod file;
pub mod progress;
pub mod upload;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default file-hosting endpoint
pub const DEFAULT_ENDPOINT: &str = "https://fuckingfast.co";

/// Default chunk size for uploads (5 GB)
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Block size used when streaming a chunk body from disk (256 KB)
pub const DEFAULT_READ_BLOCK_SIZE: usize = 256 * 1024;
