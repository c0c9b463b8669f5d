//! UI utilities for Barfi CLI.

use std::io::{self, Write};

use barfi_core::file::{format_size, percent};
use barfi_core::progress::ProgressCallback;

/// Build the progress callback for the reader.
///
/// When `silent` is set the callback does nothing.
pub fn progress_callback(silent: bool) -> ProgressCallback {
    if silent {
        return Box::new(|_, _| {});
    }

    Box::new(|read, size| {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r{}", format_progress(read, size));
        let _ = stdout.flush();
    })
}

/// End the in-place progress line.
pub fn finish_progress_line() {
    println!();
}

/// Format one progress line, e.g. `total upload: 1.5MB/3.0MB    progress: 50%`.
pub fn format_progress(read: u64, size: u64) -> String {
    format!(
        "total upload: {}/{}    progress: {}%",
        format_size(read),
        format_size(size),
        percent(read, size)
    )
}

/// Print an error chain and any suggestion to stderr.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("Error: {err:#}");

    let suggestion = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<barfi_core::Error>())
        .and_then(barfi_core::Error::suggestion);

    if let Some(suggestion) = suggestion {
        eprintln!();
        eprintln!("Suggestion:");
        for line in suggestion.lines() {
            eprintln!("  {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_progress() {
        assert_eq!(
            format_progress(1536 * 1024, 3 * 1024 * 1024),
            "total upload: 1.5MB/3.0MB    progress: 50%"
        );
        assert_eq!(format_progress(0, 10), "total upload: 0B/10B    progress: 0%");
        assert_eq!(format_progress(10, 10), "total upload: 10B/10B    progress: 100%");
    }
}
