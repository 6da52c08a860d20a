//! UI utilities for consistent terminal output formatting.
//!
//! Provides shared formatting functions for status lines, error boxes and
//! the image/banner listings printed by the CLI.

use std::fmt::Write as _;

use crate::api::{BannerData, ImageRecord, Settings};
use crate::slider::format_display_date;
use crate::status::StatusMessage;

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Print an error box with a title, a detail line and optional hints.
///
/// # Example
///
/// ```ignore
/// print_error_box("Upload failed", "Error: File too large (HTTP 413)", &[]);
/// ```
///
/// Outputs:
/// ```text
/// ============================================================
/// Upload failed
/// ============================================================
///
/// Error: File too large (HTTP 413)
/// ```
pub fn print_error_box(title: &str, detail: &str, hints: &[&str]) {
    eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
    eprintln!("{title}");
    eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

    if !detail.is_empty() {
        eprintln!("\n{detail}");
    }

    if !hints.is_empty() {
        eprintln!();
        for (i, hint) in hints.iter().enumerate() {
            eprintln!("{}. {hint}", i + 1);
        }
    }
    eprintln!();
}

/// Print the outcome of an action: successes on stdout, errors on stderr.
pub fn print_status(message: &StatusMessage) {
    if message.is_error() {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

/// Render the collection as an aligned table, in backend order.
pub fn format_images(images: &[ImageRecord]) -> String {
    if images.is_empty() {
        return "No images available\n".to_string();
    }

    let id_width = images
        .iter()
        .map(|r| r.id.len())
        .max()
        .unwrap_or(2)
        .max(2);

    let mut out = String::new();
    let _ = writeln!(out, "{:<id_width$}  {:<10}  {:<20}  URL", "ID", "DATE", "CREATED");
    for record in images {
        let _ = writeln!(
            out,
            "{:<id_width$}  {}  {}  {}",
            record.id,
            record.date.format("%Y-%m-%d"),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.image_url
        );
    }
    out
}

/// Render the banner as the preview card shows it.
pub fn format_banner(banner: &BannerData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", banner.heading);
    let _ = writeln!(out, "{}% OFF", banner.discount_percentage);
    if !banner.date.is_empty() {
        let _ = writeln!(out, "{}", banner.date);
    }
    if !banner.description.is_empty() {
        let _ = writeln!(out, "{}", banner.description);
    }
    if !banner.image_url.is_empty() {
        let _ = writeln!(out, "Image: {}", banner.image_url);
    }
    out
}

/// Render the public slider: header, then one line per slide.
pub fn format_slider(settings: &Settings, images: &[ImageRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", settings.header_text);
    let _ = writeln!(out, "{}", settings.subheader_text);
    let _ = writeln!(out);

    if images.is_empty() {
        out.push_str("No images available\n");
        return out;
    }
    for (i, record) in images.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{}/{}] {}  {}",
            i + 1,
            images.len(),
            format_display_date(record.date),
            record.image_url
        );
    }
    out
}
