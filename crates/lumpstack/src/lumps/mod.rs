//! Decoders for the legacy binary lumps.
//!
//! Each decoder is a pure function over a byte buffer. Whole-lump problems
//! (too short, a count that runs past the end) come back as a [`LumpError`] so
//! the caller can log one warning and fall back to "not found". Problems with a
//! single entry of an otherwise valid table are logged here and the entry is
//! skipped.

mod colormap;
mod palette;
mod pnames;
mod texture_table;

pub use colormap::ColorMap;
pub use palette::{Palette, Rgb};
pub use pnames::PatchNames;
pub use texture_table::{decode_texture_table, TextureTableFormat};

use thiserror::Error;

/// Length of a short lump name on disk.
pub const SHORT_NAME_LEN: usize = 8;

/// Why a binary lump could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LumpError {
    #[error("{lump} is {len} bytes, at least {min} are required")]
    TooSmall {
        lump: &'static str,
        len: usize,
        min: usize,
    },

    #[error("{lump} is truncated: {reason}")]
    Truncated { lump: &'static str, reason: String },
}

/// Decode a NUL-padded 8-byte name. Names are uppercased.
pub(crate) fn short_name(raw: &[u8]) -> String {
    let raw = &raw[..raw.len().min(SHORT_NAME_LEN)];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).to_ascii_uppercase()
}
