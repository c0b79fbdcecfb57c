//! Read/write options and their normalization rules.
//!
//! Options are plain structs with `Default` so callers can override one knob
//! at a time:
//!
//! ```
//! use ironbeam_columnar::{ReadOptions, WriteOptions};
//!
//! let read = ReadOptions { suppress_optional: true, ..Default::default() };
//! assert_eq!(read.freq, 10);
//!
//! let write = WriteOptions { recs_per_group: 128, ..Default::default() };
//! assert_eq!(write.freq, 10);
//! ```
//!
//! Both structs are serde-friendly, so they can live inside a larger JSON job
//! description ([`ReadOptions::from_json`], [`WriteOptions::from_json`]).

use anyhow::{Context, Result};
use parquet::basic::Compression as ParquetCompression;
use serde::{Deserialize, Serialize};

/// Smallest progress cadence the reader accepts.
pub const MIN_FREQ: usize = 8;
/// Largest progress cadence, also used when the caller passes `<= 0`.
pub const MAX_FREQ: usize = 256;
/// Default row-group size for the writer.
pub const DEFAULT_RECS_PER_GROUP: usize = 5000;
/// Largest row-group size the writer accepts.
pub const MAX_RECS_PER_GROUP: usize = 1_000_000;

/// Clamp a progress cadence into `[MIN_FREQ, MAX_FREQ]`; `<= 0` maps to `MAX_FREQ`.
#[must_use]
pub fn clamp_freq(freq: i64) -> usize {
    if freq <= 0 {
        return MAX_FREQ;
    }
    usize::try_from(freq).map_or(MAX_FREQ, |f| f.clamp(MIN_FREQ, MAX_FREQ))
}

/// Clamp a row-group size into `[1, MAX_RECS_PER_GROUP]`; `<= 0` maps to the default.
#[must_use]
pub fn clamp_recs_per_group(recs: i64) -> usize {
    if recs <= 0 {
        return DEFAULT_RECS_PER_GROUP;
    }
    usize::try_from(recs).map_or(MAX_RECS_PER_GROUP, |r| r.clamp(1, MAX_RECS_PER_GROUP))
}

/// Options for [`crate::read`] and [`crate::Reader::create`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Force nullable physical columns into required logical fields, filling
    /// nulls with NaN (floats) or the type's zero/epoch value.
    pub suppress_optional: bool,
    /// Progress cadence in rows; clamped by [`clamp_freq`] when the reader runs.
    pub freq: i64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            suppress_optional: false,
            freq: 10,
        }
    }
}

impl ReadOptions {
    /// Parse options from a JSON object; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid options object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse read options")
    }
}

/// Page compression for written files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Pages are stored as encoded, with no codec.
    #[default]
    Uncompressed,
    /// Snappy; requires the `compression-snappy` feature.
    #[cfg(feature = "compression-snappy")]
    Snappy,
    /// Zstandard at the library's default level; requires the
    /// `compression-zstd` feature.
    #[cfg(feature = "compression-zstd")]
    Zstd,
}

impl Compression {
    pub(crate) fn to_parquet(self) -> ParquetCompression {
        match self {
            Self::Uncompressed => ParquetCompression::UNCOMPRESSED,
            #[cfg(feature = "compression-snappy")]
            Self::Snappy => ParquetCompression::SNAPPY,
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => ParquetCompression::ZSTD(parquet::basic::ZstdLevel::default()),
        }
    }
}

/// Options for [`crate::get_writer_with`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Rows per physical row group; clamped by [`clamp_recs_per_group`].
    pub recs_per_group: i64,
    /// Progress cadence in rows while accumulating; clamped by [`clamp_freq`].
    pub freq: i64,
    /// Codec applied to every column chunk; serialized in lowercase.
    pub compression: Compression,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            recs_per_group: 5000,
            freq: 10,
            compression: Compression::default(),
        }
    }
}

impl WriteOptions {
    /// Parse options from a JSON object; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid options object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse write options")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freq_clamps_to_bounds() {
        assert_eq!(clamp_freq(0), MAX_FREQ);
        assert_eq!(clamp_freq(-5), MAX_FREQ);
        assert_eq!(clamp_freq(1), MIN_FREQ);
        assert_eq!(clamp_freq(10), 10);
        assert_eq!(clamp_freq(10_000), MAX_FREQ);
    }

    #[test]
    fn recs_per_group_clamps_to_bounds() {
        assert_eq!(clamp_recs_per_group(0), DEFAULT_RECS_PER_GROUP);
        assert_eq!(clamp_recs_per_group(1), 1);
        assert_eq!(clamp_recs_per_group(5_000_000), MAX_RECS_PER_GROUP);
    }

    #[test]
    fn options_parse_with_defaults() -> Result<()> {
        let r = ReadOptions::from_json(r#"{"suppress_optional": true}"#)?;
        assert!(r.suppress_optional);
        assert_eq!(r.freq, 10);

        let w = WriteOptions::from_json(r#"{"recs_per_group": 7, "compression": "uncompressed"}"#)?;
        assert_eq!(w.recs_per_group, 7);
        assert_eq!(w.compression, Compression::Uncompressed);
        Ok(())
    }

    #[cfg(all(feature = "compression-snappy", feature = "compression-zstd"))]
    #[test]
    fn compression_names_are_lowercase() -> Result<()> {
        for (name, expected) in [("snappy", Compression::Snappy), ("zstd", Compression::Zstd)] {
            let w = WriteOptions::from_json(&format!(r#"{{"compression": "{name}"}}"#))?;
            assert_eq!(w.compression, expected);
        }
        assert!(WriteOptions::from_json(r#"{"compression": "Snappy"}"#).is_err());
        Ok(())
    }
}
