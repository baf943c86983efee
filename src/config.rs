//! Centralized configuration for the unpacker.
//!
//! - One place for tunables instead of scattered env lookups.
//! - `UnpackConfig::from_env()` reads the DQLITE_UNPACK_* variables.
//! - `with_*` setters override single fields (tests, embedding callers).
//!
//! Buffer sizes below MIN_BUFFER_SIZE are raised to it; unparsable values are ignored.

use std::fmt;
use std::path::PathBuf;

use crate::consts::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};

#[derive(Clone, Debug)]
pub struct UnpackConfig {
    /// Directory receiving `<name>` and `<name>-wal` files.
    /// Env: DQLITE_UNPACK_OUT_DIR (default ".")
    pub out_dir: PathBuf,

    /// Capacity of the compressed input buffer of the LZ4 adapter.
    /// Env: DQLITE_UNPACK_INPUT_BUF (default 64 KiB)
    pub input_buffer_size: usize,

    /// Capacity of the decompressed output buffer of the LZ4 adapter.
    /// Env: DQLITE_UNPACK_OUTPUT_BUF (default 64 KiB)
    pub output_buffer_size: usize,

    /// BufReader capacity used for uncompressed snapshots.
    /// Env: DQLITE_UNPACK_COPY_BUF (default 64 KiB)
    pub copy_buffer_size: usize,

    /// Print the final report as JSON instead of a text summary.
    /// Env: DQLITE_UNPACK_JSON = 0|1|true|false (default false)
    pub json: bool,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            input_buffer_size: DEFAULT_BUFFER_SIZE,
            output_buffer_size: DEFAULT_BUFFER_SIZE,
            copy_buffer_size: DEFAULT_BUFFER_SIZE,
            json: false,
        }
    }
}

impl UnpackConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env`, but with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("DQLITE_UNPACK_OUT_DIR") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.out_dir = PathBuf::from(s);
            }
        }

        if let Some(n) = lookup("DQLITE_UNPACK_INPUT_BUF").and_then(|v| parse_size(&v)) {
            cfg.input_buffer_size = n;
        }
        if let Some(n) = lookup("DQLITE_UNPACK_OUTPUT_BUF").and_then(|v| parse_size(&v)) {
            cfg.output_buffer_size = n;
        }
        if let Some(n) = lookup("DQLITE_UNPACK_COPY_BUF").and_then(|v| parse_size(&v)) {
            cfg.copy_buffer_size = n;
        }

        if let Some(v) = lookup("DQLITE_UNPACK_JSON") {
            let s = v.trim().to_ascii_lowercase();
            cfg.json = s == "1" || s == "true" || s == "on" || s == "yes";
        }

        cfg
    }

    pub fn with_out_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_input_buffer_size(mut self, n: usize) -> Self {
        self.input_buffer_size = n.max(MIN_BUFFER_SIZE);
        self
    }

    pub fn with_output_buffer_size(mut self, n: usize) -> Self {
        self.output_buffer_size = n.max(MIN_BUFFER_SIZE);
        self
    }

    pub fn with_copy_buffer_size(mut self, n: usize) -> Self {
        self.copy_buffer_size = n.max(MIN_BUFFER_SIZE);
        self
    }

    pub fn with_json(mut self, on: bool) -> Self {
        self.json = on;
        self
    }
}

fn parse_size(v: &str) -> Option<usize> {
    v.trim()
        .parse::<usize>()
        .ok()
        .map(|n| n.max(MIN_BUFFER_SIZE))
}

impl fmt::Display for UnpackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UnpackConfig {{ \
             out_dir: {}, \
             input_buffer_size: {}, \
             output_buffer_size: {}, \
             copy_buffer_size: {}, \
             json: {} \
             }}",
            self.out_dir.display(),
            self.input_buffer_size,
            self.output_buffer_size,
            self.copy_buffer_size,
            self.json,
        )
    }
}
