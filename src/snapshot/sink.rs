//! Output sinks for unpacked database files.

use anyhow::{Context, Result};
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::FormatError;

/// Creates (or truncates) a named sink for sequential writes.
pub trait SinkProvider {
    type Sink: Write;

    fn create(&mut self, name: &str) -> Result<Self::Sink>;
}

/// Sinks are plain files inside one directory.
#[derive(Clone, Debug)]
pub struct DirSinks {
    root: PathBuf,
}

impl DirSinks {
    /// The directory is created if missing.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("create output dir {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// A name must stay a single path component inside the output directory.
pub fn check_file_name(name: &str) -> Result<(), FormatError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if unsafe_name {
        warn!("sink: refusing file name {:?}", name);
        return Err(FormatError::UnsafeName {
            name: name.to_string(),
        });
    }
    Ok(())
}

impl SinkProvider for DirSinks {
    type Sink = BufWriter<File>;

    fn create(&mut self, name: &str) -> Result<Self::Sink> {
        check_file_name(name)?;
        let path = self.path_of(name);
        let f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        Ok(BufWriter::new(f))
    }
}
