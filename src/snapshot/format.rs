//! Snapshot container primitives: header, padded names, entry headers.
//!
//! Layout (all integers u64 LE):
//! - header: [format][db_count]
//! - entry:  [name, NUL-terminated, padded to 8][main_len][wal_len] + payloads

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::Read;

use crate::consts::{FORMAT_VERSION, NAME_BLOCK_SIZE};
use crate::error::FormatError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerHeader {
    pub format_version: u64,
    pub database_count: u64,
}

/// One database of the container (name + payload sizes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseEntry {
    pub name: String,
    pub main_size: u64,
    pub wal_size: u64,
}

/// Read the container header; the version is checked before the count is read.
pub fn read_header<R: Read>(r: &mut R) -> Result<ContainerHeader> {
    let format_version = r
        .read_u64::<LittleEndian>()
        .context("couldn't read format number")?;
    if format_version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            expected: FORMAT_VERSION,
            found: format_version,
        }
        .into());
    }
    let database_count = r
        .read_u64::<LittleEndian>()
        .context("couldn't read database count")?;
    Ok(ContainerHeader {
        format_version,
        database_count,
    })
}

/// Read a NUL-terminated name stored in 8-byte blocks.
///
/// Blocks are consumed until one contains a NUL; bytes after the first NUL in that
/// block are padding. A name whose length is a multiple of 8 is therefore followed
/// by a whole zero block.
pub fn read_padded_name<R: Read>(r: &mut R) -> Result<String> {
    let mut name = Vec::new();
    let mut block = [0u8; NAME_BLOCK_SIZE];
    loop {
        r.read_exact(&mut block).context("reading name block")?;
        match block.iter().position(|&b| b == 0) {
            Some(i) => {
                name.extend_from_slice(&block[..i]);
                break;
            }
            None => name.extend_from_slice(&block),
        }
    }
    String::from_utf8(name).map_err(|e| {
        FormatError::InvalidName {
            lossy: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
        .into()
    })
}

/// Read name, main length and WAL length of the next database.
pub fn read_entry<R: Read>(r: &mut R) -> Result<DatabaseEntry> {
    let name = read_padded_name(r).context("couldn't read the database name")?;
    let main_size = r
        .read_u64::<LittleEndian>()
        .with_context(|| format!("couldn't read main size of '{}'", name))?;
    let wal_size = r
        .read_u64::<LittleEndian>()
        .with_context(|| format!("couldn't read wal size of '{}'", name))?;
    Ok(DatabaseEntry {
        name,
        main_size,
        wal_size,
    })
}
