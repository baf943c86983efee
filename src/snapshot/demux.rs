//! Snapshot demultiplexer: header -> N entries -> exact end of stream.
//!
//! Payloads are copied verbatim into `<name>` and `<name>-wal`. Lengths are trusted;
//! a stream shorter than declared fails with `UnexpectedEof`. Files written before a
//! failure stay where they are.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::io::{self, ErrorKind, Read, Write};

use crate::consts::WAL_SUFFIX;
use crate::error::FormatError;
use crate::metrics::{record_database_unpacked, record_main_written, record_wal_written};
use crate::snapshot::format::{read_entry, read_header, DatabaseEntry};
use crate::snapshot::sink::SinkProvider;

/// Summary of one unpack run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UnpackReport {
    pub compressed: bool,
    pub format_version: u64,
    pub databases: Vec<DatabaseEntry>,
    pub bytes_written: u64,
}

/// Demultiplex a (decompressed) snapshot stream into `sinks`.
pub fn unpack_stream<R, P>(r: &mut R, sinks: &mut P) -> Result<UnpackReport>
where
    R: Read,
    P: SinkProvider,
{
    let header = read_header(r)?;
    info!("Database count: {}", header.database_count);

    let mut report = UnpackReport {
        format_version: header.format_version,
        ..UnpackReport::default()
    };

    for i in 0..header.database_count {
        let entry = read_entry(r).with_context(|| format!("database #{}", i))?;
        info!("Decoding database {}...", entry.name);

        info!("Decoding main database file ({} bytes)...", entry.main_size);
        copy_exact(r, sinks, &entry.name, entry.main_size)
            .with_context(|| format!("couldn't unpack main of '{}'", entry.name))?;
        record_main_written(entry.main_size);

        let wal_name = format!("{}{}", entry.name, WAL_SUFFIX);
        info!("Decoding WAL database file ({} bytes)...", entry.wal_size);
        copy_exact(r, sinks, &wal_name, entry.wal_size)
            .with_context(|| format!("couldn't unpack wal of '{}'", entry.name))?;
        record_wal_written(entry.wal_size);

        record_database_unpacked();
        report.bytes_written += entry.main_size + entry.wal_size;
        report.databases.push(entry);
        info!("Done!");
    }

    expect_end(r).context("checking for EOF")?;
    Ok(report)
}

/// Copy exactly `len` bytes from `r` into a fresh sink named `name`.
fn copy_exact<R, P>(r: &mut R, sinks: &mut P, name: &str, len: u64) -> Result<()>
where
    R: Read,
    P: SinkProvider,
{
    let mut sink = sinks.create(name)?;
    let copied = io::copy(&mut r.by_ref().take(len), &mut sink)
        .with_context(|| format!("copy into '{}'", name))?;
    if copied != len {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!(
                "stream ended after {} of {} byte(s) of '{}'",
                copied, len, name
            ),
        )
        .into());
    }
    sink.flush().with_context(|| format!("flush '{}'", name))?;
    debug!("demux: wrote {} byte(s) to '{}'", len, name);
    Ok(())
}

/// The stream must be exhausted: one more byte is trailing garbage.
fn expect_end<R: Read>(r: &mut R) -> Result<()> {
    let mut extra = [0u8; 1];
    loop {
        match r.read(&mut extra) {
            Ok(0) => return Ok(()),
            Ok(_) => return Err(anyhow!(FormatError::TrailingData)),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
