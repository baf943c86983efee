//! Unpack entry points: detect the envelope, route the stream, demultiplex.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::config::UnpackConfig;
use crate::lz4::Lz4Reader;
use crate::snapshot::{unpack_stream, DirSinks, SinkProvider, UnpackReport};
use crate::source::{is_compressed, Source};

/// Snapshot bytes, either straight from the source or through the LZ4 adapter.
pub enum SnapshotStream<R: Read> {
    Raw(BufReader<Source<R>>),
    Lz4(Lz4Reader<Source<R>>),
}

impl<R: Read> SnapshotStream<R> {
    pub fn is_compressed(&self) -> bool {
        matches!(self, SnapshotStream::Lz4(_))
    }

    /// Release the decompression session, if any. Idempotent.
    pub fn close(&mut self) {
        if let SnapshotStream::Lz4(r) = self {
            r.close();
        }
    }
}

impl<R: Read> Read for SnapshotStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SnapshotStream::Raw(r) => r.read(buf),
            SnapshotStream::Lz4(r) => r.read(buf),
        }
    }
}

/// Peek the envelope magic and wrap `inner` accordingly. Nothing is consumed by detection.
pub fn open_stream<R: Read>(inner: R, cfg: &UnpackConfig) -> Result<SnapshotStream<R>> {
    let mut src = Source::new(inner);
    let compressed = is_compressed(&mut src).context("detect snapshot compression")?;
    if compressed {
        info!("LZ4 frame envelope detected, decompressing");
        let r = Lz4Reader::with_capacity(src, cfg.input_buffer_size, cfg.output_buffer_size)?;
        Ok(SnapshotStream::Lz4(r))
    } else {
        debug!("no envelope, reading snapshot as is");
        Ok(SnapshotStream::Raw(BufReader::with_capacity(
            cfg.copy_buffer_size,
            src,
        )))
    }
}

/// Unpack a snapshot from any reader into `sinks`.
pub fn unpack_reader<R, P>(inner: R, sinks: &mut P, cfg: &UnpackConfig) -> Result<UnpackReport>
where
    R: Read,
    P: SinkProvider,
{
    let mut stream = open_stream(inner, cfg)?;
    let res = unpack_stream(&mut stream, sinks);
    stream.close();

    let mut report = res?;
    report.compressed = stream.is_compressed();
    Ok(report)
}

/// Unpack the snapshot at `path` into `cfg.out_dir`.
pub fn unpack_file(path: &Path, cfg: &UnpackConfig) -> Result<UnpackReport> {
    info!(
        "unpack: snapshot={}, out_dir={}",
        path.display(),
        cfg.out_dir.display()
    );
    let f = File::open(path).with_context(|| format!("open snapshot {}", path.display()))?;
    let mut sinks = DirSinks::new(&cfg.out_dir)?;
    unpack_reader(f, &mut sinks, cfg).with_context(|| format!("unpack {}", path.display()))
}
