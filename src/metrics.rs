//! Lightweight global metrics for the unpacker.
//!
//! Atomic counters for:
//! - LZ4 adapter (sessions, source reads, decompress steps, bytes in/out)
//! - Demultiplexer (databases, files, bytes written)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- LZ4 adapter -----
static LZ4_SESSIONS_OPENED: AtomicU64 = AtomicU64::new(0);
static LZ4_SOURCE_READS: AtomicU64 = AtomicU64::new(0);
static LZ4_COMPRESSED_BYTES_IN: AtomicU64 = AtomicU64::new(0);
static LZ4_DECOMPRESS_STEPS: AtomicU64 = AtomicU64::new(0);
static LZ4_BYTES_OUT: AtomicU64 = AtomicU64::new(0);

// ----- Demux -----
static DATABASES_UNPACKED: AtomicU64 = AtomicU64::new(0);
static FILES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static MAIN_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static WAL_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // LZ4 adapter
    pub lz4_sessions_opened: u64,
    pub lz4_source_reads: u64,
    pub lz4_compressed_bytes_in: u64,
    pub lz4_decompress_steps: u64,
    pub lz4_bytes_out: u64,

    // Demux
    pub databases_unpacked: u64,
    pub files_written: u64,
    pub main_bytes_written: u64,
    pub wal_bytes_written: u64,
}

impl MetricsSnapshot {
    /// Decompressed/compressed ratio (0.0 if nothing was read).
    pub fn lz4_expansion_ratio(&self) -> f64 {
        if self.lz4_compressed_bytes_in == 0 {
            0.0
        } else {
            self.lz4_bytes_out as f64 / self.lz4_compressed_bytes_in as f64
        }
    }
}

// ----- Recorders (LZ4 adapter) -----
pub fn record_lz4_session_opened() {
    LZ4_SESSIONS_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_lz4_source_read(bytes: usize) {
    LZ4_SOURCE_READS.fetch_add(1, Ordering::Relaxed);
    LZ4_COMPRESSED_BYTES_IN.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_lz4_decompress_step(produced: usize) {
    LZ4_DECOMPRESS_STEPS.fetch_add(1, Ordering::Relaxed);
    LZ4_BYTES_OUT.fetch_add(produced as u64, Ordering::Relaxed);
}

// ----- Recorders (Demux) -----
pub fn record_database_unpacked() {
    DATABASES_UNPACKED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_main_written(bytes: u64) {
    FILES_WRITTEN.fetch_add(1, Ordering::Relaxed);
    MAIN_BYTES_WRITTEN.fetch_add(bytes, Ordering::Relaxed);
}

pub fn record_wal_written(bytes: u64) {
    FILES_WRITTEN.fetch_add(1, Ordering::Relaxed);
    WAL_BYTES_WRITTEN.fetch_add(bytes, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        lz4_sessions_opened: LZ4_SESSIONS_OPENED.load(Ordering::Relaxed),
        lz4_source_reads: LZ4_SOURCE_READS.load(Ordering::Relaxed),
        lz4_compressed_bytes_in: LZ4_COMPRESSED_BYTES_IN.load(Ordering::Relaxed),
        lz4_decompress_steps: LZ4_DECOMPRESS_STEPS.load(Ordering::Relaxed),
        lz4_bytes_out: LZ4_BYTES_OUT.load(Ordering::Relaxed),

        databases_unpacked: DATABASES_UNPACKED.load(Ordering::Relaxed),
        files_written: FILES_WRITTEN.load(Ordering::Relaxed),
        main_bytes_written: MAIN_BYTES_WRITTEN.load(Ordering::Relaxed),
        wal_bytes_written: WAL_BYTES_WRITTEN.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    LZ4_SESSIONS_OPENED.store(0, Ordering::Relaxed);
    LZ4_SOURCE_READS.store(0, Ordering::Relaxed);
    LZ4_COMPRESSED_BYTES_IN.store(0, Ordering::Relaxed);
    LZ4_DECOMPRESS_STEPS.store(0, Ordering::Relaxed);
    LZ4_BYTES_OUT.store(0, Ordering::Relaxed);

    DATABASES_UNPACKED.store(0, Ordering::Relaxed);
    FILES_WRITTEN.store(0, Ordering::Relaxed);
    MAIN_BYTES_WRITTEN.store(0, Ordering::Relaxed);
    WAL_BYTES_WRITTEN.store(0, Ordering::Relaxed);
}
