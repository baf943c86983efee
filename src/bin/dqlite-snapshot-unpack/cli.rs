use clap::Parser;
use std::path::PathBuf;

/// Unpacks dqlite snapshots into readable databases for the sqlite3 CLI.
///
/// Output goes to the current directory (override with DQLITE_UNPACK_OUT_DIR):
/// every database becomes `<name>` plus `<name>-wal`.
#[derive(Parser, Debug)]
#[command(name = "dqlite-snapshot-unpack", version, about = "Unpack dqlite snapshots")]
pub struct Cli {
    /// Snapshot file (raw or LZ4-frame compressed)
    pub snapshot: PathBuf,
}
