use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

use dqlite_snapshot_unpack::{metrics, unpack_file, UnpackConfig, UnpackReport};

mod cli;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug dqlite-snapshot-unpack ./snapshot
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    let cfg = UnpackConfig::from_env();
    log::debug!("{}", cfg);

    let report = unpack_file(&cli.snapshot, &cfg)?;
    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &UnpackReport) {
    let m = metrics::snapshot();
    println!(
        "unpack: OK (databases={}, bytes_written={}, compressed={})",
        report.databases.len(),
        report.bytes_written,
        report.compressed
    );
    for db in &report.databases {
        println!("  {:<32} main={:>12}  wal={:>12}", db.name, db.main_size, db.wal_size);
    }
    if report.compressed {
        println!(
            "  lz4: in={} B, out={} B, ratio={:.2}, steps={}",
            m.lz4_compressed_bytes_in,
            m.lz4_bytes_out,
            m.lz4_expansion_ratio(),
            m.lz4_decompress_steps
        );
    }
}
