// tests/unpack_lz4.rs
//
// Запуск только этого файла:
//   cargo test --test unpack_lz4 -- --nocapture
//
// Сценарии:
// 1) LZ4-снапшот распаковывается так же, как несжатый.
// 2) Адаптер: чтение по 1 байту == чтение целиком; маленькие буферы; несколько фреймов.
// 3) Ошибки: битые данные (sticky), обрезанный поток.

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};

use dqlite_snapshot_unpack::{metrics, unpack_file, Lz4Reader, UnpackConfig};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("dqsu-lz4-{prefix}-{pid}-{t}-{id}"))
}

fn encode_container(dbs: &[(&str, Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u64::<LittleEndian>(1).unwrap();
    out.write_u64::<LittleEndian>(dbs.len() as u64).unwrap();
    for (name, main, wal) in dbs {
        out.extend_from_slice(name.as_bytes());
        let pad = 8 - name.len() % 8;
        out.extend(std::iter::repeat(0u8).take(pad));
        out.write_u64::<LittleEndian>(main.len() as u64).unwrap();
        out.write_u64::<LittleEndian>(wal.len() as u64).unwrap();
        out.extend_from_slice(main);
        out.extend_from_slice(wal);
    }
    out
}

fn lz4_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut enc = lz4::EncoderBuilder::new().level(4).build(Vec::new())?;
    enc.write_all(data)?;
    let (out, res) = enc.finish();
    res?;
    Ok(out)
}

// Сжимаемые «страницы»: повторяющиеся блоки + немного шума.
fn page_like(rng: &mut oorandom::Rand32, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| {
            if i % 97 == 0 {
                rng.rand_u32() as u8
            } else {
                (i / 4096) as u8
            }
        })
        .collect()
}

fn sample_container() -> Vec<u8> {
    let mut rng = oorandom::Rand32::new(42);
    encode_container(&[
        ("app.db", page_like(&mut rng, 300_000), page_like(&mut rng, 70_000)),
        ("empty", Vec::new(), Vec::new()),
        ("eight888", page_like(&mut rng, 4096), Vec::new()),
    ])
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for e in fs::read_dir(dir)? {
        let e = e?;
        files.push((e.file_name().to_string_lossy().into_owned(), fs::read(e.path())?));
    }
    files.sort();
    Ok(files)
}

/// Reader that hands out at most `max` bytes per call.
struct Chunked<R> {
    inner: R,
    max: usize,
}

impl<R: Read> Read for Chunked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max);
        self.inner.read(&mut buf[..n])
    }
}

#[test]
fn compressed_and_raw_unpack_identically() -> Result<()> {
    let raw = sample_container();
    let compressed = lz4_compress(&raw)?;
    assert!(compressed.len() < raw.len());

    let root = unique_root("roundtrip");
    fs::create_dir_all(&root)?;
    fs::write(root.join("raw.snap"), &raw)?;
    fs::write(root.join("lz4.snap"), &compressed)?;

    let raw_out = root.join("raw-out");
    let lz4_out = root.join("lz4-out");
    let r1 = unpack_file(&root.join("raw.snap"), &UnpackConfig::default().with_out_dir(&raw_out))?;
    let r2 = unpack_file(&root.join("lz4.snap"), &UnpackConfig::default().with_out_dir(&lz4_out))?;

    assert!(!r1.compressed);
    assert!(r2.compressed);
    assert_eq!(r1.databases, r2.databases);
    assert_eq!(r1.bytes_written, r2.bytes_written);

    let a = read_dir_sorted(&raw_out)?;
    let b = read_dir_sorted(&lz4_out)?;
    assert_eq!(a.len(), 6);
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn tiny_buffers_and_trickling_source() -> Result<()> {
    let raw = sample_container();
    let compressed = lz4_compress(&raw)?;

    let src = Chunked { inner: Cursor::new(compressed), max: 7 };
    let mut r = Lz4Reader::with_capacity(src, 16, 16)?;
    let mut out = Vec::new();
    r.read_to_end(&mut out)?;
    assert_eq!(out, raw);
    Ok(())
}

#[test]
fn one_byte_reads_match_bulk_read() -> Result<()> {
    let raw = sample_container();
    let compressed = lz4_compress(&raw)?;

    let mut bulk = Vec::new();
    Lz4Reader::new(Cursor::new(compressed.clone()))?.read_to_end(&mut bulk)?;

    let mut r = Lz4Reader::new(Cursor::new(compressed))?;
    let mut bytewise = Vec::with_capacity(bulk.len());
    let mut one = [0u8; 1];
    loop {
        match r.read(&mut one)? {
            0 => break,
            n => {
                assert_eq!(n, 1);
                bytewise.push(one[0]);
            }
        }
    }

    assert_eq!(bulk, raw);
    assert_eq!(bytewise, bulk);
    Ok(())
}

#[test]
fn concatenated_frames() -> Result<()> {
    let raw = sample_container();
    let (head, tail) = raw.split_at(raw.len() / 3);
    let mut compressed = lz4_compress(head)?;
    compressed.extend(lz4_compress(tail)?);

    let root = unique_root("frames");
    fs::create_dir_all(&root)?;
    fs::write(root.join("snap"), &compressed)?;
    let out = root.join("out");
    let report = unpack_file(&root.join("snap"), &UnpackConfig::default().with_out_dir(&out))?;

    assert!(report.compressed);
    assert_eq!(report.databases.len(), 3);
    assert_eq!(fs::read(out.join("eight888"))?.len(), 4096);
    Ok(())
}

#[test]
fn corrupt_frame_error_is_sticky() -> Result<()> {
    let raw = sample_container();
    let mut compressed = lz4_compress(&raw)?;
    // keep the magic, break the frame descriptor
    for b in &mut compressed[4..7] {
        *b ^= 0xFF;
    }

    let mut r = Lz4Reader::new(Cursor::new(compressed))?;
    let mut buf = vec![0u8; 1024];
    let e1 = r.read(&mut buf).unwrap_err();
    let pos = r.get_ref().position();
    let e2 = r.read(&mut buf).unwrap_err();
    assert_eq!(e1.kind(), io::ErrorKind::InvalidData);
    assert_eq!(e1.kind(), e2.kind());
    assert_eq!(e1.to_string(), e2.to_string());
    assert!(e1.to_string().starts_with("LZ4 decompress: "));
    // no new source I/O after the failure
    assert!(pos > 0);
    assert_eq!(r.get_ref().position(), pos);
    assert!(r.error().is_some());
    Ok(())
}

#[test]
fn corrupt_snapshot_fails_unpack() -> Result<()> {
    let raw = sample_container();
    let mut compressed = lz4_compress(&raw)?;
    for b in &mut compressed[4..7] {
        *b ^= 0xFF;
    }
    let root = unique_root("corrupt");
    fs::create_dir_all(&root)?;
    fs::write(root.join("snap"), &compressed)?;

    let err = unpack_file(&root.join("snap"), &UnpackConfig::default().with_out_dir(root.join("out")))
        .unwrap_err();
    let io = err
        .downcast_ref::<io::Error>()
        .expect("io error in chain");
    assert_eq!(io.kind(), io::ErrorKind::InvalidData);
    assert!(format!("{:#}", err).contains("LZ4 decompress"));
    Ok(())
}

#[test]
fn truncated_compressed_snapshot_is_short_read() -> Result<()> {
    let raw = sample_container();
    let mut compressed = lz4_compress(&raw)?;
    compressed.truncate(compressed.len() / 2);

    let root = unique_root("truncated");
    fs::create_dir_all(&root)?;
    fs::write(root.join("snap"), &compressed)?;

    let err = unpack_file(&root.join("snap"), &UnpackConfig::default().with_out_dir(root.join("out")))
        .unwrap_err();
    let io = err
        .downcast_ref::<io::Error>()
        .expect("io error in chain");
    assert_eq!(io.kind(), io::ErrorKind::UnexpectedEof);
    Ok(())
}

#[test]
fn metrics_count_decompression() -> Result<()> {
    let raw = sample_container();
    let compressed = lz4_compress(&raw)?;

    let before = metrics::snapshot();
    let mut out = Vec::new();
    Lz4Reader::new(Cursor::new(compressed.clone()))?.read_to_end(&mut out)?;
    let after = metrics::snapshot();

    // другие тесты этого файла могут работать параллельно — проверяем только нижние границы
    assert!(after.lz4_sessions_opened >= before.lz4_sessions_opened + 1);
    assert!(after.lz4_compressed_bytes_in >= before.lz4_compressed_bytes_in + compressed.len() as u64);
    assert!(after.lz4_bytes_out >= before.lz4_bytes_out + raw.len() as u64);
    assert!(after.lz4_decompress_steps > before.lz4_decompress_steps);
    Ok(())
}
