//! Format constants (LZ4 envelope, snapshot container).

// -------- LZ4 frame envelope --------
/// LZ4 frame magic number, stored little-endian in the first 4 bytes of the stream.
pub const LZ4_FRAME_MAGIC: u32 = 0x184D_2204;
pub const LZ4_MAGIC_SIZE: usize = 4;

// -------- Snapshot container --------
// Layout (all integers u64 LE):
// [format u64][db_count u64]
// then db_count times:
//   [name: NUL-terminated, padded to a multiple of 8][main_len u64][wal_len u64]
//   [main bytes][wal bytes]
// Stream must end right after the last WAL.
pub const FORMAT_VERSION: u64 = 1;
pub const NAME_BLOCK_SIZE: usize = 8;
pub const WAL_SUFFIX: &str = "-wal";

// -------- Buffers --------
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
pub const MIN_BUFFER_SIZE: usize = 16;
