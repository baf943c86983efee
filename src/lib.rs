// Базовые модули
pub mod consts;
pub mod config;
pub mod error;
pub mod metrics;

// Источник + детектор LZ4-конверта
pub mod source;

// LZ4 frame: FFI-контекст и Read-адаптер
pub mod lz4;

// Контейнер снапшота dqlite
pub mod snapshot;

pub mod unpack;

// Удобные реэкспорты
pub use config::UnpackConfig;
pub use error::{CodecError, FormatError};
pub use lz4::{DecompressionContext, Decompressor, Lz4Reader};
pub use snapshot::{unpack_stream, DatabaseEntry, DirSinks, SinkProvider, UnpackReport};
pub use source::{is_compressed, Source};
pub use unpack::{open_stream, unpack_file, unpack_reader, SnapshotStream};
