//! LZ4 frame envelope: FFI context and the `Read` adapter on top of it.

pub mod context;
pub mod reader;

pub use context::{DecompressStep, DecompressionContext, Decompressor};
pub use reader::Lz4Reader;
