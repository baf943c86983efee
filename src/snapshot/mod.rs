//! dqlite snapshot container: format primitives, sinks and the demultiplexer.

pub mod demux;
pub mod format;
pub mod sink;

pub use demux::{unpack_stream, UnpackReport};
pub use format::{read_entry, read_header, read_padded_name, ContainerHeader, DatabaseEntry};
pub use sink::{check_file_name, DirSinks, SinkProvider};
