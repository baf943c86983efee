//! Peekable byte source and LZ4 envelope detection.
//!
//! `Source` keeps peeked bytes in a small prefix buffer and replays them on the
//! following reads, so detection never consumes anything: the same source is
//! routed either straight to the demultiplexer or through the LZ4 adapter.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::io::{self, ErrorKind, Read};

use crate::consts::{LZ4_FRAME_MAGIC, LZ4_MAGIC_SIZE};

pub struct Source<R> {
    inner: R,
    prefix: Vec<u8>,
    pos: usize,
}

impl<R: Read> Source<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            prefix: Vec::new(),
            pos: 0,
        }
    }

    /// Return the next `n` bytes without consuming them.
    /// Fewer than `n` bytes before end of stream is an `UnexpectedEof` error.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        if self.pos > 0 {
            self.prefix.drain(..self.pos);
            self.pos = 0;
        }
        while self.prefix.len() < n {
            let mut chunk = vec![0u8; n - self.prefix.len()];
            let got = match self.inner.read(&mut chunk) {
                Ok(got) => got,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if got == 0 {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("peek {} byte(s): stream ended after {}", n, self.prefix.len()),
                ));
            }
            self.prefix.extend_from_slice(&chunk[..got]);
        }
        Ok(&self.prefix[..n])
    }
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = (self.prefix.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
            self.pos += n;
            if self.pos == self.prefix.len() {
                self.prefix.clear();
                self.pos = 0;
            }
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

/// True if the stream starts with the LZ4 frame magic (little-endian u32).
pub fn is_compressed<R: Read>(src: &mut Source<R>) -> io::Result<bool> {
    let head = src.peek(LZ4_MAGIC_SIZE)?;
    let magic = LittleEndian::read_u32(head);
    let compressed = magic == LZ4_FRAME_MAGIC;
    debug!("detect: magic=0x{:08X}, compressed={}", magic, compressed);
    Ok(compressed)
}
