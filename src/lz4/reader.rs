//! `Read` adapter over an LZ4 frame stream.
//!
//! One session = one source + one decompression context + two fixed buffers:
//! - input:  compressed bytes read from the source, `[in_start, in_end)` pending;
//! - output: decompressed bytes, `[out_pos, out_end)` not yet handed to the caller.
//!
//! Rules:
//! - buffered output is served first, without touching the source or the engine;
//! - the output buffer is refilled only when fully drained;
//! - the source is read only when the input buffer is exhausted;
//! - the first source/codec error is sticky: every later read returns it again
//!   without doing any I/O.
//!
//! Engine steps may consume input and produce nothing (frame headers, checksums).
//! Such steps are retried inside the same `read` call, since `Ok(0)` means end of
//! stream to `Read` callers. Each retry consumes input or reads the source, so the
//! loop ends at the first output byte, end of stream, or error; a step that makes
//! no progress at all is turned into a sticky error.

use log::{debug, warn};
use std::io::{self, ErrorKind, Read};

use crate::consts::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::error::CodecError;
use crate::lz4::context::{DecompressionContext, Decompressor};
use crate::metrics::{record_lz4_decompress_step, record_lz4_session_opened, record_lz4_source_read};

#[derive(Clone, Debug)]
struct StickyError {
    kind: ErrorKind,
    message: String,
}

impl StickyError {
    fn to_io(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }
}

pub struct Lz4Reader<R, D: Decompressor = DecompressionContext> {
    src: R,
    codec: D,

    input: Vec<u8>,
    in_start: usize,
    in_end: usize,

    output: Vec<u8>,
    out_pos: usize,
    out_end: usize,

    eof: bool,
    // engine hint from the last step; non-zero means a frame is still open
    frame_hint: usize,
    err: Option<StickyError>,
}

impl<R: Read> Lz4Reader<R> {
    /// Session with default 64 KiB buffers.
    pub fn new(src: R) -> Result<Self, CodecError> {
        Self::with_capacity(src, DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(src: R, input_cap: usize, output_cap: usize) -> Result<Self, CodecError> {
        let codec = DecompressionContext::new()?;
        Ok(Self::with_decompressor(src, codec, input_cap, output_cap))
    }
}

impl<R: Read, D: Decompressor> Lz4Reader<R, D> {
    pub fn with_decompressor(src: R, codec: D, input_cap: usize, output_cap: usize) -> Self {
        record_lz4_session_opened();
        Self {
            src,
            codec,
            input: vec![0u8; input_cap.max(MIN_BUFFER_SIZE)],
            in_start: 0,
            in_end: 0,
            output: vec![0u8; output_cap.max(MIN_BUFFER_SIZE)],
            out_pos: 0,
            out_end: 0,
            eof: false,
            frame_hint: 0,
            err: None,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.src
    }

    /// True once the source reported end of stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Terminal error of this session, if any.
    pub fn error(&self) -> Option<io::Error> {
        self.err.as_ref().map(StickyError::to_io)
    }

    /// Release the decompression context. Idempotent; also done on drop.
    pub fn close(&mut self) {
        self.codec.close();
    }

    fn fail(&mut self, kind: ErrorKind, message: String) -> io::Error {
        let sticky = StickyError { kind, message };
        let err = sticky.to_io();
        self.err = Some(sticky);
        err
    }

    /// Read the source into the full input buffer. Returns false on end of stream.
    fn refill_input(&mut self) -> io::Result<bool> {
        loop {
            match self.src.read(&mut self.input) {
                Ok(0) => {
                    record_lz4_source_read(0);
                    self.eof = true;
                    if self.frame_hint != 0 {
                        warn!(
                            "lz4: source ended inside a frame (decoder expected {} more byte(s))",
                            self.frame_hint
                        );
                    }
                    debug!("lz4: source exhausted");
                    return Ok(false);
                }
                Ok(n) => {
                    record_lz4_source_read(n);
                    self.in_start = 0;
                    self.in_end = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(self.fail(e.kind(), format!("read compressed input: {}", e)));
                }
            }
        }
    }
}

impl<R: Read, D: Decompressor> Read for Lz4Reader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if let Some(e) = &self.err {
                return Err(e.to_io());
            }

            // leftovers first
            if self.out_pos < self.out_end {
                let n = (self.out_end - self.out_pos).min(buf.len());
                buf[..n].copy_from_slice(&self.output[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                return Ok(n);
            }
            if self.eof || buf.is_empty() {
                return Ok(0);
            }

            self.out_pos = 0;
            self.out_end = 0;

            if self.in_start == self.in_end && !self.refill_input()? {
                return Ok(0);
            }

            let pending = self.in_end - self.in_start;
            let step = match self
                .codec
                .decompress(&self.input[self.in_start..self.in_end], &mut self.output)
            {
                Ok(step) => step,
                Err(e) => return Err(self.fail(ErrorKind::InvalidData, e.to_string())),
            };
            if step.consumed == 0 && step.produced == 0 {
                let e = CodecError::NoProgress { input: pending };
                return Err(self.fail(ErrorKind::InvalidData, e.to_string()));
            }
            record_lz4_decompress_step(step.produced);
            debug!(
                "lz4: step consumed={}/{} produced={} hint={}",
                step.consumed, pending, step.produced, step.hint
            );

            self.in_start += step.consumed.min(pending);
            self.out_end = step.produced.min(self.output.len());
            self.out_pos = 0;
            self.frame_hint = step.hint;
        }
    }
}

impl<R, D: Decompressor> Drop for Lz4Reader<R, D> {
    fn drop(&mut self) {
        self.codec.close();
    }
}
