//! LZ4F decompression context (FFI via lz4-sys).
//!
//! The context is an owned opaque handle: created once per stream, freed exactly
//! once by `close()` or `Drop`, never cloned.

use std::ffi::CStr;
use std::ptr;

use lz4_sys::{
    LZ4FDecompressionContext, LZ4F_createDecompressionContext, LZ4F_decompress,
    LZ4F_freeDecompressionContext, LZ4F_getErrorName, LZ4F_isError, LZ4F_VERSION,
};

use crate::error::CodecError;

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressStep {
    /// Bytes consumed from `src`.
    pub consumed: usize,
    /// Bytes written into `dst`.
    pub produced: usize,
    /// Engine hint: 0 when a frame is fully decoded, otherwise the number of
    /// source bytes it expects next.
    pub hint: usize,
}

/// Streaming decompression engine.
pub trait Decompressor {
    /// Decompress from `src` into `dst`; either count may be less than the slice lengths.
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<DecompressStep, CodecError>;

    /// Release engine resources. Must be idempotent.
    fn close(&mut self);
}

/// Human-readable name of an LZ4F error code.
fn error_name(code: usize) -> String {
    unsafe {
        let name = LZ4F_getErrorName(code);
        if name.is_null() {
            return format!("LZ4F error code {}", code);
        }
        CStr::from_ptr(name).to_string_lossy().into_owned()
    }
}

fn is_error(code: usize) -> bool {
    unsafe { LZ4F_isError(code) != 0 }
}

pub struct DecompressionContext {
    ctx: Option<LZ4FDecompressionContext>,
}

impl DecompressionContext {
    pub fn new() -> Result<Self, CodecError> {
        let mut ctx = LZ4FDecompressionContext(ptr::null_mut());
        let code = unsafe { LZ4F_createDecompressionContext(&mut ctx, LZ4F_VERSION) };
        if is_error(code) {
            return Err(CodecError::ContextCreate(error_name(code)));
        }
        Ok(Self { ctx: Some(ctx) })
    }

    pub fn is_closed(&self) -> bool {
        self.ctx.is_none()
    }
}

impl Decompressor for DecompressionContext {
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<DecompressStep, CodecError> {
        let ctx = match &self.ctx {
            Some(c) => LZ4FDecompressionContext(c.0),
            None => return Err(CodecError::Closed),
        };
        let mut src_size = src.len();
        let mut dst_size = dst.len();
        let code = unsafe {
            LZ4F_decompress(
                ctx,
                dst.as_mut_ptr(),
                &mut dst_size,
                src.as_ptr(),
                &mut src_size,
                ptr::null(),
            )
        };
        if is_error(code) {
            return Err(CodecError::Decompress(error_name(code)));
        }
        Ok(DecompressStep {
            consumed: src_size,
            produced: dst_size,
            hint: code,
        })
    }

    fn close(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            unsafe {
                LZ4F_freeDecompressionContext(ctx);
            }
        }
    }
}

impl Drop for DecompressionContext {
    fn drop(&mut self) {
        self.close();
    }
}
