//! Decoding of the caller-owned peer and context buffers.
//!
//! The binding layer allocates both buffers; we only borrow them for the
//! length of one call.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use libc::c_int;

use crate::{
    error::{Error, Result},
    utils::manual_types::{
        glx::{GLXContext, GLXDrawable, GLXFBConfigID},
        xlib::{Display, VisualID},
    },
};

/// Pixel format the windowing layer picked for the drawable. Which field is
/// used depends on the creation path.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PeerConfig {
    pub visual_id: VisualID,
    pub fbconfig_id: GLXFBConfigID,
    pub depth: c_int,
}

/// Layout of the peer buffer the binding layer fills in.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PeerInfo {
    pub display: Display,
    pub drawable: GLXDrawable,
    pub screen: c_int,
    // non-zero when the display speaks GLX 1.3
    pub glx13: c_int,
    pub config: PeerConfig,
}

impl PeerInfo {
    pub const SIZE: usize = size_of::<PeerInfo>();

    /// Copies the peer record out of `buf`.
    ///
    /// # Safety
    /// `buf` must have been written by the windowing layer, with `display`
    /// pointing at a live X connection for as long as the result is used.
    pub unsafe fn from_bytes(buf: &[u8]) -> Result<PeerInfo> {
        if buf.len() < Self::SIZE {
            return Err(Error::PeerBufferTooSmall {
                needed: Self::SIZE,
                actual: buf.len(),
            });
        }
        // every field accepts any bit pattern
        Ok(std::ptr::read_unaligned(buf.as_ptr() as *const PeerInfo))
    }

    pub fn is_glx13(&self) -> bool {
        self.glx13 != 0
    }
}

/// A native context tagged with the GLX path that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlxContext {
    Glx13(GLXContext),
    Legacy(GLXContext),
}

impl GlxContext {
    pub fn raw(&self) -> GLXContext {
        match *self {
            GlxContext::Glx13(context) | GlxContext::Legacy(context) => context,
        }
    }

    pub fn is_glx13(&self) -> bool {
        matches!(self, GlxContext::Glx13(_))
    }
}

/// What actually lands in the caller's context buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ContextRecord {
    pub glx13: u32,
    pub _pad: u32,
    pub context: u64,
}

impl ContextRecord {
    pub const SIZE: usize = size_of::<ContextRecord>();

    pub fn check_capacity(buf: &[u8]) -> Result<()> {
        if buf.len() < Self::SIZE {
            return Err(Error::BufferTooSmall {
                needed: Self::SIZE,
                actual: buf.len(),
            });
        }
        Ok(())
    }

    pub fn read(buf: &[u8]) -> Result<ContextRecord> {
        Self::check_capacity(buf)?;
        Ok(bytemuck::pod_read_unaligned(&buf[..Self::SIZE]))
    }

    pub fn write(&self, buf: &mut [u8]) -> Result<()> {
        Self::check_capacity(buf)?;
        buf[..Self::SIZE].copy_from_slice(bytemuck::bytes_of(self));
        Ok(())
    }

    pub fn to_context(self) -> GlxContext {
        let raw = self.context as usize as GLXContext;
        if self.glx13 != 0 {
            GlxContext::Glx13(raw)
        } else {
            GlxContext::Legacy(raw)
        }
    }
}

impl From<GlxContext> for ContextRecord {
    fn from(context: GlxContext) -> Self {
        ContextRecord {
            glx13: context.is_glx13() as u32,
            _pad: 0,
            context: context.raw() as usize as u64,
        }
    }
}
