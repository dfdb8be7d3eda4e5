//! GLX context lifecycle and `ARB_window_pos` trampolines for a managed
//! runtime's OpenGL binding layer.

pub mod bind;
pub mod bridge;
pub mod caps;
pub mod context;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod utils;
pub mod window_pos;

#[cfg(test)]
mod testing;

pub use bridge::Bridge;
pub use caps::Capabilities;
pub use context::ContextManager;
pub use error::{Error, Result};
pub use handle::{ContextRecord, GlxContext, PeerConfig, PeerInfo};
