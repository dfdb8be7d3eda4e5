//! C entry points for the binding layer.
//!
//! Buffers come in as pointer + length pairs. Failures return `false` and
//! leave a message for `glxbridge_last_error` on the calling thread.

use std::{
    cell::RefCell,
    ffi::CString,
    ptr, slice,
    sync::{Mutex, PoisonError},
};

use gl::types::{GLfloat, GLint, GLshort};
use lazy_static::lazy_static;
use libc::c_char;

use crate::{
    bind::{glx::LibGlx, GlxApi},
    bridge::Bridge,
    caps::Capabilities,
    error::{Error, Result},
    handle::ContextRecord,
    utils::config::Config,
    window_pos,
};

pub struct BridgeHost<A: GlxApi> {
    pub config: Config,
    bridge: Result<Bridge<A>>,
    // written by the first successful negotiation, then only read
    capabilities: Mutex<Option<Capabilities>>,
}

lazy_static! {
    pub static ref HOST: BridgeHost<LibGlx> = BridgeHost::from_env();
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

impl BridgeHost<LibGlx> {
    pub fn from_env() -> Self {
        let config = Config::from_env();
        if config.debug_mode {
            init_debug_logging();
        }
        let bridge = LibGlx::load(&config).map(|glx| Bridge::new(glx, config.clone()));
        if let Err(err) = &bridge {
            log::warn!("GLX bridge unavailable: {}", err);
        }
        BridgeHost::new(config, bridge)
    }
}

impl<A: GlxApi> BridgeHost<A> {
    pub fn new(config: Config, bridge: Result<Bridge<A>>) -> Self {
        BridgeHost {
            config,
            bridge,
            capabilities: Mutex::new(None),
        }
    }

    fn bridge(&self) -> Result<&Bridge<A>> {
        self.bridge.as_ref().map_err(Clone::clone)
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        *self.capabilities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # Safety
    /// `peer` must hold a live `PeerInfo`.
    pub unsafe fn init(&self, peer: &[u8]) -> Result<Capabilities> {
        let mut slot = self.capabilities.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(caps) = *slot {
            return Ok(caps);
        }
        let caps = self.bridge()?.init(peer)?;
        if self.config.debug_mode {
            log::info!("GLX capabilities: {:?}", caps);
        }
        *slot = Some(caps);
        Ok(caps)
    }

    pub fn set_vsync(&self, enabled: bool) {
        match (self.bridge(), self.capabilities()) {
            (Ok(bridge), Some(caps)) => bridge.set_vsync(&caps, enabled),
            _ => log::debug!("set_vsync({}) ignored, GLX not initialized", enabled),
        }
    }

    /// # Safety
    /// See `Bridge::create_context`.
    pub unsafe fn create_context(
        &self,
        peer: &[u8],
        context: &mut [u8],
        shared: Option<&[u8]>,
    ) -> Result<()> {
        ContextRecord::check_capacity(context)?;
        let caps = self.init(peer)?;
        self.bridge()?.create_context(&caps, peer, context, shared)
    }

    /// # Safety
    /// See `Bridge::destroy_context`.
    pub unsafe fn destroy_context(&self, peer: &[u8], context: &[u8]) -> Result<()> {
        self.bridge()?.destroy_context(peer, context)
    }

    /// # Safety
    /// See `Bridge::release_current`.
    pub unsafe fn release_current(&self, peer: &[u8]) -> Result<()> {
        let caps = self.capabilities().ok_or(Error::GlxInit)?;
        self.bridge()?.release_current(&caps, peer)
    }

    /// # Safety
    /// See `Bridge::make_current`.
    pub unsafe fn make_current(&self, peer: &[u8], context: &[u8]) -> Result<()> {
        self.bridge()?.make_current(peer, context)
    }

    pub fn is_current(&self, context: &[u8]) -> Result<bool> {
        self.bridge()?.is_current(context)
    }

    /// # Safety
    /// See `Bridge::swap_buffers`.
    pub unsafe fn swap_buffers(&self, peer: &[u8]) -> Result<()> {
        self.bridge()?.swap_buffers(peer)
    }
}

/// Shows debug output unless `RUST_LOG` narrows it.
fn init_debug_logging() {
    // someone else may have installed a logger already
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .try_init();
}

fn set_last_error(err: &Error) {
    log::debug!("glxbridge call failed: {}", err);
    // messages never contain nul bytes, but don't panic across the C boundary if one does
    let message = CString::new(err.to_string()).unwrap_or_default();
    LAST_ERROR.with(|last| *last.borrow_mut() = Some(message));
}

fn report(result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            set_last_error(&err);
            false
        }
    }
}

unsafe fn borrow<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if data.is_null() {
        &[]
    } else {
        slice::from_raw_parts(data, len)
    }
}

unsafe fn borrow_mut<'a>(data: *mut u8, len: usize) -> &'a mut [u8] {
    if data.is_null() {
        &mut []
    } else {
        slice::from_raw_parts_mut(data, len)
    }
}

/// Message of the last failed call on this thread, or null. Valid until the
/// next failing call on the same thread.
#[no_mangle]
pub extern "C" fn glxbridge_last_error() -> *const c_char {
    LAST_ERROR.with(|last| last.borrow().as_ref().map_or(ptr::null(), |message| message.as_ptr()))
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_window_pos_2s(x: GLshort, y: GLshort, function_pointer: i64) {
    window_pos::window_pos_2s(x, y, function_pointer)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_window_pos_2i(x: GLint, y: GLint, function_pointer: i64) {
    window_pos::window_pos_2i(x, y, function_pointer)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_window_pos_2f(x: GLfloat, y: GLfloat, function_pointer: i64) {
    window_pos::window_pos_2f(x, y, function_pointer)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_window_pos_3s(
    x: GLshort,
    y: GLshort,
    z: GLshort,
    function_pointer: i64,
) {
    window_pos::window_pos_3s(x, y, z, function_pointer)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_window_pos_3i(
    x: GLint,
    y: GLint,
    z: GLint,
    function_pointer: i64,
) {
    window_pos::window_pos_3i(x, y, z, function_pointer)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_window_pos_3f(
    x: GLfloat,
    y: GLfloat,
    z: GLfloat,
    function_pointer: i64,
) {
    window_pos::window_pos_3f(x, y, z, function_pointer)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_init(peer: *const u8, peer_len: usize) -> bool {
    report(HOST.init(borrow(peer, peer_len)).map(|_| ()))
}

#[no_mangle]
pub extern "C" fn glxbridge_set_vsync(enabled: bool) {
    HOST.set_vsync(enabled)
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_create_context(
    peer: *const u8,
    peer_len: usize,
    context: *mut u8,
    context_len: usize,
    shared: *const u8,
    shared_len: usize,
) -> bool {
    // before touching HOST, so a bad buffer never loads libGL
    let context = borrow_mut(context, context_len);
    if let Err(err) = ContextRecord::check_capacity(context) {
        set_last_error(&err);
        return false;
    }
    let shared = if shared.is_null() {
        None
    } else {
        Some(borrow(shared, shared_len))
    };
    report(HOST.create_context(borrow(peer, peer_len), context, shared))
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_destroy_context(
    peer: *const u8,
    peer_len: usize,
    context: *const u8,
    context_len: usize,
) -> bool {
    report(HOST.destroy_context(borrow(peer, peer_len), borrow(context, context_len)))
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_release_current(peer: *const u8, peer_len: usize) -> bool {
    report(HOST.release_current(borrow(peer, peer_len)))
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_make_current(
    peer: *const u8,
    peer_len: usize,
    context: *const u8,
    context_len: usize,
) -> bool {
    report(HOST.make_current(borrow(peer, peer_len), borrow(context, context_len)))
}

/// False both when another context is current and when the buffer is invalid;
/// check `glxbridge_last_error` to tell them apart.
#[no_mangle]
pub unsafe extern "C" fn glxbridge_is_current(context: *const u8, context_len: usize) -> bool {
    match HOST.is_current(borrow(context, context_len)) {
        Ok(current) => current,
        Err(err) => {
            set_last_error(&err);
            false
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn glxbridge_swap_buffers(peer: *const u8, peer_len: usize) -> bool {
    report(HOST.swap_buffers(borrow(peer, peer_len)))
}
