//! `ARB_window_pos` trampolines.
//!
//! The binding layer resolves each entry point once and passes the address
//! with every call. We only reinterpret it; there is no null check because
//! this runs every frame and the address is known good for the current
//! context.

use gl::types::{GLfloat, GLint, GLshort};
use glxbridge_shared::constants::glx::ARB_WINDOW_POS_FUNCS;
use libc::c_void;

type WindowPos2sFn = extern "system" fn(x: GLshort, y: GLshort);
type WindowPos2iFn = extern "system" fn(x: GLint, y: GLint);
type WindowPos2fFn = extern "system" fn(x: GLfloat, y: GLfloat);
type WindowPos3sFn = extern "system" fn(x: GLshort, y: GLshort, z: GLshort);
type WindowPos3iFn = extern "system" fn(x: GLint, y: GLint, z: GLint);
type WindowPos3fFn = extern "system" fn(x: GLfloat, y: GLfloat, z: GLfloat);

macro_rules! cast_fn {
    ($ty:ty, $function_pointer:expr) => {{
        debug_assert!($function_pointer != 0, "null window_pos entry point");
        std::mem::transmute::<usize, $ty>($function_pointer as isize as usize)
    }};
}

/// # Safety
/// `function_pointer` must be the address of `glWindowPos2sARB` for the current context.
#[inline]
pub unsafe fn window_pos_2s(x: GLshort, y: GLshort, function_pointer: i64) {
    let window_pos: WindowPos2sFn = cast_fn!(WindowPos2sFn, function_pointer);
    window_pos(x, y);
}

/// # Safety
/// `function_pointer` must be the address of `glWindowPos2iARB` for the current context.
#[inline]
pub unsafe fn window_pos_2i(x: GLint, y: GLint, function_pointer: i64) {
    let window_pos: WindowPos2iFn = cast_fn!(WindowPos2iFn, function_pointer);
    window_pos(x, y);
}

/// # Safety
/// `function_pointer` must be the address of `glWindowPos2fARB` for the current context.
#[inline]
pub unsafe fn window_pos_2f(x: GLfloat, y: GLfloat, function_pointer: i64) {
    let window_pos: WindowPos2fFn = cast_fn!(WindowPos2fFn, function_pointer);
    window_pos(x, y);
}

/// # Safety
/// `function_pointer` must be the address of `glWindowPos3sARB` for the current context.
#[inline]
pub unsafe fn window_pos_3s(x: GLshort, y: GLshort, z: GLshort, function_pointer: i64) {
    let window_pos: WindowPos3sFn = cast_fn!(WindowPos3sFn, function_pointer);
    window_pos(x, y, z);
}

/// # Safety
/// `function_pointer` must be the address of `glWindowPos3iARB` for the current context.
#[inline]
pub unsafe fn window_pos_3i(x: GLint, y: GLint, z: GLint, function_pointer: i64) {
    let window_pos: WindowPos3iFn = cast_fn!(WindowPos3iFn, function_pointer);
    window_pos(x, y, z);
}

/// # Safety
/// `function_pointer` must be the address of `glWindowPos3fARB` for the current context.
#[inline]
pub unsafe fn window_pos_3f(x: GLfloat, y: GLfloat, z: GLfloat, function_pointer: i64) {
    let window_pos: WindowPos3fFn = cast_fn!(WindowPos3fFn, function_pointer);
    window_pos(x, y, z);
}

/// The six entry point addresses, looked up once per context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowPosArb {
    pub window_pos_2s: i64,
    pub window_pos_2i: i64,
    pub window_pos_2f: i64,
    pub window_pos_3s: i64,
    pub window_pos_3i: i64,
    pub window_pos_3f: i64,
}

impl WindowPosArb {
    /// Resolves every entry point through `loadfn`, e.g. `glXGetProcAddressARB`.
    pub fn load_with<F: FnMut(&'static str) -> *const c_void>(mut loadfn: F) -> Self {
        let mut addresses = [0i64; 6];
        for (address, name) in addresses.iter_mut().zip(ARB_WINDOW_POS_FUNCS) {
            *address = loadfn(name) as usize as i64;
        }
        let [
            window_pos_2s,
            window_pos_2i,
            window_pos_2f,
            window_pos_3s,
            window_pos_3i,
            window_pos_3f,
        ] = addresses;
        WindowPosArb {
            window_pos_2s,
            window_pos_2i,
            window_pos_2f,
            window_pos_3s,
            window_pos_3i,
            window_pos_3f,
        }
    }

    pub fn is_loaded(&self) -> bool {
        [
            self.window_pos_2s,
            self.window_pos_2i,
            self.window_pos_2f,
            self.window_pos_3s,
            self.window_pos_3i,
            self.window_pos_3f,
        ]
        .iter()
        .all(|address| *address != 0)
    }
}
