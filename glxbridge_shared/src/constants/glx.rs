// values from GL/glx.h and GL/glxext.h
// https://registry.khronos.org/OpenGL/api/GL/glxext.h

use libc::c_int;

pub const GLX_FBCONFIG_ID: c_int = 0x8013;
pub const GLX_RGBA_TYPE: c_int = 0x8014;

// glXQueryVersion results we care about
pub const GLX_MIN_VERSION: (c_int, c_int) = (1, 2);
pub const GLX13_VERSION: (c_int, c_int) = (1, 3);

pub const GLX_SGI_SWAP_CONTROL: &str = "GLX_SGI_swap_control";

/// Names of the `ARB_window_pos` entry points, in the order the bridge exposes them.
pub const ARB_WINDOW_POS_FUNCS: [&str; 6] = [
    "glWindowPos2sARB",
    "glWindowPos2iARB",
    "glWindowPos2fARB",
    "glWindowPos3sARB",
    "glWindowPos3iARB",
    "glWindowPos3fARB",
];

pub fn version_at_least(version: (c_int, c_int), required: (c_int, c_int)) -> bool {
    version.0 > required.0 || (version.0 == required.0 && version.1 >= required.1)
}

/// Extension strings are space separated, a prefix match is not enough
/// (GLX_SGI_swap_control vs GLX_SGI_swap_control_tear style names).
pub fn has_extension(extensions: &str, name: &str) -> bool {
    extensions.split_ascii_whitespace().any(|ext| ext == name)
}
