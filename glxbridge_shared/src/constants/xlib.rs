// X.h / Xutil.h

use libc::{c_int, c_long};

pub const X_NONE: libc::c_ulong = 0;
pub const X_TRUE: c_int = 1;
pub const X_FALSE: c_int = 0;

// XGetVisualInfo masks
pub const VISUAL_ID_MASK: c_long = 0x1;
pub const VISUAL_SCREEN_MASK: c_long = 0x2;
pub const VISUAL_DEPTH_MASK: c_long = 0x4;
