pub mod glx;
pub mod xlib;
