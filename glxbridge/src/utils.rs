pub mod config;
// hand-written Xlib/GLX types
pub mod manual_types;

pub mod pointer;
