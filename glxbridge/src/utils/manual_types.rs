// Opaque Xlib/GLX handles. We never look inside Display or GLXContext,
// so they stay untyped pointers.
// see https://users.rust-lang.org/t/idiomatic-untyped-pointer/3757/2

pub mod xlib {
    use libc::{c_int, c_ulong, c_void};

    pub type Bool = c_int;
    pub type XID = c_ulong;
    pub type VisualID = c_ulong;
    pub type Display = *mut c_void;
    pub type Visual = *mut c_void;

    // https://tronche.com/gui/x/xlib/utilities/XGetVisualInfo.html
    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct XVisualInfo {
        pub visual: Visual,
        pub visualid: VisualID,
        pub screen: c_int,
        pub depth: c_int,
        pub class: c_int,
        pub red_mask: c_ulong,
        pub green_mask: c_ulong,
        pub blue_mask: c_ulong,
        pub colormap_size: c_int,
        pub bits_per_rgb: c_int,
    }

    impl XVisualInfo {
        pub fn template(visualid: VisualID, screen: c_int, depth: c_int) -> Self {
            XVisualInfo {
                visual: std::ptr::null_mut(),
                visualid,
                screen,
                depth,
                class: 0,
                red_mask: 0,
                green_mask: 0,
                blue_mask: 0,
                colormap_size: 0,
                bits_per_rgb: 0,
            }
        }
    }

    pub type XFreeData = *mut c_void;

}

pub mod glx {
    use libc::c_void;

    use super::xlib::XID;

    pub type GLXContext = *mut c_void;
    pub type GLXFBConfig = *mut c_void;
    pub type GLXDrawable = XID;
    pub type GLXFBConfigID = XID;
}
