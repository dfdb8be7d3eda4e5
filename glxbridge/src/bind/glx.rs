use std::ffi::{CStr, CString};

use glxbridge_shared::constants::{
    glx::GLX_FBCONFIG_ID,
    xlib::{VISUAL_DEPTH_MASK, VISUAL_ID_MASK, VISUAL_SCREEN_MASK, X_FALSE, X_NONE, X_TRUE},
};
use libc::{c_char, c_int, c_long, c_void};

use crate::{
    error::{Error, Result},
    utils::{
        config::Config,
        manual_types::{
            glx::{GLXContext, GLXDrawable, GLXFBConfig, GLXFBConfigID},
            xlib::{Bool, Display, VisualID, XVisualInfo},
        },
        pointer::MutPointer,
    },
};

use super::{FbConfigSelection, GlxApi};

#[cfg(feature = "trace_calls")]
pub const TRACE_CALLS: bool = true;
#[cfg(not(feature = "trace_calls"))]
pub const TRACE_CALLS: bool = false;

type GetProcAddressFn = unsafe extern "C" fn(name: *const u8) -> *const c_void;
type ChooseFbConfigFn = unsafe extern "C" fn(
    display: Display,
    screen: c_int,
    attrib_list: *const c_int,
    nelements: *mut c_int,
) -> *mut GLXFBConfig;
type CreateNewContextFn = unsafe extern "C" fn(
    display: Display,
    config: GLXFBConfig,
    render_type: c_int,
    share_list: GLXContext,
    direct: Bool,
) -> GLXContext;
type MakeContextCurrentFn = unsafe extern "C" fn(
    display: Display,
    draw: GLXDrawable,
    read: GLXDrawable,
    context: GLXContext,
) -> Bool;
type SwapIntervalSgiFn = unsafe extern "C" fn(interval: c_int) -> c_int;

struct Glx13Fns {
    choose_fb_config: ChooseFbConfigFn,
    create_new_context: CreateNewContextFn,
    make_context_current: MakeContextCurrentFn,
}

struct GlxFns {
    query_version:
        unsafe extern "C" fn(display: Display, major: *mut c_int, minor: *mut c_int) -> Bool,
    query_extensions_string: unsafe extern "C" fn(display: Display, screen: c_int) -> *const c_char,
    create_context: unsafe extern "C" fn(
        display: Display,
        visual: *mut XVisualInfo,
        share_list: GLXContext,
        direct: Bool,
    ) -> GLXContext,
    is_direct: unsafe extern "C" fn(display: Display, context: GLXContext) -> Bool,
    destroy_context: unsafe extern "C" fn(display: Display, context: GLXContext),
    make_current:
        unsafe extern "C" fn(display: Display, drawable: GLXDrawable, context: GLXContext) -> Bool,
    get_current_context: unsafe extern "C" fn() -> GLXContext,
    swap_buffers: unsafe extern "C" fn(display: Display, drawable: GLXDrawable),
    glx13: Option<Glx13Fns>,
    swap_interval_sgi: Option<SwapIntervalSgiFn>,

    x_get_visual_info: unsafe extern "C" fn(
        display: Display,
        vinfo_mask: c_long,
        vinfo_template: *mut XVisualInfo,
        nitems: *mut c_int,
    ) -> *mut XVisualInfo,
    x_free: unsafe extern "C" fn(data: *mut c_void) -> c_int,
}

/// GLX and Xlib entry points resolved out of libGL / libX11 at runtime.
pub struct LibGlx {
    libgl: MutPointer,
    libx11: MutPointer,
    trace: bool,
    fns: GlxFns,
}

unsafe fn open_library(path: &str) -> Result<MutPointer> {
    let name = CString::new(path).map_err(|_| Error::LibraryLoad { name: path.to_owned() })?;
    let handle = libc::dlopen(name.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL);
    if handle.is_null() {
        return Err(Error::LibraryLoad { name: path.to_owned() });
    }
    Ok(MutPointer(handle))
}

// `name` has to carry its own nul terminator
unsafe fn lookup(library: &MutPointer, name: &'static str) -> *mut c_void {
    debug_assert!(name.ends_with('\0'));
    libc::dlsym(library.as_mut_ptr(), name.as_ptr() as *const c_char)
}

macro_rules! require {
    ($library:expr, $name:literal) => {{
        let ptr = lookup($library, concat!($name, "\0"));
        if ptr.is_null() {
            return Err(Error::MissingSymbol { name: $name });
        }
        std::mem::transmute(ptr)
    }};
}

macro_rules! optional {
    ($library:expr, $name:literal) => {{
        let ptr = lookup($library, concat!($name, "\0"));
        if ptr.is_null() {
            None
        } else {
            Some(std::mem::transmute(ptr))
        }
    }};
}

unsafe fn resolve(libgl: &MutPointer, libx11: &MutPointer) -> Result<GlxFns> {
    let choose_fb_config: Option<ChooseFbConfigFn> = optional!(libgl, "glXChooseFBConfig");
    let create_new_context: Option<CreateNewContextFn> = optional!(libgl, "glXCreateNewContext");
    let make_context_current: Option<MakeContextCurrentFn> =
        optional!(libgl, "glXMakeContextCurrent");
    let glx13 = match (choose_fb_config, create_new_context, make_context_current) {
        (Some(choose_fb_config), Some(create_new_context), Some(make_context_current)) => {
            Some(Glx13Fns {
                choose_fb_config,
                create_new_context,
                make_context_current,
            })
        }
        _ => None,
    };

    // extension entry points go through glXGetProcAddressARB like any GL loader
    let get_proc_address: Option<GetProcAddressFn> = optional!(libgl, "glXGetProcAddressARB");
    let swap_interval_sgi: Option<SwapIntervalSgiFn> = match get_proc_address {
        Some(get_proc_address) => {
            let ptr = get_proc_address(b"glXSwapIntervalSGI\0".as_ptr());
            if ptr.is_null() {
                None
            } else {
                Some(std::mem::transmute::<*const c_void, SwapIntervalSgiFn>(ptr))
            }
        }
        None => optional!(libgl, "glXSwapIntervalSGI"),
    };

    Ok(GlxFns {
        query_version: require!(libgl, "glXQueryVersion"),
        query_extensions_string: require!(libgl, "glXQueryExtensionsString"),
        create_context: require!(libgl, "glXCreateContext"),
        is_direct: require!(libgl, "glXIsDirect"),
        destroy_context: require!(libgl, "glXDestroyContext"),
        make_current: require!(libgl, "glXMakeCurrent"),
        get_current_context: require!(libgl, "glXGetCurrentContext"),
        swap_buffers: require!(libgl, "glXSwapBuffers"),
        glx13,
        swap_interval_sgi,
        x_get_visual_info: require!(libx11, "XGetVisualInfo"),
        x_free: require!(libx11, "XFree"),
    })
}

macro_rules! trace {
    ($glx:expr, $($arg:tt)*) => {
        if $glx.trace {
            log::debug!("glx: {}", format_args!($($arg)*));
        }
    };
}

impl LibGlx {
    pub fn load(config: &Config) -> Result<LibGlx> {
        unsafe {
            let libgl = open_library(&config.libgl_path)?;
            let libx11 = match open_library(&config.libx11_path) {
                Ok(handle) => handle,
                Err(err) => {
                    libc::dlclose(libgl.as_mut_ptr());
                    return Err(err);
                }
            };
            match resolve(&libgl, &libx11) {
                Ok(fns) => {
                    if config.debug_mode {
                        log::info!(
                            "resolved GLX from {} (glx13 entry points: {}, swap control: {})",
                            config.libgl_path,
                            fns.glx13.is_some(),
                            fns.swap_interval_sgi.is_some()
                        );
                    }
                    Ok(LibGlx {
                        libgl,
                        libx11,
                        trace: config.debug_mode || TRACE_CALLS,
                        fns,
                    })
                }
                Err(err) => {
                    libc::dlclose(libx11.as_mut_ptr());
                    libc::dlclose(libgl.as_mut_ptr());
                    Err(err)
                }
            }
        }
    }
}

impl Drop for LibGlx {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.libx11.as_mut_ptr());
            libc::dlclose(self.libgl.as_mut_ptr());
        }
    }
}

fn to_bool(direct: bool) -> Bool {
    if direct {
        X_TRUE
    } else {
        X_FALSE
    }
}

impl GlxApi for LibGlx {
    fn query_version(&self, display: Display) -> Option<(c_int, c_int)> {
        let mut major = 0;
        let mut minor = 0;
        let ok = unsafe { (self.fns.query_version)(display, &mut major, &mut minor) };
        trace!(self, "glXQueryVersion -> {} {}.{}", ok, major, minor);
        if ok == X_FALSE {
            None
        } else {
            Some((major, minor))
        }
    }

    fn query_extensions_string(&self, display: Display, screen: c_int) -> Option<String> {
        let extensions = unsafe { (self.fns.query_extensions_string)(display, screen) };
        if extensions.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(extensions) }.to_string_lossy().into_owned())
    }

    fn has_glx13_entry_points(&self) -> bool {
        self.fns.glx13.is_some()
    }

    fn has_swap_interval_sgi(&self) -> bool {
        self.fns.swap_interval_sgi.is_some()
    }

    fn choose_fb_config(
        &self,
        display: Display,
        screen: c_int,
        fbconfig_id: GLXFBConfigID,
    ) -> Option<FbConfigSelection> {
        let glx13 = self.fns.glx13.as_ref()?;
        let attribs: [c_int; 4] = [
            GLX_FBCONFIG_ID,
            fbconfig_id as c_int,
            X_NONE as c_int,
            X_NONE as c_int,
        ];
        let mut count: c_int = 0;
        let configs =
            unsafe { (glx13.choose_fb_config)(display, screen, attribs.as_ptr(), &mut count) };
        trace!(self, "glXChooseFBConfig(id {:#x}) -> {} configs", fbconfig_id, count);
        if configs.is_null() {
            return None;
        }
        if count <= 0 {
            self.free(configs as *mut c_void);
            return None;
        }
        Some(FbConfigSelection {
            configs,
            config: unsafe { *configs },
        })
    }

    fn get_visual_info(
        &self,
        display: Display,
        screen: c_int,
        visual_id: VisualID,
        depth: c_int,
    ) -> Option<*mut XVisualInfo> {
        let mut template = XVisualInfo::template(visual_id, screen, depth);
        let mut count: c_int = 0;
        let visual = unsafe {
            (self.fns.x_get_visual_info)(
                display,
                VISUAL_ID_MASK | VISUAL_SCREEN_MASK | VISUAL_DEPTH_MASK,
                &mut template,
                &mut count,
            )
        };
        trace!(self, "XGetVisualInfo(id {:#x}) -> {} visuals", visual_id, count);
        if visual.is_null() {
            return None;
        }
        if count <= 0 {
            self.free(visual as *mut c_void);
            return None;
        }
        Some(visual)
    }

    fn free(&self, data: *mut c_void) {
        trace!(self, "XFree");
        unsafe {
            (self.fns.x_free)(data);
        }
    }

    fn create_new_context(
        &self,
        display: Display,
        config: GLXFBConfig,
        render_type: c_int,
        share: GLXContext,
        direct: bool,
    ) -> GLXContext {
        // choose_fb_config already returned None if these are missing
        let Some(glx13) = self.fns.glx13.as_ref() else {
            return std::ptr::null_mut();
        };
        let context = unsafe {
            (glx13.create_new_context)(display, config, render_type, share, to_bool(direct))
        };
        trace!(self, "glXCreateNewContext -> {:?}", context);
        context
    }

    fn create_context(
        &self,
        display: Display,
        visual: *mut XVisualInfo,
        share: GLXContext,
        direct: bool,
    ) -> GLXContext {
        let context = unsafe { (self.fns.create_context)(display, visual, share, to_bool(direct)) };
        trace!(self, "glXCreateContext -> {:?}", context);
        context
    }

    fn is_direct(&self, display: Display, context: GLXContext) -> bool {
        unsafe { (self.fns.is_direct)(display, context) != X_FALSE }
    }

    fn destroy_context(&self, display: Display, context: GLXContext) {
        trace!(self, "glXDestroyContext({:?})", context);
        unsafe { (self.fns.destroy_context)(display, context) }
    }

    fn make_context_current(
        &self,
        display: Display,
        draw: GLXDrawable,
        read: GLXDrawable,
        context: GLXContext,
    ) -> bool {
        let Some(glx13) = self.fns.glx13.as_ref() else {
            log::warn!("glXMakeContextCurrent requested but GLX 1.3 entry points are missing");
            return false;
        };
        let ok = unsafe { (glx13.make_context_current)(display, draw, read, context) };
        trace!(self, "glXMakeContextCurrent({:#x}, {:?}) -> {}", draw, context, ok);
        ok != X_FALSE
    }

    fn make_current(&self, display: Display, drawable: GLXDrawable, context: GLXContext) -> bool {
        let ok = unsafe { (self.fns.make_current)(display, drawable, context) };
        trace!(self, "glXMakeCurrent({:#x}, {:?}) -> {}", drawable, context, ok);
        ok != X_FALSE
    }

    fn get_current_context(&self) -> GLXContext {
        unsafe { (self.fns.get_current_context)() }
    }

    fn swap_buffers(&self, display: Display, drawable: GLXDrawable) {
        unsafe { (self.fns.swap_buffers)(display, drawable) }
    }

    fn swap_interval_sgi(&self, interval: c_int) -> c_int {
        match self.fns.swap_interval_sgi {
            Some(swap_interval) => {
                trace!(self, "glXSwapIntervalSGI({})", interval);
                unsafe { swap_interval(interval) }
            }
            None => X_FALSE,
        }
    }
}
