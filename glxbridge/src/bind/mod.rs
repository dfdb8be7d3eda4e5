use libc::{c_int, c_void};

use crate::utils::manual_types::{
    glx::{GLXContext, GLXDrawable, GLXFBConfig, GLXFBConfigID},
    xlib::{Display, VisualID, XVisualInfo},
};

pub mod glx;

/// First match of a `glXChooseFBConfig` query. `configs` is the array Xlib
/// allocated and must go back through `GlxApi::free`.
#[derive(Debug, Clone, Copy)]
pub struct FbConfigSelection {
    pub configs: *mut GLXFBConfig,
    pub config: GLXFBConfig,
}

/// Every GLX/Xlib call the context code makes. `LibGlx` forwards to the
/// real libraries; tests swap in a recorder.
pub trait GlxApi {
    fn query_version(&self, display: Display) -> Option<(c_int, c_int)>;
    fn query_extensions_string(&self, display: Display, screen: c_int) -> Option<String>;
    // whether the optional entry points were resolved at load time
    fn has_glx13_entry_points(&self) -> bool;
    fn has_swap_interval_sgi(&self) -> bool;

    fn choose_fb_config(
        &self,
        display: Display,
        screen: c_int,
        fbconfig_id: GLXFBConfigID,
    ) -> Option<FbConfigSelection>;
    fn get_visual_info(
        &self,
        display: Display,
        screen: c_int,
        visual_id: VisualID,
        depth: c_int,
    ) -> Option<*mut XVisualInfo>;
    fn free(&self, data: *mut c_void);

    fn create_new_context(
        &self,
        display: Display,
        config: GLXFBConfig,
        render_type: c_int,
        share: GLXContext,
        direct: bool,
    ) -> GLXContext;
    fn create_context(
        &self,
        display: Display,
        visual: *mut XVisualInfo,
        share: GLXContext,
        direct: bool,
    ) -> GLXContext;
    fn is_direct(&self, display: Display, context: GLXContext) -> bool;
    fn destroy_context(&self, display: Display, context: GLXContext);

    fn make_context_current(
        &self,
        display: Display,
        draw: GLXDrawable,
        read: GLXDrawable,
        context: GLXContext,
    ) -> bool;
    fn make_current(&self, display: Display, drawable: GLXDrawable, context: GLXContext) -> bool;
    fn get_current_context(&self) -> GLXContext;

    fn swap_buffers(&self, display: Display, drawable: GLXDrawable);
    fn swap_interval_sgi(&self, interval: c_int) -> c_int;
}

/// Hands an Xlib allocation back to `XFree` when dropped.
pub struct XResource<'a, A: GlxApi + ?Sized> {
    api: &'a A,
    data: *mut c_void,
}

impl<'a, A: GlxApi + ?Sized> XResource<'a, A> {
    pub fn new(api: &'a A, data: *mut c_void) -> Self {
        XResource { api, data }
    }
}

impl<'a, A: GlxApi + ?Sized> Drop for XResource<'a, A> {
    fn drop(&mut self) {
        if !self.data.is_null() {
            self.api.free(self.data);
        }
    }
}
