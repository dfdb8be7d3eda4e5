//! In-memory `GlxApi` that records every call, for unit tests.

use std::cell::RefCell;

use libc::{c_int, c_void};

use crate::{
    bind::{FbConfigSelection, GlxApi},
    handle::{PeerConfig, PeerInfo},
    utils::manual_types::{
        glx::{GLXContext, GLXDrawable, GLXFBConfig, GLXFBConfigID},
        xlib::{Display, VisualID, XVisualInfo},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ChooseFbConfig(GLXFBConfigID),
    GetVisualInfo(VisualID),
    Free(*mut c_void),
    CreateNewContext {
        config: GLXFBConfig,
        render_type: c_int,
        share: GLXContext,
        direct: bool,
    },
    CreateContext {
        visual: *mut XVisualInfo,
        share: GLXContext,
        direct: bool,
    },
    IsDirect(GLXContext),
    DestroyContext(GLXContext),
    MakeContextCurrent {
        draw: GLXDrawable,
        read: GLXDrawable,
        context: GLXContext,
    },
    MakeCurrent {
        drawable: GLXDrawable,
        context: GLXContext,
    },
    GetCurrentContext,
    SwapBuffers(GLXDrawable),
    SwapInterval(c_int),
}

struct State {
    calls: Vec<Call>,
    next_handle: usize,
    descriptors: Vec<*mut c_void>,
    live_contexts: Vec<GLXContext>,
    current: GLXContext,

    version: Option<(c_int, c_int)>,
    extensions: String,
    glx13_entry_points: bool,
    swap_interval_entry_point: bool,
    fb_config_found: bool,
    visual_found: bool,
    create_returns_null: bool,
    direct: bool,
    make_current_ok: bool,
}

pub struct RecordingGlx {
    state: RefCell<State>,
}

impl RecordingGlx {
    pub fn new() -> Self {
        RecordingGlx {
            state: RefCell::new(State {
                calls: Vec::new(),
                next_handle: 0x1000,
                descriptors: Vec::new(),
                live_contexts: Vec::new(),
                current: std::ptr::null_mut(),
                version: Some((1, 4)),
                extensions: "GLX_SGI_swap_control".to_owned(),
                glx13_entry_points: true,
                swap_interval_entry_point: true,
                fb_config_found: true,
                visual_found: true,
                create_returns_null: false,
                direct: true,
                make_current_ok: true,
            }),
        }
    }

    pub fn set_version(&self, version: Option<(c_int, c_int)>) {
        self.state.borrow_mut().version = version;
    }

    pub fn set_extensions(&self, extensions: &str) {
        self.state.borrow_mut().extensions = extensions.to_owned();
    }

    pub fn set_fb_config_found(&self, found: bool) {
        self.state.borrow_mut().fb_config_found = found;
    }

    pub fn set_visual_found(&self, found: bool) {
        self.state.borrow_mut().visual_found = found;
    }

    pub fn set_create_returns_null(&self, null: bool) {
        self.state.borrow_mut().create_returns_null = null;
    }

    pub fn set_direct(&self, direct: bool) {
        self.state.borrow_mut().direct = direct;
    }

    pub fn set_make_current_ok(&self, ok: bool) {
        self.state.borrow_mut().make_current_ok = ok;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn last(&self) -> Option<Call> {
        self.state.borrow().calls.last().cloned()
    }

    pub fn count<F: Fn(&Call) -> bool>(&self, pred: F) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn live_contexts(&self) -> usize {
        self.state.borrow().live_contexts.len()
    }

    /// Every descriptor handed out was freed exactly once.
    pub fn descriptors_balanced(&self) -> bool {
        let state = self.state.borrow();
        let frees: Vec<*mut c_void> = state
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Free(data) => Some(*data),
                _ => None,
            })
            .collect();
        frees.len() == state.descriptors.len()
            && state
                .descriptors
                .iter()
                .all(|d| frees.iter().filter(|f| *f == d).count() == 1)
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn fresh_handle(&self) -> *mut c_void {
        let mut state = self.state.borrow_mut();
        let handle = state.next_handle;
        state.next_handle += 0x10;
        handle as *mut c_void
    }
}

impl GlxApi for RecordingGlx {
    fn query_version(&self, _display: Display) -> Option<(c_int, c_int)> {
        self.state.borrow().version
    }

    fn query_extensions_string(&self, _display: Display, _screen: c_int) -> Option<String> {
        Some(self.state.borrow().extensions.clone())
    }

    fn has_glx13_entry_points(&self) -> bool {
        self.state.borrow().glx13_entry_points
    }

    fn has_swap_interval_sgi(&self) -> bool {
        self.state.borrow().swap_interval_entry_point
    }

    fn choose_fb_config(
        &self,
        _display: Display,
        _screen: c_int,
        fbconfig_id: GLXFBConfigID,
    ) -> Option<FbConfigSelection> {
        self.record(Call::ChooseFbConfig(fbconfig_id));
        if !self.state.borrow().fb_config_found {
            return None;
        }
        let configs = self.fresh_handle();
        self.state.borrow_mut().descriptors.push(configs);
        Some(FbConfigSelection {
            configs: configs as *mut GLXFBConfig,
            config: self.fresh_handle(),
        })
    }

    fn get_visual_info(
        &self,
        _display: Display,
        _screen: c_int,
        visual_id: VisualID,
        _depth: c_int,
    ) -> Option<*mut XVisualInfo> {
        self.record(Call::GetVisualInfo(visual_id));
        if !self.state.borrow().visual_found {
            return None;
        }
        let visual = self.fresh_handle();
        self.state.borrow_mut().descriptors.push(visual);
        Some(visual as *mut XVisualInfo)
    }

    fn free(&self, data: *mut c_void) {
        self.record(Call::Free(data));
    }

    fn create_new_context(
        &self,
        _display: Display,
        config: GLXFBConfig,
        render_type: c_int,
        share: GLXContext,
        direct: bool,
    ) -> GLXContext {
        self.record(Call::CreateNewContext {
            config,
            render_type,
            share,
            direct,
        });
        self.new_context()
    }

    fn create_context(
        &self,
        _display: Display,
        visual: *mut XVisualInfo,
        share: GLXContext,
        direct: bool,
    ) -> GLXContext {
        self.record(Call::CreateContext { visual, share, direct });
        self.new_context()
    }

    fn is_direct(&self, _display: Display, context: GLXContext) -> bool {
        self.record(Call::IsDirect(context));
        self.state.borrow().direct
    }

    fn destroy_context(&self, _display: Display, context: GLXContext) {
        self.record(Call::DestroyContext(context));
        self.state.borrow_mut().live_contexts.retain(|c| *c != context);
    }

    fn make_context_current(
        &self,
        _display: Display,
        draw: GLXDrawable,
        read: GLXDrawable,
        context: GLXContext,
    ) -> bool {
        self.record(Call::MakeContextCurrent { draw, read, context });
        self.switch_current(context)
    }

    fn make_current(&self, _display: Display, drawable: GLXDrawable, context: GLXContext) -> bool {
        self.record(Call::MakeCurrent { drawable, context });
        self.switch_current(context)
    }

    fn get_current_context(&self) -> GLXContext {
        self.record(Call::GetCurrentContext);
        self.state.borrow().current
    }

    fn swap_buffers(&self, _display: Display, drawable: GLXDrawable) {
        self.record(Call::SwapBuffers(drawable));
    }

    fn swap_interval_sgi(&self, interval: c_int) -> c_int {
        self.record(Call::SwapInterval(interval));
        0
    }
}

impl RecordingGlx {
    fn new_context(&self) -> GLXContext {
        if self.state.borrow().create_returns_null {
            return std::ptr::null_mut();
        }
        let context = self.fresh_handle();
        self.state.borrow_mut().live_contexts.push(context);
        context
    }

    fn switch_current(&self, context: GLXContext) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.make_current_ok {
            return false;
        }
        state.current = context;
        true
    }
}

pub fn fake_display() -> Display {
    0xd15 as Display
}

pub fn glx13_peer() -> PeerInfo {
    PeerInfo {
        display: fake_display(),
        drawable: 0x400001,
        screen: 0,
        glx13: 1,
        config: PeerConfig {
            visual_id: 0x21,
            fbconfig_id: 0x7a,
            depth: 24,
        },
    }
}

pub fn legacy_peer() -> PeerInfo {
    PeerInfo {
        glx13: 0,
        drawable: 0x400002,
        ..glx13_peer()
    }
}

/// Lays a peer out the way the binding layer would hand it over.
pub fn peer_bytes(peer: &PeerInfo) -> Vec<u8> {
    let mut bytes = vec![0u8; PeerInfo::SIZE];
    unsafe { std::ptr::write_unaligned(bytes.as_mut_ptr() as *mut PeerInfo, *peer) };
    bytes
}
