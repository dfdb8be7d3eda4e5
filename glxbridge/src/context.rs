//! GLX context lifecycle: create, make current, release, swap, destroy.
//!
//! A context is tagged with the path that created it (GLX 1.3 framebuffer
//! configs or legacy visuals) and make-current dispatches on that tag.
//! Release dispatches on the display-wide `Capabilities` instead, the same
//! way the windowing layer negotiated it; see DESIGN.md.

use std::ptr;

use glxbridge_shared::constants::{glx::GLX_RGBA_TYPE, xlib::X_NONE};
use libc::c_void;

use crate::{
    bind::{GlxApi, XResource},
    caps::Capabilities,
    error::{Error, Result},
    handle::{GlxContext, PeerInfo},
    utils::{
        config::Config,
        manual_types::{glx::GLXContext, xlib::Display},
    },
};

pub struct ContextManager<A: GlxApi> {
    api: A,
    config: Config,
}

impl<A: GlxApi> ContextManager<A> {
    pub fn new(api: A, config: Config) -> Self {
        ContextManager { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn create(
        &self,
        caps: &Capabilities,
        peer: &PeerInfo,
        shared: Option<&GlxContext>,
    ) -> Result<GlxContext> {
        if peer.is_glx13() && !caps.glx13 {
            // release_current will take the legacy path for this context
            log::warn!("peer requests GLX 1.3 but the display did not negotiate it");
        }
        let share = shared.map_or(ptr::null_mut(), GlxContext::raw);
        let context = if peer.is_glx13() {
            self.create_glx13(peer, share)?
        } else {
            self.create_legacy(peer, share)?
        };
        if self.config.debug_mode {
            log::info!("created GLX context {:?} on drawable {:#x}", context, peer.drawable);
        }
        Ok(context)
    }

    fn create_glx13(&self, peer: &PeerInfo, share: GLXContext) -> Result<GlxContext> {
        let selection = self
            .api
            .choose_fb_config(peer.display, peer.screen, peer.config.fbconfig_id)
            .ok_or(Error::NoFbConfig)?;
        let context = {
            let _configs = XResource::new(&self.api, selection.configs as *mut c_void);
            self.api
                .create_new_context(peer.display, selection.config, GLX_RGBA_TYPE, share, true)
        };
        self.check_context(peer.display, context)?;
        Ok(GlxContext::Glx13(context))
    }

    fn create_legacy(&self, peer: &PeerInfo, share: GLXContext) -> Result<GlxContext> {
        let visual = self
            .api
            .get_visual_info(peer.display, peer.screen, peer.config.visual_id, peer.config.depth)
            .ok_or(Error::NoVisual)?;
        let context = {
            let _visual = XResource::new(&self.api, visual as *mut c_void);
            self.api.create_context(peer.display, visual, share, true)
        };
        self.check_context(peer.display, context)?;
        Ok(GlxContext::Legacy(context))
    }

    fn check_context(&self, display: Display, context: GLXContext) -> Result<()> {
        if context.is_null() {
            return Err(Error::ContextCreation);
        }
        if !self.config.allow_software_gl && !self.api.is_direct(display, context) {
            self.api.destroy_context(display, context);
            return Err(Error::NotDirect);
        }
        Ok(())
    }

    pub fn make_current(&self, peer: &PeerInfo, context: &GlxContext) -> Result<()> {
        let ok = match *context {
            GlxContext::Glx13(raw) => self
                .api
                .make_context_current(peer.display, peer.drawable, peer.drawable, raw),
            GlxContext::Legacy(raw) => self.api.make_current(peer.display, peer.drawable, raw),
        };
        if !ok {
            return Err(Error::MakeCurrent);
        }
        Ok(())
    }

    pub fn release_current(&self, caps: &Capabilities, peer: &PeerInfo) -> Result<()> {
        let ok = if caps.glx13 {
            self.api
                .make_context_current(peer.display, X_NONE, X_NONE, ptr::null_mut())
        } else {
            self.api.make_current(peer.display, X_NONE, ptr::null_mut())
        };
        if !ok {
            return Err(Error::ReleaseCurrent);
        }
        Ok(())
    }

    pub fn is_current(&self, context: &GlxContext) -> bool {
        context.raw() == self.api.get_current_context()
    }

    pub fn swap_buffers(&self, peer: &PeerInfo) {
        self.api.swap_buffers(peer.display, peer.drawable);
    }

    pub fn destroy(&self, peer: &PeerInfo, context: GlxContext) {
        if self.config.debug_mode {
            log::info!("destroying GLX context {:?}", context);
        }
        self.api.destroy_context(peer.display, context.raw());
    }

    pub fn set_vsync(&self, caps: &Capabilities, enabled: bool) {
        if caps.sgi_swap_control {
            let interval = if enabled { 1 } else { 0 };
            self.api.swap_interval_sgi(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{glx13_peer, legacy_peer, Call, RecordingGlx};

    const GLX13: Capabilities = Capabilities {
        glx13: true,
        sgi_swap_control: true,
    };
    const LEGACY: Capabilities = Capabilities {
        glx13: false,
        sgi_swap_control: false,
    };

    fn manager() -> ContextManager<RecordingGlx> {
        ContextManager::new(RecordingGlx::new(), Config::default())
    }

    fn software_manager() -> ContextManager<RecordingGlx> {
        let config = Config {
            allow_software_gl: true,
            ..Config::default()
        };
        ContextManager::new(RecordingGlx::new(), config)
    }

    #[test]
    fn glx13_peer_creates_tagged_context_and_frees_config() {
        let manager = manager();
        let context = manager.create(&GLX13, &glx13_peer(), None).unwrap();
        assert!(context.is_glx13());
        let glx = manager.api();
        assert_eq!(glx.count(|c| matches!(c, Call::CreateNewContext { .. })), 1);
        assert_eq!(glx.count(|c| matches!(c, Call::CreateContext { .. })), 0);
        assert!(glx.descriptors_balanced());
    }

    #[test]
    fn legacy_peer_creates_tagged_context_and_frees_visual() {
        let manager = manager();
        let context = manager.create(&LEGACY, &legacy_peer(), None).unwrap();
        assert!(!context.is_glx13());
        let glx = manager.api();
        assert_eq!(glx.count(|c| matches!(c, Call::CreateContext { .. })), 1);
        assert!(glx.descriptors_balanced());
    }

    #[test]
    fn shared_context_is_passed_as_share_list() {
        let manager = manager();
        let first = manager.create(&LEGACY, &legacy_peer(), None).unwrap();
        manager.create(&LEGACY, &legacy_peer(), Some(&first)).unwrap();
        let shares: Vec<GLXContext> = manager
            .api()
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateContext { share, .. } => Some(share),
                _ => None,
            })
            .collect();
        assert_eq!(shares, vec![ptr::null_mut(), first.raw()]);
    }

    #[test]
    fn contexts_request_direct_rendering() {
        let manager = manager();
        manager.create(&GLX13, &glx13_peer(), None).unwrap();
        manager.create(&LEGACY, &legacy_peer(), None).unwrap();
        for call in manager.api().calls() {
            match call {
                Call::CreateNewContext { direct, render_type, .. } => {
                    assert!(direct);
                    assert_eq!(render_type, GLX_RGBA_TYPE);
                }
                Call::CreateContext { direct, .. } => assert!(direct),
                _ => {}
            }
        }
    }

    #[test]
    fn null_context_fails_and_still_frees_descriptor() {
        for peer in [glx13_peer(), legacy_peer()] {
            let manager = manager();
            manager.api().set_create_returns_null(true);
            let err = manager.create(&GLX13, &peer, None).unwrap_err();
            assert_eq!(err, Error::ContextCreation);
            assert!(manager.api().descriptors_balanced());
            assert_eq!(manager.api().count(|c| matches!(c, Call::DestroyContext(_))), 0);
        }
    }

    #[test]
    fn indirect_context_is_destroyed_exactly_once() {
        for peer in [glx13_peer(), legacy_peer()] {
            let manager = manager();
            manager.api().set_direct(false);
            let err = manager.create(&GLX13, &peer, None).unwrap_err();
            assert_eq!(err, Error::NotDirect);
            let glx = manager.api();
            assert_eq!(glx.count(|c| matches!(c, Call::DestroyContext(_))), 1);
            assert_eq!(glx.live_contexts(), 0);
            assert!(glx.descriptors_balanced());
        }
    }

    #[test]
    fn software_override_accepts_indirect_context() {
        let manager = software_manager();
        manager.api().set_direct(false);
        manager.create(&LEGACY, &legacy_peer(), None).unwrap();
        assert_eq!(manager.api().count(|c| matches!(c, Call::IsDirect(_))), 0);
        assert_eq!(manager.api().live_contexts(), 1);
    }

    #[test]
    fn missing_descriptor_fails_before_creation() {
        let manager = manager();
        manager.api().set_fb_config_found(false);
        assert_eq!(manager.create(&GLX13, &glx13_peer(), None), Err(Error::NoFbConfig));

        manager.api().set_visual_found(false);
        assert_eq!(manager.create(&LEGACY, &legacy_peer(), None), Err(Error::NoVisual));

        let glx = manager.api();
        let creations =
            glx.count(|c| matches!(c, Call::CreateNewContext { .. } | Call::CreateContext { .. }));
        assert_eq!(creations, 0);
        assert!(glx.descriptors_balanced());
    }

    #[test]
    fn make_current_dispatches_on_context_tag() {
        let manager = manager();
        let peer = glx13_peer();
        let context = manager.create(&GLX13, &peer, None).unwrap();
        manager.make_current(&peer, &context).unwrap();
        assert_eq!(
            manager.api().last(),
            Some(Call::MakeContextCurrent {
                draw: peer.drawable,
                read: peer.drawable,
                context: context.raw()
            })
        );

        let peer = legacy_peer();
        let context = manager.create(&LEGACY, &peer, None).unwrap();
        manager.make_current(&peer, &context).unwrap();
        assert_eq!(
            manager.api().last(),
            Some(Call::MakeCurrent {
                drawable: peer.drawable,
                context: context.raw()
            })
        );
    }

    #[test]
    fn release_dispatches_on_capabilities() {
        let manager = manager();
        let peer = legacy_peer();

        manager.release_current(&GLX13, &peer).unwrap();
        assert_eq!(
            manager.api().last(),
            Some(Call::MakeContextCurrent {
                draw: X_NONE,
                read: X_NONE,
                context: ptr::null_mut()
            })
        );

        manager.release_current(&LEGACY, &peer).unwrap();
        assert_eq!(
            manager.api().last(),
            Some(Call::MakeCurrent {
                drawable: X_NONE,
                context: ptr::null_mut()
            })
        );
    }

    #[test]
    fn failed_make_current_and_release_report_errors() {
        let manager = manager();
        let peer = legacy_peer();
        let context = manager.create(&LEGACY, &peer, None).unwrap();
        manager.api().set_make_current_ok(false);
        assert_eq!(manager.make_current(&peer, &context), Err(Error::MakeCurrent));
        assert_eq!(manager.release_current(&LEGACY, &peer), Err(Error::ReleaseCurrent));
    }

    #[test]
    fn is_current_follows_make_and_release() {
        for (caps, peer) in [(GLX13, glx13_peer()), (LEGACY, legacy_peer())] {
            let manager = manager();
            let context = manager.create(&caps, &peer, None).unwrap();
            assert!(!manager.is_current(&context));
            manager.make_current(&peer, &context).unwrap();
            assert!(manager.is_current(&context));
            manager.release_current(&caps, &peer).unwrap();
            assert!(!manager.is_current(&context));
        }
    }

    #[test]
    fn swap_and_destroy_forward_to_glx() {
        let manager = manager();
        let peer = legacy_peer();
        let context = manager.create(&LEGACY, &peer, None).unwrap();
        manager.swap_buffers(&peer);
        assert_eq!(manager.api().last(), Some(Call::SwapBuffers(peer.drawable)));
        manager.destroy(&peer, context);
        assert_eq!(manager.api().last(), Some(Call::DestroyContext(context.raw())));
        assert_eq!(manager.api().live_contexts(), 0);
    }

    #[test]
    fn vsync_uses_swap_interval_when_negotiated() {
        let manager = manager();
        manager.set_vsync(&GLX13, true);
        manager.set_vsync(&GLX13, false);
        let intervals: Vec<i32> = manager
            .api()
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SwapInterval(interval) => Some(interval),
                _ => None,
            })
            .collect();
        assert_eq!(intervals, vec![1, 0]);
    }

    #[test]
    fn vsync_is_a_no_op_without_swap_control() {
        let manager = manager();
        manager.set_vsync(&LEGACY, true);
        assert!(manager.api().calls().is_empty());
    }
}
