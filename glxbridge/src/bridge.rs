//! Buffer-level operations for the binding layer.
//!
//! The binding layer owns the peer and context buffers. Each call borrows
//! them, decodes what it needs, and forwards to `ContextManager`.

use crate::{
    bind::GlxApi,
    caps::Capabilities,
    context::ContextManager,
    error::Result,
    handle::{ContextRecord, PeerInfo},
    utils::config::Config,
};

pub struct Bridge<A: GlxApi> {
    manager: ContextManager<A>,
}

impl<A: GlxApi> Bridge<A> {
    pub fn new(api: A, config: Config) -> Self {
        Bridge {
            manager: ContextManager::new(api, config),
        }
    }

    pub fn manager(&self) -> &ContextManager<A> {
        &self.manager
    }

    /// Negotiates what the peer's display supports.
    ///
    /// # Safety
    /// `peer` must hold a `PeerInfo` written by the windowing layer.
    pub unsafe fn init(&self, peer: &[u8]) -> Result<Capabilities> {
        let peer = PeerInfo::from_bytes(peer)?;
        Capabilities::negotiate(self.manager.api(), peer.display, peer.screen)
    }

    pub fn set_vsync(&self, caps: &Capabilities, enabled: bool) {
        self.manager.set_vsync(caps, enabled);
    }

    /// Creates a context for the peer and writes its record into `context`.
    ///
    /// # Safety
    /// `peer` must hold a live `PeerInfo`; `shared`, if present, must hold a
    /// record written by an earlier `create_context` that was not destroyed.
    pub unsafe fn create_context(
        &self,
        caps: &Capabilities,
        peer: &[u8],
        context: &mut [u8],
        shared: Option<&[u8]>,
    ) -> Result<()> {
        ContextRecord::check_capacity(context)?;
        let peer = PeerInfo::from_bytes(peer)?;
        let shared = match shared {
            Some(buf) => Some(ContextRecord::read(buf)?.to_context()),
            None => None,
        };
        let created = self.manager.create(caps, &peer, shared.as_ref())?;
        ContextRecord::from(created).write(context)
    }

    /// # Safety
    /// Both buffers must be live, and the context must not be used again.
    pub unsafe fn destroy_context(&self, peer: &[u8], context: &[u8]) -> Result<()> {
        let peer = PeerInfo::from_bytes(peer)?;
        let context = ContextRecord::read(context)?.to_context();
        self.manager.destroy(&peer, context);
        Ok(())
    }

    /// # Safety
    /// `peer` must hold a live `PeerInfo`.
    pub unsafe fn release_current(&self, caps: &Capabilities, peer: &[u8]) -> Result<()> {
        let peer = PeerInfo::from_bytes(peer)?;
        self.manager.release_current(caps, &peer)
    }

    /// # Safety
    /// Both buffers must be live.
    pub unsafe fn make_current(&self, peer: &[u8], context: &[u8]) -> Result<()> {
        let peer = PeerInfo::from_bytes(peer)?;
        let context = ContextRecord::read(context)?.to_context();
        self.manager.make_current(&peer, &context)
    }

    pub fn is_current(&self, context: &[u8]) -> Result<bool> {
        let context = ContextRecord::read(context)?.to_context();
        Ok(self.manager.is_current(&context))
    }

    /// # Safety
    /// `peer` must hold a live `PeerInfo`.
    pub unsafe fn swap_buffers(&self, peer: &[u8]) -> Result<()> {
        let peer = PeerInfo::from_bytes(peer)?;
        self.manager.swap_buffers(&peer);
        Ok(())
    }
}
