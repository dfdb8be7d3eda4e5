use glxbridge_shared::constants::glx::{
    has_extension, version_at_least, GLX13_VERSION, GLX_MIN_VERSION, GLX_SGI_SWAP_CONTROL,
};
use libc::c_int;

use crate::{
    bind::GlxApi,
    error::{Error, Result},
    utils::manual_types::xlib::Display,
};

/// What the display's GLX implementation supports. Resolved once and then
/// handed to every operation that branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub glx13: bool,
    pub sgi_swap_control: bool,
}

impl Capabilities {
    pub fn negotiate<A: GlxApi + ?Sized>(
        api: &A,
        display: Display,
        screen: c_int,
    ) -> Result<Capabilities> {
        let version = api.query_version(display).ok_or(Error::GlxInit)?;
        if !version_at_least(version, GLX_MIN_VERSION) {
            log::warn!("GLX {}.{} is too old, need at least 1.2", version.0, version.1);
            return Err(Error::GlxInit);
        }
        let extensions = api.query_extensions_string(display, screen).unwrap_or_default();
        let caps = Capabilities::from_query(
            version,
            &extensions,
            api.has_glx13_entry_points(),
            api.has_swap_interval_sgi(),
        );
        log::debug!("GLX {}.{} negotiated: {:?}", version.0, version.1, caps);
        Ok(caps)
    }

    /// An extension only counts when it is both advertised and its entry point resolved.
    pub fn from_query(
        version: (c_int, c_int),
        extensions: &str,
        glx13_entry_points: bool,
        swap_interval_entry_point: bool,
    ) -> Capabilities {
        Capabilities {
            glx13: version_at_least(version, GLX13_VERSION) && glx13_entry_points,
            sgi_swap_control: has_extension(extensions, GLX_SGI_SWAP_CONTROL)
                && swap_interval_entry_point,
        }
    }
}
