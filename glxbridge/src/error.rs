use std::fmt;

/// Every failure the bridge reports. Messages are fixed so the binding layer
/// can surface them as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    BufferTooSmall { needed: usize, actual: usize },
    PeerBufferTooSmall { needed: usize, actual: usize },
    GlxInit,
    NoFbConfig,
    NoVisual,
    ContextCreation,
    NotDirect,
    MakeCurrent,
    ReleaseCurrent,
    LibraryLoad { name: String },
    MissingSymbol { name: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall { needed, actual } => write!(
                f,
                "Handle buffer not large enough (need {} bytes, got {})",
                needed, actual
            ),
            Error::PeerBufferTooSmall { needed, actual } => write!(
                f,
                "Peer buffer not large enough (need {} bytes, got {})",
                needed, actual
            ),
            Error::GlxInit => f.write_str("Could not initialize GLX"),
            Error::NoFbConfig => f.write_str("Could not find GLX 1.3 config from peer info"),
            Error::NoVisual => f.write_str("Could not find VisualInfo from peer info"),
            Error::ContextCreation => f.write_str("Could not create GLX context"),
            Error::NotDirect => f.write_str("Could not create a direct GLX context"),
            Error::MakeCurrent => f.write_str("Could not make context current"),
            Error::ReleaseCurrent => f.write_str("Could not release current context"),
            Error::LibraryLoad { name } => write!(f, "Could not load {}", name),
            Error::MissingSymbol { name } => write!(f, "Could not resolve symbol {}", name),
        }
    }
}

impl std::error::Error for Error {}
