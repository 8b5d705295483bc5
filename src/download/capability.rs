//! Download capability detection.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::host::save::SaveTarget;
use crate::host::transport::HttpTransport;

/// Which download mechanism the host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Host-native save primitive.
    NativeSave,
    /// Fetch bytes, then hand them to a blob-style writer.
    FetchAndSave,
    /// No viable mechanism; downloads must not be attempted.
    None,
}

/// The host primitives a session was constructed with.
#[derive(Clone, Default)]
pub struct HostEnv {
    pub transport: Option<Arc<dyn HttpTransport>>,
    pub native_save: Option<Arc<dyn SaveTarget>>,
    pub blob_save: Option<Arc<dyn SaveTarget>>,
}

/// Capability resolved once per session and passed around as a value:
/// the kind plus a handle to whichever save primitive backs it.
#[derive(Clone)]
pub struct ResolvedCapability {
    kind: CapabilityKind,
    save: Option<Arc<dyn SaveTarget>>,
}

impl ResolvedCapability {
    /// Probe the host environment. Preference order: native save, then
    /// fetch-and-save (requires a transport for the fetch half), then
    /// nothing.
    pub fn detect(env: &HostEnv) -> Self {
        if let Some(native) = &env.native_save {
            return Self {
                kind: CapabilityKind::NativeSave,
                save: Some(native.clone()),
            };
        }
        if let (Some(_), Some(blob)) = (&env.transport, &env.blob_save) {
            return Self {
                kind: CapabilityKind::FetchAndSave,
                save: Some(blob.clone()),
            };
        }
        tracing::warn!("no download capability detected");
        Self {
            kind: CapabilityKind::None,
            save: None,
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    pub fn is_available(&self) -> bool {
        self.kind != CapabilityKind::None
    }

    /// Persist bytes through the detected primitive.
    pub async fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        match &self.save {
            Some(target) => target.save(bytes, filename).await,
            None => Err(Error::CapabilityUnavailable),
        }
    }
}
