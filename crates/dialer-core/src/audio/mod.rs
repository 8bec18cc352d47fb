//! Call audio routing
//!
//! [`AudioRoute`] applies mute, speaker and audio-mode changes using a
//! two-tier policy:
//!
//! 1. the in-call surface ([`InCallAudio`]), if one is attached and still alive
//! 2. the device audio manager ([`AudioDevice`])
//!
//! If both fail the failure is logged and swallowed. Every operation reports
//! which path served it as an [`AudioPath`]; none of them return an error.
//!
//! ```rust
//! use dialer_core::audio::{AudioPath, AudioRoute};
//!
//! // Nothing attached and no device: requests are dropped, not failed
//! let route = AudioRoute::new(None);
//! assert_eq!(route.set_muted(true), AudioPath::Unavailable);
//! ```

use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod device;

pub use device::{AudioDevice, AudioMode, AudioOutput, AudioResult, AudioRouteError, InCallAudio};

/// Which path served an audio request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioPath {
    /// Telephony-managed route of the in-call surface
    Preferred,
    /// Direct audio device control
    Fallback,
    /// Neither path could apply the request
    Unavailable,
}

impl AudioPath {
    pub fn is_applied(&self) -> bool {
        !matches!(self, AudioPath::Unavailable)
    }
}

/// Two-tier audio control for the current call
pub struct AudioRoute {
    /// Non-owning; the surface may go away at any time
    in_call: RwLock<Option<Weak<dyn InCallAudio>>>,
    device: Option<Arc<dyn AudioDevice>>,
}

impl AudioRoute {
    pub fn new(device: Option<Arc<dyn AudioDevice>>) -> Self {
        Self {
            in_call: RwLock::new(None),
            device,
        }
    }

    /// Route through `surface` while it is alive
    pub fn attach_in_call_surface(&self, surface: &Arc<dyn InCallAudio>) {
        let mut slot = self.in_call.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::downgrade(surface));
        debug!("in-call audio surface attached");
    }

    /// Forget `surface` if it is the one attached; a different surface stays
    pub fn detach_in_call_surface(&self, surface: &Arc<dyn InCallAudio>) {
        let mut slot = self.in_call.write().unwrap_or_else(PoisonError::into_inner);
        let attached = slot
            .as_ref()
            .is_some_and(|weak| weak.as_ptr().cast::<()>() == Arc::as_ptr(surface).cast::<()>());
        if attached {
            *slot = None;
            debug!("in-call audio surface detached");
        }
    }

    /// Whether a live in-call surface is attached
    pub fn has_in_call_surface(&self) -> bool {
        self.surface().is_some()
    }

    pub fn set_muted(&self, muted: bool) -> AudioPath {
        self.apply(
            "set_muted",
            |surface| surface.set_muted(muted),
            |device| device.set_microphone_mute(muted),
        )
    }

    pub fn set_speaker(&self, on: bool) -> AudioPath {
        let output = if on { AudioOutput::Speaker } else { AudioOutput::Earpiece };
        self.apply(
            "set_speaker",
            |surface| surface.set_audio_route(output),
            |device| {
                if !device.mode()?.is_call_mode() {
                    device.set_mode(AudioMode::InCall)?;
                }
                device.set_speakerphone_on(on)
            },
        )
    }

    /// Put the device in call audio mode
    pub fn engage_call_audio(&self) -> AudioPath {
        self.apply(
            "engage_call_audio",
            |surface| surface.engage_call_audio(),
            |device| {
                if device.mode()? != AudioMode::InCall {
                    device.set_mode(AudioMode::InCall)?;
                }
                Ok(())
            },
        )
    }

    /// Speaker off and normal audio mode
    pub fn reset_audio(&self) -> AudioPath {
        self.apply(
            "reset_audio",
            |surface| surface.reset_audio(),
            |device| {
                device.set_speakerphone_on(false)?;
                device.set_mode(AudioMode::Normal)
            },
        )
    }

    fn surface(&self) -> Option<Arc<dyn InCallAudio>> {
        self.in_call
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn apply(
        &self,
        operation: &'static str,
        preferred: impl FnOnce(&dyn InCallAudio) -> AudioResult<()>,
        fallback: impl FnOnce(&dyn AudioDevice) -> AudioResult<()>,
    ) -> AudioPath {
        if let Some(surface) = self.surface() {
            match preferred(surface.as_ref()) {
                Ok(()) => {
                    debug!(operation, "audio request applied via in-call route");
                    return AudioPath::Preferred;
                }
                Err(AudioRouteError::Unsupported) => {}
                Err(e) => {
                    warn!(operation, error = %e, "in-call audio route failed, falling back to audio device");
                }
            }
        }

        let Some(device) = self.device.as_ref() else {
            warn!(operation, "no audio path available");
            return AudioPath::Unavailable;
        };
        match fallback(device.as_ref()) {
            Ok(()) => {
                debug!(operation, "audio request applied via audio device");
                AudioPath::Fallback
            }
            Err(e) => {
                warn!(operation, error = %e, "audio device request failed");
                AudioPath::Unavailable
            }
        }
    }
}
