//! Audio output handles
//!
//! The playback engine owns its outputs; this crate only writes their
//! volume. Handles are shared as `Arc<dyn OutputHandle>`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Volume control surface of an audio output
///
/// Implemented by the playback engine for each output it drives (two
/// when crossfading). Volume is linear in `[0.0, 1.0]`.
pub trait OutputHandle: Send + Sync {
    /// Set the output volume
    fn set_volume(&self, volume: f64);

    /// Current output volume
    fn volume(&self) -> f64;
}

/// Shared handle reference as stored by the volume applier
pub type SharedOutput = Arc<dyn OutputHandle>;

/// Lock-free output volume cell
///
/// Stores the f64 bit pattern in an atomic so the engine's audio thread can
/// read it while the UI thread writes. Cloning is cheap and shares the cell.
#[derive(Clone)]
pub struct SharedVolume {
    bits: Arc<AtomicU64>,
}

impl SharedVolume {
    /// Create a cell at the given volume
    pub fn new(volume: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(volume.to_bits())),
        }
    }

    /// Coerce into a shared handle for registration
    pub fn handle(&self) -> SharedOutput {
        Arc::new(self.clone())
    }
}

impl Default for SharedVolume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl OutputHandle for SharedVolume {
    fn set_volume(&self, volume: f64) {
        self.bits.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn volume(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl fmt::Debug for SharedVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedVolume")
            .field("volume", &self.volume())
            .finish()
    }
}
