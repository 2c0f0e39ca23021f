// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::engine::{MotionEvent, NearbyUpdate};

/// Manages the engine's tokio broadcast channels
///
/// Centralizes broadcast channel creation, storage, and subscription so
/// multiple UI collaborators can consume the same event streams.
///
/// # Channel Types
/// - Motion: classified gesture events from the sensor pipeline
/// - Nearby: refreshed proximity-filtered note sets with their count
pub struct BroadcastChannelManager {
    motion: Arc<Mutex<Option<broadcast::Sender<MotionEvent>>>>,
    nearby: Arc<Mutex<Option<broadcast::Sender<NearbyUpdate>>>>,
}

impl BroadcastChannelManager {
    /// Create a new BroadcastChannelManager with all channels uninitialized
    pub fn new() -> Self {
        Self {
            motion: Arc::new(Mutex::new(None)),
            nearby: Arc::new(Mutex::new(None)),
        }
    }

    /// Initialize the motion broadcast channel
    ///
    /// Returns the sender the sensor pipeline publishes classified events
    /// through. Buffer of 100 messages absorbs bursts at fastest sensor
    /// delay; lagged subscribers drop old messages.
    pub fn init_motion(&self) -> broadcast::Sender<MotionEvent> {
        let (tx, _) = broadcast::channel(100);
        *self.motion.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to motion events
    ///
    /// Returns None if init_motion() has not been called yet. Each
    /// subscriber gets an independent receiver.
    pub fn subscribe_motion(&self) -> Option<broadcast::Receiver<MotionEvent>> {
        self.motion.lock().unwrap().as_ref().map(|tx| tx.subscribe())
    }

    /// Initialize the nearby-notes broadcast channel
    ///
    /// Buffer of 16 messages: refreshes arrive at location-update cadence,
    /// far slower than sensor ticks.
    pub fn init_nearby(&self) -> broadcast::Sender<NearbyUpdate> {
        let (tx, _) = broadcast::channel(16);
        *self.nearby.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to nearby-note refreshes
    ///
    /// Returns None if init_nearby() has not been called yet.
    pub fn subscribe_nearby(&self) -> Option<broadcast::Receiver<NearbyUpdate>> {
        self.nearby.lock().unwrap().as_ref().map(|tx| tx.subscribe())
    }

    /// Get the motion sender if initialized
    pub fn motion_sender(&self) -> Option<broadcast::Sender<MotionEvent>> {
        self.motion.lock().unwrap().clone()
    }

    /// Get the nearby sender if initialized
    pub fn nearby_sender(&self) -> Option<broadcast::Sender<NearbyUpdate>> {
        self.nearby.lock().unwrap().clone()
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
