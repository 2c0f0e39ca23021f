// Location - channel-based seam over platform location services
//
// The original exposed callback interfaces; here the one-shot request is a
// tokio oneshot (at most one resolution per request, self-terminating) and
// the continuous subscription is an mpsc stream. The two channels are
// independent: both may be in flight at once without sharing callback
// state. A failed one-shot simply drops its reply sender; absence of a
// result is the error signal, not an error value.

use tokio::sync::{mpsc, oneshot};

use crate::error::LocationError;
use crate::geo::GeoPoint;

/// Provider seam for one-shot fixes and continuous updates.
///
/// Implementations bridge to a platform provider (or a fixture in tests).
/// `request_once` must resolve the reply at most once and must not block
/// the caller; dropping the sender without sending reports failure.
pub trait LocationSource: Send + Sync {
    /// Request a single location fix, delivered through `reply`.
    fn request_once(&self, reply: oneshot::Sender<GeoPoint>);

    /// Start continuous updates into `updates` until `stop_updates`.
    fn start_updates(&self, updates: mpsc::Sender<GeoPoint>) -> Result<(), LocationError>;

    /// Stop a running update subscription. No-op when none is running.
    fn stop_updates(&self);
}
