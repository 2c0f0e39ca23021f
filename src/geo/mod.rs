// Geo - reference points and the nearby-note proximity filter
//
// The filter is an axis tolerance test, not geodesic distance: a candidate
// is kept when it is within tolerance on either axis alone. The OR across
// the two axis checks is the inherited contract (most bounding-box filters
// AND them) - it admits candidates arbitrarily far away on one axis as long
// as the other lines up. Surprising relative to a "within radius" intuition,
// but preserved exactly.

use serde::{Deserialize, Serialize};

use crate::config::ProximityConfig;
use crate::notes::Note;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Filters notes by axis proximity to a reference point.
#[derive(Debug, Clone)]
pub struct ProximityFilter {
    tolerance_deg: f64,
}

impl ProximityFilter {
    pub fn new(config: &ProximityConfig) -> Self {
        Self {
            tolerance_deg: config.tolerance_deg,
        }
    }

    /// Return the notes within tolerance of `reference`, preserving input order.
    ///
    /// Inclusion predicate: `|lon - ref.lon| <= tolerance OR
    /// |lat - ref.lat| <= tolerance`, bounds inclusive. Empty input yields
    /// an empty result; never fails.
    pub fn notes_in_radius(&self, reference: GeoPoint, notes: &[Note]) -> Vec<Note> {
        notes
            .iter()
            .filter(|note| self.is_nearby(reference, note.location()))
            .cloned()
            .collect()
    }

    /// The raw axis-OR predicate, exposed for collaborators that filter
    /// other point-carrying records.
    pub fn is_nearby(&self, reference: GeoPoint, candidate: GeoPoint) -> bool {
        (candidate.longitude - reference.longitude).abs() <= self.tolerance_deg
            || (candidate.latitude - reference.latitude).abs() <= self.tolerance_deg
    }
}
