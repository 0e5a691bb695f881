//! Geographic risk: city mismatch and physically impossible travel.

use super::RiskSignal;
use crate::model::{GeoPoint, ReasonCode, Transaction, UserProfile};

/// Ceiling for the geo component score.
pub const GEO_CEILING: u32 = 65;

/// Travel faster than this between consecutive transactions is treated as
/// physically impossible.
pub const MAX_SPEED_KMH: f64 = 800.0;

/// Mean Earth radius used by the Haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const MS_PER_HOUR: f64 = 3_600_000.0;
const CITY_MISMATCH_POINTS: u32 = 10;
const IMPOSSIBLE_TRAVEL_POINTS: u32 = 55;

/// Scores a transaction's location against the registered city and, when a
/// previous transaction exists, against the implied travel speed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(
    tx: &Transaction,
    profile: &UserProfile,
    last_tx: Option<&Transaction>,
) -> RiskSignal {
    let mut signal = RiskSignal::none();

    if tx.location.city != profile.registered_city {
        signal.add(
            CITY_MISMATCH_POINTS,
            format!(
                "{}: city {} differs from registered city {}",
                ReasonCode::GeoImpossible,
                tx.location.city,
                profile.registered_city
            ),
        );
    }

    if let Some(last) = last_tx {
        let distance_km = haversine_km(&last.location, &tx.location);
        let elapsed_h = (tx.timestamp - last.timestamp) as f64 / MS_PER_HOUR;
        if elapsed_h > 0.0 && distance_km / elapsed_h > MAX_SPEED_KMH {
            signal.add(
                IMPOSSIBLE_TRAVEL_POINTS,
                format!(
                    "{}: impossible travel of {distance_km:.1} km in {elapsed_h:.2} h",
                    ReasonCode::GeoImpossible
                ),
            );
        }
    }

    signal.clamp_to(GEO_CEILING)
}

/// Great-circle distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`].
#[must_use]
pub fn haversine_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let from_lat = from.lat.to_radians();
    let to_lat = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
