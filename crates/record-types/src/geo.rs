//! Geo-bearing field values.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair as exchanged with callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Stored point; `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl From<LatLng> for GeoPoint {
    fn from(v: LatLng) -> Self {
        Self {
            x: v.longitude,
            y: v.latitude,
        }
    }
}

impl From<GeoPoint> for LatLng {
    fn from(p: GeoPoint) -> Self {
        Self {
            latitude: p.y,
            longitude: p.x,
        }
    }
}

/// Value of a declared geo field.
///
/// `Pending` holds raw coordinates set by a caller; persisting a record turns
/// every pending value of a declared field into a `Point`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeoField {
    #[default]
    Unset,
    Pending(LatLng),
    Point(GeoPoint),
}

impl GeoField {
    /// Convert pending coordinates into a point. Returns the point, if any.
    pub fn resolve(&mut self) -> Option<GeoPoint> {
        if let GeoField::Pending(coords) = *self {
            *self = GeoField::Point(coords.into());
        }
        self.point()
    }

    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            GeoField::Point(p) => Some(*p),
            _ => None,
        }
    }
}
