use std::fmt;

/// Earth radius used by the haversine distance, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Opaque node identifier. Integer ids from input files are kept as their text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named location. Coordinates are degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub location: String,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        location: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            location: location.into(),
            lat,
            lon,
        }
    }

    /// Unnamed node, mostly useful for building graphs from bare coordinates.
    pub fn at(id: impl Into<NodeId>, lat: f64, lon: f64) -> Self {
        Self::new(id, "", "", lat, lon)
    }

    /// Great-circle distance in miles (haversine).
    ///
    /// Coordinates are not validated. The haversine term is clamped to `[0, 1]`
    /// so rounding near antipodal or identical points cannot push `sqrt`/`asin`
    /// out of their domain.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let s1 = (dlat / 2.0).sin();
        let s2 = (dlon / 2.0).sin();
        let h = (s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2).clamp(0.0, 1.0);
        2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b1 = ryu::Buffer::new();
        let mut b2 = ryu::Buffer::new();
        write!(
            f,
            "{} {} {} {} {}",
            self.id,
            self.label,
            self.location,
            b1.format(self.lat),
            b2.format(self.lon)
        )
    }
}
