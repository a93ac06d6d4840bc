/// Region-of-interest model
///
/// ROI types form a fixed set. Every image carries one polygon per type,
/// stored in an array indexed by the type so a missing entry cannot exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// The fixed set of ROI types drawn on phenology images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoiType {
    Canopy,
    Sky,
    Grass,
    Soil,
}

impl RoiType {
    /// Number of ROI types
    pub const COUNT: usize = 4;

    /// All ROI types in display and export order
    pub const ALL: [RoiType; RoiType::COUNT] =
        [RoiType::Canopy, RoiType::Sky, RoiType::Grass, RoiType::Soil];

    /// Lowercase key used in CSV column names and settings
    pub fn key(self) -> &'static str {
        match self {
            RoiType::Canopy => "canopy",
            RoiType::Sky => "sky",
            RoiType::Grass => "grass",
            RoiType::Soil => "soil",
        }
    }

    /// Display color as 8-bit RGB
    pub fn rgb(self) -> [u8; 3] {
        match self {
            RoiType::Canopy => [0x22, 0xc5, 0x22],
            RoiType::Sky => [0x1e, 0x90, 0xff],
            RoiType::Grass => [0xff, 0xd7, 0x00],
            RoiType::Soil => [0x8b, 0x45, 0x13],
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RoiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RoiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoiType::ALL
            .into_iter()
            .find(|roi| roi.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown ROI type '{s}'"))
    }
}

/// A point in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An ordered list of vertices, optionally closed back to the first one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polygon {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Append a vertex. A closed polygon is reopened by further points.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
        self.closed = false;
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// Edges to render: consecutive pairs plus the closing edge when closed
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let mut edges: Vec<(Point, Point)> =
            self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 1 {
            if let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) {
                edges.push((last, first));
            }
        }
        edges
    }

    /// Even-odd point containment; polygons with fewer than 3 vertices contain nothing
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let pts = &self.points;
        if pts.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (pi, pj) = (pts[i], pts[j]);
            if (pi.y > y) != (pj.y > y) {
                let x_cross = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// One polygon per ROI type. Cloning copies every vertex list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoiCoords {
    polygons: [Polygon; RoiType::COUNT],
}

impl RoiCoords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate `(type, polygon)` pairs in ROI order
    pub fn iter(&self) -> impl Iterator<Item = (RoiType, &Polygon)> {
        RoiType::ALL.into_iter().zip(self.polygons.iter())
    }

    /// True when no ROI type has any vertex
    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(Polygon::is_empty)
    }
}

impl Index<RoiType> for RoiCoords {
    type Output = Polygon;

    fn index(&self, roi: RoiType) -> &Polygon {
        &self.polygons[roi.index()]
    }
}

impl IndexMut<RoiType> for RoiCoords {
    fn index_mut(&mut self, roi: RoiType) -> &mut Polygon {
        &mut self.polygons[roi.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        let mut poly = Polygon::default();
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            poly.push(Point::new(x, y));
        }
        poly
    }

    #[test]
    fn test_every_roi_has_an_entry() {
        let coords = RoiCoords::new();
        assert_eq!(coords.iter().count(), RoiType::COUNT);
        assert!(coords.is_empty());
    }

    #[test]
    fn test_roi_key_round_trip() {
        for roi in RoiType::ALL {
            assert_eq!(roi.key().parse::<RoiType>().unwrap(), roi);
        }
        assert_eq!("SKY".parse::<RoiType>().unwrap(), RoiType::Sky);
        assert!("tree".parse::<RoiType>().is_err());
    }

    #[test]
    fn test_edges_include_closing_edge() {
        let mut poly = square();
        assert_eq!(poly.edges().len(), 3);

        poly.closed = true;
        let edges = poly.edges();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Point::new(0.0, 10.0), Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_push_reopens_closed_polygon() {
        let mut poly = square();
        poly.closed = true;
        poly.push(Point::new(5.0, 5.0));
        assert!(!poly.closed);
    }

    #[test]
    fn test_contains() {
        let poly = square();
        assert!(poly.contains(5.0, 5.0));
        assert!(!poly.contains(15.0, 5.0));
        assert!(!poly.contains(5.0, -1.0));

        let mut line = Polygon::default();
        line.push(Point::new(0.0, 0.0));
        line.push(Point::new(10.0, 10.0));
        assert!(!line.contains(5.0, 5.0));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = RoiCoords::new();
        a[RoiType::Sky] = square();

        let mut b = a.clone();
        b[RoiType::Sky].push(Point::new(1.0, 1.0));

        assert_eq!(a[RoiType::Sky].len(), 4);
        assert_eq!(b[RoiType::Sky].len(), 5);
    }
}
