use std::f64::consts::PI;

use kurbo::{BezPath, Circle, Rect, Shape};

/// Outline of a node symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolShape {
    /// Axis aligned square.
    Square,
    /// Circle.
    Circle,
    /// Triangle with a vertex at the top.
    Triangle,
    /// Pentagon with a vertex at the top.
    Pentagon,
    /// Hexagon.
    Hexagon,
    /// Heptagon with a vertex at the top.
    Heptagon,
    /// Octagon.
    Octagon,
    /// Nonagon with a vertex at the top.
    Nonagon,
    /// Decagon.
    Decagon,
}

impl SymbolShape {
    /// Shape named by a style keyword such as `"triangle"`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword.trim().to_ascii_lowercase().as_str() {
            "square" => Self::Square,
            "circle" => Self::Circle,
            "triangle" => Self::Triangle,
            "pentagon" => Self::Pentagon,
            "hexagon" => Self::Hexagon,
            "heptagon" => Self::Heptagon,
            "octagon" => Self::Octagon,
            "nonagon" => Self::Nonagon,
            "decagon" => Self::Decagon,
            _ => return None,
        })
    }

    /// Number of polygon sides; the circle reports 1.
    pub fn sides(self) -> u32 {
        match self {
            Self::Square => 4,
            Self::Circle => 1,
            Self::Triangle => 3,
            Self::Pentagon => 5,
            Self::Hexagon => 6,
            Self::Heptagon => 7,
            Self::Octagon => 8,
            Self::Nonagon => 9,
            Self::Decagon => 10,
        }
    }

    /// Rotation subtracted from every vertex angle.
    pub fn rotation(self) -> f64 {
        match self {
            Self::Square => PI / 4.0,
            Self::Circle | Self::Hexagon | Self::Decagon => 0.0,
            Self::Octagon => PI / 8.0,
            Self::Triangle | Self::Pentagon | Self::Heptagon | Self::Nonagon => PI / 2.0,
        }
    }

    /// Outline of size `size` centred at `(x, y)`.
    pub fn shape_around(self, x: f64, y: f64, size: f64) -> BezPath {
        let radius = size / 2.0;
        match self {
            Self::Square => Rect::new(x - radius, y - radius, x + radius, y + radius).to_path(0.1),
            Self::Circle => Circle::new((x, y), radius).to_path(0.1),
            _ => self.polygon(x, y, radius),
        }
    }

    fn polygon(self, cx: f64, cy: f64, radius: f64) -> BezPath {
        let sides = self.sides();
        let mut path = BezPath::new();
        for i in 0..sides {
            let angle = (2.0 * PI / f64::from(sides)) * f64::from(i) - self.rotation();
            let p = (cx + radius * angle.cos(), cy + radius * angle.sin());
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path.close_path();
        path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/symbol.rs"]
mod tests;
