//! Fixed-point math utilities for deterministic simulation.
//!
//! All simulation math uses fixed-point arithmetic so that two clients
//! fed the same deltas and seed produce bit-identical matches.
//! Floating-point only ever appears at the authored-data boundary
//! (see [`fixed_decimal`]).

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`.
///
/// Serializes optional fixed-point numbers via their raw bit representation,
/// preserving `None` as a serialized `None` value.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(Fixed::to_bits).serialize(serializer)
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

/// Decimal serde support for authored data files.
///
/// Match configs are written by hand, so `1.5` reads better than the raw
/// bit pattern. Parsing a decimal literal is correctly rounded, so the
/// resulting fixed-point value is identical on every platform.
pub mod fixed_decimal {
    use super::Fixed;
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range")))
    }

    /// Decimal serde for `Option<Fixed>`.
    pub mod option {
        use super::Fixed;
        use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

        /// Serialize an optional fixed-point number as a decimal.
        pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            value.map(|v| v.to_num::<f64>()).serialize(serializer)
        }

        /// Deserialize an optional fixed-point number from a decimal.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<f64>::deserialize(deserializer)? {
                Some(value) => Fixed::checked_from_num(value).map(Some).ok_or_else(|| {
                    D::Error::custom(format!("{value} is out of fixed-point range"))
                }),
                None => Ok(None),
            }
        }
    }

    /// Decimal serde for [`Vec2Fixed`](crate::math::Vec2Fixed) written as `(x, y)`.
    pub mod vec2 {
        use crate::math::{Fixed, Vec2Fixed};
        use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

        /// Serialize a vector as an `(x, y)` decimal pair.
        pub fn serialize<S>(value: &Vec2Fixed, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            (value.x.to_num::<f64>(), value.y.to_num::<f64>()).serialize(serializer)
        }

        /// Deserialize a vector from an `(x, y)` decimal pair.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec2Fixed, D::Error>
        where
            D: Deserializer<'de>,
        {
            let (x, y) = <(f64, f64)>::deserialize(deserializer)?;
            match (Fixed::checked_from_num(x), Fixed::checked_from_num(y)) {
                (Some(x), Some(y)) => Ok(Vec2Fixed::new(x, y)),
                _ => Err(D::Error::custom(format!(
                    "({x}, {y}) is out of fixed-point range"
                ))),
            }
        }
    }

    /// Decimal serde for [`Rect`](crate::math::Rect) written as
    /// `(center: (x, y), size: (w, h))`.
    pub mod rect {
        use crate::math::{Rect, Vec2Fixed};
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        #[derive(Serialize, Deserialize)]
        struct Authored {
            #[serde(with = "super::vec2")]
            center: Vec2Fixed,
            #[serde(with = "super::vec2")]
            size: Vec2Fixed,
        }

        /// Serialize a rectangle with decimal corners.
        pub fn serialize<S>(value: &Rect, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            Authored {
                center: value.center,
                size: value.size,
            }
            .serialize(serializer)
        }

        /// Deserialize a rectangle with decimal corners.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Rect, D::Error>
        where
            D: Deserializer<'de>,
        {
            let authored = Authored::deserialize(deserializer)?;
            Ok(Rect::new(authored.center, authored.size))
        }

        /// Decimal serde for `Option<Rect>`.
        pub mod option {
            use super::Authored;
            use crate::math::Rect;
            use serde::{Deserialize, Deserializer, Serialize, Serializer};

            /// Serialize an optional rectangle with decimal corners.
            pub fn serialize<S>(value: &Option<Rect>, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                value
                    .map(|rect| Authored {
                        center: rect.center,
                        size: rect.size,
                    })
                    .serialize(serializer)
            }

            /// Deserialize an optional rectangle with decimal corners.
            pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Rect>, D::Error>
            where
                D: Deserializer<'de>,
            {
                Ok(Option::<Authored>::deserialize(deserializer)?
                    .map(|authored| Rect::new(authored.center, authored.size)))
            }
        }
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer coordinates.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Unit vector pointing along +X.
    pub const RIGHT: Self = Self {
        x: Fixed::ONE,
        y: Fixed::ZERO,
    };

    /// Unit vector pointing along -X.
    pub const LEFT: Self = Self {
        x: Fixed::NEG_ONE,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Check whether `other` lies within `radius` of this point (inclusive).
    #[must_use]
    pub fn within(self, other: Self, radius: Fixed) -> bool {
        self.distance_squared(other) <= radius.saturating_mul(radius)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Scale both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(
            self.x.saturating_mul(factor),
            self.y.saturating_mul(factor),
        )
    }

    /// Normalize vector using fixed-point math.
    ///
    /// Returns the zero vector for zero-length input.
    #[must_use]
    pub fn normalize(self) -> Self {
        // Axis-aligned vectors are common (default headings) and normalize exactly.
        if self.y == Fixed::ZERO {
            return Self::new(self.x.signum(), Fixed::ZERO);
        }
        if self.x == Fixed::ZERO {
            return Self::new(Fixed::ZERO, self.y.signum());
        }

        let len = self.distance(Self::ZERO);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }
}

/// Computes the square root of a fixed-point number using binary search.
fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    // 64 halvings exhaust the I32F32 resolution over the whole range.
    for _ in 0..64 {
        let mid = low + (high - low) / Fixed::from_num(2);
        if mid == low {
            break;
        }
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Axis-aligned rectangle described by its center and full size.
///
/// Used both for unit movement bounds and for summon/placement areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Center of the rectangle.
    pub center: Vec2Fixed,
    /// Full width (x) and height (y).
    pub size: Vec2Fixed,
}

impl Rect {
    /// Create a rectangle from its center and full size.
    #[must_use]
    pub const fn new(center: Vec2Fixed, size: Vec2Fixed) -> Self {
        Self { center, size }
    }

    /// Lower corner.
    #[must_use]
    pub fn min(&self) -> Vec2Fixed {
        let half = self.half_extents();
        self.center - half
    }

    /// Upper corner.
    #[must_use]
    pub fn max(&self) -> Vec2Fixed {
        let half = self.half_extents();
        self.center + half
    }

    fn half_extents(&self) -> Vec2Fixed {
        Vec2Fixed::new(self.size.x / Fixed::from_num(2), self.size.y / Fixed::from_num(2))
    }

    /// Clamp a point into the rectangle, each axis independently.
    #[must_use]
    pub fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        let min = self.min();
        let max = self.max();
        Vec2Fixed::new(point.x.clamp(min.x, max.x), point.y.clamp(min.y, max.y))
    }

    /// Check whether a point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        self.clamp(point) == point
    }
}
