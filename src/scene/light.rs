//! Light descriptions
//!
//! Pure data attached to scene nodes; the closed set of kinds is dispatched
//! by matching, never by downcasting. Consumers (a render layer, not this
//! crate) read a node's world matrix for the light's placement.

use crate::math::Vector3;

/// The closed set of light kinds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Light {
    /// Parallel rays along the node's -Z axis, like sunlight.
    Directional {
        /// RGB color in `[0, 1]`
        color: Vector3,
        /// Intensity multiplier
        intensity: f64,
    },
    /// Radiates in all directions from the node's position.
    Point {
        /// RGB color in `[0, 1]`
        color: Vector3,
        /// Intensity multiplier
        intensity: f64,
        /// Maximum reach; zero means unbounded
        range: f64,
        /// Falloff exponent over the range
        decay: f64,
    },
    /// A cone of light along the node's -Z axis.
    Spot {
        /// RGB color in `[0, 1]`
        color: Vector3,
        /// Intensity multiplier
        intensity: f64,
        /// Maximum reach; zero means unbounded
        range: f64,
        /// Falloff exponent over the range
        decay: f64,
        /// Half-angle of the full cone, radians
        angle: f64,
        /// Fraction of the cone over which the edge softens, `[0, 1]`
        penumbra: f64,
    },
    /// Uniform light with no position or direction.
    Ambient {
        /// RGB color in `[0, 1]`
        color: Vector3,
        /// Intensity multiplier
        intensity: f64,
    },
    /// Sky/ground gradient light along the node's +Y axis.
    Hemisphere {
        /// Sky color in `[0, 1]`
        sky_color: Vector3,
        /// Ground color in `[0, 1]`
        ground_color: Vector3,
        /// Intensity multiplier
        intensity: f64,
    },
}

impl Light {
    /// Directional light.
    #[must_use]
    pub fn directional(color: Vector3, intensity: f64) -> Self {
        Self::Directional { color, intensity }
    }

    /// Point light with unbounded range and physical decay.
    #[must_use]
    pub fn point(color: Vector3, intensity: f64) -> Self {
        Self::Point {
            color,
            intensity,
            range: 0.0,
            decay: 2.0,
        }
    }

    /// Spot light with the given cone half-angle.
    #[must_use]
    pub fn spot(color: Vector3, intensity: f64, angle: f64) -> Self {
        Self::Spot {
            color,
            intensity,
            range: 0.0,
            decay: 2.0,
            angle,
            penumbra: 0.0,
        }
    }

    /// Ambient light.
    #[must_use]
    pub fn ambient(color: Vector3, intensity: f64) -> Self {
        Self::Ambient { color, intensity }
    }

    /// Hemisphere light.
    #[must_use]
    pub fn hemisphere(sky_color: Vector3, ground_color: Vector3, intensity: f64) -> Self {
        Self::Hemisphere {
            sky_color,
            ground_color,
            intensity,
        }
    }

    /// The light's intensity multiplier, whatever the kind.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        match self {
            Self::Directional { intensity, .. }
            | Self::Point { intensity, .. }
            | Self::Spot { intensity, .. }
            | Self::Ambient { intensity, .. }
            | Self::Hemisphere { intensity, .. } => *intensity,
        }
    }
}
