//! Scene lights and their uniform block layouts
//!
//! Lights come in two kinds, directional and point. Per frame they are
//! staged into fixed-capacity [`LightBlock`]s whose byte image matches the
//! shader-side block:
//!
//! ```text
//! uint  count;      // 4 bytes
//! vec3  padding;    // 12 bytes
//! Light lights[N];  // N * 32 bytes, 16-byte aligned entries
//! ```

// bytemuck's Pod derive expands to unsafe impls
#![allow(unsafe_code)]

use std::fmt;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::foundation::math::{pack_vec4, Vec3};

/// Directional lights per frame
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Point lights per frame
pub const MAX_POINT_LIGHTS: usize = 16;

/// Light kind, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Parallel rays from infinitely far away
    Directional,
    /// Omnidirectional light with a finite radius
    Point,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directional => f.write_str("directional"),
            Self::Point => f.write_str("point"),
        }
    }
}

/// Directional light (like sunlight)
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, normalized
    pub direction: Vec3,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Whether this light renders a shadow map
    pub cast_shadows: bool,
}

impl DirectionalLight {
    /// Create a shadow-casting directional light
    ///
    /// A zero or non-finite `direction` is stored as zero, which
    /// [`DirectionalLight::validate`] rejects.
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction
                .try_normalize(f32::EPSILON)
                .filter(|d| d.iter().all(|c| c.is_finite()))
                .unwrap_or_else(Vec3::zeros),
            color,
            intensity,
            cast_shadows: true,
        }
    }

    /// Builder-style shadow toggle
    pub fn with_shadows(mut self, cast_shadows: bool) -> Self {
        self.cast_shadows = cast_shadows;
        self
    }

    /// Check the light has a usable direction and finite color
    pub fn validate(&self) -> Result<(), String> {
        let length = self.direction.norm();
        if !length.is_finite() || length <= f32::EPSILON {
            return Err(format!("direction {:?} has no usable length", self.direction));
        }
        check_finite(&self.color, self.intensity)
    }
}

fn check_finite(color: &Vec3, intensity: f32) -> Result<(), String> {
    if !color.iter().all(|c| c.is_finite()) || !intensity.is_finite() {
        return Err(format!("color {color:?} or intensity {intensity} is not finite"));
    }
    Ok(())
}

/// Point light (like a lightbulb)
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Distance at which the light's contribution reaches zero
    pub radius: f32,
}

impl PointLight {
    /// Create a point light
    pub fn new(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            radius,
        }
    }

    /// Check position, color and radius are usable
    pub fn validate(&self) -> Result<(), String> {
        if !self.position.iter().all(|c| c.is_finite()) {
            return Err(format!("position {:?} is not finite", self.position));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(format!("radius must be positive, got {}", self.radius));
        }
        check_finite(&self.color, self.intensity)
    }
}

/// One light submitted to the scene renderer
#[derive(Debug, Clone, PartialEq)]
pub enum SceneLightData {
    /// See [`DirectionalLight`]
    Directional(DirectionalLight),
    /// See [`PointLight`]
    Point(PointLight),
}

impl SceneLightData {
    /// Kind of light
    pub fn kind(&self) -> LightKind {
        match self {
            Self::Directional(_) => LightKind::Directional,
            Self::Point(_) => LightKind::Point,
        }
    }

    /// See [`DirectionalLight::validate`] and [`PointLight::validate`]
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Directional(light) => light.validate(),
            Self::Point(light) => light.validate(),
        }
    }
}

impl From<DirectionalLight> for SceneLightData {
    fn from(light: DirectionalLight) -> Self {
        Self::Directional(light)
    }
}

impl From<PointLight> for SceneLightData {
    fn from(light: PointLight) -> Self {
        Self::Point(light)
    }
}

/// GPU layout of a directional light
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    /// xyz = direction, w = intensity
    pub direction: [f32; 4],
    /// rgb = color, w = 1.0 if the light casts shadows
    pub color: [f32; 4],
}

impl From<&DirectionalLight> for DirectionalLightData {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            direction: pack_vec4(&light.direction, light.intensity),
            color: pack_vec4(&light.color, if light.cast_shadows { 1.0 } else { 0.0 }),
        }
    }
}

/// GPU layout of a point light
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    /// xyz = position, w = radius
    pub position: [f32; 4],
    /// rgb = color, w = intensity
    pub color: [f32; 4],
}

impl From<&PointLight> for PointLightData {
    fn from(light: &PointLight) -> Self {
        Self {
            position: pack_vec4(&light.position, light.radius),
            color: pack_vec4(&light.color, light.intensity),
        }
    }
}

/// Returned when a [`LightBlock`] is already full
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("light block is full ({capacity} entries)")]
pub struct LightCapacityExceeded {
    /// Block capacity
    pub capacity: usize,
}

/// Size of the `count` + padding header in bytes
pub const LIGHT_BLOCK_HEADER_SIZE: usize = 16;

/// Fixed-capacity staging block for one light kind
///
/// `push` never writes past `N`; the count only covers accepted entries and
/// unused slots stay zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct LightBlock<T: Pod, const N: usize> {
    count: u32,
    lights: [T; N],
}

/// Staging block for directional lights
pub type DirectionalLightBlock = LightBlock<DirectionalLightData, MAX_DIRECTIONAL_LIGHTS>;

/// Staging block for point lights
pub type PointLightBlock = LightBlock<PointLightData, MAX_POINT_LIGHTS>;

impl<T: Pod, const N: usize> Default for LightBlock<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod, const N: usize> LightBlock<T, N> {
    /// Maximum number of entries
    pub const CAPACITY: usize = N;

    /// Size of the block's byte image
    pub const GPU_SIZE: usize = LIGHT_BLOCK_HEADER_SIZE + N * std::mem::size_of::<T>();

    /// Empty block
    pub fn new() -> Self {
        Self {
            count: 0,
            lights: [T::zeroed(); N],
        }
    }

    /// Append an entry, failing once the block is full
    pub fn push(&mut self, light: T) -> Result<(), LightCapacityExceeded> {
        let index = self.count as usize;
        if index >= N {
            return Err(LightCapacityExceeded { capacity: N });
        }
        self.lights[index] = light;
        self.count += 1;
        Ok(())
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.count = 0;
        self.lights = [T::zeroed(); N];
    }

    /// Number of accepted entries
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// True if no entries were accepted
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True if another push would fail
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Accepted entries in submission order
    pub fn as_slice(&self) -> &[T] {
        &self.lights[..self.len()]
    }

    /// Byte image uploaded to the uniform buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::GPU_SIZE);
        bytes.extend_from_slice(bytemuck::bytes_of(&self.count));
        bytes.resize(LIGHT_BLOCK_HEADER_SIZE, 0);
        bytes.extend_from_slice(bytemuck::cast_slice(&self.lights));
        bytes
    }

    /// Read the count field back out of a byte image
    pub fn count_from_bytes(bytes: &[u8]) -> Option<u32> {
        bytes
            .get(..4)
            .map(bytemuck::pod_read_unaligned::<u32>)
    }

    /// Read entry `index` back out of a byte image
    pub fn entry_from_bytes(bytes: &[u8], index: usize) -> Option<T> {
        let size = std::mem::size_of::<T>();
        let start = LIGHT_BLOCK_HEADER_SIZE + index * size;
        bytes.get(start..start + size).map(bytemuck::pod_read_unaligned::<T>)
    }
}
