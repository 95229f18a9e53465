//! Render material derivation and color packing

use serde::Serialize;

/// Pack an RGB color and opacity into a signed 32-bit ARGB value
///
/// Channel order is `[alpha, red, green, blue]`, packed big-endian and
/// reinterpreted as a signed 32-bit integer. This is the packed-color
/// convention of the target renderer; fully opaque colors with a red
/// component of 128 or more come out negative.
///
/// Alpha is the opacity scaled to 0-255 and truncated; opacity is clamped to
/// `[0.0, 1.0]` first.
///
/// # Arguments
/// * `color` - RGB channels, 0-255 each
/// * `opacity` - Opacity in 0.0-1.0, 1.0 fully opaque
///
/// # Returns
/// The packed ARGB value
///
/// # Example
/// ```
/// use cadscene::material::pack_argb;
///
/// // Opaque red packs to 0xFFFF0000, which is negative as an i32
/// assert_eq!(pack_argb([255, 0, 0], 1.0), -65536);
/// ```
pub fn pack_argb(color: [u8; 3], opacity: f64) -> i32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    i32::from_be_bytes([alpha, color[0], color[1], color[2]])
}

/// Material attached to a geometry definition in the output scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderMaterial {
    /// Material name, derived from the owning definition
    pub name: String,
    /// Diffuse color as a packed signed ARGB value
    pub diffuse: i32,
    /// Opacity in 0.0-1.0, kept alongside the packed alpha channel
    pub opacity: f64,
}

impl RenderMaterial {
    /// Create a material from source color properties
    ///
    /// # Arguments
    /// * `name` - Material name
    /// * `color` - RGB channels, 0-255 each
    /// * `opacity` - Opacity in 0.0-1.0
    pub fn new(name: impl Into<String>, color: [u8; 3], opacity: f64) -> Self {
        Self {
            name: name.into(),
            diffuse: pack_argb(color, opacity),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}
