//! sRGB to CIE-LAB conversion for perceptual color distance.
//!
//! Used by Smart Select to compare superpixel mean colors against the seed
//! cell. D65 reference white.

/// A CIE-LAB color (L in 0-100, a/b roughly -128..127).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

// D65 reference white
const XN: f32 = 0.95047;
const YN: f32 = 1.0;
const ZN: f32 = 1.08883;

const EPSILON: f32 = 0.008856;

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Convert an RGB triple (0.0-255.0 per channel) to LAB.
///
/// Takes floats so superpixel mean colors can be converted without rounding.
pub fn rgb_to_lab(r: f32, g: f32, b: f32) -> Lab {
    let r = srgb_to_linear(r / 255.0);
    let g = srgb_to_linear(g / 255.0);
    let b = srgb_to_linear(b / 255.0);

    // Linear RGB to XYZ (D65)
    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    let fx = lab_f(x / XN);
    let fy = lab_f(y / YN);
    let fz = lab_f(z / ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Euclidean distance in LAB (CIE76 delta E).
#[inline]
pub fn lab_distance(p: Lab, q: Lab) -> f32 {
    let dl = p.l - q.l;
    let da = p.a - q.a;
    let db = p.b - q.b;
    (dl * dl + da * da + db * db).sqrt()
}
