use ahash::RandomState;
use std::collections::HashMap as StdHashMap;

pub const SQRT_3: f32 = 1.732_050_8;

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;

/// Clamp a value into `[0, 1]`. NaN collapses to 0 so a bad intensity can
/// never escape the unit range.
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Wraps degrees into `[0, 360)`
pub fn wrap_hue(hue: f32) -> f32 {
    hue.rem_euclid(360.0)
}

/// Converts HSL (hue in degrees, saturation and lightness in `[0, 1]`) to 8-bit
/// RGB, following the CSS `hsl()` definition.
pub fn hsl_to_rgb8(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let h = wrap_hue(hue) / 60.0;
    let s = clamp01(saturation);
    let l = clamp01(lightness);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - chroma / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let to_u8 = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// True when two hues name the same palette entry
pub fn same_hue(a: f32, b: f32) -> bool {
    let diff = (wrap_hue(a) - wrap_hue(b)).abs();
    diff < 0.5 || diff > 359.5
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[macro_export]
    macro_rules! assert_approx_eq {
        ($a:expr, $b:expr) => {
            assert!(
                ($a - $b).abs() < 0.001,
                "Values not approximately equal: {} and {}, difference: {}",
                $a,
                $b,
                ($a - $b).abs()
            );
        };
        ($a:expr, $b:expr, $epsilon:expr) => {
            assert!(
                ($a - $b).abs() < $epsilon,
                "Values not approximately equal:
                    {} and {}, difference: {}, tolerance: {}",
                $a,
                $b,
                ($a - $b).abs(),
                $epsilon
            );
        };
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb8(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb8(120.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb8(240.0, 1.0, 0.5), [0, 0, 255]);
        assert_eq!(hsl_to_rgb8(0.0, 0.0, 1.0), [255, 255, 255]);
    }

    #[test]
    fn test_hsl_neon_green() {
        // hsl(120, 100%, 60%)
        assert_eq!(hsl_to_rgb8(120.0, 1.0, 0.6), [51, 255, 51]);
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(-0.2), 0.0);
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_approx_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn test_same_hue_wraps() {
        assert!(same_hue(360.0, 0.0));
        assert!(same_hue(190.2, 190.0));
        assert!(!same_hue(190.0, 300.0));
    }
}
