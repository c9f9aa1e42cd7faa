//! HSL colour values as stored in the colour settings.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Expected three components \"H S% L%\", got {0}")]
    ComponentCount(usize),

    #[error("Invalid number in colour component: {0}")]
    InvalidNumber(String),
}

/// A colour in HSL space. Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    /// Parses `"H S% L%"`. Percent signs are optional and any whitespace
    /// separates components. Hue wraps into `[0, 360)`; saturation and
    /// lightness are clamped to `[0, 100]`.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ColorError::ComponentCount(parts.len()));
        }

        let number = |part: &str| -> Result<f64, ColorError> {
            let trimmed = part.strip_suffix('%').unwrap_or(part);
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| ColorError::InvalidNumber(part.to_string()))
        };

        Ok(Self {
            hue: number(parts[0])?.rem_euclid(360.0),
            saturation: number(parts[1])?.clamp(0.0, 100.0),
            lightness: number(parts[2])?.clamp(0.0, 100.0),
        })
    }

    pub fn to_rgb(&self) -> [u8; 3] {
        let h = self.hue / 360.0;
        let s = self.saturation / 100.0;
        let l = self.lightness / 100.0;

        if s == 0.0 {
            let c = channel(l);
            return [c, c, c];
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        [
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        ]
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Scales `[0, 1]` to a byte, rounding halves up.
fn channel(x: f64) -> u8 {
    (x * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// `"H S% L%"` to `#rrggbb`.
pub fn hsl_to_hex(value: &str) -> Result<String, ColorError> {
    Hsl::parse(value).map(|hsl| hsl.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_vectors() {
        assert_eq!(hsl_to_hex("0 0% 100%").unwrap(), "#ffffff");
        assert_eq!(hsl_to_hex("0 0% 0%").unwrap(), "#000000");
        assert_eq!(hsl_to_hex("120 100% 50%").unwrap(), "#00ff00");
        assert_eq!(hsl_to_hex("0 100% 50%").unwrap(), "#ff0000");
        assert_eq!(hsl_to_hex("240 100% 50%").unwrap(), "#0000ff");
    }

    #[test]
    fn test_mid_tones() {
        assert_eq!(hsl_to_hex("0 0% 50%").unwrap(), "#808080");
        assert_eq!(hsl_to_hex("60 100% 25%").unwrap(), "#808000");
        assert_eq!(hsl_to_hex("180 100% 75%").unwrap(), "#80ffff");
    }

    #[test]
    fn test_site_palette_within_one_unit() {
        // 130 45% 30%: reference rgb(42, 111, 54)
        let [r, g, b] = Hsl::parse("130 45% 30%").unwrap().to_rgb();
        assert!((r as i32 - 42).abs() <= 1);
        assert!((g as i32 - 111).abs() <= 1);
        assert!((b as i32 - 54).abs() <= 1);
    }

    #[test]
    fn test_lenient_parse() {
        assert_eq!(hsl_to_hex("120 100 50").unwrap(), "#00ff00");
        assert_eq!(hsl_to_hex("  120   100%  50% ").unwrap(), "#00ff00");
        assert_eq!(hsl_to_hex("480 100% 50%").unwrap(), "#00ff00");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(hsl_to_hex("120 100%"), Err(ColorError::ComponentCount(2)));
        assert_eq!(
            hsl_to_hex("red 100% 50%"),
            Err(ColorError::InvalidNumber("red".to_string()))
        );
        assert!(hsl_to_hex("NaN 1 1").is_err());
    }

    /// Chroma and sector formulation of the same conversion.
    fn reference_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
        let s = s / 100.0;
        let l = l / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h_prime = h / 60.0;
        let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h_prime as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        [(r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2048))]
        #[test]
        fn hex_within_one_unit_of_reference(
            h in 0.0_f64..360.0,
            s in 0.0_f64..=100.0,
            l in 0.0_f64..=100.0
        ) {
            let hex = hsl_to_hex(&format!("{} {}% {}%", h, s, l)).unwrap();
            prop_assert_eq!(hex.len(), 7);

            let expected = reference_rgb(h, s, l);
            for (i, want) in expected.iter().enumerate() {
                let got = u8::from_str_radix(&hex[1 + 2 * i..3 + 2 * i], 16).unwrap();
                prop_assert!(
                    (got as f64 - want).abs() <= 1.0,
                    "{} {}% {}% channel {}: got {} want {:.3}",
                    h, s, l, i, got, want
                );
            }
        }
    }
}
