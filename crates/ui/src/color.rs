use gpui::{Hsla, hsla};

/// Create a [`Hsla`] color from CSS-style values.
///
/// - h: Hue (0.0 to 360.0)
/// - s: Saturation (0.0 to 100.0)
/// - l: Lightness (0.0 to 100.0)
pub fn hsl(h: f32, s: f32, l: f32) -> Hsla {
    hsla(h / 360., s / 100., l / 100., 1.)
}

/// Parse a CSS color string into a [`Hsla`].
///
/// Supported forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)`, `hsl(h, s%, l%)`, `hsla(h, s%, l%, a)` and a small set
/// of keywords. Returns `None` for anything else.
pub fn parse_color(value: &str) -> Option<Hsla> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(&value, "rgba").or_else(|| function_args(&value, "rgb")) {
        return parse_rgb_args(&args);
    }
    if let Some(args) = function_args(&value, "hsla").or_else(|| function_args(&value, "hsl")) {
        return parse_hsl_args(&args);
    }

    match value.as_str() {
        "black" => Some(hsla(0., 0., 0., 1.)),
        "white" => Some(hsla(0., 0., 1., 1.)),
        "red" => Some(hsla(0., 1., 0.5, 1.)),
        "yellow" => Some(hsl(60., 100., 50.)),
        "green" => Some(hsl(120., 100., 25.1)),
        "cyan" | "aqua" => Some(hsl(180., 100., 50.)),
        "blue" => Some(hsl(240., 100., 50.)),
        "magenta" | "fuchsia" => Some(hsl(300., 100., 50.)),
        "gray" | "grey" => Some(hsla(0., 0., 0.5, 1.)),
        "transparent" => Some(hsla(0., 0., 0., 0.)),
        _ => None,
    }
}

fn function_args(value: &str, name: &str) -> Option<Vec<String>> {
    let rest = value.strip_prefix(name)?.trim();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split([',', ' '])
            .filter(|part| !part.is_empty())
            .map(|part| part.trim().to_string())
            .collect(),
    )
}

fn parse_hex(hex: &str) -> Option<Hsla> {
    let expand = |c: u8| (c << 4) | c;
    let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
    let digits: Vec<u8> = hex.chars().map(nibble).collect::<Option<_>>()?;

    let (r, g, b, a) = match digits.len() {
        3 => (expand(digits[0]), expand(digits[1]), expand(digits[2]), 255),
        4 => (
            expand(digits[0]),
            expand(digits[1]),
            expand(digits[2]),
            expand(digits[3]),
        ),
        6 => (
            (digits[0] << 4) | digits[1],
            (digits[2] << 4) | digits[3],
            (digits[4] << 4) | digits[5],
            255,
        ),
        8 => (
            (digits[0] << 4) | digits[1],
            (digits[2] << 4) | digits[3],
            (digits[4] << 4) | digits[5],
            (digits[6] << 4) | digits[7],
        ),
        _ => return None,
    };

    Some(rgb_to_hsla(
        r as f32 / 255.,
        g as f32 / 255.,
        b as f32 / 255.,
        a as f32 / 255.,
    ))
}

fn parse_rgb_args(args: &[String]) -> Option<Hsla> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<f32> {
        let v: f32 = s.parse().ok()?;
        Some((v / 255.).clamp(0., 1.))
    };
    let r = channel(&args[0])?;
    let g = channel(&args[1])?;
    let b = channel(&args[2])?;
    let a = match args.get(3) {
        Some(s) => s.parse::<f32>().ok()?.clamp(0., 1.),
        None => 1.,
    };
    Some(rgb_to_hsla(r, g, b, a))
}

fn parse_hsl_args(args: &[String]) -> Option<Hsla> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let h: f32 = args[0].parse().ok()?;
    let percent = |s: &str| -> Option<f32> {
        let v: f32 = s.strip_suffix('%').unwrap_or(s).parse().ok()?;
        Some((v / 100.).clamp(0., 1.))
    };
    let s = percent(&args[1])?;
    let l = percent(&args[2])?;
    let a = match args.get(3) {
        Some(v) => v.parse::<f32>().ok()?.clamp(0., 1.),
        None => 1.,
    };
    Some(hsla(h.rem_euclid(360.) / 360., s, l, a))
}

/// Convert sRGB channels (0.0 to 1.0) into a [`Hsla`].
pub(crate) fn rgb_to_hsla(r: f32, g: f32, b: f32, a: f32) -> Hsla {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.;

    if max == min {
        return hsla(0., 0., l, a);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2. - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.)
    } else if max == g {
        (b - r) / d + 2.
    } else {
        (r - g) / d + 4.
    };

    hsla(h / 6., s, l, a)
}

pub(crate) mod serde_color {
    use super::parse_color;
    use gpui::Hsla;
    use serde::{Deserialize, Deserializer, de};

    pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Hsla>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(value) => parse_color(&value)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid color: {:?}", value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn hsla_approx_eq(a: Hsla, b: Hsla) -> bool {
        approx_eq(a.h, b.h) && approx_eq(a.s, b.s) && approx_eq(a.l, b.l) && approx_eq(a.a, b.a)
    }

    #[test]
    fn test_parse_hex() {
        assert!(hsla_approx_eq(
            parse_color("#f00").unwrap(),
            hsla(0., 1., 0.5, 1.)
        ));
        assert!(hsla_approx_eq(
            parse_color("#00f").unwrap(),
            hsl(240., 100., 50.)
        ));
        assert!(hsla_approx_eq(
            parse_color("#ff0000").unwrap(),
            hsla(0., 1., 0.5, 1.)
        ));
        assert!(hsla_approx_eq(
            parse_color("#ffffff").unwrap(),
            hsla(0., 0., 1., 1.)
        ));
        // 4 and 8 digit forms carry alpha.
        assert!(hsla_approx_eq(
            parse_color("#f00f").unwrap(),
            hsla(0., 1., 0.5, 1.)
        ));
        assert!(approx_eq(parse_color("#ff000080").unwrap().a, 128. / 255.));
    }

    #[test]
    fn test_parse_functions() {
        assert!(hsla_approx_eq(
            parse_color("rgb(255, 0, 0)").unwrap(),
            hsla(0., 1., 0.5, 1.)
        ));
        assert!(hsla_approx_eq(
            parse_color("rgba(255,255,255,0)").unwrap(),
            hsla(0., 0., 1., 0.)
        ));
        assert!(hsla_approx_eq(
            parse_color("hsl(120, 90%, 50%)").unwrap(),
            hsl(120., 90., 50.)
        ));
        assert!(hsla_approx_eq(
            parse_color("hsla(240, 100%, 50%, 0.5)").unwrap(),
            hsla(240. / 360., 1., 0.5, 0.5)
        ));
    }

    #[test]
    fn test_parse_keywords() {
        assert!(hsla_approx_eq(
            parse_color("white").unwrap(),
            hsla(0., 0., 1., 1.)
        ));
        assert!(hsla_approx_eq(
            parse_color("Transparent").unwrap(),
            hsla(0., 0., 0., 0.)
        ));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("rgb(1,2)"), None);
        assert_eq!(parse_color("url(#gradient)"), None);
        assert_eq!(parse_color("hsl(a, b%, c%)"), None);
    }
}
