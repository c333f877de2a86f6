//! Colour parameter parsing

use crate::ParamValue;

/// Parse a colour parameter into linear RGBA
///
/// Accepts a colour name, a whitespace-separated `"r g b [a]"` string, or a
/// three/four component vector. Alpha defaults to 1.
pub fn parse_color(value: &ParamValue) -> Option<[f32; 4]> {
    match value {
        ParamValue::Text(text) => named(text).or_else(|| {
            let parts = text
                .split_whitespace()
                .map(|s| s.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            from_components(&parts)
        }),
        ParamValue::Vector(v) => from_components(v),
        _ => None,
    }
}

fn named(name: &str) -> Option<[f32; 4]> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "white" => [1.0, 1.0, 1.0],
        "black" => [0.0, 0.0, 0.0],
        "red" => [1.0, 0.0, 0.0],
        "green" => [0.0, 1.0, 0.0],
        "blue" => [0.0, 0.0, 1.0],
        "gray" | "grey" => [0.5, 0.5, 0.5],
        "yellow" => [1.0, 1.0, 0.0],
        "cyan" => [0.0, 1.0, 1.0],
        "magenta" => [1.0, 0.0, 1.0],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 1.0])
}

fn from_components(c: &[f64]) -> Option<[f32; 4]> {
    match c {
        [r, g, b] => Some([*r as f32, *g as f32, *b as f32, 1.0]),
        [r, g, b, a] => Some([*r as f32, *g as f32, *b as f32, *a as f32]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named() {
        assert_eq!(parse_color(&"white".into()), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_color(&"Grey".into()), Some([0.5, 0.5, 0.5, 1.0]));
        assert_eq!(parse_color(&"chartreuse".into()), None);
    }

    #[test]
    fn test_component_string() {
        assert_eq!(parse_color(&"1 0 0".into()), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color(&"0 0 1 0.5".into()), Some([0.0, 0.0, 1.0, 0.5]));
        assert_eq!(parse_color(&"1 0".into()), None);
    }

    #[test]
    fn test_vector() {
        assert_eq!(parse_color(&[0.2, 0.4, 0.6].into()), Some([0.2, 0.4, 0.6, 1.0]));
        assert_eq!(parse_color(&ParamValue::Bool(true)), None);
    }
}
