/// Parse a CSS-flavoured color string into `[r, g, b, a]` with channels
/// 0–255 and alpha 0–1. Returns `None` on anything unrecognized; callers
/// surface that as a `ColorParse` runtime error.
pub fn parse_color(s: &str) -> Option<[f64; 4]> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        return parse_components(body, 4);
    }
    if let Some(body) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        return parse_components(body, 3);
    }
    named(s)
}

fn parse_hex(hex: &str) -> Option<[f64; 4]> {
    // length arms index by byte; multi-byte chars must fail, not split
    if !hex.is_ascii() {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(f64::from);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);
    match hex.len() {
        3 => Some([
            nibble(0)? * 17.0,
            nibble(1)? * 17.0,
            nibble(2)? * 17.0,
            1.0,
        ]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 1.0]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)? / 255.0]),
        _ => None,
    }
}

fn parse_components(body: &str, expected: usize) -> Option<[f64; 4]> {
    let parts: Vec<f64> = body
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != expected {
        return None;
    }
    let in_range = |x: f64| (0.0..=255.0).contains(&x);
    if !parts[..3].iter().all(|&x| in_range(x)) {
        return None;
    }
    let alpha = if expected == 4 { parts[3] } else { 1.0 };
    if !(0.0..=1.0).contains(&alpha) {
        return None;
    }
    Some([parts[0], parts[1], parts[2], alpha])
}

fn named(s: &str) -> Option<[f64; 4]> {
    let rgb = |r: f64, g: f64, b: f64| Some([r, g, b, 1.0]);
    match s.to_ascii_lowercase().as_str() {
        "black" => rgb(0.0, 0.0, 0.0),
        "white" => rgb(255.0, 255.0, 255.0),
        "red" => rgb(255.0, 0.0, 0.0),
        "green" => rgb(0.0, 128.0, 0.0),
        "blue" => rgb(0.0, 0.0, 255.0),
        "yellow" => rgb(255.0, 255.0, 0.0),
        "cyan" => rgb(0.0, 255.0, 255.0),
        "magenta" => rgb(255.0, 0.0, 255.0),
        "orange" => rgb(255.0, 165.0, 0.0),
        "purple" => rgb(128.0, 0.0, 128.0),
        "gray" | "grey" => rgb(128.0, 128.0, 128.0),
        "brown" => rgb(165.0, 42.0, 42.0),
        "pink" => rgb(255.0, 192.0, 203.0),
        "transparent" => Some([0.0, 0.0, 0.0, 0.0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(parse_color("#f00"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color("#00ff00"), Some([0.0, 255.0, 0.0, 1.0]));
        assert_eq!(parse_color("#0000ff00"), Some([0.0, 0.0, 255.0, 0.0]));
        assert_eq!(parse_color("#12345"), None);
        // multi-byte chars can land on a valid byte length
        assert_eq!(parse_color("#€"), None);
        assert_eq!(parse_color("#€€"), None);
    }

    #[test]
    fn functional_forms() {
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some([1.0, 2.0, 3.0, 1.0]));
        assert_eq!(parse_color("rgba(1, 2, 3, 0.5)"), Some([1.0, 2.0, 3.0, 0.5]));
        assert_eq!(parse_color("rgb(300, 0, 0)"), None);
        assert_eq!(parse_color("rgba(0, 0, 0, 2)"), None);
    }

    #[test]
    fn named_colors() {
        assert_eq!(parse_color("red"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color("RED"), Some([255.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color("not-a-color"), None);
    }
}
