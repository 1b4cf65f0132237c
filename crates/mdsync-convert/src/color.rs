//! Highlight colour mapping.
//!
//! Confluence only renders a handful of highlight colours well, so arbitrary
//! CSS colours coming from Markdown are snapped to the closest entry of a
//! fixed palette of background/foreground pairs.

/// An RGB triple. Alpha channels are discarded during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A palette entry: a named background/foreground pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub background: &'static str,
    pub foreground: &'static str,
}

/// Supported highlight colours, in tie-breaking order.
pub const PALETTE: [PaletteEntry; 8] = [
    entry("yellow", "#FFFAE6", "#974F0C"),
    entry("blue", "#DEEBFF", "#0747A6"),
    entry("green", "#E3FCEF", "#006644"),
    entry("red", "#FFEBE6", "#BF2600"),
    entry("purple", "#EAE6FF", "#403294"),
    entry("teal", "#E6FCFF", "#008DA6"),
    entry("gray", "#F4F5F7", "#42526E"),
    entry("orange", "#FFF0E6", "#B65C02"),
];

/// Entry used when a colour cannot be parsed.
pub const FALLBACK: PaletteEntry = PALETTE[3];

const fn entry(name: &'static str, background: &'static str, foreground: &'static str) -> PaletteEntry {
    PaletteEntry {
        name,
        background,
        foreground,
    }
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a CSS colour.
    ///
    /// Accepts `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb(..)` and `rgba(..)`
    /// with integer or percentage components. Returns `None` for anything else.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        parse_functional(args)
    }

    fn distance(self, other: Self) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db).unsigned_abs()
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 | 4 => {
            let digit = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
            Some(Color::new(digit(0)?, digit(1)?, digit(2)?))
        }
        6 | 8 => Some(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    Some(Color::new(
        parse_component(parts[0])?,
        parse_component(parts[1])?,
        parse_component(parts[2])?,
    ))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_component(part: &str) -> Option<u8> {
    if let Some(percent) = part.strip_suffix('%') {
        let value: f64 = percent.trim().parse().ok()?;
        let scaled = (value.clamp(0.0, 100.0) * 255.0 / 100.0).round();
        return Some(scaled as u8);
    }
    let value: f64 = part.parse().ok()?;
    Some(value.clamp(0.0, 255.0).round() as u8)
}

/// Palette entry closest to `(r, g, b)` by squared RGB distance.
///
/// Distances are measured against each entry's background. Ties go to the
/// entry declared first.
#[must_use]
pub fn nearest_palette(r: u8, g: u8, b: u8) -> PaletteEntry {
    let target = Color::new(r, g, b);
    let mut best = PALETTE[0];
    let mut best_distance = u32::MAX;
    for candidate in PALETTE {
        let Some(bg) = Color::parse(candidate.background) else {
            continue;
        };
        let distance = target.distance(bg);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}

/// Map a CSS colour string to a palette entry, falling back to red.
#[must_use]
pub fn palette_for(css: &str) -> PaletteEntry {
    match Color::parse(css) {
        Some(c) => nearest_palette(c.r, c.g, c.b),
        None => {
            tracing::debug!(color = css, "Unparseable highlight colour, using fallback");
            FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_six_digits() {
        assert_eq!(Color::parse("#FFEBE6"), Some(Color::new(255, 235, 230)));
    }

    #[test]
    fn test_parse_hex_three_digits() {
        assert_eq!(Color::parse("#f0a"), Some(Color::new(255, 0, 170)));
    }

    #[test]
    fn test_parse_hex_discards_alpha() {
        assert_eq!(Color::parse("#11223344"), Some(Color::new(0x11, 0x22, 0x33)));
        assert_eq!(Color::parse("#1234"), Some(Color::new(0x11, 0x22, 0x33)));
    }

    #[test]
    fn test_parse_rgb_integers() {
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::new(10, 20, 30)));
    }

    #[test]
    fn test_parse_rgba_percentages() {
        assert_eq!(
            Color::parse("RGBA(100%, 0%, 50%, 0.5)"),
            Some(Color::new(255, 0, 128))
        );
    }

    #[test]
    fn test_parse_clamps_out_of_range() {
        assert_eq!(Color::parse("rgb(300, -5, 150%)"), Some(Color::new(255, 0, 255)));
    }

    #[test]
    fn test_parse_rejects_unknown_syntax() {
        assert_eq!(Color::parse(""), None);
        assert_eq!(Color::parse("yellow"), None);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#ggg"), None);
        assert_eq!(Color::parse("rgb(1, 2)"), None);
        assert_eq!(Color::parse("hsl(0, 50%, 50%)"), None);
    }

    #[test]
    fn test_nearest_palette_exact_red() {
        let entry = nearest_palette(0xFF, 0xEB, 0xE6);
        assert_eq!(entry.name, "red");
        assert_eq!(entry.background, "#FFEBE6");
        assert_eq!(entry.foreground, "#BF2600");
    }

    #[test]
    fn test_nearest_palette_every_entry_maps_to_itself() {
        for expected in PALETTE {
            let c = Color::parse(expected.background).unwrap();
            assert_eq!(nearest_palette(c.r, c.g, c.b), expected);
        }
    }

    #[test]
    fn test_nearest_palette_is_deterministic() {
        let first = nearest_palette(200, 210, 250);
        for _ in 0..10 {
            assert_eq!(nearest_palette(200, 210, 250), first);
        }
        assert_eq!(first.name, "blue");
    }

    #[test]
    fn test_palette_for_falls_back_to_red() {
        assert_eq!(palette_for("not-a-colour"), FALLBACK);
        assert_eq!(palette_for("").name, "red");
    }

    #[test]
    fn test_palette_for_yellowish() {
        assert_eq!(palette_for("#ffff00").name, "yellow");
    }
}
