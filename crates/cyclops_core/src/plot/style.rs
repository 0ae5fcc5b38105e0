//! Labels, colors, fonts and tick formatting shared by every chart.

use super::{PlotError, PlotResult};
use once_cell::sync::OnceCell;
use plotters::style::{register_font, FontStyle, RGBColor};

/// Family every caption, axis description and legend label is drawn with.
pub const FONT_FAMILY: &str = "sans-serif";
const TITLE_FONT_SIZE: u32 = 28;

static DEJAVU_SANS: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_REGISTRATION: OnceCell<Result<(), String>> = OnceCell::new();

/// Anchors of the viridis colormap, `(position, rgb)`.
const VIRIDIS: [(f64, (u8, u8, u8)); 10] = [
    (0.0, (68, 1, 84)),
    (0.1, (72, 40, 120)),
    (0.2, (62, 73, 137)),
    (0.3, (49, 104, 142)),
    (0.4, (38, 130, 142)),
    (0.5, (31, 158, 137)),
    (0.6, (53, 183, 121)),
    (0.7, (110, 206, 88)),
    (0.8, (181, 222, 43)),
    (1.0, (253, 231, 37)),
];

/// Grand totals above this switch y ticks to thousands-separated integers.
pub const THOUSANDS_THRESHOLD: f64 = 1000.0;

/// Registers the embedded font under [`FONT_FAMILY`] once per process.
///
/// Text cannot be drawn before this succeeds.
pub fn register_fonts() -> PlotResult<()> {
    FONT_REGISTRATION
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, DEJAVU_SANS)
                .map_err(|_| "embedded DejaVu Sans is not a valid font".to_string())
        })
        .clone()
        .map_err(PlotError::Render)
}

/// Caption font of every chart.
pub fn title_font() -> (&'static str, u32) {
    (FONT_FAMILY, TITLE_FONT_SIZE)
}

/// Legend label for a series key; institution keys drop `_government`.
pub fn display_label(key: &str) -> String {
    key.replace("_government", "")
}

/// Samples viridis at `position`, clamped to `[0, 1]`.
pub fn viridis(position: f64) -> RGBColor {
    let position = if position.is_finite() {
        position.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let upper = VIRIDIS
        .iter()
        .position(|(anchor, _)| *anchor >= position)
        .unwrap_or(VIRIDIS.len() - 1);
    if upper == 0 {
        let (_, (r, g, b)) = VIRIDIS[0];
        return RGBColor(r, g, b);
    }

    let (low_pos, low) = VIRIDIS[upper - 1];
    let (high_pos, high) = VIRIDIS[upper];
    let t = (position - low_pos) / (high_pos - low_pos);
    let lerp = |a: u8, b: u8| -> u8 {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
    };
    RGBColor(lerp(low.0, high.0), lerp(low.1, high.1), lerp(low.2, high.2))
}

/// Color of the `index`-th of `count` series.
pub fn series_color(index: usize, count: usize) -> RGBColor {
    if count == 0 {
        viridis(0.0)
    } else {
        viridis(index as f64 / count as f64)
    }
}

/// Integer part of `value` with `,` between thousands groups.
pub fn format_thousands(value: f64) -> String {
    let truncated = value.trunc();
    let digits = format!("{:.0}", truncated.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if truncated < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Plain tick label with at most three decimals and no trailing zeros.
pub fn format_plain(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
