// src/export/mod.rs

//! Text palette export (GIMP `.gpl`, CSV) and the swatch-grid column-count
//! rule used to lay a palette out as a grid of swatches.
//!
//! No image codec lives here or anywhere else in this crate (out of
//! scope); [`swatch_columns`] only computes the grid geometry a caller
//! would need to actually rasterize one.

use crate::palette::ColorPalette;

/// GIMP palette (`.gpl`) text export: a header naming the palette and
/// declaring a column count, followed by one `R G B\tColor N` line per
/// entry, each channel right-aligned to 3 characters.
pub fn to_gpl(palette: &ColorPalette, name: &str) -> String {
    let columns = palette.len().min(16);
    let mut out = String::new();
    out.push_str("GIMP Palette\n");
    out.push_str(&format!("Name: {name}\n"));
    out.push_str(&format!("Columns: {columns}\n"));
    out.push_str("#\n");
    for (i, c) in palette.colors().iter().enumerate() {
        let r = c.c1.round().clamp(0.0, 255.0) as u32;
        let g = c.c2.round().clamp(0.0, 255.0) as u32;
        let b = c.c3.round().clamp(0.0, 255.0) as u32;
        out.push_str(&format!("{r:3} {g:3} {b:3}\tColor {}\n", i + 1));
    }
    out
}

/// CSV export: header `Index,L,a,b,Hex` followed by one row per entry, `L`,
/// `a`, `b` given to two decimal places (CIE L*a*b*) and `Hex` the sRGB hex
/// string of the same color.
pub fn to_csv(palette: &ColorPalette) -> String {
    use crate::color::rgb_to_lab;

    let mut out = String::new();
    out.push_str("Index,L,a,b,Hex\n");
    let hex_strings = palette.to_hex_strings();
    for (i, (c, hex)) in palette.colors().iter().zip(hex_strings.iter()).enumerate() {
        let lab = rgb_to_lab(c);
        out.push_str(&format!("{},{:.2},{:.2},{:.2},{}\n", i, lab.c1, lab.c2, lab.c3, hex));
    }
    out
}

/// The column count a swatch grid for `n` colors should use. A pure
/// geometry function; it performs no rendering.
///
/// - `n <= 4`: one row, `n` columns.
/// - `n <= 8`, `n <= 16`: 4 columns.
/// - `n <= 25`: 5 columns.
/// - `n <= 36`: 6 columns.
/// - `n <= 64`: 8 columns.
/// - `n <= 100`: 10 columns.
/// - `n <= 144`: 12 columns.
/// - otherwise: `ceil(sqrt(n))` columns.
pub fn swatch_columns(n: usize) -> usize {
    match n {
        0..=4 => n.max(1),
        5..=8 => 4,
        9..=16 => 4,
        17..=25 => 5,
        26..=36 => 6,
        37..=64 => 8,
        65..=100 => 10,
        101..=144 => 12,
        _ => (n as f64).sqrt().ceil() as usize,
    }
}
