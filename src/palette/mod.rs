// src/palette/mod.rs

//! The extracted palette type and palette-to-palette correspondence.
//!
//! A [`ColorPalette`] is just an ordered list of colors — clustering
//! produces one, resynthesis consumes two (source and target) plus a
//! [`correspondence`] between them: which source color each target color's
//! pixels should be remapped toward.

use crate::color::{ciede2000, rgb_to_lab, ColorPoint, WorkingSpace};

/// An ordered palette of colors. Order is preserved as produced by
/// clustering (or whatever the caller supplies); duplicates are permitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<ColorPoint>,
}

impl ColorPalette {
    pub fn new(colors: Vec<ColorPoint>) -> Self {
        ColorPalette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[ColorPoint] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> ColorPoint {
        self.colors[index]
    }

    /// Index of the palette entry closest to `point` by squared Euclidean
    /// distance, breaking ties toward the lowest index.
    pub fn nearest(&self, point: &ColorPoint) -> usize {
        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;
        for (i, c) in self.colors.iter().enumerate() {
            let d = c.distance_sq(point);
            if d < best_dist {
                best_dist = d;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Returns a new palette with colors stably sorted by luminance.
    ///
    /// In the RGB working space this uses Rec.601 luma
    /// (`0.299 R + 0.587 G + 0.114 B`); in CIE L*a*b* the `L*` component
    /// (`c1`) already is a luminance-correlated quantity, so it is used
    /// directly. The sort is stable, so colors with equal luminance retain
    /// their relative input order.
    pub fn sorted_by_luminance(&self, space: WorkingSpace) -> ColorPalette {
        let mut colors = self.colors.clone();
        match space {
            WorkingSpace::Rgb => {
                colors.sort_by(|a, b| luma(a).partial_cmp(&luma(b)).unwrap());
            }
            WorkingSpace::CieLab => {
                colors.sort_by(|a, b| a.c1.partial_cmp(&b.c1).unwrap());
            }
        }
        ColorPalette::new(colors)
    }

    /// Renders each entry as a `#RRGGBB` hex string, assuming entries are in
    /// the RGB working space.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.colors
            .iter()
            .map(|c| {
                format!(
                    "#{:02X}{:02X}{:02X}",
                    c.c1.round().clamp(0.0, 255.0) as u8,
                    c.c2.round().clamp(0.0, 255.0) as u8,
                    c.c3.round().clamp(0.0, 255.0) as u8,
                )
            })
            .collect()
    }

    /// Mean CIEDE2000 distance between this palette and `other`, assuming
    /// both hold RGB colors; used for quality reporting, never on a hot
    /// path. Pairs by [`correspondence`], averaged over `self.len()` matches.
    pub fn mean_ciede2000(&self, other: &ColorPalette) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        let matches = correspondence(self, other);
        let sum: f64 = matches
            .iter()
            .enumerate()
            .map(|(source_idx, &target_idx)| {
                let lab_source = rgb_to_lab(&self.colors[source_idx]);
                let lab_target = rgb_to_lab(&other.colors[target_idx]);
                ciede2000(&lab_source, &lab_target)
            })
            .sum();
        sum / matches.len() as f64
    }
}

fn luma(c: &ColorPoint) -> f64 {
    0.299 * c.c1 + 0.587 * c.c2 + 0.114 * c.c3
}

/// For each color in `source`, returns the index of its matched color in
/// `target`: a length-`source.len()` map `M` with `M(i)` the `target` index
/// matched to `source.colors()[i]`, chosen to minimize the total squared
/// distance `sum_i distance(source[i], target[M(i)])^2`.
///
/// When both palettes have the same size, this is a bijective assignment
/// minimizing that total (the Hungarian algorithm). When sizes differ, there
/// is no bijection to find; instead, source colors are matched in index
/// order to their nearest still-unused target color, and once every target
/// color has been used once, to their nearest target color regardless of
/// reuse.
pub fn correspondence(source: &ColorPalette, target: &ColorPalette) -> Vec<usize> {
    if source.is_empty() || target.is_empty() {
        return Vec::new();
    }
    if source.len() == target.len() {
        hungarian_assignment(source, target)
    } else {
        nearest_unused_then_nearest(source, target)
    }
}

fn nearest_unused_then_nearest(source: &ColorPalette, target: &ColorPalette) -> Vec<usize> {
    let mut used = vec![false; target.len()];
    let mut result = Vec::with_capacity(source.len());

    for s in source.colors() {
        let mut best_unused: Option<(usize, f64)> = None;
        let mut best_any: Option<(usize, f64)> = None;
        for (j, t) in target.colors().iter().enumerate() {
            let d = s.distance_sq(t);
            if best_any.is_none_or(|(_, bd)| d < bd) {
                best_any = Some((j, d));
            }
            if !used[j] && best_unused.is_none_or(|(_, bd)| d < bd) {
                best_unused = Some((j, d));
            }
        }
        let chosen = best_unused.or(best_any).expect("target palette is non-empty").0;
        used[chosen] = true;
        result.push(chosen);
    }
    result
}

/// Classic O(n^3) Hungarian algorithm (Jonker-Volgenant-style successive
/// shortest paths formulation) minimizing total squared distance over a
/// square cost matrix. Indices are 1-based internally, matching the
/// textbook potentials formulation, and translated back at the end.
fn hungarian_assignment(source: &ColorPalette, target: &ColorPalette) -> Vec<usize> {
    let n = source.len();
    debug_assert_eq!(n, target.len());

    let cost = |row: usize, col: usize| -> f64 { source.colors()[row].distance_sq(&target.colors()[col]) };

    let inf = f64::INFINITY;
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut p = vec![0usize; n + 1]; // p[col] = row assigned to col (1-based), 0 = unassigned
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;

            for j in 1..=n {
                if !used[j] {
                    let cur = cost(i0 - 1, j - 1) - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    // p[col] = row (both 1-based); invert into result[row(source)] = col(target), both 0-based.
    let mut result = vec![0usize; n];
    for col in 1..=n {
        let row = p[col];
        if row > 0 {
            result[row - 1] = col - 1;
        }
    }
    result
}
