// tests/integration_tests.rs

//! End-to-end scenarios exercising the public façade, covering the
//! engine's cross-module invariants that no single unit test module can
//! see in isolation.

use palette_harmony::{Analyzer, ColorPalette, ColorPoint, Pixel, PixelBuffer, ResynthesizeOptions, WorkingSpace};

fn stripes(width: u32, height: u32, colors: &[(u8, u8, u8)]) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let (r, g, b) = colors[(y as usize) % colors.len()];
        for _ in 0..width {
            data.push(Pixel::from_rgb(r, g, b));
        }
    }
    PixelBuffer::from_vec(width, height, data).unwrap()
}

#[test]
fn determinism_same_seed_same_output() {
    let image = stripes(16, 16, &[(10, 10, 10), (250, 30, 30), (30, 250, 30)]);
    let analyzer = Analyzer::new(WorkingSpace::CieLab);

    let palette_a = analyzer.analyze(&image, 3).unwrap();
    let palette_b = analyzer.analyze(&image, 3).unwrap();
    assert_eq!(palette_a, palette_b);

    let resynth_a = analyzer.resynthesize(&image, &palette_a, &palette_a).unwrap();
    let resynth_b = analyzer.resynthesize(&image, &palette_b, &palette_b).unwrap();
    assert_eq!(resynth_a.pixels(), resynth_b.pixels());
}

#[test]
fn extracted_centroids_stay_within_the_sampled_data_bounds() {
    let image = stripes(32, 32, &[(0, 0, 0), (255, 255, 255)]);
    let analyzer = Analyzer::new(WorkingSpace::Rgb);
    let palette = analyzer.analyze(&image, 2).unwrap();

    for c in palette.colors() {
        assert!(c.c1 >= -1.0 && c.c1 <= 256.0);
        assert!(c.c2 >= -1.0 && c.c2 <= 256.0);
        assert!(c.c3 >= -1.0 && c.c3 <= 256.0);
    }
}

#[test]
fn palette_size_never_exceeds_requested_k() {
    let image = stripes(8, 8, &[(5, 5, 5)]); // a single distinct color
    let analyzer = Analyzer::new(WorkingSpace::Rgb);
    let palette = analyzer.analyze(&image, 4).unwrap();
    assert!(palette.len() <= 4);
}

#[test]
fn luminance_sort_is_stable_and_monotonic() {
    let palette = ColorPalette::new(vec![
        ColorPoint::new(200.0, 200.0, 200.0),
        ColorPoint::new(10.0, 10.0, 10.0),
        ColorPoint::new(100.0, 100.0, 100.0),
    ]);
    let sorted = palette.sorted_by_luminance(WorkingSpace::Rgb);
    let luma: Vec<f64> = sorted.colors().iter().map(|c| c.c1).collect();
    assert!(luma.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn resynthesizing_against_its_own_palette_approximately_preserves_the_image() {
    let image = stripes(16, 16, &[(20, 40, 60), (220, 180, 140)]);
    let analyzer = Analyzer::new(WorkingSpace::CieLab);
    let palette = analyzer.analyze(&image, 2).unwrap();

    let out = analyzer.resynthesize(&image, &palette, &palette).unwrap();
    for (original, result) in image.pixels().iter().zip(out.pixels().iter()) {
        assert!((original.r() as i16 - result.r() as i16).abs() <= 2);
        assert!((original.g() as i16 - result.g() as i16).abs() <= 2);
        assert!((original.b() as i16 - result.b() as i16).abs() <= 2);
    }
}

#[test]
fn posterize_option_collapses_output_to_exact_source_colors() {
    let image = stripes(8, 8, &[(12, 34, 56), (200, 150, 100)]);
    let analyzer = Analyzer::new(WorkingSpace::Rgb);
    let palette = analyzer.analyze(&image, 2).unwrap();

    let out = analyzer
        .resynthesize_with_options(
            &image,
            &palette,
            &palette,
            ResynthesizeOptions {
                posterize: true,
                use_lut: false,
            },
        )
        .unwrap();

    for pixel in out.pixels() {
        let (r, g, b) = pixel.rgb_f64();
        let point = ColorPoint::new(r, g, b);
        let nearest_idx = palette.nearest(&point);
        let exact = palette.get(nearest_idx);
        assert_eq!(point, exact);
    }
}

#[test]
fn alpha_channel_survives_full_analyze_and_resynthesize_round_trip() {
    let mut data = Vec::new();
    for i in 0..64u8 {
        let alpha = if i % 2 == 0 { 255 } else { 0 };
        data.push(Pixel::from_argb(alpha, i, i, i));
    }
    let image = PixelBuffer::from_vec(8, 8, data).unwrap();
    let analyzer = Analyzer::new(WorkingSpace::Rgb);
    let palette = analyzer.analyze(&image, 4).unwrap();
    let out = analyzer.resynthesize(&image, &palette, &palette).unwrap();

    for (original, result) in image.pixels().iter().zip(out.pixels().iter()) {
        assert_eq!(original.a(), result.a());
    }
}

#[test]
fn scenario_simple_three_color_assignment() {
    // A small, exact three-color source/target palette pair should produce
    // the intuitive nearest-unused assignment.
    let source = ColorPalette::new(vec![
        ColorPoint::new(0.0, 0.0, 0.0),
        ColorPoint::new(255.0, 0.0, 0.0),
        ColorPoint::new(0.0, 255.0, 0.0),
    ]);
    let target = ColorPalette::new(vec![
        ColorPoint::new(2.0, 1.0, 0.0),
        ColorPoint::new(250.0, 3.0, 1.0),
        ColorPoint::new(1.0, 252.0, 2.0),
    ]);
    let matches = palette_harmony::palette::correspondence(&source, &target);
    assert_eq!(matches, vec![0, 1, 2]);
}
