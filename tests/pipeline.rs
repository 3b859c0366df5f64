//! Clip, triangulate, stroke and render working together.

mod helpers;

use helpers::{area, count_pixels, polygon, square};
use vpath_rust::basics::FillingRule;
use vpath_rust::clip::{self, WindingRule};
use vpath_rust::color::Rgba8;
use vpath_rust::comp_op::CompOp;
use vpath_rust::math::calc_triangle_area;
use vpath_rust::mesh::triangulate_path;
use vpath_rust::path_storage::Path;
use vpath_rust::renderer::Renderer;
use vpath_rust::rendering_buffer::RenderingBuffer;
use vpath_rust::style::{DashPattern, FillStyle, StrokeStyle};
use vpath_rust::vcgen_stroke::Stroker;

fn render(width: u32, height: u32, draw: impl FnOnce(&mut Renderer<'_>)) -> Vec<u8> {
    let mut data = vec![0u8; (width * height * 4) as usize];
    {
        let mut ren = Renderer::new(RenderingBuffer::new(&mut data, width, height));
        draw(&mut ren);
    }
    data
}

#[test_log::test]
fn difference_then_triangulate_keeps_area() {
    let frame = clip::difference(&square(0.0, 0.0, 10.0), &square(3.0, 3.0, 4.0));
    assert!((area(&frame) - 84.0).abs() < 1e-9);

    let mesh = triangulate_path(&frame, WindingRule::NonZero);
    mesh.check();
    let tris = mesh.triangles();
    assert!(!tris.is_empty());
    let total: f64 = tris.iter().map(|t| calc_triangle_area(t[0], t[1], t[2])).sum();
    assert!((total - 84.0).abs() < 1e-9, "triangles cover {}", total);
    assert!(tris.iter().all(|t| calc_triangle_area(t[0], t[1], t[2]) > 0.0));
}

#[test_log::test]
fn union_renders_like_nonzero_overlap() {
    let a = square(2.0, 2.0, 10.0);
    // slope-2 edges keep every pixel center off the boundary
    let b = polygon(&[(9.0, 3.0), (15.0, 15.0), (3.0, 15.0)]);
    let merged = clip::union(&a, &b);

    let mut both = Path::new();
    both.append(&a);
    both.append(&b);

    let style = FillStyle::new(Rgba8::BLACK);
    let from_union = render(20, 20, |r| {
        r.fill_path(&merged, &style);
    });
    let from_overlap = render(20, 20, |r| {
        r.fill_path(&both, &style);
    });
    assert_eq!(from_union, from_overlap);
}

#[test_log::test]
fn offset_square_fills_grown_box() {
    let grown = Stroker::new().offset(&square(5.0, 5.0, 10.0), 2.0);
    let data = render(30, 30, |r| {
        assert_eq!(r.fill_path(&grown, &FillStyle::new(Rgba8::WHITE)), 14 * 14);
    });
    assert_eq!(count_pixels(&data, Rgba8::TRANSPARENT), 196);
}

#[test_log::test]
fn dashed_stroke_paints_each_dash() {
    let mut line = Path::new();
    line.move_to(0.0, 10.0);
    line.line_to(40.0, 10.0);
    let stroke = StrokeStyle::new(2.0).with_dash(DashPattern::new(vec![10.0, 5.0], 0.0));
    let data = render(50, 20, |r| {
        assert_eq!(r.stroke_path(&line, &stroke, &FillStyle::new(Rgba8::BLACK)), 60);
    });
    assert_eq!(count_pixels(&data, Rgba8::TRANSPARENT), 60);
}

fn draw_scene(r: &mut Renderer<'_>, circle: &Path, star: &Path) {
    r.clear(Rgba8::WHITE);
    r.fill_path(circle, &FillStyle::new(Rgba8::new(0, 0, 200, 200)));
    r.fill_path(
        star,
        &FillStyle::new(Rgba8::new(100, 0, 0, 128)).with_rule(FillingRule::EvenOdd),
    );
    r.stroke_path(star, &StrokeStyle::new(1.5), &FillStyle::new(Rgba8::BLACK));
    r.fill_path(&square(0.0, 0.0, 8.0), &FillStyle::default().with_op(CompOp::Xor));
}

#[test_log::test]
fn rendering_is_deterministic() {
    let mut circle = Path::new();
    circle.circle(20.0, 20.0, 12.0);
    let star = polygon(&[
        (20.0, 2.0),
        (25.0, 35.0),
        (3.0, 14.0),
        (37.0, 14.0),
        (15.0, 35.0),
    ]);
    let first = render(40, 40, |r| draw_scene(r, &circle, &star));
    let second = render(40, 40, |r| draw_scene(r, &circle, &star));
    assert_eq!(first, second);
    assert!(count_pixels(&first, Rgba8::WHITE) > 0);
}

#[test_log::test]
fn contour_order_does_not_change_pixels() {
    let a = square(1.0, 1.0, 6.0);
    let b = polygon(&[(4.0, 3.0), (14.0, 5.0), (9.0, 13.0)]);
    let mut ab = Path::new();
    ab.append(&a);
    ab.append(&b);
    let mut ba = Path::new();
    ba.append(&b);
    ba.append(&a);

    let style = FillStyle::new(Rgba8::BLACK).with_rule(FillingRule::EvenOdd);
    let one = render(16, 16, |r| {
        r.fill_path(&ab, &style);
    });
    let two = render(16, 16, |r| {
        r.fill_path(&ba, &style);
    });
    assert_eq!(one, two);
}

#[test_log::test]
fn repeated_strokes_reuse_scratch_paths() {
    let ring = square(4.0, 4.0, 8.0);
    let data = render(20, 20, |r| {
        for _ in 0..10 {
            assert_eq!(
                r.stroke_path(&ring, &StrokeStyle::new(2.0), &FillStyle::new(Rgba8::BLACK)),
                10 * 10 - 6 * 6
            );
        }
    });
    assert_eq!(count_pixels(&data, Rgba8::TRANSPARENT), 64);
}
