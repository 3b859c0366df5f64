//! Core properties of the kernel, checked end to end.

mod helpers;

use std::cmp::Ordering;

use helpers::{area, count_pixels, p, square, Lcg};
use vpath_rust::color::Rgba8;
use vpath_rust::edge::Edge;
use vpath_rust::math_stroke::LineJoin;
use vpath_rust::mesh::{Mesh, MeshEdge};
use vpath_rust::path_storage::{Path, PathCmd};
use vpath_rust::point::Point;
use vpath_rust::renderer::Renderer;
use vpath_rust::rendering_buffer::RenderingBuffer;
use vpath_rust::style::{FillStyle, StrokeStyle};
use vpath_rust::sweep::{compare_queue, compare_status, SweepEvent, SweepSegment};
use vpath_rust::vcgen_stroke::stroke_path;

// ============================================================================
// Path round trip
// ============================================================================

#[test_log::test]
fn path_reads_back_what_was_written() {
    let mut rng = Lcg::new(7);
    for _ in 0..50 {
        let mut path = Path::new();
        let mut cmds = Vec::new();
        let mut pts = Vec::new();
        let mut weights = Vec::new();
        for _ in 0..1 + rng.next_u32() % 3 {
            let m = p(rng.coord(100), rng.coord(100));
            path.move_to(m.x, m.y);
            cmds.push(PathCmd::Move);
            pts.push(m);
            for _ in 0..1 + rng.next_u32() % 5 {
                let a = p(rng.coord(100), rng.coord(100));
                let b = p(rng.coord(100), rng.coord(100));
                let c = p(rng.coord(100), rng.coord(100));
                match rng.next_u32() % 4 {
                    0 => {
                        path.line_to(a.x, a.y);
                        cmds.push(PathCmd::Line);
                        pts.push(a);
                    }
                    1 => {
                        path.quad_to(a.x, a.y, b.x, b.y);
                        cmds.push(PathCmd::Quad);
                        pts.extend([a, b]);
                    }
                    2 => {
                        let w = 0.25 + rng.coord(4) * 0.25;
                        path.conic_to(a.x, a.y, b.x, b.y, w);
                        cmds.push(PathCmd::Conic);
                        pts.extend([a, b]);
                        weights.push(w);
                    }
                    _ => {
                        path.cubic_to(a.x, a.y, b.x, b.y, c.x, c.y);
                        cmds.push(PathCmd::Cubic);
                        pts.extend([a, b, c]);
                    }
                }
            }
            if rng.next_u32() % 2 == 0 {
                path.close();
                cmds.push(PathCmd::Close);
            }
        }

        assert_eq!(path.commands(), cmds.as_slice());
        assert_eq!(path.points(), pts.as_slice());
        assert_eq!(path.weights(), weights.as_slice());
        let rebuilt: Path = path.segments().collect();
        assert_eq!(rebuilt, path);
    }
}

// ============================================================================
// Splice involution
// ============================================================================

fn snapshot(mesh: &Mesh) -> Vec<MeshEdge> {
    (0..mesh.capacity()).map(|e| *mesh.record(e)).collect()
}

#[test_log::test]
fn splice_twice_restores_mesh() {
    let mut mesh = Mesh::from_path(&helpers::polygon(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (12.0, 6.0),
        (5.0, 10.0),
        (-2.0, 6.0),
    ]));
    let extra = mesh.create_pair(&Edge::new(p(20.0, 20.0), p(25.0, 20.0)));
    assert!(extra < mesh.capacity());
    let n = mesh.capacity();
    let before = snapshot(&mesh);

    let mut rng = Lcg::new(99);
    for _ in 0..40 {
        let a = rng.next_u32() as usize % n;
        let b = rng.next_u32() as usize % n;
        mesh.splice(a, b);
        mesh.splice(a, b);
        assert_eq!(snapshot(&mesh), before, "splice({}, {}) twice", a, b);
    }
    mesh.check();
}

// ============================================================================
// Ordering antisymmetry
// ============================================================================

fn assert_antisymmetric<T: std::fmt::Debug>(items: &[T], cmp: impl Fn(&T, &T) -> Ordering) {
    for a in items {
        for b in items {
            assert_eq!(cmp(a, b), cmp(b, a).reverse(), "{:?} vs {:?}", a, b);
        }
    }
}

#[test_log::test]
fn sweep_orderings_are_antisymmetric() {
    let mut rng = Lcg::new(2024);
    let pts: Vec<Point> = (0..10).map(|_| p(rng.coord(16), rng.coord(16))).collect();

    let mut segs = Vec::new();
    for (i, &a) in pts.iter().enumerate() {
        for &b in &pts[i + 1..] {
            if let Some(s) = SweepSegment::from_edge(segs.len(), a, b, 0, 0) {
                segs.push(s);
            }
        }
    }
    assert_antisymmetric(&segs, compare_status);

    let events: Vec<SweepEvent> = segs
        .iter()
        .flat_map(|s| {
            [
                SweepEvent::new(s.left, s.right, true, s.id),
                SweepEvent::new(s.right, s.left, false, s.id),
            ]
        })
        .collect();
    assert_antisymmetric(&events, compare_queue);
}

// ============================================================================
// Boolean union area
// ============================================================================

#[test_log::test]
fn union_of_half_overlapping_unit_squares() {
    let a = square(0.0, 0.0, 1.0);
    let b = square(0.5, 0.0, 1.0);
    let u = vpath_rust::clip::union(&a, &b);
    assert!((area(&u) - 1.5).abs() < 1e-9, "area {}", area(&u));

    // shifted diagonally the overlap is a quarter
    let c = square(0.5, 0.5, 1.0);
    let u = vpath_rust::clip::union(&a, &c);
    assert!((area(&u) - 1.75).abs() < 1e-9);
}

// ============================================================================
// Rasterizer pixel count
// ============================================================================

#[test_log::test]
fn ten_by_ten_rect_sets_one_hundred_pixels() {
    let mut rng = Lcg::new(5);
    for _ in 0..20 {
        // offsets on an eighth-pixel grid
        let x = rng.coord(80) / 8.0;
        let y = rng.coord(80) / 8.0;
        let mut data = vec![0u8; 20 * 20 * 4];
        let mut ren = Renderer::new(RenderingBuffer::new(&mut data, 20, 20));
        let n = ren.fill_path(&square(x, y, 10.0), &FillStyle::new(Rgba8::BLACK));
        assert_eq!(n, 100, "rect at ({}, {})", x, y);
        drop(ren);
        assert_eq!(count_pixels(&data, Rgba8::TRANSPARENT), 100);
    }
}

// ============================================================================
// Miter limit
// ============================================================================

/// Emitted points of a stroked wedge with interior angle `deg` at (100, 0),
/// keeping only those near the corner.
fn corner_points(deg: f64, join: LineJoin, limit: f64) -> Vec<f64> {
    let t = deg.to_radians();
    let mut path = Path::new();
    path.move_to(0.0, 0.0);
    path.line_to(100.0, 0.0);
    path.line_to(100.0 - 100.0 * t.cos(), 100.0 * t.sin());
    let style = StrokeStyle::new(10.0).with_join(join).with_miter_limit(limit);
    let corner = p(100.0, 0.0);
    stroke_path(&path, &style)
        .segments()
        .filter_map(|s| s.end_point())
        .map(|e| e.distance(corner))
        .filter(|&d| d < 60.0)
        .collect()
}

#[test_log::test]
fn miter_limit_falls_back() {
    let hw = 5.0;
    let limit = 4.0;
    for deg in [10.0_f64, 20.0, 30.0, 60.0, 120.0] {
        let miter = hw / (deg.to_radians() * 0.5).sin();
        let sharp = miter <= limit * hw;

        let d = corner_points(deg, LineJoin::Miter, limit);
        let far = d.iter().cloned().fold(0.0, f64::max);
        if sharp {
            assert!((far - miter).abs() < 1e-6, "{}°: tip at {}, want {}", deg, far, miter);
        } else {
            // bevel
            assert!(far <= hw + 1e-9, "{}°: reaches {}", deg, far);
        }

        let d = corner_points(deg, LineJoin::MiterClip, limit);
        let far = d.iter().cloned().fold(0.0, f64::max);
        if sharp {
            assert!((far - miter).abs() < 1e-6);
        } else {
            assert!(far > hw + 1.0, "{}°: clip missing", deg);
            assert!(far <= (limit * hw).hypot(hw) + 1e-9, "{}°: reaches {}", deg, far);
        }
    }
}
