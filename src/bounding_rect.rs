//! Bounding rectangle calculation.
//!
//! Computes the axis-aligned box of the vertices a vertex source emits.
//! Run over a `ConvCurve` this gives the box of the flattened outline,
//! which is tighter than `Path::bounds` for curves since control points
//! are not included.

use crate::basics::{is_stop, is_vertex, RectD, VertexSource};
use crate::conv_curve::ConvCurve;
use crate::path_storage::Path;

fn extend(r: &mut Option<RectD>, x: f64, y: f64) {
    match r {
        None => *r = Some(RectD::new(x, y, x, y)),
        Some(b) => {
            b.x1 = b.x1.min(x);
            b.y1 = b.y1.min(y);
            b.x2 = b.x2.max(x);
            b.y2 = b.y2.max(y);
        }
    }
}

fn accumulate(vs: &mut dyn VertexSource, path_id: u32, r: &mut Option<RectD>) {
    let mut x = 0.0;
    let mut y = 0.0;
    vs.rewind(path_id);
    loop {
        let cmd = vs.vertex(&mut x, &mut y);
        if is_stop(cmd) {
            break;
        }
        if is_vertex(cmd) {
            extend(r, x, y);
        }
    }
}

/// Bounding rectangle of path `path_id` of a vertex source, `None` when it
/// emits no vertices.
pub fn bounding_rect_single(vs: &mut dyn VertexSource, path_id: u32) -> Option<RectD> {
    let mut r = None;
    accumulate(vs, path_id, &mut r);
    r
}

/// Combined bounding rectangle of several paths of one vertex source.
pub fn bounding_rect(vs: &mut dyn VertexSource, path_ids: &[u32]) -> Option<RectD> {
    let mut r = None;
    for &id in path_ids {
        accumulate(vs, id, &mut r);
    }
    r
}

/// Bounds of `path` after flattening at `approximation_scale`.
pub fn path_bounds(path: &Path, approximation_scale: f64) -> Option<RectD> {
    let mut curve = ConvCurve::new(path);
    curve.set_approximation_scale(approximation_scale);
    bounding_rect_single(&mut curve, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP};

    /// Minimal test vertex source: a triangle.
    struct Triangle {
        vertices: [(f64, f64); 3],
        index: usize,
    }

    impl Triangle {
        fn new(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> Self {
            Self {
                vertices: [(x1, y1), (x2, y2), (x3, y3)],
                index: 0,
            }
        }
    }

    impl VertexSource for Triangle {
        fn rewind(&mut self, _path_id: u32) {
            self.index = 0;
        }

        fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
            if self.index < 3 {
                *x = self.vertices[self.index].0;
                *y = self.vertices[self.index].1;
                self.index += 1;
                if self.index == 1 {
                    PATH_CMD_MOVE_TO
                } else {
                    PATH_CMD_LINE_TO
                }
            } else {
                PATH_CMD_STOP
            }
        }
    }

    #[test]
    fn test_bounding_rect_single_triangle() {
        let mut tri = Triangle::new(10.0, 20.0, 50.0, 80.0, 30.0, 10.0);
        let r = bounding_rect_single(&mut tri, 0).unwrap();
        assert_eq!((r.x1, r.y1, r.x2, r.y2), (10.0, 10.0, 50.0, 80.0));
    }

    #[test]
    fn test_bounding_rect_empty_returns_none() {
        struct Empty;
        impl VertexSource for Empty {
            fn rewind(&mut self, _: u32) {}
            fn vertex(&mut self, _x: &mut f64, _y: &mut f64) -> u32 {
                PATH_CMD_STOP
            }
        }
        assert!(bounding_rect_single(&mut Empty, 0).is_none());
        assert!(path_bounds(&Path::new(), 1.0).is_none());
    }

    #[test]
    fn test_bounding_rect_multi_path() {
        let mut tri = Triangle::new(10.0, 20.0, 50.0, 80.0, 30.0, 10.0);
        let r = bounding_rect(&mut tri, &[0, 1]).unwrap();
        assert_eq!((r.x1, r.y1, r.x2, r.y2), (10.0, 10.0, 50.0, 80.0));
        assert!(bounding_rect(&mut tri, &[]).is_none());
    }

    #[test]
    fn test_path_bounds_ignores_control_points() {
        let mut path = Path::new();
        path.circle(50.0, 50.0, 20.0);
        let loose = path.bounds().unwrap();
        assert_eq!((loose.x1, loose.x2), (30.0, 70.0));

        // the flattened circle passes through its quadrant points exactly
        let tight = path_bounds(&path, 1.0).unwrap();
        assert!((tight.x1 - 30.0).abs() < 1e-9 && (tight.x2 - 70.0).abs() < 1e-9);
        assert!((tight.y1 - 30.0).abs() < 1e-9 && (tight.y2 - 70.0).abs() < 1e-9);

        let mut bump = Path::new();
        bump.move_to(0.0, 0.0);
        bump.quad_to(5.0, 10.0, 10.0, 0.0);
        assert_eq!(bump.bounds().unwrap().y2, 10.0);
        let r = path_bounds(&bump, 1.0).unwrap();
        assert!(r.y2 <= 5.0 + 1e-9 && r.y2 > 4.5);
    }
}
