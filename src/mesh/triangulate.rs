//! Triangulation of the filled faces of a mesh.
//!
//! Holes are first bridged into their enclosing boundary so every filled
//! face is a single cycle, the cycles are then cut into triangles by
//! inserting diagonals with `connect`, and finally unconstrained diagonals
//! are flipped until every one is locally Delaunay.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use super::{sym, EdgeId, Mesh};
use crate::clip::{simplify, WindingRule};
use crate::math::{in_circle, intersection_exists, orient, point_in_triangle};
use crate::path_storage::Path;
use crate::point::{Point, Vector};

/// Simplify `path` under `rule`, build a mesh from the result and
/// triangulate it.
pub fn triangulate_path(path: &Path, rule: WindingRule) -> Mesh {
    let clean = simplify(path, rule);
    let mut mesh = Mesh::from_path(&clean);
    mesh.triangulate();
    mesh
}

/// Counter-clockwise angle from `u` to `v` in `[0, 2π)`.
fn ccw_angle(u: Vector, v: Vector) -> f64 {
    let a = u.cross(v).atan2(u.dot(v));
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Whether `d` points strictly inside the counter-clockwise sector from
/// `from` to `to`. Equal bounds span the full turn.
fn in_sector(from: Vector, to: Vector, d: Vector) -> bool {
    let mut span = ccw_angle(from, to);
    if span <= 0.0 {
        span = TAU;
    }
    let a = ccw_angle(from, d);
    a > 0.0 && a < span
}

/// Whether `p` lies on the open segment `a → b`.
fn on_open_segment(a: Point, b: Point, p: Point) -> bool {
    if orient(a, b, p) != 0.0 {
        return false;
    }
    let d = b - a;
    let t = (p - a).dot(d);
    t > 0.0 && t < d.length_squared()
}

impl Mesh {
    /// Split every filled face into triangles.
    pub fn triangulate(&mut self) {
        let bridges = self.bridge_holes();
        let diagonals = self.cut_ears();
        let flips = self.refine_delaunay();
        log::debug!(
            "mesh: {} bridges, {} diagonals, {} flips, {} triangles",
            bridges,
            diagonals,
            flips,
            self.triangles().len()
        );
    }

    fn mark_filled(&mut self, e: EdgeId) {
        self.edges[e].inside_left = true;
        self.edges[sym(e)].inside_left = true;
    }

    // ---------------------------------------------------------------
    // Hole bridging
    // ---------------------------------------------------------------

    /// Join every clockwise filled cycle to a visible vertex outside it.
    /// Returns the number of bridges inserted.
    fn bridge_holes(&mut self) -> usize {
        let mut failed: BTreeSet<EdgeId> = BTreeSet::new();
        let mut bridges = 0;

        loop {
            let holes: Vec<Vec<EdgeId>> = self
                .interior_faces()
                .into_iter()
                .filter(|f| self.face_area(f) < 0.0)
                .filter(|f| !f.iter().any(|e| failed.contains(e)))
                .collect();

            // rightmost hole first
            let Some(hole) = holes.into_iter().max_by(|a, b| {
                let pa = self.org_point(self.rightmost(a));
                let pb = self.org_point(self.rightmost(b));
                pa.x.total_cmp(&pb.x).then(pb.y.total_cmp(&pa.y))
            }) else {
                break;
            };

            let m = self.rightmost(&hole);
            match self.find_bridge(m, &hole) {
                Some(b) => {
                    let e = self.connect_at(m, b);
                    self.mark_filled(e);
                    bridges += 1;
                }
                None => {
                    log::warn!(
                        "mesh: no visible vertex for hole at ({}, {})",
                        self.org_point(m).x,
                        self.org_point(m).y
                    );
                    failed.insert(hole[0]);
                }
            }
        }
        bridges
    }

    /// Half-edge of `face` leaving its rightmost vertex (lowest on ties).
    fn rightmost(&self, face: &[EdgeId]) -> EdgeId {
        let mut best = face[0];
        for &e in &face[1..] {
            let p = self.org_point(e);
            let q = self.org_point(best);
            if p.x > q.x || (p.x == q.x && p.y < q.y) {
                best = e;
            }
        }
        best
    }

    /// Nearest half-edge `b` whose origin is visible from `org(m)` through
    /// the filled corners at both ends.
    fn find_bridge(&self, m: EdgeId, hole: &[EdgeId]) -> Option<EdgeId> {
        let hole_verts: BTreeSet<usize> = hole.iter().map(|&e| self.org(e)).collect();
        let pm = self.org_point(m);
        let from_m = self.edge(m).vector();
        let to_m = self.edge(self.onext(m)).vector();

        let mut best: Option<(f64, EdgeId)> = None;
        for b in self.live_edges() {
            if !self.inside_left(b) || hole_verts.contains(&self.org(b)) {
                continue;
            }
            let pv = self.org_point(b);
            let d = pv - pm;
            let dist = d.length_squared();
            if best.is_some_and(|(bd, _)| dist >= bd) {
                continue;
            }
            if !in_sector(from_m, to_m, d) {
                continue;
            }
            let from_b = self.edge(b).vector();
            let to_b = self.edge(self.onext(b)).vector();
            if !in_sector(from_b, to_b, -d) {
                continue;
            }
            if self.segment_blocked(pm, pv) {
                continue;
            }
            best = Some((dist, b));
        }
        best.map(|(_, b)| b)
    }

    /// Whether the open segment `a → b` crosses an edge or passes through
    /// a vertex.
    fn segment_blocked(&self, a: Point, b: Point) -> bool {
        for e in self.live_edges().filter(|e| e % 2 == 0) {
            let (c, d) = (self.org_point(e), self.dest_point(e));
            if intersection_exists(a, b, c, d) {
                return true;
            }
        }
        self.verts.iter().any(|&p| on_open_segment(a, b, p))
    }

    // ---------------------------------------------------------------
    // Ear cutting
    // ---------------------------------------------------------------

    /// Triangulate every filled face. Returns the number of diagonals.
    fn cut_ears(&mut self) -> usize {
        let mut diagonals = 0;
        for face in self.interior_faces() {
            if face.len() > 3 {
                diagonals += self.cut_face(face[0], face.len());
            }
        }
        diagonals
    }

    fn corner(&self, e: EdgeId) -> (Point, Point, Point) {
        let next = self.lnext(e);
        (self.org_point(e), self.org_point(next), self.dest_point(next))
    }

    fn is_ear(&self, e: EdgeId, face_pts: &[Point]) -> bool {
        let (a, b, c) = self.corner(e);
        if orient(a, b, c) <= 0.0 {
            return false;
        }
        !face_pts.iter().any(|&p| {
            p != a && p != b && p != c && (point_in_triangle(a, b, c, p) || on_open_segment(c, a, p))
        })
    }

    fn cut_face(&mut self, start: EdgeId, len: usize) -> usize {
        let mut cur = start;
        let mut n = len;
        let mut cut = 0;

        while n > 3 {
            let pts: Vec<Point> = self.face(cur).iter().map(|&e| self.org_point(e)).collect();
            let mut ear = None;
            let mut e = cur;
            for _ in 0..n {
                if self.is_ear(e, &pts) {
                    ear = Some(e);
                    break;
                }
                e = self.lnext(e);
            }

            let ear = match ear.or_else(|| self.any_convex_corner(cur, n)) {
                Some(e) => e,
                None => {
                    log::warn!("mesh: face of {} edges has no convex corner", n);
                    break;
                }
            };

            let next = self.lnext(ear);
            let d = self.connect(next, ear);
            self.mark_filled(d);
            cur = sym(d);
            n -= 1;
            cut += 1;
        }
        cut
    }

    fn any_convex_corner(&self, start: EdgeId, n: usize) -> Option<EdgeId> {
        log::warn!("mesh: no clean ear in face of {} edges", n);
        let mut e = start;
        for _ in 0..n {
            let (a, b, c) = self.corner(e);
            if orient(a, b, c) > 0.0 {
                return Some(e);
            }
            e = self.lnext(e);
        }
        None
    }

    // ---------------------------------------------------------------
    // Delaunay refinement
    // ---------------------------------------------------------------

    /// An unconstrained edge with filled triangles on both sides.
    fn edge_is_internal(&self, e: EdgeId) -> bool {
        let s = sym(e);
        self.edges[e].alive
            && !self.edges[e].constrained
            && self.edges[e].inside_left
            && self.edges[s].inside_left
            && self.lnext(self.lnext(self.lnext(e))) == e
            && self.lnext(self.lnext(self.lnext(s))) == s
    }

    /// The vertex opposite `e` in its right triangle lies on or outside the
    /// circle through its left triangle.
    pub fn edge_is_locally_delaunay(&self, e: EdgeId) -> bool {
        let v = self.org_point(self.lnext(self.lnext(sym(e))));
        let v0 = self.org_point(self.lnext(e));
        let v1 = self.org_point(self.lnext(self.lnext(e)));
        let v2 = self.org_point(e);
        in_circle(v, v0, v1, v2) <= 0.0
    }

    /// Whether the two triangles around `e` form a strictly convex
    /// quadrilateral, so the other diagonal lies inside it.
    fn flip_is_valid(&self, e: EdgeId) -> bool {
        let a = self.org_point(e);
        let b = self.dest_point(e);
        let l = self.org_point(self.lnext(self.lnext(e)));
        let r = self.org_point(self.lnext(self.lnext(sym(e))));
        let oa = orient(r, l, a);
        let ob = orient(r, l, b);
        (oa > 0.0 && ob < 0.0) || (oa < 0.0 && ob > 0.0)
    }

    /// Flip unconstrained diagonals until each is locally Delaunay. Returns
    /// the number of flips.
    pub fn refine_delaunay(&mut self) -> usize {
        let mut mark = vec![false; self.edges.len()];
        let mut stack: Vec<EdgeId> = Vec::new();

        for face in self.interior_faces() {
            for e in face {
                if self.edge_is_internal(e) && !mark[sym(e)] {
                    mark[e] = true;
                    mark[sym(e)] = true;
                    stack.push(e);
                }
            }
        }

        let max_iter = stack.len() * stack.len() + 1;
        let mut iter = 0;
        let mut flips = 0;

        while let Some(e) = stack.pop() {
            if iter >= max_iter {
                log::warn!("mesh: Delaunay refinement stopped after {} steps", iter);
                break;
            }
            iter += 1;
            mark[e] = false;
            mark[sym(e)] = false;

            if !self.edge_is_locally_delaunay(e) && self.flip_is_valid(e) {
                let neighbors = [
                    self.lnext(e),
                    self.lprev(e),
                    self.lnext(sym(e)),
                    self.lprev(sym(e)),
                ];
                self.flip(e);
                flips += 1;
                for nb in neighbors {
                    if !mark[nb] && self.edge_is_internal(nb) {
                        mark[nb] = true;
                        mark[sym(nb)] = true;
                        stack.push(nb);
                    }
                }
            }
        }
        flips
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::calc_triangle_area;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn area_sum(mesh: &Mesh) -> f64 {
        mesh.triangles()
            .iter()
            .map(|t| calc_triangle_area(t[0], t[1], t[2]))
            .sum()
    }

    #[test]
    fn test_in_sector() {
        let e = Vector::new(1.0, 0.0);
        let n = Vector::new(0.0, 1.0);
        assert!(in_sector(e, n, Vector::new(1.0, 1.0)));
        assert!(!in_sector(e, n, Vector::new(-1.0, 1.0)));
        assert!(!in_sector(e, n, e));
        assert!(in_sector(n, e, Vector::new(-1.0, -1.0)));
        assert!(in_sector(e, e, Vector::new(0.0, -1.0)));
    }

    #[test]
    fn test_triangulate_square() {
        let mut path = Path::new();
        path.rect(0.0, 0.0, 4.0, 4.0);
        let mut mesh = Mesh::from_path(&path);
        mesh.triangulate();
        mesh.check();
        let tris = mesh.triangles();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| calc_triangle_area(t[0], t[1], t[2]) > 0.0));
        assert!((area_sum(&mesh) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_concave() {
        // an L shape
        let mut path = Path::new();
        path.polygon(
            &[
                p(0.0, 0.0),
                p(4.0, 0.0),
                p(4.0, 1.0),
                p(1.0, 1.0),
                p(1.0, 4.0),
                p(0.0, 4.0),
            ],
            true,
        );
        let mut mesh = Mesh::from_path(&path);
        mesh.triangulate();
        mesh.check();
        assert_eq!(mesh.triangles().len(), 4);
        assert!((area_sum(&mesh) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_with_hole() {
        let mut path = Path::new();
        path.rect(0.0, 0.0, 10.0, 10.0);
        // clockwise hole
        path.polygon(&[p(3.0, 3.0), p(3.0, 7.0), p(7.0, 7.0), p(7.0, 3.0)], true);
        let mut mesh = Mesh::from_path(&path);
        mesh.triangulate();
        mesh.check();
        // 8 vertices, 2 boundary cycles: n + 2h - 2 triangles
        assert_eq!(mesh.triangles().len(), 8);
        assert!((area_sum(&mesh) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_path_normalizes_orientation() {
        let mut path = Path::new();
        path.polygon(&[p(0.0, 0.0), p(0.0, 2.0), p(3.0, 2.0), p(3.0, 0.0)], true);
        let mesh = triangulate_path(&path, WindingRule::NonZero);
        mesh.check();
        assert_eq!(mesh.triangles().len(), 2);
        assert!((area_sum(&mesh) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_delaunay_flips_thin_triangle() {
        // a quad whose first ear produces the long diagonal
        let mut path = Path::new();
        path.polygon(&[p(0.0, 0.0), p(5.0, -1.0), p(10.0, 0.0), p(5.0, 1.0)], true);
        let mut mesh = Mesh::from_path(&path);
        mesh.triangulate();
        mesh.check();
        for e in mesh.live_edges() {
            if !mesh.is_constrained(e) {
                let len = mesh.edge(e).length();
                assert!((len - 2.0).abs() < 1e-9, "diagonal of length {}", len);
                assert!(mesh.edge_is_locally_delaunay(e));
            }
        }
        assert!((area_sum(&mesh) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_is_deterministic() {
        let mut path = Path::new();
        path.circle(0.0, 0.0, 20.0);
        path.rect(-5.0, -5.0, 10.0, 10.0);
        let a = triangulate_path(&path, WindingRule::EvenOdd).triangles();
        let b = triangulate_path(&path, WindingRule::EvenOdd).triangles();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
