//! Half-edge mesh stored as an index arena.
//!
//! Every undirected edge is a pair of half-edges at indices `2k` and
//! `2k + 1`, so `sym(e) == e ^ 1`. Each half-edge records its origin vertex
//! and its neighbors in the counter-clockwise ring around that origin
//! (`onext`, and `oprev` as the inverse). `lnext`, the next half-edge around
//! the left face, is derived as `oprev(sym(e))`. `splice` is the only
//! operation that rewires the rings; `connect`, `delete_edge` and `flip` are
//! built from it.

pub mod triangulate;

use std::collections::BTreeMap;

use crate::conv_curve::flatten;
use crate::edge::Edge;
use crate::math::calc_polygon_area;
use crate::path_storage::Path;
use crate::point::Point;

pub use triangulate::triangulate_path;

/// Index of a half-edge in the arena.
pub type EdgeId = usize;

/// Index of a vertex.
pub type VertexId = usize;

/// One half-edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshEdge {
    /// Next half-edge counter-clockwise around the origin.
    pub onext: EdgeId,
    /// Next half-edge clockwise around the origin.
    pub oprev: EdgeId,
    pub org: VertexId,
    pub alive: bool,
    /// Input boundary edge; never flipped.
    pub constrained: bool,
    /// The face on the left is filled.
    pub inside_left: bool,
}

/// `sym` of a half-edge: the same edge traversed the other way.
#[inline]
pub const fn sym(e: EdgeId) -> EdgeId {
    e ^ 1
}

/// Half-edge mesh arena.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    edges: Vec<MeshEdge>,
    verts: Vec<Point>,
    vert_ids: BTreeMap<(u64, u64), VertexId>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------
    // Vertices
    // ---------------------------------------------------------------

    /// Vertex id of `p`, creating it on first use. Points are identified
    /// by their exact bit patterns.
    pub fn vertex(&mut self, p: Point) -> VertexId {
        // fold -0.0 into 0.0 so both spellings name one vertex
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        if let Some(&v) = self.vert_ids.get(&key) {
            return v;
        }
        let v = self.verts.len();
        self.verts.push(p);
        self.vert_ids.insert(key, v);
        v
    }

    pub fn point(&self, v: VertexId) -> Point {
        self.verts[v]
    }

    pub fn num_vertices(&self) -> usize {
        self.verts.len()
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    #[inline]
    pub fn sym(&self, e: EdgeId) -> EdgeId {
        sym(e)
    }

    #[inline]
    pub fn onext(&self, e: EdgeId) -> EdgeId {
        self.edges[e].onext
    }

    #[inline]
    pub fn oprev(&self, e: EdgeId) -> EdgeId {
        self.edges[e].oprev
    }

    /// Next half-edge counter-clockwise around the left face.
    #[inline]
    pub fn lnext(&self, e: EdgeId) -> EdgeId {
        self.oprev(sym(e))
    }

    /// Previous half-edge around the left face.
    #[inline]
    pub fn lprev(&self, e: EdgeId) -> EdgeId {
        sym(self.onext(e))
    }

    /// Next half-edge counter-clockwise around the destination.
    #[inline]
    pub fn dnext(&self, e: EdgeId) -> EdgeId {
        sym(self.onext(sym(e)))
    }

    #[inline]
    pub fn org(&self, e: EdgeId) -> VertexId {
        self.edges[e].org
    }

    #[inline]
    pub fn dest(&self, e: EdgeId) -> VertexId {
        self.edges[sym(e)].org
    }

    #[inline]
    pub fn org_point(&self, e: EdgeId) -> Point {
        self.verts[self.org(e)]
    }

    #[inline]
    pub fn dest_point(&self, e: EdgeId) -> Point {
        self.verts[self.dest(e)]
    }

    pub fn edge(&self, e: EdgeId) -> Edge {
        Edge::new(self.org_point(e), self.dest_point(e))
    }

    pub fn record(&self, e: EdgeId) -> &MeshEdge {
        &self.edges[e]
    }

    #[inline]
    pub fn is_alive(&self, e: EdgeId) -> bool {
        self.edges[e].alive
    }

    #[inline]
    pub fn is_constrained(&self, e: EdgeId) -> bool {
        self.edges[e].constrained
    }

    #[inline]
    pub fn inside_left(&self, e: EdgeId) -> bool {
        self.edges[e].inside_left
    }

    pub fn set_inside_left(&mut self, e: EdgeId, inside: bool) {
        self.edges[e].inside_left = inside;
    }

    /// Number of half-edges ever created, dead ones included.
    pub fn capacity(&self) -> usize {
        self.edges.len()
    }

    /// Number of live undirected edges.
    pub fn num_edges(&self) -> usize {
        self.edges.iter().step_by(2).filter(|e| e.alive).count()
    }

    /// Live half-edges in index order.
    pub fn live_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).filter(move |&e| self.edges[e].alive)
    }

    // ---------------------------------------------------------------
    // Topology
    // ---------------------------------------------------------------

    /// Create an isolated edge `edge.a → edge.b`. Both half-edges are
    /// alone in their origin rings, so each is the other's `lnext`.
    pub fn create_pair(&mut self, edge: &Edge) -> EdgeId {
        let va = self.vertex(edge.a);
        let vb = self.vertex(edge.b);
        self.make_pair(va, vb)
    }

    fn make_pair(&mut self, va: VertexId, vb: VertexId) -> EdgeId {
        let e = self.edges.len();
        for (id, org) in [(e, va), (e + 1, vb)] {
            self.edges.push(MeshEdge {
                onext: id,
                oprev: id,
                org,
                alive: true,
                constrained: false,
                inside_left: false,
            });
        }
        e
    }

    /// Exchange `onext(a)` and `onext(b)`. Joins two origin rings into one,
    /// or splits one ring in two; applying it twice restores the mesh.
    pub fn splice(&mut self, a: EdgeId, b: EdgeId) {
        let an = self.edges[a].onext;
        let bn = self.edges[b].onext;
        self.edges[a].onext = bn;
        self.edges[b].onext = an;
        self.edges[bn].oprev = a;
        self.edges[an].oprev = b;
    }

    /// Add an edge from `org(b1)` to `org(b2)`, placed counter-clockwise
    /// after `b1` and after `b2` in their rings.
    pub fn connect_at(&mut self, b1: EdgeId, b2: EdgeId) -> EdgeId {
        let e = self.make_pair(self.org(b1), self.org(b2));
        self.splice(e, b1);
        self.splice(sym(e), b2);
        e
    }

    /// Add an edge from `dest(a)` to `org(b)` across their common left face,
    /// splitting it. Afterwards `lnext(a) == e` and `lnext(e) == b`.
    pub fn connect(&mut self, a: EdgeId, b: EdgeId) -> EdgeId {
        self.connect_at(self.lnext(a), b)
    }

    /// Unlink an edge from both rings and retire it.
    pub fn delete_edge(&mut self, e: EdgeId) {
        let s = sym(e);
        self.splice(e, self.oprev(e));
        self.splice(s, self.oprev(s));
        self.edges[e].alive = false;
        self.edges[s].alive = false;
    }

    /// Rotate an edge inside the quadrilateral formed by its two adjacent
    /// triangles so that it joins the other two corners.
    pub fn flip(&mut self, e: EdgeId) {
        let s = sym(e);
        let a = self.oprev(e);
        let b = self.oprev(s);
        self.splice(e, a);
        self.splice(s, b);
        let la = self.lnext(a);
        let lb = self.lnext(b);
        self.splice(e, la);
        self.splice(s, lb);
        self.edges[e].org = self.dest(a);
        self.edges[s].org = self.dest(b);
    }

    // ---------------------------------------------------------------
    // Construction from paths
    // ---------------------------------------------------------------

    /// Build a mesh from the closed contours of `path`. Contour edges are
    /// constrained and have the filled side on their left, so the path
    /// should already be in clip output form (outer boundaries
    /// counter-clockwise, holes clockwise).
    pub fn from_path(path: &Path) -> Mesh {
        let mut mesh = Mesh::new();
        let mut seen: BTreeMap<(VertexId, VertexId), EdgeId> = BTreeMap::new();

        for poly in flatten(path, 1.0) {
            let n = poly.points.len();
            if n < 2 {
                continue;
            }
            for i in 0..n {
                let va = mesh.vertex(poly.points[i]);
                let vb = mesh.vertex(poly.points[(i + 1) % n]);
                if va == vb {
                    continue;
                }
                let key = (va.min(vb), va.max(vb));
                if let Some(&existing) = seen.get(&key) {
                    // the same edge run the other way: filled on both sides
                    if mesh.org(existing) != va {
                        mesh.edges[sym(existing)].inside_left = true;
                    }
                    continue;
                }
                let e = mesh.make_pair(va, vb);
                mesh.edges[e].constrained = true;
                mesh.edges[sym(e)].constrained = true;
                mesh.edges[e].inside_left = true;
                seen.insert(key, e);
            }
        }

        mesh.link_vertex_rings();
        log::debug!(
            "mesh: {} vertices, {} edges from path",
            mesh.num_vertices(),
            mesh.num_edges()
        );
        mesh
    }

    /// Sort the half-edges leaving every vertex by angle and splice them
    /// into counter-clockwise rings.
    fn link_vertex_rings(&mut self) {
        let mut around: Vec<Vec<EdgeId>> = vec![Vec::new(); self.verts.len()];
        for e in 0..self.edges.len() {
            if self.edges[e].alive && self.edges[e].onext == e {
                around[self.edges[e].org].push(e);
            }
        }
        for ring in &mut around {
            ring.sort_by(|&a, &b| {
                let da = self.edge(a).vector();
                let db = self.edge(b).vector();
                da.y.atan2(da.x).total_cmp(&db.y.atan2(db.x)).then(a.cmp(&b))
            });
        }
        for ring in around {
            for w in ring.windows(2) {
                self.splice(w[0], w[1]);
            }
        }
    }

    // ---------------------------------------------------------------
    // Faces
    // ---------------------------------------------------------------

    /// The half-edges of the face left of `e`, starting at `e`.
    ///
    /// # Panics
    ///
    /// If the `lnext` walk does not return to `e`.
    pub fn face(&self, e: EdgeId) -> Vec<EdgeId> {
        let mut out = vec![e];
        let mut cur = self.lnext(e);
        while cur != e {
            assert!(
                self.edges[cur].alive && out.len() <= self.edges.len(),
                "face cycle from half-edge {} does not close",
                e
            );
            out.push(cur);
            cur = self.lnext(cur);
        }
        out
    }

    /// Every face cycle of live half-edges, each listed once, in order of
    /// its smallest half-edge index.
    pub fn faces(&self) -> Vec<Vec<EdgeId>> {
        let mut visited = vec![false; self.edges.len()];
        let mut out = Vec::new();
        for e in self.live_edges() {
            if visited[e] {
                continue;
            }
            let f = self.face(e);
            for &x in &f {
                visited[x] = true;
            }
            out.push(f);
        }
        out
    }

    /// Face cycles whose left side is filled.
    pub fn interior_faces(&self) -> Vec<Vec<EdgeId>> {
        self.faces()
            .into_iter()
            .filter(|f| f.iter().all(|&e| self.edges[e].inside_left))
            .collect()
    }

    /// Signed area of the face cycle through `face`.
    pub fn face_area(&self, face: &[EdgeId]) -> f64 {
        let pts: Vec<Point> = face.iter().map(|&e| self.org_point(e)).collect();
        calc_polygon_area(&pts)
    }

    /// Filled triangles, each counter-clockwise.
    pub fn triangles(&self) -> Vec<[Point; 3]> {
        self.interior_faces()
            .into_iter()
            .filter(|f| f.len() == 3)
            .map(|f| [self.org_point(f[0]), self.org_point(f[1]), self.org_point(f[2])])
            .collect()
    }

    /// Verify the ring and face structure.
    ///
    /// # Panics
    ///
    /// On any broken invariant: a live half-edge with a dead twin, rings
    /// whose `onext` and `oprev` disagree or mix origins, or a face cycle
    /// that does not close.
    pub fn check(&self) {
        for e in self.live_edges() {
            let rec = &self.edges[e];
            assert!(self.edges[sym(e)].alive, "half-edge {} has a dead sym", e);
            assert!(
                self.edges[rec.onext].alive && self.edges[rec.oprev].alive,
                "half-edge {} links to a dead half-edge",
                e
            );
            assert_eq!(self.edges[rec.onext].oprev, e, "onext/oprev mismatch at {}", e);
            assert_eq!(self.edges[rec.oprev].onext, e, "oprev/onext mismatch at {}", e);
            assert_eq!(
                self.edges[rec.onext].org, rec.org,
                "origin ring of half-edge {} mixes vertices",
                e
            );
            self.face(e);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
