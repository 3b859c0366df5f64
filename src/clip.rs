//! Boolean clipping by plane sweep.
//!
//! Input paths are flattened and snapped to the grid, split into segments
//! tagged with a set and a direction weight, and swept left to right. The
//! sweep splits segments where they cross, merges collinear overlaps and
//! tracks, per set, the winding number just below every segment. A segment
//! whose two sides disagree under the clip rule is part of the result and
//! is emitted with the interior on its left. The emitted edges are finally
//! chained into closed contours.

use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::conv_curve::flatten;
use crate::edge::{Edge, EdgeIntersection};
use crate::path_storage::Path;
use crate::point::Point;
use crate::sweep::{
    cmp_points, compare_queue, compare_status, grid_key, segments_collinear, snap_point,
    SegmentRef, SweepEvent, SweepSegment, SNAP_STEP,
};

// ============================================================================
// Rules
// ============================================================================

/// Maps a winding number to inside / outside.
///
/// Two `Custom` rules never compare equal, even when they wrap the same
/// function.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
    Positive,
    Negative,
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(fn(i32) -> bool),
}

impl WindingRule {
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            WindingRule::NonZero => winding != 0,
            WindingRule::EvenOdd => winding & 1 != 0,
            WindingRule::Positive => winding > 0,
            WindingRule::Negative => winding < 0,
            WindingRule::Custom(f) => f(winding),
        }
    }
}

impl PartialEq for WindingRule {
    fn eq(&self, other: &Self) -> bool {
        use WindingRule::*;
        matches!(
            (self, other),
            (NonZero, NonZero) | (EvenOdd, EvenOdd) | (Positive, Positive) | (Negative, Negative)
        )
    }
}

/// Two-operand boolean operation between the subject (set 0) and the clip
/// group (all other sets, windings summed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClipOp {
    Union,
    Intersection,
    Difference,
    Xor,
}

impl ClipOp {
    #[inline]
    pub fn apply(self, subject: bool, clip: bool) -> bool {
        match self {
            ClipOp::Union => subject || clip,
            ClipOp::Intersection => subject && clip,
            ClipOp::Difference => subject && !clip,
            ClipOp::Xor => subject != clip,
        }
    }
}

/// Decides from the per-set winding numbers whether a point is in the result.
#[derive(Clone, Copy)]
pub enum ClipRule {
    /// Every set counts the same; the summed winding is tested.
    Fill(WindingRule),
    /// Subject and clip group tested separately, then combined.
    Boolean(ClipOp, WindingRule),
    /// Arbitrary predicate over the winding of each set.
    Custom(fn(&[i32]) -> bool),
}

impl ClipRule {
    pub fn is_inside(&self, winding: &[i32]) -> bool {
        match *self {
            ClipRule::Fill(rule) => rule.is_inside(winding.iter().sum()),
            ClipRule::Boolean(op, rule) => {
                let subject = rule.is_inside(winding.first().copied().unwrap_or(0));
                let clip = rule.is_inside(winding.iter().skip(1).sum());
                op.apply(subject, clip)
            }
            ClipRule::Custom(f) => f(winding),
        }
    }
}

impl core::fmt::Debug for ClipRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClipRule::Fill(rule) => f.debug_tuple("Fill").field(rule).finish(),
            ClipRule::Boolean(op, rule) => f.debug_tuple("Boolean").field(op).field(rule).finish(),
            ClipRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Default for ClipRule {
    fn default() -> Self {
        ClipRule::Fill(WindingRule::NonZero)
    }
}

/// A directed result edge with the payload of the input segment it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipEdge {
    pub edge: Edge,
    pub sref: SegmentRef,
}

// ============================================================================
// Clipper
// ============================================================================

/// Collects input paths and runs boolean sweeps over them.
///
/// A sweep costs O(n·k) for n segments when at most k of them cross any one
/// vertical line.
pub struct Clipper {
    segments: Vec<SweepSegment>,
    num_sets: usize,
    tolerance: f64,
    next_data: usize,
}

impl Clipper {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            num_sets: 0,
            tolerance: 0.25,
            next_data: 0,
        }
    }

    /// Maximum deviation allowed when flattening curves, in path units.
    pub fn set_tolerance(&mut self, t: f64) {
        if t > 0.0 && t.is_finite() {
            self.tolerance = t;
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.num_sets = 0;
        self.next_data = 0;
    }

    /// Add every subpath of `path` to `set`. Subpaths are closed implicitly.
    /// The path's ordinal among added paths becomes the segments' payload.
    pub fn add_path(&mut self, path: &Path, set: usize) {
        let data = self.next_data;
        self.add_path_with_data(path, set, data);
    }

    pub fn add_path_with_data(&mut self, path: &Path, set: usize, data: usize) {
        self.next_data = self.next_data.max(data + 1);
        self.num_sets = self.num_sets.max(set + 1);
        for poly in flatten(path, 0.25 / self.tolerance) {
            let pts: Vec<Point> = poly.points.iter().map(|&p| snap_point(p)).collect();
            for (i, &a) in pts.iter().enumerate() {
                let b = pts[(i + 1) % pts.len()];
                self.add_edge(a, b, set, data);
            }
        }
    }

    /// Add a single directed edge. The edge is snapped to the grid; a
    /// zero-length edge is dropped.
    pub fn add_edge(&mut self, a: Point, b: Point, set: usize, data: usize) {
        self.num_sets = self.num_sets.max(set + 1);
        let id = self.segments.len();
        match SweepSegment::from_edge(id, snap_point(a), snap_point(b), set, data) {
            Some(seg) => self.segments.push(seg),
            None => log::trace!("dropped zero-length edge at ({}, {})", a.x, a.y),
        }
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Run the sweep and return the result edges, directed so that the
    /// interior lies to their left.
    pub fn execute_edges(&self, rule: &ClipRule) -> Vec<ClipEdge> {
        let mut sweep = Sweep::new(&self.segments, self.num_sets.max(1), rule);
        sweep.run();
        sweep.output
    }

    /// Run the sweep and assemble the result into closed contours. Outer
    /// boundaries run counter-clockwise (positive area), holes clockwise.
    pub fn execute(&self, rule: &ClipRule) -> Path {
        build_contours(&self.execute_edges(rule))
    }
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Convenience operations
// ============================================================================

fn boolean(a: &Path, b: &Path, op: ClipOp) -> Path {
    let mut clipper = Clipper::new();
    clipper.add_path(a, 0);
    clipper.add_path(b, 1);
    clipper.execute(&ClipRule::Boolean(op, WindingRule::NonZero))
}

pub fn union(a: &Path, b: &Path) -> Path {
    boolean(a, b, ClipOp::Union)
}

pub fn intersection(a: &Path, b: &Path) -> Path {
    boolean(a, b, ClipOp::Intersection)
}

pub fn difference(a: &Path, b: &Path) -> Path {
    boolean(a, b, ClipOp::Difference)
}

pub fn xor(a: &Path, b: &Path) -> Path {
    boolean(a, b, ClipOp::Xor)
}

/// Resolve self-intersections and overlaps of `path` under `rule`.
pub fn simplify(path: &Path, rule: WindingRule) -> Path {
    let mut clipper = Clipper::new();
    clipper.add_path(path, 0);
    clipper.execute(&ClipRule::Fill(rule))
}

// ============================================================================
// Sweep engine
// ============================================================================

struct QueueEntry(SweepEvent);

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // BinaryHeap pops the maximum, so the queue order is reversed here
    fn cmp(&self, other: &Self) -> Ordering {
        compare_queue(&other.0, &self.0)
    }
}

#[derive(Default)]
struct SweepStats {
    events: usize,
    stale: usize,
    splits: usize,
    merges: usize,
}

/// Per-segment sweep state next to the immutable-id geometry.
struct Winding {
    contrib: Vec<i32>,
    below: Vec<i32>,
    in_status: bool,
    dead: bool,
}

/// Sweep state. The status is a `Vec` kept in `compare_status` order, so
/// inserting and locating a segment is linear in the number of segments
/// crossing the sweep line and the sweep is quadratic in the worst case.
struct Sweep<'r> {
    segs: Vec<SweepSegment>,
    wind: Vec<Winding>,
    queue: BinaryHeap<QueueEntry>,
    status: Vec<usize>,
    num_sets: usize,
    rule: &'r ClipRule,
    current: Point,
    output: Vec<ClipEdge>,
    stats: SweepStats,
}

impl<'r> Sweep<'r> {
    fn new(input: &[SweepSegment], num_sets: usize, rule: &'r ClipRule) -> Self {
        let mut sweep = Self {
            segs: Vec::with_capacity(input.len()),
            wind: Vec::with_capacity(input.len()),
            queue: BinaryHeap::with_capacity(input.len() * 2),
            status: Vec::new(),
            num_sets,
            rule,
            current: Point::ORIGIN,
            output: Vec::new(),
            stats: SweepStats::default(),
        };
        for seg in input {
            let mut contrib = vec![0; num_sets];
            contrib[seg.sref.set] = seg.sref.weight;
            sweep.push_segment(seg.left, seg.right, seg.sref, contrib);
        }
        sweep
    }

    fn push_segment(&mut self, left: Point, right: Point, sref: SegmentRef, contrib: Vec<i32>) -> usize {
        let id = self.segs.len();
        self.segs.push(SweepSegment { id, left, right, sref });
        self.wind.push(Winding {
            contrib,
            below: vec![0; self.num_sets],
            in_status: false,
            dead: false,
        });
        self.queue.push(QueueEntry(SweepEvent::new(left, right, true, id)));
        self.queue.push(QueueEntry(SweepEvent::new(right, left, false, id)));
        id
    }

    fn run(&mut self) {
        while let Some(top) = self.queue.peek() {
            self.current = top.0.point;
            let mut inserted = Vec::new();
            // events at one point arrive in rounds: splits and merges made
            // while handling a round may queue more events at the same point
            loop {
                let batch = self.pop_batch();
                if batch.is_empty() {
                    break;
                }
                for ev in batch.iter().filter(|ev| !ev.left) {
                    self.process_right(ev);
                }
                for ev in batch.iter().filter(|ev| ev.left) {
                    if self.process_left(ev) {
                        inserted.push(ev.segment);
                    }
                }
            }
            self.assign_below(&inserted);
        }
        log::debug!(
            "sweep: {} segments, {} events ({} stale), {} splits, {} merges, {} edges out",
            self.segs.len(),
            self.stats.events,
            self.stats.stale,
            self.stats.splits,
            self.stats.merges,
            self.output.len()
        );
    }

    fn pop_batch(&mut self) -> Vec<SweepEvent> {
        let mut batch = Vec::new();
        while let Some(top) = self.queue.peek() {
            if top.0.point != self.current {
                break;
            }
            if let Some(QueueEntry(ev)) = self.queue.pop() {
                batch.push(ev);
            }
        }
        self.stats.events += batch.len();
        batch
    }

    fn position(&self, s: usize) -> Option<usize> {
        self.status.iter().position(|&x| x == s)
    }

    fn process_right(&mut self, ev: &SweepEvent) {
        let s = ev.segment;
        let w = &self.wind[s];
        if w.dead || !w.in_status || self.segs[s].right != ev.point {
            self.stats.stale += 1;
            log::trace!("stale right event for segment {}", s);
            return;
        }
        let Some(idx) = self.position(s) else {
            return;
        };
        self.emit(s);
        self.status.remove(idx);
        self.wind[s].in_status = false;
        if idx > 0 && idx < self.status.len() {
            self.check_pair(self.status[idx - 1], self.status[idx]);
        }
    }

    /// Returns `true` when the segment entered the status.
    fn process_left(&mut self, ev: &SweepEvent) -> bool {
        let s = ev.segment;
        if self.wind[s].dead || self.wind[s].in_status || self.segs[s].left != ev.point {
            self.stats.stale += 1;
            return false;
        }
        let seg = self.segs[s];
        let idx = self
            .status
            .iter()
            .position(|&o| compare_status(&seg, &self.segs[o]) == Ordering::Less)
            .unwrap_or(self.status.len());
        self.status.insert(idx, s);
        self.wind[s].in_status = true;
        self.check_neighbors(s);
        true
    }

    fn check_neighbors(&mut self, s: usize) {
        let Some(idx) = self.position(s) else {
            return;
        };
        let above = self.status.get(idx + 1).copied();
        if idx > 0 {
            self.check_pair(self.status[idx - 1], s);
        }
        if let Some(a) = above {
            if !self.wind[s].dead && self.wind[s].in_status && self.wind[a].in_status {
                self.check_pair(s, a);
            }
        }
    }

    /// Resolve the geometric relation between two status neighbors.
    fn check_pair(&mut self, a: usize, b: usize) {
        if self.wind[a].dead || self.wind[b].dead {
            return;
        }
        let (sa, sb) = (self.segs[a], self.segs[b]);
        if segments_collinear(&sa, &sb) {
            self.resolve_overlap(a, b);
            return;
        }
        let ea = Edge::new(sa.left, sa.right);
        let eb = Edge::new(sb.left, sb.right);
        if let EdgeIntersection::Point(q) = ea.intersect(&eb, SNAP_STEP) {
            let q = snap_point(q);
            for s in [a, b] {
                if self.segs[s].has_interior(q) && cmp_points(q, self.current) != Ordering::Less {
                    self.split(s, q);
                }
            }
        }
    }

    fn resolve_overlap(&mut self, a: usize, b: usize) {
        let (sa, sb) = (self.segs[a], self.segs[b]);
        let max_left = if cmp_points(sa.left, sb.left) == Ordering::Less { sb.left } else { sa.left };
        let min_right = if cmp_points(sa.right, sb.right) == Ordering::Less { sa.right } else { sb.right };
        if cmp_points(max_left, min_right) != Ordering::Less {
            // touching end to end
            return;
        }
        if sa.left == sb.left {
            match cmp_points(sa.right, sb.right) {
                Ordering::Less => self.split(b, sa.right),
                Ordering::Greater => self.split(a, sb.right),
                Ordering::Equal => {}
            }
            self.merge(a, b);
        } else {
            let (early, late) = if cmp_points(sa.left, sb.left) == Ordering::Less { (a, b) } else { (b, a) };
            let q = self.segs[late].left;
            if cmp_points(q, self.current) != Ordering::Less {
                self.split(early, q);
            }
        }
    }

    /// Shorten `s` to end at `q` and queue the remainder as a new segment.
    fn split(&mut self, s: usize, q: Point) {
        let seg = self.segs[s];
        let old_right = seg.right;
        self.segs[s].right = q;
        self.queue.push(QueueEntry(SweepEvent::new(q, seg.left, false, s)));
        let contrib = self.wind[s].contrib.clone();
        self.push_segment(q, old_right, seg.sref, contrib);
        self.stats.splits += 1;
    }

    /// Fold two identical segments into the one with the smaller id.
    fn merge(&mut self, a: usize, b: usize) {
        let (keep, drop) = if a < b { (a, b) } else { (b, a) };
        for k in 0..self.num_sets {
            let c = self.wind[drop].contrib[k];
            self.wind[keep].contrib[k] += c;
        }
        // a survivor whose winding was already summed counted `drop` if it
        // sat below; those contributions now belong to the survivor itself
        if let (Some(di), Some(ki)) = (self.position(drop), self.position(keep)) {
            if di < ki {
                for k in 0..self.num_sets {
                    let c = self.wind[drop].contrib[k];
                    self.wind[keep].below[k] -= c;
                }
            }
            self.status.remove(di);
        }
        self.wind[drop].dead = true;
        self.wind[drop].in_status = false;
        self.stats.merges += 1;
        self.check_neighbors(keep);
    }

    /// Winding below each segment that entered the status at the current
    /// point: the sum of the contributions of everything under it.
    fn assign_below(&mut self, inserted: &[usize]) {
        if inserted.is_empty() {
            return;
        }
        let mut sum = vec![0; self.num_sets];
        for &s in &self.status {
            if inserted.contains(&s) {
                self.wind[s].below.copy_from_slice(&sum);
            }
            for (acc, c) in sum.iter_mut().zip(&self.wind[s].contrib) {
                *acc += c;
            }
        }
    }

    fn emit(&mut self, s: usize) {
        let w = &self.wind[s];
        let inside_below = self.rule.is_inside(&w.below);
        let above: Vec<i32> = w.below.iter().zip(&w.contrib).map(|(b, c)| b + c).collect();
        let inside_above = self.rule.is_inside(&above);
        if inside_below == inside_above {
            return;
        }
        let seg = self.segs[s];
        let edge = if inside_above {
            Edge::new(seg.left, seg.right)
        } else {
            Edge::new(seg.right, seg.left)
        };
        self.output.push(ClipEdge { edge, sref: seg.sref });
    }
}

// ============================================================================
// Contour assembly
// ============================================================================

type Key = (i64, i64);

/// Chain directed edges into closed contours. At a vertex with several
/// unused outgoing edges the one turning furthest left is taken, which
/// keeps contours that touch at a vertex apart.
fn build_contours(edges: &[ClipEdge]) -> Path {
    let mut outgoing: BTreeMap<Key, Vec<usize>> = BTreeMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(grid_key(e.edge.a)).or_default().push(i);
    }
    let mut used = vec![false; edges.len()];
    let mut path = Path::new();

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let start = grid_key(edges[first].edge.a);
        let mut ring = vec![edges[first].edge.a];
        let mut cur = first;
        loop {
            let e = edges[cur].edge;
            let at = grid_key(e.b);
            if at == start {
                break;
            }
            ring.push(e.b);
            let din = e.vector();
            let next = outgoing.get(&at).and_then(|cands| {
                cands
                    .iter()
                    .copied()
                    .filter(|&c| !used[c])
                    .map(|c| {
                        let dout = edges[c].edge.vector();
                        (c, din.cross(dout).atan2(din.dot(dout)))
                    })
                    .max_by(|x, y| x.1.total_cmp(&y.1).then_with(|| y.0.cmp(&x.0)))
                    .map(|(c, _)| c)
            });
            match next {
                Some(n) => {
                    used[n] = true;
                    cur = n;
                }
                None => {
                    log::trace!("contour left open at ({}, {})", e.b.x, e.b.y);
                    break;
                }
            }
        }
        remove_collinear(&mut ring);
        if ring.len() >= 3 {
            path.polygon(&ring, true);
        }
    }
    path
}

fn remove_collinear(ring: &mut Vec<Point>) {
    let mut changed = true;
    while changed && ring.len() >= 3 {
        changed = false;
        let n = ring.len();
        for i in 0..n {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let v = ring[i];
            let chord = next - prev;
            let len = chord.length();
            let off = if len == 0.0 {
                v.distance(prev)
            } else {
                (chord.cross(v - prev) / len).abs()
            };
            if off < SNAP_STEP {
                ring.remove(i);
                changed = true;
                break;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
