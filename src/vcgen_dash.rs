//! Dash generator.
//!
//! Cuts flattened centerlines into the "on" intervals of a dash pattern.
//! Each dash becomes an open polyline subpath, so a dash that runs across a
//! corner keeps that corner and gets a proper join when stroked.

use crate::array::{VertexDist, VertexSequence};
use crate::conv_curve::{flatten, Polyline};
use crate::path_storage::Path;
use crate::style::DashPattern;

// ============================================================================
// VcgenDash
// ============================================================================

/// Dash generator holding alternating dash and gap lengths.
#[derive(Debug, Clone, Default)]
pub struct VcgenDash {
    dashes: Vec<f64>,
    total_dash_len: f64,
    dash_start: f64,
}

impl VcgenDash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator for `pattern`; an odd interval list is repeated once so
    /// dashes and gaps alternate.
    pub fn from_pattern(pattern: &DashPattern) -> Self {
        let mut gen = Self::new();
        let intervals = pattern.intervals();
        let mut cycle: Vec<f64> = intervals.to_vec();
        if cycle.len() % 2 == 1 {
            cycle.extend_from_slice(intervals);
        }
        for pair in cycle.chunks(2) {
            gen.add_dash(pair[0], pair[1]);
        }
        gen.set_dash_start(pattern.offset);
        gen
    }

    pub fn remove_all_dashes(&mut self) {
        self.dashes.clear();
        self.total_dash_len = 0.0;
    }

    /// Append one dash and the gap after it. Negative lengths count as zero.
    pub fn add_dash(&mut self, dash_len: f64, gap_len: f64) {
        let dash_len = dash_len.max(0.0);
        let gap_len = gap_len.max(0.0);
        self.total_dash_len += dash_len + gap_len;
        self.dashes.push(dash_len);
        self.dashes.push(gap_len);
    }

    /// Distance into the pattern at which every subpath starts.
    pub fn set_dash_start(&mut self, ds: f64) {
        self.dash_start = ds;
    }

    pub fn dash_start(&self) -> f64 {
        self.dash_start
    }

    pub fn total_dash_len(&self) -> f64 {
        self.total_dash_len
    }

    /// Whether the pattern cuts anything. A zero-length pattern does not.
    pub fn is_active(&self) -> bool {
        self.total_dash_len > 0.0 && self.total_dash_len.is_finite()
    }

    /// Index of the current dash and the distance already consumed in it.
    fn calc_dash_start(&self) -> (usize, f64) {
        let mut ds = self.dash_start.rem_euclid(self.total_dash_len);
        let mut curr = 0;
        while ds > 0.0 && ds >= self.dashes[curr] {
            ds -= self.dashes[curr];
            curr = (curr + 1) % self.dashes.len();
        }
        (curr, ds)
    }

    /// Dash every polyline into `out`.
    pub fn generate(&self, polylines: &[Polyline], out: &mut Path) {
        if !self.is_active() {
            return;
        }
        let mut seq = VertexSequence::new();
        for poly in polylines {
            seq.clear();
            for &p in &poly.points {
                seq.add(VertexDist::from_point(p));
            }
            seq.close(poly.closed);
            self.dash_sequence(&seq, poly.closed, out);
        }
    }

    fn dash_sequence(&self, seq: &VertexSequence, closed: bool, out: &mut Path) {
        let n = seq.size();
        if n < 2 {
            return;
        }
        let segments = if closed { n } else { n - 1 };
        let (mut curr_dash, mut curr_dash_start) = self.calc_dash_start();
        let mut drawing = false;

        for i in 0..segments {
            let v1 = seq[i];
            let v2 = seq[(i + 1) % n];
            let len = v1.dist;
            let mut pos = 0.0;

            while pos < len {
                let rest = self.dashes[curr_dash] - curr_dash_start;
                let finished = rest <= len - pos;
                let step = if finished { rest } else { len - pos };
                let on = curr_dash % 2 == 0;

                if on {
                    if !drawing {
                        let a = v1.pt.lerp(v2.pt, pos / len);
                        out.move_to(a.x, a.y);
                        drawing = true;
                    }
                    let b = if finished { v1.pt.lerp(v2.pt, (pos + step) / len) } else { v2.pt };
                    out.line_to(b.x, b.y);
                }

                pos += step;
                if finished {
                    curr_dash = (curr_dash + 1) % self.dashes.len();
                    curr_dash_start = 0.0;
                    drawing = false;
                } else {
                    curr_dash_start += step;
                    pos = len;
                }
            }
        }
    }
}

/// Flatten `path` and cut it with `pattern`. An inactive pattern returns
/// the path unchanged.
pub fn dash_path(path: &Path, pattern: &DashPattern, approximation_scale: f64) -> Path {
    let gen = VcgenDash::from_pattern(pattern);
    if !gen.is_active() {
        return path.clone();
    }
    let mut out = Path::new();
    gen.generate(&flatten(path, approximation_scale), &mut out);
    out
}

// ============================================================================
// Tests
// ============================================================================
