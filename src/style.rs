//! Fill and stroke style records.

use crate::basics::FillingRule;
use crate::color::Rgba8;
use crate::comp_op::CompOp;
use crate::math_stroke::{LineCap, LineJoin};

// ============================================================================
// DashPattern
// ============================================================================

/// Alternating dash and gap lengths plus a start offset into the pattern.
///
/// Negative intervals count as zero. An odd number of intervals is repeated
/// once so dashes and gaps alternate. A pattern whose total length is zero
/// disables dashing.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashPattern {
    intervals: Vec<f64>,
    pub offset: f64,
}

impl DashPattern {
    pub fn new(intervals: Vec<f64>, offset: f64) -> Self {
        Self { intervals, offset }
    }

    pub fn intervals(&self) -> &[f64] {
        &self.intervals
    }

    pub fn is_active(&self) -> bool {
        let total: f64 = self.intervals.iter().map(|v| v.max(0.0)).sum();
        total > 0.0 && total.is_finite()
    }
}

// ============================================================================
// StrokeStyle
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeStyle {
    /// Full stroke width.
    pub width: f64,
    pub join: LineJoin,
    pub cap: LineCap,
    /// Largest miter extension, in half-widths, before the join falls back.
    pub miter_limit: f64,
    pub dash: Option<DashPattern>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            join: LineJoin::default(),
            cap: LineCap::default(),
            miter_limit: 4.0,
            dash: None,
        }
    }
}

impl StrokeStyle {
    pub fn new(width: f64) -> Self {
        Self { width, ..Self::default() }
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = Some(dash);
        self
    }
}

// ============================================================================
// FillStyle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FillStyle {
    /// Premultiplied fill color.
    pub color: Rgba8,
    pub rule: FillingRule,
    pub op: CompOp,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::BLACK,
            rule: FillingRule::NonZero,
            op: CompOp::SrcOver,
        }
    }
}

impl FillStyle {
    pub fn new(color: Rgba8) -> Self {
        Self { color, ..Self::default() }
    }

    pub fn with_rule(mut self, rule: FillingRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_op(mut self, op: CompOp) -> Self {
        self.op = op;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
