//! The collinear-fusion segment buffer (spec §3, §4.3).
//!
//! Holds pending feed end-points that share the orientation (`a,b,c,u,v,w`)
//! of the chain's starting point and whose XYZ lies within
//! `naivecam_tolerance` of the first-to-last chord. The buffer itself
//! knows nothing about envelopes or messages — [`crate::engine::CanonEngine`]
//! owns the flush-to-message translation; this module only owns the
//! linkability predicate and the bounded entry list.

use crate::units::Pose;

/// Maximum number of pending points the buffer will hold (spec §3).
pub const MAX_BUFFERED: usize = 100;

/// One pending feed end-point, with the G-code line number that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedPoint {
    pub pose: Pose,
    pub line_number: u32,
}

/// Ordered, bounded buffer of pending feed end-points.
#[derive(Debug, Clone, Default)]
pub struct SegmentBuffer {
    entries: Vec<BufferedPoint>,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn last(&self) -> Option<&BufferedPoint> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[BufferedPoint] {
        &self.entries
    }

    pub fn push(&mut self, pose: Pose, line_number: u32) {
        self.entries.push(BufferedPoint { pose, line_number });
    }

    /// Empty the buffer, discarding any pending points. Called by the
    /// engine only after it has finished emitting the flush message.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The perpendicular distance from `point` to the segment spanning
    /// `chain_start -> candidate`, per spec §4.3: `t = <M, P-B> / <M,M>`
    /// clamped to `[0,1]`, `D = |P - (B + t*M)|`, evaluated on XYZ only.
    fn perpendicular_distance(chain_start: &Pose, candidate: &Pose, point: &Pose) -> f64 {
        let bx = chain_start.x;
        let by = chain_start.y;
        let bz = chain_start.z;
        let mx = candidate.x - bx;
        let my = candidate.y - by;
        let mz = candidate.z - bz;
        let px = point.x - bx;
        let py = point.y - by;
        let pz = point.z - bz;

        let mm = mx * mx + my * my + mz * mz;
        let t = if mm > 0.0 {
            ((mx * px + my * py + mz * pz) / mm).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let lx = bx + t * mx;
        let ly = by + t * my;
        let lz = bz + t * mz;
        let dx = point.x - lx;
        let dy = point.y - ly;
        let dz = point.z - lz;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Whether `candidate` can be appended to this buffer without
    /// flushing first, given the chain's starting point and the active
    /// fusion parameters.
    ///
    /// Does not check the `a,b,c,u,v,w` match against `chain_start` — by
    /// spec §4.3 that orientation change is handled as its own immediate
    /// push-then-flush, upstream of this predicate (see
    /// `crate::dispatch::motion::straight_feed`).
    pub fn is_linkable(
        &self,
        chain_start: &Pose,
        candidate: &Pose,
        motion_mode_continuous: bool,
        naivecam_tolerance: f64,
    ) -> bool {
        if !motion_mode_continuous || naivecam_tolerance <= 0.0 {
            return false;
        }
        if self.entries.len() >= MAX_BUFFERED {
            return false;
        }
        if candidate.x == chain_start.x && candidate.y == chain_start.y && candidate.z == chain_start.z {
            return false;
        }
        self.entries
            .iter()
            .all(|e| Self::perpendicular_distance(chain_start, candidate, &e.pose) <= naivecam_tolerance)
    }
}
