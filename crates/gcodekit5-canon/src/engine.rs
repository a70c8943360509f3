//! `CanonEngine`: the explicit, owned stand-in for the process-wide
//! singletons spec §3/§9 describes (canonical state, segment buffer, probe
//! file, interpreter list). Dispatch lives in [`crate::dispatch`] and
//! [`crate::query`] as `impl CanonEngine` blocks in their own modules;
//! this module owns construction, the flush primitive, and the state
//! mutators of spec §4.4.

use crate::axis::AxisLimits;
use crate::envelope::{clamp_feed, compute_envelope, Envelope, MotionCategory};
use crate::message::{MotionMessage, TermCond, ToolTableEntry, TrajectoryMessage};
use crate::segment_buffer::SegmentBuffer;
use crate::state::{CanonicalState, FeedMode, MotionMode, Plane};
use crate::units::{self, LengthUnits, Pose};

/// Number of pockets in the built-in tool table. LinuxCNC's default
/// `CANON_POCKETS_MAX`; large enough for any practical turret or carousel.
pub const TOOL_TABLE_SIZE: usize = 56;

/// Owns canonical state, the segment buffer, the interpreter list, the
/// probe-log file handle, and the tool table. One instance per machining
/// session; construct with [`CanonEngine::new`], tear down with
/// [`CanonEngine::finish`].
pub struct CanonEngine {
    pub(crate) state: CanonicalState,
    pub(crate) buffer: SegmentBuffer,
    interpreter_list: Vec<TrajectoryMessage>,
    pub(crate) probe_log: Option<std::fs::File>,
    pub(crate) last_probed: Option<Pose>,
    pub(crate) tool_table: Vec<ToolTableEntry>,
}

impl CanonEngine {
    /// `INIT_CANON`: reset canonical state and clear the segment buffer.
    /// Does not touch an already-open probe log (PROBEOPEN/PROBECLOSE are
    /// independent of the canonical-state lifecycle).
    pub fn new() -> Self {
        tracing::info!("canon engine initialized");
        Self {
            state: CanonicalState::new(),
            buffer: SegmentBuffer::new(),
            interpreter_list: Vec::new(),
            probe_log: None,
            last_probed: None,
            tool_table: (0..TOOL_TABLE_SIZE as u32).map(ToolTableEntry::empty).collect(),
        }
    }

    /// `FINISH`: flush any pending fused feed.
    pub fn finish(&mut self, limits: &dyn AxisLimits) {
        self.flush(limits);
        tracing::info!("canon engine finished, {} messages queued", self.interpreter_list.len());
    }

    /// The committed, append-only interpreter list, in dispatch order.
    pub fn interpreter_list(&self) -> &[TrajectoryMessage] {
        &self.interpreter_list
    }

    /// Drain the interpreter list, leaving it empty. Hosts that stream
    /// messages to the executor incrementally use this instead of holding
    /// the whole run in memory.
    pub fn drain_messages(&mut self) -> Vec<TrajectoryMessage> {
        std::mem::take(&mut self.interpreter_list)
    }

    pub fn end_point(&self) -> Pose {
        self.state.end_point
    }

    pub fn state(&self) -> &CanonicalState {
        &self.state
    }

    pub(crate) fn push(&mut self, line_number: u32, payload: MotionMessage) {
        self.interpreter_list.push(TrajectoryMessage { line_number, payload });
    }

    /// Internal-units pose to the host's external units, for message output.
    pub(crate) fn externalize(&self, pose: &Pose) -> Pose {
        units::to_external(pose, self.state.external_length_units, self.state.external_angle_units)
    }

    pub(crate) fn apply_category(&mut self, category: MotionCategory) {
        self.state.cartesian_move = matches!(category, MotionCategory::Linear | MotionCategory::Combined);
        self.state.angular_move = matches!(category, MotionCategory::Angular | MotionCategory::Combined);
    }

    /// Envelope for the move from the current end point to `target`
    /// (internal units), updating `cartesian_move`/`angular_move`.
    pub(crate) fn envelope_to(&mut self, target: &Pose, limits: &dyn AxisLimits) -> Envelope {
        let delta = target.sub(&self.state.end_point);
        let env = compute_envelope(&delta, limits.axis_mask(), limits);
        self.apply_category(env.category);
        env
    }

    /// Flush the segment buffer: emit exactly one linear feed move whose
    /// end is the last buffered point (spec §4.3), clamped by the
    /// programmed feed, dropped if velocity or acceleration is zero.
    /// `endPoint` always advances to the flushed point and the buffer
    /// always clears, whether or not a message was emitted.
    pub fn flush(&mut self, limits: &dyn AxisLimits) {
        let Some(last) = self.buffer.last().copied() else { return };

        let env = self.envelope_to(&last.pose, limits);
        let vel = clamp_feed(&env, self.state.linear_feed_rate, self.state.angular_feed_rate);

        if vel > 0.0 && env.acceleration > 0.0 {
            self.push(
                last.line_number,
                MotionMessage::LinearMove {
                    end: self.externalize(&last.pose),
                    vel,
                    ini_max_vel: env.velocity,
                    acc: env.acceleration,
                    ini_max_jerk: env.jerk,
                    feed_mode: self.state.feed_mode.as_i32(),
                    tag: crate::message::LinearTag::Feed,
                },
            );
        } else {
            tracing::debug!(line = last.line_number, "zero-motion guard suppressed flushed move");
        }

        self.state.end_point = last.pose;
        self.buffer.clear();
    }

    // ---- Canonical-state mutators (spec §4.4) ----
    //
    // Each flushes first, except the five pure-query exceptions
    // (`set_block_delete`, `set_optional_program_stop`,
    // `set_naivecam_tolerance`, `select_plane`, `set_spindle_mode`) that
    // only take effect on the next dispatch.

    pub fn set_origin(&mut self, limits: &dyn AxisLimits, program_origin: Pose) {
        self.flush(limits);
        self.state.program_origin = program_origin;
        let externalized = self.externalize(&program_origin);
        self.push(0, MotionMessage::SetOrigin { origin: externalized });
    }

    pub fn set_xy_rotation(&mut self, limits: &dyn AxisLimits, degrees: f64) {
        self.flush(limits);
        self.state.xy_rotation_deg = degrees;
    }

    pub fn use_length_units(&mut self, limits: &dyn AxisLimits, units: LengthUnits) {
        self.flush(limits);
        self.state.length_units = units;
    }

    pub fn use_tool_length_offset(&mut self, limits: &dyn AxisLimits, tool_offset: Pose) {
        self.flush(limits);
        self.state.tool_offset = tool_offset;
        let externalized = self.externalize(&tool_offset);
        self.push(0, MotionMessage::SetToolOffset { offset: externalized });
    }

    pub fn set_feed_mode(&mut self, limits: &dyn AxisLimits, mode: FeedMode) {
        self.flush(limits);
        self.state.feed_mode = mode;
    }

    pub fn set_feed_rate(&mut self, limits: &dyn AxisLimits, linear: f64, angular: f64) {
        self.flush(limits);
        self.state.linear_feed_rate = linear;
        self.state.angular_feed_rate = angular;
    }

    /// `SET_MOTION_CONTROL_MODE` (spec §4.6): flushes, stores
    /// `motionTolerance`, and emits `SET_TERM_COND`.
    pub fn set_motion_control_mode(&mut self, limits: &dyn AxisLimits, mode: MotionMode, tolerance: f64) {
        self.flush(limits);
        self.state.motion_mode = mode;
        self.state.motion_tolerance = tolerance;
        let term = match mode {
            MotionMode::Continuous => TermCond::Blend {
                tolerance: tolerance * self.state.external_length_units,
            },
            MotionMode::ExactStop => TermCond::Stop,
        };
        self.push(0, MotionMessage::SetTermCond { mode: term });
    }

    /// `SET_NAIVECAM_TOLERANCE`: no message, takes effect on next dispatch.
    pub fn set_naivecam_tolerance(&mut self, tolerance: f64) {
        self.state.naivecam_tolerance = tolerance;
    }

    /// `SELECT_PLANE`: no message, takes effect on next dispatch.
    pub fn select_plane(&mut self, plane: Plane) {
        self.state.active_plane = plane;
    }

    /// `SET_SPINDLE_MODE` (CSS max): no message, takes effect on next dispatch.
    pub fn set_spindle_mode(&mut self, css_maximum: f64) {
        self.state.css_maximum = css_maximum;
    }

    pub fn set_block_delete(&mut self, enabled: bool) {
        self.state.block_delete = enabled;
    }

    pub fn set_optional_program_stop(&mut self, enabled: bool) {
        self.state.optional_program_stop = enabled;
    }
}

impl Default for CanonEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisMask, StaticAxisLimits};

    fn limits() -> StaticAxisLimits {
        StaticAxisLimits::uniform(100.0, 1000.0, 10000.0, AxisMask::XYZ)
    }

    #[test]
    fn flush_on_empty_buffer_is_a_no_op() {
        let mut engine = CanonEngine::new();
        engine.flush(&limits());
        assert!(engine.interpreter_list().is_empty());
        assert_eq!(engine.end_point(), Pose::ZERO);
    }

    #[test]
    fn flush_emits_one_linear_move_and_clears_buffer() {
        let mut engine = CanonEngine::new();
        engine.state.linear_feed_rate = 10.0;
        engine.buffer.push(Pose::new(30.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0), 12);
        engine.flush(&limits());
        assert_eq!(engine.interpreter_list().len(), 1);
        assert!(engine.buffer.is_empty());
        assert_eq!(engine.end_point().x, 30.0);
    }

    #[test]
    fn set_origin_flushes_and_emits_message() {
        let mut engine = CanonEngine::new();
        engine.buffer.push(Pose::new(5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0), 1);
        engine.state.linear_feed_rate = 10.0;
        engine.set_origin(&limits(), Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        assert!(engine.buffer.is_empty(), "set_origin must flush first");
        assert_eq!(engine.interpreter_list().len(), 2, "flush + SetOrigin");
        assert_eq!(engine.state.program_origin.x, 1.0);
    }

    #[test]
    fn pure_query_mutators_emit_nothing() {
        let mut engine = CanonEngine::new();
        engine.set_naivecam_tolerance(0.05);
        engine.select_plane(Plane::Yz);
        engine.set_spindle_mode(500.0);
        engine.set_block_delete(true);
        engine.set_optional_program_stop(true);
        assert!(engine.interpreter_list().is_empty());
        assert_eq!(engine.state.naivecam_tolerance, 0.05);
        assert_eq!(engine.state.active_plane, Plane::Yz);
    }
}
