//! Query interface (spec §4.7, §6 "Queries"): read-only accessors of
//! external state plus the thin accessors over [`crate::state::CanonicalState`]
//! that spec §6 lists but the distilled component summary doesn't spell out.

use crate::axis::AxisLimits;
use crate::engine::CanonEngine;
use crate::message::ToolTableEntry;
use crate::state::{FeedMode, MotionMode, Plane};
use crate::units::{to_program, unoffset_and_unrotate, LengthUnits, Pose};

/// External status snapshot — current machine/probe position and I/O
/// levels — supplied by the host (an out-of-scope collaborator, spec §1).
pub trait ExternalStatus {
    /// Current machine position, internal units, in the same
    /// rotated/offset frame as `CanonicalState::end_point`.
    fn machine_position(&self) -> Pose;
    /// Last probed position, same frame as `machine_position`.
    fn probed_position(&self) -> Pose;
    fn digital_input(&self, index: u32) -> Option<bool>;
    fn analog_input(&self, index: u32) -> Option<f64>;
    fn feed_override_enabled(&self) -> bool;
    fn spindle_override_enabled(&self) -> bool;
    fn adaptive_feed_enabled(&self) -> bool;
    fn feed_hold_enabled(&self) -> bool;
}

impl CanonEngine {
    fn to_program_pose(&self, internal: &Pose) -> Pose {
        let unrotated = unoffset_and_unrotate(
            internal,
            self.state.xy_rotation_deg,
            &self.state.program_origin,
            &self.state.tool_offset,
        );
        to_program(&unrotated, self.state.length_units)
    }

    /// `GET_EXTERNAL_POSITION`: clears the segment buffer (no flush
    /// message — this discards any pending fusion candidate rather than
    /// committing it), reads the machine position, converts to program
    /// units, and updates `endPoint`.
    pub fn get_external_position(&mut self, status: &dyn ExternalStatus) -> Pose {
        self.buffer.clear();
        let machine = status.machine_position();
        let program = self.to_program_pose(&machine);
        self.state.end_point = machine;
        program
    }

    /// `GET_EXTERNAL_PROBE_POSITION`: flushes, reads the probed position,
    /// converts, and logs one sample if the probe file is open and the
    /// value changed since the last logged sample.
    pub fn get_external_probe_position(
        &mut self,
        limits: &dyn AxisLimits,
        status: &dyn ExternalStatus,
    ) -> Pose {
        self.flush(limits);
        let probed = status.probed_position();
        let program = self.to_program_pose(&probed);
        if self.last_probed != Some(probed) {
            self.last_probed = Some(probed);
            self.log_probe_sample(&program);
        }
        program
    }

    /// `GET_EXTERNAL_TOOL_TABLE`: bounds-checked, zeroed sentinel entry on
    /// an out-of-range pocket (spec §7).
    pub fn get_external_tool_table(&self, pocket: u32) -> ToolTableEntry {
        self.tool_table.get(pocket as usize).copied().unwrap_or_else(|| ToolTableEntry::empty(pocket))
    }

    /// The current external position, without the side effects of
    /// [`Self::get_external_position`] — backs the per-axis getters below.
    fn external_position(&self) -> Pose {
        self.to_program_pose(&self.state.end_point)
    }

    pub fn get_external_position_x(&self) -> f64 {
        self.external_position().x
    }
    pub fn get_external_position_y(&self) -> f64 {
        self.external_position().y
    }
    pub fn get_external_position_z(&self) -> f64 {
        self.external_position().z
    }
    pub fn get_external_position_a(&self) -> f64 {
        self.external_position().a
    }
    pub fn get_external_position_b(&self) -> f64 {
        self.external_position().b
    }
    pub fn get_external_position_c(&self) -> f64 {
        self.external_position().c
    }
    pub fn get_external_position_u(&self) -> f64 {
        self.external_position().u
    }
    pub fn get_external_position_v(&self) -> f64 {
        self.external_position().v
    }
    pub fn get_external_position_w(&self) -> f64 {
        self.external_position().w
    }

    fn external_probe_position(&self) -> Pose {
        self.last_probed.map(|p| self.to_program_pose(&p)).unwrap_or_default()
    }

    pub fn get_external_probe_position_x(&self) -> f64 {
        self.external_probe_position().x
    }
    pub fn get_external_probe_position_y(&self) -> f64 {
        self.external_probe_position().y
    }
    pub fn get_external_probe_position_z(&self) -> f64 {
        self.external_probe_position().z
    }

    pub fn get_external_motion_control_mode(&self) -> MotionMode {
        self.state.motion_mode
    }

    pub fn get_external_motion_control_tolerance(&self) -> f64 {
        self.externalize(&Pose::new(
            self.state.motion_tolerance,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
        ))
        .x
    }

    pub fn get_external_length_unit_type(&self) -> LengthUnits {
        self.state.length_units
    }

    pub fn get_external_feed_mode(&self) -> FeedMode {
        self.state.feed_mode
    }

    pub fn get_external_active_plane(&self) -> Plane {
        self.state.active_plane
    }

    pub fn get_external_axis_mask(&self, limits: &dyn AxisLimits) -> crate::axis::AxisMask {
        limits.axis_mask()
    }

    pub fn get_feed_override_enabled(&self, status: &dyn ExternalStatus) -> bool {
        status.feed_override_enabled()
    }

    pub fn get_spindle_override_enabled(&self, status: &dyn ExternalStatus) -> bool {
        status.spindle_override_enabled()
    }

    pub fn get_adaptive_feed_enabled(&self, status: &dyn ExternalStatus) -> bool {
        status.adaptive_feed_enabled()
    }

    pub fn get_feed_hold_enabled(&self, status: &dyn ExternalStatus) -> bool {
        status.feed_hold_enabled()
    }

    /// `GET_EXTERNAL_DIGITAL_INPUT(index, default)`: `default` on a bad index.
    pub fn get_external_digital_input(&self, status: &dyn ExternalStatus, index: u32, default: bool) -> bool {
        status.digital_input(index).unwrap_or(default)
    }

    /// `GET_EXTERNAL_ANALOG_INPUT(index, default)`: `default` on a bad index.
    pub fn get_external_analog_input(&self, status: &dyn ExternalStatus, index: u32, default: f64) -> f64 {
        status.analog_input(index).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisMask, StaticAxisLimits};

    struct FakeStatus {
        machine: Pose,
        probed: Pose,
    }

    impl ExternalStatus for FakeStatus {
        fn machine_position(&self) -> Pose {
            self.machine
        }
        fn probed_position(&self) -> Pose {
            self.probed
        }
        fn digital_input(&self, index: u32) -> Option<bool> {
            (index == 0).then_some(true)
        }
        fn analog_input(&self, _index: u32) -> Option<f64> {
            None
        }
        fn feed_override_enabled(&self) -> bool {
            true
        }
        fn spindle_override_enabled(&self) -> bool {
            false
        }
        fn adaptive_feed_enabled(&self) -> bool {
            false
        }
        fn feed_hold_enabled(&self) -> bool {
            false
        }
    }

    fn limits() -> StaticAxisLimits {
        StaticAxisLimits::uniform(100.0, 1000.0, 10000.0, AxisMask::XYZ)
    }

    #[test]
    fn scenario_six_get_external_position_returns_program_coords() {
        let mut e = CanonEngine::new();
        e.set_xy_rotation(&limits(), 90.0);
        e.straight_feed(&limits(), 1, Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        e.finish(&limits());
        let status = FakeStatus { machine: e.end_point(), probed: Pose::ZERO };
        let program = e.get_external_position(&status);
        assert!((program.x - 1.0).abs() < 1e-9);
        assert!(program.y.abs() < 1e-9);
    }

    #[test]
    fn tool_table_out_of_range_returns_sentinel() {
        let e = CanonEngine::new();
        let entry = e.get_external_tool_table(9999);
        assert_eq!(entry.tool_no, -1);
    }

    #[test]
    fn digital_input_falls_back_to_default_on_bad_index() {
        let e = CanonEngine::new();
        let status = FakeStatus { machine: Pose::ZERO, probed: Pose::ZERO };
        assert!(e.get_external_digital_input(&status, 0, false));
        assert!(!e.get_external_digital_input(&status, 99, false));
    }

    #[test]
    fn probe_position_logs_only_on_change() {
        let mut e = CanonEngine::new();
        let path = std::env::temp_dir().join("gcodekit5-canon-test-probe-log.log");
        e.dispatch_comment(1, &format!("PROBEOPEN {}", path.to_string_lossy())).unwrap();
        let status = FakeStatus { machine: Pose::ZERO, probed: Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0) };
        e.get_external_probe_position(&limits(), &status);
        e.get_external_probe_position(&limits(), &status);
        e.dispatch_comment(2, "PROBECLOSE").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1, "second identical probe must not re-log");
        let _ = std::fs::remove_file(path);
    }
}
