//! Process-wide canonical world state (spec §3, §4.4).
//!
//! `CanonicalState` is pure data: it has no knowledge of the segment
//! buffer or the interpreter list. The flush-before-mutate rule and the
//! "emit a message on mutation" rule live on [`crate::engine::CanonEngine`],
//! which owns a `CanonicalState` alongside those other two pieces — see
//! design note §9 ("avoid hidden mutable globals").

use crate::units::{LengthUnits, Pose};
use serde::{Deserialize, Serialize};

/// Arc plane selection (`G17`/`G18`/`G19`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    Xy,
    Yz,
    Xz,
}

/// Path-blending behavior at segment boundaries (`G61`/`G64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    Continuous,
    ExactStop,
}

/// Feed interpretation mode. Encoded as an integer to match the
/// downstream message's `feed_mode: i32` field directly (spec §3):
/// `0` = inverse time, non-zero means spindle-synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMode {
    InverseTime = 0,
    UnitsPerMin = 1,
    PerRevSynced = 2,
}

impl FeedMode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_synchronized(self) -> bool {
        matches!(self, FeedMode::PerRevSynced)
    }
}

/// Process-wide world state: program origin, offsets, rotation, units,
/// active plane, modes, and spindle bookkeeping (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalState {
    /// Last commanded end position, internal units, after rotation/offset.
    pub end_point: Pose,
    pub program_origin: Pose,
    pub tool_offset: Pose,
    pub xy_rotation_deg: f64,
    pub length_units: LengthUnits,
    pub active_plane: Plane,
    pub motion_mode: MotionMode,
    /// Blend tolerance surfaced to the executor (internal length).
    pub motion_tolerance: f64,
    /// Fusion tolerance; `0.0` disables collinear fusion.
    pub naivecam_tolerance: f64,
    pub feed_mode: FeedMode,
    pub linear_feed_rate: f64,
    pub angular_feed_rate: f64,
    pub spindle_speed: f64,
    pub css_maximum: f64,
    pub css_numerator: f64,
    pub cartesian_move: bool,
    pub angular_move: bool,
    pub synched: bool,
    pub block_delete: bool,
    pub optional_program_stop: bool,
    /// Host-supplied externalization factor for lengths (applied by
    /// `toExternal`/`fromExternal`, spec §4.1).
    pub external_length_units: f64,
    /// Host-supplied externalization factor for angles.
    pub external_angle_units: f64,
}

impl CanonicalState {
    /// The state `INIT_CANON` resets to.
    pub fn new() -> Self {
        Self {
            end_point: Pose::ZERO,
            program_origin: Pose::ZERO,
            tool_offset: Pose::ZERO,
            xy_rotation_deg: 0.0,
            length_units: LengthUnits::Mm,
            active_plane: Plane::Xy,
            motion_mode: MotionMode::ExactStop,
            motion_tolerance: 0.0,
            naivecam_tolerance: 0.0,
            feed_mode: FeedMode::InverseTime,
            linear_feed_rate: 0.0,
            angular_feed_rate: 0.0,
            spindle_speed: 0.0,
            css_maximum: 0.0,
            css_numerator: 0.0,
            cartesian_move: false,
            angular_move: false,
            synched: false,
            block_delete: false,
            optional_program_stop: false,
            external_length_units: 1.0,
            external_angle_units: 1.0,
        }
    }
}

impl Default for CanonicalState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_state_has_zeroed_end_point() {
        let s = CanonicalState::new();
        assert_eq!(s.end_point, Pose::ZERO);
        assert_eq!(s.naivecam_tolerance, 0.0, "fusion is disabled until set");
    }

    #[test]
    fn feed_mode_encodes_synch_flag() {
        assert!(!FeedMode::InverseTime.is_synchronized());
        assert!(!FeedMode::UnitsPerMin.is_synchronized());
        assert!(FeedMode::PerRevSynced.is_synchronized());
        assert_eq!(FeedMode::InverseTime.as_i32(), 0);
    }
}
