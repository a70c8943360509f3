//! Downstream trajectory message shapes.
//!
//! Modeled as tagged variants behind a common header, per design note §9:
//! "implicit polymorphism across message kinds... model as tagged
//! variants with a common header (type, lineNumber) and variant-specific
//! payload. Appending is a single sum-type push." `line_number` lives on
//! [`TrajectoryMessage`] itself rather than being duplicated into every
//! variant.

use crate::units::Pose;
use serde::{Deserialize, Serialize};

/// One entry in the interpreter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMessage {
    pub line_number: u32,
    pub payload: MotionMessage,
}

/// Which G-code tagged a [`MotionMessage::LinearMove`] (affects nothing
/// about execution; carried through for diagnostics/visualization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearTag {
    Traverse,
    Feed,
    /// A circular arc degraded to a straight line (rotation = 0, or a
    /// near-straight arc collapsed by chord-deviation degradation).
    Arc,
}

/// `G38.x`-style straight-probe classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeType {
    TowardContactErrorOnFailure,
    TowardContactNoError,
    AwayFromContactErrorOnFailure,
    AwayFromContactNoError,
}

/// Motion-control blend-vs-stop setting, externalized for `SET_TERM_COND`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TermCond {
    Blend { tolerance: f64 },
    Stop,
}

/// `M7`/`M8` coolant channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoolantType {
    Mist,
    Flood,
}

/// Spindle turning direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpindleDirection {
    Cw,
    Ccw,
}

/// `WAIT` input channel kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    Digital,
    Analog,
}

/// `WAIT` trigger condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitType {
    Rise,
    Fall,
    High,
    Low,
}

/// One tool-table row (`SET_TOOL_TABLE_ENTRY` / `GET_EXTERNAL_TOOL_TABLE`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolTableEntry {
    pub pocket: u32,
    /// Tool number; `-1` is the out-of-range sentinel (spec §7).
    pub tool_no: i32,
    pub offset: Pose,
    pub diameter: f64,
}

impl ToolTableEntry {
    /// The zeroed entry returned for an out-of-range pocket query.
    pub fn empty(pocket: u32) -> Self {
        Self { pocket, tool_no: -1, offset: Pose::ZERO, diameter: 0.0 }
    }
}

/// Block metadata carried by every NURBS-3D trajectory message (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NurbsBlockRecord {
    pub control_point_count: u32,
    pub knot_count: u32,
    pub order: u32,
    pub curve_length: f64,
    pub current_knot: f64,
    pub weight: f64,
    /// Optional `U(L)` parametrization overlay.
    pub overlay: Option<f64>,
}

/// A distinct, tagged trajectory-message payload. See spec §6 for the
/// full upstream/downstream API surface this enumerates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MotionMessage {
    LinearMove {
        end: Pose,
        vel: f64,
        ini_max_vel: f64,
        acc: f64,
        ini_max_jerk: f64,
        feed_mode: i32,
        tag: LinearTag,
    },
    CircularMove {
        end: Pose,
        center: (f64, f64, f64),
        normal: (f64, f64, f64),
        turn: i32,
        vel: f64,
        ini_max_vel: f64,
        acc: f64,
        ini_max_jerk: f64,
        feed_mode: i32,
    },
    RigidTap {
        end: Pose,
        vel: f64,
        ini_max_vel: f64,
        acc: f64,
        ini_max_jerk: f64,
    },
    Probe {
        end: Pose,
        vel: f64,
        ini_max_vel: f64,
        acc: f64,
        ini_max_jerk: f64,
        probe_type: ProbeType,
    },
    NurbsControlPoint {
        point: Pose,
        weight: f64,
        block: NurbsBlockRecord,
    },
    NurbsKnot {
        value: f64,
        block: NurbsBlockRecord,
    },
    SetOrigin {
        origin: Pose,
    },
    SetToolOffset {
        offset: Pose,
    },
    SetTermCond {
        mode: TermCond,
    },
    SetSpindleSpeed {
        speed: f64,
        css_maximum: f64,
        css_numerator: f64,
        /// `programOrigin.x + toolOffset.x`, externalized, when CSS is active.
        x_offset: f64,
    },
    SpindleOn {
        direction: SpindleDirection,
    },
    SpindleOff,
    SpindleSyncStart,
    SpindleSyncStop,
    CoolantOn {
        coolant: CoolantType,
    },
    CoolantOff {
        coolant: CoolantType,
    },
    ToolChange,
    SelectPocket {
        pocket: u32,
    },
    SetToolNumber {
        tool_no: u32,
    },
    SetToolTableEntry {
        entry: ToolTableEntry,
    },
    ProgramPause,
    ProgramStop {
        optional: bool,
    },
    ProgramEnd,
    Dwell {
        seconds: f64,
    },
    FeedOverrideEnable(bool),
    SpindleOverrideEnable(bool),
    AdaptiveFeedEnable(bool),
    FeedHoldEnable(bool),
    SetMotionOutputBit {
        index: u32,
        value: bool,
    },
    SetAuxOutputBit {
        index: u32,
        value: bool,
    },
    SetMotionOutputValue {
        index: u32,
        value: f64,
    },
    SetAuxOutputValue {
        index: u32,
        value: f64,
    },
    InputWait {
        index: u32,
        input_type: InputType,
        wait_type: WaitType,
        timeout: f64,
    },
    OperatorMessage {
        text: String,
        is_error: bool,
    },
    Comment {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_table_entry_empty_carries_sentinel() {
        let e = ToolTableEntry::empty(7);
        assert_eq!(e.tool_no, -1);
        assert_eq!(e.pocket, 7);
    }

    #[test]
    fn message_round_trips_through_json() {
        let msg = TrajectoryMessage {
            line_number: 10,
            payload: MotionMessage::LinearMove {
                end: Pose::ZERO,
                vel: 10.0,
                ini_max_vel: 100.0,
                acc: 1000.0,
                ini_max_jerk: 10000.0,
                feed_mode: 0,
                tag: LinearTag::Feed,
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: TrajectoryMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
