//! Unit conversion and coordinate-transform primitives.
//!
//! Every dispatch function that receives program-unit coordinates routes
//! them through [`from_program`] and [`rotate_and_offset`] before any
//! envelope or message work happens. Keep all unit math here: never mix
//! internal and program units in the same expression outside this module.

use serde::{Deserialize, Serialize};

/// Millimeters per inch, used by [`LengthUnits::Inches`] conversions.
pub const MM_PER_INCH: f64 = 25.4;
/// Millimeters per centimeter, used by [`LengthUnits::Cm`] conversions.
pub const MM_PER_CM: f64 = 10.0;

/// Axis index of X in [`Pose::axis`] / [`Pose::with_axis`] order.
pub const AXIS_X: usize = 0;
/// Axis index of Y.
pub const AXIS_Y: usize = 1;
/// Axis index of Z.
pub const AXIS_Z: usize = 2;
/// Axis index of A.
pub const AXIS_A: usize = 3;
/// Axis index of B.
pub const AXIS_B: usize = 4;
/// Axis index of C.
pub const AXIS_C: usize = 5;
/// Axis index of U.
pub const AXIS_U: usize = 6;
/// Axis index of V.
pub const AXIS_V: usize = 7;
/// Axis index of W.
pub const AXIS_W: usize = 8;

/// Indices of the linear axes (lengths), in the order the envelope scans them.
pub const LINEAR_AXES: [usize; 6] = [AXIS_X, AXIS_Y, AXIS_Z, AXIS_U, AXIS_V, AXIS_W];
/// Indices of the angular axes (degrees).
pub const ANGULAR_AXES: [usize; 3] = [AXIS_A, AXIS_B, AXIS_C];

/// Magnitude below which a per-axis delta is treated as "not moving".
pub const MOTION_EPSILON: f64 = 1e-7;

/// Nine-axis pose: `x, y, z, a, b, c, u, v, w`.
///
/// `x, y, z, u, v, w` are lengths; `a, b, c` are angles. Internally lengths
/// are always millimeters and angles always degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Pose {
    /// The zero pose, all nine axes at the origin.
    pub const ZERO: Pose = Pose {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        a: 0.0,
        b: 0.0,
        c: 0.0,
        u: 0.0,
        v: 0.0,
        w: 0.0,
    };

    /// Build a pose from explicit axis values, in `x,y,z,a,b,c,u,v,w` order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(x: f64, y: f64, z: f64, a: f64, b: f64, c: f64, u: f64, v: f64, w: f64) -> Self {
        Self { x, y, z, a, b, c, u, v, w }
    }

    /// Read the value of axis `idx` (0..9, see the `AXIS_*` constants).
    pub fn axis(&self, idx: usize) -> f64 {
        match idx {
            AXIS_X => self.x,
            AXIS_Y => self.y,
            AXIS_Z => self.z,
            AXIS_A => self.a,
            AXIS_B => self.b,
            AXIS_C => self.c,
            AXIS_U => self.u,
            AXIS_V => self.v,
            AXIS_W => self.w,
            _ => panic!("Pose axis index out of range: {idx}"),
        }
    }

    /// Return a copy of this pose with axis `idx` set to `value`.
    pub fn with_axis(&self, idx: usize, value: f64) -> Self {
        let mut p = *self;
        match idx {
            AXIS_X => p.x = value,
            AXIS_Y => p.y = value,
            AXIS_Z => p.z = value,
            AXIS_A => p.a = value,
            AXIS_B => p.b = value,
            AXIS_C => p.c = value,
            AXIS_U => p.u = value,
            AXIS_V => p.v = value,
            AXIS_W => p.w = value,
            _ => panic!("Pose axis index out of range: {idx}"),
        }
        p
    }

    /// Component-wise difference `self - other`.
    pub fn sub(&self, other: &Pose) -> Pose {
        Pose::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.u - other.u,
            self.v - other.v,
            self.w - other.w,
        )
    }

    /// Component-wise sum `self + other`.
    pub fn add(&self, other: &Pose) -> Pose {
        Pose::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.a + other.a,
            self.b + other.b,
            self.c + other.c,
            self.u + other.u,
            self.v + other.v,
            self.w + other.w,
        )
    }

    /// True if `a,b,c,u,v,w` are bitwise-equal between `self` and `other`.
    ///
    /// Deliberately an exact comparison, not a tolerance-based one: the
    /// segment buffer relies on this to decide whether a candidate point
    /// shares the orientation of the last buffered entry (spec §3, §4.3).
    /// Callers that want tolerance-based merging must arrange for it
    /// upstream; this crate does not add a fuzzy fallback here.
    pub fn abcuvw_eq(&self, other: &Pose) -> bool {
        self.a == other.a
            && self.b == other.b
            && self.c == other.c
            && self.u == other.u
            && self.v == other.v
            && self.w == other.w
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Program-side length unit, as set by `USE_LENGTH_UNITS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnits {
    Inches,
    Mm,
    Cm,
}

impl LengthUnits {
    /// Multiply a program-unit length by this to get millimeters.
    fn to_mm_factor(self) -> f64 {
        match self {
            LengthUnits::Inches => MM_PER_INCH,
            LengthUnits::Mm => 1.0,
            LengthUnits::Cm => MM_PER_CM,
        }
    }
}

/// Convert a program-unit pose into internal units (mm / degrees).
///
/// Length axes are scaled by `units`; angle axes (`a,b,c`) are never
/// touched, since the program always expresses them in degrees.
pub fn from_program(pose: &Pose, units: LengthUnits) -> Pose {
    let f = units.to_mm_factor();
    Pose::new(
        pose.x * f,
        pose.y * f,
        pose.z * f,
        pose.a,
        pose.b,
        pose.c,
        pose.u * f,
        pose.v * f,
        pose.w * f,
    )
}

/// Inverse of [`from_program`]: internal units back to program units.
pub fn to_program(pose: &Pose, units: LengthUnits) -> Pose {
    let f = units.to_mm_factor();
    Pose::new(
        pose.x / f,
        pose.y / f,
        pose.z / f,
        pose.a,
        pose.b,
        pose.c,
        pose.u / f,
        pose.v / f,
        pose.w / f,
    )
}

/// Convert an internal-unit pose to the host's external units.
///
/// `external_length_units` and `external_angle_units` are factors supplied
/// by the host (e.g. `1.0/25.4` to externalize as inches); both are
/// multiplied in, mirroring the source's `toExternal`/`fromExternal` pair.
pub fn to_external(pose: &Pose, external_length_units: f64, external_angle_units: f64) -> Pose {
    Pose::new(
        pose.x * external_length_units,
        pose.y * external_length_units,
        pose.z * external_length_units,
        pose.a * external_angle_units,
        pose.b * external_angle_units,
        pose.c * external_angle_units,
        pose.u * external_length_units,
        pose.v * external_length_units,
        pose.w * external_length_units,
    )
}

/// Inverse of [`to_external`].
pub fn from_external(pose: &Pose, external_length_units: f64, external_angle_units: f64) -> Pose {
    Pose::new(
        pose.x / external_length_units,
        pose.y / external_length_units,
        pose.z / external_length_units,
        pose.a / external_angle_units,
        pose.b / external_angle_units,
        pose.c / external_angle_units,
        pose.u / external_length_units,
        pose.v / external_length_units,
        pose.w / external_length_units,
    )
}

/// Rotate the point `(x, y)` by `theta_deg` degrees about the origin.
pub fn rotate(x: f64, y: f64, theta_deg: f64) -> (f64, f64) {
    let theta = theta_deg.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    (x * cos_t - y * sin_t, x * sin_t + y * cos_t)
}

/// Apply `xy_rotation` to the programmed X,Y, then add `program_origin +
/// tool_offset`, matching spec §4.1's `rotateAndOffset`.
pub fn rotate_and_offset(
    pose: &Pose,
    xy_rotation_deg: f64,
    program_origin: &Pose,
    tool_offset: &Pose,
) -> Pose {
    let (rx, ry) = rotate(pose.x, pose.y, xy_rotation_deg);
    let rotated = Pose { x: rx, y: ry, ..*pose };
    rotated.add(program_origin).add(tool_offset)
}

/// Inverse of [`rotate_and_offset`].
pub fn unoffset_and_unrotate(
    pose: &Pose,
    xy_rotation_deg: f64,
    program_origin: &Pose,
    tool_offset: &Pose,
) -> Pose {
    let unoffset = pose.sub(program_origin).sub(tool_offset);
    let (rx, ry) = rotate(unoffset.x, unoffset.y, -xy_rotation_deg);
    Pose { x: rx, y: ry, ..unoffset }
}
