//! Motion command dispatch (spec §4.5): traverse, feed, rigid tap, probe,
//! arc, spline/NURBS, dwell, spindle, coolant, tooling, program flow,
//! overrides, I/O, and input wait.

use crate::arc_math::{chord_deviation, turn_count};
use crate::axis::AxisLimits;
use crate::biarc::fit_biarc;
use crate::curve::{Curve2D, Point2};
use crate::engine::CanonEngine;
use crate::envelope::{clamp_feed, MotionCategory};
use crate::error::{CanonError, CanonResult};
use crate::message::{
    CoolantType, InputType, LinearTag, MotionMessage, NurbsBlockRecord, ProbeType,
    SpindleDirection, ToolTableEntry, WaitType,
};
use crate::state::Plane;
use crate::units::{
    from_program, rotate, rotate_and_offset, Pose, AXIS_A, AXIS_B, AXIS_C, AXIS_U, AXIS_V, AXIS_W,
    AXIS_X, AXIS_Y, AXIS_Z, ANGULAR_AXES, MM_PER_INCH, MOTION_EPSILON,
};
use crate::units::LengthUnits;
use std::f64::consts::PI;

fn plane_axes(plane: Plane) -> (usize, usize, usize) {
    match plane {
        Plane::Xy => (AXIS_X, AXIS_Y, AXIS_Z),
        Plane::Xz => (AXIS_X, AXIS_Z, AXIS_Y),
        Plane::Yz => (AXIS_Y, AXIS_Z, AXIS_X),
    }
}

fn plane_normal(plane: Plane, xy_rotation_deg: f64) -> (f64, f64, f64) {
    match plane {
        Plane::Xy => (0.0, 0.0, 1.0),
        Plane::Yz => {
            let (rx, ry) = rotate(1.0, 0.0, xy_rotation_deg);
            (rx, ry, 0.0)
        }
        Plane::Xz => {
            let (rx, ry) = rotate(0.0, 1.0, xy_rotation_deg);
            (rx, ry, 0.0)
        }
    }
}

/// spec §4.5's arc-envelope rule: always include both in-plane axes,
/// fold in the third axis only if its delta exceeds 0.001, fold in any
/// moving A/B/C or U/V/W.
fn arc_envelope(
    idx1: usize,
    idx2: usize,
    idx3: usize,
    delta: &Pose,
    mask: crate::axis::AxisMask,
    limits: &dyn AxisLimits,
) -> (f64, f64, f64, MotionCategory) {
    let mut vel = limits.max_velocity(idx1).min(limits.max_velocity(idx2));
    let mut acc = limits.max_acceleration(idx1).min(limits.max_acceleration(idx2));
    let mut jerk = limits.max_jerk(idx1).min(limits.max_jerk(idx2));

    if delta.axis(idx3).abs() > 0.001 {
        vel = vel.min(limits.max_velocity(idx3));
        acc = acc.min(limits.max_acceleration(idx3));
        jerk = jerk.min(limits.max_jerk(idx3));
    }

    let mut angular_moves = false;
    for &idx in ANGULAR_AXES.iter().chain([AXIS_U, AXIS_V, AXIS_W].iter()) {
        if idx == idx1 || idx == idx2 || idx == idx3 {
            continue;
        }
        if mask.contains(idx) && delta.axis(idx).abs() >= MOTION_EPSILON {
            vel = vel.min(limits.max_velocity(idx));
            acc = acc.min(limits.max_acceleration(idx));
            jerk = jerk.min(limits.max_jerk(idx));
            if ANGULAR_AXES.contains(&idx) {
                angular_moves = true;
            }
        }
    }

    let category = if angular_moves { MotionCategory::Combined } else { MotionCategory::Linear };
    (vel, acc, jerk, category)
}

impl CanonEngine {
    fn to_internal(&self, program_pose: &Pose) -> Pose {
        rotate_and_offset(
            &from_program(program_pose, self.state.length_units),
            self.state.xy_rotation_deg,
            &self.state.program_origin,
            &self.state.tool_offset,
        )
    }

    /// Shared tail of `straight_feed` and the arc chord-degrade path: feed
    /// to an already-internal-units target through the segment buffer.
    fn feed_to_internal(&mut self, limits: &dyn AxisLimits, line: u32, target: Pose) {
        if !target.abcuvw_eq(&self.state.end_point) {
            self.buffer.push(target, line);
            self.flush(limits);
            return;
        }
        let chain_start = self.state.end_point;
        if self.buffer.is_linkable(
            &chain_start,
            &target,
            self.state.motion_mode == crate::state::MotionMode::Continuous,
            self.state.naivecam_tolerance,
        ) {
            self.buffer.push(target, line);
        } else {
            self.flush(limits);
            self.buffer.push(target, line);
        }
    }

    pub fn straight_traverse(&mut self, limits: &dyn AxisLimits, line: u32, program_pose: Pose) {
        self.flush(limits);
        let was_synched = self.state.synched;
        if was_synched {
            self.push(line, MotionMessage::SpindleSyncStop);
            self.state.synched = false;
        }

        let internal = self.to_internal(&program_pose);
        let env = self.envelope_to(&internal, limits);
        if env.velocity > 0.0 && env.acceleration > 0.0 {
            self.push(
                line,
                MotionMessage::LinearMove {
                    end: self.externalize(&internal),
                    vel: env.velocity,
                    ini_max_vel: env.velocity,
                    acc: env.acceleration,
                    ini_max_jerk: env.jerk,
                    feed_mode: self.state.feed_mode.as_i32(),
                    tag: LinearTag::Traverse,
                },
            );
        }
        self.state.end_point = internal;

        if was_synched {
            self.push(line, MotionMessage::SpindleSyncStart);
            self.state.synched = true;
        }
    }

    pub fn straight_feed(&mut self, limits: &dyn AxisLimits, line: u32, program_pose: Pose) {
        let internal = self.to_internal(&program_pose);
        self.feed_to_internal(limits, line, internal);
    }

    pub fn rigid_tap(&mut self, limits: &dyn AxisLimits, line: u32, x: f64, y: f64, z: f64) {
        self.flush(limits);
        let scaled = from_program(
            &Pose::new(x, y, z, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            self.state.length_units,
        );
        let (rx, ry) = rotate(scaled.x, scaled.y, self.state.xy_rotation_deg);
        let target = self
            .state
            .end_point
            .with_axis(AXIS_X, rx + self.state.program_origin.x + self.state.tool_offset.x)
            .with_axis(AXIS_Y, ry + self.state.program_origin.y + self.state.tool_offset.y)
            .with_axis(AXIS_Z, scaled.z + self.state.program_origin.z + self.state.tool_offset.z);

        let env = self.envelope_to(&target, limits);
        if env.velocity > 0.0 && env.acceleration > 0.0 {
            self.push(
                line,
                MotionMessage::RigidTap {
                    end: self.externalize(&target),
                    vel: env.velocity,
                    ini_max_vel: env.velocity,
                    acc: env.acceleration,
                    ini_max_jerk: env.jerk,
                },
            );
        }
        // endPoint intentionally not updated: the executor returns to start.
    }

    pub fn straight_probe(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        program_pose: Pose,
        probe_type: ProbeType,
    ) {
        self.flush(limits);
        let internal = self.to_internal(&program_pose);
        let env = self.envelope_to(&internal, limits);
        let vel = clamp_feed(&env, self.state.linear_feed_rate, self.state.angular_feed_rate);
        if vel > 0.0 && env.acceleration > 0.0 {
            self.push(
                line,
                MotionMessage::Probe {
                    end: self.externalize(&internal),
                    vel,
                    ini_max_vel: env.velocity,
                    acc: env.acceleration,
                    ini_max_jerk: env.jerk,
                    probe_type,
                },
            );
        }
        self.state.end_point = internal;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc_feed(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        first_end: f64,
        second_end: f64,
        first_axis: f64,
        second_axis: f64,
        rotation: i32,
        axis_end: f64,
        a: f64,
        b: f64,
        c: f64,
        u: f64,
        v: f64,
        w: f64,
    ) -> CanonResult<()> {
        let (idx1, idx2, idx3) = plane_axes(self.state.active_plane);
        let end_program = Pose::ZERO
            .with_axis(idx1, first_end)
            .with_axis(idx2, second_end)
            .with_axis(idx3, axis_end)
            .with_axis(AXIS_A, a)
            .with_axis(AXIS_B, b)
            .with_axis(AXIS_C, c)
            .with_axis(AXIS_U, u)
            .with_axis(AXIS_V, v)
            .with_axis(AXIS_W, w);
        let center_program = Pose::ZERO.with_axis(idx1, first_axis).with_axis(idx2, second_axis);

        let end_internal = self.to_internal(&end_program);
        let center_internal = self.to_internal(&center_program);

        if rotation == 0 {
            self.flush(limits);
            let env = self.envelope_to(&end_internal, limits);
            if env.velocity > 0.0 && env.acceleration > 0.0 {
                let vel = clamp_feed(&env, self.state.linear_feed_rate, self.state.angular_feed_rate);
                self.push(
                    line,
                    MotionMessage::LinearMove {
                        end: self.externalize(&end_internal),
                        vel,
                        ini_max_vel: env.velocity,
                        acc: env.acceleration,
                        ini_max_jerk: env.jerk,
                        feed_mode: self.state.feed_mode.as_i32(),
                        tag: LinearTag::Arc,
                    },
                );
            }
            self.state.end_point = end_internal;
            return Ok(());
        }

        let start2: Point2 = (self.state.end_point.axis(idx1), self.state.end_point.axis(idx2));
        let end2: Point2 = (end_internal.axis(idx1), end_internal.axis(idx2));
        let center2: Point2 = (center_internal.axis(idx1), center_internal.axis(idx2));
        let radius = (start2.0 - center2.0).hypot(start2.1 - center2.1);
        if radius < 1e-9 {
            return Err(CanonError::DegenerateArc { radius, line });
        }

        if self.state.active_plane == Plane::Xy
            && self.state.motion_mode == crate::state::MotionMode::Continuous
        {
            let cd = chord_deviation(start2, end2, center2, rotation);
            if cd.deviation < self.state.naivecam_tolerance {
                let axial_mid = (self.state.end_point.axis(idx3) + end_internal.axis(idx3)) / 2.0;
                let mid_internal = self
                    .state
                    .end_point
                    .with_axis(idx1, cd.midpoint.0)
                    .with_axis(idx2, cd.midpoint.1)
                    .with_axis(idx3, axial_mid);
                let mid_internal = Pose {
                    a: end_internal.a,
                    b: end_internal.b,
                    c: end_internal.c,
                    u: end_internal.u,
                    v: end_internal.v,
                    w: end_internal.w,
                    ..mid_internal
                };
                self.feed_to_internal(limits, line, mid_internal);
                self.feed_to_internal(limits, line, end_internal);
                return Ok(());
            }
        }

        self.flush(limits);
        let normal = plane_normal(self.state.active_plane, self.state.xy_rotation_deg);
        let delta = end_internal.sub(&self.state.end_point);
        let (vel_env, acc, jerk, category) =
            arc_envelope(idx1, idx2, idx3, &delta, limits.axis_mask(), limits);
        self.apply_category(category);
        let programmed = match category {
            MotionCategory::Angular => self.state.angular_feed_rate,
            _ => self.state.linear_feed_rate,
        };
        let vel = vel_env.min(programmed);

        if vel > 0.0 && acc > 0.0 {
            let mut center3 = (0.0, 0.0, 0.0);
            let set = |c: &mut (f64, f64, f64), idx: usize, value: f64| match idx {
                AXIS_X => c.0 = value,
                AXIS_Y => c.1 = value,
                AXIS_Z => c.2 = value,
                _ => {}
            };
            set(&mut center3, idx1, center2.0);
            set(&mut center3, idx2, center2.1);
            set(&mut center3, idx3, end_internal.axis(idx3));

            self.push(
                line,
                MotionMessage::CircularMove {
                    end: self.externalize(&end_internal),
                    center: center3,
                    normal,
                    turn: turn_count(rotation),
                    vel,
                    ini_max_vel: vel_env,
                    acc,
                    ini_max_jerk: jerk,
                    feed_mode: self.state.feed_mode.as_i32(),
                },
            );
        }
        self.state.end_point = end_internal;
        Ok(())
    }

    /// Fit and emit a quadratic spline (`SPLINE_FEED`, degree 2) as a
    /// chain of biarcs, each pushed through [`Self::arc_feed`].
    #[allow(clippy::too_many_arguments)]
    pub fn spline_feed_quadratic(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        p1: Point2,
        p2: Point2,
        axis_end: f64,
        a: f64,
        b: f64,
        c: f64,
        u: f64,
        v: f64,
        w: f64,
    ) -> CanonResult<()> {
        let p0 = (self.state.end_point.x, self.state.end_point.y);
        let curve = Curve2D::Quadratic([p0, p1, p2]);
        self.emit_biarc_chain(limits, line, &curve, 2, axis_end, a, b, c, u, v, w)
    }

    /// Fit and emit a cubic spline (`SPLINE_FEED`, degree 3).
    #[allow(clippy::too_many_arguments)]
    pub fn spline_feed_cubic(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        p1: Point2,
        p2: Point2,
        p3: Point2,
        axis_end: f64,
        a: f64,
        b: f64,
        c: f64,
        u: f64,
        v: f64,
        w: f64,
    ) -> CanonResult<()> {
        let p0 = (self.state.end_point.x, self.state.end_point.y);
        let curve = Curve2D::Cubic([p0, p1, p2, p3]);
        self.emit_biarc_chain(limits, line, &curve, 4, axis_end, a, b, c, u, v, w)
    }

    /// `NURBS_FEED` (2D): same biarc treatment as splines.
    #[allow(clippy::too_many_arguments)]
    pub fn nurbs_feed_2d(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        control_points: Vec<Point2>,
        weights: Vec<f64>,
        knots: Vec<f64>,
        order: usize,
        axis_end: f64,
        a: f64,
        b: f64,
        c: f64,
        u: f64,
        v: f64,
        w: f64,
    ) -> CanonResult<()> {
        if control_points.len() < order {
            return Err(CanonError::InsufficientControlPoints {
                needed: order,
                got: control_points.len(),
            });
        }
        let curve = Curve2D::Nurbs { control_points, weights, knots, order };
        self.emit_biarc_chain(limits, line, &curve, 4, axis_end, a, b, c, u, v, w)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_biarc_chain(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        curve: &Curve2D,
        default_steps: u32,
        axis_end: f64,
        a: f64,
        b: f64,
        c: f64,
        u: f64,
        v: f64,
        w: f64,
    ) -> CanonResult<()> {
        const MAX_RETRIES: u32 = 6;
        let mut steps = default_steps.max(2);
        let mut attempts = 0;

        loop {
            attempts += 1;
            if attempts > MAX_RETRIES {
                return Err(CanonError::BiarcDidNotConverge { attempts });
            }

            let samples: Vec<(Point2, Point2)> =
                (0..=steps).map(|i| curve.eval(i as f64 / steps as f64)).collect();

            let mut biarcs = Vec::with_capacity(samples.len());
            let mut all_fit = true;
            for pair in samples.windows(2) {
                let (p0, t0) = pair[0];
                let (p4, t4) = pair[1];
                match fit_biarc(p0, t0, p4, t4) {
                    Some(biarc) => biarcs.push(biarc),
                    None => {
                        all_fit = false;
                        break;
                    }
                }
            }

            if !all_fit {
                steps *= 2;
                continue;
            }

            for biarc in biarcs {
                for arc in [biarc.arc1, biarc.arc2] {
                    let rotation = if arc.ccw { 1 } else { -1 };
                    self.arc_feed(
                        limits, line, arc.end.0, arc.end.1, arc.center.0, arc.center.1, rotation,
                        axis_end, a, b, c, u, v, w,
                    )?;
                }
            }
            return Ok(());
        }
    }

    /// `NURBS_FEED_3D`: stream control points then knots, no biarc fitting.
    #[allow(clippy::too_many_arguments)]
    pub fn nurbs_feed_3d(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        control_points: &[Pose],
        weights: &[f64],
        knots: &[f64],
        order: u32,
        curve_length: f64,
        overlay: Option<f64>,
    ) -> CanonResult<()> {
        if control_points.len() < order as usize {
            return Err(CanonError::InsufficientControlPoints {
                needed: order as usize,
                got: control_points.len(),
            });
        }
        self.flush(limits);

        let block = NurbsBlockRecord {
            control_point_count: control_points.len() as u32,
            knot_count: knots.len() as u32,
            order,
            curve_length,
            current_knot: 0.0,
            weight: 0.0,
            overlay,
        };

        for (i, p) in control_points.iter().enumerate() {
            let internal = self.to_internal(p);
            let mut b = block;
            b.weight = weights.get(i).copied().unwrap_or(1.0);
            self.push(
                line,
                MotionMessage::NurbsControlPoint { point: self.externalize(&internal), weight: b.weight, block: b },
            );
        }
        for &k in knots.iter().skip(control_points.len()) {
            let mut b = block;
            b.current_knot = k;
            self.push(line, MotionMessage::NurbsKnot { value: k, block: b });
        }

        if let Some(last) = control_points.last() {
            self.state.end_point = self.to_internal(last);
        }
        Ok(())
    }

    pub fn dwell(&mut self, limits: &dyn AxisLimits, line: u32, seconds: f64) {
        self.flush(limits);
        self.push(line, MotionMessage::Dwell { seconds });
    }

    fn css_numerator_magnitude(&self, speed: f64) -> f64 {
        let factor = if self.state.length_units == LengthUnits::Inches {
            MM_PER_INCH * 12.0
        } else {
            1000.0
        };
        factor / (2.0 * PI) * speed
    }

    pub fn set_spindle_speed(&mut self, limits: &dyn AxisLimits, line: u32, speed: f64) {
        self.flush(limits);
        self.state.spindle_speed = speed;
        let sign = self.state.css_numerator.signum();
        let sign = if sign == 0.0 { 1.0 } else { sign };
        self.state.css_numerator = if self.state.css_maximum > 0.0 {
            sign * self.css_numerator_magnitude(speed)
        } else {
            0.0
        };
        self.push(line, self.spindle_speed_message());
    }

    fn spindle_speed_message(&self) -> MotionMessage {
        let x_offset = if self.state.css_maximum > 0.0 {
            self.externalize(&self.state.program_origin.add(&self.state.tool_offset)).x
        } else {
            0.0
        };
        MotionMessage::SetSpindleSpeed {
            speed: self.state.spindle_speed,
            css_maximum: self.state.css_maximum,
            css_numerator: self.state.css_numerator,
            x_offset,
        }
    }

    pub fn start_spindle(&mut self, limits: &dyn AxisLimits, line: u32, direction: SpindleDirection) {
        self.flush(limits);
        if self.state.css_maximum > 0.0 {
            let sign = match direction {
                SpindleDirection::Cw => 1.0,
                SpindleDirection::Ccw => -1.0,
            };
            self.state.css_numerator = sign * self.css_numerator_magnitude(self.state.spindle_speed);
            self.push(line, self.spindle_speed_message());
        }
        self.push(line, MotionMessage::SpindleOn { direction });
    }

    pub fn stop_spindle(&mut self, limits: &dyn AxisLimits, line: u32) {
        self.flush(limits);
        self.push(line, MotionMessage::SpindleOff);
    }

    pub fn start_speed_feed_synch(&mut self, limits: &dyn AxisLimits, line: u32) {
        self.flush(limits);
        self.state.synched = true;
        self.push(line, MotionMessage::SpindleSyncStart);
    }

    pub fn stop_speed_feed_synch(&mut self, limits: &dyn AxisLimits, line: u32) {
        self.flush(limits);
        self.state.synched = false;
        self.push(line, MotionMessage::SpindleSyncStop);
    }

    pub fn coolant_on(&mut self, limits: &dyn AxisLimits, line: u32, coolant: CoolantType) {
        self.flush(limits);
        self.push(line, MotionMessage::CoolantOn { coolant });
    }

    pub fn coolant_off(&mut self, limits: &dyn AxisLimits, line: u32, coolant: CoolantType) {
        self.flush(limits);
        self.push(line, MotionMessage::CoolantOff { coolant });
    }

    pub fn change_tool(&mut self, limits: &dyn AxisLimits, line: u32) {
        self.flush(limits);
        self.push(line, MotionMessage::ToolChange);
    }

    pub fn select_pocket(&mut self, limits: &dyn AxisLimits, line: u32, pocket: u32) {
        self.flush(limits);
        self.push(line, MotionMessage::SelectPocket { pocket });
    }

    pub fn change_tool_number(&mut self, limits: &dyn AxisLimits, line: u32, tool_no: u32) {
        self.flush(limits);
        self.push(line, MotionMessage::SetToolNumber { tool_no });
    }

    /// `SET_TOOL_TABLE_ENTRY`; out-of-range pocket is a silent no-op,
    /// mirroring the query's silent-zero-entry behavior (spec §7).
    pub fn set_tool_table_entry(&mut self, limits: &dyn AxisLimits, line: u32, entry: ToolTableEntry) {
        self.flush(limits);
        if let Some(slot) = self.tool_table.get_mut(entry.pocket as usize) {
            *slot = entry;
            self.push(line, MotionMessage::SetToolTableEntry { entry });
        } else {
            tracing::warn!(pocket = entry.pocket, "tool table entry out of range, ignored");
        }
    }

    pub fn program_pause(&mut self, limits: &dyn AxisLimits, line: u32) {
        self.flush(limits);
        self.push(line, MotionMessage::ProgramPause);
    }

    pub fn program_stop(&mut self, limits: &dyn AxisLimits, line: u32, optional: bool) {
        self.flush(limits);
        self.push(line, MotionMessage::ProgramStop { optional });
    }

    pub fn program_end(&mut self, limits: &dyn AxisLimits, line: u32) {
        self.flush(limits);
        self.push(line, MotionMessage::ProgramEnd);
    }

    pub fn feed_override_enable(&mut self, limits: &dyn AxisLimits, line: u32, enable: bool) {
        self.flush(limits);
        self.push(line, MotionMessage::FeedOverrideEnable(enable));
    }

    pub fn spindle_override_enable(&mut self, limits: &dyn AxisLimits, line: u32, enable: bool) {
        self.flush(limits);
        self.push(line, MotionMessage::SpindleOverrideEnable(enable));
    }

    pub fn adaptive_feed_enable(&mut self, limits: &dyn AxisLimits, line: u32, enable: bool) {
        self.flush(limits);
        self.push(line, MotionMessage::AdaptiveFeedEnable(enable));
    }

    pub fn feed_hold_enable(&mut self, limits: &dyn AxisLimits, line: u32, enable: bool) {
        self.flush(limits);
        self.push(line, MotionMessage::FeedHoldEnable(enable));
    }

    /// Motion-synched digital output: ordered relative to buffered moves.
    pub fn set_motion_output_bit(&mut self, limits: &dyn AxisLimits, line: u32, index: u32, value: bool) {
        self.flush(limits);
        self.push(line, MotionMessage::SetMotionOutputBit { index, value });
    }

    /// Immediate auxiliary digital output: not ordered against buffered moves.
    pub fn set_aux_output_bit(&mut self, line: u32, index: u32, value: bool) {
        self.push(line, MotionMessage::SetAuxOutputBit { index, value });
    }

    pub fn set_motion_output_value(&mut self, limits: &dyn AxisLimits, line: u32, index: u32, value: f64) {
        self.flush(limits);
        self.push(line, MotionMessage::SetMotionOutputValue { index, value });
    }

    pub fn set_aux_output_value(&mut self, line: u32, index: u32, value: f64) {
        self.push(line, MotionMessage::SetAuxOutputValue { index, value });
    }

    pub fn input_wait(
        &mut self,
        limits: &dyn AxisLimits,
        line: u32,
        index: u32,
        input_type: InputType,
        wait_type: WaitType,
        timeout: f64,
    ) {
        self.flush(limits);
        self.push(line, MotionMessage::InputWait { index, input_type, wait_type, timeout });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisMask, StaticAxisLimits};

    fn limits() -> StaticAxisLimits {
        StaticAxisLimits::uniform(100.0, 1000.0, 10000.0, AxisMask::XYZ)
    }

    fn engine_with_feed() -> CanonEngine {
        let mut e = CanonEngine::new();
        e.set_motion_control_mode(&limits(), crate::state::MotionMode::Continuous, 0.0);
        e.set_naivecam_tolerance(0.1);
        e.set_feed_rate(&limits(), 10.0, 10.0);
        e.drain_messages();
        e
    }

    #[test]
    fn scenario_one_straight_feed_matches_spec() {
        let mut e = engine_with_feed();
        e.straight_feed(&limits(), 10, Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        e.finish(&limits());
        assert_eq!(e.interpreter_list().len(), 1);
        match &e.interpreter_list()[0].payload {
            MotionMessage::LinearMove { end, vel, ini_max_vel, acc, ini_max_jerk, feed_mode, .. } => {
                assert_eq!(end.x, 10.0);
                assert_eq!(*vel, 10.0);
                assert_eq!(*ini_max_vel, 100.0);
                assert_eq!(*acc, 1000.0);
                assert_eq!(*ini_max_jerk, 10000.0);
                assert_eq!(*feed_mode, 0);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn scenario_four_arc_feed_matches_spec() {
        let mut e = engine_with_feed();
        e.arc_feed(&limits(), 20, 10.0, 0.0, 5.0, 0.0, 1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(e.interpreter_list().len(), 1);
        match &e.interpreter_list()[0].payload {
            MotionMessage::CircularMove { end, center, normal, turn, .. } => {
                assert_eq!(end.x, 10.0);
                assert_eq!(*center, (5.0, 0.0, 0.0));
                assert_eq!(*normal, (0.0, 0.0, 1.0));
                assert_eq!(*turn, 0);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn scenario_five_inches_traverse_matches_spec() {
        let mut e = engine_with_feed();
        e.use_length_units(&limits(), LengthUnits::Inches);
        e.straight_traverse(&limits(), 1, Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(e.end_point().x, 25.4);
        match &e.interpreter_list()[0].payload {
            MotionMessage::LinearMove { end, tag, .. } => {
                assert_eq!(*tag, LinearTag::Traverse);
                assert_eq!(end.x, 25.4 * e.state().external_length_units);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn scenario_six_rotation_round_trips_through_query() {
        let mut e = engine_with_feed();
        e.set_xy_rotation(&limits(), 90.0);
        e.straight_feed(&limits(), 1, Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        e.finish(&limits());
        assert!(e.end_point().x.abs() < 1e-9);
        assert!((e.end_point().y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rigid_tap_does_not_move_endpoint() {
        let mut e = engine_with_feed();
        let before = e.end_point();
        e.rigid_tap(&limits(), 1, 5.0, 0.0, -10.0);
        assert_eq!(e.end_point(), before);
        assert_eq!(e.interpreter_list().len(), 1);
    }

    #[test]
    fn degenerate_arc_is_rejected() {
        let mut e = engine_with_feed();
        let result = e.arc_feed(&limits(), 1, 0.0, 0.0, 0.0, 0.0, 1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(result.is_err());
    }

    #[test]
    fn tool_table_entry_out_of_range_is_ignored() {
        let mut e = engine_with_feed();
        e.set_tool_table_entry(
            &limits(),
            1,
            ToolTableEntry { pocket: 9999, tool_no: 4, offset: Pose::ZERO, diameter: 6.0 },
        );
        assert!(e.interpreter_list().is_empty());
    }

    #[test]
    fn spline_feed_emits_arc_pairs() {
        let mut e = engine_with_feed();
        e.spline_feed_quadratic(&limits(), 1, (5.0, 10.0), (10.0, 0.0), 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
            .unwrap();
        assert!(!e.interpreter_list().is_empty());
    }
}
