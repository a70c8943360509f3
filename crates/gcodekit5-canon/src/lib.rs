//! Canonical motion front-end: translates interpreter-level canonical
//! commands (traverses, feeds, arcs, splines, dwells, spindle/coolant
//! changes, tool offsets, I/O sync) into trajectory messages for a
//! downstream motion executor. See [`engine::CanonEngine`] for the entry
//! point, [`axis::AxisLimits`] and [`query::ExternalStatus`] for the two
//! external collaborators this crate borrows from but does not own.

pub mod arc_math;
pub mod axis;
pub mod biarc;
pub mod curve;
pub mod dispatch;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod message;
pub mod query;
pub mod segment_buffer;
pub mod state;
pub mod units;

pub use engine::CanonEngine;
pub use error::{CanonError, CanonResult};
pub use message::{MotionMessage, TrajectoryMessage};
pub use query::ExternalStatus;
pub use units::Pose;
