//! Pose sources
//!
//! The waypoint controller does not own the estimator, it reads the pose
//! through the `PoseSource` trait. Several adapters are provided here so that
//! the controller can be driven by the estimator, a shared handle to it, or
//! a set of arbitrary accessor closures.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

// Internal
use super::{Pose, PoseEstimator};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Anything which can report the vehicle's current pose.
pub trait PoseSource {
    /// Get the current pose.
    fn pose(&self) -> Pose;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A cheaply clonable handle to the latest pose published by a
/// `PoseEstimator`.
#[derive(Debug, Clone, Default)]
pub struct PoseHandle(Rc<Cell<Pose>>);

/// A pose source built from three accessor closures.
pub struct FnPoseSource<X, Y, H> {
    get_x: X,
    get_y: Y,
    get_heading: H,
    unit: HeadingUnit
}

/// Adapter which reflects a pose source about the X axis.
///
/// The Y coordinate and heading are negated. This converts between a frame
/// in which heading increases counter-clockwise and one in which it
/// increases clockwise.
#[derive(Debug, Clone)]
pub struct Mirrored<S>(pub S);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Unit in which a heading accessor reports its value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingUnit {
    Degrees,
    Radians
}

/// Direction in which heading increases in the frame the controller steers
/// in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingFrame {
    /// Heading increases counter-clockwise, as reported by the estimator.
    CounterClockwise,

    /// Heading increases clockwise. The estimator's pose is mirrored before
    /// being given to the controller.
    Clockwise
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseSource for PoseEstimator {
    fn pose(&self) -> Pose {
        self.get_pose()
    }
}

impl PoseHandle {
    pub(crate) fn publish(&self, pose: Pose) {
        self.0.set(pose);
    }
}

impl PoseSource for PoseHandle {
    fn pose(&self) -> Pose {
        self.0.get()
    }
}

impl<X, Y, H> FnPoseSource<X, Y, H>
where
    X: Fn() -> f64,
    Y: Fn() -> f64,
    H: Fn() -> f64
{
    /// Create a new source from the given accessors. Headings given by
    /// `get_heading` are interpreted in `unit`.
    pub fn new(get_x: X, get_y: Y, get_heading: H, unit: HeadingUnit) -> Self {
        Self {
            get_x,
            get_y,
            get_heading,
            unit
        }
    }
}

impl<X, Y, H> PoseSource for FnPoseSource<X, Y, H>
where
    X: Fn() -> f64,
    Y: Fn() -> f64,
    H: Fn() -> f64
{
    fn pose(&self) -> Pose {
        let heading = (self.get_heading)();
        let heading_rad = match self.unit {
            HeadingUnit::Degrees => heading.to_radians(),
            HeadingUnit::Radians => heading
        };

        Pose::new((self.get_x)(), (self.get_y)(), heading_rad)
    }
}

impl<S: PoseSource> PoseSource for Mirrored<S> {
    fn pose(&self) -> Pose {
        let pose = self.0.pose();

        Pose::new(pose.x_mm(), -pose.y_mm(), -pose.heading_rad)
    }
}

impl HeadingFrame {
    /// Wrap the given source so that it reports poses in this frame.
    pub fn wrap<S>(self, source: S) -> Box<dyn PoseSource>
    where
        S: PoseSource + 'static
    {
        match self {
            HeadingFrame::CounterClockwise => Box::new(source),
            HeadingFrame::Clockwise => Box::new(Mirrored(source))
        }
    }
}
