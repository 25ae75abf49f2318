//! Eye state and motion control

pub mod controller;
pub mod state;

pub use controller::{
    AxisFailure, AxisResult, EyeMotionController, EyeMove, LinkStatus, NinePointMove,
    SaccadeMove,
};
pub use state::{EyeSelection, EyeState, MotionTarget};
