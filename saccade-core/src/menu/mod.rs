//! Button-driven menu
//!
//! Three buttons drive the panel: cycle through sections, step through the
//! active section's options, and select. The cycle button doubles as
//! select when held; see [`button::ButtonTracker`].

pub mod button;
pub mod machine;
pub mod render;
pub mod section;

pub use button::{ButtonTracker, Gesture, TrackerState, HOLD_THRESHOLD_MS};
pub use machine::{MenuAction, MenuCursorState, MenuStateMachine, Setting, MAX_SECTIONS};
pub use render::{eye_status_line, OptionCell, RenderModel, SectionTitle, StatusColor};
pub use section::{
    DefaultOption, MenuSection, Message, SectionKind, StatusSource, DEFAULT_MENU, SETTING_EYE,
    SETTING_RANGE,
};
