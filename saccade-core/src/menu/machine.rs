//! Menu state machine
//!
//! Consumes button events and produces actions for the run loop. The
//! machine never touches the actuator; the caller performs moves and
//! reports back through [`MenuStateMachine::zero_completed`].

use heapless::Vec;
use saccade_protocol::{ButtonEdge, ButtonEvent, ButtonKey, NinePoint};

use super::button::{ButtonTracker, Gesture};
use super::render::RenderModel;
use super::section::{MenuSection, SectionKind, DEFAULT_MENU, SETTING_EYE, SETTING_RANGE};
use crate::config::{NinePointSettings, MAX_DISTANCES};
use crate::eye::{EyeSelection, EyeState, LinkStatus};

/// Maximum number of menu sections
pub const MAX_SECTIONS: usize = 8;

/// A settings change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    Eye(EyeSelection),
    Range(u8),
}

/// What the run loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Cursor changed; redraw only
    Redraw,
    /// Move the selected eyes to a nine-point direction
    Move {
        point: NinePoint,
        distance: f32,
        eyes: EyeSelection,
    },
    /// Re-centre every eye, then call `zero_completed`
    Zero,
    /// A setting was toggled; redraw
    SettingChanged(Setting),
}

/// Cursor positions for every section
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuCursorState {
    pub active_section: usize,
    /// Highlighted option per section
    pub current_option: Vec<Option<usize>, MAX_SECTIONS>,
    /// Last committed option per section
    pub selected_option: Vec<Option<usize>, MAX_SECTIONS>,
}

impl MenuCursorState {
    fn new(sections: &[MenuSection]) -> Self {
        let mut current_option = Vec::new();
        for section in sections.iter().take(MAX_SECTIONS) {
            let _ = current_option.push(section.default_index());
        }
        Self {
            active_section: 0,
            selected_option: current_option.clone(),
            current_option,
        }
    }
}

/// Button-driven menu
pub struct MenuStateMachine {
    sections: &'static [MenuSection],
    cursor: MenuCursorState,
    cycle_button: ButtonTracker,
    eyes: EyeSelection,
    distances: Vec<u8, MAX_DISTANCES>,
    distance_index: usize,
}

impl MenuStateMachine {
    /// Build with a custom section list (at most [`MAX_SECTIONS`] are used)
    ///
    /// An empty list falls back to [`DEFAULT_MENU`].
    pub fn new(sections: &'static [MenuSection], settings: &NinePointSettings) -> Self {
        let sections = match sections {
            [] => &DEFAULT_MENU[..],
            _ => &sections[..sections.len().min(MAX_SECTIONS)],
        };
        Self {
            sections,
            cursor: MenuCursorState::new(sections),
            cycle_button: ButtonTracker::default(),
            eyes: settings.default_eyes,
            distances: settings.distances.clone(),
            distance_index: settings.default_index(),
        }
    }

    /// Standard nine-point / zero / settings menu
    pub fn with_default_menu(settings: &NinePointSettings) -> Self {
        Self::new(&DEFAULT_MENU, settings)
    }

    pub fn sections(&self) -> &'static [MenuSection] {
        self.sections
    }

    pub fn cursor(&self) -> &MenuCursorState {
        &self.cursor
    }

    pub fn active_section(&self) -> &MenuSection {
        &self.sections[self.cursor.active_section]
    }

    /// Current eye target
    pub fn eyes(&self) -> EyeSelection {
        self.eyes
    }

    /// Current nine-point distance in degrees
    pub fn distance(&self) -> f32 {
        self.distances
            .get(self.distance_index)
            .copied()
            .map(f32::from)
            .unwrap_or(0.0)
    }

    /// Dispatch one button edge
    pub fn handle(&mut self, event: ButtonEvent) -> Option<MenuAction> {
        match (event.key, event.edge) {
            (ButtonKey::Select, ButtonEdge::Pressed) => self.select(),
            (ButtonKey::Step, ButtonEdge::Pressed) => self.step(),
            (ButtonKey::Cycle, ButtonEdge::Pressed) => {
                self.cycle_button.press(event.timestamp_ms);
                None
            }
            (ButtonKey::Cycle, ButtonEdge::Released) => {
                match self.cycle_button.release(event.timestamp_ms) {
                    Gesture::Cycle => Some(self.cycle()),
                    Gesture::Select => self.select(),
                }
            }
            _ => None,
        }
    }

    /// Advance to the next section, initialising its cursor if unset
    pub fn cycle(&mut self) -> MenuAction {
        let next = (self.cursor.active_section + 1) % self.sections.len();
        self.cursor.active_section = next;
        if self.sections[next].has_options() && self.cursor.current_option[next].is_none() {
            self.cursor.current_option[next] = Some(0);
        }
        MenuAction::Redraw
    }

    /// Advance the option cursor; no-op without options
    pub fn step(&mut self) -> Option<MenuAction> {
        let index = self.cursor.active_section;
        let count = self.sections[index].options.len();
        if count == 0 {
            return None;
        }
        let current = self.cursor.current_option[index].unwrap_or(0);
        self.cursor.current_option[index] = Some((current + 1) % count);
        Some(MenuAction::Redraw)
    }

    /// Commit the current option and trigger the section's action
    pub fn select(&mut self) -> Option<MenuAction> {
        let index = self.cursor.active_section;
        let section = self.sections[index];

        match section.kind {
            SectionKind::Zero => {
                self.cursor.selected_option[index] = Some(0);
                Some(MenuAction::Zero)
            }
            SectionKind::Settings => {
                let option = self.cursor.current_option[index]
                    .filter(|&i| i < section.options.len())?;
                self.cursor.selected_option[index] = Some(option);
                match section.options[option] {
                    SETTING_EYE => {
                        self.eyes = self.eyes.next();
                        Some(MenuAction::SettingChanged(Setting::Eye(self.eyes)))
                    }
                    SETTING_RANGE if !self.distances.is_empty() => {
                        self.distance_index = (self.distance_index + 1) % self.distances.len();
                        let distance = self.distances[self.distance_index];
                        Some(MenuAction::SettingChanged(Setting::Range(distance)))
                    }
                    _ => Some(MenuAction::Redraw),
                }
            }
            SectionKind::NinePoint => {
                let Some(option) = self.cursor.current_option[index] else {
                    self.cursor.selected_option[index] = Some(0);
                    return Some(MenuAction::Redraw);
                };
                self.cursor.selected_option[index] = Some(option);
                let point = section
                    .options
                    .get(option)
                    .and_then(|key| NinePoint::from_key(key));
                match point {
                    Some(point) => Some(MenuAction::Move {
                        point,
                        distance: self.distance(),
                        eyes: self.eyes,
                    }),
                    None => Some(MenuAction::Redraw),
                }
            }
        }
    }

    /// Report the outcome of a zero action
    ///
    /// On success the nine-point section shows centre as selected.
    pub fn zero_completed(&mut self, success: bool) {
        if !success {
            return;
        }
        for (i, section) in self.sections.iter().enumerate() {
            if section.kind == SectionKind::NinePoint {
                if let Some(center) = section.option_index(NinePoint::Center.key()) {
                    self.cursor.selected_option[i] = Some(center);
                }
            }
        }
    }

    /// Build the render model for the current state
    pub fn render(&self, states: &[EyeState; 2], link: LinkStatus) -> RenderModel {
        RenderModel::build(self, states, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EyeId;
    use crate::menu::section::{DefaultOption, Message};

    fn make_machine() -> MenuStateMachine {
        MenuStateMachine::with_default_menu(&NinePointSettings::default())
    }

    fn press(key: ButtonKey, t: u32) -> ButtonEvent {
        ButtonEvent::pressed(key, t)
    }

    fn release(key: ButtonKey, t: u32) -> ButtonEvent {
        ButtonEvent::released(key, t)
    }

    fn tap_cycle(machine: &mut MenuStateMachine, t: u32) -> Option<MenuAction> {
        machine.handle(press(ButtonKey::Cycle, t));
        machine.handle(release(ButtonKey::Cycle, t + 100))
    }

    #[test]
    fn test_empty_section_list_uses_default_menu() {
        let mut machine = MenuStateMachine::new(&[], &NinePointSettings::default());
        assert_eq!(machine.sections().len(), DEFAULT_MENU.len());
        assert_eq!(machine.cycle(), MenuAction::Redraw);
        assert_eq!(machine.cursor().active_section, 1);
    }

    #[test]
    fn test_initial_state() {
        let machine = make_machine();
        let cursor = machine.cursor();
        assert_eq!(cursor.active_section, 0);
        assert_eq!(cursor.current_option.as_slice(), &[Some(4), None, Some(0)]);
        assert_eq!(cursor.selected_option.as_slice(), &[Some(4), None, Some(0)]);
        assert_eq!(machine.eyes(), EyeSelection::Both);
        assert_eq!(machine.distance(), 10.0);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut machine = make_machine();
        assert_eq!(tap_cycle(&mut machine, 0), Some(MenuAction::Redraw));
        assert_eq!(machine.cursor().active_section, 1);
        tap_cycle(&mut machine, 1000);
        tap_cycle(&mut machine, 2000);
        assert_eq!(machine.cursor().active_section, 0);
    }

    static NO_DEFAULTS: [MenuSection; 2] = [
        MenuSection {
            name: "A",
            options: &[],
            row_length: 0,
            default_option: None,
            kind: SectionKind::Zero,
            message: Some(Message::Static("a")),
        },
        MenuSection {
            name: "B",
            options: &["x", "y"],
            row_length: 2,
            default_option: Some(DefaultOption::Index(0)),
            kind: SectionKind::Settings,
            message: None,
        },
    ];

    #[test]
    fn test_cycle_initialises_unset_cursor() {
        let mut machine = MenuStateMachine::new(&NO_DEFAULTS, &NinePointSettings::default());
        machine.cursor.current_option[1] = None;
        machine.cycle();
        assert_eq!(machine.cursor().current_option[1], Some(0));
    }

    #[test]
    fn test_step_wraps_and_noop_without_options() {
        let mut machine = make_machine();
        for _ in 0..5 {
            machine.handle(press(ButtonKey::Step, 0));
        }
        assert_eq!(machine.cursor().current_option[0], Some(0));

        machine.cycle();
        assert_eq!(machine.handle(press(ButtonKey::Step, 0)), None);
        assert_eq!(machine.cursor().current_option[1], None);
    }

    #[test]
    fn test_select_nine_point_emits_move() {
        let mut machine = make_machine();
        machine.handle(press(ButtonKey::Step, 0)); // C -> R
        let action = machine.handle(press(ButtonKey::Select, 10));
        assert_eq!(
            action,
            Some(MenuAction::Move {
                point: NinePoint::Right,
                distance: 10.0,
                eyes: EyeSelection::Both,
            })
        );
        assert_eq!(machine.cursor().selected_option[0], Some(5));
    }

    #[test]
    fn test_long_press_cycle_selects() {
        let mut machine = make_machine();
        machine.handle(press(ButtonKey::Cycle, 1000));
        let action = machine.handle(release(ButtonKey::Cycle, 1700));
        assert!(matches!(
            action,
            Some(MenuAction::Move {
                point: NinePoint::Center,
                ..
            })
        ));
        assert_eq!(machine.cursor().active_section, 0);
    }

    #[test]
    fn test_release_without_press_cycles() {
        let mut machine = make_machine();
        let action = machine.handle(release(ButtonKey::Cycle, 5));
        assert_eq!(action, Some(MenuAction::Redraw));
        assert_eq!(machine.cursor().active_section, 1);
    }

    #[test]
    fn test_other_releases_ignored() {
        let mut machine = make_machine();
        assert_eq!(machine.handle(release(ButtonKey::Select, 5)), None);
        assert_eq!(machine.handle(release(ButtonKey::Step, 5)), None);
    }

    #[test]
    fn test_zero_reselects_center() {
        let mut machine = make_machine();
        machine.handle(press(ButtonKey::Step, 0));
        machine.select();
        assert_eq!(machine.cursor().selected_option[0], Some(5));

        machine.cycle();
        assert_eq!(machine.select(), Some(MenuAction::Zero));
        assert_eq!(machine.cursor().selected_option[1], Some(0));

        machine.zero_completed(true);
        assert_eq!(machine.cursor().selected_option[0], Some(4));
    }

    #[test]
    fn test_failed_zero_keeps_selection() {
        let mut machine = make_machine();
        machine.handle(press(ButtonKey::Step, 0));
        machine.select();
        machine.cycle();
        machine.select();
        machine.zero_completed(false);
        assert_eq!(machine.cursor().selected_option[0], Some(5));
    }

    #[test]
    fn test_settings_eye_cycles() {
        let mut machine = make_machine();
        machine.cycle();
        machine.cycle();
        let mut seen = std::vec::Vec::new();
        for _ in 0..3 {
            seen.push(machine.select());
        }
        assert_eq!(
            seen,
            [
                Some(MenuAction::SettingChanged(Setting::Eye(EyeSelection::Left))),
                Some(MenuAction::SettingChanged(Setting::Eye(EyeSelection::Right))),
                Some(MenuAction::SettingChanged(Setting::Eye(EyeSelection::Both))),
            ]
        );
    }

    #[test]
    fn test_settings_range_cycles() {
        let mut machine = make_machine();
        machine.cycle();
        machine.cycle();
        machine.step();
        let mut ranges = std::vec::Vec::new();
        for _ in 0..5 {
            if let Some(MenuAction::SettingChanged(Setting::Range(d))) = machine.select() {
                ranges.push(d);
            }
        }
        assert_eq!(ranges, [20, 40, 1, 5, 10]);
        assert_eq!(machine.cursor().selected_option[2], Some(1));
    }

    #[test]
    fn test_move_uses_current_settings() {
        let mut machine = make_machine();
        machine.cycle();
        machine.cycle();
        machine.select(); // eyes -> L
        machine.step();
        machine.select(); // range -> 20
        machine.cycle(); // back to 9-pt
        let action = machine.select();
        assert_eq!(
            action,
            Some(MenuAction::Move {
                point: NinePoint::Center,
                distance: 20.0,
                eyes: EyeSelection::Left,
            })
        );
    }

    #[test]
    fn test_render_after_move() {
        let mut machine = make_machine();
        machine.select();
        let states = [EyeState::new(EyeId::Left), EyeState::new(EyeId::Right)];
        let model = machine.render(&states, LinkStatus::Connected);
        assert_eq!(model.active_section, 0);
        assert!(model.options[4].selected);
    }
}
