use stepscroll_core::config::SectionConfig;
use stepscroll_core::navigation::{DebugInfo, NavigationFault, NavigatorCommand, NavigatorEvent};

use crate::input::Action;
use crate::scroll::timing::to_row;
use crate::theme::Theme;

/// Front-end state. Navigation state itself lives in the navigator; the app
/// only keeps the latest snapshot it published.
pub struct App {
    pub sections: Vec<SectionConfig>,
    pub snapshot: DebugInfo,
    pub theme: Theme,
    pub show_debug: bool,
    pub should_quit: bool,
    /// First key of a pending two-key sequence ("gg")
    pub pending_key: Option<char>,
    pub status_message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        let sections = resolve_sections(&[], Some(3));
        let snapshot = empty_snapshot(sections.len());
        Self::new(sections, snapshot, Theme::default())
    }
}

impl App {
    pub fn new(sections: Vec<SectionConfig>, snapshot: DebugInfo, theme: Theme) -> Self {
        Self {
            sections,
            snapshot,
            theme,
            show_debug: false,
            should_quit: false,
            pending_key: None,
            status_message: None,
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn current_section(&self) -> Option<&SectionConfig> {
        self.sections.get(self.snapshot.current_index)
    }

    /// Top row of the viewport within the section stack
    pub fn scroll_row(&self) -> u16 {
        to_row(self.snapshot.scroll_offset)
    }

    pub fn update_snapshot(&mut self, snapshot: DebugInfo) {
        self.snapshot = snapshot;
    }

    /// Apply a UI-level action; returns the command to forward to the navigator
    pub fn handle_action(&mut self, action: Action) -> Option<NavigatorCommand> {
        if action == Action::PendingG {
            self.pending_key = Some('g');
            return None;
        }
        self.pending_key = None;

        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::ToggleDebug => {
                self.show_debug = !self.show_debug;
                None
            }
            other => other.command(),
        }
    }

    /// Surface navigator events in the status bar
    pub fn apply_event(&mut self, event: &NavigatorEvent) {
        match event {
            NavigatorEvent::SectionChanged(change) => {
                self.status_message = None;
                if let Some(section) = self.sections.get(change.to) {
                    self.status_message = Some(format!(" → {}", section.title));
                }
            }
            NavigatorEvent::Fault(fault @ NavigationFault::AnimationStuck { .. })
            | NavigatorEvent::Fault(fault @ NavigationFault::StateDesync { .. }) => {
                self.status_message = Some(format!(" ! {}", fault));
            }
            // Blocked requests are routine during a wheel gesture
            NavigatorEvent::Fault(_) => {}
        }
    }
}

/// Sections to display: the configured ones, or exactly `count` of them when
/// given, padding with generated titles
pub fn resolve_sections(configured: &[SectionConfig], count: Option<usize>) -> Vec<SectionConfig> {
    let Some(count) = count else {
        return configured.to_vec();
    };
    (0..count)
        .map(|i| {
            configured.get(i).cloned().unwrap_or_else(|| SectionConfig {
                title: format!("Section {}", i + 1),
                body: String::new(),
            })
        })
        .collect()
}

/// Snapshot for a navigator that has not published yet
pub fn empty_snapshot(section_count: usize) -> DebugInfo {
    DebugInfo {
        is_animating: false,
        is_scrolling: false,
        cooldown_remaining_ms: 0,
        since_last_navigation_ms: None,
        current_index: 0,
        section_count,
        last_animation_id: None,
        in_flight_target: None,
        pending_target: None,
        scroll_offset: 0.0,
        section_height: 0.0,
    }
}
