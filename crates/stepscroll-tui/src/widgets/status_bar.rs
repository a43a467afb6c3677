use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use stepscroll_core::navigation::DebugInfo;

use crate::app::App;

const HELP_HINT: &str = " j/k:section gg/G:ends d:debug q:quit ";

/// Short description of what the navigator is doing
pub fn state_label(info: &DebugInfo) -> String {
    if let Some(target) = info.in_flight_target {
        format!("moving → {}", target + 1)
    } else if info.is_scrolling {
        "scrolling".to_string()
    } else if info.cooldown_remaining_ms > 0 {
        format!("cooldown {}ms", info.cooldown_remaining_ms)
    } else {
        "ready".to_string()
    }
}

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let info = &app.snapshot;

        let title = app
            .current_section()
            .map(|s| s.title.as_str())
            .unwrap_or("");
        let position = format!(
            " {}/{} {} ",
            info.current_index + 1,
            info.section_count,
            title
        );
        let state = format!(" {} ", state_label(info));
        let message = app.status_message.clone().unwrap_or_default();

        let used = position.chars().count()
            + state.chars().count()
            + message.chars().count()
            + HELP_HINT.len();
        let padding = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(
                position,
                Style::default()
                    .fg(theme.bg0)
                    .bg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(state, Style::default().fg(theme.info).bg(theme.bg2)),
            Span::styled(message, Style::default().fg(theme.warning).bg(theme.bg2)),
            Span::styled(" ".repeat(padding), Style::default().bg(theme.bg2)),
            Span::styled(HELP_HINT, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
