use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

pub struct DebugOverlayWidget;

impl DebugOverlayWidget {
    /// Navigator snapshot as pretty JSON in a box over the top-right corner
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let text = serde_json::to_string_pretty(&app.snapshot)
            .unwrap_or_else(|e| format!("snapshot unavailable: {}", e));

        let width = 46u16.min(area.width);
        let height = (text.lines().count() as u16 + 2).min(area.height);
        let overlay = Rect::new(area.x + area.width - width, area.y, width, height);

        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .title(" debug ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.info))
            .style(Style::default().bg(app.theme.bg1));

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(app.theme.fg0))
            .block(block);
        frame.render_widget(paragraph, overlay);
    }
}
