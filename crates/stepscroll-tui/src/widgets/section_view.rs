use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use stepscroll_core::config::SectionConfig;

use crate::app::App;
use crate::theme::Theme;

/// The part of one section that falls inside the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub index: usize,
    /// Rows of the section hidden above the viewport
    pub skip: u16,
    /// First viewport row the section occupies
    pub y: u16,
    pub height: u16,
}

/// Sections intersecting `[offset, offset + viewport)` in a stack of
/// `count` sections, each `section_height` rows tall
pub fn visible_bands(offset: u16, section_height: u16, viewport: u16, count: usize) -> Vec<Band> {
    if section_height == 0 || viewport == 0 {
        return Vec::new();
    }
    let view_top = offset as u32;
    let view_bottom = view_top + viewport as u32;

    (0..count)
        .filter_map(|index| {
            let top = index as u32 * section_height as u32;
            let bottom = top + section_height as u32;
            if bottom <= view_top || top >= view_bottom {
                return None;
            }
            let visible_top = top.max(view_top);
            let visible_bottom = bottom.min(view_bottom);
            Some(Band {
                index,
                skip: (visible_top - top) as u16,
                y: (visible_top - view_top) as u16,
                height: (visible_bottom - visible_top) as u16,
            })
        })
        .collect()
}

/// Full-height content of one section: a header rule, then the title and
/// body centered vertically
pub fn section_lines<'a>(
    section: &'a SectionConfig,
    index: usize,
    count: usize,
    height: u16,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let height = height as usize;
    let mut lines = Vec::with_capacity(height);
    if height == 0 {
        return lines;
    }

    lines.push(Line::from(Span::styled(
        format!("── {}/{} ──", index + 1, count),
        Style::default().fg(theme.grey1),
    )));

    let mut content = vec![Line::from(Span::styled(
        section.title.as_str(),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    ))];
    if !section.body.is_empty() {
        content.push(Line::default());
        content.extend(
            section
                .body
                .lines()
                .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.fg0)))),
        );
    }

    let room = height - 1;
    let pad = room.saturating_sub(content.len()) / 2;
    lines.extend(std::iter::repeat_with(Line::default).take(pad));
    lines.extend(content.into_iter().take(room - pad));
    lines.resize_with(height, Line::default);
    lines
}

pub struct SectionViewWidget;

impl SectionViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let section_height = app.snapshot.section_height.round().max(0.0) as u16;
        let bands = visible_bands(
            app.scroll_row(),
            section_height,
            area.height,
            app.section_count(),
        );

        for band in bands {
            let Some(section) = app.sections.get(band.index) else {
                continue;
            };
            let lines = section_lines(
                section,
                band.index,
                app.section_count(),
                section_height,
                &app.theme,
            );
            let band_area = Rect::new(area.x, area.y + band.y, area.width, band.height);
            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().bg(app.theme.section_bg(band.index)))
                .scroll((band.skip, 0));
            frame.render_widget(paragraph, band_area);
        }
    }
}
