use ratatui::style::Color;

/// Runtime theme colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Semantic colors
    pub accent: Color,
    pub warning: Color,
    pub info: Color,

    /// Section backgrounds, cycled top to bottom
    pub section_bgs: Vec<Color>,
}

impl Theme {
    pub fn section_bg(&self, index: usize) -> Color {
        if self.section_bgs.is_empty() {
            self.bg0
        } else {
            self.section_bgs[index % self.section_bgs.len()]
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
            info: Color::Rgb(0x7d, 0xae, 0xa3),
            section_bgs: vec![
                Color::Rgb(0x28, 0x28, 0x28),
                Color::Rgb(0x32, 0x30, 0x2f),
                Color::Rgb(0x2a, 0x2f, 0x2c),
                Color::Rgb(0x30, 0x2c, 0x2c),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_bg_cycles() {
        let theme = Theme::default();
        assert_eq!(theme.section_bg(0), theme.section_bg(4));
        assert_ne!(theme.section_bg(0), theme.section_bg(1));

        let flat = Theme {
            section_bgs: Vec::new(),
            ..Theme::default()
        };
        assert_eq!(flat.section_bg(3), flat.bg0);
    }
}
