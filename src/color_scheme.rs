use ratatui::style::{Color, Modifier, Style};

/// Selectable color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSchemeId {
    Default = 0,
    Monochrome = 1,
    LightTerminal = 2,
    DarkVivid = 3,
}

impl ColorSchemeId {
    pub fn all() -> &'static [ColorSchemeId] {
        &[
            ColorSchemeId::Default,
            ColorSchemeId::Monochrome,
            ColorSchemeId::LightTerminal,
            ColorSchemeId::DarkVivid,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorSchemeId::Default => "Default",
            ColorSchemeId::Monochrome => "Monochrome",
            ColorSchemeId::LightTerminal => "Light Terminal",
            ColorSchemeId::DarkVivid => "Dark Vivid",
        }
    }

    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => ColorSchemeId::Monochrome,
            2 => ColorSchemeId::LightTerminal,
            3 => ColorSchemeId::DarkVivid,
            _ => ColorSchemeId::Default,
        }
    }

    pub fn next(&self) -> Self {
        Self::from_index((*self as usize + 1) % Self::all().len())
    }
}

/// Color slots used by the monitor UI
#[derive(Debug, Clone)]
pub struct ColorScheme {
    // Core bars
    pub bar_low: Color,     // <=25%
    pub bar_medium: Color,  // >25%
    pub bar_high: Color,    // >75%
    pub bar_bg: Color,
    pub core_label: Color,
    pub temp_sensor: Color,
    pub temp_fallback: Color, // synthesized temperatures

    // Info panel
    pub info_label: Color,
    pub info_value: Color,
    pub stale_fg: Color,
    pub stale_bg: Color,

    // Section frames
    pub border: Color,
    pub title: Color,

    // Footer
    pub footer_key_fg: Color,
    pub footer_key_bg: Color,
    pub footer_label_fg: Color,
    pub footer_label_bg: Color,

    // Popups
    pub popup_border: Color,
    pub popup_bg: Color,
    pub popup_title: Color,
    pub popup_text: Color,
}

impl ColorScheme {
    pub fn from_id(id: ColorSchemeId) -> Self {
        match id {
            ColorSchemeId::Default => Self::default_scheme(),
            ColorSchemeId::Monochrome => Self::monochrome(),
            ColorSchemeId::LightTerminal => Self::light_terminal(),
            ColorSchemeId::DarkVivid => Self::dark_vivid(),
        }
    }

    fn default_scheme() -> Self {
        Self {
            bar_low: Color::Green,
            bar_medium: Color::Yellow,
            bar_high: Color::Red,
            bar_bg: Color::DarkGray,
            core_label: Color::White,
            temp_sensor: Color::Cyan,
            temp_fallback: Color::DarkGray,

            info_label: Color::White,
            info_value: Color::Cyan,
            stale_fg: Color::Black,
            stale_bg: Color::Yellow,

            border: Color::DarkGray,
            title: Color::Cyan,

            footer_key_fg: Color::Black,
            footer_key_bg: Color::Cyan,
            footer_label_fg: Color::Indexed(252),
            footer_label_bg: Color::Indexed(234),

            popup_border: Color::Cyan,
            popup_bg: Color::Black,
            popup_title: Color::Yellow,
            popup_text: Color::White,
        }
    }

    fn monochrome() -> Self {
        Self {
            bar_low: Color::White,
            bar_medium: Color::White,
            bar_high: Color::White,
            bar_bg: Color::DarkGray,
            core_label: Color::White,
            temp_sensor: Color::White,
            temp_fallback: Color::DarkGray,

            info_label: Color::White,
            info_value: Color::White,
            stale_fg: Color::Black,
            stale_bg: Color::White,

            border: Color::White,
            title: Color::White,

            footer_key_fg: Color::Black,
            footer_key_bg: Color::White,
            footer_label_fg: Color::White,
            footer_label_bg: Color::Reset,

            popup_border: Color::White,
            popup_bg: Color::Black,
            popup_title: Color::White,
            popup_text: Color::White,
        }
    }

    fn light_terminal() -> Self {
        Self {
            bar_low: Color::Green,
            bar_medium: Color::Indexed(130), // dark orange, readable on white
            bar_high: Color::Red,
            bar_bg: Color::Gray,
            core_label: Color::Black,
            temp_sensor: Color::Blue,
            temp_fallback: Color::Gray,

            info_label: Color::Black,
            info_value: Color::Blue,
            stale_fg: Color::White,
            stale_bg: Color::Red,

            border: Color::Gray,
            title: Color::Blue,

            footer_key_fg: Color::White,
            footer_key_bg: Color::Blue,
            footer_label_fg: Color::Black,
            footer_label_bg: Color::Indexed(253),

            popup_border: Color::Blue,
            popup_bg: Color::White,
            popup_title: Color::Blue,
            popup_text: Color::Black,
        }
    }

    fn dark_vivid() -> Self {
        Self {
            bar_low: Color::LightGreen,
            bar_medium: Color::LightYellow,
            bar_high: Color::LightRed,
            bar_bg: Color::Indexed(238),
            core_label: Color::LightCyan,
            temp_sensor: Color::LightMagenta,
            temp_fallback: Color::Indexed(244),

            info_label: Color::LightCyan,
            info_value: Color::LightGreen,
            stale_fg: Color::Black,
            stale_bg: Color::LightRed,

            border: Color::Indexed(240),
            title: Color::LightMagenta,

            footer_key_fg: Color::Black,
            footer_key_bg: Color::LightMagenta,
            footer_label_fg: Color::White,
            footer_label_bg: Color::Indexed(235),

            popup_border: Color::LightMagenta,
            popup_bg: Color::Indexed(234),
            popup_title: Color::LightYellow,
            popup_text: Color::White,
        }
    }

    /// Bar color for a utilization percentage
    pub fn usage_color(&self, percent: f32) -> Color {
        if percent > 75.0 {
            self.bar_high
        } else if percent > 25.0 {
            self.bar_medium
        } else {
            self.bar_low
        }
    }

    pub fn footer_key_style(&self) -> Style {
        Style::default()
            .fg(self.footer_key_fg)
            .bg(self.footer_key_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn footer_label_style(&self) -> Style {
        Style::default().fg(self.footer_label_fg).bg(self.footer_label_bg)
    }

    pub fn stale_style(&self) -> Style {
        Style::default()
            .fg(self.stale_fg)
            .bg(self.stale_bg)
            .add_modifier(Modifier::BOLD)
    }
}
