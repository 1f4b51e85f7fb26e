use ratatui::style::Color;

/// Palette for one UI mode. The active palette follows the persisted
/// dark-mode flag.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub user: Color,
    pub model: Color,
    pub error: Color,
    pub border: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(31, 41, 55),
            text: Color::Rgb(229, 231, 235),
            dim: Color::Rgb(156, 163, 175),
            accent: Color::Rgb(187, 134, 252),
            user: Color::Rgb(129, 140, 248),
            model: Color::Rgb(156, 163, 175),
            error: Color::Rgb(252, 165, 165),
            border: Color::Rgb(75, 85, 99),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(255, 255, 255),
            text: Color::Rgb(31, 41, 55),
            dim: Color::Rgb(107, 114, 128),
            accent: Color::Rgb(17, 24, 39),
            user: Color::Rgb(79, 70, 229),
            model: Color::Rgb(100, 116, 139),
            error: Color::Rgb(185, 28, 28),
            border: Color::Rgb(209, 213, 219),
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode { Self::dark() } else { Self::light() }
    }
}
