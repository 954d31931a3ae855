use ratatui::style::Color;

/// Palette for the two supported color schemes.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub dim: Color,
    pub error: Color,
    pub ok: Color,
    pub code: Color,
}

impl Theme {
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: Color::Yellow,
            text: Color::White,
            dim: Color::DarkGray,
            error: Color::Red,
            ok: Color::Green,
            code: Color::Cyan,
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            text: Color::Black,
            dim: Color::Gray,
            error: Color::Red,
            ok: Color::Green,
            code: Color::Magenta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_dark() {
        assert_eq!(Theme::named("solarized").accent, Theme::dark().accent);
        assert_eq!(Theme::named("light").accent, Theme::light().accent);
    }
}
