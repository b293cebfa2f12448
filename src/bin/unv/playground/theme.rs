//! Playground styles
//!
//! Concrete styles live in [`Theme`]'s fields; the UI asks for them through methods
//! named after where they are used, so panes that should look alike share a field.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    active: Style,
    normal: Style,
    muted: Style,
    error: Style,
    bar: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            normal: Style::default(),
            muted: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            bar: Style::default().fg(Color::Black).bg(Color::Cyan),
        }
    }
}

impl Theme {
    pub fn title_bar(&self) -> Style {
        self.bar
    }

    pub fn status_line(&self) -> Style {
        self.bar
    }

    pub fn editor_border(&self) -> Style {
        self.active
    }

    pub fn output_border(&self) -> Style {
        self.muted
    }

    pub fn line_number(&self) -> Style {
        self.muted
    }

    pub fn source_text(&self) -> Style {
        self.normal
    }

    pub fn log_entry(&self) -> Style {
        self.normal
    }

    pub fn log_error(&self) -> Style {
        self.error
    }

    pub fn error_message(&self) -> Style {
        self.error
    }
}
