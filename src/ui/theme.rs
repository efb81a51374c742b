use crate::parcel::ParcelStatus;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub registered: Style,
    pub sent: Style,
    pub delivered: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            registered: Style::new().blue(),
            sent: Style::new().yellow(),
            delivered: Style::new().green(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            registered: Style::new(),
            sent: Style::new(),
            delivered: Style::new(),
        }
    }

    pub fn status(&self, status: ParcelStatus) -> Style {
        match status {
            ParcelStatus::Registered => self.registered.clone(),
            ParcelStatus::Sent => self.sent.clone(),
            ParcelStatus::Delivered => self.delivered.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
