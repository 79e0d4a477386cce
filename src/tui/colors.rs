//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Tag;

// One color per category toggle, so a row's tags read at a glance.

pub const PINNED: Color = Color::Rgb(255, 215, 0);
pub const HEALTH: Color = Color::Rgb(0, 160, 80);
pub const PROJECT: Color = Color::Rgb(70, 130, 230);
pub const LIFE: Color = Color::Rgb(220, 110, 170);
pub const MAINTENANCE: Color = Color::Rgb(200, 120, 40);
pub const ENTERTAINMENT: Color = Color::Rgb(150, 90, 210);
/// Status bar background.
pub const BAR: Color = Color::Rgb(0, 80, 0);

/// Color of a lit tag toggle.
pub fn tag_color(tag: Tag) -> Color {
    match tag {
        Tag::Done => Color::DarkGray,
        Tag::Pinned => PINNED,
        Tag::Health => HEALTH,
        Tag::Project => PROJECT,
        Tag::Life => LIFE,
        Tag::Maintenance => MAINTENANCE,
        Tag::Entertainment => ENTERTAINMENT,
    }
}
