//! Light and dark palettes plus the semantic styles every screen paints
//! with. The active palette is process-wide so `t` can flip it between
//! frames.

use std::sync::atomic::{AtomicBool, Ordering};

use lumen_config::Theme;
use lumen_core::Rgb;
use lumen_core::view::Tone;
use ratatui::style::{Color, Modifier, Style};

/// Colors for one theme.
#[derive(Debug)]
pub struct Palette {
    pub accent: Color,
    pub highlight: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub bg: Color,
    pub bg_highlight: Color,
    pub good: Color,
    pub bad: Color,
    pub pending: Color,
}

// ── Palettes ──────────────────────────────────────────────────────────

pub const DARK: Palette = Palette {
    accent: Color::Rgb(255, 184, 108), // #ffb86c
    highlight: Color::Rgb(139, 233, 253), // #8be9fd
    text: Color::Rgb(189, 193, 207), // #bdc1cf
    muted: Color::Rgb(98, 114, 164), // #6272a4
    border: Color::Rgb(68, 71, 90), // #44475a
    bg: Color::Rgb(30, 31, 41), // #1e1f29
    bg_highlight: Color::Rgb(40, 42, 54), // #282a36
    good: Color::Rgb(80, 250, 123), // #50fa7b
    bad: Color::Rgb(255, 99, 99), // #ff6363
    pending: Color::Rgb(241, 250, 140), // #f1fa8c
};

pub const LIGHT: Palette = Palette {
    accent: Color::Rgb(196, 98, 0), // #c46200
    highlight: Color::Rgb(0, 112, 153), // #007099
    text: Color::Rgb(40, 42, 54), // #282a36
    muted: Color::Rgb(110, 115, 130), // #6e7382
    border: Color::Rgb(190, 193, 204), // #bec1cc
    bg: Color::Rgb(250, 250, 247), // #fafaf7
    bg_highlight: Color::Rgb(232, 233, 228), // #e8e9e4
    good: Color::Rgb(26, 138, 61), // #1a8a3d
    bad: Color::Rgb(200, 40, 40), // #c82828
    pending: Color::Rgb(168, 122, 0), // #a87a00
};

static DARK_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_theme(theme: Theme) {
    DARK_ACTIVE.store(theme == Theme::Dark, Ordering::Relaxed);
}

pub fn current() -> Theme {
    if DARK_ACTIVE.load(Ordering::Relaxed) {
        Theme::Dark
    } else {
        Theme::Light
    }
}

pub fn palette_for(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}

pub fn palette() -> &'static Palette {
    palette_for(current())
}

// ── Color helpers ─────────────────────────────────────────────────────

pub fn tone_color(tone: Tone) -> Color {
    let p = palette();
    match tone {
        Tone::Good => p.good,
        Tone::Bad => p.bad,
        Tone::Pending => p.pending,
    }
}

/// A light's own color, used for swatches and tile backgrounds.
pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Black or white, whichever reads better on `color`.
pub fn contrast_text(color: Rgb) -> Color {
    let luma = 299 * u32::from(color.r) + 587 * u32::from(color.g) + 114 * u32::from(color.b);
    if luma > 128_000 {
        Color::Black
    } else {
        Color::White
    }
}

// ── Semantic styles ───────────────────────────────────────────────────

/// Base style for the whole frame.
pub fn base() -> Style {
    let p = palette();
    Style::default().fg(p.text).bg(p.bg)
}

pub fn title_style() -> Style {
    Style::default()
        .fg(palette().highlight)
        .add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(palette().accent)
}

pub fn border_default() -> Style {
    Style::default().fg(palette().border)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(palette().highlight)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(palette().text)
}

pub fn table_selected() -> Style {
    let p = palette();
    Style::default()
        .fg(p.accent)
        .bg(p.bg_highlight)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(palette().accent)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(palette().text)
}

pub fn key_hint() -> Style {
    Style::default().fg(palette().muted)
}

pub fn key_hint_key() -> Style {
    Style::default()
        .fg(palette().highlight)
        .add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(palette().muted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_differ_where_it_matters() {
        assert_ne!(palette_for(Theme::Light).bg, palette_for(Theme::Dark).bg);
        assert_ne!(palette_for(Theme::Light).text, palette_for(Theme::Dark).text);
    }

    #[test]
    fn contrast_text_flips_on_bright_colors() {
        assert_eq!(contrast_text(Rgb::new(255, 255, 200)), Color::Black);
        assert_eq!(contrast_text(Rgb::new(20, 0, 60)), Color::White);
    }
}
