//! Lights screen: bridge status and one tile per light.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use lumen_core::store::{BridgeView, LightsView};
use lumen_core::view::{LightTile, LightsPanel, bridge_line, lights_panel};
use lumen_core::{LightState, Loadable, PositionMap};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const TILE_WIDTH: u16 = 24;
const TILE_HEIGHT: u16 = 6;

pub struct LightsScreen {
    lights: LightsView,
    bridge: BridgeView,
    positions: Option<Arc<PositionMap>>,
    updated_at: Option<DateTime<Utc>>,
    /// First visible tile row.
    scroll: usize,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl LightsScreen {
    pub fn new() -> Self {
        Self {
            lights: Loadable::Loading,
            bridge: Loadable::Loading,
            positions: None,
            updated_at: None,
            scroll: 0,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn panel(&self) -> LightsPanel {
        lights_panel(&self.lights, self.positions.as_deref())
    }

    fn render_bridge(&self, frame: &mut Frame, area: Rect) {
        let line = bridge_line(&self.bridge);
        let mut spans = vec![
            Span::styled(" ● ", Style::default().fg(theme::tone_color(line.tone))),
            Span::styled(line.text, theme::table_row()),
        ];
        if let Loadable::Ready(lumen_core::BridgeState::Disconnected {
            reason: Some(reason),
        }) = &self.bridge
        {
            spans.push(Span::styled(format!("  {reason}"), theme::muted()));
        }
        let block = Block::default()
            .title(" Bridge ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_tiles(&self, frame: &mut Frame, area: Rect) {
        let panel = self.panel();
        let count = match &panel {
            LightsPanel::Tiles(tiles) => format!(" ({})", tiles.len()),
            _ => String::new(),
        };
        let block = Block::default()
            .title(format!(" Lights{count} "))
            .title_style(theme::title_style())
            .title_bottom(Line::from(Span::styled(
                format!(" {} ", age_label(self.updated_at, Utc::now())),
                theme::muted(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match panel {
            LightsPanel::Loading => {
                let throbber = throbber_widgets_tui::Throbber::default()
                    .label(" Loading lights...")
                    .style(theme::table_row())
                    .throbber_style(Style::default().fg(theme::palette().accent));
                frame.render_stateful_widget(throbber, inner, &mut self.throbber_state.clone());
            }
            LightsPanel::Empty => {
                frame.render_widget(
                    Paragraph::new(" No lights found").style(theme::muted()),
                    inner,
                );
            }
            LightsPanel::Error(message) => {
                frame.render_widget(
                    Paragraph::new(format!(" {message}"))
                        .style(Style::default().fg(theme::palette().bad)),
                    inner,
                );
            }
            LightsPanel::Tiles(tiles) => self.render_grid(frame, inner, &tiles),
        }
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect, tiles: &[LightTile]) {
        let cols = columns_for(area.width);
        let visible_rows = usize::from((area.height / TILE_HEIGHT).max(1));
        let rows: Vec<&[LightTile]> = tiles.chunks(cols).collect();
        let start = self.scroll.min(rows.len().saturating_sub(1));

        let row_areas = Layout::vertical(
            std::iter::repeat_n(Constraint::Length(TILE_HEIGHT), visible_rows)
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(area);

        for (row, row_area) in rows.iter().skip(start).zip(row_areas.iter()) {
            let cells = Layout::horizontal(std::iter::repeat_n(
                Constraint::Ratio(1, u32::try_from(cols).unwrap_or(1)),
                cols,
            ))
            .split(*row_area);
            for (tile, cell) in row.iter().zip(cells.iter()) {
                render_tile(frame, *cell, tile);
            }
        }
    }
}

fn render_tile(frame: &mut Frame, area: Rect, tile: &LightTile) {
    let p = theme::palette();
    let (state_color, border) = match tile.state {
        LightState::On => (p.good, Style::default().fg(theme::rgb(tile.color))),
        LightState::Off => (p.muted, theme::border_default()),
        LightState::Unreachable => (p.bad, Style::default().fg(p.bad)),
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", tile.name),
            theme::table_row().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);

    let position = tile
        .position
        .map_or_else(|| "-".to_owned(), |pos| pos.to_string());
    let lines = vec![
        Line::from(vec![
            Span::styled("  ", Style::default().bg(theme::rgb(tile.color))),
            Span::raw(" "),
            Span::styled(tile.state.to_string(), Style::default().fg(state_color)),
        ]),
        Line::from(vec![
            Span::styled(format!("{}%", tile.brightness_percent), theme::table_row()),
            Span::styled(format!("  {}", tile.hex), theme::muted()),
        ]),
        Line::from(Span::styled(position, theme::muted())),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn columns_for(width: u16) -> usize {
    usize::from((width / TILE_WIDTH).max(1))
}

/// "updated 1m 15s ago", or "waiting for data" before the first poll.
fn age_label(stamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(stamp) = stamp else {
        return "waiting for data".into();
    };
    let secs = u64::try_from((now - stamp).num_seconds()).unwrap_or(0);
    format!(
        "updated {} ago",
        humantime::format_duration(Duration::from_secs(secs))
    )
}

impl Component for LightsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('r') => return Ok(Some(Action::RefreshLights)),
            KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LightsUpdated(view) => {
                if matches!(view, Loadable::Ready(_)) {
                    self.updated_at = Some(Utc::now());
                }
                self.lights = view.clone();
            }
            Action::BridgeUpdated(view) => self.bridge = view.clone(),
            Action::PositionsUpdated(view) => {
                if let Loadable::Ready(map) = view {
                    self.positions = Some(Arc::clone(map));
                }
            }
            Action::Tick => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [bridge_area, tiles_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
        self.render_bridge(frame, bridge_area);
        self.render_tiles(frame, tiles_area);
    }

    fn hints(&self) -> &'static str {
        "r refresh  j/k scroll"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Light, Rgb};
    use pretty_assertions::assert_eq;

    #[test]
    fn age_label_uses_humantime() {
        let now = Utc::now();
        assert_eq!(
            age_label(Some(now - chrono::Duration::seconds(75)), now),
            "updated 1m 15s ago"
        );
        assert_eq!(age_label(None, now), "waiting for data");
    }

    #[test]
    fn narrow_terminals_still_get_one_column() {
        assert_eq!(columns_for(10), 1);
        assert_eq!(columns_for(100), 4);
    }

    #[test]
    fn failed_refresh_keeps_error_and_ready_stamps_time() {
        let mut screen = LightsScreen::new();
        screen
            .update(&Action::LightsUpdated(Loadable::Error("timeout".into())))
            .ok();
        assert_eq!(screen.panel(), LightsPanel::Error("timeout".into()));
        assert!(screen.updated_at.is_none());

        let lights = vec![Light {
            name: "Desk".into(),
            on: true,
            reachable: true,
            color: Rgb::new(255, 0, 0),
            brightness: 254,
        }];
        screen
            .update(&Action::LightsUpdated(Loadable::Ready(Arc::new(lights))))
            .ok();
        assert!(screen.updated_at.is_some());
        assert!(matches!(screen.panel(), LightsPanel::Tiles(t) if t.len() == 1));
    }
}
