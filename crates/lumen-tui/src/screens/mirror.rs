//! Mirror screen: live status, color swatches, the monitor outline and
//! the tuning sliders.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, LineGauge, Paragraph},
};

use lumen_core::store::MirrorView;
use lumen_core::view::{ColorPreview, color_preview, mirror_line, monitor_regions};
use lumen_core::{
    ChannelState, Loadable, MirrorSettings, MirrorStartRequest, Position, PositionMap, Rgb,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

// ── Sliders ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slider {
    label: &'static str,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    decimals: usize,
}

impl Slider {
    const fn new(label: &'static str, value: f64, min: f64, max: f64, step: f64, decimals: usize) -> Self {
        Self {
            label,
            value,
            min,
            max,
            step,
            decimals,
        }
    }

    /// Move by `steps` increments, clamped to the range and snapped to
    /// the step grid.
    fn adjust(&mut self, steps: f64) {
        let raw = (self.value + steps * self.step).clamp(self.min, self.max);
        let snapped = ((raw - self.min) / self.step).round() * self.step + self.min;
        self.value = snapped.clamp(self.min, self.max);
    }

    fn set(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }

    fn ratio(&self) -> f64 {
        ((self.value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    fn display(&self) -> String {
        format!("{:.*}", self.decimals, self.value)
    }

    /// Integer sliders are clamped to non-negative ranges.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    fn as_u32(&self) -> u32 {
        self.value.round().max(0.0) as u32
    }
}

const FPS: usize = 0;
const BRIGHTNESS: usize = 1;
const SATURATION: usize = 2;
const SMOOTHING: usize = 3;
const TRANSITION: usize = 4;

fn default_sliders() -> [Slider; 5] {
    let start = MirrorStartRequest::default();
    [
        Slider::new("FPS", f64::from(start.fps), 1.0, 60.0, 1.0, 0),
        Slider::new("Brightness", f64::from(start.brightness), 0.0, 254.0, 1.0, 0),
        Slider::new("Saturation boost", 1.2, 0.5, 2.0, 0.1, 1),
        Slider::new("Smoothing factor", 0.5, 0.0, 1.0, 0.05, 2),
        Slider::new("Transition time", 1.0, 0.0, 10.0, 1.0, 0),
    ]
}

// ── Screen ──────────────────────────────────────────────────────────

pub struct MirrorScreen {
    mirror: MirrorView,
    positions: Option<Arc<PositionMap>>,
    channel: ChannelState,
    sliders: [Slider; 5],
    selected: usize,
    /// Set once the user moves a slider; live status no longer seeds them.
    touched: bool,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl MirrorScreen {
    pub fn new() -> Self {
        Self {
            mirror: None,
            positions: None,
            channel: ChannelState::TornDown,
            sliders: default_sliders(),
            selected: 0,
            touched: false,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn start_request(&self) -> MirrorStartRequest {
        MirrorStartRequest {
            fps: self.sliders[FPS].as_u32(),
            brightness: self.sliders[BRIGHTNESS].as_u32(),
        }
    }

    fn settings(&self) -> MirrorSettings {
        MirrorSettings {
            fps: Some(self.sliders[FPS].as_u32()),
            brightness: Some(self.sliders[BRIGHTNESS].as_u32()),
            saturation_boost: Some(self.sliders[SATURATION].value),
            smoothing_factor: Some(self.sliders[SMOOTHING].value),
            transition_time: Some(self.sliders[TRANSITION].value),
        }
    }

    fn adjust(&mut self, steps: f64) {
        if let Some(slider) = self.sliders.get_mut(self.selected) {
            slider.adjust(steps);
            self.touched = true;
        }
    }

    /// Seed fps and brightness from a running mirror until the user takes
    /// over.
    fn seed_from_status(&mut self) {
        if self.touched {
            return;
        }
        if let Some(snapshot) = self.mirror.as_deref().filter(|s| s.running) {
            self.sliders[FPS].set(f64::from(snapshot.fps));
            if let Some(brightness) = snapshot.brightness {
                self.sliders[BRIGHTNESS].set(f64::from(brightness));
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let snapshot = self.mirror.as_deref();
        let line = mirror_line(snapshot);
        let mut spans = vec![
            Span::styled(" ● ", Style::default().fg(theme::tone_color(line.tone))),
            Span::styled(line.text, theme::table_row()),
        ];
        if let Some(detail) = line.detail {
            spans.push(Span::styled(format!(" - {detail}"), theme::table_row()));
        }
        if let Some(brightness) = snapshot.and_then(|s| s.brightness) {
            spans.push(Span::styled(
                format!("   Brightness: {brightness}"),
                theme::muted(),
            ));
        }
        spans.push(Span::styled(format!("   socket: {}", self.channel), theme::muted()));

        let block = Block::default()
            .title(" Screen Mirror ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_swatches(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Live Colors ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match color_preview(self.mirror.as_deref()) {
            ColorPreview::Inactive => {
                frame.render_widget(Paragraph::new(" No live color data").style(theme::muted()), inner);
            }
            ColorPreview::Waiting => {
                let throbber = throbber_widgets_tui::Throbber::default()
                    .label(" Waiting for colors...")
                    .style(theme::table_row())
                    .throbber_style(Style::default().fg(theme::palette().accent));
                frame.render_stateful_widget(throbber, inner, &mut self.throbber_state.clone());
            }
            ColorPreview::Swatches(swatches) => {
                let lines: Vec<Line> = swatches
                    .iter()
                    .map(|s| {
                        Line::from(vec![
                            Span::raw(" "),
                            Span::styled("    ", Style::default().bg(theme::rgb(s.color))),
                            Span::styled(format!(" {:<20}", s.name), theme::table_row()),
                            Span::styled(s.hex.clone(), theme::muted()),
                        ])
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines), inner);
            }
        }
    }

    fn render_monitor(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Monitor ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let regions = monitor_regions(self.mirror.as_deref(), self.positions.as_deref());
        let [grid_area, ambient_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(inner);

        let rows = Layout::vertical([Constraint::Ratio(1, 3); 3]).split(grid_area);
        for (row_area, row) in rows.iter().zip(MONITOR_GRID) {
            let cells = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(*row_area);
            for (cell, position) in cells.iter().zip(row) {
                region_cell(frame, *cell, position, regions.get(&position).copied());
            }
        }
        region_cell(
            frame,
            ambient_area,
            Position::Ambient,
            regions.get(&Position::Ambient).copied(),
        );
    }

    fn render_sliders(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Settings ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Length(1); 5]).split(inner);
        let p = theme::palette();
        for (idx, (slider, row)) in self.sliders.iter().zip(rows.iter()).enumerate() {
            let focused = idx == self.selected;
            let label_style = if focused {
                theme::tab_active()
            } else {
                theme::table_row()
            };
            let gauge = LineGauge::default()
                .ratio(slider.ratio())
                .label(Line::from(vec![
                    Span::styled(if focused { "▸ " } else { "  " }, label_style),
                    Span::styled(format!("{:<17}{:>6} ", slider.label, slider.display()), label_style),
                ]))
                .filled_style(Style::default().fg(if focused { p.accent } else { p.highlight }))
                .unfilled_style(Style::default().fg(p.border));
            frame.render_widget(gauge, *row);
        }
    }
}

/// Directional slots laid out like the screen edges, center in the middle.
const MONITOR_GRID: [[Position; 3]; 3] = [
    [Position::TopLeft, Position::Top, Position::TopRight],
    [Position::Left, Position::Center, Position::Right],
    [Position::BottomLeft, Position::Bottom, Position::BottomRight],
];

fn region_cell(frame: &mut Frame, area: Rect, position: Position, color: Option<Rgb>) {
    let style = color.map_or_else(theme::muted, |c| {
        Style::default()
            .bg(theme::rgb(c))
            .fg(theme::contrast_text(c))
    });
    frame.render_widget(
        Paragraph::new(format!(" {position}"))
            .style(style)
            .centered(),
        area,
    );
}

impl Component for MirrorScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('s') => Some(Action::StartMirror(self.start_request())),
            KeyCode::Char('x') => Some(Action::StopMirror),
            KeyCode::Char('a') => Some(Action::UpdateMirrorSettings(self.settings())),
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = (self.selected + 1) % self.sliders.len();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = (self.selected + self.sliders.len() - 1) % self.sliders.len();
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.adjust(1.0);
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.adjust(-1.0);
                None
            }
            KeyCode::Char('L') => {
                self.adjust(10.0);
                None
            }
            KeyCode::Char('H') => {
                self.adjust(-10.0);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::MirrorUpdated(view) => {
                self.mirror.clone_from(view);
                self.seed_from_status();
            }
            Action::PositionsUpdated(Loadable::Ready(map)) => {
                self.positions = Some(Arc::clone(map));
            }
            Action::ChannelStateChanged(state) => self.channel = *state,
            Action::Tick => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [status_area, middle, sliders_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(7),
        ])
        .areas(area);
        let [swatch_area, monitor_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(middle);

        self.render_status(frame, status_area);
        self.render_swatches(frame, swatch_area);
        self.render_monitor(frame, monitor_area);
        self.render_sliders(frame, sliders_area);
    }

    fn hints(&self) -> &'static str {
        "s start  x stop  a apply  j/k select  h/l adjust"
    }
}
