//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lumen_core::store::BridgeView;
use lumen_core::view::{Tone, bridge_line};
use lumen_core::{ApplyRequest, ChannelState, Command, Controller, Loadable, RefreshOutcome};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    controller: Controller,
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    /// Mirror socket state for the status bar.
    channel: ChannelState,
    bridge: BridgeView,
    help_visible: bool,
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            active_screen: ScreenId::default(),
            screens: create_screens().into_iter().collect(),
            running: true,
            channel: ChannelState::TornDown,
            bridge: Loadable::Loading,
            help_visible: false,
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        let cancel = self.data_cancel.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        self.controller.disconnect().await;
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };
        if screen.captures_input() {
            return screen.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') => Ok(Some(Action::Quit)),
            KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
            KeyCode::Char('t') => Ok(Some(Action::ToggleTheme)),
            KeyCode::Char(c @ '1'..='4') => Ok(c
                .to_digit(10)
                .and_then(|n| u8::try_from(n).ok())
                .and_then(ScreenId::from_number)
                .map(Action::SwitchScreen)),
            KeyCode::Tab => Ok(Some(Action::SwitchScreen(self.active_screen.next()))),
            KeyCode::BackTab => Ok(Some(Action::SwitchScreen(self.active_screen.prev()))),
            _ => screen.handle_key_event(key),
        }
    }

    // ── Actions ───────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > TOAST_TTL)
                {
                    self.notification = None;
                }
                self.forward_to_active(action)?;
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    self.active_screen = *target;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::ToggleTheme => {
                let next = theme::current().toggle();
                theme::set_theme(next);
                let note = match lumen_config::save_theme(next) {
                    Ok(()) => Notification::info(format!("Theme: {next}")),
                    Err(e) => {
                        warn!(error = %e, "could not persist theme");
                        Notification::error(format!("Theme not saved: {e}"))
                    }
                };
                self.notify(note);
            }

            Action::ChannelStateChanged(state) => {
                if *state == ChannelState::ClosedTerminal && self.channel != *state {
                    self.notify(Notification::error("Mirror connection lost"));
                }
                self.channel = *state;
                self.broadcast(action)?;
            }

            Action::BridgeUpdated(view) => {
                self.bridge.clone_from(view);
                self.broadcast(action)?;
            }

            data if data.is_data() => self.broadcast(data)?,

            // ── Requests ──────────────────────────────────────────
            Action::RefreshLights => self.refresh_status(),
            Action::LoadConfigurations => self.load_configurations(),
            Action::ReloadPositions => self.reload_positions(),

            Action::ApplyConfiguration {
                name,
                transition,
                duration,
            } => match ApplyRequest::from_form(name, transition, duration) {
                Ok(request) => self.execute_command(Command::ApplyConfiguration(request)),
                Err(e) => self.notify(Notification::error(e.to_string())),
            },

            Action::StartMirror(request) => self.execute_command(Command::StartMirror(*request)),
            Action::StopMirror => self.execute_command(Command::StopMirror),
            Action::UpdateMirrorSettings(settings) => {
                self.execute_command(Command::UpdateMirrorSettings(*settings));
            }
            Action::SavePositions(map) => {
                self.execute_command(Command::SavePositions(map.clone()));
            }

            // ── Confirm dialog ────────────────────────────────────
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    match confirm {
                        ConfirmAction::ResetPositions => {
                            self.execute_command(Command::ResetPositions);
                        }
                    }
                }
            }
            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(note) => self.notify(note.clone()),

            other => self.forward_to_active(other)?,
        }
        Ok(())
    }

    fn notify(&mut self, note: Notification) {
        self.notification = Some((note, Instant::now()));
    }

    fn forward_to_active(&mut self, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen)
            && let Some(follow_up) = screen.update(action)?
        {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    /// Store updates reach every screen so switching never shows stale data.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Controller calls ──────────────────────────────────────────

    /// Spawn a command. Sends a Notify action on completion.
    fn execute_command(&self, cmd: Command) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let note = match controller.execute(cmd).await {
                Ok(result) => Notification::success(result.summary()),
                Err(e) => {
                    warn!(error = %e, "command execution failed");
                    Notification::error(e.to_string())
                }
            };
            let _ = tx.send(Action::Notify(note));
        });
    }

    fn refresh_status(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let (lights, bridge) = controller.poller().refresh_all().await;
            let note = match (lights, bridge) {
                (RefreshOutcome::Skipped, _) => Notification::info("Refresh already in progress"),
                (RefreshOutcome::Failed, _) | (_, RefreshOutcome::Failed) => {
                    Notification::error("Status refresh failed")
                }
                _ => Notification::success("Status refreshed"),
            };
            let _ = tx.send(Action::Notify(note));
        });
    }

    fn load_configurations(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match controller.configurations().await {
                Ok(list) => {
                    let _ = tx.send(Action::ConfigurationsLoaded(list));
                }
                Err(e) => {
                    warn!(error = %e, "failed to load configurations");
                    let _ = tx.send(Action::ConfigurationsFailed(e.to_string()));
                    let _ = tx.send(Action::Notify(Notification::error(format!(
                        "Configurations: {e}"
                    ))));
                }
            }
        });
    }

    /// The loaded map arrives through the positions subscription.
    fn reload_positions(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.load_positions().await {
                warn!(error = %e, "failed to load positions");
                let _ = tx.send(Action::Notify(Notification::error(format!("Positions: {e}"))));
            }
        });
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }
        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if let Some((ref note, _)) = self.notification {
            render_notification(frame, area, note);
        }
        if let Some(ref confirm) = self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    /// Socket state, bridge status and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let socket_color = theme::tone_color(channel_tone(self.channel));
        let bridge = bridge_line(&self.bridge);
        let hints = self
            .screens
            .get(&self.active_screen)
            .map_or("", |s| s.hints());

        let line = Line::from(vec![
            Span::styled(" ● ", Style::default().fg(socket_color)),
            Span::styled(self.channel.to_string(), Style::default().fg(socket_color)),
            Span::styled(" │ ", theme::key_hint()),
            Span::styled(
                bridge.text,
                Style::default().fg(theme::tone_color(bridge.tone)),
            ),
            Span::styled(format!(" │ {hints}  t theme  ? help  q quit"), theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Status-bar tone for the mirror socket.
fn channel_tone(state: ChannelState) -> Tone {
    match state {
        ChannelState::Open => Tone::Good,
        ChannelState::Connecting { .. } | ChannelState::ClosedRetrying { .. } => Tone::Pending,
        ChannelState::ClosedTerminal | ChannelState::TornDown => Tone::Bad,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, note: &Notification) {
    let p = theme::palette();
    let msg_len = u16::try_from(note.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 70).min(area.width);
    let height = 3u16;
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 2),
        width,
        height,
    );

    let (color, icon) = match note.level {
        NotificationLevel::Success => (p.good, "✓"),
        NotificationLevel::Error => (p.bad, "✗"),
        NotificationLevel::Info => (p.highlight, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(theme::base());
    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(note.message.as_str(), theme::table_row()),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), toast_area);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered(area, 50, 5);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::palette().pending))
        .style(theme::base());

    let text = vec![
        Line::from(Span::styled(format!("  {confirm}"), theme::table_row())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).block(block), dialog_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 60, 20);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(theme::base());

    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::palette().highlight),
        ))
    };
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k:<12}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let help_text = vec![
        section("Global"),
        key("1-4 / Tab", "Switch screen"),
        key("t", "Toggle light / dark theme"),
        key("?", "This help"),
        key("q / Ctrl+C", "Quit"),
        Line::from(""),
        section("Lights"),
        key("r", "Refresh now"),
        section("Configurations"),
        key("j/k  e", "Select, edit transition / duration"),
        key("Enter", "Apply"),
        section("Mirror"),
        key("s  x", "Start / stop"),
        key("j/k  h/l", "Pick slider, adjust (H/L x10)"),
        key("a", "Apply settings"),
        section("Positions"),
        key("Space  h/l", "Toggle, cycle position"),
        key("w  r  R", "Save, reload, reset"),
    ];
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}
