//! Positions screen: edit which screen slot each light mirrors, then save
//! the whole mapping.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};

use lumen_core::view::{PositionBoard, position_board};
use lumen_core::{Loadable, Position, PositionMap};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;

pub struct PositionsScreen {
    /// Local working copy; edits stay here until saved.
    draft: Loadable<PositionMap>,
    dirty: bool,
    selected: usize,
}

impl PositionsScreen {
    pub fn new() -> Self {
        Self {
            draft: Loadable::Loading,
            dirty: false,
            selected: 0,
        }
    }

    fn selected_name(&self) -> Option<String> {
        self.draft
            .ready()
            .and_then(|map| map.lights.get(self.selected))
            .map(|l| l.name.clone())
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.draft.ready().map_or(0, |m| m.lights.len());
        if len > 0 {
            self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
        }
    }

    /// Apply an edit to the selected light. Errors become a toast.
    fn edit<F>(&mut self, f: F) -> Option<Action>
    where
        F: FnOnce(&mut PositionMap, &str) -> Result<(), lumen_core::CoreError>,
    {
        let name = self.selected_name()?;
        let Loadable::Ready(map) = &mut self.draft else {
            return None;
        };
        match f(map, &name) {
            Ok(()) => {
                self.dirty = true;
                None
            }
            Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
        }
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, board: &PositionBoard) {
        let title = if self.dirty {
            " Lights ● unsaved "
        } else {
            " Lights "
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let header = Row::new(["", "Light", "Position", "Label"]).style(theme::table_header());
        let rows = board.cards.iter().map(|card| {
            let check = if card.enabled { "[x]" } else { "[ ]" };
            let style = if card.enabled {
                theme::table_row()
            } else {
                theme::muted()
            };
            Row::new([
                Cell::from(check),
                Cell::from(card.name.clone()),
                Cell::from(card.position.to_string()),
                Cell::from(card.label.clone()),
            ])
            .style(style)
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Percentage(40),
                Constraint::Length(13),
                Constraint::Min(8),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme::table_selected());

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_outline(frame: &mut Frame, area: Rect, board: &PositionBoard) {
        let block = Block::default()
            .title(" Monitor Slots ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let count = |position: Position| {
            board
                .slot_counts
                .iter()
                .find(|s| s.position == position)
                .map_or(0, |s| s.count)
        };
        let cell = |position: Position| {
            let n = count(position);
            let style = if n > 0 {
                Style::default()
                    .fg(theme::palette().accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::muted()
            };
            Span::styled(format!("{:^14}", format!("{position} {n}")), style)
        };

        let lines = vec![
            Line::from(vec![
                cell(Position::TopLeft),
                cell(Position::Top),
                cell(Position::TopRight),
            ]),
            Line::from(""),
            Line::from(vec![
                cell(Position::Left),
                Span::raw(format!("{:14}", "")),
                cell(Position::Right),
            ]),
            Line::from(""),
            Line::from(vec![
                cell(Position::BottomLeft),
                cell(Position::Bottom),
                cell(Position::BottomRight),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_specials(frame: &mut Frame, area: Rect, board: &PositionBoard) {
        let block = Block::default()
            .title(" Special Slots ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let mut lines = Vec::new();
        for card in &board.specials {
            lines.push(Line::from(vec![
                Span::styled(format!(" {}", card.label), theme::table_row().add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", card.description), theme::muted()),
            ]));
            let lights = if card.lights.is_empty() {
                "no lights".to_owned()
            } else {
                card.lights.join(", ")
            };
            lines.push(Line::from(Span::styled(format!("   {lights}"), theme::table_row())));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Component for PositionsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char(' ') => self.edit(|map, name| map.toggle(name).map(|_| ())),
            KeyCode::Right | KeyCode::Char('l') => {
                self.edit(|map, name| map.cycle(name, true).map(|_| ()))
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.edit(|map, name| map.cycle(name, false).map(|_| ()))
            }
            KeyCode::Char('w') => match &self.draft {
                Loadable::Ready(map) => Some(Action::SavePositions(map.clone())),
                _ => Some(Action::Notify(Notification::error("Positions not loaded"))),
            },
            KeyCode::Char('R') => Some(Action::ShowConfirm(ConfirmAction::ResetPositions)),
            KeyCode::Char('r') => Some(Action::ReloadPositions),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::PositionsUpdated(view) = action {
            match view {
                Loadable::Ready(map) => {
                    self.draft = Loadable::Ready(map.as_ref().clone());
                    self.dirty = false;
                    self.move_selection(0);
                }
                // A failed reload keeps whatever is already on screen
                Loadable::Error(message) if self.draft.ready().is_none() => {
                    self.draft = Loadable::Error(message.clone());
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let map = match &self.draft {
            Loadable::Ready(map) => map,
            Loadable::Loading => {
                frame.render_widget(
                    Paragraph::new(" Loading positions...").style(theme::muted()),
                    area,
                );
                return;
            }
            Loadable::Error(message) => {
                frame.render_widget(
                    Paragraph::new(format!(" {message}  (r to retry)"))
                        .style(Style::default().fg(theme::palette().bad)),
                    area,
                );
                return;
            }
        };

        let board = position_board(map);
        let [cards_area, side] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(area);
        let [outline_area, specials_area] =
            Layout::vertical([Constraint::Length(7), Constraint::Min(0)]).areas(side);

        self.render_cards(frame, cards_area, &board);
        Self::render_outline(frame, outline_area, &board);
        Self::render_specials(frame, specials_area, &board);
    }

    fn hints(&self) -> &'static str {
        "Space toggle  h/l cycle  w save  r reload  R reset"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use lumen_core::{LightAssignment, PositionSlot};
    use std::sync::Arc;

    fn press(screen: &mut PositionsScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .ok()
            .flatten()
    }

    fn loaded() -> PositionsScreen {
        let slot = |id, label: &str| PositionSlot {
            id,
            label: label.into(),
            description: String::new(),
        };
        let map = PositionMap {
            lights: vec![
                LightAssignment::new("Strip", true, Position::Left),
                LightAssignment::new("Lamp", false, Position::None),
            ],
            slots: vec![
                slot(Position::None, "None"),
                slot(Position::Left, "Left"),
                slot(Position::Right, "Right"),
            ],
        };
        let mut screen = PositionsScreen::new();
        screen
            .update(&Action::PositionsUpdated(Loadable::Ready(Arc::new(map))))
            .ok();
        screen
    }

    #[test]
    fn edits_stay_local_until_saved() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Char(' '));
        press(&mut screen, KeyCode::Right);
        assert!(screen.dirty);

        let Some(Action::SavePositions(map)) = press(&mut screen, KeyCode::Char('w')) else {
            panic!("expected save");
        };
        let lamp = map.light("Lamp").cloned();
        assert_eq!(
            lamp.map(|l| (l.enabled, l.position)),
            Some((true, Position::Left))
        );
    }

    #[test]
    fn cycling_wraps_in_catalogue_order() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Left);
        press(&mut screen, KeyCode::Left);
        let position = screen
            .draft
            .ready()
            .and_then(|m| m.light("Strip"))
            .map(|l| l.position);
        assert_eq!(position, Some(Position::Right));
    }

    #[test]
    fn reset_asks_first() {
        let mut screen = loaded();
        assert!(matches!(
            press(&mut screen, KeyCode::Char('R')),
            Some(Action::ShowConfirm(ConfirmAction::ResetPositions))
        ));
    }

    #[test]
    fn failed_reload_keeps_the_draft() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char(' '));
        screen
            .update(&Action::PositionsUpdated(Loadable::Error("timeout".into())))
            .ok();
        assert!(screen.draft.ready().is_some());
        assert!(screen.dirty);
    }
}
