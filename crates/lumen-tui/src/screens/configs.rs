//! Configurations screen: pick a saved preset, set transition and
//! duration, apply.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use lumen_core::{Configuration, Loadable};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// Which part of the form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    List,
    Transition,
    Duration,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Self::List => Self::Transition,
            Self::Transition => Self::Duration,
            Self::Duration => Self::List,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::List => Self::Duration,
            Self::Transition => Self::List,
            Self::Duration => Self::Transition,
        }
    }
}

pub struct ConfigsScreen {
    configs: Loadable<Vec<Configuration>>,
    selected: usize,
    focus: Field,
    /// Seconds; raw text, validated on apply.
    transition: String,
    /// Minutes; empty means "until changed".
    duration: String,
}

impl ConfigsScreen {
    pub fn new() -> Self {
        Self {
            configs: Loadable::Loading,
            selected: 0,
            focus: Field::List,
            transition: String::new(),
            duration: String::new(),
        }
    }

    fn selected_config(&self) -> Option<&Configuration> {
        self.configs.ready().and_then(|list| list.get(self.selected))
    }

    fn select(&mut self, delta: isize) {
        let len = self.configs.ready().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// The selected name (empty when nothing is selected) plus the raw
    /// form text. Validation happens before anything reaches the bridge.
    fn apply_action(&self) -> Action {
        Action::ApplyConfiguration {
            name: self
                .selected_config()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            transition: self.transition.clone(),
            duration: self.duration.clone(),
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::List => None,
            Field::Transition => Some(&mut self.transition),
            Field::Duration => Some(&mut self.duration),
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Configurations ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focus == Field::List {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        match &self.configs {
            Loadable::Loading => {
                frame.render_widget(
                    Paragraph::new(" Loading...").style(theme::muted()).block(block),
                    area,
                );
            }
            Loadable::Error(message) => {
                frame.render_widget(
                    Paragraph::new(format!(" {message}"))
                        .style(Style::default().fg(theme::palette().bad))
                        .wrap(Wrap { trim: true })
                        .block(block),
                    area,
                );
            }
            Loadable::Ready(list) if list.is_empty() => {
                frame.render_widget(
                    Paragraph::new(" No configurations saved")
                        .style(theme::muted())
                        .block(block),
                    area,
                );
            }
            Loadable::Ready(list) => {
                let items: Vec<ListItem> = list
                    .iter()
                    .map(|c| ListItem::new(format!(" {}", c.name)).style(theme::table_row()))
                    .collect();
                let widget = List::new(items)
                    .block(block)
                    .highlight_style(theme::table_selected())
                    .highlight_symbol("▸");
                let mut state = ListState::default().with_selected(Some(self.selected));
                frame.render_stateful_widget(widget, area, &mut state);
            }
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Apply ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focus == Field::List {
                theme::border_default()
            } else {
                theme::border_focused()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [desc_area, fields_area, hint_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .areas(inner);

        let description = self
            .selected_config()
            .map(|c| {
                if c.description.trim().is_empty() {
                    "(no description)".to_owned()
                } else {
                    c.short_description().to_owned()
                }
            })
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(description)
                .style(theme::table_row())
                .wrap(Wrap { trim: true }),
            desc_area,
        );

        let fields = vec![
            field_line("Transition (s)", &self.transition, "0", self.focus == Field::Transition),
            Line::from(""),
            field_line("Duration (min)", &self.duration, "until changed", self.focus == Field::Duration),
        ];
        frame.render_widget(Paragraph::new(fields), fields_area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Enter ", theme::key_hint_key()),
                Span::styled("apply  ", theme::key_hint()),
                Span::styled("Tab ", theme::key_hint_key()),
                Span::styled("next field  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("back to list", theme::key_hint()),
            ])),
            hint_area,
        );
    }
}

fn field_line<'a>(label: &'a str, value: &'a str, placeholder: &'a str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        theme::tab_active()
    } else {
        theme::table_row()
    };
    let value_span = if value.is_empty() && !focused {
        Span::styled(placeholder, theme::muted())
    } else if focused {
        Span::styled(format!("{value}▏"), theme::table_selected())
    } else {
        Span::styled(value, theme::table_row())
    };
    Line::from(vec![
        Span::styled(format!(" {label:<16}"), label_style),
        value_span,
    ])
}

impl Component for ConfigsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Enter {
            return Ok(Some(self.apply_action()));
        }
        match (self.focus, key.code) {
            (Field::List, KeyCode::Char('e')) => self.focus = Field::Transition,
            (_, KeyCode::Tab) => self.focus = self.focus.next(),
            (_, KeyCode::BackTab) => self.focus = self.focus.prev(),
            (Field::List, KeyCode::Char('j') | KeyCode::Down) => self.select(1),
            (Field::List, KeyCode::Char('k') | KeyCode::Up) => self.select(-1),
            (Field::List, KeyCode::Char('r')) => return Ok(Some(Action::LoadConfigurations)),
            (_, KeyCode::Esc) => self.focus = Field::List,
            (_, KeyCode::Backspace) => {
                if let Some(field) = self.field_mut() {
                    field.pop();
                }
            }
            (_, KeyCode::Char(c)) if !c.is_control() => {
                if let Some(field) = self.field_mut() {
                    field.push(c);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ConfigurationsLoaded(list) => {
                let keep = self.selected_config().map(|c| c.name.clone());
                self.selected = keep
                    .and_then(|name| list.iter().position(|c| c.name == name))
                    .unwrap_or(0);
                self.configs = Loadable::Ready(list.clone());
            }
            Action::ConfigurationsFailed(message) => {
                self.configs = Loadable::Error(message.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [list_area, form_area] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .areas(area);
        self.render_list(frame, list_area);
        self.render_form(frame, form_area);
    }

    fn captures_input(&self) -> bool {
        self.focus != Field::List
    }

    fn hints(&self) -> &'static str {
        "j/k select  e edit  Enter apply  r reload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded() -> ConfigsScreen {
        let mut screen = ConfigsScreen::new();
        let list = vec![
            Configuration {
                name: "Evening".into(),
                description: "Warm".into(),
            },
            Configuration {
                name: "Focus".into(),
                description: String::new(),
            },
        ];
        screen.update(&Action::ConfigurationsLoaded(list)).ok();
        screen
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('j'))).ok();
        screen.handle_key_event(key(KeyCode::Char('e'))).ok();
        assert!(screen.captures_input());
        for c in ['1', '2'] {
            screen.handle_key_event(key(KeyCode::Char(c))).ok();
        }
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Char('5'))).ok();

        let action = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        match action {
            Some(Action::ApplyConfiguration {
                name,
                transition,
                duration,
            }) => {
                assert_eq!(name, "Focus");
                assert_eq!(transition, "12");
                assert_eq!(duration, "5");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_loaded_applies_with_empty_name() {
        let screen = ConfigsScreen::new();
        assert!(matches!(
            screen.apply_action(),
            Action::ApplyConfiguration { ref name, .. } if name.is_empty()
        ));
    }

    #[test]
    fn reload_keeps_selection_by_name() {
        let mut screen = loaded();
        screen.select(1);
        let reordered = vec![Configuration {
            name: "Focus".into(),
            description: String::new(),
        }];
        screen.update(&Action::ConfigurationsLoaded(reordered)).ok();
        assert_eq!(screen.selected, 0);
        assert_eq!(screen.selected_config().map(|c| c.name.as_str()), Some("Focus"));
    }
}
