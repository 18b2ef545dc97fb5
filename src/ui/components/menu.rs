use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::route::Route;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Go(Route),
    Logout,
    Quit,
}

pub struct MenuItem {
    pub key: char,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

/// Home screen menu. Entries depend on whether someone is signed in.
pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub greeting: Option<String>,
    pub theme: &'a Theme,
}

fn entry(
    key: char,
    label: impl Into<String>,
    description: impl Into<String>,
    action: MenuAction,
) -> MenuItem {
    MenuItem {
        key,
        label: label.into(),
        description: description.into(),
        action,
    }
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme, authenticated: bool) -> Self {
        let mut menu = Self {
            items: Vec::new(),
            selected: 0,
            greeting: None,
            theme,
        };
        menu.rebuild(authenticated);
        menu
    }

    /// Refill entries after login/logout or a locale change.
    pub fn rebuild(&mut self, authenticated: bool) {
        self.items = if authenticated {
            vec![
                entry('1', t!("menu.study"), t!("menu.study_desc"), MenuAction::Go(Route::Study)),
                entry('2', t!("menu.statistics"), t!("menu.statistics_desc"), MenuAction::Go(Route::Statistics)),
                entry('3', t!("menu.recommendations"), t!("menu.recommendations_desc"), MenuAction::Go(Route::Recommendations)),
                entry('4', t!("menu.profile"), t!("menu.profile_desc"), MenuAction::Go(Route::Profile)),
                entry('c', t!("menu.settings"), t!("menu.settings_desc"), MenuAction::Go(Route::Settings)),
                entry('o', t!("menu.logout"), t!("menu.logout_desc"), MenuAction::Logout),
            ]
        } else {
            vec![
                entry('l', t!("menu.login"), t!("menu.login_desc"), MenuAction::Go(Route::Login)),
                entry('c', t!("menu.settings"), t!("menu.settings_desc"), MenuAction::Go(Route::Settings)),
                entry('q', t!("menu.quit"), t!("menu.quit_desc"), MenuAction::Quit),
            ]
        };
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|i| i.action)
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items.iter().find(|i| i.key == key).map(|i| i.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let mut title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "나랏말싸미",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                t!("app.tagline").into_owned(),
                Style::default().fg(colors.fg()),
            )),
        ];
        if let Some(greeting) = &self.greeting {
            title_lines.push(Line::from(Span::styled(
                greeting.clone(),
                Style::default().fg(colors.highlight()),
            )));
        }

        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        title.render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{key}] {label}", key = item.key, label = item.label);
            let desc_text = format!("     {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    label_text,
                    Style::default()
                        .fg(if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.muted()))),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_follow_auth_state() {
        let theme = Theme::default();
        let mut menu = Menu::new(&theme, false);
        assert_eq!(menu.action_for_key('l'), Some(MenuAction::Go(Route::Login)));
        assert_eq!(menu.action_for_key('1'), None);

        menu.selected = 2;
        menu.rebuild(true);
        assert_eq!(menu.action_for_key('1'), Some(MenuAction::Go(Route::Study)));
        assert_eq!(menu.action_for_key('o'), Some(MenuAction::Logout));
        assert_eq!(menu.selected, 2);
    }

    #[test]
    fn selection_wraps() {
        let theme = Theme::default();
        let mut menu = Menu::new(&theme, false);
        menu.prev();
        assert_eq!(menu.selected, menu.items.len() - 1);
        menu.next();
        assert_eq!(menu.selected, 0);
        assert_eq!(menu.selected_action(), Some(MenuAction::Go(Route::Login)));
    }
}
