use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::api::types::RecommendedQuestion;
use crate::recommend::{PollerState, RecommendationPoller};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub struct RecommendationList<'a> {
    pub poller: &'a RecommendationPoller,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> RecommendationList<'a> {
    pub fn new(poller: &'a RecommendationPoller, selected: usize, theme: &'a Theme) -> Self {
        Self {
            poller,
            selected,
            theme,
        }
    }

    fn status_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let (text, color) = match self.poller.state() {
            PollerState::Idle => match self.poller.error() {
                Some(e) => (
                    format!("{} [{}]  {}", e.user_message(), e.code(), t!("common.retry_hint")),
                    colors.error(),
                ),
                None => (t!("recs.idle").into_owned(), colors.muted()),
            },
            PollerState::Requesting => (t!("recs.requesting").into_owned(), colors.muted()),
            PollerState::Polling { attempt, .. } => (
                t!(
                    "recs.polling",
                    attempt = attempt,
                    max = self.poller.policy().max_attempts
                )
                .into_owned(),
                colors.warning(),
            ),
            PollerState::Ready => (
                t!("recs.ready", count = self.poller.items().len()).into_owned(),
                colors.success(),
            ),
            PollerState::TimedOut => (t!("recs.timed_out").into_owned(), colors.error()),
        };
        Line::from(Span::styled(text, Style::default().fg(color)))
    }

    fn item_lines(&self, index: usize, item: &RecommendedQuestion) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let selected = index == self.selected;
        let indicator = if selected { ">" } else { " " };
        let head_style = if selected {
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        let mut lines = vec![Line::from(vec![
            Span::styled(format!(" {indicator} #{}", item.question_id), head_style),
            Span::styled(
                format!(
                    "  {}  {}",
                    item.category.as_deref().unwrap_or("-"),
                    item.difficulty_label()
                ),
                Style::default().fg(colors.muted()),
            ),
        ])];
        if let Some(sentence) = item.wrong_answer.as_ref().or(item.correct_answer.as_ref()) {
            lines.push(Line::from(Span::styled(
                format!("     {sentence}"),
                Style::default().fg(colors.fg()),
            )));
        }
        lines
    }
}

impl Widget for RecommendationList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", t!("route.recommendations")))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(self.status_line())
            .wrap(Wrap { trim: true })
            .render(layout[0], buf);

        if let PollerState::Polling { attempt, .. } = self.poller.state() {
            let max = self.poller.policy().max_attempts.max(1);
            ProgressBar::new("", f64::from(*attempt) / f64::from(max), self.theme)
                .borderless()
                .caption(format!("{attempt}/{max}"))
                .fill(colors.warning())
                .render(layout[1], buf);
        }

        let items = self.poller.items();
        if items.is_empty() {
            return;
        }
        let lines: Vec<Line> = items
            .iter()
            .enumerate()
            .flat_map(|(i, item)| self.item_lines(i, item))
            .collect();
        // Keep the selection visible; every item takes at most two rows.
        let visible_items = (layout[3].height as usize / 2).max(1);
        let skip = self.selected.saturating_sub(visible_items - 1) * 2;
        Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>()).render(layout[3], buf);
    }
}
