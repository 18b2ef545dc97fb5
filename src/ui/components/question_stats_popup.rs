use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::stats::{self, Panel, QuestionStatsView};
use crate::ui::components::chart::TrendChart;
use crate::ui::theme::Theme;

/// Overlay with aggregate numbers for the question on screen.
pub struct QuestionStatsPopup<'a> {
    pub view: &'a QuestionStatsView,
    pub theme: &'a Theme,
}

impl Widget for QuestionStatsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);
        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.question_title")))
            .title_bottom(Line::from(format!(" {} ", t!("common.close_hint"))))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let stats = match &self.view.panel {
            Panel::Loaded(stats) => stats,
            Panel::Failed(e) => {
                Paragraph::new(Line::from(Span::styled(
                    format!("{} [{}]", e.user_message(), e.code()),
                    Style::default().fg(colors.error()),
                )))
                .wrap(Wrap { trim: true })
                .render(inner, buf);
                return;
            }
            Panel::Empty | Panel::Loading => {
                Paragraph::new(Line::from(Span::styled(
                    t!("common.loading").into_owned(),
                    Style::default().fg(colors.muted()),
                )))
                .render(inner, buf);
                return;
            }
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(inner);

        let label = Style::default().fg(colors.muted());
        let value = Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD);
        let row = |name: String, shown: String| {
            Line::from(vec![
                Span::styled(format!(" {name:<14}"), label),
                Span::styled(shown, value),
            ])
        };
        Paragraph::new(vec![
            row(t!("stats.attempts").into_owned(), stats.total_attempts.to_string()),
            row(t!("stats.accuracy").into_owned(), stats::format_percent(stats.correct_rate)),
            row(t!("stats.avg_time").into_owned(), stats::format_duration(stats.avg_time_spent)),
            row(t!("stats.dropout").into_owned(), stats::format_percent(stats.dropout_rate)),
        ])
        .render(layout[0], buf);

        let daily = stats::question_daily_rows(stats);
        let series: Vec<(f64, f64)> = daily
            .iter()
            .enumerate()
            .map(|(i, (_, _, rate))| (i as f64, *rate))
            .collect();
        let labels: Vec<String> = daily.iter().map(|(day, _, _)| day.clone()).collect();
        TrendChart::new(&t!("stats.rate_per_day"), &series, &labels, self.theme)
            .y_title("%")
            .y_max(100.0)
            .color(colors.success())
            .render(layout[1], buf);
    }
}
