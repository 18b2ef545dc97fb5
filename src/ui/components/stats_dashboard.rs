use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::api::types::{CorrectnessEncoding, StudyHistoryItem, UserStats};
use crate::stats::{self, Panel, StatisticsView, StatsTab};
use crate::ui::components::chart::TrendChart;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub struct StatsDashboard<'a> {
    pub view: &'a StatisticsView,
    pub encoding: CorrectnessEncoding,
    pub theme: &'a Theme,
}

impl<'a> StatsDashboard<'a> {
    pub fn new(view: &'a StatisticsView, encoding: CorrectnessEncoding, theme: &'a Theme) -> Self {
        Self {
            view,
            encoding,
            theme,
        }
    }

    fn render_status<T>(&self, panel: &Panel<T>, area: Rect, buf: &mut Buffer) -> bool {
        let colors = &self.theme.colors;
        let (text, color) = match panel {
            Panel::Loaded(_) => return false,
            Panel::Empty | Panel::Loading => (t!("common.loading").into_owned(), colors.muted()),
            Panel::Failed(e) => (
                format!("{} [{}]  {}", e.user_message(), e.code(), t!("common.retry_hint")),
                colors.error(),
            ),
        };
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
            .wrap(Wrap { trim: true })
            .render(area, buf);
        true
    }

    fn render_overview(&self, area: Rect, buf: &mut Buffer) {
        if self.render_status(&self.view.user_stats, area, buf) {
            return;
        }
        let Some(user_stats) = self.view.user_stats.loaded() else {
            return;
        };
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(7),
                Constraint::Min(0),
            ])
            .split(area);

        // Grade ladder
        let mut ladder: Vec<Span> = vec![Span::styled(
            format!(" {}  ", t!("stats.level")),
            Style::default().fg(colors.muted()),
        )];
        for (grade, current) in stats::grade_ladder(user_stats.current_level.as_ref()) {
            let style = if current {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.highlight())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted())
            };
            ladder.push(Span::styled(format!(" {grade} "), style));
            ladder.push(Span::raw(" "));
        }
        Paragraph::new(vec![Line::from(""), Line::from(ladder)]).render(layout[0], buf);

        let accuracy = match user_stats.accuracy(self.encoding) {
            Some(rate) => stats::format_percent(rate),
            None => "-".to_string(),
        };
        let summary = summary_line(user_stats);
        Paragraph::new(vec![Line::from(vec![
            Span::styled(format!(" {}: ", t!("stats.accuracy")), Style::default().fg(colors.muted())),
            Span::styled(accuracy, Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)),
            Span::styled(summary, Style::default().fg(colors.muted())),
        ])])
        .render(layout[1], buf);

        // Category bars
        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.categories")))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(layout[2]);
        block.render(layout[2], buf);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1); 5])
            .split(inner);
        for (row, (label, pct)) in rows.iter().zip(user_stats.category_stats.entries()) {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(18), Constraint::Min(10)])
                .split(*row);
            Paragraph::new(Line::from(Span::styled(
                format!(" {label}"),
                Style::default().fg(colors.fg()),
            )))
            .render(cols[0], buf);
            let pct = stats::as_percent(pct);
            ProgressBar::new(&label, pct / 100.0, self.theme)
                .borderless()
                .caption(format!("{pct:.0}%"))
                .render(cols[1], buf);
        }
    }

    fn render_progress(&self, area: Rect, buf: &mut Buffer) {
        if self.render_status(&self.view.user_stats, area, buf) {
            return;
        }
        let Some(user_stats) = self.view.user_stats.loaded() else {
            return;
        };
        let colors = &self.theme.colors;
        let (solved, rate, labels) = stats::progress_series(&user_stats.daily_progress);
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        TrendChart::new(&t!("stats.solved_per_day"), &solved, &labels, self.theme)
            .y_title(&t!("stats.count"))
            .render(halves[0], buf);
        TrendChart::new(&t!("stats.rate_per_day"), &rate, &labels, self.theme)
            .y_title("%")
            .y_max(100.0)
            .color(colors.success())
            .render(halves[1], buf);
    }

    fn render_history(&self, area: Rect, buf: &mut Buffer) {
        if self.render_status(&self.view.history, area, buf) {
            return;
        }
        let Some(rows) = self.view.history.loaded() else {
            return;
        };
        let colors = &self.theme.colors;
        if rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("stats.no_history").into_owned(),
                Style::default().fg(colors.muted()),
            )))
            .render(area, buf);
            return;
        }

        let header = Line::from(Span::styled(
            format!(
                " {:<18} {:>8}  {:<4}  {:>10}",
                t!("stats.col_time"),
                t!("stats.col_question"),
                t!("stats.col_result"),
                t!("stats.col_spent")
            ),
            Style::default().fg(colors.muted()).add_modifier(Modifier::BOLD),
        ));
        let visible = area.height.saturating_sub(1) as usize;
        let start = self.view.history_selected.saturating_sub(visible.saturating_sub(1));
        let mut lines = vec![header];
        lines.extend(
            rows.iter()
                .enumerate()
                .skip(start)
                .take(visible)
                .map(|(i, item)| self.history_line(item, i == self.view.history_selected)),
        );
        Paragraph::new(lines).render(area, buf);
    }

    fn history_line(&self, item: &StudyHistoryItem, selected: bool) -> Line<'static> {
        let colors = &self.theme.colors;
        let (mark, color) = if item.is_correct {
            ("O", colors.success())
        } else {
            ("X", colors.error())
        };
        let base = if selected {
            Style::default().bg(colors.accent_dim())
        } else {
            Style::default()
        };
        let spent = if item.time_spent > 0.0 {
            stats::format_duration(item.time_spent)
        } else {
            "-".to_string()
        };
        Line::from(vec![
            Span::styled(
                format!(
                    " {:<18} {:>8}  ",
                    stats::format_timestamp(item.timestamp),
                    item.question_id
                ),
                base.fg(colors.fg()),
            ),
            Span::styled(format!("{mark:<4}"), base.fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {spent:>10}"), base.fg(colors.muted())),
        ])
    }
}

fn summary_line(user_stats: &UserStats) -> String {
    match &user_stats.study_stats {
        Some(summary) if summary.total_questions > 0 => format!(
            "   {}",
            t!(
                "stats.summary",
                total = summary.total_questions,
                avg = stats::format_duration(summary.average_time)
            )
        ),
        _ => String::new(),
    }
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("route.statistics")))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(6)])
            .split(inner);

        let tab_spans: Vec<Span> = StatsTab::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, tab)| {
                let style = if *tab == self.view.tab {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.muted())
                };
                vec![
                    Span::styled(format!(" [{}] {} ", i + 1, tab.label()), style),
                    Span::raw("  "),
                ]
            })
            .collect();
        Paragraph::new(Line::from(tab_spans)).render(layout[0], buf);

        match self.view.tab {
            StatsTab::Overview => self.render_overview(layout[1], buf),
            StatsTab::Progress => self.render_progress(layout[1], buf),
            StatsTab::History => self.render_history(layout[1], buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn rendered(view: &StatisticsView) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 90, 24);
        let mut buf = Buffer::empty(area);
        StatsDashboard::new(view, CorrectnessEncoding::Boolean, &theme).render(area, &mut buf);
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn failed_panel_shows_error_code() {
        let mut view = StatisticsView::default();
        let tag = view.begin_user_stats();
        view.complete_user_stats(tag, Err(ApiError::Timeout));
        assert!(rendered(&view).contains("[timeout]"));
    }

    #[test]
    fn overview_renders_grade_ladder() {
        let mut view = StatisticsView::default();
        let tag = view.begin_user_stats();
        let stats: UserStats = serde_json::from_str(
            r#"{"current_level": "미", "category_stats": {"hanja_confusion": 50}}"#,
        )
        .unwrap();
        view.complete_user_stats(tag, Ok(stats));
        let screen = rendered(&view);
        assert!(screen.contains('미'));
        assert!(screen.contains("50%"));
    }
}
