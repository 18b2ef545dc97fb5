use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;

/// Line chart over day-indexed points (x = 0, 1, 2 ...).
pub struct TrendChart<'a> {
    pub title: String,
    pub data: &'a [(f64, f64)],
    pub x_labels: &'a [String],
    pub y_title: String,
    /// Fixed upper bound (100 for percentages); otherwise scaled to data.
    pub y_max: Option<f64>,
    pub color: Option<Color>,
    pub theme: &'a Theme,
}

impl<'a> TrendChart<'a> {
    pub fn new(title: &str, data: &'a [(f64, f64)], x_labels: &'a [String], theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            data,
            x_labels,
            y_title: String::new(),
            y_max: None,
            color: None,
            theme,
        }
    }

    pub fn y_title(mut self, title: &str) -> Self {
        self.y_title = title.to_string();
        self
    }

    pub fn y_max(mut self, max: f64) -> Self {
        self.y_max = Some(max);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()));

        if self.data.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::from(t!("stats.no_data").into_owned()))
                .style(Style::default().fg(colors.muted()))
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let max_x = self.data.last().map(|(x, _)| *x).unwrap_or(1.0).max(1.0);
        let max_y = self.y_max.unwrap_or_else(|| {
            self.data
                .iter()
                .map(|(_, y)| *y)
                .fold(0.0f64, f64::max)
                .max(5.0)
                * 1.1
        });

        // A single point draws nothing as a line.
        let graph_type = if self.data.len() == 1 {
            GraphType::Scatter
        } else {
            GraphType::Line
        };
        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(graph_type)
            .style(Style::default().fg(self.color.unwrap_or_else(|| colors.accent())))
            .data(self.data);

        let x_labels: Vec<Line> = match self.x_labels {
            [] => Vec::new(),
            [only] => vec![Line::from(only.clone())],
            [first, .., last] => vec![Line::from(first.clone()), Line::from(last.clone())],
        };

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(colors.muted()))
                    .bounds([0.0, max_x])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(self.y_title)
                    .style(Style::default().fg(colors.muted()))
                    .bounds([0.0, max_y])
                    .labels(vec![
                        Line::from("0"),
                        Line::from(format!("{:.0}", max_y)),
                    ]),
            );

        chart.render(area, buf);
    }
}
