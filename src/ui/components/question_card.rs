use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::api::types::Question;
use crate::study::{Feedback, StudyMode};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// One question with its answer area and, once submitted, the verdict.
pub struct QuestionCard<'a> {
    pub question: &'a Question,
    pub mode: StudyMode,
    pub options: &'a [String],
    pub selected: usize,
    pub input: &'a LineInput,
    pub feedback: Option<&'a Feedback>,
    pub submitting: bool,
    pub theme: &'a Theme,
}

/// Split `sentence` around the mistaken word: (before, word, after).
/// `offset` is a char index hint; falls back to the first occurrence.
pub fn split_highlight<'s>(sentence: &'s str, word: &str, offset: usize) -> Option<(&'s str, &'s str, &'s str)> {
    if word.is_empty() {
        return None;
    }
    let by_offset = sentence
        .char_indices()
        .nth(offset)
        .map(|(b, _)| b)
        .filter(|b| sentence[*b..].starts_with(word));
    let start = by_offset.or_else(|| sentence.find(word))?;
    let end = start + word.len();
    Some((&sentence[..start], &sentence[start..end], &sentence[end..]))
}

impl QuestionCard<'_> {
    fn prompt_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let q = self.question;
        let text_style = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();

        let meta = format!(
            "#{}  {}  {}",
            q.id,
            q.category.as_deref().unwrap_or("-"),
            "★".repeat(q.difficulty as usize)
        );
        lines.push(Line::from(Span::styled(meta, Style::default().fg(colors.muted()))));
        lines.push(Line::from(""));

        // Reveal the exact mistake only after answering.
        let highlight = self
            .feedback
            .and(q.span.as_ref())
            .and_then(|span| split_highlight(&q.prompt, &span.wrong_word, span.offset));
        match highlight {
            Some((before, word, after)) => lines.push(Line::from(vec![
                Span::styled(before.to_string(), text_style),
                Span::styled(
                    word.to_string(),
                    text_style
                        .fg(colors.error())
                        .bg(colors.wrong_word_bg())
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(after.to_string(), text_style),
            ])),
            None => lines.push(Line::from(Span::styled(q.prompt.clone(), text_style))),
        }
        lines
    }

    fn answer_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        match self.mode {
            StudyMode::Choice => self
                .options
                .iter()
                .enumerate()
                .flat_map(|(i, option)| {
                    let chosen = self.feedback.is_some_and(|f| f.answer == *option);
                    let is_right = *option == self.question.correct_answer;
                    let (marker, style) = match self.feedback {
                        Some(_) if is_right => ("O", Style::default().fg(colors.success())),
                        Some(_) if chosen => ("X", Style::default().fg(colors.error())),
                        Some(_) => (" ", Style::default().fg(colors.muted())),
                        None if i == self.selected => (
                            ">",
                            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                        ),
                        None => (" ", Style::default().fg(colors.fg())),
                    };
                    [
                        Line::from(Span::styled(format!(" {marker} {}. {option}", i + 1), style)),
                        Line::from(""),
                    ]
                })
                .collect(),
            StudyMode::Typed => {
                let mut line = vec![Span::styled(
                    format!(" {} ", t!("study.your_answer")),
                    Style::default().fg(colors.muted()),
                )];
                match self.feedback {
                    Some(f) => line.push(Span::styled(f.answer.clone(), Style::default().fg(colors.fg()))),
                    None => line.extend(self.input.line(colors, !self.submitting).spans),
                }
                let mut lines = vec![Line::from(line)];
                if self.feedback.is_some_and(|f| !f.correct) {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!(" {} ", t!("study.correct_answer")),
                            Style::default().fg(colors.muted()),
                        ),
                        Span::styled(
                            self.question.correct_answer.clone(),
                            Style::default().fg(colors.success()),
                        ),
                    ]));
                }
                lines
            }
        }
    }

    fn feedback_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let Some(feedback) = self.feedback else {
            if self.submitting {
                return vec![Line::from(Span::styled(
                    t!("study.submitting").into_owned(),
                    Style::default().fg(colors.muted()),
                ))];
            }
            return Vec::new();
        };
        let (verdict, color) = if feedback.correct {
            (t!("study.correct").into_owned(), colors.success())
        } else {
            (t!("study.incorrect").into_owned(), colors.error())
        };
        let mut lines = vec![Line::from(Span::styled(
            verdict,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        if let Some(span) = &self.question.span {
            lines.push(Line::from(Span::styled(
                format!("{} → {}", span.wrong_word, span.right_word),
                Style::default().fg(colors.highlight()),
            )));
        }
        if !feedback.explanation.is_empty() {
            lines.push(Line::from(Span::styled(
                feedback.explanation.clone(),
                Style::default().fg(colors.fg()),
            )));
        }
        lines
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let prompt = self.prompt_lines();
        let answers = self.answer_lines();
        let feedback = self.feedback_lines();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(prompt.len() as u16 + 2),
                Constraint::Length(answers.len() as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(prompt)
            .wrap(Wrap { trim: false })
            .render(layout[0], buf);
        Paragraph::new(answers)
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);
        Paragraph::new(feedback)
            .wrap(Wrap { trim: true })
            .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_prefers_offset_then_search() {
        assert_eq!(
            split_highlight("문을 잠궜다", "잠궜다", 3),
            Some(("문을 ", "잠궜다", ""))
        );
        // Wrong offset falls back to the first occurrence.
        assert_eq!(
            split_highlight("문을 잠궜다", "잠궜다", 0),
            Some(("문을 ", "잠궜다", ""))
        );
        assert_eq!(
            split_highlight("가 나 가", "가", 4),
            Some(("가 나 ", "가", ""))
        );
        assert_eq!(split_highlight("문장", "없음", 0), None);
        assert_eq!(split_highlight("문장", "", 0), None);
    }
}
