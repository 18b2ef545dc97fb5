//! View models and formatting for the statistics screens.

use chrono::{DateTime, Local, NaiveDate, Utc};
use rust_i18n::t;

use crate::api::types::{DailyProgress, GRADES, QuestionStats, StudyHistoryItem, StudyLevel, UserStats};
use crate::error::ApiError;

/// Async-loaded data behind one panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Panel<T> {
    #[default]
    Empty,
    Loading,
    Loaded(T),
    Failed(ApiError),
}

impl<T> Panel<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Panel::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }
}

impl<T> From<Result<T, ApiError>> for Panel<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Panel::Loaded(value),
            Err(e) => Panel::Failed(e),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsTab {
    #[default]
    Overview,
    Progress,
    History,
}

impl StatsTab {
    pub const ALL: [StatsTab; 3] = [StatsTab::Overview, StatsTab::Progress, StatsTab::History];

    pub fn index(self) -> usize {
        match self {
            StatsTab::Overview => 0,
            StatsTab::Progress => 1,
            StatsTab::History => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> String {
        match self {
            StatsTab::Overview => t!("stats.tab_overview").into_owned(),
            StatsTab::Progress => t!("stats.tab_progress").into_owned(),
            StatsTab::History => t!("stats.tab_history").into_owned(),
        }
    }
}

/// State of the `/statistics` screen. Each panel carries the tag of its
/// latest request so late replies from an earlier visit are ignored.
#[derive(Debug, Default)]
pub struct StatisticsView {
    pub tab: StatsTab,
    pub user_stats: Panel<UserStats>,
    pub history: Panel<Vec<StudyHistoryItem>>,
    pub history_selected: usize,
    user_tag: u64,
    history_tag: u64,
    next_tag: u64,
}

impl StatisticsView {
    fn tag(&mut self) -> u64 {
        self.next_tag += 1;
        self.next_tag
    }

    pub fn begin_user_stats(&mut self) -> u64 {
        let tag = self.tag();
        self.user_tag = tag;
        self.user_stats = Panel::Loading;
        tag
    }

    pub fn begin_history(&mut self) -> u64 {
        let tag = self.tag();
        self.history_tag = tag;
        self.history = Panel::Loading;
        tag
    }

    pub fn complete_user_stats(&mut self, tag: u64, result: Result<UserStats, ApiError>) -> bool {
        if tag != self.user_tag {
            return false;
        }
        self.user_stats = result.into();
        true
    }

    pub fn complete_history(
        &mut self,
        tag: u64,
        result: Result<Vec<StudyHistoryItem>, ApiError>,
    ) -> bool {
        if tag != self.history_tag {
            return false;
        }
        self.history = result.into();
        self.history_selected = 0;
        true
    }

    pub fn select_next(&mut self) {
        if let Some(rows) = self.history.loaded() {
            if !rows.is_empty() {
                self.history_selected = (self.history_selected + 1).min(rows.len() - 1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }
}

/// Per-question stats overlay on the study screen.
#[derive(Debug, Default)]
pub struct QuestionStatsView {
    pub open: bool,
    pub panel: Panel<QuestionStats>,
    tag: u64,
}

impl QuestionStatsView {
    pub fn begin(&mut self) -> u64 {
        self.tag += 1;
        self.open = true;
        self.panel = Panel::Loading;
        self.tag
    }

    pub fn complete(&mut self, tag: u64, result: Result<QuestionStats, ApiError>) -> bool {
        if !self.open || tag != self.tag {
            return false;
        }
        self.panel = result.into();
        true
    }

    pub fn close(&mut self) {
        self.open = false;
        self.tag += 1;
    }
}

/// Rates arrive either as 0..1 fractions or as 0..100 percentages.
pub fn as_percent(rate: f64) -> f64 {
    if rate <= 1.0 { rate * 100.0 } else { rate }
}

pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", as_percent(rate))
}

/// "3분 20초" / "3m 20s"; seconds only under a minute.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (min, sec) = (total / 60, total % 60);
    if min == 0 {
        t!("stats.duration_sec", sec = sec).into_owned()
    } else {
        t!("stats.duration_min_sec", min = min, sec = sec).into_owned()
    }
}

pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// The 가–수 ladder with the learner's position marked.
pub fn grade_ladder(level: Option<&StudyLevel>) -> Vec<(&'static str, bool)> {
    let current = level.and_then(StudyLevel::grade_index);
    GRADES
        .iter()
        .enumerate()
        .map(|(i, grade)| (*grade, Some(i) == current))
        .collect()
}

/// Chart series from daily progress: (solved counts, correct-rate %) with
/// x = day index, plus the date labels for the axis.
pub fn progress_series(days: &[DailyProgress]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, Vec<String>) {
    let mut sorted: Vec<&DailyProgress> = days.iter().collect();
    sorted.sort_by_key(|d| parse_day(&d.date));
    let solved = sorted
        .iter()
        .enumerate()
        .map(|(i, d)| (i as f64, d.solved_count as f64))
        .collect();
    let rate = sorted
        .iter()
        .enumerate()
        .map(|(i, d)| (i as f64, as_percent(d.correct_rate)))
        .collect();
    let labels = sorted.iter().map(|d| short_date(&d.date)).collect();
    (solved, rate, labels)
}

/// (date label, attempts, correct-rate %) per day, oldest first.
pub fn question_daily_rows(stats: &QuestionStats) -> Vec<(String, u32, f64)> {
    stats
        .daily_stats
        .iter()
        .map(|(day, s)| (short_date(day), s.attempts, as_percent(s.correct_rate)))
        .collect()
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

fn short_date(raw: &str) -> String {
    match parse_day(raw) {
        Some(day) => day.format("%m/%d").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::DailyQuestionStat;

    #[test]
    fn percent_accepts_both_scales() {
        assert_eq!(format_percent(0.75), "75.0%");
        assert_eq!(format_percent(80.0), "80.0%");
    }

    #[test]
    fn ladder_marks_current_grade() {
        let level = StudyLevel::from("우");
        let ladder = grade_ladder(Some(&level));
        assert_eq!(ladder.len(), 5);
        assert_eq!(ladder[3], ("우", true));
        assert!(ladder.iter().filter(|(_, on)| *on).count() == 1);
        assert!(grade_ladder(None).iter().all(|(_, on)| !on));
    }

    #[test]
    fn series_sorted_by_date() {
        let days = vec![
            DailyProgress {
                date: "2024-05-02".into(),
                solved_count: 4,
                correct_rate: 0.5,
            },
            DailyProgress {
                date: "2024-05-01".into(),
                solved_count: 2,
                correct_rate: 1.0,
            },
        ];
        let (solved, rate, labels) = progress_series(&days);
        assert_eq!(solved, vec![(0.0, 2.0), (1.0, 4.0)]);
        assert_eq!(rate[1], (1.0, 50.0));
        assert_eq!(labels, vec!["05/01".to_string(), "05/02".to_string()]);
    }

    #[test]
    fn stale_panel_replies_are_ignored() {
        let mut view = StatisticsView::default();
        let old = view.begin_user_stats();
        let new = view.begin_user_stats();
        assert!(!view.complete_user_stats(old, Ok(UserStats::default())));
        assert!(view.user_stats.is_loading());
        assert!(view.complete_user_stats(new, Err(ApiError::Timeout)));
        assert!(matches!(view.user_stats, Panel::Failed(ApiError::Timeout)));
    }

    #[test]
    fn closed_overlay_drops_reply() {
        let mut overlay = QuestionStatsView::default();
        let tag = overlay.begin();
        overlay.close();
        assert!(!overlay.complete(tag, Ok(QuestionStats::default())));
    }

    #[test]
    fn daily_rows_use_short_dates() {
        let mut stats = QuestionStats::default();
        stats.daily_stats.insert(
            "2024-05-01".into(),
            DailyQuestionStat {
                attempts: 3,
                correct_rate: 0.5,
            },
        );
        assert_eq!(
            question_daily_rows(&stats),
            vec![("05/01".to_string(), 3, 50.0)]
        );
    }
}
