//! Wire schemas for every endpoint, parsed strictly at the gateway boundary.
//!
//! The backend has shipped more than one shape for several payloads; the
//! lenient parts (aliases, int-or-string ids, 0/1 correctness) are resolved
//! here so the rest of the crate only sees one canonical type per concept.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_i18n::t;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Grade ladder used by the statistics view, lowest first.
pub const GRADES: [&str; 5] = ["가", "양", "미", "우", "수"];

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Study level as reported by the backend: either a number (1..3) or a
/// grade letter from [`GRADES`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StudyLevel(String);

impl StudyLevel {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position on the 가–수 ladder, if the level is a grade letter.
    pub fn grade_index(&self) -> Option<usize> {
        GRADES.iter().position(|g| *g == self.0)
    }

    pub fn label(&self) -> String {
        match self.0.as_str() {
            "1" => t!("level.beginner").into_owned(),
            "2" => t!("level.intermediate").into_owned(),
            "3" => t!("level.advanced").into_owned(),
            "" => t!("level.unknown").into_owned(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for StudyLevel {
    fn from(value: &str) -> Self {
        StudyLevel(value.to_string())
    }
}

impl From<i64> for StudyLevel {
    fn from(value: i64) -> Self {
        StudyLevel(value.to_string())
    }
}

impl fmt::Display for StudyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Serialize for StudyLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StudyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
            Null(()),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => StudyLevel(n.to_string()),
            Raw::Text(s) => StudyLevel(s),
            Raw::Null(()) => StudyLevel::default(),
        })
    }
}

/// Question identifier. Numeric on the current backend, a string in older
/// payloads; serialized back as a number whenever it is one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for QuestionId {
    fn from(value: u64) -> Self {
        QuestionId(value.to_string())
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        QuestionId(value.to_string())
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => QuestionId(n.to_string()),
            Raw::Text(s) => QuestionId(s),
        })
    }
}

/// A correctness flag as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireCorrect {
    Flag(bool),
    Code(i64),
}

/// How integer correctness codes map to booleans. One backend variant
/// stores `0` for a correct answer, another `1`; booleans always decode
/// as themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectnessEncoding {
    #[default]
    Boolean,
    ZeroIsCorrect,
    OneIsCorrect,
}

impl CorrectnessEncoding {
    pub fn decode(self, raw: WireCorrect) -> bool {
        match (self, raw) {
            (_, WireCorrect::Flag(flag)) => flag,
            (CorrectnessEncoding::Boolean, WireCorrect::Code(n)) => n != 0,
            (CorrectnessEncoding::ZeroIsCorrect, WireCorrect::Code(n)) => n == 0,
            (CorrectnessEncoding::OneIsCorrect, WireCorrect::Code(n)) => n == 1,
        }
    }

    pub fn encode(self, correct: bool) -> WireCorrect {
        match self {
            CorrectnessEncoding::Boolean => WireCorrect::Flag(correct),
            CorrectnessEncoding::ZeroIsCorrect => WireCorrect::Code(if correct { 0 } else { 1 }),
            CorrectnessEncoding::OneIsCorrect => WireCorrect::Code(if correct { 1 } else { 0 }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> String {
        match self {
            Gender::Male => t!("profile.gender_male").into_owned(),
            Gender::Female => t!("profile.gender_female").into_owned(),
        }
    }
}

/// Unknown gender encodings (one backend sent booleans) are dropped rather
/// than guessed.
fn lenient_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Gender>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value.as_str() {
        Some("male") => Some(Gender::Male),
        Some("female") => Some(Gender::Female),
        _ => None,
    })
}

/// Parse the timestamp formats the backend emits (RFC 3339, or naive
/// ISO-8601 which is taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub google_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub study_level: StudyLevel,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub access_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SessionTokenRequest<'a> {
    pub session_token: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub session_token: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub study_level: StudyLevel,
    #[serde(default, alias = "user_info")]
    pub user: Option<User>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub study_level: StudyLevel,
    #[serde(default)]
    pub google_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub user_info: Option<User>,
}

impl VerifyResponse {
    /// Flatten whichever shape the backend sent into one `User`.
    pub fn user(&self) -> User {
        let mut user = self.user_info.clone().unwrap_or_default();
        if !self.display_name.is_empty() {
            user.display_name = self.display_name.clone();
        }
        if !self.study_level.is_empty() {
            user.study_level = self.study_level.clone();
        }
        if !self.google_id.is_empty() {
            user.google_id = self.google_id.clone();
        }
        if !self.email.is_empty() {
            user.email = self.email.clone();
        }
        if self.created_at.is_some() {
            user.created_at = self.created_at.clone();
        }
        if self.last_login.is_some() {
            user.last_login = self.last_login.clone();
        }
        user
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LogoutResponse {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
}

/// Fields a user may change about themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileRequest<'a> {
    pub session_token: &'a str,
    pub display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileResponse {
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, alias = "user_info")]
    pub user: Option<User>,
}

fn default_true() -> bool {
    true
}

/// Some endpoints answer `"success": "true"` instead of a boolean.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Text(String),
        Int(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Flag(flag) => flag,
        Raw::Text(text) => text.eq_ignore_ascii_case("true"),
        Raw::Int(n) => n != 0,
    })
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Exact location of the mistake inside the wrong sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordSpan {
    pub wrong_word: String,
    pub right_word: String,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub wrong_sentence: Option<String>,
    pub right_sentence: Option<String>,
    pub correct_answer: String,
    pub wrong_answer: Option<String>,
    pub category: Option<String>,
    /// Ordinal 1 (easiest) to 5.
    pub difficulty: u8,
    pub explanation: String,
    pub span: Option<WordSpan>,
}

#[derive(Deserialize)]
struct RawQuestion {
    #[serde(alias = "id")]
    question_id: QuestionId,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    wrong_sentence: Option<String>,
    #[serde(default)]
    right_sentence: Option<String>,
    #[serde(default)]
    correct_ans: Option<String>,
    #[serde(default)]
    wrong_ans: Option<String>,
    #[serde(default, alias = "category_id")]
    category: Option<String>,
    #[serde(default, alias = "difficulty")]
    difficulty_level: Option<i64>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    reason_detail: Option<String>,
    #[serde(default)]
    wrong_word: Option<String>,
    #[serde(default)]
    right_word: Option<String>,
    #[serde(default)]
    location: Option<i64>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = String;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let correct_answer = raw
            .correct_ans
            .or_else(|| raw.right_sentence.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| format!("question {} has no correct answer", raw.question_id))?;
        let wrong_answer = raw.wrong_ans.or_else(|| raw.wrong_sentence.clone());
        let prompt = raw
            .question
            .or_else(|| raw.wrong_sentence.clone())
            .unwrap_or_default();
        let explanation = raw
            .explanation
            .or(raw.reason_detail)
            .unwrap_or_default();
        let span = match (raw.wrong_word, raw.right_word) {
            (Some(wrong_word), Some(right_word)) => Some(WordSpan {
                wrong_word,
                right_word,
                offset: raw.location.unwrap_or(0).max(0) as usize,
            }),
            _ => None,
        };
        Ok(Question {
            id: raw.question_id,
            prompt,
            wrong_sentence: raw.wrong_sentence,
            right_sentence: raw.right_sentence,
            correct_answer,
            wrong_answer,
            category: raw.category,
            difficulty: raw.difficulty_level.unwrap_or(1).clamp(1, 5) as u8,
            explanation,
            span,
        })
    }
}

impl<'de> Deserialize<'de> for Question {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawQuestion::deserialize(deserializer)?;
        Question::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// `/api/questions/{id}` answers with the bare question; tolerate an
/// envelope too.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QuestionPayload {
    Wrapped { question: Question },
    Bare(Question),
}

impl QuestionPayload {
    pub fn into_question(self) -> Question {
        match self {
            QuestionPayload::Wrapped { question } | QuestionPayload::Bare(question) => question,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionsPage {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Study
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SubmitAnswerRequest<'a> {
    pub session_token: &'a str,
    pub question_id: &'a QuestionId,
    pub correct: WireCorrect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SubmitAnswerResponse {
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub next_question_id: Option<QuestionId>,
}

#[derive(Debug, Serialize)]
pub struct StudyHistoryRequest<'a> {
    pub session_token: &'a str,
    pub limit: u32,
}

/// One row of study history as the backend reports it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HistoryRow {
    pub question_id: QuestionId,
    #[serde(alias = "is_correct")]
    pub correct: WireCorrect,
    #[serde(default, alias = "solved_at")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub time_spent: Option<f64>,
    #[serde(default)]
    pub wrong_sentence: Option<String>,
    #[serde(default)]
    pub right_sentence: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StudyHistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryRow>,
}

/// Canonical history entry: correctness is always a plain boolean here.
#[derive(Clone, Debug, PartialEq)]
pub struct StudyHistoryItem {
    pub question_id: QuestionId,
    pub is_correct: bool,
    pub timestamp: Option<DateTime<Utc>>,
    /// Seconds between showing the question and submitting.
    pub time_spent: f64,
    pub sentence: Option<String>,
}

impl StudyHistoryItem {
    pub fn from_row(row: HistoryRow, encoding: CorrectnessEncoding) -> Self {
        Self {
            is_correct: encoding.decode(row.correct),
            timestamp: row.created_at.as_deref().and_then(parse_timestamp),
            time_spent: row.time_spent.unwrap_or(0.0),
            sentence: row.right_sentence.or(row.wrong_sentence),
            question_id: row.question_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RecommendationJob {
    pub rec_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RecommendedQuestion {
    pub question_id: QuestionId,
    #[serde(default, alias = "category_id")]
    pub category: Option<String>,
    #[serde(default, rename = "correct_ans")]
    pub correct_answer: Option<String>,
    #[serde(default, rename = "wrong_ans")]
    pub wrong_answer: Option<String>,
    #[serde(default, alias = "difficulty")]
    pub difficulty_level: Option<i64>,
}

impl RecommendedQuestion {
    pub fn difficulty_label(&self) -> String {
        match self.difficulty_level.unwrap_or(1) {
            i64::MIN..=1 => t!("level.beginner").into_owned(),
            2 => t!("level.intermediate").into_owned(),
            _ => t!("level.advanced").into_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RecommendationStatus {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub recommendation: Vec<RecommendedQuestion>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Correct-answer percentage per confusion category.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CategoryStats {
    #[serde(default)]
    pub hanja_confusion: f64,
    #[serde(default)]
    pub passive_active: f64,
    #[serde(default)]
    pub spoken_written: f64,
    #[serde(default)]
    pub ending_confusion: f64,
    #[serde(default)]
    pub honorific_casual: f64,
}

impl CategoryStats {
    /// (label, percentage) in display order.
    pub fn entries(&self) -> [(String, f64); 5] {
        [
            (t!("category.hanja_confusion").into_owned(), self.hanja_confusion),
            (t!("category.passive_active").into_owned(), self.passive_active),
            (t!("category.spoken_written").into_owned(), self.spoken_written),
            (t!("category.ending_confusion").into_owned(), self.ending_confusion),
            (t!("category.honorific_casual").into_owned(), self.honorific_casual),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DailyProgress {
    pub date: String,
    #[serde(default)]
    pub solved_count: u32,
    #[serde(default)]
    pub correct_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StudySummary {
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_rate: f64,
    #[serde(default)]
    pub average_time: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub current_level: Option<StudyLevel>,
    #[serde(default)]
    pub category_stats: CategoryStats,
    #[serde(default)]
    pub daily_progress: Vec<DailyProgress>,
    #[serde(default)]
    pub study_states: Vec<HistoryRow>,
    #[serde(default)]
    pub study_stats: Option<StudySummary>,
}

impl UserStats {
    /// Share of correct answers in `study_states`, or the summary's rate
    /// when no rows were sent. None when neither is available.
    pub fn accuracy(&self, encoding: CorrectnessEncoding) -> Option<f64> {
        if !self.study_states.is_empty() {
            let correct = self
                .study_states
                .iter()
                .filter(|row| encoding.decode(row.correct))
                .count();
            return Some(correct as f64 / self.study_states.len() as f64);
        }
        self.study_stats.as_ref().map(|s| s.correct_rate)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DailyQuestionStat {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub correct_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct QuestionStats {
    #[serde(default)]
    pub correct_rate: f64,
    #[serde(default)]
    pub avg_time_spent: f64,
    #[serde(default)]
    pub dropout_rate: f64,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub daily_stats: BTreeMap<String, DailyQuestionStat>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AttemptRow {
    #[serde(default)]
    pub created_at: Option<String>,
    pub correct: WireCorrect,
}

/// The three shapes `/api/stats/questions/{id}` has been seen to return.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum QuestionStatsPayload {
    Attempts { question_stats: Vec<AttemptRow> },
    Wrapped { question_stats: QuestionStats },
    Flat(QuestionStats),
}

impl QuestionStatsPayload {
    pub fn into_stats(self, encoding: CorrectnessEncoding) -> QuestionStats {
        match self {
            QuestionStatsPayload::Wrapped { question_stats } => question_stats,
            QuestionStatsPayload::Flat(stats) => stats,
            QuestionStatsPayload::Attempts { question_stats } => {
                aggregate_attempts(&question_stats, encoding)
            }
        }
    }
}

fn aggregate_attempts(rows: &[AttemptRow], encoding: CorrectnessEncoding) -> QuestionStats {
    let mut per_day: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    let mut correct_total = 0u32;
    for row in rows {
        let correct = encoding.decode(row.correct);
        if correct {
            correct_total += 1;
        }
        let day = row
            .created_at
            .as_deref()
            .map(|s| s.chars().take(10).collect::<String>())
            .unwrap_or_default();
        let entry = per_day.entry(day).or_default();
        entry.0 += 1;
        if correct {
            entry.1 += 1;
        }
    }
    let total = rows.len() as u32;
    QuestionStats {
        correct_rate: if total == 0 {
            0.0
        } else {
            correct_total as f64 / total as f64
        },
        total_attempts: total,
        daily_stats: per_day
            .into_iter()
            .map(|(day, (attempts, correct))| {
                (
                    day,
                    DailyQuestionStat {
                        attempts,
                        correct_rate: correct as f64 / attempts as f64,
                    },
                )
            })
            .collect(),
        ..QuestionStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_level_accepts_numbers_and_grades() {
        let level: StudyLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level.as_str(), "2");
        let level: StudyLevel = serde_json::from_str("\"우\"").unwrap();
        assert_eq!(level.grade_index(), Some(3));
        let level: StudyLevel = serde_json::from_str("null").unwrap();
        assert!(level.is_empty());
    }

    #[test]
    fn question_id_serializes_numerically_when_possible() {
        assert_eq!(serde_json::to_string(&QuestionId::from(7u64)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&QuestionId::from("q-7")).unwrap(),
            "\"q-7\""
        );
        let id: QuestionId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(id, QuestionId::from(12u64));
    }

    #[test]
    fn correctness_encodings() {
        let zero = CorrectnessEncoding::ZeroIsCorrect;
        assert!(zero.decode(WireCorrect::Code(0)));
        assert!(!zero.decode(WireCorrect::Code(1)));
        assert!(zero.decode(WireCorrect::Flag(true)));
        assert_eq!(zero.encode(true), WireCorrect::Code(0));

        let boolean = CorrectnessEncoding::Boolean;
        assert!(boolean.decode(WireCorrect::Code(1)));
        assert_eq!(boolean.encode(false), WireCorrect::Flag(false));

        let one = CorrectnessEncoding::OneIsCorrect;
        assert!(one.decode(WireCorrect::Code(1)));
        assert!(!one.decode(WireCorrect::Code(0)));
    }

    #[test]
    fn question_parses_choice_shape() {
        let json = r#"{
            "question_id": 3,
            "question": "올바른 문장을 고르세요",
            "correct_ans": "왠지 기분이 좋다",
            "wrong_ans": "웬지 기분이 좋다",
            "explanation": "'왠지'는 '왜인지'의 준말입니다."
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, QuestionId::from(3u64));
        assert_eq!(q.correct_answer, "왠지 기분이 좋다");
        assert_eq!(q.wrong_answer.as_deref(), Some("웬지 기분이 좋다"));
        assert_eq!(q.difficulty, 1);
        assert!(q.span.is_none());
    }

    #[test]
    fn question_parses_sentence_pair_shape() {
        let json = r#"{
            "question_id": "17",
            "wrong_sentence": "문을 잠궜다",
            "right_sentence": "문을 잠갔다",
            "category_id": "ending_confusion",
            "difficulty_level": 9,
            "wrong_word": "잠궜다",
            "right_word": "잠갔다",
            "location": 2,
            "explanation": ""
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.prompt, "문을 잠궜다");
        assert_eq!(q.correct_answer, "문을 잠갔다");
        assert_eq!(q.category.as_deref(), Some("ending_confusion"));
        assert_eq!(q.difficulty, 5);
        let span = q.span.unwrap();
        assert_eq!(span.offset, 2);
        assert_eq!(span.right_word, "잠갔다");
    }

    #[test]
    fn question_without_answer_is_rejected() {
        let json = r#"{"question_id": 1, "question": "?"}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }

    #[test]
    fn verify_response_flattens_user_info() {
        let json = r#"{
            "is_valid": true,
            "user_info": {"google_id": "g1", "email": "a@b.c", "name": "길동", "gender": true}
        }"#;
        let resp: VerifyResponse = serde_json::from_str(json).unwrap();
        let user = resp.user();
        assert_eq!(user.display_name, "길동");
        assert_eq!(user.google_id, "g1");
        assert_eq!(user.gender, None);
    }

    #[test]
    fn history_row_decodes_with_encoding() {
        let json = r#"{"question_id": 4, "created_at": "2024-02-19T15:30:00", "correct": 0}"#;
        let row: HistoryRow = serde_json::from_str(json).unwrap();
        let item = StudyHistoryItem::from_row(row.clone(), CorrectnessEncoding::ZeroIsCorrect);
        assert!(item.is_correct);
        assert!(item.timestamp.is_some());
        let item = StudyHistoryItem::from_row(row, CorrectnessEncoding::OneIsCorrect);
        assert!(!item.is_correct);
    }

    #[test]
    fn question_stats_shapes() {
        let wrapped = r#"{"question_stats": {"correct_rate": 0.5, "avg_time_spent": 12.0, "dropout_rate": 0.1, "total_attempts": 8, "daily_stats": {"2024-05-01": {"attempts": 3, "correct_rate": 0.66}}}}"#;
        let stats: QuestionStatsPayload = serde_json::from_str(wrapped).unwrap();
        let stats = stats.into_stats(CorrectnessEncoding::Boolean);
        assert_eq!(stats.total_attempts, 8);
        assert_eq!(stats.daily_stats.len(), 1);

        let attempts = r#"{"question_stats": [
            {"created_at": "2024-05-01T10:00:00", "correct": 0},
            {"created_at": "2024-05-01T11:00:00", "correct": 1},
            {"created_at": "2024-05-02T09:00:00", "correct": 0}
        ]}"#;
        let stats: QuestionStatsPayload = serde_json::from_str(attempts).unwrap();
        let stats = stats.into_stats(CorrectnessEncoding::ZeroIsCorrect);
        assert_eq!(stats.total_attempts, 3);
        assert!((stats.correct_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.daily_stats["2024-05-01"].attempts, 2);

        let flat = r#"{"correct_rate": 0.9, "total_attempts": 10}"#;
        let stats: QuestionStatsPayload = serde_json::from_str(flat).unwrap();
        assert_eq!(stats.into_stats(CorrectnessEncoding::Boolean).total_attempts, 10);
    }

    #[test]
    fn string_success_flag_is_accepted() {
        let status: RecommendationStatus =
            serde_json::from_str(r#"{"success": "true", "recommendation": []}"#).unwrap();
        assert!(status.success);
        let status: RecommendationStatus = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!status.success);
    }

    #[test]
    fn user_stats_accuracy_prefers_rows() {
        let json = r#"{
            "current_level": "미",
            "category_stats": {"hanja_confusion": 80, "passive_active": 60},
            "study_states": [
                {"question_id": 1, "correct": 0},
                {"question_id": 2, "correct": 0},
                {"question_id": 3, "correct": 1},
                {"question_id": 4, "correct": 0}
            ]
        }"#;
        let stats: UserStats = serde_json::from_str(json).unwrap();
        assert_eq!(
            stats.accuracy(CorrectnessEncoding::ZeroIsCorrect),
            Some(0.75)
        );
        assert_eq!(stats.category_stats.honorific_casual, 0.0);
        assert_eq!(UserStats::default().accuracy(CorrectnessEncoding::Boolean), None);
    }
}
