//! Data model shared by the session controller, the service client and the
//! front end.
//!
//! Wire-facing types derive `serde` so they decode straight from the analysis
//! service's JSON. Everything here is plain owned data: no handles, no
//! lifetimes, cheap to clone across the event bus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Source languages the analysis service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Cpp,
    Java,
    Csharp,
}

impl Language {
    /// Selector order; `next()` walks this list and wraps.
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::Javascript,
        Language::Cpp,
        Language::Java,
        Language::Csharp,
    ];

    /// Value sent on the wire and accepted in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Csharp => "csharp",
        }
    }

    /// Human-readable label for the language selector.
    pub fn label(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Javascript => "JavaScript",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::Csharp => "C#",
        }
    }

    /// File extension used for the editor title and syntax lookup.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Javascript => "js",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Csharp => "cs",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported language.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}' (expected one of python, javascript, cpp, java, csharp)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLanguage(s.to_owned()))
    }
}

/// The text being reviewed plus its language. Edited only by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub text: String,
    pub language: Language,
}

/// Sample function loaded into a fresh session.
pub const SAMPLE_SOURCE: &str = "def find_duplicate(nums):
    # Analyze this Bad Logic!
    # This nested loop is O(n^2)
    for i in range(len(nums)):
        for j in range(i + 1, len(nums)):
            if nums[i] == nums[j]:
                return nums[i]
    return -1";

impl Default for SourceDocument {
    fn default() -> Self {
        Self { text: SAMPLE_SOURCE.to_owned(), language: Language::default() }
    }
}

/// Immutable snapshot of the document taken when analysis is requested.
///
/// Later edits never reach an in-flight or completed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub code: String,
    pub language: Language,
}

impl From<&SourceDocument> for AnalysisRequest {
    fn from(doc: &SourceDocument) -> Self {
        Self { code: doc.text.clone(), language: doc.language }
    }
}

/// One analysed block as located by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    pub function_name: String,
    /// 1-based, inclusive.
    pub start_line: usize,
    /// 1-based, inclusive.
    pub end_line: usize,
    /// Verbatim source slice the service analysed.
    pub code: String,
}

impl BlockMeta {
    pub fn id(&self) -> BlockId {
        BlockId {
            function_name: self.function_name.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
        }
    }
}

/// Stable identity of a block: name plus line range.
///
/// Two blocks with the same name but different ranges are distinct. Array
/// position is deliberately not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    pub function_name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}-{}", self.function_name, self.start_line, self.end_line)
    }
}

/// Issue severity. The service sends free-form strings, so unknown values are
/// kept rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Other(String),
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Other(raw),
        }
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_owned()
    }
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_type: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub fix_suggestion: Option<String>,
}

/// Quality report for one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0 to 10, higher is better.
    pub quality_score: f64,
    pub complexity_estimate: String,
    pub plain_english_explanation: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Score band shared by the gutter marker and the card badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Below 5.
    Poor,
    /// 5 up to (but excluding) 8.
    Fair,
    /// 8 and above.
    Good,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score < 5.0 {
            ScoreBand::Poor
        } else if score < 8.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Good
        }
    }
}

/// One entry of an analysis response. `analysis` is `None` when the service
/// could not analyse that block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub meta: BlockMeta,
    #[serde(default)]
    pub analysis: Option<QualityReport>,
}

/// Ordered result set of one analysis run. Order is the service's order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub results: Vec<AnalysisEntry>,
}

impl AnalysisResult {
    /// Entries that carry a report, in service order. Failed blocks are
    /// skipped without disturbing their neighbours.
    pub fn reports(&self) -> impl Iterator<Item = (&BlockMeta, &QualityReport)> {
        self.results
            .iter()
            .filter_map(|e| e.analysis.as_ref().map(|a| (&e.meta, a)))
    }

    pub fn find(&self, id: &BlockId) -> Option<(&BlockMeta, &QualityReport)> {
        self.reports().find(|(meta, _)| meta.id() == *id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a block's follow-up conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
    /// Set on the synthetic assistant entry appended when a chat call fails.
    /// Local only; never sent to the service.
    #[serde(skip)]
    pub error: bool,
}

impl ConversationEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), error: false }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), error: false }
    }

    pub fn error_notice(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), error: true }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub code_context: String,
    pub language: Language,
    pub history: Vec<ConversationEntry>,
}

/// Thumbs up / thumbs down on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Helpful,
    NotHelpful,
}

impl Rating {
    pub fn value(self) -> i8 {
        match self {
            Rating::Helpful => 1,
            Rating::NotHelpful => -1,
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRequest {
    pub function_name: String,
    pub code: String,
    pub explanation: String,
    pub rating: Rating,
}
