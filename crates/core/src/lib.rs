pub mod config;
pub mod diagnosis;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod snapshot;
pub mod validate;

pub use config::AppConfig;
pub use diagnosis::{
    ChecklistItem, DiagnosisResult, Impact, Issue, ModelConfig, QUICK_WIN_COUNT, QuickWin, ScoreBreakdown,
    TOP_ISSUE_COUNT, request_diagnosis,
};
pub use error::{PagePulseError, Result};
pub use extract::{ExtractConfig, ExtractedContent, TRUNCATION_MARKER, extract_content, normalize_whitespace};
pub use fetch::{FetchConfig, fetch_url, validate_url};
pub use parse::{Document, Element};
pub use pipeline::diagnose_url;
pub use snapshot::{PageSnapshot, build_snapshot};
pub use validate::validate_response;
