//! CFO Helper
//!
//! Scenario engine and advisor for early-stage business finances:
//! - Derives revenue, expenses, runway and margins from five scenario inputs
//! - Projects a six-month cash forecast with bounded revenue jitter
//! - Answers finance questions with rule-based advice, optionally fronted by
//!   an external chat-completion responder with automatic fallback
//! - Tracks pay-per-use billing and exports scenario reports
//!
//! FLOW:
//! INPUT → METRICS → FORECAST → ADVICE / REPORT → BILLING

pub mod advisor;
pub mod api;
pub mod billing;
pub mod config;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod llm;
pub mod models;
pub mod report;
pub mod session;

pub use error::{AdvisorError, Result};

// Re-export common types
pub use advisor::{Advisor, AdvisorReply, IntentCategory};
pub use engine::{compute_metrics, generate_forecast};
pub use models::*;
pub use session::Session;
