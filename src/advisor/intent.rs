//! Intent classifier
//!
//! Maps a free-text question to an [`IntentCategory`] using an ordered rule
//! table. Categories overlap ("hire" and "profit" can appear together), so
//! the first matching rule wins and the order of [`INTENT_RULES`] is part of
//! the contract.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentCategory {
    Runway,
    Hiring,
    Pricing,
    Marketing,
    CashFlow,
    Profit,
    BreakEven,
    Greeting,
    Help,
    Thanks,
    General,
}

/// Finer-grained question shape detected inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubIntent {
    /// No specific cue; the category's default answer
    Overview,
    /// "how long", "survive"
    Duration,
    /// "what", "mean"
    Meaning,
    /// "positive", "good"
    Status,
    /// "improve", "better", "fix", "increase"
    Improve,
    /// "when", "time"
    Timeline,
    /// "how", "achieve"
    HowTo,
    /// Open question ("what", "how", "why") with no category match
    Question,
}

/// Ordered keyword rules; first hit wins
pub const INTENT_RULES: &[(IntentCategory, &[&str])] = &[
    (IntentCategory::Runway, &["runway", "survive", "how long", "cash last"]),
    (IntentCategory::Hiring, &["hire", "engineer", "team", "staff", "employee"]),
    (IntentCategory::Pricing, &["price", "pricing", "cost", "charge"]),
    (IntentCategory::Marketing, &["marketing", "advertising", "promotion", "campaign"]),
    (IntentCategory::CashFlow, &["cash flow", "improve", "optimize", "better"]),
    (IntentCategory::Profit, &["profit", "margin", "profitability", "money"]),
    (IntentCategory::BreakEven, &["break even", "break-even", "breakeven", "profitable"]),
    (IntentCategory::Greeting, &["hello", "hi", "hey"]),
    (IntentCategory::Help, &["help", "what can you do"]),
    (IntentCategory::Thanks, &["thank", "thanks"]),
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Whether a break-even question names the break-even point itself
/// ("when", "break even") as opposed to only mentioning profitability
pub fn asks_for_break_even_point(query: &str) -> bool {
    contains_any(&query.to_lowercase(), &["when", "break even", "break-even"])
}

/// Classify a question. Matching is case-insensitive substring search.
pub fn classify_intent(query: &str) -> IntentCategory {
    let lowered = query.to_lowercase();

    INTENT_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&lowered, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(IntentCategory::General)
}

/// Detect the sub-intent a category's responder branches on
pub fn detect_sub_intent(category: IntentCategory, query: &str) -> SubIntent {
    let q = query.to_lowercase();

    match category {
        IntentCategory::Runway => {
            if contains_any(&q, &["how long", "survive"]) {
                SubIntent::Duration
            } else if contains_any(&q, &["what", "mean"]) {
                SubIntent::Meaning
            } else {
                SubIntent::Overview
            }
        }
        IntentCategory::CashFlow => {
            if contains_any(&q, &["positive", "good"]) {
                SubIntent::Status
            } else if contains_any(&q, &["improve", "better", "fix"]) {
                SubIntent::Improve
            } else {
                SubIntent::Overview
            }
        }
        IntentCategory::Profit => {
            if q.contains("what") && q.contains("margin") {
                SubIntent::Meaning
            } else if contains_any(&q, &["improve", "increase"]) {
                SubIntent::Improve
            } else {
                SubIntent::Overview
            }
        }
        IntentCategory::BreakEven => {
            if contains_any(&q, &["when", "time"]) {
                SubIntent::Timeline
            } else if contains_any(&q, &["how", "achieve"]) {
                SubIntent::HowTo
            } else {
                SubIntent::Overview
            }
        }
        IntentCategory::General => {
            if contains_any(&q, &["what", "how", "why"]) {
                SubIntent::Question
            } else {
                SubIntent::Overview
            }
        }
        IntentCategory::Hiring
        | IntentCategory::Pricing
        | IntentCategory::Marketing
        | IntentCategory::Greeting
        | IntentCategory::Help
        | IntentCategory::Thanks => SubIntent::Overview,
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentCategory::Runway => "runway",
            IntentCategory::Hiring => "hiring",
            IntentCategory::Pricing => "pricing",
            IntentCategory::Marketing => "marketing",
            IntentCategory::CashFlow => "cash-flow",
            IntentCategory::Profit => "profit",
            IntentCategory::BreakEven => "break-even",
            IntentCategory::Greeting => "greeting",
            IntentCategory::Help => "help",
            IntentCategory::Thanks => "thanks",
            IntentCategory::General => "general",
        };
        write!(f, "{}", s)
    }
}
