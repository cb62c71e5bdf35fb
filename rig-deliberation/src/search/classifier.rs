//! Query classification
//!
//! Two classifiers share one output shape: a keyword rule set that is pure and
//! instant, and a model-backed classifier for richer telemetry. Neither ever
//! blocks a search; the model classifier degrades to `general` on any failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::QueryCategory;
use crate::llm::{extract_structured, ModelClient};

/// Keyword sets in priority order; the first category with a match wins
const KEYWORD_RULES: &[(QueryCategory, &[&str])] = &[
    (
        QueryCategory::FinanceData,
        &[
            "股价", "股票", "基金", "净值", "行情", "价格", "涨", "跌", "市值", "市盈率", "收益率",
            "黄金", "原油", "期货", "stock", "fund", "price", "share", "market cap", "p/e",
        ],
    ),
    (
        QueryCategory::FinanceNews,
        &[
            "新闻", "资讯", "动态", "报道", "公告", "财报", "业绩", "美联储", "央行", "利率", "政策",
            "news", "report", "earnings",
        ],
    ),
    (
        QueryCategory::Academic,
        &[
            "论文", "研究", "学术", "模型", "量化", "实证", "期刊", "paper", "research", "study",
            "model", "empirical", "arxiv",
        ],
    ),
    (
        QueryCategory::Government,
        &[
            "gdp", "cpi", "ppi", "统计局", "证监会", "imf", "世界银行", "政策", "法规", "监管",
            "macro", "policy", "regulation",
        ],
    ),
    (
        QueryCategory::Encyclopedia,
        &[
            "什么是", "什么叫", "定义", "概念", "百科", "解释", "what is", "definition",
            "meaning of", "wiki",
        ],
    ),
    (
        QueryCategory::Community,
        &[
            "怎么看", "怎么样", "如何评价", "观点", "讨论", "reddit", "知乎", "quora", "opinion",
            "thoughts on",
        ],
    ),
];

const KEYWORD_CONFIDENCE: f32 = 0.5;
const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Classify by keyword rules over the lowercased query
pub fn quick_classify(query: &str) -> QueryCategory {
    let lower = query.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

/// Category with confidence and the reason it was chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: QueryCategory,
    pub confidence: f32,
    pub reasoning: String,
}

impl Classification {
    /// Keyword-rule classification
    pub fn quick(query: &str) -> Self {
        Self {
            category: quick_classify(query),
            confidence: KEYWORD_CONFIDENCE,
            reasoning: "keyword rule classification".to_string(),
        }
    }

    /// Category given by the caller
    pub fn explicit(category: QueryCategory) -> Self {
        Self {
            category,
            confidence: 1.0,
            reasoning: "category given by caller".to_string(),
        }
    }

    fn fallback(reason: impl Into<String>) -> Self {
        Self {
            category: QueryCategory::General,
            confidence: FALLBACK_CONFIDENCE,
            reasoning: reason.into(),
        }
    }
}

/// Model-backed classifier
#[derive(Clone)]
pub struct QueryClassifier {
    model: Arc<dyn ModelClient>,
}

impl QueryClassifier {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Ask the model for `{category, confidence, reasoning}`
    pub async fn classify(&self, query: &str) -> Classification {
        let response = match self.model.invoke(&classification_prompt(query)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Query classification call failed");
                return Classification::fallback("classification failed, using default category");
            }
        };

        let parsed = match extract_structured(&response.content) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Query classification output unreadable");
                return Classification::fallback("classification output unreadable, using default category");
            }
        };

        let classification = interpret(&parsed);
        debug!(
            category = %classification.category,
            confidence = classification.confidence,
            "Query classified by model"
        );
        classification
    }
}

fn interpret(value: &Value) -> Classification {
    let category = value
        .get("category")
        .and_then(Value::as_str)
        .and_then(|c| c.parse::<QueryCategory>().ok());

    let Some(category) = category else {
        warn!(raw = ?value.get("category"), "Model returned an unknown category, falling back to general");
        return Classification::fallback("model returned an unknown category");
    };

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0) as f32)
        .unwrap_or(KEYWORD_CONFIDENCE);
    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Classification {
        category,
        confidence,
        reasoning,
    }
}

fn classification_prompt(query: &str) -> String {
    let categories = QueryCategory::ALL
        .iter()
        .map(|c| format!("- {}: {}", c, c.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Classify the following search query into exactly one category.\n\n\
         Query: \"{query}\"\n\n\
         Categories:\n{categories}\n\n\
         Respond with JSON only:\n\
         {{\"category\": \"<category>\", \"confidence\": 0.0-1.0, \"reasoning\": \"<why>\"}}"
    )
}
