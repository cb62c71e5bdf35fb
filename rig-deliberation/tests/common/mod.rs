//! Scripted model and search doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rig_deliberation::search::{ProviderId, RawSearchItem};
use rig_deliberation::{
    DebateSettings, Deliberation, ModelClient, ModelError, ModelResponse, RetryPolicy, SearchError, SearchProvider,
    SearchRouter, Topology,
};

/// Answers the first rule whose needle occurs in the prompt; unmatched prompts fail
#[derive(Clone, Default)]
pub struct ScriptedModel {
    rules: Arc<Mutex<Vec<(String, VecDeque<String>)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply; the last reply queued on a needle repeats
    pub fn reply_when(self, needle: &str, reply: &str) -> Self {
        {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter_mut().find(|(n, _)| n == needle) {
                Some((_, replies)) => replies.push_back(reply.to_string()),
                None => rules.push((needle.to_string(), VecDeque::from([reply.to_string()]))),
            }
        }
        self
    }

    pub fn prompts_containing(&self, needle: &str) -> usize {
        self.prompts.lock().unwrap().iter().filter(|p| p.contains(needle)).count()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn invoke(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut rules = self.rules.lock().unwrap();
        let Some((_, replies)) = rules.iter_mut().find(|(needle, _)| prompt.contains(needle.as_str())) else {
            return Err(ModelError::Completion("no scripted reply".into()));
        };
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.map(ModelResponse::new).ok_or(ModelError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Every piece of a debate answered; the judge reply is supplied per test
pub fn debate_model(verdict: &str) -> ScriptedModel {
    ScriptedModel::new()
        .reply_when("search queries", r#"{"queries": ["ETF definition", "ETF risks"]}"#)
        .reply_when(
            "Summarize",
            r#"{"summary": "ETFs are exchange-traded index funds", "key_facts": ["low fees"], "data_points": []}"#,
        )
        .reply_when("Your position so far", r#"{"rebuttal": "that overlooks the evidence"}"#)
        .reply_when(
            "optimistic analyst. Argue",
            r#"{"thinking": "fees are falling", "answer": "ETFs are a cheap way to diversify"}"#,
        )
        .reply_when(
            "pessimistic analyst. Argue",
            r#"{"thinking": "tracking error", "answer": "ETFs hide liquidity risk"}"#,
        )
        .reply_when("judge of a debate", verdict)
}

/// Provider returning `items` hits per query, or failing every call
#[derive(Clone)]
pub struct StaticSearch {
    id: ProviderId,
    items: Option<usize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticSearch {
    pub fn with_items(items: usize) -> Self {
        Self {
            id: ProviderId::McpWebSearch,
            items: Some(items),
            queries: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            id: ProviderId::McpWebSearch,
            items: None,
            queries: Arc::default(),
        }
    }

    pub fn as_secondary(mut self) -> Self {
        self.id = ProviderId::DuckDuckGo;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn search(&self, query: &str) -> Result<Vec<RawSearchItem>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.items {
            Some(n) => Ok((0..n)
                .map(|i| {
                    RawSearchItem::new(
                        format!("{query} #{i}"),
                        format!("https://example.com/{i}"),
                        format!("About {query}"),
                    )
                })
                .collect()),
            None => Err(SearchError::Unauthorized),
        }
    }
}

/// Router over `primary` with a failing secondary and no retry pauses
pub fn router(primary: StaticSearch) -> Arc<SearchRouter> {
    Arc::new(
        SearchRouter::new(Arc::new(primary), Arc::new(StaticSearch::failing().as_secondary()))
            .with_retry(RetryPolicy::no_retry()),
    )
}

pub fn service(model: ScriptedModel, primary: StaticSearch, settings: DebateSettings, topology: Topology) -> Deliberation {
    Deliberation::with_topology(Arc::new(model), router(primary), settings, topology).unwrap()
}
