//! Model and search doubles for node tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::DebateSettings;
use crate::debate::context::NodeContext;
use crate::error::{ModelError, SearchError};
use crate::llm::{ModelClient, ModelResponse};
use crate::retry::RetryPolicy;
use crate::search::{ProviderId, RawSearchItem, SearchProvider, SearchRouter};

struct Rule {
    needle: String,
    replies: VecDeque<Result<String, ModelError>>,
}

/// Replies chosen by the first rule whose needle occurs in the prompt
///
/// Replies queued on one needle are used in order; the last one repeats.
/// Prompts matching no rule fail.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    rules: Arc<Mutex<Vec<Rule>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, needle: &str, reply: Result<String, ModelError>) -> Self {
        {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter_mut().find(|r| r.needle == needle) {
                Some(rule) => rule.replies.push_back(reply),
                None => rules.push(Rule {
                    needle: needle.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    pub fn reply_when(self, needle: &str, reply: &str) -> Self {
        self.push(needle, Ok(reply.to_string()))
    }

    pub fn fail_when(self, needle: &str) -> Self {
        self.push(needle, Err(ModelError::Completion("scripted failure".into())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn invoke(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut rules = self.rules.lock().unwrap();
        let Some(rule) = rules.iter_mut().find(|r| prompt.contains(&r.needle)) else {
            return Err(ModelError::Completion("no scripted reply".into()));
        };
        let reply = if rule.replies.len() > 1 {
            rule.replies.pop_front()
        } else {
            rule.replies.front().cloned()
        };
        match reply {
            Some(Ok(content)) => Ok(ModelResponse::new(content)),
            Some(Err(e)) => Err(e),
            None => Err(ModelError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn failing_model() -> ScriptedModel {
    ScriptedModel::new()
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

    fn as_secondary(mut self) -> Self {
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

/// Context whose router tries `primary`, then a failing secondary
pub fn context(model: impl ModelClient + 'static, primary: StaticSearch) -> NodeContext {
    let router = SearchRouter::new(
        Arc::new(primary),
        Arc::new(StaticSearch::failing().as_secondary()),
    )
    .with_retry(RetryPolicy::no_retry());
    NodeContext::new(Arc::new(model), Arc::new(router), DebateSettings::instant())
}
