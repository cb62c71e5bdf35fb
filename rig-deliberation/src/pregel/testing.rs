//! Small state and vertex doubles for engine tests

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::state::WorkflowState;
use super::vertex::{StateUpdate, Vertex, VertexId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceState {
    pub visits: Vec<String>,
    pub counter: u32,
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceUpdate {
    pub visits: Option<Vec<String>>,
    pub counter: Option<u32>,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl StateUpdate for TraceUpdate {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.written_fields().is_empty()
    }

    fn written_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.visits.is_some() {
            fields.push("visits");
        }
        if self.counter.is_some() {
            fields.push("counter");
        }
        if self.left.is_some() {
            fields.push("left");
        }
        if self.right.is_some() {
            fields.push("right");
        }
        fields
    }
}

impl WorkflowState for TraceState {
    type Update = TraceUpdate;

    fn apply_update(&self, update: TraceUpdate) -> Self {
        let mut next = self.clone();
        if let Some(visits) = update.visits {
            next.visits = visits;
        }
        if let Some(counter) = update.counter {
            next.counter = counter;
        }
        if update.left.is_some() {
            next.left = update.left;
        }
        if update.right.is_some() {
            next.right = update.right;
        }
        next
    }

    fn merge_updates(updates: Vec<TraceUpdate>) -> TraceUpdate {
        updates
            .into_iter()
            .fold(TraceUpdate::default(), |acc, later| TraceUpdate {
                visits: later.visits.or(acc.visits),
                counter: later.counter.or(acc.counter),
                left: later.left.or(acc.left),
                right: later.right.or(acc.right),
            })
    }
}

type Behavior = Arc<dyn Fn(&TraceState) -> TraceUpdate + Send + Sync>;

pub struct TestVertex {
    id: VertexId,
    fields: &'static [&'static str],
    behavior: Behavior,
    delay: Option<Duration>,
    fallback: Option<TraceUpdate>,
}

impl TestVertex {
    pub fn new(
        id: &str,
        fields: &'static [&'static str],
        behavior: impl Fn(&TraceState) -> TraceUpdate + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: VertexId::from(id),
            fields,
            behavior: Arc::new(behavior),
            delay: None,
            fallback: None,
        }
    }

    /// Appends its own id to `visits`
    pub fn visit(id: &str) -> Self {
        let name = id.to_string();
        Self::new(id, &["visits"], move |state| {
            let mut visits = state.visits.clone();
            visits.push(name.clone());
            TraceUpdate {
                visits: Some(visits),
                ..Default::default()
            }
        })
    }

    /// Appends its id and increments `counter`
    pub fn count(id: &str) -> Self {
        let name = id.to_string();
        Self::new(id, &["visits", "counter"], move |state| {
            let mut visits = state.visits.clone();
            visits.push(name.clone());
            TraceUpdate {
                visits: Some(visits),
                counter: Some(state.counter + 1),
                ..Default::default()
            }
        })
    }

    pub fn writes_left(id: &str, value: &str) -> Self {
        let value = value.to_string();
        Self::new(id, &["left"], move |_| TraceUpdate {
            left: Some(value.clone()),
            ..Default::default()
        })
    }

    pub fn writes_right(id: &str, value: &str) -> Self {
        let value = value.to_string();
        Self::new(id, &["right"], move |_| TraceUpdate {
            right: Some(value.clone()),
            ..Default::default()
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_fallback(mut self, update: TraceUpdate) -> Self {
        self.fallback = Some(update);
        self
    }
}

#[async_trait]
impl Vertex<TraceState, ()> for TestVertex {
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn output_fields(&self) -> &'static [&'static str] {
        self.fields
    }

    async fn compute(&self, state: &TraceState, _ctx: &()) -> TraceUpdate {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.behavior)(state)
    }

    fn fallback(&self, _state: &TraceState) -> TraceUpdate {
        self.fallback.clone().unwrap_or_default()
    }
}
