use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tickstore_core::{Point, Query, QueryKind, Row, TickstoreError, TimeSeriesBackend};

/// Instruction for how a backend call should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(TickstoreError),
    /// Hang indefinitely (simulate a stalled backend).
    Hang,
}

/// Query shape a behavior applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Latest-ticker queries.
    Latest,
    /// Chart queries.
    Chart,
}

impl QueryShape {
    fn of(query: &Query) -> Option<Self> {
        match query.kind() {
            QueryKind::Latest => Some(Self::Latest),
            QueryKind::Chart { .. } => Some(Self::Chart),
            _ => None,
        }
    }
}

#[derive(Default)]
struct InternalState {
    latest: Option<MockBehavior<Vec<Row>>>,
    chart: Option<MockBehavior<Vec<Row>>>,
    write: Option<MockBehavior<()>>,
    close: Option<MockBehavior<()>>,
    queries: Vec<(String, Query)>,
    writes: Vec<(String, Point)>,
    close_calls: usize,
}

/// Controller handle used by tests to script a [`ScriptedBackend`] and inspect its calls.
#[derive(Clone)]
pub struct ScriptController {
    state: Arc<Mutex<InternalState>>,
}

impl ScriptController {
    /// Set the behavior for queries of the given shape.
    pub async fn set_query_behavior(&self, shape: QueryShape, behavior: MockBehavior<Vec<Row>>) {
        let mut guard = self.state.lock().await;
        match shape {
            QueryShape::Latest => guard.latest = Some(behavior),
            QueryShape::Chart => guard.chart = Some(behavior),
        }
    }

    /// Set the behavior for `write` calls.
    pub async fn set_write_behavior(&self, behavior: MockBehavior<()>) {
        self.state.lock().await.write = Some(behavior);
    }

    /// Set the behavior for `close` calls.
    pub async fn set_close_behavior(&self, behavior: MockBehavior<()>) {
        self.state.lock().await.close = Some(behavior);
    }

    /// Every query received so far, with its target database.
    pub async fn queries(&self) -> Vec<(String, Query)> {
        self.state.lock().await.queries.clone()
    }

    /// Every point written so far, with its target database.
    pub async fn writes(&self) -> Vec<(String, Point)> {
        self.state.lock().await.writes.clone()
    }

    /// How many times `close` was called.
    pub async fn close_calls(&self) -> usize {
        self.state.lock().await.close_calls
    }

    /// Clear all configured behaviors and call logs.
    pub async fn clear_all(&self) {
        *self.state.lock().await = InternalState::default();
    }
}

/// A backend whose every answer is scripted through a [`ScriptController`].
///
/// Unscripted queries return no rows; unscripted writes and closes succeed.
pub struct ScriptedBackend {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl ScriptedBackend {
    /// Create a scripted backend reporting `name`, and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn TimeSeriesBackend>, ScriptController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = ScriptController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn TimeSeriesBackend>, controller)
    }
}

async fn play<T>(behavior: Option<MockBehavior<T>>, default: T) -> Result<T, TickstoreError> {
    match behavior {
        Some(MockBehavior::Return(v)) => Ok(v),
        Some(MockBehavior::Fail(e)) => Err(e),
        Some(MockBehavior::Hang) => std::future::pending().await,
        None => Ok(default),
    }
}

#[async_trait]
impl TimeSeriesBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write(&self, point: &Point, database: &str) -> Result<(), TickstoreError> {
        // Snapshot the behavior without holding the lock across the await below.
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.writes.push((database.to_string(), point.clone()));
            guard.write.clone()
        };
        play(behavior, ()).await
    }

    async fn query(&self, query: &Query, database: &str) -> Result<Vec<Row>, TickstoreError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.queries.push((database.to_string(), query.clone()));
            match QueryShape::of(query) {
                Some(QueryShape::Latest) => guard.latest.clone(),
                Some(QueryShape::Chart) => guard.chart.clone(),
                None => Some(MockBehavior::Fail(TickstoreError::backend(
                    self.name,
                    "unsupported query",
                ))),
            }
        };
        play(behavior, Vec::new()).await
    }

    async fn close(&self) -> Result<(), TickstoreError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.close_calls += 1;
            guard.close.clone()
        };
        play(behavior, ()).await
    }
}
