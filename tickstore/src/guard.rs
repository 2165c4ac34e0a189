use tickstore_core::{Query, Row, TickstoreError, TimeSeriesBackend};

/// Attribute a backend failure to `backend`, leaving already-tagged errors untouched.
pub fn tag_err(backend: &str, e: TickstoreError) -> TickstoreError {
    match e {
        e @ TickstoreError::Backend { .. } => e,
        other => TickstoreError::backend(backend, other.to_string()),
    }
}

/// Fault boundary around one backend query and the decoding of its rows.
///
/// Every failure, whether from the backend or from decoding, comes back as a
/// `TickstoreError` and is logged once here with the query text.
pub(crate) struct QueryGuard<'a> {
    backend: &'a dyn TimeSeriesBackend,
    database: &'a str,
}

impl<'a> QueryGuard<'a> {
    pub(crate) const fn new(backend: &'a dyn TimeSeriesBackend, database: &'a str) -> Self {
        Self { backend, database }
    }

    pub(crate) async fn run<T, F>(&self, query: &Query, decode: F) -> Result<T, TickstoreError>
    where
        F: FnOnce(Vec<Row>) -> Result<T, TickstoreError>,
    {
        tracing::debug!(backend = self.backend.name(), query = %query, "executing query");
        let outcome = match self.backend.query(query, self.database).await {
            Ok(rows) => decode(rows),
            Err(e) => Err(tag_err(self.backend.name(), e)),
        };
        match &outcome {
            Err(e @ TickstoreError::NotFound { .. }) => {
                tracing::debug!(error = %e, query = %query, "query returned nothing");
            }
            Err(e) => {
                tracing::error!(
                    backend = self.backend.name(),
                    error = %e,
                    query = %query,
                    "query failed"
                );
            }
            Ok(_) => {}
        }
        outcome
    }
}
