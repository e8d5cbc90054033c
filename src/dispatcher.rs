//! Resolves the configured analysis to a query and hands it to Athena.
use crate::{
    config::QueryConfig,
    error::RuntimeError,
    event::{QueryInvocation, QueryResponse},
    query::{build_query, QueryScope},
    services::{QueryExecution, QueryService},
    token::IdempotencyToken,
};
use lambda_runtime::LambdaEvent;

const INVOCATION_BODY: &str = "Successful Invocation!";

/// `DispatchOutcome` is the result of a dispatch attempt
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// Athena accepted the query
    Submitted(String),
    /// There is no query for the configured analysis type
    NoOp,
    /// Athena refused the query, the reason was logged
    Rejected,
}

/// `handle_query_invocation` is the Lambda function entry point
/// invoked by the other stages to run the configured query
#[tracing::instrument(skip(config, queries, event))]
pub async fn handle_query_invocation(
    config: &QueryConfig,
    queries: &dyn QueryService,
    event: LambdaEvent<QueryInvocation>,
) -> Result<QueryResponse, RuntimeError> {
    let token = match event.payload.idempotency_token.as_deref() {
        Some(token) if !token.is_empty() => IdempotencyToken::from_fingerprint(token),
        _ => {
            tracing::warn!("invocation carries no idempotency token, using a fresh one");
            IdempotencyToken::fresh()
        }
    };

    let query_execution_id = match dispatch_query(config, queries, token).await {
        DispatchOutcome::Submitted(id) => Some(id),
        DispatchOutcome::NoOp | DispatchOutcome::Rejected => None,
    };

    Ok(QueryResponse {
        status_code: 200,
        body: INVOCATION_BODY.into(),
        query_execution_id,
    })
}

/// Submit the query for the configured analysis type.
///
/// Never fails: an unknown analysis type and a rejected submission are
/// both logged and reported through the outcome.
#[tracing::instrument(skip(config, queries), fields(analysis_type = %config.analysis_type))]
pub async fn dispatch_query(
    config: &QueryConfig,
    queries: &dyn QueryService,
    token: IdempotencyToken,
) -> DispatchOutcome {
    let scope = QueryScope {
        database: &config.database,
        table: &config.table,
        bucket: config.bucket_scope.as_deref(),
        window: &config.window,
    };

    let query = match build_query(config.log_source, &config.analysis_type, &scope) {
        Some(query) => query,
        None => {
            tracing::info!(log_source = ?config.log_source, "no query for this analysis type, nothing to do");
            return DispatchOutcome::NoOp;
        }
    };

    let execution = QueryExecution {
        query,
        catalog: config.catalog.clone(),
        database: config.database.clone(),
        workgroup: config.workgroup.clone(),
        token,
    };
    tracing::info!(query = %execution.query, "starting athena query");

    match queries.start_query(&execution).await {
        Ok(id) => {
            tracing::info!(query_execution_id = %id, "athena query started");
            DispatchOutcome::Submitted(id)
        }
        Err(err) => {
            tracing::error!(error = %err, "athena rejected the query");
            DispatchOutcome::Rejected
        }
    }
}
