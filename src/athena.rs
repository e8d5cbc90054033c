use crate::{
    error::RuntimeError,
    services::{QueryExecution, QueryService},
};
use async_trait::async_trait;
use aws_sdk_athena::{types::QueryExecutionContext, Client, Error};

/// Athena client implementation.
pub struct AthenaClient {
    inner: Client,
}

impl AthenaClient {
    /// Initialize the Athena client.
    #[tracing::instrument(skip(config))]
    pub fn new(config: &aws_types::SdkConfig) -> AthenaClient {
        tracing::info!("Initializing Athena client");
        AthenaClient {
            inner: Client::new(config),
        }
    }
}

#[async_trait]
impl QueryService for AthenaClient {
    #[tracing::instrument(skip(self, execution), fields(token = %execution.token))]
    async fn start_query(&self, execution: &QueryExecution) -> Result<String, RuntimeError> {
        let context = QueryExecutionContext::builder()
            .catalog(&execution.catalog)
            .database(&execution.database)
            .build();

        let res = self
            .inner
            .start_query_execution()
            .query_string(&execution.query)
            .client_request_token(execution.token.as_str())
            .query_execution_context(context)
            .work_group(&execution.workgroup)
            .send()
            .await
            .map_err(Error::from)?;

        res.query_execution_id()
            .map(String::from)
            .ok_or_else(|| RuntimeError::MissingField("QueryExecutionId".into()))
    }
}
