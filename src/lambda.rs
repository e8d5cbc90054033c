use crate::{error::RuntimeError, event::QueryInvocation, services::QueryTrigger};
use async_trait::async_trait;
use aws_sdk_lambda::{primitives::Blob, types::InvocationType, Client, Error};

/// Triggers the query function through the Lambda API.
///
/// Invocations are asynchronous: Lambda queues the event and retries
/// it on failure, the caller never waits for the query to be submitted.
pub struct LambdaQueryTrigger {
    inner: Client,
    function_name: String,
}

impl LambdaQueryTrigger {
    /// Initialize the trigger for the query function.
    #[tracing::instrument(skip(config))]
    pub fn new(config: &aws_types::SdkConfig, function_name: &str) -> LambdaQueryTrigger {
        tracing::info!("Initializing Lambda client");
        LambdaQueryTrigger {
            inner: Client::new(config),
            function_name: function_name.into(),
        }
    }
}

#[async_trait]
impl QueryTrigger for LambdaQueryTrigger {
    #[tracing::instrument(skip(self))]
    async fn trigger(&self, invocation: &QueryInvocation) -> Result<(), RuntimeError> {
        let payload = serde_json::to_vec(invocation)?;

        let res = self
            .inner
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(Error::from)?;

        tracing::info!(status_code = res.status_code(), "query function invoked");
        check_function_error(&self.function_name, res.function_error())
    }
}

fn check_function_error(function: &str, error: Option<&str>) -> Result<(), RuntimeError> {
    match error {
        Some(error) => Err(RuntimeError::FunctionError {
            function: function.into(),
            error: error.into(),
        }),
        None => Ok(()),
    }
}
