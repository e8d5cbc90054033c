//! Seams between the workflow and the AWS services it delegates to.
use crate::{
    copy_job::CopyJobSpec,
    error::RuntimeError,
    event::QueryInvocation,
    job::{JobTag, WorkflowJob},
    token::IdempotencyToken,
};
use async_trait::async_trait;

/// Bulk copy jobs, run by S3 Batch Operations.
#[async_trait]
pub trait CopyJobService: Send + Sync {
    /// Submit a new job and return its id
    async fn create_job(&self, spec: &CopyJobSpec) -> Result<String, RuntimeError>;

    /// Describe an existing job
    async fn describe_job(&self, job_id: &str) -> Result<WorkflowJob, RuntimeError>;

    /// Tags attached to an existing job
    async fn job_tags(&self, job_id: &str) -> Result<Vec<JobTag>, RuntimeError>;
}

/// `QueryExecution` is a query ready to be submitted
#[derive(Clone, Debug, PartialEq)]
pub struct QueryExecution {
    /// SQL text
    pub query: String,
    /// Data catalog
    pub catalog: String,
    /// Database the query runs against
    pub database: String,
    /// Workgroup that runs the query
    pub workgroup: String,
    /// Deduplication key of the execution request
    pub token: IdempotencyToken,
}

/// Asynchronous query execution, run by Athena.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Start a query and return its execution id
    async fn start_query(&self, execution: &QueryExecution) -> Result<String, RuntimeError>;
}

/// Operator notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a message to the operator
    async fn notify(&self, message: &str) -> Result<(), RuntimeError>;
}

/// Hand-off to the query function.
#[async_trait]
pub trait QueryTrigger: Send + Sync {
    /// Ask the query function to run its query
    async fn trigger(&self, invocation: &QueryInvocation) -> Result<(), RuntimeError>;
}

/// Notifications are best effort: failures are logged and never stop the workflow.
pub async fn notify_best_effort(notifier: &dyn Notifier, message: &str) {
    tracing::info!(notification = message, "sending notification");
    if let Err(err) = notifier.notify(message).await {
        tracing::error!(error = %err, "failed to send notification");
    }
}
