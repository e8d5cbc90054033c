#![deny(missing_docs)]
//! <fullname>S3 troubleshooting tool</fullname>
//!
//! Lambda functions that copy S3 server access logs or CloudTrail logs
//! into a working bucket with S3 Batch Operations, run a troubleshooting
//! query over them with Athena, and tell the operator through SNS how
//! every stage went.
//!
//! Each stage runs as its own function, woken up by an S3 object
//! creation event, a CloudFormation custom resource request, or an
//! asynchronous invocation from the previous stage.

pub mod config;
pub mod dispatcher;
pub mod gate;
pub mod messages;
pub mod query;
pub mod services;
pub mod tracker;

/// Log sources and the analyses that can run over them
pub mod analysis;
/// Copy job requests sent to S3 Batch Operations
pub mod copy_job;
/// Error type shared by every function
pub mod error;
/// Payloads received and returned by the functions
pub mod event;
/// Copy jobs as seen by the workflow
pub mod job;
/// Query result notifications
pub mod report;
/// Deduplication tokens
pub mod token;
/// Creation time windows of the logs
pub mod window;

/// AWS SDK implementation of the Athena seam
pub mod athena;
/// AWS SDK implementation of the query function trigger
pub mod lambda;
/// AWS SDK implementation of the Batch Operations seam
pub mod s3control;
/// AWS SDK implementation of the operator notifications
pub mod sns;

#[cfg(test)]
mod test_util;

pub use athena::AthenaClient;
pub use dispatcher::handle_query_invocation;
pub use error::RuntimeError;
pub use gate::handle_stack_event;
pub use lambda::LambdaQueryTrigger;
pub use report::handle_query_results;
pub use s3control::BatchOpsClient;
pub use sns::SnsNotifier;
pub use tracker::handle_job_report;

/// Install the log subscriber used by every function.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();
}
