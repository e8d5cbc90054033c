use crate::{
    error::RuntimeError,
    event::S3Event,
    messages,
    services::{notify_best_effort, Notifier},
};
use lambda_runtime::LambdaEvent;

/// `handle_query_results` is the Lambda function entry point
/// that receives query result notifications from S3.
///
/// Athena only writes results for queries that succeeded, so the object
/// showing up is all the proof of success there is.
#[tracing::instrument(skip(notifier, event))]
pub async fn handle_query_results(
    notifier: &dyn Notifier,
    event: LambdaEvent<S3Event>,
) -> Result<(), RuntimeError> {
    for record in &event.payload.records {
        let bucket = &record.s3.bucket.name;
        let key = record.s3.object.decoded_key()?;
        tracing::info!(%bucket, %key, "query results are available");

        notify_best_effort(notifier, &messages::query_completed(bucket, &key)).await;
    }
    Ok(())
}
