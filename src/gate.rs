//! Decides what a stack change needs: a new copy of the logs, or only a new query.
use crate::{
    config::BatchCopyConfig,
    copy_job::submit_copy_job,
    error::RuntimeError,
    event::{LogCopyProperties, QueryInvocation, StackEvent, StackResponse},
    messages,
    services::{notify_best_effort, CopyJobService, Notifier, QueryTrigger},
    token::IdempotencyToken,
    window::{format_date, TimeWindow},
};
use chrono::{NaiveDate, Utc};
use lambda_runtime::LambdaEvent;

const SUCCESSFUL: &str = "Successful";
const COMPLETED: &str = "Completed";

/// `GateOutcome` is the action taken for a stack event
#[derive(Clone, Debug, PartialEq)]
pub enum GateOutcome {
    /// A copy job was submitted
    CopySubmitted(String),
    /// The logs were already copied, only the query runs again
    QueryTriggered(IdempotencyToken),
    /// The stack is going away, logs are left in place
    Removed,
}

/// `handle_stack_event` is the Lambda function entry point
/// that receives the custom resource requests from CloudFormation
#[tracing::instrument(skip(config, jobs, notifier, trigger, event))]
pub async fn handle_stack_event(
    config: &BatchCopyConfig,
    jobs: &dyn CopyJobService,
    notifier: &dyn Notifier,
    trigger: &dyn QueryTrigger,
    event: LambdaEvent<StackEvent>,
) -> Result<StackResponse, RuntimeError> {
    let today = Utc::now().date_naive();
    let outcome = apply_stack_event(config, jobs, notifier, trigger, &event.payload, today).await?;

    let message = match outcome {
        GateOutcome::Removed => COMPLETED,
        GateOutcome::CopySubmitted(_) | GateOutcome::QueryTriggered(_) => SUCCESSFUL,
    };
    tracing::info!(response = message, "sending response to cloudformation");

    Ok(StackResponse {
        message: message.into(),
    })
}

/// Apply a stack event, resolving relative windows against `today`.
pub async fn apply_stack_event(
    config: &BatchCopyConfig,
    jobs: &dyn CopyJobService,
    notifier: &dyn Notifier,
    trigger: &dyn QueryTrigger,
    event: &StackEvent,
    today: NaiveDate,
) -> Result<GateOutcome, RuntimeError> {
    match event {
        StackEvent::Create { properties } => {
            let window = properties.window(today)?;
            log_window("stack created, copying logs", properties, &window);

            // give the resources created with the stack time to settle
            tokio::time::sleep(config.settle_delay).await;

            let job_id = submit_copy_job(jobs, &config.copy, properties, window).await?;
            Ok(GateOutcome::CopySubmitted(job_id))
        }
        StackEvent::Update {
            properties,
            old_properties,
        } => {
            let window = properties.window(today)?;
            let previous = old_properties.window(today)?;

            if TimeWindow::requires_copy(&previous, &window) {
                log_window("window grew past the copied logs, copying again", properties, &window);
                let job_id = submit_copy_job(jobs, &config.copy, properties, window).await?;
                return Ok(GateOutcome::CopySubmitted(job_id));
            }

            log_window("logs already copied, skipping to the query", properties, &window);
            notify_best_effort(notifier, messages::STARTING_QUERY).await;

            let token = IdempotencyToken::fresh();
            trigger.trigger(&QueryInvocation::new(&token)).await?;
            tracing::info!(%token, "query function triggered");

            Ok(GateOutcome::QueryTriggered(token))
        }
        StackEvent::Delete { .. } => {
            tracing::info!("stack deleted, nothing to do");
            Ok(GateOutcome::Removed)
        }
    }
}

fn log_window(message: &str, properties: &LogCopyProperties, window: &TimeWindow) {
    tracing::info!(
        bucket = %properties.logs_bucket,
        prefix = ?properties.source_prefix(),
        after = ?window.created_after.as_ref().map(format_date),
        before = ?window.created_before.as_ref().map(format_date),
        "{message}"
    );
}
