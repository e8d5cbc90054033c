//! Follows copy jobs to completion and hands the copied logs to the query stage.
use crate::{
    error::RuntimeError,
    event::{QueryInvocation, S3Event, S3EventRecord},
    job::{job_id_from_report_key, JobStatus},
    messages,
    services::{notify_best_effort, CopyJobService, Notifier, QueryTrigger},
    token::IdempotencyToken,
};
use lambda_runtime::LambdaEvent;
use serde::Serialize;

/// `StageOutcome` is what happened to a single completion report
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum StageOutcome {
    /// The copy job failed as a whole
    CopyFailed {
        /// Job that failed
        job_id: String,
    },
    /// The copy job completed, but every task failed
    AllTasksFailed {
        /// Job that failed
        job_id: String,
    },
    /// The job was not created by this workflow
    Untracked {
        /// Job that was ignored
        job_id: String,
    },
    /// The job is not done yet
    Pending {
        /// Job that is still running
        job_id: String,
    },
    /// The query function was asked to run its query
    QueryTriggered {
        /// Job whose logs will be queried
        job_id: String,
        /// Token the query function submits the query with
        token: String,
    },
}

/// `handle_job_report` is the Lambda function entry point
/// that receives completion report notifications from S3
#[tracing::instrument(skip(jobs, notifier, trigger, event))]
pub async fn handle_job_report(
    jobs: &dyn CopyJobService,
    notifier: &dyn Notifier,
    trigger: &dyn QueryTrigger,
    event: LambdaEvent<S3Event>,
) -> Result<Vec<StageOutcome>, RuntimeError> {
    let mut outcomes = Vec::with_capacity(event.payload.records.len());
    for record in &event.payload.records {
        outcomes.push(advance_stage(jobs, notifier, trigger, record).await?);
    }
    Ok(outcomes)
}

/// Check the state of the job behind a completion report and move the workflow forward.
///
/// This is a state check, not a loop: each report is looked at once and every
/// lookup or invocation failure is returned so that the event source retries it.
#[tracing::instrument(skip(jobs, notifier, trigger, record), fields(key = %record.s3.object.key))]
pub async fn advance_stage(
    jobs: &dyn CopyJobService,
    notifier: &dyn Notifier,
    trigger: &dyn QueryTrigger,
    record: &S3EventRecord,
) -> Result<StageOutcome, RuntimeError> {
    let key = record.s3.object.decoded_key()?;
    let job_id = job_id_from_report_key(&key)?;

    let job = jobs.describe_job(&job_id).await.map_err(|err| {
        tracing::error!(%job_id, error = %err, "unable to describe job");
        err
    })?;
    tracing::info!(
        %job_id,
        status = ?job.status,
        total = job.total_tasks,
        failed = job.tasks_failed,
        "job described"
    );

    if job.status == JobStatus::Failed {
        notify_best_effort(notifier, &messages::copy_job_failed(&job_id)).await;
        return Ok(StageOutcome::CopyFailed { job_id });
    }

    if job.status == JobStatus::Complete && job.all_tasks_failed() {
        notify_best_effort(notifier, &messages::all_tasks_failed(&job_id)).await;
        return Ok(StageOutcome::AllTasksFailed { job_id });
    }

    if !job.is_copy {
        tracing::info!(%job_id, "job is not a copy job, ignoring it");
        return Ok(StageOutcome::Untracked { job_id });
    }

    let tags = jobs.job_tags(&job_id).await.map_err(|err| {
        tracing::error!(%job_id, error = %err, "unable to look up job tags");
        err
    })?;
    if !tags.iter().any(|tag| tag.is_workflow_marker()) {
        tracing::info!(%job_id, "job was not created by the troubleshooting tool, ignoring it");
        return Ok(StageOutcome::Untracked { job_id });
    }

    if job.status != JobStatus::Complete {
        tracing::info!(%job_id, status = ?job.status, "job is not complete yet");
        return Ok(StageOutcome::Pending { job_id });
    }

    notify_best_effort(
        notifier,
        &messages::copy_job_completed(&job_id, job.tasks_failed, job.total_tasks),
    )
    .await;
    notify_best_effort(notifier, messages::STARTING_QUERY).await;

    let token = match record.s3.object.e_tag.as_deref() {
        Some(etag) => IdempotencyToken::from_fingerprint(etag),
        None => {
            tracing::warn!(%job_id, "report notification has no etag, using a fresh token");
            IdempotencyToken::fresh()
        }
    };

    trigger
        .trigger(&QueryInvocation::new(&token))
        .await
        .map_err(|err| {
            tracing::error!(%job_id, error = %err, "unable to trigger the query function");
            err
        })?;
    tracing::info!(%job_id, %token, "query function triggered");

    Ok(StageOutcome::QueryTriggered {
        job_id,
        token: token.to_string(),
    })
}
