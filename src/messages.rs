//! Operator facing notification texts.

/// Sent before the query function is triggered
pub const STARTING_QUERY: &str = "Starting Athena Query";

/// The copy job failed as a whole
pub fn copy_job_failed(job_id: &str) -> String {
    format!(
        "Batch Operations Copy Job Failed! Please check the Batch Operations Job JobID {job_id} \
         Completion Report in the Amazon S3 Console for more details."
    )
}

/// The copy job completed, but none of its tasks succeeded
pub fn all_tasks_failed(job_id: &str) -> String {
    format!(
        "All Tasks Failed! Please check the Batch Operations Job JobID {job_id} \
         Completion Report in the Amazon S3 Console for more details."
    )
}

/// The copy job completed with at least one successful task
pub fn copy_job_completed(job_id: &str, tasks_failed: i64, total_tasks: i64) -> String {
    format!(
        "Copy Job {job_id} Completed: {tasks_failed} failed out of {total_tasks}. \
         Please check the Batch Operations Job JobID {job_id} in the Amazon S3 Console \
         for more details."
    )
}

/// The query wrote its results
pub fn query_completed(bucket: &str, key: &str) -> String {
    format!(
        "Athena Query Completed Successfully, kindly retrieve your s3 troubleshooting \
         report in the Amazon S3 bucket path s3://{bucket}/{key} ."
    )
}
