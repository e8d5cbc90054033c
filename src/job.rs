use crate::error::RuntimeError;
use chrono::{DateTime, Utc};

/// Tag key attached to every copy job this workflow creates.
pub const WORKFLOW_TAG_KEY: &str = "job-created-by";
/// Tag value attached to every copy job this workflow creates.
pub const WORKFLOW_TAG_VALUE: &str = "aws-support-troubleshooting-tool-for-s3";

const JOB_SEGMENT_PREFIX: &str = "job-";

/// `JobStatus` is the lifecycle state of a Batch Operations job
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// The job is running its tasks
    Active,
    /// The job finished, some or all of its tasks may still have failed
    Complete,
    /// The job failed as a whole
    Failed,
    /// The job was cancelled
    Cancelled,
    /// Any intermediate state we don't act on (New, Preparing, Suspended...)
    Other(String),
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        match value {
            "Active" => JobStatus::Active,
            "Complete" => JobStatus::Complete,
            "Failed" => JobStatus::Failed,
            "Cancelled" => JobStatus::Cancelled,
            other => JobStatus::Other(other.into()),
        }
    }
}

/// `JobTag` is a key/value pair attached to a job
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobTag {
    /// Tag key
    pub key: String,
    /// Tag value
    pub value: String,
}

impl JobTag {
    /// The marker that identifies jobs created by this workflow
    pub fn workflow_marker() -> JobTag {
        JobTag {
            key: WORKFLOW_TAG_KEY.into(),
            value: WORKFLOW_TAG_VALUE.into(),
        }
    }

    /// Whether this tag is the workflow marker
    pub fn is_workflow_marker(&self) -> bool {
        self.key == WORKFLOW_TAG_KEY && self.value == WORKFLOW_TAG_VALUE
    }
}

/// `WorkflowJob` is a read-only view of a copy job as described by S3 Batch Operations.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowJob {
    /// Identifier assigned by S3 Batch Operations
    pub job_id: String,
    /// Current status
    pub status: JobStatus,
    /// Whether the job runs the S3PutObjectCopy operation
    pub is_copy: bool,
    /// Number of tasks in the job
    pub total_tasks: i64,
    /// Number of tasks that succeeded
    pub tasks_succeeded: i64,
    /// Number of tasks that failed
    pub tasks_failed: i64,
    /// When the job was created
    pub creation_time: Option<DateTime<Utc>>,
    /// When the job reached a terminal state
    pub termination_time: Option<DateTime<Utc>>,
}

impl WorkflowJob {
    /// A job can complete even though every single task failed.
    pub fn all_tasks_failed(&self) -> bool {
        self.tasks_failed == self.total_tasks
    }
}

/// Extract the job id from a completion report key.
///
/// Batch Operations writes its reports under `<prefix>/job-<id>/<file>`,
/// so the id is the parent directory of the object without the `job-` prefix.
pub fn job_id_from_report_key(key: &str) -> Result<String, RuntimeError> {
    let mut segments = key.rsplit('/');
    let _file = segments.next();

    segments
        .next()
        .and_then(|dir| dir.strip_prefix(JOB_SEGMENT_PREFIX))
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| RuntimeError::InvalidReportKey(key.into()))
}
