use crate::{
    analysis::{AnalysisType, LogSource},
    config::{BatchCopyConfig, CopyJobSettings, QueryConfig},
    copy_job::CopyJobSpec,
    error::RuntimeError,
    event::QueryInvocation,
    job::{JobStatus, JobTag, WorkflowJob},
    services::{CopyJobService, Notifier, QueryExecution, QueryService, QueryTrigger},
    window::TimeWindow,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_smithy_runtime::client::http::test_util::infallible_client_fn;
use aws_smithy_types::body::SdkBody;
use aws_types::{region::Region, SdkConfig};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

/// A request received by the mocked HTTP client
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub uri: String,
    pub body: String,
}

/// Requests received by the mocked HTTP client, in order
pub type CapturedRequests = Arc<Mutex<Vec<CapturedRequest>>>;

/// Configuration for mocking AWS SDK clients.
/// Every request gets the same canned response.
pub async fn get_mock_config(status: u16, body: &'static str) -> (SdkConfig, CapturedRequests) {
    let requests = CapturedRequests::default();
    let captured = requests.clone();

    let http_client = infallible_client_fn(move |request: http::Request<SdkBody>| {
        captured.lock().unwrap().push(CapturedRequest {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
            body: String::from_utf8_lossy(request.body().bytes().unwrap_or_default()).into(),
        });
        http::Response::builder()
            .status(status)
            .body(SdkBody::from(body))
            .unwrap()
    });

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-west-1"))
        .credentials_provider(Credentials::new(
            "accesskey",
            "privatekey",
            None,
            None,
            "dummy",
        ))
        .http_client(http_client)
        .load()
        .await;

    (config, requests)
}

/// Copy job settings used across tests
pub fn copy_settings() -> CopyJobSettings {
    CopyJobSettings {
        account_id: "123456789012".into(),
        role_arn: "arn:aws:iam::123456789012:role/batch-ops".into(),
        report_bucket: "support-tool-bucket".into(),
        report_prefix: "batch-ops-reports".into(),
        manifest_prefix: "batch-ops-manifests".into(),
        s3_access_log_copy_location: "s3-access-logs/".into(),
        cloudtrail_log_copy_location: "cloudtrail-logs/".into(),
    }
}

/// Batch copy configuration that doesn't wait before copying
pub fn batch_copy_config() -> BatchCopyConfig {
    BatchCopyConfig {
        copy: copy_settings(),
        query_function: "athena-query".into(),
        sns_topic_arn: "arn:aws:sns:us-west-1:123456789012:tool".into(),
        settle_delay: Duration::ZERO,
    }
}

/// Query configuration for latency analysis of server access logs
pub fn query_config() -> QueryConfig {
    QueryConfig {
        catalog: "AwsDataCatalog".into(),
        database: "s3_logs_db".into(),
        table: "access_logs".into(),
        workgroup: "troubleshooting".into(),
        log_source: LogSource::ServerAccessLogs,
        analysis_type: AnalysisType::Latency,
        bucket_scope: Some("my-bucket".into()),
        window: TimeWindow::default(),
    }
}

/// Error returned by fakes that are told to fail
pub fn rejection() -> RuntimeError {
    RuntimeError::S3Control(aws_sdk_s3control::Error::TooManyRequestsException(
        aws_sdk_s3control::types::error::TooManyRequestsException::builder()
            .message("simulated rejection")
            .build(),
    ))
}

/// A completed copy job
pub fn copy_job(job_id: &str, status: JobStatus, total: i64, failed: i64) -> WorkflowJob {
    WorkflowJob {
        job_id: job_id.into(),
        status,
        is_copy: true,
        total_tasks: total,
        tasks_succeeded: total - failed,
        tasks_failed: failed,
        creation_time: None,
        termination_time: None,
    }
}

/// In memory Batch Operations
#[derive(Default)]
pub struct FakeJobService {
    pub jobs: HashMap<String, WorkflowJob>,
    pub tags: HashMap<String, Vec<JobTag>>,
    pub reject_create: bool,
    pub fail_tags: bool,
    pub created: Mutex<Vec<CopyJobSpec>>,
}

impl FakeJobService {
    /// Batch Operations that knows about a single job
    pub fn with_job(job: WorkflowJob, tags: Vec<JobTag>) -> FakeJobService {
        let mut service = FakeJobService::default();
        service.tags.insert(job.job_id.clone(), tags);
        service.jobs.insert(job.job_id.clone(), job);
        service
    }

    /// Jobs submitted so far
    pub fn created(&self) -> Vec<CopyJobSpec> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl CopyJobService for FakeJobService {
    async fn create_job(&self, spec: &CopyJobSpec) -> Result<String, RuntimeError> {
        if self.reject_create {
            return Err(rejection());
        }
        let mut created = self.created.lock().unwrap();
        created.push(spec.clone());
        Ok(format!("job-created-{}", created.len()))
    }

    async fn describe_job(&self, job_id: &str) -> Result<WorkflowJob, RuntimeError> {
        self.jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| RuntimeError::MissingField("Job".into()))
    }

    async fn job_tags(&self, job_id: &str) -> Result<Vec<JobTag>, RuntimeError> {
        if self.fail_tags {
            return Err(rejection());
        }
        Ok(self.tags.get(job_id).cloned().unwrap_or_default())
    }
}

/// Athena that deduplicates executions by token, like the real service
#[derive(Default)]
pub struct FakeQueryService {
    pub reject: bool,
    pub executions: Mutex<Vec<QueryExecution>>,
}

impl FakeQueryService {
    /// Every submission received, duplicates included
    pub fn executions(&self) -> Vec<QueryExecution> {
        self.executions.lock().unwrap().clone()
    }

    /// Number of queries that actually run
    pub fn distinct_executions(&self) -> usize {
        let mut tokens: Vec<String> = self
            .executions()
            .iter()
            .map(|e| e.token.as_str().to_string())
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens.len()
    }
}

#[async_trait]
impl QueryService for FakeQueryService {
    async fn start_query(&self, execution: &QueryExecution) -> Result<String, RuntimeError> {
        if self.reject {
            return Err(rejection());
        }
        self.executions.lock().unwrap().push(execution.clone());
        Ok(format!("query-{}", execution.token))
    }
}

/// SNS that keeps every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Messages published so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), RuntimeError> {
        self.messages.lock().unwrap().push(message.into());
        if self.fail {
            return Err(rejection());
        }
        Ok(())
    }
}

/// Lambda that keeps every invocation of the query function
#[derive(Default)]
pub struct RecordingTrigger {
    pub fail: bool,
    pub invocations: Mutex<Vec<QueryInvocation>>,
}

impl RecordingTrigger {
    /// Invocations sent so far
    pub fn invocations(&self) -> Vec<QueryInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryTrigger for RecordingTrigger {
    async fn trigger(&self, invocation: &QueryInvocation) -> Result<(), RuntimeError> {
        if self.fail {
            return Err(rejection());
        }
        self.invocations.lock().unwrap().push(invocation.clone());
        Ok(())
    }
}
