use crate::{
    analysis::LogSource,
    config::CopyJobSettings,
    error::RuntimeError,
    event::LogCopyProperties,
    job::JobTag,
    services::CopyJobService,
    token::IdempotencyToken,
    window::TimeWindow,
};

/// Storage classes the manifest generator picks objects from.
pub const MANIFEST_STORAGE_CLASSES: [&str; 4] =
    ["STANDARD", "ONEZONE_IA", "STANDARD_IA", "INTELLIGENT_TIERING"];
/// Checksum computed on every copied object.
pub const CHECKSUM_ALGORITHM: &str = "SHA256";
/// Copies are private to the tool bucket owner.
pub const CANNED_ACL: &str = "private";
/// Copies keep the metadata of the source object.
pub const METADATA_DIRECTIVE: &str = "COPY";
/// Format of the generated manifest.
pub const MANIFEST_FORMAT: &str = "S3InventoryReport_CSV_20211130";
/// Format of the completion report.
pub const REPORT_FORMAT: &str = "Report_CSV_20180820";
/// The completion report lists every task, not only failed ones.
pub const REPORT_SCOPE: &str = "AllTasks";
/// Priority of the copy jobs.
pub const JOB_PRIORITY: i32 = 10;

/// `CopyJobSpec` describes a manifest driven copy job.
///
/// Batch Operations enumerates the source bucket itself, filtered by
/// storage class, key prefix and creation time.
#[derive(Clone, Debug, PartialEq)]
pub struct CopyJobSpec {
    /// Account that owns the job
    pub account_id: String,
    /// Role assumed by Batch Operations
    pub role_arn: String,
    /// Bucket the logs are copied from
    pub source_bucket_arn: String,
    /// Only copy keys under this prefix
    pub source_prefix: Option<String>,
    /// Only copy objects created inside this window
    pub window: TimeWindow,
    /// Bucket the logs are copied to
    pub target_bucket_arn: String,
    /// Prefix prepended to every copied key
    pub target_key_prefix: String,
    /// Bucket receiving the manifest and the completion report
    pub report_bucket_arn: String,
    /// Prefix of the completion report
    pub report_prefix: String,
    /// Prefix of the generated manifest
    pub manifest_prefix: String,
    /// Marker of the jobs created by this workflow
    pub tag: JobTag,
    /// Deduplication key of the job request
    pub client_request_token: IdempotencyToken,
}

impl CopyJobSpec {
    /// Describe the copy of the logs in `properties` into the tool bucket.
    pub fn new(
        settings: &CopyJobSettings,
        properties: &LogCopyProperties,
        window: TimeWindow,
    ) -> CopyJobSpec {
        let source = LogSource::from_log_type(properties.log_type.as_deref());
        let tool_bucket_arn = bucket_arn(&settings.report_bucket);

        CopyJobSpec {
            account_id: settings.account_id.clone(),
            role_arn: settings.role_arn.clone(),
            source_bucket_arn: bucket_arn(&properties.logs_bucket),
            source_prefix: properties.source_prefix().map(String::from),
            window,
            target_bucket_arn: tool_bucket_arn.clone(),
            target_key_prefix: settings.copy_location(source).into(),
            report_bucket_arn: tool_bucket_arn,
            report_prefix: settings.report_prefix.clone(),
            manifest_prefix: settings.manifest_prefix.clone(),
            tag: JobTag::workflow_marker(),
            client_request_token: IdempotencyToken::fresh(),
        }
    }
}

/// Submit the copy job and return the id Batch Operations assigned to it.
///
/// Failures are logged and returned to the caller, nothing is retried here.
#[tracing::instrument(skip(jobs, settings, properties))]
pub async fn submit_copy_job(
    jobs: &dyn CopyJobService,
    settings: &CopyJobSettings,
    properties: &LogCopyProperties,
    window: TimeWindow,
) -> Result<String, RuntimeError> {
    let spec = CopyJobSpec::new(settings, properties, window);
    tracing::info!(?spec, "submitting copy job to batch operations");

    match jobs.create_job(&spec).await {
        Ok(job_id) => {
            tracing::info!(%job_id, "copy job submitted");
            Ok(job_id)
        }
        Err(err) => {
            tracing::error!(error = %err, "copy job was rejected");
            Err(err)
        }
    }
}

fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}
