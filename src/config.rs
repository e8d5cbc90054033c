//! Explicit configuration for every function, read once at cold start.
use crate::{
    analysis::{AnalysisType, LogSource},
    error::RuntimeError,
    window::TimeWindow,
};
use std::time::Duration;

const DEFAULT_SETTLE_DELAY_SECONDS: u64 = 150;
const DEFAULT_CATALOG: &str = "AwsDataCatalog";

/// Settings of the copy job submitted by the batch copy function
#[derive(Clone, Debug, PartialEq)]
pub struct CopyJobSettings {
    /// Account that owns the Batch Operations jobs
    pub account_id: String,
    /// Role assumed by Batch Operations to copy the logs
    pub role_arn: String,
    /// Bucket receiving the copies, the manifests and the reports
    pub report_bucket: String,
    /// Prefix of the completion reports
    pub report_prefix: String,
    /// Prefix of the generated manifests
    pub manifest_prefix: String,
    /// Destination prefix for S3 server access logs
    pub s3_access_log_copy_location: String,
    /// Destination prefix for CloudTrail logs
    pub cloudtrail_log_copy_location: String,
}

impl CopyJobSettings {
    /// Destination prefix of the copies for a log source
    pub fn copy_location(&self, source: LogSource) -> &str {
        match source {
            LogSource::CloudTrail => &self.cloudtrail_log_copy_location,
            LogSource::ServerAccessLogs => &self.s3_access_log_copy_location,
        }
    }
}

/// `BatchCopyConfig` configures the function that handles stack events
#[derive(Clone, Debug, PartialEq)]
pub struct BatchCopyConfig {
    /// Copy job settings
    pub copy: CopyJobSettings,
    /// Name of the query function
    pub query_function: String,
    /// Topic that receives operator notifications
    pub sns_topic_arn: String,
    /// Wait before the first copy job on stack creation
    pub settle_delay: Duration,
}

impl BatchCopyConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<BatchCopyConfig, RuntimeError> {
        BatchCopyConfig::from_lookup(env_lookup)
    }

    /// Read the configuration from any variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<BatchCopyConfig, RuntimeError> {
        let settle_delay = match optional(&lookup, "SETTLE_DELAY_SECONDS") {
            Some(value) => value.parse().map_err(|_| RuntimeError::InvalidConfig {
                name: "SETTLE_DELAY_SECONDS".into(),
                value,
            })?,
            None => DEFAULT_SETTLE_DELAY_SECONDS,
        };

        Ok(BatchCopyConfig {
            copy: CopyJobSettings {
                account_id: required(&lookup, "ACCOUNT_ID")?,
                role_arn: required(&lookup, "BATCH_OPS_ROLE_ARN")?,
                report_bucket: required(&lookup, "BATCH_OPS_REPORT_BUCKET")?,
                report_prefix: required(&lookup, "BATCH_OPS_REPORT_PREFIX")?,
                manifest_prefix: required(&lookup, "BATCH_OPS_MANIFEST_PREFIX")?,
                s3_access_log_copy_location: required(&lookup, "S3_ACCESS_LOG_COPY_LOCATION")?,
                cloudtrail_log_copy_location: required(&lookup, "CLOUDTRAIL_LOG_COPY_LOCATION")?,
            },
            query_function: required(&lookup, "QUERY_FUNCTION")?,
            sns_topic_arn: required(&lookup, "SNS_TOPIC_ARN")?,
            settle_delay: Duration::from_secs(settle_delay),
        })
    }
}

/// `TrackerConfig` configures the function that follows copy jobs
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    /// Account that owns the Batch Operations jobs
    pub account_id: String,
    /// Name of the query function
    pub query_function: String,
    /// Topic that receives operator notifications
    pub sns_topic_arn: String,
}

impl TrackerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<TrackerConfig, RuntimeError> {
        TrackerConfig::from_lookup(env_lookup)
    }

    /// Read the configuration from any variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<TrackerConfig, RuntimeError> {
        Ok(TrackerConfig {
            account_id: required(&lookup, "ACCOUNT_ID")?,
            query_function: required(&lookup, "QUERY_FUNCTION")?,
            sns_topic_arn: required(&lookup, "SNS_TOPIC_ARN")?,
        })
    }
}

/// `QueryConfig` configures the function that starts Athena queries
#[derive(Clone, Debug, PartialEq)]
pub struct QueryConfig {
    /// Data catalog of the Glue database
    pub catalog: String,
    /// Glue database
    pub database: String,
    /// Glue table with the copied logs
    pub table: String,
    /// Athena workgroup that runs the queries
    pub workgroup: String,
    /// Kind of logs in the table
    pub log_source: LogSource,
    /// Query to run
    pub analysis_type: AnalysisType,
    /// Only look at requests for this bucket
    pub bucket_scope: Option<String>,
    /// Only look at requests inside this window
    pub window: TimeWindow,
}

impl QueryConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<QueryConfig, RuntimeError> {
        QueryConfig::from_lookup(env_lookup)
    }

    /// Read the configuration from any variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<QueryConfig, RuntimeError> {
        let analysis_type: AnalysisType = match required(&lookup, "QUERY_ANALYSIS_TYPE")?.parse() {
            Ok(analysis_type) => analysis_type,
            Err(never) => match never {},
        };

        Ok(QueryConfig {
            catalog: optional(&lookup, "ATHENA_CATALOG").unwrap_or_else(|| DEFAULT_CATALOG.into()),
            database: required(&lookup, "GLUE_DB")?,
            table: required(&lookup, "GLUE_TABLE")?,
            workgroup: required(&lookup, "WORKGROUP_NAME")?,
            log_source: LogSource::from_log_type(optional(&lookup, "LOG_TYPE").as_deref()),
            analysis_type,
            bucket_scope: optional(&lookup, "S3_BUCKET"),
            window: TimeWindow::parse(
                optional(&lookup, "QUERY_LOGS_AFTER").as_deref(),
                optional(&lookup, "QUERY_LOGS_BEFORE").as_deref(),
            )?,
        })
    }
}

/// `ReportConfig` configures the function that reports query results
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    /// Topic that receives operator notifications
    pub sns_topic_arn: String,
}

impl ReportConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<ReportConfig, RuntimeError> {
        ReportConfig::from_lookup(env_lookup)
    }

    /// Read the configuration from any variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ReportConfig, RuntimeError> {
        Ok(ReportConfig {
            sns_topic_arn: required(&lookup, "SNS_TOPIC_ARN")?,
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, RuntimeError> {
    optional(lookup, name).ok_or_else(|| RuntimeError::MissingEnv(name.into()))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}
