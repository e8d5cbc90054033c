use std::{convert::Infallible, fmt, str::FromStr};

/// `LogSource` is the kind of logs registered in the Glue table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogSource {
    /// S3 server access logs
    #[default]
    ServerAccessLogs,
    /// CloudTrail data and management events
    CloudTrail,
}

impl LogSource {
    /// `CloudTrail` selects CloudTrail logs, anything else means server access logs.
    pub fn from_log_type(log_type: Option<&str>) -> LogSource {
        match log_type {
            Some("CloudTrail") => LogSource::CloudTrail,
            _ => LogSource::ServerAccessLogs,
        }
    }
}

/// `AnalysisType` selects the troubleshooting query to run.
///
/// Values outside the known set parse into `NoOp`, which runs nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisType {
    /// Object reads
    ObjectAccess,
    /// Requests from anonymous principals
    AnonymousAccess,
    /// Bucket creation
    CreateBucket,
    /// Any `DeleteBucket*` call
    DeleteBucket,
    /// Any `PutBucket*` call
    PutBucket,
    /// Any `DeleteObject*` call
    DeleteObject,
    /// Requests rejected with AccessDenied
    AccessDenied,
    /// Requests answered with a 4xx status
    ClientError4xx,
    /// Requests answered with a 5xx status
    ServiceError5xx,
    /// Any delete operation
    ObjectDeletion,
    /// Counts of every lifecycle action
    LifecycleActionStatistics,
    /// Lifecycle expirations
    LifecycleActionExpiration,
    /// Lifecycle storage class transitions
    LifecycleActionTransition,
    /// Requests ordered by turnaround time
    Latency,
    /// Errors, deletions and lifecycle actions together
    TopTroubleshootingQueries,
    /// Unrecognized analysis type
    NoOp(String),
}

impl AnalysisType {
    /// The name used in configuration
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisType::ObjectAccess => "ObjectAccess",
            AnalysisType::AnonymousAccess => "AnonymousAccess",
            AnalysisType::CreateBucket => "CreateBucket",
            AnalysisType::DeleteBucket => "DeleteBucket-*",
            AnalysisType::PutBucket => "PutBucket-*",
            AnalysisType::DeleteObject => "DeleteObject-*",
            AnalysisType::AccessDenied => "AccessDenied",
            AnalysisType::ClientError4xx => "ClientError-4xx",
            AnalysisType::ServiceError5xx => "ServiceError-5xx",
            AnalysisType::ObjectDeletion => "ObjectDeletion",
            AnalysisType::LifecycleActionStatistics => "LifecycleActionStatistics",
            AnalysisType::LifecycleActionExpiration => "LifecycleAction-Expiration",
            AnalysisType::LifecycleActionTransition => "LifecycleAction-Transition",
            AnalysisType::Latency => "Latency",
            AnalysisType::TopTroubleshootingQueries => "TopTroubleshootingQueries",
            AnalysisType::NoOp(other) => other,
        }
    }
}

impl FromStr for AnalysisType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "ObjectAccess" => AnalysisType::ObjectAccess,
            "AnonymousAccess" => AnalysisType::AnonymousAccess,
            "CreateBucket" => AnalysisType::CreateBucket,
            "DeleteBucket-*" => AnalysisType::DeleteBucket,
            "PutBucket-*" => AnalysisType::PutBucket,
            "DeleteObject-*" => AnalysisType::DeleteObject,
            "AccessDenied" => AnalysisType::AccessDenied,
            "ClientError-4xx" => AnalysisType::ClientError4xx,
            "ServiceError-5xx" => AnalysisType::ServiceError5xx,
            "ObjectDeletion" => AnalysisType::ObjectDeletion,
            "LifecycleActionStatistics" => AnalysisType::LifecycleActionStatistics,
            "LifecycleAction-Expiration" => AnalysisType::LifecycleActionExpiration,
            "LifecycleAction-Transition" => AnalysisType::LifecycleActionTransition,
            "Latency" => AnalysisType::Latency,
            "TopTroubleshootingQueries" => AnalysisType::TopTroubleshootingQueries,
            other => AnalysisType::NoOp(other.into()),
        })
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
