//! Athena query templates for the supported analysis types.
use crate::{
    analysis::{AnalysisType, LogSource},
    window::{format_date, TimeWindow},
};

const ACCESS_LOG_COLUMNS: &str = "requestdatetime, requester, remoteip, operation, httpstatus, \
     bucket_name, key, versionid, useragent, authtype, aclrequired, requestid, hostid";

const LATENCY_COLUMNS: &str = "requestdatetime, turnaroundtime, totaltime, requester, remoteip, \
     operation, httpstatus, bucket_name, key, versionid, useragent, authtype, aclrequired, \
     requestid, hostid";

const TRAIL_OBJECT_COLUMNS: &str = "eventTime, eventName, eventSource, sourceIpAddress, userAgent, \
     awsregion, json_extract_scalar(requestParameters, '$.bucketName') AS bucketName, \
     json_extract_scalar(requestParameters, '$.key') AS objectKey, userIdentity.arn AS userArn, \
     userIdentity.accountId, errorCode, errorMessage, requestId, requestParameters, \
     additionaleventdata";

const TRAIL_DELETE_COLUMNS: &str = "eventTime, eventName, eventSource, sourceIpAddress, userAgent, \
     awsregion, json_extract_scalar(requestParameters, '$.bucketName') AS bucketName, \
     json_extract_scalar(requestParameters, '$.key') AS objectKey, userIdentity.arn AS userArn, \
     userIdentity.accountId, requestId, requestParameters, additionaleventdata";

const TRAIL_BUCKET_COLUMNS: &str = "eventTime, eventName, eventSource, sourceIpAddress, userAgent, \
     awsregion, json_extract_scalar(requestParameters, '$.bucketName') AS bucketName, \
     userIdentity.arn AS userArn, userIdentity.accountId, requestId, requestParameters, \
     additionaleventdata";

const CLIENT_ERRORS: &str = "httpstatus LIKE '4%'";
const SERVICE_ERRORS: &str = "httpstatus LIKE '5%'";
const DELETIONS: &str = "operation LIKE '%DELETE%'";
const EXPIRATIONS: &str = "operation = 'S3.EXPIRE.OBJECT'";
const TRANSITIONS: &str = "operation LIKE 'S3.TRANSITION%'";

const LIFECYCLE_ACTIONS: [(&str, &str); 9] = [
    ("object_delete_marker_created", "S3.CREATE.DELETEMARKER"),
    ("object_incomplete_multipart_aborted", "S3.DELETE.UPLOAD"),
    ("object_permanently_deleted", "S3.EXPIRE.OBJECT"),
    ("object_transitioned_to_INTELLIGENT_TIER", "S3.TRANSITION_INT.OBJECT"),
    ("object_transitioned_to_GLACIER_INSTANT_RETRIEVAL", "S3.TRANSITION_GIR.OBJECT"),
    ("object_transitioned_to_ONE_ZONE_IA", "S3.TRANSITION_ZIA.OBJECT"),
    ("object_transitioned_to_STANDARD_IA", "S3.TRANSITION_SIA.OBJECT"),
    ("object_transitioned_to_GLACIER_FLEXIBLE_RETRIEVAL", "S3.TRANSITION.OBJECT"),
    ("object_transitioned_to_GLACIER_DEEP_ARCHIVE", "S3.TRANSITION_GDA.OBJECT"),
];

/// `QueryScope` holds everything a template is parameterized with
#[derive(Clone, Copy, Debug)]
pub struct QueryScope<'a> {
    /// Glue database
    pub database: &'a str,
    /// Glue table holding the copied logs
    pub table: &'a str,
    /// Only look at requests for this bucket
    pub bucket: Option<&'a str>,
    /// Only look at requests inside this window
    pub window: &'a TimeWindow,
}

/// Resolve an analysis type to its query text.
///
/// Returns `None` when there is no template for the analysis type
/// and log source, which means there is nothing to run.
pub fn build_query(
    source: LogSource,
    analysis: &AnalysisType,
    scope: &QueryScope<'_>,
) -> Option<String> {
    let query = match source {
        LogSource::ServerAccessLogs => access_log_query(analysis, scope)?,
        LogSource::CloudTrail => trail_query(analysis, scope)?,
    };
    Some(format!("{query} ;"))
}

fn access_log_query(analysis: &AnalysisType, scope: &QueryScope<'_>) -> Option<String> {
    let select = |predicate: &str| access_log_select(ACCESS_LOG_COLUMNS, predicate, scope);

    let query = match analysis {
        AnalysisType::ObjectAccess => select("operation = 'REST.GET.OBJECT'"),
        AnalysisType::ClientError4xx => select(CLIENT_ERRORS),
        AnalysisType::ServiceError5xx => select(SERVICE_ERRORS),
        AnalysisType::ObjectDeletion => select(DELETIONS),
        AnalysisType::LifecycleActionExpiration => select(EXPIRATIONS),
        AnalysisType::LifecycleActionTransition => select(TRANSITIONS),
        AnalysisType::Latency => format!(
            "{}\nORDER BY CAST(turnaroundtime AS INT) DESC",
            access_log_select(LATENCY_COLUMNS, "turnaroundtime != '-'", scope)
        ),
        AnalysisType::LifecycleActionStatistics => union(LIFECYCLE_ACTIONS.iter().map(
            |(action, operation)| {
                access_log_select(
                    &format!("'{action}' AS action, COUNT(*) AS object_count"),
                    &format!("operation = '{operation}'"),
                    scope,
                )
            },
        )),
        AnalysisType::TopTroubleshootingQueries => union(
            [CLIENT_ERRORS, SERVICE_ERRORS, DELETIONS, EXPIRATIONS, TRANSITIONS]
                .into_iter()
                .map(select),
        ),
        _ => return None,
    };

    Some(query)
}

fn trail_query(analysis: &AnalysisType, scope: &QueryScope<'_>) -> Option<String> {
    let (columns, predicate) = match analysis {
        AnalysisType::ObjectAccess => (TRAIL_OBJECT_COLUMNS, "eventName = 'GetObject'"),
        AnalysisType::AnonymousAccess => {
            (TRAIL_OBJECT_COLUMNS, "userIdentity.accountId = 'anonymous'")
        }
        AnalysisType::CreateBucket => (TRAIL_BUCKET_COLUMNS, "eventName = 'CreateBucket'"),
        AnalysisType::DeleteBucket => (TRAIL_BUCKET_COLUMNS, "eventName LIKE 'DeleteBucket%'"),
        AnalysisType::PutBucket => (TRAIL_BUCKET_COLUMNS, "eventName LIKE 'PutBucket%'"),
        AnalysisType::DeleteObject => (TRAIL_DELETE_COLUMNS, "eventName LIKE 'DeleteObject%'"),
        AnalysisType::AccessDenied => (TRAIL_OBJECT_COLUMNS, "errorCode = 'AccessDenied'"),
        _ => return None,
    };

    let mut conditions = vec!["eventsource = 's3.amazonaws.com'".to_string()];
    if let Some(bucket) = scope.bucket {
        conditions.push(format!(
            "json_extract_scalar(requestParameters, '$.bucketName') = '{}'",
            escape(bucket)
        ));
    }
    conditions.push(predicate.to_string());
    if let Some(after) = &scope.window.created_after {
        conditions.push(format!("eventTime >= '{}T00:00:00Z'", format_date(after)));
    }
    if let Some(before) = &scope.window.created_before {
        conditions.push(format!("eventTime < '{}T00:00:00Z'", format_date(before)));
    }

    Some(select_from(columns, scope, &conditions))
}

fn access_log_select(columns: &str, predicate: &str, scope: &QueryScope<'_>) -> String {
    let mut conditions = Vec::new();
    if let Some(bucket) = scope.bucket {
        conditions.push(format!("bucket_name = '{}'", escape(bucket)));
    }
    conditions.push(predicate.to_string());

    let request_time = "parse_datetime(requestdatetime, 'dd/MMM/yyyy:HH:mm:ss Z')";
    if let Some(after) = &scope.window.created_after {
        conditions.push(format!(
            "{request_time} >= parse_datetime('{}', 'yyyy-MM-dd')",
            format_date(after)
        ));
    }
    if let Some(before) = &scope.window.created_before {
        conditions.push(format!(
            "{request_time} < parse_datetime('{}', 'yyyy-MM-dd')",
            format_date(before)
        ));
    }

    select_from(columns, scope, &conditions)
}

fn select_from(columns: &str, scope: &QueryScope<'_>, conditions: &[String]) -> String {
    format!(
        "SELECT {columns}\nFROM \"{}\".\"{}\"\nWHERE {}",
        scope.database,
        scope.table,
        conditions.join("\nAND ")
    )
}

fn union(selects: impl Iterator<Item = String>) -> String {
    selects.collect::<Vec<_>>().join("\nUNION ALL\n")
}

/// Values end up inside single quoted SQL literals.
fn escape(value: &str) -> String {
    value.replace('\'', "''")
}
