use crate::{error::RuntimeError, token::IdempotencyToken, window::TimeWindow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `S3Event` represents the object creation notification sent by S3
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Event {
    /// One record per created object
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

/// `S3EventRecord` is a single object notification
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    /// Event name, e.g. `ObjectCreated:Put`
    #[serde(default)]
    pub event_name: String,
    /// Bucket and object details
    pub s3: S3Entity,
}

/// `S3Entity` points at the object that triggered the event
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Entity {
    /// Bucket the object was created in
    pub bucket: S3Bucket,
    /// The created object
    pub object: S3Object,
}

/// `S3Bucket` identifies the bucket of an event
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Bucket {
    /// Bucket name
    pub name: String,
}

/// `S3Object` identifies the object of an event
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Object {
    /// URL-encoded object key
    pub key: String,
    /// Content fingerprint of the object
    #[serde(rename = "eTag", default)]
    pub e_tag: Option<String>,
    /// Object size in bytes
    #[serde(default)]
    pub size: Option<i64>,
}

impl S3Object {
    /// S3 encodes keys like HTML forms: `+` is a space, the rest is percent-encoded.
    pub fn decoded_key(&self) -> Result<String, RuntimeError> {
        let plus_decoded = self.key.replace('+', " ");
        urlencoding::decode(&plus_decoded)
            .map(|key| key.into_owned())
            .map_err(|_| RuntimeError::InvalidObjectKey(self.key.clone()))
    }
}

/// `StackEvent` is the CloudFormation custom resource request that
/// creates, reconfigures, or removes the troubleshooting workflow.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "RequestType")]
pub enum StackEvent {
    /// The stack is being created
    Create {
        /// Current properties
        #[serde(rename = "ResourceProperties")]
        properties: LogCopyProperties,
    },
    /// The stack parameters changed
    Update {
        /// New properties
        #[serde(rename = "ResourceProperties")]
        properties: LogCopyProperties,
        /// Properties before the update
        #[serde(rename = "OldResourceProperties")]
        old_properties: LogCopyProperties,
    },
    /// The stack is being deleted
    Delete {
        /// Last known properties
        #[serde(rename = "ResourceProperties")]
        properties: LogCopyProperties,
    },
}

/// `LogCopyProperties` describes which logs the workflow copies.
///
/// CloudFormation sends every parameter as a string.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct LogCopyProperties {
    /// Bucket that receives the customer's logs
    #[serde(rename = "your_s3_logs_bucket", default)]
    pub logs_bucket: String,
    /// Key prefix of the logs inside the bucket
    #[serde(rename = "your_s3_log_prefix", default)]
    pub log_prefix: Option<String>,
    /// `CloudTrail`, or anything else for S3 server access logs
    #[serde(rename = "your_log_type", default)]
    pub log_type: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    #[serde(default)]
    pub log_created_after: Option<String>,
    /// `YYYY-MM-DD`, exclusive
    #[serde(default)]
    pub log_created_before: Option<String>,
    /// Number of days to look back when `log_created_after` is not set
    #[serde(default)]
    pub debug_duration: Option<String>,
}

impl LogCopyProperties {
    /// Resolve the creation time window of the logs to copy.
    pub fn window(&self, today: NaiveDate) -> Result<TimeWindow, RuntimeError> {
        let mut window = TimeWindow::parse(
            self.log_created_after.as_deref(),
            self.log_created_before.as_deref(),
        )?;

        if window.created_after.is_none() {
            if let Some(days) = self.debug_days()? {
                window.created_after = TimeWindow::trailing_days(today, days).created_after;
            }
        }

        Ok(window)
    }

    /// Source prefix, ignoring empty parameters
    pub fn source_prefix(&self) -> Option<&str> {
        self.log_prefix.as_deref().filter(|p| !p.is_empty())
    }

    fn debug_days(&self) -> Result<Option<u32>, RuntimeError> {
        match self.debug_duration.as_deref().map(str::trim) {
            Some(days) if !days.is_empty() => {
                days.parse()
                    .map(Some)
                    .map_err(|_| RuntimeError::InvalidConfig {
                        name: "debug_duration".into(),
                        value: days.into(),
                    })
            }
            _ => Ok(None),
        }
    }
}

/// `StackResponse` is returned to the custom resource caller
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StackResponse {
    /// `Successful` or `Completed`
    pub message: String,
}

/// `QueryInvocation` is the payload sent to the query function
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct QueryInvocation {
    /// Deduplication token for the query execution
    #[serde(
        rename = "idempotencyToken",
        alias = "my_etag",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub idempotency_token: Option<String>,
}

impl QueryInvocation {
    /// Payload for a given token
    pub fn new(token: &IdempotencyToken) -> QueryInvocation {
        QueryInvocation {
            idempotency_token: Some(token.as_str().into()),
        }
    }
}

/// `QueryResponse` is returned by the query function
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Always 200, submission failures are only logged
    pub status_code: u16,
    /// Human readable result
    pub body: String,
    /// Execution id when a query was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_execution_id: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_s3_event() {
        let json = r#"{
    "Records": [
        {
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-west-1",
            "eventTime": "2023-01-10T12:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": {
                    "name": "support-tool-bucket",
                    "arn": "arn:aws:s3:::support-tool-bucket"
                },
                "object": {
                    "key": "batch-ops-reports/job-42/manifest+file%3D1.json",
                    "size": 1024,
                    "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                    "sequencer": "0A1B2C3D4E5F678901"
                }
            }
        }
    ]
}"#;
        let event: S3Event = serde_json::from_str(json).expect("failed to deserialize");
        assert_eq!(1, event.records.len());

        let record = &event.records[0];
        assert_eq!("ObjectCreated:Put", record.event_name);
        assert_eq!("support-tool-bucket", record.s3.bucket.name);
        assert_eq!(
            Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
            record.s3.object.e_tag
        );
        assert_eq!(
            "batch-ops-reports/job-42/manifest file=1.json",
            record.s3.object.decoded_key().unwrap()
        );
    }

    #[test]
    fn test_deserialize_update_stack_event() {
        let json = r#"{
    "RequestType": "Update",
    "ServiceToken": "arn:aws:lambda:us-west-1:123456789012:function:batch-copy",
    "ResponseURL": "https://cloudformation-custom-resource-response-uswest1.s3.amazonaws.com/",
    "StackId": "arn:aws:cloudformation:us-west-1:123456789012:stack/tool/guid",
    "RequestId": "unique-id",
    "LogicalResourceId": "BatchCopy",
    "PhysicalResourceId": "BatchCopy",
    "ResourceType": "Custom::BatchCopy",
    "ResourceProperties": {
        "ServiceToken": "arn:aws:lambda:us-west-1:123456789012:function:batch-copy",
        "your_s3_logs_bucket": "my-logs",
        "your_s3_log_prefix": "access/",
        "your_log_type": "S3ServerAccessLogs",
        "log_created_after": "2023-01-10",
        "log_created_before": "2023-01-20"
    },
    "OldResourceProperties": {
        "your_s3_logs_bucket": "my-logs",
        "your_s3_log_prefix": "access/",
        "your_log_type": "S3ServerAccessLogs",
        "log_created_after": "2023-01-01",
        "log_created_before": "2023-02-01"
    }
}"#;
        let event: StackEvent = serde_json::from_str(json).expect("failed to deserialize");
        match event {
            StackEvent::Update {
                properties,
                old_properties,
            } => {
                assert_eq!("my-logs", properties.logs_bucket);
                assert_eq!(Some("access/"), properties.source_prefix());
                assert_eq!(Some("2023-01-01".to_string()), old_properties.log_created_after);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_delete_stack_event() {
        let json = r#"{"RequestType": "Delete", "ResourceProperties": {"your_s3_logs_bucket": "my-logs"}}"#;
        let event: StackEvent = serde_json::from_str(json).expect("failed to deserialize");
        assert!(matches!(event, StackEvent::Delete { .. }));
    }

    #[test]
    fn test_window_falls_back_to_debug_duration() {
        let today = NaiveDate::from_ymd_opt(2023, 3, 10).unwrap();
        let properties = LogCopyProperties {
            logs_bucket: "my-logs".into(),
            debug_duration: Some("5".into()),
            log_created_after: Some("".into()),
            ..Default::default()
        };

        let window = properties.window(today).unwrap();
        assert_eq!(NaiveDate::from_ymd_opt(2023, 3, 5), window.created_after);
        assert_eq!(None, window.created_before);
    }

    #[test]
    fn test_invalid_debug_duration() {
        let properties = LogCopyProperties {
            debug_duration: Some("a week".into()),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2023, 3, 10).unwrap();
        assert!(matches!(
            properties.window(today),
            Err(RuntimeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_query_invocation_accepts_legacy_key() {
        let payload: QueryInvocation =
            serde_json::from_str(r#"{"my_etag": "d41d8cd98f00b204e9800998ecf8427e"}"#).unwrap();
        assert_eq!(
            Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
            payload.idempotency_token
        );

        let token = IdempotencyToken::from_fingerprint("abc");
        let json = serde_json::to_string(&QueryInvocation::new(&token)).unwrap();
        assert_eq!(r#"{"idempotencyToken":"abc"}"#, json);
    }
}
