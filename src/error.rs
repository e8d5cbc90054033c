use thiserror::Error as ThisError;

/// Different errors that the application can raise
#[derive(Debug, ThisError)]
pub enum RuntimeError {
    /// Error returned when a required environment variable is not set
    #[error("missing environment variable {0}")]
    MissingEnv(String),
    /// Error returned when an environment variable or property has an unusable value
    #[error("invalid value {value:?} for {name}")]
    InvalidConfig {
        /// Name of the setting
        name: String,
        /// Raw value that failed to parse
        value: String,
    },
    /// Error returned when a date is not formatted as `YYYY-MM-DD`
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String, #[source] chrono::ParseError),
    /// Error returned when a completion report key doesn't carry a job id
    #[error("unable to find a job id in report key {0}")]
    InvalidReportKey(String),
    /// Error returned when an S3 object key is not valid percent-encoded UTF-8
    #[error("invalid object key {0}")]
    InvalidObjectKey(String),
    /// Error returned if a service response is missing an expected field
    #[error("missing response field {0}")]
    MissingField(String),
    /// Error returned when a request to an AWS service cannot be built
    #[error("unable to build service request")]
    RequestBuild(#[from] aws_sdk_s3control::error::BuildError),
    /// Error returned by the S3 Batch Operations API
    #[error("unexpected s3 control error")]
    S3Control(#[from] aws_sdk_s3control::Error),
    /// Error returned by the Athena API
    #[error("unexpected athena error")]
    Athena(#[from] aws_sdk_athena::Error),
    /// Error returned by the SNS API
    #[error("unexpected sns error")]
    Sns(#[from] aws_sdk_sns::Error),
    /// Error returned by the Lambda API
    #[error("unexpected lambda error")]
    Lambda(#[from] aws_sdk_lambda::Error),
    /// Error returned when the downstream function reports a failure
    #[error("function {function} failed: {error}")]
    FunctionError {
        /// Name of the invoked function
        function: String,
        /// Error type reported by Lambda
        error: String,
    },
    /// Error returned when an invocation payload can't be encoded
    #[error("invalid payload")]
    Payload(#[from] serde_json::Error),
}
