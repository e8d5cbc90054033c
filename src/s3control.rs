use crate::{
    copy_job::*,
    error::RuntimeError,
    job::{JobStatus, JobTag, WorkflowJob},
    services::CopyJobService,
};
use async_trait::async_trait;
use aws_sdk_s3control::{
    primitives::DateTime as SmithyDateTime,
    types::{
        GeneratedManifestFormat, JobDescriptor, JobManifestGenerator, JobManifestGeneratorFilter,
        JobOperation, JobReport, JobReportFormat, JobReportScope, KeyNameConstraint,
        S3CannedAccessControlList, S3ChecksumAlgorithm, S3CopyObjectOperation,
        S3JobManifestGenerator, S3ManifestOutputLocation, S3MetadataDirective, S3StorageClass,
        S3Tag,
    },
    Client, Error,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// S3 Batch Operations client implementation.
pub struct BatchOpsClient {
    inner: Client,
    account_id: String,
}

impl BatchOpsClient {
    /// Initialize the Batch Operations client for the account that owns the jobs.
    #[tracing::instrument(skip(config))]
    pub fn new(config: &aws_types::SdkConfig, account_id: &str) -> BatchOpsClient {
        tracing::info!("Initializing S3 Control client");
        BatchOpsClient {
            inner: Client::new(config),
            account_id: account_id.into(),
        }
    }
}

#[async_trait]
impl CopyJobService for BatchOpsClient {
    #[tracing::instrument(skip(self, spec))]
    async fn create_job(&self, spec: &CopyJobSpec) -> Result<String, RuntimeError> {
        let operation = JobOperation::builder()
            .s3_put_object_copy(
                S3CopyObjectOperation::builder()
                    .target_resource(&spec.target_bucket_arn)
                    .target_key_prefix(&spec.target_key_prefix)
                    .canned_access_control_list(S3CannedAccessControlList::from(CANNED_ACL))
                    .metadata_directive(S3MetadataDirective::from(METADATA_DIRECTIVE))
                    .checksum_algorithm(S3ChecksumAlgorithm::from(CHECKSUM_ALGORITHM))
                    .build(),
            )
            .build();

        let report = JobReport::builder()
            .bucket(&spec.report_bucket_arn)
            .prefix(&spec.report_prefix)
            .format(JobReportFormat::from(REPORT_FORMAT))
            .report_scope(JobReportScope::from(REPORT_SCOPE))
            .enabled(true)
            .build();

        let tag = S3Tag::builder()
            .key(&spec.tag.key)
            .value(&spec.tag.value)
            .build()?;

        let res = self
            .inner
            .create_job()
            .account_id(&spec.account_id)
            .confirmation_required(false)
            .operation(operation)
            .report(report)
            .manifest_generator(manifest_generator(spec)?)
            .priority(JOB_PRIORITY)
            .role_arn(&spec.role_arn)
            .tags(tag)
            .client_request_token(spec.client_request_token.as_str())
            .send()
            .await
            .map_err(Error::from)?;

        res.job_id()
            .map(String::from)
            .ok_or_else(|| RuntimeError::MissingField("JobId".into()))
    }

    #[tracing::instrument(skip(self))]
    async fn describe_job(&self, job_id: &str) -> Result<WorkflowJob, RuntimeError> {
        let res = self
            .inner
            .describe_job()
            .account_id(&self.account_id)
            .job_id(job_id)
            .send()
            .await
            .map_err(Error::from)?;

        res.job()
            .ok_or_else(|| RuntimeError::MissingField("Job".into()))
            .and_then(|job| job.try_into())
    }

    #[tracing::instrument(skip(self))]
    async fn job_tags(&self, job_id: &str) -> Result<Vec<JobTag>, RuntimeError> {
        let res = self
            .inner
            .get_job_tagging()
            .account_id(&self.account_id)
            .job_id(job_id)
            .send()
            .await
            .map_err(Error::from)?;

        Ok(res
            .tags()
            .iter()
            .map(|tag| JobTag {
                key: tag.key().into(),
                value: tag.value().into(),
            })
            .collect())
    }
}

/// Batch Operations builds the manifest itself by listing the source bucket.
fn manifest_generator(spec: &CopyJobSpec) -> Result<JobManifestGenerator, RuntimeError> {
    let filter = JobManifestGeneratorFilter::builder()
        .set_created_after(spec.window.created_after.map(start_of_day))
        .set_created_before(spec.window.created_before.map(start_of_day))
        .set_match_any_storage_class(Some(
            MANIFEST_STORAGE_CLASSES
                .iter()
                .map(|class| S3StorageClass::from(*class))
                .collect(),
        ))
        .set_key_name_constraint(
            spec.source_prefix
                .as_ref()
                .map(|prefix| KeyNameConstraint::builder().match_any_prefix(prefix).build()),
        )
        .build();

    let output = S3ManifestOutputLocation::builder()
        .bucket(&spec.report_bucket_arn)
        .manifest_prefix(&spec.manifest_prefix)
        .manifest_format(GeneratedManifestFormat::from(MANIFEST_FORMAT))
        .build()?;

    let generator = S3JobManifestGenerator::builder()
        .source_bucket(&spec.source_bucket_arn)
        .manifest_output_location(output)
        .filter(filter)
        .enable_manifest_output(true)
        .build()?;

    Ok(JobManifestGenerator::S3JobManifestGenerator(generator))
}

fn start_of_day(date: NaiveDate) -> SmithyDateTime {
    SmithyDateTime::from_secs(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}

fn to_chrono(time: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

impl TryFrom<&JobDescriptor> for WorkflowJob {
    type Error = RuntimeError;

    /// Try to convert a job description into a WorkflowJob.
    /// The progress summary is only missing on jobs that never started,
    /// so it counts as zero tasks.
    fn try_from(value: &JobDescriptor) -> Result<Self, Self::Error> {
        let progress = value.progress_summary();

        Ok(WorkflowJob {
            job_id: value
                .job_id()
                .ok_or_else(|| RuntimeError::MissingField("JobId".into()))?
                .into(),
            status: value
                .status()
                .map(|status| JobStatus::from(status.as_str()))
                .ok_or_else(|| RuntimeError::MissingField("Status".into()))?,
            is_copy: value
                .operation()
                .and_then(|op| op.s3_put_object_copy())
                .is_some(),
            total_tasks: progress
                .and_then(|p| p.total_number_of_tasks())
                .unwrap_or_default(),
            tasks_succeeded: progress
                .and_then(|p| p.number_of_tasks_succeeded())
                .unwrap_or_default(),
            tasks_failed: progress
                .and_then(|p| p.number_of_tasks_failed())
                .unwrap_or_default(),
            creation_time: value.creation_time().and_then(to_chrono),
            termination_time: value.termination_date().and_then(to_chrono),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{event::LogCopyProperties, test_util::*, window::TimeWindow};

    const DESCRIBE_JOB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeJobResult xmlns="http://awss3control.amazonaws.com/doc/2018-08-20/">
    <Job>
        <JobId>42</JobId>
        <ConfirmationRequired>false</ConfirmationRequired>
        <Operation>
            <S3PutObjectCopy>
                <TargetResource>arn:aws:s3:::support-tool-bucket</TargetResource>
                <TargetKeyPrefix>s3-access-logs/</TargetKeyPrefix>
            </S3PutObjectCopy>
        </Operation>
        <Priority>10</Priority>
        <Status>Complete</Status>
        <ProgressSummary>
            <TotalNumberOfTasks>3</TotalNumberOfTasks>
            <NumberOfTasksSucceeded>3</NumberOfTasksSucceeded>
            <NumberOfTasksFailed>0</NumberOfTasksFailed>
        </ProgressSummary>
        <CreationTime>2023-01-10T12:00:00Z</CreationTime>
        <TerminationDate>2023-01-10T12:05:00Z</TerminationDate>
    </Job>
</DescribeJobResult>"#;

    const DESCRIBE_TAGGING_JOB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeJobResult xmlns="http://awss3control.amazonaws.com/doc/2018-08-20/">
    <Job>
        <JobId>43</JobId>
        <Operation>
            <S3PutObjectTagging>
                <TagSet></TagSet>
            </S3PutObjectTagging>
        </Operation>
        <Status>Active</Status>
    </Job>
</DescribeJobResult>"#;

    const GET_JOB_TAGGING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetJobTaggingResult xmlns="http://awss3control.amazonaws.com/doc/2018-08-20/">
    <Tags>
        <member>
            <Key>team</Key>
            <Value>storage</Value>
        </member>
        <member>
            <Key>job-created-by</Key>
            <Value>aws-support-troubleshooting-tool-for-s3</Value>
        </member>
    </Tags>
</GetJobTaggingResult>"#;

    const CREATE_JOB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CreateJobResult xmlns="http://awss3control.amazonaws.com/doc/2018-08-20/">
    <JobId>0b1a2c3d-4e5f-6789-abcd-ef0123456789</JobId>
</CreateJobResult>"#;

    #[tokio::test]
    async fn test_describe_job() -> Result<(), RuntimeError> {
        // GIVEN a Batch Operations client that knows about a completed copy job
        let (config, requests) = get_mock_config(200, DESCRIBE_JOB).await;
        let client = BatchOpsClient::new(&config, "123456789012");

        // WHEN describing the job
        let job = client.describe_job("42").await?;

        // THEN the response has the correct values
        assert_eq!("42", job.job_id);
        assert_eq!(JobStatus::Complete, job.status);
        assert!(job.is_copy);
        assert_eq!(3, job.total_tasks);
        assert_eq!(0, job.tasks_failed);
        assert!(!job.all_tasks_failed());
        assert_eq!(
            Some("2023-01-10T12:05:00+00:00".to_string()),
            job.termination_time.map(|t| t.to_rfc3339())
        );

        // AND the request targets the job
        let requests = requests.lock().unwrap();
        assert_eq!(1, requests.len());
        assert_eq!("GET", requests[0].method);
        assert!(requests[0].uri.contains("/v20180820/jobs/42"));

        Ok(())
    }

    #[tokio::test]
    async fn test_describe_job_with_other_operation() -> Result<(), RuntimeError> {
        // GIVEN a job that doesn't copy objects and hasn't started
        let (config, _) = get_mock_config(200, DESCRIBE_TAGGING_JOB).await;
        let client = BatchOpsClient::new(&config, "123456789012");

        // WHEN describing the job
        let job = client.describe_job("43").await?;

        // THEN it isn't a copy and has no tasks yet
        assert!(!job.is_copy);
        assert_eq!(JobStatus::Active, job.status);
        assert_eq!(0, job.total_tasks);
        assert_eq!(None, job.creation_time);

        Ok(())
    }

    #[tokio::test]
    async fn test_job_tags() -> Result<(), RuntimeError> {
        // GIVEN a job with two tags
        let (config, requests) = get_mock_config(200, GET_JOB_TAGGING).await;
        let client = BatchOpsClient::new(&config, "123456789012");

        // WHEN listing its tags
        let tags = client.job_tags("42").await?;

        // THEN both tags are returned in order
        assert_eq!(2, tags.len());
        assert_eq!("team", tags[0].key);
        assert!(!tags[0].is_workflow_marker());
        assert!(tags[1].is_workflow_marker());

        // AND the request targets the job tagging resource
        let requests = requests.lock().unwrap();
        assert!(requests[0].uri.contains("/v20180820/jobs/42/tagging"));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_job() -> Result<(), RuntimeError> {
        // GIVEN a copy job for a week of server access logs
        let (config, requests) = get_mock_config(200, CREATE_JOB).await;
        let client = BatchOpsClient::new(&config, "123456789012");
        let properties = LogCopyProperties {
            logs_bucket: "my-logs".into(),
            log_prefix: Some("access/".into()),
            ..Default::default()
        };
        let window = TimeWindow::parse(Some("2023-01-01"), Some("2023-01-08"))?;
        let spec = CopyJobSpec::new(&copy_settings(), &properties, window);

        // WHEN creating the job
        let job_id = client.create_job(&spec).await?;

        // THEN the id assigned by Batch Operations is returned
        assert_eq!("0b1a2c3d-4e5f-6789-abcd-ef0123456789", job_id);

        // AND the request carries the copy settings
        let requests = requests.lock().unwrap();
        assert_eq!(1, requests.len());
        assert_eq!("POST", requests[0].method);
        assert!(requests[0].uri.contains("/v20180820/jobs"));

        let body = &requests[0].body;
        assert!(body.contains("<ChecksumAlgorithm>SHA256</ChecksumAlgorithm>"));
        assert!(body.contains("<CannedAccessControlList>private</CannedAccessControlList>"));
        assert!(body.contains("<MetadataDirective>COPY</MetadataDirective>"));
        assert!(body.contains("<MatchAnyPrefix>"));
        assert!(!body.contains("<ExpectedBucketOwner>"));
        assert!(body.contains("<TargetKeyPrefix>s3-access-logs/</TargetKeyPrefix>"));
        assert!(body.contains("<Key>job-created-by</Key>"));
        assert!(body.contains("<Value>aws-support-troubleshooting-tool-for-s3</Value>"));
        assert!(body.contains("arn:aws:s3:::my-logs"));
        assert!(body.contains("access/"));
        assert!(body.contains("2023-01-01T00:00:00Z"));
        assert!(body.contains("2023-01-08T00:00:00Z"));
        assert!(body.contains("INTELLIGENT_TIERING"));
        assert!(body.contains(spec.client_request_token.as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_job_without_prefix() -> Result<(), RuntimeError> {
        // GIVEN a copy job for a whole logs bucket
        let (config, requests) = get_mock_config(200, CREATE_JOB).await;
        let client = BatchOpsClient::new(&config, "123456789012");
        let properties = LogCopyProperties {
            logs_bucket: "my-logs".into(),
            log_prefix: Some("".into()),
            ..Default::default()
        };
        let spec = CopyJobSpec::new(&copy_settings(), &properties, TimeWindow::default());

        // WHEN creating the job
        client.create_job(&spec).await?;

        // THEN the manifest filter has no key constraint
        let requests = requests.lock().unwrap();
        let body = &requests[0].body;
        assert!(body.contains("<MatchAnyStorageClass>"));
        assert!(!body.contains("KeyNameConstraint"));
        assert!(!body.contains("<CreatedAfter>"));

        Ok(())
    }

    #[test]
    fn test_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(1672531200, start_of_day(date).secs());
    }
}
