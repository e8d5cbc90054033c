use crate::{error::RuntimeError, services::Notifier};
use async_trait::async_trait;
use aws_sdk_sns::{Client, Error};

/// Subject of every operator notification.
pub const NOTIFICATION_SUBJECT: &str = "Notification from AWS Support Troubleshooting Tool";

/// SNS notifier implementation.
pub struct SnsNotifier {
    inner: Client,
    topic_arn: String,
}

impl SnsNotifier {
    /// Initialize the notifier for a single topic.
    #[tracing::instrument(skip(config))]
    pub fn new(config: &aws_types::SdkConfig, topic_arn: &str) -> SnsNotifier {
        tracing::info!("Initializing SNS client");
        SnsNotifier {
            inner: Client::new(config),
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    #[tracing::instrument(skip(self, message))]
    async fn notify(&self, message: &str) -> Result<(), RuntimeError> {
        let res = self
            .inner
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(NOTIFICATION_SUBJECT)
            .message(message)
            .send()
            .await
            .map_err(Error::from)?;

        tracing::info!(message_id = res.message_id(), "notification published");
        Ok(())
    }
}
