use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use s3_troubleshooting_tool::{
    config::ReportConfig, event::S3Event, handle_query_results, init_tracing, SnsNotifier,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    // Get AWS Configuration
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = ReportConfig::from_env()?;

    let notifier = SnsNotifier::new(&sdk_config, &config.sns_topic_arn);

    let notifier = &notifier;
    run(service_fn(move |event: LambdaEvent<S3Event>| async move {
        handle_query_results(notifier, event)
            .await
            .map_err(Error::from)
    }))
    .await
}
