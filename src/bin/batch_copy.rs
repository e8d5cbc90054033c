use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use s3_troubleshooting_tool::{
    config::BatchCopyConfig, event::StackEvent, handle_stack_event, init_tracing, BatchOpsClient,
    LambdaQueryTrigger, SnsNotifier,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    // Get AWS Configuration
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = BatchCopyConfig::from_env()?;

    let jobs = BatchOpsClient::new(&sdk_config, &config.copy.account_id);
    let notifier = SnsNotifier::new(&sdk_config, &config.sns_topic_arn);
    let trigger = LambdaQueryTrigger::new(&sdk_config, &config.query_function);

    let (config, jobs, notifier, trigger) = (&config, &jobs, &notifier, &trigger);
    run(service_fn(move |event: LambdaEvent<StackEvent>| async move {
        handle_stack_event(config, jobs, notifier, trigger, event)
            .await
            .map_err(Error::from)
    }))
    .await
}
