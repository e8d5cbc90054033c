use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use s3_troubleshooting_tool::{
    config::QueryConfig, event::QueryInvocation, handle_query_invocation, init_tracing,
    AthenaClient,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    // Get AWS Configuration
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = QueryConfig::from_env()?;
    tracing::info!(analysis_type = %config.analysis_type, "query function configured");

    let queries = AthenaClient::new(&sdk_config);

    let (config, queries) = (&config, &queries);
    run(service_fn(move |event: LambdaEvent<QueryInvocation>| async move {
        handle_query_invocation(config, queries, event)
            .await
            .map_err(Error::from)
    }))
    .await
}
