//! Lambda entrypoint.
//!
//! SDK clients are built once per execution environment; configuration is read from the
//! environment on every invocation and credentials are fetched by the pipeline each time.
use aws_config::BehaviorVersion;
use docpipe::{config, handler, logging, processing::DocumentPipeline};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), Error> {
    config::load_dotenv();
    logging::init_tracing();

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let pipeline = Arc::new(DocumentPipeline::from_sdk_config(&sdk_config));
    tracing::info!("Document pipeline ready");

    run(service_fn(move |event: LambdaEvent<Value>| {
        let pipeline = Arc::clone(&pipeline);
        let span = tracing::info_span!("invocation", request_id = %event.context.request_id);
        async move {
            let response = handler::handle_event(
                pipeline.as_ref(),
                config::Config::from_env(),
                event.payload,
            )
            .await;
            Ok::<_, Error>(response)
        }
        .instrument(span)
    }))
    .await
}
