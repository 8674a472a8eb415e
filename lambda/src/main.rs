use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use remail_utils::{Config, ForwardEvent, Forwarder, S3ObjectStore, SesSender};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_current_span(false)
        .without_time()
        .init();

    // Fails before the runtime starts taking invocations
    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    let sdk_config = aws_config::load_from_env().await;
    let sender = Arc::new(SesSender::from_conf(&sdk_config));

    let mut forwarder = Forwarder::new(config, sender);
    if let Some(bucket) = forwarder.config().bucket_name.clone() {
        forwarder = forwarder.with_store(Arc::new(S3ObjectStore::from_conf(&sdk_config, bucket)));
    }

    info!(forwarder = ?forwarder, "Remail forwarder ready");

    let forwarder = &forwarder;
    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle(forwarder, event).await
    }))
    .await
}

/// Decodes the invocation payload and forwards every record it carries.
async fn handle(forwarder: &Forwarder, event: LambdaEvent<Value>) -> Result<(), Error> {
    let request_id = event.context.request_id;
    let event = ForwardEvent::from_value(event.payload).map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to decode event");
        e
    })?;

    info!(
        request_id = %request_id,
        records = event.records.len(),
        "Received event"
    );
    forwarder.handle(&event).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lambda_runtime::Context;
    use remail_utils::{Config, EmailMessage, ForwardError, MemoryObjectStore, MemorySender};
    use serde_json::json;

    use super::*;

    fn stored_invocation(message_id: &str) -> LambdaEvent<Value> {
        let payload = json!({
            "Records": [{
                "eventSource": "aws:ses",
                "ses": { "mail": { "messageId": message_id } }
            }]
        });
        LambdaEvent::new(payload, Context::default())
    }

    #[tokio::test]
    async fn test_handle_forwards_stored_delivery() {
        let sender = Arc::new(MemorySender::new());
        let store = Arc::new(MemoryObjectStore::new());
        store.insert("msg-1", b"From: Alice <a@x.com>\r\nSubject: Hi\r\n\r\nBody".to_vec());
        let forwarder = Forwarder::new(Config::new("s@y.com", "t@z.com"), sender.clone())
            .with_store(store.clone());

        handle(&forwarder, stored_invocation("msg-1")).await.unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, "t@z.com");
        assert_eq!(
            EmailMessage::parse(&sent[0].raw).header("From"),
            Some("Alice <s@y.com>")
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_handle_rejects_empty_event() {
        let sender = Arc::new(MemorySender::new());
        let forwarder = Forwarder::new(Config::new("s@y.com", "t@z.com"), sender.clone());

        let result = handle(
            &forwarder,
            LambdaEvent::new(json!({ "Records": [] }), Context::default()),
        )
        .await;

        assert!(result.is_err());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_handle_propagates_forward_errors() {
        let sender = Arc::new(MemorySender::new());
        let forwarder = Forwarder::new(Config::new("s@y.com", "t@z.com"), sender);

        let error = handle(&forwarder, stored_invocation("msg-1"))
            .await
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ForwardError>(),
            Some(ForwardError::StoreNotConfigured)
        ));
    }
}
