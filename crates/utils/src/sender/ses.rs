use aws_sdk_sesv2::{
    error::DisplayErrorContext,
    primitives::Blob,
    types::{Destination, EmailContent, RawMessage},
    Client,
};
use tracing::{error, info};

use crate::{MessageSender, SendError, SendFuture};

/// Sender delivering raw messages through SES.
///
/// The sending identity is taken from the `From` header of the raw
/// message, so it must be verified in SES.
pub struct SesSender {
    client: Client,
}

impl SesSender {
    /// Creates a new [`SesSender`] using an existing client.
    pub fn new(client: Client) -> Self {
        info!("SES sender initialized");
        Self { client }
    }

    /// Creates a new [`SesSender`] from shared SDK configuration.
    pub fn from_conf(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }
}

impl MessageSender for SesSender {
    fn send<'a>(&'a self, destination: &'a str, raw: &'a [u8]) -> SendFuture<'a> {
        Box::pin(async move {
            let raw_message = RawMessage::builder()
                .data(Blob::new(raw))
                .build()
                .map_err(|e| SendError::Backend(e.to_string()))?;

            let output = self
                .client
                .send_email()
                .destination(Destination::builder().to_addresses(destination).build())
                .content(EmailContent::builder().raw(raw_message).build())
                .send()
                .await
                .map_err(|e| {
                    error!(
                        destination = %destination,
                        error = %DisplayErrorContext(&e),
                        "Failed to send email through SES"
                    );
                    SendError::Backend(DisplayErrorContext(&e).to_string())
                })?;

            info!(
                destination = %destination,
                ses_message_id = output.message_id().unwrap_or_default(),
                size = raw.len(),
                "Sent email through SES"
            );
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "ses"
    }
}
