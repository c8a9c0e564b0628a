//! [`SpeechProviderPort`] implementation for [`ElevenLabsClient`].

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use mentorchat_core::{AudioStream, ProviderError, ProviderRequest, SpeechProviderPort};

use crate::client::ElevenLabsClient;

#[async_trait]
impl SpeechProviderPort for ElevenLabsClient {
    fn is_configured(&self) -> bool {
        self.config().has_api_key()
    }

    async fn synthesize(&self, request: ProviderRequest) -> Result<AudioStream, ProviderError> {
        let response = self.start_synthesis(&request).await.map_err(|e| {
            tracing::warn!(voice_id = %request.voice_id, error = %e, "ElevenLabs request failed");
            ProviderError::from(e)
        })?;

        Ok(response
            .bytes_stream()
            .map_err(|e| ProviderError::Stream(e.to_string()))
            .boxed())
    }
}
