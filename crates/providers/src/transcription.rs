//! Voxtral transcription over `POST /audio/transcriptions`.

use std::time::Instant;

use reqwest::multipart;
use serde_json::Value;

use mc_domain::error::{Error, Result};
use mc_domain::trace::TraceEvent;

use crate::mistral::MistralClient;
use crate::traits::Transcriber;
use crate::util::{from_reqwest, status_error};

#[async_trait::async_trait]
impl Transcriber for MistralClient {
    async fn transcribe(&self, wav: Vec<u8>, language: Option<&str>) -> Result<String> {
        let audio_bytes = wav.len();
        let start = Instant::now();

        let file = multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Other(format!("building multipart body: {e}")))?;

        let mut form = multipart::Form::new()
            .part("file", file)
            .text("model", self.stt_model.clone());
        if let Some(code) = language.map(str::trim).filter(|c| !c.is_empty()) {
            form = form.text("language", code.to_owned());
        }

        tracing::debug!(audio_bytes, language = ?language, "mistral transcription request");

        let resp = self
            .authed(self.client.post(self.url("audio/transcriptions")))
            .timeout(self.transcription_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let err = from_reqwest(e);
                tracing::error!(error = %err, "Mistral STT request failed");
                err
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "Mistral STT returned an error");
            return Err(status_error(status, body));
        }

        let json: Value = serde_json::from_str(&body)?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();

        TraceEvent::TranscriptionCompleted {
            audio_bytes,
            transcript_chars: text.chars().count(),
            language: language.map(str::to_owned),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        if text.is_empty() {
            tracing::warn!("Voxtral returned an empty transcription");
            return Err(Error::Recognition("empty transcription".into()));
        }

        tracing::debug!(transcript = %text, "Voxtral result");
        Ok(text)
    }
}
