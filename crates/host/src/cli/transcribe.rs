//! `mistral-conversation transcribe`: run a WAV file through speech-to-text.
//!
//! The file's PCM payload is streamed to [`SpeechToText`] in chunks, the
//! same way a voice satellite delivers audio.
//!
//! [`SpeechToText`]: mc_assist::SpeechToText

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use mc_domain::config::Config;
use mc_providers::AudioFormat;

use crate::bootstrap::{self, KeyCheck};

/// 100 ms of 16 kHz mono 16-bit audio.
const CHUNK_BYTES: usize = 3_200;

pub async fn transcribe(config: Arc<Config>, path: String, language: Option<String>) -> anyhow::Result<()> {
    let (format, pcm) = read_pcm(Path::new(&path))?;
    tracing::info!(
        path = %path,
        bytes = pcm.len(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "loaded audio"
    );

    let state = bootstrap::build_app_state(config, KeyCheck::Skip).await?;
    if let Some(code) = language {
        state.options.update(|o| o.stt_language = code);
    }

    let chunks: Vec<Vec<u8>> = pcm.chunks(CHUNK_BYTES).map(<[u8]>::to_vec).collect();
    let text = state
        .stt
        .process_audio_stream(format, futures_util::stream::iter(chunks))
        .await
        .context("transcription failed")?;

    println!("{text}");
    Ok(())
}

/// Read an integer PCM WAV file into its format and little-endian payload.
pub fn read_pcm(path: &Path) -> anyhow::Result<(AudioFormat, Vec<u8>)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int {
        anyhow::bail!("{}: only integer PCM is supported", path.display());
    }

    let width = usize::from(spec.bits_per_sample / 8);
    let mut pcm = Vec::with_capacity(reader.len() as usize * width);
    for sample in reader.samples::<i32>() {
        let sample = sample.with_context(|| format!("reading {}", path.display()))?;
        match spec.bits_per_sample {
            8 => pcm.push((sample + 128) as u8),
            16 => pcm.extend_from_slice(&(sample as i16).to_le_bytes()),
            24 => pcm.extend_from_slice(&sample.to_le_bytes()[..3]),
            32 => pcm.extend_from_slice(&sample.to_le_bytes()),
            other => anyhow::bail!("{}: unsupported sample width {other}", path.display()),
        }
    }

    let format = AudioFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
    };
    Ok((format, pcm))
}
