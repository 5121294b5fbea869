//! Speech-to-text front end: collects raw PCM from an audio stream, frames
//! it as WAV and hands it to Voxtral.

use std::sync::Arc;

use futures_util::{pin_mut, Stream, StreamExt};

use mc_domain::config::OptionsSource;
use mc_domain::error::{Error, Result};
use mc_providers::{pcm_to_wav, AudioFormat, Transcriber};

/// Languages Voxtral accepts as a hint, as `(code, display name)`.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("gl", "Galician"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("kk", "Kazakh"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("mt", "Maltese"),
    ("my", "Burmese"),
    ("nb", "Norwegian Bokmål"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("th", "Thai"),
    ("tl", "Filipino"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

/// Audio container and codec accepted from capture.
pub const SUPPORTED_CONTAINER: &str = "wav";
pub const SUPPORTED_CODEC: &str = "pcm";

/// Description of the incoming raw audio.
pub type SpeechMetadata = AudioFormat;

pub struct SpeechToText {
    transcriber: Arc<dyn Transcriber>,
    options: Arc<dyn OptionsSource>,
}

impl SpeechToText {
    pub fn new(transcriber: Arc<dyn Transcriber>, options: Arc<dyn OptionsSource>) -> Self {
        Self {
            transcriber,
            options,
        }
    }

    pub fn supported_languages() -> Vec<&'static str> {
        SUPPORTED_LANGUAGES.iter().map(|(code, _)| *code).collect()
    }

    /// 16 kHz, mono, 16-bit.
    pub fn supported_format() -> AudioFormat {
        AudioFormat::default()
    }

    /// Drain `stream`, wrap the PCM in WAV and transcribe it.
    ///
    /// Empty audio is a recognition error and no request is made. The
    /// language hint is read from the current options.
    pub async fn process_audio_stream<S, B>(&self, metadata: SpeechMetadata, stream: S) -> Result<String>
    where
        S: Stream<Item = B>,
        B: AsRef<[u8]>,
    {
        pin_mut!(stream);
        let mut pcm = Vec::new();
        while let Some(chunk) = stream.next().await {
            pcm.extend_from_slice(chunk.as_ref());
        }

        if pcm.is_empty() {
            tracing::warn!("STT: received empty audio stream");
            return Err(Error::Recognition("empty audio stream".into()));
        }
        if pcm.len() < metadata.frame_bytes() {
            tracing::warn!(bytes = pcm.len(), "STT: audio shorter than one sample frame");
            return Err(Error::Recognition("audio holds no complete sample".into()));
        }

        if metadata != Self::supported_format() {
            tracing::debug!(?metadata, "STT: audio differs from the advertised format");
        }
        tracing::debug!(
            bytes = pcm.len(),
            sample_rate = metadata.sample_rate,
            channels = metadata.channels,
            bits = metadata.bits_per_sample,
            "STT: collected PCM"
        );

        let wav = pcm_to_wav(&pcm, metadata)?;
        let opts = self.options.options();
        self.transcriber.transcribe(wav, opts.stt_language_hint()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use mc_domain::config::ConversationOptions;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeTranscriber {
        seen: Mutex<Vec<(usize, Option<String>)>>,
        reply: String,
    }

    #[async_trait::async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, wav: Vec<u8>, language: Option<&str>) -> Result<String> {
            self.seen.lock().push((wav.len(), language.map(String::from)));
            if self.reply.is_empty() {
                Err(Error::Recognition("empty transcription".into()))
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    fn stt(reply: &str, language: &str) -> (Arc<FakeTranscriber>, SpeechToText) {
        let fake = Arc::new(FakeTranscriber {
            reply: reply.into(),
            ..Default::default()
        });
        let opts = ConversationOptions {
            stt_language: language.into(),
            ..Default::default()
        };
        (fake.clone(), SpeechToText::new(fake, Arc::new(opts)))
    }

    #[tokio::test]
    async fn empty_audio_never_reaches_the_service() {
        let (fake, stt) = stt("hello", "");
        let chunks: Vec<Vec<u8>> = vec![Vec::new(), Vec::new()];
        let err = stt
            .process_audio_stream(AudioFormat::default(), stream::iter(chunks))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Recognition(_)));
        assert!(fake.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn partial_frame_never_reaches_the_service() {
        let (fake, stt) = stt("phantom", "");
        let err = stt
            .process_audio_stream(AudioFormat::default(), stream::iter(vec![vec![0u8; 1]]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Recognition(_)));

        let stereo = AudioFormat {
            channels: 2,
            ..AudioFormat::default()
        };
        let err = stt
            .process_audio_stream(stereo, stream::iter(vec![vec![0u8; 3]]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Recognition(_)));
        assert!(fake.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn chunks_are_joined_and_framed() {
        let (fake, stt) = stt("turn on the light", " nl ");
        let chunks = vec![vec![0u8; 320], vec![1u8; 320]];
        let text = stt
            .process_audio_stream(AudioFormat::default(), stream::iter(chunks))
            .await
            .unwrap();
        assert_eq!(text, "turn on the light");

        let seen = fake.seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0 > 640);
        assert_eq!(seen[0].1.as_deref(), Some("nl"));
    }

    #[tokio::test]
    async fn blank_language_means_auto_detect() {
        let (fake, stt) = stt("hi", "   ");
        stt.process_audio_stream(AudioFormat::default(), stream::iter(vec![[7u8; 4]]))
            .await
            .unwrap();
        assert_eq!(fake.seen.lock()[0].1, None);
    }

    #[tokio::test]
    async fn empty_transcript_is_recognition_error() {
        let (_, stt) = stt("", "");
        let err = stt
            .process_audio_stream(AudioFormat::default(), stream::iter(vec![vec![0u8; 64]]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Recognition(_)));
    }

    #[test]
    fn advertised_capabilities() {
        let langs = SpeechToText::supported_languages();
        assert!(langs.contains(&"nl"));
        assert!(!langs.contains(&""));
        let fmt = SpeechToText::supported_format();
        assert_eq!((fmt.sample_rate, fmt.channels, fmt.bits_per_sample), (16_000, 1, 16));
    }
}
