//! Minimal RIFF/WAV framing for raw PCM captured by the host.

use std::io::Cursor;

use mc_domain::error::{Error, Result};

/// Shape of the raw PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for AudioFormat {
    /// 16 kHz mono 16-bit, the format voice satellites deliver.
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl AudioFormat {
    fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes in one sample across all channels.
    pub fn frame_bytes(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }
}

/// Wrap little-endian integer PCM in a WAV container.
///
/// Supports 8, 16, 24 and 32-bit samples. A trailing partial sample is
/// dropped.
pub fn pcm_to_wav(pcm: &[u8], format: AudioFormat) -> Result<Vec<u8>> {
    if format.channels == 0 || format.sample_rate == 0 {
        return Err(Error::Other(format!("invalid audio format: {format:?}")));
    }
    let width = format.bytes_per_sample();
    if !matches!(format.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(Error::Other(format!(
            "unsupported sample width: {} bits",
            format.bits_per_sample
        )));
    }

    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(wav_err)?;
        for chunk in pcm.chunks_exact(width) {
            let written = match width {
                // 8-bit WAV is unsigned on disk; hound takes signed i8 and
                // applies the offset itself.
                1 => writer.write_sample((chunk[0] as i16 - 128) as i8),
                2 => writer.write_sample(i16::from_le_bytes([chunk[0], chunk[1]])),
                3 => {
                    // Sign-extend the 24-bit value.
                    let v = i32::from_le_bytes([0, chunk[0], chunk[1], chunk[2]]) >> 8;
                    writer.write_sample(v)
                }
                _ => writer.write_sample(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])),
            };
            written.map_err(wav_err)?;
        }
        writer.finalize().map_err(wav_err)?;
    }
    Ok(cursor.into_inner())
}

fn wav_err(e: hound::Error) -> Error {
    Error::Other(format!("wav encoding: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_pcm16_with_header() {
        let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = pcm_to_wav(&pcm, AudioFormat::default()).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(wav.len() > pcm.len());

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn stereo_48k_header() {
        let format = AudioFormat {
            sample_rate: 48_000,
            channels: 2,
            bits_per_sample: 16,
        };
        let wav = pcm_to_wav(&[0u8; 16], format).unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 48_000);
        assert_eq!(reader.duration(), 4);
    }

    #[test]
    fn rejects_odd_sample_width() {
        let format = AudioFormat {
            bits_per_sample: 12,
            ..Default::default()
        };
        assert!(pcm_to_wav(&[0u8; 4], format).is_err());
    }
}
