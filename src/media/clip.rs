//! In-memory WAV encoding for captured voice clips.

use super::MediaError;
use std::io::Cursor;

/// Encode mono f32 samples into a 16-bit PCM WAV buffer.
pub fn encode_wav_clip(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, MediaError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|err| MediaError::Failed(format!("wav writer: {err}")))?;
    for sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(scaled)
            .map_err(|err| MediaError::Failed(format!("wav sample: {err}")))?;
    }
    writer
        .finalize()
        .map_err(|err| MediaError::Failed(format!("wav finalize: {err}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::TARGET_SAMPLE_RATE;

    #[test]
    fn encodes_riff_wave_header() {
        let wav = encode_wav_clip(&[0.0, 0.5, -0.5], TARGET_SAMPLE_RATE).expect("encode");
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
    }

    #[test]
    fn empty_input_still_produces_valid_container() {
        let wav = encode_wav_clip(&[], TARGET_SAMPLE_RATE).expect("encode");
        assert!(wav.len() >= 44, "header-only WAV expected");
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let wav = encode_wav_clip(&[2.0, -2.0], TARGET_SAMPLE_RATE).expect("encode");
        let mut reader = hound::WavReader::new(Cursor::new(wav)).expect("read back");
        let decoded: Vec<i16> = reader
            .samples::<i16>()
            .collect::<Result<_, _>>()
            .expect("samples");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], i16::MAX);
        // -2.0 clamps to -1.0, which scales to -i16::MAX (not i16::MIN).
        assert_eq!(decoded[1], -i16::MAX);
    }
}
