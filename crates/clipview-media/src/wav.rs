use std::io::{Cursor, Seek, Write};
use std::path::Path;

use clipview_core::audio::{AudioClip, chunks};

use crate::error::Result;

/// Samples are clamped to this magnitude before quantizing.
const PEAK: f32 = 0.99;

const CHUNK_FRAMES: usize = 4096;

fn write_pcm<W: Write + Seek>(clip: &dyn AudioClip, writer: W) -> Result<()> {
    let spec = hound::WavSpec {
        channels: clip.channels(),
        sample_rate: clip.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav = hound::WavWriter::new(writer, spec)?;
    for chunk in chunks(clip, CHUNK_FRAMES) {
        for s in chunk {
            wav.write_sample((s.clamp(-PEAK, PEAK) * i16::MAX as f32) as i16)?;
        }
    }
    wav.finalize()?;
    Ok(())
}

/// Encode `clip` as a 16-bit PCM WAV file in memory.
pub fn encode_wav(clip: &dyn AudioClip) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_pcm(clip, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Write `clip` to `path` as a 16-bit PCM WAV file.
pub fn write_wav(clip: &dyn AudioClip, path: &Path) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_pcm(clip, file)?;
    log::debug!("wrote {:.3}s of audio to {}", clip.duration(), path.display());
    Ok(())
}
