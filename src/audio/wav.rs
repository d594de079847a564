// WAV dumping
//
// Standard RIFF/WAVE container: a 16-byte fmt chunk describing 16-bit mono
// PCM at 44100 Hz, then the data chunk. The size fields are rewritten with
// the true sample count when the writer closes.

use crate::apu::constants::SAMPLE_RATE;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 40;
const HEADER_SIZE: u32 = 44;

/// Streaming WAV file writer
pub struct WavWriter {
    file: File,
    /// Samples written so far
    sample_count: u32,
    finalized: bool,
}

impl WavWriter {
    /// Create the file and write a header with placeholder sizes
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut file = File::create(path.as_ref())?;

        let byte_rate = SAMPLE_RATE * 2; // mono, 16-bit
        file.write_all(b"RIFF")?;
        file.write_all(&0u32.to_le_bytes())?; // rewritten at close
        file.write_all(b"WAVE")?;

        file.write_all(b"fmt ")?;
        file.write_all(&16u32.to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?; // PCM
        file.write_all(&1u16.to_le_bytes())?; // mono
        file.write_all(&SAMPLE_RATE.to_le_bytes())?;
        file.write_all(&byte_rate.to_le_bytes())?;
        file.write_all(&2u16.to_le_bytes())?; // block align
        file.write_all(&16u16.to_le_bytes())?; // bits per sample

        file.write_all(b"data")?;
        file.write_all(&0u32.to_le_bytes())?; // rewritten at close

        log::info!(target: "famicore::apu", "WAV dump started: {}", path.as_ref().display());
        Ok(WavWriter {
            file,
            sample_count: 0,
            finalized: false,
        })
    }

    /// Append a batch of samples
    pub fn write_samples(&mut self, samples: &[i16]) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for &sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        self.file.write_all(&bytes)?;
        self.sample_count += samples.len() as u32;
        Ok(())
    }

    /// Rewrite the header with the true sizes
    pub fn finalize(&mut self) -> io::Result<()> {
        if self.finalized {
            return Ok(());
        }
        let data_bytes = self.sample_count * 2;

        self.file.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
        self.file
            .write_all(&(HEADER_SIZE - 8 + data_bytes).to_le_bytes())?;
        self.file.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
        self.file.write_all(&data_bytes.to_le_bytes())?;
        self.file.flush()?;

        self.finalized = true;
        log::info!(
            target: "famicore::apu",
            "WAV dump closed: {} samples",
            self.sample_count
        );
        Ok(())
    }
}

impl Drop for WavWriter {
    fn drop(&mut self) {
        let _ = self.finalize();
    }
}
