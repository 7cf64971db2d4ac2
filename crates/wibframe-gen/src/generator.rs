use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wibframe_frame::layout::{CRATE_NO, FIBER_NO, SLOT_NO};
use wibframe_frame::{
    Frame, FrameWriter, WriterConfig, CHANNELS_PER_STREAM, NUM_BLOCKS, STREAMS_PER_BLOCK,
};

use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::naming::FileNaming;

/// Redraws allowed for a negative noise sample before it is clamped to 0.
pub const MAX_NOISE_RETRIES: u32 = 64;

/// Produces filled, checksummed frames one at a time.
///
/// Each generator owns its RNG, its timestamp clock and its frame counter,
/// so independent generators never interfere.
pub struct FrameGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    frame: Frame,
    next_timestamp: u64,
    frames_generated: u64,
}

impl FrameGenerator {
    /// Build a generator after validating `config`.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let next_timestamp = config.start_timestamp.unwrap_or_else(wall_clock_nanos);
        Ok(Self {
            config,
            rng,
            frame: Frame::new(),
            next_timestamp,
            frames_generated: 0,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Frames filled by this generator so far.
    pub fn frames_generated(&self) -> u64 {
        self.frames_generated
    }

    /// The most recently filled frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Fill the next frame and return a reference to it.
    ///
    /// The header gets SOF 0, the configured version and identity, a
    /// random WIB error flag and the next timestamp. Every channel gets
    /// `binomial(2A, 0.5) - A + pedestal`, each block gets random S1/S2
    /// flags, reserved bits are cleared and all checksums are recomputed.
    pub fn fill(&mut self) -> &Frame {
        let mut frame = Frame::new();

        frame.set_sof(0);
        frame.set_version(self.config.version);
        match self.config.identity {
            Some(identity) => {
                frame.set_fiber_no(identity.fiber_no);
                frame.set_slot_no(identity.slot_no);
                frame.set_crate_no(identity.crate_no);
            }
            None => {
                frame.set_fiber_no(self.rng.gen_range(0..1 << FIBER_NO.width()));
                frame.set_slot_no(self.rng.gen_range(0..1 << SLOT_NO.width()));
                frame.set_crate_no(self.rng.gen_range(0..1 << CRATE_NO.width()));
            }
        }
        let wib_error = self.error_flag();
        frame.set_wib_errors(u16::from(wib_error));

        frame.set_z(self.config.z);
        frame.set_timestamp(self.next_timestamp);
        self.next_timestamp = self.next_timestamp.wrapping_add(self.config.tick);

        for block in 0..NUM_BLOCKS {
            for adc in 0..STREAMS_PER_BLOCK {
                for ch in 0..CHANNELS_PER_STREAM {
                    let value = self.sample_channel();
                    frame.set_channel(block, adc, ch, value);
                }
            }
            let s1 = self.error_flag();
            let s2 = self.error_flag();
            frame.set_s1_error(block, u8::from(s1));
            frame.set_s2_error(block, u8::from(s2));
            if s1 || s2 || wib_error {
                tracing::debug!(block, s1, s2, wib_error, "raised error flag");
            }
        }

        frame.clear_reserved();
        frame.reset_checksums_with(self.config.crc);

        self.frame = frame;
        self.frames_generated += 1;
        &self.frame
    }

    /// Fill the next frame and return an owned copy.
    pub fn next_frame(&mut self) -> Frame {
        self.fill().clone()
    }

    /// Generate `n` frames into one writer. Does not call
    /// [`FrameWriter::finish`].
    pub fn write_frames<W: Write>(&mut self, n: u64, writer: &mut FrameWriter<W>) -> Result<()> {
        for i in 0..n {
            writer.write_frame(self.fill())?;
            log_progress(i + 1, n);
        }
        Ok(())
    }

    /// Generate `n` frames, one file each, named by `naming`.
    ///
    /// Stops at the first file that cannot be created; files written
    /// before it are kept.
    pub fn generate_files(
        &mut self,
        n: u64,
        naming: &FileNaming,
        config: &WriterConfig,
    ) -> Result<Vec<PathBuf>> {
        tracing::info!(count = n, dir = %naming.dir.display(), "generating frame files");
        let mut paths = Vec::new();
        for i in 0..n {
            let path = naming.frame_path(i);
            let mut writer = create_writer(&path, config.clone())?;
            writer.write_frame(self.fill())?;
            writer.finish()?;
            paths.push(path);
            log_progress(i + 1, n);
        }
        Ok(paths)
    }

    /// Generate `n` frames into the single batch file named by `naming`.
    pub fn generate_single_file(
        &mut self,
        n: u64,
        naming: &FileNaming,
        config: &WriterConfig,
    ) -> Result<PathBuf> {
        let path = naming.batch_path();
        tracing::info!(count = n, path = %path.display(), "generating frame batch");
        let config = WriterConfig {
            declared_frames: n,
            ..config.clone()
        };
        let mut writer = create_writer(&path, config)?;
        self.write_frames(n, &mut writer)?;
        writer.finish()?;
        Ok(path)
    }

    fn error_flag(&mut self) -> bool {
        self.rng.gen::<f64>() < self.config.err_prob
    }

    fn sample_channel(&mut self) -> u16 {
        let amplitude = i32::from(self.config.amplitude);
        let pedestal = i32::from(self.config.pedestal);
        let trials = 2 * u32::from(self.config.amplitude);
        for _ in 0..MAX_NOISE_RETRIES {
            let noise = binomial_half(&mut self.rng, trials) as i32;
            let value = noise - amplitude + pedestal;
            if value >= 0 {
                return value as u16;
            }
        }
        tracing::debug!(
            pedestal,
            amplitude,
            retries = MAX_NOISE_RETRIES,
            "noise sample stayed negative, clamping to 0"
        );
        0
    }
}

fn create_writer(path: &Path, config: WriterConfig) -> Result<FrameWriter<BufWriter<File>>> {
    let file = File::create(path).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "cannot create frame file");
        GenError::Open {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(FrameWriter::with_config(BufWriter::new(file), config))
}

/// Draw from `binomial(trials, 0.5)` as the population count of `trials`
/// uniform random bits.
fn binomial_half<R: Rng>(rng: &mut R, trials: u32) -> u32 {
    let mut remaining = trials;
    let mut count = 0;
    while remaining >= u64::BITS {
        count += rng.gen::<u64>().count_ones();
        remaining -= u64::BITS;
    }
    if remaining > 0 {
        let mask = (1u64 << remaining) - 1;
        count += (rng.gen::<u64>() & mask).count_ones();
    }
    count
}

fn wall_clock_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn log_progress(done: u64, total: u64) {
    let step = (total / 10).max(1);
    if done % step == 0 || done == total {
        tracing::info!(
            done,
            total,
            percent = done.saturating_mul(100) / total,
            "generation progress"
        );
    }
}
