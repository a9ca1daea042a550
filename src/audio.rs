//! Microphone capture and loudness smoothing
//!
//! A cpal input stream hands raw sample chunks to a worker thread over a
//! bounded channel; the worker re-frames them into fixed blocks, reduces
//! each block to one smoothed intensity value, and publishes it to a single
//! latest-wins slot that the game loop drains once per tick. After setup,
//! capture hiccups degrade to silence; they never stop the game.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use thiserror::Error;

use crate::GameConfig;
use crate::consts::*;

/// Chunks in flight between the device callback and the worker
const CHUNK_QUEUE: usize = 8;
/// How often the worker wakes to check the shutdown flag at silence
const WORKER_POLL: Duration = Duration::from_millis(200);
/// How long `stop` waits for the worker before giving up
const SHUTDOWN_WAIT: Duration = Duration::from_secs(1);

/// Capture setup failures; everything after setup degrades instead
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no input device available")]
    NoInputDevice,
    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to query input config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to open capture stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start capture stream: {0}")]
    Start(#[from] cpal::PlayStreamError),
}

/// Single-value hand-off between the capture worker and the game loop
///
/// Publish overwrites whatever is unread; take drains the slot. Neither
/// side ever waits for the other.
#[derive(Debug, Default)]
pub struct IntensityCell {
    slot: Mutex<Option<f32>>,
}

impl IntensityCell {
    pub fn publish(&self, intensity: f32) {
        *self.slot.lock() = Some(intensity);
    }

    /// Latest published value, or `None` when already drained
    pub fn take(&self) -> Option<f32> {
        self.slot.lock().take()
    }
}

/// Reduces fixed blocks of mono samples to one smoothed loudness scalar
///
/// Per block: RMS, then gain, then a short-ring average blended toward the
/// newest value so a shout registers within a block or two without flicker.
#[derive(Debug)]
pub struct LoudnessSmoother {
    gain: f32,
    ring: Vec<f32>,
}

impl LoudnessSmoother {
    pub fn new(gain: f32) -> Self {
        Self {
            gain,
            ring: Vec::with_capacity(SMOOTH_RING),
        }
    }

    /// RMS of one block; empty blocks read as silence
    pub fn block_rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let mean_sq = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
        mean_sq.sqrt()
    }

    /// Fold one block into the ring and return the value to publish
    pub fn push_block(&mut self, samples: &[f32]) -> f32 {
        let amplified = Self::block_rms(samples) * self.gain;
        self.ring.push(amplified);
        if self.ring.len() > SMOOTH_RING {
            self.ring.remove(0);
        }
        let average = self.ring.iter().sum::<f32>() / self.ring.len() as f32;
        average * BLEND_AVERAGE + amplified * BLEND_RECENT
    }
}

/// Continuous microphone sampler
///
/// Owns the capture stream and the worker thread. The game loop only calls
/// `sample`, which never blocks on the device.
pub struct IntensitySampler {
    cell: Arc<IntensityCell>,
    running: Arc<AtomicBool>,
    stream: Option<cpal::Stream>,
    worker: Option<JoinHandle<()>>,
}

impl IntensitySampler {
    /// Open the default input device and begin continuous sampling
    pub fn start(cfg: &GameConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;
        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let channels = stream_config.channels.max(1) as usize;

        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        log::info!(
            "Capturing from {}: {} Hz, {} channel(s), {:?}",
            name,
            stream_config.sample_rate.0,
            channels,
            sample_format
        );

        let cell = Arc::new(IntensityCell::default());
        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = crossbeam_channel::bounded::<Vec<f32>>(CHUNK_QUEUE);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, channels, tx, Arc::clone(&cell))?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, channels, tx, Arc::clone(&cell))?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, channels, tx, Arc::clone(&cell))?
            }
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;

        let worker = CaptureWorker {
            rx,
            cell: Arc::clone(&cell),
            running: Arc::clone(&running),
            smoother: LoudnessSmoother::new(cfg.mic_gain),
            pending: Vec::with_capacity(CAPTURE_BLOCK * 2),
        };
        let handle = thread::spawn(move || worker.run());

        Ok(Self {
            cell,
            running,
            stream: Some(stream),
            worker: Some(handle),
        })
    }

    /// Latest smoothed intensity, or 0.0 when nothing new was published
    ///
    /// Non-blocking and draining: two reads between publishes see the value
    /// once, then silence.
    pub fn sample(&self) -> f32 {
        self.cell.take().unwrap_or(0.0)
    }

    /// Stop capture: flag the worker down, release the device, then wait a
    /// bounded time for the worker to finish
    ///
    /// Dropping the stream also disconnects the chunk channel, so the worker
    /// wakes immediately rather than at its next poll. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.stream.take();

        if let Some(handle) = self.worker.take() {
            let deadline = Instant::now() + SHUTDOWN_WAIT;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
                log::info!("Capture stopped");
            } else {
                log::warn!("Capture worker did not stop within {:?}", SHUTDOWN_WAIT);
            }
        }
    }
}

impl Drop for IntensitySampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build the typed input stream: mix each frame down to mono and hand the
/// chunk to the worker without ever blocking the device callback
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    tx: Sender<Vec<f32>>,
    cell: Arc<IntensityCell>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let data_cb = move |data: &[T], _: &cpal::InputCallbackInfo| {
        let mono: Vec<f32> = data
            .chunks(channels)
            .map(|frame| {
                frame.iter().map(|s| f32::from_sample(*s)).sum::<f32>() / channels as f32
            })
            .collect();
        // A full queue means the worker is behind; drop the chunk rather
        // than stall the device thread.
        let _ = tx.try_send(mono);
    };
    let err_cb = move |err: cpal::StreamError| {
        // Transient capture errors self-heal to silence.
        cell.publish(0.0);
        log::warn!("Capture stream error: {}", err);
    };
    let stream = device.build_input_stream(config, data_cb, err_cb, None)?;
    Ok(stream)
}

/// Worker-side state: re-framing buffer plus the smoother
struct CaptureWorker {
    rx: Receiver<Vec<f32>>,
    cell: Arc<IntensityCell>,
    running: Arc<AtomicBool>,
    smoother: LoudnessSmoother,
    pending: Vec<f32>,
}

impl CaptureWorker {
    /// Blocks only on the chunk channel, with a timeout so the shutdown
    /// flag is observed once per iteration even when the device is silent
    fn run(mut self) {
        while self.running.load(Ordering::Relaxed) {
            match self.rx.recv_timeout(WORKER_POLL) {
                Ok(chunk) => {
                    self.pending.extend_from_slice(&chunk);
                    while self.pending.len() >= CAPTURE_BLOCK {
                        let intensity = self.smoother.push_block(&self.pending[..CAPTURE_BLOCK]);
                        self.cell.publish(intensity);
                        self.pending.drain(..CAPTURE_BLOCK);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("Capture worker exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_publish_overwrites() {
        let cell = IntensityCell::default();
        cell.publish(0.1);
        cell.publish(0.7);
        assert_eq!(cell.take(), Some(0.7));
    }

    #[test]
    fn test_cell_take_drains() {
        let cell = IntensityCell::default();
        assert_eq!(cell.take(), None);
        cell.publish(0.4);
        assert_eq!(cell.take(), Some(0.4));
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn test_rms_of_constant_block() {
        let block = vec![0.5f32; CAPTURE_BLOCK];
        assert!((LoudnessSmoother::block_rms(&block) - 0.5).abs() < 1e-6);

        let silent = vec![0.0f32; CAPTURE_BLOCK];
        assert_eq!(LoudnessSmoother::block_rms(&silent), 0.0);
        assert_eq!(LoudnessSmoother::block_rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_ignores_sign() {
        let block = vec![-0.25f32; 64];
        assert!((LoudnessSmoother::block_rms(&block) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_smoother_blend_sequence() {
        // Gain 5: a constant 0.2 block amplifies to exactly 1.0.
        let mut smoother = LoudnessSmoother::new(5.0);
        let loud = vec![0.2f32; 64];
        let quiet = vec![0.0f32; 64];

        // Ring [1]: avg 1.0 -> 1.0 * 0.3 + 1.0 * 0.7 = 1.0
        assert!((smoother.push_block(&loud) - 1.0).abs() < 1e-5);
        // Ring [1, 0]: avg 0.5 -> 0.5 * 0.3 + 0.0 * 0.7 = 0.15
        assert!((smoother.push_block(&quiet) - 0.15).abs() < 1e-5);
        // Ring [1, 0, 0]: avg 1/3 -> 0.1
        assert!((smoother.push_block(&quiet) - 0.1).abs() < 1e-5);
        // Ring [0, 0, 0]: the loud block has aged out entirely.
        assert_eq!(smoother.push_block(&quiet), 0.0);
    }

    #[test]
    fn test_smoother_biases_toward_newest() {
        let mut smoother = LoudnessSmoother::new(1.0);
        smoother.push_block(&vec![0.0f32; 64]);
        smoother.push_block(&vec![0.0f32; 64]);
        // A sudden shout lands mostly on the recent-value side of the blend.
        let value = smoother.push_block(&vec![0.9f32; 64]);
        assert!(value > 0.9 * BLEND_RECENT);
        assert!(value < 0.9);
    }
}
