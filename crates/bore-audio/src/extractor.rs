//! Listener trace recording, decimation and batching.

use rtrb::{Producer, PushError};

use bore_core::ConfigError;
use bore_frame::{FrameSet, FrameSnapshot, FrameWriter};
use bore_solver::Field;

use crate::batch::{audio_queue, to_pcm, AudioBatch, AudioReceiver};
use crate::config::SoundConfig;
use crate::decimator::{Decimator, Extract};

/// Running counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoundStats {
    /// Listener samples recorded at the native rate.
    pub samples_recorded: u64,
    /// Samples produced by decimation.
    pub samples_decimated: u64,
    /// Batches accepted by the audio queue.
    pub batches_sent: u64,
    /// Batches dropped because the audio queue was full.
    pub batches_skipped: u64,
}

/// Turns per-sub-step listener pressure into audio batches.
///
/// The tick's trace is the write target of the sound rotator; it is
/// published and the rotator advanced once per tick in
/// [`finish_tick`](Self::finish_tick).
pub struct SoundExtractor {
    config: SoundConfig,
    decimator: Decimator,
    tick_start: Decimator,
    replay: Decimator,
    trace: Vec<f32>,
    traces: FrameWriter,
    decimated: Vec<f32>,
    pending: Vec<i16>,
    producer: Producer<AudioBatch>,
    sequence: u64,
    stats: SoundStats,
}

impl std::fmt::Debug for SoundExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundExtractor")
            .field("config", &self.config)
            .field("sequence", &self.sequence)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SoundExtractor {
    /// Create an extractor and the receiving end of its audio queue.
    ///
    /// `frame_count` sets how many listener traces are kept (2 or 3).
    pub fn new(
        config: SoundConfig,
        native_rate: f64,
        frame_count: usize,
    ) -> Result<(Self, AudioReceiver), ConfigError> {
        config.validate(native_rate)?;
        let decimator = Decimator::new(native_rate, config.target_rate as f64)?;
        let traces = FrameWriter::new(frame_count, 0)?;
        let (producer, receiver) = audio_queue(config.queue_capacity);
        let extractor = Self {
            config,
            tick_start: decimator.clone(),
            replay: decimator.clone(),
            decimator,
            trace: Vec::new(),
            traces,
            decimated: Vec::new(),
            pending: Vec::with_capacity(config.batch_len),
            producer,
            sequence: 0,
            stats: SoundStats::default(),
        };
        Ok((extractor, receiver))
    }

    /// Switch to a field with a different native rate.
    ///
    /// Called when the field feeding this extractor is replaced. The
    /// carried decimation position is dropped; pending samples and the
    /// batch sequence continue.
    pub fn retarget(&mut self, native_rate: f64) -> Result<(), ConfigError> {
        self.config.validate(native_rate)?;
        let decimator = Decimator::new(native_rate, self.config.target_rate as f64)?;
        self.tick_start = decimator.clone();
        self.replay = decimator.clone();
        self.decimator = decimator;
        Ok(())
    }

    /// Native samples per output sample.
    pub fn ratio(&self) -> f64 {
        self.decimator.ratio()
    }

    /// Configuration in use.
    pub fn config(&self) -> &SoundConfig {
        &self.config
    }

    /// Counters so far.
    pub fn stats(&self) -> SoundStats {
        self.stats
    }

    /// Sequence number the next batch will carry.
    pub fn next_sequence(&self) -> u64 {
        self.sequence
    }

    /// Published listener traces, one per tick.
    pub fn traces(&self) -> &std::sync::Arc<FrameSet> {
        self.traces.frames()
    }

    /// Samples recorded in the current tick.
    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    /// Record the listener pressure of `field` after a sub-step.
    pub fn record(&mut self, field: &Field) {
        self.record_pressure(field.listener_pressure());
    }

    /// Record one native-rate sample.
    pub fn record_pressure(&mut self, pressure: f32) {
        self.trace.push(pressure);
        self.stats.samples_recorded += 1;
    }

    /// Lazily decimate the most recent complete trace.
    ///
    /// Yields the same samples the last [`finish_tick`](Self::finish_tick)
    /// batched, and may be called any number of times per tick. `None`
    /// before the first tick has finished.
    pub fn extract(&mut self) -> Option<Extract<'_, FrameSnapshot>> {
        let latest = self.traces.frames().latest()?;
        self.replay = self.tick_start.clone();
        Some(self.replay.extract(latest))
    }

    /// Close the tick: publish the trace, decimate it and hand every full
    /// batch to the audio queue.
    ///
    /// Returns the number of batches sent and skipped in this tick. A
    /// partial batch stays pending for the next tick.
    pub fn finish_tick(&mut self) -> (u32, u32) {
        self.traces.publish(&self.trace);
        self.trace.clear();

        self.tick_start = self.decimator.clone();
        if let Some(latest) = self.traces.frames().latest() {
            self.decimated.extend(self.decimator.extract(latest));
        }
        self.stats.samples_decimated += self.decimated.len() as u64;

        let (mut sent, mut skipped) = (0, 0);
        let mut decimated = std::mem::take(&mut self.decimated);
        for &sample in &decimated {
            self.pending.push(to_pcm(sample, self.config.gain));
            if self.pending.len() == self.config.batch_len {
                if self.emit() {
                    sent += 1;
                } else {
                    skipped += 1;
                }
            }
        }
        decimated.clear();
        self.decimated = decimated;
        (sent, skipped)
    }

    /// Hand the pending batch to the queue; `false` if it was skipped.
    fn emit(&mut self) -> bool {
        let sequence = self.sequence;
        self.sequence += 1;
        let samples = std::mem::replace(
            &mut self.pending,
            Vec::with_capacity(self.config.batch_len),
        );
        let batch = AudioBatch {
            samples,
            sample_rate: self.config.target_rate,
            sequence,
        };
        match self.producer.push(batch) {
            Ok(()) => {
                self.stats.batches_sent += 1;
                true
            }
            Err(PushError::Full(_)) => {
                self.stats.batches_skipped += 1;
                tracing::debug!(sequence, "audio queue full, batch skipped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(batch_len: usize, queue_capacity: usize) -> SoundConfig {
        SoundConfig {
            target_rate: 1_000,
            batch_len,
            queue_capacity,
            gain: 1.0,
        }
    }

    #[test]
    fn trace_published_once_per_tick() {
        let (mut ex, _rx) = SoundExtractor::new(small(4, 4), 4_000.0, 3).unwrap();
        for i in 0..8 {
            ex.record_pressure(i as f32 * 0.1);
        }
        assert_eq!(ex.trace_len(), 8);
        assert_eq!(ex.traces().published(), 0);
        ex.finish_tick();
        assert_eq!(ex.trace_len(), 0);
        assert_eq!(ex.traces().published(), 1);
        assert_eq!(ex.traces().latest().unwrap().data().len(), 8);
    }

    #[test]
    fn batches_carry_rate_and_sequence() {
        let (mut ex, mut rx) = SoundExtractor::new(small(2, 4), 4_000.0, 3).unwrap();
        for _ in 0..16 {
            ex.record_pressure(0.5);
        }
        assert_eq!(ex.finish_tick(), (2, 0));
        let batches: Vec<AudioBatch> = rx.drain().collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].sequence, 0);
        assert_eq!(batches[1].sequence, 1);
        assert_eq!(batches[0].sample_rate, 1_000);
        assert_eq!(batches[0].samples, vec![16384, 16384]);
    }

    #[test]
    fn partial_batch_waits_for_next_tick() {
        let (mut ex, mut rx) = SoundExtractor::new(small(3, 4), 1_000.0, 2).unwrap();
        ex.record_pressure(0.0);
        ex.record_pressure(0.0);
        assert_eq!(ex.finish_tick(), (0, 0));
        assert!(rx.try_recv().is_none());
        ex.record_pressure(0.0);
        assert_eq!(ex.finish_tick(), (1, 0));
        assert_eq!(rx.try_recv().unwrap().samples.len(), 3);
    }

    #[test]
    fn full_queue_skips_without_blocking() {
        let (mut ex, mut rx) = SoundExtractor::new(small(1, 2), 1_000.0, 3).unwrap();
        for _ in 0..5 {
            ex.record_pressure(0.1);
        }
        assert_eq!(ex.finish_tick(), (2, 3));
        let stats = ex.stats();
        assert_eq!(stats.batches_sent, 2);
        assert_eq!(stats.batches_skipped, 3);
        assert_eq!(ex.next_sequence(), 5);

        assert_eq!(rx.try_recv().unwrap().sequence, 0);
        ex.record_pressure(0.1);
        assert_eq!(ex.finish_tick(), (1, 0));
        let seqs: Vec<u64> = rx.drain().map(|b| b.sequence).collect();
        assert_eq!(seqs, [1, 5]);
    }

    #[test]
    fn extract_restarts_per_tick() {
        let (mut ex, _rx) = SoundExtractor::new(small(100, 2), 2_000.0, 3).unwrap();
        assert!(ex.extract().is_none());
        for i in 0..6 {
            ex.record_pressure(i as f32);
        }
        ex.finish_tick();
        let samples: Vec<f32> = ex.extract().unwrap().collect();
        assert_eq!(samples, [0.0, 2.0, 4.0]);
        let again: Vec<f32> = ex.extract().unwrap().collect();
        assert_eq!(again, samples);

        // Odd length: the next tick starts one sample in.
        for i in 0..5 {
            ex.record_pressure(10.0 + i as f32);
        }
        ex.finish_tick();
        for i in 0..4 {
            ex.record_pressure(20.0 + i as f32);
        }
        ex.finish_tick();
        let samples: Vec<f32> = ex.extract().unwrap().collect();
        assert_eq!(samples, [21.0, 23.0]);
    }

    #[test]
    fn retarget_keeps_sequence_and_pending() {
        let (mut ex, mut rx) = SoundExtractor::new(small(3, 4), 2_000.0, 3).unwrap();
        for _ in 0..4 {
            ex.record_pressure(0.0);
        }
        assert_eq!(ex.finish_tick(), (0, 0));
        ex.retarget(4_000.0).unwrap();
        assert_eq!(ex.ratio(), 4.0);
        for _ in 0..4 {
            ex.record_pressure(0.0);
        }
        assert_eq!(ex.finish_tick(), (1, 0));
        assert_eq!(rx.try_recv().unwrap().sequence, 0);
        assert!(ex.retarget(500.0).is_err());
        assert_eq!(ex.ratio(), 4.0);
    }
}
