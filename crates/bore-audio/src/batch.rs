//! Audio batches and the queue that carries them to the audio thread.

use rtrb::{Consumer, Producer, RingBuffer};

/// One audio-engine buffer of 16-bit samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioBatch {
    /// Mono samples.
    pub samples: Vec<i16>,
    /// Intended playback rate in Hz.
    pub sample_rate: u32,
    /// Monotonic batch number. Gaps mark batches skipped under backpressure.
    pub sequence: u64,
}

/// Audio-thread end of the batch queue.
pub struct AudioReceiver {
    inner: Consumer<AudioBatch>,
}

impl std::fmt::Debug for AudioReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioReceiver")
            .field("pending", &self.pending())
            .finish()
    }
}

impl AudioReceiver {
    /// Take the oldest batch, if any.
    pub fn try_recv(&mut self) -> Option<AudioBatch> {
        self.inner.pop().ok()
    }

    /// Batches waiting.
    pub fn pending(&self) -> usize {
        self.inner.slots()
    }

    /// Whether the extractor side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.inner.is_abandoned()
    }

    /// Take every waiting batch.
    pub fn drain(&mut self) -> impl Iterator<Item = AudioBatch> + '_ {
        std::iter::from_fn(move || self.try_recv())
    }
}

/// Bounded SPSC batch queue.
pub(crate) fn audio_queue(capacity: usize) -> (Producer<AudioBatch>, AudioReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (producer, AudioReceiver { inner: consumer })
}

/// Scale, clamp and quantise one pressure sample.
pub(crate) fn to_pcm(pressure: f32, gain: f32) -> i16 {
    let scaled = (pressure * gain).clamp(-1.0, 1.0);
    if scaled.is_nan() {
        return 0;
    }
    (scaled * i16::MAX as f32).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_clamps_and_scales() {
        assert_eq!(to_pcm(0.0, 1.0), 0);
        assert_eq!(to_pcm(10.0, 1.0), i16::MAX);
        assert_eq!(to_pcm(-10.0, 1.0), -i16::MAX);
        assert_eq!(to_pcm(0.5, 1.0), 16384);
        assert_eq!(to_pcm(f32::NAN, 1.0), 0);
    }

    #[test]
    fn queue_is_fifo_and_bounded() {
        let (mut tx, mut rx) = audio_queue(2);
        let batch = |sequence| AudioBatch {
            samples: vec![0; 4],
            sample_rate: 44_100,
            sequence,
        };
        tx.push(batch(0)).unwrap();
        tx.push(batch(1)).unwrap();
        assert!(tx.push(batch(2)).is_err());
        assert_eq!(rx.pending(), 2);
        let seqs: Vec<u64> = rx.drain().map(|b| b.sequence).collect();
        assert_eq!(seqs, [0, 1]);
        drop(tx);
        assert!(rx.is_abandoned());
    }
}
