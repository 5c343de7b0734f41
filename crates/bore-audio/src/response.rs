//! Frequency-characteristic measurement.
//!
//! While the exciter sweeps, each listener sample is attributed to the
//! sweep's instantaneous frequency and folded into a log-spaced bin as a
//! running peak.

/// Peak response in one frequency bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponseBin {
    /// Geometric centre of the bin in Hz.
    pub center_hz: f32,
    /// Peak absolute listener pressure seen in the bin.
    pub magnitude: f32,
}

impl ResponseBin {
    /// Magnitude in dB relative to `reference`. `-inf` for silence.
    pub fn magnitude_db(&self, reference: f32) -> f32 {
        20.0 * (self.magnitude / reference).log10()
    }
}

/// Result of one measurement run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyResponse {
    /// Bins in ascending frequency.
    pub bins: Vec<ResponseBin>,
    /// Samples folded in.
    pub samples: u64,
}

impl FrequencyResponse {
    /// The bin with the largest magnitude.
    pub fn peak(&self) -> Option<ResponseBin> {
        self.bins
            .iter()
            .copied()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }
}

/// Accumulates a [`FrequencyResponse`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseMeter {
    low_hz: f32,
    log_span: f32,
    peaks: Vec<f32>,
    samples: u64,
}

impl ResponseMeter {
    /// Meter with `bins` log-spaced bins over `[low_hz, high_hz]`.
    ///
    /// Degenerate ranges collapse to a single bin.
    pub fn new(low_hz: f32, high_hz: f32, bins: usize) -> Self {
        let bins = bins.max(1);
        let log_span = if high_hz > low_hz && low_hz > 0.0 {
            (high_hz / low_hz).ln()
        } else {
            0.0
        };
        Self {
            low_hz,
            log_span,
            peaks: vec![0.0; bins],
            samples: 0,
        }
    }

    fn bin_of(&self, frequency: f32) -> Option<usize> {
        if self.log_span == 0.0 {
            return Some(0);
        }
        if frequency < self.low_hz {
            return None;
        }
        let x = (frequency / self.low_hz).ln() / self.log_span;
        let bin = (x * self.peaks.len() as f32) as usize;
        // The top edge belongs to the last bin.
        (x <= 1.0).then(|| bin.min(self.peaks.len() - 1))
    }

    /// Fold one listener sample taken at `frequency`.
    pub fn record(&mut self, frequency: f32, pressure: f32) {
        if let Some(bin) = self.bin_of(frequency) {
            let peak = &mut self.peaks[bin];
            *peak = peak.max(pressure.abs());
            self.samples += 1;
        }
    }

    /// Samples folded so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Close the run.
    pub fn finish(self) -> FrequencyResponse {
        let n = self.peaks.len() as f32;
        let bins = self
            .peaks
            .iter()
            .enumerate()
            .map(|(i, &magnitude)| ResponseBin {
                center_hz: self.low_hz * ((i as f32 + 0.5) / n * self.log_span).exp(),
                magnitude,
            })
            .collect();
        FrequencyResponse {
            bins,
            samples: self.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_are_log_spaced() {
        let r = ResponseMeter::new(10.0, 1000.0, 2).finish();
        assert!((r.bins[0].center_hz - 31.622_776).abs() < 1e-3);
        assert!((r.bins[1].center_hz - 316.227_77).abs() < 1e-2);
    }

    #[test]
    fn records_peak_per_bin() {
        let mut m = ResponseMeter::new(10.0, 1000.0, 2);
        m.record(20.0, 0.5);
        m.record(20.0, -0.8);
        m.record(500.0, 0.1);
        m.record(1000.0, 0.3);
        m.record(5.0, 9.0);
        m.record(2000.0, 9.0);
        assert_eq!(m.samples(), 4);
        let r = m.finish();
        assert_eq!(r.bins[0].magnitude, 0.8);
        assert_eq!(r.bins[1].magnitude, 0.3);
        assert_eq!(r.peak().unwrap().magnitude, 0.8);
    }

    #[test]
    fn db_relative_to_reference() {
        let bin = ResponseBin {
            center_hz: 100.0,
            magnitude: 10.0,
        };
        assert!((bin.magnitude_db(1.0) - 20.0).abs() < 1e-5);
    }
}
