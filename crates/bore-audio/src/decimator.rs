//! Fixed-ratio nearest-neighbour decimation.

use bore_core::ConfigError;

/// Picks every `native_rate / target_rate`-th sample, truncating the
/// running position to an index.
///
/// The fractional position carries over between traces, so consecutive
/// ticks decimate as one continuous stream.
#[derive(Clone, Debug, PartialEq)]
pub struct Decimator {
    ratio: f64,
    carry: f64,
}

impl Decimator {
    /// Decimator from `native_rate` down to `target_rate`.
    ///
    /// # Errors
    ///
    /// Fails if either rate is not positive or the target exceeds the
    /// native rate.
    pub fn new(native_rate: f64, target_rate: f64) -> Result<Self, ConfigError> {
        if !(native_rate > 0.0 && target_rate > 0.0 && native_rate >= target_rate) {
            return Err(ConfigError::InvalidSoundConfig {
                reason: format!("cannot decimate {native_rate} Hz to {target_rate} Hz"),
            });
        }
        Ok(Self {
            ratio: native_rate / target_rate,
            carry: 0.0,
        })
    }

    /// Native samples per output sample.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Forget the carried position.
    pub fn reset(&mut self) {
        self.carry = 0.0;
    }

    /// Lazily decimate one trace.
    ///
    /// The carried position is updated when the iterator is dropped.
    pub fn extract<T: AsRef<[f32]>>(&mut self, trace: T) -> Extract<'_, T> {
        let position = self.carry;
        Extract {
            decimator: self,
            trace,
            position,
        }
    }
}

/// Iterator over the decimated samples of one trace.
#[derive(Debug)]
pub struct Extract<'a, T: AsRef<[f32]>> {
    decimator: &'a mut Decimator,
    trace: T,
    position: f64,
}

impl<T: AsRef<[f32]>> Iterator for Extract<'_, T> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let trace = self.trace.as_ref();
        let sample = trace.get(self.position as usize).copied()?;
        self.position += self.decimator.ratio;
        Some(sample)
    }
}

impl<T: AsRef<[f32]>> Drop for Extract<'_, T> {
    fn drop(&mut self) {
        let len = self.trace.as_ref().len() as f64;
        self.decimator.carry = (self.position - len).max(0.0);
    }
}
