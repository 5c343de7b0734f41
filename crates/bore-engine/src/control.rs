//! Runtime controls delivered to the tick loop.
//!
//! Every mutation of a running simulation is a [`Control`] message. The
//! tick loop drains its channel at the start of each tick, so a control
//! never lands between two sub-steps.

use crossbeam_channel::{Receiver, Sender};

use bore_audio::FrequencyResponse;
use bore_core::{FieldConfig, FieldInstanceId};

use crate::error::{BuildError, SubmitError};

/// Reply channel for the outcome of a rebuild.
pub type RebuildReply = Sender<Result<FieldInstanceId, BuildError>>;

/// A mutation applied at the next tick boundary.
#[derive(Debug)]
pub enum Control {
    /// Sub-steps per tick.
    SetUpdatePerFrame(u32),
    /// Exciter amplitude.
    SetMouthPressure(f32),
    /// Open or close the configured tone hole. Rebuilds the field.
    SetToneHole(bool),
    /// Switch the exciter to the measurement sweep and start recording
    /// the response.
    StartFcm,
    /// Restore the previous waveform and reply with the response.
    EndFcm {
        /// Receives `None` if no measurement was running.
        reply: Sender<Option<FrequencyResponse>>,
    },
    /// Build a new field and swap it in once ready.
    Rebuild {
        /// The new field.
        config: FieldConfig,
        /// Receives the new instance id once built, or why it was not.
        reply: Option<RebuildReply>,
    },
}

/// Sending side of the control channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    tx: Sender<Control>,
}

/// Bounded control channel.
pub fn control_channel(capacity: usize) -> (ControlHandle, Receiver<Control>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (ControlHandle { tx }, rx)
}

impl ControlHandle {
    /// Queue a control without blocking.
    pub fn send(&self, control: Control) -> Result<(), SubmitError> {
        self.tx.try_send(control).map_err(SubmitError::from)
    }

    /// Queue [`Control::SetUpdatePerFrame`].
    pub fn set_update_per_frame(&self, update_per_frame: u32) -> Result<(), SubmitError> {
        self.send(Control::SetUpdatePerFrame(update_per_frame))
    }

    /// Queue [`Control::SetMouthPressure`].
    pub fn set_mouth_pressure(&self, pressure: f32) -> Result<(), SubmitError> {
        self.send(Control::SetMouthPressure(pressure))
    }

    /// Queue [`Control::SetToneHole`].
    pub fn set_tone_hole_state(&self, open: bool) -> Result<(), SubmitError> {
        self.send(Control::SetToneHole(open))
    }

    /// Queue [`Control::StartFcm`].
    pub fn start_fcm(&self) -> Result<(), SubmitError> {
        self.send(Control::StartFcm)
    }

    /// Queue [`Control::EndFcm`]; the response arrives on the returned
    /// receiver within one tick.
    pub fn end_fcm(&self) -> Result<Receiver<Option<FrequencyResponse>>, SubmitError> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send(Control::EndFcm { reply })?;
        Ok(rx)
    }

    /// Queue a rebuild; the outcome arrives on the returned receiver once
    /// the build finishes or is rejected.
    pub fn rebuild(
        &self,
        config: FieldConfig,
    ) -> Result<Receiver<Result<FieldInstanceId, BuildError>>, SubmitError> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send(Control::Rebuild {
            config,
            reply: Some(reply),
        })?;
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_channel_backpressures() {
        let (handle, rx) = control_channel(2);
        handle.set_mouth_pressure(0.5).unwrap();
        handle.start_fcm().unwrap();
        assert_eq!(handle.set_update_per_frame(4), Err(SubmitError::ChannelFull));
        assert!(matches!(rx.try_recv(), Ok(Control::SetMouthPressure(p)) if p == 0.5));
        assert!(matches!(rx.try_recv(), Ok(Control::StartFcm)));
    }

    #[test]
    fn dropped_receiver_means_shutdown() {
        let (handle, rx) = control_channel(4);
        drop(rx);
        assert_eq!(handle.set_tone_hole_state(true), Err(SubmitError::Shutdown));
        assert_eq!(handle.end_fcm().unwrap_err(), SubmitError::Shutdown);
    }

    #[test]
    fn rebuild_carries_a_reply() {
        let (handle, rx) = control_channel(4);
        let outcome = handle.rebuild(FieldConfig::default()).unwrap();
        match rx.try_recv() {
            Ok(Control::Rebuild {
                reply: Some(reply), ..
            }) => reply.send(Err(BuildError::WorkerPanicked)).unwrap(),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(outcome.recv().unwrap(), Err(BuildError::WorkerPanicked));
    }
}
