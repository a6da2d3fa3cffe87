//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every input driver and produces a [`SensorSnapshot`] each
//! loop iteration for the controller.

pub mod load_sense;
pub mod pir;

use embedded_hal::digital::InputPin;

use crate::app::ports::SensorSnapshot;
use load_sense::LoadSense;
use pir::PirSensor;

/// Aggregates all input drivers and produces a unified snapshot.
pub struct SensorHub<M: InputPin, L: InputPin> {
    pub pir: PirSensor<M>,
    pub load_sense: LoadSense<L>,
}

impl<M: InputPin, L: InputPin> SensorHub<M, L> {
    /// Pass in pre-built drivers (built in main where pin ownership is
    /// established).
    pub fn new(pir: PirSensor<M>, load_sense: LoadSense<L>) -> Self {
        Self { pir, load_sense }
    }

    /// Read every input. Individual read failures are logged by the
    /// drivers and never interrupt the loop.
    pub fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            motion_raw: self.pir.read(),
            load_sensed: self.load_sense.read(),
        }
    }
}
