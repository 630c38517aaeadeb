//! Radio HAL boundary
//!
//! The pipeline only needs RSSI per frequency plus a little telemetry.
//! Reads are total: whatever the HAL returns is admitted as data.

use crate::types::{Band, Telemetry};

/// Hardware interface the sampler reads from
pub trait RadioHal {
    /// Received signal strength at `frequency_hz` (dBm), blocking
    fn rssi(&mut self, frequency_hz: u32) -> f64;

    /// Battery voltage (V)
    fn battery_voltage(&mut self) -> f64;

    /// Battery current (mA)
    fn battery_current(&mut self) -> f64;

    /// Die temperature (°C)
    fn die_temperature(&mut self) -> f64;

    /// All telemetry in one read
    fn telemetry(&mut self) -> Telemetry {
        Telemetry {
            voltage: self.battery_voltage(),
            current_ma: self.battery_current(),
            temperature: self.die_temperature(),
        }
    }

    /// Take the radio at session entry
    fn acquire(&mut self) {}

    /// Park the radio between ticks
    fn idle(&mut self) {}

    /// Give the radio back at session exit
    fn release(&mut self) {}
}

impl<H: RadioHal + ?Sized> RadioHal for Box<H> {
    fn rssi(&mut self, frequency_hz: u32) -> f64 {
        (**self).rssi(frequency_hz)
    }
    fn battery_voltage(&mut self) -> f64 {
        (**self).battery_voltage()
    }
    fn battery_current(&mut self) -> f64 {
        (**self).battery_current()
    }
    fn die_temperature(&mut self) -> f64 {
        (**self).die_temperature()
    }
    fn telemetry(&mut self) -> Telemetry {
        (**self).telemetry()
    }
    fn acquire(&mut self) {
        (**self).acquire()
    }
    fn idle(&mut self) {
        (**self).idle()
    }
    fn release(&mut self) {
        (**self).release()
    }
}

/// Radio lifecycle as seen by a `ScriptedRadio`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioLifecycle {
    pub acquired: bool,
    pub released: bool,
    pub idle_count: u64,
}

type Script = Box<dyn FnMut(Band, u64) -> f64 + Send>;

/// Deterministic HAL driven by a closure over (band, tick)
///
/// Ticks are counted per band starting at 1, so a sampler that reads every
/// band once per tick sees `f(band, 1)`, `f(band, 2)`, ...
pub struct ScriptedRadio {
    script: Script,
    reads: [u64; 3],
    telemetry: Telemetry,
    lifecycle: RadioLifecycle,
    query_order: Vec<Band>,
}

impl std::fmt::Debug for ScriptedRadio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRadio")
            .field("reads", &self.reads)
            .field("telemetry", &self.telemetry)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl ScriptedRadio {
    /// Create from a script
    pub fn new(script: impl FnMut(Band, u64) -> f64 + Send + 'static) -> Self {
        Self {
            script: Box::new(script),
            reads: [0; 3],
            telemetry: Telemetry {
                voltage: 4.1,
                current_ma: -120.0,
                temperature: 28.0,
            },
            lifecycle: RadioLifecycle::default(),
            query_order: Vec::with_capacity(3),
        }
    }

    /// Same values on every tick
    pub fn constant(lf: f64, hf: f64, uhf: f64) -> Self {
        Self::new(move |band, _| match band {
            Band::Lf => lf,
            Band::Hf => hf,
            Band::Uhf => uhf,
        })
    }

    /// Override the telemetry returned every tick
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Bands queried since the last `idle`, in order
    pub fn query_order(&self) -> &[Band] {
        &self.query_order
    }

    /// Lifecycle calls observed so far
    pub fn lifecycle(&self) -> RadioLifecycle {
        self.lifecycle
    }

    /// Reads served for `band`
    pub fn reads(&self, band: Band) -> u64 {
        self.reads[band.index()]
    }
}

impl RadioHal for ScriptedRadio {
    fn rssi(&mut self, frequency_hz: u32) -> f64 {
        let Some(band) = Band::from_frequency(frequency_hz) else {
            return f64::NAN;
        };
        let slot = &mut self.reads[band.index()];
        *slot += 1;
        let tick = *slot;
        self.query_order.push(band);
        (self.script)(band, tick)
    }

    fn battery_voltage(&mut self) -> f64 {
        self.telemetry.voltage
    }

    fn battery_current(&mut self) -> f64 {
        self.telemetry.current_ma
    }

    fn die_temperature(&mut self) -> f64 {
        self.telemetry.temperature
    }

    fn acquire(&mut self) {
        self.lifecycle.acquired = true;
    }

    fn idle(&mut self) {
        self.lifecycle.idle_count += 1;
        self.query_order.clear();
    }

    fn release(&mut self) {
        self.lifecycle.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_script() {
        let mut radio = ScriptedRadio::constant(-99.4, -96.1, -112.8);
        assert_eq!(radio.rssi(Band::Lf.frequency_hz()), -99.4);
        assert_eq!(radio.rssi(Band::Hf.frequency_hz()), -96.1);
        assert_eq!(radio.rssi(Band::Uhf.frequency_hz()), -112.8);
        assert_eq!(radio.query_order(), &[Band::Lf, Band::Hf, Band::Uhf]);
    }

    #[test]
    fn test_script_sees_per_band_tick() {
        let mut radio = ScriptedRadio::new(|_, tick| tick as f64);
        assert_eq!(radio.rssi(Band::Lf.frequency_hz()), 1.0);
        assert_eq!(radio.rssi(Band::Lf.frequency_hz()), 2.0);
        assert_eq!(radio.rssi(Band::Hf.frequency_hz()), 1.0);
        assert_eq!(radio.reads(Band::Lf), 2);
    }

    #[test]
    fn test_unknown_frequency_is_nan() {
        let mut radio = ScriptedRadio::constant(-100.0, -100.0, -100.0);
        assert!(radio.rssi(100_000_000).is_nan());
    }

    #[test]
    fn test_lifecycle_tracking() {
        let mut radio: Box<dyn RadioHal> = Box::new(ScriptedRadio::constant(0.0, 0.0, 0.0));
        radio.acquire();
        radio.idle();
        radio.release();
        let telemetry = radio.telemetry();
        assert!((telemetry.voltage - 4.1).abs() < 1e-12);
    }
}
