//! Control and status parameter model for the DS1307.
//!
//! The chip exposes five logical toggles: the clock-halt bit, the square-wave
//! enable, the square-wave frequency, the idle level of the SQW/OUT pin while
//! the generator is off, and the 12/24-hour mode. Each lives in exactly one
//! register. [`Control`] pairs a parameter with a typed value for writes;
//! [`ControlParam`] selects a parameter for reads. Because both are enums,
//! an out-of-range value or an unknown parameter cannot be expressed.

use crate::registers::{
    adjust_hours_for_mode, HourMode, Hours, Oscillator, OutputLevel, RegAddr, Seconds, SquareWave,
    SquareWaveFrequency, Switch,
};

/// A control parameter together with the value to set.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// Halt or run the oscillator (seconds register, CH bit)
    ClockHalt(Oscillator),
    /// Enable or disable the square-wave output (SQWE bit)
    SquareWaveRun(Switch),
    /// Square-wave frequency while the output is enabled (RS1/RS0)
    SquareWaveFrequency(SquareWaveFrequency),
    /// SQW/OUT pin level while the output is disabled (OUT bit)
    SquareWaveIdleLevel(OutputLevel),
    /// 12- or 24-hour representation (hours register mode bit)
    HourMode(HourMode),
}

/// Selects a control parameter for a status read.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlParam {
    /// Oscillator run/halt state
    ClockHalt,
    /// Square-wave output on/off
    SquareWaveRun,
    /// Square-wave frequency selection
    SquareWaveFrequency,
    /// SQW/OUT idle level
    SquareWaveIdleLevel,
    /// 12/24-hour mode
    HourMode,
}

impl Control {
    /// Address of the single register this parameter lives in.
    pub(crate) fn reg_addr(&self) -> RegAddr {
        match self {
            Control::ClockHalt(_) => RegAddr::Seconds,
            Control::SquareWaveRun(_)
            | Control::SquareWaveFrequency(_)
            | Control::SquareWaveIdleLevel(_) => RegAddr::SquareWave,
            Control::HourMode(_) => RegAddr::Hours,
        }
    }

    /// Applies this control value to the register byte just read from the
    /// device, touching only the parameter's bits. Switching the hour mode
    /// additionally rewrites the stored hour so it keeps its wall-clock
    /// meaning.
    pub(crate) fn apply(&self, byte: u8) -> u8 {
        match *self {
            Control::ClockHalt(oscillator) => {
                let mut reg = Seconds(byte);
                reg.set_clock_halt(oscillator);
                reg.0
            }
            Control::SquareWaveRun(switch) => {
                let mut reg = SquareWave(byte);
                reg.set_square_wave_enable(switch);
                reg.0
            }
            Control::SquareWaveFrequency(frequency) => {
                let mut reg = SquareWave(byte);
                reg.set_rate_select(frequency);
                reg.0
            }
            Control::SquareWaveIdleLevel(level) => {
                let mut reg = SquareWave(byte);
                reg.set_output_level(level);
                reg.0
            }
            Control::HourMode(mode) => adjust_hours_for_mode(Hours(byte), mode).0,
        }
    }
}

impl ControlParam {
    /// Extracts the parameter's current value from the 8-byte register block
    /// (registers 0x00-0x07 read in one burst).
    pub(crate) fn extract(&self, block: &[u8; 8]) -> Control {
        match self {
            ControlParam::ClockHalt => {
                Control::ClockHalt(Seconds(block[RegAddr::Seconds as usize]).clock_halt())
            }
            ControlParam::SquareWaveRun => Control::SquareWaveRun(
                SquareWave(block[RegAddr::SquareWave as usize]).square_wave_enable(),
            ),
            ControlParam::SquareWaveFrequency => Control::SquareWaveFrequency(
                SquareWave(block[RegAddr::SquareWave as usize]).rate_select(),
            ),
            ControlParam::SquareWaveIdleLevel => Control::SquareWaveIdleLevel(
                SquareWave(block[RegAddr::SquareWave as usize]).output_level(),
            ),
            ControlParam::HourMode => {
                Control::HourMode(Hours(block[RegAddr::Hours as usize]).hour_mode())
            }
        }
    }
}
