//! Register definitions and bitfield structures for the DS1307 RTC.
//!
//! This module contains the register addresses, bitfield definitions and
//! related types for interacting with the DS1307 register map. The first
//! eight bytes of the device's address space hold the time/date registers
//! and the square-wave control byte; the remaining 56 bytes are battery
//! backed RAM.

use bitfield::bitfield;

/// Register addresses for the DS1307 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59), with the clock-halt bit
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Day of week register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12)
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Square-wave output control register
    SquareWave = 0x07,
    /// First byte of the battery backed RAM
    Ram = 0x08,
}

/// Total number of addressable bytes on the device (registers + RAM).
pub const RAM_SIZE: u8 = 64;

/// Smallest address the generic RAM write path may touch. The time and
/// control registers below it are only writable through the dedicated
/// datetime and control operations.
pub const RAM_BASE_WRITE: u8 = RegAddr::Ram as u8;

/// Oscillator state, stored in the clock-halt bit of the seconds register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator is running, the clock keeps time
    Running = 0,
    /// Oscillator is halted, the clock is stopped
    Halted = 1,
}
impl From<u8> for Oscillator {
    /// Creates an `Oscillator` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => Oscillator::Running,
            1 => Oscillator::Halted,
            _ => panic!("Invalid value for Oscillator: {}", v),
        }
    }
}
impl From<Oscillator> for u8 {
    /// Converts an `Oscillator` to its raw register value.
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// Hour representation format for the DS1307.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourMode {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for HourMode {
    /// Creates an `HourMode` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => HourMode::TwentyFourHour,
            1 => HourMode::TwelveHour,
            _ => panic!("Invalid value for HourMode: {}", v),
        }
    }
}
impl From<HourMode> for u8 {
    /// Converts an `HourMode` to its raw register value.
    fn from(v: HourMode) -> Self {
        v as u8
    }
}

/// On/off state of the square-wave generator (SQWE bit).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    /// Square-wave output disabled
    Off = 0,
    /// Square-wave output enabled
    On = 1,
}
impl From<u8> for Switch {
    /// Creates a `Switch` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => Switch::Off,
            1 => Switch::On,
            _ => panic!("Invalid value for Switch: {}", v),
        }
    }
}
impl From<Switch> for u8 {
    /// Converts a `Switch` to its raw register value.
    fn from(v: Switch) -> Self {
        v as u8
    }
}

/// Level of the SQW/OUT pin while the square-wave generator is disabled.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputLevel {
    /// Pin idles low
    Low = 0,
    /// Pin idles high
    High = 1,
}
impl From<u8> for OutputLevel {
    /// Creates an `OutputLevel` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => OutputLevel::Low,
            1 => OutputLevel::High,
            _ => panic!("Invalid value for OutputLevel: {}", v),
        }
    }
}
impl From<OutputLevel> for u8 {
    /// Converts an `OutputLevel` to its raw register value.
    fn from(v: OutputLevel) -> Self {
        v as u8
    }
}

/// Square-wave output frequency options (RS1/RS0 bits).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz square wave output
    Hz1 = 0b00,
    /// 4.096 kHz square wave output
    Hz4096 = 0b01,
    /// 8.192 kHz square wave output
    Hz8192 = 0b10,
    /// 32.768 kHz square wave output
    Hz32768 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    /// Creates a `SquareWaveFrequency` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0b00, 0b01, 0b10, or 0b11.
    fn from(v: u8) -> Self {
        match v {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz4096,
            0b10 => SquareWaveFrequency::Hz8192,
            0b11 => SquareWaveFrequency::Hz32768,
            _ => panic!("Invalid value for SquareWaveFrequency: {}", v),
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    /// Converts a `SquareWaveFrequency` to its raw register value.
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding and the clock-halt bit.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock-halt (CH) bit; the oscillator stops while it is set
    pub from into Oscillator, clock_halt, set_clock_halt: 7, 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        let seconds = 10 * self.ten_seconds() + self.seconds();
        defmt::write!(f, "Seconds({}s", seconds);
        if self.clock_halt() == Oscillator::Halted {
            defmt::write!(f, ", halted");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

#[cfg(feature = "defmt")]
impl defmt::Format for Minutes {
    fn format(&self, f: defmt::Formatter) {
        let minutes = 10 * self.ten_minutes() + self.minutes();
        defmt::write!(f, "Minutes({}m)", minutes);
    }
}

bitfield! {
    /// Hours register with format selection and BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Hour representation format (12/24 hour)
    pub from into HourMode, hour_mode, set_hour_mode: 6, 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    /// Tens place of hours
    pub ten_hours, set_ten_hours: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        let hours = 10 * self.ten_hours() + self.hours();
        match self.hour_mode() {
            HourMode::TwentyFourHour => {
                let hours = hours + 20 * self.pm_or_twenty_hours();
                defmt::write!(f, "Hours({}h 24h)", hours);
            }
            HourMode::TwelveHour => {
                let is_pm = self.pm_or_twenty_hours() != 0;
                defmt::write!(f, "Hours({}h {})", hours, if is_pm { "PM" } else { "AM" });
            }
        }
    }
}

impl Hours {
    /// Decodes the stored hour, interpreting the value bits according to the
    /// register's own hour-mode flag.
    pub fn hour(&self) -> u8 {
        match self.hour_mode() {
            HourMode::TwentyFourHour => {
                self.hours() + 10 * self.ten_hours() + 20 * self.pm_or_twenty_hours()
            }
            HourMode::TwelveHour => self.hours() + 10 * self.ten_hours(),
        }
    }
}

bitfield! {
    /// Day of week register (1-7, 1 = Sunday by convention).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Day(u8);
    impl Debug;
    /// Day of week (1-7)
    pub day, set_day: 2, 0;
}
from_register_u8!(Day);

#[cfg(feature = "defmt")]
impl defmt::Format for Day {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Day({})", self.day());
    }
}

bitfield! {
    /// Date register (1-31) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Date(u8);
    impl Debug;
    /// Tens place of date (0-3)
    pub ten_date, set_ten_date: 5, 4;
    /// Ones place of date (0-9)
    pub date, set_date: 3, 0;
}
from_register_u8!(Date);

#[cfg(feature = "defmt")]
impl defmt::Format for Date {
    fn format(&self, f: defmt::Formatter) {
        let date = 10 * self.ten_date() + self.date();
        defmt::write!(f, "Date({})", date);
    }
}

bitfield! {
    /// Month register (1-12) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Tens place of month (0-1)
    pub ten_month, set_ten_month: 4, 4;
    /// Ones place of month (0-9)
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);

#[cfg(feature = "defmt")]
impl defmt::Format for Month {
    fn format(&self, f: defmt::Formatter) {
        let month = 10 * self.ten_month() + self.month();
        defmt::write!(f, "Month({})", month);
    }
}

bitfield! {
    /// Year register (0-99, offset from 2000) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    /// Tens place of year (0-9)
    pub ten_year, set_ten_year: 7, 4;
    /// Ones place of year (0-9)
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);

#[cfg(feature = "defmt")]
impl defmt::Format for Year {
    fn format(&self, f: defmt::Formatter) {
        let year = 10 * self.ten_year() + self.year();
        defmt::write!(f, "Year({})", year);
    }
}

bitfield! {
    /// Square-wave control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct SquareWave(u8);
    impl Debug;
    /// SQW/OUT pin level while the square wave is disabled (OUT bit)
    pub from into OutputLevel, output_level, set_output_level: 7, 7;
    /// Square-wave enable (SQWE bit)
    pub from into Switch, square_wave_enable, set_square_wave_enable: 4, 4;
    /// Square-wave output frequency selection (RS1/RS0)
    pub from into SquareWaveFrequency, rate_select, set_rate_select: 1, 0;
}
from_register_u8!(SquareWave);

#[cfg(feature = "defmt")]
impl defmt::Format for SquareWave {
    fn format(&self, f: defmt::Formatter) {
        match self.square_wave_enable() {
            Switch::On => match self.rate_select() {
                SquareWaveFrequency::Hz1 => defmt::write!(f, "SquareWave(1 Hz)"),
                SquareWaveFrequency::Hz4096 => defmt::write!(f, "SquareWave(4096 Hz)"),
                SquareWaveFrequency::Hz8192 => defmt::write!(f, "SquareWave(8192 Hz)"),
                SquareWaveFrequency::Hz32768 => defmt::write!(f, "SquareWave(32768 Hz)"),
            },
            Switch::Off => match self.output_level() {
                OutputLevel::Low => defmt::write!(f, "SquareWave(off, low)"),
                OutputLevel::High => defmt::write!(f, "SquareWave(off, high)"),
            },
        }
    }
}

/// Rewrites the stored hour value so that it keeps its wall-clock meaning
/// when the 12/24-hour mode bit is about to change, then applies the new
/// mode bit. All other bits of the register are preserved.
///
/// Switching to 12-hour mode converts a 24-hour value above 12 to its
/// 12-hour equivalent with the PM flag set; an hour of 12 or below is left
/// as-is, so 12:xx stays ambiguous between noon and midnight (a chip-logic
/// quirk). Switching to 24-hour mode adds 12 to a PM value.
pub(crate) fn adjust_hours_for_mode(hours: Hours, mode: HourMode) -> Hours {
    let mut adjusted = hours;
    match mode {
        HourMode::TwelveHour => {
            if hours.hour_mode() == HourMode::TwentyFourHour {
                let hour = hours.hour();
                if hour > 12 {
                    adjusted.set_hours((hour - 12) % 10);
                    adjusted.set_ten_hours((hour - 12) / 10);
                    adjusted.set_pm_or_twenty_hours(1);
                }
            }
        }
        HourMode::TwentyFourHour => {
            if hours.hour_mode() == HourMode::TwelveHour && hours.pm_or_twenty_hours() != 0 {
                let hour = hours.hour() + 12;
                adjusted.set_hours(hour % 10);
                adjusted.set_ten_hours((hour / 10) & 0x01);
                adjusted.set_pm_or_twenty_hours(hour / 20);
            }
        }
    }
    adjusted.set_hour_mode(mode);
    adjusted
}
