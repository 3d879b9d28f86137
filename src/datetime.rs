//! Date/time conversion and register utilities for the DS1307 RTC.
//!
//! This module provides the caller-visible [`DateTime`] record, the internal
//! representation of the chip's seven BCD-encoded time registers, and the
//! conversion logic between the two. It also hosts the standalone day-of-week
//! calculator and conversions to and from chrono's `NaiveDateTime`.
//!
//! # Register Model
//!
//! The DS1307 stores date and time in 7 consecutive registers:
//! - Seconds, Minutes, Hours, Day, Date, Month, Year
//!
//! The seconds register shares its top bit with the clock-halt flag and the
//! hours register carries the 12/24-hour mode and AM/PM flags, so packing
//! needs to know the device's current hour mode.
//!
//! # Error Handling
//!
//! Conversion errors are reported via [`DS1307DateTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::{Date, Day, HourMode, Hours, Minutes, Month, Seconds, Year};

/// A broken-down date and time as kept by the DS1307.
///
/// `hour` is whatever the device stores: 0-23 in 24-hour mode, or 1-12 with
/// the `pm` flag in 12-hour mode. `pm` is only meaningful for values read in
/// 12-hour mode and is always `false` after a 24-hour read.
///
/// On writes the `pm` field is ignored: the device's current hour mode
/// decides the encoding and, in 12-hour mode, PM is derived from `hour > 12`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Year including the century (2000-2099 on the device)
    pub year: u16,
    /// Month (1-12)
    pub month: u8,
    /// Date of the month (1-31)
    pub day: u8,
    /// Hour of the day, 0-23 or 1-12 depending on the device's hour mode
    pub hour: u8,
    /// Minutes past the hour (0-59)
    pub minute: u8,
    /// Seconds past the minute (0-59)
    pub second: u8,
    /// Day of the week (1-7, 1 = Sunday by convention)
    pub day_of_week: u8,
    /// PM indicator, set only when read in 12-hour mode with PM active
    pub pm: bool,
}

/// Internal representation of the DS1307 time and date registers.
///
/// Models the 7-byte wire record exchanged with the device in a single burst
/// transaction, using the strongly-typed bitfield wrappers for each register.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DS1307DateTime {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
    day: Day,
    date: Date,
    month: Month,
    year: Year,
}

impl DS1307DateTime {
    /// Helper function to convert a number to BCD digits with validation
    pub(crate) fn make_bcd(value: u8, max_value: u8) -> Result<(u8, u8), DS1307DateTimeError> {
        if value > max_value {
            return Err(DS1307DateTimeError::InvalidDateTime);
        }
        Ok((value % 10, value / 10))
    }

    fn convert_seconds(seconds: u8) -> Result<Seconds, DS1307DateTimeError> {
        let (ones, tens) = Self::make_bcd(seconds, 59)?;
        let mut value = Seconds::default();
        value.set_seconds(ones);
        value.set_ten_seconds(tens);
        // The clock-halt bit is left clear on purpose: writing the time
        // always starts (or keeps) the oscillator running.
        Ok(value)
    }

    fn convert_minutes(minutes: u8) -> Result<Minutes, DS1307DateTimeError> {
        let (ones, tens) = Self::make_bcd(minutes, 59)?;
        let mut value = Minutes::default();
        value.set_minutes(ones);
        value.set_ten_minutes(tens);
        Ok(value)
    }

    pub(crate) fn convert_hours(hour: u8, mode: HourMode) -> Result<Hours, DS1307DateTimeError> {
        if hour > 23 {
            return Err(DS1307DateTimeError::InvalidDateTime);
        }
        let mut value = Hours::default();

        match mode {
            HourMode::TwentyFourHour => {
                value.set_hours(hour % 10);
                value.set_ten_hours((hour / 10) & 0x01);
                value.set_pm_or_twenty_hours(hour / 20);
            }
            HourMode::TwelveHour => {
                // PM is derived from the hour value alone; an hour of 12 or
                // below is stored unchanged with PM clear.
                let pm = hour > 12;
                let hour = if pm { hour - 12 } else { hour };
                value.set_hours(hour % 10);
                value.set_ten_hours(hour / 10);
                value.set_pm_or_twenty_hours(u8::from(pm));
                value.set_hour_mode(HourMode::TwelveHour);
            }
        }
        Ok(value)
    }

    fn convert_day(day_of_week: u8) -> Result<Day, DS1307DateTimeError> {
        if day_of_week < 1 || day_of_week > 7 {
            return Err(DS1307DateTimeError::InvalidDateTime);
        }
        let mut value = Day::default();
        value.set_day(day_of_week);
        Ok(value)
    }

    fn convert_date(date: u8) -> Result<Date, DS1307DateTimeError> {
        let (ones, tens) = Self::make_bcd(date, 31)?;
        let mut value = Date::default();
        value.set_date(ones);
        value.set_ten_date(tens);
        Ok(value)
    }

    fn convert_month(month: u8) -> Result<Month, DS1307DateTimeError> {
        let (ones, tens) = Self::make_bcd(month, 12)?;
        let mut value = Month::default();
        value.set_month(ones);
        value.set_ten_month(tens);
        Ok(value)
    }

    pub(crate) fn convert_year(year: u16) -> Result<Year, DS1307DateTimeError> {
        // The chip has a 2-digit year register and no century storage, so
        // only 2000-2099 is representable.
        if year < 2000 {
            #[cfg(feature = "log")]
            log::error!("Year {} is too early! must be after 1999", year);
            return Err(DS1307DateTimeError::YearNotAfter1999);
        }
        if year > 2099 {
            #[cfg(feature = "log")]
            log::error!("Year {} is too late! must be before 2100", year);
            return Err(DS1307DateTimeError::YearNotBefore2100);
        }

        let offset = (year - 2000) as u8;
        let mut value = Year::default();
        value.set_year(offset % 10);
        value.set_ten_year(offset / 10);
        Ok(value)
    }

    /// Packs a [`DateTime`] into the wire record.
    ///
    /// `mode` must be the hour mode currently active on the device, read
    /// immediately beforehand: the record itself carries no mode flag and the
    /// stored hour encoding has to match what the chip expects.
    pub(crate) fn from_datetime(
        datetime: &DateTime,
        mode: HourMode,
    ) -> Result<Self, DS1307DateTimeError> {
        let raw = DS1307DateTime {
            seconds: Self::convert_seconds(datetime.second)?,
            minutes: Self::convert_minutes(datetime.minute)?,
            hours: Self::convert_hours(datetime.hour, mode)?,
            day: Self::convert_day(datetime.day_of_week)?,
            date: Self::convert_date(datetime.day)?,
            month: Self::convert_month(datetime.month)?,
            year: Self::convert_year(datetime.year)?,
        };

        #[cfg(feature = "log")]
        log::debug!("raw={:?}", raw);

        Ok(raw)
    }

    /// Unpacks the wire record into a [`DateTime`].
    ///
    /// Register contents are trusted to hold valid BCD digits; garbage
    /// nibbles decode to garbage values without an error.
    pub(crate) fn into_datetime(self) -> DateTime {
        let second = 10 * self.seconds.ten_seconds() + self.seconds.seconds();
        let minute = 10 * self.minutes.ten_minutes() + self.minutes.minutes();
        let (hour, pm) = match self.hours.hour_mode() {
            HourMode::TwentyFourHour => (self.hours.hour(), false),
            HourMode::TwelveHour => (self.hours.hour(), self.hours.pm_or_twenty_hours() != 0),
        };
        let year = 2000 + u16::from(10 * self.year.ten_year() + self.year.year());
        let month = 10 * self.month.ten_month() + self.month.month();
        let day = 10 * self.date.ten_date() + self.date.date();

        DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            day_of_week: self.day.day(),
            pm,
        }
    }
}

impl From<[u8; 7]> for DS1307DateTime {
    fn from(data: [u8; 7]) -> Self {
        DS1307DateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            day: Day(data[3]),
            date: Date(data[4]),
            month: Month(data[5]),
            year: Year(data[6]),
        }
    }
}

impl From<&DS1307DateTime> for [u8; 7] {
    fn from(dt: &DS1307DateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.day.0,
            dt.date.0,
            dt.month.0,
            dt.year.0,
        ]
    }
}

impl TryFrom<&NaiveDateTime> for DateTime {
    type Error = DS1307DateTimeError;

    /// Builds a 24-hour [`DateTime`] record from a chrono `NaiveDateTime`.
    ///
    /// Fails when the year is outside the device's 2000-2099 range.
    fn try_from(dt: &NaiveDateTime) -> Result<Self, Self::Error> {
        if dt.year() < 2000 {
            return Err(DS1307DateTimeError::YearNotAfter1999);
        }
        if dt.year() > 2099 {
            return Err(DS1307DateTimeError::YearNotBefore2100);
        }
        Ok(DateTime {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            day_of_week: dt.weekday().num_days_from_sunday() as u8 + 1,
            pm: false,
        })
    }
}

impl TryFrom<&DateTime> for NaiveDateTime {
    type Error = DS1307DateTimeError;

    /// Converts a [`DateTime`] record to a chrono `NaiveDateTime`.
    ///
    /// A record read in 12-hour mode has its hour normalized using the `pm`
    /// flag. Hour 12 with `pm` clear is taken as noon; the device cannot
    /// distinguish a 12-hour-mode midnight from it.
    fn try_from(dt: &DateTime) -> Result<Self, Self::Error> {
        let hour = match (dt.hour, dt.pm) {
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))
            .and_then(|d| {
                d.and_hms_opt(
                    u32::from(hour),
                    u32::from(dt.minute),
                    u32::from(dt.second),
                )
            })
            .ok_or(DS1307DateTimeError::InvalidDateTime)
    }
}

/// Errors that can occur during DS1307 date/time conversion or validation.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS1307DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year is not after 1999 (the DS1307 only supports years >= 2000)
    YearNotAfter1999,
    /// The year is not before 2100 (the DS1307 only supports years <= 2099)
    YearNotBefore2100,
}

/// Calculates the day of the week for a Gregorian calendar date, without any
/// device I/O.
///
/// Returns 1-7 with 1 = Sunday. Uses the Sakamoto congruence, which is valid
/// for `year > 1752` and `month` in 1-12; results outside that range are
/// meaningless.
///
/// # Panics
/// Panics if `month` is 0 or greater than 12.
///
/// # Example
/// ```
/// assert_eq!(ds1307::day_of_week(2000, 1, 1), 7); // Saturday
/// ```
pub fn day_of_week(year: u16, month: u8, day: u8) -> u8 {
    const T: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

    let year = year - u16::from(month < 3);
    let dow =
        (year + year / 4 - year / 100 + year / 400 + T[usize::from(month - 1)] + u16::from(day))
            % 7;
    (dow + 1) as u8
}
