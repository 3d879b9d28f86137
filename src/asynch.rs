//! Async implementation of the DS1307 driver.
//!
//! This module provides an async interface to the DS1307 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled. The surface mirrors the blocking driver in the crate root.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds1307::asynch::DS1307;
//!
//! let mut rtc = DS1307::new(i2c, ds1307::DEVICE_ADDRESS);
//!
//! let now = rtc.datetime().await?;
//! rtc.write_ram(0x08, b"saved").await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::{
    Config, Control, ControlParam, DS1307DateTime, DS1307Error, Date, DateTime, Day, Hours,
    Minutes, Month, Oscillator, RegAddr, Seconds, SquareWave, Year, RAM_BASE_WRITE, RAM_SIZE,
};

/// DS1307 real-time clock async driver.
pub struct DS1307<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS1307<I2C> {
    /// Creates a new DS1307 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (normally [`crate::DEVICE_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Releases the underlying I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_raw_datetime(&mut self) -> Result<DS1307DateTime, DS1307Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .await?;
        Ok(data.into())
    }

    async fn write_raw_datetime(
        &mut self,
        datetime: &DS1307DateTime,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        let data: [u8; 7] = datetime.into();
        self.i2c
            .write(
                self.address,
                &[
                    RegAddr::Seconds as u8,
                    data[0],
                    data[1],
                    data[2],
                    data[3],
                    data[4],
                    data[5],
                    data[6],
                ],
            )
            .await?;
        Ok(())
    }

    /// Reads the current date and time in a single burst transaction.
    pub async fn datetime(&mut self) -> Result<DateTime, DS1307Error<I2C::Error>> {
        let raw = self.read_raw_datetime().await?;
        Ok(raw.into_datetime())
    }

    /// Writes a date and time to the device.
    ///
    /// The device's current hour mode is read first and decides how the hour
    /// is encoded; the record's own `pm` field is ignored. The clock-halt bit
    /// is never set by this operation.
    pub async fn set_datetime(
        &mut self,
        datetime: &DateTime,
    ) -> Result<(), DS1307Error<I2C::Error>> {
        let mode = self.hour().await?.hour_mode();
        let raw = DS1307DateTime::from_datetime(datetime, mode).map_err(DS1307Error::DateTime)?;
        #[cfg(feature = "log")]
        log::debug!("writing datetime in {:?} mode: {:?}", mode, raw);
        self.write_raw_datetime(&raw).await
    }

    /// Reads `buf.len()` bytes starting at `addr`.
    ///
    /// Same bounds as the blocking driver: the last byte touched must stay
    /// within the 64-byte address space.
    pub async fn read_ram(
        &mut self,
        addr: u8,
        buf: &mut [u8],
    ) -> Result<(), DS1307Error<I2C::Error>> {
        if buf.is_empty() || usize::from(addr) + buf.len() - 1 > usize::from(RAM_SIZE - 1) {
            return Err(DS1307Error::AddressOutOfRange);
        }
        self.i2c.write_read(self.address, &[addr], buf).await?;
        Ok(())
    }

    /// Writes `data` to the battery backed RAM starting at `addr`.
    ///
    /// Same bounds as the blocking driver: writes start at
    /// [`RAM_BASE_WRITE`] or later and must stay within the address space.
    pub async fn write_ram(&mut self, addr: u8, data: &[u8]) -> Result<(), DS1307Error<I2C::Error>> {
        if addr < RAM_BASE_WRITE
            || data.is_empty()
            || usize::from(addr) + data.len() - 1 >= usize::from(RAM_SIZE)
        {
            return Err(DS1307Error::AddressOutOfRange);
        }
        let mut buf = [0u8; 1 + (RAM_SIZE - RAM_BASE_WRITE) as usize];
        buf[0] = addr;
        buf[1..=data.len()].copy_from_slice(data);
        self.i2c.write(self.address, &buf[..=data.len()]).await?;
        Ok(())
    }

    /// Sets one control parameter with a read-modify-write of its register.
    pub async fn set_control(&mut self, control: Control) -> Result<(), DS1307Error<I2C::Error>> {
        let addr = control.reg_addr() as u8;
        let mut data = [0];
        self.i2c.write_read(self.address, &[addr], &mut data).await?;
        self.i2c
            .write(self.address, &[addr, control.apply(data[0])])
            .await?;
        Ok(())
    }

    /// Reads the current value of one control parameter.
    pub async fn control(&mut self, param: ControlParam) -> Result<Control, DS1307Error<I2C::Error>> {
        let mut block = [0u8; 8];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut block)
            .await?;
        Ok(param.extract(&block))
    }

    /// Applies a full device configuration, one control parameter at a time.
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS1307Error<I2C::Error>> {
        self.set_control(Control::ClockHalt(config.oscillator))
            .await?;
        self.set_control(Control::SquareWaveRun(config.square_wave_run))
            .await?;
        self.set_control(Control::SquareWaveFrequency(config.square_wave_frequency))
            .await?;
        self.set_control(Control::SquareWaveIdleLevel(config.square_wave_idle_level))
            .await?;
        self.set_control(Control::HourMode(config.hour_mode))
            .await?;
        Ok(())
    }

    /// Returns `true` while the oscillator is running.
    pub async fn is_running(&mut self) -> Result<bool, DS1307Error<I2C::Error>> {
        Ok(self.control(ControlParam::ClockHalt).await?
            == Control::ClockHalt(Oscillator::Running))
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS1307<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the raw value of the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS1307Error<I2C::Error>> {
                        let mut data = [0];
                        self.i2c
                            .write_read(self.address, &[$regaddr as u8], &mut data)
                            .await?;
                        Ok($typ(data[0]))
                    }

                    #[doc = concat!("Sets the raw value of the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS1307Error<I2C::Error>> {
                        self.i2c.write(
                            self.address,
                            &[$regaddr as u8, value.into()],
                        ).await?;
                        Ok(())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (second, RegAddr::Seconds, Seconds),
    (minute, RegAddr::Minutes, Minutes),
    (hour, RegAddr::Hours, Hours),
    (day, RegAddr::Day, Day),
    (date, RegAddr::Date, Date),
    (month, RegAddr::Month, Month),
    (year, RegAddr::Year, Year),
    (square_wave, RegAddr::SquareWave, SquareWave)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use alloc::vec;

    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    use super::*;
    use crate::{HourMode, OutputLevel, SquareWaveFrequency, Switch, DEVICE_ADDRESS};

    #[tokio::test]
    async fn test_async_read_datetime() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x45, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24],
        )]);
        let mut dev = DS1307::new(mock, DEVICE_ADDRESS);

        let dt = dev.datetime().await.unwrap();
        assert_eq!(dt.hour, 15);
        assert_eq!(dt.minute, 30);
        assert_eq!(dt.second, 45);
        assert_eq!(dt.day, 14);
        assert_eq!(dt.month, 3);
        assert_eq!(dt.year, 2024);
        assert_eq!(dt.day_of_week, 5);
        assert!(!dt.pm);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_set_datetime() {
        let dt = DateTime {
            year: 2024,
            month: 3,
            day: 14,
            hour: 15,
            minute: 30,
            second: 45,
            day_of_week: 5,
            pm: false,
        };

        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Hours as u8], vec![0x00]),
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![
                    RegAddr::Seconds as u8,
                    0x45,
                    0x30,
                    0x15,
                    0x05,
                    0x14,
                    0x03,
                    0x24,
                ],
            ),
        ]);
        let mut dev = DS1307::new(mock, DEVICE_ADDRESS);

        dev.set_datetime(&dt).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_ram_access() {
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x10, 0xDE, 0xAD]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x10], vec![0xDE, 0xAD]),
        ]);
        let mut dev = DS1307::new(mock, DEVICE_ADDRESS);

        dev.write_ram(0x10, &[0xDE, 0xAD]).await.unwrap();
        let mut buf = [0u8; 2];
        dev.read_ram(0x10, &mut buf).await.unwrap();
        assert_eq!(buf, [0xDE, 0xAD]);

        assert!(matches!(
            dev.write_ram(0x00, &[1]).await,
            Err(DS1307Error::AddressOutOfRange)
        ));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_configure() {
        let config = Config {
            oscillator: Oscillator::Running,
            square_wave_run: Switch::Off,
            square_wave_frequency: SquareWaveFrequency::Hz1,
            square_wave_idle_level: OutputLevel::High,
            hour_mode: HourMode::TwentyFourHour,
        };

        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8], vec![0x10]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8, 0x80]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Hours as u8], vec![0x15]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Hours as u8, 0x15]),
        ]);
        let mut dev = DS1307::new(mock, DEVICE_ADDRESS);

        dev.configure(&config).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_register_operations() {
        let mock = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0x45]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8, 0x30]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::SquareWave as u8], vec![0x93]),
        ]);
        let mut dev = DS1307::new(mock, DEVICE_ADDRESS);

        let seconds = dev.second().await.unwrap();
        assert_eq!(seconds.seconds(), 5);
        assert_eq!(seconds.ten_seconds(), 4);
        dev.set_second(Seconds(0x30)).await.unwrap();

        let sqw = dev.square_wave().await.unwrap();
        assert_eq!(sqw.output_level(), OutputLevel::High);
        assert_eq!(sqw.square_wave_enable(), Switch::On);
        assert_eq!(sqw.rate_select(), SquareWaveFrequency::Hz32768);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_is_running() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x80, 0, 0, 0, 0, 0, 0, 0],
        )]);
        let mut dev = DS1307::new(mock, DEVICE_ADDRESS);

        assert!(!dev.is_running().await.unwrap());
        dev.i2c.done();
    }
}
