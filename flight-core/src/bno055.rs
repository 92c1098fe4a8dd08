//! Minimal BNO055 register driver over `embedded-hal` I2C.
//!
//! Only what the flight loop needs: reset, identification, mode switching,
//! calibration status and the fused Euler angles. Fusion itself runs on the
//! sensor.

use crate::orientation::{AttitudeSensor, OperatingMode, SensorFault};
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::{Error as _, I2c};

/// 7-bit address with COM3 pulled low.
pub const ADDR: u8 = 0x28;

/// Register map (page 0), datasheet table 4-2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Reg {
    ChipId = 0x00,
    /// Heading LSB; roll and pitch follow, 2 bytes each.
    EulerHeadingLsb = 0x1A,
    CalibStat = 0x35,
    OprMode = 0x3D,
}

/// BNO055 on an I2C bus with a hardware reset line.
pub struct Bno055<I2C, RST> {
    i2c: I2C,
    reset: RST,
    address: u8,
}

impl<I2C: I2c, RST: OutputPin> Bno055<I2C, RST> {
    pub fn new(i2c: I2C, reset: RST) -> Self {
        Self::with_address(i2c, reset, ADDR)
    }

    /// Use the alternate address (COM3 high, `0x29`).
    pub fn with_address(i2c: I2C, reset: RST, address: u8) -> Self {
        Self {
            i2c,
            reset,
            address,
        }
    }

    fn read_reg(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), SensorFault> {
        self.i2c
            .write_read(self.address, &[reg as u8], buf)
            .map_err(|e| {
                debug!("i2c read {} failed: {:?}", reg as u8, e.kind());
                SensorFault::Bus
            })
    }

    fn write_reg(&mut self, reg: Reg, value: u8) -> Result<(), SensorFault> {
        self.i2c
            .write(self.address, &[reg as u8, value])
            .map_err(|e| {
                debug!("i2c write {} failed: {:?}", reg as u8, e.kind());
                SensorFault::Bus
            })
    }

    /// Release the bus and the reset pin.
    pub fn release(self) -> (I2C, RST) {
        (self.i2c, self.reset)
    }
}

impl<I2C: I2c, RST: OutputPin> AttitudeSensor for Bno055<I2C, RST> {
    fn reset(&mut self) -> Result<(), SensorFault> {
        // Active low; the caller waits out the boot time.
        self.reset.set_low().map_err(|_| SensorFault::Bus)?;
        self.reset.set_high().map_err(|_| SensorFault::Bus)
    }

    fn chip_id(&mut self) -> Result<u8, SensorFault> {
        let mut buf = [0u8; 1];
        self.read_reg(Reg::ChipId, &mut buf)?;
        Ok(buf[0])
    }

    fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), SensorFault> {
        self.write_reg(Reg::OprMode, mode as u8)
    }

    fn calibration_status(&mut self) -> Result<u8, SensorFault> {
        let mut buf = [0u8; 1];
        self.read_reg(Reg::CalibStat, &mut buf)?;
        Ok(buf[0])
    }

    fn read_euler_registers(&mut self) -> Result<[u8; 6], SensorFault> {
        let mut buf = [0u8; 6];
        self.read_reg(Reg::EulerHeadingLsb, &mut buf)?;
        Ok(buf)
    }
}
