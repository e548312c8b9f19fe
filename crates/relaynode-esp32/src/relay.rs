//! GPIO relay driver for ESP32.

use std::sync::Mutex;

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use relaynode_core::config::ActiveLevel;
use relaynode_core::driver::{DriverError, RelayDriver};

/// Relay control line on a GPIO output pin.
pub struct GpioRelay {
    pin: Mutex<PinDriver<'static, AnyOutputPin, Output>>,
    active: ActiveLevel,
}

impl GpioRelay {
    /// Take over the pin and drive the relay open.
    pub fn new(pin: AnyOutputPin, active: ActiveLevel) -> Result<Self, DriverError> {
        let mut driver =
            PinDriver::output(pin).map_err(|err| DriverError::Hardware(err.to_string()))?;
        let result = if active.off_level() == 1 {
            driver.set_high()
        } else {
            driver.set_low()
        };
        result.map_err(|err| DriverError::Hardware(err.to_string()))?;

        Ok(Self {
            pin: Mutex::new(driver),
            active,
        })
    }
}

impl RelayDriver for GpioRelay {
    fn set_state(&self, on: bool) -> Result<(), DriverError> {
        let level = if on {
            self.active.on_level()
        } else {
            self.active.off_level()
        };
        let mut pin = self
            .pin
            .lock()
            .map_err(|_| DriverError::Hardware("pin driver lock poisoned".to_string()))?;
        let result = if level == 1 {
            pin.set_high()
        } else {
            pin.set_low()
        };
        result.map_err(|err| DriverError::Hardware(err.to_string()))
    }

    fn level(&self) -> Result<u8, DriverError> {
        let pin = self
            .pin
            .lock()
            .map_err(|_| DriverError::Hardware("pin driver lock poisoned".to_string()))?;
        Ok(u8::from(pin.is_set_high()))
    }
}
