use std::thread;

use fadelink_proto::{ColorCorrection, Device, DeviceOptions, Request, LEDS_PER_DEVICE};

use crate::connection::Connection;
use crate::error::{ClientError, Result};

/// Bytes in one full raw RGB frame for a single controller.
const FRAME_BYTES: usize = LEDS_PER_DEVICE * 3;

impl Connection {
    /// Push raw RGB bytes to one controller.
    ///
    /// Three strictly ordered requests: raw output options (no LED
    /// override, no dithering, no interpolation), unity color
    /// correction, then the pixel data, so the bytes reach the hardware
    /// unmodified. The first failure short-circuits; requests already
    /// sent are not rolled back.
    pub fn push_raw_pixels(&self, device: &Device, pixels: impl Into<Vec<u8>>) -> Result<()> {
        self.call(Request::DeviceOptions {
            device: device.clone(),
            options: DeviceOptions::raw(),
        })?;
        self.call(Request::DeviceColorCorrection {
            device: device.clone(),
            color: ColorCorrection::unity(),
        })?;
        self.call(Request::DevicePixels {
            device: device.clone(),
            pixels: pixels.into(),
        })?;
        Ok(())
    }

    /// Blank every pixel on every known controller.
    pub fn all_lights_off(&self) -> Result<()> {
        self.fan_out(|_| vec![0; FRAME_BYTES])
    }

    /// Light a single LED full white to locate it physically.
    ///
    /// Every other pixel on every controller goes dark.
    pub fn identify_light(&self, target: &Device, index: usize) -> Result<()> {
        if index >= LEDS_PER_DEVICE {
            return Err(ClientError::PixelOutOfRange {
                index,
                max: LEDS_PER_DEVICE,
            });
        }
        self.fan_out(|device| {
            let mut frame = vec![0u8; FRAME_BYTES];
            if device.serial == target.serial {
                frame[3 * index..3 * index + 3].fill(255);
            }
            frame
        })
    }

    /// Run one push chain per device, chains concurrent, each chain
    /// internally sequential. Waits for every chain and reports the
    /// first error in device order; partial side effects stay sent.
    fn fan_out<F>(&self, frame_for: F) -> Result<()>
    where
        F: Fn(&Device) -> Vec<u8> + Sync,
    {
        let frame_for = &frame_for;
        thread::scope(|scope| {
            let chains: Vec<_> = self
                .devices()
                .iter()
                .map(|device| scope.spawn(move || self.push_raw_pixels(device, frame_for(device))))
                .collect();

            let mut first_error = None;
            for chain in chains {
                let result = match chain.join() {
                    Ok(result) => result,
                    Err(_) => Err(ClientError::Closed),
                };
                if let Err(err) = result {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}
