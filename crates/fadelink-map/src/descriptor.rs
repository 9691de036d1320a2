use serde::Serialize;

use fadelink_proto::{LEDS_PER_DEVICE, LEDS_PER_STRIP};

/// Physical addressing details for one LED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedDescriptor {
    pub serial: String,
    /// Device-local pixel index.
    pub index: u32,
    /// Which 64-pixel strip the LED sits on.
    pub strip_index: u32,
    /// Position within that strip.
    pub strip_position: u32,
    /// Human-readable label, `"<serial>-<index zero-padded to 3>"`.
    pub label: String,
}

/// Derive the descriptor for one device-local pixel index.
pub fn led_descriptor(serial: &str, index: u32) -> LedDescriptor {
    LedDescriptor {
        serial: serial.to_string(),
        index,
        strip_index: index / LEDS_PER_STRIP as u32,
        strip_position: index % LEDS_PER_STRIP as u32,
        label: format!("{serial}-{index:03}"),
    }
}

/// Descriptors for every pixel of one device, in index order.
pub fn device_descriptors(serial: &str) -> impl Iterator<Item = LedDescriptor> + '_ {
    (0..LEDS_PER_DEVICE as u32).map(move |index| led_descriptor(serial, index))
}

/// Descriptors for every device in list order.
pub fn fleet_descriptors<'a, I>(serials: I) -> impl Iterator<Item = LedDescriptor> + 'a
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: 'a,
{
    serials
        .into_iter()
        .flat_map(|serial| device_descriptors(serial))
}
