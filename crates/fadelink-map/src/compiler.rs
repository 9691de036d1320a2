use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One contiguous range where consecutive output indices map 1:1 to
/// consecutive device-local indices.
///
/// Serializes as the server's 4-tuple form
/// `[opcChannel, firstOutputIndex, firstDeviceIndex, runLength]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    pub opc_channel: u8,
    pub first_output_index: u32,
    pub first_device_index: u32,
    pub run_length: u32,
}

impl Serialize for MappingEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.opc_channel,
            self.first_output_index,
            self.first_device_index,
            self.run_length,
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MappingEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (opc_channel, first_output_index, first_device_index, run_length) =
            <(u8, u32, u32, u32)>::deserialize(deserializer)?;
        Ok(Self {
            opc_channel,
            first_output_index,
            first_device_index,
            run_length,
        })
    }
}

/// Ordered mapping table for one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTable {
    pub serial: String,
    /// Entries in creation order; every `run_length >= 1`.
    pub entries: Vec<MappingEntry>,
}

/// Incremental run-length mapping compiler.
///
/// Owns the global flat output index counter; per-device tables are
/// created lazily and kept in first-registration order.
#[derive(Debug, Default)]
pub struct MappingCompiler {
    tables: Vec<DeviceTable>,
    next_output_index: u32,
}

impl MappingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the table for `serial` if absent. Idempotent.
    pub fn ensure_device(&mut self, serial: &str) -> &mut DeviceTable {
        let pos = match self.tables.iter().position(|t| t.serial == serial) {
            Some(pos) => pos,
            None => {
                self.tables.push(DeviceTable {
                    serial: serial.to_string(),
                    entries: Vec::new(),
                });
                self.tables.len() - 1
            }
        };
        &mut self.tables[pos]
    }

    /// Register one pixel and return its flat output index.
    ///
    /// Registrations must arrive in the desired output order: only the
    /// most recent entry of the device's table is ever examined for
    /// extension. When the new pixel is contiguous with it in *both*
    /// the output and device index spaces the run grows by one;
    /// otherwise a fresh single-pixel entry is appended. Widening this
    /// to a multi-entry search would reorder existing compiled maps.
    pub fn register_pixel(&mut self, serial: &str, device_index: u32) -> u32 {
        let output_index = self.next_output_index;
        self.next_output_index += 1;

        let table = self.ensure_device(serial);
        match table.entries.last_mut() {
            Some(last)
                if last.first_output_index + last.run_length == output_index
                    && last.first_device_index + last.run_length == device_index =>
            {
                last.run_length += 1;
            }
            _ => table.entries.push(MappingEntry {
                opc_channel: 0,
                first_output_index: output_index,
                first_device_index: device_index,
                run_length: 1,
            }),
        }
        output_index
    }

    /// Mapping table for `serial`, if any pixel was registered for it.
    pub fn device_table(&self, serial: &str) -> Option<&DeviceTable> {
        self.tables.iter().find(|t| t.serial == serial)
    }

    /// All tables in first-registration order.
    pub fn tables(&self) -> &[DeviceTable] {
        &self.tables
    }

    /// Total pixels registered so far across all devices.
    pub fn pixel_count(&self) -> u32 {
        self.next_output_index
    }
}
