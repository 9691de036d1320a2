//! Pixel-mapping compiler for LED-controller server configurations.
//!
//! Pixels are registered one at a time in the desired output order; the
//! compiler assigns each a unique flat output index and folds contiguous
//! runs into compact run-length mapping entries. The result serializes
//! into the server's on-disk configuration format.
//!
//! Everything here is pure bookkeeping; no connection is involved.

pub mod compiler;
pub mod config;
pub mod descriptor;

pub use compiler::{DeviceTable, MappingCompiler, MappingEntry};
pub use config::{DeviceConfig, ServerConfig, DEVICE_TYPE};
pub use descriptor::{device_descriptors, fleet_descriptors, led_descriptor, LedDescriptor};
