//! A small BLE peripheral profile: fixed device address, open device name,
//! connectable advertising that turns non-connectable while a central is
//! connected, and helpers to register custom services.
//!
//! The pure parts (configuration, address and advertising data, the connection
//! state machine) build anywhere. The `softdevice` feature adds the glue that
//! applies them through `nrf-softdevice`.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod adv_data;

mod peripheral;
pub use peripheral::*;

#[cfg(feature = "softdevice")]
pub mod softdevice;
