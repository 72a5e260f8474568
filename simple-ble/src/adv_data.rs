//! Legacy advertising payloads.

use heapless::Vec;

use crate::Error;

pub const LEGACY_PAYLOAD_LEN: usize = 31;

/// LE General Discoverable, BR/EDR not supported.
pub const FLAGS_LE_ONLY_GENERAL_DISC: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdType(u8);

impl AdType {
    pub const FLAGS: AdType = AdType(0x01);
    pub const COMPLETE_16_SERVICE_LIST: AdType = AdType(0x03);
    pub const COMPLETE_128_SERVICE_LIST: AdType = AdType(0x07);
    pub const SHORT_NAME: AdType = AdType(0x08);
    pub const FULL_NAME: AdType = AdType(0x09);
    pub const TXPOWER_LEVEL: AdType = AdType(0x0a);
    pub const MANUFACTURER_SPECIFIC_DATA: AdType = AdType(0xff);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }
}

impl From<AdType> for u8 {
    fn from(value: AdType) -> Self {
        value.0
    }
}

/// An advertising or scan response payload of at most 31 octets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvData {
    buf: Vec<u8, LEGACY_PAYLOAD_LEN>,
}

impl AdvData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one AD structure.
    pub fn push(&mut self, ad_type: AdType, data: &[u8]) -> Result<(), Error> {
        let expected = self.buf.len() + 2 + data.len();
        if expected > LEGACY_PAYLOAD_LEN {
            return Err(Error::Oversize { expected });
        }
        // Length was checked above.
        let _ = self.buf.push(data.len() as u8 + 1);
        let _ = self.buf.push(ad_type.into());
        let _ = self.buf.extend_from_slice(data);
        Ok(())
    }

    pub fn flags(mut self, flags: u8) -> Result<Self, Error> {
        self.push(AdType::FLAGS, &[flags])?;
        Ok(self)
    }

    pub fn tx_power(mut self, dbm: i8) -> Result<Self, Error> {
        self.push(AdType::TXPOWER_LEVEL, &[dbm as u8])?;
        Ok(self)
    }

    pub fn services_128(mut self, uuid: &[u8; 16]) -> Result<Self, Error> {
        self.push(AdType::COMPLETE_128_SERVICE_LIST, uuid)?;
        Ok(self)
    }

    /// Add the device name, shortened to whatever room is left. An empty name,
    /// or no room at all, adds nothing.
    pub fn name(mut self, name: &str) -> Self {
        let room = self.remaining().saturating_sub(2);
        let name = name.as_bytes();
        if name.is_empty() || room == 0 {
            return self;
        }
        if name.len() <= room {
            let _ = self.push(AdType::FULL_NAME, name);
        } else {
            let _ = self.push(AdType::SHORT_NAME, &name[..room]);
        }
        self
    }

    pub fn remaining(&self) -> usize {
        LEGACY_PAYLOAD_LEN - self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

/// Flags followed by the device name, as much of it as fits.
pub fn advertising_data(name: &str) -> AdvData {
    let mut data = AdvData::new();
    // Three octets always fit an empty payload.
    let _ = data.push(AdType::FLAGS, &[FLAGS_LE_ONLY_GENERAL_DISC]);
    data.name(name)
}
