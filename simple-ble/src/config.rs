use crate::Error;

/// `device_id` value that keeps the low two address octets from the factory address.
pub const DEVICE_ID_DEFAULT: u16 = 0xFFFF;

/// Top three address octets, least significant first (c0:98:e5 when printed).
pub const ADDRESS_OUI: [u8; 3] = [0xe5, 0x98, 0xc0];

pub const SLAVE_LATENCY: u16 = 0;

/// Supervision timeout in 10 ms units (4 s).
pub const CONN_SUP_TIMEOUT: u16 = 400;

/// Radio transmit power, in dBm.
pub const TX_POWER_DBM: i8 = 4;

/// Transmit power levels the radio supports, in dBm, lowest first.
pub const TX_POWER_LEVELS: [i8; 14] = [-40, -20, -16, -12, -8, -4, 0, 2, 3, 4, 5, 6, 7, 8];

/// Key sizes the SoftDevice wrapper offers when pairing.
const STACK_KEY_SIZES: (u8, u8) = (7, 16);

/// Longest device name accepted by the GAP name characteristic.
pub const MAX_DEVICE_NAME_LEN: usize = 248;

const ADV_INTERVAL_MIN: u16 = 0x0020;
const ADV_INTERVAL_MAX: u16 = 0x4000;
const CONN_INTERVAL_MIN: u16 = 0x0006;
const CONN_INTERVAL_MAX: u16 = 0x0c80;

/// Peripheral configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config<'a> {
    /// Third address octet.
    pub platform_id: u8,
    /// Low two address octets, or [`DEVICE_ID_DEFAULT`].
    pub device_id: u16,
    /// GAP device name, also put in the advertising data when there is room.
    pub adv_name: &'a str,
    /// In 0.625 ms units.
    pub adv_interval: u16,
    /// In 1.25 ms units.
    pub min_conn_interval: u16,
    /// In 1.25 ms units.
    pub max_conn_interval: u16,
    /// Stop advertising after this many 10 ms units and power the system off.
    /// `None` advertises forever.
    pub adv_timeout: Option<u16>,
}

impl<'a> Default for Config<'a> {
    fn default() -> Self {
        Self {
            platform_id: 0x00,
            device_id: DEVICE_ID_DEFAULT,
            adv_name: "simple-ble",
            adv_interval: 800,      // 500 ms
            min_conn_interval: 400, // 500 ms
            max_conn_interval: 800, // 1 s
            adv_timeout: None,
        }
    }
}

/// Preferred peripheral connection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnParams {
    pub min_conn_interval: u16,
    pub max_conn_interval: u16,
    pub slave_latency: u16,
    pub conn_sup_timeout: u16,
}

/// Pairing parameters offered to a central that asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecParams {
    pub bond: bool,
    /// Follows from `io_caps`: MITM protection needs some I/O.
    pub mitm: bool,
    pub io_caps: IoCapabilities,
    pub oob: bool,
    pub min_key_size: u8,
    pub max_key_size: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IoCapabilities {
    DisplayOnly = 0,
    DisplayYesNo = 1,
    KeyboardOnly = 2,
    None = 3,
    KeyboardDisplay = 4,
}

/// Bond without MITM protection or I/O.
pub const SEC_PARAMS: SecParams = SecParams {
    bond: true,
    mitm: false,
    io_caps: IoCapabilities::None,
    oob: false,
    min_key_size: 7,
    max_key_size: 16,
};

impl SecParams {
    /// Check that the stack can pair with these parameters. It always offers
    /// key sizes 7..=16 and asks for MITM protection exactly when there is I/O.
    pub fn validate(&self) -> Result<(), Error> {
        if (self.min_key_size, self.max_key_size) != STACK_KEY_SIZES
            || self.mitm != (self.io_caps != IoCapabilities::None)
        {
            return Err(Error::UnsupportedSecurity);
        }
        Ok(())
    }
}

/// Highest supported transmit power not above `dbm`, or the lowest level.
pub fn tx_power_level(dbm: i8) -> i8 {
    TX_POWER_LEVELS
        .iter()
        .rev()
        .copied()
        .find(|&level| level <= dbm)
        .unwrap_or(TX_POWER_LEVELS[0])
}

impl<'a> Config<'a> {
    pub fn validate(&self) -> Result<(), Error> {
        let conn_range = CONN_INTERVAL_MIN..=CONN_INTERVAL_MAX;
        if !(ADV_INTERVAL_MIN..=ADV_INTERVAL_MAX).contains(&self.adv_interval)
            || !conn_range.contains(&self.min_conn_interval)
            || !conn_range.contains(&self.max_conn_interval)
        {
            return Err(Error::InvalidInterval);
        }
        if self.min_conn_interval > self.max_conn_interval {
            return Err(Error::IntervalOrder);
        }
        if self.adv_name.len() > MAX_DEVICE_NAME_LEN {
            return Err(Error::NameTooLong);
        }
        Ok(())
    }

    /// Device address, least significant octet first.
    ///
    /// The low two octets are `device_id`, or the factory address octets when it
    /// is [`DEVICE_ID_DEFAULT`]. Then `platform_id`, then [`ADDRESS_OUI`].
    pub fn device_address(&self, factory: [u8; 6]) -> [u8; 6] {
        let low = if self.device_id == DEVICE_ID_DEFAULT {
            [factory[0], factory[1]]
        } else {
            self.device_id.to_le_bytes()
        };
        [
            low[0],
            low[1],
            self.platform_id,
            ADDRESS_OUI[0],
            ADDRESS_OUI[1],
            ADDRESS_OUI[2],
        ]
    }

    pub fn conn_params(&self) -> ConnParams {
        ConnParams {
            min_conn_interval: self.min_conn_interval,
            max_conn_interval: self.max_conn_interval,
            slave_latency: SLAVE_LATENCY,
            conn_sup_timeout: CONN_SUP_TIMEOUT,
        }
    }
}

/// A 128-bit vendor UUID with a 16-bit short UUID written into octets 12 and 13,
/// the way the SoftDevice derives UUIDs from a registered base.
pub fn uuid128_with_short(base: &[u8; 16], short: u16) -> [u8; 16] {
    let mut uuid = *base;
    uuid[12..14].copy_from_slice(&short.to_le_bytes());
    uuid
}
