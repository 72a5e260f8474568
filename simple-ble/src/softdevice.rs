//! Applies the profile through `nrf-softdevice`.
//!
//! Connections are accepted through [`peripheral::advertise_pairable`], so
//! pairing requests are answered from [`SEC_PARAMS`] by [`Security`]. Security
//! info and system attribute requests are answered with no stored values.

use core::future::Future;
use core::mem;
use core::pin::pin;

use embassy_futures::select::{select, Either};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{CharacteristicHandles, RegisterError};
use nrf_softdevice::ble::peripheral::{self, AdvertiseError, ConnectableAdvertisement, NonconnectableAdvertisement};
use nrf_softdevice::ble::security::{IoCapabilities as SdIoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    Address, AddressType, Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode, TxPower, Uuid,
};
use nrf_softdevice::{raw, RawError, Softdevice};

use crate::{tx_power_level, Action, AdvMode, BleEvent, Config, IoCapabilities, Peripheral, SecParams, SEC_PARAMS, TX_POWER_DBM};

/// Answers pairing requests from a fixed set of [`SecParams`].
///
/// Bonding keys are not stored, so a bonded central pairs again on its next
/// connection.
pub struct Security {
    params: SecParams,
}

impl Security {
    pub const fn new(params: SecParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SecParams {
        &self.params
    }
}

static SECURITY: Security = Security::new(SEC_PARAMS);

impl SecurityHandler for Security {
    fn io_capabilities(&self) -> SdIoCapabilities {
        match self.params.io_caps {
            IoCapabilities::DisplayOnly => SdIoCapabilities::DisplayOnly,
            IoCapabilities::DisplayYesNo => SdIoCapabilities::DisplayYesNo,
            IoCapabilities::KeyboardOnly => SdIoCapabilities::KeyboardOnly,
            IoCapabilities::None => SdIoCapabilities::None,
            IoCapabilities::KeyboardDisplay => SdIoCapabilities::KeyboardDisplay,
        }
    }

    fn can_recv_out_of_band(&self, _conn: &Connection) -> bool {
        self.params.oob
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        self.params.bond
    }

    fn on_bonded(&self, _conn: &Connection, master_id: MasterId, _key: EncryptionInfo, _peer_id: IdentityKey) {
        debug!("ble: bonded {:?}, keys not stored", master_id);
    }
}

/// Characteristic access the central is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharProps {
    pub read: bool,
    pub write: bool,
    pub notify: bool,
}

/// Set the device address, name, appearance and preferred connection parameters.
pub fn configure(_sd: &Softdevice, config: &Config) -> Result<(), RawError> {
    let mut factory: raw::ble_gap_addr_t = unsafe { mem::zeroed() };
    RawError::convert(unsafe { raw::sd_ble_gap_addr_get(&mut factory) })?;

    let address = Address::new(AddressType::Public, config.device_address(factory.addr));
    RawError::convert(unsafe { raw::sd_ble_gap_addr_set(address.as_raw()) })?;

    let sec_mode = SecurityMode::Open.into_raw();
    RawError::convert(unsafe {
        raw::sd_ble_gap_device_name_set(&sec_mode, config.adv_name.as_ptr(), config.adv_name.len() as u16)
    })?;

    RawError::convert(unsafe { raw::sd_ble_gap_appearance_set(raw::BLE_APPEARANCE_GENERIC_COMPUTER as u16) })?;

    let params = config.conn_params();
    let raw_params = raw::ble_gap_conn_params_t {
        min_conn_interval: params.min_conn_interval,
        max_conn_interval: params.max_conn_interval,
        slave_latency: params.slave_latency,
        conn_sup_timeout: params.conn_sup_timeout,
    };
    RawError::convert(unsafe { raw::sd_ble_gap_ppcp_set(&raw_params) })?;

    debug!("ble: configured address {:?}", address.bytes());
    Ok(())
}

/// Start a primary service with a vendor-specific UUID.
pub fn add_service(sd: &mut Softdevice, uuid: &[u8; 16]) -> Result<ServiceBuilder<'_>, RegisterError> {
    ServiceBuilder::new(sd, Uuid::new_128(uuid))
}

/// Add a characteristic with open permissions and `value` as its initial value
/// and maximum length.
pub fn add_characteristic(
    service: &mut ServiceBuilder<'_>,
    uuid: Uuid,
    props: CharProps,
    value: &[u8],
) -> Result<CharacteristicHandles, RegisterError> {
    let mut properties = Properties::new();
    if props.read {
        properties = properties.read();
    }
    if props.write {
        properties = properties.write();
    }
    if props.notify {
        properties = properties.notify();
    }

    let characteristic = service.add_characteristic(uuid, Attribute::new(value), Metadata::new(properties))?;
    Ok(characteristic.build())
}

fn tx_power(dbm: i8) -> TxPower {
    match tx_power_level(dbm) {
        -40 => TxPower::Minus40dBm,
        -20 => TxPower::Minus20dBm,
        -16 => TxPower::Minus16dBm,
        -12 => TxPower::Minus12dBm,
        -8 => TxPower::Minus8dBm,
        -4 => TxPower::Minus4dBm,
        0 => TxPower::ZerodBm,
        2 => TxPower::Plus2dBm,
        3 => TxPower::Plus3dBm,
        4 => TxPower::Plus4dBm,
        5 => TxPower::Plus5dBm,
        6 => TxPower::Plus6dBm,
        7 => TxPower::Plus7dBm,
        _ => TxPower::Plus8dBm,
    }
}

fn advertising_config(config: &Config) -> peripheral::Config {
    peripheral::Config {
        interval: config.adv_interval as u32,
        tx_power: tx_power(TX_POWER_DBM),
        timeout: config.adv_timeout,
        ..Default::default()
    }
}

fn power_off() -> ! {
    info!("ble: system off");
    unsafe { raw::sd_power_system_off() };
    // System off only returns in debug interface emulation mode.
    loop {
        cortex_m::asm::wfe();
    }
}

/// Serve one connection while advertising non-connectably. Returns when the
/// connection is gone.
async fn serve_connection<Fut>(sd: &Softdevice, config: &Config<'_>, adv_data: &[u8], serving: Fut)
where
    Fut: Future<Output = ()>,
{
    let mut serving = pin!(serving);
    let adv = NonconnectableAdvertisement::NonscannableUndirected { adv_data };
    let adv_config = peripheral::Config {
        timeout: None,
        ..advertising_config(config)
    };

    if let Either::Second(res) = select(serving.as_mut(), peripheral::advertise(sd, adv, &adv_config)).await {
        if let Err(e) = res {
            warn!("ble: non-connectable advertising stopped: {:?}", e);
        }
        serving.await;
    }
}

/// Advertise connectably, serve each connection with `serve`, and keep
/// advertising non-connectably while connected.
///
/// Powers the system off when a configured advertising timeout expires.
pub async fn run<F, Fut>(sd: &Softdevice, config: &Config<'_>, adv_data: &[u8], scan_data: &[u8], mut serve: F) -> !
where
    F: FnMut(Connection) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut state = Peripheral::new();
    let mut action = state.start();

    loop {
        action = match action {
            Action::Advertise(AdvMode::Connectable) | Action::RestartAdvertising(AdvMode::Connectable) => {
                let adv = ConnectableAdvertisement::ScannableUndirected { adv_data, scan_data };
                match peripheral::advertise_pairable(sd, adv, &advertising_config(config), &SECURITY).await {
                    Ok(conn) => {
                        let conn_handle = conn.handle().unwrap_or(u16::MAX);
                        if let Action::Advertise(AdvMode::NonConnectable) =
                            state.on_event(BleEvent::Connected { conn_handle })
                        {
                            serve_connection(sd, config, adv_data, serve(conn)).await;
                        }
                        state.on_event(BleEvent::Disconnected)
                    }
                    Err(AdvertiseError::Timeout) => state.on_event(BleEvent::AdvertisingTimeout),
                    Err(e) => {
                        error!("ble: advertising failed: {:?}", e);
                        state.start()
                    }
                }
            }
            Action::SystemOff => power_off(),
            // Non-connectable advertising only runs alongside a connection.
            Action::Advertise(AdvMode::NonConnectable) | Action::RestartAdvertising(AdvMode::NonConnectable) => {
                state.on_event(BleEvent::Disconnected)
            }
        };
    }
}
