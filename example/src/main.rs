//! nRF52840-DK demo: buttons and LEDs through `nrf-gpiote`, an LED service
//! through `simple-ble`.
//!
//! - Button 1 is a low-power input; each edge is logged.
//! - Button 2 belongs to a mask-based user; presses and releases are logged.
//! - LED 1 is a plain output driven from the LED characteristic.
//! - LED 2 is task-bound and toggled on every button 1 edge.

#![no_std]
#![no_main]

use core::mem;
use core::ptr;
use core::sync::atomic::{AtomicU32, Ordering};

use defmt::*;
use embassy_executor::Spawner;
use nrf52840_pac::{interrupt, Peripherals};
use nrf_gpiote::{EdgeHandler, Gpiote, GpioteUser, Hardware, InConfig, Level, OutConfig, PacHardware, Pin, Polarity, Pull, SharedGpiote};
use nrf_softdevice::ble::gatt_server::{self, WriteOp};
use nrf_softdevice::ble::{Connection, Uuid};
use nrf_softdevice::{raw, Softdevice};
use simple_ble::adv_data::{self, AdvData};
use simple_ble::softdevice::CharProps;
use static_cell::StaticCell;
use {defmt_rtt as _, nrf_softdevice_s140 as _, panic_probe as _};

const LED_1: Pin = 13;
const LED_2: Pin = 14;
const BUTTON_1: Pin = 11;
const BUTTON_2: Pin = 12;

const LED_SERVICE_BASE: [u8; 16] = [
    0x23, 0xd1, 0xbc, 0xea, 0x5f, 0x78, 0x23, 0x15, 0xde, 0xef, 0x12, 0x12, 0x00, 0x00, 0x00, 0x00,
];
const LED_SERVICE: u16 = 0x1523;
const LED_CHAR: u16 = 0x1525;

static GPIOTE: SharedGpiote<'static, PacHardware> = SharedGpiote::new();
static LED_2_TASK: AtomicU32 = AtomicU32::new(0);
static USERS: StaticCell<[GpioteUser<'static>; 1]> = StaticCell::new();

#[interrupt]
fn GPIOTE() {
    GPIOTE.on_interrupt();
}

fn on_button(pin: Pin, polarity: Polarity) {
    info!("pin {}: {}", pin, polarity);
    // The driver is borrowed while handlers run, so trigger the task directly.
    let task = LED_2_TASK.load(Ordering::Relaxed);
    if task != 0 {
        unsafe { ptr::write_volatile(task as *mut u32, 1) };
    }
}

fn on_buttons(low_to_high: u32, high_to_low: u32) {
    if high_to_low & (1 << BUTTON_2) != 0 {
        info!("button 2 pressed");
    }
    if low_to_high & (1 << BUTTON_2) != 0 {
        info!("button 2 released");
    }
}

fn set_led(on: bool) {
    // LEDs are active low.
    let res = GPIOTE.with(|gpiote| if on { gpiote.out_clear(LED_1) } else { gpiote.out_set(LED_1) });
    if let Some(Err(e)) = res {
        warn!("led 1: {}", e);
    }
}

struct LedServer {
    led_value_handle: u16,
}

impl gatt_server::Server for LedServer {
    type Event = bool;

    fn on_write(&self, _conn: &Connection, handle: u16, _op: WriteOp, _offset: usize, data: &[u8]) -> Option<bool> {
        if handle == self.led_value_handle {
            data.first().map(|v| *v != 0)
        } else {
            None
        }
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

fn init_gpiote(p: Peripherals) -> Result<(), nrf_gpiote::Error> {
    let mut gpiote = Gpiote::new(PacHardware::new(p.GPIOTE, p.P0), Default::default());
    gpiote.init()?;

    gpiote.out_init(LED_1, &OutConfig::simple(Level::High))?;
    gpiote.out_init(LED_2, &OutConfig::task(Polarity::Toggle, Level::High))?;
    gpiote.out_task_enable(LED_2)?;
    LED_2_TASK.store(gpiote.out_task_addr(LED_2)?, Ordering::Relaxed);

    gpiote.in_init(BUTTON_1, &InConfig::toggle(false).with_pull(Pull::Up), Some(&on_button as &dyn EdgeHandler))?;
    gpiote.in_event_enable(BUTTON_1, true)?;

    let users = USERS.init([GpioteUser::EMPTY; 1]);
    gpiote.init_users(users, 1)?;
    gpiote.hardware().cfg_input(BUTTON_2, Pull::Up);
    let user = gpiote.register_user(1 << BUTTON_2, 1 << BUTTON_2, &on_buttons)?;
    gpiote.enable_user(user)?;

    GPIOTE.install(gpiote)
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hello World!");

    let p = unwrap!(Peripherals::take());
    unwrap!(init_gpiote(p));

    let ble = simple_ble::Config {
        platform_id: 0x01,
        adv_name: "LedButton",
        ..Default::default()
    };
    unwrap!(ble.validate());
    unwrap!(simple_ble::SEC_PARAMS.validate());

    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: ble.adv_name.as_ptr() as _,
            current_len: ble.adv_name.len() as u16,
            max_len: ble.adv_name.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(raw::BLE_GATTS_VLOC_STACK as u8),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&config);
    unwrap!(simple_ble::softdevice::configure(sd, &ble));

    let service_uuid = simple_ble::uuid128_with_short(&LED_SERVICE_BASE, LED_SERVICE);
    let char_uuid = simple_ble::uuid128_with_short(&LED_SERVICE_BASE, LED_CHAR);
    let mut service = unwrap!(simple_ble::softdevice::add_service(sd, &service_uuid));
    let led = unwrap!(simple_ble::softdevice::add_characteristic(
        &mut service,
        Uuid::new_128(&char_uuid),
        CharProps {
            read: true,
            write: true,
            notify: false,
        },
        &[0],
    ));
    service.build();

    let server = LedServer {
        led_value_handle: led.value_handle,
    };

    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));

    let adv = adv_data::advertising_data(ble.adv_name);
    let scan = unwrap!(AdvData::new().services_128(&service_uuid));

    let server = &server;
    simple_ble::softdevice::run(sd, &ble, adv.as_slice(), scan.as_slice(), move |conn| async move {
        info!("connected");
        let _ = gatt_server::run(&conn, server, |on| {
            info!("led 1 {}", if on { "on" } else { "off" });
            set_led(on);
        })
        .await;
        info!("disconnected");
        set_led(false);
    })
    .await
}
