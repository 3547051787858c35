//! Leakwatch firmware — main entry point.
//!
//! Hexagonal wiring: the sampler core talks to ports, the adapters
//! constructed here talk to hardware.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  RtcClock      AnalogFrontEnd   SdStorage    LogEventSink│
//! │  (ClockPort)   (AnalogPort)     (StoragePort)(EventSink) │
//! │  WifiLink      MqttRelay        FileBrowser              │
//! │  (LinkPort)    (RelayPort)      (maintenance)            │
//! │                                                          │
//! │  ───────────── Port Trait Boundary ─────────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │   SamplerService (pure logic)                  │      │
//! │  │   1 Hz cadence · 60-slot batches · parked gate │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::cell::RefCell;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use leakwatch::adapters::file_browser::FileBrowser;
use leakwatch::adapters::log_sink::LogEventSink;
use leakwatch::adapters::mqtt::MqttRelay;
use leakwatch::adapters::rtc::RtcClock;
use leakwatch::adapters::sd_storage::SdStorage;
use leakwatch::adapters::uptime::Uptime;
use leakwatch::adapters::wifi::{WifiLink, WifiState};
use leakwatch::app::ports::{AnalogPort, ClockPort, LinkPort, RelayPort};
use leakwatch::app::service::SamplerService;
use leakwatch::config::SystemConfig;
use leakwatch::drivers::ads1115::Ads1115;
use leakwatch::drivers::ds3231::Ds3231;
use leakwatch::drivers::hw_init;
use leakwatch::relay::RetryPolicy;
use leakwatch::sensors::AnalogFrontEnd;

// Compile-time provisioning; an unset SSID leaves the link idle and the
// logger runs card-only.
const WIFI_SSID: &str = match option_env!("LEAKWATCH_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("LEAKWATCH_WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const MQTT_URL: &str = match option_env!("LEAKWATCH_MQTT_URL") {
    Some(s) => s,
    None => "",
};

// ── Port glue ─────────────────────────────────────────────────
//
// The sampler takes one value per side of the boundary; these bundle
// the two I2C devices and the two network adapters accordingly.

type I2cDevice<'a> = RefCellDevice<'a, I2cDriver<'static>>;

struct MeasurementHw<'a> {
    afe: AnalogFrontEnd<I2cDevice<'a>>,
    rtc: RtcClock<I2cDevice<'a>>,
}

impl AnalogPort for MeasurementHw<'_> {
    fn read_current(&mut self) -> f32 {
        self.afe.read_current()
    }
    fn read_voltage(&mut self) -> f32 {
        self.afe.read_voltage()
    }
}

impl ClockPort for MeasurementHw<'_> {
    fn now(&mut self) -> leakwatch::clock::CalendarTime {
        self.rtc.now()
    }
}

struct Network {
    wifi: WifiLink,
    mqtt: MqttRelay,
}

impl LinkPort for Network {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected()
    }
}

impl RelayPort for Network {
    fn publish(&mut self, topic: &str, payload: &str) -> bool {
        self.mqtt.publish(topic, payload)
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Leakwatch v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();

    // ── SD card ───────────────────────────────────────────────
    // The card is the mission: without it there is nothing to log, so a
    // mount failure halts rather than sampling into the void.
    if let Err(e) = hw_init::mount_sd() {
        error!("SD mount failed: {} — halting", e);
        loop {
            FreeRtos::delay_ms(1000);
        }
    }
    let mut storage = SdStorage::at_mount_point();

    let browser = FileBrowser::new(hw_init::SD_MOUNT_POINT);
    match browser.list(".") {
        Ok(entries) => {
            info!("Card holds {} entries", entries.len());
            for e in &entries {
                info!("  {} ({} bytes)", e.name, e.size);
            }
        }
        Err(e) => warn!("Card listing failed: {}", e),
    }

    // ── I2C bus: ADS1115 + DS3231 ─────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(100u32.kHz().into()),
    )?;
    let bus = RefCell::new(i2c);

    let mut hw = MeasurementHw {
        afe: AnalogFrontEnd::new(
            Ads1115::new(
                RefCellDevice::new(&bus),
                leakwatch::pins::ADS1115_ADDR,
            ),
            &config,
        ),
        rtc: RtcClock::new(Ds3231::new(
            RefCellDevice::new(&bus),
            leakwatch::pins::DS3231_ADDR,
        )),
    };

    let boot_time = hw.now();
    if boot_time.is_valid() {
        info!("RTC reads {}", boot_time);
    } else {
        warn!("RTC not set ({}); samples will be skipped until it is", boot_time);
    }

    // ── Network ───────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?;
    let mut wifi = WifiLink::new(&config).with_driver(BlockingWifi::wrap(esp_wifi, sysloop)?);
    if WIFI_SSID.is_empty() {
        info!("No WiFi credentials baked in; running card-only");
    } else if let Err(e) = wifi.set_credentials(WIFI_SSID, WIFI_PASS) {
        warn!("WiFi credentials rejected: {}", e);
    }

    let mut mqtt = MqttRelay::new(RetryPolicy::from_config(&config));
    if !MQTT_URL.is_empty() {
        if let Err(e) = mqtt.connect(MQTT_URL, "leakwatch") {
            warn!("MQTT client failed to start: {}", e);
        }
    }
    let mut net = Network { wifi, mqtt };

    // ── Sampler ───────────────────────────────────────────────
    let uptime = Uptime::new();
    let mut service = SamplerService::new(&config);
    let mut sink = LogEventSink;
    service.start(&mut sink);

    info!("Entering sampling loop");

    loop {
        let now_ms = uptime.now_ms();

        // Radio discipline: associate only while the vehicle is parked,
        // so RF noise never rides on the measurement of a moving car.
        if service.is_parked() {
            net.wifi.poll(now_ms);
        } else if net.wifi.state() == WifiState::Connected {
            info!("Vehicle active; dropping WiFi");
            net.wifi.disconnect();
        }

        service.tick(now_ms, &mut hw, &mut storage, &mut net, &mut sink);

        FreeRtos::delay_ms(25);
    }
}
