//! Guardian firmware: main entry point.
//!
//! Presence-gated power cutoff. A PIR sensor decides whether the switched
//! load stays powered, either on its own (autonomous builds) or through a
//! coordination server.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   WifiAdapter    Esp32Time     │
//! │  (Sensor+Actuator) (EventSink)    (Connectivity) (ClockPort)   │
//! │  EspHttpTransport                                              │
//! │  (CoordinationTransport)                                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Debounce · Actuator FSM · Link watchdog · Policy      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{info, warn};

use guardian::adapters::device_id;
use guardian::adapters::hardware::HardwareAdapter;
use guardian::adapters::http::EspHttpTransport;
use guardian::adapters::log_sink::LogEventSink;
use guardian::adapters::time::Esp32TimeAdapter;
use guardian::adapters::wifi::WifiAdapter;
use guardian::app::ports::ClockPort;
use guardian::app::service::Controller;
use guardian::config::DeviceConfig;
use guardian::drivers::buzzer::BuzzerDriver;
use guardian::drivers::hw_init::init_board_pins;
use guardian::drivers::relay::RelayDriver;
use guardian::drivers::status_led::StatusLed;
use guardian::drivers::watchdog::Watchdog;
use guardian::error::Error;
use guardian::sensors::load_sense::LoadSense;
use guardian::sensors::pir::PirSensor;
use guardian::sensors::SensorHub;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Guardian v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = DeviceConfig::from_build_env().map_err(Error::from)?;
    let device_id = device_id::resolve(&config.device_id, &device_id::read_mac());
    info!(
        "Config: device_id={} policy={} server={}:{}",
        device_id, config.policy, config.server_host, config.server_port
    );

    // ── 3. Hardware ───────────────────────────────────────────
    let pins = init_board_pins().map_err(Error::from)?;
    let mut hw = HardwareAdapter::new(
        SensorHub::new(
            PirSensor::new(pins.pir, config.motion_active_high),
            LoadSense::new(pins.load_sense),
        ),
        RelayDriver::new(pins.relay, config.relay_active_high),
        BuzzerDriver::new(pins.buzzer),
        StatusLed::new(pins.status_led),
    );

    // ── 4. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut net = WifiAdapter::new(EspWifi::new(peripherals.modem, sys_loop, Some(nvs))?);
    if config.policy.requires_link() {
        // A failed first attempt is not fatal: the link watchdog retries.
        if let Err(e) = net
            .set_credentials(&config.wifi_ssid, &config.wifi_password)
            .and_then(|()| net.connect())
        {
            warn!("WiFi: initial connect failed ({}), watchdog will retry", e);
        }
    }
    let mut transport = EspHttpTransport::new(
        &config.server_host,
        config.server_port,
        u64::from(config.http_timeout_ms),
    )
    .map_err(Error::from)?;

    // ── 5. Controller ─────────────────────────────────────────
    let watchdog = Watchdog::for_config(&config);
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let loop_period_ms = config.loop_period_ms;

    let mut controller = Controller::new(config, device_id);
    controller.start(clock.now_ms(), &mut hw, &net, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        controller.tick(clock.now_ms(), &mut hw, &mut net, &mut transport, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(loop_period_ms);
    }
}
