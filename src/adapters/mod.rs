//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements            | Connects to               |
//! |-------------|-----------------------|---------------------------|
//! | `hardware`  | SensorPort            | PIR, load-sense GPIO      |
//! |             | ActuatorPort          | relay, buzzer, status LED |
//! | `http`      | CoordinationTransport | ESP-IDF HTTP client       |
//! | `log_sink`  | EventSink             | Serial log output         |
//! | `time`      | ClockPort             | ESP32 system timer        |
//! | `wifi`      | ConnectivityPort      | ESP-IDF WiFi STA          |
//! | `device_id` | (none)                | eFuse MAC                 |

pub mod device_id;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
