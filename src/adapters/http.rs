//! HTTP transport adapters for the coordination server.
//!
//! - [`EspHttpTransport`] (device only): one `EspHttpConnection` per
//!   request, bounded by the configured timeout.
//! - [`NullTransport`]: refuses every request. Used by host builds and by
//!   the autonomous policy, which never talks to a server.

use core::fmt::Write as _;

#[cfg(target_os = "espidf")]
use log::debug;

use crate::app::ports::{CoordinationTransport, HttpMethod, HttpResponse};
use crate::error::TransportError;

/// Base URL buffer: `http://` + 64-byte host + `:65535`.
pub type BaseUrl = heapless::String<96>;

pub fn base_url(host: &str, port: u16) -> Result<BaseUrl, TransportError> {
    let mut url = BaseUrl::new();
    write!(url, "http://{}:{}", host, port).map_err(|_| TransportError::Connect)?;
    Ok(url)
}

// ───────────────────────────────────────────────────────────────
// Null transport
// ───────────────────────────────────────────────────────────────

/// A transport with nothing on the other end.
#[derive(Debug, Default)]
pub struct NullTransport;

impl CoordinationTransport for NullTransport {
    fn request(
        &mut self,
        _method: HttpMethod,
        _path: &str,
        _body: Option<&[u8]>,
    ) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connect)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF HTTP client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspHttpTransport;

#[cfg(target_os = "espidf")]
mod esp {
    use core::fmt::Write as _;
    use core::time::Duration;

    use embedded_svc::http::client::Client as HttpClient;
    use embedded_svc::http::{Method, Status};
    use embedded_svc::io::{Read, Write};
    use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};
    use esp_idf_svc::io::EspIOError;

    use super::*;
    use crate::app::ports::MAX_RESPONSE_BODY;

    pub struct EspHttpTransport {
        base_url: BaseUrl,
        timeout: Duration,
    }

    impl EspHttpTransport {
        pub fn new(host: &str, port: u16, timeout_ms: u64) -> Result<Self, TransportError> {
            Ok(Self {
                base_url: base_url(host, port)?,
                timeout: Duration::from_millis(timeout_ms),
            })
        }

        fn classify(e: EspIOError) -> TransportError {
            let code = e.0.code();
            if code == esp_idf_svc::sys::ESP_ERR_HTTP_EAGAIN as esp_idf_svc::sys::esp_err_t
                || code == esp_idf_svc::sys::ESP_ERR_TIMEOUT as esp_idf_svc::sys::esp_err_t
            {
                TransportError::Timeout
            } else {
                TransportError::Io
            }
        }
    }

    impl CoordinationTransport for EspHttpTransport {
        fn request(
            &mut self,
            method: HttpMethod,
            path: &str,
            body: Option<&[u8]>,
        ) -> Result<HttpResponse, TransportError> {
            let mut url: heapless::String<160> = heapless::String::new();
            write!(url, "{}{}", self.base_url, path).map_err(|_| TransportError::Connect)?;

            let conf = HttpClientConfiguration {
                timeout: Some(self.timeout),
                ..Default::default()
            };
            let conn = EspHttpConnection::new(&conf).map_err(|_| TransportError::Connect)?;
            let mut client = HttpClient::wrap(conn);

            let method = match method {
                HttpMethod::Get => Method::Get,
                HttpMethod::Post => Method::Post,
            };

            let mut len_buf: heapless::String<8> = heapless::String::new();
            let payload = body.unwrap_or(&[]);
            write!(len_buf, "{}", payload.len()).map_err(|_| TransportError::Io)?;
            let json_headers = [
                ("Content-Type", "application/json"),
                ("Content-Length", len_buf.as_str()),
            ];
            let headers: &[(&str, &str)] = if body.is_some() { &json_headers } else { &[] };

            let mut request = client
                .request(method, &url, headers)
                .map_err(|_| TransportError::Connect)?;
            if !payload.is_empty() {
                request.write_all(payload).map_err(Self::classify)?;
                request.flush().map_err(Self::classify)?;
            }
            let mut response = request.submit().map_err(Self::classify)?;
            let status = response.status();
            debug!("HTTP {:?} {} -> {}", method, url, status);

            let mut out: heapless::Vec<u8, MAX_RESPONSE_BODY> = heapless::Vec::new();
            let mut chunk = [0u8; 128];
            loop {
                let n = response.read(&mut chunk).map_err(Self::classify)?;
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&chunk[..n])
                    .map_err(|_| TransportError::BodyTooLarge)?;
            }

            Ok(HttpResponse { status, body: out })
        }
    }
}
