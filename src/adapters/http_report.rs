//! HTTP(S) status reporter.
//!
//! Implements [`ReportPort`]: serialises a [`TelemetryPayload`] to JSON and
//! POSTs it to the configured endpoint.  One request per call, no retry;
//! the schedulers decide when the next attempt happens.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection`, with the ESP x509
//!   certificate bundle attached when `verify_tls` is set.
//! - **all other targets**: plain HTTP/1.1 over `std::net::TcpStream`.
//!   `https://` endpoints are rejected with [`CommsError::TlsUnsupported`].

use log::debug;

use crate::adapters::wifi::{ConnectivityPort, WifiAdapter};
use crate::app::ports::ReportPort;
use crate::app::telemetry::TelemetryPayload;
use crate::config::NetworkConfig;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Endpoint parsing
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// A parsed `scheme://host[:port][/path]` URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub scheme: Scheme,
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

impl<'a> Endpoint<'a> {
    pub fn parse(url: &'a str) -> Result<Self, CommsError> {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else if let Some(rest) = url.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else {
            return Err(CommsError::InvalidEndpoint);
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().map_err(|_| CommsError::InvalidEndpoint)?),
            None => (authority, if scheme == Scheme::Https { 443 } else { 80 }),
        };
        if host.is_empty() {
            return Err(CommsError::InvalidEndpoint);
        }
        Ok(Self { scheme, host, port, path })
    }
}

/// `true` for 2xx.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

// ───────────────────────────────────────────────────────────────
// Reporter
// ───────────────────────────────────────────────────────────────

/// Owns the WiFi link it reports over, so "online" always means the
/// same link the request will use.
pub struct HttpReporter {
    wifi: WifiAdapter,
    endpoint: heapless::String<128>,
    verify_tls: bool,
    timeout_ms: u32,
}

impl HttpReporter {
    pub fn new(cfg: &NetworkConfig, wifi: WifiAdapter) -> Self {
        if !cfg.verify_tls {
            log::warn!("HTTP reporter: certificate validation DISABLED");
        }
        Self {
            wifi,
            endpoint: cfg.endpoint.clone(),
            verify_tls: cfg.verify_tls,
            timeout_ms: cfg.request_timeout_ms,
        }
    }

    pub fn wifi(&self) -> &WifiAdapter {
        &self.wifi
    }

    pub fn wifi_mut(&mut self) -> &mut WifiAdapter {
        &mut self.wifi
    }

    #[cfg(target_os = "espidf")]
    fn post(&self, body: &[u8]) -> Result<u16, CommsError> {
        use core::time::Duration;
        use embedded_svc::http::Status;
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Write;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        fn transport(e: impl core::fmt::Debug) -> CommsError {
            log::warn!("HTTP: {:?}", e);
            CommsError::Transport
        }

        let endpoint = Endpoint::parse(&self.endpoint)?;
        let conf = Configuration {
            timeout: Some(Duration::from_millis(u64::from(self.timeout_ms))),
            crt_bundle_attach: (endpoint.scheme == Scheme::Https && self.verify_tls)
                .then_some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };

        let mut client = Client::wrap(EspHttpConnection::new(&conf).map_err(transport)?);
        let len = body.len().to_string();
        let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
        let mut request = client.post(&self.endpoint, &headers).map_err(transport)?;
        request.write_all(body).map_err(transport)?;
        request.flush().map_err(transport)?;
        let response = request.submit().map_err(transport)?;
        Ok(response.status())
    }

    #[cfg(not(target_os = "espidf"))]
    fn post(&self, body: &[u8]) -> Result<u16, CommsError> {
        use std::io::{BufRead, BufReader, Write};
        use std::net::{TcpStream, ToSocketAddrs};
        use std::time::Duration;

        let endpoint = Endpoint::parse(&self.endpoint)?;
        if endpoint.scheme == Scheme::Https {
            return Err(CommsError::TlsUnsupported);
        }
        let timeout = Duration::from_millis(u64::from(self.timeout_ms.max(1)));

        let addr = (endpoint.host, endpoint.port)
            .to_socket_addrs()
            .map_err(|_| CommsError::Transport)?
            .next()
            .ok_or(CommsError::Transport)?;
        let mut stream = TcpStream::connect_timeout(&addr, timeout).map_err(|_| CommsError::Transport)?;
        stream.set_read_timeout(Some(timeout)).map_err(|_| CommsError::Transport)?;
        stream.set_write_timeout(Some(timeout)).map_err(|_| CommsError::Transport)?;

        let head = format!(
            "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            endpoint.path,
            endpoint.host,
            body.len()
        );
        stream.write_all(head.as_bytes()).map_err(|_| CommsError::Transport)?;
        stream.write_all(body).map_err(|_| CommsError::Transport)?;
        stream.flush().map_err(|_| CommsError::Transport)?;

        let mut status_line = String::new();
        BufReader::new(stream)
            .read_line(&mut status_line)
            .map_err(|_| CommsError::Transport)?;
        // "HTTP/1.1 200 OK"
        status_line
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .ok_or(CommsError::Transport)
    }
}

impl ReportPort for HttpReporter {
    fn is_online(&self) -> bool {
        self.wifi.is_connected()
    }

    fn send(&mut self, payload: &TelemetryPayload) -> Result<(), CommsError> {
        if !self.is_online() {
            return Err(CommsError::NotConnected);
        }
        let body = payload.to_json()?;
        let status = self.post(&body)?;
        debug!("HTTP: POST {} -> {}", self.endpoint, status);
        if is_success(status) { Ok(()) } else { Err(CommsError::HttpStatus(status)) }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
