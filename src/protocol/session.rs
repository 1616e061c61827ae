//! Protocol session engine.
//!
//! A [`Session`] owns the transport, the cipher and the set of units
//! discovered so far. Every operation forges one request, sends it and waits
//! for the answer carrying the same sequence number until a deadline passes.
//! There is no retransmission; callers re-issue the operation if they want
//! another attempt.
//!
//! ```ignore
//! let config = NetworkConfig::default();
//! let mut session = Session::bind(&config).await?;
//! if let Some(unit) = session.discover_default().await? {
//!     if let Some(ip) = unit.ip {
//!         let token = session.get_token(unit.mac, ip).await?;
//!     }
//! }
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

use crate::config::{ClientConfig, NetworkConfig};
use crate::core::codec::SwitchCodec;
use crate::core::packet::{MacAddress, Packet};
use crate::error::Result;
use crate::protocol::discovery::{is_discovery_reply, DiscoveredUnit, DiscoveryRegistry};
use crate::protocol::forge;
use crate::protocol::status::ErrorCode;
use crate::transport::{is_transient, Transport, UdpTransport};
use crate::utils::metrics::{Metrics, Timer};
use crate::utils::timeout::{deadline_after, until_deadline};

/// Client side of the switch protocol over a single transport.
#[derive(Debug)]
pub struct Session<T: Transport = UdpTransport> {
    transport: T,
    codec: SwitchCodec,
    config: ClientConfig,
    discovered: DiscoveryRegistry,
    metrics: Metrics,
}

impl Session<UdpTransport> {
    /// Validate `config` and bind the UDP sockets it describes.
    #[instrument(skip(config))]
    pub async fn bind(config: &NetworkConfig) -> Result<Self> {
        config.validate_strict()?;
        let transport = UdpTransport::bind(&config.transport).await?;
        Ok(Self::with_transport(transport, config.client.clone()))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            codec: SwitchCodec::new(),
            config,
            discovered: DiscoveryRegistry::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Units discovered by every `discover` call so far.
    pub fn discovered(&self) -> &DiscoveryRegistry {
        &self.discovered
    }

    /// Forget every discovered unit.
    pub fn reset_discovered(&mut self) {
        self.discovered.clear();
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Cipher `packet` and send it to `destination` on the request port.
    async fn transmit(&mut self, packet: &Packet, destination: Ipv4Addr) -> Result<()> {
        let datagram = self.codec.seal(packet)?;
        let target = SocketAddr::from((destination, self.transport.request_port()));
        self.transport.send_to(&datagram, target).await?;
        self.metrics.request_sent(datagram.len() as u64);
        trace!(%target, seq = packet.sequence_number, len = datagram.len(), "Request sent");
        Ok(())
    }

    /// Next decodable packet received before `deadline`.
    ///
    /// Undecodable datagrams and transient receive errors are skipped.
    /// Returns `Ok(None)` once the deadline passes.
    async fn receive_until(&mut self, deadline: Instant) -> Result<Option<Packet>> {
        loop {
            if Instant::now() >= deadline {
                return Ok(None);
            }
            let received = match until_deadline(deadline, self.transport.recv()).await {
                Some(received) => received,
                None => return Ok(None),
            };
            let datagram = match received {
                Ok(datagram) => datagram,
                Err(e) if is_transient(&e) => {
                    trace!(error = %e, "Transient receive error");
                    tokio::task::yield_now().await;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Receive failed");
                    return Err(e.into());
                }
            };
            self.metrics.datagram_received(datagram.len() as u64);

            match self.codec.open(&datagram) {
                Ok(packet) => return Ok(Some(packet)),
                Err(e) => {
                    self.metrics.datagram_discarded();
                    debug!(error = %e, len = datagram.len(), "Discarding undecodable datagram");
                }
            }
        }
    }

    /// Send `request` to `destination` and wait up to `timeout` for the
    /// answer with the same sequence number.
    ///
    /// Returns `Ok(None)` when no matching answer arrives in time. Answers
    /// carrying a non-zero error code are still returned.
    #[instrument(skip(self, request), fields(seq = request.sequence_number))]
    pub async fn send_and_wait(
        &mut self,
        request: &Packet,
        destination: Ipv4Addr,
        timeout: Duration,
    ) -> Result<Option<Packet>> {
        let deadline = deadline_after(timeout);
        self.transmit(request, destination).await?;

        while let Some(packet) = self.receive_until(deadline).await? {
            if packet.sequence_number != request.sequence_number {
                self.metrics.datagram_uncorrelated();
                trace!(got = packet.sequence_number, "Ignoring uncorrelated answer");
                continue;
            }

            self.metrics.response_matched();
            let status = packet.status();
            if !status.is_success() {
                self.metrics.device_error();
                debug!(%status, "Switch reported an error");
            }
            return Ok(Some(packet));
        }

        self.metrics.timeout();
        debug!(timeout_ms = timeout.as_millis(), "No answer before deadline");
        Ok(None)
    }

    /// Probe `target` and collect discovery answers for `duration`.
    ///
    /// A broadcast request listens for the whole window. A unicast request stops
    /// at the first newly discovered unit. Either way the result is the
    /// only unit known to this session, or `None` if there are zero or
    /// several.
    #[instrument(skip(self))]
    pub async fn discover(
        &mut self,
        target: Ipv4Addr,
        duration: Duration,
    ) -> Result<Option<DiscoveredUnit>> {
        let _timer = Timer::start("discover");
        let broadcast = target.is_broadcast() || self.config.broadcast_ip().ok() == Some(target);
        let request = forge::forge_discovery();
        let deadline = deadline_after(duration);
        self.transmit(&request, target).await?;

        while let Some(packet) = self.receive_until(deadline).await? {
            if !is_discovery_reply(&request, &packet) {
                self.metrics.datagram_uncorrelated();
                trace!(seq = packet.sequence_number, "Ignoring non-discovery answer");
                continue;
            }
            self.metrics.response_matched();

            if self.discovered.insert(DiscoveredUnit::from_packet(&packet)) {
                self.metrics.unit_discovered();
                if !broadcast {
                    break;
                }
            }
        }

        let unique = self.discovered.unique().cloned();
        if unique.is_none() {
            debug!(units = self.discovered.len(), "No unique discovery answer");
        }
        Ok(unique)
    }

    /// Broadcast discovery using the configured address and window.
    pub async fn discover_default(&mut self) -> Result<Option<DiscoveredUnit>> {
        let target = self.config.broadcast_ip()?;
        let window = self.config.discovery_window;
        self.discover(target, window).await
    }

    /// Ask the switch for a session token.
    #[instrument(skip(self))]
    pub async fn get_token(&mut self, mac: MacAddress, ip: Ipv4Addr) -> Result<Option<u16>> {
        let _timer = Timer::start("get_token");
        let request = forge::forge_get_token(mac);
        let answer = self
            .send_and_wait(&request, ip, self.config.operation_timeout)
            .await?;
        Ok(answer.map(|packet| packet.token))
    }

    /// Log in with `token`; yields the switch's error code.
    #[instrument(skip(self, user, password))]
    pub async fn login(
        &mut self,
        mac: MacAddress,
        ip: Ipv4Addr,
        token: u16,
        user: &str,
        password: &str,
    ) -> Result<Option<ErrorCode>> {
        let _timer = Timer::start("login");
        let request = forge::forge_login(mac, token, user, password)?;
        let answer = self
            .send_and_wait(&request, ip, self.config.operation_timeout)
            .await?;
        Ok(answer.map(|packet| packet.status()))
    }

    /// Read per-port counters. See [`crate::protocol::monitor::PortStatistics`].
    #[instrument(skip(self))]
    pub async fn get_port_statistics(
        &mut self,
        mac: MacAddress,
        ip: Ipv4Addr,
        token: u16,
    ) -> Result<Option<Packet>> {
        let _timer = Timer::start("get_port_statistics");
        let request = forge::forge_get_port_statistics(mac, token);
        self.send_and_wait(&request, ip, self.config.operation_timeout)
            .await
    }

    /// Run cable diagnostics on `port`. See [`crate::protocol::monitor::CableTestResult`].
    #[instrument(skip(self, user, password))]
    pub async fn cable_test(
        &mut self,
        mac: MacAddress,
        ip: Ipv4Addr,
        token: u16,
        port: u8,
        user: &str,
        password: &str,
    ) -> Result<Option<Packet>> {
        let _timer = Timer::start("cable_test");
        let request = forge::forge_cable_test(mac, token, port, user, password)?;
        self.send_and_wait(&request, ip, self.config.cable_test_timeout)
            .await
    }

    /// Read the per-port QoS priorities.
    #[instrument(skip(self))]
    pub async fn get_qos(
        &mut self,
        mac: MacAddress,
        ip: Ipv4Addr,
        token: u16,
    ) -> Result<Option<Packet>> {
        let _timer = Timer::start("get_qos");
        let request = forge::forge_get_qos(mac, token);
        self.send_and_wait(&request, ip, self.config.operation_timeout)
            .await
    }
}
