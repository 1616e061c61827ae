//! # Datagram Codec
//!
//! `tokio_util` codec turning a [`Packet`] into one ciphered datagram and back.
//!
//! The session works on whole datagrams through [`SwitchCodec::seal`] and
//! [`SwitchCodec::open`]. The [`Encoder`]/[`Decoder`] impls frame the same
//! datagrams for consumers driving their own sockets, e.g. through
//! `tokio_util::udp::UdpFramed`; the in-memory peer decodes requests with them.
//!
//! Every call to `decode` consumes the whole buffer: one buffer is one
//! datagram. A datagram too short to carry a header is reported as
//! [`ProtocolError::InvalidHeader`] so callers can discard it instead of
//! mistaking a default packet for an answer.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::packet::Packet;
use crate::error::{ProtocolError, Result};
use crate::utils::crypto::Crypto;

#[derive(Debug, Clone, Default)]
pub struct SwitchCodec {
    crypto: Crypto,
}

impl SwitchCodec {
    /// Codec keyed with the fixed device key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec using a specific cipher.
    pub fn with_crypto(crypto: Crypto) -> Self {
        Self { crypto }
    }

    /// Serialize and cipher `packet` into a standalone datagram.
    pub fn seal(&self, packet: &Packet) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(packet.wire_len());
        packet.encode_into(&mut buf)?;
        self.crypto.apply_in_place(&mut buf);
        Ok(buf)
    }

    /// Decipher and parse a single datagram.
    pub fn open(&self, datagram: &[u8]) -> Result<Packet> {
        let plain = self.crypto.apply(datagram);
        Packet::try_from_bytes(&plain)
    }
}

impl Encoder<&Packet> for SwitchCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: &Packet, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        packet.encode_into(dst)?;
        self.crypto.apply_in_place(&mut dst[start..]);
        Ok(())
    }
}

impl Encoder<Packet> for SwitchCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<()> {
        <Self as Encoder<&Packet>>::encode(self, &packet, dst)
    }
}

impl Decoder for SwitchCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>> {
        if src.is_empty() {
            return Ok(None);
        }
        let mut datagram = src.split();
        self.crypto.apply_in_place(&mut datagram);
        Packet::try_from_bytes(&datagram).map(Some)
    }
}
