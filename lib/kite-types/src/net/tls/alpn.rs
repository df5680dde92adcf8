/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::net::HttpVersion;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlpnProtocol {
    Http10,
    Http11,
    Http2,
    Http3,
}

impl fmt::Display for AlpnProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AlpnProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "http/1.0",
            Self::Http11 => "http/1.1",
            Self::Http2 => "h2",
            Self::Http3 => "h3",
        }
    }

    pub fn wired_identification_sequence(&self) -> &'static [u8] {
        match self {
            Self::Http10 => b"\x08http/1.0",
            Self::Http11 => b"\x08http/1.1",
            Self::Http2 => b"\x02h2",
            Self::Http3 => b"\x02h3",
        }
    }

    #[inline]
    pub fn identification_sequence(&self) -> &'static [u8] {
        &self.wired_identification_sequence()[1..]
    }

    pub fn from_buf(buf: &[u8]) -> Option<Self> {
        match buf {
            b"http/1.0" => Some(AlpnProtocol::Http10),
            b"http/1.1" => Some(AlpnProtocol::Http11),
            b"h2" => Some(AlpnProtocol::Http2),
            b"h3" => Some(AlpnProtocol::Http3),
            _ => None,
        }
    }

    pub fn http_version(&self) -> HttpVersion {
        match self {
            Self::Http10 => HttpVersion::HTTP_1_0,
            Self::Http11 => HttpVersion::HTTP_1_1,
            Self::Http2 => HttpVersion::HTTP_2,
            Self::Http3 => HttpVersion::HTTP_3,
        }
    }

    /// Concatenate the protocols into the length-prefixed ALPN list format.
    pub fn wired_list_sequence(protocols: &[AlpnProtocol]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(protocols.len() * 9);
        for p in protocols {
            buf.extend_from_slice(p.wired_identification_sequence());
        }
        buf
    }
}
