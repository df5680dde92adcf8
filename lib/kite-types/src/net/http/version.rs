/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::net::AlpnProtocol;

/// The version of the HTTP protocol, in its "major.minor" numbering scheme.
///
/// The numbers are taken as-is from the request or response line, no range
/// check is done on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpVersion {
    major: u16,
    minor: u16,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HttpVersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid protocol prefix")]
    InvalidPrefix,
    #[error("invalid major version")]
    InvalidMajor,
    #[error("invalid minor version")]
    InvalidMinor,
}

#[cfg(feature = "http")]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HttpVersionConvertError {
    #[error("unknown http version {0:?}")]
    UnknownVersion(http::Version),
    #[error("no http version value for HTTP/{0}.{1}")]
    UnsupportedVersion(u16, u16),
}

fn parse_u16(buf: &[u8]) -> Option<u16> {
    if buf.is_empty() {
        return None;
    }
    let mut v: u16 = 0;
    for b in buf {
        if !b.is_ascii_digit() {
            return None;
        }
        v = v.checked_mul(10)?.checked_add((*b - b'0') as u16)?;
    }
    Some(v)
}

impl HttpVersion {
    pub const HTTP_0_9: HttpVersion = HttpVersion::new(0, 9);
    pub const HTTP_1_0: HttpVersion = HttpVersion::new(1, 0);
    pub const HTTP_1_1: HttpVersion = HttpVersion::new(1, 1);
    pub const HTTP_2: HttpVersion = HttpVersion::new(2, 0);
    pub const HTTP_3: HttpVersion = HttpVersion::new(3, 0);

    #[inline]
    pub const fn new(major: u16, minor: u16) -> Self {
        HttpVersion { major, minor }
    }

    /// The "major" part of the protocol version.
    #[inline]
    pub const fn major(&self) -> u16 {
        self.major
    }

    /// The "minor" part of the protocol version.
    #[inline]
    pub const fn minor(&self) -> u16 {
        self.minor
    }

    /// Parse the version part of a request or status line.
    ///
    /// Both `HTTP/1.1` and the bare `1.1` form are accepted, the prefix is
    /// matched case-insensitively and a missing minor part means 0.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, HttpVersionParseError> {
        if buf.is_empty() {
            return Err(HttpVersionParseError::Empty);
        }

        let numbers = if buf[0].is_ascii_digit() {
            buf
        } else if buf.len() >= 5 && buf[..5].eq_ignore_ascii_case(b"HTTP/") {
            &buf[5..]
        } else {
            return Err(HttpVersionParseError::InvalidPrefix);
        };

        match find_dot(numbers) {
            Some(p) => {
                let major =
                    parse_u16(&numbers[..p]).ok_or(HttpVersionParseError::InvalidMajor)?;
                let minor =
                    parse_u16(&numbers[p + 1..]).ok_or(HttpVersionParseError::InvalidMinor)?;
                Ok(HttpVersion::new(major, minor))
            }
            None => {
                let major = parse_u16(numbers).ok_or(HttpVersionParseError::InvalidMajor)?;
                Ok(HttpVersion::new(major, 0))
            }
        }
    }

    /// Whether connections default to persistent for this version.
    pub fn keep_alive_by_default(&self) -> bool {
        *self >= HttpVersion::HTTP_1_1
    }

    pub fn alpn_protocol(&self) -> Option<AlpnProtocol> {
        match (self.major, self.minor) {
            (1, 0) => Some(AlpnProtocol::Http10),
            (1, 1) => Some(AlpnProtocol::Http11),
            (2, 0) => Some(AlpnProtocol::Http2),
            (3, 0) => Some(AlpnProtocol::Http3),
            _ => None,
        }
    }
}

#[inline]
fn find_dot(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|b| *b == b'.')
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl FromStr for HttpVersion {
    type Err = HttpVersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpVersion::from_bytes(s.as_bytes())
    }
}

#[cfg(feature = "http")]
impl TryFrom<http::Version> for HttpVersion {
    type Error = HttpVersionConvertError;

    fn try_from(value: http::Version) -> Result<Self, Self::Error> {
        match value {
            http::Version::HTTP_09 => Ok(HttpVersion::HTTP_0_9),
            http::Version::HTTP_10 => Ok(HttpVersion::HTTP_1_0),
            http::Version::HTTP_11 => Ok(HttpVersion::HTTP_1_1),
            http::Version::HTTP_2 => Ok(HttpVersion::HTTP_2),
            http::Version::HTTP_3 => Ok(HttpVersion::HTTP_3),
            v => Err(HttpVersionConvertError::UnknownVersion(v)),
        }
    }
}

#[cfg(feature = "http")]
impl TryFrom<HttpVersion> for http::Version {
    type Error = HttpVersionConvertError;

    fn try_from(value: HttpVersion) -> Result<Self, Self::Error> {
        match (value.major, value.minor) {
            (0, 9) => Ok(http::Version::HTTP_09),
            (1, 0) => Ok(http::Version::HTTP_10),
            (1, 1) => Ok(http::Version::HTTP_11),
            (2, 0) => Ok(http::Version::HTTP_2),
            (3, 0) => Ok(http::Version::HTTP_3),
            (major, minor) => Err(HttpVersionConvertError::UnsupportedVersion(major, minor)),
        }
    }
}
