/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use log::warn;
use openssl::ssl::{SslConnector, SslContext, SslMethod};

use super::OpensslTlsConfiguration;
use crate::net::AlpnProtocol;

#[derive(Clone)]
pub struct OpensslClientConfig {
    pub ssl_context: SslContext,
    pub handshake_timeout: Duration,
}

impl OpensslTlsConfiguration {
    pub fn build_client_with_alpn_protocols(
        &self,
        alpn_protocols: &[AlpnProtocol],
    ) -> anyhow::Result<OpensslClientConfig> {
        let mut ssl_builder = SslConnector::builder(SslMethod::tls_client())
            .map_err(|e| anyhow!("failed to create ssl context builder: {e}"))?;

        self.set_cipher_suite(&mut ssl_builder)?;
        self.load_credentials(&mut ssl_builder, false)
            .context("failed to load client credentials")?;

        if self.self_signed() {
            warn!("server certificate verification is disabled for self-signed certificates");
        }
        ssl_builder.set_verify(self.verify_mode());

        if !alpn_protocols.is_empty() {
            let buf = AlpnProtocol::wired_list_sequence(alpn_protocols);
            ssl_builder
                .set_alpn_protos(buf.as_slice())
                .map_err(|e| anyhow!("failed to set alpn protocols: {e}"))?;
        }

        Ok(OpensslClientConfig {
            ssl_context: ssl_builder.build().into_context(),
            handshake_timeout: self.handshake_timeout(),
        })
    }

    #[inline]
    pub fn build_client(&self) -> anyhow::Result<OpensslClientConfig> {
        self.build_client_with_alpn_protocols(&[])
    }
}
