/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod alpn;
pub use alpn::AlpnProtocol;

mod config;
pub use config::{TlsConfig, TlsConfigOptions, TlsConfigurationProvider};
