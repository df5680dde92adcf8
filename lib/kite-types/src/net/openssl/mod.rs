/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::{OpensslCredentialSource, OpensslTlsConfiguration};

mod provider;
pub use provider::{OpensslTlsConfig, OpensslTlsProvider};

mod server;
pub use server::OpensslServerConfig;

mod client;
pub use client::OpensslClientConfig;

#[cfg(test)]
mod test_util;
