/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;
use std::time::Duration;

use super::{OpensslCredentialSource, OpensslTlsConfiguration};
use crate::net::{TlsConfig, TlsConfigurationProvider};

const MINIMAL_TIMEOUT: Duration = Duration::from_millis(100);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub type OpensslTlsConfig = TlsConfig<OpensslTlsConfiguration>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpensslTlsProvider {
    accept_timeout: Duration,
    handshake_timeout: Duration,
}

impl Default for OpensslTlsProvider {
    fn default() -> Self {
        OpensslTlsProvider {
            accept_timeout: DEFAULT_TIMEOUT,
            handshake_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpensslTlsProvider {
    pub fn set_accept_timeout(&mut self, timeout: Duration) {
        self.accept_timeout = timeout.max(MINIMAL_TIMEOUT);
    }

    pub fn set_handshake_timeout(&mut self, timeout: Duration) {
        self.handshake_timeout = timeout.max(MINIMAL_TIMEOUT);
    }

    fn configuration(
        &self,
        source: OpensslCredentialSource,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> OpensslTlsConfiguration {
        OpensslTlsConfiguration::new(
            source,
            self_signed,
            cipher_suite,
            self.accept_timeout,
            self.handshake_timeout,
        )
    }
}

impl TlsConfigurationProvider for OpensslTlsProvider {
    type Configuration = OpensslTlsConfiguration;

    fn with_ca_certificate_file(
        &self,
        ca_certificate_file: Option<&Path>,
        certificate_file: Option<&Path>,
        key_file: Option<&Path>,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> OpensslTlsConfiguration {
        let source = OpensslCredentialSource::CaCertificateFile {
            ca_certificate_file: ca_certificate_file.map(Path::to_path_buf),
            certificate_file: certificate_file.map(Path::to_path_buf),
            key_file: key_file.map(Path::to_path_buf),
        };
        self.configuration(source, self_signed, cipher_suite)
    }

    #[cfg(target_os = "linux")]
    fn with_ca_certificate_directory(
        &self,
        ca_certificate_dir: Option<&Path>,
        certificate_file: Option<&Path>,
        key_file: Option<&Path>,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> OpensslTlsConfiguration {
        let source = OpensslCredentialSource::CaCertificateDirectory {
            ca_certificate_dir: ca_certificate_dir.map(Path::to_path_buf),
            certificate_file: certificate_file.map(Path::to_path_buf),
            key_file: key_file.map(Path::to_path_buf),
        };
        self.configuration(source, self_signed, cipher_suite)
    }

    fn with_chain_file(
        &self,
        chain_file: Option<&Path>,
        password: Option<&str>,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> OpensslTlsConfiguration {
        let source = OpensslCredentialSource::ChainFile {
            chain_file: chain_file.map(Path::to_path_buf),
            password: password.map(str::to_string),
        };
        self.configuration(source, self_signed, cipher_suite)
    }
}
