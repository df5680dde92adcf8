/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

/// The external constructor of TLS library configuration values.
///
/// Each method matches one credential source style. Implementations get the
/// parameters exactly as the caller passed them, and are expected to defer
/// all file access and validation until the configuration is actually used.
pub trait TlsConfigurationProvider {
    type Configuration;

    fn with_ca_certificate_file(
        &self,
        ca_certificate_file: Option<&Path>,
        certificate_file: Option<&Path>,
        key_file: Option<&Path>,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> Self::Configuration;

    /// All certificates in the directory must be stored by subject name
    /// hash, as done by `openssl rehash`.
    #[cfg(target_os = "linux")]
    fn with_ca_certificate_directory(
        &self,
        ca_certificate_dir: Option<&Path>,
        certificate_file: Option<&Path>,
        key_file: Option<&Path>,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> Self::Configuration;

    fn with_chain_file(
        &self,
        chain_file: Option<&Path>,
        password: Option<&str>,
        self_signed: bool,
        cipher_suite: Option<&str>,
    ) -> Self::Configuration;
}

/// Options shared by all credential source styles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsConfigOptions {
    self_signed: bool,
    cipher_suite: Option<String>,
}

impl Default for TlsConfigOptions {
    fn default() -> Self {
        TlsConfigOptions {
            self_signed: true,
            cipher_suite: None,
        }
    }
}

impl TlsConfigOptions {
    pub fn set_self_signed(&mut self, self_signed: bool) {
        self.self_signed = self_signed;
    }

    pub fn set_cipher_suite(&mut self, cipher_suite: String) {
        self.cipher_suite = Some(cipher_suite);
    }

    #[inline]
    pub fn self_signed(&self) -> bool {
        self.self_signed
    }

    #[inline]
    pub fn cipher_suite(&self) -> Option<&str> {
        self.cipher_suite.as_deref()
    }
}

/// TLS configuration built from one of the supported credential sources.
///
/// The wrapped value is produced by a [`TlsConfigurationProvider`] and is
/// never inspected here. Missing or invalid files will only be reported
/// when the wrapped value is used to set up TLS sessions.
#[derive(Clone, Debug)]
pub struct TlsConfig<C> {
    config: C,
}

impl<C> TlsConfig<C> {
    /// Use a PEM formatted CA certificate file.
    ///
    /// If `key_file` is `None`, the provider is expected to load the key from
    /// `certificate_file`.
    pub fn with_ca_certificate_file<P>(
        provider: &P,
        ca_certificate_file: Option<&Path>,
        certificate_file: Option<&Path>,
        key_file: Option<&Path>,
        options: &TlsConfigOptions,
    ) -> Self
    where
        P: TlsConfigurationProvider<Configuration = C>,
    {
        let config = provider.with_ca_certificate_file(
            ca_certificate_file,
            certificate_file,
            key_file,
            options.self_signed,
            options.cipher_suite(),
        );
        TlsConfig { config }
    }

    /// Use a directory of hashed CA certificates.
    #[cfg(target_os = "linux")]
    pub fn with_ca_certificate_directory<P>(
        provider: &P,
        ca_certificate_dir: Option<&Path>,
        certificate_file: Option<&Path>,
        key_file: Option<&Path>,
        options: &TlsConfigOptions,
    ) -> Self
    where
        P: TlsConfigurationProvider<Configuration = C>,
    {
        let config = provider.with_ca_certificate_directory(
            ca_certificate_dir,
            certificate_file,
            key_file,
            options.self_signed,
            options.cipher_suite(),
        );
        TlsConfig { config }
    }

    /// Use a certificate chain file.
    ///
    /// The chain starts with the subject's certificate, followed by the
    /// intermediate CA certificates, and ends at the root CA.
    pub fn with_chain_file<P>(
        provider: &P,
        chain_file: Option<&Path>,
        password: Option<&str>,
        options: &TlsConfigOptions,
    ) -> Self
    where
        P: TlsConfigurationProvider<Configuration = C>,
    {
        let config = provider.with_chain_file(
            chain_file,
            password,
            options.self_signed,
            options.cipher_suite(),
        );
        TlsConfig { config }
    }

    #[inline]
    pub fn config(&self) -> &C {
        &self.config
    }

    #[inline]
    pub fn into_config(self) -> C {
        self.config
    }
}
