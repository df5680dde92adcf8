/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use log::debug;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::ssl::{SslContextBuilder, SslFiletype, SslVerifyMode};
#[cfg(target_os = "linux")]
use openssl::x509::store::X509Lookup;

const MAX_CHAIN_FILE_SIZE: u64 = 4_000_000; // 4MB

#[derive(Clone, PartialEq, Eq)]
pub enum OpensslCredentialSource {
    CaCertificateFile {
        ca_certificate_file: Option<PathBuf>,
        certificate_file: Option<PathBuf>,
        key_file: Option<PathBuf>,
    },
    #[cfg(target_os = "linux")]
    CaCertificateDirectory {
        ca_certificate_dir: Option<PathBuf>,
        certificate_file: Option<PathBuf>,
        key_file: Option<PathBuf>,
    },
    ChainFile {
        chain_file: Option<PathBuf>,
        password: Option<String>,
    },
}

impl fmt::Debug for OpensslCredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpensslCredentialSource::CaCertificateFile {
                ca_certificate_file,
                certificate_file,
                key_file,
            } => f
                .debug_struct("CaCertificateFile")
                .field("ca_certificate_file", ca_certificate_file)
                .field("certificate_file", certificate_file)
                .field("key_file", key_file)
                .finish(),
            #[cfg(target_os = "linux")]
            OpensslCredentialSource::CaCertificateDirectory {
                ca_certificate_dir,
                certificate_file,
                key_file,
            } => f
                .debug_struct("CaCertificateDirectory")
                .field("ca_certificate_dir", ca_certificate_dir)
                .field("certificate_file", certificate_file)
                .field("key_file", key_file)
                .finish(),
            OpensslCredentialSource::ChainFile {
                chain_file,
                password,
            } => f
                .debug_struct("ChainFile")
                .field("chain_file", chain_file)
                .field("password", &password.as_ref().map(|_| "******"))
                .finish(),
        }
    }
}

/// The OpenSSL side configuration value.
///
/// Nothing is read from disk until one of the `build_*` methods is called.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpensslTlsConfiguration {
    source: OpensslCredentialSource,
    self_signed: bool,
    cipher_suite: Option<String>,
    accept_timeout: Duration,
    handshake_timeout: Duration,
}

impl OpensslTlsConfiguration {
    pub(super) fn new(
        source: OpensslCredentialSource,
        self_signed: bool,
        cipher_suite: Option<&str>,
        accept_timeout: Duration,
        handshake_timeout: Duration,
    ) -> Self {
        OpensslTlsConfiguration {
            source,
            self_signed,
            cipher_suite: cipher_suite.map(str::to_string),
            accept_timeout,
            handshake_timeout,
        }
    }

    #[inline]
    pub fn source(&self) -> &OpensslCredentialSource {
        &self.source
    }

    #[inline]
    pub fn self_signed(&self) -> bool {
        self.self_signed
    }

    #[inline]
    pub fn cipher_suite(&self) -> Option<&str> {
        self.cipher_suite.as_deref()
    }

    #[inline]
    pub fn accept_timeout(&self) -> Duration {
        self.accept_timeout
    }

    #[inline]
    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    pub(super) fn verify_mode(&self) -> SslVerifyMode {
        if self.self_signed {
            SslVerifyMode::NONE
        } else {
            SslVerifyMode::PEER
        }
    }

    pub(super) fn set_cipher_suite(&self, builder: &mut SslContextBuilder) -> anyhow::Result<()> {
        if let Some(ciphers) = &self.cipher_suite {
            builder
                .set_cipher_list(ciphers)
                .map_err(|e| anyhow!("failed to set cipher list {ciphers}: {e}"))?;
        }
        Ok(())
    }

    /// Load CA certificates and the local certificate chain into the context.
    ///
    /// The local certificate is mandatory only if `require_cert` is set.
    pub(super) fn load_credentials(
        &self,
        builder: &mut SslContextBuilder,
        require_cert: bool,
    ) -> anyhow::Result<()> {
        match &self.source {
            OpensslCredentialSource::CaCertificateFile {
                ca_certificate_file,
                certificate_file,
                key_file,
            } => {
                if let Some(ca_file) = ca_certificate_file {
                    builder.set_ca_file(ca_file).map_err(|e| {
                        anyhow!(
                            "failed to load ca certificate file {}: {e}",
                            ca_file.display()
                        )
                    })?;
                }
                load_certificate_key_files(
                    builder,
                    certificate_file.as_deref(),
                    key_file.as_deref(),
                    require_cert,
                )
            }
            #[cfg(target_os = "linux")]
            OpensslCredentialSource::CaCertificateDirectory {
                ca_certificate_dir,
                certificate_file,
                key_file,
            } => {
                if let Some(ca_dir) = ca_certificate_dir {
                    add_ca_certificate_dir(builder, ca_dir)?;
                }
                load_certificate_key_files(
                    builder,
                    certificate_file.as_deref(),
                    key_file.as_deref(),
                    require_cert,
                )
            }
            OpensslCredentialSource::ChainFile {
                chain_file,
                password,
            } => match chain_file {
                Some(path) => load_chain_file(builder, path, password.as_deref()),
                None if require_cert => Err(anyhow!("no certificate chain file set")),
                None => Ok(()),
            },
        }
    }
}

#[cfg(target_os = "linux")]
fn add_ca_certificate_dir(builder: &mut SslContextBuilder, dir: &Path) -> anyhow::Result<()> {
    let dir_s = dir
        .to_str()
        .ok_or_else(|| anyhow!("ca certificate dir {} is not valid utf-8", dir.display()))?;
    let lookup = builder
        .cert_store_mut()
        .add_lookup(X509Lookup::hash_dir())
        .map_err(|e| anyhow!("failed to add hash dir lookup: {e}"))?;
    lookup
        .add_dir(dir_s, SslFiletype::PEM)
        .map_err(|e| anyhow!("failed to add ca certificate dir {dir_s}: {e}"))?;
    debug!("added ca certificate dir {dir_s}");
    Ok(())
}

fn load_certificate_key_files(
    builder: &mut SslContextBuilder,
    certificate_file: Option<&Path>,
    key_file: Option<&Path>,
    require_cert: bool,
) -> anyhow::Result<()> {
    let Some(cert_file) = certificate_file else {
        if key_file.is_some() {
            return Err(anyhow!("private key file is set without certificate file"));
        }
        if require_cert {
            return Err(anyhow!("no certificate file set"));
        }
        return Ok(());
    };

    builder
        .set_certificate_chain_file(cert_file)
        .map_err(|e| {
            anyhow!(
                "failed to load certificate file {}: {e}",
                cert_file.display()
            )
        })?;

    let key_file = match key_file {
        Some(path) => path,
        None => {
            debug!(
                "no private key file set, will load it from certificate file {}",
                cert_file.display()
            );
            cert_file
        }
    };
    builder
        .set_private_key_file(key_file, SslFiletype::PEM)
        .map_err(|e| {
            anyhow!(
                "failed to load private key file {}: {e}",
                key_file.display()
            )
        })?;
    builder
        .check_private_key()
        .map_err(|e| anyhow!("private key mismatch with the certificate: {e}"))?;
    debug!("loaded certificate file {}", cert_file.display());
    Ok(())
}

fn load_chain_file(
    builder: &mut SslContextBuilder,
    chain_file: &Path,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let mut file = File::open(chain_file)
        .map_err(|e| anyhow!("failed to open chain file {}: {e}", chain_file.display()))?;
    let size = file
        .metadata()
        .map_err(|e| anyhow!("failed to stat chain file {}: {e}", chain_file.display()))?
        .len();
    if size > MAX_CHAIN_FILE_SIZE {
        return Err(anyhow!(
            "chain file {} too large: {size} bytes, the limit is {MAX_CHAIN_FILE_SIZE}",
            chain_file.display()
        ));
    }
    let mut contents = Vec::with_capacity(size as usize);
    file.read_to_end(&mut contents)
        .map_err(|e| anyhow!("failed to read chain file {}: {e}", chain_file.display()))?;

    if contents.trim_ascii_start().starts_with(b"-----BEGIN") {
        load_pem_chain(builder, chain_file, &contents, password)?;
    } else {
        load_pkcs12_chain(builder, chain_file, &contents, password)?;
    }
    builder
        .check_private_key()
        .map_err(|e| anyhow!("private key mismatch with the certificate: {e}"))?;
    debug!("loaded certificate chain file {}", chain_file.display());
    Ok(())
}

/// The leaf certificate comes first, followed by the intermediate and root
/// CA certificates. The private key may be encrypted with `password`.
fn load_pem_chain(
    builder: &mut SslContextBuilder,
    chain_file: &Path,
    contents: &[u8],
    password: Option<&str>,
) -> anyhow::Result<()> {
    builder.set_certificate_chain_file(chain_file).map_err(|e| {
        anyhow!(
            "failed to load certificates from chain file {}: {e}",
            chain_file.display()
        )
    })?;
    let key = PKey::private_key_from_pem_passphrase(
        contents,
        password.unwrap_or_default().as_bytes(),
    )
    .map_err(|e| {
        anyhow!(
            "failed to load private key from chain file {}: {e}",
            chain_file.display()
        )
    })?;
    builder
        .set_private_key(&key)
        .map_err(|e| anyhow!("failed to set private key: {e}"))
}

fn load_pkcs12_chain(
    builder: &mut SslContextBuilder,
    chain_file: &Path,
    contents: &[u8],
    password: Option<&str>,
) -> anyhow::Result<()> {
    let pkcs12 = Pkcs12::from_der(contents)
        .map_err(|e| anyhow!("invalid pkcs12 chain file {}: {e}", chain_file.display()))?;
    let parsed = pkcs12.parse2(password.unwrap_or_default()).map_err(|e| {
        anyhow!(
            "failed to decrypt chain file {}: {e}",
            chain_file.display()
        )
    })?;

    let Some(cert) = parsed.cert else {
        return Err(anyhow!(
            "no certificate found in chain file {}",
            chain_file.display()
        ));
    };
    let Some(key) = parsed.pkey else {
        return Err(anyhow!(
            "no private key found in chain file {}",
            chain_file.display()
        ));
    };

    builder
        .set_certificate(&cert)
        .map_err(|e| anyhow!("failed to set certificate: {e}"))?;
    builder
        .set_private_key(&key)
        .map_err(|e| anyhow!("failed to set private key: {e}"))?;
    if let Some(chain) = parsed.ca {
        for (i, cert) in chain.into_iter().enumerate() {
            builder
                .add_extra_chain_cert(cert)
                .map_err(|e| anyhow!("failed to add chain certificate #{i}: {e}"))?;
        }
    }
    Ok(())
}
