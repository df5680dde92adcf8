/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use kite_types::net::{OpensslTlsConfig, OpensslTlsProvider, TlsConfigOptions};

pub fn as_cipher_suite(value: &Yaml) -> anyhow::Result<String> {
    let suite = match value {
        Yaml::String(s) => s.to_string(),
        Yaml::Array(seq) => {
            let mut ciphers = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                if let Yaml::String(s) = v {
                    ciphers.push(s.as_str());
                } else {
                    return Err(anyhow!("invalid cipher string for #{i}"));
                }
            }
            ciphers.join(":")
        }
        _ => {
            return Err(anyhow!(
                "yaml value type for cipher suite should be 'string' or an 'array' of string"
            ));
        }
    };
    if suite.is_empty() {
        return Err(anyhow!("empty cipher suite"));
    }
    Ok(suite)
}

#[cfg(target_os = "linux")]
fn ca_dir_config(
    provider: &OpensslTlsProvider,
    ca_dir: &Path,
    certificate_file: Option<&Path>,
    key_file: Option<&Path>,
    options: &TlsConfigOptions,
) -> anyhow::Result<OpensslTlsConfig> {
    Ok(OpensslTlsConfig::with_ca_certificate_directory(
        provider,
        Some(ca_dir),
        certificate_file,
        key_file,
        options,
    ))
}

#[cfg(not(target_os = "linux"))]
fn ca_dir_config(
    _provider: &OpensslTlsProvider,
    ca_dir: &Path,
    _certificate_file: Option<&Path>,
    _key_file: Option<&Path>,
    _options: &TlsConfigOptions,
) -> anyhow::Result<OpensslTlsConfig> {
    Err(anyhow!(
        "ca certificate dir {} is not supported on this platform",
        ca_dir.display()
    ))
}

/// Parse a TLS config map.
///
/// Only the shape of the map is checked here, the referenced files will be
/// loaded when the server or client context is built.
pub fn as_tls_config(value: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<OpensslTlsConfig> {
    let Yaml::Hash(map) = value else {
        return Err(anyhow!("yaml value type for 'tls config' should be 'map'"));
    };

    let mut provider = OpensslTlsProvider::default();
    let mut options = TlsConfigOptions::default();
    let mut ca_file: Option<PathBuf> = None;
    let mut ca_dir: Option<PathBuf> = None;
    let mut cert_file: Option<PathBuf> = None;
    let mut key_file: Option<PathBuf> = None;
    let mut chain_file: Option<PathBuf> = None;
    let mut password: Option<String> = None;

    crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
        "ca_certificate_file" | "ca_cert_file" | "ca_file" => {
            let path = crate::value::as_config_path(v, lookup_dir)
                .context(format!("invalid path value for key {k}"))?;
            ca_file = Some(path);
            Ok(())
        }
        "ca_certificate_dir" | "ca_cert_dir" | "ca_dir" => {
            let path = crate::value::as_config_path(v, lookup_dir)
                .context(format!("invalid path value for key {k}"))?;
            ca_dir = Some(path);
            Ok(())
        }
        "certificate_file" | "cert_file" | "certificate" | "cert" => {
            let path = crate::value::as_config_path(v, lookup_dir)
                .context(format!("invalid path value for key {k}"))?;
            cert_file = Some(path);
            Ok(())
        }
        "key_file" | "private_key_file" | "private_key" | "key" => {
            let path = crate::value::as_config_path(v, lookup_dir)
                .context(format!("invalid path value for key {k}"))?;
            key_file = Some(path);
            Ok(())
        }
        "chain_file" | "certificate_chain_file" => {
            let path = crate::value::as_config_path(v, lookup_dir)
                .context(format!("invalid path value for key {k}"))?;
            chain_file = Some(path);
            Ok(())
        }
        "password" => {
            let s = crate::value::as_string(v).context(format!("invalid value for key {k}"))?;
            password = Some(s);
            Ok(())
        }
        "self_signed" | "self_signed_certs" => {
            let self_signed =
                crate::value::as_bool(v).context(format!("invalid bool value for key {k}"))?;
            options.set_self_signed(self_signed);
            Ok(())
        }
        "cipher_suite" | "ciphers" => {
            let suite =
                as_cipher_suite(v).context(format!("invalid cipher suite value for key {k}"))?;
            options.set_cipher_suite(suite);
            Ok(())
        }
        "accept_timeout" => {
            let timeout = crate::humanize::as_duration(v)
                .context(format!("invalid humanize duration value for key {k}"))?;
            provider.set_accept_timeout(timeout);
            Ok(())
        }
        "handshake_timeout" | "negotiation_timeout" => {
            let timeout = crate::humanize::as_duration(v)
                .context(format!("invalid humanize duration value for key {k}"))?;
            provider.set_handshake_timeout(timeout);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    let use_cert_files =
        ca_file.is_some() || ca_dir.is_some() || cert_file.is_some() || key_file.is_some();
    let use_chain_file = chain_file.is_some() || password.is_some();
    if use_cert_files && use_chain_file {
        return Err(anyhow!(
            "certificate chain file should not be used together with certificate files"
        ));
    }

    if use_chain_file {
        return Ok(OpensslTlsConfig::with_chain_file(
            &provider,
            chain_file.as_deref(),
            password.as_deref(),
            &options,
        ));
    }

    if let Some(dir) = ca_dir {
        if ca_file.is_some() {
            return Err(anyhow!(
                "ca certificate file and ca certificate dir are mutually exclusive"
            ));
        }
        return ca_dir_config(
            &provider,
            &dir,
            cert_file.as_deref(),
            key_file.as_deref(),
            &options,
        );
    }

    Ok(OpensslTlsConfig::with_ca_certificate_file(
        &provider,
        ca_file.as_deref(),
        cert_file.as_deref(),
        key_file.as_deref(),
        &options,
    ))
}
