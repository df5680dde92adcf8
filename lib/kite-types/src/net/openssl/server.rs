/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use openssl::ssl::{AlpnError, SslAcceptor, SslContext, SslMethod, SslSessionCacheMode};

use super::OpensslTlsConfiguration;
use crate::net::AlpnProtocol;

#[derive(Clone)]
pub struct OpensslServerConfig {
    pub ssl_context: SslContext,
    pub accept_timeout: Duration,
}

impl OpensslTlsConfiguration {
    pub fn build_server_with_alpn_protocols(
        &self,
        alpn_protocols: &[AlpnProtocol],
    ) -> anyhow::Result<OpensslServerConfig> {
        let mut ssl_builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls_server())
            .map_err(|e| anyhow!("failed to build ssl context: {e}"))?;

        self.set_cipher_suite(&mut ssl_builder)?;
        self.load_credentials(&mut ssl_builder, true)
            .context("failed to load server credentials")?;

        ssl_builder.set_verify(self.verify_mode());
        ssl_builder.set_session_cache_mode(SslSessionCacheMode::SERVER);

        if !alpn_protocols.is_empty() {
            let protocols = alpn_protocols.to_vec();
            ssl_builder.set_alpn_select_callback(move |_, client_list| {
                select_alpn_protocol(&protocols, client_list)
            });
        }

        let ssl_acceptor = ssl_builder.build();

        Ok(OpensslServerConfig {
            ssl_context: ssl_acceptor.into_context(),
            accept_timeout: self.accept_timeout(),
        })
    }

    #[inline]
    pub fn build_server(&self) -> anyhow::Result<OpensslServerConfig> {
        self.build_server_with_alpn_protocols(&[])
    }
}

/// Pick the first server protocol that is also offered by the client.
///
/// The returned name always points into `client_list`.
fn select_alpn_protocol<'a>(
    protocols: &[AlpnProtocol],
    client_list: &'a [u8],
) -> Result<&'a [u8], AlpnError> {
    for protocol in protocols {
        let mut offset = 0;
        while offset < client_list.len() {
            let name_len = client_list[offset] as usize;
            let end = offset + 1 + name_len;
            if end > client_list.len() {
                return Err(AlpnError::ALERT_FATAL);
            }
            let name = &client_list[offset + 1..end];
            if name == protocol.identification_sequence() {
                return Ok(name);
            }
            offset = end;
        }
    }
    Err(AlpnError::NOACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::openssl::test_util::{Identity, TempDir};
    use crate::net::{OpensslTlsConfig, OpensslTlsProvider, TlsConfigOptions};
    use std::path::Path;

    fn ca_file_config(
        cert: Option<&Path>,
        key: Option<&Path>,
        options: &TlsConfigOptions,
    ) -> OpensslTlsConfig {
        OpensslTlsConfig::with_ca_certificate_file(
            &OpensslTlsProvider::default(),
            None,
            cert,
            key,
            options,
        )
    }

    fn chain_file_config(chain: &Path, password: Option<&str>) -> OpensslTlsConfig {
        OpensslTlsConfig::with_chain_file(
            &OpensslTlsProvider::default(),
            Some(chain),
            password,
            &TlsConfigOptions::default(),
        )
    }

    #[test]
    fn pem_files() {
        let temp_dir = TempDir::new("kite_server_pem");
        let identity = Identity::generate("localhost");
        let (cert, key) = identity.write_pem_files(temp_dir.path(), "server");

        let options = TlsConfigOptions::default();
        let config = ca_file_config(Some(cert.as_path()), Some(key.as_path()), &options);
        let server = config.config().build_server().unwrap();
        assert_eq!(server.accept_timeout, Duration::from_secs(10));
        assert!(server.ssl_context.certificate().is_some());
    }

    #[test]
    fn key_from_certificate_file() {
        let temp_dir = TempDir::new("kite_server_combined");
        let identity = Identity::generate("localhost");
        let pem = identity.write_combined_pem_file(temp_dir.path(), "server", None);

        let config = ca_file_config(Some(pem.as_path()), None, &TlsConfigOptions::default());
        assert!(config.config().build_server().is_ok());
    }

    #[test]
    fn deferred_failure() {
        let temp_dir = TempDir::new("kite_server_missing");
        let cert = temp_dir.path().join("missing.crt");

        // construction never touches the file system
        let config = ca_file_config(Some(cert.as_path()), None, &TlsConfigOptions::default());
        assert!(config.config().build_server().is_err());
    }

    #[test]
    fn missing_certificate() {
        let config = ca_file_config(None, None, &TlsConfigOptions::default());
        assert!(config.config().build_server().is_err());

        let temp_dir = TempDir::new("kite_server_key_only");
        let identity = Identity::generate("localhost");
        let (_, key) = identity.write_pem_files(temp_dir.path(), "server");
        let config = ca_file_config(None, Some(key.as_path()), &TlsConfigOptions::default());
        assert!(config.config().build_server().is_err());
    }

    #[test]
    fn key_mismatch() {
        let temp_dir = TempDir::new("kite_server_mismatch");
        let (cert, _) = Identity::generate("localhost").write_pem_files(temp_dir.path(), "a");
        let (_, key) = Identity::generate("localhost").write_pem_files(temp_dir.path(), "b");

        let options = TlsConfigOptions::default();
        let config = ca_file_config(Some(cert.as_path()), Some(key.as_path()), &options);
        assert!(config.config().build_server().is_err());
    }

    #[test]
    fn cipher_suite() {
        let temp_dir = TempDir::new("kite_server_cipher");
        let identity = Identity::generate("localhost");
        let (cert, key) = identity.write_pem_files(temp_dir.path(), "server");

        let mut options = TlsConfigOptions::default();
        options.set_cipher_suite("ECDHE-ECDSA-AES128-GCM-SHA256".to_string());
        let config = ca_file_config(Some(cert.as_path()), Some(key.as_path()), &options);
        assert!(config.config().build_server().is_ok());

        let mut options = TlsConfigOptions::default();
        options.set_cipher_suite("NO-SUCH-CIPHER".to_string());
        let config = ca_file_config(Some(cert.as_path()), Some(key.as_path()), &options);
        assert!(config.config().build_server().is_err());
    }

    #[test]
    fn ca_file() {
        let temp_dir = TempDir::new("kite_server_ca_file");
        let identity = Identity::generate("localhost");
        let (cert, key) = identity.write_pem_files(temp_dir.path(), "server");
        let (ca, _) = Identity::generate("ca").write_pem_files(temp_dir.path(), "ca");

        let mut options = TlsConfigOptions::default();
        options.set_self_signed(false);
        let config = OpensslTlsConfig::with_ca_certificate_file(
            &OpensslTlsProvider::default(),
            Some(ca.as_path()),
            Some(cert.as_path()),
            Some(key.as_path()),
            &options,
        );
        assert!(config.config().build_server().is_ok());

        let config = OpensslTlsConfig::with_ca_certificate_file(
            &OpensslTlsProvider::default(),
            Some(temp_dir.path().join("no-ca.pem").as_path()),
            Some(cert.as_path()),
            Some(key.as_path()),
            &options,
        );
        assert!(config.config().build_server().is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn ca_dir() {
        let temp_dir = TempDir::new("kite_server_ca_dir");
        let identity = Identity::generate("localhost");
        let (cert, key) = identity.write_pem_files(temp_dir.path(), "server");
        let ca_dir = temp_dir.path().join("certs");
        std::fs::create_dir_all(&ca_dir).unwrap();

        let config = OpensslTlsConfig::with_ca_certificate_directory(
            &OpensslTlsProvider::default(),
            Some(ca_dir.as_path()),
            Some(cert.as_path()),
            Some(key.as_path()),
            &TlsConfigOptions::default(),
        );
        assert!(config.config().build_server().is_ok());
    }

    #[test]
    fn chain_file() {
        let temp_dir = TempDir::new("kite_server_chain");
        let identity = Identity::generate("localhost");
        let ca = Identity::generate("ca");
        let chain = identity.write_pkcs12_file(temp_dir.path(), "server", "secret", Some(&ca.cert));

        let config = chain_file_config(&chain, Some("secret"));
        assert!(config.config().build_server().is_ok());

        let config = chain_file_config(&chain, Some("wrong"));
        assert!(config.config().build_server().is_err());

        let config = OpensslTlsConfig::with_chain_file(
            &OpensslTlsProvider::default(),
            None,
            None,
            &TlsConfigOptions::default(),
        );
        assert!(config.config().build_server().is_err());
    }

    #[test]
    fn chain_file_without_password() {
        let temp_dir = TempDir::new("kite_server_chain_nopass");
        let identity = Identity::generate("localhost");
        let chain = identity.write_pkcs12_file(temp_dir.path(), "server", "", None);

        let config = chain_file_config(&chain, None);
        assert!(config.config().build_server().is_ok());
    }

    #[test]
    fn pem_chain_file() {
        let temp_dir = TempDir::new("kite_server_pem_chain");
        let identity = Identity::generate("localhost");
        let ca = Identity::generate("ca");
        let chain = identity.write_combined_pem_file(temp_dir.path(), "server", Some(&ca.cert));

        let config = chain_file_config(&chain, None);
        let server = config.config().build_server().unwrap();
        assert!(server.ssl_context.certificate().is_some());
    }

    #[test]
    fn encrypted_pem_chain_file() {
        let temp_dir = TempDir::new("kite_server_pem_chain_encrypted");
        let identity = Identity::generate("localhost");
        let chain = identity.write_encrypted_pem_file(temp_dir.path(), "server", "secret");

        let config = chain_file_config(&chain, Some("secret"));
        assert!(config.config().build_server().is_ok());

        let config = chain_file_config(&chain, Some("wrong"));
        assert!(config.config().build_server().is_err());
    }

    #[test]
    fn chain_file_too_large() {
        let temp_dir = TempDir::new("kite_server_chain_large");
        let chain = temp_dir.path().join("large.p12");
        let file = std::fs::File::create(&chain).unwrap();
        file.set_len(4_000_001).unwrap();

        let config = chain_file_config(&chain, None);
        let Err(e) = config.config().build_server() else {
            panic!("oversized chain file should be rejected");
        };
        assert!(format!("{e:#}").contains("too large"));
    }

    #[test]
    fn alpn() {
        let temp_dir = TempDir::new("kite_server_alpn");
        let identity = Identity::generate("localhost");
        let (cert, key) = identity.write_pem_files(temp_dir.path(), "server");

        let options = TlsConfigOptions::default();
        let config = ca_file_config(Some(cert.as_path()), Some(key.as_path()), &options);
        assert!(
            config
                .config()
                .build_server_with_alpn_protocols(&[AlpnProtocol::Http2, AlpnProtocol::Http11])
                .is_ok()
        );
    }

    #[test]
    fn alpn_server_preference() {
        let server = [AlpnProtocol::Http2, AlpnProtocol::Http11];

        let client =
            AlpnProtocol::wired_list_sequence(&[AlpnProtocol::Http11, AlpnProtocol::Http2]);
        let selected = select_alpn_protocol(&server, &client).unwrap();
        assert_eq!(selected, b"h2");

        let client =
            AlpnProtocol::wired_list_sequence(&[AlpnProtocol::Http10, AlpnProtocol::Http11]);
        let selected = select_alpn_protocol(&server, &client).unwrap();
        assert_eq!(selected, b"http/1.1");
        // the selected name must be a slice of the client list
        assert_eq!(selected.as_ptr(), client[10..].as_ptr());
    }

    #[test]
    fn alpn_no_match() {
        let server = [AlpnProtocol::Http2];

        let client = AlpnProtocol::wired_list_sequence(&[AlpnProtocol::Http11]);
        assert!(select_alpn_protocol(&server, &client).is_err());
        assert!(select_alpn_protocol(&server, &[]).is_err());

        // truncated length prefix
        assert!(select_alpn_protocol(&server, b"\x08http").is_err());
    }
}
