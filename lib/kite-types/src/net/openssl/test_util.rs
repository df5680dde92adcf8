/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::symm::Cipher;
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509, X509Builder, X509NameBuilder};

static TEST_DIR_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub(crate) fn new(prefix: &str) -> Self {
        let id = TEST_DIR_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), id));
        fs::create_dir_all(&path).expect("Failed to create test directory");
        TempDir { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

pub(crate) struct Identity {
    pub(crate) cert: X509,
    pub(crate) key: PKey<Private>,
}

impl Identity {
    pub(crate) fn generate(host: &str) -> Self {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", host).unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(30).unwrap())
            .unwrap();
        let san = SubjectAlternativeName::new()
            .dns(host)
            .build(&builder.x509v3_context(None, None))
            .unwrap();
        builder.append_extension(san).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        Identity {
            cert: builder.build(),
            key,
        }
    }

    pub(crate) fn cert_pem(&self) -> Vec<u8> {
        self.cert.to_pem().unwrap()
    }

    pub(crate) fn key_pem(&self) -> Vec<u8> {
        self.key.private_key_to_pem_pkcs8().unwrap()
    }

    /// Write the certificate and the key to separate PEM files.
    pub(crate) fn write_pem_files(&self, dir: &Path, name: &str) -> (PathBuf, PathBuf) {
        let cert_path = dir.join(format!("{name}.crt"));
        let key_path = dir.join(format!("{name}.key"));
        fs::write(&cert_path, self.cert_pem()).unwrap();
        fs::write(&key_path, self.key_pem()).unwrap();
        (cert_path, key_path)
    }

    /// Write the certificate, the optional CA certificate and then the key
    /// into one PEM file.
    pub(crate) fn write_combined_pem_file(
        &self,
        dir: &Path,
        name: &str,
        extra_chain: Option<&X509>,
    ) -> PathBuf {
        let path = dir.join(format!("{name}.pem"));
        let mut contents = self.cert_pem();
        if let Some(ca) = extra_chain {
            contents.extend(ca.to_pem().unwrap());
        }
        contents.extend(self.key_pem());
        fs::write(&path, contents).unwrap();
        path
    }

    pub(crate) fn write_encrypted_pem_file(
        &self,
        dir: &Path,
        name: &str,
        password: &str,
    ) -> PathBuf {
        let path = dir.join(format!("{name}.pem"));
        let mut contents = self.cert_pem();
        let key = self
            .key
            .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), password.as_bytes())
            .unwrap();
        contents.extend(key);
        fs::write(&path, contents).unwrap();
        path
    }

    pub(crate) fn write_pkcs12_file(
        &self,
        dir: &Path,
        name: &str,
        password: &str,
        extra_chain: Option<&X509>,
    ) -> PathBuf {
        let mut builder = Pkcs12::builder();
        builder.name(name).pkey(&self.key).cert(&self.cert);
        if let Some(ca) = extra_chain {
            let mut stack = Stack::new().unwrap();
            stack.push(ca.clone()).unwrap();
            builder.ca(stack);
        }
        let der = builder.build2(password).unwrap().to_der().unwrap();

        let path = dir.join(format!("{name}.p12"));
        fs::write(&path, der).unwrap();
        path
    }
}
