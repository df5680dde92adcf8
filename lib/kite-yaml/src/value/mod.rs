/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod fs;
mod http;
mod primary;
mod tls;

pub use fs::as_config_path;
pub use http::as_http_version;
pub use primary::{as_bool, as_string, as_u16};
pub use tls::{as_cipher_suite, as_tls_config};
