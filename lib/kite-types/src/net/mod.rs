/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod http;
mod tls;

#[cfg(feature = "openssl")]
mod openssl;

pub use self::http::*;
pub use tls::*;

#[cfg(feature = "openssl")]
pub use self::openssl::*;
