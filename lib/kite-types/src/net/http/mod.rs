/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod version;
pub use version::{HttpVersion, HttpVersionParseError};

#[cfg(feature = "http")]
pub use version::HttpVersionConvertError;
