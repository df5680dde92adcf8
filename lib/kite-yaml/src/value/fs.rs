/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use yaml_rust::Yaml;

/// Get a path value, relative paths are resolved against `lookup_dir`.
///
/// The path is not required to exist.
pub fn as_config_path(v: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let Yaml::String(s) = v else {
        return Err(anyhow!("yaml value type for path should be string"));
    };
    if s.is_empty() {
        return Err(anyhow!("empty path"));
    }

    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    match lookup_dir {
        Some(dir) => Ok(dir.join(path)),
        None => Err(anyhow!(
            "invalid value: {} is not an absolute path",
            path.display()
        )),
    }
}
