/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use kite_types::net::HttpVersion;

pub fn as_http_version(value: &Yaml) -> anyhow::Result<HttpVersion> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => {
            HttpVersion::from_str(s).map_err(|e| anyhow!("invalid http version {s}: {e}"))
        }
        Yaml::Integer(i) => {
            let major = u16::try_from(*i).map_err(|_| anyhow!("invalid major version {i}"))?;
            Ok(HttpVersion::new(major, 0))
        }
        Yaml::Hash(map) => {
            let mut major = None;
            let mut minor = 0;

            crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
                "major" => {
                    let value = crate::value::as_u16(v)
                        .context(format!("invalid u16 value for key {k}"))?;
                    major = Some(value);
                    Ok(())
                }
                "minor" => {
                    minor = crate::value::as_u16(v)
                        .context(format!("invalid u16 value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;

            let major = major.ok_or_else(|| anyhow!("no major version set"))?;
            Ok(HttpVersion::new(major, minor))
        }
        _ => Err(anyhow!(
            "yaml value type for http version should be 'string', 'real', 'integer' or 'map'"
        )),
    }
}
