// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Selects the protos to compile and builds the `protoc` command line.

use crate::bazel;
use crate::request::{Api, Library};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The required prefix of each `remove_regex` entry.
pub const REMOVE_REGEX_PREFIX: &str = "^googleapis/";

/// The required suffix of each `remove_regex` entry.
pub const REMOVE_REGEX_SUFFIX: &str = r"/[^/]*\.go$";

/// The import path prefix of all the generated proto packages.
pub const PACKAGE_ROOT: &str = "google.golang.org/genproto/googleapis/";

// This proto is too large to compile with the rest of the compute API. It is
// never included, even if its package matches.
const SKIPPED_PROTO_SUFFIX: &str = "compute_small.proto";

lazy_static::lazy_static! {
    static ref GO_PACKAGE: regex::Regex = regex::Regex::new(r#"(?m)^option go_package = "([^"]*)";"#)
        .expect("go_package pattern is valid");
}

/// Returns the Go packages matched by the `remove_regex` entries in `library`.
///
/// Each entry must have the form `^googleapis/<path>/[^/]*\.go$`, which maps
/// to the `google.golang.org/genproto/googleapis/<path>` package.
pub fn derive_packages(library: &Library) -> Result<BTreeSet<String>> {
    library
        .remove_regex
        .iter()
        .map(|entry| {
            entry
                .strip_prefix(REMOVE_REGEX_PREFIX)
                .and_then(|s| s.strip_suffix(REMOVE_REGEX_SUFFIX))
                .map(|path| format!("{PACKAGE_ROOT}{path}"))
                .ok_or_else(|| {
                    Error::config(format!(
                        "remove_regex entry `{entry}` must start with `{REMOVE_REGEX_PREFIX}` and end with `{REMOVE_REGEX_SUFFIX}`"
                    ))
                })
        })
        .collect()
}

/// Returns the protos in the directories of `apis` that declare one of
/// `packages` as their `go_package`.
///
/// Only the files directly in each API directory are considered. The result
/// follows the order of `apis`.
pub fn protos_for_packages(
    source_dir: &Path,
    apis: &[Api],
    packages: &BTreeSet<String>,
) -> Result<Vec<PathBuf>> {
    let mut protos = Vec::new();
    for api in apis {
        protos.extend(protos_in_api(&source_dir.join(&api.path), Some(packages))?);
    }
    Ok(protos)
}

/// Returns the protos directly in `api_dir`.
///
/// If `packages` is set, only the protos declaring one of those packages are
/// included.
pub fn protos_in_api(
    api_dir: &Path,
    packages: Option<&BTreeSet<String>>,
) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(api_dir).map_err(|e| Error::io(api_dir, e))?;
    let mut protos = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(api_dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".proto") || name.ends_with(SKIPPED_PROTO_SUFFIX) || !path.is_file() {
            continue;
        }
        let Some(packages) = packages else {
            protos.push(path);
            continue;
        };
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        match go_package(&content) {
            Some(pkg) if packages.contains(pkg) => protos.push(path),
            _ => {}
        }
    }
    Ok(protos)
}

/// Extracts the `go_package` option of a proto file, without any `;alias`.
pub fn go_package(content: &str) -> Option<&str> {
    let caps = GO_PACKAGE.captures(content)?;
    let value = caps.get(1)?.as_str();
    Some(value.split_once(';').map(|(pkg, _)| pkg).unwrap_or(value))
}

/// Builds the `protoc` command to generate the code for one API.
///
/// `api_dir` is the API directory within `source_dir`. The service config
/// files named by `config` are resolved relative to `api_dir`.
pub fn build(
    config: &bazel::Config,
    api_dir: &Path,
    protos: &[PathBuf],
    source_dir: &Path,
    output_dir: &Path,
) -> Vec<String> {
    let out = output_dir.display();
    let mut args = vec![
        "protoc".to_string(),
        "--experimental_allow_proto3_optional".to_string(),
    ];
    if config.has_go_grpc() {
        args.push(format!("--go_out={out}"));
        args.push(format!("--go-grpc_out={out}"));
        args.push("--go-grpc_opt=require_unimplemented_servers=false".to_string());
    } else {
        args.push(format!("--go_v1_out={out}"));
        if config.has_legacy_grpc() {
            args.push("--go_v1_opt=plugins=grpc".to_string());
        }
    }

    if config.has_gapic() {
        args.push(format!("--go_gapic_out={out}"));
        let mut opt = |value: String| args.push(format!("--go_gapic_opt={value}"));
        opt(format!("go-gapic-package={}", config.gapic_import_path()));
        opt(format!(
            "api-service-config={}",
            api_dir.join(config.service_yaml()).display()
        ));
        if !config.grpc_service_config().is_empty() {
            opt(format!(
                "grpc-service-config={}",
                api_dir.join(config.grpc_service_config()).display()
            ));
        }
        if !config.transport().is_empty() {
            opt(format!("transport={}", config.transport()));
        }
        if !config.release_level().is_empty() {
            opt(format!("release-level={}", config.release_level()));
        }
        if config.has_metadata() {
            opt("metadata".to_string());
        }
        if config.has_diregapic() {
            opt("diregapic".to_string());
        }
        if config.has_rest_numeric_enums() {
            opt("rest-numeric-enums".to_string());
        }
    }

    args.push(format!("-I={}", source_dir.display()));
    args.extend(protos.iter().map(|p| p.display().to_string()));
    args
}
