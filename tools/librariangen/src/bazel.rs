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

//! Extracts the Go generation configuration from a `BUILD.bazel` file.
//!
//! This is not a Starlark parser. The file is scanned for the first
//! `go_gapic_library(...)` and `go_proto_library(...)` rules, and the
//! attributes of interest are read from those blocks.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// The name of the file parsed by [Config::parse].
pub const BUILD_FILE: &str = "BUILD.bazel";

const LEGACY_GRPC_COMPILER: &str = "@io_bazel_rules_go//proto:go_grpc";

lazy_static::lazy_static! {
    static ref GAPIC_RULE: regex::Regex = regex::Regex::new(r"go_gapic_library\((?s:.)*?\)")
        .expect("go_gapic_library pattern is valid");
    static ref PROTO_RULE: regex::Regex = regex::Regex::new(r"go_proto_library\((?s:.)*?\)")
        .expect("go_proto_library pattern is valid");
    static ref ATTRIBUTE: regex::Regex = regex::Regex::new(r#"(\w+)\s*=\s*(?:"([^"]*)"|(\w+))"#)
        .expect("attribute pattern is valid");
}

/// The configuration of a single API, as declared in its `BUILD.bazel` file.
///
/// The string attributes come from the `go_gapic_library` rule. Not every
/// attribute is present in every file, missing attributes are empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    grpc_service_config: String,
    gapic_import_path: String,
    metadata: bool,
    release_level: String,
    rest_numeric_enums: bool,
    service_yaml: String,
    transport: String,
    diregapic: bool,

    has_go_grpc: bool,
    has_gapic: bool,
    has_legacy_grpc: bool,
}

impl Config {
    /// Parses the `BUILD.bazel` file in `dir`.
    ///
    /// Fails if the file cannot be read, or if it declares both a
    /// `go_grpc_library` and a `go_proto_library` rule. Malformed booleans
    /// are logged and treated as `false`.
    ///
    /// The result is not validated, see [Config::validate].
    pub fn parse(dir: &Path) -> Result<Self> {
        let path = dir.join(BUILD_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let config = Self::parse_str(&content).map_err(|e| e.context(path.display().to_string()))?;
        tracing::debug!("bazel config loaded from {}: {config:?}", path.display());
        Ok(config)
    }

    fn parse_str(content: &str) -> Result<Self> {
        let mut config = Config::default();
        if let Some(block) = GAPIC_RULE.find(content) {
            let attributes = Attributes::new(block.as_str());
            config.has_gapic = true;
            config.grpc_service_config = attributes.string("grpc_service_config");
            config.gapic_import_path = attributes.string("importpath");
            config.release_level = attributes.string("release_level");
            // A target such as `:foo.yaml` refers to the file with the same name.
            config.service_yaml = attributes
                .string("service_yaml")
                .trim_start_matches(':')
                .to_string();
            config.transport = attributes.string("transport");
            config.metadata = attributes.boolean("metadata");
            config.rest_numeric_enums = attributes.boolean("rest_numeric_enums");
            config.diregapic = attributes.boolean("diregapic");
        }

        config.has_go_grpc = content.contains("go_grpc_library");
        if let Some(block) = PROTO_RULE.find(content) {
            if config.has_go_grpc {
                return Err(Error::config(
                    "only one of the go_grpc_library and go_proto_library rules may be present",
                ));
            }
            config.has_legacy_grpc = block.as_str().contains(LEGACY_GRPC_COMPILER);
        }
        Ok(config)
    }

    /// Verifies the attributes required by the GAPIC generator are present.
    ///
    /// Returns a [missing field][Error::is_missing_field] error for the first
    /// empty attribute.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("importpath", &self.gapic_import_path),
            ("service_yaml", &self.service_yaml),
            ("grpc_service_config", &self.grpc_service_config),
            ("transport", &self.transport),
        ];
        match required.into_iter().find(|(_, v)| v.is_empty()) {
            Some((name, _)) => Err(Error::missing_field_error(name)),
            None => Ok(()),
        }
    }

    /// Disables GAPIC generation, regardless of the rules in the file.
    pub fn disable_gapic(&mut self) {
        self.has_gapic = false;
    }

    /// The `importpath` of the `go_gapic_library` rule.
    ///
    /// Typically the Go package name is appended after a `;`, e.g.
    /// `cloud.google.com/go/asset/apiv1;asset`.
    pub fn gapic_import_path(&self) -> &str {
        &self.gapic_import_path
    }

    /// The Go import path of the GAPIC package, without the package name.
    pub fn module_path(&self) -> &str {
        self.gapic_import_path
            .split_once(';')
            .map(|(path, _)| path)
            .unwrap_or(&self.gapic_import_path)
    }

    /// The service config file name, e.g. `cloudasset_v1.yaml`.
    pub fn service_yaml(&self) -> &str {
        &self.service_yaml
    }

    /// The gRPC service config file name.
    pub fn grpc_service_config(&self) -> &str {
        &self.grpc_service_config
    }

    /// Typically one of `grpc`, `rest` or `grpc+rest`.
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Typically one of `beta`, `ga` or empty (the same as `beta`).
    pub fn release_level(&self) -> &str {
        &self.release_level
    }

    /// If true, a `gapic_metadata.json` file is generated.
    pub fn has_metadata(&self) -> bool {
        self.metadata
    }

    /// If true, the REST client supports numeric enums.
    pub fn has_rest_numeric_enums(&self) -> bool {
        self.rest_numeric_enums
    }

    /// If true, the GAPIC is generated from a Discovery document.
    pub fn has_diregapic(&self) -> bool {
        self.diregapic
    }

    /// If true, the file uses `go_grpc_library` instead of `go_proto_library`.
    pub fn has_go_grpc(&self) -> bool {
        self.has_go_grpc
    }

    /// If true, the GAPIC generator runs for this API.
    pub fn has_gapic(&self) -> bool {
        self.has_gapic
    }

    /// If true, the `go_proto_library` rule uses the legacy gRPC compiler.
    pub fn has_legacy_grpc(&self) -> bool {
        self.has_legacy_grpc
    }
}

#[derive(Debug)]
enum Value<'a> {
    Quoted(&'a str),
    Bare(&'a str),
}

/// The `name = value` attributes in a rule. The first occurrence wins.
struct Attributes<'a>(HashMap<&'a str, Value<'a>>);

impl<'a> Attributes<'a> {
    fn new(block: &'a str) -> Self {
        let mut map = HashMap::new();
        for caps in ATTRIBUTE.captures_iter(block) {
            let value = match (caps.get(2), caps.get(3)) {
                (Some(quoted), _) => Value::Quoted(quoted.as_str()),
                (None, Some(bare)) => Value::Bare(bare.as_str()),
                (None, None) => continue,
            };
            if let Some(name) = caps.get(1) {
                map.entry(name.as_str()).or_insert(value);
            }
        }
        Self(map)
    }

    fn string(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Value::Quoted(v)) => v.to_string(),
            _ => {
                tracing::debug!("string attribute {name} not found in BUILD.bazel");
                String::new()
            }
        }
    }

    fn boolean(&self, name: &str) -> bool {
        let value = match self.0.get(name) {
            None => {
                tracing::debug!("bool attribute {name} not found in BUILD.bazel");
                return false;
            }
            Some(Value::Bare(v)) | Some(Value::Quoted(v)) => *v,
        };
        match value {
            "True" | "true" | "TRUE" | "T" | "t" | "1" => true,
            "False" | "false" | "FALSE" | "F" | "f" | "0" => false,
            _ => {
                tracing::warn!("ignoring malformed bool attribute {name} = {value:?} in BUILD.bazel");
                false
            }
        }
    }
}
