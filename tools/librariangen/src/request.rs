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

//! The requests prepared by the Librarian tool.
//!
//! Librarian mounts a directory with a JSON request for each command. The
//! requests are read once at startup and are never written back, except for
//! the `configure` response which is a modified copy of the request.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The status of an API that is being onboarded by `configure`.
pub const NEW_API_STATUS: &str = "new";

/// A library (Go module) to generate, build or configure.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Library {
    /// The library identifier, also the top-level directory of the module.
    pub id: String,

    /// The semantic version of the library. Empty when not known yet.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// The APIs in the library. The order determines the generation order.
    pub apis: Vec<Api>,

    /// Paths, relative to the repository root, owned by this library.
    #[serde(alias = "source_roots", skip_serializing_if = "Vec::is_empty")]
    pub source_paths: Vec<String>,

    /// Patterns of generated files to keep when regenerating.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preserve_regex: Vec<String>,

    /// Patterns of generated files to remove when regenerating.
    ///
    /// Each pattern also identifies a generated Go package, see
    /// [derive_packages][crate::protoc::derive_packages].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_regex: Vec<String>,

    /// The format of release tags, e.g. `{id}/v{version}`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag_format: String,
}

impl Library {
    /// Returns true if every API in the library is new, i.e. the module does
    /// not exist in the repository yet.
    pub fn is_new(&self) -> bool {
        !self.apis.is_empty() && self.apis.iter().all(Api::is_new)
    }
}

/// An API within a [Library].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Api {
    /// The path of the API within googleapis, e.g. `google/cloud/asset/v1`.
    pub path: String,

    /// The service config (service YAML) file name, relative to `path`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_config: String,

    /// Either `new` or `existing`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
}

impl Api {
    pub fn is_new(&self) -> bool {
        self.status == NEW_API_STATUS
    }
}

/// Reads a JSON file containing a single [Library].
///
/// No validation beyond JSON well-formedness happens here, an empty list of
/// APIs is valid.
pub fn parse_library(path: &Path) -> Result<Library> {
    parse_json(path)
}

pub(crate) fn parse_json<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let contents = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_slice(&contents).map_err(|e| Error::parsing(path, e))
}

pub(crate) fn save_json<T>(value: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    let mut contents = serde_json::to_vec_pretty(value).map_err(|e| Error::parsing(path, e))?;
    contents.push(b'\n');
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}
