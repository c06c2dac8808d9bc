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

//! Repository-wide overrides for modules and APIs.
//!
//! Most modules and APIs follow the naming conventions and need no entry in
//! this file. The overrides are read from `repo-config.yaml` in the generator
//! input directory.

use crate::{Error, MODULE_ROOT, Result};
use serde::Deserialize;
use std::path::Path;

/// The name of the repository configuration file.
pub const REPO_CONFIG_FILE: &str = "repo-config.yaml";

/// The overrides for all the modules in the repository.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub modules: Vec<ModuleConfig>,
}

/// The overrides for a single module.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// The module name, which is also its top-level directory.
    pub name: String,

    /// The major version of the module, e.g. `v2`. Empty for `v1`.
    pub module_path_version: String,

    /// The APIs with overrides.
    pub apis: Vec<ApiConfig>,

    /// Files or directories deleted from the output after generation.
    pub delete_generation_output_paths: Vec<String>,
}

/// The overrides for a single API.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// The path within googleapis, e.g. `google/cloud/functions/v2`.
    pub path: String,

    /// The proto package, if it does not match `path`.
    pub proto_package: String,

    /// The directory of the client, relative to the module root.
    pub client_directory: String,

    /// If true, only the proto messages and gRPC stubs are generated.
    pub disable_gapic: bool,

    /// Protos in subdirectories of `path` to include in the generation.
    pub nested_protos: Vec<String>,

    #[serde(skip)]
    module_name: String,
}

impl RepoConfig {
    /// Loads the configuration from `dir`. A missing file is the same as an
    /// empty configuration.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(REPO_CONFIG_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} not found, using the defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io(&path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| Error::parsing(&path, e))
    }

    /// Returns the configuration for the module `name`, or the defaults if
    /// there are no overrides for it.
    pub fn module(&self, name: &str) -> ModuleConfig {
        self.modules
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .unwrap_or_else(|| ModuleConfig {
                name: name.to_string(),
                ..ModuleConfig::default()
            })
    }
}

impl ModuleConfig {
    /// The Go module path, e.g. `cloud.google.com/go/spanner/v2`.
    pub fn module_path(&self) -> String {
        match self.module_path_version.as_str() {
            "" => format!("{MODULE_ROOT}/{}", self.name),
            v => format!("{MODULE_ROOT}/{}/{v}", self.name),
        }
    }

    /// Returns the configuration for the API at `path`, or the defaults if
    /// there are no overrides for it.
    pub fn api(&self, path: &str) -> ApiConfig {
        let mut api = self
            .apis
            .iter()
            .find(|a| a.path == path)
            .cloned()
            .unwrap_or_else(|| ApiConfig {
                path: path.to_string(),
                ..ApiConfig::default()
            });
        api.module_name = self.name.clone();
        api
    }
}

impl ApiConfig {
    /// The proto package, e.g. `google.spanner.v1`.
    pub fn proto_package(&self) -> String {
        if !self.proto_package.is_empty() {
            return self.proto_package.clone();
        }
        self.path.replace('/', ".")
    }

    /// The directory of the client relative to the module root.
    ///
    /// Without an override this is the API path after the module name, with
    /// `api` prepended to the last segment. For example, the client of
    /// `google/spanner/admin/instance/v1` in the `spanner` module is in
    /// `admin/instance/apiv1`.
    pub fn client_directory(&self) -> Result<String> {
        if !self.client_directory.is_empty() {
            return Ok(self.client_directory.clone());
        }
        let parts: Vec<&str> = self.path.split('/').collect();
        let index = parts
            .iter()
            .position(|p| *p == self.module_name)
            .ok_or_else(|| {
                Error::config(format!(
                    "module name `{}` not found in API path `{}`",
                    self.module_name, self.path
                ))
            })?;
        let mut parts: Vec<String> = parts[index + 1..].iter().map(|p| p.to_string()).collect();
        let Some(last) = parts.last_mut() else {
            return Err(Error::config(format!(
                "API path `{}` has no version after the module name",
                self.path
            )));
        };
        *last = format!("api{last}");
        Ok(parts.join("/"))
    }

    /// The module containing this API.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn load() -> TestResult {
        let tmp = tempfile::tempdir()?;
        std::fs::write(
            tmp.path().join(REPO_CONFIG_FILE),
            r#"
modules:
  - name: bigquery
    module_path_version: v2
    delete_generation_output_paths:
      - internal/generated/snippets/bigquery/v2/apiv2_client
    apis:
      - path: google/cloud/bigquery/v2
        client_directory: v2/apiv2
        disable_gapic: true
        nested_protos:
          - nested/extra.proto
  - name: spanner
"#,
        )?;
        let got = RepoConfig::load(tmp.path())?;
        let want = RepoConfig {
            modules: vec![
                ModuleConfig {
                    name: "bigquery".into(),
                    module_path_version: "v2".into(),
                    delete_generation_output_paths: vec![
                        "internal/generated/snippets/bigquery/v2/apiv2_client".into(),
                    ],
                    apis: vec![ApiConfig {
                        path: "google/cloud/bigquery/v2".into(),
                        client_directory: "v2/apiv2".into(),
                        disable_gapic: true,
                        nested_protos: vec!["nested/extra.proto".into()],
                        ..ApiConfig::default()
                    }],
                },
                ModuleConfig {
                    name: "spanner".into(),
                    ..ModuleConfig::default()
                },
            ],
        };
        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn load_not_found() -> TestResult {
        let tmp = tempfile::tempdir()?;
        assert_eq!(RepoConfig::load(tmp.path())?, RepoConfig::default());
        Ok(())
    }

    #[test]
    fn load_empty() -> TestResult {
        let tmp = tempfile::tempdir()?;
        std::fs::write(tmp.path().join(REPO_CONFIG_FILE), "\n")?;
        assert_eq!(RepoConfig::load(tmp.path())?, RepoConfig::default());
        Ok(())
    }

    #[test]
    fn load_malformed() -> TestResult {
        let tmp = tempfile::tempdir()?;
        std::fs::write(tmp.path().join(REPO_CONFIG_FILE), "modules: [name: \n")?;
        let err = RepoConfig::load(tmp.path()).unwrap_err();
        assert!(err.is_parsing(), "{err:?}");
        assert!(err.to_string().contains(REPO_CONFIG_FILE), "{err}");
        Ok(())
    }

    #[test]
    fn module_defaults() {
        let config = RepoConfig::default();
        let got = config.module("asset");
        assert_eq!(got.name, "asset");
        assert_eq!(got.module_path(), "cloud.google.com/go/asset");
        let api = got.api("google/cloud/asset/v1");
        assert_eq!(api.path, "google/cloud/asset/v1");
        assert_eq!(api.module_name(), "asset");
        assert!(!api.disable_gapic);
    }

    #[test]
    fn module_path_version() {
        let config = ModuleConfig {
            name: "spanner".into(),
            module_path_version: "v2".into(),
            ..ModuleConfig::default()
        };
        assert_eq!(config.module_path(), "cloud.google.com/go/spanner/v2");
    }

    #[test_case("", "google.spanner.v1")]
    #[test_case("override.package", "override.package")]
    fn proto_package(value: &str, want: &str) {
        let config = ModuleConfig {
            name: "spanner".into(),
            apis: vec![ApiConfig {
                path: "google/spanner/v1".into(),
                proto_package: value.into(),
                ..ApiConfig::default()
            }],
            ..ModuleConfig::default()
        };
        assert_eq!(config.api("google/spanner/v1").proto_package(), want);
    }

    #[test_case("spanner", "google/spanner/v1", "", "apiv1")]
    #[test_case("spanner", "google/spanner/admin/instance/v1", "", "admin/instance/apiv1")]
    #[test_case("spanner", "google/spanner/v1", "override/directory", "override/directory")]
    #[test_case("saasplatform", "google/cloud/saasplatform/saasservicemgmt/v1beta1", "", "saasservicemgmt/apiv1beta1")]
    fn client_directory(module: &str, path: &str, value: &str, want: &str) -> TestResult {
        let config = ModuleConfig {
            name: module.into(),
            apis: vec![ApiConfig {
                path: path.into(),
                client_directory: value.into(),
                ..ApiConfig::default()
            }],
            ..ModuleConfig::default()
        };
        assert_eq!(config.api(path).client_directory()?, want);
        Ok(())
    }

    #[test_case("google/cloud/asset/v1"; "module not in path")]
    #[test_case("google/spanner"; "no version")]
    fn client_directory_error(path: &str) {
        let config = ModuleConfig {
            name: "spanner".into(),
            ..ModuleConfig::default()
        };
        let err = config.api(path).client_directory().unwrap_err();
        assert!(err.is_config(), "{err:?}");
    }
}
