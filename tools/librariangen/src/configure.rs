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

//! Implements the `configure` command.
//!
//! The command onboards a single new API. It updates the library
//! configuration in the response and creates the hand-written files of the
//! module, which are never regenerated.
//!
//! The only `remove_regex` entry added for the API is
//! `^googleapis/<path>/[^/]*\.go$`, the shape understood by
//! [derive_packages][crate::protoc::derive_packages]. The response can be
//! passed to the `generate` command as is. Entries for the individual client
//! files are not added, `derive_packages` rejects them.

use crate::execv::ToolRunner;
use crate::postprocessor::args;
use crate::repo_config::RepoConfig;
use crate::request::{self, Api, Library};
use crate::{Error, Result, module, protoc, require_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The name of the request file in the librarian directory.
pub const REQUEST_FILE: &str = "configure-request.json";

/// The name of the response file in the librarian directory.
pub const RESPONSE_FILE: &str = "configure-response.json";

/// The version of a library before its first release.
pub const INITIAL_VERSION: &str = "0.0.0";

/// The tag format of the libraries in the repository.
pub const TAG_FORMAT: &str = "{id}/v{version}";

/// The directories used by the `configure` command.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Contains the request and receives the response.
    pub librarian_dir: PathBuf,
    /// Contains the `repo-config.yaml` file.
    pub input_dir: PathBuf,
    /// Receives the new files.
    pub output_dir: PathBuf,
    /// The googleapis checkout.
    pub source_dir: PathBuf,
    /// The root of the repository.
    pub repo_dir: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        require_dir("librarian", &self.librarian_dir)?;
        require_dir("input", &self.input_dir)?;
        require_dir("output", &self.output_dir)?;
        require_dir("source", &self.source_dir)?;
        require_dir("repo", &self.repo_dir)?;
        Ok(())
    }
}

/// The contents of `configure-request.json`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Request {
    pub libraries: Vec<Library>,
}

#[derive(Debug, Deserialize)]
struct ServiceYaml {
    title: String,
}

/// Configures the library with the new API in `configure-request.json`.
pub async fn configure(config: &Config, runner: &dyn ToolRunner) -> Result<()> {
    config.validate()?;
    let path = config.librarian_dir.join(REQUEST_FILE);
    let request: Request = request::parse_json(&path)?;
    let (mut library, api) = find_new_api(request)?;
    tracing::info!("configuring API {} in library {}", api.path, library.id);

    let title = read_title(&config.source_dir, &api)?;
    let repo_config = RepoConfig::load(&config.input_dir)?;
    let module_config = repo_config.module(&library.id);
    let module_dir = config.output_dir.join(&library.id);

    if library.is_new() {
        library.version = INITIAL_VERSION.to_string();
        library.tag_format = TAG_FORMAT.to_string();
        add_unique(&mut library.source_paths, library.id.clone());
        add_unique(
            &mut library.source_paths,
            format!("{}/{}", module::SNIPPETS_DIR, library.id),
        );
        let module_path = module_config.module_path();
        write_file(&module_dir.join("README.md"), &readme(&title, &module_path))?;
        write_file(&module_dir.join("CHANGES.md"), "# Changes\n")?;
        module::generate_internal_version_file(&module_dir, INITIAL_VERSION)?;
        copy_snippets_go_mod(&config.repo_dir, &config.output_dir)?;
        runner
            .run(&args(&["go", "mod", "init", &module_path]), &module_dir)
            .await
            .map_err(|e| e.context("go mod init failed"))?;
    }

    let package_dir = api.path.strip_prefix("google/").unwrap_or(&api.path);
    add_unique(
        &mut library.remove_regex,
        format!(
            "{}{package_dir}{}",
            protoc::REMOVE_REGEX_PREFIX,
            protoc::REMOVE_REGEX_SUFFIX
        ),
    );

    for new_api in library.apis.iter().filter(|a| a.is_new()) {
        let client_dir = module_config.api(&new_api.path).client_directory()?;
        module::generate_client_version_file(
            &module_dir.join(client_dir),
            &module_config.module_path(),
        )?;
    }

    request::save_json(&library, &config.librarian_dir.join(RESPONSE_FILE))?;
    tracing::info!("configured library {}", library.id);
    Ok(())
}

fn find_new_api(request: Request) -> Result<(Library, Api)> {
    let mut candidates = request
        .libraries
        .into_iter()
        .filter(|lib| lib.apis.iter().any(Api::is_new));
    let (Some(library), None) = (candidates.next(), candidates.next()) else {
        return Err(Error::config(
            "the configure request must contain exactly one library with a new API",
        ));
    };
    let mut new_apis = library.apis.iter().filter(|a| a.is_new());
    let (Some(api), None) = (new_apis.next(), new_apis.next()) else {
        return Err(Error::config(format!(
            "library {} must contain exactly one new API",
            library.id
        )));
    };
    let api = api.clone();
    Ok((library, api))
}

fn read_title(source_dir: &Path, api: &Api) -> Result<String> {
    let path = source_dir.join(&api.path).join(&api.service_config);
    let contents = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let yaml: ServiceYaml = serde_yaml::from_str(&contents).map_err(|e| Error::parsing(&path, e))?;
    Ok(yaml.title)
}

fn readme(title: &str, module_path: &str) -> String {
    format!(
        r#"# {title}

[![Go Reference](https://pkg.go.dev/badge/{module_path}.svg)](https://pkg.go.dev/{module_path})

Go Client Library for {title}.

## Install

```bash
go get {module_path}
```

## Stability

The stability of this module is indicated by SemVer.

However, a `v1+` module may have breaking changes in two scenarios:

* Packages with `alpha` or `beta` in the import path
* The GoDoc has an explicit stability disclaimer (for example, for an experimental feature).

## Go Version Support

See the [Go Versions Supported](https://github.com/googleapis/google-cloud-go#go-versions-supported)
section in the root directory's README.

## Authorization

See the [Authorization](https://github.com/googleapis/google-cloud-go#authorization)
section in the root directory's README.

## Contributing

Contributions are welcome. Please, see the
[CONTRIBUTING](https://github.com/GoogleCloudPlatform/google-cloud-go/blob/main/CONTRIBUTING.md)
document for details.
"#
    )
}

// The snippets are a separate module, its go.mod gets a `replace` directive
// for each new module in a later step.
fn copy_snippets_go_mod(repo_dir: &Path, output_dir: &Path) -> Result<()> {
    let from = repo_dir.join(module::SNIPPETS_DIR).join("go.mod");
    if !from.is_file() {
        tracing::debug!("{} not found, skipping", from.display());
        return Ok(());
    }
    let dir = output_dir.join(module::SNIPPETS_DIR);
    std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    let to = dir.join("go.mod");
    std::fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}

fn add_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}
