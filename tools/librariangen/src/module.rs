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

//! Maintains the version information in a Go module.
//!
//! Each module carries its version in three places: the `internal/version.go`
//! file, the `version.go` file of each client, and the snippet metadata
//! files generated alongside the clients.

use crate::{Error, Result};
use chrono::Datelike;
use std::path::{Path, PathBuf};

/// The placeholder for the version in newly generated snippet metadata.
pub const VERSION_PLACEHOLDER: &str = "$VERSION";

/// The directory of the snippets, relative to the output directory.
pub const SNIPPETS_DIR: &str = "internal/generated/snippets";

lazy_static::lazy_static! {
    static ref SEMVER: regex::Regex = regex::Regex::new(r"\d+\.\d+\.\d+")
        .expect("semver pattern is valid");
}

/// Replaces the version in the contents of a snippet metadata file.
///
/// The first [VERSION_PLACEHOLDER] is replaced if present, otherwise the first
/// `x.y.z` substring. At most one substitution is made. Returns `None` if the
/// contents have neither.
pub fn update_snippet_content(content: &str, version: &str) -> Option<String> {
    if content.contains(VERSION_PLACEHOLDER) {
        return Some(content.replacen(VERSION_PLACEHOLDER, version, 1));
    }
    let found = SEMVER.find(content)?;
    let mut updated = String::with_capacity(content.len() + version.len());
    updated.push_str(&content[..found.start()]);
    updated.push_str(version);
    updated.push_str(&content[found.end()..]);
    Some(updated)
}

/// Returns true if `name` is a snippet metadata file name.
pub fn is_snippet_metadata(name: &str) -> bool {
    name.starts_with("snippet_metadata.") && name.ends_with(".json")
}

/// Updates the version in all the snippet metadata files of a module.
///
/// Walks `<output_dir>/internal/generated/snippets/<module_name>`. Files
/// without a placeholder or version are left untouched, as is a module
/// without snippets.
pub fn update_snippets_metadata(output_dir: &Path, module_name: &str, version: &str) -> Result<()> {
    let root = output_dir.join(SNIPPETS_DIR).join(module_name);
    if !root.is_dir() {
        tracing::debug!("no snippets in {}", root.display());
        return Ok(());
    }
    for entry in walkdir::WalkDir::new(&root) {
        let entry = entry.map_err(|e| Error::io(&root, e.into()))?;
        if !entry.file_type().is_file() || !is_snippet_metadata(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let path = entry.path();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        match update_snippet_content(&content, version) {
            Some(updated) => {
                tracing::debug!("updating {} to version {version}", path.display());
                std::fs::write(path, updated).map_err(|e| Error::io(path, e))?;
            }
            None => tracing::debug!("no version found in {}", path.display()),
        }
    }
    Ok(())
}

/// Creates or overwrites `<module_dir>/internal/version.go`.
pub fn generate_internal_version_file(module_dir: &Path, version: &str) -> Result<PathBuf> {
    let dir = module_dir.join("internal");
    std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    let path = dir.join("version.go");
    let year = chrono::Utc::now().year();
    let content = format!(
        r#"{header}
// Code generated by gapicgen. DO NOT EDIT.

package internal

// Version is the current tagged release of the library.
const Version = "{version}"
"#,
        header = license_header(year)
    );
    std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}

/// Creates or overwrites the `version.go` file of a client.
///
/// `client_dir` is the directory of the client within the module. The file
/// wires the client version to the module version.
pub fn generate_client_version_file(
    client_dir: &Path,
    module_path: &str,
) -> Result<PathBuf> {
    let package = client_package(client_dir)?;
    std::fs::create_dir_all(client_dir).map_err(|e| Error::io(client_dir, e))?;
    let path = client_dir.join("version.go");
    let year = chrono::Utc::now().year();
    let content = format!(
        r#"{header}
// Code generated by gapicgen. DO NOT EDIT.

package {package}

import "{module_path}/internal"

func init() {{
	versionClient = internal.Version
}}
"#,
        header = license_header(year)
    );
    std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}

// The GAPIC generator names the package after the parent of the `apiv*`
// directory, e.g. `secretmanager/apiv1` is in package `secretmanager`.
fn client_package(client_dir: &Path) -> Result<String> {
    client_dir
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::config(format!(
                "cannot determine the Go package of {}",
                client_dir.display()
            ))
        })
}

fn license_header(year: i32) -> String {
    format!(
        r#"// Copyright {year} Google LLC
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
// limitations under the License."#
    )
}
