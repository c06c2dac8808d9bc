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

//! Turns the raw generator output into a versioned module.

use crate::execv::ToolRunner;
use crate::module;
use crate::repo_config::ModuleConfig;
use crate::request::Library;
use crate::{Error, Result};
use std::path::Path;

/// Post-processes the generated code for `library`.
///
/// Updates the snippet metadata under `output_dir`, writes the module's
/// `internal/version.go`, initializes brand-new modules and formats the code
/// in `module_dir`.
///
/// Does nothing if the library has no APIs.
pub async fn post_process(
    runner: &dyn ToolRunner,
    library: &Library,
    output_dir: &Path,
    module_dir: &Path,
    module_config: &ModuleConfig,
) -> Result<()> {
    if library.apis.is_empty() {
        tracing::info!("no APIs in library {}, skipping post-processing", library.id);
        return Ok(());
    }
    if library.version.is_empty() {
        return Err(Error::precondition(format!(
            "no version for library {}",
            library.id
        )));
    }
    tracing::info!("post-processing library {} at version {}", library.id, library.version);

    module::update_snippets_metadata(output_dir, &library.id, &library.version)
        .map_err(|e| e.context("updating snippet metadata"))?;
    module::generate_internal_version_file(module_dir, &library.version)
        .map_err(|e| e.context("generating internal/version.go"))?;

    if library.is_new() {
        let module_path = module_config.module_path();
        tracing::info!("initializing new module {module_path}");
        runner
            .run(&args(&["go", "mod", "init", &module_path]), module_dir)
            .await
            .map_err(|e| e.context("go mod init failed"))?;
        runner
            .run(&args(&["go", "mod", "tidy"]), module_dir)
            .await
            .map_err(|e| e.context("go mod tidy failed"))?;
    }

    runner
        .run(&args(&["goimports", "-w", "."]), module_dir)
        .await
        .map_err(|e| e.context("goimports failed"))?;
    Ok(())
}

pub(crate) fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
