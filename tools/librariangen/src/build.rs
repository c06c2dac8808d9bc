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

//! Implements the `build` command.

use crate::execv::ToolRunner;
use crate::postprocessor::args;
use crate::{Result, request, require_dir};
use std::path::PathBuf;

/// The name of the request file in the librarian directory.
pub const REQUEST_FILE: &str = "build-request.json";

/// The directories used by the `build` command.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Contains the `build-request.json` file.
    pub librarian_dir: PathBuf,
    /// The root of the repository, each module is a top-level directory.
    pub repo_dir: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        require_dir("librarian", &self.librarian_dir)?;
        require_dir("repo", &self.repo_dir)?;
        Ok(())
    }
}

/// Compiles and tests the module named in `<librarian_dir>/build-request.json`.
///
/// Runs `go build ./...` and then `go test ./... -short` in `<repo_dir>/<id>`.
/// The tests do not run if the build fails.
pub async fn build(config: &Config, runner: &dyn ToolRunner) -> Result<()> {
    config.validate()?;
    let path = config.librarian_dir.join(REQUEST_FILE);
    let library = request::parse_library(&path)?;
    let module_dir = config.repo_dir.join(&library.id);
    tracing::info!("building module {} in {}", library.id, module_dir.display());

    runner
        .run(&args(&["go", "build", "./..."]), &module_dir)
        .await
        .map_err(|e| e.context("go build failed"))?;
    runner
        .run(&args(&["go", "test", "./...", "-short"]), &module_dir)
        .await
        .map_err(|e| e.context("go test failed"))?;
    tracing::info!("module {} built and tested", library.id);
    Ok(())
}
