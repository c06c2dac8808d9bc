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

//! Implements the `generate` command.
//!
//! The command runs `protoc` once per API in the request, moves the output
//! from its Go import path layout (`cloud.google.com/go/...`) to the
//! repository layout, and then runs the [post-processor][crate::postprocessor].

use crate::execv::ToolRunner;
use crate::repo_config::{ModuleConfig, RepoConfig};
use crate::request::{self, Library};
use crate::{Error, MODULE_ROOT, Result, bazel, module, postprocessor, protoc, require_dir};
use std::path::{Path, PathBuf};

/// The name of the request file in the librarian directory.
pub const REQUEST_FILE: &str = "generate-request.json";

/// The directories used by the `generate` command.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Contains the `generate-request.json` file.
    pub librarian_dir: PathBuf,
    /// Contains the `repo-config.yaml` file.
    pub input_dir: PathBuf,
    /// Receives the generated module.
    pub output_dir: PathBuf,
    /// The googleapis checkout.
    pub source_dir: PathBuf,
    /// Skip the post-processor, leaving the raw generator output.
    pub disable_post_processor: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        require_dir("librarian", &self.librarian_dir)?;
        require_dir("input", &self.input_dir)?;
        require_dir("output", &self.output_dir)?;
        require_dir("source", &self.source_dir)?;
        Ok(())
    }
}

/// Generates the module described by `<librarian_dir>/generate-request.json`.
pub async fn generate(config: &Config, runner: &dyn ToolRunner) -> Result<()> {
    config.validate()?;
    let path = config.librarian_dir.join(REQUEST_FILE);
    tracing::debug!("reading generate request from {}", path.display());
    let library = request::parse_library(&path)?;
    if library.apis.is_empty() {
        tracing::info!("no APIs to generate in library {}", library.id);
        return Ok(());
    }
    tracing::info!("generating library {}", library.id);

    let repo_config = RepoConfig::load(&config.input_dir)?;
    let module_config = repo_config.module(&library.id);

    invoke_protoc(config, runner, &library, &module_config).await?;
    fix_permissions(&config.output_dir).map_err(|e| e.context("fixing file permissions"))?;
    flatten_output(&config.output_dir).map_err(|e| e.context("flattening the output"))?;
    apply_module_version(
        &config.output_dir,
        &library.id,
        &module_config.module_path(),
    )
    .map_err(|e| e.context("applying the module version"))?;
    delete_output_paths(
        &config.output_dir,
        &module_config.delete_generation_output_paths,
    )?;

    if config.disable_post_processor {
        tracing::info!("post-processor disabled");
        return Ok(());
    }
    let module_dir = config.output_dir.join(&library.id);
    postprocessor::post_process(
        runner,
        &library,
        &config.output_dir,
        &module_dir,
        &module_config,
    )
    .await
    .map_err(|e| e.context("post-processing failed"))?;
    tracing::info!("generated library {}", library.id);
    Ok(())
}

async fn invoke_protoc(
    config: &Config,
    runner: &dyn ToolRunner,
    library: &Library,
    module_config: &ModuleConfig,
) -> Result<()> {
    let packages = if library.remove_regex.is_empty() {
        None
    } else {
        Some(protoc::derive_packages(library)?)
    };
    for api in &library.apis {
        let api_dir = config.source_dir.join(&api.path);
        tracing::info!("processing API {}", api.path);
        let api_config = module_config.api(&api.path);
        let mut bazel_config = bazel::Config::parse(&api_dir)?;
        if api_config.disable_gapic {
            bazel_config.disable_gapic();
        }
        if bazel_config.has_gapic() {
            bazel_config
                .validate()
                .map_err(|e| e.context(format!("invalid BUILD.bazel for {}", api.path)))?;
        }

        let mut protos = match &packages {
            Some(packages) => protoc::protos_for_packages(
                &config.source_dir,
                std::slice::from_ref(api),
                packages,
            )?,
            None => protoc::protos_in_api(&api_dir, None)?,
        };
        protos.extend(api_config.nested_protos.iter().map(|p| api_dir.join(p)));
        if protos.is_empty() {
            tracing::warn!("no protos to generate for API {}, skipping", api.path);
            continue;
        }

        let args = protoc::build(
            &bazel_config,
            &api_dir,
            &protos,
            &config.source_dir,
            &config.output_dir,
        );
        runner.run(&args, &config.output_dir).await.map_err(|e| {
            e.context(format!(
                "protoc failed for API {} in library {}",
                api.path, library.id
            ))
        })?;
    }
    Ok(())
}

/// Sets the mode of all the `.go` files under `dir` to `0644`.
///
/// `protoc` plugins may create files that are not readable by other users.
pub fn fix_permissions(dir: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|e| Error::io(dir, e.into()))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "go") {
            set_mode(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
        .map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> Result<()> {
    Ok(())
}

/// Moves the contents of `<output_dir>/cloud.google.com/go` to `output_dir`.
pub fn flatten_output(output_dir: &Path) -> Result<()> {
    let go_dir = output_dir.join(MODULE_ROOT);
    if !go_dir.is_dir() {
        return Err(Error::precondition(format!(
            "the generated code is not in {}",
            go_dir.display()
        )));
    }
    move_files(&go_dir, output_dir)?;
    let top = output_dir.join("cloud.google.com");
    std::fs::remove_dir_all(&top).map_err(|e| Error::io(&top, e))
}

/// Moves the code of a module with a major version (e.g. `.../spanner/v2`)
/// to the module's top-level directory.
///
/// Nothing changes for modules without a major version, or for libraries
/// whose id already includes the major version.
pub fn apply_module_version(output_dir: &Path, library_id: &str, module_path: &str) -> Result<()> {
    let parts: Vec<&str> = module_path.split('/').collect();
    let (id, version) = match parts.as_slice() {
        [_, _, _] => return Ok(()),
        [_, _, id, version] => (*id, *version),
        _ => {
            return Err(Error::config(format!(
                "unexpected module path format: {module_path}"
            )));
        }
    };
    if library_id == format!("{id}/{version}") {
        return Ok(());
    }

    let src_dir = output_dir.join(id);
    move_up(&src_dir.join(version), &src_dir)?;
    let snippets_dir = output_dir.join(module::SNIPPETS_DIR).join(id);
    let snippets_version_dir = snippets_dir.join(version);
    if snippets_version_dir.is_dir() {
        move_up(&snippets_version_dir, &snippets_dir)?;
    }
    Ok(())
}

fn move_up(from: &Path, to: &Path) -> Result<()> {
    move_files(from, to)?;
    std::fs::remove_dir_all(from).map_err(|e| Error::io(from, e))
}

fn move_files(source_dir: &Path, target_dir: &Path) -> Result<()> {
    let entries = std::fs::read_dir(source_dir).map_err(|e| Error::io(source_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(source_dir, e))?;
        let from = entry.path();
        let to = target_dir.join(entry.file_name());
        tracing::debug!("moving {} to {}", from.display(), to.display());
        std::fs::rename(&from, &to).map_err(|e| Error::io(&from, e))?;
    }
    Ok(())
}

/// Removes the files and directories the module does not keep.
///
/// The paths are relative to `output_dir`. Missing paths are skipped.
pub fn delete_output_paths(output_dir: &Path, paths: &[String]) -> Result<()> {
    for relative in paths {
        let path = output_dir.join(relative);
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else if path.exists() {
            std::fs::remove_file(&path)
        } else {
            tracing::warn!("{} does not exist, nothing to delete", path.display());
            continue;
        };
        result.map_err(|e| Error::io(&path, e))?;
    }
    Ok(())
}
