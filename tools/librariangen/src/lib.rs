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

//! Generates, configures, builds and releases the Go client libraries.
//!
//! This crate implements the container contract used by the Librarian tool.
//! Librarian mounts a number of directories (the request directory, the
//! googleapis protos, the repository and an output directory) and invokes one
//! of the commands in this crate:
//!
//! - [generate][generate::generate] runs `protoc` with the Go and GAPIC
//!   plugins and post-processes the output into a versioned module.
//! - [build][build::build] compiles and tests a module in the repository.
//! - [configure][configure::configure] onboards a new API.
//! - [release_init][release::release_init] prepares the release artifacts
//!   for a new version.
//!
//! All the external tools are invoked via a [ToolRunner][execv::ToolRunner].

pub mod bazel;
pub mod build;
pub mod configure;
mod errors;
pub mod execv;
pub mod generate;
pub mod module;
pub mod postprocessor;
pub mod protoc;
pub mod release;
pub mod repo_config;
pub mod request;

pub use errors::Error;

/// The result type for all `librariangen` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The Go module path prefix shared by all the client libraries.
pub const MODULE_ROOT: &str = "cloud.google.com/go";

/// Returns an error naming `name` if `dir` is empty.
pub(crate) fn require_dir(name: &str, dir: &std::path::Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::config(format!("the {name} directory is not set")));
    }
    Ok(())
}
