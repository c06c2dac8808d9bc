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

//! Runs external tools such as `protoc`, `goimports` and `go`.
//!
//! No other module spawns processes. Stages receive a [ToolRunner] so tests
//! can observe (and fail) the commands without installing any tools.

use crate::{Error, Result};
use std::path::Path;
use tokio::process::Command;

/// Executes an external command and waits for it to exit.
#[async_trait::async_trait]
pub trait ToolRunner: std::fmt::Debug + Send + Sync {
    /// Runs `args[0]` with the remaining arguments in `dir`.
    ///
    /// The child inherits the environment of this process. On failure the
    /// returned error embeds the combined output of the command, see
    /// [Error::command_output].
    async fn run(&self, args: &[String], dir: &Path) -> Result<()>;
}

/// The [ToolRunner] used in production.
///
/// If the future returned by [ToolRunner::run] is dropped before the command
/// exits, the child process is killed.
#[derive(Clone, Debug, Default)]
pub struct Execv;

#[async_trait::async_trait]
impl ToolRunner for Execv {
    async fn run(&self, args: &[String], dir: &Path) -> Result<()> {
        let Some((program, rest)) = args.split_first() else {
            return Err(Error::config("cannot run an empty command"));
        };
        tracing::debug!("running `{}` in {}", args.join(" "), dir.display());
        let output = Command::new(program)
            .args(rest)
            .current_dir(dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::command(args, String::new(), e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            return Err(Error::command(args, combined, output.status.to_string()));
        }
        tracing::debug!("`{program}` output:\n{combined}");
        Ok(())
    }
}
