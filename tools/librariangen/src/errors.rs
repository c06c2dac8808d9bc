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

//! Errors returned by the generation pipeline.

use std::path::{Path, PathBuf};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for all `librariangen` operations.
///
/// Every stage returns this type instead of terminating the process. Only the
/// command dispatcher converts an error into a non-zero exit code.
///
/// Stages add context with [Error::context]. The predicates look through any
/// number of context layers, so callers can classify an error without knowing
/// which stage produced it.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// A file or directory could not be read or written.
    pub fn is_io(&self) -> bool {
        matches!(self.innermost(), ErrorKind::Io { .. })
    }

    /// A JSON or YAML document, or a pattern in a request, is malformed.
    pub fn is_parsing(&self) -> bool {
        matches!(self.innermost(), ErrorKind::Parsing { .. })
    }

    /// The pipeline configuration is invalid.
    pub fn is_config(&self) -> bool {
        matches!(self.innermost(), ErrorKind::Config(_))
    }

    /// A required field of the Bazel configuration is empty.
    pub fn is_missing_field(&self) -> bool {
        matches!(self.innermost(), ErrorKind::MissingField(_))
    }

    /// The request does not satisfy a precondition of the stage.
    pub fn is_precondition(&self) -> bool {
        matches!(self.innermost(), ErrorKind::Precondition(_))
    }

    /// An external tool could not be started or exited with an error.
    pub fn is_command(&self) -> bool {
        matches!(self.innermost(), ErrorKind::Command { .. })
    }

    /// The name of the missing field, if this is a missing field error.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self.innermost() {
            ErrorKind::MissingField(field) => Some(*field),
            _ => None,
        }
    }

    /// The combined stdout and stderr of a failed external tool.
    pub fn command_output(&self) -> Option<&str> {
        match self.innermost() {
            ErrorKind::Command { output, .. } => Some(output.as_str()),
            _ => None,
        }
    }

    /// Wraps this error with a message identifying the failed stage.
    pub fn context<T: Into<String>>(self, context: T) -> Error {
        Error(ErrorKind::Context {
            context: context.into(),
            source: Box::new(self),
        })
    }

    pub(crate) fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Error {
        Error(ErrorKind::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    pub(crate) fn parsing<P, T>(path: P, source: T) -> Error
    where
        P: AsRef<Path>,
        T: Into<BoxError>,
    {
        Error(ErrorKind::Parsing {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        })
    }

    pub(crate) fn config<T: Into<String>>(msg: T) -> Error {
        Error(ErrorKind::Config(msg.into()))
    }

    pub(crate) fn missing_field_error(field: &'static str) -> Error {
        Error(ErrorKind::MissingField(field))
    }

    pub(crate) fn precondition<T: Into<String>>(msg: T) -> Error {
        Error(ErrorKind::Precondition(msg.into()))
    }

    pub(crate) fn command<T>(command: &[String], output: String, source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Command {
            command: command.join(" "),
            output,
            source: source.into(),
        })
    }

    fn innermost(&self) -> &ErrorKind {
        let mut kind = &self.0;
        while let ErrorKind::Context { source, .. } = kind {
            kind = &source.0;
        }
        kind
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Parsing {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("failed precondition: {0}")]
    Precondition(String),
    #[error("command `{command}` failed: {source}\n{output}")]
    Command {
        command: String,
        output: String,
        #[source]
        source: BoxError,
    },
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}
