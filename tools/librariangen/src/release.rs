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

//! Implements the `release-init` command.
//!
//! For each library with a triggered release the command updates the
//! changelog, the `internal/version.go` file and the snippet metadata. The
//! updated files are written to the output directory, the repository is
//! never modified.

use crate::configure::TAG_FORMAT;
use crate::repo_config::{ModuleConfig, RepoConfig};
use crate::request::{self, Api};
use crate::{Error, Result, module, require_dir};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The name of the request file in the librarian directory.
pub const REQUEST_FILE: &str = "release-init-request.json";

/// The name of the response file in the librarian directory.
pub const RESPONSE_FILE: &str = "release-init-response.json";

/// The location of `repo-config.yaml` within the repository.
pub const REPO_CONFIG_DIR: &str = ".librarian/generator-input";

/// The id of the library for the `cloud.google.com/go` module itself.
pub const ROOT_MODULE_ID: &str = "root-module";

const REPO_URL: &str = "https://github.com/googleapis/google-cloud-go";
const CHANGELOG: &str = "CHANGES.md";
const TITLE_MARKER: &str = "# Changes";
const SHORT_HASH_LEN: usize = 7;

// The conventional commit types included in the changelog, in order.
const SECTIONS: [(&str, &str); 5] = [
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance Improvements"),
    ("revert", "Reverts"),
    ("docs", "Documentation"),
];

/// The directories used by the `release-init` command.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Contains the request and receives the response.
    pub librarian_dir: PathBuf,
    /// The root of the repository.
    pub repo_dir: PathBuf,
    /// Receives the updated files.
    pub output_dir: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        require_dir("librarian", &self.librarian_dir)?;
        require_dir("repo", &self.repo_dir)?;
        require_dir("output", &self.output_dir)?;
        Ok(())
    }
}

/// The contents of `release-init-request.json`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Request {
    pub libraries: Vec<Library>,
}

/// A library in a [Request].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Library {
    pub id: String,
    /// The version being released.
    pub version: String,
    /// The changes since the last release.
    pub changes: Vec<Change>,
    pub apis: Vec<Api>,
    #[serde(alias = "source_roots")]
    pub source_paths: Vec<String>,
    /// The format of the release tag, e.g. `{id}/v{version}`.
    pub tag_format: String,
    /// Only libraries with a triggered release are processed.
    pub release_triggered: bool,
}

impl Library {
    /// The directory of the module, relative to the repository root.
    ///
    /// Libraries covering the whole repository, and the root module, live at
    /// the top of the repository. Any other library lives in `<id>`.
    pub fn module_root(&self) -> &str {
        if self.id == ROOT_MODULE_ID || self.source_paths.iter().any(|p| p == ".") {
            return ".";
        }
        &self.id
    }

    /// The release tag, [TAG_FORMAT] unless the library sets its own.
    pub fn tag(&self) -> String {
        let format = match self.tag_format.as_str() {
            "" => TAG_FORMAT,
            f => f,
        };
        format
            .replace("{id}", &self.id)
            .replace("{version}", &self.version)
    }
}

/// A conventional commit included in a release.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Change {
    /// The commit type, e.g. `feat` or `fix`.
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub body: String,
    /// The commit in the source repository, used to link the change.
    pub source_commit_hash: String,
}

#[derive(Debug, Serialize)]
struct Response {
    error: String,
}

/// Prepares the release of the libraries in `release-init-request.json`.
///
/// On failure, the error is also written to `release-init-response.json`.
pub async fn release_init(config: &Config) -> Result<()> {
    let today = chrono::Utc::now().date_naive();
    match release_init_impl(config, today) {
        Ok(()) => Ok(()),
        Err(e) => {
            let path = config.librarian_dir.join(RESPONSE_FILE);
            let response = Response {
                error: e.to_string(),
            };
            if let Err(write_error) = request::save_json(&response, &path) {
                tracing::error!("cannot write the error response: {write_error}");
            }
            Err(e)
        }
    }
}

fn release_init_impl(config: &Config, today: chrono::NaiveDate) -> Result<()> {
    config.validate()?;
    let request: Request = request::parse_json(&config.librarian_dir.join(REQUEST_FILE))?;
    let repo_config = RepoConfig::load(&config.repo_dir.join(REPO_CONFIG_DIR))?;

    for library in request.libraries.iter().filter(|l| l.release_triggered) {
        tracing::info!("preparing release {} of library {}", library.version, library.id);
        let module_config = repo_config.module(&library.id);
        update_changelog(config, library, today)
            .map_err(|e| e.context(format!("updating the changelog of {}", library.id)))?;
        module::generate_internal_version_file(
            &config.output_dir.join(library.module_root()),
            &library.version,
        )
        .map_err(|e| e.context(format!("updating the version of {}", library.id)))?;
        update_snippets_metadata(config, library, &module_config)
            .map_err(|e| e.context(format!("updating the snippets of {}", library.id)))?;
    }
    Ok(())
}

fn update_changelog(config: &Config, library: &Library, today: chrono::NaiveDate) -> Result<()> {
    let relative = Path::new(library.module_root()).join(CHANGELOG);
    let source = config.repo_dir.join(&relative);
    let old = match std::fs::read_to_string(&source) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::io(&source, e)),
    };
    if old.contains(&format!("## [{}]", library.version)) {
        tracing::info!("{} already contains version {}", relative.display(), library.version);
        return Ok(());
    }

    let entry = changelog_entry(library, today);
    let content = insert_entry(&old, &entry);
    let dest = config.output_dir.join(&relative);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(&dest, content).map_err(|e| Error::io(&dest, e))
}

// Subjects are sorted and deduplicated within each section. The first commit
// hash seen for a subject is used for its link.
fn changelog_entry(library: &Library, today: chrono::NaiveDate) -> String {
    let tag = library.tag().replace('/', "%2F");
    let mut entry = format!(
        "## [{version}]({REPO_URL}/releases/tag/{tag}) ({date})\n\n",
        version = library.version,
        date = today.format("%Y-%m-%d"),
    );
    for (kind, title) in SECTIONS {
        let mut subjects = BTreeMap::new();
        for change in library.changes.iter().filter(|c| c.kind == kind) {
            subjects
                .entry(change.subject.as_str())
                .or_insert(change.source_commit_hash.as_str());
        }
        if subjects.is_empty() {
            continue;
        }
        entry.push_str(&format!("### {title}\n\n"));
        for (subject, hash) in subjects {
            match hash {
                "" => entry.push_str(&format!("* {subject}\n")),
                hash => {
                    let short: String = hash.chars().take(SHORT_HASH_LEN).collect();
                    entry.push_str(&format!(
                        "* {subject} ([{short}]({REPO_URL}/commit/{hash}))\n"
                    ));
                }
            }
        }
        entry.push('\n');
    }
    entry
}

// New entries go right after the `# Changes` title. Without a title, the
// entry is prepended.
fn insert_entry(old: &str, entry: &str) -> String {
    let Some(index) = old.find(TITLE_MARKER) else {
        return format!("{entry}{old}");
    };
    let start = index + TITLE_MARKER.len();
    match old[start..].find(|c: char| !matches!(c, ' ' | '\t' | '\n' | '\r')) {
        Some(offset) => {
            let at = start + offset;
            let separator = if old[..at].ends_with('\n') { "" } else { "\n" };
            format!("{}{entry}{separator}{}", &old[..at], &old[at..])
        }
        None => {
            let mut content = old.to_string();
            if !content.ends_with('\n') {
                content.push('\n');
            }
            if !content.ends_with("\n\n") {
                content.push('\n');
            }
            content.push_str(entry);
            content
        }
    }
}

// Copies the snippet metadata of each API from the repository to the output,
// with the new version. Proto-only APIs have no snippets, and files without a
// version are not copied.
fn update_snippets_metadata(
    config: &Config,
    library: &Library,
    module_config: &ModuleConfig,
) -> Result<()> {
    let snippets = Path::new(module::SNIPPETS_DIR).join(&library.id);
    for api in &library.apis {
        let api_config = module_config.api(&api.path);
        let relative = snippets
            .join(api_config.client_directory()?)
            .join(format!("snippet_metadata.{}.json", api_config.proto_package()));
        let source = config.repo_dir.join(&relative);
        let content = match std::fs::read_to_string(&source) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("{} not found, assuming a proto-only package", relative.display());
                continue;
            }
            Err(e) => return Err(Error::io(&source, e)),
        };
        let Some(updated) = module::update_snippet_content(&content, &library.version) else {
            tracing::debug!("no version found in {}, skipping", relative.display());
            continue;
        };
        let dest = config.output_dir.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&dest, updated).map_err(|e| Error::io(&dest, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    type TestResult = anyhow::Result<()>;

    fn date() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2025, 9, 11).expect("valid date")
    }

    fn change(kind: &str, subject: &str, hash: &str) -> Change {
        Change {
            kind: kind.into(),
            subject: subject.into(),
            source_commit_hash: hash.into(),
            ..Change::default()
        }
    }

    struct Env {
        _tmp: tempfile::TempDir,
        config: Config,
    }

    impl Env {
        fn new() -> anyhow::Result<Self> {
            let tmp = tempfile::tempdir()?;
            let config = Config {
                librarian_dir: tmp.path().join("librarian"),
                repo_dir: tmp.path().join("repo"),
                output_dir: tmp.path().join("output"),
            };
            for dir in [&config.librarian_dir, &config.repo_dir, &config.output_dir] {
                std::fs::create_dir_all(dir)?;
            }
            Ok(Self { _tmp: tmp, config })
        }

        fn write_repo(&self, path: &str, content: &str) -> anyhow::Result<()> {
            let path = self.config.repo_dir.join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            Ok(())
        }

        fn write_request(&self, content: &str) -> anyhow::Result<()> {
            std::fs::write(self.config.librarian_dir.join(REQUEST_FILE), content)?;
            Ok(())
        }

        fn output(&self, path: &str) -> anyhow::Result<String> {
            Ok(std::fs::read_to_string(self.config.output_dir.join(path))?)
        }
    }

    const SNIPPET: &str = "internal/generated/snippets/secretmanager/apiv1/snippet_metadata.google.cloud.secretmanager.v1.json";

    const REQUEST: &str = r#"{
        "libraries": [
            {
                "id": "secretmanager",
                "version": "1.16.0",
                "release_triggered": true,
                "source_roots": ["secretmanager"],
                "tag_format": "{id}/v{version}",
                "apis": [{"path": "google/cloud/secretmanager/v1"}],
                "changes": [
                    {"type": "feat", "subject": "another feature", "source_commit_hash": "zxcvbn098765"},
                    {"type": "fix", "subject": "correct typo in documentation", "source_commit_hash": "123456abcdef"},
                    {"type": "feat", "subject": "add new GetSecret API", "source_commit_hash": "abcdef123456"},
                    {"type": "chore", "subject": "update deps"}
                ]
            },
            {
                "id": "workflows",
                "version": "2.0.0",
                "release_triggered": false,
                "apis": [{"path": "google/cloud/workflows/v1"}]
            }
        ]
    }"#;

    const CHANGES: &str = "### Features\n\n\
        * add new GetSecret API ([abcdef1](https://github.com/googleapis/google-cloud-go/commit/abcdef123456))\n\
        * another feature ([zxcvbn0](https://github.com/googleapis/google-cloud-go/commit/zxcvbn098765))\n\n\
        ### Bug Fixes\n\n\
        * correct typo in documentation ([123456a](https://github.com/googleapis/google-cloud-go/commit/123456abcdef))\n\n";

    #[test]
    fn entry() {
        let library = Library {
            id: "bigtable".into(),
            version: "1.2.0".into(),
            changes: vec![
                change("docs", "fix typo", ""),
                change("feat", "add method", "1234567890"),
                change("fix", "handle empty pages", "abc"),
                change("feat", "add field", "fedcba9876"),
                change("feat", "add field", "0000000000"),
                change("chore", "ignored", ""),
            ],
            ..Library::default()
        };
        let got = changelog_entry(&library, date());
        let want = "## [1.2.0](https://github.com/googleapis/google-cloud-go/releases/tag/bigtable%2Fv1.2.0) (2025-09-11)\n\n\
            ### Features\n\n\
            * add field ([fedcba9](https://github.com/googleapis/google-cloud-go/commit/fedcba9876))\n\
            * add method ([1234567](https://github.com/googleapis/google-cloud-go/commit/1234567890))\n\n\
            ### Bug Fixes\n\n\
            * handle empty pages ([abc](https://github.com/googleapis/google-cloud-go/commit/abc))\n\n\
            ### Documentation\n\n* fix typo\n\n";
        assert_eq!(got, want);
    }

    #[test_case("secretmanager", &[], "", "secretmanager/v1.0.0"; "default format")]
    #[test_case("xyz", &[], "custom-{id}-v{version}", "custom-xyz-v1.0.0"; "custom format")]
    #[test_case("wholerepo", &["."], "v{version}", "v1.0.0"; "without id")]
    fn tag(id: &str, source_paths: &[&str], tag_format: &str, want: &str) {
        let library = Library {
            id: id.into(),
            version: "1.0.0".into(),
            source_paths: source_paths.iter().map(|p| p.to_string()).collect(),
            tag_format: tag_format.into(),
            ..Library::default()
        };
        assert_eq!(library.tag(), want);
    }

    #[test_case("secretmanager", &["secretmanager"], "secretmanager"; "module")]
    #[test_case("wholerepo", &["."], "."; "whole repo")]
    #[test_case(ROOT_MODULE_ID, &["civil", "rpcreplay", "httpreplay"], "."; "root module")]
    #[test_case("bigquery", &[], "bigquery"; "no source paths")]
    fn module_root(id: &str, source_paths: &[&str], want: &str) {
        let library = Library {
            id: id.into(),
            source_paths: source_paths.iter().map(|p| p.to_string()).collect(),
            ..Library::default()
        };
        assert_eq!(library.module_root(), want);
    }

    #[test_case("# Changes\n\n## 1.0.0\n", "# Changes\n\nENTRY\n## 1.0.0\n"; "before previous")]
    #[test_case("# Changes\n## 1.0.0\n", "# Changes\nENTRY\n## 1.0.0\n"; "single newline")]
    #[test_case("# Changes  ## 1.0.0\n", "# Changes  ENTRY\n\n## 1.0.0\n"; "same line")]
    #[test_case("# Changes", "# Changes\n\nENTRY\n"; "title only")]
    #[test_case("# Changes\n", "# Changes\n\nENTRY\n"; "title and newline")]
    #[test_case("## 1.0.0\n", "ENTRY\n## 1.0.0\n"; "no title")]
    #[test_case("", "ENTRY\n"; "empty")]
    fn insert(old: &str, want: &str) {
        assert_eq!(insert_entry(old, "ENTRY\n"), want);
    }

    #[test]
    fn release() -> TestResult {
        let env = Env::new()?;
        env.write_request(REQUEST)?;
        env.write_repo("secretmanager/CHANGES.md", "# Changes\n\n## [1.15.0]\n- Old stuff.")?;
        env.write_repo(
            "secretmanager/internal/version.go",
            r#"package internal; const Version = "1.15.0""#,
        )?;
        env.write_repo(SNIPPET, r#"{"clientLibrary":{"version":"1.15.0"}}"#)?;
        env.write_repo("workflows/CHANGES.md", "# Changes\n")?;

        release_init_impl(&env.config, date())?;

        let changelog = env.output("secretmanager/CHANGES.md")?;
        let want = format!(
            "# Changes\n\n\
            ## [1.16.0](https://github.com/googleapis/google-cloud-go/releases/tag/secretmanager%2Fv1.16.0) (2025-09-11)\n\n\
            {CHANGES}## [1.15.0]\n- Old stuff."
        );
        assert_eq!(changelog, want);
        let version = env.output("secretmanager/internal/version.go")?;
        assert!(version.contains(r#"const Version = "1.16.0""#), "{version}");
        let snippet = env.output(SNIPPET)?;
        assert_eq!(snippet, r#"{"clientLibrary":{"version":"1.16.0"}}"#);

        assert!(!env.config.output_dir.join("workflows").exists());
        assert!(!env.config.librarian_dir.join(RESPONSE_FILE).exists());
        Ok(())
    }

    #[test_case("wholerepo", r#"["."]"#; "whole repo library")]
    #[test_case(ROOT_MODULE_ID, r#"["civil", "rpcreplay", "httpreplay"]"#; "root module")]
    fn release_at_repo_root(id: &str, source_roots: &str) -> TestResult {
        let env = Env::new()?;
        env.write_request(&format!(
            r#"{{"libraries": [{{
                "id": "{id}",
                "version": "1.16.0",
                "release_triggered": true,
                "source_roots": {source_roots},
                "tag_format": "v{{version}}",
                "changes": [
                    {{"type": "feat", "subject": "another feature", "source_commit_hash": "zxcvbn098765"}},
                    {{"type": "fix", "subject": "correct typo in documentation", "source_commit_hash": "123456abcdef"}},
                    {{"type": "feat", "subject": "add new GetSecret API", "source_commit_hash": "abcdef123456"}}
                ]
            }}]}}"#
        ))?;
        env.write_repo("CHANGES.md", "# Changes\n\n## [1.15.0]\n- Old stuff.")?;
        env.write_repo("internal/version.go", r#"package internal; const Version = "1.15.0""#)?;

        release_init_impl(&env.config, date())?;

        let changelog = env.output("CHANGES.md")?;
        let want = format!(
            "# Changes\n\n\
            ## [1.16.0](https://github.com/googleapis/google-cloud-go/releases/tag/v1.16.0) (2025-09-11)\n\n\
            {CHANGES}## [1.15.0]\n- Old stuff."
        );
        assert_eq!(changelog, want);
        let version = env.output("internal/version.go")?;
        assert!(version.contains(r#"const Version = "1.16.0""#), "{version}");
        assert!(!env.config.output_dir.join(id).exists());
        Ok(())
    }

    #[test]
    fn custom_tag_format() -> TestResult {
        let env = Env::new()?;
        env.write_request(
            r#"{"libraries": [{
                "id": "xyz",
                "version": "1.16.0",
                "release_triggered": true,
                "source_roots": ["xyz"],
                "tag_format": "custom-{id}-v{version}",
                "changes": [{"type": "feat", "subject": "another feature", "source_commit_hash": "zxcvbn098765"}]
            }]}"#,
        )?;
        env.write_repo("xyz/CHANGES.md", "# Changes\n\n## [1.15.0]\n- Old stuff.")?;
        release_init_impl(&env.config, date())?;
        let changelog = env.output("xyz/CHANGES.md")?;
        let want = "# Changes\n\n\
            ## [1.16.0](https://github.com/googleapis/google-cloud-go/releases/tag/custom-xyz-v1.16.0) (2025-09-11)\n\n\
            ### Features\n\n\
            * another feature ([zxcvbn0](https://github.com/googleapis/google-cloud-go/commit/zxcvbn098765))\n\n\
            ## [1.15.0]\n- Old stuff.";
        assert_eq!(changelog, want);
        Ok(())
    }

    #[test]
    fn changelog_up_to_date() -> TestResult {
        let env = Env::new()?;
        env.write_request(REQUEST)?;
        env.write_repo(
            "secretmanager/CHANGES.md",
            "# Changes\n\n## [1.16.0](https://github.com/googleapis/google-cloud-go/releases/tag/secretmanager%2Fv1.16.0)\n- Already there.",
        )?;
        env.write_repo(SNIPPET, r#"{"version": "1.15.0"}"#)?;
        release_init_impl(&env.config, date())?;
        assert!(!env.config.output_dir.join("secretmanager/CHANGES.md").exists());
        let version = env.output("secretmanager/internal/version.go")?;
        assert!(version.contains(r#"const Version = "1.16.0""#), "{version}");
        assert_eq!(env.output(SNIPPET)?, r#"{"version": "1.16.0"}"#);
        Ok(())
    }

    #[test]
    fn release_not_triggered() -> TestResult {
        let env = Env::new()?;
        env.write_request(
            r#"{"libraries": [{"id": "secretmanager", "version": "1.16.0", "release_triggered": false}]}"#,
        )?;
        release_init_impl(&env.config, date())?;
        assert_eq!(std::fs::read_dir(&env.config.output_dir)?.count(), 0);
        Ok(())
    }

    #[test]
    fn snippets_proto_only() -> TestResult {
        let env = Env::new()?;
        let library = Library {
            id: "secretmanager".into(),
            version: "1.16.0".into(),
            apis: vec![Api {
                path: "google/cloud/secretmanager/v1".into(),
                ..Api::default()
            }],
            ..Library::default()
        };
        let module_config = RepoConfig::default().module("secretmanager");
        update_snippets_metadata(&env.config, &library, &module_config)?;
        assert!(!env.config.output_dir.join(module::SNIPPETS_DIR).exists());
        Ok(())
    }

    #[test]
    fn snippets_with_overrides() -> TestResult {
        let env = Env::new()?;
        env.write_repo(
            &format!("{REPO_CONFIG_DIR}/{}", crate::repo_config::REPO_CONFIG_FILE),
            r#"
modules:
  - name: bigquery
    apis:
      - path: google/cloud/bigquery/storage/v1
        proto_package: google.cloud.bigquery.storage.v1
        client_directory: storage/apiv1
"#,
        )?;
        env.write_repo(
            "internal/generated/snippets/bigquery/storage/apiv1/snippet_metadata.google.cloud.bigquery.storage.v1.json",
            r#"{"version":"$VERSION"}"#,
        )?;
        env.write_request(
            r#"{"libraries": [{
                "id": "bigquery",
                "version": "1.70.0",
                "release_triggered": true,
                "apis": [{"path": "google/cloud/bigquery/storage/v1"}]
            }]}"#,
        )?;
        release_init_impl(&env.config, date())?;
        let snippet = env.output(
            "internal/generated/snippets/bigquery/storage/apiv1/snippet_metadata.google.cloud.bigquery.storage.v1.json",
        )?;
        assert_eq!(snippet, r#"{"version":"1.70.0"}"#);
        let changelog = env.output("bigquery/CHANGES.md")?;
        assert_eq!(
            changelog,
            "## [1.70.0](https://github.com/googleapis/google-cloud-go/releases/tag/bigquery%2Fv1.70.0) (2025-09-11)\n\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn snippet_without_version_is_skipped() -> TestResult {
        let env = Env::new()?;
        env.write_request(REQUEST)?;
        env.write_repo(SNIPPET, r#"{"clientLibrary":{}}"#)?;
        release_init(&env.config).await?;
        assert!(!env.config.output_dir.join(SNIPPET).exists());
        assert!(env.config.output_dir.join("secretmanager/CHANGES.md").is_file());
        assert!(!env.config.librarian_dir.join(RESPONSE_FILE).exists());
        Ok(())
    }

    #[tokio::test]
    async fn missing_request() -> TestResult {
        let env = Env::new()?;
        let err = release_init(&env.config).await.unwrap_err();
        assert!(err.is_io(), "{err:?}");
        assert!(env.config.librarian_dir.join(RESPONSE_FILE).exists());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_request() -> TestResult {
        let env = Env::new()?;
        env.write_request(r#"{"libraries": [}"#)?;
        let err = release_init(&env.config).await.unwrap_err();
        assert!(err.is_parsing(), "{err:?}");
        let response = std::fs::read_to_string(env.config.librarian_dir.join(RESPONSE_FILE))?;
        let response: serde_json::Value = serde_json::from_str(&response)?;
        assert_eq!(response["error"], serde_json::json!(err.to_string()));
        Ok(())
    }
}
