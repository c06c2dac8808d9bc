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

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use librariangen::execv::Execv;
use librariangen::{build, configure, generate, release};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_ENV_VAR: &str = "LIBRARIANGEN_LOG";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generates a library from the protos in googleapis.
    Generate(GenerateArgs),
    /// Builds and tests a library in the repository.
    Build(BuildArgs),
    /// Onboards a new API into a new or existing library.
    Configure(ConfigureArgs),
    /// Prepares the files for a new release of one or more libraries.
    ReleaseInit(ReleaseInitArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// The directory containing the request from Librarian.
    #[arg(long, default_value = "/librarian")]
    librarian: PathBuf,
    /// The directory containing the generator configuration.
    #[arg(long, default_value = "/input")]
    input: PathBuf,
    /// The directory receiving the generated code.
    #[arg(long, default_value = "/output")]
    output: PathBuf,
    /// The googleapis checkout.
    #[arg(long, default_value = "/source")]
    source: PathBuf,
    /// Leave the generated code as produced by protoc.
    #[arg(long)]
    disable_post_processor: bool,
}

#[derive(Debug, Args)]
struct BuildArgs {
    #[arg(long, default_value = "/librarian")]
    librarian: PathBuf,
    /// The repository root.
    #[arg(long, default_value = "/repo")]
    repo: PathBuf,
}

#[derive(Debug, Args)]
struct ConfigureArgs {
    #[arg(long, default_value = "/librarian")]
    librarian: PathBuf,
    #[arg(long, default_value = "/input")]
    input: PathBuf,
    #[arg(long, default_value = "/output")]
    output: PathBuf,
    #[arg(long, default_value = "/source")]
    source: PathBuf,
    #[arg(long, default_value = "/repo")]
    repo: PathBuf,
}

#[derive(Debug, Args)]
struct ReleaseInitArgs {
    #[arg(long, default_value = "/librarian")]
    librarian: PathBuf,
    #[arg(long, default_value = "/repo")]
    repo: PathBuf,
    #[arg(long, default_value = "/output")]
    output: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = enable_tracing() {
        eprintln!("cannot initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    tracing::debug!("{cli:?}");
    exit_code(run(cli.command).await)
}

// The error is reported once, through the log.
fn exit_code(result: librariangen::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("librariangen failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> librariangen::Result<()> {
    let runner = Execv;
    match command {
        Commands::Generate(args) => {
            let config = generate::Config {
                librarian_dir: args.librarian,
                input_dir: args.input,
                output_dir: args.output,
                source_dir: args.source,
                disable_post_processor: args.disable_post_processor,
            };
            generate::generate(&config, &runner).await
        }
        Commands::Build(args) => {
            let config = build::Config {
                librarian_dir: args.librarian,
                repo_dir: args.repo,
            };
            build::build(&config, &runner).await
        }
        Commands::Configure(args) => {
            let config = configure::Config {
                librarian_dir: args.librarian,
                input_dir: args.input,
                output_dir: args.output,
                source_dir: args.source,
                repo_dir: args.repo,
            };
            configure::configure(&config, &runner).await
        }
        Commands::ReleaseInit(args) => {
            let config = release::Config {
                librarian_dir: args.librarian,
                repo_dir: args.repo,
                output_dir: args.output,
            };
            release::release_init(&config).await
        }
    }
}

fn enable_tracing() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
