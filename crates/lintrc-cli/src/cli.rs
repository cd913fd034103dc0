use std::env;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use lintrc::{ConfigError, ConfigStore, FormatError, FormatOptions};

#[derive(Parser, Debug)]
#[command(
    name = "lintrc",
    version,
    about = "Resolve eslintrc-style configuration for individual files",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this configuration file instead of searching for .eslintrc.json.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective configuration of a file as JSON.
    PrintConfig {
        file: PathBuf,
    },
    /// List the files under the given paths that are not ignored.
    LsFiles {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Only list files with these extensions (comma separated).
        #[arg(long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,
    },
    /// Resolve the configuration of every file under the given paths and report errors.
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Only check files with these extensions (comma separated).
        #[arg(long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,
    },
    /// Print the formatter options that apply to a file.
    FormatOptions {
        file: PathBuf,

        /// Formatter config file. Defaults to the nearest .prettierrc.json.
        #[arg(long, value_name = "FILE")]
        prettier_config: Option<PathBuf>,
    },
}

#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    ConfigError = 1,
    OtherError = 2,
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::Io(..) => ExitCode::OtherError,
            _ => ExitCode::ConfigError,
        }
    }
}

impl From<&FormatError> for ExitCode {
    fn from(err: &FormatError) -> Self {
        match err {
            FormatError::Io(..) => ExitCode::OtherError,
            _ => ExitCode::ConfigError,
        }
    }
}

/// Run CLI processing and return `Ok(())` or an `ExitCode` on error.
pub fn run(cli: Cli) -> Result<(), ExitCode> {
    let cwd = env::current_dir().map_err(|err| {
        eprintln!("error: failed to get current directory: {err}");
        ExitCode::OtherError
    })?;
    let store =
        ConfigStore::new(cwd, cli.config).map_err(|err| report_config_error(None, &err))?;

    match cli.command {
        Command::PrintConfig { file } => print_config(&store, &file),
        Command::LsFiles { paths, extensions } => ls_files(&store, &paths, &extensions),
        Command::Validate { paths, extensions } => validate(&store, &paths, &extensions),
        Command::FormatOptions {
            file,
            prettier_config,
        } => format_options(&store, &file, prettier_config.as_deref()),
    }
}

fn print_config(store: &ConfigStore, file: &Path) -> Result<(), ExitCode> {
    let config = store
        .resolve(file)
        .map_err(|err| report_config_error(Some(file), &err))?;
    print_json(&config)
}

fn ls_files(
    store: &ConfigStore,
    paths: &[PathBuf],
    extensions: &[String],
) -> Result<(), ExitCode> {
    let mut result = Ok(());
    for file in collect_files(paths, extensions)? {
        match store.is_ignored(&file) {
            Ok(true) => debug!(file = %file.display(), "ignored"),
            Ok(false) => println!("{}", file.display()),
            Err(err) => {
                let code = report_config_error(Some(file.as_path()), &err);
                result = Err(worse(result, code));
            }
        }
    }
    result
}

fn validate(
    store: &ConfigStore,
    paths: &[PathBuf],
    extensions: &[String],
) -> Result<(), ExitCode> {
    let files = collect_files(paths, extensions)?;
    info!(files = files.len(), "validating configuration");

    let outcomes: Vec<(&PathBuf, Result<bool, ConfigError>)> = files
        .par_iter()
        .map(|file| (file, check_file(store, file)))
        .collect();

    let mut checked = 0;
    let mut failures = 0;
    let mut result = Ok(());
    for (file, outcome) in &outcomes {
        match outcome {
            Ok(false) => {}
            Ok(true) => checked += 1,
            Err(err) => {
                checked += 1;
                failures += 1;
                let code = report_config_error(Some(file.as_path()), err);
                result = Err(worse(result, code));
            }
        }
    }

    if failures == 0 {
        eprintln!("{checked} files checked, no configuration errors");
    } else {
        eprintln!("{failures} of {checked} files have configuration errors");
    }
    result
}

/// `Ok(false)` when the file is ignored, `Ok(true)` once its configuration resolves.
fn check_file(store: &ConfigStore, file: &Path) -> Result<bool, ConfigError> {
    if store.is_ignored(file)? {
        debug!(file = %file.display(), "ignored");
        return Ok(false);
    }
    store.resolve(file)?;
    Ok(true)
}

fn worse(previous: Result<(), ExitCode>, code: ExitCode) -> ExitCode {
    match previous {
        Err(ExitCode::OtherError) => ExitCode::OtherError,
        _ => code,
    }
}

fn format_options(
    store: &ConfigStore,
    file: &Path,
    prettier_config: Option<&Path>,
) -> Result<(), ExitCode> {
    let config = store
        .resolve(file)
        .map_err(|err| report_config_error(Some(file), &err))?;

    let from_file = match prettier_config {
        Some(path) => FormatOptions::new(None, Some(path)),
        None => {
            let target = store.root_dir().join(file);
            FormatOptions::discover(target.parent().unwrap_or(store.root_dir()))
        }
    }
    .map_err(|err| report_format_error(&err))?;

    let options = from_file
        .with_rule_options(&config)
        .map_err(|err| report_format_error(&err))?;
    print_json(&options)
}

/// Files under `paths` (honoring `.gitignore`) with one of `extensions`, sorted.
///
/// `ignorePatterns` are not applied here; they depend on configs that may fail to load.
fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, ExitCode> {
    let mut candidates = Vec::new();
    for path in paths {
        if path.is_file() {
            candidates.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            eprintln!("error: no such file or directory: {}", path.display());
            return Err(ExitCode::OtherError);
        }

        let walker = WalkBuilder::new(path)
            .git_ignore(true)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walker {
            let entry = entry.map_err(|err| {
                eprintln!("error: {err}");
                ExitCode::OtherError
            })?;
            if entry.file_type().is_some_and(|kind| kind.is_file()) {
                candidates.push(entry.into_path());
            }
        }
    }

    candidates.retain(|file| has_extension(file, extensions));
    candidates.sort();
    candidates.dedup();
    Ok(candidates)
}

fn has_extension(file: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let Some(ext) = file.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.') == ext)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ExitCode> {
    let json = serde_json::to_string_pretty(value).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::OtherError
    })?;
    println!("{json}");
    Ok(())
}

fn report_config_error(file: Option<&Path>, err: &ConfigError) -> ExitCode {
    match file {
        Some(file) => eprintln!("{}: {err}", file.display()),
        None => eprintln!("error: {err}"),
    }
    ExitCode::from(err)
}

fn report_format_error(err: &FormatError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}
