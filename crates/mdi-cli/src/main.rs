// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_cli::{TextHistogramHook, init_tracing};
use mdi_core::{DetectionParams, KlMode, MdiError};
use mdi_harness::{
    BenchConfig, BenchmarkReport, Corpus, ExecutionMode, IntervalHook, NoopHook, Registry,
    render_text_report, run_benchmark,
};
use serde::Serialize;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

const DEFAULT_CORPUS: &str = "testcube.json";

#[derive(Debug, PartialEq)]
struct RunArgs {
    corpus: PathBuf,
    config: BenchConfig,
    output: Option<PathBuf>,
    verbose: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from(DEFAULT_CORPUS),
            config: BenchConfig::default(),
            output: None,
            verbose: false,
        }
    }
}

#[derive(Debug)]
enum CliError {
    Mdi(MdiError),
    Io {
        context: String,
        source: io::Error,
    },
    Json {
        context: String,
        source: serde_json::Error,
    },
    InvalidInput(String),
}

impl CliError {
    fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Mdi(err) => err.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mdi(err) => write!(f, "{err}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Json { context, source } => write!(f, "{context}: {source}"),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mdi(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<MdiError> for CliError {
    fn from(value: MdiError) -> Self {
        Self::Mdi(value)
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let tokens = env::args().skip(1).collect::<Vec<_>>();
    let Some(args) = parse_args(&tokens)? else {
        return Ok(());
    };
    init_tracing(args.verbose);

    let registry = Registry::builtin();
    args.config.validate(&registry)?;

    let corpus = Corpus::load_json(&args.corpus)?;
    info!(
        path = %args.corpus.display(),
        groups = corpus.group_names().len(),
        signals = corpus.signal_count(),
        "loaded corpus"
    );

    let report = if args.config.visualize {
        let mut hook = TextHistogramHook::new(io::stdout());
        execute(&corpus, &registry, &args.config, &mut hook)?
    } else {
        execute(&corpus, &registry, &args.config, &mut NoopHook)?
    };

    print!("{}", render_text_report(&report));

    if let Some(path) = args.output.as_deref() {
        write_json_output(&report, path)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(())
}

fn execute(
    corpus: &Corpus,
    registry: &Registry,
    config: &BenchConfig,
    hook: &mut dyn IntervalHook,
) -> Result<BenchmarkReport, CliError> {
    Ok(run_benchmark(corpus, registry, config, hook)?)
}

fn parse_args(tokens: &[String]) -> Result<Option<RunArgs>, CliError> {
    if tokens.is_empty() {
        print_help();
        return Ok(None);
    }
    if tokens.iter().any(|arg| matches!(arg.as_str(), "-h" | "--help")) {
        print_help();
        return Ok(None);
    }
    if tokens
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        print_version();
        return Ok(None);
    }
    parse_run_args(tokens).map(Some)
}

fn parse_run_args(tokens: &[String]) -> Result<RunArgs, CliError> {
    let mut args = RunArgs::default();
    let mut method: Option<String> = None;

    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        let flag = normalize_flag(flag);
        let flag = flag.as_str();
        match flag {
            "--corpus" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.corpus = PathBuf::from(raw);
            }
            "--method" => {
                method = Some(take_flag_value(flag, inline_value, tokens, &mut idx)?);
            }
            "--kernel-sigma-sq" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.kernel_sigma_sq = parse_f64_arg(raw.as_str(), flag)?;
            }
            "--extint-min-len" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.min_len = parse_usize_arg(raw.as_str(), flag)?;
            }
            "--extint-max-len" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.max_len = parse_usize_arg(raw.as_str(), flag)?;
            }
            "--alpha" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.alpha = parse_f64_arg(raw.as_str(), flag)?;
            }
            "--mode" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.mode = KlMode::parse(raw.as_str())?;
            }
            "--num-intervals" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.num_intervals = parse_usize_arg(raw.as_str(), flag)?;
            }
            "--preproc" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config.params.preprocessing = Some(raw);
            }
            "--extremetypes" => {
                args.config
                    .extreme_types
                    .extend(take_flag_values(flag, inline_value, tokens, &mut idx)?);
            }
            "--novis" => {
                ensure_no_inline_value(flag, inline_value)?;
                args.config.visualize = false;
            }
            "--parallel" => {
                ensure_no_inline_value(flag, inline_value)?;
                args.config.execution = ExecutionMode::Parallel;
            }
            "--verbose" => {
                ensure_no_inline_value(flag, inline_value)?;
                args.verbose = true;
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!("unknown option '{other}'")));
            }
        }
        idx += 1;
    }

    let Some(method) = method else {
        return Err(CliError::invalid_input("--method <name> is required"));
    };
    args.config.params.method = method;
    Ok(args)
}

/// Maps `--kernel_sigma_sq` to `--kernel-sigma-sq`.
fn normalize_flag(flag: &str) -> String {
    format!("--{}", flag.trim_start_matches("--").replace('_', "-"))
}

fn split_flag(token: &str) -> Result<(&str, Option<String>), CliError> {
    if !token.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "unexpected positional argument '{token}'; expected --flag value"
        )));
    }
    if let Some((flag, value)) = token.split_once('=') {
        return Ok((flag, Some(value.to_string())));
    }
    Ok((token, None))
}

fn take_flag_value(
    flag: &str,
    inline_value: Option<String>,
    tokens: &[String],
    idx: &mut usize,
) -> Result<String, CliError> {
    if let Some(value) = inline_value {
        return Ok(value);
    }

    *idx += 1;
    let value = tokens
        .get(*idx)
        .ok_or_else(|| CliError::invalid_input(format!("{flag} requires a value")))?;
    if value.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "{flag} requires a value, but got option '{value}'"
        )));
    }
    Ok(value.clone())
}

/// Consumes values up to the next `--option`.
fn take_flag_values(
    flag: &str,
    inline_value: Option<String>,
    tokens: &[String],
    idx: &mut usize,
) -> Result<Vec<String>, CliError> {
    let mut values = inline_value.into_iter().collect::<Vec<_>>();
    while let Some(next) = tokens.get(*idx + 1)
        && !next.starts_with("--")
    {
        values.push(next.clone());
        *idx += 1;
    }
    if values.is_empty() {
        return Err(CliError::invalid_input(format!(
            "{flag} requires at least one value"
        )));
    }
    Ok(values)
}

fn ensure_no_inline_value(flag: &str, inline_value: Option<String>) -> Result<(), CliError> {
    if inline_value.is_some() {
        return Err(CliError::invalid_input(format!(
            "{flag} does not accept a value"
        )));
    }
    Ok(())
}

fn parse_usize_arg(raw: &str, flag: &str) -> Result<usize, CliError> {
    raw.parse::<usize>().map_err(|_| {
        CliError::invalid_input(format!(
            "{flag} expects a non-negative integer, got '{raw}'"
        ))
    })
}

fn parse_f64_arg(raw: &str, flag: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .map_err(|_| CliError::invalid_input(format!("{flag} expects a number, got '{raw}'")))
}

fn print_version() {
    println!("mdi {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    let defaults = DetectionParams::default();
    println!(
        "mdi {}\n\nBenchmark an interval detector on a labeled corpus and report ROC-AUC per extreme type.\n\nUSAGE:\n  mdi --method <name> [OPTIONS]\n\nOPTIONS:\n  --method <name>                  Required; one of: {}\n  --corpus <path>                  Default: {DEFAULT_CORPUS}\n  --kernel-sigma-sq <float>        Parzen kernel variance. Default: {}\n  --extint-min-len <usize>         Default: {}\n  --extint-max-len <usize>         Default: {}\n  --alpha <float>                  Default: {}\n  --mode <OMEGA_I|SYM|I_OMEGA|LAMBDA|IS_I_OMEGA>   Default: {}\n  --extremetypes <name>...         Groups to evaluate. Default: all\n  --preproc <name>                 One of: {}\n  --num-intervals <usize>          Default: {}\n  --novis                          Skip interval histograms\n  --parallel                       Evaluate signals of a group in parallel\n  --output <path>                  Write the JSON report to a file\n  --verbose                        Debug logging on stderr\n  -h, --help                       Show help\n  -V, --version                    Show version\n\nsnake_case spellings (e.g. --kernel_sigma_sq) are accepted.",
        env!("CARGO_PKG_VERSION"),
        Registry::builtin().detector_names().join(", "),
        defaults.kernel_sigma_sq,
        defaults.min_len,
        defaults.max_len,
        defaults.alpha,
        defaults.mode.as_str(),
        Registry::builtin().preprocessor_names().join(", "),
        defaults.num_intervals,
    );
}

fn write_json_output<T: Serialize>(payload: &T, path: &Path) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON report", source))?;
    fs::write(path, format!("{encoded}\n"))
        .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}
