use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use javelin_report::{compile_units, render_reports};
use javelin_syntax::ParserConfig;
use javelin_types::{CheckSeverity, CompilerOptions, DiagnosticCategory};

#[derive(Parser)]
#[command(name = "javelin", version, about = "Javelin CLI (parsing, checks, reports)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile source files and print the diagnostic report
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Java source files to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Enable an opt-in check, e.g. `--enable null-reference=error`.
    /// Severity is `warning`, `error` or `ignore`; omitted means `warning`.
    #[arg(long = "enable", value_name = "CHECK[=SEVERITY]")]
    enable: Vec<String>,
    /// Collapse same-operator binary runs of at least this length
    #[arg(long, default_value_t = 20)]
    threshold: usize,
    /// Parse doc comments and run the javadoc cross-reference checks
    #[arg(long)]
    doc_comments: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Check(args) => {
            let options = build_options(&args)?;
            let config = ParserConfig {
                combine_threshold: args.threshold,
                ..ParserConfig::default()
            };

            let mut units = Vec::with_capacity(args.files.len());
            for path in &args.files {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                units.push((path.display().to_string(), text));
            }

            let reports = compile_units(&units, &options, &config)
                .with_context(|| "compilation aborted")?;

            match args.format {
                Format::Text => print!("{}", render_reports(&reports)),
                Format::Json => {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                }
            }

            let failed = reports.iter().any(|report| report.has_errors());
            Ok(if failed { 1 } else { 0 })
        }
    }
}

fn build_options(args: &CheckArgs) -> Result<CompilerOptions> {
    let mut options = CompilerOptions::new();
    options.doc_comment_support = args.doc_comments;
    for spec in &args.enable {
        let (category, severity) = parse_enable(spec)?;
        options.set(category, severity);
    }
    Ok(options)
}

fn parse_enable(spec: &str) -> Result<(DiagnosticCategory, CheckSeverity)> {
    let (name, severity) = match spec.split_once('=') {
        Some((name, severity)) => (name, severity),
        None => (spec, "warning"),
    };

    let category = match name {
        "null-reference" => DiagnosticCategory::NullReference,
        "redundant-null-check" => DiagnosticCategory::RedundantNullCheck,
        "non-externalized-string" => DiagnosticCategory::NonExternalizedString,
        "redundant-superinterface" => DiagnosticCategory::RedundantSuperinterface,
        "unexpected-javadoc-tag" => DiagnosticCategory::UnexpectedJavadocTag,
        "missing-javadoc-tag" => DiagnosticCategory::MissingJavadocTag,
        "unqualified-field-access" => DiagnosticCategory::UnqualifiedFieldAccess,
        "unreachable-code" => DiagnosticCategory::UnreachableCode,
        _ => bail!("unknown check `{name}`"),
    };

    let severity = match severity {
        "warning" => CheckSeverity::Warning,
        "error" => CheckSeverity::Error,
        "ignore" => CheckSeverity::Ignore,
        _ => bail!("unknown severity `{severity}` for `{name}`"),
    };

    Ok((category, severity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_spec_defaults_to_warning() {
        let (category, severity) = parse_enable("unreachable-code").expect("parse");
        assert_eq!(category, DiagnosticCategory::UnreachableCode);
        assert_eq!(severity, CheckSeverity::Warning);
    }

    #[test]
    fn enable_spec_with_severity() {
        let (category, severity) = parse_enable("null-reference=error").expect("parse");
        assert_eq!(category, DiagnosticCategory::NullReference);
        assert_eq!(severity, CheckSeverity::Error);
    }

    #[test]
    fn unknown_check_is_rejected() {
        assert!(parse_enable("definitely-not-a-check").is_err());
    }
}
