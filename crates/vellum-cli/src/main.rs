use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;

use cli::{Cli, Commands};
use vellum_config::EditorConfig;
use vellum_extensions::base::{base_extension, TOP_NODE};
use vellum_extensions::compose::{Editor, EditorBuilder};
use vellum_extensions::snippet::snippet_extension;
use vellum_parser::Parsed;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = format!("vellum_cli={log_level},vellum_parser={log_level},vellum_extensions={log_level}");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let editor = build_editor(&config)?;

    match cli.command {
        Commands::Parse { input, pretty } => {
            let src = read_input(input, &config)?;
            let parsed = parse(&editor, &config, &src)?;
            report_diagnostics(&parsed);
            let json = if pretty {
                serde_json::to_string_pretty(&parsed.doc)?
            } else {
                serde_json::to_string(&parsed.doc)?
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Roundtrip { input, verify } => {
            let src = read_input(input, &config)?;
            let parsed = parse(&editor, &config, &src)?;
            report_diagnostics(&parsed);
            let out = editor.serialize(&parsed.doc)?;
            if verify && out != src {
                eprintln!("{}", "roundtrip output differs from input".red().bold());
                print_divergence(&src, &out);
                return Ok(ExitCode::FAILURE);
            }
            print!("{out}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { input } => {
            let src = read_input(input, &config)?;
            let parsed = parse(&editor, &config, &src)?;
            check(&parsed)
        }
    }
}

/// Compose the editor described by the config
fn build_editor(config: &EditorConfig) -> Result<Editor> {
    let mut builder = EditorBuilder::new(TOP_NODE, base_extension());
    if config.extensions.snippet {
        builder = builder.extension(snippet_extension());
    }
    if !config.validation.allowed_link_schemes.is_empty() {
        let config = config.clone();
        builder = builder.link_validator(Arc::new(move |href: &str| config.link_allowed(href)));
    }
    builder.compose().context("editor composition failed")
}

fn parse(editor: &Editor, config: &EditorConfig, src: &str) -> Result<Parsed> {
    let parsed = if config.validation.strict {
        editor.parse_strict(src)?
    } else {
        editor.parse(src)?
    };
    Ok(parsed)
}

fn read_input(path: Option<PathBuf>, config: &EditorConfig) -> Result<String> {
    let src = match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    if src.len() > config.limits.max_input_bytes {
        bail!(
            "input is {} bytes, over the configured limit of {}",
            src.len(),
            config.limits.max_input_bytes
        );
    }
    Ok(src)
}

fn report_diagnostics(parsed: &Parsed) {
    if parsed.degraded {
        eprintln!("{}", "warning: document was parsed in degraded mode".yellow());
    }
    for rejection in &parsed.env.rejections {
        eprintln!("{} {rejection}", "rejected:".yellow());
    }
}

fn check(parsed: &Parsed) -> Result<ExitCode> {
    let mut failed = false;
    if parsed.degraded {
        println!("{} degraded parse, original text preserved verbatim", "fail".red().bold());
        failed = true;
    }
    for rejection in &parsed.env.rejections {
        println!("{} {rejection}", "fail".red().bold());
        failed = true;
    }
    if failed {
        Ok(ExitCode::FAILURE)
    } else {
        println!("{} document parses cleanly", "ok".green().bold());
        Ok(ExitCode::SUCCESS)
    }
}

/// Show the first line where the round-trip diverged
fn print_divergence(src: &str, out: &str) {
    for (i, (a, b)) in src.lines().zip(out.lines()).enumerate() {
        if a != b {
            eprintln!("first divergence at line {}:", i + 1);
            eprintln!("  {} {a}", "input: ".cyan());
            eprintln!("  {} {b}", "output:".cyan());
            return;
        }
    }
    eprintln!(
        "line counts differ: input {} lines, output {} lines",
        src.lines().count(),
        out.lines().count()
    );
}
