//! Command-line interface for refdoc
//! Generates reference markdown from table-definition headers and protos, and renders markdown
//! pages into the static site.
//!
//! Usage:
//!   refdoc tables -i `<header>` [-i `<header>` ...] [-o `<out.md>`]
//!   refdoc proto -i `<file.proto>` -p `<pkg.Type>` [-o `<out.md>`]
//!   refdoc render --odir `<site>` -o `<out.html>` [-i `<input.md>`] [-t `<template>`]
//!
//! Global options: --config `<toml>`, --root `<dir>`, -v (repeatable).

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use refdoc_config::{Loader, RefdocConfig};
use refdoc_render::publish::write_to_path;
use refdoc_render::{publish, PublishSpec};
use refdoc_schema::proto::{generate_proto_reference, load_proto};
use refdoc_schema::reference::tables_to_markdown;
use refdoc_schema::tables::parse_headers;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("refdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reference docs generation and markdown rendering for the docs site")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .help("Project root that links and proto imports resolve against"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase logging verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(
            Command::new("tables")
                .about("Generate the table reference from table-definition headers")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Header file to scan (repeatable)"),
                )
                .arg(output_arg("Markdown output file (default: stdout)")),
        )
        .subcommand(
            Command::new("proto")
                .about("Generate the reference for a proto message and every type it reaches")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .required(true)
                        .help("Proto file, inside the project root"),
                )
                .arg(
                    Arg::new("type")
                        .short('p')
                        .long("type")
                        .required(true)
                        .help("Root type, e.g. perfetto.protos.TraceConfig"),
                )
                .arg(output_arg("Markdown output file (default: stdout)")),
        )
        .subcommand(
            Command::new("render")
                .about("Render a markdown page into the site")
                .arg(
                    Arg::new("odir")
                        .long("odir")
                        .required(true)
                        .help("Site output directory; docs images are copied under it"),
                )
                .arg(output_arg("HTML output file").required(true))
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .help("Markdown input (default: empty page)"),
                )
                .arg(
                    Arg::new("template")
                        .short('t')
                        .long("template")
                        .help("Page template receiving markdown, fileName and nav"),
                ),
        )
}

fn output_arg(help: &'static str) -> Arg {
    Arg::new("output").short('o').long("output").help(help)
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    match matches.subcommand() {
        Some(("tables", sub)) => handle_tables_command(&config, sub),
        Some(("proto", sub)) => handle_proto_command(&config, sub),
        Some(("render", sub)) => handle_render_command(&config, sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn load_config(matches: &ArgMatches) -> Result<RefdocConfig> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(root) = matches.get_one::<String>("root") {
        loader = loader.set_override("project.root", root.as_str())?;
    }
    loader.build().context("invalid configuration")
}

/// Write to `-o` when given, stdout otherwise.
fn emit(sub: &ArgMatches, content: &str) -> Result<()> {
    match sub.get_one::<String>("output") {
        Some(path) => {
            write_to_path(Path::new(path), content.as_bytes())?;
            tracing::info!(output = %path, "wrote reference");
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Handle the tables command
fn handle_tables_command(config: &RefdocConfig, sub: &ArgMatches) -> Result<()> {
    let headers: Vec<&String> = sub
        .get_many::<String>("input")
        .map(|values| values.collect())
        .unwrap_or_default();

    let result = parse_headers(&headers, &config.table_syntax())?;
    emit(sub, &tables_to_markdown(&result.tables))
}

/// Handle the proto command
fn handle_proto_command(config: &RefdocConfig, sub: &ArgMatches) -> Result<()> {
    let input = sub
        .get_one::<String>("input")
        .context("missing proto input")?;
    let root_type = sub.get_one::<String>("type").context("missing root type")?;

    let root = canonical(&config.project.root)?;
    let file = canonical(Path::new(input))?;
    let schema = load_proto(&root, &file)?;
    let markdown = generate_proto_reference(&schema, root_type)?;
    emit(sub, &markdown)
}

/// Handle the render command
fn handle_render_command(config: &RefdocConfig, sub: &ArgMatches) -> Result<()> {
    let out_dir = sub.get_one::<String>("odir").context("missing --odir")?;
    let output = sub.get_one::<String>("output").context("missing -o")?;

    let mut spec = PublishSpec::new(output, out_dir);
    if let Some(input) = sub.get_one::<String>("input") {
        spec = spec.with_input(input);
    }
    if let Some(template) = sub.get_one::<String>("template") {
        spec = spec.with_template(template);
    }

    let ctx = config.render_context(spec.input.clone().unwrap_or_default());
    publish(&spec, &ctx)?;
    Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("cannot resolve {}", path.display()))
}
