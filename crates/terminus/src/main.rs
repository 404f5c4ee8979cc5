//! terminus - prints the facts of the local host.
//!
//! Runs one collection and writes the document to stdout, either whole as
//! JSON, as a single value selected by a dotted query, or through a template.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_os = "linux"))]
use terminus_core::collector::{MockFs, MockHost};
#[cfg(target_os = "linux")]
use terminus_core::collector::{RealFs, RealHost};
use terminus_core::config::{Config, DEFAULT_EXTERNAL_FACTS_DIR};
use terminus_core::{Collector, query, render};

/// Host facts collector.
#[derive(Parser)]
#[command(name = "terminus", about = "Collects and prints host facts", version = terminus_core::VERSION)]
struct Args {
    /// Dotted path of a single value to print (e.g. System.Hostname).
    query: Option<String>,

    /// Render the facts through this template instead of printing JSON.
    #[arg(long, conflicts_with_all = ["format_file", "query"])]
    format: Option<String>,

    /// Like --format, but read the template from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "query")]
    format_file: Option<PathBuf>,

    /// Directory scanned for external fact providers.
    #[arg(long, env = "TERMINUS_EXTERNAL_FACTS_DIR", default_value = DEFAULT_EXTERNAL_FACTS_DIR)]
    external_facts_dir: PathBuf,

    /// Query the EC2 instance metadata endpoint. Disable with --cloud=false.
    #[arg(long, env = "TERMINUS_CLOUD", default_value_t = true, action = clap::ArgAction::Set)]
    cloud: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Sends logs to stderr so stdout carries only the facts.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = Config::default()
        .with_external_facts_dir(&args.external_facts_dir)
        .with_cloud(args.cloud);
    debug!(version = terminus_core::VERSION, ?config, "starting collection");

    #[cfg(target_os = "linux")]
    let collector = Collector::new(RealFs::new(), RealHost::new(), config);
    #[cfg(not(target_os = "linux"))]
    let collector = Collector::new(
        MockFs::typical_system(),
        MockHost::typical_system(),
        config,
    );

    let doc = collector.collect().into_document();

    let output = if let Some(template) = &args.format {
        render::render_template(template, &doc)
    } else if let Some(path) = &args.format_file {
        render::render_template_file(path, &doc)
    } else if let Some(path) = &args.query {
        match query::extract(&doc, path) {
            Some(value) => Ok(query::display(value)),
            None => {
                debug!(query = %path, "no value at path");
                return;
            }
        }
    } else {
        render::to_json_pretty(&doc)
    };

    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            error!(error = %e, "cannot produce output");
            process::exit(1);
        }
    }
}
