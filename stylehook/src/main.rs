use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::{debug, info};

use stylehook::{
    inspect, reader, run, EventTarget, HookError, LiveStylesheet, PluginConfig, PluginRegistry,
    Stylesheet,
};

#[derive(Parser)]
#[command(name = "stylehook", version = "0.2.0")]
#[command(about = "Run event-driven CSS plugin rules")]
struct Cli {
    /// Log decoding and dispatch decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render plugin rules to plain CSS
    Render {
        /// Input stylesheets, scanned in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Plugin configuration (JSON templates)
        #[arg(long)]
        plugins: PathBuf,

        /// Emit an event after load, as `target:event` (repeatable)
        #[arg(long = "emit", value_name = "TARGET:EVENT")]
        emits: Vec<String>,

        /// Write output to file instead of stdout
        #[arg(short)]
        o: Option<PathBuf>,
    },

    /// Print every recognized plugin invocation as JSON
    Inspect {
        /// Input stylesheets
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Validate plugin arguments and event bindings without rendering
    Check {
        /// Input stylesheets
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only check invocations of configured plugins
        #[arg(long)]
        plugins: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            files,
            plugins,
            emits,
            o,
        } => {
            let registry = load_registry(&plugins);
            let events: Vec<(EventTarget, String)> = emits
                .iter()
                .map(|spec| match parse_emit(spec) {
                    Some(event) => event,
                    None => {
                        eprintln!("error: --emit expects TARGET:EVENT, got '{spec}'");
                        process::exit(2);
                    }
                })
                .collect();

            let sheets = read_all(&files);
            let mut live = LiveStylesheet::new();
            let registered = match run(&sheets, &registry, &mut live) {
                Ok(n) => n,
                Err(e) => {
                    print_scan_error(&e);
                    process::exit(1);
                }
            };
            info!("{registered} registration(s) from {} file(s)", files.len());

            for (target, event) in &events {
                let fired = live.emit(target, event);
                if fired == 0 {
                    eprintln!("warning: no producer listens for {event} on {target}");
                }
            }

            let css = live.css();
            if let Some(out_path) = o {
                match fs::write(&out_path, &css) {
                    Ok(()) => {
                        eprintln!("wrote CSS to {} ({} bytes)", out_path.display(), css.len());
                    }
                    Err(e) => {
                        eprintln!("error: cannot write '{}': {e}", out_path.display());
                        process::exit(1);
                    }
                }
            } else {
                println!("{css}");
            }
        }

        Commands::Inspect { files } => {
            let sheets = read_all(&files);
            let invocations = match inspect(&sheets) {
                Ok(i) => i,
                Err(e) => {
                    print_scan_error(&e);
                    process::exit(1);
                }
            };
            match serde_json::to_string_pretty(&invocations) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("error: cannot serialize invocations: {e}");
                    process::exit(1);
                }
            }
        }

        Commands::Check { files, plugins } => {
            let sheets = read_all(&files);
            let result = match plugins {
                Some(path) => {
                    let registry = load_registry(&path);
                    stylehook::scan(&sheets, &registry).map(|r| r.len())
                }
                None => inspect(&sheets).map(|i| i.len()),
            };

            match result {
                Ok(count) => eprintln!("{} file(s): ok, {count} plugin call(s)", files.len()),
                Err(e) => {
                    print_scan_error(&e);
                    process::exit(1);
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn load_registry(path: &Path) -> PluginRegistry {
    let registry = PluginConfig::load(path).and_then(|config| {
        debug!(
            "{}: {} rule and {} stylesheet plugin(s)",
            path.display(),
            config.rule.len(),
            config.stylesheet.len()
        );
        config
            .into_registry()
            .map_err(|e| e.in_origin(&path.display().to_string()))
    });
    match registry {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Read and parse every file, exiting on the first failure.
fn read_all(files: &[PathBuf]) -> Vec<Stylesheet> {
    files
        .iter()
        .map(|file| {
            let source = match fs::read_to_string(file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: cannot read '{}': {e}", file.display());
                    process::exit(1);
                }
            };
            match reader::read_stylesheet(&source) {
                Ok(sheet) => sheet.with_href(&file.display().to_string()),
                Err(e) => {
                    print_error(&e.in_origin(&file.display().to_string()), &source);
                    process::exit(1);
                }
            }
        })
        .collect()
}

/// `window:resize`, `.menu button:click`. The event is everything after the last colon.
fn parse_emit(spec: &str) -> Option<(EventTarget, String)> {
    let (target, event) = spec.rsplit_once(':')?;
    let (target, event) = (target.trim(), event.trim());
    if target.is_empty() || event.is_empty() {
        return None;
    }
    Some((EventTarget::parse(target), event.to_string()))
}

/// Scan errors carry the failing rule text as context; spans point into the argument
/// text, not the file, so no caret is drawn.
fn print_scan_error(e: &HookError) {
    eprintln!("error: {e}");
}

fn print_error(e: &HookError, source: &str) {
    eprintln!("error: {e}");

    if let Some(span) = &e.span {
        if span.start <= source.len() {
            let line_num = source[..span.start].chars().filter(|c| *c == '\n').count() + 1;
            let line_start = source[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
            let line_end = source[span.start..]
                .find('\n')
                .map(|i| span.start + i)
                .unwrap_or(source.len());
            let line = &source[line_start..line_end];
            let col = span.start - line_start;

            eprintln!();
            eprintln!("  {line_num} | {line}");
            eprintln!(
                "  {} | {}^",
                " ".repeat(line_num.to_string().len()),
                " ".repeat(col)
            );
        }
    }
}
