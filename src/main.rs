/*!
 * `distcp` CLI front-end: argument parsing, config loading, logging init, and
 * wiring a `LocalFs` through `copy::copy`. Grounded on `pydistcp`'s
 * `__main__.py` docopt usage (spec 14) for flag names and the unconditional
 * exit-0 convention.
 */

use std::sync::Arc;

use clap::{Arg, ArgAction, Command};

use distcp::cli_progress::{ChannelProgressSink, CliProgressRenderer};
use distcp::config::ConfigFile;
use distcp::{logging, CopyConfig, RemoteFS, TransferOptions};

fn cli() -> Command {
    Command::new("distcp")
        .version(distcp::VERSION)
        .about("Concurrent copy planner and transfer orchestrator for WebHDFS-compatible remote file systems")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("PATTERN")
                .help("Source path or glob pattern")
                .required(true),
        )
        .arg(
            Arg::new("destination")
                .short('d')
                .long("destination")
                .value_name("PATH")
                .help("Destination path")
                .required(true),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite existing destination entries")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-checksum")
                .long("no-checksum")
                .help("Skip the checksum comparison and always overwrite when --force is set")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("preserve")
                .short('p')
                .long("preserve")
                .help("Preserve owner, group, permission, times, and replication on copied files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .help("Worker count; omit or <= 0 for one worker per file")
                .default_value("0"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .value_name("BYTES")
                .help("Streaming chunk size in bytes")
                .default_value("65536"),
        )
        .arg(
            Arg::new("silent")
                .long("silent")
                .help("Suppress the progress line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit debug-level logging")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> std::process::ExitCode {
    let matches = cli().get_matches();

    let mut config = CopyConfig::default();
    ConfigFile::load_with_fallback().apply_to(&mut config);

    if matches.get_flag("force") {
        config.overwrite = true;
    }
    if matches.get_flag("no-checksum") {
        config.checksum = false;
    }
    if matches.get_flag("preserve") {
        config.preserve = true;
    }
    if matches.get_flag("verbose") {
        config.verbose = true;
    }
    if let Some(threads) = matches.get_one::<String>("threads").and_then(|s| s.parse::<i64>().ok()) {
        config.threads = threads;
    }
    if let Some(chunk_size) = matches.get_one::<String>("chunk-size").and_then(|s| s.parse::<usize>().ok()) {
        config.chunk_size = chunk_size;
    }

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("failed to initialize logging: {e}");
        return std::process::ExitCode::FAILURE;
    }

    let source = matches.get_one::<String>("source").unwrap();
    let destination = matches.get_one::<String>("destination").unwrap();
    let silent = matches.get_flag("silent");

    let fs = distcp::system::LocalFs::new();
    let opts: TransferOptions = (&config).into();

    let summary = if silent {
        distcp::copy(&fs, source, destination, &opts, None, None)
    } else {
        run_with_progress(&fs, source, destination, &opts, config.verbose)
    };

    match summary {
        Ok(summary) => {
            // Per the exit-0 convention: per-tuple failures are visible only
            // in the printed Summary, never in the process exit code.
            println!("{}", serde_json::to_string_pretty(&summary).unwrap());
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("distcp: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run_with_progress(
    fs: &dyn RemoteFS,
    source: &str,
    destination: &str,
    opts: &TransferOptions,
    verbose: bool,
) -> distcp::Result<distcp::Summary> {
    let resolved = fs.glob(source)?;
    let total_bytes: u64 = resolved
        .iter()
        .filter_map(|p| fs.content(p).ok())
        .map(|c| c.length)
        .sum();

    let (sink, receiver) = ChannelProgressSink::new(256);
    let renderer = CliProgressRenderer::new(receiver, total_bytes, verbose);
    let handle = renderer.spawn();

    let sink: Arc<dyn distcp::ProgressSink> = Arc::new(sink);
    let result = distcp::copy(fs, source, destination, opts, Some(sink.as_ref()), None);

    drop(sink);
    let _ = handle.join();

    result
}
