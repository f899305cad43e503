use clap::{CommandFactory, Parser};
use tracing_subscriber::filter::LevelFilter;

use check_jmx::cli::{normalize_legacy_args, Cli};
use check_jmx::config_generator::print_icinga_command_config_if_env_and_exit;
use check_jmx::{CommandRunner, JolokiaProvider};

fn main() {
    // The env var GENERATE_ICINGA_COMMAND has to be set to generate the Icinga command configuration
    if let Err(e) = print_icinga_command_config_if_env_and_exit("jmx", &Cli::command()) {
        eprintln!("failed to generate the icinga command: {}", e);
    }

    let args = normalize_legacy_args(std::env::args_os());
    let verbosity = Cli::try_parse_from(&args).map(|cli| cli.verbose).unwrap_or(0);
    init_logging(verbosity);

    let status = CommandRunner::new(JolokiaProvider::new(), std::io::stdout()).run_command(args);
    std::process::exit(status);
}

/// Logs go to stderr so the status line stays alone on stdout.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
