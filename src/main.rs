use clap::Parser;
use hubadmin::cli::args::{Cli, Commands, ConfigCommands};
use hubadmin::cli::commands::execute_command;
use hubadmin::cli::output;
use hubadmin::config::Settings;
use hubadmin::exitcode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version are not errors
            let code = if e.use_stderr() {
                exitcode::USAGE
            } else {
                exitcode::OK
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    setup_logging(cli.debug);

    // `config init` creates the file --config points at
    let loaded = match &cli.command {
        Commands::Config {
            command: ConfigCommands::Init { .. },
        } => Ok(Settings::default()),
        _ => Settings::load(cli.config.as_deref()),
    };
    let settings = match loaded {
        Ok(settings) => settings.with_repo(cli.repo.as_deref()),
        Err(e) => {
            output::error(&e);
            std::process::exit(exitcode::CONFIG);
        }
    };
    tracing::debug!(repo = %settings.repo_id, "settings loaded");

    if let Err(e) = execute_command(&cli, settings) {
        output::error(&error_chain(&e));
        std::process::exit(e.exit_code());
    }
}

/// Error message followed by each distinct underlying cause.
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(&format!(": {text}"));
        }
        source = cause.source();
    }
    msg
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
