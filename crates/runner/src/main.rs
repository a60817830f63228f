use log::{error, info};
use tempo_runner::{RunnerConfig, RunnerError, Session};

fn print_help() {
    eprintln!(
        r#"Tempo Runner - trading-window strategy session

USAGE:
    tempo-runner --config <PATH>

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

CONSOLE (live mode):
    shutdown | get_flat | send_nothing | allow_sending [@<account>]

EXAMPLES:
    # Replay a synthetic session
    tempo-runner --config replay.json

    # Live session with debug logging
    RUST_LOG=debug tempo-runner --config live.json
"#
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(path) = config_path else {
        eprintln!("Error: --config is required");
        print_help();
        std::process::exit(1);
    };

    info!("Loading configuration from: {}", path);
    let session = match RunnerConfig::from_file(&path).map_err(RunnerError::from).and_then(Session::new) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    match session.run().await {
        Ok(report) => {
            info!("session complete: {}", report.summary);
        }
        Err(e) => {
            error!("session failed: {}", e);
            std::process::exit(1);
        }
    }
}
