use std::process::ExitCode;

use tokio::runtime::Runtime;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sgit::cli::commands::passthrough;
use sgit::cli::ui::{ConsoleTerminal, Output};
use sgit::cli::{Route, Session, app, dispatch};
use sgit::config::{Config, ConfigLoader};
use sgit::git::GitCli;

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31msgit encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mPlease report this issue at:\x1b[0m");
        eprintln!("  https://github.com/junyeong-ai/sgit/issues");
        eprintln!();

        // backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SGIT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<u8> {
    let invocation = match app::parse(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };
    init_tracing(invocation.globals.debug);

    let output = Output::new();
    let vcs = GitCli::new();

    // raw forwarding needs neither config nor a runtime
    if let Route::Git(argv) = &invocation.route {
        let outcome = passthrough::run(&vcs, argv)?;
        return Ok(exit_byte(outcome.exit_code));
    }

    // a broken config only fails the commands that read it
    let loader = ConfigLoader::new(invocation.globals.config.clone());
    let (config, load_error) = match loader.load() {
        Ok(config) => (config, None),
        Err(e) => {
            debug!("Config load failed, using defaults: {}", e);
            (Config::default(), Some(e))
        }
    };
    let mut session = Session::new(
        config,
        loader,
        invocation.globals.lang.as_deref(),
        Box::new(vcs),
        Box::new(ConsoleTerminal::new()),
        output.clone(),
    );
    if let Some(e) = load_error {
        session = session.with_config_error(e);
    }

    let rt = Runtime::new()?;
    match rt.block_on(dispatch(&mut session, invocation.route)) {
        Ok(outcome) => Ok(exit_byte(outcome.exit_code)),
        Err(e) if e.is_cancelled() => {
            output.blank();
            output.warning("Operation cancelled");
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Exit codes outside 0..=255 (signals) become a generic failure
fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
