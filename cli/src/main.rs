use clap::Parser;
use finnctl_cli::app;
use finnctl_cli::commands::cli;
use finnctl_core::api::{ActionError, AppContext, CliError, ExecutorError, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let mut args = cli::Args::parse();
    let cfg = finnctl_core::api::load_default(args.config.as_deref())?;
    init_tracing(&cfg.logging).map_err(CliError::Command)?;
    tracing::debug!(
        config = ?args.config,
        environment = %cfg.general.used_environment,
        dev_mode = cfg.general.dev_mode,
        "config loaded"
    );

    let ctx = AppContext::new(cfg)?;
    tracing::debug!(workdir = %ctx.workdir().display(), "context ready");

    match args.command.take() {
        Some(cli::Commands::Run(run_args)) => app::run_tasks(&args, run_args, &ctx).await,
        Some(cli::Commands::List) => app::list_tasks(&ctx),
        None => app::run_tasks(&args, cli::RunArgs::default(), &ctx).await,
    }
}

fn report_error(e: &CliError) {
    eprintln!("error: {e}");
    if let CliError::Executor(ExecutorError::TaskFailed {
        source: ActionError::ExternalProcess { stderr_tail, .. },
        ..
    }) = e
    {
        if !stderr_tail.is_empty() {
            eprintln!("--- stderr (tail) ---\n{stderr_tail}");
        }
    }
    if let CliError::Executor(ExecutorError::TaskFailed {
        source: ActionError::UpstreamNotReady { .. },
        ..
    }) = e
    {
        eprintln!("hint: run the compilation stage for this project first");
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("finnctl"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("finnctl.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
