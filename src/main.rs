use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod control;
mod detection;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, LoggingConfig};
use control::{ControlSurface, StatusBoard};
use services::{create_hotkey_listener, run_status_display, ConsoleStatusSurface, VirtualDevice};

#[derive(Parser, Debug)]
#[command(name = "lane-macro")]
#[command(about = "Нажимает клавиши дорожек при изменении яркости в заданных зонах экрана")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "lanes.toml")]
    config: String,

    /// Режим сухого запуска (синтетические кадры, без реальных нажатий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает logging.level)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
        config.validate()?;
    }
    let config = Arc::new(config);

    init_tracing(&config.logging)?;

    info!("Запуск lane-macro v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {} ({} дорожек)", args.config, config.lanes.len());

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    } else {
        utils::permissions::check_permissions()?;
    }

    let control = Arc::new(ControlSurface::new());
    let status = Arc::new(StatusBoard::new());
    let virtual_device = Arc::new(VirtualDevice::new("Lane Macro Virtual Keyboard", args.dry_run)?);

    let hotkey_listener = create_hotkey_listener(config.clone(), control.clone(), args.dry_run)?;
    let detection_handle = detection::spawn_detection_loop(
        config.clone(),
        control.clone(),
        status.clone(),
        virtual_device.clone(),
        args.dry_run,
    )?;

    info!("Все компоненты инициализированы");

    let hotkey_handle = tokio::spawn(async move {
        if let Err(e) = hotkey_listener.run().await {
            error!("Ошибка в HotkeyListener: {}", e);
        }
    });
    let display_handle = tokio::spawn(run_status_display(
        status.clone(),
        ConsoleStatusSurface::new(),
        config.refresh_interval(),
        config.input.toggle_key.clone(),
    ));

    info!("Нажмите '{}' для запуска/паузы, Ctrl+C для выхода", config.input.toggle_key);

    match signal::ctrl_c().await {
        Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
        Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
    }

    info!("Завершение работы...");

    // Цикл детекции сам отпускает удержанные клавиши перед выходом
    control.request_shutdown();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let join = tokio::task::spawn_blocking(move || detection_handle.join());
    match tokio::time::timeout(shutdown_timeout, join).await {
        Ok(Ok(Ok(()))) => info!("Цикл детекции завершил работу корректно"),
        Ok(Ok(Err(_))) => error!("Поток детекции завершился с паникой"),
        Ok(Err(e)) => error!("Не удалось дождаться потока детекции: {}", e),
        Err(_) => warn!("Таймаут при завершении цикла детекции"),
    }

    // Дополнительно гарантируем отсутствие залипших клавиш
    if let Err(e) = virtual_device.release_all_keys() {
        warn!("Не удалось выполнить release_all_keys: {}", e);
    }

    hotkey_handle.abort();
    display_handle.abort();

    info!("lane-macro завершил работу");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}
