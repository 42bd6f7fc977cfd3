#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = showroom::ViewerConfig::from_env();
    log::info!(
        "Starting showroom: {} deg/s, resume after {}s",
        config.auto_rotate.speed_degrees_per_second,
        config.auto_rotate.resume_delay
    );

    showroom::app::run(config).context(showroom::ui::ERROR_MESSAGE)
}

// The browser build starts through the exported `start()` instead
#[cfg(target_arch = "wasm32")]
fn main() {}
