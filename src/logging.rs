use crate::config::Config;
use anyhow::Context;
use std::fs::File;

pub fn init(cfg: &Config) -> anyhow::Result<()> {
    let default_filter = if cfg.log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = cfg.log_file.as_deref() {
        let file = File::create(path)
            .with_context(|| format!("create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("install logger")?;
    Ok(())
}
