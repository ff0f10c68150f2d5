use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = dotwave::config::Config::parse();
    dotwave::logging::init(&cfg)?;
    if cfg.list_devices {
        dotwave::audio::list_input_devices()?;
        return Ok(());
    }

    dotwave::app::run(cfg)
}
