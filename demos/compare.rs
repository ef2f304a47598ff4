//! Interactive comparison of the four shadow algorithms.
//!
//! Keys `1`–`4` switch between PCF, VSM, PSVSM and SATVSM; see
//! `shadow_lab::app::controls` for the remaining bindings.

use shadow_lab::{App, RenderSettings};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    App::new()
        .with_title("Shadow Lab")
        .with_settings(RenderSettings::default())
        .run()?;
    Ok(())
}
