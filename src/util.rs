use {
    anyhow::Result,
    ron::ser::{
        to_string_pretty,
        PrettyConfig,
    },
    serde::Serialize,
    std::{
        fs,
        path::PathBuf,
    },
};

/// Write a config struct as pretty-printed RON.
pub fn write_config<C: Serialize>(
    config: &C,
    path: PathBuf,
) -> Result<()> {
    fs::write(path, to_string_pretty(config, PrettyConfig::default())?)?;
    Ok(())
}
