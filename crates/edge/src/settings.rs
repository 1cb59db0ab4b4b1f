use std::path::{Path, PathBuf};
use tracing::info;

use domain::setting::Settings;

use crate::Error;

pub const SETTINGS_FILE: &str = "settings.toml";
pub const ENV_PREFIX: &str = "PLEDGEBOOK";

/// `<dir>/settings.toml` overlaid with `PLEDGEBOOK__SECTION__KEY`
/// environment variables. Every section has defaults, so a missing file
/// is not an error.
#[tracing::instrument(skip_all)]
pub fn load(dir: &Path) -> Result<Settings, Error> {
    load_with_env(dir, None)
}

/// Like [`load`], but reads overrides from `env` instead of the process
/// environment when given.
pub fn load_with_env(dir: &Path, env: Option<Vec<(String, String)>>) -> Result<Settings, Error> {
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "Settings directory does not exist: {}",
            dir.display()
        )));
    }

    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        info!("{} not found; using defaults", path.display());
    }

    let mut settings: Settings = config::Config::builder()
        .add_source(
            config::File::from(path.as_path())
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env.map(|pairs| pairs.into_iter().collect())),
        )
        .build()?
        .try_deserialize()?;

    settings.store.dir = resolve(dir, &settings.store.dir);
    Ok(settings)
}

fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
