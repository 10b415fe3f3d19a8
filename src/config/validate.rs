// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DagschedError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DagschedError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.search, raw.output))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.search.workers == 0 {
        return Err(DagschedError::Config(
            "[search].workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.search.memoize && cfg.search.memo_capacity == 0 {
        return Err(DagschedError::Config(
            "[search].memo_capacity must be >= 1 when memoize = true".to_string(),
        ));
    }

    Ok(())
}
