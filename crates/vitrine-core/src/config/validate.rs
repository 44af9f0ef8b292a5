//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.chunk_size_kb == 0 {
            return Err(ConfigError::ValidationError(
                "storage.chunk_size_kb must be > 0".into(),
            ));
        }
        if self.variants.thumbnail.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "variants.thumbnail.max_width must be > 0".into(),
            ));
        }
        if self.variants.full.max_width < self.variants.thumbnail.max_width {
            return Err(ConfigError::ValidationError(
                "variants.full.max_width must be >= variants.thumbnail.max_width".into(),
            ));
        }
        if self.variants.placeholder.width == 0
            || self.variants.placeholder.width >= self.variants.thumbnail.max_width
        {
            return Err(ConfigError::ValidationError(
                "variants.placeholder.width must be > 0 and < variants.thumbnail.max_width".into(),
            ));
        }
        for (name, quality) in [
            ("variants.thumbnail.quality", self.variants.thumbnail.quality),
            ("variants.full.quality", self.variants.full.quality),
            ("variants.placeholder.quality", self.variants.placeholder.quality),
        ] {
            if quality == 0 || quality > 100 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 1 and 100"
                )));
            }
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.storage.chunk_size_kb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chunk_size_kb"));
    }

    #[test]
    fn test_validate_rejects_inverted_widths() {
        let mut config = Config::default();
        config.variants.full.max_width = 400;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("full.max_width"));
    }

    #[test]
    fn test_validate_rejects_oversized_placeholder() {
        let mut config = Config::default();
        config.variants.placeholder.width = 600;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("placeholder.width"));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut config = Config::default();
        config.variants.full.quality = 0;
        assert!(config.validate().is_err());

        config.variants.full.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_formats() {
        let mut config = Config::default();
        config.processing.supported_formats.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("supported_formats"));
    }
}
