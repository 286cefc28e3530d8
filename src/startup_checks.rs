use crate::Config;
use crate::store::StoreConfig;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create data directory: {0}")]
    DataDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Static files directory does not exist")]
    StaticDirectoryMissing,

    #[error("Templates directory does not exist")]
    TemplatesDirectoryMissing,

    #[error("Required template missing: {0}")]
    RequiredTemplateMissing(String),

    #[error("Admin access is not configured")]
    AdminNotConfigured,

    #[error("The session secret still has its default value")]
    DefaultSessionSecret,
}

impl StartupCheckError {
    /// Whether the server cannot usefully start with this problem.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::DataDirectoryCreationFailed(_)
                | StartupCheckError::TemplatesDirectoryMissing
        )
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    if let StoreConfig::JsonDir(dir_config) = &config.database {
        let data_dir = &dir_config.directory;
        if !data_dir.exists() {
            info!("Data directory does not exist, creating: {:?}", data_dir);
            if let Err(e) = tokio::fs::create_dir_all(data_dir).await {
                error!("Failed to create data directory: {}", e);
                errors.push(StartupCheckError::DataDirectoryCreationFailed(e));
            }
        } else {
            info!("Data directory exists: {:?}", data_dir);
        }
    }

    let reviews_dir = &config.reviews.source_directory;
    if reviews_dir.exists() {
        info!("Reviews directory exists: {:?}", reviews_dir);
    } else {
        warn!(
            "Reviews directory does not exist: {:?}; only database posts will be listed",
            reviews_dir
        );
    }

    if !config.static_files.directory.exists() {
        warn!(
            "Static files directory does not exist: {:?}",
            config.static_files.directory
        );
        errors.push(StartupCheckError::StaticDirectoryMissing);
    }

    let templates_dir = &config.templates.directory;
    if !templates_dir.exists() {
        error!("Templates directory does not exist: {:?}", templates_dir);
        errors.push(StartupCheckError::TemplatesDirectoryMissing);
    } else {
        info!("Templates directory exists: {:?}", templates_dir);
        for template in [
            &config.templates.index_template,
            &config.templates.category_template,
            &config.templates.article_template,
        ] {
            if !templates_dir.join(template).exists() {
                warn!("Template missing: {}", template);
                errors.push(StartupCheckError::RequiredTemplateMissing(template.clone()));
            }
        }
    }

    if config.admin.email.trim().is_empty() || config.admin.password_sha256.trim().is_empty() {
        warn!("No admin credentials configured; the editor API will reject every login");
        errors.push(StartupCheckError::AdminNotConfigured);
    } else if config.app.session_secret == Config::default().app.session_secret {
        warn!("Set [app] session_secret before exposing the admin API");
        errors.push(StartupCheckError::DefaultSessionSecret);
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonDirConfig;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.templates.directory = dir.join("templates");
        config.static_files.directory = dir.join("static");
        config.reviews.source_directory = dir.join("content");
        config.database = StoreConfig::JsonDir(JsonDirConfig {
            directory: dir.join("data"),
        });
        config.admin.email = "isa@example.com".to_string();
        config.admin.password_sha256 = crate::admin::hash_password("senha");
        config.app.session_secret = "s3cret".to_string();
        config
    }

    #[tokio::test]
    async fn test_complete_layout_passes_and_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        fs::create_dir_all(temp_dir.path().join("static")).unwrap();
        let pages = temp_dir.path().join("templates/pages");
        fs::create_dir_all(&pages).unwrap();
        for page in ["index", "category", "article"] {
            fs::write(pages.join(format!("{page}.html.liquid")), "").unwrap();
        }

        perform_startup_checks(&config).await.unwrap();
        assert!(temp_dir.path().join("data").is_dir());
    }

    #[tokio::test]
    async fn test_missing_templates_is_critical() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(temp_dir.path());
        config.admin.email.clear();

        let errors = perform_startup_checks(&config).await.unwrap_err();
        assert!(errors.iter().any(StartupCheckError::is_critical));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, StartupCheckError::AdminNotConfigured))
        );
    }
}
