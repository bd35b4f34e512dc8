//! Process configuration loaded via OrthoConfig.
//!
//! Values come from the command line, `BOOKHUB_*` environment variables and
//! configuration files, in that order of precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use pagination::{DEFAULT_MAX_PAGE_SIZE, PageLimits, PaginationError};
use serde::Deserialize;
use thiserror::Error;

use crate::outbound::persistence::DEFAULT_MAX_SIZE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings that cannot be turned into runtime values.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid max page size: {0}")]
    PageSize(#[from] PaginationError),
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKHUB")]
pub struct BookhubSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Largest accepted `page_size` query parameter.
    pub max_page_size: Option<u32>,
    /// Skip applying embedded migrations at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl BookhubSettings {
    /// Resolved listen address.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the configured value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Connection pool ceiling.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_MAX_SIZE)
    }

    /// Pagination limits applied by list endpoints.
    ///
    /// # Errors
    /// Returns [`SettingsError::PageSize`] when the configured maximum is zero.
    pub fn page_limits(&self) -> Result<PageLimits, SettingsError> {
        Ok(PageLimits::new(
            self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE),
        )?)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "BOOKHUB_BIND_ADDR",
        "BOOKHUB_DATABASE_URL",
        "BOOKHUB_POOL_MAX_SIZE",
        "BOOKHUB_MAX_PAGE_SIZE",
        "BOOKHUB_SKIP_MIGRATIONS",
    ];

    fn load_from_empty_args() -> BookhubSettings {
        BookhubSettings::load_from_iter([OsString::from("bookhub")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_max_size(), DEFAULT_MAX_SIZE);
        assert_eq!(
            settings.page_limits().expect("limits").max_page_size(),
            DEFAULT_MAX_PAGE_SIZE
        );
        assert!(!settings.skip_migrations);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BOOKHUB_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "BOOKHUB_DATABASE_URL",
                Some("postgres://localhost/bookhub".to_owned()),
            ),
            ("BOOKHUB_POOL_MAX_SIZE", Some("4".to_owned())),
            ("BOOKHUB_MAX_PAGE_SIZE", Some("25".to_owned())),
            ("BOOKHUB_SKIP_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").port(),
            9000
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/bookhub")
        );
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.page_limits().expect("limits").max_page_size(), 25);
        assert!(settings.skip_migrations);
    }

    fn explicit(bind_addr: Option<&str>, max_page_size: Option<u32>) -> BookhubSettings {
        BookhubSettings {
            bind_addr: bind_addr.map(str::to_owned),
            database_url: Some("  ".to_owned()),
            pool_max_size: None,
            max_page_size,
            skip_migrations: false,
        }
    }

    #[rstest]
    fn blank_database_url_is_ignored() {
        assert!(explicit(None, None).database_url().is_none());
    }

    #[rstest]
    fn unparsable_bind_addr_is_rejected() {
        let err = explicit(Some("not-an-address"), None)
            .bind_addr()
            .expect_err("address must fail");
        assert!(matches!(err, SettingsError::BindAddr { .. }));
    }

    #[rstest]
    fn zero_max_page_size_is_rejected() {
        let err = explicit(None, Some(0))
            .page_limits()
            .expect_err("limits must fail");
        assert!(matches!(
            err,
            SettingsError::PageSize(PaginationError::ZeroMaxPageSize)
        ));
    }
}
