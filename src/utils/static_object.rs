use std::env;
use std::sync::LazyLock;

use tracing::error;

/// Runtime environment, lowercased (`production`, `development`, ...)
pub static APP_ENV: LazyLock<String> = LazyLock::new(|| {
    env::var("APP_ENV")
        .unwrap_or_else(|_| {
            error!("Missing APP_ENV env var, using fallback 'development'");
            "development".to_string()
        })
        .to_ascii_lowercase()
});

pub static BIND_ADDRESS: LazyLock<String> = LazyLock::new(|| {
    env::var("BIND_ADDRESS").unwrap_or_else(|_| {
        error!("Missing BIND_ADDRESS env var, using fallback '0.0.0.0:8090'");
        "0.0.0.0:8090".to_string()
    })
});

/// Whether cookies issued by the service carry the `Secure` attribute
pub static SECURE_COOKIES: LazyLock<bool> = LazyLock::new(|| APP_ENV.as_str() == "production");
