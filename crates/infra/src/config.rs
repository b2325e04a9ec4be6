use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// How often the safety-net sweep for missed triggers runs
    pub sweep_interval_secs: u64,
    /// How far into the future startup reconciliation arms timers, in millis
    pub lookahead_window_millis: i64,
    /// Maximum number of notifications kept in the per-session cache
    pub notification_cache_limit: usize,
    /// Read notifications older than this many days are garbage collected
    pub retention_days: i64,
    pub push_webhook: Option<SinkEndpoint>,
    pub email_relay: Option<SinkEndpoint>,
}

/// A best-effort delivery endpoint registered by the client, authenticated
/// with a shared secret header.
#[derive(Debug, Clone)]
pub struct SinkEndpoint {
    pub url: String,
    pub key: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            sweep_interval_secs: env_number("COURIER_SWEEP_INTERVAL_SECS", 60),
            lookahead_window_millis: env_number("COURIER_LOOKAHEAD_MINUTES", 5_i64) * 60 * 1000,
            notification_cache_limit: env_number("COURIER_CACHE_LIMIT", 50),
            retention_days: env_number("COURIER_RETENTION_DAYS", 30),
            push_webhook: sink_endpoint("COURIER_PUSH_WEBHOOK_URL", "COURIER_PUSH_WEBHOOK_KEY"),
            email_relay: sink_endpoint("COURIER_EMAIL_RELAY_URL", "COURIER_EMAIL_RELAY_KEY"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_number<T>(var: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    var, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn sink_endpoint(url_var: &str, key_var: &str) -> Option<SinkEndpoint> {
    let url = std::env::var(url_var).ok()?;
    let key = match std::env::var(key_var) {
        Ok(key) => key,
        Err(_) => {
            warn!(
                "{} is set but {} is not, the endpoint will not be used.",
                url_var, key_var
            );
            return None;
        }
    };
    Some(SinkEndpoint { url, key })
}
