use std::net::IpAddr;

/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub token_ttl_hours: i64,
    pub max_body_size: usize,
    pub cors_origin: Option<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("LEAVEDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LEAVEDESK_HOST: {e}"))?;

        let port: u16 = env_or("LEAVEDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LEAVEDESK_PORT: {e}"))?;

        let token_ttl_hours = parse_token_ttl(&env_or("LEAVEDESK_TOKEN_TTL_HOURS", "24"))?;

        let max_body_size: usize = env_or("LEAVEDESK_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid LEAVEDESK_MAX_BODY_SIZE: {e}"))?;

        let cors_origin = std::env::var("LEAVEDESK_CORS_ORIGIN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let log_level = env_or("LEAVEDESK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            token_ttl_hours,
            max_body_size,
            cors_origin,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_token_ttl(raw: &str) -> Result<i64, String> {
    let hours: i64 = raw
        .parse()
        .map_err(|e| format!("Invalid LEAVEDESK_TOKEN_TTL_HOURS: {e}"))?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(format!(
            "LEAVEDESK_TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}"
        ));
    }
    Ok(hours)
}
