use std::env;

use crate::{Error, Result};

/// Upper bound for `JWT_MAXAGE`: one year, in minutes.
const MAX_JWT_MAXAGE: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in minutes.
    pub jwt_maxage: i64,
    pub port: u16,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn init() -> Result<Config> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| Error::Config("JWT_SECRET must be set".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(Error::Config("JWT_SECRET cannot be empty".to_string()));
        }

        let jwt_maxage = checked_maxage(parse_or("JWT_MAXAGE", 60)?)?;
        let port = parse_or("PORT", 8080)?;
        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty());

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_maxage,
            port,
            cors_origin,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn checked_maxage(minutes: i64) -> Result<i64> {
    if (1..=MAX_JWT_MAXAGE).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(Error::Config(format!(
            "JWT_MAXAGE must be between 1 and {MAX_JWT_MAXAGE} minutes, got {minutes}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lifetime_must_be_positive_and_bounded() {
        assert_eq!(checked_maxage(60).unwrap(), 60);
        assert_eq!(checked_maxage(MAX_JWT_MAXAGE).unwrap(), MAX_JWT_MAXAGE);

        for minutes in [0, -5, MAX_JWT_MAXAGE + 1, i64::MAX, i64::MIN] {
            assert!(
                matches!(checked_maxage(minutes), Err(Error::Config(_))),
                "{minutes}"
            );
        }
    }
}
