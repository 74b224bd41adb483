use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use lectern_application::OperatorAllowList;
use lectern_core::AppError;
use tracing_subscriber::EnvFilter;

/// What the binary should do after loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Seed,
}

impl ApiCommand {
    fn from_argument(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'seed'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub operator_emails: OperatorAllowList,
    pub session_max_age_days: i64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::from_argument(env::args().nth(1).as_deref())?;

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty_env("AUTH_BOOTSTRAP_TOKEN")?;

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let operator_emails =
            OperatorAllowList::parse(env::var("OPERATOR_EMAILS").unwrap_or_default().as_str());
        let session_max_age_days = parse_max_age_days(env::var("SESSION_MAX_AGE_DAYS").ok())?;

        Ok(Self {
            command,
            database_url,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            operator_emails,
            session_max_age_days,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_max_age_days(value: Option<String>) -> Result<i64, AppError> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        return Ok(7);
    };

    match value.trim().parse::<i64>() {
        Ok(days) if days > 0 => Ok(days),
        Ok(_) => Err(AppError::Validation(
            "SESSION_MAX_AGE_DAYS must be positive".to_owned(),
        )),
        Err(error) => Err(AppError::Validation(format!(
            "invalid SESSION_MAX_AGE_DAYS: {error}"
        ))),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use lectern_application::OperatorAllowList;
    use lectern_core::AppError;

    use super::{ApiCommand, ApiConfig, parse_max_age_days};

    #[test]
    fn command_argument_selects_mode() {
        assert!(matches!(ApiCommand::from_argument(None), Ok(ApiCommand::Serve)));
        assert!(matches!(
            ApiCommand::from_argument(Some("migrate")),
            Ok(ApiCommand::Migrate)
        ));
        assert!(matches!(
            ApiCommand::from_argument(Some("seed")),
            Ok(ApiCommand::Seed)
        ));
        assert!(matches!(
            ApiCommand::from_argument(Some("drop")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn session_max_age_defaults_to_a_week() {
        assert!(matches!(parse_max_age_days(None), Ok(7)));
        assert!(matches!(parse_max_age_days(Some(" ".to_owned())), Ok(7)));
        assert!(matches!(parse_max_age_days(Some("30".to_owned())), Ok(30)));
        assert!(parse_max_age_days(Some("0".to_owned())).is_err());
        assert!(parse_max_age_days(Some("week".to_owned())).is_err());
    }

    #[test]
    fn socket_address_requires_ip_host() {
        let mut config = ApiConfig {
            command: ApiCommand::Serve,
            database_url: "postgres://localhost/lectern".to_owned(),
            frontend_url: "http://localhost:3000".to_owned(),
            bootstrap_token: "token".to_owned(),
            api_host: "0.0.0.0".to_owned(),
            api_port: 4000,
            cookie_secure: false,
            operator_emails: OperatorAllowList::default(),
            session_max_age_days: 7,
        };

        assert!(config
            .socket_address()
            .is_ok_and(|address| address.port() == 4000));

        config.api_host = "localhost".to_owned();
        assert!(config.socket_address().is_err());
    }
}
