use crate::analytics::insights::AnalysisOptions;
use crate::analytics::keywords::DEFAULT_KEYWORD_LIMIT;
use crate::analytics::sentiment::MatchMode;
use crate::domain::quiz::QuizKey;
use crate::domain::submission::SubmissionLimits;
use argon2::password_hash::PasswordHash;
use base64::{engine::general_purpose, Engine as _};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_SESSION_KEY_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} missing")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub session_key: Vec<u8>,
    pub admin_password_hash: String,
    pub public_base_url: String,
    pub static_dir: String,
    pub limits: SubmissionLimits,
    pub analysis: AnalysisOptions,
    pub quiz_key: Option<QuizKey>,
    pub submit_rate_limit: usize,
    /// Key rate limits on `X-Forwarded-For` instead of the socket peer.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_proxy_headers: bool,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| {
            let port = get("PORT").unwrap_or_else(|| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        let session_key_b64 = get("SESSION_KEY").ok_or(ConfigError::Missing("SESSION_KEY"))?;
        let session_key = general_purpose::STANDARD
            .decode(session_key_b64)
            .map_err(|e| ConfigError::Invalid {
                key: "SESSION_KEY",
                reason: format!("must be base64: {e}"),
            })?;
        if session_key.len() < MIN_SESSION_KEY_BYTES {
            return Err(ConfigError::Invalid {
                key: "SESSION_KEY",
                reason: format!("must decode to at least {MIN_SESSION_KEY_BYTES} bytes"),
            });
        }

        let admin_password_hash =
            get("ADMIN_PASSWORD_HASH").ok_or(ConfigError::Missing("ADMIN_PASSWORD_HASH"))?;
        PasswordHash::new(&admin_password_hash).map_err(|e| ConfigError::Invalid {
            key: "ADMIN_PASSWORD_HASH",
            reason: e.to_string(),
        })?;

        let quiz_key = get("QUIZ_ANSWER_KEY")
            .map(|raw| -> Result<QuizKey, ConfigError> {
                let key = raw.parse::<QuizKey>().map_err(|e| ConfigError::Invalid {
                    key: "QUIZ_ANSWER_KEY",
                    reason: e.to_string(),
                })?;
                if key.is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "QUIZ_ANSWER_KEY",
                        reason: "must list at least one answer".to_string(),
                    });
                }
                Ok(key)
            })
            .transpose()?;

        let keyword_limit: usize = parse_or(&get, "KEYWORD_LIMIT", DEFAULT_KEYWORD_LIMIT)?;
        if keyword_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "KEYWORD_LIMIT",
                reason: "must be at least 1".to_string(),
            });
        }

        let defaults = SubmissionLimits::default();
        let limits = SubmissionLimits {
            max_suggestions: at_least_one(
                "MAX_SUGGESTIONS",
                parse_or(&get, "MAX_SUGGESTIONS", defaults.max_suggestions)?,
            )?,
            max_feedback: at_least_one(
                "MAX_FEEDBACK",
                parse_or(&get, "MAX_FEEDBACK", defaults.max_feedback)?,
            )?,
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            session_key,
            admin_password_hash,
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            limits,
            analysis: AnalysisOptions {
                match_mode: parse_or(&get, "SENTIMENT_MATCH", MatchMode::Substring)?,
                keyword_limit,
            },
            quiz_key,
            submit_rate_limit: parse_or(&get, "SUBMIT_RATE_LIMIT", 10)?,
            trust_proxy_headers: parse_or(&get, "TRUST_PROXY_HEADERS", false)?,
            secure_cookies: ["PRODUCTION", "RAILWAY_ENVIRONMENT", "RENDER", "FLY_APP_NAME"]
                .into_iter()
                .any(|key| get(key).is_some()),
        })
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submit", self.public_base_url)
    }
}

fn at_least_one(key: &'static str, value: i64) -> Result<i64, ConfigError> {
    if value < 1 {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("must be at least 1, got {value}"),
        });
    }
    Ok(value)
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            tracing::debug!("{key} not set, using default");
            Ok(default)
        }
    }
}
