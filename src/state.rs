use crate::analytics::insights::AnalysisOptions;
use crate::config::Config;
use crate::db::SubmissionStore;
use crate::domain::quiz::QuizKey;
use crate::domain::submission::SubmissionLimits;
use crate::middleware::{ClientKeySource, RateLimiter};
use crate::services::change_feed::ChangeFeed;
use std::sync::Arc;
use std::time::Duration;

const LOGIN_ATTEMPTS_PER_MINUTE: usize = 5;
const LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    pub session_key: Vec<u8>,
    pub admin_password_hash: String,
    pub limits: SubmissionLimits,
    pub analysis: AnalysisOptions,
    pub quiz_key: Option<QuizKey>,
    pub submit_url: String,
    pub secure_cookies: bool,
    pub change_feed: ChangeFeed,
    pub submit_limiter: RateLimiter,
    pub login_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn SubmissionStore>) -> Self {
        let key_source = ClientKeySource::from_trust(config.trust_proxy_headers);
        Self {
            store,
            session_key: config.session_key.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            limits: config.limits,
            analysis: config.analysis,
            quiz_key: config.quiz_key.clone(),
            submit_url: config.submit_url(),
            secure_cookies: config.secure_cookies,
            change_feed: ChangeFeed::default(),
            submit_limiter: RateLimiter::new(config.submit_rate_limit, LIMIT_WINDOW, key_source),
            login_limiter: RateLimiter::new(LOGIN_ATTEMPTS_PER_MINUTE, LIMIT_WINDOW, key_source),
        }
    }
}

pub type SharedState = Arc<AppState>;
