use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    analysis::{CannedAnalyzer, ImageAnalyzer, ImageStore},
    auth::{AuthService, SessionSigner},
    config::Config,
    control::CommandQueue,
    sensors::TelemetryService,
    store::Store,
};

/// Everything a request handler may need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub auth: AuthService,
    pub sessions: SessionSigner,
    pub commands: CommandQueue,
    pub telemetry: TelemetryService,
    pub images: ImageStore,
    pub analyzer: Arc<dyn ImageAnalyzer>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        Self::with_analyzer(config, pool, Arc::new(CannedAnalyzer))
    }

    pub fn with_analyzer(config: Config, pool: PgPool, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        let store = Store::new(pool);
        Self {
            sessions: SessionSigner::new(&config.session_secret),
            images: ImageStore::new(config.upload_dir.clone()),
            auth: AuthService::new(store.clone()),
            commands: CommandQueue::new(store.clone()),
            telemetry: TelemetryService::new(store.clone()),
            analyzer,
            store,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::{
        auth::{SessionUser, SESSION_COOKIE},
        db::models::{Role, User},
        i18n::Locale,
    };

    pub const TEST_API_KEY: &str = "test-device-key";
    pub const TEST_DEBUG_PIN: &str = "2468";

    pub fn test_config() -> Config {
        Config {
            database_url: String::new(),
            db_max_connections: 1,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            session_secret: "test-session-secret".into(),
            api_key: TEST_API_KEY.into(),
            debug_pin: TEST_DEBUG_PIN.into(),
            third_party_api_key: None,
            upload_dir: std::env::temp_dir().join(format!("greenhouse-test-{}", uuid::Uuid::new_v4())),
            default_locale: Locale::En,
        }
    }

    pub fn test_state(pool: PgPool) -> AppState {
        AppState::new(test_config(), pool)
    }

    pub async fn user(state: &AppState, username: &str, role: Role) -> User {
        state.auth.register(username, "pw", role).await.unwrap()
    }

    /// `Cookie` header value logging `user` in.
    pub fn session_cookie(state: &AppState, user: &User) -> String {
        let value = state.sessions.encode(&SessionUser::from(user)).unwrap();
        format!("{SESSION_COOKIE}={value}")
    }
}
