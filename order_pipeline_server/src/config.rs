use std::{env, time::Duration};

use log::*;
use omp_common::{parse_boolean_flag, parse_env_or, Secret};
use order_pipeline_engine::queue::BatchPolicy;

const DEFAULT_OMP_HOST: &str = "127.0.0.1";
const DEFAULT_OMP_PORT: u16 = 8360;
const DEFAULT_OMP_DATABASE_URL: &str = "sqlite://data/orders.db";
const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_BATCH_MAX_WAIT: Duration = Duration::from_secs(20);
const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// When true, the embedded migrations run at startup, before the workers start and the server binds.
    pub auto_migrate: bool,
    pub auth: AuthConfig,
    pub delivery: DeliveryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OMP_HOST.to_string(),
            port: DEFAULT_OMP_PORT,
            database_url: DEFAULT_OMP_DATABASE_URL.to_string(),
            auto_migrate: true,
            auth: AuthConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OMP_HOST").ok().unwrap_or_else(|| DEFAULT_OMP_HOST.into());
        let port = env::var("OMP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for OMP_PORT. {e} Using the default, {DEFAULT_OMP_PORT}, instead."
                    );
                    DEFAULT_OMP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OMP_PORT);
        let database_url = env::var("OMP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ OMP_DATABASE_URL is not set. Using the default, {DEFAULT_OMP_DATABASE_URL}.");
            DEFAULT_OMP_DATABASE_URL.to_string()
        });
        let auto_migrate = parse_boolean_flag(env::var("OMP_AUTO_MIGRATE").ok(), true);
        let auth = AuthConfig::try_from_env().unwrap_or_default();
        let delivery = DeliveryConfig::from_env_or_default();
        Self { host, port, database_url, auto_migrate, auth, delivery }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to verify JWT bearer tokens (HS256).
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued \
             elsewhere will not verify, and every restart invalidates all tokens. Set OMP_JWT_SECRET for anything \
             beyond a local experiment. 🚨️🚨️🚨️"
        );
        let secret = (0..32).map(|_| format!("{:02x}", rand::random::<u8>())).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, env::VarError> {
        let secret = env::var("OMP_JWT_SECRET")?;
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-------------------------------------------------  DeliveryConfig  ---------------------------------------------------
/// Batching and redelivery knobs for the in-process queues. These are shared by both consumers.
#[derive(Clone, Copy, Debug)]
pub struct DeliveryConfig {
    /// The most messages a consumer takes in a single batch.
    pub batch_size: usize,
    /// How long a consumer waits for a batch to fill before processing whatever has arrived.
    pub batch_max_wait: Duration,
    /// How long a received message stays invisible before an unacked copy is redelivered.
    pub visibility_timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_max_wait: DEFAULT_BATCH_MAX_WAIT,
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
        }
    }
}

impl DeliveryConfig {
    pub fn from_env_or_default() -> Self {
        let batch_size = parse_env_or("OMP_BATCH_SIZE", DEFAULT_BATCH_SIZE);
        let batch_max_wait =
            Duration::from_secs(parse_env_or("OMP_BATCH_MAX_WAIT_SECS", DEFAULT_BATCH_MAX_WAIT.as_secs()));
        let visibility_timeout =
            Duration::from_secs(parse_env_or("OMP_VISIBILITY_TIMEOUT_SECS", DEFAULT_VISIBILITY_TIMEOUT.as_secs()));
        info!(
            "🪛️ Delivery configuration: batches of up to {batch_size} messages, {}s max wait, {}s visibility timeout",
            batch_max_wait.as_secs(),
            visibility_timeout.as_secs()
        );
        Self { batch_size, batch_max_wait, visibility_timeout }
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy { max_messages: self.batch_size, max_wait: self.batch_max_wait }
    }
}
