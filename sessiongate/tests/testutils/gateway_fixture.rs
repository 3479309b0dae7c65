//! Gateway fixture over an in-memory config store and the mock backend
//!
//! Token rows are read as milliseconds instead of minutes (through the
//! registry's extension point) so expiry can be observed in tests.

use super::mock_backend::{MockAuthenticator, MockConnector};
use sessiongate::config::entry::{
    CATEGORY_CONNECTION, CATEGORY_NODES, CATEGORY_TOKEN, KEY_MAX_POOL, KEY_POOL_ON,
    KEY_REFRESH_EXP, KEY_TOKEN_EXP, KEY_TOKEN_TTL,
};
use sessiongate::{
    BackendConfig, BackendStatus, ConfigEntry, ConfigError, ConfigRegistry, ConfigStore,
    GatewayBuilder, NodeSettings, RuntimeParams, SessionGateway, StartupError,
};
use std::sync::Arc;
use std::time::Duration;

pub const USER: &str = "alice";
pub const SECRET: &str = "wonderland";
pub const OTHER_USER: &str = "bob";
pub const OTHER_SECRET: &str = "builder";

fn millis(entry: &ConfigEntry) -> Result<Duration, ConfigError> {
    if entry.int_value <= 0 {
        return Err(ConfigError::InvalidValue {
            category: entry.category.clone(),
            key: entry.key.clone(),
            reason: "must be positive".into(),
        });
    }
    Ok(Duration::from_millis(entry.int_value as u64))
}

/// Built-in registry with token rows in milliseconds
pub fn millisecond_registry() -> ConfigRegistry {
    let mut registry = ConfigRegistry::with_builtin();
    registry.register_scalar(CATEGORY_TOKEN, KEY_TOKEN_EXP, |p, e| match e {
        Some(e) => {
            p.token_ttl = millis(e)?;
            Ok(true)
        }
        None => {
            p.token_ttl = RuntimeParams::default().token_ttl;
            Ok(false)
        }
    });
    registry.register_scalar(CATEGORY_TOKEN, KEY_REFRESH_EXP, |p, e| match e {
        Some(e) => {
            p.refresh_ttl = millis(e)?;
            Ok(true)
        }
        None => {
            p.refresh_ttl = RuntimeParams::default().refresh_ttl;
            Ok(false)
        }
    });
    registry.register_scalar(CATEGORY_TOKEN, KEY_TOKEN_TTL, |p, e| match e {
        Some(e) => {
            p.ttl_tick = millis(e)?;
            Ok(true)
        }
        None => {
            p.ttl_tick = RuntimeParams::default().ttl_tick;
            Ok(false)
        }
    });
    registry
}

pub fn row(category: &str, key: &str, value: i64) -> ConfigEntry {
    ConfigEntry::new(category, key).with_int(value)
}

pub fn node_row(number: u32, mode: &str) -> ConfigEntry {
    ConfigEntry::new(CATEGORY_NODES, format!("node_{}", number)).with_text(format!(
        "{}|db-{}.internal|10.0.0.{}|{}",
        number, number, number, mode
    ))
}

pub fn token_rows(access_ms: i64, refresh_ms: i64, tick_ms: i64) -> Vec<ConfigEntry> {
    vec![
        row(CATEGORY_TOKEN, KEY_TOKEN_EXP, access_ms),
        row(CATEGORY_TOKEN, KEY_REFRESH_EXP, refresh_ms),
        row(CATEGORY_TOKEN, KEY_TOKEN_TTL, tick_ms),
    ]
}

pub fn pool_rows(pool_on: bool, max_pool: i64) -> Vec<ConfigEntry> {
    vec![
        row(CATEGORY_CONNECTION, KEY_POOL_ON, if pool_on { 1 } else { 0 }),
        row(CATEGORY_CONNECTION, KEY_MAX_POOL, max_pool),
    ]
}

pub struct GatewayFixture {
    pub gateway: SessionGateway,
    pub connector: Arc<MockConnector>,
    pub store: Arc<ConfigStore>,
}

pub struct FixtureBuilder {
    rows: Vec<ConfigEntry>,
    settings: Option<NodeSettings>,
    status: BackendStatus,
    sweeper: bool,
}

impl GatewayFixture {
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder {
            rows: Vec::new(),
            settings: Some(NodeSettings::new(1, "primary")),
            status: BackendStatus::default(),
            sweeper: false,
        }
    }

    /// Connection ids bound to a token, via the gateway
    pub async fn connection_id(&self, access_token: &str) -> Option<usize> {
        let conn = self.gateway.connection_for(access_token).await.ok()?;
        MockConnector::identify(&conn)
    }
}

impl FixtureBuilder {
    pub fn rows(mut self, rows: impl IntoIterator<Item = ConfigEntry>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn node_number(mut self, number: u32) -> Self {
        self.settings = Some(NodeSettings::new(number, format!("node-{}", number)));
        self
    }

    pub fn without_settings(mut self) -> Self {
        self.settings = None;
        self
    }

    pub fn backend_status(mut self, status: BackendStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_sweeper(mut self) -> Self {
        self.sweeper = true;
        self
    }

    pub async fn try_build(self) -> Result<GatewayFixture, StartupError> {
        self.try_build_with(Arc::new(MockConnector::default())).await
    }

    pub async fn try_build_with(
        self,
        connector: Arc<MockConnector>,
    ) -> Result<GatewayFixture, StartupError> {
        let _ = env_logger::builder().is_test(true).try_init();
        connector.set_status(self.status);

        let store = Arc::new(ConfigStore::in_memory().expect("in-memory store"));
        if let Some(settings) = &self.settings {
            store.put_settings(settings).expect("store settings");
        }
        for entry in &self.rows {
            store.put(entry).expect("store config row");
        }

        let authenticator = Arc::new(
            MockAuthenticator::default()
                .with_user(USER, SECRET)
                .with_user(OTHER_USER, OTHER_SECRET),
        );
        let mut builder = GatewayBuilder::new(connector.clone(), authenticator, store.clone())
            .backend_config(BackendConfig::default())
            .registry(millisecond_registry());
        if !self.sweeper {
            builder = builder.without_sweeper();
        }
        let gateway = builder.build().await?;

        Ok(GatewayFixture {
            gateway,
            connector,
            store,
        })
    }

    pub async fn build(self) -> GatewayFixture {
        self.try_build().await.expect("gateway should start")
    }
}
