//! Mock backend for integration tests
//!
//! Every connection the connector opens is recorded, so tests can assert
//! how many times each one was closed.

use async_trait::async_trait;
use parking_lot::Mutex;
use sessiongate::{
    AuthError, Authenticator, BackendConfig, BackendConnection, BackendConnector, BackendStatus,
    ConnectionError, UserIdentity,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct MockConnection {
    pub id: usize,
    closes: AtomicUsize,
    status: Arc<Mutex<BackendStatus>>,
}

impl MockConnection {
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendConnection for MockConnection {
    async fn close(&self) -> Result<(), ConnectionError> {
        if self.closes.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(ConnectionError::Closed);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.close_count() == 0
    }

    async fn status(&self) -> Result<BackendStatus, ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::Closed);
        }
        Ok(self.status.lock().clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Connector that hands out [`MockConnection`]s and remembers them
#[derive(Default)]
pub struct MockConnector {
    opened: Mutex<Vec<Arc<MockConnection>>>,
    status: Arc<Mutex<BackendStatus>>,
    unreachable: AtomicBool,
}

impl MockConnector {
    pub fn new(status: BackendStatus) -> Self {
        Self {
            status: Arc::new(Mutex::new(status)),
            ..Default::default()
        }
    }

    /// Change what every connection reports from now on
    pub fn set_status(&self, status: BackendStatus) {
        *self.status.lock() = status;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn opened(&self) -> Vec<Arc<MockConnection>> {
        self.opened.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    /// The mock behind a handle the gateway returned
    pub fn identify(conn: &Arc<dyn BackendConnection>) -> Option<usize> {
        conn.as_any().downcast_ref::<MockConnection>().map(|c| c.id)
    }
}

#[async_trait]
impl BackendConnector for MockConnector {
    async fn open(
        &self,
        _config: &BackendConfig,
    ) -> Result<Arc<dyn BackendConnection>, ConnectionError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ConnectionError::Unreachable("mock backend is down".into()));
        }
        let mut opened = self.opened.lock();
        let conn = Arc::new(MockConnection {
            id: opened.len(),
            closes: AtomicUsize::new(0),
            status: self.status.clone(),
        });
        opened.push(conn.clone());
        Ok(conn)
    }
}

/// Username -> (secret, user id)
#[derive(Default)]
pub struct MockAuthenticator {
    users: HashMap<String, (String, String)>,
}

impl MockAuthenticator {
    pub fn with_user(mut self, username: &str, secret: &str) -> Self {
        let user_id = format!("uid-{}", username);
        self.users
            .insert(username.to_string(), (secret.to_string(), user_id));
        self
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, username: &str, secret: &str) -> Result<UserIdentity, AuthError> {
        match self.users.get(username) {
            Some((expected, user_id)) if expected == secret => {
                Ok(UserIdentity::new(user_id.clone(), username))
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
