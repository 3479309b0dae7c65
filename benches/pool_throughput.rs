/// Benchmark for session and pool throughput
///
/// Measures the partitioned TTL map under thread contention and the full
/// establish / renew / revoke path through the public gateway API, against an
/// in-process backend that does no I/O.

use async_trait::async_trait;
use sessiongate::{
    AuthError, Authenticator, BackendConfig, BackendConnection, BackendConnector, BackendStatus,
    ConfigEntry, ConfigStore, ConnectionError, GatewayBuilder, NodeSettings, TtlMap, UserIdentity,
};
use std::any::Any;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct NullConnection;

#[async_trait]
impl BackendConnection for NullConnection {
    async fn close(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn status(&self) -> Result<BackendStatus, ConnectionError> {
        Ok(BackendStatus::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct NullConnector;

#[async_trait]
impl BackendConnector for NullConnector {
    async fn open(
        &self,
        _config: &BackendConfig,
    ) -> Result<Arc<dyn BackendConnection>, ConnectionError> {
        Ok(Arc::new(NullConnection))
    }
}

struct AcceptAll;

#[async_trait]
impl Authenticator for AcceptAll {
    async fn authenticate(&self, username: &str, _secret: &str) -> Result<UserIdentity, AuthError> {
        Ok(UserIdentity::new(format!("uid-{}", username), username))
    }
}

fn report(label: &str, ops: usize, elapsed: Duration) -> f64 {
    let per_sec = ops as f64 / elapsed.as_secs_f64();
    println!("  {}: {} ops in {:?} ({:.0} ops/sec)", label, ops, elapsed, per_sec);
    per_sec
}

fn bench_ttl_map(threads: usize, ops_per_thread: usize) -> f64 {
    let map = Arc::new(TtlMap::new());
    let ttl = Duration::from_secs(60);
    let start = Instant::now();
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let map = map.clone();
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = format!("t{}-k{}", t, i);
                    map.put(key.clone(), ttl, i);
                    let _ = map.get(&key);
                    if i % 4 == 0 {
                        map.rename(&key, format!("{}-r", key), ttl);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    report(
        &format!("{} threads", threads),
        threads * ops_per_thread,
        start.elapsed(),
    )
}

fn main() {
    println!("=== Pool Throughput Benchmark ===\n");

    println!("📊 TTL map (put + get + rename every 4th key):");
    let single = bench_ttl_map(1, 100_000);
    let contended = bench_ttl_map(8, 25_000);
    println!();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    runtime.block_on(async {
        let store = Arc::new(ConfigStore::in_memory().expect("Failed to open store"));
        store
            .put_settings(&NodeSettings::new(1, "bench"))
            .expect("Failed to store settings");
        store
            .put(&ConfigEntry::new("connection", "max_pool").with_int(100_000))
            .expect("Failed to store config");

        let gateway = GatewayBuilder::new(Arc::new(NullConnector), Arc::new(AcceptAll), store)
            .backend_config(BackendConfig::default())
            .build()
            .await
            .expect("Failed to start gateway");

        let sessions = 10_000;
        println!("📊 Gateway session lifecycle:");

        let start = Instant::now();
        let mut creds = Vec::with_capacity(sessions);
        for i in 0..sessions {
            let cred = gateway
                .establish_session(&format!("user{}", i), "secret")
                .await
                .expect("establish failed");
            creds.push(cred);
        }
        let establish = report("establish", sessions, start.elapsed());

        let start = Instant::now();
        for cred in &creds {
            let _ = gateway.connection_for(&cred.access_token).await;
        }
        let lookup = report("connection_for", sessions, start.elapsed());

        let start = Instant::now();
        let mut renewed = Vec::with_capacity(sessions);
        for cred in &creds {
            renewed.push(
                gateway
                    .renew_session(&cred.refresh_token)
                    .await
                    .expect("renew failed"),
            );
        }
        let renew = report("renew", sessions, start.elapsed());

        let start = Instant::now();
        for cred in &renewed {
            let _ = gateway.revoke_session(&cred.access_token).await;
        }
        let revoke = report("revoke", sessions, start.elapsed());

        gateway.shutdown().await;
        println!();

        println!("=== Summary ===");
        println!("TTL map, 16 partitions:");
        println!("  single thread: {:.0} ops/sec", single);
        println!("  8 threads:     {:.0} ops/sec", contended);
        println!("Gateway:");
        println!("  establish:      {:.0} sessions/sec", establish);
        println!("  connection_for: {:.0} lookups/sec", lookup);
        println!("  renew:          {:.0} renewals/sec", renew);
        println!("  revoke:         {:.0} revocations/sec", revoke);
    });
}
