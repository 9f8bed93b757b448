//! 연결 메트릭 레코더
//!
//! 풀이 소유하며, 서버 주소별 [`ConnectionMetrics`]를 처음 관측할 때 생성합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use super::address::ServerAddress;
use super::connection::{ConnectionMetrics, ConnectionMetricsSnapshot};
use super::event::{ConnectionListener, ListenerEvent};
use super::histogram::DEFAULT_PRECISION_BITS;

// ============================================================================
// MetricsConfig
// ============================================================================

/// 메트릭 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// 연결 타임아웃. `Duration::ZERO` 또는 `Duration::MAX`는 비활성
    pub connection_timeout: Duration,
    /// 사용 시간 히스토그램 상한
    pub in_use_ceiling: Duration,
    /// 연결 타임아웃이 비활성일 때 연결 시간 히스토그램 상한
    pub default_highest_trackable: Duration,
    /// 히스토그램 정밀도 비트 수
    pub precision_bits: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            in_use_ceiling: Duration::from_secs(3600),
            default_highest_trackable: Duration::from_secs(600),
            precision_bits: DEFAULT_PRECISION_BITS,
        }
    }
}

impl MetricsConfig {
    /// 빌더 패턴으로 메트릭 설정 생성
    pub fn builder() -> MetricsConfigBuilder {
        MetricsConfigBuilder::default()
    }

    /// 연결 타임아웃 비활성 여부
    pub fn is_connect_timeout_disabled(&self) -> bool {
        self.connection_timeout.is_zero() || self.connection_timeout == Duration::MAX
    }

    /// 연결 시간 히스토그램 상한
    pub fn connection_time_ceiling(&self) -> Duration {
        if self.is_connect_timeout_disabled() {
            self.default_highest_trackable
        } else {
            self.connection_timeout
        }
    }
}

/// 메트릭 설정 빌더
#[derive(Debug, Clone, Default)]
pub struct MetricsConfigBuilder {
    config: MetricsConfig,
}

impl MetricsConfigBuilder {
    /// 연결 타임아웃 설정
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// 연결 타임아웃 비활성
    pub fn without_connection_timeout(mut self) -> Self {
        self.config.connection_timeout = Duration::ZERO;
        self
    }

    /// 사용 시간 상한 설정
    pub fn in_use_ceiling(mut self, ceiling: Duration) -> Self {
        self.config.in_use_ceiling = ceiling;
        self
    }

    /// 타임아웃 비활성 시 연결 시간 상한 설정
    pub fn default_highest_trackable(mut self, ceiling: Duration) -> Self {
        self.config.default_highest_trackable = ceiling;
        self
    }

    /// 정밀도 비트 수 설정 (1..=10으로 보정)
    pub fn precision_bits(mut self, bits: u32) -> Self {
        self.config.precision_bits = bits.clamp(1, 10);
        self
    }

    /// 설정 빌드
    pub fn build(self) -> MetricsConfig {
        self.config
    }
}

// ============================================================================
// ConnectionMetricsRecorder
// ============================================================================

/// 주소별 연결 메트릭 레코더
///
/// 조회는 읽기 락만 사용하며, 새 주소가 처음 관측될 때만 쓰기 락을 잡습니다.
/// 기록 자체는 히스토그램의 원자적 카운터로 처리됩니다.
#[derive(Debug, Default)]
pub struct ConnectionMetricsRecorder {
    config: MetricsConfig,
    metrics: RwLock<HashMap<ServerAddress, Arc<ConnectionMetrics>>>,
}

impl ConnectionMetricsRecorder {
    /// 새 레코더 생성
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            config,
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// 설정 조회
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// 주소의 메트릭 조회 (없으면 생성)
    pub fn metrics_for(&self, address: &ServerAddress) -> Arc<ConnectionMetrics> {
        if let Some(metrics) = self.metrics.read().get(address) {
            return Arc::clone(metrics);
        }

        let mut map = self.metrics.write();
        let metrics = map.entry(address.clone()).or_insert_with(|| {
            debug!(address = %address, "Creating connection metrics");
            Arc::new(ConnectionMetrics::new(address.clone(), &self.config))
        });
        Arc::clone(metrics)
    }

    /// 주소의 메트릭 조회 (생성하지 않음)
    pub fn get(&self, address: &ServerAddress) -> Option<Arc<ConnectionMetrics>> {
        self.metrics.read().get(address).cloned()
    }

    /// 연결 시도 직전
    pub fn before_connect(&self, address: &ServerAddress, event: &mut ListenerEvent) {
        self.metrics_for(address).before_connect(event);
    }

    /// 연결 수립 직후
    pub fn after_connect(&self, address: &ServerAddress, event: &ListenerEvent) {
        self.metrics_for(address).after_connect(event);
    }

    /// 풀에서 연결 획득
    pub fn on_acquire(&self, address: &ServerAddress, event: &mut ListenerEvent) {
        self.metrics_for(address).on_acquire(event);
    }

    /// 풀에 연결 반환
    pub fn on_release(&self, address: &ServerAddress, event: &ListenerEvent) {
        self.metrics_for(address).on_release(event);
    }

    /// 모든 주소의 스냅샷 (주소 순)
    pub fn snapshot(&self) -> Vec<ConnectionMetricsSnapshot> {
        let mut snapshots: Vec<_> = self
            .metrics
            .read()
            .values()
            .map(|metrics| metrics.snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.address.cmp(&b.address));
        snapshots
    }

    /// 추적 중인 주소 수
    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    /// 추적 중인 주소가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(host: &str) -> ServerAddress {
        ServerAddress::new(host, 7687)
    }

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.in_use_ceiling, Duration::from_secs(3600));
        assert_eq!(config.precision_bits, 3);
        assert!(!config.is_connect_timeout_disabled());
        assert_eq!(config.connection_time_ceiling(), Duration::from_secs(30));
    }

    #[test]
    fn test_disabled_timeout_fallback() {
        for timeout in [Duration::ZERO, Duration::MAX] {
            let config = MetricsConfig::builder().connection_timeout(timeout).build();
            assert!(config.is_connect_timeout_disabled());
            assert_eq!(config.connection_time_ceiling(), Duration::from_secs(600));
        }

        let config = MetricsConfig::builder()
            .without_connection_timeout()
            .default_highest_trackable(Duration::from_secs(5))
            .build();
        let recorder = ConnectionMetricsRecorder::new(config);
        assert_eq!(
            recorder
                .metrics_for(&addr("db1"))
                .connection_time()
                .highest_trackable(),
            5_000_000
        );
    }

    #[test]
    fn test_lazy_creation() {
        let recorder = ConnectionMetricsRecorder::default();
        assert!(recorder.is_empty());
        assert!(recorder.get(&addr("db1")).is_none());

        let first = recorder.metrics_for(&addr("db1"));
        let second = recorder.metrics_for(&addr("db1"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(recorder.len(), 1);
        assert!(recorder.get(&addr("db1")).is_some());
    }

    #[test]
    fn test_hooks_by_address() {
        let recorder = ConnectionMetricsRecorder::default();
        let mut connect = ListenerEvent::new();
        let mut usage = ListenerEvent::new();

        recorder.before_connect(&addr("db1"), &mut connect);
        recorder.after_connect(&addr("db1"), &connect);
        recorder.on_acquire(&addr("db2"), &mut usage);
        recorder.on_release(&addr("db2"), &usage);

        let snap = recorder.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].address, addr("db1"));
        assert_eq!(snap[0].connection_time.count, 1);
        assert_eq!(snap[0].in_use_time.count, 0);
        assert_eq!(snap[1].address, addr("db2"));
        assert_eq!(snap[1].in_use_time.count, 1);
    }

    #[test]
    fn test_ceiling_clamp() {
        let config = MetricsConfig::builder()
            .in_use_ceiling(Duration::from_millis(1))
            .build();
        let recorder = ConnectionMetricsRecorder::new(config);
        let metrics = recorder.metrics_for(&addr("db1"));
        metrics.record_in_use_time(Duration::from_secs(3600 * 24));

        let snap = metrics.snapshot();
        assert_eq!(snap.in_use_time.count, 1);
        assert_eq!(snap.in_use_time.max, 1_000);
    }

    #[test]
    fn test_concurrent_threads_exact_count() {
        let recorder = ConnectionMetricsRecorder::default();
        let threads = 8;
        let per_thread = 2_500;

        std::thread::scope(|s| {
            for _ in 0..threads {
                s.spawn(|| {
                    for i in 0..per_thread {
                        recorder
                            .metrics_for(&addr("db1"))
                            .record_connection_time(Duration::from_micros(i));
                    }
                });
            }
        });

        let metrics = recorder.get(&addr("db1")).unwrap();
        assert_eq!(metrics.connection_time().count(), threads * per_thread);
        assert_eq!(recorder.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_exact_count() {
        let recorder = Arc::new(ConnectionMetricsRecorder::default());
        let mut handles = Vec::new();

        for task in 0..16u16 {
            let recorder = Arc::clone(&recorder);
            handles.push(tokio::spawn(async move {
                let address = ServerAddress::new("db", 7687 + task % 2);
                for _ in 0..500 {
                    let mut event = ListenerEvent::new();
                    recorder.on_acquire(&address, &mut event);
                    recorder.on_release(&address, &event);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let total: u64 = recorder
            .snapshot()
            .iter()
            .map(|s| s.in_use_time.count)
            .sum();
        assert_eq!(total, 16 * 500);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let recorder = ConnectionMetricsRecorder::default();
        recorder
            .metrics_for(&addr("db1"))
            .record_connection_time(Duration::from_micros(4));

        let json = serde_json::to_value(recorder.snapshot()).unwrap();
        assert_eq!(json[0]["address"]["host"], "db1");
        assert_eq!(json[0]["connection_time"]["count"], 1);
        assert_eq!(json[0]["connection_time"]["max"], 4);
        assert!(json[0]["connection_time"].get("buckets").is_none());
    }
}
