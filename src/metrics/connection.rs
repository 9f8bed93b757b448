//! 주소별 연결 메트릭

use std::time::Duration;

use serde::Serialize;

use super::address::ServerAddress;
use super::event::{ConnectionListener, ListenerEvent};
use super::histogram::{ConcurrentHistogram, HistogramSnapshot};
use super::recorder::MetricsConfig;

/// Duration을 마이크로초로 변환 (u64 범위로 포화)
fn as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

// ============================================================================
// ConnectionMetrics
// ============================================================================

/// 한 서버 주소의 연결 수립 시간과 사용 시간 히스토그램
///
/// 모든 값은 마이크로초 단위로 기록됩니다.
#[derive(Debug)]
pub struct ConnectionMetrics {
    address: ServerAddress,
    connection_time: ConcurrentHistogram,
    in_use_time: ConcurrentHistogram,
}

impl ConnectionMetrics {
    /// 설정의 상한으로 두 히스토그램 생성
    pub fn new(address: ServerAddress, config: &MetricsConfig) -> Self {
        Self {
            address,
            connection_time: ConcurrentHistogram::new(
                as_micros(config.connection_time_ceiling()),
                config.precision_bits,
            ),
            in_use_time: ConcurrentHistogram::new(
                as_micros(config.in_use_ceiling),
                config.precision_bits,
            ),
        }
    }

    /// 서버 주소
    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// 연결 수립 시간 기록. 상한을 넘으면 상한으로 기록됩니다.
    pub fn record_connection_time(&self, elapsed: Duration) {
        self.connection_time.record(as_micros(elapsed));
    }

    /// 사용 시간 기록. 상한을 넘으면 상한으로 기록됩니다.
    pub fn record_in_use_time(&self, elapsed: Duration) {
        self.in_use_time.record(as_micros(elapsed));
    }

    /// 연결 수립 시간 히스토그램
    pub fn connection_time(&self) -> &ConcurrentHistogram {
        &self.connection_time
    }

    /// 사용 시간 히스토그램
    pub fn in_use_time(&self) -> &ConcurrentHistogram {
        &self.in_use_time
    }

    /// 현재 상태 스냅샷
    pub fn snapshot(&self) -> ConnectionMetricsSnapshot {
        ConnectionMetricsSnapshot {
            address: self.address.clone(),
            connection_time: self.connection_time.snapshot(),
            in_use_time: self.in_use_time.snapshot(),
        }
    }
}

impl ConnectionListener for ConnectionMetrics {
    fn before_connect(&self, event: &mut ListenerEvent) {
        event.start();
    }

    fn after_connect(&self, event: &ListenerEvent) {
        self.record_connection_time(event.elapsed());
    }

    fn on_acquire(&self, event: &mut ListenerEvent) {
        event.start();
    }

    fn on_release(&self, event: &ListenerEvent) {
        self.record_in_use_time(event.elapsed());
    }
}

/// 주소별 메트릭 스냅샷 (마이크로초)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionMetricsSnapshot {
    /// 서버 주소
    pub address: ServerAddress,
    /// 연결 수립 시간
    pub connection_time: HistogramSnapshot,
    /// 사용 시간
    pub in_use_time: HistogramSnapshot,
}
