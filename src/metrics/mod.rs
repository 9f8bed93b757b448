//! Metrics Module
//!
//! 연결 수명 주기 메트릭
//!
//! 풀은 물리 연결마다 [`ListenerEvent`]를 보관하고, 연결 전후와 획득/반환
//! 시점에 [`ConnectionMetricsRecorder`]의 훅을 호출합니다. 레코더는 서버
//! 주소별로 연결 수립 시간과 사용 시간 히스토그램을 유지합니다.
//!
//! # Example
//!
//! ```
//! use zeta4g_bolt::metrics::{ConnectionMetricsRecorder, ListenerEvent, MetricsConfig, ServerAddress};
//!
//! let recorder = ConnectionMetricsRecorder::new(MetricsConfig::default());
//! let address: ServerAddress = "bolt://db1:7687".parse().unwrap();
//!
//! let mut event = ListenerEvent::new();
//! recorder.before_connect(&address, &mut event);
//! // ... 연결 수립 ...
//! recorder.after_connect(&address, &event);
//!
//! recorder.on_acquire(&address, &mut event);
//! // ... 연결 사용 ...
//! recorder.on_release(&address, &event);
//!
//! let snapshot = recorder.snapshot();
//! assert_eq!(snapshot[0].connection_time.count, 1);
//! assert_eq!(snapshot[0].in_use_time.count, 1);
//! ```

mod address;
mod connection;
mod event;
mod histogram;
mod recorder;

// ============================================================================
// Re-exports
// ============================================================================

pub use address::{AddressParseError, ServerAddress, DEFAULT_PORT};
pub use connection::{ConnectionMetrics, ConnectionMetricsSnapshot};
pub use event::{ConnectionListener, ListenerEvent};
pub use histogram::{ConcurrentHistogram, HistogramSnapshot, DEFAULT_PRECISION_BITS};
pub use recorder::{ConnectionMetricsRecorder, MetricsConfig, MetricsConfigBuilder};
