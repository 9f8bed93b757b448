//! 연결 수명 주기 이벤트

use std::time::{Duration, Instant};

/// 단일 연결 시도/사용 구간의 타이머
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerEvent {
    started_at: Option<Instant>,
}

impl ListenerEvent {
    /// 시작되지 않은 이벤트
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 시각으로 타이머 시작. 이미 시작된 경우 재설정합니다.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// 시작 시각
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// 경과 시간
    ///
    /// 시작되지 않았거나 시계가 역행한 경우 0입니다.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|start| Instant::now().saturating_duration_since(start))
            .unwrap_or(Duration::ZERO)
    }
}

/// 연결 수명 주기 훅
///
/// 풀은 물리 연결마다 `ListenerEvent`를 하나씩 보관하고
/// 연결 전후, 획득/반환 시점에 이 훅을 호출합니다.
pub trait ConnectionListener: Send + Sync {
    /// 연결 시도 직전
    fn before_connect(&self, event: &mut ListenerEvent);

    /// 연결 수립 직후
    fn after_connect(&self, event: &ListenerEvent);

    /// 풀에서 연결 획득
    fn on_acquire(&self, event: &mut ListenerEvent);

    /// 풀에 연결 반환
    fn on_release(&self, event: &ListenerEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstarted_elapsed_is_zero() {
        let event = ListenerEvent::new();
        assert!(event.started_at().is_none());
        assert_eq!(event.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_grows() {
        let mut event = ListenerEvent::new();
        event.start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(event.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_restart_resets() {
        let mut event = ListenerEvent::new();
        event.start();
        let first = event.started_at().unwrap();
        std::thread::sleep(Duration::from_millis(1));
        event.start();
        assert!(event.started_at().unwrap() > first);
    }
}
