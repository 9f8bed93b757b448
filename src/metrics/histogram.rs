//! 동시 기록 히스토그램
//!
//! 로그-선형 버킷 구조입니다. `2^precision_bits` 미만의 값은 정확히 기록되고,
//! 그 이상은 2의 거듭제곱 구간마다 `2^precision_bits`개의 하위 버킷으로
//! 나뉩니다. 상대 오차는 `2^-precision_bits` 이하입니다.
//!
//! 버킷 배열은 생성 시 한 번 할당되며 이후 크기가 변하지 않습니다.
//! 기록은 원자적 카운터 증가만으로 이루어지므로 락이 필요 없습니다.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// 기본 정밀도 비트 수 (상대 오차 12.5% 이하)
pub const DEFAULT_PRECISION_BITS: u32 = 3;

/// 허용 정밀도 비트 범위
const PRECISION_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

// ============================================================================
// 버킷 인덱스 계산
// ============================================================================

#[inline]
fn bucket_index(value: u64, precision_bits: u32) -> usize {
    let sub_buckets = 1u64 << precision_bits;
    if value < sub_buckets {
        return value as usize;
    }
    let exponent = 63 - value.leading_zeros();
    let shift = exponent - precision_bits;
    (((shift as u64 + 1) << precision_bits) + ((value >> shift) - sub_buckets)) as usize
}

#[inline]
fn bucket_lower_bound(index: usize, precision_bits: u32) -> u64 {
    let sub_buckets = 1usize << precision_bits;
    if index < sub_buckets {
        return index as u64;
    }
    let shift = index / sub_buckets - 1;
    let offset = index % sub_buckets;
    ((sub_buckets + offset) as u64) << shift
}

#[inline]
fn bucket_upper_bound(index: usize, precision_bits: u32) -> u64 {
    let sub_buckets = 1usize << precision_bits;
    if index < sub_buckets {
        return index as u64;
    }
    let shift = index / sub_buckets - 1;
    bucket_lower_bound(index, precision_bits) + ((1u64 << shift) - 1)
}

// ============================================================================
// ConcurrentHistogram
// ============================================================================

/// 락 없는 동시 기록 히스토그램
///
/// 최대 추적 값(`highest_trackable`)을 넘는 값은 버려지지 않고 최대값으로
/// 기록됩니다.
#[derive(Debug)]
pub struct ConcurrentHistogram {
    highest_trackable: u64,
    precision_bits: u32,
    counts: Box<[AtomicU64]>,
    total: AtomicU64,
    sum: AtomicU64,
    min: AtomicU64,
    max: AtomicU64,
}

impl ConcurrentHistogram {
    /// 새 히스토그램 생성
    ///
    /// `highest_trackable`은 최소 1, `precision_bits`는 1..=10 범위로 보정됩니다.
    pub fn new(highest_trackable: u64, precision_bits: u32) -> Self {
        let highest_trackable = highest_trackable.max(1);
        let precision_bits = precision_bits.clamp(*PRECISION_RANGE.start(), *PRECISION_RANGE.end());
        let len = bucket_index(highest_trackable, precision_bits) + 1;

        Self {
            highest_trackable,
            precision_bits,
            counts: (0..len).map(|_| AtomicU64::new(0)).collect(),
            total: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            min: AtomicU64::new(u64::MAX),
            max: AtomicU64::new(0),
        }
    }

    /// 값 기록. 최대 추적 값으로 보정된 실제 기록 값을 반환합니다.
    pub fn record(&self, value: u64) -> u64 {
        let value = value.min(self.highest_trackable);
        let index = bucket_index(value, self.precision_bits);

        self.counts[index].fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.min.fetch_min(value, Ordering::Relaxed);
        self.max.fetch_max(value, Ordering::Relaxed);
        value
    }

    /// 최대 추적 값
    pub fn highest_trackable(&self) -> u64 {
        self.highest_trackable
    }

    /// 정밀도 비트 수
    pub fn precision_bits(&self) -> u32 {
        self.precision_bits
    }

    /// 총 기록 수
    pub fn count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// 특정 값과 같은 버킷에 기록된 수
    pub fn count_at(&self, value: u64) -> u64 {
        let value = value.min(self.highest_trackable);
        self.counts[bucket_index(value, self.precision_bits)].load(Ordering::Relaxed)
    }

    /// 현재 상태 스냅샷
    ///
    /// 기록과 동시에 호출될 수 있으며, 그 경우 일부 기록만 반영될 수 있습니다.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let buckets: Vec<(u64, u64)> = self
            .counts
            .iter()
            .enumerate()
            .filter_map(|(index, count)| {
                let count = count.load(Ordering::Relaxed);
                (count > 0).then(|| (bucket_upper_bound(index, self.precision_bits), count))
            })
            .collect();

        let count: u64 = buckets.iter().map(|(_, c)| c).sum();
        // 버킷과 min/max/sum은 따로 읽히므로 기록 도중에는 서로 어긋날 수 있습니다.
        let (min, max, mean) = if count == 0 {
            (0, 0, 0.0)
        } else {
            let sum = self.sum.load(Ordering::Relaxed);
            let max = self.max.load(Ordering::Relaxed);
            let min = self.min.load(Ordering::Relaxed).min(max);
            (min, max, sum as f64 / count as f64)
        };

        let mut snapshot = HistogramSnapshot {
            count,
            min,
            max,
            mean,
            p50: 0,
            p90: 0,
            p99: 0,
            highest_trackable: self.highest_trackable,
            buckets,
        };
        snapshot.p50 = snapshot.value_at_percentile(50.0);
        snapshot.p90 = snapshot.value_at_percentile(90.0);
        snapshot.p99 = snapshot.value_at_percentile(99.0);
        snapshot
    }
}

// ============================================================================
// HistogramSnapshot
// ============================================================================

/// 히스토그램 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    /// 기록 수
    pub count: u64,
    /// 최소값
    pub min: u64,
    /// 최대값
    pub max: u64,
    /// 평균
    pub mean: f64,
    /// 50 백분위수
    pub p50: u64,
    /// 90 백분위수
    pub p90: u64,
    /// 99 백분위수
    pub p99: u64,
    /// 최대 추적 값
    pub highest_trackable: u64,
    /// (버킷 상한, 기록 수), 비어 있지 않은 버킷만
    #[serde(skip)]
    buckets: Vec<(u64, u64)>,
}

impl HistogramSnapshot {
    /// 백분위수 값 (0.0..=100.0)
    ///
    /// 해당 버킷의 상한을 반환하되 관측된 최대값을 넘지 않습니다.
    pub fn value_at_percentile(&self, percentile: f64) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let percentile = percentile.clamp(0.0, 100.0);
        let target = ((percentile / 100.0) * self.count as f64).ceil().max(1.0) as u64;

        let mut seen = 0u64;
        for &(upper, count) in &self.buckets {
            seen += count;
            if seen >= target {
                return upper.min(self.max);
            }
        }
        self.max
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
