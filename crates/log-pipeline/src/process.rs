//! 프로세스 모니터
//!
//! 외부 [`ProcessProbe`]가 제공하는 샘플을 수집하고 합계를 계산합니다.
//! 샘플링 자체는 프로브의 몫입니다.

use serde::Serialize;
use tracing::debug;

use clawmon_core::error::ClawmonError;
use clawmon_core::pipeline::{Monitor, ProcessProbe};
use clawmon_core::types::ProcessSample;

/// 프로세스 분석 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProcessAnalysis {
    /// 샘플 수
    pub total_processes: usize,
    /// 메모리 합계 (MB, 소수 둘째 자리)
    pub total_memory_mb: f64,
    /// 평균 CPU 사용률 (%, 소수 둘째 자리)
    pub average_cpu_percent: f64,
}

/// 고정 샘플을 반환하는 프로브
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    samples: Vec<ProcessSample>,
}

impl StaticProbe {
    /// 주어진 샘플을 반환하는 프로브를 생성합니다.
    pub fn new(samples: Vec<ProcessSample>) -> Self {
        Self { samples }
    }

    /// 항상 빈 목록을 반환하는 프로브
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ProcessProbe for StaticProbe {
    fn name(&self) -> &str {
        "static"
    }

    fn sample(&self) -> Result<Vec<ProcessSample>, ClawmonError> {
        Ok(self.samples.clone())
    }
}

/// 프로세스 모니터
pub struct ProcessMonitor {
    probe: Box<dyn ProcessProbe>,
    samples: Vec<ProcessSample>,
}

impl ProcessMonitor {
    /// 프로브로 모니터를 생성합니다.
    pub fn new(probe: Box<dyn ProcessProbe>) -> Self {
        Self {
            probe,
            samples: Vec::new(),
        }
    }

    /// 수집된 샘플
    pub fn samples(&self) -> &[ProcessSample] {
        &self.samples
    }
}

impl std::fmt::Debug for ProcessMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMonitor")
            .field("probe", &self.probe.name())
            .field("samples", &self.samples.len())
            .finish()
    }
}

impl Monitor for ProcessMonitor {
    type Input = ();
    type Record = ProcessSample;
    type Analysis = ProcessAnalysis;

    fn name(&self) -> &str {
        "process-monitor"
    }

    fn collect(&mut self, _input: &()) -> Result<&[ProcessSample], ClawmonError> {
        self.samples = self.probe.sample()?;
        debug!(probe = self.probe.name(), samples = self.samples.len(), "process samples collected");
        Ok(&self.samples)
    }

    fn analyze(&self) -> ProcessAnalysis {
        if self.samples.is_empty() {
            return ProcessAnalysis::default();
        }
        let total_memory: f64 = self.samples.iter().map(|s| s.memory_mb).sum();
        let total_cpu: f64 = self.samples.iter().map(|s| s.cpu_percent).sum();
        ProcessAnalysis {
            total_processes: self.samples.len(),
            total_memory_mb: round2(total_memory),
            average_cpu_percent: round2(total_cpu / self.samples.len() as f64),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
