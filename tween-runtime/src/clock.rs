//! # Clock 模块
//!
//! 帧时钟：把相邻两次采样的 [`Instant`] 换算为 `dt` 秒，交给 [`Scheduler::tick`](crate::Scheduler::tick)。
//!
//! 单帧 `dt` 会被截断到 `max_frame_dt`，避免窗口拖动、断点调试等造成的长时间停顿
//! 让动画一次性跳过大段进度。

use std::time::Instant;

use crate::config::ClockConfig;

/// 帧时钟
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_frame_dt: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::from_config(&ClockConfig::default())
    }
}

impl FrameClock {
    /// 创建帧时钟
    ///
    /// `max_frame_dt` 非正数或非有限数时不截断。
    pub fn new(max_frame_dt: f64) -> Self {
        Self {
            last: None,
            max_frame_dt,
        }
    }

    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(config.max_frame_dt)
    }

    /// 以当前时间采样
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// 以指定时间采样，返回距上次采样的秒数
    ///
    /// 第一次采样返回 0；时间倒退时返回 0。
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let dt = self
            .last
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f64());
        self.last = Some(now);

        if self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0 {
            dt.min(self.max_frame_dt)
        } else {
            dt
        }
    }

    /// 丢弃上次采样，下一次 `tick` 重新从 0 开始
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn max_frame_dt(&self) -> f64 {
        self.max_frame_dt
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new(0.25);
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
    }

    #[test]
    fn test_dt_and_cap() {
        let mut clock = FrameClock::new(0.25);
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert!((clock.tick_at(t0 + Duration::from_millis(16)) - 0.016).abs() < 1e-9);
        // 长停顿被截断
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(3)), 0.25);
        // 时间倒退
        assert_eq!(clock.tick_at(t0), 0.0);
    }

    #[test]
    fn test_uncapped_and_reset() {
        let mut clock = FrameClock::new(0.0);
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(2)), 2.0);

        clock.reset();
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(10)), 0.0);
    }

    #[test]
    fn test_from_config() {
        let clock = FrameClock::default();
        assert_eq!(clock.max_frame_dt(), 0.25);
    }
}
