//! # Animation 模块
//!
//! 单个属性动画的状态机。
//!
//! ```text
//! Idle ──start()──► Running ──advance()──► Completed
//!                      │
//!                      └──stop() / 目标失效 / 写入失败──► Stopped
//! ```
//!
//! 时间按 `elapsed` 累加，跨越周期边界时把溢出部分带入下一周期，
//! 因此结果与帧率无关：任意拆分 `dt` 只要总和相同，最终状态一致。

use tracing::{debug, warn};

use crate::error::{AnimError, AnimResult};
use crate::path::Path;
use crate::target::{PropertyTarget, TargetKey};
use crate::tweener::Tweener;
use crate::value::Value;

/// 周期边界判定的相对容差（乘以 `duration`）
///
/// 十进制下总和恰好等于 `duration` 的若干 `dt`（例如 10 × 0.1）在浮点累加后
/// 可能略小于 `duration`，容差保证它们仍然跨过边界。容差随时长缩放，
/// 极短的动画不会凭空多出周期。
const TIME_EPSILON: f64 = 1e-9;

/// 动画 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// 创建新的动画 ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AnimationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnimationId({})", self.0)
    }
}

/// 动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    /// 已创建，尚未开始
    #[default]
    Idle,
    /// 正在播放
    Running,
    /// 自然完成
    Completed,
    /// 被停止（显式 stop、目标失效或写入失败）
    Stopped,
}

impl AnimationState {
    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

/// 一次 `start()` / `advance()` 调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 动画未在运行，调用没有产生任何效果
    Idle,
    /// 动画仍在运行
    Running,
    /// 动画在本次调用中结束
    Finished {
        /// `true` 表示自然完成，`false` 表示被停止
        completed: bool,
    },
}

/// 动画参数
///
/// 默认值：Path 按属性类型选择、线性 Tweener、无限循环、不反向、
/// 需要手动 `start()`、替换同一属性上的旧动画。
#[derive(Debug, Clone, PartialEq)]
pub struct AnimateOptions {
    /// 插值路径，`None` 表示按属性值类型选择默认 Path
    pub path: Option<Path>,
    /// 缓动函数
    pub tweener: Tweener,
    /// 重复次数，0 表示无限循环
    pub repeat: u32,
    /// 每个周期结束后是否反向（往返）
    pub reverse: bool,
    /// 注册后立即开始
    pub auto_start: bool,
    /// 停止同一属性上已有的动画
    pub replace: bool,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            path: None,
            tweener: Tweener::Linear,
            repeat: 0,
            reverse: false,
            auto_start: false,
            replace: true,
        }
    }
}

impl AnimateOptions {
    /// 设置插值路径
    #[must_use]
    pub fn with_path(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }

    /// 设置缓动函数
    #[must_use]
    pub fn with_tweener(mut self, tweener: Tweener) -> Self {
        self.tweener = tweener;
        self
    }

    /// 设置重复次数
    #[must_use]
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// 设置是否往返
    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// 设置是否注册后立即开始
    #[must_use]
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// 设置是否替换同一属性上的旧动画
    #[must_use]
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

/// 属性动画
///
/// 在 `duration` 秒内把目标属性从 `start_value` 变化到 `end_value`，
/// 每个周期依次应用 Tweener 和 Path。
pub struct Animation {
    id: AnimationId,
    target: Box<dyn PropertyTarget>,
    path: Path,
    tweener: Tweener,
    start_value: Value,
    end_value: Value,
    /// 当前周期的起点（往返模式下会与 `to` 交换）
    from: Value,
    /// 当前周期的终点
    to: Value,
    duration: f64,
    repeat: u32,
    reverse: bool,
    state: AnimationState,
    elapsed: f64,
    cycle_count: u64,
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("target", &self.target.key())
            .field("path", &self.path)
            .field("tweener", &self.tweener)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("repeat", &self.repeat)
            .field("reverse", &self.reverse)
            .field("state", &self.state)
            .field("elapsed", &self.elapsed)
            .field("cycle_count", &self.cycle_count)
            .finish()
    }
}

impl Animation {
    /// 创建动画（处于 Idle 状态）
    ///
    /// 参数在此处一次性校验：
    /// - `duration` 必须是非负有限数
    /// - Tweener 参数合法
    /// - 端点类型与属性类型一致，且 Path 支持该类型
    pub fn new(
        id: AnimationId,
        target: Box<dyn PropertyTarget>,
        start_value: Value,
        end_value: Value,
        duration: f64,
        options: &AnimateOptions,
    ) -> AnimResult<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnimError::InvalidDuration { duration });
        }
        options.tweener.validate()?;

        let path = options
            .path
            .unwrap_or_else(|| Path::default_for(target.value_type()));
        check_endpoints(target.as_ref(), path, &start_value, &end_value)?;

        Ok(Self {
            id,
            target,
            path,
            tweener: options.tweener.clone(),
            start_value,
            end_value,
            from: start_value,
            to: end_value,
            duration,
            repeat: options.repeat,
            reverse: options.reverse,
            state: AnimationState::Idle,
            elapsed: 0.0,
            cycle_count: 0,
        })
    }

    /// 开始播放：Idle → Running
    ///
    /// 重置 `elapsed` 和 `cycle_count`，并把起点值写入目标。
    /// 已在运行或已结束时为空操作（记录警告），返回 [`Step::Idle`]。
    /// `duration == 0` 时直接写入终点值并完成。
    pub fn start(&mut self) -> AnimResult<Step> {
        match self.state {
            AnimationState::Idle => {}
            AnimationState::Running => {
                warn!(id = %self.id, "动画已在运行，忽略重复的 start()");
                return Ok(Step::Idle);
            }
            AnimationState::Completed | AnimationState::Stopped => {
                warn!(id = %self.id, state = ?self.state, "动画已结束，需要 restart() 才能重新开始");
                return Ok(Step::Idle);
            }
        }

        self.from = self.start_value;
        self.to = self.end_value;
        self.elapsed = 0.0;
        self.cycle_count = 0;
        self.state = AnimationState::Running;
        debug!(id = %self.id, target = %self.target.key(), duration = self.duration, "动画开始");

        if self.duration <= 0.0 {
            return self.complete();
        }
        self.apply()
    }

    /// 推进动画
    ///
    /// 只有 Running 状态下才会推进；负数或 NaN 的 `dt` 按 0 处理。
    /// 一次调用跨越多个周期时按整除一次性结算，开销与 `dt` 大小无关。
    pub fn advance(&mut self, dt: f64) -> AnimResult<Step> {
        if self.state != AnimationState::Running {
            return Ok(Step::Idle);
        }
        if self.duration <= 0.0 {
            return self.complete();
        }

        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(id = %self.id, dt = dt, "无效的 dt，按 0 处理");
            0.0
        };
        self.elapsed += dt;

        let tolerance = self.duration * TIME_EPSILON;
        if self.elapsed + tolerance >= self.duration {
            let crossed = ((self.elapsed + tolerance) / self.duration).floor();
            let crossed_cycles = crossed as u64;

            if self.repeat != 0 {
                let remaining = u64::from(self.repeat).saturating_sub(self.cycle_count);
                if crossed_cycles >= remaining {
                    // 定位到最后一个周期的方向
                    if self.reverse && remaining > 0 && (remaining - 1) % 2 == 1 {
                        std::mem::swap(&mut self.from, &mut self.to);
                    }
                    return self.complete();
                }
            }

            self.cycle_count = self.cycle_count.saturating_add(crossed_cycles);
            self.elapsed = (self.elapsed - crossed * self.duration).clamp(0.0, self.duration);
            if self.reverse && crossed_cycles % 2 == 1 {
                std::mem::swap(&mut self.from, &mut self.to);
            }
        }

        self.apply()
    }

    /// 停止动画
    ///
    /// Idle / Running → Stopped，返回 `true`；已结束时为空操作，返回 `false`。
    pub fn stop(&mut self) -> bool {
        if self.state.is_finished() {
            return false;
        }
        self.state = AnimationState::Stopped;
        debug!(id = %self.id, "动画停止");
        true
    }

    /// 使用新的端点重新装填，回到 Idle 状态
    ///
    /// 运行中的动画需要先 `stop()`，否则返回 `Ok(false)` 且不做任何修改。
    pub fn rearm(&mut self, start_value: Value, end_value: Value) -> AnimResult<bool> {
        if self.state == AnimationState::Running {
            return Ok(false);
        }
        check_endpoints(self.target.as_ref(), self.path, &start_value, &end_value)?;

        self.start_value = start_value;
        self.end_value = end_value;
        self.from = start_value;
        self.to = end_value;
        self.elapsed = 0.0;
        self.cycle_count = 0;
        self.state = AnimationState::Idle;
        Ok(true)
    }

    /// 写入最终值并进入 Completed
    fn complete(&mut self) -> AnimResult<Step> {
        self.elapsed = self.duration;
        if self.repeat != 0 {
            self.cycle_count = u64::from(self.repeat);
        }
        let value = self.to;
        match self.write(value)? {
            Step::Finished { completed } => Ok(Step::Finished { completed }),
            _ => {
                self.state = AnimationState::Completed;
                debug!(id = %self.id, value = %value, "动画完成");
                Ok(Step::Finished { completed: true })
            }
        }
    }

    /// 计算当前值并写入目标
    fn apply(&mut self) -> AnimResult<Step> {
        let value = self.current_value()?;
        self.write(value)
    }

    fn write(&mut self, value: Value) -> AnimResult<Step> {
        match self.target.set(value) {
            Ok(()) => Ok(Step::Running),
            Err(AnimError::DeadTarget) => {
                debug!(id = %self.id, "动画目标已失效，自动停止");
                self.state = AnimationState::Stopped;
                Ok(Step::Finished { completed: false })
            }
            Err(e) => {
                self.state = AnimationState::Stopped;
                Err(e)
            }
        }
    }

    /// 按当前进度计算的插值
    pub fn current_value(&self) -> AnimResult<Value> {
        let eased = self.tweener.at(self.progress());
        self.path.at(&self.from, &self.to, eased)
    }

    /// 当前周期内的线性进度（0.0 - 1.0，未缓动）
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// 是否正在播放
    pub fn is_running(&self) -> bool {
        self.state == AnimationState::Running
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// 当前周期已经过的时间（秒）
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// 已完成的周期数
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn path(&self) -> Path {
        self.path
    }

    pub fn tweener(&self) -> &Tweener {
        &self.tweener
    }

    pub fn start_value(&self) -> Value {
        self.start_value
    }

    pub fn end_value(&self) -> Value {
        self.end_value
    }

    /// 当前周期的起点和终点
    pub fn endpoints(&self) -> (Value, Value) {
        (self.from, self.to)
    }

    /// 目标属性的唯一键
    pub fn target_key(&self) -> TargetKey {
        self.target.key()
    }
}

fn check_endpoints(
    target: &dyn PropertyTarget,
    path: Path,
    start_value: &Value,
    end_value: &Value,
) -> AnimResult<()> {
    let expected = target.value_type();
    for value in [start_value, end_value] {
        if value.value_type() != expected {
            return Err(AnimError::TypeMismatch {
                expected,
                actual: value.value_type(),
            });
        }
    }
    path.check(start_value, end_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PropertyCell;
    use crate::value::{IntPoint, ValueType};

    fn float_animation(cell: &PropertyCell, duration: f64, options: &AnimateOptions) -> Animation {
        Animation::new(
            AnimationId::new(1),
            Box::new(cell.target()),
            Value::Float(0.0),
            Value::Float(1.0),
            duration,
            options,
        )
        .unwrap()
    }

    fn float_of(cell: &PropertyCell) -> f64 {
        cell.get().as_float().unwrap()
    }

    #[test]
    fn test_animation_creation() {
        let cell = PropertyCell::new(0.5);
        let anim = float_animation(&cell, 1.0, &AnimateOptions::default());
        assert_eq!(anim.state(), AnimationState::Idle);
        assert_eq!(anim.path(), Path::Linear);
        assert_eq!(anim.elapsed(), 0.0);
        // 创建时不写入目标
        assert_eq!(float_of(&cell), 0.5);
    }

    #[test]
    fn test_invalid_parameters() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default();

        for duration in [-1.0, f64::NAN, f64::INFINITY] {
            let result = Animation::new(
                AnimationId::new(1),
                Box::new(cell.target()),
                Value::Float(0.0),
                Value::Float(1.0),
                duration,
                &options,
            );
            assert!(matches!(result, Err(AnimError::InvalidDuration { .. })));
        }

        let result = Animation::new(
            AnimationId::new(1),
            Box::new(cell.target()),
            Value::Float(0.0),
            Value::Bool(true),
            1.0,
            &options,
        );
        assert_eq!(
            result.unwrap_err(),
            AnimError::TypeMismatch {
                expected: ValueType::Float,
                actual: ValueType::Bool,
            }
        );

        let bad_tweener = options.clone().with_tweener(Tweener::Cycle { cycles: 0 });
        let result = Animation::new(
            AnimationId::new(1),
            Box::new(cell.target()),
            Value::Float(0.0),
            Value::Float(1.0),
            1.0,
            &bad_tweener,
        );
        assert_eq!(result.unwrap_err(), AnimError::InvalidCycles { cycles: 0 });

        let bad_path = options.with_path(Path::Boolean);
        let result = Animation::new(
            AnimationId::new(1),
            Box::new(cell.target()),
            Value::Float(0.0),
            Value::Float(1.0),
            1.0,
            &bad_path,
        );
        assert!(matches!(result, Err(AnimError::UnsupportedPath { .. })));
    }

    #[test]
    fn test_start_writes_start_value() {
        let cell = PropertyCell::new(0.5);
        let mut anim = float_animation(&cell, 1.0, &AnimateOptions::default());
        assert_eq!(anim.start().unwrap(), Step::Running);
        assert!(anim.is_running());
        assert_eq!(float_of(&cell), 0.0);
    }

    #[test]
    fn test_double_start_is_noop() {
        let cell = PropertyCell::new(0.0);
        let mut anim = float_animation(&cell, 1.0, &AnimateOptions::default());
        anim.start().unwrap();
        anim.advance(0.5).unwrap();

        assert_eq!(anim.start().unwrap(), Step::Idle);
        // 不会重置进度
        assert_eq!(anim.elapsed(), 0.5);
    }

    #[test]
    fn test_advance_before_start_is_idle() {
        let cell = PropertyCell::new(0.5);
        let mut anim = float_animation(&cell, 1.0, &AnimateOptions::default());
        assert_eq!(anim.advance(0.3).unwrap(), Step::Idle);
        assert_eq!(anim.elapsed(), 0.0);
        assert_eq!(float_of(&cell), 0.5);
    }

    #[test]
    fn test_single_cycle_completes_exactly() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(1);
        let mut anim = float_animation(&cell, 1.0, &options);
        anim.start().unwrap();

        assert_eq!(anim.advance(0.25).unwrap(), Step::Running);
        assert_eq!(float_of(&cell), 0.25);
        assert_eq!(anim.advance(0.5).unwrap(), Step::Running);
        assert_eq!(anim.advance(0.25).unwrap(), Step::Finished { completed: true });

        assert_eq!(anim.state(), AnimationState::Completed);
        assert_eq!(float_of(&cell), 1.0);
        assert_eq!(anim.cycle_count(), 1);
        assert_eq!(anim.elapsed(), anim.duration());
    }

    #[test]
    fn test_decimal_steps_complete() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(1);
        let mut anim = float_animation(&cell, 1.0, &options);
        anim.start().unwrap();

        let mut last = Step::Running;
        for _ in 0..10 {
            last = anim.advance(0.1).unwrap();
        }
        assert_eq!(last, Step::Finished { completed: true });
        assert_eq!(float_of(&cell), 1.0);
    }

    #[test]
    fn test_tiny_duration_zero_dt_crosses_nothing() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(0);
        let mut anim = float_animation(&cell, 1e-10, &options);
        anim.start().unwrap();

        assert_eq!(anim.advance(0.0).unwrap(), Step::Running);
        assert_eq!(anim.cycle_count(), 0);
        anim.advance(1e-10).unwrap();
        assert_eq!(anim.cycle_count(), 1);
    }

    #[test]
    fn test_frame_rate_independence() {
        let irregular = PropertyCell::new(0.0);
        let single = PropertyCell::new(0.0);
        let options = AnimateOptions::default()
            .with_repeat(3)
            .with_reverse(true)
            .with_tweener(Tweener::EaseOutEaseIn);

        let mut a = float_animation(&irregular, 0.5, &options);
        let mut b = float_animation(&single, 0.5, &options);
        a.start().unwrap();
        b.start().unwrap();

        for dt in [0.125, 0.25, 0.0625, 0.5, 0.0625] {
            a.advance(dt).unwrap();
        }
        b.advance(1.0).unwrap();

        assert_eq!(a.state(), b.state());
        assert_eq!(a.cycle_count(), b.cycle_count());
        assert_eq!(a.elapsed(), b.elapsed());
        assert_eq!(a.endpoints(), b.endpoints());
        assert_eq!(irregular.get(), single.get());
    }

    #[test]
    fn test_repeat_wraps_remainder() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(3);
        let mut anim = float_animation(&cell, 1.0, &options);
        anim.start().unwrap();

        anim.advance(1.25).unwrap();
        assert!(anim.is_running());
        assert_eq!(anim.cycle_count(), 1);
        assert_eq!(anim.elapsed(), 0.25);
        // 非往返模式：每个周期从起点重新开始
        assert_eq!(float_of(&cell), 0.25);
    }

    #[test]
    fn test_reverse_ping_pong() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(2).with_reverse(true);
        let mut anim = float_animation(&cell, 1.0, &options);
        anim.start().unwrap();

        anim.advance(1.25).unwrap();
        // 第二个周期从 1.0 回到 0.0
        assert_eq!(anim.endpoints(), (Value::Float(1.0), Value::Float(0.0)));
        assert_eq!(float_of(&cell), 0.75);

        assert_eq!(anim.advance(0.75).unwrap(), Step::Finished { completed: true });
        assert_eq!(float_of(&cell), 0.0);
    }

    #[test]
    fn test_reverse_completion_in_single_jump() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(3).with_reverse(true);
        let mut anim = float_animation(&cell, 1.0, &options);
        anim.start().unwrap();

        // 奇数个周期：最终停在终点
        assert_eq!(anim.advance(10.0).unwrap(), Step::Finished { completed: true });
        assert_eq!(float_of(&cell), 1.0);
        assert_eq!(anim.cycle_count(), 3);
    }

    #[test]
    fn test_indefinite_never_completes() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(0);
        let mut anim = float_animation(&cell, 0.1, &options);
        anim.start().unwrap();

        for _ in 0..1000 {
            assert_eq!(anim.advance(0.037).unwrap(), Step::Running);
        }
        assert_eq!(anim.advance(1.0e6).unwrap(), Step::Running);
        assert!(anim.elapsed() >= 0.0 && anim.elapsed() <= anim.duration());

        assert!(anim.stop());
        assert_eq!(anim.state(), AnimationState::Stopped);
        assert!(!anim.stop());
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let cell = PropertyCell::new(0.0);
        let mut anim = float_animation(&cell, 0.0, &AnimateOptions::default());
        assert_eq!(anim.start().unwrap(), Step::Finished { completed: true });
        assert_eq!(anim.state(), AnimationState::Completed);
        assert_eq!(float_of(&cell), 1.0);
        assert_eq!(anim.progress(), 1.0);
    }

    #[test]
    fn test_negative_dt_ignored() {
        let cell = PropertyCell::new(0.0);
        let mut anim = float_animation(&cell, 1.0, &AnimateOptions::default());
        anim.start().unwrap();
        anim.advance(0.5).unwrap();
        anim.advance(-0.3).unwrap();
        anim.advance(f64::NAN).unwrap();
        assert_eq!(anim.elapsed(), 0.5);
    }

    #[test]
    fn test_dead_target_auto_stops() {
        let cell = PropertyCell::new(0.0);
        let mut anim = float_animation(&cell, 1.0, &AnimateOptions::default());
        anim.start().unwrap();
        drop(cell);

        assert_eq!(anim.advance(0.1).unwrap(), Step::Finished { completed: false });
        assert_eq!(anim.state(), AnimationState::Stopped);
        assert_eq!(anim.advance(0.1).unwrap(), Step::Idle);
    }

    #[test]
    fn test_point_animation_uses_default_path() {
        let cell = PropertyCell::new(IntPoint::new(0, 0));
        let mut anim = Animation::new(
            AnimationId::new(7),
            Box::new(cell.target()),
            Value::from((0, 0)),
            Value::from((10, 10)),
            2.0,
            &AnimateOptions::default().with_repeat(1),
        )
        .unwrap();
        assert_eq!(anim.path(), Path::Linear2DInt);

        anim.start().unwrap();
        anim.advance(1.0).unwrap();
        assert_eq!(cell.get(), Value::from((5, 5)));
    }

    #[test]
    fn test_rearm() {
        let cell = PropertyCell::new(0.0);
        let options = AnimateOptions::default().with_repeat(1);
        let mut anim = float_animation(&cell, 1.0, &options);
        anim.start().unwrap();
        assert_eq!(anim.rearm(Value::Float(2.0), Value::Float(3.0)), Ok(false));

        anim.advance(1.0).unwrap();
        assert!(anim.is_finished());
        assert_eq!(anim.start().unwrap(), Step::Idle);

        assert_eq!(anim.rearm(Value::Float(2.0), Value::Float(3.0)), Ok(true));
        assert_eq!(anim.state(), AnimationState::Idle);
        anim.start().unwrap();
        anim.advance(0.5).unwrap();
        assert_eq!(float_of(&cell), 2.5);

        anim.stop();
        assert!(anim.rearm(Value::Bool(true), Value::Bool(false)).is_err());
    }
}
