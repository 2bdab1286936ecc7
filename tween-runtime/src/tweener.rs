//! # Tweener 模块
//!
//! 时间缓动函数库：把线性时间 `t ∈ [0, 1]` 映射为缓动后的时间 `t' ∈ [0, 1]`。
//!
//! 所有 Tweener 都是无状态的纯函数，可以在任意多个动画之间共享。
//! 除 `Cycle` 外均满足 `at(0) == 0`、`at(1) == 1`；`Cycle` 在 `[0, 1)` 内是三角波，
//! 并在 `t == 1` 处显式钉住为 1。
//!
//! Tweener 可以嵌套组合：`outer.compose(inner).at(t) == outer.at(inner.at(t))`。
//! 例如 `EaseIn.compose(ramp)` 先按 Ramp 划出运动时间窗，再在窗口内缓入。

use std::f64::consts::PI;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{AnimError, AnimResult};

/// `tanh(2.5)`，tanh 系列缓动共用的归一化常量
static TANH_2_5: LazyLock<f64> = LazyLock::new(|| 2.5_f64.tanh());

/// 缓动函数
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tweener {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 缓入：`tanh(2.5t) / tanh(2.5)`
    EaseIn,
    /// 缓出：`tanh(2.5(t-1)) / tanh(2.5) + 1`
    EaseOut,
    /// 先缓出后缓入（S 曲线）
    EaseOutEaseIn,
    /// 基于正弦的 S 曲线
    Easy,
    /// 三角波，在 `[0, 1]` 内往返 `cycles` 次
    Cycle { cycles: u32 },
    /// 弹跳缓出
    Bounce,
    /// 线性斜坡：只在 `[0, 1]` 中长度为 `cycle` 的窗口内运动，窗口之前为 0、之后为 1
    ///
    /// - `start`：窗口位置，0 表示贴住开头，1 表示贴住结尾
    /// - `cycle`：窗口长度（占空比），`(0, 1]`
    /// - `level`：窗口两端各用多少比例做线性加速 / 减速，`[0, 0.5]`，0 即匀速
    Ramp { start: f64, cycle: f64, level: f64 },
    /// 内层 Tweener 的中心对称镜像：`1 - inner(1 - t)`
    Retrograde { inner: Box<Tweener> },
    /// 组合：`outer(inner(t))`
    Compose {
        outer: Box<Tweener>,
        inner: Box<Tweener>,
    },
}

impl Tweener {
    /// 创建循环 Tweener
    ///
    /// `cycles` 至少为 1。
    pub fn cycle(cycles: u32) -> AnimResult<Self> {
        if cycles < 1 {
            return Err(AnimError::InvalidCycles { cycles });
        }
        Ok(Self::Cycle { cycles })
    }

    /// 默认斜坡：占满整段时间，两端各 20% 用于加速 / 减速
    pub fn default_ramp() -> Self {
        Self::Ramp {
            start: 0.0,
            cycle: 1.0,
            level: 0.2,
        }
    }

    /// 创建斜坡 Tweener
    pub fn ramp(start: f64, cycle: f64, level: f64) -> AnimResult<Self> {
        let ramp = Self::Ramp { start, cycle, level };
        ramp.validate()?;
        Ok(ramp)
    }

    /// 创建镜像 Tweener
    pub fn retrograde(inner: Tweener) -> Self {
        Self::Retrograde {
            inner: Box::new(inner),
        }
    }

    /// 与内层 Tweener 组合，先应用 `inner` 再应用 `self`
    #[must_use]
    pub fn compose(self, inner: Tweener) -> Self {
        Self::Compose {
            outer: Box::new(self),
            inner: Box::new(inner),
        }
    }

    /// 校验参数（递归检查组合中的每一层）
    pub fn validate(&self) -> AnimResult<()> {
        match self {
            Self::Cycle { cycles } if *cycles < 1 => Err(AnimError::InvalidCycles { cycles: *cycles }),
            Self::Ramp { start, cycle, level } => {
                let valid = (0.0..=1.0).contains(start)
                    && *cycle > 0.0
                    && *cycle <= 1.0
                    && (0.0..=0.5).contains(level);
                if valid {
                    Ok(())
                } else {
                    Err(AnimError::InvalidRamp {
                        start: *start,
                        cycle: *cycle,
                        level: *level,
                    })
                }
            }
            Self::Retrograde { inner } => inner.validate(),
            Self::Compose { outer, inner } => {
                outer.validate()?;
                inner.validate()
            }
            _ => Ok(()),
        }
    }

    /// 计算缓动后的时间
    ///
    /// # 参数
    /// - `t`: 时间进度，超出 `[0, 1]` 的部分会被截断
    pub fn at(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Self::Linear => t,
            Self::EaseIn => (2.5 * t).tanh() / *TANH_2_5,
            Self::EaseOut => (2.5 * (t - 1.0)).tanh() / *TANH_2_5 + 1.0,
            Self::EaseOutEaseIn => ((5.0 * t - 2.5).tanh() / *TANH_2_5 + 1.0) / 2.0,
            Self::Easy => (1.0 + (PI * t - PI / 2.0).sin()) / 2.0,
            Self::Cycle { cycles } => cycle(t, (*cycles).max(1)),
            Self::Bounce => bounce(t),
            Self::Ramp { start, cycle, level } => ramp(t, *start, *cycle, *level),
            Self::Retrograde { inner } => 1.0 - inner.at(1.0 - t),
            Self::Compose { outer, inner } => outer.at(inner.at(t)),
        }
    }

    /// 名称（用于日志和调试输出），可以被 [`FromStr`] 原样解析回来
    pub fn name(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::EaseIn => "ease_in".to_string(),
            Self::EaseOut => "ease_out".to_string(),
            Self::EaseOutEaseIn => "ease_out_ease_in".to_string(),
            Self::Easy => "easy".to_string(),
            Self::Cycle { cycles } => format!("cycle:{cycles}"),
            Self::Bounce => "bounce".to_string(),
            Self::Ramp { start, cycle, level } => format!("ramp:{start},{cycle},{level}"),
            Self::Retrograde { inner } => format!("retrograde:{}", inner.grouped_name()),
            // `+` 右结合，只有左侧的组合需要括号
            Self::Compose { outer, inner } => {
                format!("{}+{}", outer.grouped_name(), inner.name())
            }
        }
    }

    fn grouped_name(&self) -> String {
        match self {
            Self::Compose { .. } => format!("({})", self.name()),
            _ => self.name(),
        }
    }
}

impl std::fmt::Display for Tweener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// 从名称解析 Tweener
///
/// 语法与 [`Tweener::name`] 的输出一致：
/// - `linear` / `ease_in` / `ease_out` / `ease_out_ease_in` / `easy` / `bounce`
/// - `cycle:N`
/// - `ramp`（默认参数）或 `ramp:START,CYCLE,LEVEL`
/// - `retrograde:<项>`
/// - `a+b` 表示 `a` 组合 `b`，右结合：`a+b+c` 即 `a+(b+c)`
/// - `(...)` 分组，例如 `retrograde:(ease_in+cycle:2)`
impl FromStr for Tweener {
    type Err = AnimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || AnimError::UnknownTweener {
            name: s.to_string(),
        };

        if let Some((outer, inner)) = split_top_level(s).ok_or_else(unknown)? {
            let outer = parse_term(outer)?;
            let inner: Tweener = inner.parse()?;
            return Ok(outer.compose(inner));
        }
        parse_term(s)
    }
}

/// 在括号之外的第一个 `+` 处切分；括号不配对时返回 `None`
fn split_top_level(s: &str) -> Option<Option<(&str, &str)>> {
    let mut depth = 0_usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            '+' if depth == 0 => return Some(Some((&s[..i], &s[i + 1..]))),
            _ => {}
        }
    }
    (depth == 0).then_some(None)
}

/// 解析不含顶层 `+` 的单项
fn parse_term(s: &str) -> AnimResult<Tweener> {
    let s = s.trim();
    let unknown = || AnimError::UnknownTweener {
        name: s.to_string(),
    };

    if let Some(group) = s.strip_prefix('(').and_then(|g| g.strip_suffix(')')) {
        return group.parse();
    }
    if let Some(inner) = s.strip_prefix("retrograde:") {
        return Ok(Tweener::retrograde(parse_term(inner)?));
    }
    if let Some(cycles) = s.strip_prefix("cycle:") {
        let cycles = cycles.trim().parse::<u32>().map_err(|_| unknown())?;
        return Tweener::cycle(cycles);
    }
    if let Some(params) = s.strip_prefix("ramp:") {
        let params = params
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| unknown())?;
        let [start, cycle, level] = params[..] else {
            return Err(unknown());
        };
        return Tweener::ramp(start, cycle, level);
    }

    match s {
        "linear" => Ok(Tweener::Linear),
        "ease_in" => Ok(Tweener::EaseIn),
        "ease_out" => Ok(Tweener::EaseOut),
        "ease_out_ease_in" => Ok(Tweener::EaseOutEaseIn),
        "easy" => Ok(Tweener::Easy),
        "bounce" => Ok(Tweener::Bounce),
        "ramp" => Ok(Tweener::default_ramp()),
        _ => Err(unknown()),
    }
}

/// 三角波
fn cycle(t: f64, cycles: u32) -> f64 {
    if t >= 1.0 {
        return 1.0;
    }
    let mut v = (t * f64::from(cycles)) % 1.0;
    if v >= 0.5 {
        v = 1.0 - v;
    }
    2.0 * v
}

/// 线性斜坡
///
/// 先把 `t` 映射到窗口内的局部时间 `u`，再按梯形速度曲线积分：
/// 两端各 `level` 长度内速度线性变化，中段匀速，总位移为 1。
fn ramp(t: f64, start: f64, cycle: f64, level: f64) -> f64 {
    if cycle.is_nan() || cycle <= 0.0 {
        return if t >= start { 1.0 } else { 0.0 };
    }
    let cycle = cycle.min(1.0);
    let offset = if start.is_nan() { 0.0 } else { start.clamp(0.0, 1.0) } * (1.0 - cycle);
    let u = ((t - offset) / cycle).clamp(0.0, 1.0);

    let r = if level.is_nan() { 0.0 } else { level.clamp(0.0, 0.5) };
    if r <= 0.0 {
        return u;
    }
    let peak = 1.0 / (1.0 - r);
    if u < r {
        peak * u * u / (2.0 * r)
    } else if u <= 1.0 - r {
        peak * (u - r / 2.0)
    } else {
        let rest = 1.0 - u;
        1.0 - peak * rest * rest / (2.0 * r)
    }
}

/// 弹跳缓出
fn bounce(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}
