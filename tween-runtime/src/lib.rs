//! # Tween Runtime
//!
//! 基于时间的属性动画引擎：在指定时长内，按缓动曲线和插值路径把目标属性
//! 从起点值变化到终点值。
//!
//! ## 架构概述
//!
//! 引擎不依赖任何渲染或事件循环，宿主负责计算 `dt` 并驱动调度器：
//!
//! ```text
//! Host                           Scheduler
//!   │                               │
//!   │──── animate(target, ..) ─────►│  → AnimationHandle
//!   │──── tick(dt) ────────────────►│  advance(dt) → Tweener → Path → target.set()
//!   │◄─── Vec<AnimationEvent> ──────│
//! ```
//!
//! ## 核心类型
//!
//! - [`Tweener`]：时间重映射（缓动）函数，`[0,1] → [0,1]`
//! - [`Path`]：两个端点之间的值插值函数，按 [`ValueType`] 选择
//! - [`Animation`]：单个属性动画的状态机
//! - [`AnimationHandle`]：共享的动画控制句柄
//! - [`AnimationItems`]：一组可动画实体的整体控制
//! - [`Scheduler`]：动画登记表与 tick 驱动
//!
//! ## 使用示例
//!
//! ```ignore
//! use tween_runtime::{AnimateOptions, PropertyCell, Scheduler, Tweener};
//!
//! let opacity = PropertyCell::new(0.0);
//! let mut scheduler = Scheduler::new();
//! let handle = scheduler.animate(
//!     opacity.target(),
//!     0.0,
//!     1.0,
//!     0.3,
//!     AnimateOptions::default().with_tweener(Tweener::EaseOut).with_repeat(1),
//! )?;
//! handle.on_stopped(|completed| println!("finished: {completed}"));
//! handle.start();
//!
//! let mut clock = FrameClock::default();
//! while scheduler.has_active_animations() {
//!     scheduler.tick(clock.tick());
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`tweener`]：缓动函数
//! - [`value`]：动画值类型
//! - [`path`]：插值路径
//! - [`target`]：属性目标接口
//! - [`animation`]：动画状态机
//! - [`handle`]：动画句柄与 [`Animatable`] 接口
//! - [`items`]：动画组合
//! - [`scheduler`]：调度器
//! - [`clock`]：帧时钟
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod clock;
pub mod config;
pub mod error;
pub mod handle;
pub mod items;
pub mod path;
pub mod scheduler;
pub mod target;
pub mod tweener;
pub mod value;

// 重导出核心类型
pub use animation::{AnimateOptions, Animation, AnimationId, AnimationState, Step};
pub use clock::FrameClock;
pub use config::{AnimationConfig, ClockConfig, ConfigError};
pub use error::{AnimError, AnimResult};
pub use handle::{Animatable, AnimationHandle};
pub use items::AnimationItems;
pub use path::Path;
pub use scheduler::Scheduler;
pub use target::{
    AnimatableObject, CellTarget, ObjectProperty, PropertyCell, PropertyTarget, TargetKey,
};
pub use tweener::Tweener;
pub use value::{Color, IntPoint, Value, ValueType};

/// 动画事件
///
/// 由 [`Scheduler::tick`] 按发生顺序返回。
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// 动画开始
    Started(AnimationId),
    /// 动画自然完成
    Completed(AnimationId),
    /// 动画被停止（显式 stop、被替换或目标失效）
    Stopped(AnimationId),
    /// 目标写入失败，动画已停止
    Failed {
        /// 动画 ID
        id: AnimationId,
        /// 写入错误
        error: AnimError,
    },
}

impl AnimationEvent {
    /// 事件对应的动画 ID
    pub fn id(&self) -> AnimationId {
        match self {
            Self::Started(id) | Self::Completed(id) | Self::Stopped(id) => *id,
            Self::Failed { id, .. } => *id,
        }
    }
}
