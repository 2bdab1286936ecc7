//! # Error 模块
//!
//! 定义 tween-runtime 中使用的错误类型。
//!
//! 参数错误（时长、循环次数、值类型不匹配）在 `animate()` / `start()` 时同步返回；
//! 运行期间的写入错误由调度器捕获并转交给动画的错误回调，不会中断其它动画。

use thiserror::Error;

use crate::value::ValueType;

/// 动画错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// 无效的动画时长（负数或 NaN）
    #[error("无效的动画时长 {duration}：必须是非负有限数")]
    InvalidDuration { duration: f64 },

    /// CycleTweener 的循环次数无效
    #[error("无效的循环次数 {cycles}：至少为 1")]
    InvalidCycles { cycles: u32 },

    /// RampTweener 参数越界
    #[error("无效的斜坡参数 start={start} cycle={cycle} level={level}")]
    InvalidRamp { start: f64, cycle: f64, level: f64 },

    /// 值类型与期望不符
    #[error("值类型不匹配：期望 {expected}，实际 {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    /// Path 不支持该值类型
    #[error("路径 '{path}' 不支持 {value_type} 类型的值")]
    UnsupportedPath {
        path: &'static str,
        value_type: ValueType,
    },

    /// 无法识别的 Tweener 名称
    #[error("未知的 Tweener '{name}'")]
    UnknownTweener { name: String },

    /// 无法识别的 Path 名称
    #[error("未知的路径 '{name}'")]
    UnknownPath { name: String },

    /// 目标对象已销毁
    #[error("动画目标已失效")]
    DeadTarget,

    /// 目标对象没有该属性
    #[error("属性 '{property}' 不存在")]
    UnknownProperty { property: String },

    /// 调度器已关闭
    #[error("调度器已关闭，无法注册动画")]
    SchedulerShutdown,

    /// 动画正在写入目标（例如在目标 setter 中重启自身）
    #[error("动画正在推进中，无法重新装填")]
    Busy,

    /// 目标写入时发生的其它错误
    #[error("属性写入失败: {message}")]
    WriteFailed { message: String },
}

impl AnimError {
    /// 是否为"目标失效"错误
    ///
    /// 目标失效不作为错误上报，动画会被静默停止。
    pub fn is_dead_target(&self) -> bool {
        matches!(self, Self::DeadTarget)
    }
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimError>;
