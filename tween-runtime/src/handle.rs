//! # Handle 模块
//!
//! [`AnimationHandle`] 是动画的共享控制句柄（`Rc` 内部可变性），
//! 由调度器和调用方共同持有。
//!
//! - 控制：`start()` / `stop()` / `restart()` / `is_running()`
//! - 通知：`on_stopped(|completed| ..)`、`on_error(|err| ..)`
//!
//! 回调在动画的内部借用释放之后才执行，因此回调中可以安全地启动或停止
//! 任意动画（包括自身）。目标 setter 在写入期间调用自身句柄时：
//! 查询返回上一步的快照，`stop()` 延迟到本步结束，`restart()` 返回
//! [`AnimError::Busy`]。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::AnimationEvent;
use crate::animation::{Animation, AnimationId, AnimationState, Step};
use crate::error::{AnimError, AnimResult};
use crate::scheduler::Registry;
use crate::target::TargetKey;
use crate::value::Value;

/// 可动画实体接口
///
/// 单个动画和动画组合（[`AnimationItems`](crate::AnimationItems)）都实现此接口。
pub trait Animatable {
    /// 开始播放，返回是否真的发生了状态切换
    fn start(&self) -> bool;

    /// 停止播放
    fn stop(&self);

    /// 是否正在播放
    fn is_running(&self) -> bool;

    /// 重复次数，0 表示无限循环
    fn repeat(&self) -> u32;

    /// 是否往返播放
    fn reverse(&self) -> bool;
}

type StoppedListener = Box<dyn FnMut(bool)>;
type ErrorListener = Box<dyn FnMut(&AnimError)>;

struct HandleInner {
    id: AnimationId,
    target_key: TargetKey,
    repeat: u32,
    reverse: bool,
    animation: RefCell<Animation>,
    /// 最近一步结束后的 (progress, cycle_count)
    snapshot: Cell<(f64, u64)>,
    stopped_listeners: RefCell<Vec<StoppedListener>>,
    error_listeners: RefCell<Vec<ErrorListener>>,
    registry: RefCell<Weak<Registry>>,
    /// 在自身推进过程中（例如目标 setter 内）请求的停止
    stop_requested: Cell<bool>,
}

/// 动画控制句柄
#[derive(Clone)]
pub struct AnimationHandle {
    inner: Rc<HandleInner>,
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

impl AnimationHandle {
    /// 创建不属于任何调度器的句柄
    ///
    /// 需要调用方自行 `advance()`，或通过 [`Scheduler::register`](crate::Scheduler::register) 注册。
    pub fn detached(animation: Animation) -> Self {
        Self::with_registry(animation, Weak::new())
    }

    pub(crate) fn with_registry(animation: Animation, registry: Weak<Registry>) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                id: animation.id(),
                target_key: animation.target_key(),
                repeat: animation.repeat(),
                reverse: animation.reverse(),
                snapshot: Cell::new((animation.progress(), animation.cycle_count())),
                animation: RefCell::new(animation),
                stopped_listeners: RefCell::new(Vec::new()),
                error_listeners: RefCell::new(Vec::new()),
                registry: RefCell::new(registry),
                stop_requested: Cell::new(false),
            }),
        }
    }

    pub(crate) fn attach(&self, registry: Weak<Registry>) {
        *self.inner.registry.borrow_mut() = registry;
    }

    fn registry(&self) -> Option<Rc<Registry>> {
        self.inner.registry.borrow().upgrade()
    }

    /// 动画 ID
    pub fn id(&self) -> AnimationId {
        self.inner.id
    }

    /// 两个句柄是否指向同一个动画
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// 当前状态
    ///
    /// 动画正在自身的推进过程中时视为 Running。
    pub fn state(&self) -> AnimationState {
        self.inner
            .animation
            .try_borrow()
            .map_or(AnimationState::Running, |a| a.state())
    }

    /// 是否正在播放
    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    /// 是否已结束（Completed / Stopped）
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// 开始播放
    ///
    /// 已在运行或已结束时为空操作，返回 `false`。
    pub fn start(&self) -> bool {
        let Ok(mut animation) = self.inner.animation.try_borrow_mut() else {
            warn!(id = %self.id(), "动画正在推进中，忽略重复的 start");
            return false;
        };
        let result = animation.start();
        drop(animation);
        self.refresh_snapshot();
        let started = !matches!(result, Ok(Step::Idle));
        if started {
            self.push_event(AnimationEvent::Started(self.id()));
        }
        self.finish_step(result);
        if self.inner.stop_requested.take() {
            self.stop();
        }
        started
    }

    /// 推进动画 `dt` 秒
    ///
    /// 通常由调度器调用；未注册的句柄可以手动驱动。
    pub fn advance(&self, dt: f64) -> Step {
        let Ok(mut animation) = self.inner.animation.try_borrow_mut() else {
            return Step::Running;
        };
        let result = animation.advance(dt);
        drop(animation);
        self.refresh_snapshot();
        let step = self.finish_step(result);
        if self.inner.stop_requested.take() {
            self.stop();
            return Step::Finished { completed: false };
        }
        step
    }

    /// 停止动画
    ///
    /// 立即生效并触发 `stopped(false)`；已结束时为空操作。
    pub fn stop(&self) {
        let Ok(mut animation) = self.inner.animation.try_borrow_mut() else {
            // 正在自身的推进过程中，推进结束后再停止
            self.inner.stop_requested.set(true);
            return;
        };
        let stopped = animation.stop();
        drop(animation);
        self.refresh_snapshot();

        if stopped {
            self.deregister();
            self.notify_stopped(false);
        }
    }

    /// 使用新的端点重新开始
    ///
    /// 运行中的动画先被停止（触发 `stopped(false)`），然后回到 Idle、重新注册到调度器并开始播放。
    ///
    /// 所属调度器已关闭时返回 [`AnimError::SchedulerShutdown`]，
    /// 在自身写入过程中调用时返回 [`AnimError::Busy`]，两种情况下动画都保持原样。
    pub fn restart(&self, start_value: impl Into<Value>, end_value: impl Into<Value>) -> AnimResult<()> {
        if self.inner.animation.try_borrow_mut().is_err() {
            return Err(AnimError::Busy);
        }
        let registry = self.registry();
        if registry.as_ref().is_some_and(|r| r.is_shut_down()) {
            return Err(AnimError::SchedulerShutdown);
        }

        if self.is_running() {
            self.stop();
        }
        self.inner
            .animation
            .try_borrow_mut()
            .map_err(|_| AnimError::Busy)?
            .rearm(start_value.into(), end_value.into())?;
        self.refresh_snapshot();

        if let Some(registry) = registry {
            registry.register(self)?;
        }
        self.start();
        Ok(())
    }

    /// 注册停止回调
    ///
    /// 参数为 `true` 表示自然完成，`false` 表示被停止。
    pub fn on_stopped(&self, listener: impl FnMut(bool) + 'static) {
        self.inner
            .stopped_listeners
            .borrow_mut()
            .push(Box::new(listener));
    }

    /// 注册错误回调
    ///
    /// 运行期间目标写入失败时调用，随后动画被停止。
    pub fn on_error(&self, listener: impl FnMut(&AnimError) + 'static) {
        self.inner
            .error_listeners
            .borrow_mut()
            .push(Box::new(listener));
    }

    /// 读取动画内部状态
    ///
    /// 动画正在写入目标时（例如从目标 setter 中调用）返回 `None`。
    pub fn with_animation<R>(&self, f: impl FnOnce(&Animation) -> R) -> Option<R> {
        self.inner.animation.try_borrow().ok().map(|a| f(&a))
    }

    /// 当前周期内的线性进度
    ///
    /// 写入过程中返回上一步结束时的值。
    pub fn progress(&self) -> f64 {
        self.with_animation(Animation::progress)
            .unwrap_or(self.inner.snapshot.get().0)
    }

    /// 已完成的周期数
    pub fn cycle_count(&self) -> u64 {
        self.with_animation(Animation::cycle_count)
            .unwrap_or(self.inner.snapshot.get().1)
    }

    /// 目标属性的唯一键
    pub fn target_key(&self) -> TargetKey {
        self.inner.target_key.clone()
    }

    fn refresh_snapshot(&self) {
        if let Ok(animation) = self.inner.animation.try_borrow() {
            self.inner
                .snapshot
                .set((animation.progress(), animation.cycle_count()));
        }
    }

    fn finish_step(&self, result: AnimResult<Step>) -> Step {
        match result {
            Ok(Step::Finished { completed }) => {
                self.deregister();
                self.notify_stopped(completed);
                Step::Finished { completed }
            }
            Ok(step) => step,
            Err(error) => {
                warn!(id = %self.id(), error = %error, "动画写入失败，已停止");
                self.deregister();
                self.push_event(AnimationEvent::Failed {
                    id: self.id(),
                    error: error.clone(),
                });
                self.notify_error(&error);
                self.notify_stopped(false);
                Step::Finished { completed: false }
            }
        }
    }

    fn deregister(&self) {
        if let Some(registry) = self.registry() {
            registry.deregister(self);
        }
    }

    fn push_event(&self, event: AnimationEvent) {
        if let Some(registry) = self.registry() {
            registry.push_event(event);
        }
    }

    fn notify_stopped(&self, completed: bool) {
        let event = if completed {
            AnimationEvent::Completed(self.id())
        } else {
            AnimationEvent::Stopped(self.id())
        };
        self.push_event(event);

        let mut listeners = std::mem::take(&mut *self.inner.stopped_listeners.borrow_mut());
        for listener in &mut listeners {
            listener(completed);
        }
        // 回调中新注册的监听器排在后面
        let mut slot = self.inner.stopped_listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }

    fn notify_error(&self, error: &AnimError) {
        let mut listeners = std::mem::take(&mut *self.inner.error_listeners.borrow_mut());
        for listener in &mut listeners {
            listener(error);
        }
        let mut slot = self.inner.error_listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }
}

impl Animatable for AnimationHandle {
    fn start(&self) -> bool {
        AnimationHandle::start(self)
    }

    fn stop(&self) {
        AnimationHandle::stop(self);
    }

    fn is_running(&self) -> bool {
        AnimationHandle::is_running(self)
    }

    fn repeat(&self) -> u32 {
        self.inner.repeat
    }

    fn reverse(&self) -> bool {
        self.inner.reverse
    }
}
