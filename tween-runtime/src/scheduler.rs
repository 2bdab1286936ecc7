//! # Scheduler 模块
//!
//! 动画调度器：登记所有动画，并在每个 tick 推进正在运行的动画。
//!
//! ```rust,ignore
//! let mut scheduler = Scheduler::new();
//! let handle = scheduler.animate(cell.target(), 0.0, 1.0, 0.3, scheduler.options())?;
//! handle.start();
//! loop {
//!     for event in scheduler.tick(clock.tick()) { /* ... */ }
//! }
//! ```
//!
//! ## 迭代安全
//!
//! `tick()` 先对登记表做快照再逐个推进，回调中注册、停止或重启任何动画
//! 都不会破坏本次迭代；本 tick 中新加入的动画从下一个 tick 开始推进。
//! 动画结束时由句柄自行从登记表注销。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::AnimationEvent;
use crate::animation::{AnimateOptions, Animation, AnimationId};
use crate::config::AnimationConfig;
use crate::error::{AnimError, AnimResult};
use crate::handle::AnimationHandle;
use crate::target::{AnimatableObject, ObjectProperty, PropertyTarget, TargetKey};
use crate::value::Value;

/// 调度器与句柄共享的登记表
///
/// 句柄只持有 `Weak` 引用，调度器销毁后句柄仍可使用，只是不再被推进。
#[derive(Default)]
pub(crate) struct Registry {
    entries: RefCell<Vec<AnimationHandle>>,
    events: RefCell<Vec<AnimationEvent>>,
    shut_down: Cell<bool>,
}

impl Registry {
    pub(crate) fn register(&self, handle: &AnimationHandle) -> AnimResult<()> {
        if self.shut_down.get() {
            return Err(AnimError::SchedulerShutdown);
        }
        let mut entries = self.entries.borrow_mut();
        if !entries.iter().any(|h| h.ptr_eq(handle)) {
            entries.push(handle.clone());
        }
        Ok(())
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }

    pub(crate) fn deregister(&self, handle: &AnimationHandle) {
        self.entries.borrow_mut().retain(|h| !h.ptr_eq(handle));
    }

    pub(crate) fn push_event(&self, event: AnimationEvent) {
        if !self.shut_down.get() {
            self.events.borrow_mut().push(event);
        }
    }

    fn snapshot(&self) -> Vec<AnimationHandle> {
        self.entries.borrow().clone()
    }
}

/// 动画调度器
pub struct Scheduler {
    registry: Rc<Registry>,
    config: AnimationConfig,
    next_anim_id: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("animations", &self.len())
            .field("active", &self.active_count())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl Scheduler {
    /// 使用默认配置创建调度器
    pub fn new() -> Self {
        Self::with_config(AnimationConfig::default())
    }

    /// 使用指定配置创建调度器
    pub fn with_config(config: AnimationConfig) -> Self {
        Self {
            registry: Rc::new(Registry::default()),
            config,
            next_anim_id: 1,
        }
    }

    /// 当前配置
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// 按配置默认值构造的动画参数
    pub fn options(&self) -> AnimateOptions {
        self.config.animate_options()
    }

    fn next_animation_id(&mut self) -> AnimationId {
        let id = AnimationId::new(self.next_anim_id);
        self.next_anim_id += 1;
        id
    }

    fn ensure_active(&self) -> AnimResult<()> {
        if self.is_shut_down() {
            return Err(AnimError::SchedulerShutdown);
        }
        Ok(())
    }

    // ========== 注册 ==========

    /// 创建并登记属性动画
    ///
    /// 参数错误在此处同步返回。`options.replace` 为真时先停止同一属性上未结束的动画；
    /// `options.auto_start` 为真时立即开始，否则返回 Idle 状态的句柄。
    pub fn animate(
        &mut self,
        target: impl PropertyTarget + 'static,
        start_value: impl Into<Value>,
        end_value: impl Into<Value>,
        duration: f64,
        options: AnimateOptions,
    ) -> AnimResult<AnimationHandle> {
        self.ensure_active()?;

        let key = target.key();
        let id = self.next_animation_id();
        let animation = Animation::new(
            id,
            Box::new(target),
            start_value.into(),
            end_value.into(),
            duration,
            &options,
        )?;

        if options.replace {
            let replaced = self.stop_target(&key);
            if replaced > 0 {
                debug!(target = %key, replaced, "替换同一属性上的旧动画");
            }
        }

        let handle = AnimationHandle::with_registry(animation, Rc::downgrade(&self.registry));
        self.registry.register(&handle)?;
        debug!(id = %id, target = %key, duration, "注册动画");

        if options.auto_start {
            handle.start();
        }
        Ok(handle)
    }

    /// 以配置的默认时长创建动画
    pub fn animate_default(
        &mut self,
        target: impl PropertyTarget + 'static,
        start_value: impl Into<Value>,
        end_value: impl Into<Value>,
    ) -> AnimResult<AnimationHandle> {
        let duration = self.config.default_duration;
        let options = self.options();
        self.animate(target, start_value, end_value, duration, options)
    }

    /// 创建对象属性动画
    ///
    /// 调度器只持有对象的弱引用。
    pub fn animate_property<T: AnimatableObject>(
        &mut self,
        object: &Rc<T>,
        property: &str,
        start_value: impl Into<Value>,
        end_value: impl Into<Value>,
        duration: f64,
        options: AnimateOptions,
    ) -> AnimResult<AnimationHandle> {
        let target = ObjectProperty::new(object, property)?;
        self.animate(target, start_value, end_value, duration, options)
    }

    /// 登记一个外部创建的句柄
    ///
    /// 重复登记同一个句柄没有效果。
    pub fn register(&self, handle: &AnimationHandle) -> AnimResult<()> {
        self.ensure_active()?;
        handle.attach(Rc::downgrade(&self.registry));
        self.registry.register(handle)
    }

    // ========== 驱动 ==========

    /// 推进所有正在运行的动画 `dt` 秒
    ///
    /// 按登记顺序推进；单个动画写入失败只会停止该动画。
    /// 返回自上次 tick 以来产生的事件（包括 tick 之外的 start / stop）。
    pub fn tick(&mut self, dt: f64) -> Vec<AnimationEvent> {
        if self.is_shut_down() {
            return Vec::new();
        }

        // 只推进 tick 开始时已在运行的动画
        let running: Vec<AnimationHandle> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(AnimationHandle::is_running)
            .collect();
        let mut advanced = 0_usize;
        for handle in &running {
            if handle.is_running() {
                handle.advance(dt);
                advanced += 1;
            }
        }
        trace!(dt, advanced, "调度器 tick");

        std::mem::take(&mut *self.registry.events.borrow_mut())
    }

    /// 停止某个属性上所有未结束的动画，返回停止的数量
    pub fn stop_target(&self, key: &TargetKey) -> usize {
        let mut stopped = 0;
        for handle in self.registry.snapshot() {
            if !handle.is_finished() && handle.target_key() == *key {
                handle.stop();
                stopped += 1;
            }
        }
        stopped
    }

    /// 停止所有动画
    pub fn stop_all(&self) {
        for handle in self.registry.snapshot() {
            handle.stop();
        }
    }

    /// 关闭调度器
    ///
    /// 停止并注销所有动画，之后 `animate` / `register` 返回 [`AnimError::SchedulerShutdown`]，
    /// `tick` 不再产生任何效果。重复调用没有效果。
    pub fn shutdown(&mut self) {
        if self.is_shut_down() {
            return;
        }
        let count = self.len();
        self.stop_all();
        self.registry.shut_down.set(true);
        self.registry.entries.borrow_mut().clear();
        self.registry.events.borrow_mut().clear();
        info!(count, "调度器已关闭");
    }

    // ========== 查询 ==========

    /// 是否已关闭
    pub fn is_shut_down(&self) -> bool {
        self.registry.shut_down.get()
    }

    /// 已登记的动画数量（Idle 与 Running）
    pub fn len(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    /// 是否没有已登记的动画
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 正在运行的动画数量
    pub fn active_count(&self) -> usize {
        self.registry
            .snapshot()
            .iter()
            .filter(|h| h.is_running())
            .count()
    }

    /// 是否有正在运行的动画
    pub fn has_active_animations(&self) -> bool {
        self.registry.snapshot().iter().any(AnimationHandle::is_running)
    }

    /// 按 ID 查找已登记的动画
    pub fn find(&self, id: AnimationId) -> Option<AnimationHandle> {
        self.registry
            .entries
            .borrow()
            .iter()
            .find(|h| h.id() == id)
            .cloned()
    }

    /// 所有已登记动画的快照（登记顺序）
    pub fn handles(&self) -> Vec<AnimationHandle> {
        self.registry.snapshot()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::animation::AnimationState;
    use crate::handle::Animatable;
    use crate::path::Path;
    use crate::target::PropertyCell;
    use crate::target::tests::TestSprite;
    use crate::value::IntPoint;

    fn once() -> AnimateOptions {
        AnimateOptions::default().with_repeat(1)
    }

    #[test]
    fn test_animate_and_tick() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let handle = scheduler
            .animate(cell.target(), 0.0, 10.0, 1.0, once())
            .unwrap();

        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.active_count(), 0);
        assert!(scheduler.tick(0.5).is_empty());
        assert_eq!(cell.get(), Value::Float(0.0));

        assert!(handle.start());
        assert_eq!(scheduler.tick(0.25), vec![AnimationEvent::Started(handle.id())]);
        assert_eq!(cell.get(), Value::Float(2.5));

        let events = scheduler.tick(0.75);
        assert_eq!(events, vec![AnimationEvent::Completed(handle.id())]);
        assert_eq!(cell.get(), Value::Float(10.0));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_auto_start() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0_i64);
        let handle = scheduler
            .animate(cell.target(), 0_i64, 4_i64, 1.0, once().with_auto_start(true))
            .unwrap();
        assert!(handle.is_running());
        scheduler.tick(0.5);
        assert_eq!(cell.get(), Value::Int(2));
    }

    #[test]
    fn test_parameter_errors_are_synchronous() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        assert_eq!(
            scheduler
                .animate(cell.target(), 0.0, 1.0, -1.0, once())
                .unwrap_err(),
            AnimError::InvalidDuration { duration: -1.0 }
        );
        assert!(matches!(
            scheduler.animate(cell.target(), true, false, 1.0, once()),
            Err(AnimError::TypeMismatch { .. })
        ));
        assert!(matches!(
            scheduler.animate(cell.target(), 0.0, 1.0, 1.0, once().with_path(Path::Color)),
            Err(AnimError::UnsupportedPath { .. })
        ));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_replace_stops_previous() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let first = scheduler
            .animate(cell.target(), 0.0, 1.0, 1.0, once().with_auto_start(true))
            .unwrap();
        let stopped = Rc::new(RefCell::new(None));
        let s = stopped.clone();
        first.on_stopped(move |completed| *s.borrow_mut() = Some(completed));

        let second = scheduler
            .animate(cell.target(), 5.0, 6.0, 1.0, once().with_auto_start(true))
            .unwrap();

        assert_eq!(*stopped.borrow(), Some(false));
        assert_eq!(first.state(), AnimationState::Stopped);
        assert!(second.is_running());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_no_replace_keeps_both() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let options = once().with_auto_start(true).with_replace(false);
        let first = scheduler
            .animate(cell.target(), 0.0, 1.0, 1.0, options.clone())
            .unwrap();
        let second = scheduler
            .animate(cell.target(), 0.0, 1.0, 1.0, options)
            .unwrap();
        assert!(first.is_running());
        assert!(second.is_running());
        assert_eq!(scheduler.active_count(), 2);
    }

    #[test]
    fn test_stop_inside_callback_during_tick() {
        let mut scheduler = Scheduler::new();
        let a = PropertyCell::new(0.0);
        let b = PropertyCell::new(0.0);
        let options = once().with_auto_start(true);
        let first = scheduler.animate(a.target(), 0.0, 1.0, 0.5, options.clone()).unwrap();
        let second = scheduler
            .animate(b.target(), 0.0, 1.0, 1.0, options.with_repeat(0))
            .unwrap();

        let other = second.clone();
        first.on_stopped(move |_| other.stop());

        let events = scheduler.tick(0.5);
        assert!(first.is_finished());
        assert!(second.is_finished());
        // 第二个动画在本 tick 中被停止，没有被推进
        assert_eq!(b.get(), Value::Float(0.0));
        assert!(events.contains(&AnimationEvent::Stopped(second.id())));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_register_from_callback_starts_next_tick() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let follow_cell = PropertyCell::new(0.0);
        let first = scheduler
            .animate(cell.target(), 0.0, 1.0, 1.0, once().with_auto_start(true))
            .unwrap();
        let follow = scheduler
            .animate(follow_cell.target(), 0.0, 1.0, 1.0, once())
            .unwrap();

        let next = follow.clone();
        first.on_stopped(move |completed| {
            if completed {
                next.start();
            }
        });

        scheduler.tick(1.0);
        assert!(follow.is_running());
        // 起点值在 start() 时写入，但本 tick 不推进
        assert_eq!(follow_cell.get(), Value::Float(0.0));
        scheduler.tick(0.5);
        assert_eq!(follow_cell.get(), Value::Float(0.5));
    }

    #[test]
    fn test_dead_object_auto_stops() {
        let mut scheduler = Scheduler::new();
        let sprite = Rc::new(TestSprite::new());
        let handle = scheduler
            .animate_property(
                &sprite,
                "origin",
                IntPoint::new(0, 0),
                IntPoint::new(10, 0),
                1.0,
                AnimateOptions::default().with_auto_start(true),
            )
            .unwrap();

        scheduler.tick(0.5);
        assert_eq!(sprite.origin.get(), IntPoint::new(5, 0));

        drop(sprite);
        let events = scheduler.tick(0.1);
        assert_eq!(events, vec![AnimationEvent::Stopped(handle.id())]);
        assert_eq!(handle.state(), AnimationState::Stopped);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_unknown_property() {
        let mut scheduler = Scheduler::new();
        let sprite = Rc::new(TestSprite::new());
        assert!(matches!(
            scheduler.animate_property(&sprite, "rotation", 0.0, 1.0, 1.0, once()),
            Err(AnimError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_restart_reregisters() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let handle = scheduler
            .animate(cell.target(), 0.0, 1.0, 1.0, once().with_auto_start(true))
            .unwrap();
        scheduler.tick(1.0);
        assert!(scheduler.is_empty());

        handle.restart(1.0, 0.0).unwrap();
        assert_eq!(scheduler.len(), 1);
        scheduler.tick(0.5);
        assert_eq!(cell.get(), Value::Float(0.5));
    }

    #[test]
    fn test_register_detached_handle() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let animation = Animation::new(
            AnimationId::new(100),
            Box::new(cell.target()),
            Value::Float(0.0),
            Value::Float(2.0),
            1.0,
            &once(),
        )
        .unwrap();
        let handle = AnimationHandle::detached(animation);
        scheduler.register(&handle).unwrap();
        scheduler.register(&handle).unwrap();
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.find(AnimationId::new(100)).is_some());

        handle.start();
        scheduler.tick(0.5);
        assert_eq!(cell.get(), Value::Float(1.0));
    }

    #[test]
    fn test_shutdown() {
        let mut scheduler = Scheduler::new();
        let cell = PropertyCell::new(0.0);
        let handle = scheduler
            .animate(cell.target(), 0.0, 1.0, 1.0, AnimateOptions::default().with_auto_start(true))
            .unwrap();
        let stopped = Rc::new(RefCell::new(Vec::new()));
        let s = stopped.clone();
        handle.on_stopped(move |completed| s.borrow_mut().push(completed));

        scheduler.shutdown();
        scheduler.shutdown();
        assert_eq!(*stopped.borrow(), vec![false]);
        assert!(scheduler.is_shut_down());
        assert!(scheduler.is_empty());
        assert!(scheduler.tick(1.0).is_empty());
        assert_eq!(
            scheduler
                .animate(cell.target(), 0.0, 1.0, 1.0, once())
                .unwrap_err(),
            AnimError::SchedulerShutdown
        );
        assert_eq!(handle.restart(0.0, 1.0), Err(AnimError::SchedulerShutdown));
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = AnimationConfig::default();
        config.default_repeat = 3;
        config.default_duration = 2.0;
        let mut scheduler = Scheduler::with_config(config);
        let cell = PropertyCell::new(0.0);
        let handle = scheduler.animate_default(cell.target(), 0.0, 1.0).unwrap();
        let duration = handle.with_animation(Animation::duration);
        assert_eq!(duration, Some(2.0));
        assert_eq!(Animatable::repeat(&handle), 3);
    }
}
