//! # Items 模块
//!
//! [`AnimationItems`]：把一组可动画实体当作一个整体控制。
//!
//! - `start()` / `stop()` 按加入顺序广播给每个成员
//! - `is_running()` 不单独存储，每次查询时汇总：任一成员在运行即为运行中
//! - 运行期间增删成员不会追溯地启动或停止它们，变化只在下一次广播时生效

use crate::handle::Animatable;

/// 动画组合
#[derive(Default)]
pub struct AnimationItems {
    items: Vec<Box<dyn Animatable>>,
}

impl std::fmt::Debug for AnimationItems {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationItems")
            .field("items", &self.items.len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl AnimationItems {
    /// 创建空组合
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加成员（构建器风格）
    #[must_use]
    pub fn with_item(mut self, item: impl Animatable + 'static) -> Self {
        self.add(item);
        self
    }

    /// 追加成员
    ///
    /// 不会改变成员自身的状态，即使组合正在运行。
    pub fn add(&mut self, item: impl Animatable + 'static) {
        self.items.push(Box::new(item));
    }

    /// 移除指定位置的成员并返回
    ///
    /// 被移除的成员保持原有状态，不会被停止。
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Animatable>> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// 移除所有成员
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按加入顺序遍历成员
    pub fn iter(&self) -> impl Iterator<Item = &dyn Animatable> {
        self.items.iter().map(|item| item.as_ref())
    }

    /// 正在运行的成员数量
    pub fn running_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_running()).count()
    }
}

impl Animatable for AnimationItems {
    /// 启动所有成员，返回是否有成员真的被启动
    fn start(&self) -> bool {
        let mut started = false;
        for item in &self.items {
            started |= item.start();
        }
        started
    }

    fn stop(&self) {
        for item in &self.items {
            item.stop();
        }
    }

    fn is_running(&self) -> bool {
        self.items.iter().any(|item| item.is_running())
    }

    /// 任一成员无限循环时为 0，否则取最大值
    fn repeat(&self) -> u32 {
        let mut max = 0;
        for item in &self.items {
            let repeat = item.repeat();
            if repeat == 0 {
                return 0;
            }
            max = max.max(repeat);
        }
        max
    }

    fn reverse(&self) -> bool {
        self.items.iter().any(|item| item.reverse())
    }
}
