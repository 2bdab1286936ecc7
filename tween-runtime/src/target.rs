//! # Target 模块
//!
//! 动画目标：动画写入的那个"属性"。
//!
//! ## 核心概念
//!
//! - [`PropertyTarget`]: 属性能力接口（get / set / 值类型 / 唯一键）
//! - [`AnimatableObject`]: 拥有多个具名属性的对象
//! - [`ObjectProperty`]: 对象上的单个属性，**弱引用**对象
//! - [`PropertyCell`]: 独立的单值属性，`target()` 返回弱引用目标
//!
//! 动画永远不会延长目标对象的生命周期：目标释放后，写入返回
//! [`AnimError::DeadTarget`]，动画随之静默停止。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{AnimError, AnimResult};
use crate::value::{Value, ValueType};

/// 属性唯一键
///
/// 由目标对象地址和属性名组成，用于识别"同一属性上的动画"。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    object: usize,
    property: String,
}

impl TargetKey {
    fn new<T: ?Sized>(object: *const T, property: impl Into<String>) -> Self {
        Self {
            object: object.cast::<()>() as usize,
            property: property.into(),
        }
    }

    /// 由对象引用和属性名构造
    ///
    /// 供自定义 [`PropertyTarget`] 使用；对象必须在动画期间保持同一地址。
    pub fn of<T: ?Sized>(object: &T, property: impl Into<String>) -> Self {
        Self::new(object as *const T, property)
    }

    /// 属性名
    pub fn property(&self) -> &str {
        &self.property
    }
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}.{}", self.object, self.property)
    }
}

/// 属性能力接口
///
/// 动画只通过此接口读写目标，不关心目标的具体类型。
pub trait PropertyTarget {
    /// 读取当前值
    fn get(&self) -> AnimResult<Value>;

    /// 写入新值
    ///
    /// 目标已释放时返回 [`AnimError::DeadTarget`]。
    fn set(&self, value: Value) -> AnimResult<()>;

    /// 属性声明的值类型
    fn value_type(&self) -> ValueType;

    /// 属性唯一键
    fn key(&self) -> TargetKey;
}

/// 可动画对象接口
///
/// 对象通过实现此 trait 声明自己有哪些属性可以被动画。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     opacity: Cell<f64>,
///     origin: Cell<IntPoint>,
/// }
///
/// impl AnimatableObject for Sprite {
///     fn get_property(&self, property: &str) -> Option<Value> {
///         match property {
///             "opacity" => Some(Value::Float(self.opacity.get())),
///             "origin" => Some(Value::Point(self.origin.get())),
///             _ => None,
///         }
///     }
///
///     fn set_property(&self, property: &str, value: Value) -> AnimResult<()> {
///         match (property, value) {
///             ("opacity", Value::Float(v)) => self.opacity.set(v),
///             ("origin", Value::Point(p)) => self.origin.set(p),
///             _ => return Err(AnimError::UnknownProperty { property: property.to_string() }),
///         }
///         Ok(())
///     }
///
///     fn property_list(&self) -> &'static [&'static str] {
///         &["opacity", "origin"]
///     }
/// }
/// ```
pub trait AnimatableObject: 'static {
    /// 获取属性的当前值，属性不存在时返回 `None`
    fn get_property(&self, property: &str) -> Option<Value>;

    /// 设置属性的新值
    fn set_property(&self, property: &str, value: Value) -> AnimResult<()>;

    /// 属性的值类型
    ///
    /// 默认根据当前值推断。
    fn property_type(&self, property: &str) -> Option<ValueType> {
        self.get_property(property).map(|v| v.value_type())
    }

    /// 所有可动画属性的列表（用于调试和验证）
    fn property_list(&self) -> &'static [&'static str];
}

/// 对象上的单个属性
///
/// 只持有对象的弱引用。
pub struct ObjectProperty {
    object: Weak<dyn AnimatableObject>,
    property: String,
    value_type: ValueType,
}

impl ObjectProperty {
    /// 创建属性目标
    ///
    /// 属性不存在时返回 [`AnimError::UnknownProperty`]。
    pub fn new<T: AnimatableObject>(object: &Rc<T>, property: impl Into<String>) -> AnimResult<Self> {
        let property = property.into();
        let value_type = object
            .property_type(&property)
            .ok_or_else(|| AnimError::UnknownProperty {
                property: property.clone(),
            })?;

        let object: Rc<dyn AnimatableObject> = object.clone();
        Ok(Self {
            object: Rc::downgrade(&object),
            property,
            value_type,
        })
    }

    /// 属性名
    pub fn property(&self) -> &str {
        &self.property
    }

    /// 目标对象是否仍然存活
    pub fn is_alive(&self) -> bool {
        self.object.strong_count() > 0
    }
}

impl std::fmt::Debug for ObjectProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectProperty")
            .field("property", &self.property)
            .field("value_type", &self.value_type)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl PropertyTarget for ObjectProperty {
    fn get(&self) -> AnimResult<Value> {
        let object = self.object.upgrade().ok_or(AnimError::DeadTarget)?;
        object
            .get_property(&self.property)
            .ok_or_else(|| AnimError::UnknownProperty {
                property: self.property.clone(),
            })
    }

    fn set(&self, value: Value) -> AnimResult<()> {
        let object = self.object.upgrade().ok_or(AnimError::DeadTarget)?;
        if value.value_type() != self.value_type {
            return Err(AnimError::TypeMismatch {
                expected: self.value_type,
                actual: value.value_type(),
            });
        }
        object.set_property(&self.property, value)
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn key(&self) -> TargetKey {
        TargetKey::new(self.object.as_ptr(), self.property.as_str())
    }
}

/// 简单的单值属性
///
/// 使用 `Rc<RefCell<Value>>` 包装单个值，值类型在创建时固定。
#[derive(Debug, Clone)]
pub struct PropertyCell {
    value: Rc<RefCell<Value>>,
    value_type: ValueType,
}

impl PropertyCell {
    /// 创建新的属性
    pub fn new(initial_value: impl Into<Value>) -> Self {
        let value = initial_value.into();
        Self {
            value_type: value.value_type(),
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// 当前值
    pub fn get(&self) -> Value {
        *self.value.borrow()
    }

    /// 直接设置值（不经过动画）
    pub fn set(&self, value: Value) -> AnimResult<()> {
        if value.value_type() != self.value_type {
            return Err(AnimError::TypeMismatch {
                expected: self.value_type,
                actual: value.value_type(),
            });
        }
        *self.value.borrow_mut() = value;
        Ok(())
    }

    /// 值类型
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// 弱引用形式的动画目标
    pub fn target(&self) -> CellTarget {
        CellTarget {
            value: Rc::downgrade(&self.value),
            value_type: self.value_type,
        }
    }
}

/// [`PropertyCell`] 的弱引用目标
#[derive(Debug, Clone)]
pub struct CellTarget {
    value: Weak<RefCell<Value>>,
    value_type: ValueType,
}

impl PropertyTarget for CellTarget {
    fn get(&self) -> AnimResult<Value> {
        let cell = self.value.upgrade().ok_or(AnimError::DeadTarget)?;
        Ok(*cell.borrow())
    }

    fn set(&self, value: Value) -> AnimResult<()> {
        let cell = self.value.upgrade().ok_or(AnimError::DeadTarget)?;
        if value.value_type() != self.value_type {
            return Err(AnimError::TypeMismatch {
                expected: self.value_type,
                actual: value.value_type(),
            });
        }
        *cell.borrow_mut() = value;
        Ok(())
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn key(&self) -> TargetKey {
        TargetKey::new(self.value.as_ptr(), "value")
    }
}
