//! # Path 模块
//!
//! 值插值函数：给定起点 `v0`、终点 `v1` 和（已缓动的）时间 `t`，计算中间值。
//!
//! 每种 Path 只处理特定的值类型，由 [`Path::default_for`] 根据属性的
//! [`ValueType`] 选出默认实现，不做运行时类型探测。
//!
//! 整数类结果统一使用 **四舍五入、远离零**（`f64::round`）取整，
//! 例如 `0.5 → 1`、`-0.5 → -1`。

use serde::{Deserialize, Serialize};

use crate::error::{AnimError, AnimResult};
use crate::value::{Color, IntPoint, Value, ValueType};

/// 插值路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Path {
    /// 数值线性插值（float / int），int 结果四舍五入
    #[default]
    Linear,
    /// 布尔值：`t < 0.5` 取起点，否则取终点
    Boolean,
    /// 二维整数点，逐轴线性插值并四舍五入
    #[serde(rename = "linear_2d_int")]
    Linear2DInt,
    /// 二维整数点，先沿 x 轴再沿 y 轴移动（曼哈顿路径）
    #[serde(rename = "manhattan_2d_int")]
    Manhattan2DInt,
    /// 二维整数点，绕起点与终点的中点旋转 180° 的圆弧
    #[serde(rename = "spiral_2d_int")]
    Spiral2DInt,
    /// RGBA 颜色，逐通道线性插值
    Color,
}

impl Path {
    /// 所有内置 Path
    pub const ALL: [Path; 6] = [
        Self::Linear,
        Self::Boolean,
        Self::Linear2DInt,
        Self::Manhattan2DInt,
        Self::Spiral2DInt,
        Self::Color,
    ];

    /// 值类型对应的默认 Path
    pub fn default_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Bool => Self::Boolean,
            ValueType::Int | ValueType::Float => Self::Linear,
            ValueType::Point => Self::Linear2DInt,
            ValueType::Color => Self::Color,
        }
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Boolean => "boolean",
            Self::Linear2DInt => "linear_2d_int",
            Self::Manhattan2DInt => "manhattan_2d_int",
            Self::Spiral2DInt => "spiral_2d_int",
            Self::Color => "color",
        }
    }

    /// 是否支持该值类型
    pub fn supports(&self, value_type: ValueType) -> bool {
        matches!(
            (self, value_type),
            (Self::Linear, ValueType::Int | ValueType::Float)
                | (Self::Boolean, ValueType::Bool)
                | (
                    Self::Linear2DInt | Self::Manhattan2DInt | Self::Spiral2DInt,
                    ValueType::Point
                )
                | (Self::Color, ValueType::Color)
        )
    }

    /// 检查端点是否可以用此 Path 插值
    ///
    /// 两个端点类型必须一致，且被该 Path 支持。
    pub fn check(&self, v0: &Value, v1: &Value) -> AnimResult<()> {
        let expected = v0.value_type();
        let actual = v1.value_type();
        if expected != actual {
            return Err(AnimError::TypeMismatch { expected, actual });
        }
        if !self.supports(expected) {
            return Err(AnimError::UnsupportedPath {
                path: self.name(),
                value_type: expected,
            });
        }
        Ok(())
    }

    /// 计算插值
    ///
    /// `t` 会被截断到 `[0, 1]`；对于连续类型，`t == 0` 精确返回 `v0`，`t == 1` 精确返回 `v1`。
    pub fn at(&self, v0: &Value, v1: &Value, t: f64) -> AnimResult<Value> {
        self.check(v0, v1)?;
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let value = match (self, *v0, *v1) {
            (Self::Boolean, Value::Bool(a), Value::Bool(b)) => Value::Bool(if t < 0.5 { a } else { b }),
            _ if t <= 0.0 => *v0,
            _ if t >= 1.0 => *v1,
            (Self::Linear, Value::Float(a), Value::Float(b)) => Value::Float(lerp(a, b, t)),
            (Self::Linear, Value::Int(a), Value::Int(b)) => Value::Int(lerp_round(a, b, t)),
            (Self::Linear2DInt, Value::Point(a), Value::Point(b)) => Value::Point(IntPoint {
                x: lerp_round(a.x, b.x, t),
                y: lerp_round(a.y, b.y, t),
            }),
            (Self::Manhattan2DInt, Value::Point(a), Value::Point(b)) => {
                Value::Point(manhattan(a, b, t))
            }
            (Self::Spiral2DInt, Value::Point(a), Value::Point(b)) => Value::Point(spiral(a, b, t)),
            (Self::Color, Value::Color(a), Value::Color(b)) => Value::Color(lerp_color(a, b, t)),
            _ => {
                return Err(AnimError::UnsupportedPath {
                    path: self.name(),
                    value_type: v0.value_type(),
                });
            }
        };
        Ok(value)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Path {
    type Err = AnimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|path| path.name() == s.trim())
            .ok_or_else(|| AnimError::UnknownPath {
                name: s.to_string(),
            })
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_round(a: i64, b: i64, t: f64) -> i64 {
    lerp(a as f64, b as f64, t).round() as i64
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let (a, b) = (a.channels(), b.channels());
    let mut out = [0_u8; 4];
    for i in 0..4 {
        let v = lerp(f64::from(a[i]), f64::from(b[i]), t).round();
        out[i] = v.clamp(0.0, 255.0) as u8;
    }
    Color::from_channels(out)
}

/// 曼哈顿路径：总路程按 |dx| + |dy| 计算，先走完 x 方向再走 y 方向
fn manhattan(a: IntPoint, b: IntPoint, t: f64) -> IntPoint {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let total = dx.abs() + dy.abs();
    if total == 0.0 {
        return a;
    }

    let d = t * total;
    if d <= dx.abs() {
        IntPoint {
            x: (a.x as f64 + dx.signum() * d).round() as i64,
            y: a.y,
        }
    } else {
        IntPoint {
            x: b.x,
            y: (a.y as f64 + dy.signum() * (d - dx.abs())).round() as i64,
        }
    }
}

/// 螺旋路径：以两端点的中点为圆心，从起点逆时针（数学坐标系）转过 `πt`
fn spiral(a: IntPoint, b: IntPoint, t: f64) -> IntPoint {
    let cx = (a.x + b.x) as f64 / 2.0;
    let cy = (a.y + b.y) as f64 / 2.0;
    let (rx, ry) = (a.x as f64 - cx, a.y as f64 - cy);
    let (sin, cos) = (std::f64::consts::PI * t).sin_cos();
    IntPoint {
        x: (cx + rx * cos - ry * sin).round() as i64,
        y: (cy + rx * sin + ry * cos).round() as i64,
    }
}
