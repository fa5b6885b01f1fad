//! Typed uniform values.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    /// Column-major.
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl UniformValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Int(_) => "int",
            UniformValue::IntArray(_) => "int[]",
            UniformValue::FloatArray(_) => "float[]",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    f.write_str("(")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    f.write_str(")")
}

impl fmt::Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformValue::Float(v) => write!(f, "{v}"),
            UniformValue::Int(v) => write!(f, "{v}"),
            UniformValue::Vec2(v) => write_list(f, v),
            UniformValue::Vec3(v) => write_list(f, v),
            UniformValue::Vec4(v) => write_list(f, v),
            UniformValue::IntArray(v) => write_list(f, v),
            UniformValue::FloatArray(v) => write_list(f, v),
            UniformValue::Mat2(v) => write_list(f, v),
            UniformValue::Mat3(v) => write_list(f, v),
            UniformValue::Mat4(v) => write_list(f, v),
        }
    }
}

/// A named uniform assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub value: UniformValue,
}

impl Uniform {
    pub fn new(name: impl Into<String>, value: UniformValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Uniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {}", self.value.type_name(), self.name, self.value)
    }
}
