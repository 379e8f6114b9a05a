/// Value types exchanged with the Device.

use bitflags::bitflags;
use glam::{Mat4, Vec2, Vec3, Vec4};

// ===== HANDLES =====

/// Device texture (color, depth or placeholder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Off-screen render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameBufferHandle(pub u32);

/// Pixel rectangle, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

bitflags! {
    /// Buffers affected by `Device::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

// ===== RENDER STATE =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Standard alpha-over compositing
    pub const ALPHA_OVER: BlendFunc = BlendFunc {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    /// Additive accumulation (ONE, ONE)
    pub const ADDITIVE: BlendFunc = BlendFunc {
        src: BlendFactor::One,
        dst: BlendFactor::One,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

// ===== TEXTURES & FRAME BUFFERS =====

/// Neutral 1x1 textures bound in place of missing material textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// For multiplicative factors (color, metallic/roughness, occlusion)
    White,
    /// For additive factors (emissive)
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8,
    Rgba16Float,
    Rgba32Float,
}

/// Frame buffer creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBufferDesc {
    pub width: u32,
    pub height: u32,
    /// Number of color attachments (0 for depth-only targets)
    pub color_attachments: u32,
    pub color_format: TextureFormat,
    /// Whether a depth texture is attached
    pub depth: bool,
}

impl FrameBufferDesc {
    pub fn depth_only(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            color_attachments: 0,
            color_format: TextureFormat::Rgba8,
            depth: true,
        }
    }
}

// ===== UNIFORMS =====

/// Value of a named program uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    /// Sampler bound to a texture unit
    Texture { texture: TextureHandle, slot: u32 },
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
    Mat4Array(Vec<Mat4>),
}

impl UniformValue {
    pub fn texture(texture: TextureHandle, slot: u32) -> Self {
        UniformValue::Texture { texture, slot }
    }
}

macro_rules! impl_uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_uniform_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat4 => Mat4,
    Vec<i32> => IntArray,
    Vec<f32> => FloatArray,
    Vec<Vec3> => Vec3Array,
    Vec<Vec4> => Vec4Array,
    Vec<Mat4> => Mat4Array,
}
