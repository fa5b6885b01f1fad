//! pixconv execution engine (glow/OpenGL backend)
//
// This crate owns everything that touches GL:
// - the context thread and the submit-and-wait hand-off onto it
// - program compile/link, quad buffers, uniform upload
// - conversion sessions drawing one plan into N output planes
//
// Planning (formats, bodies, shader text) lives in `pixconv-shader`.
#![allow(clippy::missing_safety_doc)]
#![deny(missing_debug_implementations)]

use glow::HasContext;

use pixconv_shader::{ShaderSources, Uniform, UniformValue, ATTRIBUTE_BINDINGS, INDICES, VERTICES};

pub mod context;
pub mod planes;
pub mod session;

pub use context::{
    capabilities_from_gl, ContextError, GlContext, GlThread, HeadlessContext, Job,
};
pub use planes::{GlFrame, PlaneAllocator, PlaneRequest, PlaneTexture, TextureAllocator};
pub use session::ColorConvert;

pub use pixconv_core::ConvertError;

pub unsafe fn compile_program(
    gl: &glow::Context,
    sources: &ShaderSources,
) -> Result<glow::NativeProgram, ConvertError> {
    let vs = gl
        .create_shader(glow::VERTEX_SHADER)
        .map_err(|e| ConvertError::ResourceAcquisition(format!("create_shader(VS) failed: {e:?}")))?;
    gl.shader_source(vs, &sources.vertex);
    gl.compile_shader(vs);
    if !gl.get_shader_compile_status(vs) {
        let log = gl.get_shader_info_log(vs);
        gl.delete_shader(vs);
        return Err(ConvertError::VertexCompile(log));
    }

    let fs = gl
        .create_shader(glow::FRAGMENT_SHADER)
        .map_err(|e| ConvertError::ResourceAcquisition(format!("create_shader(FS) failed: {e:?}")))?;
    gl.shader_source(fs, &sources.fragment);
    gl.compile_shader(fs);
    if !gl.get_shader_compile_status(fs) {
        let log = gl.get_shader_info_log(fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
        return Err(ConvertError::FragmentCompile(log));
    }

    let program = gl
        .create_program()
        .map_err(|e| ConvertError::ResourceAcquisition(format!("create_program failed: {e:?}")))?;
    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);

    for (index, name) in ATTRIBUTE_BINDINGS {
        gl.bind_attrib_location(program, index, name);
    }
    for (color, name) in &sources.frag_data_bindings {
        gl.bind_frag_data_location(program, *color, name);
    }

    gl.link_program(program);

    gl.detach_shader(program, vs);
    gl.detach_shader(program, fs);
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if !gl.get_program_link_status(program) {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(ConvertError::Link(log));
    }

    Ok(program)
}

/// Uploads one uniform. Returns `false` when the program does not use it.
pub unsafe fn set_uniform(
    gl: &glow::Context,
    program: glow::NativeProgram,
    uniform: &Uniform,
) -> bool {
    let Some(loc) = gl.get_uniform_location(program, &uniform.name) else {
        return false;
    };
    let loc = Some(&loc);
    match &uniform.value {
        UniformValue::Float(v) => gl.uniform_1_f32(loc, *v),
        UniformValue::Vec2([x, y]) => gl.uniform_2_f32(loc, *x, *y),
        UniformValue::Vec3([x, y, z]) => gl.uniform_3_f32(loc, *x, *y, *z),
        UniformValue::Vec4([x, y, z, w]) => gl.uniform_4_f32(loc, *x, *y, *z, *w),
        UniformValue::Int(v) => gl.uniform_1_i32(loc, *v),
        UniformValue::IntArray(v) => gl.uniform_1_i32_slice(loc, v),
        UniformValue::FloatArray(v) => gl.uniform_1_f32_slice(loc, v),
        UniformValue::Mat2(m) => gl.uniform_matrix_2_f32_slice(loc, false, m),
        UniformValue::Mat3(m) => gl.uniform_matrix_3_f32_slice(loc, false, m),
        UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(loc, false, m),
    }
    true
}

/// Bytes per vertex: position (xyz) then texcoord (uv).
pub const VERTEX_STRIDE: i32 = 5 * std::mem::size_of::<f32>() as i32;
pub const TEXCOORD_OFFSET: i32 = 3 * std::mem::size_of::<f32>() as i32;

/// Full-frame quad drawn as two indexed triangles.
#[derive(Debug)]
pub struct QuadBuffers {
    /// Absent on contexts without vertex array objects.
    vao: Option<glow::NativeVertexArray>,
    vbo: glow::NativeBuffer,
    ibo: glow::NativeBuffer,
}

impl QuadBuffers {
    pub unsafe fn new(gl: &glow::Context, vertex_arrays: bool) -> Result<Self, ConvertError> {
        let vao = if vertex_arrays {
            Some(gl.create_vertex_array().map_err(|e| {
                ConvertError::ResourceAcquisition(format!("create_vertex_array: {e}"))
            })?)
        } else {
            None
        };
        let vbo = gl
            .create_buffer()
            .map_err(|e| ConvertError::ResourceAcquisition(format!("create_buffer: {e}")))?;
        let ibo = gl
            .create_buffer()
            .map_err(|e| ConvertError::ResourceAcquisition(format!("create_buffer: {e}")))?;

        gl.bind_vertex_array(vao);
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&VERTICES),
            glow::STATIC_DRAW,
        );
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&INDICES),
            glow::STATIC_DRAW,
        );

        let quad = Self { vao, vbo, ibo };
        if vao.is_some() {
            quad.attach_attributes(gl);
        }

        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        Ok(quad)
    }

    unsafe fn attach_attributes(&self, gl: &glow::Context) {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ibo));
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, VERTEX_STRIDE, 0);
        gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, VERTEX_STRIDE, TEXCOORD_OFFSET);
        gl.enable_vertex_attrib_array(0);
        gl.enable_vertex_attrib_array(1);
    }

    pub unsafe fn draw(&self, gl: &glow::Context) {
        match self.vao {
            Some(vao) => gl.bind_vertex_array(Some(vao)),
            None => self.attach_attributes(gl),
        }
        gl.draw_elements(glow::TRIANGLES, INDICES.len() as i32, glow::UNSIGNED_SHORT, 0);
        match self.vao {
            Some(_) => gl.bind_vertex_array(None),
            None => {
                gl.disable_vertex_attrib_array(0);
                gl.disable_vertex_attrib_array(1);
                gl.bind_buffer(glow::ARRAY_BUFFER, None);
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
            }
        }
    }

    pub unsafe fn destroy(&mut self, gl: &glow::Context) {
        if let Some(vao) = self.vao.take() {
            gl.delete_vertex_array(vao);
        }
        gl.delete_buffer(self.vbo);
        gl.delete_buffer(self.ibo);
    }
}
