//! Conversion sessions.
//!
//! A [`ColorConvert`] converts frames of one negotiated input layout into another. Its state
//! sits behind a mutex that is held for the whole round-trip to the context thread; the GL
//! half of that state travels into the job and comes back with the result.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glow::HasContext;
use pixconv_core::ConvertError;
use pixconv_format::{FormatClass, GlCapabilities, TexFormat, TextureTarget, VideoInfo};
use pixconv_shader::{ConversionPlan, Uniform, UniformValue};
use tracing::{debug, error, info, trace, warn};

use crate::context::GlContext;
use crate::planes::{
    create_texture, gl_target, plane_requests, GlFrame, PlaneAllocator, PlaneRequest,
    PlaneTexture, TextureAllocator,
};
use crate::{compile_program, set_uniform, QuadBuffers};

/// Output target a draw can render into.
pub fn is_renderable_target(target: TextureTarget) -> bool {
    matches!(target, TextureTarget::Texture2D | TextureTarget::Rectangle)
}

/// Storage for the full-size stand-in used when a plane cannot be rendered into directly.
pub fn intermediate_format(out_bits: u32) -> TexFormat {
    if out_bits > 8 {
        TexFormat::Rgba16
    } else {
        TexFormat::Rgba8
    }
}

/// Whether `plane` of `out` can be a framebuffer attachment as-is.
pub fn renders_directly(out: &VideoInfo, plane: usize, tex_format: TexFormat) -> bool {
    tex_format.is_color_renderable()
        && out.plane_width(plane) == out.width
        && out.plane_height(plane) == out.height
}

/// `tex_scale` for an input plane: valid area over texture size.
pub fn tex_scale(valid_w: u32, valid_h: u32, plane: &PlaneTexture) -> [f32; 2] {
    let sx = if plane.width == 0 {
        1.0
    } else {
        valid_w as f32 / plane.width as f32
    };
    let sy = if plane.height == 0 {
        1.0
    } else {
        valid_h as f32 / plane.height as f32
    };
    [sx, sy]
}

// -------------------------------------------------------------------------------------------------
// GL-side state
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
struct GlResources {
    program: Option<glow::NativeProgram>,
    /// The program no longer matches the plan.
    program_stale: bool,
    fbo: Option<glow::NativeFramebuffer>,
    quad: Option<QuadBuffers>,
    intermediates: Vec<Option<PlaneTexture>>,
}

impl GlResources {
    fn is_empty(&self) -> bool {
        self.program.is_none()
            && self.fbo.is_none()
            && self.quad.is_none()
            && self.intermediates.iter().all(Option::is_none)
    }

    unsafe fn destroy(&mut self, gl: &glow::Context) {
        if let Some(program) = self.program.take() {
            gl.delete_program(program);
        }
        if let Some(fbo) = self.fbo.take() {
            gl.delete_framebuffer(fbo);
        }
        if let Some(mut quad) = self.quad.take() {
            quad.destroy(gl);
        }
        for plane in self.intermediates.drain(..).flatten() {
            gl.delete_texture(plane.texture);
        }
        self.program_stale = false;
    }

    unsafe fn ensure_program(
        &mut self,
        gl: &glow::Context,
        plan: &ConversionPlan,
    ) -> Result<glow::NativeProgram, ConvertError> {
        if self.program_stale {
            if let Some(old) = self.program.take() {
                gl.delete_program(old);
            }
            self.program_stale = false;
        }
        if let Some(program) = self.program {
            return Ok(program);
        }
        let program = compile_program(gl, plan.shaders()).map_err(|e| {
            error!("failed to build {} -> {}: {e}", plan.input(), plan.output());
            e
        })?;
        debug!("compiled program for {} -> {}", plan.input(), plan.output());
        self.program = Some(program);
        Ok(program)
    }

    unsafe fn ensure_fbo(&mut self, gl: &glow::Context) -> Result<glow::NativeFramebuffer, ConvertError> {
        if let Some(fbo) = self.fbo {
            return Ok(fbo);
        }
        let fbo = gl
            .create_framebuffer()
            .map_err(|e| ConvertError::ResourceAcquisition(format!("create_framebuffer failed: {e:?}")))?;
        self.fbo = Some(fbo);
        Ok(fbo)
    }

    unsafe fn ensure_quad(&mut self, gl: &glow::Context, vertex_arrays: bool) -> Result<(), ConvertError> {
        if self.quad.is_none() {
            self.quad = Some(QuadBuffers::new(gl, vertex_arrays)?);
        }
        Ok(())
    }

    /// A full-size texture to render `plane` into, reused while its shape holds.
    unsafe fn intermediate(
        &mut self,
        gl: &glow::Context,
        plane: usize,
        req: PlaneRequest,
    ) -> Result<PlaneTexture, ConvertError> {
        if self.intermediates.len() <= plane {
            self.intermediates.resize(plane + 1, None);
        }
        if let Some(existing) = self.intermediates[plane] {
            if existing.width == req.width
                && existing.height == req.height
                && existing.tex_format == req.tex_format
                && existing.target == req.target
            {
                return Ok(existing);
            }
            gl.delete_texture(existing.texture);
            self.intermediates[plane] = None;
        }
        let tex = create_texture(gl, &req)?;
        self.intermediates[plane] = Some(tex);
        Ok(tex)
    }
}

/// Frees `res` on the context thread. A no-op when nothing was created.
fn release_resources<C: GlContext<Device = glow::Context>>(
    context: &C,
    res: &mut GlResources,
) -> Result<(), ConvertError> {
    if res.is_empty() {
        return Ok(());
    }
    let mut res = std::mem::take(res);
    context.run(move |gl| unsafe { res.destroy(gl) })?;
    Ok(())
}

/// Runs `draw` against `res` and hands `res` back, even when the draw panics.
fn guarded<T, R>(
    mut res: T,
    draw: impl FnOnce(&mut T) -> Result<R, ConvertError>,
) -> (T, Result<R, ConvertError>) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| draw(&mut res))).unwrap_or_else(|_| {
        error!("conversion panicked on the context thread");
        Err(ConvertError::other("conversion panicked on the context thread"))
    });
    (res, result)
}

/// Everything a draw needs, moved onto the context thread.
#[derive(Debug)]
struct DrawJob {
    plan: Arc<ConversionPlan>,
    caps: GlCapabilities,
    uniforms: Vec<Uniform>,
    input: GlFrame,
    out_info: VideoInfo,
    out_target: TextureTarget,
    allocator: Arc<dyn PlaneAllocator>,
}

unsafe fn draw_frame(
    gl: &glow::Context,
    res: &mut GlResources,
    job: &DrawJob,
) -> Result<GlFrame, ConvertError> {
    let plan = &*job.plan;
    let program = res.ensure_program(gl, plan)?;
    res.ensure_quad(gl, job.caps.vertex_arrays)?;
    let fbo = res.ensure_fbo(gl)?;

    let requests = plane_requests(&job.out_info, job.out_target, plan.out_tex_formats());
    let outputs = job.allocator.allocate(gl, &requests)?;

    let result = draw_views(gl, res, job, program, fbo, &outputs);

    gl.bind_framebuffer(glow::FRAMEBUFFER, None);
    gl.use_program(None);

    match result {
        Ok(()) => Ok(GlFrame {
            info: job.out_info.clone(),
            target: job.out_target,
            planes: outputs,
        }),
        Err(e) => {
            for plane in outputs {
                gl.delete_texture(plane.texture);
            }
            Err(e)
        }
    }
}

unsafe fn draw_views(
    gl: &glow::Context,
    res: &mut GlResources,
    job: &DrawJob,
    program: glow::NativeProgram,
    fbo: glow::NativeFramebuffer,
    outputs: &[PlaneTexture],
) -> Result<(), ConvertError> {
    let plan = &*job.plan;
    let out = &job.out_info;
    let n_out = plan.out_planes();
    let in_info = &job.input.info;
    let in_gl_target = gl_target(job.input.target);
    let inter_format = intermediate_format(out.format.info().bits);

    gl.use_program(Some(program));
    for uniform in &job.uniforms {
        if !set_uniform(gl, program, uniform) {
            trace!("uniform {} unused by program", uniform.name);
        }
    }

    for view in 0..in_info.views.max(1) as usize {
        let inputs = job.input.view(view).ok_or_else(|| {
            ConvertError::InvalidCaps(format!("input frame has no planes for view {view}"))
        })?;
        let targets = outputs.get(view * n_out..(view + 1) * n_out).ok_or_else(|| {
            ConvertError::ResourceAcquisition(format!("allocator returned too few planes for view {view}"))
        })?;

        // Render targets: the plane itself, or a full-size stand-in.
        let mut attachments = Vec::with_capacity(n_out);
        for (i, plane) in targets.iter().enumerate() {
            if renders_directly(out, i, plane.tex_format) {
                attachments.push(*plane);
            } else {
                let req = PlaneRequest {
                    tex_format: inter_format,
                    target: TextureTarget::Texture2D,
                    width: out.width,
                    height: out.height,
                };
                attachments.push(res.intermediate(gl, i, req)?);
            }
        }

        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
        let mut buffers = Vec::with_capacity(n_out);
        for (i, att) in attachments.iter().enumerate() {
            let attachment = glow::COLOR_ATTACHMENT0 + i as u32;
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                attachment,
                gl_target(att.target),
                Some(att.texture),
                0,
            );
            buffers.push(attachment);
        }
        if job.caps.draw_buffers {
            gl.draw_buffers(&buffers);
        }

        let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
        if status != glow::FRAMEBUFFER_COMPLETE {
            return Err(ConvertError::ResourceAcquisition(format!(
                "framebuffer incomplete: 0x{status:x}"
            )));
        }

        gl.viewport(0, 0, out.width as i32, out.height as i32);

        for (unit, plane) in inputs.iter().enumerate().rev() {
            let scale = if in_info.format.info().is_tiled() {
                [1.0, 1.0]
            } else {
                tex_scale(in_info.plane_width(unit), in_info.plane_height(unit), plane)
            };
            set_uniform(
                gl,
                program,
                &Uniform::new(format!("tex_scale{unit}"), UniformValue::Vec2(scale)),
            );
            gl.active_texture(glow::TEXTURE0 + unit as u32);
            gl.bind_texture(in_gl_target, Some(plane.texture));
            gl.tex_parameter_i32(in_gl_target, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(in_gl_target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(in_gl_target, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(in_gl_target, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        }

        if let Some(quad) = &res.quad {
            quad.draw(gl);
        }

        // Copy stand-ins into their planes.
        for (i, (att, plane)) in attachments.iter().zip(targets).enumerate() {
            if att.texture == plane.texture {
                continue;
            }
            if job.caps.draw_buffers {
                gl.read_buffer(glow::COLOR_ATTACHMENT0 + i as u32);
            }
            let target = gl_target(plane.target);
            gl.bind_texture(target, Some(plane.texture));
            gl.copy_tex_sub_image_2d(
                target,
                0,
                0,
                0,
                0,
                0,
                out.plane_width(i) as i32,
                out.plane_height(i) as i32,
            );
            gl.bind_texture(target, None);
        }

        for i in 0..attachments.len() {
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0 + i as u32,
                glow::TEXTURE_2D,
                None,
                0,
            );
        }
    }

    for unit in 0..job.input.info.n_planes() {
        gl.active_texture(glow::TEXTURE0 + unit as u32);
        gl.bind_texture(in_gl_target, None);
    }
    gl.active_texture(glow::TEXTURE0);
    Ok(())
}

// -------------------------------------------------------------------------------------------------
// Session
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Negotiated {
    in_info: VideoInfo,
    in_target: TextureTarget,
    out_info: VideoInfo,
    out_target: TextureTarget,
}

#[derive(Debug, Default)]
struct SessionState {
    negotiated: Option<Negotiated>,
    passthrough: bool,
    plan: Option<Arc<ConversionPlan>>,
    /// Capabilities the plan was built against.
    plan_caps: Option<GlCapabilities>,
    gl: GlResources,
}

impl SessionState {
    fn reset(&mut self) {
        self.negotiated = None;
        self.passthrough = false;
        self.plan = None;
        self.plan_caps = None;
    }
}

/// A conversion session bound to one context.
#[derive(Debug)]
pub struct ColorConvert<C: GlContext<Device = glow::Context>> {
    context: Arc<C>,
    allocator: Arc<dyn PlaneAllocator>,
    state: Mutex<SessionState>,
}

impl<C: GlContext<Device = glow::Context>> ColorConvert<C> {
    pub fn new(context: Arc<C>) -> Self {
        Self::with_allocator(context, Arc::new(TextureAllocator))
    }

    pub fn with_allocator(context: Arc<C>, allocator: Arc<dyn PlaneAllocator>) -> Self {
        Self {
            context,
            allocator,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>, ConvertError> {
        self.state
            .lock()
            .map_err(|_| ConvertError::other("conversion session lock poisoned"))
    }

    fn release(&self, state: &mut SessionState) -> Result<(), ConvertError> {
        release_resources(&*self.context, &mut state.gl)
    }

    /// Configures the session for `in_info` on `in_target` to `out_info` on `out_target`.
    ///
    /// Any failure leaves the session unconfigured.
    pub fn set_formats(
        &self,
        in_info: &VideoInfo,
        in_target: TextureTarget,
        out_info: &VideoInfo,
        out_target: TextureTarget,
    ) -> Result<(), ConvertError> {
        let mut state = self.lock()?;
        let requested = Negotiated {
            in_info: in_info.clone(),
            in_target,
            out_info: out_info.clone(),
            out_target,
        };
        if state.negotiated.as_ref() == Some(&requested) {
            return Ok(());
        }

        if state.negotiated.is_some() {
            debug!("caps changed, resetting session");
        }
        state.reset();
        self.release(&mut state)?;

        info!(
            "converting from {} ({in_target}) to {} ({out_target})",
            in_info.format, out_info.format
        );

        let passthrough = in_info == out_info && in_target == out_target;
        if passthrough {
            debug!("identical input and output, passing frames through");
            state.passthrough = true;
            state.negotiated = Some(requested);
            return Ok(());
        }

        if !is_renderable_target(out_target) {
            warn!("cannot render into a {out_target} texture");
            return Err(ConvertError::InvalidCaps(format!(
                "output target {out_target} cannot be rendered into"
            )));
        }
        let in_class = in_info.format.info().class();
        let out_class = out_info.format.info().class();
        if in_class != FormatClass::Rgb && out_class != FormatClass::Rgb {
            return Err(ConvertError::unsupported(in_info.format, out_info.format));
        }

        let caps = self.context.capabilities().clone();
        let plan = ConversionPlan::build(in_info, in_target, out_info, &[], &caps)?;

        state.plan = Some(Arc::new(plan));
        state.plan_caps = Some(caps);
        state.negotiated = Some(requested);
        Ok(())
    }

    pub fn is_passthrough(&self) -> bool {
        self.lock().map(|s| s.passthrough).unwrap_or(false)
    }

    /// The current plan, if the session converts.
    pub fn plan(&self) -> Option<Arc<ConversionPlan>> {
        self.lock().ok().and_then(|s| s.plan.clone())
    }

    /// Converts one frame. Views are drawn in order.
    pub fn convert(&self, input: &GlFrame) -> Result<GlFrame, ConvertError> {
        let mut state = self.lock()?;
        let negotiated = state
            .negotiated
            .clone()
            .ok_or_else(|| ConvertError::InvalidCaps("session has no formats set".into()))?;

        if input.info.format != negotiated.in_info.format
            || input.info.width != negotiated.in_info.width
            || input.info.height != negotiated.in_info.height
        {
            return Err(ConvertError::InvalidCaps(format!(
                "frame {}x{} {} does not match negotiated {}x{} {}",
                input.info.width,
                input.info.height,
                input.info.format,
                negotiated.in_info.width,
                negotiated.in_info.height,
                negotiated.in_info.format
            )));
        }
        if input.target != negotiated.in_target {
            return Err(ConvertError::InvalidCaps(format!(
                "frame on {} does not match negotiated {}",
                input.target, negotiated.in_target
            )));
        }

        if state.passthrough {
            trace!("passthrough");
            return Ok(input.clone());
        }

        let views = input.info.views.max(1) as usize;
        if input.planes.len() < views * input.info.n_planes() {
            return Err(ConvertError::InvalidCaps(format!(
                "frame carries {} planes, {} views need {}",
                input.planes.len(),
                views,
                views * input.info.n_planes()
            )));
        }

        let caps = self.context.capabilities().clone();
        let mut plan = state
            .plan
            .clone()
            .ok_or_else(|| ConvertError::other("session has no conversion plan"))?;

        // Rebuild when the planes handed in or the context differ from what was planned for.
        let frame_formats = input.tex_formats();
        if frame_formats != plan.in_tex_formats() || state.plan_caps.as_ref() != Some(&caps) {
            debug!("input planes or context changed, rebuilding program");
            let rebuilt = ConversionPlan::build(
                &negotiated.in_info,
                negotiated.in_target,
                &negotiated.out_info,
                &frame_formats,
                &caps,
            )?;
            plan = Arc::new(rebuilt);
            state.plan = Some(plan.clone());
            state.plan_caps = Some(caps.clone());
            state.gl.program_stale = true;
        }

        let mut out_info = negotiated.out_info.clone();
        out_info.views = input.info.views.max(1);

        let job = DrawJob {
            uniforms: plan.uniforms(&input.info, negotiated.in_target),
            plan,
            caps,
            input: input.clone(),
            out_info,
            out_target: negotiated.out_target,
            allocator: self.allocator.clone(),
        };

        let res = std::mem::take(&mut state.gl);
        let outcome = self
            .context
            .run(move |gl| guarded(res, |res| unsafe { draw_frame(gl, res, &job) }));

        match outcome {
            Ok((res, result)) => {
                state.gl = res;
                result
            }
            Err(e) => {
                warn!("context unavailable during conversion: {e}");
                Err(e.into())
            }
        }
    }

    /// Frees every GL object the session created.
    pub fn destroy(&self) -> Result<(), ConvertError> {
        let mut state = self.lock()?;
        self.release(&mut state)
    }
}

impl<C: GlContext<Device = glow::Context>> Drop for ColorConvert<C> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = release_resources(&*self.context, &mut state.gl) {
            debug!("session dropped without freeing its GL objects: {e}");
        }
    }
}
