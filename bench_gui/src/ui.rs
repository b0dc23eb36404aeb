use egui::Context;
use egui_wgpu::ScreenDescriptor;
use platform_winit::WindowEvent;
use render_wgpu::WindowSurface;

/// egui state owned by one top-level window. Every window has its own
/// context, so their memories and focus never mix.
pub struct WindowUi {
    ctx: Context,
    input: egui_winit::State,
    painter: egui_wgpu::Renderer,
}

/// Tessellated output of one pass, ready to paint into the window's frame.
pub struct DrawData {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    screen: ScreenDescriptor,
}

impl WindowUi {
    pub fn new(surface: &WindowSurface, device: &wgpu::Device) -> Self {
        let window = surface.window();
        let ctx = Context::default();
        ctx.set_visuals(egui::Visuals::light());
        let input = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        let painter = egui_wgpu::Renderer::new(device, surface.format(), None, 1);
        Self {
            ctx,
            input,
            painter,
        }
    }

    /// Feeds a window event to egui. True when the window should repaint.
    pub fn on_window_event(&mut self, surface: &WindowSurface, event: &WindowEvent) -> bool {
        self.input.on_window_event(surface.window(), event).repaint
    }

    /// Runs one egui pass sized to the surface and returns what `build`
    /// produced together with the tessellated frame.
    pub fn frame<R>(
        &mut self,
        surface: &WindowSurface,
        time_seconds: f64,
        build: impl FnOnce(&Context) -> R,
    ) -> (R, DrawData) {
        let window = surface.window();
        let size = surface.size();
        let pixels_per_point = egui_winit::pixels_per_point(&self.ctx, window);
        let mut raw_input = self.input.take_egui_input(window);
        let screen_rect = egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(size.width as f32, size.height as f32) / pixels_per_point,
        );
        raw_input.screen_rect = Some(screen_rect);
        raw_input.time = Some(time_seconds);
        if let Some(viewport) = raw_input.viewports.get_mut(&egui::ViewportId::ROOT) {
            viewport.native_pixels_per_point = Some(pixels_per_point);
            viewport.inner_rect = Some(screen_rect);
        }

        self.ctx.begin_frame(raw_input);
        let result = build(&self.ctx);
        let output = self.ctx.end_frame();
        self.input
            .handle_platform_output(window, output.platform_output);

        let draw = DrawData {
            primitives: self.ctx.tessellate(output.shapes, output.pixels_per_point),
            textures: output.textures_delta,
            screen: ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: output.pixels_per_point,
            },
        };
        (result, draw)
    }

    /// Uploads textures and draws on top of whatever the encoder already cleared.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        draw: &DrawData,
    ) {
        for (id, delta) in &draw.textures.set {
            self.painter.update_texture(device, queue, *id, delta);
        }
        self.painter
            .update_buffers(device, queue, encoder, &draw.primitives, &draw.screen);
        if !draw.primitives.is_empty() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("bench_gui.ui"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.painter.render(&mut pass, &draw.primitives, &draw.screen);
        }
        for id in &draw.textures.free {
            self.painter.free_texture(id);
        }
    }
}
