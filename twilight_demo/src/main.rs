//! Twilight demo - a spinning triangle and a checkered quad
//!
//! The triangle uses the default (magenta placeholder) material, the quad a
//! material built from a small checker texture. One point light sits in
//! front of the scene.

use std::path::PathBuf;
use std::time::Instant;

use twilight_engine::glam::{Mat4, Vec3, Vec4};
use twilight_engine::twilight::render::{
    Light, MaterialConstantBinding, MaterialConstantType, MaterialId, MaterialTextureBinding,
    MaterialTextureType,
};
use twilight_engine::twilight::device::{Extent3D, Format, ImageUsage};
use twilight_engine::twilight::scene::{NodeId, SceneGraph, Vertex};
use twilight_engine::twilight::{Error, Renderer, RendererConfig, Result};
use twilight_engine::{engine_error, engine_info, engine_warn};
use twilight_engine_renderer_vulkan::{init_renderer, print_validation_stats_report, VulkanBackend};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const SOURCE: &str = "twilight::demo";
const CHECKER_SIZE: u32 = 64;

/// Scene objects created once the renderer exists
struct Scene {
    graph: SceneGraph,
    root: NodeId,
    triangle: NodeId,
}

struct App {
    // Dropped before the window its surface was created from
    renderer: Option<Renderer<VulkanBackend>>,
    scene: Option<Scene>,
    window: Option<Window>,
    start: Instant,
}

impl App {
    fn new() -> Self {
        Self { renderer: None, scene: None, window: None, start: Instant::now() }
    }

    fn config() -> RendererConfig {
        let shader_dir = PathBuf::from(env!("TWILIGHT_SHADER_DIR"));
        RendererConfig {
            app_name: "Twilight Demo".to_string(),
            vertex_shader_path: shader_dir.join("default.vert.spv"),
            fragment_shader_path: shader_dir.join("default.frag.spv"),
            ..RendererConfig::default()
        }
    }

    /// Log a fatal engine error, tear everything down and leave with status 1
    fn fatal(&mut self, context: &str, error: Error) -> ! {
        engine_error!(SOURCE, "{}: {}", context, error);
        self.shutdown();
        std::process::exit(1);
    }

    fn shutdown(&mut self) {
        self.scene = None;
        if let Some(renderer) = self.renderer.take() {
            engine_info!(SOURCE, "{:?}", renderer.stats());
            drop(renderer.deinit());
            print_validation_stats_report();
        }
    }

    fn redraw(&mut self) {
        let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) else {
            return;
        };

        let angle = self.start.elapsed().as_secs_f32();
        if let Err(e) = scene.graph.set_transform(scene.triangle, Mat4::from_rotation_z(angle)) {
            engine_warn!(SOURCE, "Cannot animate the triangle: {}", e);
        }

        renderer.draw(&scene.graph, scene.root);
        if let Err(e) = renderer.present() {
            self.fatal("Frame failed", e);
        }
    }
}

/// RGBA8 checkerboard, 8x8 cells
fn checker_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / 8) + (y / 8)) % 2 == 0;
            let value = if light { 230 } else { 40 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

fn build_scene(renderer: &mut Renderer<VulkanBackend>) -> Result<Scene> {
    let normal = [0.0, 0.0, 1.0];
    let triangle_vertices = [
        Vertex::new([0.0, 0.5, 0.0], normal, [0.5, 0.0]),
        Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 1.0]),
        Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 1.0]),
    ];
    let triangle_mesh = renderer.create_mesh(&triangle_vertices, &[0, 1, 2], MaterialId::DEFAULT)?;

    let checker = renderer.create_image(
        &checker_pixels(CHECKER_SIZE),
        Extent3D::flat(CHECKER_SIZE, CHECKER_SIZE),
        Format::R8G8B8A8_SRGB,
        ImageUsage::SAMPLED,
        true,
    )?;
    let checker_material = renderer.load_material(
        &[MaterialConstantBinding { ty: MaterialConstantType::Albedo, value: Vec4::new(0.4, 0.7, 1.0, 1.0) }],
        vec![MaterialTextureBinding { ty: MaterialTextureType::BaseColor, image: checker }],
    )?;

    let quad_vertices = [
        Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 1.0]),
        Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 1.0]),
        Vertex::new([0.5, 0.5, 0.0], normal, [1.0, 0.0]),
        Vertex::new([-0.5, 0.5, 0.0], normal, [0.0, 0.0]),
    ];
    let quad_mesh = renderer.create_mesh(&quad_vertices, &[0, 1, 2, 2, 3, 0], checker_material)?;

    renderer.add_light(Light { position: Vec3::new(0.0, 1.0, 3.0), color: Vec3::ONE })?;

    let mut graph = SceneGraph::new();
    let root = graph.create_node(Mat4::IDENTITY);
    let triangle = graph.create_node(Mat4::IDENTITY);
    let quad = graph.create_node(Mat4::from_translation(Vec3::new(1.2, 0.0, -0.5)));
    graph.attach_mesh(triangle, triangle_mesh)?;
    graph.attach_mesh(quad, quad_mesh)?;
    graph.append_child(root, triangle)?;
    graph.append_child(root, quad)?;

    Ok(Scene { graph, root, triangle })
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Twilight Demo")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(e) => {
                engine_error!(SOURCE, "Failed to create window: {}", e);
                std::process::exit(1);
            }
        };

        let size = window.inner_size();
        let mut renderer = match init_renderer(&window, size.width, size.height, Self::config()) {
            Ok(renderer) => renderer,
            Err(e) => {
                engine_error!(SOURCE, "Failed to initialize the renderer: {}", e);
                std::process::exit(1);
            }
        };
        engine_info!(SOURCE, "Rendering on {}", renderer.backend().device_name());
        let scene = build_scene(&mut renderer);

        self.renderer = Some(renderer);
        self.window = Some(window);
        match scene {
            Ok(scene) => self.scene = Some(scene),
            Err(e) => self.fatal("Failed to build the scene", e),
        }
        engine_info!(SOURCE, "Initialization complete, entering main loop");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                engine_info!(SOURCE, "Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!(SOURCE, "Failed to create the event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!(SOURCE, "Event loop error: {}", e);
        std::process::exit(1);
    }
}
