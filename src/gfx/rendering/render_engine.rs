//! WGPU-based rendering engine for the viewer
//!
//! Owns the surface, device and every GPU resource derived from the
//! [`Scene`]. Mesh buffers, node transforms and material uniforms are created
//! lazily the first time they are drawn and kept in sync each frame.
//!
//! A frame is two passes plus an optional overlay:
//! 1. shadow depth pass from the key light over shadow-casting nodes
//! 2. lit pass over every visible mesh node
//! 3. UI callback drawing on top of the lit pass

use std::{collections::HashMap, sync::Arc};
use wgpu::TextureFormat;

use crate::{
    error::ViewerResult,
    gfx::{
        lighting::LightingRig,
        resources::{
            global_bindings::{GlobalBindings, ShadowBindings},
            material::{MaterialBindings, MaterialId},
            texture_resource::TextureResource,
        },
        scene::{MeshId, NodeId, Scene},
    },
};

use super::{
    gpu_mesh::{DrawMesh, MeshBuffers, NodeBindings},
    pipeline_manager::{PipelineConfig, PipelineManager},
};

const SHADOW_MAP_SIZE: u32 = 2048;

const SCENE_PIPELINE: &str = "Scene";
const SHADOW_PIPELINE: &str = "Shadow";

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.94,
    g: 0.94,
    b: 0.94,
    a: 1.0,
};

/// Outcome of [`RenderEngine::render_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// Surface was lost or outdated and has been reconfigured
    Reconfigured,
    Skipped,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,
    shadow_map: TextureResource,
    pub pipeline_manager: PipelineManager,
    global_bindings: GlobalBindings,
    shadow_bindings: ShadowBindings,
    node_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    meshes: HashMap<MeshId, MeshBuffers>,
    nodes: HashMap<NodeId, NodeBindings>,
    materials: HashMap<MaterialId, MaterialBindings>,
    material_revision: Option<u64>,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`
    ///
    /// Fails if the surface, adapter or device cannot be created.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> ViewerResult<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let required_limits = if cfg!(target_arch = "wasm32") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::downlevel_defaults()
        }
        .using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let shadow_map = TextureResource::create_shadow_map(&device, SHADOW_MAP_SIZE);

        let global_bindings = GlobalBindings::new(&device);
        let shadow_bindings = ShadowBindings::new(&device, &shadow_map);
        let node_layout = NodeBindings::create_layout(&device);
        let material_layout = MaterialBindings::create_layout(&device);

        let device: Arc<wgpu::Device> = Arc::new(device);
        let queue: Arc<wgpu::Queue> = Arc::new(queue);
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));

        // No culling so thin parts still occlude the key light
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow")
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.layout().clone(),
                    node_layout.clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            SCENE_PIPELINE,
            PipelineConfig::default()
                .with_label("SCENE")
                .with_shader("scene")
                .with_color_format(format)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.layout().clone(),
                    node_layout.clone(),
                    material_layout.clone(),
                    shadow_bindings.layout().clone(),
                ]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        log::info!(
            "Render engine ready: {}x{} {:?}",
            config.width,
            config.height,
            format
        );

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            format,
            depth_texture,
            shadow_map,
            pipeline_manager,
            global_bindings,
            shadow_bindings,
            node_layout,
            material_layout,
            meshes: HashMap::new(),
            nodes: HashMap::new(),
            materials: HashMap::new(),
            material_revision: None,
        })
    }

    /// Uploads camera, lights, materials and node transforms for this frame
    fn prepare(&mut self, scene: &Scene, lighting: &LightingRig) {
        self.global_bindings.update(
            &self.queue,
            scene.camera_manager.camera.uniform,
            lighting.uniform(),
        );

        let revision = scene.material_manager.revision();
        if self.material_revision != Some(revision) {
            for (id, material) in scene.material_manager.iter() {
                match self.materials.get_mut(id) {
                    Some(bindings) => bindings.update(&self.queue, material),
                    None => {
                        let bindings =
                            MaterialBindings::new(&self.device, &self.material_layout, material);
                        self.materials.insert(id.clone(), bindings);
                    }
                }
            }
            self.materials
                .retain(|id, _| scene.material_manager.contains(id));
            self.material_revision = Some(revision);
        }

        for (id, node) in scene.drawables() {
            let Some(mesh_id) = node.mesh else {
                continue;
            };
            if !self.meshes.contains_key(&mesh_id) {
                if let Some(mesh) = scene.mesh(mesh_id) {
                    self.meshes
                        .insert(mesh_id, MeshBuffers::new(&self.device, mesh, &node.name));
                }
            }
            match self.nodes.get_mut(&id) {
                Some(bindings) => bindings.update(&self.queue, node),
                None => {
                    let bindings = NodeBindings::new(&self.device, &self.node_layout, node);
                    self.nodes.insert(id, bindings);
                }
            }
        }
    }

    /// Renders one frame with an optional overlay drawn after the lit pass
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        lighting: &LightingRig,
        ui_callback: Option<F>,
    ) -> FrameStatus
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.prepare(scene, lighting);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return FrameStatus::Reconfigured;
            }
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return FrameStatus::Skipped;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let shadow_pipeline = self.pipeline_manager.get_pipeline(SHADOW_PIPELINE).cloned();
        let scene_pipeline = self.pipeline_manager.get_pipeline(SCENE_PIPELINE).cloned();

        // PASS 1: key light shadow map. Always cleared so a disabled rig
        // never samples stale depth.
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let (true, Some(pipeline)) = (lighting.shadows_enabled(), &shadow_pipeline) {
                shadow_pass.set_pipeline(pipeline);
                shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

                for (id, node) in scene.drawables().filter(|(_, node)| node.cast_shadow) {
                    let (Some(bindings), Some(mesh)) = (
                        self.nodes.get(&id),
                        node.mesh.and_then(|m| self.meshes.get(&m)),
                    ) else {
                        continue;
                    };
                    shadow_pass.set_bind_group(1, bindings.bind_group(), &[]);
                    shadow_pass.draw_mesh(mesh);
                }
            }
        }

        // PASS 2: lit scene
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = &scene_pipeline {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                render_pass.set_bind_group(3, self.shadow_bindings.bind_group(), &[]);

                for (id, node) in scene.drawables() {
                    let material = scene
                        .material_manager
                        .get_material_for_object(node.material.as_ref());
                    let (Some(bindings), Some(mesh), Some(material_bindings)) = (
                        self.nodes.get(&id),
                        node.mesh.and_then(|m| self.meshes.get(&m)),
                        self.materials.get(&material.name),
                    ) else {
                        log::trace!("Skipping '{}': GPU resources not ready", node.name);
                        continue;
                    };
                    render_pass.set_bind_group(1, bindings.bind_group(), &[]);
                    render_pass.set_bind_group(2, material_bindings.bind_group(), &[]);
                    render_pass.draw_mesh(mesh);
                }
            }
        }

        // PASS 3: UI overlay
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        FrameStatus::Presented
    }

    /// Renders without an overlay
    pub fn render_frame_simple(&mut self, scene: &Scene, lighting: &LightingRig) -> FrameStatus {
        self.render_frame(
            scene,
            lighting,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        )
    }

    /// Reconfigures the surface and recreates the depth buffer
    ///
    /// Zero sizes (minimized window, hidden canvas) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let max = self.device.limits().max_texture_dimension_2d;
        self.config.width = width.min(max);
        self.config.height = height.min(max);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
