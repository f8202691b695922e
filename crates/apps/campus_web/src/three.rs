//! Three.js bindings and the overlay backend built on them.
//!
//! `THREE` and `GLTFLoader` are expected as page globals.

use js_sys::{Float64Array, Object, Reflect};
use overlay::RenderBackend;
use scene::components::{Geometry, Light, Material, Mesh, Transform};
use scene::entity::NodeId;
use scene::graph::SceneNode;
use scene::{PerspectiveCamera, SceneGraph};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::js::describe;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    #[wasm_bindgen(js_namespace = THREE)]
    pub type Object3D;

    #[wasm_bindgen(method, getter)]
    fn position(this: &Object3D) -> Vector3;

    #[wasm_bindgen(method, getter)]
    fn rotation(this: &Object3D) -> Euler;

    #[wasm_bindgen(method, getter)]
    fn scale(this: &Object3D) -> Vector3;

    #[wasm_bindgen(js_namespace = THREE)]
    type Vector3;

    #[wasm_bindgen(method)]
    fn set(this: &Vector3, x: f64, y: f64, z: f64);

    #[wasm_bindgen(js_namespace = THREE)]
    type Euler;

    #[wasm_bindgen(method)]
    fn set(this: &Euler, x: f64, y: f64, z: f64);

    #[wasm_bindgen(js_namespace = THREE)]
    type Matrix4;

    #[wasm_bindgen(method, js_name = fromArray)]
    fn from_array(this: &Matrix4, values: &Float64Array);
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    type Scene;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new() -> Scene;

    #[wasm_bindgen(method)]
    fn add(this: &Scene, object: &Object3D);

    #[wasm_bindgen(js_namespace = THREE, js_name = PerspectiveCamera, extends = Object3D)]
    type Camera;

    #[wasm_bindgen(constructor, js_namespace = THREE, js_class = "PerspectiveCamera")]
    fn new() -> Camera;

    #[wasm_bindgen(method, getter = projectionMatrix)]
    fn projection_matrix(this: &Camera) -> Matrix4;

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    type AmbientLight;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new(color: u32, intensity: f64) -> AmbientLight;

    #[wasm_bindgen(js_namespace = THREE, extends = Object3D)]
    type DirectionalLight;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new(color: u32, intensity: f64) -> DirectionalLight;

    #[wasm_bindgen(js_namespace = THREE, js_name = Mesh, extends = Object3D)]
    type ThreeMesh;

    #[wasm_bindgen(constructor, js_namespace = THREE, js_class = "Mesh")]
    fn new(geometry: &JsValue, material: &JsValue) -> ThreeMesh;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = THREE)]
    type PlaneGeometry;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new(width: f64, height: f64) -> PlaneGeometry;

    #[wasm_bindgen(js_namespace = THREE)]
    type BoxGeometry;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new(width: f64, height: f64, depth: f64) -> BoxGeometry;

    #[wasm_bindgen(js_namespace = THREE)]
    type MeshBasicMaterial;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new(params: &JsValue) -> MeshBasicMaterial;

    #[wasm_bindgen(js_namespace = THREE)]
    type TextureLoader;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new() -> TextureLoader;

    #[wasm_bindgen(method)]
    fn load(this: &TextureLoader, url: &str) -> JsValue;

    type GLTFLoader;

    #[wasm_bindgen(constructor)]
    fn new() -> GLTFLoader;

    #[wasm_bindgen(method)]
    fn load(
        this: &GLTFLoader,
        url: &str,
        on_load: &JsValue,
        on_progress: &JsValue,
        on_error: &JsValue,
    );
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = THREE)]
    pub type WebGLRenderer;

    #[wasm_bindgen(constructor, js_namespace = THREE)]
    fn new(params: &JsValue) -> WebGLRenderer;

    #[wasm_bindgen(method, setter = autoClear)]
    fn set_auto_clear(this: &WebGLRenderer, enabled: bool);

    #[wasm_bindgen(method)]
    fn render(this: &WebGLRenderer, scene: &Scene, camera: &Camera);

    #[wasm_bindgen(method, js_name = resetState)]
    fn reset_state(this: &WebGLRenderer);
}

fn apply_transform(object: &Object3D, transform: &Transform) {
    let Transform {
        position,
        rotation,
        scale,
    } = transform;
    object.position().set(position.x, position.y, position.z);
    object.rotation().set(rotation.x, rotation.y, rotation.z);
    object.scale().set(scale.x, scale.y, scale.z);
}

fn material(material: &Material) -> JsValue {
    let params = Object::new();
    match material {
        Material::Basic { color } => {
            let _ = Reflect::set(&params, &"color".into(), &JsValue::from(*color));
        }
        Material::Textured { texture_url } => {
            let texture = TextureLoader::new().load(texture_url);
            let _ = Reflect::set(&params, &"map".into(), &texture);
        }
        Material::Embedded => {}
    }
    MeshBasicMaterial::new(&params).into()
}

/// Mirrors a [`SceneGraph`] into a Three.js scene sharing the map's GL context.
///
/// Nodes are created once; a new graph epoch replaces the whole scene.
pub struct ThreeBackend {
    renderer: WebGLRenderer,
    scene: Scene,
    camera: Camera,
    synced_epoch: Option<u64>,
    synced_last: Option<NodeId>,
}

impl ThreeBackend {
    /// Binds a renderer to the context handed to `onContextRestored`.
    pub fn from_gl(gl: &JsValue) -> Self {
        let params = Object::new();
        if let Some(attributes) = crate::js::get(gl, "getContextAttributes")
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .and_then(|f| f.call0(gl).ok())
        {
            let _ = Object::assign(&params, attributes.unchecked_ref::<Object>());
        }
        let canvas = crate::js::get(gl, "canvas").unwrap_or(JsValue::UNDEFINED);
        let _ = Reflect::set(&params, &"canvas".into(), &canvas);
        let _ = Reflect::set(&params, &"context".into(), gl);
        let _ = Reflect::set(&params, &"alpha".into(), &JsValue::TRUE);
        let _ = Reflect::set(&params, &"clearColor".into(), &JsValue::from(0xffffff_u32));

        Self {
            renderer: WebGLRenderer::new(&params),
            scene: Scene::new(),
            camera: Camera::new(),
            synced_epoch: None,
            synced_last: None,
        }
    }

    fn sync(&mut self, graph: &SceneGraph) {
        if self.synced_epoch != Some(graph.epoch()) {
            debug!("overlay scene epoch {} replaces previous", graph.epoch());
            self.scene = Scene::new();
            self.synced_epoch = Some(graph.epoch());
            self.synced_last = None;
        }
        for (id, node) in graph.nodes_after(self.synced_last) {
            match node {
                SceneNode::Light(light) => self.add_light(light),
                SceneNode::Mesh(mesh) => self.add_mesh(mesh),
            }
            self.synced_last = Some(*id);
        }
    }

    fn add_light(&self, light: &Light) {
        match *light {
            Light::Ambient { color, intensity } => {
                self.scene.add(&AmbientLight::new(color, intensity));
            }
            Light::Directional {
                color,
                intensity,
                position,
            } => {
                let light = DirectionalLight::new(color, intensity);
                light.position().set(position.x, position.y, position.z);
                self.scene.add(&light);
            }
        }
    }

    fn add_mesh(&self, mesh: &Mesh) {
        let geometry: JsValue = match &mesh.geometry {
            Geometry::Plane { width, height } => PlaneGeometry::new(*width, *height).into(),
            Geometry::Box {
                width,
                height,
                depth,
            } => BoxGeometry::new(*width, *height, *depth).into(),
            Geometry::Model { url } => {
                self.load_model(url, mesh.transform);
                return;
            }
        };
        let object = ThreeMesh::new(&geometry, &material(&mesh.material));
        apply_transform(&object, &mesh.transform);
        self.scene.add(&object);
    }

    fn load_model(&self, url: &str, transform: Transform) {
        let scene = self.scene.clone();
        let loaded_url = url.to_string();
        let on_load = Closure::once_into_js(move |gltf: JsValue| {
            let Some(model) = crate::js::get(&gltf, "scene") else {
                warn!("model {loaded_url} has no scene");
                return;
            };
            let model: Object3D = model.unchecked_into();
            apply_transform(&model, &transform);
            scene.add(&model);
        });
        let failed_url = url.to_string();
        let on_error = Closure::once_into_js(move |err: JsValue| {
            warn!("loading model {failed_url} failed: {}", describe(&err));
        });
        GLTFLoader::new().load(url, &on_load, &JsValue::UNDEFINED, &on_error);
    }
}

impl RenderBackend for ThreeBackend {
    fn set_auto_clear(&mut self, enabled: bool) {
        self.renderer.set_auto_clear(enabled);
    }

    fn render(&mut self, graph: &SceneGraph, camera: &PerspectiveCamera) {
        self.sync(graph);
        let values = Float64Array::from(camera.projection().as_slice());
        self.camera.projection_matrix().from_array(&values);
        self.renderer.render(&self.scene, &self.camera);
    }

    fn reset_state(&mut self) {
        self.renderer.reset_state();
    }
}
