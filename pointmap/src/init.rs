//! Runs the map component as a native window or in a web page canvas.

use crate::component::MapComponent;
use crate::error::PointMapError;

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// `eframe` application showing one [`MapComponent`].
///
/// The component is mounted when the application is created and unmounted when it is dropped.
pub struct PointMapApp {
    component: MapComponent,
}

impl PointMapApp {
    /// Mounts the component and binds it to the renderer of the application.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mut component: MapComponent,
    ) -> Result<Self, PointMapError> {
        let render_state = cc.wgpu_render_state.clone().ok_or_else(|| {
            PointMapError::Startup("wgpu render state is not available".to_string())
        })?;

        component.mount();
        component.attach_renderer(cc.egui_ctx.clone(), render_state);

        Ok(Self { component })
    }

    /// The component shown by the application.
    pub fn component(&self) -> &MapComponent {
        &self.component
    }
}

impl eframe::App for PointMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.component.show(ctx);
    }
}

fn app_creator(component: MapComponent) -> eframe::AppCreator<'static> {
    Box::new(
        move |cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, DynError> {
            Ok(Box::new(PointMapApp::new(cc, component)?))
        },
    )
}

/// Opens a native window with the component and blocks until it is closed.
///
/// Logs go to stderr, filtered by `RUST_LOG` (`info` by default). Tiles are loaded by a tokio
/// runtime running on a background thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn run(component: MapComponent) -> Result<(), PointMapError> {
    use std::time::Duration;

    use tokio::runtime::Runtime;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rt = Runtime::new()
        .map_err(|err| PointMapError::Startup(format!("cannot create async runtime: {err}")))?;
    let handle = rt.handle().clone();
    let _enter = handle.enter();

    std::thread::spawn(move || {
        rt.block_on(async {
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        })
    });

    let title = component.config().title.clone();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_title(&title),
        ..Default::default()
    };

    log::info!("Starting {title}");
    eframe::run_native(&title, native_options, app_creator(component))
        .map_err(|err| PointMapError::Startup(err.to_string()))
}

/// Starts the component in the canvas whose id is the configured container.
///
/// Logs go to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn start_web(component: MapComponent) {
    use eframe::wasm_bindgen::JsCast as _;

    eframe::WebLogger::init(log::LevelFilter::Info).ok();

    let canvas_id = component.config().container.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&canvas_id))
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());

        let Some(canvas) = canvas else {
            log::error!("Canvas '{canvas_id}' was not found");
            return;
        };

        let result = eframe::WebRunner::new()
            .start(canvas, eframe::WebOptions::default(), app_creator(component))
            .await;

        if let Err(err) = result {
            log::error!("Failed to start the map: {err:?}");
        }
    });
}
