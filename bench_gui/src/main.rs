#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod dialog;
mod flow_window;
mod launcher_window;
mod log_panel;
mod tests_window;
mod ui;

use std::time::Instant;

use bench_core::launcher::LaunchTarget;
use bench_core::logging;
use bench_core::registry::WindowRegistry;
use bench_core::test_table::flow_window_title;
use platform_winit::{
    create_event_loop, create_window, ControlFlow, Event, EventLoopWindowTarget, WindowEvent,
    WindowId, WindowSpec,
};
use render_wgpu::{GpuContext, RenderError, WindowSurface};

use config::BenchConfig;
use flow_window::{FlowRequest, FlowWindow};
use launcher_window::{LauncherWindow, LAUNCHER_HEIGHT, LAUNCHER_TITLE, LAUNCHER_WIDTH};
use log_panel::LogRing;
use tests_window::{TestsRequest, TestsWindow, TESTS_TITLE};
use ui::WindowUi;

enum WindowContent {
    Launcher(LauncherWindow),
    Tests(TestsWindow),
    Flow(FlowWindow),
}

struct WindowSlot {
    surface: WindowSurface,
    ui: WindowUi,
    content: WindowContent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AppRequest {
    OpenTests,
    OpenFlow { title: String },
    Close(WindowId),
    SaveConfig,
}

struct BenchApp {
    config: BenchConfig,
    gpu: GpuContext,
    windows: WindowRegistry<WindowId, WindowSlot>,
    log: LogRing,
    start_time: Instant,
}

impl BenchApp {
    fn new(config: BenchConfig, gpu: GpuContext, log: LogRing) -> Self {
        Self {
            config,
            gpu,
            windows: WindowRegistry::new(),
            log,
            start_time: Instant::now(),
        }
    }

    fn insert(&mut self, surface: WindowSurface, content: WindowContent) {
        let ui = WindowUi::new(&surface, self.gpu.device());
        let id = surface.window_id();
        surface.request_redraw();
        self.windows.insert(
            id,
            WindowSlot {
                surface,
                ui,
                content,
            },
        );
    }

    fn open(&mut self, target: &EventLoopWindowTarget<()>, spec: WindowSpec, content: WindowContent) {
        let window = match create_window(target, &spec) {
            Ok(window) => window,
            Err(err) => {
                logging::error(format!("{}: {}", spec.title, err));
                return;
            }
        };
        match self.gpu.create_surface(window) {
            Ok(surface) => self.insert(surface, content),
            Err(err) => logging::error(format!("{}: {}", spec.title, err)),
        }
    }

    fn child_spec(&self, title: &str) -> WindowSpec {
        WindowSpec::new(title, self.config.window_width, self.config.window_height)
    }

    fn apply(&mut self, request: AppRequest, target: &EventLoopWindowTarget<()>) {
        match request {
            AppRequest::OpenTests => {
                let spec = self.child_spec(TESTS_TITLE);
                let content = WindowContent::Tests(TestsWindow::new(&self.config, self.log.clone()));
                self.open(target, spec, content);
            }
            AppRequest::OpenFlow { title } => {
                let spec = self.child_spec(&title);
                self.open(target, spec, WindowContent::Flow(FlowWindow::new(title)));
            }
            AppRequest::Close(id) => self.close(id, target),
            AppRequest::SaveConfig => self.save_config(),
        }
    }

    fn close(&mut self, id: WindowId, target: &EventLoopWindowTarget<()>) {
        if let Some(slot) = self.windows.remove(&id) {
            if let WindowContent::Flow(flow) = &slot.content {
                logging::debug(format!("closed {}", flow.title()));
            }
        }
        if self.windows.is_empty() {
            target.exit();
        }
    }

    fn save_config(&self) {
        if let Err(err) = self.config.save() {
            logging::warn(err.to_string());
        }
    }

    fn window_event(&mut self, id: WindowId, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => self.close(id, target),
            WindowEvent::RedrawRequested => self.redraw(id, target),
            event => {
                let Some(slot) = self.windows.get_mut(&id) else {
                    return;
                };
                if slot.ui.on_window_event(&slot.surface, &event) {
                    slot.surface.request_redraw();
                }
                match event {
                    WindowEvent::Resized(size) => slot.surface.resize(&self.gpu, size),
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = slot.surface.window().inner_size();
                        slot.surface.resize(&self.gpu, size);
                    }
                    _ => {}
                }
            }
        }
    }

    fn redraw(&mut self, id: WindowId, target: &EventLoopWindowTarget<()>) {
        let Some(slot) = self.windows.get_mut(&id) else {
            return;
        };
        let size = slot.surface.window().inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size != slot.surface.size() {
            slot.surface.resize(&self.gpu, size);
        }
        let time_seconds = self.start_time.elapsed().as_secs_f64();

        let WindowSlot {
            surface,
            ui,
            content,
        } = slot;
        let config = &mut self.config;
        let (requests, draw_data) = ui.frame(surface, time_seconds, |ctx| {
            let mut requests = Vec::new();
            match content {
                WindowContent::Launcher(launcher) => {
                    if let Some(open) = launcher.ui(ctx).and_then(launch_request) {
                        requests.push(open);
                        if config.launcher_closes_on_open {
                            requests.push(AppRequest::Close(id));
                        }
                    }
                }
                WindowContent::Tests(tests) => {
                    for request in tests.ui(ctx) {
                        match request {
                            TestsRequest::OpenFlow { title } => {
                                requests.push(AppRequest::OpenFlow { title })
                            }
                            TestsRequest::PathsChanged => {
                                config.csv_path =
                                    tests.csv_path().map(|path| path.display().to_string());
                                config.data_dir =
                                    Some(tests.data_dir().to_string()).filter(|dir| !dir.is_empty());
                                requests.push(AppRequest::SaveConfig);
                            }
                        }
                    }
                }
                WindowContent::Flow(flow) => {
                    for request in flow.ui(ctx) {
                        match request {
                            FlowRequest::NewFlow { title } => {
                                requests.push(AppRequest::OpenFlow { title })
                            }
                        }
                    }
                }
            }
            requests
        });

        let render_result = surface.render_with_overlay(
            &self.gpu,
            |device, queue, encoder, view, _format| {
                ui.paint(device, queue, encoder, view, &draw_data);
            },
        );
        match render_result {
            Ok(()) => {}
            Err(RenderError::Lost | RenderError::Outdated) => surface.reconfigure(&self.gpu),
            Err(RenderError::OutOfMemory) => {
                logging::error("render error: out of memory");
                target.exit();
            }
            Err(RenderError::Timeout) => {}
        }

        for request in requests {
            self.apply(request, target);
        }
    }

    fn poll_watchers(&mut self) {
        let now = Instant::now();
        for id in self.windows.ids() {
            let Some(slot) = self.windows.get_mut(&id) else {
                continue;
            };
            if let WindowContent::Tests(tests) = &mut slot.content {
                tests.poll(now);
            }
            slot.surface.request_redraw();
        }
    }
}

/// Window a launcher entry opens, if it has one.
fn launch_request(target: LaunchTarget) -> Option<AppRequest> {
    match target {
        LaunchTarget::CompilerTests => Some(AppRequest::OpenTests),
        LaunchTarget::CompilationFlow => Some(AppRequest::OpenFlow {
            title: flow_window_title(None),
        }),
        other => {
            logging::debug(format!("launcher entry {:?} has no window", other));
            None
        }
    }
}

fn main() {
    let log = LogRing::default();
    log.install();
    let config = BenchConfig::load();
    logging::set_max_level(config.log_level());

    let event_loop = create_event_loop().unwrap_or_else(|err| {
        logging::error(format!("window init failed: {}", err));
        std::process::exit(1);
    });
    let launcher_spec = WindowSpec::new(LAUNCHER_TITLE, LAUNCHER_WIDTH, LAUNCHER_HEIGHT);
    let launcher = create_window(&event_loop, &launcher_spec).unwrap_or_else(|err| {
        logging::error(format!("window init failed: {}", err));
        std::process::exit(1);
    });
    let (gpu, surface) = GpuContext::new(launcher).unwrap_or_else(|err| {
        logging::error(format!("renderer init failed: {}", err));
        std::process::exit(1);
    });

    let mut app = BenchApp::new(config, gpu, log);
    app.insert(surface, WindowContent::Launcher(LauncherWindow::default()));

    if let Err(err) = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, window_id } => app.window_event(window_id, event, elwt),
            Event::AboutToWait => app.poll_watchers(),
            Event::LoopExiting => app.save_config(),
            _ => {}
        }
    }) {
        logging::error(format!("event loop exited with error: {}", err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_enabled_launcher_entries_open_windows() {
        assert_eq!(
            launch_request(LaunchTarget::CompilerTests),
            Some(AppRequest::OpenTests)
        );
        assert_eq!(
            launch_request(LaunchTarget::CompilationFlow),
            Some(AppRequest::OpenFlow {
                title: "Compilation Flow".to_string()
            })
        );
        assert_eq!(launch_request(LaunchTarget::Swan), None);
    }
}
