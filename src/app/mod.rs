use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use itx_network::cache::BuildCache;
use itx_network::config::{PipelineConfig, SearchMode};
use itx_network::network::{Graph, Payload, load_payload};
use itx_network::pipeline;
use itx_network::session::Session;

mod controls;
mod interaction;
mod render_utils;
mod view;

type LoadResult = Result<Payload, String>;

pub struct ItxNetworkApp {
    datasets: Vec<PathBuf>,
    active: usize,
    config: PipelineConfig,
    graphs: BuildCache<Arc<Graph>>,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

enum Transition {
    To(AppState),
    Build(Payload),
}

struct ViewModel {
    dataset: usize,
    requested_dataset: Option<usize>,
    graph: Arc<Graph>,
    config: PipelineConfig,
    session: Option<Session>,
    last_canvas: Option<Vec2>,
    threshold: f32,
    search: String,
    search_mode: SearchMode,
    pan: Vec2,
    zoom: f32,
}

impl ItxNetworkApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        datasets: Vec<PathBuf>,
        config: PipelineConfig,
    ) -> Self {
        let state = Self::start_load(&datasets[0]);
        Self {
            datasets,
            active: 0,
            config,
            graphs: BuildCache::new(),
            state,
        }
    }

    fn spawn_load(path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_payload(&path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(path: &std::path::Path) -> AppState {
        tracing::info!(path = %path.display(), "loading relation payload");
        AppState::Loading {
            rx: Self::spawn_load(path.to_path_buf()),
        }
    }

    fn dataset_key(&self) -> String {
        self.datasets[self.active].display().to_string()
    }

    fn ready(&mut self, payload: &Payload) -> AppState {
        let key = self.dataset_key();
        let config = &self.config;
        let graph = self
            .graphs
            .get_or_build(&key, || Arc::new(pipeline::build(payload, config)));
        AppState::Ready(Box::new(ViewModel::new(
            self.active,
            Arc::clone(graph),
            self.config.clone(),
        )))
    }
}

impl eframe::App for ItxNetworkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(payload)) => transition = Some(Transition::Build(payload)),
                    Ok(Err(error)) => transition = Some(Transition::To(AppState::Error(error))),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Transition::To(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        )));
                    }
                }

                let path = self.datasets[self.active].display().to_string();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading relation network...");
                        ui.label(path);
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load relation network");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition =
                            Some(Transition::To(Self::start_load(&self.datasets[self.active])));
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx, &self.datasets);

                if let Some(index) = model.requested_dataset.take()
                    && index != self.active
                    && index < self.datasets.len()
                {
                    self.active = index;
                    transition = Some(Transition::To(Self::start_load(&self.datasets[index])));
                }
            }
        }

        // A loaded payload is turned into a graph here, on the UI thread.
        match transition {
            Some(Transition::To(next_state)) => self.state = next_state,
            Some(Transition::Build(payload)) => self.state = self.ready(&payload),
            None => {}
        }
    }
}
