// Main window for the arcspot showcase
// Composes the loading screen, the stage, the detail modal and the scroll
// loop. Preloading must finish before the stage exists or any scroll input
// is wired; the tick callback then drives the whole scene.

use gdk4::{Display, MemoryFormat, MemoryTexture, Texture};
use gtk4::prelude::*;
use gtk4::{
    glib, Align, Application, ApplicationWindow, Box as GtkBox, CssProvider, EventControllerKey,
    EventControllerScroll, EventControllerScrollFlags, Label, Orientation, Overlay, ProgressBar,
    STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use once_cell::sync::OnceCell;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::detail_modal::DetailModal;
use super::stage::Stage;
use crate::models::Catalog;
use crate::preload::{self, PreloadResult, Preloader, ProgressTally};
use crate::scene::{SceneFrame, SceneTuning, ViewportGeometry};
use crate::scroll::{PinnedTrigger, SmoothScroll};

const DEFAULT_WIDTH: i32 = 1280;
const DEFAULT_HEIGHT: i32 = 800;

/// Quiet period before a resize burst lands as one geometry recompute.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);
/// How long the finished loading bar stays on screen.
const LOADING_HOLD: Duration = Duration::from_millis(300);
/// Fade-out time before the loading screen is removed for good.
const LOADING_TEARDOWN: Duration = Duration::from_millis(600);
/// Scrub settle time, in seconds.
const SCRUB_SECONDS: f64 = 1.0;

static CSS_INSTALLED: OnceCell<()> = OnceCell::new();

const FALLBACK_CSS: &str = r#"
window {
    background-color: #0a0a0c;
}

.stage {
    background-color: #0a0a0c;
}

.loading-screen {
    background-color: #0a0a0c;
    transition: opacity 600ms ease;
}

.loading-screen.hidden {
    opacity: 0;
}

.loading-title {
    font-family: monospace;
    font-size: 13px;
    letter-spacing: 4px;
    color: #9a968f;
}

.loading-percentage {
    font-family: monospace;
    font-size: 28px;
    color: #e8e6e3;
}

.loading-screen progressbar trough {
    min-height: 2px;
    background-color: #2a2a2e;
}

.loading-screen progressbar progress {
    min-height: 2px;
    background-color: #e8e6e3;
}

.bg-layer {
    opacity: 0;
    transition: opacity 300ms ease;
}

.bg-layer.active {
    opacity: 1;
}

.shade {
    background-image: linear-gradient(
        to bottom,
        rgba(5, 5, 8, 0.85),
        rgba(5, 5, 8, 0.35) 40%,
        rgba(5, 5, 8, 0.9)
    );
}

.intro-text {
    font-size: 44px;
    font-weight: 800;
    letter-spacing: 10px;
    color: #e8e6e3;
}

.stage-header {
    font-family: monospace;
    font-size: 12px;
    letter-spacing: 6px;
    color: #9a968f;
}

.title-rail {
    padding-left: 14px;
    border-left: 1px solid transparent;
    transition: border-color 300ms ease;
}

.title-rail.marks-visible {
    border-left-color: rgba(232, 230, 227, 0.4);
}

.rail-title {
    font-size: 30px;
    font-weight: 700;
    color: #e8e6e3;
    filter: blur(2px);
    transition: font-size 400ms ease, filter 400ms ease, text-shadow 400ms ease;
}

.rail-title.active {
    font-size: 36px;
    filter: blur(0px);
    text-shadow: 0 0 20px rgba(255, 255, 255, 0.4);
}

.modal-backdrop {
    background-color: rgba(5, 5, 8, 0.75);
}

.modal-panel {
    background-color: #141418;
    border: 1px solid #2a2a2e;
    padding: 24px;
}

.modal-title {
    font-size: 24px;
    font-weight: 800;
    color: #e8e6e3;
}

.modal-blurb {
    font-size: 14px;
    color: #b5b1aa;
}

.modal-close, .modal-link {
    font-family: monospace;
}
"#;

/// Install the stylesheet once per process; a style.css next to the sources
/// wins over the embedded copy during development.
fn load_css() {
    CSS_INSTALLED.get_or_init(|| {
        let provider = CssProvider::new();

        let css_path = concat!(env!("CARGO_MANIFEST_DIR"), "/src/ui/style.css");
        if Path::new(css_path).exists() {
            provider.load_from_path(css_path);
            tracing::info!("Loaded CSS from: {}", css_path);
        } else {
            provider.load_from_string(FALLBACK_CSS);
            tracing::info!("Loaded fallback embedded CSS");
        }

        if let Some(display) = Display::default() {
            gtk4::style_context_add_provider_for_display(
                &display,
                &provider,
                STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }
    });
}

pub struct MainWindow {
    self_weak: RefCell<Weak<MainWindow>>,
    window: ApplicationWindow,
    overlay: Overlay,
    loading_screen: GtkBox,
    loading_bar: ProgressBar,
    loading_percentage: Label,
    catalog: Rc<Catalog>,
    textures: RefCell<HashMap<PathBuf, Texture>>,
    stage: RefCell<Option<Rc<Stage>>>,
    modal: Rc<DetailModal>,
    scroll: Rc<RefCell<SmoothScroll>>,
    trigger: RefCell<PinnedTrigger>,
    geometry: RefCell<ViewportGeometry>,
    tuning: SceneTuning,
    preloader: RefCell<Option<Preloader>>,
    resize_source: RefCell<Option<glib::SourceId>>,
    observed_size: Cell<(i32, i32)>,
    last_tick: Cell<Option<i64>>,
    needs_frame: Cell<bool>,
}

impl MainWindow {
    pub fn new(app: &Application, assets_dir: Option<&Path>) -> Rc<Self> {
        load_css();

        let catalog = Rc::new(Catalog::builtin(resolve_assets_dir(assets_dir)));

        let window = ApplicationWindow::builder()
            .application(app)
            .title("arcspot")
            .default_width(DEFAULT_WIDTH)
            .default_height(DEFAULT_HEIGHT)
            .build();

        let overlay = Overlay::new();
        // Placeholder until preloading finishes and the stage replaces it.
        let placeholder = GtkBox::new(Orientation::Vertical, 0);
        placeholder.add_css_class("stage");
        placeholder.set_hexpand(true);
        placeholder.set_vexpand(true);
        overlay.set_child(Some(&placeholder));
        window.set_child(Some(&overlay));

        let modal = DetailModal::new();
        overlay.add_overlay(modal.widget());

        let (loading_screen, loading_bar, loading_percentage) = build_loading_screen();
        overlay.add_overlay(&loading_screen);

        let tuning = SceneTuning::default();
        let geometry = ViewportGeometry::new(DEFAULT_WIDTH as f64, DEFAULT_HEIGHT as f64, &tuning);
        let trigger = PinnedTrigger::new(geometry.height, SCRUB_SECONDS);
        let scroll = Rc::new(RefCell::new(SmoothScroll::new(trigger.pin_length())));

        // The modal suspends and resumes the virtual scroller.
        {
            let scroll = scroll.clone();
            modal.connect_scroll_gate(move |suspend| {
                let mut scroll = scroll.borrow_mut();
                if suspend {
                    scroll.stop();
                } else {
                    scroll.start();
                }
            });
        }

        // Escape closes the modal while it is open.
        {
            let modal = modal.clone();
            let key_controller = EventControllerKey::new();
            key_controller.connect_key_pressed(move |_, key, _, _| {
                if key == gdk4::Key::Escape && modal.handle_escape() {
                    return glib::Propagation::Stop;
                }
                glib::Propagation::Proceed
            });
            window.add_controller(key_controller);
        }

        let main_window = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            overlay,
            loading_screen,
            loading_bar,
            loading_percentage,
            catalog,
            textures: RefCell::new(HashMap::new()),
            stage: RefCell::new(None),
            modal,
            scroll,
            trigger: RefCell::new(trigger),
            geometry: RefCell::new(geometry),
            tuning,
            preloader: RefCell::new(None),
            resize_source: RefCell::new(None),
            observed_size: Cell::new((DEFAULT_WIDTH, DEFAULT_HEIGHT)),
            last_tick: Cell::new(None),
            needs_frame: Cell::new(true),
        });
        *main_window.self_weak.borrow_mut() = Rc::downgrade(&main_window);

        main_window.begin_preload();
        main_window
    }

    pub fn present(&self) {
        self.window.present();
    }

    fn weak(&self) -> Weak<MainWindow> {
        self.self_weak.borrow().clone()
    }

    /// Kick off the preloader and drain its results on the main thread.
    /// The stage is only built once every source has completed.
    fn begin_preload(self: &Rc<Self>) {
        let sources: Vec<PathBuf> = self
            .catalog
            .unique_image_sources()
            .iter()
            .map(|source| self.catalog.resolve(source))
            .collect();

        let mut tally = ProgressTally::new(sources.len());
        self.show_progress(tally.percent());

        if tally.is_complete() {
            self.finish_loading();
            return;
        }

        let (result_tx, result_rx) = async_channel::unbounded::<PreloadResult>();
        let preloader = Preloader::with_default_workers(result_tx);
        preloader.enqueue_all(sources);
        *self.preloader.borrow_mut() = Some(preloader);

        let weak = self.weak();
        glib::spawn_future_local(async move {
            while let Ok(result) = result_rx.recv().await {
                let Some(window) = weak.upgrade() else {
                    break;
                };
                let percent = tally.record();
                window.handle_preload_result(result, percent);
                if tally.is_complete() {
                    window.finish_loading();
                    break;
                }
            }
        });
    }

    fn handle_preload_result(&self, result: PreloadResult, percent: f64) {
        if let Ok(image) = result.outcome {
            match preload::to_rgba_bytes(&image) {
                Ok((bytes, width, height)) => {
                    if let Some(texture) = create_texture_from_rgba(&bytes, width, height) {
                        self.textures.borrow_mut().insert(result.path, texture);
                    }
                }
                Err(error) => {
                    tracing::warn!(path = ?result.path, %error, "Dropping undisplayable image");
                }
            }
        }
        self.show_progress(percent);
    }

    fn show_progress(&self, percent: f64) {
        self.loading_bar.set_fraction(percent / 100.0);
        self.loading_percentage
            .set_text(&format!("{}%", percent.round() as i64));
    }

    /// All sources accounted for: hold the full bar briefly, then swap the
    /// placeholder for the real stage.
    fn finish_loading(&self) {
        let weak = self.weak();
        glib::timeout_add_local_once(LOADING_HOLD, move || {
            if let Some(window) = weak.upgrade() {
                window.reveal_stage();
            }
        });
    }

    fn reveal_stage(self: &Rc<Self>) {
        let stage = Stage::new(&self.catalog, &self.textures.borrow());
        self.overlay.set_child(Some(stage.widget()));

        let weak = self.weak();
        stage.connect_title_activated(move |index| {
            if let Some(window) = weak.upgrade() {
                window.open_modal(index);
            }
        });

        *self.stage.borrow_mut() = Some(stage);

        // Seed the geometry from the real allocation before the first frame.
        let width = self.overlay.allocated_width();
        let height = self.overlay.allocated_height();
        if width > 0 && height > 0 {
            self.observed_size.set((width, height));
        }
        self.refresh_geometry();
        self.wire_scroll();

        self.loading_screen.add_css_class("hidden");
        let weak = self.weak();
        glib::timeout_add_local_once(LOADING_TEARDOWN, move || {
            if let Some(window) = weak.upgrade() {
                window.overlay.remove_overlay(&window.loading_screen);
            }
        });
    }

    fn open_modal(&self, index: usize) {
        let stage = match self.stage.borrow().as_ref() {
            Some(stage) => stage.clone(),
            None => return,
        };
        let Some(item) = self.catalog.items().get(index) else {
            return;
        };
        let textures = self.textures.borrow();
        let texture = textures.get(&self.catalog.resolve(&item.image));
        self.modal
            .try_open(index, stage.active_index(), item, texture);
    }

    /// Vertical wheel input feeds the virtual scroller; the frame clock
    /// drives easing, trigger progress and rendering.
    fn wire_scroll(self: &Rc<Self>) {
        let controller = EventControllerScroll::new(EventControllerScrollFlags::VERTICAL);
        let scroll = self.scroll.clone();
        controller.connect_scroll(move |_, _dx, dy| {
            scroll.borrow_mut().add_wheel_delta(dy);
            glib::Propagation::Stop
        });
        self.window.add_controller(controller);

        let weak = self.weak();
        self.overlay.add_tick_callback(move |_, clock| {
            let Some(window) = weak.upgrade() else {
                return glib::ControlFlow::Break;
            };
            window.on_tick(clock.frame_time());
            glib::ControlFlow::Continue
        });
    }

    fn on_tick(&self, frame_time: i64) {
        let dt = match self.last_tick.replace(Some(frame_time)) {
            Some(previous) => ((frame_time - previous).max(0) as f64) / 1_000_000.0,
            None => 0.0,
        };

        self.observe_viewport();

        let position = self.scroll.borrow_mut().tick(dt);
        let moved = self.trigger.borrow_mut().update(position, dt);
        if moved.is_some() || self.needs_frame.replace(false) {
            self.render_frame();
        }
    }

    /// One full style pass: compute the frame for the current progress and
    /// hand it to the stage.
    fn render_frame(&self) {
        let stage = match self.stage.borrow().as_ref() {
            Some(stage) => stage.clone(),
            None => return,
        };
        let geometry = self.geometry.borrow();
        let slots = stage.title_slots();
        let frame = SceneFrame::compute(self.trigger.borrow().progress(), &geometry, &slots);
        stage.apply_frame(&frame, &geometry);
    }

    fn observe_viewport(&self) {
        let width = self.overlay.allocated_width();
        let height = self.overlay.allocated_height();
        if width <= 0 || height <= 0 {
            return;
        }
        if self.observed_size.replace((width, height)) != (width, height) {
            self.schedule_geometry_refresh();
        }
    }

    /// Cancel-and-reschedule debounce: a resize burst produces exactly one
    /// recompute after the quiet period.
    fn schedule_geometry_refresh(&self) {
        if let Some(source) = self.resize_source.borrow_mut().take() {
            source.remove();
        }
        let weak = self.weak();
        let source = glib::timeout_add_local_once(RESIZE_DEBOUNCE, move || {
            if let Some(window) = weak.upgrade() {
                window.resize_source.borrow_mut().take();
                window.refresh_geometry();
            }
        });
        *self.resize_source.borrow_mut() = Some(source);
    }

    /// Re-derive the arc constants and the pinned region from the observed
    /// viewport, then force a fresh frame at the current progress.
    fn refresh_geometry(&self) {
        let (width, height) = self.observed_size.get();
        if width <= 0 || height <= 0 {
            return;
        }

        self.geometry
            .borrow_mut()
            .recompute(width as f64, height as f64, &self.tuning);

        let pin_length = {
            let mut trigger = self.trigger.borrow_mut();
            trigger.refresh(height as f64, true);
            trigger.pin_length()
        };
        self.scroll.borrow_mut().set_max(pin_length);

        self.needs_frame.set(true);
        tracing::debug!(width, height, "Recomputed scene geometry");
    }
}

fn build_loading_screen() -> (GtkBox, ProgressBar, Label) {
    let screen = GtkBox::new(Orientation::Vertical, 0);
    screen.add_css_class("loading-screen");
    screen.set_hexpand(true);
    screen.set_vexpand(true);

    let content = GtkBox::new(Orientation::Vertical, 16);
    content.set_halign(Align::Center);
    content.set_valign(Align::Center);
    content.set_vexpand(true);

    let title = Label::new(Some("LOADING"));
    title.add_css_class("loading-title");

    let bar = ProgressBar::new();
    bar.set_size_request(320, -1);

    let percentage = Label::new(Some("0%"));
    percentage.add_css_class("loading-percentage");

    content.append(&title);
    content.append(&bar);
    content.append(&percentage);
    screen.append(&content);

    (screen, bar, percentage)
}

fn create_texture_from_rgba(data: &[u8], width: u32, height: u32) -> Option<Texture> {
    if width == 0 || height == 0 {
        return None;
    }
    let expected = (width as u64)
        .saturating_mul(height as u64)
        .saturating_mul(4);
    if (data.len() as u64) < expected {
        tracing::warn!(
            "Skipping texture: data too small ({} bytes for {}x{})",
            data.len(),
            width,
            height
        );
        return None;
    }
    let bytes = glib::Bytes::from(data);
    Some(
        MemoryTexture::new(
            width as i32,
            height as i32,
            MemoryFormat::R8g8b8a8,
            &bytes,
            (width as usize) * 4,
        )
        .upcast(),
    )
}

fn resolve_assets_dir(path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => expand_home(path),
        None => PathBuf::from("assets"),
    }
}

/// Expand a leading `~` against the user's home directory.
fn expand_home(input: &Path) -> PathBuf {
    if let Ok(stripped) = input.strip_prefix("~") {
        if let Some(dirs) = directories::UserDirs::new() {
            return dirs.home_dir().join(stripped);
        }
    }
    input.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_assets_dir_defaults() {
        assert_eq!(resolve_assets_dir(None), PathBuf::from("assets"));
        assert_eq!(
            resolve_assets_dir(Some(Path::new("/data/media"))),
            PathBuf::from("/data/media")
        );
    }

    #[test]
    fn test_expand_home_passthrough_without_tilde() {
        assert_eq!(
            expand_home(Path::new("relative/dir")),
            PathBuf::from("relative/dir")
        );
    }
}
