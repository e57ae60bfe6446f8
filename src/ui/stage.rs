// Stage construction and per-frame rendering for the showcase
//
// Materializes one title and one floating card per catalog item plus one
// background layer per unique image source, then applies SceneFrame records
// in a single render step. The stage owns exactly one piece of animation
// state - the active index - everything else is rederived from the frame on
// every tick.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{graphene, gsk};
use gtk4::{Align, Box as GtkBox, Fixed, GestureClick, Label, MediaFile, Orientation, Picture};
use tracing::warn;

use crate::models::Catalog;
use crate::scene::frame::{CardPlacement, SceneFrame, TitleSlot};
use crate::scene::stagger;
use crate::scene::viewport::{SceneTuning, ViewportGeometry};

/// Title extent assumed before the first allocation pass; real allocations
/// take over on the next tick.
const ESTIMATED_TITLE_HEIGHT: f64 = 96.0;
/// Opacity of titles outside the highlight once their window has opened.
const IDLE_TITLE_OPACITY: f64 = 0.25;
/// Rail indent as a fraction of the viewport width.
const RAIL_INDENT: f64 = 0.08;
/// Vertical anchor of the intro text pair, as a fraction of height.
const INTRO_ANCHOR: f64 = 0.45;
/// Card wrapper size; the arc runs through the wrapper center.
const CARD_WIDTH: i32 = 200;
const CARD_HEIGHT: i32 = 150;

/// One background layer, keyed by the owning item's image path even when it
/// plays a video.
struct MediaLayer {
    source: PathBuf,
    widget: Picture,
    stream: Option<MediaFile>,
}

impl MediaLayer {
    fn activate(&self) {
        self.widget.add_css_class("active");
        if let Some(stream) = &self.stream {
            stream.play();
            if let Some(error) = stream.error() {
                // Autoplay refusal is non-fatal; the layer stays paused
                // until the next activation.
                warn!(source = ?self.source, %error, "Background video did not start");
            }
        }
    }

    fn deactivate(&self) {
        self.widget.remove_css_class("active");
        if let Some(stream) = &self.stream {
            stream.pause();
        }
    }
}

pub struct Stage {
    root: Fixed,
    backdrop: Fixed,
    shade: GtkBox,
    layers: Vec<MediaLayer>,
    intro_top: Label,
    intro_bottom: Label,
    header: Label,
    rail: GtkBox,
    titles: Vec<Label>,
    cards: Vec<Picture>,
    item_sources: Vec<PathBuf>,
    tuning: SceneTuning,
    active_index: Cell<usize>,
    on_title_activated: Rc<RefCell<Option<Box<dyn Fn(usize)>>>>,
}

impl Stage {
    pub fn new(catalog: &Catalog, textures: &HashMap<PathBuf, Texture>) -> Rc<Self> {
        let tuning = SceneTuning::default();

        let root = Fixed::new();
        root.add_css_class("stage");
        root.set_hexpand(true);
        root.set_vexpand(true);

        // Backdrop: full-viewport clipping box holding every media layer
        // plus the shade; its reveal scale is a child transform on root.
        let backdrop = Fixed::new();
        backdrop.add_css_class("backdrop");
        backdrop.set_overflow(gtk4::Overflow::Hidden);
        root.put(&backdrop, 0.0, 0.0);

        let mut layers: Vec<MediaLayer> = Vec::new();
        for item in catalog.items() {
            if layers.iter().any(|layer| layer.source == item.image) {
                continue;
            }

            let widget = Picture::new();
            widget.add_css_class("bg-layer");
            widget.set_content_fit(gtk4::ContentFit::Cover);
            widget.set_can_shrink(true);

            let stream = match &item.video {
                Some(video) => {
                    let media = MediaFile::for_filename(catalog.resolve(video));
                    media.set_loop(true);
                    media.set_muted(true);
                    widget.set_paintable(Some(&media));
                    Some(media)
                }
                None => {
                    match textures.get(&catalog.resolve(&item.image)) {
                        Some(texture) => widget.set_paintable(Some(texture)),
                        // Preload failure: the layer stays blank, the scene
                        // carries on.
                        None => warn!(source = ?item.image, "No preloaded texture for layer"),
                    }
                    None
                }
            };

            backdrop.put(&widget, 0.0, 0.0);
            layers.push(MediaLayer {
                source: item.image.clone(),
                widget,
                stream,
            });
        }

        let shade = GtkBox::new(Orientation::Vertical, 0);
        shade.add_css_class("shade");
        shade.set_can_target(false);
        backdrop.put(&shade, 0.0, 0.0);

        // First layer is active by default; videos attempt autoplay here.
        if let Some(first) = layers.first() {
            first.activate();
        }

        let intro_top = Label::new(Some("SELECTED"));
        intro_top.add_css_class("intro-text");
        let intro_bottom = Label::new(Some("WORKS"));
        intro_bottom.add_css_class("intro-text");
        root.put(&intro_top, 0.0, 0.0);
        root.put(&intro_bottom, 0.0, 0.0);

        let header = Label::new(Some("SHOWCASE"));
        header.add_css_class("stage-header");
        root.put(&header, 0.0, 0.0);

        let rail = GtkBox::new(Orientation::Vertical, 18);
        rail.add_css_class("title-rail");

        let on_title_activated: Rc<RefCell<Option<Box<dyn Fn(usize)>>>> =
            Rc::new(RefCell::new(None));

        let mut titles = Vec::with_capacity(catalog.len());
        for (index, item) in catalog.items().iter().enumerate() {
            let title = Label::new(Some(&item.name));
            title.add_css_class("rail-title");
            title.set_halign(Align::Start);
            if index == 0 {
                title.add_css_class("active");
                title.set_opacity(1.0);
            } else {
                title.set_opacity(0.0);
            }

            let click = GestureClick::new();
            let on_activated = on_title_activated.clone();
            click.connect_released(move |_, _, _, _| {
                if let Some(callback) = on_activated.borrow().as_ref() {
                    callback(index);
                }
            });
            title.add_controller(click);

            rail.append(&title);
            titles.push(title);
        }
        // Parked far below until the first frame positions it.
        root.put(&rail, 0.0, 10_000.0);

        let mut cards = Vec::with_capacity(catalog.len());
        for item in catalog.items() {
            let card = Picture::new();
            card.add_css_class("arc-card");
            card.set_content_fit(gtk4::ContentFit::Cover);
            card.set_can_shrink(true);
            card.set_can_target(false);
            card.set_size_request(CARD_WIDTH, CARD_HEIGHT);
            card.set_visible(false);
            if let Some(texture) = textures.get(&catalog.resolve(&item.image)) {
                card.set_paintable(Some(texture));
            }
            root.put(&card, 0.0, 0.0);
            cards.push(card);
        }

        let item_sources = catalog.items().iter().map(|item| item.image.clone()).collect();

        Rc::new(Self {
            root,
            backdrop,
            shade,
            layers,
            intro_top,
            intro_bottom,
            header,
            rail,
            titles,
            cards,
            item_sources,
            tuning,
            active_index: Cell::new(0),
            on_title_activated,
        })
    }

    pub fn widget(&self) -> &Fixed {
        &self.root
    }

    pub fn active_index(&self) -> usize {
        self.active_index.get()
    }

    pub fn connect_title_activated<F>(&self, callback: F)
    where
        F: Fn(usize) + 'static,
    {
        *self.on_title_activated.borrow_mut() = Some(Box::new(callback));
    }

    /// Title extents within the untranslated rail, in item order.
    pub fn title_slots(&self) -> Vec<TitleSlot> {
        self.titles
            .iter()
            .enumerate()
            .map(|(index, title)| {
                let allocation = title.allocation();
                if allocation.height() > 0 {
                    TitleSlot::new(allocation.y() as f64, allocation.height() as f64)
                } else {
                    TitleSlot::new(
                        index as f64 * ESTIMATED_TITLE_HEIGHT,
                        ESTIMATED_TITLE_HEIGHT,
                    )
                }
            })
            .collect()
    }

    /// Apply one computed frame. Called on every scroll tick and after
    /// geometry refreshes; everything here is an absolute assignment.
    pub fn apply_frame(&self, frame: &SceneFrame, geometry: &ViewportGeometry) {
        let vw = geometry.width;
        let vh = geometry.height;

        self.backdrop.set_size_request(vw as i32, vh as i32);
        let backdrop_transform = scale_about_center(vw, vh, frame.backdrop_scale);
        self.root
            .set_child_transform(&self.backdrop, Some(&backdrop_transform));

        let media_transform = scale_about_center(vw, vh, frame.backdrop_media_scale);
        for layer in &self.layers {
            layer.widget.set_size_request(vw as i32, vh as i32);
            self.backdrop
                .set_child_transform(&layer.widget, Some(&media_transform));
        }
        self.shade.set_size_request(vw as i32, vh as i32);

        // Intro pair: antisymmetric travel, shared fade.
        let anchor_y = vh * INTRO_ANCHOR;
        let top_w = self.intro_top.allocated_width() as f64;
        let bottom_w = self.intro_bottom.allocated_width() as f64;
        self.root.move_(
            &self.intro_top,
            (vw - top_w) / 2.0 - frame.intro_shift,
            anchor_y - 48.0,
        );
        self.root.move_(
            &self.intro_bottom,
            (vw - bottom_w) / 2.0 + frame.intro_shift,
            anchor_y + 8.0,
        );
        self.intro_top.set_opacity(frame.intro_opacity);
        self.intro_bottom.set_opacity(frame.intro_opacity);

        let header_w = self.header.allocated_width() as f64;
        self.root.move_(&self.header, (vw - header_w) / 2.0, 24.0);
        self.header
            .set_opacity(if frame.header_visible { 1.0 } else { 0.0 });

        if frame.rail_marks_visible {
            self.rail.add_css_class("marks-visible");
        } else {
            self.rail.remove_css_class("marks-visible");
        }

        let rail_y = frame.rail_offset.unwrap_or(vh);
        self.root.move_(&self.rail, vw * RAIL_INDENT, rail_y);

        let active = self.active_index.get();
        for (index, title) in self.titles.iter().enumerate() {
            let opacity = if index == active {
                1.0
            } else {
                let window = stagger::local_progress(index, frame.switch_progress, &self.tuning);
                IDLE_TITLE_OPACITY * window.ramp()
            };
            title.set_opacity(opacity);
        }

        for (card, placement) in self.cards.iter().zip(frame.cards.iter()) {
            match placement {
                CardPlacement::Hidden => {
                    card.set_visible(false);
                    card.set_opacity(0.0);
                }
                CardPlacement::Placed { x, y } => {
                    card.set_visible(true);
                    card.set_opacity(1.0);
                    self.root.move_(card, *x, *y);
                }
            }
        }

        if let Some(new_active) = frame.active_index {
            if new_active != active {
                self.switch_active(active, new_active);
            }
        }
    }

    /// Demote the old highlight, promote the new one, and hand the backdrop
    /// to the matching layer. The emphasis animation itself lives in CSS
    /// transitions on the `active` class.
    fn switch_active(&self, old: usize, new: usize) {
        if let Some(title) = self.titles.get(old) {
            title.remove_css_class("active");
            title.set_opacity(IDLE_TITLE_OPACITY);
        }
        if let Some(title) = self.titles.get(new) {
            title.add_css_class("active");
            title.set_opacity(1.0);
        }

        let source = &self.item_sources[new];
        for layer in &self.layers {
            if &layer.source == source {
                layer.activate();
            } else {
                layer.deactivate();
            }
        }

        self.active_index.set(new);
    }
}

/// Scale transform about the viewport center; degenerate scales are clamped
/// so the matrix stays invertible.
fn scale_about_center(width: f64, height: f64, scale: f64) -> gsk::Transform {
    let scale = scale.max(0.001) as f32;
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    gsk::Transform::new()
        .translate(&graphene::Point::new(cx, cy))
        .scale(scale, scale)
        .translate(&graphene::Point::new(-cx, -cy))
}
