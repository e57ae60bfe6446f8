// Detail overlay for the active showcase item
//
// Opens only from a click on the currently highlighted title. While open the
// smooth-scroll engine is suspended; any close path (button, backdrop click,
// Escape) resumes it exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, GestureClick, Label, LinkButton, Orientation, Picture,
    PropagationPhase,
};

use crate::models::ShowcaseItem;

/// Open/closed state with the opening rule and single-resume guarantee.
///
/// Kept free of widgets so the transition rules are directly testable.
#[derive(Debug, Default)]
pub struct ModalGate {
    open: bool,
}

impl ModalGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A click opens the modal only when it lands on the active title and
    /// nothing is open yet.
    pub fn try_open(&mut self, clicked: usize, active: usize) -> bool {
        if self.open || clicked != active {
            return false;
        }
        self.open = true;
        true
    }

    /// Returns true when this call actually closed the modal; callers resume
    /// scrolling only on true, so repeated closes cannot double-resume.
    pub fn close(&mut self) -> bool {
        std::mem::take(&mut self.open)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

pub struct DetailModal {
    backdrop: GtkBox,
    image: Picture,
    title: Label,
    blurb: Label,
    live_link: LinkButton,
    repo_link: LinkButton,
    gate: RefCell<ModalGate>,
    // Called with true to suspend scrolling, false to resume.
    scroll_gate: RefCell<Option<Box<dyn Fn(bool)>>>,
}

impl DetailModal {
    pub fn new() -> Rc<Self> {
        let backdrop = GtkBox::new(Orientation::Vertical, 0);
        backdrop.add_css_class("modal-backdrop");
        backdrop.set_hexpand(true);
        backdrop.set_vexpand(true);
        backdrop.set_visible(false);

        let panel = GtkBox::new(Orientation::Vertical, 12);
        panel.add_css_class("modal-panel");
        panel.set_halign(Align::Center);
        panel.set_valign(Align::Center);
        panel.set_hexpand(true);
        panel.set_vexpand(true);

        let image = Picture::new();
        image.set_content_fit(gtk4::ContentFit::Cover);
        image.set_size_request(480, 270);
        image.add_css_class("modal-image");

        let title = Label::new(None);
        title.add_css_class("modal-title");
        title.set_halign(Align::Start);

        let blurb = Label::new(None);
        blurb.add_css_class("modal-blurb");
        blurb.set_wrap(true);
        blurb.set_max_width_chars(52);
        blurb.set_halign(Align::Start);
        blurb.set_xalign(0.0);

        let links = GtkBox::new(Orientation::Horizontal, 8);
        let live_link = LinkButton::with_label("https://example.com", "VIEW LIVE");
        live_link.add_css_class("modal-link");
        let repo_link = LinkButton::with_label("https://example.com", "SOURCE");
        repo_link.add_css_class("modal-link");
        links.append(&live_link);
        links.append(&repo_link);

        let close_button = Button::with_label("[X] CLOSE");
        close_button.add_css_class("modal-close");
        close_button.set_halign(Align::End);

        panel.append(&close_button);
        panel.append(&image);
        panel.append(&title);
        panel.append(&blurb);
        panel.append(&links);
        backdrop.append(&panel);

        let modal = Rc::new(Self {
            backdrop,
            image,
            title,
            blurb,
            live_link,
            repo_link,
            gate: RefCell::new(ModalGate::new()),
            scroll_gate: RefCell::new(None),
        });

        let weak = Rc::downgrade(&modal);
        close_button.connect_clicked(move |_| {
            if let Some(modal) = weak.upgrade() {
                modal.close();
            }
        });

        // Backdrop click closes; Target phase keeps clicks on the panel and
        // its children from reaching this gesture.
        let backdrop_click = GestureClick::new();
        backdrop_click.set_propagation_phase(PropagationPhase::Target);
        let weak = Rc::downgrade(&modal);
        backdrop_click.connect_released(move |_, _, _, _| {
            if let Some(modal) = weak.upgrade() {
                modal.close();
            }
        });
        modal.backdrop.add_controller(backdrop_click);

        modal
    }

    pub fn widget(&self) -> &GtkBox {
        &self.backdrop
    }

    pub fn connect_scroll_gate<F>(&self, callback: F)
    where
        F: Fn(bool) + 'static,
    {
        *self.scroll_gate.borrow_mut() = Some(Box::new(callback));
    }

    /// Open for `item` if `clicked` is the active index.
    pub fn try_open(
        &self,
        clicked: usize,
        active: usize,
        item: &ShowcaseItem,
        texture: Option<&Texture>,
    ) -> bool {
        if !self.gate.borrow_mut().try_open(clicked, active) {
            return false;
        }

        self.title.set_text(&item.name);
        self.blurb.set_text(&item.blurb);
        self.live_link.set_uri(&item.live_url);
        self.repo_link.set_uri(&item.repo_url);
        self.image.set_paintable(texture);

        self.backdrop.set_visible(true);
        self.backdrop.add_css_class("open");
        self.suspend_scrolling(true);
        true
    }

    /// Close if open; the gate guarantees at most one resume per open.
    pub fn close(&self) -> bool {
        if !self.gate.borrow_mut().close() {
            return false;
        }
        self.backdrop.remove_css_class("open");
        self.backdrop.set_visible(false);
        self.suspend_scrolling(false);
        true
    }

    /// Escape handling; returns true when the key dismissed the modal.
    pub fn handle_escape(&self) -> bool {
        self.close()
    }

    pub fn is_open(&self) -> bool {
        self.gate.borrow().is_open()
    }

    fn suspend_scrolling(&self, suspend: bool) {
        if let Some(gate) = self.scroll_gate.borrow().as_ref() {
            gate(suspend);
        }
    }
}
