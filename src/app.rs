// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app owns one [`Session`] and translates menu, toolbar, keyboard and
//! canvas input into session calls. Images are decoded on a background
//! thread.

use crate::ui::canvas::{self, CanvasAction};
use crate::ui::name_tag::{name_tag_pool, NameTag};
use crate::ui::{properties, toolbar};
use annoview::engine::session::{ClickOutcome, Session};
use annoview::engine::store::{DraftState, DrawOutcome};
use annoview::engine::viewport::PanAnchor;
use annoview::io::config::ViewerConfig;
use annoview::io::media::{self, LoadedImage, IMAGE_EXTENSIONS};
use annoview::util::geometry::Point;
use annoview::EngineError;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

pub struct AnnoviewApp {
    session: Session<NameTag>,

    /// Texture of the loaded image
    image_texture: Option<egui::TextureHandle>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedImage, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Set while Space is held and the pointer drags the media
    pan_anchor: Option<PanAnchor>,

    /// Last error worth showing in the status bar
    status: Option<String>,

    /// Bucket size for plain arrow-key seeks
    seek_step: f64,
}

impl AnnoviewApp {
    pub fn new(config: &ViewerConfig) -> Self {
        let session = Session::new(config.viewport(), name_tag_pool(), config.fps_window);
        Self {
            session,
            image_texture: None,
            image_loader: None,
            loading_message: None,
            pan_anchor: None,
            status: None,
            seek_step: config.seek_step_seconds,
        }
    }

    /// Load an image file on a background thread.
    fn load_image_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        std::thread::spawn(move || {
            let result = media::load_image(&path).map_err(|e| format!("{:#}", e));
            if let Ok(ref img) = result {
                log::info!("Loaded image: {} ({}x{})", path.display(), img.width, img.height);
            }
            let _ = sender.send(result);
        });
    }

    fn open_image_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.load_image_file(path);
        }
    }

    fn receive_image(&mut self, ctx: &egui::Context) {
        let Some(ref receiver) = self.image_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.image_loader = None;
        self.loading_message = None;

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("Failed to load image: {}", e);
                self.status = Some(format!("Failed to load image: {}", e));
                return;
            }
        };

        if let Err(e) = self
            .session
            .load_image(loaded.width as f64, loaded.height as f64)
        {
            log::error!("Cannot display image: {}", e);
            self.status = Some(e.to_string());
            return;
        }

        let size = [loaded.width as usize, loaded.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
        self.image_texture =
            Some(ctx.load_texture("loaded_image", color_image, egui::TextureOptions::LINEAR));
        self.pan_anchor = None;
        self.status = None;
    }

    fn viewer_center(&self) -> Point {
        let viewer = self.session.viewport().viewer_size();
        Point::new(viewer.width / 2.0, viewer.height / 2.0)
    }

    fn zoom_step(&mut self, wheel_delta_y: f64) {
        let at = self.viewer_center();
        if let Err(e) = self.session.zoom_at(at, wheel_delta_y) {
            log::debug!("Zoom ignored: {}", e);
        }
    }

    fn reset_view(&mut self) {
        if let Err(e) = self.session.reset_view() {
            log::debug!("Reset ignored: {}", e);
        }
    }

    fn arm(&mut self) {
        if let Err(e) = self.session.arm() {
            log::debug!("Cannot arm: {}", e);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && self.session.cancel_active() {
            log::info!("Cancelled rectangle");
        }

        // Shortcuts must not fire while a name is being typed.
        if ctx.wants_keyboard_input() {
            self.pan_anchor = None;
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::R) && !i.modifiers.any()) {
            self.arm();
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Num1)) {
            self.reset_view();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::F) && !i.modifiers.any()) {
            let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
        }

        self.handle_seek_keys(ctx);

        let (space, pointer) = ctx.input(|i| (i.key_down(egui::Key::Space), i.pointer.hover_pos()));
        match (space, pointer) {
            (true, Some(pos)) => {
                let pointer = Point::new(pos.x as f64, pos.y as f64);
                match self.pan_anchor {
                    Some(anchor) => {
                        if let Err(e) = self.session.pan_to(&anchor, pointer) {
                            log::debug!("Pan ignored: {}", e);
                        }
                    }
                    None => self.pan_anchor = Some(self.session.begin_pan(pointer)),
                }
            }
            _ => self.pan_anchor = None,
        }
    }

    /// Arrow keys seek a loaded video: plain by `seek_step` buckets, Ctrl by
    /// minutes, Ctrl+Shift by seconds and Shift by a single frame.
    fn handle_seek_keys(&mut self, ctx: &egui::Context) {
        if self.session.playback().is_none() {
            return;
        }

        let (direction, modifiers) = ctx.input(|i| {
            let direction = if i.key_pressed(egui::Key::ArrowLeft) {
                -1
            } else if i.key_pressed(egui::Key::ArrowRight) {
                1
            } else {
                0
            };
            (direction, i.modifiers)
        });
        if direction == 0 {
            return;
        }

        let result = match (modifiers.command, modifiers.shift) {
            (true, true) => self.session.skip_buckets(1.0, direction),
            (true, false) => self.session.skip_buckets(60.0, direction),
            (false, true) => {
                let now = self.session.playback().map_or(0.0, |p| p.current_time());
                self.session.seek_to(now, Some(direction))
            }
            (false, false) => self.session.skip_buckets(self.seek_step, direction),
        };

        match result {
            Ok(target) => log::debug!("Seek to {:.3}s", target),
            Err(e) => log::debug!("Seek ignored: {}", e),
        }
    }

    fn handle_canvas(&mut self, actions: Vec<CanvasAction>) {
        for action in actions {
            match action {
                CanvasAction::Resized(width, height) => {
                    if let Err(e) = self.session.resize_viewer(width, height) {
                        log::debug!("Viewer resize ignored: {}", e);
                    }
                }
                CanvasAction::PointerMoved(at) => {
                    if self.pan_anchor.is_none() {
                        if let Err(e) = self.session.pointer_moved(at) {
                            log::debug!("Pointer move ignored: {}", e);
                        }
                    }
                }
                CanvasAction::Click(at) => match self.session.click(at) {
                    Ok(ClickOutcome::Started(index)) => log::info!("Started rectangle {}", index),
                    Ok(ClickOutcome::Finished(DrawOutcome::Naming { label })) => {
                        log::info!("Finished rectangle, naming with tag {}", label)
                    }
                    Ok(ClickOutcome::Finished(DrawOutcome::Discarded)) => {
                        log::info!("Discarded empty rectangle")
                    }
                    Ok(ClickOutcome::Ignored) => {}
                    Err(e) => log::debug!("Click ignored: {}", e),
                },
                CanvasAction::Zoom { at, delta_y } => {
                    if let Err(e) = self.session.zoom_at(at, delta_y) {
                        log::debug!("Zoom ignored: {}", e);
                    }
                }
                CanvasAction::CommitName(text) => self.commit_name(&text),
            }
        }
    }

    fn commit_name(&mut self, text: &str) {
        let label = match self.session.annotations().draft() {
            DraftState::Naming { label, .. } => label,
            _ => return,
        };

        match self.session.commit_name(text) {
            Ok(name) => {
                log::info!("Named rectangle '{}'", name);
                self.status = None;
            }
            Err(EngineError::RejectedInput(reason)) => {
                // Keep the field open and focused for another try.
                if let Some(tag) = self.session.annotations_mut().labels_mut().get_mut(label) {
                    tag.wants_focus = true;
                }
                self.status = Some(reason);
            }
            Err(e) => log::warn!("Commit failed: {}", e),
        }
    }
}

/// Zoom relative to the fitted layout, or `None` when there is nothing to
/// act on.
fn zoom_readout(session: &Session<NameTag>) -> Option<f64> {
    let viewport = session.viewport();
    (session.media().is_some() && viewport.is_fitted())
        .then(|| viewport.scale() / viewport.min_scale())
}

impl eframe::App for AnnoviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_image(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        self.open_image_dialog();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.session.media().is_some(), egui::Button::new("Close"))
                        .clicked()
                    {
                        self.session.unload();
                        self.image_texture = None;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.zoom_step(-1.0);
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.zoom_step(1.0);
                        ui.close_menu();
                    }
                    if ui.button("Reset Zoom (Ctrl+1)").clicked() {
                        self.reset_view();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Toggle Fullscreen (F)").clicked() {
                        let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
                        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    ui.label("R: draw a rectangle");
                    ui.label("Escape: cancel drawing or naming");
                    ui.label("Space + move: pan");
                    ui.label("Wheel: zoom at the pointer");
                    ui.label("Ctrl+1: reset zoom");
                    ui.label("F: fullscreen");
                });
            });
        });

        // Toolbar
        let scale = zoom_readout(&self.session);
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.session.annotations().draft(), scale))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::OpenImage => self.open_image_dialog(),
            toolbar::ToolbarAction::Arm => self.arm(),
            toolbar::ToolbarAction::ResetView => self.reset_view(),
            toolbar::ToolbarAction::None => {}
        }

        if let Some(ref status) = self.status {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.label(egui::RichText::new(status).color(egui::Color32::LIGHT_RED));
            });
        }

        // Properties panel (right side)
        egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, &self.session));

        self.handle_keys(ctx);

        // Main canvas (center)
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    Vec::new()
                } else {
                    canvas::show(
                        ui,
                        &mut self.session,
                        &self.image_texture,
                        self.pan_anchor.is_some(),
                    )
                }
            })
            .inner;

        self.handle_canvas(actions);
    }
}
