// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewer canvas: media display, rectangle overlay and name tags.
//!
//! The canvas only draws what the session hands it and reports input as
//! [`CanvasAction`]s in canvas-local screen coordinates. The application
//! feeds those back into the session.

use crate::ui::name_tag::NameTag;
use annoview::engine::session::Session;
use annoview::engine::store::DraftState;
use annoview::util::geometry::Point;

/// Input gathered on the canvas during one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    Resized(f64, f64),
    PointerMoved(Point),
    Click(Point),
    Zoom { at: Point, delta_y: f64 },
    CommitName(String),
}

/// Display the viewer and collect interactions.
pub fn show(
    ui: &mut egui::Ui,
    session: &mut Session<NameTag>,
    image_texture: &Option<egui::TextureHandle>,
    panning: bool,
) -> Vec<CanvasAction> {
    let mut actions = Vec::new();

    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
    let canvas = response.rect;
    let painter = painter.with_clip_rect(canvas);
    painter.rect_filled(canvas, 0.0, egui::Color32::from_gray(40));

    let viewer = session.viewport().viewer_size();
    if (viewer.width - canvas.width() as f64).abs() >= 0.5
        || (viewer.height - canvas.height() as f64).abs() >= 0.5
    {
        actions.push(CanvasAction::Resized(canvas.width() as f64, canvas.height() as f64));
    }

    let to_local = |p: egui::Pos2| Point::new((p.x - canvas.min.x) as f64, (p.y - canvas.min.y) as f64);
    let to_ui = |p: Point| canvas.min + egui::vec2(p.x as f32, p.y as f32);

    let texture = match image_texture {
        Some(texture) if session.viewport().is_fitted() => texture,
        _ => {
            show_welcome(&painter, canvas);
            return actions;
        }
    };

    // Media
    let position = session.viewport().media_position();
    let dimensions = session.viewport().media_dimensions();
    let media_rect = egui::Rect::from_min_size(
        to_ui(position),
        egui::vec2(dimensions.width as f32, dimensions.height as f32),
    );
    painter.image(
        texture.id(),
        media_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    // Rectangles
    match session.render_list() {
        Ok(list) => {
            for item in list {
                let [r, g, b] = item.color;
                let alpha = |a: f32| (a * 255.0).round() as u8;
                let rect = egui::Rect::from_min_max(
                    to_ui(Point::new(item.bounds.left, item.bounds.top)),
                    to_ui(Point::new(item.bounds.right, item.bounds.bottom)),
                );
                painter.rect_filled(
                    rect,
                    0.0,
                    egui::Color32::from_rgba_unmultiplied(r, g, b, alpha(item.fill_alpha)),
                );
                painter.rect_stroke(
                    rect,
                    0.0,
                    egui::Stroke::new(
                        2.0,
                        egui::Color32::from_rgba_unmultiplied(r, g, b, alpha(item.stroke_alpha)),
                    ),
                );
            }
        }
        Err(e) => log::warn!("Skipping overlay: {}", e),
    }

    show_name_tags(ui, session, to_ui, &mut actions);

    // Pointer
    let draft = session.annotations().draft();
    if panning {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if matches!(draft, DraftState::Armed | DraftState::Drawing { .. }) {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }

    if let Some(pos) = response.hover_pos() {
        let at = to_local(pos);
        actions.push(CanvasAction::PointerMoved(at));

        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            // egui scrolls up with positive deltas; wheel-up zooms in.
            actions.push(CanvasAction::Zoom {
                at,
                delta_y: -scroll as f64,
            });
        }
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            actions.push(CanvasAction::Click(to_local(pos)));
        }
    }

    actions
}

/// Draw a tag next to every rectangle holding one. The tag of the
/// rectangle being named is an editable field.
fn show_name_tags(
    ui: &mut egui::Ui,
    session: &mut Session<NameTag>,
    to_ui: impl Fn(Point) -> egui::Pos2,
    actions: &mut Vec<CanvasAction>,
) {
    let naming = match session.annotations().draft() {
        DraftState::Naming { label, .. } => Some(label),
        _ => None,
    };

    let tags: Vec<(usize, Point)> = session
        .rectangles_for_current_frame()
        .iter()
        .enumerate()
        .filter_map(|(index, rect)| rect.label.map(|label| (index, label)))
        .filter_map(|(index, label)| session.label_anchor(index).ok().map(|at| (label, at)))
        .collect();

    let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));

    for (label, anchor) in tags {
        let Some(tag) = session.annotations_mut().labels_mut().get_mut(label) else {
            continue;
        };
        if !tag.visible {
            continue;
        }

        let [r, g, b] = tag.color;
        let color = egui::Color32::from_rgb(r, g, b);

        egui::Area::new(egui::Id::new(("name-tag", tag.id)))
            .fixed_pos(to_ui(anchor) - egui::vec2(0.0, 24.0))
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                if naming == Some(label) {
                    let edit = ui.add(
                        egui::TextEdit::singleline(&mut tag.text)
                            .desired_width(140.0)
                            .hint_text("name")
                            .text_color(color),
                    );
                    if tag.wants_focus {
                        edit.request_focus();
                        tag.wants_focus = false;
                    }
                    if edit.lost_focus() && !escape {
                        actions.push(CanvasAction::CommitName(tag.text.clone()));
                    }
                } else {
                    egui::Frame::none()
                        .fill(egui::Color32::from_black_alpha(160))
                        .inner_margin(egui::Margin::symmetric(4.0, 2.0))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&tag.text).color(color));
                        });
                }
            });
    }
}

/// Welcome message when nothing is loaded.
fn show_welcome(painter: &egui::Painter, canvas: egui::Rect) {
    let center = canvas.center();
    painter.text(
        center - egui::vec2(0.0, 30.0),
        egui::Align2::CENTER_CENTER,
        "ANNOVIEW",
        egui::FontId::proportional(32.0),
        egui::Color32::from_gray(200),
    );
    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        "Media Annotation Viewer",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(150),
    );
    painter.text(
        center + egui::vec2(0.0, 30.0),
        egui::Align2::CENTER_CENTER,
        "File → Open Image... to begin annotating",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(180),
    );
}
