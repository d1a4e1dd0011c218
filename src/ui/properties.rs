// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Side panel listing the rectangles of the frame on screen, with a
//! playback readout for videos.

use crate::ui::name_tag::NameTag;
use annoview::engine::session::Session;
use annoview::models::annotation::FrameKey;
use annoview::util::timecode::format_timestamp;

pub fn show(ui: &mut egui::Ui, session: &Session<NameTag>) {
    ui.heading("Annotations");
    ui.separator();

    let Some(media) = session.media() else {
        ui.label(egui::RichText::new("No media loaded").weak());
        return;
    };

    ui.label(format!(
        "{:?} {}x{}",
        media.kind, media.size.width, media.size.height
    ));

    if let Some(playback) = session.playback() {
        let now = format_timestamp(&playback.time_parts(playback.current_time()));
        let total = format_timestamp(&playback.duration_parts());
        ui.label(format!("{} / {}", now, total));
        match playback.estimated_fps() {
            Some(fps) => ui.label(format!("{:.2} fps", fps)),
            None => ui.label(egui::RichText::new("Estimating frame rate...").weak()),
        };
    }

    let frame = match session.frame_key() {
        FrameKey::Still => "still".to_string(),
        key => format!("{:.3}s", key.seconds().unwrap_or_default()),
    };
    ui.label(egui::RichText::new(format!("Frame: {}", frame)).weak());

    ui.separator();

    let rectangles = session.rectangles_for_current_frame();
    if rectangles.is_empty() {
        ui.label(egui::RichText::new("Nothing drawn on this frame").weak());
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, rect) in rectangles.iter().enumerate() {
            let [r, g, b] = rect.color();
            let name = rect.name.as_deref().unwrap_or("(unnamed)");
            let mut text = egui::RichText::new(format!("{}. {}", index + 1, name))
                .color(egui::Color32::from_rgb(r, g, b));
            if rect.hovered {
                text = text.strong();
            }
            ui.label(text);

            let bounds = rect.bounds();
            ui.label(
                egui::RichText::new(format!(
                    "  ({:.0}, {:.0}) {:.0}x{:.0}",
                    bounds.left,
                    bounds.top,
                    bounds.width(),
                    bounds.height()
                ))
                .small()
                .weak(),
            );
        }
    });
}
