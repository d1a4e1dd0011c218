// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar: arm the rectangle tool, reset the view, open media.

use annoview::engine::store::DraftState;

/// Button pressed on the toolbar this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Arm,
    ResetView,
    OpenImage,
}

/// Display the toolbar. `scale` is the current zoom once media is fitted.
pub fn show(ui: &mut egui::Ui, draft: DraftState, scale: Option<f64>) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("📂 Open").clicked() {
            action = ToolbarAction::OpenImage;
        }

        ui.separator();

        let armed = !matches!(draft, DraftState::Idle);
        if ui
            .add_enabled(scale.is_some(), egui::SelectableLabel::new(armed, "▭ Rectangle (R)"))
            .clicked()
        {
            action = ToolbarAction::Arm;
        }

        if ui
            .add_enabled(scale.is_some(), egui::Button::new("⟲ Reset View (Ctrl+1)"))
            .clicked()
        {
            action = ToolbarAction::ResetView;
        }

        ui.separator();

        if let Some(scale) = scale {
            ui.label(format!("{:.0}%", scale * 100.0));
            ui.separator();
        }

        let hint = match draft {
            DraftState::Idle => "Press R to draw a rectangle, hold Space to pan, scroll to zoom",
            DraftState::Armed => "Click to place the first corner",
            DraftState::Drawing { .. } => "Click again to place the opposite corner",
            DraftState::Naming { .. } => "Type a name and press Enter, Escape cancels",
        };

        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
