use eframe::egui;

const GUTTER_BG: egui::Color32 = egui::Color32::from_rgb(30, 30, 30);
const GUTTER_FG: egui::Color32 = egui::Color32::from_rgb(133, 133, 133);
const EDITOR_BG: egui::Color32 = egui::Color32::from_rgb(20, 20, 20);

/// Syntect language token for the snippets we edit and display.
const LANGUAGE: &str = "py";

pub fn line_count(code: &str) -> usize {
    code.split('\n').count().max(1)
}

/// Number of digit columns reserved in the gutter.
pub fn gutter_digits(code: &str) -> usize {
    line_count(code).to_string().len().max(2)
}

/// Editable, highlighted, line-numbered code area. Returns the `TextEdit`
/// response so the caller can react to `changed()`.
pub fn code_editor(ui: &mut egui::Ui, id_source: &str, code: &mut String) -> egui::Response {
    show(ui, id_source, code, true)
}

/// Read-only variant used for the corrected listing.
pub fn code_view(ui: &mut egui::Ui, id_source: &str, code: &str) {
    let mut text = code;
    show(ui, id_source, &mut text, false);
}

fn show<T: egui::TextBuffer>(
    ui: &mut egui::Ui,
    id_source: &str,
    code: &mut T,
    editable: bool,
) -> egui::Response {
    let theme = egui_extras::syntax_highlighting::CodeTheme::from_memory(ui.ctx());
    let mut layouter = |ui: &egui::Ui, string: &str, _wrap_width: f32| {
        let mut layout_job =
            egui_extras::syntax_highlighting::highlight(ui.ctx(), &theme, string, LANGUAGE);
        layout_job.wrap.max_width = f32::INFINITY; // keep rows aligned with the gutter
        ui.fonts(|f| f.layout_job(layout_job))
    };

    let font_id = egui::TextStyle::Monospace.resolve(ui.style());
    let row_height = ui.fonts(|f| f.row_height(&font_id));
    let available_height = ui.available_height();

    let frame_rect = ui.available_rect_before_wrap();
    ui.painter().rect_filled(frame_rect, 4.0, EDITOR_BG);

    egui::ScrollArea::both()
        .id_source(id_source)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_top(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;

                let text = code.as_str();
                let num_lines = line_count(text);
                let digits = gutter_digits(text);
                let gutter_width =
                    digits as f32 * ui.fonts(|f| f.glyph_width(&font_id, '0')) + 24.0;
                let content_height = (num_lines as f32 * row_height).max(available_height);

                let (gutter_rect, _) = ui.allocate_exact_size(
                    egui::vec2(gutter_width, content_height),
                    egui::Sense::hover(),
                );
                ui.painter().rect_filled(gutter_rect, 0.0, GUTTER_BG);

                for i in 1..=num_lines {
                    let y = gutter_rect.top() + (i - 1) as f32 * row_height;
                    if y > ui.clip_rect().bottom() {
                        break;
                    }
                    if y + row_height < ui.clip_rect().top() {
                        continue;
                    }
                    let galley = ui.fonts(|f| {
                        f.layout(i.to_string(), font_id.clone(), GUTTER_FG, gutter_width - 8.0)
                    });
                    let x = gutter_rect.right() - 12.0 - galley.rect.width();
                    ui.painter()
                        .galley(egui::pos2(x, y), galley, egui::Color32::PLACEHOLDER);
                }

                ui.add_space(6.0);

                let available_size = ui.available_size();
                let (text_rect, _) = ui.allocate_exact_size(
                    egui::vec2(available_size.x, content_height),
                    egui::Sense::click(),
                );

                let mut output = None;
                ui.allocate_ui_at_rect(text_rect, |ui| {
                    let edit = egui::TextEdit::multiline(code)
                        .id_source(id_source)
                        .font(egui::TextStyle::Monospace)
                        .code_editor()
                        .frame(false)
                        .interactive(editable)
                        .desired_width(f32::INFINITY)
                        .margin(egui::vec2(0.0, 0.0))
                        .lock_focus(true)
                        .layouter(&mut layouter);
                    output = Some(edit.show(ui));
                });

                let output = output?;
                // Clicking the empty space below the last line focuses the editor.
                if editable
                    && ui.rect_contains_pointer(text_rect)
                    && ui.input(|i| i.pointer.primary_clicked())
                {
                    output.response.request_focus();
                }
                Some(output.response)
            })
            .inner
        })
        .inner
        .unwrap_or_else(|| ui.label(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_counts_trailing_newline_row() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("x = 1"), 1);
        assert_eq!(line_count("x = 1\ny = 2"), 2);
        assert_eq!(line_count("x = 1\n"), 2);
    }

    #[test]
    fn gutter_reserves_at_least_two_digits() {
        assert_eq!(gutter_digits("x"), 2);
        let long = "pass\n".repeat(150);
        assert_eq!(gutter_digits(&long), 3);
    }

    #[test]
    fn highlighting_python_does_not_panic() {
        let ctx = egui::Context::default();
        let theme = egui_extras::syntax_highlighting::CodeTheme::dark();
        let job = egui_extras::syntax_highlighting::highlight(
            &ctx,
            &theme,
            crate::session::SAMPLE_CODE,
            LANGUAGE,
        );
        assert_eq!(job.text, crate::session::SAMPLE_CODE);
    }
}
