use std::path::PathBuf;

use egui::{Align, KeyboardShortcut};
use egui_extras::{Column, TableBuilder};
use tracing::{info, warn};

use self::{
    data::Data,
    data_display_options::DataDisplayOptions,
    date_range::DateRangeInput,
    loading::{load_in_background, LoadedFile, LoadingStatus},
    shortcut::Shortcuts,
};

mod data;
mod data_display_options;
mod date_range;
mod loading;
mod shortcut;

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct HttpLogViewerApp {
    data_display_options: DataDisplayOptions,
    path_input: String,
    start_open_path: Option<PathBuf>,
    last_path: Option<PathBuf>,
    date_range: DateRangeInput,
    show_last_filename: bool,
    track_item_align: Option<Align>,
    shortcuts: Shortcuts,

    #[serde(skip)]
    data: Option<Data>,
    #[serde(skip)]
    date_range_error: Option<String>,
    #[serde(skip)]
    should_scroll: bool,
    #[serde(skip)]
    loading_status: LoadingStatus,
}

impl Default for HttpLogViewerApp {
    fn default() -> Self {
        Self {
            data_display_options: Default::default(),
            path_input: Default::default(),
            start_open_path: Default::default(),
            last_path: Default::default(),
            date_range: Default::default(),
            show_last_filename: true,
            track_item_align: Default::default(),
            shortcuts: Default::default(),
            data: Default::default(),
            date_range_error: Default::default(),
            should_scroll: Default::default(),
            loading_status: Default::default(),
        }
    }
}

impl HttpLogViewerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous app state (if any).
        if let Some(storage) = cc.storage {
            info!("Storage found");
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_else(|| {
                info!("failed to load saved state");
                Default::default()
            });
        }

        Default::default()
    }

    fn show_log_lines(&mut self, ui: &mut egui::Ui) {
        let text_height = egui::TextStyle::Body
            .resolve(ui.style())
            .size
            .max(ui.spacing().interact_size.y);

        let main_list_fields = self.data_display_options.main_list_fields();
        let mut table_builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::LEFT));

        for _ in main_list_fields.iter().skip(1) {
            table_builder = table_builder.column(Column::auto());
        }
        table_builder = table_builder
            .column(Column::remainder())
            .min_scrolled_height(0.0);

        // Make table clickable
        table_builder = table_builder.sense(egui::Sense::click());

        table_builder = match (self.should_scroll, self.data.as_ref()) {
            (true, Some(data)) => {
                self.should_scroll = false;
                if let Some(selected_row) = data.selected_row {
                    table_builder.scroll_to_row(selected_row, self.track_item_align)
                } else {
                    table_builder
                }
            }
            (true, None) | (false, _) => {
                self.should_scroll = false;
                table_builder
            }
        };

        let table = table_builder.header(text_height, |mut header| {
            for field_name in main_list_fields {
                header.col(|ui| {
                    ui.strong(field_name);
                });
            }
        });

        let Some(data) = self.data.as_mut() else {
            // No data so empty body
            table.body(|_| {});
            return;
        };

        // Value of the emphasis field for the selected record, rows with the same value are shown in bold
        let emphasis_info = self
            .data_display_options
            .emphasize_if_matching_field_idx()
            .and_then(|idx| {
                let field_name = main_list_fields.get(idx)?;
                let value = data.selected_record()?.field_value(field_name)?;
                Some((idx, value))
            });

        table.body(|body| {
            body.rows(text_height, data.len(), |mut row| {
                let row_index = row.index();
                let Some(record) = data.row(row_index) else {
                    return;
                };
                row.set_selected(data.selected_row == Some(row_index));

                for (field_idx, field_name) in main_list_fields.iter().enumerate() {
                    let field_value = record.field_value(field_name).unwrap_or_default();
                    let should_emphasize_field = emphasis_info
                        .as_ref()
                        .is_some_and(|(idx, value)| *idx == field_idx && *value == field_value);
                    row.col(|ui| {
                        if should_emphasize_field {
                            ui.strong(field_value);
                        } else {
                            ui.label(field_value);
                        }
                    });
                }

                // Check for click of a row
                if row.response().clicked() {
                    if Some(row_index) == data.selected_row {
                        data.selected_row = None;
                    } else {
                        data.selected_row = Some(row_index);
                    }
                }
            });
        });
    }

    fn show_log_details(&mut self, ui: &mut egui::Ui) {
        let Some(data) = self.data.as_ref() else {
            ui.label("No data");
            return;
        };

        let Some(record) = data.selected_record() else {
            ui.label("No row Selected");
            return;
        };

        ui.horizontal(|ui| {
            if ui.button("Copy as JSON").clicked() {
                match serde_json::to_string_pretty(record) {
                    Ok(json) => ui.ctx().copy_text(json),
                    Err(e) => warn!(?e, "failed to convert record to JSON"),
                }
            }
            ui.label(record.summary());
        });

        let text_height = egui::TextStyle::Body
            .resolve(ui.style())
            .size
            .max(ui.spacing().interact_size.y);

        let mut table_builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::LEFT))
            .column(Column::auto())
            .column(Column::remainder())
            .min_scrolled_height(0.0);

        // Clicks not needed but adds highlight row
        table_builder = table_builder.sense(egui::Sense::click());

        let table = table_builder.header(text_height, |mut header| {
            header.col(|ui| {
                ui.strong("Field Name");
            });
            header.col(|ui| {
                ui.strong("Field Value");
            });
        });

        let fields = record.to_fields();
        table.body(|body| {
            body.rows(text_height, fields.len(), |mut row| {
                let (title, value) = &fields[row.index()];
                row.col(|ui| {
                    ui.label(*title);
                });
                row.col(|ui| {
                    ui.label(value);
                });
            });
        });
    }

    fn ui_loading(&mut self, ui: &mut egui::Ui) {
        match &self.loading_status {
            LoadingStatus::NotInProgress => {
                self.data_load_ui(ui);
                self.diagnostics_ui(ui);
                ui.separator();
                self.navigation_and_filtering_ui(ui);
            }
            LoadingStatus::InProgress(promise) => {
                if promise.ready().is_some() {
                    let mut temp = LoadingStatus::default();
                    std::mem::swap(&mut temp, &mut self.loading_status);
                    let LoadingStatus::InProgress(owned_promise) = temp else {
                        unreachable!("we are sure of this because we just did a match on this")
                    };
                    self.loading_status = *owned_promise.block_and_take(); // We know the promise is ready at this point
                } else {
                    ui.spinner();
                }
            }
            LoadingStatus::Failed(err_msg) => {
                let msg = format!("Loading failed: {err_msg}");
                if ui.button("Clear Error Status").clicked() {
                    self.loading_status = LoadingStatus::NotInProgress;
                }
                ui.colored_label(ui.visuals().error_fg_color, msg);
            }
            LoadingStatus::Success(_) => {
                let LoadingStatus::Success(loaded) = std::mem::take(&mut self.loading_status)
                else {
                    unreachable!("we are sure of this because we just did a match on this")
                };
                self.accept_loaded(*loaded);
            }
        }
    }

    /// Replaces the displayed data, the date range typed by the user is applied to the new data
    fn accept_loaded(&mut self, loaded: LoadedFile) {
        let LoadedFile { path, collection } = loaded;
        if !collection.diagnostics().is_empty() {
            warn!(
                skipped = collection.diagnostics().len(),
                ?path,
                "some lines could not be parsed"
            );
        }
        let mut data = Data::from(collection);
        if !self.date_range.is_empty() {
            match self.date_range.to_time_range() {
                Ok(range) => data.apply_filter(range),
                Err(e) => self.date_range_error = Some(e.to_string()),
            }
        }
        if let Some(parent) = path.parent() {
            self.start_open_path = Some(parent.to_path_buf());
        }
        self.path_input = path.display().to_string();
        self.last_path = Some(path);
        self.data = Some(data);
    }

    fn initiate_browse(&self, ctx: egui::Context) -> LoadingStatus {
        let start_open_path = self.start_open_path.clone();
        LoadingStatus::InProgress(poll_promise::Promise::spawn_async(async move {
            let mut dialog = rfd::AsyncFileDialog::new()
                .add_filter("Log files", &["log"])
                .add_filter("All files", &["*"]);
            if let Some(path) = start_open_path {
                dialog = dialog.set_directory(path);
            }
            let Some(file) = dialog.pick_file().await else {
                // user canceled loading
                return Box::new(LoadingStatus::NotInProgress);
            };
            let result = load_in_background(file.path().to_path_buf()).await;

            // If not present screen will not refresh until next paint
            ctx.request_repaint();
            Box::new(result)
        }))
    }

    fn initiate_load(ctx: egui::Context, path: PathBuf) -> LoadingStatus {
        LoadingStatus::InProgress(poll_promise::Promise::spawn_async(async move {
            let result = load_in_background(path).await;
            ctx.request_repaint();
            Box::new(result)
        }))
    }

    fn ui_options(&mut self, ui: &mut egui::Ui) {
        ui.collapsing("Options", |ui| {
            ui.checkbox(&mut self.show_last_filename, "Show last filename");
            ui.horizontal(|ui| {
                ui.label("Item align:");
                self.should_scroll |= ui
                    .radio_value(&mut self.track_item_align, Some(Align::Min), "Top")
                    .clicked();
                self.should_scroll |= ui
                    .radio_value(&mut self.track_item_align, Some(Align::Center), "Center")
                    .clicked();
                self.should_scroll |= ui
                    .radio_value(&mut self.track_item_align, Some(Align::Max), "Bottom")
                    .clicked();
                self.should_scroll |= ui
                    .radio_value(&mut self.track_item_align, None, "None (Bring into view)")
                    .clicked();
            });
        });
    }

    fn move_selected_prev(&mut self) {
        if let Some(data) = self.data.as_mut() {
            data.move_selected_to_prev();
            self.should_scroll = true;
        }
    }

    fn move_selected_next(&mut self) {
        if let Some(data) = self.data.as_mut() {
            data.move_selected_to_next();
            self.should_scroll = true;
        }
    }

    fn move_selected_first(&mut self) {
        if let Some(data) = self.data.as_mut() {
            data.move_selected_to_first();
            self.should_scroll = true;
        }
    }

    fn move_selected_last(&mut self) {
        if let Some(data) = self.data.as_mut() {
            data.move_selected_to_last();
            self.should_scroll = true;
        }
    }

    fn ui_help(&mut self, ui: &mut egui::Ui) {
        ui.collapsing("Help", |ui| {
            ui.label("Expected input: one tab separated HTTP connection record per line.");
            ui.label(
                "Dates are UTC. A date without a time covers the whole day, \
                 for example To: 2024-01-31 includes everything up to 23:59:59 on that day.",
            );
            ui.label("Text is selectable just hover over it for a short time if you want to copy");
        });
    }

    fn navigation_and_filtering_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            self.navigation_ui(ui);
            ui.separator();
            self.filtering_ui(ui);
        });
    }

    fn filtering_ui(&mut self, ui: &mut egui::Ui) {
        let Some(data) = self.data.as_mut() else {
            return;
        };

        ui.label("From:");
        let start_edit = ui.add(
            egui::TextEdit::singleline(&mut self.date_range.start)
                .hint_text("YYYY-MM-DD")
                .desired_width(140.0),
        );
        ui.label("To:");
        let end_edit = ui.add(
            egui::TextEdit::singleline(&mut self.date_range.end)
                .hint_text("YYYY-MM-DD")
                .desired_width(140.0),
        );
        let mut should_apply_filter = (start_edit.lost_focus() || end_edit.lost_focus())
            && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if shortcut_button(ui, "Apply", "Filter by timestamp", &self.shortcuts.apply_filter) {
            should_apply_filter = true;
        }
        if data.is_filtered()
            && shortcut_button(ui, "Unfilter", "Clears Filter", &self.shortcuts.unfilter)
        {
            data.unfilter();
            self.date_range.clear();
            self.date_range_error = None;
            self.should_scroll = true;
        }

        if should_apply_filter {
            match self.date_range.to_time_range() {
                Ok(range) => {
                    info!(%range, "applying filter");
                    data.apply_filter(range);
                    self.date_range_error = None;
                    self.should_scroll = true;
                }
                Err(e) => self.date_range_error = Some(e.to_string()),
            }
        }

        if let Some(range) = data.applied_range() {
            ui.label(format!("Showing {range}"));
        }
        if let Some(err_msg) = self.date_range_error.as_ref() {
            ui.colored_label(ui.visuals().error_fg_color, err_msg);
        }
    }

    fn navigation_ui(&mut self, ui: &mut egui::Ui) {
        let (has_prev, has_next) = self
            .data
            .as_ref()
            .map_or((false, false), |data| (data.has_prev(), data.has_next()));

        ui.label("Nav:");
        if shortcut_button(ui, "⏪", "First", &self.shortcuts.first) {
            self.move_selected_first();
        }
        if ui
            .add_enabled_ui(has_prev, |ui| {
                shortcut_button(ui, "⬆", "Previous", &self.shortcuts.prev)
            })
            .inner
        {
            self.move_selected_prev();
        }
        if ui
            .add_enabled_ui(has_next, |ui| {
                shortcut_button(ui, "⬇", "Next", &self.shortcuts.next)
            })
            .inner
        {
            self.move_selected_next();
        }
        if shortcut_button(ui, "⏩", "Last", &self.shortcuts.last) {
            self.move_selected_last();
        }
    }

    fn data_load_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Path:");
            let path_edit = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("path to .log file")
                    .desired_width(300.0),
            );
            let enter_pressed =
                path_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Load").clicked() || enter_pressed {
                let path = self.path_input.trim();
                self.loading_status = if path.is_empty() {
                    LoadingStatus::Failed("no path entered".into())
                } else {
                    Self::initiate_load(ui.ctx().clone(), PathBuf::from(path))
                };
            }
            if shortcut_button(ui, "📂 Browse...", "", &self.shortcuts.open) {
                self.loading_status = self.initiate_browse(ui.ctx().clone());
            }
            if let Some(path) = self.last_path.clone() {
                if shortcut_button(ui, "Reload", "", &self.shortcuts.reload) {
                    self.loading_status = Self::initiate_load(ui.ctx().clone(), path);
                }
            }
            if ui.button("Clear Data").clicked() {
                self.data = None;
            }

            if self.show_last_filename {
                if let Some(filename) = self.last_path.as_ref().and_then(|x| x.file_name()) {
                    ui.label(format!("Filename: {}", filename.to_string_lossy()));
                }
            }
            if let Some(data) = self.data.as_ref() {
                let row_count_text = match (data.is_filtered(), data.len(), data.total_len_unfiltered()) {
                    (true, filtered_len, total_len) => format!(
                        "{} of {}",
                        with_separators(filtered_len),
                        with_separators(total_len)
                    ),
                    (false, _, total_len) => with_separators(total_len),
                };
                ui.label(format!("# Rows: {row_count_text}"));
            }
        });
    }

    fn diagnostics_ui(&self, ui: &mut egui::Ui) {
        let Some(diagnostics) = self.data.as_ref().map(|x| x.collection().diagnostics()) else {
            return;
        };
        if diagnostics.is_empty() {
            return;
        }
        ui.collapsing(
            format!("Skipped lines: {}", with_separators(diagnostics.len())),
            |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("diagnostics")
                    .max_height(150.0)
                    .show(ui, |ui| {
                        for diagnostic in diagnostics {
                            ui.label(diagnostic);
                        }
                    });
            },
        );
    }
}

impl eframe::App for HttpLogViewerApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        info!("Saving state");
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        #[cfg(feature = "profiling")]
        profiling::finish_frame!();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.add_space(16.0);

                egui::widgets::global_theme_preference_buttons(ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("HTTP Log Viewer");
            ui.separator();
            self.ui_loading(ui);
            ui.separator();
            self.ui_options(ui);
            ui.separator();
            self.ui_help(ui);
            ui.separator();

            const MIN_LOG_LINES_SIZE: f32 = 100.0;
            let max_details_height = ui.available_height() - MIN_LOG_LINES_SIZE;

            egui::TopBottomPanel::bottom("details_panel")
                .resizable(true)
                .default_height(250.)
                .max_height(max_details_height)
                .min_height(60.)
                .show_inside(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Details");
                    });
                    egui::ScrollArea::horizontal()
                        .id_salt("details area")
                        .show(ui, |ui| {
                            ui.push_id("table details", |ui| self.show_log_details(ui));
                        });
                    if ui.available_height() > 0.0 {
                        ui.allocate_space(ui.available_size());
                    }
                });

            egui::CentralPanel::default().show_inside(ui, |ui| {
                egui::ScrollArea::horizontal()
                    .id_salt("log lines")
                    .show(ui, |ui| {
                        ui.push_id("table log lines", |ui| self.show_log_lines(ui));
                    });
            });
        });
    }
}

/// Returns true if the button is clicked or the shortcut is pressed
///
/// Note: This makes it the case that the code for both the button and the shortcut press will do the same thing and you cannot use the shortcut to bypass the button not showing
fn shortcut_button(
    ui: &mut egui::Ui,
    caption: impl Into<egui::WidgetText>,
    hint_msg: &str,
    shortcut: &KeyboardShortcut,
) -> bool {
    ui.button(caption)
        .on_hover_text(shortcut_hint_text(ui, hint_msg, shortcut))
        .clicked()
        || (ui.is_enabled() && ui.input_mut(|i| i.consume_shortcut(shortcut)))
}

fn shortcut_hint_text(ui: &mut egui::Ui, hint_msg: &str, shortcut: &KeyboardShortcut) -> String {
    let space = if hint_msg.is_empty() { "" } else { " " };
    format!("{hint_msg}{space}({})", ui.ctx().format_shortcut(shortcut))
}

fn with_separators(value: usize) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1_000, "1,000")]
    #[case(123_456, "123,456")]
    #[case(1_234_567, "1,234,567")]
    fn separators(#[case] value: usize, #[case] expected: &str) {
        assert_eq!(with_separators(value), expected);
    }

    #[test]
    fn saved_state_skips_loaded_data() {
        let mut app = HttpLogViewerApp::default();
        app.path_input = "/var/log/http.log".into();
        app.date_range.start = "2024-01-01".into();
        app.data = Some(Data::default());

        let as_string = ron::to_string(&app).unwrap();
        let restored: HttpLogViewerApp = ron::from_str(&as_string).unwrap();

        assert_eq!(restored.path_input, app.path_input);
        assert_eq!(restored.date_range, app.date_range);
        assert_eq!(restored.data_display_options, app.data_display_options);
        assert!(restored.data.is_none());
    }
}
