use crate::api::{ApiBridge, ApiClient, ApiEvent};
use crate::config::{AppConfig, Category, Theme, APP_NAME, APP_VERSION};
use crate::prompt::{self, PromptStats};
use crate::scanner;
use crate::segment::SegmentStore;
use eframe::egui;
use num_format::{Locale, ToFormattedString};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Login,
    Files,
    Prompt,
    Result,
    Docs,
}

const NAV: [(&str, Page); 5] = [
    ("Login", Page::Login),
    ("Files", Page::Files),
    ("Prompt", Page::Prompt),
    ("Result", Page::Result),
    ("Docs", Page::Docs),
];

pub struct CodexApp {
    config: AppConfig,
    theme: Theme,
    page: Page,

    api: Option<ApiClient>,
    bridge: ApiBridge,
    connecting: bool,
    sending: bool,

    store: SegmentStore,
    project_root: Option<PathBuf>,
    tree_text: String,
    selected_category: Category,

    api_key_input: String,
    instructions: String,
    prompt_preview: String,
    prompt_stats: Option<PromptStats>,
    result_text: String,

    status: String,
    notification: Option<(String, Instant)>,
    show_review: bool,
}

impl CodexApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            theme: Theme::default(),
            page: Page::Login,
            api: None,
            bridge: ApiBridge::default(),
            connecting: false,
            sending: false,
            store: SegmentStore::default(),
            project_root: None,
            tree_text: String::new(),
            selected_category: Category::Backend,
            api_key_input: String::new(),
            instructions: String::new(),
            prompt_preview: String::new(),
            prompt_stats: None,
            result_text: String::new(),
            status: "Ready".to_string(),
            notification: None,
            show_review: false,
        }
    }

    /// Scans `folder` and makes it the current project.
    pub fn open_project(&mut self, folder: PathBuf) {
        match scanner::scan_tree(&folder, &self.config) {
            Ok(report) => {
                let name = folder
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| folder.display().to_string());
                info!(
                    "loaded project {:?}: {} files, {} dirs",
                    folder, report.files, report.dirs
                );
                self.tree_text = report.tree;
                self.project_root = Some(folder);
                self.status = format!("Project loaded: {}", name);
            }
            Err(e) => {
                warn!("scan failed: {e}");
                error_dialog("Error", &format!("Failed to scan the folder:\n{e}"));
                self.status = format!("Scan failed: {e}");
            }
        }
    }

    fn refresh_project(&mut self) {
        if let Some(folder) = self.project_root.clone() {
            self.open_project(folder);
        }
    }

    fn handle_connect(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if key.is_empty() {
            error_dialog("Error", "Please enter your API key");
            return;
        }
        self.connecting = true;
        self.status = "Connecting to Claude API...".to_string();
        let config = self.config.clone();
        let tx = self.bridge.tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(ApiEvent::Connected(ApiClient::connect(&config, &key)));
        });
    }

    fn generate_preview(&mut self) -> bool {
        if self.store.is_empty() {
            warning_dialog("Warning", "Add files to categories first");
            return false;
        }
        let prompt = prompt::build_prompt(&self.instructions, self.store.segments());
        let stats = prompt::prompt_stats(&prompt);
        self.status = format!(
            "Preview generated: {} chars, ~{} tokens",
            stats.characters.to_formatted_string(&Locale::en),
            stats.estimated_tokens.to_formatted_string(&Locale::en)
        );
        self.prompt_preview = prompt;
        self.prompt_stats = Some(stats);
        true
    }

    fn handle_send(&mut self) {
        if self.api.is_none() {
            error_dialog("Error", "Log in first!");
            return;
        }
        if self.store.is_empty() {
            warning_dialog("Warning", "Add code first");
            return;
        }
        if self.prompt_preview.is_empty() && !self.generate_preview() {
            return;
        }
        let Some(client) = self.api.clone() else {
            return;
        };
        let prompt = self.prompt_preview.clone();
        self.sending = true;
        self.status = "Sending to Claude...".to_string();
        self.page = Page::Result;
        let tx = self.bridge.tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(ApiEvent::Completion(client.send(&prompt)));
        });
    }

    fn run_doc_tool(&mut self, instructions: &str) {
        if self.api.is_none() {
            error_dialog("Error", "Log in first!");
            return;
        }
        if self.store.is_empty() {
            warning_dialog("Warning", "Add code first");
            return;
        }
        self.instructions = instructions.to_string();
        self.page = Page::Prompt;
        self.generate_preview();
    }

    fn handle_add_files(&mut self) {
        let Some(root) = self.project_root.clone() else {
            warning_dialog("Warning", "Open a repository first");
            return;
        };
        let Some(paths) = rfd::FileDialog::new().set_directory(&root).pick_files() else {
            return;
        };
        let (added, errors) = self.store.add_files(&paths, self.selected_category);
        for e in &errors {
            warn!("{e}");
        }
        if let Some(first) = errors.first() {
            error_dialog("Error", &format!("Some files could not be read:\n{first}"));
        }
        self.status = format!("{} file(s) added. Total: {}", added, self.store.len());
    }

    fn handle_remove_category(&mut self) {
        let removed = self.store.remove_category(self.selected_category);
        self.status = format!("{} file(s) removed. Total: {}", removed, self.store.len());
    }

    fn copy_text(&mut self, ctx: &egui::Context, text: String, note: &str) {
        ctx.copy_text(text);
        self.status = note.to_string();
        self.notification = Some((note.to_string(), Instant::now()));
    }

    fn save_text(&mut self, default_name: &str, text: &str) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Markdown", &["md"])
            .add_filter("Text", &["txt"])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, text) {
            Ok(()) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.status = format!("Saved: {}", name);
            }
            Err(e) => {
                warn!("failed to save {:?}: {e}", path);
                error_dialog("Error", &format!("Failed to save:\n{e}"));
            }
        }
    }

    /// Marshals finished background calls onto the UI state.
    fn drain_events(&mut self) {
        while let Ok(event) = self.bridge.rx.try_recv() {
            match event {
                ApiEvent::Connected(Ok(client)) => {
                    self.connecting = false;
                    self.status = "Connected to Claude API".to_string();
                    self.api = Some(client);
                    self.page = Page::Files;
                }
                ApiEvent::Connected(Err(e)) => {
                    self.connecting = false;
                    warn!("connection failed: {e}");
                    self.status = format!("Connection error: {e}");
                    error_dialog("Connection Error", &format!("Failed to connect:\n{e}"));
                }
                ApiEvent::Completion(Ok(completion)) => {
                    self.sending = false;
                    self.status = format!(
                        "Response received ({} tokens)",
                        completion.tokens_used.to_formatted_string(&Locale::en)
                    );
                    self.result_text = completion.text;
                }
                ApiEvent::Completion(Err(e)) => {
                    self.sending = false;
                    warn!("send failed: {e}");
                    self.status = format!("Error: {e}");
                    error_dialog("Error", &format!("Error talking to Claude:\n{e}"));
                }
            }
        }
    }

    fn sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(220.0)
            .show(ctx, |ui| {
                ui.add_space(12.0);
                ui.vertical_centered(|ui| {
                    ui.heading(APP_NAME);
                    ui.label(
                        egui::RichText::new(format!("v{}", APP_VERSION))
                            .small()
                            .color(self.theme.accent),
                    );
                });
                ui.separator();

                for (label, page) in NAV {
                    if ui.selectable_label(self.page == page, label).clicked() {
                        self.page = page;
                    }
                }

                ui.separator();
                let (badge, color) = if self.api.is_some() {
                    ("● Connected", self.theme.success)
                } else if self.connecting {
                    ("● Connecting...", self.theme.warning)
                } else {
                    ("● Disconnected", self.theme.text_muted)
                };
                ui.label(egui::RichText::new(badge).color(color));
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(&self.status)
                        .small()
                        .color(self.theme.text_muted),
                );
            });
    }

    fn bottom_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.set_height(24.0);
                if let Some(stats) = &self.prompt_stats {
                    ui.label(format!(
                        "Prompt: {} chars, {} words, ~{} tokens",
                        stats.characters.to_formatted_string(&Locale::en),
                        stats.words.to_formatted_string(&Locale::en),
                        stats.estimated_tokens.to_formatted_string(&Locale::en)
                    ));
                    ui.separator();
                }
                ui.label(format!(
                    "{} segment(s), {} selected",
                    self.store.len(),
                    self.store.selected_count()
                ));

                const NOTIFICATION_DURATION: f32 = 3.0;
                if let Some((message, start)) = &self.notification {
                    let elapsed = start.elapsed().as_secs_f32();
                    if elapsed < NOTIFICATION_DURATION {
                        let alpha = 1.0 - elapsed / NOTIFICATION_DURATION;
                        ui.separator();
                        ui.label(egui::RichText::new(message).color(
                            egui::Color32::from_rgba_unmultiplied(
                                255,
                                255,
                                255,
                                (alpha * 255.0) as u8,
                            ),
                        ));
                        ctx.request_repaint();
                    } else {
                        self.notification = None;
                    }
                }
            });
        });
    }

    fn login_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Login");
        ui.add_space(8.0);
        ui.label("Anthropic API key:");
        ui.add(
            egui::TextEdit::singleline(&mut self.api_key_input)
                .password(true)
                .desired_width(400.0),
        );
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.connecting, egui::Button::new("Connect"))
                .clicked()
            {
                self.handle_connect();
            }
            if ui
                .add_enabled(!self.connecting, egui::Button::new("Test Connection"))
                .clicked()
            {
                if self.api_key_input.trim().is_empty() {
                    warning_dialog("Warning", "Enter an API key first");
                } else {
                    self.handle_connect();
                }
            }
            if self.connecting {
                ui.spinner();
                ui.label("Connecting...");
            }
        });
        if let Some(client) = &self.api {
            ui.separator();
            ui.label(
                egui::RichText::new(format!("Connected, model {}", client.model()))
                    .color(self.theme.success),
            );
            if ui.button("Log out").clicked() {
                self.api = None;
                self.status = "Disconnected".to_string();
            }
        }
    }

    fn files_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Files");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Open Repository").clicked() {
                if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                    self.open_project(folder);
                }
            }
            if ui.button("Refresh").clicked() {
                self.refresh_project();
            }
            if let Some(root) = &self.project_root {
                ui.label(
                    egui::RichText::new(root.display().to_string()).color(self.theme.text_muted),
                );
            }
        });
        ui.separator();

        ui.columns(2, |cols| {
            let left = &mut cols[0];
            left.label("Project tree:");
            egui::ScrollArea::vertical()
                .id_salt("project_tree_scroll")
                .show(left, |ui| {
                    ui.label(egui::RichText::new(&self.tree_text).monospace());
                });

            let right = &mut cols[1];
            right.horizontal(|ui| {
                ui.label("Category:");
                egui::ComboBox::from_id_salt("category_combo")
                    .selected_text(self.selected_category.display_name())
                    .show_ui(ui, |ui| {
                        for category in Category::ALL {
                            ui.selectable_value(
                                &mut self.selected_category,
                                category,
                                category.display_name(),
                            );
                        }
                    });
                if ui.button("Add Files").clicked() {
                    self.handle_add_files();
                }
                if ui.button("Remove Category").clicked() {
                    self.handle_remove_category();
                }
            });
            right.separator();
            egui::ScrollArea::vertical()
                .id_salt("segments_scroll")
                .show(right, |ui| {
                    for category in self.store.categories() {
                        let count = self.store.count_in(category);
                        egui::CollapsingHeader::new(format!(
                            "{} ({})",
                            category.display_name(),
                            count
                        ))
                        .default_open(true)
                        .show(ui, |ui| {
                            for segment in self
                                .store
                                .segments_mut()
                                .iter_mut()
                                .filter(|s| s.category == category)
                            {
                                let label = format!(
                                    "{} ({} tokens)",
                                    segment.file_name(),
                                    segment.token_count.to_formatted_string(&Locale::en)
                                );
                                ui.checkbox(&mut segment.selected, label);
                            }
                        });
                    }
                });
        });
    }

    fn prompt_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Prompt");
        ui.add_space(8.0);
        ui.label("User instructions:");
        egui::ScrollArea::vertical()
            .max_height(180.0)
            .id_salt("instructions_scroll")
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.instructions)
                        .lock_focus(true)
                        .desired_width(f32::INFINITY)
                        .desired_rows(6),
                );
            });
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Generate Preview").clicked() {
                self.generate_preview();
            }
            if ui.button("Copy").clicked() {
                if self.prompt_preview.is_empty() {
                    warning_dialog("Warning", "Generate a preview first");
                } else {
                    let text = self.prompt_preview.clone();
                    let ctx = ui.ctx().clone();
                    self.copy_text(&ctx, text, "Prompt copied to clipboard");
                }
            }
            if ui.button("Save").clicked() {
                if self.prompt_preview.is_empty() {
                    warning_dialog("Warning", "Generate a preview first");
                } else {
                    let text = self.prompt_preview.clone();
                    self.save_text("prompt.md", &text);
                }
            }
            if ui.button("Clear").clicked() {
                self.instructions.clear();
                self.prompt_preview.clear();
                self.prompt_stats = None;
                self.status = "Prompt cleared".to_string();
            }
            if ui
                .add_enabled(!self.sending, egui::Button::new("Send to Claude"))
                .clicked()
            {
                self.handle_send();
            }
            if self.sending {
                ui.spinner();
            }
        });
        ui.separator();
        ui.label("Preview:");
        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.prompt_preview)
                        .desired_width(f32::INFINITY)
                        .desired_rows(16)
                        .font(egui::TextStyle::Monospace),
                );
            });
    }

    fn result_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Result");
        ui.add_space(8.0);
        if self.sending {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for Claude...");
            });
        }
        ui.horizontal(|ui| {
            if ui.button("Copy").clicked() {
                if !self.result_text.is_empty() {
                    let text = self.result_text.clone();
                    let ctx = ui.ctx().clone();
                    self.copy_text(&ctx, text, "Result copied to clipboard");
                }
            }
            if ui.button("Save").clicked() {
                if self.result_text.trim().is_empty() {
                    warning_dialog("Warning", "No result to save");
                } else {
                    let text = self.result_text.clone();
                    self.save_text("result.md", &text);
                }
            }
            if ui.button("Apply Changes").clicked()
                && confirm_dialog(
                    "Apply Changes",
                    "This opens a review of the suggested changes.\n\nFor safety, \
                     review every suggestion manually.\n\nContinue?",
                )
            {
                self.show_review = true;
            }
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .id_salt("result_scroll")
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.result_text)
                        .desired_width(f32::INFINITY)
                        .desired_rows(20)
                        .font(egui::TextStyle::Monospace),
                );
            });
    }

    fn docs_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Documentation Tools");
        ui.add_space(8.0);
        ui.label("One-click prompts built from the loaded code:");
        ui.add_space(8.0);
        if ui.button("Generate Docstrings").clicked() {
            self.run_doc_tool(prompt::DOCSTRING_INSTRUCTIONS);
        }
        if ui.button("Generate README").clicked() {
            self.run_doc_tool(prompt::README_INSTRUCTIONS);
        }
        if ui.button("Generate API Docs").clicked() {
            self.run_doc_tool(prompt::API_DOCS_INSTRUCTIONS);
        }
        if ui.button("Analyze Code").clicked() {
            self.run_doc_tool(prompt::ANALYSIS_INSTRUCTIONS);
        }
    }

    fn review_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_review;
        egui::Window::new("Review Suggested Changes")
            .open(&mut open)
            .default_size([700.0, 500.0])
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("Review carefully before applying anything!")
                        .color(self.theme.warning),
                );
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("review_scroll")
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&self.result_text).monospace());
                    });
            });
        self.show_review = open;
    }
}

impl eframe::App for CodexApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        self.sidebar(ctx);
        self.bottom_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Login => self.login_page(ui),
            Page::Files => self.files_page(ui),
            Page::Prompt => self.prompt_page(ui),
            Page::Result => self.result_page(ui),
            Page::Docs => self.docs_page(ui),
        });

        if self.show_review {
            self.review_window(ctx);
        }
        // Keep frames coming while a background call is in flight so its
        // result is picked up promptly.
        if self.connecting || self.sending {
            ctx.request_repaint();
        }
    }
}

fn error_dialog(title: &str, description: &str) {
    rfd::MessageDialog::new()
        .set_title(title)
        .set_description(description)
        .set_level(rfd::MessageLevel::Error)
        .show();
}

fn warning_dialog(title: &str, description: &str) {
    rfd::MessageDialog::new()
        .set_title(title)
        .set_description(description)
        .set_level(rfd::MessageLevel::Warning)
        .show();
}

fn confirm_dialog(title: &str, description: &str) -> bool {
    rfd::MessageDialog::new()
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
}
