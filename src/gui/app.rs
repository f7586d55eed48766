//! Dashboard Main Application
//! Main window with control panel and report view.

use crate::charts::{StaticChartRenderer, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::config::DashboardConfig;
use crate::data::{AbsenceTable, DataLoader, LoaderError, SheetSource};
use crate::export::{self, ExportError, ExportKind};
use crate::gui::{ControlPanel, ControlPanelAction, ReportView};
use egui::{RichText, SidePanel};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

/// Spreadsheet loading result from background thread
enum LoadResult {
    Progress(f32, String),
    Complete(AbsenceTable),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    report_view: ReportView,

    // Current load and its filtered view
    table: AbsenceTable,
    filtered: AbsenceTable,
    load_error: Option<String>,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let control_panel = ControlPanel::new(config.window, config.source.sheet_name.clone());
        let mut app = Self {
            config,
            control_panel,
            report_view: ReportView::new(),
            table: AbsenceTable::default(),
            filtered: AbsenceTable::default(),
            load_error: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Fetch the spreadsheet in a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        self.is_loading = true;
        self.load_error = None;
        self.control_panel.set_progress(0.0, "Baixando planilha...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let source = self.config.source.clone();
        let timeout = self.config.http_timeout();

        thread::spawn(move || {
            let result = match Self::run_load(&tx, source, timeout) {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Run fetch + parse + normalize (called from background thread)
    fn run_load(
        tx: &Sender<LoadResult>,
        source: SheetSource,
        timeout: Duration,
    ) -> Result<AbsenceTable, LoaderError> {
        let sheet = source.sheet_name.clone();
        let loader = DataLoader::new(source, timeout)?;

        let _ = tx.send(LoadResult::Progress(
            20.0,
            format!("Baixando \"{}\"...", sheet),
        ));
        loader.load()
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Some(result) = next_load_event(&rx) {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    LoadResult::Complete(table) => {
                        self.control_panel.update_options(&table);
                        self.control_panel.set_progress(
                            100.0,
                            &format!("Carregados {} registros", table.len()),
                        );
                        self.table = table;
                        self.refresh();
                        self.is_loading = false;
                        should_keep_receiver = false;
                        break;
                    }
                    LoadResult::Error(message) => {
                        error!(error = %message, "Failed to load spreadsheet");
                        self.control_panel
                            .set_progress(0.0, &format!("Erro: {}", message));
                        self.load_error = Some(message);
                        self.is_loading = false;
                        should_keep_receiver = false;
                        break;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Re-run the filter and rebuild the report.
    fn refresh(&mut self) {
        let filters = &self.control_panel.filters;
        self.filtered = filters.apply(&self.table);
        debug!(
            rows = self.filtered.len(),
            of = self.table.len(),
            unfiltered = filters.is_empty(),
            "Filters applied"
        );
        self.report_view
            .update(&self.filtered, filters.single_employee());
    }

    /// Serialize the current view and ask where to save it.
    fn handle_export(&mut self, kind: ExportKind) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(kind.filter_name(), &[kind.extension()])
            .set_file_name(kind.default_file_name())
            .save_file()
        else {
            return; // User cancelled
        };

        let result = self
            .export_bytes(kind)
            .and_then(|bytes| export::save_bytes(&path, &bytes));

        match result {
            Ok(()) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.control_panel
                    .set_progress(100.0, &format!("Exportado: {}", name));
            }
            Err(e) => {
                error!(error = %e, ?kind, "Export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Erro ao exportar: {}", e));
            }
        }
    }

    fn export_bytes(&self, kind: ExportKind) -> Result<Vec<u8>, ExportError> {
        match kind {
            ExportKind::Csv => export::to_csv(&self.filtered),
            ExportKind::Xlsx => export::to_xlsx(&self.filtered),
            ExportKind::ReasonChart => StaticChartRenderer::render_histogram_png(
                &self.report_view.reason_counts,
                "Faltas por Motivo",
                DEFAULT_WIDTH,
                DEFAULT_HEIGHT,
            ),
            ExportKind::MonthChart => StaticChartRenderer::render_histogram_png(
                &self.report_view.month_counts,
                "Faltas por Mês",
                DEFAULT_WIDTH,
                DEFAULT_HEIGHT,
            ),
        }
    }
}

/// Next message from the load thread. A thread that went away without sending
/// its result counts as a failed load.
fn next_load_event(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(LoadResult::Error(
            "O carregamento terminou sem resultado".to_string(),
        )),
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::Reload => self.start_load(),
                        ControlPanelAction::FiltersChanged => self.refresh(),
                        ControlPanelAction::ResetWindow => {
                            self.control_panel.reset_window();
                            self.refresh();
                        }
                        ControlPanelAction::Export(kind) => self.handle_export(kind),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Report
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Dashboard de Faltas dos Funcionários - Vigilância em Saúde de Ipojuca");
            ui.add_space(10.0);

            if let Some(message) = &self.load_error {
                let mut retry = false;
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        RichText::new("Não foi possível carregar a planilha")
                            .size(20.0)
                            .strong(),
                    );
                    ui.label(RichText::new(message).color(egui::Color32::from_rgb(220, 53, 69)));
                    ui.add_space(10.0);
                    retry = ui.button("🔄 Tentar novamente").clicked();
                });
                if retry {
                    self.start_load();
                }
            } else if self.is_loading && self.table.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            } else {
                self.report_view.show(ui, &self.filtered);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_load_has_no_event() {
        let (_tx, rx) = channel::<LoadResult>();
        assert!(next_load_event(&rx).is_none());
    }

    #[test]
    fn test_finished_load_is_delivered_before_disconnect() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Complete(AbsenceTable::default())).unwrap();
        drop(tx);

        assert!(matches!(next_load_event(&rx), Some(LoadResult::Complete(_))));
        assert!(matches!(next_load_event(&rx), Some(LoadResult::Error(_))));
    }

    #[test]
    fn test_dead_load_thread_is_an_error() {
        let (tx, rx) = channel::<LoadResult>();
        let worker = thread::spawn(move || {
            let _tx = tx;
            panic!("load thread failed");
        });
        assert!(worker.join().is_err());

        assert!(matches!(next_load_event(&rx), Some(LoadResult::Error(_))));
    }
}
