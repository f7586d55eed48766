//! Report View Widget
//! Central scrollable panel: headline metrics, the two histograms, the detail
//! table and, when one employee is selected, that employee's absence history.

use crate::charts::ChartPlotter;
use crate::data::{AbsenceTable, ALL_COLUMNS};
use crate::stats::{EmployeeTimeline, GroupedCounts, Summary};
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;
const TABLE_HEIGHT: f32 = 420.0;
const METRIC_COLOR: Color32 = Color32::from_rgb(100, 149, 237);

/// Derived view of the filtered records, rebuilt on every filter change.
#[derive(Default)]
pub struct ReportView {
    pub summary: Summary,
    pub reason_counts: GroupedCounts,
    pub month_counts: GroupedCounts,
    pub timeline: Option<EmployeeTimeline>,
}

impl ReportView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute metrics and chart data for a new filtered view.
    pub fn update(&mut self, filtered: &AbsenceTable, single_employee: Option<&str>) {
        self.summary = Summary::from_table(filtered);
        self.reason_counts = GroupedCounts::by_reason_and_sector(filtered);
        self.month_counts = GroupedCounts::by_month_and_sector(filtered);
        self.timeline = single_employee.map(|name| EmployeeTimeline::for_employee(filtered, name));
    }

    pub fn show(&self, ui: &mut egui::Ui, filtered: &AbsenceTable) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                // ===== Overview =====
                ui.label(RichText::new("📈 Visão Geral").size(18.0).strong());
                ui.add_space(8.0);
                ui.columns(3, |cols| {
                    Self::metric_card(&mut cols[0], "Total de Faltas", self.summary.total);
                    Self::metric_card(&mut cols[1], "Funcionários", self.summary.employees);
                    Self::metric_card(&mut cols[2], "Setores", self.summary.sectors);
                });
                ui.add_space(SECTION_SPACING);

                // ===== Charts =====
                ui.label(RichText::new("📊 Distribuição de Faltas").size(18.0).strong());
                ui.add_space(8.0);
                ui.columns(2, |cols| {
                    Self::chart_card(
                        &mut cols[0],
                        "Faltas por Motivo",
                        "reason_hist",
                        &self.reason_counts,
                    );
                    Self::chart_card(
                        &mut cols[1],
                        "Faltas por Mês",
                        "month_hist",
                        &self.month_counts,
                    );
                });
                ui.add_space(SECTION_SPACING);

                // ===== Employee history =====
                if let Some(timeline) = &self.timeline {
                    Self::draw_timeline(ui, timeline);
                    ui.add_space(SECTION_SPACING);
                }

                // ===== Detail table =====
                ui.label(RichText::new("📋 Tabela Detalhada").size(18.0).strong());
                ui.add_space(8.0);
                Self::draw_table(ui, filtered);
            });
    }

    fn metric_card(ui: &mut egui::Ui, label: &str, value: usize) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                ui.label(
                    RichText::new(value.to_string())
                        .size(28.0)
                        .strong()
                        .color(METRIC_COLOR),
                );
            });
    }

    fn chart_card(ui: &mut egui::Ui, title: &str, id: &str, counts: &GroupedCounts) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("{} ({})", title, counts.total()))
                        .size(14.0)
                        .strong(),
                );
                ui.add_space(5.0);
                if counts.is_empty() {
                    ui.label(RichText::new("Sem dados").color(Color32::GRAY));
                } else {
                    ChartPlotter::draw_stacked_histogram(ui, id, counts);
                }
            });
    }

    fn draw_timeline(ui: &mut egui::Ui, timeline: &EmployeeTimeline) {
        ui.label(
            RichText::new(format!("🧾 Histórico de {}", timeline.employee))
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("employee_timeline")
                    .striped(true)
                    .min_col_width(90.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Data").strong());
                        ui.label(RichText::new("Motivo").strong());
                        ui.label(RichText::new("Observações").strong());
                        ui.end_row();

                        for entry in &timeline.entries {
                            let date = entry
                                .date
                                .map(|d| d.format("%d/%m/%Y").to_string())
                                .unwrap_or_else(|| "-".to_string());
                            ui.label(date);
                            ui.label(&entry.reason);
                            ui.label(&entry.note);
                            ui.end_row();
                        }
                    });
            });
    }

    fn draw_table(ui: &mut egui::Ui, filtered: &AbsenceTable) {
        if filtered.is_empty() {
            ui.label(
                RichText::new("Nenhum registro para os filtros selecionados").color(Color32::GRAY),
            );
            return;
        }

        ScrollArea::both()
            .id_salt("detail_table")
            .max_height(TABLE_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                egui::Grid::new("detail_table_grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for name in ALL_COLUMNS {
                            ui.label(RichText::new(name).strong().size(12.0));
                        }
                        ui.end_row();

                        for record in filtered {
                            for name in ALL_COLUMNS {
                                ui.label(RichText::new(record.cell(name)).size(12.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
