//! Control Panel Widget
//! Left side panel with data source, filters, period selection and export buttons.

use crate::data::{parse_date_lenient, AbsenceTable};
use crate::export::ExportKind;
use crate::filter::{FilterSet, Period, WindowPolicy, WindowWarning};
use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::collections::BTreeSet;

const DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// How the time predicate is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodMode {
    All,
    Year,
    #[default]
    Range,
}

/// Left side control panel with filter selections and export controls.
pub struct ControlPanel {
    pub filters: FilterSet,
    pub period_mode: PeriodMode,
    pub selected_year: Option<i32>,
    pub window_warning: Option<WindowWarning>,
    pub progress: f32,
    pub status: String,
    pub source_label: String,
    start_text: String,
    end_text: String,
    date_error: Option<String>,
    employees: Vec<String>,
    sectors: Vec<String>,
    reasons: Vec<String>,
    years: Vec<i32>,
    bounds: Option<(NaiveDate, NaiveDate)>,
    policy: WindowPolicy,
    data_ready: bool,
}

impl ControlPanel {
    pub fn new(policy: WindowPolicy, source_label: impl Into<String>) -> Self {
        Self {
            filters: FilterSet::new(),
            period_mode: PeriodMode::default(),
            selected_year: None,
            window_warning: None,
            progress: 0.0,
            status: "Pronto".to_string(),
            source_label: source_label.into(),
            start_text: String::new(),
            end_text: String::new(),
            date_error: None,
            employees: Vec::new(),
            sectors: Vec::new(),
            reasons: Vec::new(),
            years: Vec::new(),
            bounds: None,
            policy,
            data_ready: false,
        }
    }

    /// Refresh the selectable options after a load. Selections that no longer
    /// exist in the data are dropped; the date range resets to the default window.
    pub fn update_options(&mut self, table: &AbsenceTable) {
        self.employees = table.unique_employees();
        self.sectors = table.unique_sectors();
        self.reasons = table.unique_reasons();
        self.years = table.years();
        self.bounds = table.date_bounds();

        Self::retain_known(&mut self.filters.employees, &self.employees);
        Self::retain_known(&mut self.filters.sectors, &self.sectors);
        Self::retain_known(&mut self.filters.reasons, &self.reasons);

        if self.selected_year.map_or(true, |y| !self.years.contains(&y)) {
            self.selected_year = self.years.first().copied();
        }

        self.reset_window();
        self.data_ready = true;
    }

    /// Go back to the default window (last days of data).
    pub fn reset_window(&mut self) {
        if let Some((earliest, latest)) = self.bounds {
            let window = self.policy.default_window(earliest, latest);
            self.start_text = window.start.format(DATE_DISPLAY_FORMAT).to_string();
            self.end_text = window.end.format(DATE_DISPLAY_FORMAT).to_string();
        }
        self.window_warning = None;
        self.apply_period();
    }

    /// Rebuild the period predicate from the current mode and inputs.
    pub fn apply_period(&mut self) {
        self.date_error = None;
        self.filters.period = match self.period_mode {
            PeriodMode::All => Period::All,
            PeriodMode::Year => self.selected_year.map_or(Period::All, Period::Year),
            PeriodMode::Range => match (self.apply_range(), self.filters.period) {
                (Some(period), _) => period,
                (None, previous @ Period::Range { .. }) => previous,
                (None, _) => self.default_range(),
            },
        };
    }

    /// Default window as a range predicate, or no restriction without dated data.
    fn default_range(&self) -> Period {
        self.bounds.map_or(Period::All, |(earliest, latest)| {
            let window = self.policy.default_window(earliest, latest);
            Period::Range {
                start: window.start,
                end: window.end,
            }
        })
    }

    fn apply_range(&mut self) -> Option<Period> {
        let Some(bounds) = self.bounds else {
            return Some(Period::All);
        };

        let start = parse_date_lenient(&self.start_text);
        let end = parse_date_lenient(&self.end_text);
        let (Some(start), Some(end)) = (start, end) else {
            self.date_error = Some("Data inválida, use DD/MM/AAAA".to_string());
            return None;
        };

        let clamped = self.policy.clamp(start, end, bounds);
        self.start_text = clamped.window.start.format(DATE_DISPLAY_FORMAT).to_string();
        self.end_text = clamped.window.end.format(DATE_DISPLAY_FORMAT).to_string();
        self.window_warning = clamped.warning;

        Some(Period::Range {
            start: clamped.window.start,
            end: clamped.window.end,
        })
    }

    fn retain_known(selected: &mut BTreeSet<String>, options: &[String]) {
        selected.retain(|s| options.contains(s));
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let mut filters_changed = false;
        let mut period_changed = false;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Dashboard de Faltas")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Vigilância em Saúde")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Fonte de Dados").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&self.source_label).size(12.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🔄 Recarregar").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔍 Filtros").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.data_ready, |ui| {
            filters_changed |= Self::multi_select(
                ui,
                "employee_filter",
                "Funcionário",
                &self.employees,
                &mut self.filters.employees,
            );
            filters_changed |= Self::multi_select(
                ui,
                "sector_filter",
                "Setor",
                &self.sectors,
                &mut self.filters.sectors,
            );
            filters_changed |= Self::multi_select(
                ui,
                "reason_filter",
                "Motivo da Falta",
                &self.reasons,
                &mut self.filters.reasons,
            );
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Period Section =====
        ui.label(RichText::new("📅 Período").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.data_ready, |ui| {
            ui.horizontal(|ui| {
                period_changed |= ui
                    .radio_value(&mut self.period_mode, PeriodMode::All, "Todos")
                    .changed();
                period_changed |= ui
                    .radio_value(&mut self.period_mode, PeriodMode::Year, "Ano")
                    .changed();
                period_changed |= ui
                    .radio_value(&mut self.period_mode, PeriodMode::Range, "Intervalo")
                    .changed();
            });
            ui.add_space(5.0);

            let label_width = 60.0;
            match self.period_mode {
                PeriodMode::All => {}
                PeriodMode::Year => {
                    ui.horizontal(|ui| {
                        ui.add_sized([label_width, 20.0], egui::Label::new("Ano:"));
                        let selected = self
                            .selected_year
                            .map(|y| y.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        ComboBox::from_id_salt("year_filter")
                            .width(120.0)
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                for &year in &self.years {
                                    if ui
                                        .selectable_label(
                                            self.selected_year == Some(year),
                                            year.to_string(),
                                        )
                                        .clicked()
                                    {
                                        self.selected_year = Some(year);
                                        period_changed = true;
                                    }
                                }
                            });
                    });
                }
                PeriodMode::Range => {
                    ui.horizontal(|ui| {
                        ui.add_sized([label_width, 20.0], egui::Label::new("Início:"));
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.start_text).desired_width(110.0),
                        );
                        period_changed |= response.lost_focus();
                    });
                    ui.horizontal(|ui| {
                        ui.add_sized([label_width, 20.0], egui::Label::new("Fim:"));
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.end_text).desired_width(110.0),
                        );
                        period_changed |= response.lost_focus();
                    });

                    ui.add_space(5.0);
                    let reset_label = format!("Últimos {} dias", self.policy.default_days);
                    if ui.small_button(reset_label).clicked() {
                        action = ControlPanelAction::ResetWindow;
                    }

                    if let Some((earliest, latest)) = self.bounds {
                        ui.label(
                            RichText::new(format!(
                                "Dados de {} a {}",
                                earliest.format(DATE_DISPLAY_FORMAT),
                                latest.format(DATE_DISPLAY_FORMAT)
                            ))
                            .size(11.0)
                            .color(Color32::GRAY),
                        );
                    }
                }
            }
        });

        if self.period_mode == PeriodMode::Range {
            if let Some(warning) = &self.window_warning {
                ui.label(
                    RichText::new(format!("⚠ {}", warning))
                        .size(11.0)
                        .color(Color32::from_rgb(243, 156, 18)),
                );
            }
            if let Some(error) = &self.date_error {
                ui.label(
                    RichText::new(error)
                        .size(11.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.label(RichText::new("📥 Baixar dados filtrados").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.data_ready, |ui| {
            ui.horizontal(|ui| {
                if ui.button("CSV").clicked() {
                    action = ControlPanelAction::Export(ExportKind::Csv);
                }
                if ui.button("XLSX").clicked() {
                    action = ControlPanelAction::Export(ExportKind::Xlsx);
                }
            });
            ui.horizontal(|ui| {
                if ui.button("🖼 Gráfico por Motivo").clicked() {
                    action = ControlPanelAction::Export(ExportKind::ReasonChart);
                }
                if ui.button("🖼 Gráfico por Mês").clicked() {
                    action = ControlPanelAction::Export(ExportKind::MonthChart);
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("⏳ Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Erro") {
            Color32::from_rgb(220, 53, 69)
        } else if self.progress >= 100.0 {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if period_changed {
            self.apply_period();
            filters_changed = true;
        }
        if filters_changed && action == ControlPanelAction::None {
            action = ControlPanelAction::FiltersChanged;
        }

        action
    }

    /// Collapsible checkbox list. Returns true when the selection changed.
    fn multi_select(
        ui: &mut egui::Ui,
        id: &str,
        title: &str,
        options: &[String],
        selected: &mut BTreeSet<String>,
    ) -> bool {
        let mut changed = false;
        let header = if selected.is_empty() {
            format!("{} (todos)", title)
        } else {
            format!("{} ({})", title, selected.len())
        };

        egui::CollapsingHeader::new(header)
            .id_salt(id)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(5.0)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt(id)
                            .max_height(140.0)
                            .show(ui, |ui| {
                                for option in options {
                                    let mut checked = selected.contains(option);
                                    if ui.checkbox(&mut checked, option.as_str()).changed() {
                                        if checked {
                                            selected.insert(option.clone());
                                        } else {
                                            selected.remove(option);
                                        }
                                        changed = true;
                                    }
                                }
                            });
                    });

                ui.add_space(5.0);
                if ui.small_button("Limpar").clicked() && !selected.is_empty() {
                    selected.clear();
                    changed = true;
                }
            });

        changed
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    FiltersChanged,
    ResetWindow,
    Export(ExportKind),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AbsenceRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> AbsenceTable {
        vec![
            AbsenceRecord::new("", "Ana", "A", Some(date(2022, 6, 1)), "Doença", ""),
            AbsenceRecord::new("", "Bia", "B", Some(date(2024, 3, 31)), "Consulta", ""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_update_options_sets_default_window() {
        let mut panel = ControlPanel::new(WindowPolicy::default(), "Aba");
        panel.update_options(&table());

        assert_eq!(
            panel.filters.period,
            Period::Range {
                start: date(2024, 3, 1),
                end: date(2024, 3, 31)
            }
        );
        assert_eq!(panel.selected_year, Some(2022));
        assert_eq!(panel.window_warning, None);
    }

    #[test]
    fn test_long_range_is_clamped_with_warning() {
        let mut panel = ControlPanel::new(WindowPolicy::default(), "Aba");
        panel.update_options(&table());

        panel.start_text = "01/06/2022".to_string();
        panel.end_text = "31/03/2024".to_string();
        panel.apply_period();

        assert_eq!(
            panel.filters.period,
            Period::Range {
                start: date(2023, 4, 1),
                end: date(2024, 3, 31)
            }
        );
        assert!(panel.window_warning.is_some());
        assert_eq!(panel.start_text, "01/04/2023");
    }

    #[test]
    fn test_invalid_date_keeps_previous_period() {
        let mut panel = ControlPanel::new(WindowPolicy::default(), "Aba");
        panel.update_options(&table());
        let before = panel.filters.period;

        panel.start_text = "amanhã".to_string();
        panel.apply_period();

        assert_eq!(panel.filters.period, before);
        assert!(panel.date_error.is_some());
    }

    #[test]
    fn test_invalid_date_after_year_mode_uses_default_window() {
        let mut panel = ControlPanel::new(WindowPolicy::default(), "Aba");
        panel.update_options(&table());

        panel.period_mode = PeriodMode::Year;
        panel.selected_year = Some(2022);
        panel.apply_period();
        assert_eq!(panel.filters.period, Period::Year(2022));

        panel.start_text = "amanhã".to_string();
        panel.period_mode = PeriodMode::Range;
        panel.apply_period();

        assert_eq!(
            panel.filters.period,
            Period::Range {
                start: date(2024, 3, 1),
                end: date(2024, 3, 31)
            }
        );
        assert!(panel.date_error.is_some());
    }

    #[test]
    fn test_year_mode() {
        let mut panel = ControlPanel::new(WindowPolicy::default(), "Aba");
        panel.update_options(&table());

        panel.period_mode = PeriodMode::Year;
        panel.selected_year = Some(2024);
        panel.apply_period();
        assert_eq!(panel.filters.period, Period::Year(2024));

        panel.period_mode = PeriodMode::All;
        panel.apply_period();
        assert_eq!(panel.filters.period, Period::All);
    }

    #[test]
    fn test_reload_drops_unknown_selections() {
        let mut panel = ControlPanel::new(WindowPolicy::default(), "Aba");
        panel.filters.employees.insert("Zé".to_string());
        panel.filters.employees.insert("Ana".to_string());

        panel.update_options(&table());
        assert_eq!(panel.filters.single_employee(), Some("Ana"));
    }
}
