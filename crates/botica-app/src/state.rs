// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::forms::DrugFormInput;
use crate::model::{AppMode, FormField, Severity, TabKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub severity: Severity,
    pub message: String,
}

impl StatusLine {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub form: DrugFormInput,
    pub form_field: FormField,
    pub filter: String,
    pub status_line: Option<StatusLine>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: TabKind::Register,
            form: DrugFormInput::default(),
            form_field: FormField::Name,
            filter: String::new(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    EnterEditMode,
    ExitToNav,
    FocusNextField,
    FocusPrevField,
    FormInput(char),
    FormBackspace,
    ClearForm,
    FilterInput(char),
    FilterBackspace,
    ClearFilter,
    SubmitForm,
    SetStatus(StatusLine),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(TabKind),
    FieldFocusChanged(FormField),
    FormChanged,
    FormCleared,
    FormSubmitted,
    FilterChanged,
    StatusUpdated(StatusLine),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => vec![self.rotate_tab(1)],
            AppCommand::PrevTab => vec![self.rotate_tab(-1)],
            AppCommand::EnterEditMode => {
                self.mode = AppMode::Edit;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::FocusNextField => vec![self.rotate_field(1)],
            AppCommand::FocusPrevField => vec![self.rotate_field(-1)],
            AppCommand::FormInput(ch) => {
                self.form.value_mut(self.form_field).push(ch);
                vec![AppEvent::FormChanged]
            }
            AppCommand::FormBackspace => {
                if self.form.value_mut(self.form_field).pop().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::FormChanged]
            }
            AppCommand::ClearForm => {
                self.form.clear();
                self.form_field = FormField::Name;
                vec![
                    AppEvent::FormCleared,
                    self.set_status(Severity::Info, "form cleared"),
                ]
            }
            AppCommand::FilterInput(ch) => {
                self.filter.push(ch);
                vec![AppEvent::FilterChanged]
            }
            AppCommand::FilterBackspace => {
                if self.filter.pop().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::FilterChanged]
            }
            AppCommand::ClearFilter => {
                if self.filter.is_empty() {
                    return Vec::new();
                }
                self.filter.clear();
                vec![AppEvent::FilterChanged]
            }
            AppCommand::SubmitForm => {
                self.form.clear();
                self.form_field = FormField::Name;
                vec![
                    AppEvent::FormSubmitted,
                    self.set_status(Severity::Success, "drug saved"),
                ]
            }
            AppCommand::SetStatus(status) => {
                self.status_line = Some(status.clone());
                vec![AppEvent::StatusUpdated(status)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> AppEvent {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(tabs.len() as isize) as usize;
        self.active_tab = tabs[next];
        AppEvent::TabChanged(self.active_tab)
    }

    fn rotate_field(&mut self, delta: isize) -> AppEvent {
        let fields = FormField::ALL;
        let current = fields
            .iter()
            .position(|field| *field == self.form_field)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(fields.len() as isize) as usize;
        self.form_field = fields[next];
        AppEvent::FieldFocusChanged(self.form_field)
    }

    fn set_status(&mut self, severity: Severity, message: &str) -> AppEvent {
        let status = StatusLine::new(severity, message);
        self.status_line = Some(status.clone());
        AppEvent::StatusUpdated(status)
    }
}
