// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EntityKind, SubmitMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Filter,
    Assign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Form(SubmitMode),
    Prompt(PromptKind),
    ConfirmDelete,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub screen: EntityKind,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EntityKind::Flight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    NextScreen,
    PrevScreen,
    OpenScreen(EntityKind),
    OpenForm(SubmitMode),
    OpenPrompt(PromptKind),
    ConfirmDelete,
    ShowHelp,
    ExitToNav,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    /// The shell must remount and load the new screen's table.
    ScreenChanged(EntityKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(screen: EntityKind) -> Self {
        Self {
            mode: AppMode::Nav,
            screen,
            status_line: None,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextScreen => self.rotate_screen(1),
            AppCommand::PrevScreen => self.rotate_screen(-1),
            AppCommand::OpenScreen(screen) => {
                self.mode = AppMode::Nav;
                self.screen = screen;
                vec![AppEvent::ScreenChanged(screen)]
            }
            AppCommand::OpenForm(mode) => self.enter(AppMode::Form(mode)),
            AppCommand::OpenPrompt(prompt) => self.enter(AppMode::Prompt(prompt)),
            AppCommand::ConfirmDelete => self.enter(AppMode::ConfirmDelete),
            AppCommand::ShowHelp => self.enter(AppMode::Help),
            AppCommand::ExitToNav => self.enter(AppMode::Nav),
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }

    fn enter(&mut self, mode: AppMode) -> Vec<AppEvent> {
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<AppEvent> {
        let screens = EntityKind::ALL;
        let current = screens
            .iter()
            .position(|screen| *screen == self.screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.screen = screens[next];
        self.mode = AppMode::Nav;
        vec![AppEvent::ScreenChanged(self.screen)]
    }
}
