use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};

use crate::theme::Theme;

/// Work handed back to the event loop by watchers and input handlers
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuntimeCommand {
    ToggleTheme,
    SetTheme(Theme),
    ReloadConfig,
    SaveImage,
    Quit,
}

pub type RuntimeCommandSender = Sender<RuntimeCommand>;
pub type RuntimeCommandReceiver = Receiver<RuntimeCommand>;

pub fn command_channel() -> (RuntimeCommandSender, RuntimeCommandReceiver) {
    mpsc::channel()
}
