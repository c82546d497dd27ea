use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use assistant_core::{update, AppState, AppViewModel, KeyPress, Msg, Panel, SelectedFile};
use assistant_logging::{assist_info, assist_warn};

use crate::config::Settings;
use crate::effects::EffectRunner;
use crate::terminal::input::{parse_line, Command, HELP};
use crate::terminal::render;

/// Everything the main loop reacts to.
pub enum AppEvent {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run(settings: Settings) -> anyhow::Result<()> {
    assist_info!(
        "Starting assistant client backend={} downloads={:?}",
        settings.backend.base_url,
        settings.download_dir
    );

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(settings.engine_config(), tx.clone())
        .context("failed to start backend engine")?;
    spawn_stdin_reader(tx);

    let mut out = io::stdout();
    let mut session = Session::new(runner);
    writeln!(out, "Healthcare AI Assistant ({})", settings.backend.base_url)?;
    for line in render::render_status(&session.state.view()) {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "Type /help for commands.")?;

    for event in rx {
        let msgs = match event {
            AppEvent::Msg(msg) => vec![msg],
            AppEvent::Line(line) => match parse_line(&line) {
                Command::Quit => break,
                Command::Help => {
                    writeln!(out, "{HELP}")?;
                    continue;
                }
                Command::Unknown(name) => {
                    writeln!(out, "Unknown command /{name}. Type /help for commands.")?;
                    continue;
                }
                command => session.translate(command, &mut out)?,
            },
            AppEvent::InputClosed => break,
        };
        for msg in msgs {
            for line in session.dispatch(msg) {
                writeln!(out, "{line}")?;
            }
        }
        out.flush()?;
    }

    assist_info!("Assistant client exiting");
    Ok(())
}

struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<String> {
        let prev = self.state.view();
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let lines = if state.consume_dirty() {
            render::render(&prev, &state.view())
        } else {
            Vec::new()
        };
        self.state = state;
        self.runner.enqueue(effects);
        lines
    }

    /// Turn a typed command into the messages a GUI would have produced.
    fn translate(&self, command: Command, out: &mut impl Write) -> io::Result<Vec<Msg>> {
        let view = self.state.view();
        let msgs = match command {
            Command::Select(paths) => {
                if paths.is_empty() {
                    writeln!(out, "Usage: /select <file>...")?;
                    return Ok(Vec::new());
                }
                let mut files = Vec::with_capacity(paths.len());
                for path in &paths {
                    match read_selected(path) {
                        Ok(file) => files.push(file),
                        Err(err) => {
                            assist_warn!("Could not read {:?}: {}", path, err);
                            writeln!(out, "Could not read {}: {err}", path.display())?;
                        }
                    }
                }
                vec![Msg::FilesSelected(files)]
            }
            Command::Upload => vec![Msg::UploadClicked],
            Command::Report(Some(text)) => {
                vec![Msg::ReportInputChanged(text), Msg::GenerateReportClicked]
            }
            Command::Report(None) => vec![Msg::GenerateReportClicked],
            Command::Dismiss => vec![
                Msg::NoticeDismissed(Panel::Upload),
                Msg::NoticeDismissed(Panel::Report),
                Msg::NoticeDismissed(Panel::Chat),
            ],
            Command::Chat { text, continues } => chat_msgs(&view, text, continues, out)?,
            Command::Help | Command::Quit | Command::Unknown(_) => Vec::new(),
        };
        Ok(msgs)
    }
}

fn chat_msgs(
    view: &AppViewModel,
    text: String,
    continues: bool,
    out: &mut impl Write,
) -> io::Result<Vec<Msg>> {
    if !view.is_ready {
        // Input is disabled; pressing send still explains why.
        return Ok(vec![Msg::ChatSendClicked]);
    }
    if view.chat.sending {
        writeln!(out, "Assistant is still thinking; wait for the answer.")?;
        return Ok(Vec::new());
    }
    let key = if continues {
        KeyPress::shift_enter()
    } else {
        KeyPress::enter()
    };
    Ok(vec![
        Msg::ChatInputChanged(format!("{}{}", view.chat.input, text)),
        Msg::ChatKeyPressed(key),
    ])
}

fn read_selected(path: &Path) -> io::Result<SelectedFile> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SelectedFile::new(name, bytes))
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(AppEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    assist_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use assistant_core::{Effect, Key};

    use super::*;

    fn ready_view() -> AppViewModel {
        let (state, _) = update(
            AppState::new(),
            Msg::FilesSelected(vec![SelectedFile::new("a.pdf", vec![1])]),
        );
        let (state, effects) = update(state, Msg::UploadClicked);
        let request_id = match effects.as_slice() {
            [Effect::Upload { request_id, .. }] => *request_id,
            other => panic!("unexpected effects {other:?}"),
        };
        let (state, _) = update(
            state,
            Msg::UploadFinished {
                request_id,
                result: Ok("ok".to_string()),
            },
        );
        state.view()
    }

    #[test]
    fn chat_line_before_ready_only_presses_send() {
        let mut out = Vec::new();
        let msgs = chat_msgs(&AppState::new().view(), "hi".to_string(), false, &mut out).unwrap();
        assert_eq!(msgs, vec![Msg::ChatSendClicked]);
    }

    #[test]
    fn continued_line_uses_shift_enter() {
        let mut out = Vec::new();
        let msgs = chat_msgs(&ready_view(), "part one".to_string(), true, &mut out).unwrap();
        assert_eq!(
            msgs,
            vec![
                Msg::ChatInputChanged("part one".to_string()),
                Msg::ChatKeyPressed(KeyPress {
                    key: Key::Enter,
                    shift: true,
                }),
            ]
        );
    }

    #[test]
    fn read_selected_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labs.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let file = read_selected(&path).unwrap();
        assert_eq!(file.name, "labs.pdf");
        assert_eq!(file.bytes, b"%PDF");
    }
}
