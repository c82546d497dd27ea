use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  /select <file>...   choose documents (pdf, docx, xlsx, png, jpg, jpeg)
  /upload             upload and process the selected documents
  /report [request]   generate a PDF report (optionally replacing the request text)
  /dismiss            close the visible notices
  /help               show this help
  /quit               exit
Any other line is sent to the assistant. End a line with \\ to continue
the message on the next line.";

/// One line typed by the user, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(Vec<PathBuf>),
    Upload,
    Report(Option<String>),
    Dismiss,
    Help,
    Quit,
    /// Chat text. `continues` is the Shift+Enter case: keep composing.
    Chat { text: String, continues: bool },
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return parse_chat(line);
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    match name {
        "select" => Command::Select(split_paths(args)),
        "upload" => Command::Upload,
        "report" if args.is_empty() => Command::Report(None),
        "report" => Command::Report(Some(args.to_string())),
        "dismiss" => Command::Dismiss,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

fn parse_chat(line: &str) -> Command {
    match line.strip_suffix('\\') {
        Some(text) => Command::Chat {
            text: text.to_string(),
            continues: true,
        },
        None => Command::Chat {
            text: line.to_string(),
            continues: false,
        },
    }
}

// Whitespace separated; double quotes group a path containing spaces.
fn split_paths(args: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in args.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(parse_line("/upload"), Command::Upload);
        assert_eq!(parse_line("/report"), Command::Report(None));
        assert_eq!(
            parse_line("/report Introduction and Findings\n"),
            Command::Report(Some("Introduction and Findings".to_string()))
        );
        assert_eq!(parse_line("/exit"), Command::Quit);
        assert_eq!(parse_line("/frobnicate"), Command::Unknown("frobnicate".to_string()));
    }

    #[test]
    fn select_splits_and_honours_quotes() {
        assert_eq!(
            parse_line(r#"/select a.pdf  "my scans/b.png" c.docx"#),
            Command::Select(vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("my scans/b.png"),
                PathBuf::from("c.docx"),
            ])
        );
        assert_eq!(parse_line("/select"), Command::Select(Vec::new()));
    }

    #[test]
    fn trailing_backslash_continues_message() {
        assert_eq!(
            parse_line("first line\\"),
            Command::Chat {
                text: "first line".to_string(),
                continues: true,
            }
        );
        assert_eq!(
            parse_line("What is the dosage?\r\n"),
            Command::Chat {
                text: "What is the dosage?".to_string(),
                continues: false,
            }
        );
    }
}
