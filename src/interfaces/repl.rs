// Line commands for interactive mode
use crate::application::dashboard::Dashboard;
use url::Url;

pub const HELP: &str = "\
commands:
  query <text>   stage a search filter (tag:X, user:X, title:X, body:X)
  page <n>       stage a page number
  per <n>        stage items per page (1-100)
  search         commit the staged values
  next | prev    go to the next / previous page
  back | forward walk the URL history
  open <url>     open a shared link
  show           render again
  help           this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Page(String),
    PerPage(String),
    Search,
    Next,
    Prev,
    Back,
    Forward,
    Open(String),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The committed query may have changed: settle and render.
    Render,
    Message(String),
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(name, rest)| (name, rest.trim()));

    let command = match name {
        "query" | "q" => Command::Query(rest.to_string()),
        "page" => Command::Page(rest.to_string()),
        "per" | "perpage" => Command::PerPage(rest.to_string()),
        "search" | "s" | "" => Command::Search,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "back" => Command::Back,
        "forward" => Command::Forward,
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(command)
}

pub fn apply(dashboard: &mut Dashboard, command: Command) -> Outcome {
    match command {
        Command::Query(text) => {
            dashboard.staged().set_filter(text);
            staged_message(dashboard)
        }
        Command::Page(text) => {
            dashboard.staged().set_page_text(&text);
            staged_message(dashboard)
        }
        Command::PerPage(text) => {
            dashboard.staged().set_per_page_text(&text);
            staged_message(dashboard)
        }
        Command::Search => {
            dashboard.staged().submit();
            Outcome::Render
        }
        Command::Next => {
            dashboard.staged().next_page();
            Outcome::Render
        }
        Command::Prev => match dashboard.staged().previous_page() {
            Some(_) => Outcome::Render,
            None => Outcome::Message("already on the first page".to_string()),
        },
        Command::Back => {
            if dashboard.committed().back() {
                Outcome::Render
            } else {
                Outcome::Message("no earlier page in history".to_string())
            }
        }
        Command::Forward => {
            if dashboard.committed().forward() {
                Outcome::Render
            } else {
                Outcome::Message("no later page in history".to_string())
            }
        }
        Command::Open(link) => match Url::parse(&link) {
            Ok(url) => {
                dashboard.committed().navigate(url);
                Outcome::Render
            }
            Err(e) => Outcome::Message(format!("invalid URL: {}", e)),
        },
        Command::Show => Outcome::Render,
        Command::Help => Outcome::Message(HELP.to_string()),
        Command::Quit => Outcome::Quit,
    }
}

fn staged_message(dashboard: &mut Dashboard) -> Outcome {
    let staged = dashboard.staged().snapshot();
    Outcome::Message(format!(
        "staged: page {} / per page {} / query \"{}\" (run `search` to apply)",
        staged.page, staged.per_page, staged.filter
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("query  tag:Rust "),
            Ok(Command::Query("tag:Rust".to_string()))
        );
        assert_eq!(parse_command("page 3"), Ok(Command::Page("3".to_string())));
        assert_eq!(parse_command(""), Ok(Command::Search));
        assert_eq!(parse_command("next"), Ok(Command::Next));
        assert!(parse_command("open").is_err());
        assert!(parse_command("frobnicate").is_err());
    }
}
