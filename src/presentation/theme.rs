use colored::Colorize;

/// Styling hooks for each part of the dashboard.
pub struct Theme {
    pub heading: fn(&str) -> String,
    pub author: fn(&str) -> String,
    pub rule: fn(&str) -> String,
    pub index: fn(&str) -> String,
    pub title: fn(&str) -> String,
    pub link: fn(&str) -> String,
    pub likes: fn(&str) -> String,
    pub meta: fn(&str) -> String,
    pub body: fn(&str) -> String,
    pub error: fn(&str) -> String,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "qiita" | "" => Self::qiita(),
            "dark" => Self::dark(),
            "light" => Self::light(),
            "plain" => Self::plain(),
            _ => {
                eprintln!("{}", format!("✘ Unknown theme: {}", name).red());
                Self::qiita()
            }
        }
    }

    // Qiita green
    fn qiita() -> Self {
        Self {
            heading: |s| s.bright_green().bold().underline().to_string(),
            author: |s| s.bright_white().bold().to_string(),
            rule: |s| s.bright_black().dimmed().to_string(),
            index: |s| s.green().to_string(),
            title: |s| s.bright_white().bold().to_string(),
            link: |s| s.cyan().underline().to_string(),
            likes: |s| s.bright_green().to_string(),
            meta: |s| s.bright_black().italic().to_string(),
            body: |s| s.white().to_string(),
            error: |s| s.red().bold().to_string(),
        }
    }

    fn dark() -> Self {
        Self {
            heading: |s| s.bright_magenta().italic().bold().to_string(),
            author: |s| s.cyan().bold().to_string(),
            rule: |s| s.bright_black().dimmed().to_string(),
            index: |s| s.bright_white().to_string(),
            title: |s| s.yellow().to_string(),
            link: |s| s.bright_blue().italic().to_string(),
            likes: |s| s.bright_yellow().to_string(),
            meta: |s| s.bright_white().dimmed().italic().to_string(),
            body: |s| s.white().to_string(),
            error: |s| s.red().italic().to_string(),
        }
    }

    // For light terminal backgrounds
    fn light() -> Self {
        Self {
            heading: |s| s.blue().bold().underline().to_string(),
            author: |s| s.magenta().bold().to_string(),
            rule: |s| s.bright_black().to_string(),
            index: |s| s.blue().to_string(),
            title: |s| s.black().bold().to_string(),
            link: |s| s.blue().underline().to_string(),
            likes: |s| s.green().to_string(),
            meta: |s| s.bright_black().italic().to_string(),
            body: |s| s.black().to_string(),
            error: |s| s.red().bold().to_string(),
        }
    }

    fn plain() -> Self {
        Self {
            heading: str::to_string,
            author: str::to_string,
            rule: str::to_string,
            index: str::to_string,
            title: str::to_string,
            link: str::to_string,
            likes: str::to_string,
            meta: str::to_string,
            body: str::to_string,
            error: str::to_string,
        }
    }
}
