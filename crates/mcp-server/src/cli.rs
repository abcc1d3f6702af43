use clap::Parser;

/// Rulebook MCP server.
///
/// Without a command flag the server speaks MCP over stdio.
#[derive(Debug, Parser)]
#[command(name = "rulebook-mcp", version, about)]
pub struct Cli {
    /// Rules directory (default: $RULEBOOK_ROOT, then ./rules)
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Print available rule keys and exit
    #[arg(long, conflicts_with_all = ["get", "print_tools"])]
    pub list: bool,

    /// Print one rule (or ALL) and exit
    #[arg(long, value_name = "KEY", conflicts_with = "print_tools")]
    pub get: Option<String>,

    /// Print tool inventory as JSON and exit
    #[arg(long)]
    pub print_tools: bool,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Serve,
    List,
    Get(String),
    PrintTools,
}

impl Cli {
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.list {
            Mode::List
        } else if let Some(key) = &self.get {
            Mode::Get(key.clone())
        } else if self.print_tools {
            Mode::PrintTools
        } else {
            Mode::Serve
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("rulebook-mcp").chain(args.iter().copied()))
    }

    #[test]
    fn no_args_serves() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.root, None);
        assert_eq!(cli.mode(), Mode::Serve);
    }

    #[test]
    fn root_and_get() {
        let cli = parse(&["--root", "/srv/rules", "--get", "GENERAL-OVERVIEW"]).unwrap();
        assert_eq!(cli.root.as_deref(), Some("/srv/rules"));
        assert_eq!(cli.mode(), Mode::Get("GENERAL-OVERVIEW".to_string()));

        let cli = parse(&["--list", "--root=/tmp/r"]).unwrap();
        assert_eq!(cli.root.as_deref(), Some("/tmp/r"));
        assert_eq!(cli.mode(), Mode::List);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--get"]).is_err());
        assert!(parse(&["--root"]).is_err());
        assert_eq!(
            parse(&["--list", "--print-tools"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
        assert!(parse(&["serve"]).is_err());
    }

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
