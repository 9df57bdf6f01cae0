use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    catalog::Catalog,
    config::Config,
    selector::{Selector, SelectorError},
    tag,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding config.yaml.
    /// Defaults to $TAGSEL_BASE_PATH or ~/.local/share/tagsel
    #[clap(long, global = true)]
    pub base_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a selector and print its canonical form
    Parse {
        /// Selector expression, or @name of a saved selector
        expr: String,

        /// Print the expression tree as json
        #[clap(long, default_value = "false")]
        json: bool,
    },

    /// Check a selector against a set of tags.
    /// Exits with 0 on match and 1 otherwise.
    Match {
        /// Selector expression, or @name of a saved selector
        expr: String,

        /// Comma or space separated tags, e.g. "#rust, #cli"
        #[clap(short = 'g', long, allow_hyphen_values = true, default_value = "")]
        tags: String,
    },

    /// Print the names of catalog items selected by an expression
    Filter {
        /// Selector expression, or @name of a saved selector
        expr: String,

        /// Catalog file (.json, .yaml or .yml): a list of {name, tags}
        catalog: PathBuf,
    },

    /// Manage saved selectors
    Selector {
        #[command(subcommand)]
        action: SelectorArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum SelectorArgs {
    /// Save a selector under a name
    Add {
        name: String,
        expr: String,
    },
    /// Delete a saved selector
    Remove { name: String },
    /// List saved selectors
    List {},
}

/// Exit status when `match` finds no match.
pub const EXIT_NO_MATCH: u8 = 1;
/// Exit status for a malformed selector, typed or saved.
pub const EXIT_SYNTAX: u8 = 2;
/// Exit status for every other failure: unknown `@name`, unreadable
/// catalog or config, bad selector name.
pub const EXIT_ERROR: u8 = 3;

/// Exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<SelectorError>().is_some() {
        EXIT_SYNTAX
    } else {
        EXIT_ERROR
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let base_path = match &args.base_path {
        Some(base_path) => base_path.clone(),
        None => Config::base_path()?,
    };
    Config::load_with(&base_path)
}

/// Either a literal expression or `@name` of a saved one.
pub fn resolve(args: &Args, expr: &str) -> Result<Selector> {
    match expr.strip_prefix('@') {
        Some(name) => load_config(args)?.selector(name),
        None => Ok(expr.parse()?),
    }
}

/// Literals of `selector` that tag no catalog item, each with the closest
/// known tag when one is near enough.
pub fn unknown_tags<'a>(
    selector: &'a Selector,
    catalog: &'a Catalog,
) -> Vec<(&'a str, Option<&'a str>)> {
    let known = catalog.known_tags();
    selector
        .expr()
        .tags()
        .into_iter()
        .filter(|literal| !known.contains(literal))
        .map(|literal| (literal, tag::suggest(literal, known.iter().copied())))
        .collect()
}

fn warn_unknown_tags(selector: &Selector, catalog: &Catalog) {
    for (literal, suggestion) in unknown_tags(selector, catalog) {
        match suggestion {
            Some(suggestion) => {
                log::warn!("no item is tagged {literal}, did you mean {suggestion}?")
            }
            None => log::warn!("no item is tagged {literal}"),
        }
    }
}

/// Run one command, writing its output to `out`. Returns the exit status
/// on success; failures map through [`exit_code`].
pub fn run(args: &Args, out: &mut impl Write) -> Result<u8> {
    tracing::debug!(command = ?args.command, "running");

    match &args.command {
        Command::Parse { expr, json } => {
            let selector = resolve(args, expr)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(selector.expr())?)?;
            } else {
                writeln!(out, "{selector}")?;
            }
            Ok(0)
        }

        Command::Match { expr, tags } => {
            let selector = resolve(args, expr)?;
            let tags = tag::parse_list(tags);
            let matched = selector.matches(&tags);
            writeln!(out, "{matched}")?;

            Ok(if matched { 0 } else { EXIT_NO_MATCH })
        }

        Command::Filter { expr, catalog } => {
            let selector = resolve(args, expr)?;
            let catalog = Catalog::load(catalog)?;
            warn_unknown_tags(&selector, &catalog);

            for item in catalog.filter(selector.expr()) {
                writeln!(out, "{}", item.name)?;
            }
            Ok(0)
        }

        Command::Selector { action } => {
            let mut config = load_config(args)?;
            match action {
                SelectorArgs::Add { name, expr } => {
                    let selector = config.add_selector(name, expr)?;
                    config.save()?;
                    writeln!(out, "@{name} = {selector}")?;
                }
                SelectorArgs::Remove { name } => match config.remove_selector(name) {
                    Some(_) => {
                        config.save()?;
                        writeln!(out, "@{name} removed")?;
                    }
                    None => anyhow::bail!("no selector named @{name}"),
                },
                SelectorArgs::List {} => {
                    for (name, expr) in &config.selectors {
                        writeln!(out, "@{name} = {expr}")?;
                    }
                }
            }
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn base_path(&self) -> &str {
            self.dir.path().to_str().unwrap()
        }

        fn args(&self, argv: &[&str]) -> Args {
            let mut full = vec!["tagsel", "--base-path", self.base_path()];
            full.extend_from_slice(argv);
            Args::try_parse_from(full).unwrap()
        }

        /// Exit status and stdout of one invocation.
        fn run(&self, argv: &[&str]) -> (u8, String) {
            let mut out = Vec::new();
            let code = match run(&self.args(argv), &mut out) {
                Ok(code) => code,
                Err(err) => exit_code(&err),
            };
            (code, String::from_utf8(out).unwrap())
        }

        fn write(&self, name: &str, content: &str) -> String {
            let path = self.dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path.to_str().unwrap().to_string()
        }
    }

    #[test]
    fn test_match_exit_status() {
        let ws = Workspace::new();

        assert_eq!(
            ws.run(&["match", "#a and not #b", "--tags", "#A, #c"]),
            (0, "true\n".to_string())
        );
        assert_eq!(
            ws.run(&["match", "#a and not #b", "--tags", "#a #b"]),
            (EXIT_NO_MATCH, "false\n".to_string())
        );
        assert_eq!(ws.run(&["match", "#a"]), (EXIT_NO_MATCH, "false\n".to_string()));
    }

    #[test]
    fn test_syntax_error_exit_status() {
        let ws = Workspace::new();

        for expr in ["#x)", "#x and", "(#x", "x", "#a or or #b"] {
            let (code, out) = ws.run(&["match", expr, "--tags", "#x"]);
            assert_eq!(code, EXIT_SYNTAX, "{expr}");
            assert!(out.is_empty());
        }
        assert_eq!(ws.run(&["parse", "#a and"]).0, EXIT_SYNTAX);
    }

    #[test]
    fn test_exit_code_mapping() {
        let err = anyhow::Error::new(SelectorError::IncompleteExpression);
        assert_eq!(exit_code(&err), EXIT_SYNTAX);
        assert_eq!(exit_code(&err.context("selector @x is malformed")), EXIT_SYNTAX);
        assert_eq!(exit_code(&anyhow::anyhow!("no selector named @x")), EXIT_ERROR);
    }

    #[test]
    fn test_parse_prints_canonical_form() {
        let ws = Workspace::new();

        assert_eq!(
            ws.run(&["parse", "#A or #b AND not (#c or #d)"]),
            (0, "#a OR #b AND NOT (#c OR #d)\n".to_string())
        );

        let (code, out) = ws.run(&["parse", "--json", "#a and #b"]);
        assert_eq!(code, 0);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(json.is_object());
    }

    #[test]
    fn test_saved_selector_resolution() {
        let ws = Workspace::new();

        assert_eq!(
            ws.run(&["selector", "add", "sf", "#Sci_Fi and not #draft"]),
            (0, "@sf = #sci-fi AND NOT #draft\n".to_string())
        );
        assert_eq!(
            ws.run(&["match", "@sf", "--tags", "#sci-fi"]),
            (0, "true\n".to_string())
        );
        assert_eq!(
            ws.run(&["match", "@sf", "--tags", "#sci-fi, #draft"]),
            (EXIT_NO_MATCH, "false\n".to_string())
        );
        assert_eq!(
            ws.run(&["selector", "list"]),
            (0, "@sf = #Sci_Fi and not #draft\n".to_string())
        );
        assert_eq!(ws.run(&["parse", "@sf"]), (0, "#sci-fi AND NOT #draft\n".to_string()));
    }

    #[test]
    fn test_unknown_saved_selector() {
        let ws = Workspace::new();

        let err = resolve(&ws.args(&["parse", "@nope"]), "@nope").unwrap_err();
        assert_eq!(err.to_string(), "no selector named @nope");

        // distinct from both "no match" and a syntax error
        assert_eq!(ws.run(&["match", "@nope", "--tags", "#a"]), (EXIT_ERROR, String::new()));
        assert_eq!(ws.run(&["selector", "remove", "nope"]).0, EXIT_ERROR);
    }

    #[test]
    fn test_selector_add_and_remove() {
        let ws = Workspace::new();

        assert_eq!(ws.run(&["selector", "add", "bad", "#a and"]).0, EXIT_SYNTAX);
        assert_eq!(ws.run(&["selector", "add", "bad name", "#a"]).0, EXIT_ERROR);
        assert_eq!(ws.run(&["selector", "list"]), (0, String::new()));

        ws.run(&["selector", "add", "a", "#a"]);
        assert_eq!(
            ws.run(&["selector", "remove", "a"]),
            (0, "@a removed\n".to_string())
        );
        assert_eq!(ws.run(&["match", "@a", "--tags", "#a"]).0, EXIT_ERROR);
    }

    #[test]
    fn test_malformed_saved_selector_is_syntax_error() {
        let ws = Workspace::new();
        ws.write("config.yaml", "selectors:\n  bad: '#a and'\n");

        assert_eq!(ws.run(&["match", "#a", "--tags", "#a"]).0, 0);
        assert_eq!(ws.run(&["match", "@bad", "--tags", "#a"]).0, EXIT_SYNTAX);
    }

    #[test]
    fn test_filter_prints_selected_names() {
        let ws = Workspace::new();
        let catalog = ws.write(
            "catalog.json",
            r##"[
                {"name": "dune", "tags": ["#Sci_Fi", "#classic"]},
                {"name": "hobbit", "tags": ["#fantasy", "#classic"]},
                {"name": "draft", "tags": ["#sci-fi", "#draft"]}
            ]"##,
        );

        assert_eq!(
            ws.run(&["filter", "#sci-fi and not #draft", &catalog]),
            (0, "dune\n".to_string())
        );
        assert_eq!(
            ws.run(&["filter", "#classic", &catalog]),
            (0, "dune\nhobbit\n".to_string())
        );
        assert_eq!(ws.run(&["filter", "#nothing", &catalog]), (0, String::new()));
        assert_eq!(ws.run(&["filter", "#a", "missing.json"]).0, EXIT_ERROR);
    }

    #[test]
    fn test_unknown_tags_suggest_closest() {
        let catalog = Catalog::new(vec![
            Item {
                name: "hobbit".to_string(),
                tags: vec!["#fantasy".to_string()],
            },
            Item {
                name: "dune".to_string(),
                tags: vec!["#sci-fi".to_string()],
            },
        ]);
        let selector: Selector = "#fantsy or #sci-fi or #cooking".parse().unwrap();

        assert_eq!(
            unknown_tags(&selector, &catalog),
            vec![("#fantsy", Some("#fantasy")), ("#cooking", None)]
        );
    }
}
