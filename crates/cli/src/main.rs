//! CLI for the Warden access-control registry.
//!
//! Flow: load users -> query / check / mutate -> save -> print.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use warden_audit::sink::json_stream::JsonStreamSink;
use warden_audit::{render_directory, AccessReport};
use warden_core::{codec, Registry, Resource, User, WardenResult};
use warden_store::{
    load_registry, load_registry_or_empty, open_store, save_registry, StoreFormat,
};

#[derive(Parser, Debug)]
#[command(name = "warden", version, about = "Access-control registry")]
struct Cli {
    /// User data file.
    #[arg(long, global = true, env = "WARDEN_DATA", default_value = "users.csv")]
    data: PathBuf,

    /// On-disk format: "csv" (legacy lines) or "jsonl".
    #[arg(long, global = true, env = "WARDEN_FORMAT", default_value = "csv")]
    format: StoreFormat,

    /// Skip malformed records on load instead of failing.
    #[arg(long, global = true, default_value_t = false)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed sample users, check access, save, reload, sort, and search.
    Demo,

    /// Append a user to the data file.
    Add {
        #[command(subcommand)]
        user: NewUser,
    },

    /// Print every user.
    List {
        /// Order by access level (stable).
        #[arg(long, default_value_t = false)]
        sorted: bool,
    },

    /// Find users by exact name or id. Prompts on stdin when QUERY is omitted.
    Search { query: Option<String> },

    /// Report which users may access the given resources.
    Check {
        /// "NAME:LEVEL", or a built-in name (Library, Computer lab, Server).
        #[arg(short, long = "resource", required = true, value_parser = parse_resource_arg)]
        resources: Vec<ResourceArg>,

        /// Sink output: "ndjson" writes NDJSON to stdout,
        /// "ndjson:/path/to/file" writes to file.
        #[arg(long)]
        sink: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum NewUser {
    Student {
        name: String,
        id: i64,
        group: String,
        #[arg(long, default_value_t = 1)]
        level: i64,
    },
    Teacher {
        name: String,
        id: i64,
        department: String,
        #[arg(long, default_value_t = 2)]
        level: i64,
    },
    Admin {
        name: String,
        id: i64,
        #[arg(long, default_value_t = 3)]
        level: i64,
    },
}

impl NewUser {
    fn build(self) -> Result<User, warden_core::ValidationError> {
        match self {
            NewUser::Student {
                name,
                id,
                group,
                level,
            } => User::student(name, id, level, group),
            NewUser::Teacher {
                name,
                id,
                department,
                level,
            } => User::teacher(name, id, level, department),
            NewUser::Admin { name, id, level } => User::administrator(name, id, level),
        }
    }
}

#[derive(Debug, Clone)]
enum ResourceArg {
    Named(String),
    Explicit(Resource),
}

fn parse_resource_arg(s: &str) -> Result<ResourceArg, String> {
    match s.rsplit_once(':') {
        Some((name, level)) => {
            let level: i64 = level
                .parse()
                .map_err(|_| format!("invalid access level `{level}` in `{s}`"))?;
            if name.is_empty() {
                return Err(format!("missing resource name in `{s}`"));
            }
            Ok(ResourceArg::Explicit(Resource::new(name, level)))
        }
        None => Ok(ResourceArg::Named(s.to_string())),
    }
}

fn builtin_resources() -> [Resource; 3] {
    [
        Resource::new("Library", 1),
        Resource::new("Computer lab", 2),
        Resource::new("Server", 3),
    ]
}

fn sample_users() -> WardenResult<Vec<User>> {
    Ok(vec![
        User::student("Ivan Ivanov", 1, 1, "IVBO-01-21")?,
        User::teacher("Petr Petrov", 2, 2, "Informatics")?,
        User::administrator("Sidor Sidorov", 3, 3)?,
    ])
}

/// Print `prompt`, then read one line from `input` and trim it.
fn prompt_query(
    prompt: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_matches(registry: &Registry, query: &str, out: &mut impl Write) -> io::Result<()> {
    let found = registry.find_users(query);
    tracing::debug!(query, matches = found.len(), "search");
    if found.is_empty() {
        writeln!(out, "No users found")
    } else {
        writeln!(out, "Found users:")?;
        write!(out, "{}", render_directory(found))
    }
}

/// The legacy format cannot carry delimiters inside fields; refuse them up
/// front rather than write a file that no longer loads.
fn ensure_storable(format: StoreFormat, user: &User) -> WardenResult<()> {
    match format {
        StoreFormat::Csv => codec::check_encodable(user),
        StoreFormat::JsonLines => Ok(()),
    }
}

fn read_query(query: Option<String>) -> io::Result<String> {
    match query {
        Some(q) => Ok(q),
        None => prompt_query(
            "Enter a name or ID to search: ",
            &mut io::stdin().lock(),
            &mut io::stdout(),
        ),
    }
}

fn drain_reports<W: Write>(
    mut sink: JsonStreamSink<W>,
    reports: &[AccessReport],
) -> io::Result<usize> {
    for report in reports {
        sink.write_rows(&report.to_rows())?;
    }
    sink.finish()
}

/// Returns the number of rows written.
fn write_sink(
    sink_spec: &str,
    reports: &[AccessReport],
) -> Result<usize, Box<dyn std::error::Error>> {
    if sink_spec == "ndjson" {
        let n = drain_reports(JsonStreamSink::stdout(), reports)?;
        tracing::info!(rows = n, "ndjson sink: wrote to stdout");
        Ok(n)
    } else if let Some(path) = sink_spec.strip_prefix("ndjson:") {
        let file = std::fs::File::create(Path::new(path))?;
        let n = drain_reports(JsonStreamSink::new(file), reports)?;
        tracing::info!(rows = n, path, "ndjson sink: wrote to file");
        Ok(n)
    } else {
        Err(format!("Unknown sink: {sink_spec}. Use 'ndjson' or 'ndjson:/path'").into())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.format, &cli.data, cli.lenient);
    let mut registry = Registry::new();

    match cli.command {
        Commands::Demo => {
            for user in sample_users()? {
                registry.add_user(user);
            }
            for resource in builtin_resources() {
                registry.add_resource(resource);
            }

            for name in ["Library", "Server"] {
                let resource = registry.resource(name)?;
                print!("{}", AccessReport::build(&registry, resource).render());
            }

            println!("Saving data to file: {}", cli.data.display());
            save_registry(&registry, store.as_ref())?;
            println!("Data saved successfully!");

            load_registry(&mut registry, store.as_ref())?;
            registry.sort_by_access_level();
            print!("{}", render_directory(registry.users()));

            let query = read_query(None)?;
            print_matches(&registry, &query, &mut io::stdout())?;
        }

        Commands::Add { user } => {
            let user = user.build()?;
            ensure_storable(cli.format, &user)?;
            load_registry_or_empty(&mut registry, store.as_ref())?;
            tracing::info!(
                name = user.name(),
                id = user.id(),
                role = user.role().tag(),
                "adding user"
            );
            registry.add_user(user);
            save_registry(&registry, store.as_ref())?;
        }

        Commands::List { sorted } => {
            load_registry(&mut registry, store.as_ref())?;
            if sorted {
                registry.sort_by_access_level();
            }
            print!("{}", render_directory(registry.users()));
        }

        Commands::Search { query } => {
            load_registry(&mut registry, store.as_ref())?;
            let query = read_query(query)?;
            print_matches(&registry, &query, &mut io::stdout())?;
        }

        Commands::Check { resources, sink } => {
            load_registry(&mut registry, store.as_ref())?;
            for resource in builtin_resources() {
                registry.add_resource(resource);
            }

            let mut reports = Vec::with_capacity(resources.len());
            for arg in resources {
                let resource = match arg {
                    ResourceArg::Named(name) => registry.resource(&name)?.clone(),
                    ResourceArg::Explicit(resource) => resource,
                };
                reports.push(AccessReport::build(&registry, &resource));
            }

            if let Some(ref sink_spec) = sink {
                write_sink(sink_spec, &reports)?;
                // Still print the report to stderr so it's visible.
                for report in &reports {
                    eprint!("{}", report.render());
                }
            } else {
                for report in &reports {
                    print!("{}", report.render());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_with_mixed_resources() {
        let cli = Cli::try_parse_from([
            "warden",
            "--format",
            "jsonl",
            "check",
            "-r",
            "Server",
            "-r",
            "Vault:4",
        ])
        .unwrap();
        assert_eq!(cli.format, StoreFormat::JsonLines);
        match cli.command {
            Commands::Check { resources, sink } => {
                assert!(sink.is_none());
                assert!(matches!(&resources[0], ResourceArg::Named(n) if n == "Server"));
                assert!(matches!(
                    &resources[1],
                    ResourceArg::Explicit(r) if r.name == "Vault" && r.required_access_level == 4
                ));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_resource_level() {
        assert!(parse_resource_arg("Lab:high").is_err());
        assert!(parse_resource_arg(":2").is_err());
    }

    #[test]
    fn add_student_validates() {
        let cli = Cli::try_parse_from(["warden", "add", "student", "Ann", "7", ""]).unwrap();
        let Commands::Add { user } = cli.command else {
            panic!("expected add");
        };
        assert!(user.build().is_err());
    }

    fn sample_registry() -> Registry {
        let mut reg = Registry::new();
        for user in sample_users().unwrap() {
            reg.add_user(user);
        }
        reg
    }

    #[test]
    fn search_prints_cards_or_a_miss() {
        let reg = sample_registry();

        let mut out = Vec::new();
        print_matches(&reg, "2", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Found users:\nTeacher: Petr Petrov\nID: 2\nDepartment: Informatics\nAccess level: 2\n\n"
        );

        let mut out = Vec::new();
        print_matches(&reg, "Nobody", &mut out).unwrap();
        assert_eq!(out, b"No users found\n");
    }

    #[test]
    fn csv_add_rejects_delimiters_in_fields() {
        let user = User::administrator("Smith, John", 9, 3).unwrap();
        assert!(matches!(
            ensure_storable(StoreFormat::Csv, &user),
            Err(warden_core::WardenError::Unencodable { field: "name", .. })
        ));
        assert!(ensure_storable(StoreFormat::JsonLines, &user).is_ok());

        let cli = Cli::try_parse_from(["warden", "add", "teacher", "Bob", "4", "Math,Physics"])
            .unwrap();
        let Commands::Add { user } = cli.command else {
            panic!("expected add");
        };
        assert!(ensure_storable(cli.format, &user.build().unwrap()).is_err());
    }

    #[test]
    fn ndjson_file_sink_writes_every_row() {
        let reg = sample_registry();
        let reports = [
            AccessReport::build(&reg, &Resource::new("Library", 1)),
            AccessReport::build(&reg, &Resource::new("Server", 3)),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.ndjson");
        let spec = format!("ndjson:{}", path.display());
        assert_eq!(write_sink(&spec, &reports).unwrap(), 6);

        let text = std::fs::read_to_string(&path).unwrap();
        let granted: Vec<bool> = text
            .lines()
            .map(|l| l.contains("\"granted\":true"))
            .collect();
        assert_eq!(granted, vec![true, true, true, false, false, true]);
    }

    #[test]
    fn unknown_sink_is_an_error() {
        let err = write_sink("parquet", &[]).unwrap_err();
        assert!(err.to_string().starts_with("Unknown sink: parquet"));
    }

    #[test]
    fn prompt_reads_one_trimmed_line() {
        let mut input = io::Cursor::new("  Petr Petrov \nignored\n");
        let mut out = Vec::new();
        let q = prompt_query("> ", &mut input, &mut out).unwrap();
        assert_eq!(q, "Petr Petrov");
        assert_eq!(out, b"> ");
    }
}
