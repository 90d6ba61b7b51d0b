use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fireseed_types::dataset::value_kind;
use seeder::config::{SeedConfig, parse_database_url};
use seeder::tree::TreeOutcome;
use seeder::{connect, documents, input, tree};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "fireseed",
    about = "Seed a Firebase project from a local JSON file"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct SourceArgs {
    /// Dataset file (default: $FIRESEED_DATA_PATH or ./dummydata.json).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Service-account key file (default: $FIRESEED_CREDENTIALS_PATH,
    /// $GOOGLE_APPLICATION_CREDENTIALS or ./serviceAccountKey.json).
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Load the dataset and print what would be written, without touching the network.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every `collection -> document id -> body` entry to Cloud Firestore.
    ///
    /// Documents are overwritten one at a time in file order. The first failed
    /// write stops the run with a non-zero exit; earlier documents stay written.
    #[command(visible_alias = "firestore")]
    Documents {
        #[command(flatten)]
        source: SourceArgs,

        /// Firestore database id.
        #[arg(long)]
        database: Option<String>,
    },

    /// Replace the whole Realtime Database root with the dataset in one request.
    ///
    /// A failed write is logged to stderr; the exit status stays zero.
    #[command(visible_alias = "rtdb")]
    Tree {
        #[command(flatten)]
        source: SourceArgs,

        /// Database URL, e.g. https://<project>-default-rtdb.firebaseio.com.
        #[arg(long)]
        database_url: Option<String>,
    },
}

impl SourceArgs {
    fn apply(&self, config: &mut SeedConfig) {
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(credentials) = &self.credentials {
            config.credentials_path = credentials.clone();
        }
    }
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SeedConfig::from_env()?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(execute(cli.command, config))
}

async fn execute(command: Commands, mut config: SeedConfig) -> Result<()> {
    match command {
        Commands::Documents { source, database } => {
            source.apply(&mut config);
            if let Some(database) = database {
                config.firestore_database = database;
            }
            run_documents(&config, source.dry_run).await
        }
        Commands::Tree {
            source,
            database_url,
        } => {
            source.apply(&mut config);
            if let Some(url) = database_url {
                config.database_url = Some(parse_database_url(&url)?);
            }
            run_tree(&config, source.dry_run).await
        }
    }
}

async fn run_documents(config: &SeedConfig, dry_run: bool) -> Result<()> {
    let dataset = input::load_dataset(&config.data_path)?;

    if dry_run {
        let writes = dataset.plan_documents()?;
        for write in &writes {
            println!("Would upload to {}", write.path);
        }
        println!("Dry run: {} documents planned", writes.len());
        return Ok(());
    }

    let client = connect::firestore_client(config)?;
    let stats =
        documents::load_documents(&client, &dataset, |path| println!("Uploaded to {path}"))
            .await?;

    info!(
        collections = stats.collections,
        documents = stats.documents,
        "document load finished"
    );
    println!("All data uploaded!");
    Ok(())
}

async fn run_tree(config: &SeedConfig, dry_run: bool) -> Result<()> {
    let dataset = input::load_dataset(&config.data_path)?;

    if dry_run {
        println!(
            "Would overwrite / with a {} value",
            value_kind(dataset.root())
        );
        return Ok(());
    }

    let client = connect::rtdb_client(config)?;
    println!("Uploading dataset to /");
    match tree::overwrite_tree(&client, &dataset).await {
        TreeOutcome::Written => println!("Data written to /"),
        TreeOutcome::Failed(e) => error!(err = ?e, "failed to write data to /"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_with(vars: &[(&str, &str)]) -> SeedConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SeedConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    fn write_data(contents: &str) -> (TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dummydata.json");
        fs::write(&path, contents).unwrap();
        let path = path.display().to_string();
        (dir, path)
    }

    fn emulator_config(data: &str, server: &MockServer, host_var: &str) -> SeedConfig {
        let host = server.address().to_string();
        config_with(&[
            ("FIRESEED_DATA_PATH", data),
            ("FIRESEED_CREDENTIALS_PATH", "/nonexistent/serviceAccountKey.json"),
            (host_var, host.as_str()),
            ("GCLOUD_PROJECT", "demo-project"),
        ])
    }

    #[test]
    fn documents_alias_parses() {
        let parsed = Cli::try_parse_from(["fireseed", "firestore", "--dry-run"]).unwrap();
        let Commands::Documents { source, database } = parsed.command else {
            panic!("expected documents subcommand");
        };
        assert!(source.dry_run);
        assert!(database.is_none());
    }

    #[test]
    fn tree_accepts_database_url() {
        let parsed = Cli::try_parse_from([
            "fireseed",
            "rtdb",
            "--database-url",
            "https://demo.firebaseio.com",
            "--data",
            "seed.json",
        ])
        .unwrap();
        let Commands::Tree {
            source,
            database_url,
        } = parsed.command
        else {
            panic!("expected tree subcommand");
        };
        assert_eq!(source.data, Some(PathBuf::from("seed.json")));
        assert_eq!(database_url.as_deref(), Some("https://demo.firebaseio.com"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["fireseed"]).is_err());
    }

    #[tokio::test]
    async fn documents_writes_each_document_through_emulator() {
        let server = MockServer::start().await;
        for doc in ["u1", "u2"] {
            Mock::given(method("PATCH"))
                .and(path(format!(
                    "/v1/projects/demo-project/databases/(default)/documents/users/{doc}"
                )))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;
        }

        let (_dir, data) = write_data(r#"{"users": {"u1": {"name": "A"}, "u2": {"name": "B"}}}"#);
        let config = emulator_config(&data, &server, "FIRESTORE_EMULATOR_HOST");

        let command = Commands::Documents {
            source: SourceArgs::default(),
            database: None,
        };
        execute(command, config).await.unwrap();
    }

    #[tokio::test]
    async fn database_flag_reaches_request_path() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/projects/demo-project/databases/seed-db/documents/users/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, data) = write_data(r#"{"users": {"u1": {"name": "A"}}}"#);
        let config = emulator_config(&data, &server, "FIRESTORE_EMULATOR_HOST");

        let command = Commands::Documents {
            source: SourceArgs::default(),
            database: Some("seed-db".to_string()),
        };
        execute(command, config).await.unwrap();
    }

    #[tokio::test]
    async fn documents_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, data) = write_data(r#"{"users": {"u1": {}, "u2": {}}}"#);
        let config = emulator_config(&data, &server, "FIRESTORE_EMULATOR_HOST");

        let command = Commands::Documents {
            source: SourceArgs::default(),
            database: None,
        };
        let err = execute(command, config).await.unwrap_err();
        assert!(format!("{err:#}").contains("boom"));
    }

    #[tokio::test]
    async fn tree_failure_is_logged_not_returned() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/.json"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, data) = write_data(r#"{"a": 1, "b": {"c": 2}}"#);
        let config = emulator_config(&data, &server, "FIREBASE_DATABASE_EMULATOR_HOST");

        let command = Commands::Tree {
            source: SourceArgs::default(),
            database_url: None,
        };
        execute(command, config).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_input_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (_dir, data) = write_data(r#"{"users": {"u1": "#);

        let documents = Commands::Documents {
            source: SourceArgs::default(),
            database: None,
        };
        let config = emulator_config(&data, &server, "FIRESTORE_EMULATOR_HOST");
        assert!(execute(documents, config).await.is_err());

        let tree = Commands::Tree {
            source: SourceArgs::default(),
            database_url: None,
        };
        let config = emulator_config(&data, &server, "FIREBASE_DATABASE_EMULATOR_HOST");
        assert!(execute(tree, config).await.is_err());
    }

    #[tokio::test]
    async fn dry_run_needs_no_credentials() {
        let (_dir, data) = write_data(r#"{"users": {"u1": {"name": "A"}}}"#);
        let config = config_with(&[
            ("FIRESEED_DATA_PATH", data.as_str()),
            ("FIRESEED_CREDENTIALS_PATH", "/nonexistent/serviceAccountKey.json"),
        ]);

        let command = Commands::Documents {
            source: SourceArgs {
                dry_run: true,
                ..SourceArgs::default()
            },
            database: None,
        };
        execute(command, config).await.unwrap();
    }

    #[tokio::test]
    async fn flags_override_environment_paths() {
        let (_dir, data) = write_data(r#"{"a": 1}"#);
        let config = config_with(&[("FIRESEED_DATA_PATH", "/nonexistent/data.json")]);

        let command = Commands::Tree {
            source: SourceArgs {
                data: Some(PathBuf::from(&data)),
                dry_run: true,
                ..SourceArgs::default()
            },
            database_url: None,
        };
        execute(command, config).await.unwrap();
    }
}
