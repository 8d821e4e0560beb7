// Copyright (C) 2024-2026 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - project automation
//!
//! - `cargo xtask ci` runs lint, build, test and the migration check
//! - `cargo xtask verify-migrations` applies the `SQLite` migrations to a
//!   scratch database and checks the result against the Diesel schema
//!   the persistence crate compiles against

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

/// The Diesel schema the persistence crate is built against.
const DIESEL_SCHEMA: &str = include_str!("../../crates/persistence/src/diesel_schema.rs");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify the migrations match the Diesel schema and revert cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Run tests for libs and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify the `SQLite` migrations against the Diesel schema
///
/// ## What This Command Does
///
/// 1. Applies every migration to an in-memory `SQLite` database
/// 2. Introspects the result (tables, columns, types, keys)
/// 3. Parses the `table!` and `joinable!` declarations of the persistence
///    crate's `diesel_schema.rs`
/// 4. Fails on any table, column, type, nullability or primary key
///    mismatch, and on a `joinable!` with no matching foreign key
/// 5. Runs `PRAGMA foreign_key_check`
/// 6. Reverts every migration and fails if any table is left behind
/// 7. Re-applies them and expects the same schema as the first run
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {e}"))?;
    tracing::info!(count = applied.len(), "SQLite migrations applied");

    tracing::info!("Introspecting SQLite schema");
    let migrated = introspect_sqlite_schema(&mut conn)?;

    tracing::info!("Parsing Diesel schema");
    let declared = parse_diesel_schema(DIESEL_SCHEMA)?;

    tracing::info!("Comparing schemas");
    compare_schemas(&declared, &migrated)?;

    check_foreign_keys(&mut conn)?;

    tracing::info!("Reverting all migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert SQLite migrations: {e}"))?;
    let leftover = introspect_sqlite_schema(&mut conn)?;
    if !leftover.tables.is_empty() {
        let names: Vec<&String> = leftover.tables.keys().collect();
        return Err(eyre!(
            "❌ Migration check FAILED: tables left after reverting: {names:?}"
        ));
    }

    tracing::info!("Re-applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply SQLite migrations: {e}"))?;
    let reapplied = introspect_sqlite_schema(&mut conn)?;
    if reapplied != migrated {
        return Err(eyre!(
            "❌ Migration check FAILED: schema differs after revert and re-apply"
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
    }

    let mut schema = Schema::default();

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            // INTEGER PRIMARY KEY is a rowid alias and never NULL.
            let nullable: bool = col.notnull == 0 && col.pk == 0;
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
            });
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Parse the `table!` and `joinable!` blocks of a Diesel schema file
fn parse_diesel_schema(source: &str) -> Result<Schema> {
    let mut schema = Schema::default();
    let mut current: Option<(String, Table)> = None;

    for raw_line in source.lines() {
        let line: &str = raw_line.trim();

        if let Some(rest) = line.strip_prefix("diesel::joinable!(") {
            // diesel::joinable!(child -> parent (column));
            let (child, rest) = rest
                .split_once(" -> ")
                .ok_or_else(|| eyre!("Malformed joinable!: {line}"))?;
            let (parent, column) = rest
                .split_once(" (")
                .ok_or_else(|| eyre!("Malformed joinable!: {line}"))?;
            let column: &str = column.trim_end_matches(");").trim_end_matches(')');
            let table = schema
                .tables
                .get_mut(child)
                .ok_or_else(|| eyre!("joinable! names unknown table '{child}'"))?;
            table.foreign_keys.insert(ForeignKey {
                from_column: column.to_string(),
                to_table: parent.to_string(),
            });
            continue;
        }

        if line == "}" {
            if let Some((name, table)) = current.take() {
                schema.tables.insert(name, table);
            }
            continue;
        }

        match current.as_mut() {
            None => {
                // availability (availability_id) {
                if let Some((name, rest)) = line.split_once(" (")
                    && let Some(keys) = rest.strip_suffix(") {")
                    && !name.contains(' ')
                {
                    let table = Table {
                        primary_keys: keys.split(',').map(|k| k.trim().to_string()).collect(),
                        ..Table::default()
                    };
                    current = Some((name.to_string(), table));
                }
            }
            Some((name, table)) => {
                // user_id -> BigInt,
                let (column, sql_type) = line
                    .trim_end_matches(',')
                    .split_once(" -> ")
                    .ok_or_else(|| eyre!("Malformed column in table '{name}': {line}"))?;
                let (nullable, inner) = sql_type
                    .strip_prefix("Nullable<")
                    .and_then(|t| t.strip_suffix('>'))
                    .map_or((false, sql_type), |t| (true, t));
                table.columns.insert(
                    column.to_string(),
                    Column {
                        name: column.to_string(),
                        normalized_type: normalize_diesel_type(inner),
                        nullable,
                    },
                );
            }
        }
    }

    if let Some((name, _table)) = current {
        return Err(eyre!("Unterminated table! block for '{name}'"));
    }
    if schema.tables.is_empty() {
        return Err(eyre!("No table! blocks found in the Diesel schema"));
    }
    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Normalize a Diesel SQL type name to common representation
fn normalize_diesel_type(diesel_type: &str) -> String {
    match diesel_type.trim() {
        "SmallInt" | "Integer" | "BigInt" | "Bool" => "integer".to_string(),
        "Float" | "Double" => "real".to_string(),
        "Binary" => "blob".to_string(),
        _ => "text".to_string(),
    }
}

/// Compare the declared schema with the migrated one and fail on mismatch
fn compare_schemas(declared: &Schema, migrated: &Schema) -> Result<()> {
    let declared_tables: BTreeSet<_> = declared.tables.keys().collect();
    let migrated_tables: BTreeSet<_> = migrated.tables.keys().collect();

    if declared_tables != migrated_tables {
        let mut errors = Vec::new();

        for table in declared_tables.difference(&migrated_tables) {
            errors.push(format!(
                "  - Table '{table}' is declared in diesel_schema.rs but no migration creates it"
            ));
        }

        for table in migrated_tables.difference(&declared_tables) {
            errors.push(format!(
                "  - Table '{table}' is created by a migration but missing from diesel_schema.rs"
            ));
        }

        return Err(eyre!(
            "❌ Migration check FAILED: Table mismatch\n{}",
            errors.join("\n")
        ));
    }

    for table_name in declared_tables {
        let declared_table = &declared.tables[table_name];
        let migrated_table = &migrated.tables[table_name];

        let declared_columns: BTreeSet<_> = declared_table.columns.keys().collect();
        let migrated_columns: BTreeSet<_> = migrated_table.columns.keys().collect();

        if declared_columns != migrated_columns {
            let mut errors = Vec::new();

            for col in declared_columns.difference(&migrated_columns) {
                errors.push(format!("    - Column '{col}' is declared but not migrated"));
            }

            for col in migrated_columns.difference(&declared_columns) {
                errors.push(format!("    - Column '{col}' is migrated but not declared"));
            }

            return Err(eyre!(
                "❌ Migration check FAILED: Column mismatch in table '{}'\n{}",
                table_name,
                errors.join("\n")
            ));
        }

        for col_name in declared_columns {
            let declared_col = &declared_table.columns[col_name];
            let migrated_col = &migrated_table.columns[col_name];

            if declared_col.normalized_type != migrated_col.normalized_type {
                return Err(eyre!(
                    "❌ Migration check FAILED: Type mismatch in table '{}', column '{}'\n  Diesel: {}\n  SQLite: {}",
                    table_name,
                    col_name,
                    declared_col.normalized_type,
                    migrated_col.normalized_type
                ));
            }

            if declared_col.nullable != migrated_col.nullable {
                return Err(eyre!(
                    "❌ Migration check FAILED: Nullability mismatch in table '{}', column '{}'\n  Diesel nullable: {}\n  SQLite nullable: {}",
                    table_name,
                    col_name,
                    declared_col.nullable,
                    migrated_col.nullable
                ));
            }
        }

        if declared_table.primary_keys != migrated_table.primary_keys {
            return Err(eyre!(
                "❌ Migration check FAILED: Primary key mismatch in table '{}'\n  Diesel: {:?}\n  SQLite: {:?}",
                table_name,
                declared_table.primary_keys,
                migrated_table.primary_keys
            ));
        }

        // joinable! allows one edge per table pair, so the declared keys are a subset.
        for fk in &declared_table.foreign_keys {
            if !migrated_table.foreign_keys.contains(fk) {
                return Err(eyre!(
                    "❌ Migration check FAILED: joinable!({} -> {} ({})) has no matching foreign key",
                    table_name,
                    fk.to_table,
                    fk.from_column
                ));
            }
        }
    }

    Ok(())
}

/// Run `PRAGMA foreign_key_check` on the migrated database
fn check_foreign_keys(conn: &mut SqliteConnection) -> Result<()> {
    #[derive(QueryableByName)]
    struct Violation {
        #[diesel(sql_type = Text)]
        table: String,
    }

    let violations: Vec<Violation> = diesel::sql_query("PRAGMA foreign_key_check")
        .load(conn)
        .wrap_err("Failed to run foreign key check")?;

    if let Some(first) = violations.first() {
        return Err(eyre!(
            "❌ Migration check FAILED: {} foreign key violation(s), first in table '{}'",
            violations.len(),
            first.table
        ));
    }
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
diesel::table! {
    users (user_id) {
        user_id -> BigInt,
        login_name -> Text,
        last_login_at -> Nullable<Text>,
    }
}

diesel::table! {
    sessions (session_id) {
        session_id -> BigInt,
        user_id -> BigInt,
    }
}

diesel::joinable!(sessions -> users (user_id));
";

    #[test]
    fn test_parse_diesel_schema_reads_tables_and_joins() {
        let schema: Schema = parse_diesel_schema(SAMPLE).unwrap();

        assert_eq!(schema.tables.len(), 2);
        let users = &schema.tables["users"];
        assert!(users.primary_keys.contains("user_id"));
        assert!(users.columns["last_login_at"].nullable);
        assert_eq!(users.columns["user_id"].normalized_type, "integer");

        let sessions = &schema.tables["sessions"];
        assert!(sessions.foreign_keys.contains(&ForeignKey {
            from_column: String::from("user_id"),
            to_table: String::from("users"),
        }));
    }

    #[test]
    fn test_parse_diesel_schema_rejects_unknown_join() {
        let source: String = format!("{SAMPLE}\ndiesel::joinable!(orders -> users (user_id));\n");
        assert!(parse_diesel_schema(&source).is_err());
    }

    #[test]
    fn test_workspace_schema_parses() {
        let schema: Schema = parse_diesel_schema(DIESEL_SCHEMA).unwrap();
        assert!(schema.tables.contains_key("routes"));
        assert!(schema.tables.contains_key("spare_part_movements"));
    }

    #[test]
    fn test_compare_schemas_reports_missing_column() {
        let declared: Schema = parse_diesel_schema(SAMPLE).unwrap();
        let mut migrated: Schema = declared.clone();
        migrated
            .tables
            .get_mut("users")
            .unwrap()
            .columns
            .remove("last_login_at");

        let err = compare_schemas(&declared, &migrated).unwrap_err();
        assert!(err.to_string().contains("Column mismatch"));
    }
}
