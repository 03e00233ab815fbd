// src/commands.rs
//! Command handlers for the depsolv CLI

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use depsolv::db::models::{units_in_repo, UnitRow};
use depsolv::solver::transaction::ClassifyMode;
use depsolv::{closure, db, interpret, job_for_unit, load_units, select, Pool, Registry, Solver};
use std::fs;
use tracing::{debug, info};

use crate::cli::Cli;

/// Initialize a unit store
pub fn cmd_init(db_path: &str) -> Result<()> {
    db::init(db_path)?;
    println!("Unit store initialized at: {}", db_path);
    Ok(())
}

/// Import a JSON array of unit documents into a repo
pub fn cmd_import(file: &str, repo: &str, db_path: &str) -> Result<()> {
    let text = fs::read_to_string(file)?;
    let documents: Vec<serde_json::Value> = serde_json::from_str(&text)?;

    let mut conn = db::open(db_path)?;
    let imported = db::transaction(&mut conn, |tx| {
        let mut imported = 0usize;
        for document in &documents {
            let mut row = UnitRow::from_document(repo, document)?;
            if row.insert(tx)? {
                imported += 1;
            } else {
                debug!("unit '{}' already present in repo '{}'", row.unit_id, repo);
            }
        }
        Ok(imported)
    })?;

    println!(
        "Imported {} of {} units into repo '{}'",
        imported,
        documents.len(),
        repo
    );
    Ok(())
}

/// Load the graphs, solve an install for each requested unit, and print the
/// interpreted transaction. Returns false on a not-found name or an
/// unsatisfiable solve; the caller maps that to exit code 1.
pub fn cmd_solve(
    units: &[String],
    source_repo: &str,
    target_repo: Option<&str>,
    ignore_recommends: bool,
    db_path: &str,
) -> Result<bool> {
    let conn = db::open(db_path)?;

    let mut pool = Pool::new();
    let mut registry = Registry::new();

    let source_units = units_in_repo(&conn, source_repo)?;
    load_units(&mut pool, &mut registry, &source_units, source_repo, false)?;

    if let Some(target) = target_repo {
        let target_units = units_in_repo(&conn, target)?;
        load_units(&mut pool, &mut registry, &target_units, target, true)?;
    }

    pool.create_whatprovides();

    debug!("pool holds {} solvables", pool.node_count());
    for solvable in pool.solvables() {
        debug!("loaded solvable {}", solvable);
    }

    let mut jobs = Vec::new();
    for term in units {
        let selection = select(&pool, term);
        if !selection.is_empty() {
            jobs.extend(selection.jobs());
            continue;
        }
        // fall back to addressing the unit by its external identity
        match job_for_unit(&registry, term) {
            Ok(job) => jobs.push(job),
            Err(_) => {
                println!("{} not found", term);
                return Ok(false);
            }
        }
    }

    let mut solver = Solver::new(&pool);
    solver.set_ignore_recommended(ignore_recommends);

    let txn = match solver.solve(&jobs) {
        Ok(txn) => txn,
        Err(problems) => {
            for problem in &problems {
                println!("Found problem: {}", problem);
            }
            return Ok(false);
        }
    };

    info!(
        "solved {} jobs from repo '{}' into {} new solvables",
        jobs.len(),
        source_repo,
        txn.newsolvables().len()
    );

    println!("Installing from repo '{}' requires:", source_repo);
    for &node in txn.newsolvables() {
        match registry.unit_for(node) {
            Some(unit_id) => println!("  {} as unit: {}", pool.node(node), unit_id),
            None => println!("  {}", pool.node(node)),
        }
    }

    let report = interpret(
        &pool,
        &registry,
        &txn,
        ClassifyMode {
            obsolete_is_upgrade: true,
        },
    );
    if !report.is_empty() {
        println!();
        println!("Transaction details:");
        print!("{}", report);
    }

    Ok(true)
}

/// Print the transitive requirement closure of a unit name.
pub fn cmd_closure(unit: &str, repo: &str, db_path: &str) -> Result<bool> {
    let conn = db::open(db_path)?;

    let mut pool = Pool::new();
    let mut registry = Registry::new();
    let repo_units = units_in_repo(&conn, repo)?;
    load_units(&mut pool, &mut registry, &repo_units, repo, false)?;
    pool.create_whatprovides();

    if pool.nodes_by_name(unit).is_empty() {
        println!("{} not found", unit);
        return Ok(false);
    }

    let members = closure::closure_by_name(&pool, unit);
    println!("Closure of '{}' ({} nodes):", unit, members.len());
    for node in members {
        println!("  {}", pool.node(node));
        let graph = pool.node(node).graph;
        if let Some(files) = pool.graph(graph).meta.files(node) {
            debug!("{} carries {} file paths", pool.node(node), files.len());
        }
    }
    Ok(true)
}

/// Generate shell completions on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}
