/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! CLI driver exercising the `dirtree` API -- not part of the core
//! (spec.md §6's "test/driver entry point").
//!
//! Grounded on `diffuzzer`'s `main.rs`/`args.rs` for the overall shape
//! (`clap::Parser` args, `log4rs::init_file`, `anyhow::Context` on fallible
//! setup steps) and on `examples/original_source/main.c`'s
//! `simple_tree_test` for the `demo` subcommand's scripted sequence of
//! operations.

use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dirtree::config::StressConfig;
use dirtree::Tree;
use log::info;
use rand::Rng;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to stress-test configuration file in TOML format
    #[arg(long, default_value_t = String::from("./config.toml"))]
    config_path: String,

    #[clap(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab_case")]
enum Mode {
    /// List a directory's children
    List { path: String },
    /// Create a directory
    Create { path: String },
    /// Remove an empty directory
    Remove { path: String },
    /// Move (and rename) a subtree
    Move { source: String, target: String },
    /// Run the scripted demo from the original C driver
    Demo,
    /// Run the concurrent stress scenario (spec.md §8 scenario 6)
    Stress,
}

fn main() {
    if let Err(err) = run() {
        log::error!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default()).with_context(|| "failed to init logger")?;
    info!("init logger");

    let args = Args::parse();
    match args.mode {
        Mode::List { path } => {
            let tree = Tree::new();
            match tree.list(&path) {
                Some(listing) => println!("{listing}"),
                None => println!("not found"),
            }
        }
        Mode::Create { path } => {
            let tree = Tree::new();
            tree.create(&path)?;
            println!("ok");
        }
        Mode::Remove { path } => {
            let tree = Tree::new();
            tree.remove(&path)?;
            println!("ok");
        }
        Mode::Move { source, target } => {
            let tree = Tree::new();
            tree.move_dir(&source, &target)?;
            println!("ok");
        }
        Mode::Demo => run_demo(),
        Mode::Stress => {
            let config = StressConfig::load(&args.config_path).unwrap_or_else(|_| {
                info!("no config file at '{}', using defaults", args.config_path);
                StressConfig::default()
            });
            run_stress(&config);
        }
    }
    Ok(())
}

/// Reproduces `examples/original_source/main.c`'s `simple_tree_test`.
fn run_demo() {
    let tree = Tree::new();

    let e1 = tree.create("/a/");
    let e2 = tree.create("/b/");
    if e1.is_err() || e2.is_err() {
        println!("e1 = {e1:?}, e2 = {e2:?}");
    }
    println!("\t{}", tree.list("/").unwrap_or_default());

    let e3 = tree.create("/a/b/");
    let e4 = tree.create("/a/c/");
    let e5 = tree.create("/a/ignored/");
    println!("\t{}", tree.list("/a/").unwrap_or_default());

    let e6 = tree.move_dir("/a/", "/b/moved/");
    if e3.is_err() || e4.is_err() || e5.is_err() || e6.is_err() {
        println!("e3 = {e3:?}, e4 = {e4:?}, e5 = {e5:?}, e6 = {e6:?}");
    }

    println!("\t{}", tree.list("/").unwrap_or_default());
    println!("\t{}", tree.list("/a/").unwrap_or_default());
    println!("\t{}", tree.list("/b/").unwrap_or_default());
    println!("\t{}", tree.list("/b/moved/").unwrap_or_default());

    let e7 = tree.remove("/b/moved/ignored/");
    if e7.is_err() {
        println!("e7 = {e7:?}");
    }
    println!("\t{}", tree.list("/b/moved/").unwrap_or_default());
}

/// Spec.md §8 scenario 6: `config.threads` threads each performing
/// `config.operations_per_thread` randomly-chosen operations over
/// `config.alphabet` up to `config.max_depth`.
fn run_stress(config: &StressConfig) {
    let tree = Arc::new(Tree::new());
    let mut handles = Vec::with_capacity(config.threads as usize);

    for id in 0..config.threads {
        let tree = Arc::clone(&tree);
        let config = config.clone();
        handles.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            for _ in 0..config.operations_per_thread {
                let path = random_path(&config, &mut rng);
                match rng.gen_range(0..4) {
                    0 => {
                        tree.list(&path);
                    }
                    1 => {
                        let _ = tree.create(&path);
                    }
                    2 => {
                        let _ = tree.remove(&path);
                    }
                    _ => {
                        let target = random_path(&config, &mut rng);
                        let _ = tree.move_dir(&path, &target);
                    }
                }
            }
            info!("stress thread {id} finished");
        }));
    }

    for handle in handles {
        handle.join().expect("stress thread panicked");
    }

    info!("stress run complete; root listing: {:?}", tree.list("/"));
}

fn random_path(config: &StressConfig, rng: &mut impl Rng) -> String {
    let depth = rng.gen_range(1..=config.max_depth.max(1));
    let alphabet: Vec<char> = config.alphabet.chars().collect();
    let mut path = String::from("/");
    for _ in 0..depth {
        let letter = alphabet[rng.gen_range(0..alphabet.len())];
        path.push(letter);
        path.push('/');
    }
    path
}
