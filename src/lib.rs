//! # HelixTUI - Molecular Biology in the Terminal
//!
//! Two timed puzzles built on one simulation core: replicating a DNA double
//! helix with the right enzymes, and synthesizing a protein by transcribing
//! DNA into mRNA and translating it on a ribosome.
//!
//! ## Architecture
//!
//! The simulation is headless and deterministic; the terminal is a client:
//! - `model`, `genetic_code`: bases, codons, sequences and their generation
//! - `slots`, `validation`, `ribosome`: what can be placed where, and what it costs
//! - `stage`, `scheduler`, `scoring`: stage progression, delayed steps, score and timers
//! - `engine`: the shared core, actions, outcomes and events
//! - `replication`, `synthesis`: the two games
//! - `source`: where template sequences come from
//! - `autoplay`: scripted play-through with correct moves
//! - `app`, `event`, `ui`, `controller`: the terminal front end
//! - `config`, `logging`: tunables and tracing setup

pub mod app;
pub mod autoplay;
pub mod config;
pub mod controller;
pub mod engine;
pub mod event;
pub mod genetic_code;
pub mod logging;
pub mod model;
pub mod replication;
pub mod ribosome;
pub mod scheduler;
pub mod scoring;
pub mod slots;
pub mod source;
pub mod stage;
pub mod synthesis;
pub mod ui;
pub mod validation;
