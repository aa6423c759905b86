//! Rating and prediction engine for head-to-head league games. Replays results in date order,
//! evolving per-team strength (Elo, scoring rates, recent form), predicts every game from the state
//! accumulated strictly before it, and calibrates the blend of strength components against history.

#![allow(clippy::too_many_arguments)]

pub mod component;
pub mod config;
pub mod csv;
pub mod elo;
pub mod file;
pub mod game;
pub mod opt;
pub mod predict;
pub mod print;
pub mod sim;
pub mod team;
pub mod weights;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
