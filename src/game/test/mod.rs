//! Tests for the Mafia game engine, grouped by the part of the game they exercise.

#![cfg(test)]
#![allow(clippy::bool_assert_comparison)]

pub mod actions;
pub mod last_word;
pub mod test_utils;
pub mod victory_conditions;
