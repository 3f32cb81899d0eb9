//! Small textbook games with known equilibria.
//!
//! Used by the tests and benchmarks, and handy for trying the solver out.

use crate::games::table::{PlayerInfo, TableGame};

fn named(game: TableGame, row: &[&str], col: &[&str]) -> TableGame {
    let players = vec![
        PlayerInfo {
            name: "Row".to_string(),
            strategies: row.iter().map(|s| s.to_string()).collect(),
        },
        PlayerInfo {
            name: "Column".to_string(),
            strategies: col.iter().map(|s| s.to_string()).collect(),
        },
    ];
    match game.with_players(players) {
        Ok(game) => game,
        Err(e) => panic!("strategy names do not fit the matrix: {}", e),
    }
}

/// Two players with one strategy each. Any profile is an equilibrium.
pub fn trivial() -> TableGame {
    TableGame::bimatrix("Trivial", &[&[3]], &[&[3]])
}

/// Row wins a point when the coins match, Column wins when they differ.
///
/// The unique equilibrium is (1/2, 1/2) for both players.
pub fn matching_pennies() -> TableGame {
    named(
        TableGame::bimatrix(
            "Matching pennies",
            &[&[1, -1], &[-1, 1]],
            &[&[-1, 1], &[1, -1]],
        ),
        &["Heads", "Tails"],
        &["Heads", "Tails"],
    )
}

/// Mutual defection is the unique equilibrium.
pub fn prisoners_dilemma() -> TableGame {
    named(
        TableGame::bimatrix(
            "Prisoner's dilemma",
            &[&[3, 0], &[5, 1]],
            &[&[3, 5], &[0, 1]],
        ),
        &["Cooperate", "Defect"],
        &["Cooperate", "Defect"],
    )
}

/// Zero-sum; the unique equilibrium is uniform play.
pub fn rock_paper_scissors() -> TableGame {
    named(
        TableGame::bimatrix(
            "Rock, paper, scissors",
            &[&[0, -1, 1], &[1, 0, -1], &[-1, 1, 0]],
            &[&[0, 1, -1], &[-1, 0, 1], &[1, -1, 0]],
        ),
        &["Rock", "Paper", "Scissors"],
        &["Rock", "Paper", "Scissors"],
    )
}

/// Two pure equilibria and one mixed equilibrium, (2/3, 1/3) against
/// (1/3, 2/3).
pub fn battle_of_the_sexes() -> TableGame {
    named(
        TableGame::bimatrix(
            "Battle of the sexes",
            &[&[2, 0], &[0, 1]],
            &[&[1, 0], &[0, 2]],
        ),
        &["Opera", "Football"],
        &["Opera", "Football"],
    )
}

/// A 3x2 game where Row's third strategy strictly dominates, so the unique
/// equilibrium is (Bottom, Left).
pub fn dominant_row() -> TableGame {
    named(
        TableGame::bimatrix(
            "Dominant row",
            &[&[1, 0], &[2, 1], &[4, 3]],
            &[&[0, 2], &[3, 1], &[1, 2]],
        ),
        &["Top", "Middle", "Bottom"],
        &["Left", "Right"],
    )
}
