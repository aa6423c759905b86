//! Console tables for ratings, accuracy and optimisation results.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};
use strum::IntoEnumIterator;

use crate::component::Component;
use crate::opt::Candidate;
use crate::predict::{Confidence, Prediction};
use crate::sim::{Accuracy, Tally};
use crate::team::TeamState;

fn right(content: String) -> Cell {
    Cell::new(Styles::default().with(HAlign::Right), content.into())
}

fn tally_cells(tally: &Tally) -> Vec<Cell> {
    vec![
        right(format!("{}", tally.correct)),
        right(format!("{}", tally.decided())),
        right(format!("{:.3}", tally.accuracy())),
    ]
}

/// Teams in leaderboard order, limited to the first `top` entries.
pub fn tabulate_leaderboard(leaderboard: &[TeamState], top: usize) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(5))),
            Col::new(Styles::default().with(MinWidth(8))),
            Col::new(Styles::default().with(MinWidth(8))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(7))),
            Col::new(Styles::default().with(MinWidth(7))),
            Col::new(Styles::default().with(MinWidth(7))),
            Col::new(Styles::default().with(MinWidth(7))),
            Col::new(Styles::default().with(MinWidth(6))),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Rank".into(),
                "Team".into(),
                "Elo".into(),
                "W-L-T".into(),
                "PF/G".into(),
                "PA/G".into(),
                "Off".into(),
                "Def".into(),
                "Form".into(),
            ],
        ));
    table.push_rows(leaderboard.iter().take(top).enumerate().map(|(index, team)| {
        Row::new(
            Styles::default(),
            vec![
                right(format!("{}", index + 1)),
                team.team_key.clone().into(),
                right(format!("{:.1}", team.elo_rating)),
                format!("{}-{}-{}", team.wins, team.losses, team.ties).into(),
                right(format!("{:.1}", team.points_for_per_game())),
                right(format!("{:.1}", team.points_against_per_game())),
                right(format!("{:.1}", team.offensive_rating)),
                right(format!("{:.1}", team.defensive_rating)),
                right(format!("{:.2}", team.recent_win_rate())),
            ],
        )
    }));
    table
}

/// Hit rate per confidence bucket, followed by the overall line.
pub fn tabulate_confidence(accuracy: &Accuracy) -> Table {
    let mut table = accuracy_table("Confidence");
    for confidence in Confidence::iter() {
        let mut cells = vec![confidence.to_string().into()];
        cells.extend(tally_cells(accuracy.confidence(confidence)));
        table.push_row(Row::new(Styles::default(), cells));
    }
    push_overall(&mut table, accuracy);
    table
}

/// Hit rate per season, followed by the overall line.
pub fn tabulate_seasons(accuracy: &Accuracy) -> Table {
    let mut table = accuracy_table("Season");
    for (season, tally) in &accuracy.by_season {
        let mut cells = vec![format!("{season}").into()];
        cells.extend(tally_cells(tally));
        table.push_row(Row::new(Styles::default(), cells));
    }
    push_overall(&mut table, accuracy);
    table
}

fn accuracy_table(key_header: &str) -> Table {
    Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(12))),
            Col::new(Styles::default().with(MinWidth(8))),
            Col::new(Styles::default().with(MinWidth(8))),
            Col::new(Styles::default().with(MinWidth(9))),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                key_header.to_string().into(),
                "Correct".into(),
                "Decided".into(),
                "Accuracy".into(),
            ],
        ))
}

fn push_overall(table: &mut Table, accuracy: &Accuracy) {
    let mut cells = vec!["overall".into()];
    cells.extend(tally_cells(&accuracy.overall));
    table.push_row(Row::new(Styles::default().with(Separator(true)), cells));
}

/// One row per prediction, with the pre-game component scores alongside the pick.
pub fn tabulate_predictions(predictions: &[Prediction]) -> Table {
    let mut cols = vec![
        Col::new(Styles::default().with(MinWidth(6))),
        Col::new(Styles::default().with(MinWidth(5))),
        Col::new(Styles::default().with(MinWidth(14))),
        Col::new(Styles::default().with(MinWidth(8))),
        Col::new(Styles::default().with(MinWidth(8))),
        Col::new(Styles::default().with(MinWidth(8))),
        Col::new(
            Styles::default()
                .with(Separator(true))
                .with(MinWidth(10)),
        ),
    ];
    cols.extend(Component::iter().map(|_| Col::new(Styles::default().with(MinWidth(10)))));

    let mut header_cells = vec![
        "Game".into(),
        "Week".into(),
        "Matchup".into(),
        "Pick".into(),
        "P(pick)".into(),
        "P(home)".into(),
        "Confidence".into(),
    ];
    header_cells.extend(Component::iter().map(|component| component.to_string().into()));

    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header_cells));
    for prediction in predictions {
        let mut cells = vec![
            right(format!("{}", prediction.game_id)),
            right(format!("{}", prediction.week)),
            format!("{} @ {}", prediction.away_team, prediction.home_team).into(),
            prediction.predicted_team().to_string().into(),
            right(format!("{:.3}", prediction.pick_probability())),
            right(format!("{:.3}", prediction.home_win_probability)),
            prediction.confidence.to_string().into(),
        ];
        cells.extend(
            prediction
                .scores
                .iter()
                .map(|(_, score)| right(format!("{score:+.2}"))),
        );
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

/// Best candidates of a weight search, best first.
pub fn tabulate_candidates(candidates: &[Candidate]) -> Table {
    let mut cols = vec![Col::new(Styles::default().with(MinWidth(5)))];
    cols.extend(Component::iter().map(|_| Col::new(Styles::default().with(MinWidth(10)))));
    cols.push(Col::new(
        Styles::default().with(Separator(true)).with(MinWidth(9)),
    ));
    cols.push(Col::new(Styles::default().with(MinWidth(8))));
    cols.push(Col::new(Styles::default().with(MinWidth(8))));

    let mut header_cells = vec!["Rank".into()];
    header_cells.extend(Component::iter().map(|component| component.to_string().into()));
    header_cells.push("Accuracy".into());
    header_cells.push("Brier".into());
    header_cells.push("Decided".into());

    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header_cells));
    table.push_rows(candidates.iter().enumerate().map(|(index, candidate)| {
        let mut cells = vec![right(format!("{}", index + 1))];
        cells.extend(
            Component::iter()
                .map(|component| right(format!("{:.2}", candidate.weights[component]))),
        );
        cells.push(right(format!("{:.4}", candidate.evaluation.accuracy)));
        cells.push(right(format!("{:.4}", candidate.evaluation.brier_score)));
        cells.push(right(format!("{}", candidate.evaluation.decided)));
        Row::new(Styles::default(), cells)
    }));
    table
}
