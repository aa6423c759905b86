//! Testing helpers.

use assert_float_eq::*;
use chrono::{Days, NaiveDate};

use crate::game::Game;

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn game(
    id: u64,
    season: u16,
    date: NaiveDate,
    home: &str,
    away: &str,
    score: (u16, u16),
) -> Game {
    Game {
        id,
        season,
        week: 1,
        date,
        home_team: home.into(),
        away_team: away.into(),
        home_score: Some(score.0),
        away_score: Some(score.1),
    }
}

pub fn unplayed(id: u64, season: u16, date: NaiveDate, home: &str, away: &str) -> Game {
    Game {
        home_score: None,
        away_score: None,
        ..game(id, season, date, home, away, (0, 0))
    }
}

/// A deterministic league: each week, every pair in a rotating round-robin meets once. Stronger
/// teams (lower index) win more often, with scores perturbed by a simple hash so that results
/// vary from week to week.
pub fn league(teams: usize, seasons: u16, weeks: u8) -> Vec<Game> {
    assert!(teams >= 2 && teams % 2 == 0, "an even number of teams is required");
    let keys: Vec<_> = (0..teams).map(|team| format!("T{team:02}")).collect();
    let mut games = vec![];
    let mut id = 0;
    for season in 0..seasons {
        let opening = date(2000 + season as i32, 9, 1);
        for week in 0..weeks {
            let kickoff = opening + Days::new(7 * week as u64);
            // circle method: team 0 stays fixed, the rest rotate
            let mut rotation: Vec<_> = (1..teams).collect();
            rotation.rotate_left(week as usize % (teams - 1));
            let mut slots = vec![0];
            slots.extend(rotation);
            for pair in 0..teams / 2 {
                let (a, b) = (slots[pair], slots[teams - 1 - pair]);
                let (home, away) = if (week as usize + pair) % 2 == 0 { (a, b) } else { (b, a) };
                let noise = hash(id) % 21;
                let home_score = 17 + (teams - home) as u16 + (noise % 7) as u16;
                let away_score = 17 + (teams - away) as u16 + (noise / 3) as u16;
                games.push(Game {
                    id,
                    season: 2000 + season,
                    week: week + 1,
                    date: kickoff,
                    home_team: keys[home].clone(),
                    away_team: keys[away].clone(),
                    home_score: Some(home_score),
                    away_score: Some(away_score),
                });
                id += 1;
            }
        }
    }
    games
}

fn hash(value: u64) -> u64 {
    let mut x = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
