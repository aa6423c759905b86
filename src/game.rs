//! Game records as supplied by the schedule/results feed, and their chronological ordering.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub season: u16,
    pub week: u8,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_score: Option<u16>,
    #[serde(default)]
    pub away_score: Option<u16>,
}
impl Game {
    /// A game is eligible for replay only once both scores are known.
    pub fn is_completed(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    pub fn final_score(&self) -> Option<FinalScore> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some(FinalScore { home, away }),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.final_score().map(|score| score.outcome())
    }

    /// Chronological order: by date, then by id.
    pub fn chronological(a: &Game, b: &Game) -> Ordering {
        a.date.cmp(&b.date).then(a.id.cmp(&b.id))
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} wk{} {} @ {}",
            self.id, self.season, self.week, self.away_team, self.home_team
        )?;
        if let Some(score) = self.final_score() {
            write!(f, " ({}-{})", score.away, score.home)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub home: u16,
    pub away: u16,
}
impl FinalScore {
    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            Ordering::Greater => Outcome::HomeWin,
            Ordering::Less => Outcome::AwayWin,
            Ordering::Equal => Outcome::Tie,
        }
    }

    pub fn margin(&self) -> u16 {
        self.home.abs_diff(self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Tie,
}
impl Outcome {
    /// Actual score for the home side in Elo terms: 1 for a win, ½ for a tie, 0 for a loss.
    pub fn home_points(&self) -> f64 {
        match self {
            Outcome::HomeWin => 1.0,
            Outcome::Tie => 0.5,
            Outcome::AwayWin => 0.0,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::HomeWin => Some(Side::Home),
            Outcome::AwayWin => Some(Side::Away),
            Outcome::Tie => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// Sorts games chronologically, in place. The sort is stable, so games sharing a date and an id
/// keep their supplied order.
pub fn sort_chronologically(games: &mut [Game]) {
    games.sort_by(Game::chronological);
}

/// A game list held in chronological order. Sorting happens once, on construction, so the same
/// schedule can be replayed any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    games: Vec<Game>,
}
impl Schedule {
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn completed(&self) -> impl Iterator<Item = &Game> {
        self.games.iter().filter(|game| game.is_completed())
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &Game> {
        self.games.iter().filter(|game| !game.is_completed())
    }

    /// Distinct seasons, in ascending order.
    pub fn seasons(&self) -> Vec<u16> {
        let mut seasons: Vec<_> = self.games.iter().map(|game| game.season).collect();
        seasons.sort_unstable();
        seasons.dedup();
        seasons
    }

    /// Retains only the games for which `predicate` holds.
    pub fn retain(&mut self, predicate: impl FnMut(&Game) -> bool) {
        self.games.retain(predicate);
    }
}

impl From<Vec<Game>> for Schedule {
    fn from(mut games: Vec<Game>) -> Self {
        sort_chronologically(&mut games);
        Self { games }
    }
}

impl FromIterator<Game> for Schedule {
    fn from_iter<I: IntoIterator<Item = Game>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: u64, date: (i32, u32, u32)) -> Game {
        Game {
            id,
            season: 2023,
            week: 1,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            home_team: "KC".into(),
            away_team: "DET".into(),
            home_score: Some(20),
            away_score: Some(21),
        }
    }

    #[test]
    fn outcome_by_strict_comparison() {
        assert_eq!(Outcome::HomeWin, FinalScore { home: 30, away: 10 }.outcome());
        assert_eq!(Outcome::AwayWin, FinalScore { home: 9, away: 10 }.outcome());
        assert_eq!(Outcome::Tie, FinalScore { home: 20, away: 20 }.outcome());
        assert_eq!(20, FinalScore { home: 10, away: 30 }.margin());
    }

    #[test]
    fn completed_requires_both_scores() {
        let mut game = game(1, (2023, 9, 7));
        assert!(game.is_completed());
        assert_eq!(Some(Outcome::AwayWin), game.outcome());

        game.home_score = None;
        assert!(!game.is_completed());
        assert_eq!(None, game.outcome());
    }

    #[test]
    fn chronological_by_date_then_id() {
        let mut games = vec![
            game(3, (2023, 9, 10)),
            game(2, (2023, 9, 10)),
            game(9, (2023, 9, 7)),
        ];
        sort_chronologically(&mut games);
        let ids: Vec<_> = games.iter().map(|game| game.id).collect();
        assert_eq!(vec![9, 2, 3], ids);
    }

    #[test]
    fn schedule_is_ordered() {
        let mut unplayed = game(4, (2023, 9, 14));
        unplayed.home_score = None;
        let mut later_season = game(1, (2024, 9, 5));
        later_season.season = 2024;
        let schedule = Schedule::from(vec![
            later_season,
            unplayed,
            game(3, (2023, 9, 10)),
            game(2, (2023, 9, 10)),
        ]);
        let ids: Vec<_> = schedule.games().iter().map(|game| game.id).collect();
        assert_eq!(vec![2, 3, 4, 1], ids);
        assert_eq!(3, schedule.completed().count());
        assert_eq!(vec![4], schedule.upcoming().map(|game| game.id).collect::<Vec<_>>());
        assert_eq!(vec![2023, 2024], schedule.seasons());
    }

    #[test]
    fn display() {
        assert_eq!("#1 2023 wk1 DET @ KC (21-20)", format!("{}", game(1, (2023, 9, 7))));
    }

    #[test]
    fn deserialize_unplayed() {
        let json = r#"{"id": 7, "season": 2024, "week": 3, "date": "2024-09-22",
            "home_team": "BUF", "away_team": "JAX"}"#;
        let game: Game = serde_json::from_str(json).unwrap();
        assert_eq!(NaiveDate::from_ymd_opt(2024, 9, 22).unwrap(), game.date);
        assert!(!game.is_completed());
    }
}
