//! Utilities for working with CSV files.
//!
//! Fields are split on commas without quoting, so team keys must not themselves contain commas.

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::ops::{Index, IndexMut};
use std::path::Path;

use chrono::NaiveDate;
use ordinalizer::Ordinal;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;

use crate::component::Component;
use crate::game::Game;
use crate::predict::Prediction;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvWriter {
    writer: BufWriter<File>,
}
impl CsvWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record.into_iter() {
            if first {
                first = false;
            } else {
                self.writer.write_all(b",")?;
            }
            self.writer.write_all(datum.as_ref().as_bytes())?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }
}

pub struct CsvReader {
    lines: Lines<BufReader<File>>,
}
impl CsvReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        let lines = BufReader::new(file).lines();
        Ok(Self { lines })
    }

    pub fn read(&mut self) -> Option<Result<Vec<String>, io::Error>> {
        self.lines.next().map(|line| {
            line.map(|line| line.split(',').map(|datum| datum.trim().to_string()).collect())
        })
    }
}

impl Iterator for CsvReader {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    items: Vec<Cow<'static, str>>,
}
impl Record {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(capacity, || Cow::Borrowed(""));
        Self { items }
    }

    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let items = values
            .into_iter()
            .map(|value| Cow::Owned(value.to_string()))
            .collect();
        Self { items }
    }

    pub fn set(&mut self, ordinal: impl Into<usize>, value: impl ToString) {
        self.items[ordinal.into()] = Cow::Owned(value.to_string())
    }
}

impl IntoIterator for Record {
    type Item = Cow<'static, str>;
    type IntoIter = std::vec::IntoIter<Cow<'static, str>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<I: Into<usize>> Index<I> for Record {
    type Output = Cow<'static, str>;

    fn index(&self, index: I) -> &Self::Output {
        &self.items[index.into()]
    }
}

impl<I: Into<usize>> IndexMut<I> for Record {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.items[index.into()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, EnumCount, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GameColumn {
    Id,
    Season,
    Week,
    Date,
    HomeTeam,
    AwayTeam,
    HomeScore,
    AwayScore,
}

impl From<GameColumn> for usize {
    fn from(column: GameColumn) -> Self {
        column.ordinal()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GameParseError {
    #[error("expected header '{expected}', got '{actual}'")]
    Header { expected: String, actual: String },

    #[error("line {line}: expected {} columns, got {actual}", GameColumn::COUNT)]
    ColumnCount { line: usize, actual: usize },

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidField {
        line: usize,
        column: GameColumn,
        value: String,
    },

    #[error("line {line}: only one of the two scores is present")]
    PartialScore { line: usize },
}

pub fn game_header() -> String {
    GameColumn::iter()
        .map(|column| column.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses one data row. `line` is the 1-based line number, used for error reporting only.
pub fn parse_game(line: usize, fields: &[String]) -> Result<Game, GameParseError> {
    if fields.len() != GameColumn::COUNT {
        return Err(GameParseError::ColumnCount {
            line,
            actual: fields.len(),
        });
    }
    let field = |column: GameColumn| fields[usize::from(column)].as_str();
    let invalid = |column: GameColumn| GameParseError::InvalidField {
        line,
        column,
        value: field(column).to_string(),
    };
    let score = |column: GameColumn| -> Result<Option<u16>, GameParseError> {
        match field(column) {
            "" => Ok(None),
            value => value.parse().map(Some).map_err(|_| invalid(column)),
        }
    };

    let id = field(GameColumn::Id).parse().map_err(|_| invalid(GameColumn::Id))?;
    let season = field(GameColumn::Season)
        .parse()
        .map_err(|_| invalid(GameColumn::Season))?;
    let week = field(GameColumn::Week)
        .parse()
        .map_err(|_| invalid(GameColumn::Week))?;
    let date = NaiveDate::parse_from_str(field(GameColumn::Date), DATE_FORMAT)
        .map_err(|_| invalid(GameColumn::Date))?;
    let home_score = score(GameColumn::HomeScore)?;
    let away_score = score(GameColumn::AwayScore)?;
    if home_score.is_some() != away_score.is_some() {
        return Err(GameParseError::PartialScore { line });
    }
    Ok(Game {
        id,
        season,
        week,
        date,
        home_team: field(GameColumn::HomeTeam).to_string(),
        away_team: field(GameColumn::AwayTeam).to_string(),
        home_score,
        away_score,
    })
}

/// Reads games from a CSV file with a [game_header] first line. Blank lines are ignored.
pub fn read_games(path: impl AsRef<Path>) -> Result<Vec<Game>, anyhow::Error> {
    let mut reader = CsvReader::open(path)?;
    let expected = game_header();
    let header = match reader.read() {
        None => return Ok(vec![]),
        Some(header) => header?.join(","),
    };
    if header != expected {
        return Err(GameParseError::Header {
            expected,
            actual: header,
        }
        .into());
    }

    let mut games = vec![];
    for (index, fields) in reader.enumerate() {
        let fields = fields?;
        if fields.iter().all(String::is_empty) {
            continue;
        }
        games.push(parse_game(index + 2, &fields)?);
    }
    Ok(games)
}

pub fn write_games(path: impl AsRef<Path>, games: &[Game]) -> Result<(), io::Error> {
    let mut writer = CsvWriter::create(path)?;
    writer.append(GameColumn::iter().map(|column| column.to_string()))?;
    for game in games {
        let mut record = Record::with_capacity(GameColumn::COUNT);
        record.set(GameColumn::Id, game.id);
        record.set(GameColumn::Season, game.season);
        record.set(GameColumn::Week, game.week);
        record.set(GameColumn::Date, game.date.format(DATE_FORMAT));
        record.set(GameColumn::HomeTeam, &game.home_team);
        record.set(GameColumn::AwayTeam, &game.away_team);
        if let (Some(home_score), Some(away_score)) = (game.home_score, game.away_score) {
            record.set(GameColumn::HomeScore, home_score);
            record.set(GameColumn::AwayScore, away_score);
        }
        writer.append(record)?;
    }
    writer.flush()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, EnumCount, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PredictionColumn {
    GameId,
    Season,
    Week,
    HomeTeam,
    AwayTeam,
    PredictedWinner,
    HomeWinProbability,
    Confidence,
    Total,
}

impl From<PredictionColumn> for usize {
    fn from(column: PredictionColumn) -> Self {
        column.ordinal()
    }
}

/// Prediction columns followed by one column per component score.
pub fn prediction_header() -> Vec<String> {
    PredictionColumn::iter()
        .map(|column| column.to_string())
        .chain(Component::iter().map(|component| component.to_string()))
        .collect()
}

pub fn prediction_record(prediction: &Prediction) -> Record {
    let mut record = Record::with_capacity(PredictionColumn::COUNT + Component::COUNT);
    record.set(PredictionColumn::GameId, prediction.game_id);
    record.set(PredictionColumn::Season, prediction.season);
    record.set(PredictionColumn::Week, prediction.week);
    record.set(PredictionColumn::HomeTeam, &prediction.home_team);
    record.set(PredictionColumn::AwayTeam, &prediction.away_team);
    record.set(PredictionColumn::PredictedWinner, prediction.predicted_team());
    record.set(
        PredictionColumn::HomeWinProbability,
        format!("{:.6}", prediction.home_win_probability),
    );
    record.set(PredictionColumn::Confidence, prediction.confidence);
    record.set(PredictionColumn::Total, format!("{:.6}", prediction.total));
    for (component, score) in prediction.scores.iter() {
        record.set(
            PredictionColumn::COUNT + component.ordinal(),
            format!("{score:.6}"),
        );
    }
    record
}

pub fn write_predictions(
    path: impl AsRef<Path>,
    predictions: &[Prediction],
) -> Result<(), io::Error> {
    let mut writer = CsvWriter::create(path)?;
    writer.append(prediction_header())?;
    for prediction in predictions {
        writer.append(prediction_record(prediction))?;
    }
    writer.flush()
}
