use assert_float_eq::*;

use super::*;

fn score(home: u16, away: u16) -> FinalScore {
    FinalScore { home, away }
}

#[test]
fn fresh_state_is_neutral() {
    let team = TeamState::new("KC", 1500.0, 5);
    assert_eq!(0, team.games_played);
    assert_eq!(NEUTRAL_RATING, team.offensive_rating);
    assert_eq!(NEUTRAL_RATING, team.defensive_rating);
    assert_eq!(0.0, team.points_for_per_game());
    assert_eq!(0.0, team.win_rate());
    assert_eq!(0.0, team.home_win_rate());
    assert_eq!(0.0, team.away_win_rate());
    assert_eq!(0.0, team.recent_win_rate());
    assert!(team.offensive_rating.is_finite());
}

#[test]
fn apply_result_home_and_away() {
    let mut team = TeamState::new("KC", 1500.0, 5);
    team.apply_result(&score(30, 10), Side::Home);
    team.apply_result(&score(24, 20), Side::Away);
    team.apply_result(&score(17, 17), Side::Away);

    assert_eq!(3, team.games_played);
    assert_eq!((1, 1, 1), (team.wins, team.losses, team.ties));
    assert_eq!((1, 0), (team.home_wins, team.home_losses));
    assert_eq!((0, 1), (team.away_wins, team.away_losses));
    assert_eq!(30 + 20 + 17, team.points_for);
    assert_eq!(10 + 24 + 17, team.points_against);
    assert_float_absolute_eq!(0.5, team.win_rate());
    assert_float_absolute_eq!(1.0, team.home_win_rate());
    assert_float_absolute_eq!(0.0, team.away_win_rate());

    let ppg_for = 67.0 / 3.0;
    let ppg_against = 51.0 / 3.0;
    assert_float_absolute_eq!(ppg_for / POINTS_SCALE * 100.0, team.offensive_rating);
    assert_float_absolute_eq!(100.0 - ppg_against / POINTS_SCALE * 100.0, team.defensive_rating);
    assert_eq!(1500.0, team.elo_rating);
}

#[test]
fn ratings_are_bounded() {
    let mut team = TeamState::new("BAL", 1500.0, 5);
    team.apply_result(&score(70, 0), Side::Home);
    assert_eq!(100.0, team.offensive_rating);
    assert_eq!(100.0, team.defensive_rating);

    let mut team = TeamState::new("CAR", 1500.0, 5);
    team.apply_result(&score(70, 0), Side::Away);
    assert_eq!(0.0, team.offensive_rating);
    assert_eq!(0.0, team.defensive_rating);
}

#[test]
fn form_window_drops_oldest() {
    let mut window = FormWindow::new(3);
    for result in [TeamResult::Loss, TeamResult::Win, TeamResult::Win, TeamResult::Tie] {
        window.push(result);
        assert!(window.len() <= window.capacity());
    }
    let results: Vec<_> = window.iter().copied().collect();
    assert_eq!(vec![TeamResult::Win, TeamResult::Win, TeamResult::Tie], results);
    assert_float_absolute_eq!(2.5 / 3.0, window.win_rate());
}

#[test]
fn form_window_of_zero_capacity() {
    let mut window = FormWindow::new(0);
    window.push(TeamResult::Win);
    assert!(window.is_empty());
    assert_eq!(0.0, window.win_rate());
}

#[test]
fn recent_form_never_exceeds_window() {
    let mut team = TeamState::new("SF", 1500.0, 5);
    for _ in 0..12 {
        team.apply_result(&score(21, 14), Side::Home);
    }
    assert_eq!(5, team.last_n_results.len());
    assert_eq!(12, team.games_played);
}

#[test]
fn regress_toward_mean() {
    let mut team = TeamState::new("PHI", 1500.0, 5);
    team.elo_rating = 1700.0;
    team.apply_result(&score(21, 14), Side::Home);
    team.reset_for_new_period(&SeasonTransition::Regress { factor: 0.3 }, 1500.0);
    assert_float_absolute_eq!(1640.0, team.elo_rating, 1e-9);
    assert_eq!(0, team.games_played);
    assert_eq!(0, team.wins);
    assert!(team.last_n_results.is_empty());
    assert_eq!(NEUTRAL_RATING, team.offensive_rating);
}

#[test]
fn carry_forward_and_reset() {
    let mut team = TeamState::new("DAL", 1500.0, 5);
    team.elo_rating = 1620.0;
    team.apply_result(&score(10, 13), Side::Away);
    team.reset_for_new_period(&SeasonTransition::CarryForward, 1500.0);
    assert_eq!(1620.0, team.elo_rating);
    assert_eq!(0, team.points_for);

    team.reset_for_new_period(&SeasonTransition::Reset, 1500.0);
    assert_eq!(1500.0, team.elo_rating);
}

#[test]
fn transition_validation() {
    assert!(SeasonTransition::Reset.validate().is_ok());
    assert!(SeasonTransition::Regress { factor: 0.0 }.validate().is_ok());
    assert!(SeasonTransition::Regress { factor: 1.0 }.validate().is_ok());
    assert_eq!(
        "regression factor must be in the range 0..=1, got 1.5",
        SeasonTransition::Regress { factor: 1.5 }
            .validate()
            .err()
            .unwrap()
            .to_string()
    );
}

#[test]
fn store_get_or_create_is_idempotent() {
    let mut store = TeamStore::new(1500.0, 5);
    store.get_or_create("KC").elo_rating = 1550.0;
    assert_eq!(1550.0, store.get_or_create("KC").elo_rating);
    assert_eq!(1, store.len());
    assert!(store.get("BUF").is_none());
}

#[test]
fn store_pair_mut_in_either_order() {
    let mut store = TeamStore::new(1500.0, 5);
    store.get_or_create("A");
    store.get_or_create("B");
    {
        let (b, a) = store.pair_mut("B", "A");
        b.elo_rating = 1510.0;
        a.elo_rating = 1490.0;
    }
    {
        let (a, c) = store.pair_mut("A", "C");
        assert_eq!(1490.0, a.elo_rating);
        assert_eq!(1500.0, c.elo_rating);
    }
    assert_eq!(1510.0, store.get("B").unwrap().elo_rating);
    assert_eq!(3, store.len());
}

#[test]
#[should_panic = "a team cannot be paired with itself"]
fn store_pair_mut_same_team() {
    let mut store = TeamStore::new(1500.0, 5);
    store.pair_mut("A", "A");
}

#[test]
fn store_leaderboard_and_transition() {
    let mut store = TeamStore::new(1500.0, 5);
    store.get_or_create("MIA").elo_rating = 1480.0;
    store.get_or_create("BUF").elo_rating = 1600.0;
    store.get_or_create("NYJ").elo_rating = 1480.0;
    let keys: Vec<_> = store.leaderboard().into_iter().map(|team| team.team_key).collect();
    assert_eq!(vec!["BUF", "MIA", "NYJ"], keys);

    store.reset_for_new_period(&SeasonTransition::Regress { factor: 0.5 });
    assert_float_absolute_eq!(1550.0, store.get("BUF").unwrap().elo_rating);
    assert_float_absolute_eq!(1490.0, store.get("MIA").unwrap().elo_rating);
}

#[test]
fn team_result_from_outcome() {
    assert_eq!(TeamResult::Win, TeamResult::of(Outcome::HomeWin, Side::Home));
    assert_eq!(TeamResult::Loss, TeamResult::of(Outcome::HomeWin, Side::Away));
    assert_eq!(TeamResult::Win, TeamResult::of(Outcome::AwayWin, Side::Away));
    assert_eq!(TeamResult::Tie, TeamResult::of(Outcome::Tie, Side::Home));
}
