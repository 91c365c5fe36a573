//! Randomized checks of the counting, lumping and aggregation invariants.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tally_data::Table;
use std::collections::BTreeMap;
use tally_recode::{
    CategoryMap, FrequencyTable, GroupBy, LumpRule, OrdinalScale, Rule, lump, lump_column,
};

const CURRENCIES: &[&str] = &[
    "USD", "usd", " Usd ", "CAD", "cad", "GBP", "EUR", "AUD", "NZD", "JPY", "CHF", "$", "dollars",
];

fn random_answers(rng: &mut StdRng, n: usize) -> Vec<String> {
    (0..n)
        .map(|_| CURRENCIES.choose(rng).map_or_else(String::new, |s| s.to_string()))
        .collect()
}

fn currency_map() -> CategoryMap {
    CategoryMap::new(vec![
        Rule::exact("usd", "USD"),
        Rule::exact("cad", "CAD"),
        Rule::exact("gbp", "GBP"),
        Rule::exact("eur", "EUR"),
        Rule::any_of(["aud", "nzd"], "AUD/NZD"),
    ])
    .unwrap()
}

#[test]
fn test_counts_sum_to_total() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let n = rng.gen_range(0..500);
        let answers = random_answers(&mut rng, n);
        let freq = currency_map().frequencies(&answers);
        let sum: u64 = freq.entries().iter().map(|e| e.count).sum();
        assert_eq!(sum, n as u64);
        assert_eq!(freq.total(), n as u64);
    }
}

#[test]
fn test_normalization_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(11);
    let answers = random_answers(&mut rng, 300);
    let map = currency_map();

    let first: Vec<&str> = answers.iter().map(|a| map.normalize(a)).collect();
    let second: Vec<&str> = answers.iter().map(|a| map.normalize(a)).collect();
    assert_eq!(first, second);

    let labels = map.labels();
    assert!(first.iter().all(|label| labels.contains(label)));
}

#[test]
fn test_lumping_preserves_total_and_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..50 {
        let categories = rng.gen_range(1..30);
        let freq = FrequencyTable::from_counts(
            (0..categories).map(|i| (format!("cat{i}"), rng.gen_range(0..200u64))),
        );
        let rule = match rng.gen_range(0..3) {
            0 => LumpRule::MinCount(rng.gen_range(0..150)),
            1 => LumpRule::TopN(rng.gen_range(0..categories + 2)),
            _ => LumpRule::MinProportion(rng.gen_range(0.0..=1.0)),
        };

        let once = lump(&freq, rule);
        let twice = lump(&once, rule);
        assert_eq!(once.total(), freq.total(), "{rule:?}");
        assert_eq!(once, twice, "{rule:?}");
        assert!(once.len() <= freq.len() + 1);
    }
}

#[test]
fn test_lump_column_keeps_row_count() {
    let mut rng = StdRng::seed_from_u64(5);
    let answers = random_answers(&mut rng, 200);
    let table = Table::from_rows(["currency"], answers.iter().map(|a| [a.as_str()])).unwrap();

    let lumped = lump_column(&table, "currency", LumpRule::TopN(3)).unwrap();
    assert_eq!(lumped.len(), table.len());

    let before = FrequencyTable::from_values(table.column_values("currency").unwrap().flatten());
    let after = FrequencyTable::from_values(lumped.column_values("currency").unwrap().flatten());
    assert_eq!(before.total(), after.total());
    assert!(after.len() <= 4);
}

#[test]
fn test_proportions_sum_to_one_per_cell() {
    let mut rng = StdRng::seed_from_u64(42);
    let years = ["1990", "2000", "2010"];
    let sexes = ["F", "M"];
    let names = ["Anna", "Ben", "Cara", "Dan", "Eve"];

    let rows: Vec<[String; 4]> = (0..400)
        .map(|_| {
            [
                years[rng.gen_range(0..years.len())].to_string(),
                sexes[rng.gen_range(0..sexes.len())].to_string(),
                names[rng.gen_range(0..names.len())].to_string(),
                rng.gen_range(0..50u64).to_string(),
            ]
        })
        .collect();
    let table = Table::from_rows(
        ["year", "sex", "name", "n"],
        rows.iter().map(|r| r.each_ref().map(String::as_str)),
    )
    .unwrap();

    let (summary, issues) = GroupBy::new(["year", "sex", "name"])
        .within(["year", "sex"])
        .weighted("n")
        .run(&table)
        .unwrap();

    assert!(issues.is_empty());
    for (cell, sum) in summary.proportion_sums() {
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        assert!(summary.cell_totals()[&cell] > 0);
    }
    assert!(summary.rows().iter().all(|row| row.count > 0));
}

#[test]
fn test_cumulative_proportions_rise_to_one_per_cell() {
    let levels = ["Strongly disagree", "Disagree", "Neutral", "Agree", "Strongly agree"];
    let temps = ["cold", "warm"];
    let contacts = ["no", "yes"];

    for seed in [1, 2, 3, 99] {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows: Vec<[String; 4]> = (0..rng.gen_range(1..300))
            .map(|_| {
                [
                    temps[rng.gen_range(0..temps.len())].to_string(),
                    contacts[rng.gen_range(0..contacts.len())].to_string(),
                    levels[rng.gen_range(0..levels.len())].to_string(),
                    rng.gen_range(0..20u64).to_string(),
                ]
            })
            .collect();
        let table = Table::from_rows(
            ["temp", "contact", "rating", "n"],
            rows.iter().map(|r| r.each_ref().map(String::as_str)),
        )
        .unwrap();

        let (summary, _) = GroupBy::new(["temp", "contact", "rating"])
            .within(["temp", "contact"])
            .weighted("n")
            .ordinal(OrdinalScale::new(levels).unwrap())
            .run(&table)
            .unwrap();

        let mut cells: BTreeMap<Vec<String>, Vec<(usize, f64)>> = BTreeMap::new();
        for row in summary.rows() {
            let rank = levels.iter().position(|l| *l == row.key[2]).unwrap();
            cells
                .entry(summary.cell_of(row))
                .or_default()
                .push((rank, row.cumulative.unwrap()));
        }

        for (cell, steps) in cells {
            for pair in steps.windows(2) {
                assert!(pair[0].0 < pair[1].0, "seed {seed}, cell {cell:?}: levels out of order");
                assert!(pair[0].1 <= pair[1].1, "seed {seed}, cell {cell:?}: cumulative fell");
            }
            let (_, last) = steps[steps.len() - 1];
            assert_relative_eq!(last, 1.0, epsilon = 1e-9);
        }
    }
}
