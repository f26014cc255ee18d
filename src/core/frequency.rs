use crate::models::{year_month, Frequency, Observation, ObservationSeries};
use chrono::{Datelike, NaiveDate};

/// Running state of the greedy downsampling pass.
#[derive(Debug, Default)]
struct FilterState {
    kept: Vec<Observation>,
    last_kept: Option<NaiveDate>,
}

impl FilterState {
    fn keep(mut self, obs: Observation) -> Self {
        self.last_kept = Some(obs.date);
        self.kept.push(obs);
        self
    }
}

/// Whether `date` is far enough from the last kept date to be kept at `frequency`.
fn far_enough(last: NaiveDate, date: NaiveDate, frequency: Frequency) -> bool {
    match frequency {
        Frequency::Daily => true,
        Frequency::Weekly => (date - last).num_days() >= 7,
        Frequency::Monthly => year_month(date) != year_month(last),
        Frequency::Quarterly => {
            let months = (date.year() - last.year()) * 12 + date.month() as i32 - last.month() as i32;
            months >= 3
        }
        Frequency::Annual => date.year() != last.year(),
    }
}

/// Downsamples observations (sorted ascending) to a reporting frequency.
///
/// The first observation is always kept; each later one is kept only when it
/// is far enough from the last *kept* point, not the last seen one. Daily or
/// unspecified frequency returns the input unchanged.
pub fn filter_by_frequency(observations: &[Observation], frequency: Option<Frequency>) -> Vec<Observation> {
    let frequency = match frequency {
        None | Some(Frequency::Daily) => return observations.to_vec(),
        Some(f) => f,
    };

    observations
        .iter()
        .fold(FilterState::default(), |state, obs| match state.last_kept {
            Some(last) if !far_enough(last, obs.date, frequency) => state,
            _ => state.keep(*obs),
        })
        .kept
}

impl ObservationSeries {
    pub fn filter_by_frequency(&self, frequency: Option<Frequency>) -> ObservationSeries {
        filter_by_frequency(&self.to_observations(), frequency)
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(start: NaiveDate, days: u64) -> Vec<Observation> {
        (0..days)
            .map(|i| Observation::new(start + chrono::Days::new(i), i as f64))
            .collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_daily_and_none_are_identity() {
        let obs = daily(d(2024, 1, 1), 10);
        assert_eq!(filter_by_frequency(&obs, None), obs);
        assert_eq!(filter_by_frequency(&obs, Some(Frequency::Daily)), obs);
    }

    #[test]
    fn test_weekly_chains_from_kept_points() {
        // Gaps of 4 days: kept points must be >= 7 days from the previous kept one,
        // so every other point survives (0, 8, 16, ...).
        let obs: Vec<Observation> = (0..10)
            .map(|i| Observation::new(d(2024, 1, 1) + chrono::Days::new(i * 4), i as f64))
            .collect();
        let kept = filter_by_frequency(&obs, Some(Frequency::Weekly));
        let values: Vec<f64> = kept.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        for pair in kept.windows(2) {
            assert!((pair[1].date - pair[0].date).num_days() >= 7);
        }
    }

    #[test]
    fn test_monthly_keeps_first_of_each_month() {
        let obs = daily(d(2024, 1, 15), 60);
        let kept = filter_by_frequency(&obs, Some(Frequency::Monthly));
        let dates: Vec<NaiveDate> = kept.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 15), d(2024, 2, 1), d(2024, 3, 1)]);
    }

    #[test]
    fn test_quarterly_uses_month_difference() {
        let obs: Vec<Observation> = (1..=12)
            .map(|m| Observation::new(d(2024, m, 1), m as f64))
            .chain(std::iter::once(Observation::new(d(2025, 1, 1), 13.0)))
            .collect();
        let kept = filter_by_frequency(&obs, Some(Frequency::Quarterly));
        let months: Vec<u32> = kept.iter().map(|o| o.date.month()).collect();
        assert_eq!(months, vec![1, 4, 7, 10, 1]);
        assert_eq!(kept.last().unwrap().date.year(), 2025);
    }

    #[test]
    fn test_annual_keeps_first_per_year() {
        let obs = vec![
            Observation::new(d(2022, 6, 1), 1.0),
            Observation::new(d(2022, 12, 1), 2.0),
            Observation::new(d(2023, 1, 1), 3.0),
            Observation::new(d(2024, 3, 1), 4.0),
        ];
        let kept = filter_by_frequency(&obs, Some(Frequency::Annual));
        let values: Vec<f64> = kept.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_output_is_strictly_increasing_subsequence() {
        let obs = daily(d(2023, 11, 20), 400);
        for freq in [Frequency::Weekly, Frequency::Monthly, Frequency::Quarterly, Frequency::Annual] {
            let kept = filter_by_frequency(&obs, Some(freq));
            assert!(!kept.is_empty());
            assert_eq!(kept[0], obs[0]);
            for pair in kept.windows(2) {
                assert!(pair[0].date < pair[1].date);
            }
            assert!(kept.iter().all(|k| obs.contains(k)));
        }
    }

    #[test]
    fn test_series_filter_keeps_parallel_arrays() {
        let series: ObservationSeries = daily(d(2024, 1, 1), 90).into_iter().collect();
        let weekly = series.filter_by_frequency(Some(Frequency::Weekly));
        assert_eq!(weekly.dates().len(), weekly.values().len());
        assert_eq!(weekly.len(), 13);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_by_frequency(&[], Some(Frequency::Monthly)).is_empty());
    }
}
