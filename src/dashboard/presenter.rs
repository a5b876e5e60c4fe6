// Race details as an awaited sequence of presentation stages

use std::sync::Arc;

use log::debug;

use crate::aggregate::ConstructorRaceScore;
use crate::data::{Source, TableLoader, load_async};
use crate::errors::StatsError;
use crate::normalize::{FastestLap, RaceResult, typed_rows};
use crate::season::{
    DriverRaceStanding, FastestLapView, PodiumEntry, constructor_race_scores,
    driver_race_standings, fastest_lap, podium,
};

use super::SectionView;

/// Trait defining the interface for showing the details of one race.
///
/// [`run_race_details`] calls the stages in order and awaits each one before
/// starting the next: fastest lap, then podium, then both standings tables.
/// A stage whose data is missing still runs, with a placeholder view.
#[allow(async_fn_in_trait)]
pub trait RaceDetailsPresenter {
    async fn present_fastest_lap(&mut self, view: SectionView<FastestLapView>);

    async fn present_podium(&mut self, view: SectionView<Vec<PodiumEntry>>);

    async fn present_standings(
        &mut self,
        drivers: SectionView<Vec<DriverRaceStanding>>,
        constructors: SectionView<Vec<ConstructorRaceScore>>,
    );
}

/// Load the race sources and drive a presenter through the race details stages
pub async fn run_race_details<P: RaceDetailsPresenter>(
    loader: &Arc<dyn TableLoader>,
    year: i32,
    round: u32,
    presenter: &mut P,
) {
    // not try_join: each stage reports its own source failure
    let (laps, results) = tokio::join!(
        load_async(loader, Source::FastestLaps),
        load_async(loader, Source::RaceResults),
    );
    let laps: Result<Vec<FastestLap>, StatsError> =
        laps.map(|raw| typed_rows(Source::FastestLaps, &raw));
    let results: Result<Vec<RaceResult>, StatsError> =
        results.map(|raw| typed_rows(Source::RaceResults, &raw));

    debug!("Presenting fastest lap for {} round {}", year, round);
    let view: SectionView<FastestLapView> = match &laps {
        Ok(laps) => fastest_lap(laps, year, round).into(),
        Err(e) => unavailable(e),
    };
    presenter.present_fastest_lap(view).await;

    debug!("Presenting podium for {} round {}", year, round);
    let view: SectionView<Vec<PodiumEntry>> = match &results {
        Ok(results) => podium(results, year, round).into(),
        Err(e) => unavailable(e),
    };
    presenter.present_podium(view).await;

    debug!("Presenting standings for {} round {}", year, round);
    let (drivers, constructors): (
        SectionView<Vec<DriverRaceStanding>>,
        SectionView<Vec<ConstructorRaceScore>>,
    ) = match &results {
        Ok(results) => (
            driver_race_standings(results, year, round).into(),
            constructor_race_scores(results, year, round).into(),
        ),
        Err(e) => (unavailable(e), unavailable(e)),
    };
    presenter.present_standings(drivers, constructors).await;
}

fn unavailable<T>(error: &StatsError) -> SectionView<T> {
    SectionView::Unavailable {
        message: error.to_string(),
    }
}
