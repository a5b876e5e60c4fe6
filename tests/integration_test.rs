// Integration tests for the dashboard data core over CSV files on disk
//
// Each test writes a small f1db-style data directory:
// 1. CSV sources and the region GeoJSON into a temp directory
// 2. Load them through the CSV directory loader
// 3. Run the dashboard sections and check the views they produce

use std::fs;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use f1stats::aggregate::{ConstructorMetric, ConstructorRaceScore, DriverMetric, TyreMetric};
use f1stats::data::REGIONS_FILE_NAME;
use f1stats::season::{DriverRaceStanding, FastestLapView, PodiumEntry};
use f1stats::writer::write_json_lines;
use f1stats::{
    AppConfig, CsvDirectoryLoader, Dashboard, RaceDetailsPresenter, SectionView, Source,
    StatsError, TableLoader,
};

const RACES: &str = "\
id,year,round,circuitId,officialName,courseLength,laps,distance,turns
1,2020,2,monza,Italian Grand Prix,5.793,53,306.72,11
2,2020,1,bahrain,Bahrain Grand Prix,5.412,57,308.238,15
3,2021,1,bahrain,Bahrain Grand Prix,5.412,56,308.238,15
";

const CIRCUITS: &str = "\
id,name,fullName,countryId,latitude,longitude
monza,Monza,Autodromo Nazionale di Monza,italy,45.62,9.28
bahrain,Bahrain,Bahrain International Circuit,bahrain,26.03,50.51
";

const DRIVER_STANDINGS: &str = "\
year,positionDisplayOrder,positionNumber,driverId,points
2020,1,1,alice,300
2020,2,2,bob,250
2021,1,1,bob,310
2021,2,2,alice,305
";

const RACE_RESULTS: &str = "\
year,round,positionDisplayOrder,positionNumber,driverId,driverName,constructorId,constructorName,points,polePosition
2020,1,1,1,alice,Alice Able,mercedes,Mercedes,25,true
2020,1,2,2,bob,,red-bull,Red Bull,18,false
2020,1,3,3,carol,Carol Cole,mercedes,Mercedes,15,false
2020,1,4,4,dave,Dave Dale,ferrari,Ferrari,12,false
2020,2,1,1,bob,Bob Baker,red-bull,Red Bull,25,true
2020,2,2,,alice,Alice Able,mercedes,Mercedes,0,false
";

const QUALIFYING: &str = "\
year,round,positionDisplayOrder,positionNumber,driverId,constructorId
2020,1,1,1,alice,mercedes
2020,2,1,1,alice,mercedes
2020,2,2,2,bob,red-bull
";

const CONSTRUCTOR_STANDINGS: &str = "\
year,positionDisplayOrder,positionNumber,constructorId,points
2020,1,1,mercedes,573
2020,2,2,red-bull,319
2021,1,1,red-bull,585.5
2021,20,,ferrari,0
";

const FASTEST_LAPS: &str = "\
year,round,driverId,time
2020,1,bob,1:32.014
";

const TYRES: &str = "\
id,name,totalRaceWins,totalPolePositions,totalFastestLaps
goodyear,Goodyear,368,358,362
pirelli,Pirelli,400,380,390
";

const DRIVERS: &str = "\
id,name,fullName,totalChampionshipWins
alice,Alice,Alice Able,1
bob,Bob,Bob Baker,1
carol,Carol,Carol Cole,0
";

const REGIONS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"name": "Italy"},
     "geometry": {"type": "Polygon", "coordinates": [[[6, 36], [19, 36], [19, 47], [6, 47], [6, 36]]]}}
  ]
}"#;

fn write_source(dir: &TempDir, source: Source, content: &str) {
    fs::write(dir.path().join(source.file_name()), content).unwrap();
}

/// Data directory with every source except engines
fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_source(&dir, Source::Races, RACES);
    write_source(&dir, Source::Circuits, CIRCUITS);
    write_source(&dir, Source::DriverStandings, DRIVER_STANDINGS);
    write_source(&dir, Source::RaceResults, RACE_RESULTS);
    write_source(&dir, Source::QualifyingResults, QUALIFYING);
    write_source(&dir, Source::ConstructorStandings, CONSTRUCTOR_STANDINGS);
    write_source(&dir, Source::FastestLaps, FASTEST_LAPS);
    write_source(&dir, Source::TyreManufacturers, TYRES);
    write_source(&dir, Source::Drivers, DRIVERS);
    fs::write(dir.path().join(REGIONS_FILE_NAME), REGIONS).unwrap();
    dir
}

fn dashboard(dir: &TempDir) -> Dashboard {
    let config = AppConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let loader: Arc<dyn TableLoader> = Arc::new(CsvDirectoryLoader::new(config.data_dir.clone()));
    Dashboard::new(loader, config)
}

#[tokio::test]
async fn test_season_map_from_files() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);

    let overview = dashboard.season(2020).await.ready().unwrap();

    assert_eq!(
        overview.races.iter().map(|r| r.round).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(overview.races[0].race_name, "Bahrain Grand Prix");
    assert_eq!(overview.races[1].geo_country, "Italy");
    assert_eq!(overview.races[1].course_length_label(), "5.793 km / 3.60 miles");
    // bahrain has no polygon: kept in the mapping, not highlighted
    assert!(overview.races_by_country.contains_key("bahrain"));
    assert_eq!(overview.highlighted, vec!["Italy".to_string()]);
}

#[tokio::test]
async fn test_driver_metrics_from_files() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);

    let metrics = dashboard.driver_metrics().await.ready().unwrap();

    assert_eq!(metrics.championship_wins["alice"][&2020], 1);
    assert_eq!(metrics.championship_wins["bob"][&2020], 0);
    assert_eq!(metrics.championship_wins["bob"][&2021], 1);
    assert_eq!(metrics.race_wins["alice"][&2020], 1);
    assert_eq!(metrics.race_wins["bob"][&2020], 1);
    assert_eq!(metrics.podiums["carol"][&2020], 1);
    assert_eq!(metrics.podiums["dave"][&2020], 0);
    assert_eq!(metrics.pole_positions["alice"][&2020], 2);
    assert_eq!(metrics.championship_position["alice"][&2021], 2);
    assert!(!metrics.race_wins["alice"].contains_key(&2021));
}

#[tokio::test]
async fn test_driver_comparison_follows_selection() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);
    dashboard
        .driver_selection_mut()
        .set_selection(&["BOB", "alice"])
        .unwrap();

    let series = dashboard
        .driver_comparison(DriverMetric::ChampionshipPoints)
        .await
        .ready()
        .unwrap();

    assert_eq!(series[0].entity_id, "bob");
    assert_eq!(series[0].points.len(), 2);
    assert_eq!(series[1].points[1].value, 305.);
}

#[tokio::test]
async fn test_constructor_comparison_and_selection_cap() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);
    let notifications = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&notifications);
    dashboard
        .constructor_selection_mut()
        .subscribe(move |_| *sink.lock().unwrap() += 1);

    dashboard
        .constructor_selection_mut()
        .set_selection(&["ferrari", "mercedes", "red-bull", "mclaren", "williams"])
        .unwrap();
    let rejected = dashboard.constructor_selection_mut().add("alpine");
    assert!(matches!(
        rejected,
        Err(StatsError::SelectionLimitExceeded { max: 5 })
    ));
    assert_eq!(*notifications.lock().unwrap(), 1);

    let positions = dashboard
        .constructor_comparison(ConstructorMetric::PositionNumber)
        .await
        .ready()
        .unwrap();
    let ferrari = positions.iter().find(|s| s.entity_id == "ferrari").unwrap();
    assert_eq!(ferrari.points[0].value, 13.);

    let poles = dashboard
        .constructor_comparison(ConstructorMetric::PolePositions)
        .await
        .ready()
        .unwrap();
    let red_bull = poles.iter().find(|s| s.entity_id == "red-bull").unwrap();
    assert_eq!(red_bull.points[0].value, 1.);
}

#[derive(Default)]
struct CollectingPresenter {
    fastest_lap: Option<FastestLapView>,
    podium: Vec<PodiumEntry>,
    drivers: Vec<DriverRaceStanding>,
    constructors: Vec<ConstructorRaceScore>,
}

impl RaceDetailsPresenter for CollectingPresenter {
    async fn present_fastest_lap(&mut self, view: SectionView<FastestLapView>) {
        self.fastest_lap = view.ready();
    }

    async fn present_podium(&mut self, view: SectionView<Vec<PodiumEntry>>) {
        assert!(self.fastest_lap.is_some(), "podium presented before fastest lap");
        self.podium = view.ready().unwrap_or_default();
    }

    async fn present_standings(
        &mut self,
        drivers: SectionView<Vec<DriverRaceStanding>>,
        constructors: SectionView<Vec<ConstructorRaceScore>>,
    ) {
        assert!(!self.podium.is_empty(), "standings presented before podium");
        self.drivers = drivers.ready().unwrap_or_default();
        self.constructors = constructors.ready().unwrap_or_default();
    }
}

#[tokio::test]
async fn test_race_details_from_files() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);
    let mut presenter = CollectingPresenter::default();

    dashboard.race_details(2020, 1, &mut presenter).await;

    let lap = presenter.fastest_lap.unwrap();
    assert_eq!(lap.display_name, "Bob");
    assert!((lap.seconds - 92.014).abs() < 1e-9);

    let names: Vec<&str> = presenter
        .podium
        .iter()
        .map(|p| p.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice Able", "Bob", "Carol Cole"]);

    assert_eq!(presenter.drivers.len(), 4);
    assert_eq!(presenter.constructors[0].constructor_id, "mercedes");
    assert_eq!(presenter.constructors[0].total_points, 40.);
    assert_eq!(
        presenter.constructors[0].drivers,
        vec!["Alice Able".to_string(), "Carol Cole".to_string()]
    );
}

#[tokio::test]
async fn test_sections_fail_independently() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);

    let engines = dashboard
        .engines(f1stats::aggregate::EngineMetric::SustainabilityScore)
        .await;
    assert!(matches!(engines, SectionView::Unavailable { .. }));

    let tyres = dashboard.tyres(TyreMetric::PolePositions).await.ready().unwrap();
    assert_eq!(tyres[0].name, "Pirelli");

    let champions = dashboard.champions().await.ready().unwrap();
    assert_eq!(champions.len(), 2);
}

#[tokio::test]
async fn test_missing_driver_source_fails_whole_composite() {
    let dir = data_dir();
    fs::remove_file(dir.path().join(Source::QualifyingResults.file_name())).unwrap();
    let mut dashboard = dashboard(&dir);

    match dashboard.driver_metrics().await {
        SectionView::Unavailable { message } => assert!(message.contains("qualifying results")),
        other => panic!("Expected unavailable view, got {:?}", other.is_ready()),
    }
}

#[tokio::test]
async fn test_export_metric_rows_as_json_lines() {
    let dir = data_dir();
    let mut dashboard = dashboard(&dir);
    let metrics = dashboard.driver_metrics().await.ready().unwrap();
    let output = dir.path().join("metrics.jsonl");

    let written = write_json_lines(&output, &metrics.rows()).unwrap();

    let content = fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), written);
    assert!(content.lines().all(|line| line.starts_with('{')));
}
