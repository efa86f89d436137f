//! End-to-end planning scenarios over synthetic collision fields.

use petalkin::{
    Axis, CalibrationParams, FlatPoint, JointAngles, Positioner, SpeedMode,
};
use petalplan::{
    condense, search, AngleGrid, CollisionGeometry, GridCell, Heuristic,
    NeighborPointField, PlanOutcome, Planner, PlannerConfig, Polygon, SearchParams,
    SearchResult,
};
use petalkin::AxisRange;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_calib() -> CalibrationParams {
    CalibrationParams {
        spinupdown_period: 0,
        ..Default::default()
    }
}

fn open_field() -> NeighborPointField {
    NeighborPointField::empty(FlatPoint::ZERO, 3.0, 3.0, 0.5).unwrap()
}

/// Geometry exposing an explicit blocked predicate over joint space: the
/// arm outline collapses onto the sentinel point exactly when the
/// configuration is blocked.
struct BandBlock {
    ids: Vec<u32>,
}

impl BandBlock {
    fn blocked(theta: f64, phi: f64) -> bool {
        (60.0..=120.0).contains(&phi) && theta <= 150.0
    }
}

impl CollisionGeometry for BandBlock {
    fn point_in_neighbor_sweep(&self, point: FlatPoint, tolerance: f64) -> bool {
        point.hypot() <= tolerance
    }

    fn neighbor_ids(&self) -> &[u32] {
        &self.ids
    }

    fn body_polygon_at(&self, _theta_deg: f64) -> Polygon {
        Polygon::new(vec![FlatPoint::new(1000.0, 1000.0)])
    }

    fn arm_polygon_at(&self, theta_deg: f64, phi_deg: f64) -> Polygon {
        if Self::blocked(theta_deg, phi_deg) {
            Polygon::new(vec![FlatPoint::ZERO])
        } else {
            Polygon::new(vec![FlatPoint::new(1000.0, 1000.0)])
        }
    }
}

#[test]
fn test_pure_phi_descent_condenses_to_one_leg() {
    init_logs();
    let grid = AngleGrid::new(
        AxisRange::new(0.0, 10.0),
        AxisRange::new(0.0, 180.0),
        1.0,
    )
    .unwrap();
    let start = GridCell::new(5, 170);
    let goal = GridCell::new(5, 10);
    let result = search(&grid, start, goal, &SearchParams::default()).unwrap();
    let SearchResult::PathFound(path) = result else {
        panic!("expected a path on an empty grid");
    };
    let legs = condense(&path);
    assert_eq!(legs.len(), 1, "pure phi descent must condense to one leg");
    assert_eq!(legs[0].dt, 0);
    assert_eq!(legs[0].dp, -160);
}

#[test]
fn test_open_floor_plan_is_direct() {
    init_logs();
    let planner = Planner::new(PlannerConfig::default()).unwrap();
    let positioner =
        Positioner::new(3, test_calib(), JointAngles::new(0.0, 170.0)).unwrap();
    let target = JointAngles::new(0.0, 10.0);
    let outcome = planner
        .plan_move(&positioner, target, &open_field())
        .unwrap();
    let PlanOutcome::Table(table) = outcome else {
        panic!("expected a table");
    };
    assert!(table.rows(Axis::Theta).is_empty());
    // One cruise run, a creep residual, and the backlash pair (phi descends
    // against the preferred +1 approach direction).
    let phi = table.rows(Axis::Phi);
    assert_eq!(phi[0].mode(), SpeedMode::Cruise);
    assert!(phi.len() >= 3);
    let creep_joint = test_calib().creep_step / test_calib().gear_ratio_p;
    assert!(table.expected_finish().max_abs_diff(&target) <= creep_joint);
}

#[test]
fn test_blocked_band_routes_around() {
    init_logs();
    let planner = Planner::new(PlannerConfig::default()).unwrap();
    let positioner =
        Positioner::new(4, test_calib(), JointAngles::new(0.0, 170.0)).unwrap();
    let target = JointAngles::new(0.0, 10.0);
    let geometry = BandBlock { ids: vec![9] };
    let outcome = planner.plan_move(&positioner, target, &geometry).unwrap();
    let PlanOutcome::Table(table) = outcome else {
        panic!("expected a detour table");
    };
    let creep_joint = test_calib().creep_step / test_calib().gear_ratio_p;
    assert!(table.expected_finish().max_abs_diff(&target) <= creep_joint);
    // The detour must swing theta past the gap; a direct move would not
    // touch theta at all.
    let theta_travel: f64 = table
        .rows(Axis::Theta)
        .iter()
        .map(|s| s.distance().abs())
        .sum();
    assert!(theta_travel > 100.0, "theta travel {theta_travel}");
}

#[test]
fn test_planning_is_deterministic() {
    init_logs();
    let planner = Planner::new(PlannerConfig::default()).unwrap();
    let positioner =
        Positioner::new(5, test_calib(), JointAngles::new(0.0, 170.0)).unwrap();
    let target = JointAngles::new(0.0, 10.0);
    let geometry = BandBlock { ids: vec![9] };
    let first = planner.plan_move(&positioner, target, &geometry).unwrap();
    let second = planner.plan_move(&positioner, target, &geometry).unwrap();
    let (PlanOutcome::Table(a), PlanOutcome::Table(b)) = (first, second) else {
        panic!("expected tables");
    };
    assert_eq!(a, b);
}

#[test]
fn test_fully_blocked_band_reports_no_path() {
    init_logs();

    struct FullBand;
    impl CollisionGeometry for FullBand {
        fn point_in_neighbor_sweep(&self, point: FlatPoint, tolerance: f64) -> bool {
            point.hypot() <= tolerance
        }
        fn neighbor_ids(&self) -> &[u32] {
            &[]
        }
        fn body_polygon_at(&self, _theta_deg: f64) -> Polygon {
            Polygon::new(vec![FlatPoint::new(1000.0, 1000.0)])
        }
        fn arm_polygon_at(&self, _theta_deg: f64, phi_deg: f64) -> Polygon {
            if (60.0..=120.0).contains(&phi_deg) {
                Polygon::new(vec![FlatPoint::ZERO])
            } else {
                Polygon::new(vec![FlatPoint::new(1000.0, 1000.0)])
            }
        }
    }

    let planner = Planner::new(PlannerConfig::default()).unwrap();
    let positioner =
        Positioner::new(6, test_calib(), JointAngles::new(0.0, 170.0)).unwrap();
    let outcome = planner
        .plan_move(&positioner, JointAngles::new(0.0, 10.0), &FullBand)
        .unwrap();
    assert!(matches!(outcome, PlanOutcome::NoPathFound));
}

#[test]
fn test_trial_heuristics_agree_on_open_grid() {
    init_logs();
    let grid = AngleGrid::new(
        AxisRange::new(0.0, 30.0),
        AxisRange::new(0.0, 30.0),
        1.0,
    )
    .unwrap();
    let config = PlannerConfig::default();
    let reports = petalplan::run_trials(
        &grid,
        GridCell::new(2, 2),
        GridCell::new(25, 25),
        &config,
    )
    .unwrap();
    assert!(reports.iter().all(|r| r.found));
    // The diagonal is open, so the euclidean trials condense it tightly.
    assert!(reports
        .iter()
        .filter(|r| r.heuristic == Heuristic::Euclidean)
        .all(|r| r.condensed_len <= 4));
}
