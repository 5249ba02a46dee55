//! Validation outcomes and settings advice on whole result records.

use vpcal_core::{CalibrationResults, Project, WallField};
use vpcal_engine::{apply, recommend, run_validations, ValidationStatus};

fn good_results() -> CalibrationResults {
    CalibrationResults {
        measured_18_percent_sample: 0.18,
        max_white_delta: 1.05,
        delta_e_eotf_ramp: vec![2.0; 30],
        delta_e_rgbw: [4.0, 1.0, 1.0, 1.0],
        ..Default::default()
    }
}

fn statuses(results: &CalibrationResults) -> Vec<ValidationStatus> {
    run_validations(results).into_iter().map(|r| r.status).collect()
}

#[test]
fn clean_capture_passes_everything() {
    let report = run_validations(&good_results());
    let names: Vec<_> = report.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Measured Exposure Validation",
            "Max White vs EOTF Validation",
            "EOTF Validation",
            "Gamut Delta Validation",
        ]
    );
    assert!(report.iter().all(|r| r.status == ValidationStatus::Pass && r.message.is_empty()));
}

#[test]
fn failures_do_not_short_circuit() {
    let results = CalibrationResults {
        measured_18_percent_sample: 0.10,
        max_white_delta: 0.8,
        ..good_results()
    };
    use ValidationStatus::*;
    assert_eq!(statuses(&results), [Fail, Fail, Pass, Pass]);
}

#[test]
fn eotf_ramp_mean() {
    // the first third is ignored
    let mut ramp = vec![50.0; 10];
    ramp.extend([4.0; 20]);
    let results = CalibrationResults {
        delta_e_eotf_ramp: ramp,
        ..good_results()
    };
    assert_eq!(statuses(&results)[2], ValidationStatus::Pass);

    let results = CalibrationResults {
        delta_e_eotf_ramp: vec![6.0; 30],
        ..good_results()
    };
    assert_eq!(statuses(&results)[2], ValidationStatus::Fail);

    let results = CalibrationResults {
        delta_e_eotf_ramp: vec![],
        ..good_results()
    };
    let report = run_validations(&results);
    assert_eq!(report[2].status, ValidationStatus::Fail);
    assert!(report[2].message.contains("Insufficient samples"));
}

#[test]
fn gamut_delta_warns_when_already_close() {
    let results = CalibrationResults {
        delta_e_rgbw: [1.0; 4],
        ..good_results()
    };
    let report = run_validations(&results);
    assert_eq!(report[3].status, ValidationStatus::Warning);
    assert!(report[3].message.contains("may not need to calibrate"));

    // a reading exactly on the threshold is still close enough
    let cases = [
        ([3.0, 1.0, 1.0, 1.0], ValidationStatus::Warning),
        ([f64::NAN, 1.0, 1.0, 1.0], ValidationStatus::Warning),
        ([f64::INFINITY, 1.0, 1.0, 1.0], ValidationStatus::Pass),
        ([3.01, 1.0, 1.0, 1.0], ValidationStatus::Pass),
    ];
    for (rgbw, expected) in cases {
        let results = CalibrationResults {
            delta_e_rgbw: rgbw,
            ..good_results()
        };
        assert_eq!(statuses(&results)[3], expected, "rgbw {rgbw:?}");
    }
}

#[test]
fn exposure_and_max_white_edges() {
    for measured in [0.144, 0.225, 0.163, 0.198] {
        let results = CalibrationResults {
            measured_18_percent_sample: measured,
            ..good_results()
        };
        assert_eq!(statuses(&results)[0], ValidationStatus::Warning, "exposure {measured}");
    }

    // the sign of the delta is ignored and the tolerance is inclusive
    for max_white in [0.9, -1.05, -1.0] {
        let results = CalibrationResults {
            max_white_delta: max_white,
            ..good_results()
        };
        assert_eq!(statuses(&results)[1], ValidationStatus::Pass, "max white {max_white}");
    }
    let results = CalibrationResults {
        max_white_delta: 1.2,
        ..good_results()
    };
    assert_eq!(statuses(&results)[1], ValidationStatus::Fail);
}

#[test]
fn report_serializes_status_tokens() {
    let json = serde_json::to_string(&run_validations(&good_results())).unwrap();
    assert!(json.contains("\"status\":\"PASS\""));
}

#[test]
fn advice_reaches_verification_wall() {
    let mut project = Project::new();
    project.add_wall("Wall1").unwrap();
    project.add_verification_wall("Wall1", "Wall1_verify").unwrap();

    let results = CalibrationResults {
        eotf_linearity: vec![[0.9, 1.1, 1.0]; 30],
        max_distances: [1.2, 1.0, 1.0],
        ..Default::default()
    };
    let recs = recommend(&results);
    assert_eq!(recs[0].field, WallField::EnableEotfCorrection);
    assert!(!recs[0].value);
    assert!(recs[1].value);

    apply(&mut project, "Wall1", &recs).unwrap();
    for name in ["Wall1", "Wall1_verify"] {
        let wall = project.wall(name).unwrap();
        assert!(!wall.enable_eotf_correction());
        assert!(wall.enable_gamut_compression());
    }
}

#[test]
fn advice_for_unknown_wall_fails() {
    let mut project = Project::new();
    let recs = recommend(&CalibrationResults::default());
    assert!(apply(&mut project, "Nope", &recs).is_err());
}
