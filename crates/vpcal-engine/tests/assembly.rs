//! Stage order, sidecar output and execution of assembled pipelines.

use approx::assert_relative_eq;
use vpcal_core::{CalculationOrder, CalibrationResults, Project, WallField};
use vpcal_engine::{gamut_compression_group, Assembler, LUT_LEN};
use vpcal_lut::{clf, ProcessNode};
use vpcal_ocio::builtin::names;
use vpcal_ocio::{
    ColourBackend, Config, FixedFunctionStyle, GroupTransform, NativeBackend, Transform,
    TransformDirection, MIN_CONFIG_VERSION,
};

fn linear_results() -> CalibrationResults {
    let curve: Vec<f64> = (0..LUT_LEN)
        .map(|j| j as f64 / (LUT_LEN - 1) as f64 * 10.0)
        .collect();
    CalibrationResults {
        eotf_lut_r: curve.clone(),
        eotf_lut_g: curve.clone(),
        eotf_lut_b: curve,
        enable_eotf_correction: true,
        enable_gamut_compression: Some(false),
        max_distances: [1.1, 1.2, 1.5],
        ..Default::default()
    }
}

fn project(order: CalculationOrder) -> Project {
    let mut p = Project::new();
    p.add_wall("Wall1").unwrap();
    p.set("Wall1", WallField::CalculationOrder, order).unwrap();
    p.set("Wall1", WallField::TargetMaxLumNits, 1000_u32).unwrap();
    p
}

fn is_matrix(t: &Transform) -> bool {
    matches!(t, Transform::Matrix(_))
}

fn eotf_stages(t: &Transform) -> Vec<String> {
    let Transform::Group(g) = t else {
        panic!("expected EOTF group, got {t:?}");
    };
    g.children
        .iter()
        .map(|c| match c {
            Transform::Builtin(b) => b.style.clone(),
            Transform::File(f) => {
                assert_eq!(f.direction, TransformDirection::Inverse);
                f.src.clone()
            }
            other => panic!("unexpected stage {other:?}"),
        })
        .collect()
}

#[test]
fn cs_eotf_puts_lut_first() {
    let dir = tempfile::tempdir().unwrap();
    let p = project(CalculationOrder::ColourSpaceThenEotf);
    let results = linear_results();
    let out = Assembler::new(p.wall("Wall1").unwrap(), &results)
        .assemble(dir.path())
        .unwrap();

    let kids = &out.group.children;
    assert_eq!(kids.len(), 2);
    assert_eq!(
        eotf_stages(&kids[0]),
        [names::LINEAR_TO_ST2084, "Wall1_CS_EOTF.clf", names::ST2084_TO_LINEAR]
    );
    assert!(is_matrix(&kids[1]));

    let path = out.lut_path.unwrap();
    assert_eq!(path, dir.path().join("Wall1_CS_EOTF.clf"));
    let pl = clf::read_clf(&path).unwrap();
    assert!(matches!(&pl.nodes[0], ProcessNode::Lut1D(l) if l.size() == LUT_LEN));
}

#[test]
fn eotf_cs_puts_matrix_first() {
    let dir = tempfile::tempdir().unwrap();
    let p = project(CalculationOrder::EotfThenColourSpace);
    let results = linear_results();
    let out = Assembler::new(p.wall("Wall1").unwrap(), &results)
        .assemble(dir.path())
        .unwrap();

    let kids = &out.group.children;
    assert!(is_matrix(&kids[0]));
    assert_eq!(eotf_stages(&kids[1])[1], "Wall1_EOTF_CS.clf");
    assert!(dir.path().join("Wall1_EOTF_CS.clf").exists());
}

#[test]
fn disabled_eotf_emits_matrix_only() {
    let dir = tempfile::tempdir().unwrap();
    let p = project(CalculationOrder::ColourSpaceThenEotf);
    let results = CalibrationResults {
        enable_eotf_correction: false,
        ..linear_results()
    };
    let out = Assembler::new(p.wall("Wall1").unwrap(), &results)
        .assemble(dir.path())
        .unwrap();

    assert_eq!(out.group.len(), 1);
    assert!(is_matrix(&out.group.children[0]));
    assert!(out.lut_path.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn gamut_compression_is_prepended() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = project(CalculationOrder::EotfThenColourSpace);
    p.set("Wall1", WallField::EnableGamutCompression, true).unwrap();

    // results defer to the wall setting
    let results = CalibrationResults {
        enable_gamut_compression: None,
        ..linear_results()
    };
    let out = Assembler::new(p.wall("Wall1").unwrap(), &results)
        .assemble(dir.path())
        .unwrap();

    assert_eq!(out.group.len(), 3);
    let Transform::Group(gamut) = &out.group.children[0] else {
        panic!("expected gamut group first");
    };
    let Transform::FixedFunction(ff) = &gamut.children[1] else {
        panic!("expected compressor");
    };
    assert_eq!(ff.style, FixedFunctionStyle::AcesGamutComp13);
    assert_eq!(ff.params, [1.1, 1.2, 1.3, 0.9, 0.9, 0.9, 4.0]);
    assert!(is_matrix(&out.group.children[1]));
}

#[test]
fn yaml_hand_off_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let p = project(CalculationOrder::ColourSpaceThenEotf);
    let results = linear_results();
    let out = Assembler::new(p.wall("Wall1").unwrap(), &results)
        .assemble(dir.path())
        .unwrap();

    let yaml = out.to_yaml().unwrap();
    assert!(yaml.contains("Wall1_CS_EOTF.clf"));
    assert_eq!(GroupTransform::from_yaml(&yaml).unwrap(), out.group);
}

#[test]
fn run_executes_on_backend() {
    let dir = tempfile::tempdir().unwrap();
    let p = project(CalculationOrder::ColourSpaceThenEotf);
    let mut results = linear_results();
    results.target_to_screen_matrix = [[0.5, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    let backend = NativeBackend::new(Config::new(MIN_CONFIG_VERSION)).unwrap();
    let mut pixels = [[0.18_f32, 0.18, 0.18]];
    let out = Assembler::new(p.wall("Wall1").unwrap(), &results)
        .run(dir.path().join("out"), &backend, &mut pixels)
        .unwrap();

    assert!(out.curve_issues.is_empty());
    // linear response: the LUT is identity, only the matrix acts
    assert_relative_eq!(pixels[0][0], 0.09, epsilon = 1e-3);
    assert_relative_eq!(pixels[0][1], 0.18, epsilon = 1e-3);
}

#[test]
fn gamut_compression_pulls_ap1_pixels_in() {
    let backend = NativeBackend::new(Config::new(MIN_CONFIG_VERSION)).unwrap();
    let group = gamut_compression_group([1.2; 3]);

    // negative red: outside ACEScg, inside AP0
    let mut pixels = [[-0.1_f32, 0.8, 0.3], [0.5, 0.45, 0.48]];
    backend.execute(&group, &mut pixels).unwrap();

    assert!(pixels[0][0] > -0.01, "red not compressed: {:?}", pixels[0]);
    assert_relative_eq!(pixels[0][1], 0.8, epsilon = 1e-4);
    assert_relative_eq!(pixels[0][2], 0.3, epsilon = 1e-3);
    // in-gamut colours pass through
    assert_relative_eq!(pixels[1][0], 0.5, epsilon = 1e-4);
    assert_relative_eq!(pixels[1][1], 0.45, epsilon = 1e-4);
}
