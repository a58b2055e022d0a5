use std::process::Command;

fn zonal_stats() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zonal-stats"))
}

#[test]
fn test_single_argument_exits_with_status_one() {
    let output = zonal_stats().arg("grid.tif").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {}", stderr);
    assert!(stderr.contains("you must supply two arguments"));
}

#[test]
fn test_no_arguments_exits_with_status_one() {
    let output = zonal_stats().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_extra_argument_exits_with_status_one() {
    let output = zonal_stats()
        .args(["grid.tif", "zones.shp", "extra"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_with_status_zero() {
    let output = zonal_stats().arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}
