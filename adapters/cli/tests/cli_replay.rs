use std::{fs, path::PathBuf, process::Command};

fn write_script(name: &str, contents: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::write(&path, contents).expect("failed to write run script");
    path
}

fn maze_gps() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_maze-gps"));
    let _ = command.env("RUST_LOG", "off");
    command
}

#[test]
fn replays_discovery_script_and_prints_map() {
    let script = write_script(
        "discovery.toml",
        r#"
        [maze]
        rows = 4
        columns = 4
        start_x = 1
        start_y = 1

        [[commands]]
        op = "update_position"
        step = 2

        [[commands]]
        op = "update_orientation"
        orientation = 1

        [[commands]]
        op = "update_position"
        step = 1

        [[commands]]
        op = "set_walls"
        x = 2
        y = 3
        walls = ["East"]

        [[commands]]
        op = "set_visited"
        x = 2
        y = 3

        [[commands]]
        op = "set_walls"
        x = 2
        y = 3
        walls = ["South"]
        "#,
    );

    let output = maze_gps()
        .arg(&script)
        .args(["--cell-length", "2"])
        .output()
        .expect("failed to run maze-gps");

    assert!(output.status.success(), "maze-gps should replay the script");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "pose: (2, 3) facing east");
    assert_eq!(lines[1], "# # # # #");
    assert_eq!(lines[2], "      #");
    assert_eq!(lines[3], "# # # # #");
    assert_eq!(lines.len(), 10);
}

#[test]
fn out_of_bounds_lookup_halts_with_error() {
    let script = write_script(
        "out_of_bounds.toml",
        r#"
        [[commands]]
        op = "set_visited"
        x = 7
        y = 0
        "#,
    );

    let output = maze_gps()
        .arg(&script)
        .args(["--rows", "2", "--columns", "2"])
        .output()
        .expect("failed to run maze-gps");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(
        stderr.contains("cell (7, 0) lies outside the maze of 2 rows x 2 columns"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn rejects_non_positive_dimensions() {
    let output = maze_gps()
        .args(["--rows", "0"])
        .output()
        .expect("failed to run maze-gps");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(
        stderr.contains("maze dimensions must be positive"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn rejects_maps_too_large_to_print() {
    let output = maze_gps()
        .args(["--rows", "2", "--columns", "2", "--cell-length", "3000000000"])
        .output()
        .expect("failed to run maze-gps");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(
        stderr.contains("does not fit on a surface with cell_length 3000000000"),
        "unexpected stderr: {stderr}"
    );
}
