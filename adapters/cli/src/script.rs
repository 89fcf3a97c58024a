use std::{fs, path::Path};

use anyhow::{Context, Result};
use maze_gps_core::Command;
use serde::Deserialize;

const DEFAULT_ROWS: i32 = 6;
const DEFAULT_COLUMNS: i32 = 6;

/// Run script replayed against a fresh maze state.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RunScript {
    /// Construction parameters; command-line flags take precedence.
    #[serde(default)]
    pub(crate) maze: MazeSettings,
    /// Commands applied in order.
    #[serde(default)]
    pub(crate) commands: Vec<Command>,
}

impl RunScript {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run script at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse run script at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid run script toml")
    }
}

/// Partially specified construction parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct MazeSettings {
    pub(crate) rows: Option<i32>,
    pub(crate) columns: Option<i32>,
    pub(crate) start_x: Option<i32>,
    pub(crate) start_y: Option<i32>,
    pub(crate) orientation: Option<i32>,
    pub(crate) cell_length: Option<u32>,
}

impl MazeSettings {
    /// Fills unset values from `fallback`.
    #[must_use]
    pub(crate) fn or(self, fallback: MazeSettings) -> Self {
        Self {
            rows: self.rows.or(fallback.rows),
            columns: self.columns.or(fallback.columns),
            start_x: self.start_x.or(fallback.start_x),
            start_y: self.start_y.or(fallback.start_y),
            orientation: self.orientation.or(fallback.orientation),
            cell_length: self.cell_length.or(fallback.cell_length),
        }
    }

    /// Resolves the remaining gaps with defaults.
    #[must_use]
    pub(crate) fn resolve(self, default_cell_length: u32) -> MazeConfig {
        MazeConfig {
            rows: self.rows.unwrap_or(DEFAULT_ROWS),
            columns: self.columns.unwrap_or(DEFAULT_COLUMNS),
            start_x: self.start_x.unwrap_or(0),
            start_y: self.start_y.unwrap_or(0),
            orientation: self.orientation.unwrap_or(0),
            cell_length: self.cell_length.unwrap_or(default_cell_length),
        }
    }
}

/// Fully resolved construction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MazeConfig {
    pub(crate) rows: i32,
    pub(crate) columns: i32,
    pub(crate) start_x: i32,
    pub(crate) start_y: i32,
    pub(crate) orientation: i32,
    pub(crate) cell_length: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_gps_core::{Direction, DirectionSet};

    #[test]
    fn parses_settings_and_commands() {
        let script = RunScript::parse(
            r#"
            [maze]
            rows = 4
            orientation = -1

            [[commands]]
            op = "update_position"
            step = 2

            [[commands]]
            op = "set_walls"
            x = 2
            y = 3
            walls = ["East", "South"]
            "#,
        )
        .expect("valid script");

        assert_eq!(script.maze.rows, Some(4));
        assert_eq!(script.maze.orientation, Some(-1));
        assert_eq!(script.maze.columns, None);
        assert_eq!(
            script.commands,
            vec![
                Command::UpdatePosition { step: 2 },
                Command::SetWalls {
                    x: 2,
                    y: 3,
                    walls: [Direction::East, Direction::South]
                        .into_iter()
                        .collect::<DirectionSet>(),
                },
            ]
        );
    }

    #[test]
    fn rejects_unknown_operations() {
        let error = RunScript::parse(
            r#"
            [[commands]]
            op = "teleport"
            "#,
        )
        .expect_err("unknown op must fail");

        assert!(format!("{error:#}").contains("invalid run script toml"));
    }

    #[test]
    fn flags_override_script_settings_and_defaults_fill_gaps() {
        let flags = MazeSettings {
            rows: Some(9),
            ..MazeSettings::default()
        };
        let from_script = MazeSettings {
            rows: Some(4),
            columns: Some(5),
            ..MazeSettings::default()
        };

        let config = flags.or(from_script).resolve(4);

        assert_eq!(
            config,
            MazeConfig {
                rows: 9,
                columns: 5,
                start_x: 0,
                start_y: 0,
                orientation: 0,
                cell_length: 4,
            }
        );
    }
}
