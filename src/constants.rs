//! Constants for the `stax` application.

use nu_ansi_term::Color;

/// File name of the repository-local store, placed inside the git directory.
pub(crate) const STORE_FILE_NAME: &str = ".stax_store.toml";
/// File name of the user-global configuration, placed inside the home directory.
pub(crate) const CONFIG_FILE_NAME: &str = ".stax.toml";
/// Version written into freshly initialized stores.
pub(crate) const STORE_VERSION: &str = "1.0.0";
/// The remote used when none is given.
pub(crate) const DEFAULT_REMOTE: &str = "origin";

pub(crate) const COLORS: [Color; 6] = [
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Purple,
];

pub(crate) const FILLED_CIRCLE: char = '●';
pub(crate) const EMPTY_CIRCLE: char = '○';
pub(crate) const BOTTOM_LEFT_BOX: char = '└';
pub(crate) const LEFT_FORK_BOX: char = '├';
pub(crate) const VERTICAL_BOX: char = '│';
pub(crate) const HORIZONTAL_BOX: char = '─';

pub(crate) const INFO_GLYPH: char = 'ℹ';
pub(crate) const SUCCESS_GLYPH: char = '✓';
pub(crate) const WARN_GLYPH: char = '⚠';
pub(crate) const ERROR_GLYPH: char = '✗';
pub(crate) const VERBOSE_GLYPH: char = '→';
