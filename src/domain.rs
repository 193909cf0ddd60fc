use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use clap::Parser;
use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::pipeline::SortKey;

#[derive(Debug)]
pub enum DashError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    PageOutOfRange { requested: usize, total: usize },
    UnknownField(String),
    InvalidFilter(String),
}

impl From<Error> for DashError {
    fn from(err: Error) -> Self {
        DashError::IoError(err)
    }
}

impl From<PolarsError> for DashError {
    fn from(err: PolarsError) -> Self {
        DashError::PolarsError(err)
    }
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::IoError(e) => write!(f, "I/O error: {e}"),
            DashError::PolarsError(e) => write!(f, "Could not read data: {e}"),
            DashError::LoadingFailed(reason) => write!(f, "Loading failed: {reason}"),
            DashError::FileNotFound => write!(f, "File not found"),
            DashError::PermissionDenied => write!(f, "Permission denied"),
            DashError::UnknownFileType => {
                write!(f, "Unknown file type, expected csv, parquet or arrow")
            }
            DashError::PageOutOfRange { requested, total } => {
                write!(f, "Page {requested} is out of range 1..={total}")
            }
            DashError::UnknownField(name) => write!(f, "Unknown field \"{name}\""),
            DashError::InvalidFilter(input) => {
                write!(f, "Invalid filter \"{input}\", expected field=pattern")
            }
        }
    }
}

impl std::error::Error for DashError {}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(version, about = "A tui based project dashboard.")]
pub struct Args {
    /// Load projects from a csv, parquet or arrow file instead of the built-in list
    #[arg(short, long, value_name = "PATH")]
    pub data: Option<String>,

    /// Event poll time in milliseconds
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Upper limit for the rendered width of a column
    #[arg(long, default_value_t = 32)]
    pub max_column_width: usize,

    /// Log file, defaults to pdash.log in the temp directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when PDASH_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct DashConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            event_poll_time: 100,
            max_column_width: 32,
        }
    }
}

impl DashConfig {
    pub fn from_args(args: &Args) -> Self {
        DashConfig::default()
            .with_event_poll_time(args.poll_ms)
            .with_max_column_width(args.max_column_width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CMDMode {
    Search,
    Filter,
}

impl CMDMode {
    pub fn prompt(self) -> &'static str {
        match self {
            CMDMode::Search => "/",
            CMDMode::Filter => "filter (field=pattern): ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveBeginning,
    MoveEnd,
    NextPage,
    PreviousPage,
    GotoPage(usize),
    SortBy(SortKey),
    Search,
    Filter,
    ClearFilters,
    ToggleSidebar,
    CopyRow,
    CopyEmail,
    Help,
    Exit,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
Navigation
  j / k, ↓ / ↑      move selection
  g / G             first / last row of the page
  l / h, → / ←      next / previous page
  PgDn / PgUp       next / previous page
  1 .. 9            go to page

Table
  n / c / d         sort by name / country / date (again to reverse)
  /                 search all fields
  f                 filter a field, e.g. country=us (empty pattern clears)
  x                 clear all filters and the search
  b                 show / hide the sidebar

Actions
  y                 copy the selected row
  e                 copy the selected email

  ?                 this help
  Esc               close popup / cancel input
  q                 quit";
