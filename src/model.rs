use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::domain::{CMDMode, DashConfig, DashError, HELP_TEXT, Message};
use crate::inputter::{InputResult, Inputter};
use crate::pipeline::{self, DerivedPage, SortKey, SortOrder, ViewState};
use crate::records::{ProjectField, ProjectRecord};
use crate::table::SourceList;
use crate::ui::{COLUMN_WIDTH_MARGIN, PROGRESS_COLUMN_WIDTH};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

/// Fields rendered as table columns. The image is searchable but not shown.
pub const VISIBLE_FIELDS: [ProjectField; 7] = [
    ProjectField::Client,
    ProjectField::Country,
    ProjectField::Email,
    ProjectField::Project,
    ProjectField::Progress,
    ProjectField::Status,
    ProjectField::Date,
];

#[derive(Clone, Debug)]
pub struct ColumnView {
    pub name: String,
    pub field: ProjectField,
    pub width: usize,
    pub data: Vec<String>,
}

pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub progress: Vec<Option<u16>>, // Parsed progress per row of the page
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub selected_row: usize,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub filters: Vec<(ProjectField, String)>,
    pub search_query: String,
    pub sidebar_visible: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            progress: Vec::new(),
            page: 1,
            total_pages: 1,
            filtered_count: 0,
            total_count: 0,
            selected_row: 0,
            sort_key: SortKey::None,
            sort_order: SortOrder::Ascending,
            filters: Vec::new(),
            search_query: String::new(),
            sidebar_visible: true,
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: DashConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    source: SourceList,
    view: ViewState,
    page: DerivedPage,
    curser_row: usize, // Row within the current page
    sidebar_visible: bool,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(config: &DashConfig, source: SourceList) -> Self {
        let view = ViewState::default();
        let page = pipeline::derive(source.records(), &view);
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            source,
            view,
            page,
            curser_row: 0,
            sidebar_visible: true,
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        };
        let message = format!("Loaded {} projects", model.source.len());
        model.set_status_message(message);
        model.update_table_data();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    #[cfg(test)]
    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    #[cfg(test)]
    pub fn current_page(&self) -> &DerivedPage {
        &self.page
    }

    pub fn selected_record(&self) -> Option<&ProjectRecord> {
        self.page
            .rows
            .get(self.curser_row)
            .map(|&idx| &self.source.records()[idx])
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    /// Re-run the pipeline and rebuild the render snapshot.
    fn update_table_data(&mut self) {
        let start_time = Instant::now();
        self.page = pipeline::derive(self.source.records(), &self.view);

        // Filters can shrink the number of pages below the current one
        if self.view.current_page != self.page.page {
            debug!(
                "Clamped page {} to {}",
                self.view.current_page, self.page.page
            );
            self.view.current_page = self.page.page;
        }
        self.curser_row = std::cmp::min(self.curser_row, self.page.rows.len().saturating_sub(1));

        trace!(
            "Pipeline took {}us for {} records",
            start_time.elapsed().as_micros(),
            self.source.len()
        );
        self.update_uidata_for_table();
    }

    fn build_columns(&self) -> Vec<ColumnView> {
        let items = self.page.items(self.source.records());
        VISIBLE_FIELDS
            .iter()
            .map(|&field| {
                let data: Vec<String> = items.iter().map(|r| r.get(field).to_string()).collect();
                let width = Self::calculate_column_width(field, &data, self.config.max_column_width);
                ColumnView {
                    name: Self::column_title(field, self.view.sort_key, self.view.sort_order),
                    field,
                    width,
                    data,
                }
            })
            .collect()
    }

    fn column_title(field: ProjectField, key: SortKey, order: SortOrder) -> String {
        if key.field() == Some(field) {
            format!("{} {}", field.title(), order.arrow())
        } else {
            field.title().to_string()
        }
    }

    fn calculate_column_width(field: ProjectField, data: &[String], max_column_width: usize) -> usize {
        if field == ProjectField::Progress {
            return PROGRESS_COLUMN_WIDTH;
        }
        let max_width = data.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        // Room for the sort arrow in the header
        let name_width = field.title().chars().count() + 2;
        let width = std::cmp::max(name_width, max_width) + COLUMN_WIDTH_MARGIN;
        std::cmp::min(width, max_column_width)
    }

    fn update_uidata_for_table(&mut self) {
        let progress = self
            .page
            .items(self.source.records())
            .iter()
            .map(|r| r.progress_percent())
            .collect();

        self.uidata = UIData {
            name: self.source.name().to_string(),
            table: self.build_columns(),
            progress,
            page: self.page.page,
            total_pages: self.page.total_pages,
            filtered_count: self.page.filtered_count,
            total_count: self.source.len(),
            selected_row: self.curser_row,
            sort_key: self.view.sort_key,
            sort_order: self.view.sort_order,
            filters: self
                .view
                .filters
                .iter()
                .map(|(f, p)| (*f, p.clone()))
                .collect(),
            search_query: self.view.search_query.clone(),
            sidebar_visible: self.sidebar_visible,
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.uidata.popup_message.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
        };
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), DashError> {
        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(),
                    Message::MoveUp => self.move_selection_up(),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::NextPage => self.next_page(),
                    Message::PreviousPage => self.previous_page(),
                    Message::GotoPage(page) => self.goto_page(page),
                    Message::SortBy(key) => self.sort_by(key),
                    Message::Search => self.enter_cmd_mode(CMDMode::Search),
                    Message::Filter => self.enter_cmd_mode(CMDMode::Filter),
                    Message::ClearFilters => self.clear_filters(),
                    Message::ToggleSidebar => self.toggle_sidebar(),
                    Message::CopyRow => self.copy_row(),
                    Message::CopyEmail => self.copy_email(),
                    Message::Help => self.show_help(),
                    Message::Exit | Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        match self.modus {
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
                self.uidata.show_popup = false;
            }
            Modus::TABLE | Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
    }

    fn move_selection_up(&mut self) {
        self.curser_row = self.curser_row.saturating_sub(1);
        self.update_uidata_for_table();
    }

    fn move_selection_down(&mut self) {
        if self.curser_row + 1 < self.page.rows.len() {
            self.curser_row += 1;
        }
        self.update_uidata_for_table();
    }

    fn move_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.update_uidata_for_table();
    }

    fn move_selection_end(&mut self) {
        self.curser_row = self.page.rows.len().saturating_sub(1);
        self.update_uidata_for_table();
    }

    fn next_page(&mut self) {
        if self.view.next_page(self.page.total_pages) {
            self.curser_row = 0;
            self.update_table_data();
        } else {
            self.set_status_message("Already on the last page");
        }
    }

    fn previous_page(&mut self) {
        if self.view.previous_page() {
            self.curser_row = 0;
            self.update_table_data();
        } else {
            self.set_status_message("Already on the first page");
        }
    }

    fn goto_page(&mut self, page: usize) {
        match self.view.set_page(page, self.page.total_pages) {
            Ok(()) => {
                self.curser_row = 0;
                self.update_table_data();
            }
            Err(e) => {
                warn!("Rejected page change: {e}");
                self.set_status_message(e.to_string());
            }
        }
    }

    fn sort_by(&mut self, key: SortKey) {
        self.view.request_sort(key);
        debug!("Sort by {:?} {:?}", self.view.sort_key, self.view.sort_order);
        self.update_table_data();
        if let Some(field) = key.field() {
            let message = format!("Sorted by {} {}", field, self.view.sort_order.arrow());
            self.set_status_message(message);
        }
    }

    fn clear_filters(&mut self) {
        if !self.view.has_filters() {
            self.set_status_message("No filters active");
            return;
        }
        self.view.clear_filters();
        self.curser_row = 0;
        self.update_table_data();
        self.set_status_message("Cleared filters and search");
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
        self.update_uidata_for_table();
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        if mode == CMDMode::Search {
            self.input.set(&self.view.search_query);
        }
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.cmd_mode = self.cmd_mode;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
            self.uidata.cmdinput = self.last_input.clone();
            self.uidata.cmd_mode = self.cmd_mode;
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let cmd_input = self.last_input.input.clone();
        let canceled = self.last_input.canceled;
        let mode = self.cmd_mode.take();
        self.last_input = InputResult::default();

        if canceled {
            self.set_status_message("Canceled");
        } else {
            match mode {
                Some(CMDMode::Search) => self.search(&cmd_input),
                Some(CMDMode::Filter) => match Self::parse_filter(&cmd_input) {
                    Ok((field, pattern)) => self.filter(field, &pattern),
                    Err(e) => {
                        warn!("Rejected filter input: {e}");
                        self.set_status_message(e.to_string());
                    }
                },
                None => info!("Cmd mode is none!"),
            }
        }
        self.update_uidata_for_table();
    }

    /// Parses `field=pattern` or `field:pattern`. An empty pattern clears the filter.
    fn parse_filter(input: &str) -> Result<(ProjectField, String), DashError> {
        let (field, pattern) = input
            .split_once(|c: char| c == '=' || c == ':')
            .ok_or_else(|| DashError::InvalidFilter(input.to_string()))?;
        let field: ProjectField = field.parse()?;
        Ok((field, pattern.trim().to_string()))
    }

    fn search(&mut self, query: &str) {
        trace!("Starting search for {} ...", query);
        self.view.set_search(query);
        self.curser_row = 0;
        self.update_table_data();
        let message = if query.is_empty() {
            "Search cleared".to_string()
        } else if self.page.filtered_count == 0 {
            "Found no matches!".to_string()
        } else {
            format!("Found {} results", self.page.filtered_count)
        };
        self.set_status_message(message);
    }

    fn filter(&mut self, field: ProjectField, pattern: &str) {
        trace!("Filter {} by {} ...", field, pattern);
        self.view.set_filter(field, pattern);
        self.curser_row = 0;
        self.update_table_data();
        let message = if pattern.is_empty() {
            format!("Cleared {field} filter")
        } else {
            format!("{} records match {field}={pattern}", self.page.filtered_count)
        };
        self.set_status_message(message);
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',' || c == '"');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn row_as_csv(record: &ProjectRecord) -> String {
        ProjectField::ALL
            .iter()
            .map(|&f| Model::wrap_cell_content(record.get(f)))
            .collect::<Vec<String>>()
            .join(",")
    }

    fn copy_row(&mut self) {
        match self.selected_record().map(Model::row_as_csv) {
            Some(row) => self.copy_to_clipboard(row, "row"),
            None => self.set_status_message("Nothing selected"),
        }
    }

    fn copy_email(&mut self) {
        match self.selected_record().map(|r| r.email.clone()) {
            Some(email) => self.copy_to_clipboard(email, "email"),
            None => self.set_status_message("Nothing selected"),
        }
    }

    fn copy_to_clipboard(&mut self, content: String, what: &str) {
        trace!("Copy content: {}", content);
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    warn!("Clipboard unavailable: {:?}", e);
                    self.set_status_message("Clipboard unavailable");
                    return;
                }
            }
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(content),
            None => return,
        };
        match result {
            Ok(_) => {
                trace!("Copied {what} to clipboard.");
                self.set_status_message(format!("Copied {what} to clipboard"));
            }
            Err(e) => {
                warn!("Error copying to clipboard: {:?}", e);
                self.set_status_message(format!("Could not copy {what}"));
            }
        }
    }
}
