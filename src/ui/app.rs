use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell as TableCell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
    TableState, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::columns::{CellContext, ColumnDescriptor, ColumnId};
use crate::config::{AppConfig, ListSettings};
use crate::db::{
    apply_edit_proposal, create_resource, delete_resources, fetch_categories, fetch_resource,
    fetch_resources, set_publication_status,
};
use crate::error::{CatalogError, FieldErrors};
use crate::filter::FilterValue;
use crate::form::ResourceForm;
use crate::labels::{configuration_label_for_code, subtitle, type_label_for_code};
use crate::models::{Category, PublicationStatus, Resource, ResourceRef};
use crate::query::{ListContent, QueryState, EMPTY_TITLE};
use crate::selection::SelectionTracker;

use super::forms::FormState;
use super::helpers::{
    cell_line, centered_rect, checkbox, column_constraint, surface_error, COMPACT_WIDTH,
};
use super::screens::{
    ConfirmDelete, ConfirmStatus, DetailScreen, FacetPicker, ListScreen, TitlePrompt,
};

/// Footer space reserved for status messages, list info and instructions.
const FOOTER_HEIGHT: u16 = 4;
const DUPLICATE_NOTICE: &str = "A resource already exists at this URL. Please choose a new URL.";
const CREATE_FAILED_NOTICE: &str = "Failed to create resource! Please try again later.";

/// High-level navigation states.
enum Screen {
    List,
    Detail(DetailScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Filtering(TitlePrompt),
    Facet(FacetPicker),
    Creating(Box<FormState>),
    ConfirmStatus(ConfirmStatus),
    ConfirmDelete(ConfirmDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    settings: ListSettings,
    query: QueryState<Vec<Resource>>,
    list: ListScreen,
    selection: SelectionTracker<Resource>,
    /// Titles of the selected rows, kept current by the selection listener.
    selection_summary: Rc<RefCell<Vec<String>>>,
    categories: Vec<Category>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app in its loading state. Nothing is fetched until
    /// [`App::refresh`] runs.
    pub fn new(conn: Connection, config: &AppConfig) -> Self {
        let settings = config.list.clone();
        let list = ListScreen::new(settings.column_flags(), config.page_size, settings.paginate);

        let selection_summary = Rc::new(RefCell::new(Vec::new()));
        let mut selection = SelectionTracker::new(Vec::new());
        let summary = Rc::clone(&selection_summary);
        selection.on_change(move |rows: &[&Resource]| {
            *summary.borrow_mut() = rows.iter().map(|row| row.title.clone()).collect();
        });

        Self {
            conn,
            settings,
            query: QueryState::Loading,
            list,
            selection,
            selection_summary,
            categories: Vec::new(),
            screen: Screen::List,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.query.is_loading()
    }

    /// Fetch a fresh snapshot of resources and categories.
    pub fn refresh(&mut self) {
        let result = fetch_resources(&self.conn);
        match &result {
            Ok(rows) => {
                info!(count = rows.len(), "loaded resources");
                self.selection.set_rows(rows.clone());
            }
            Err(err) => error!("failed to load resources: {err:#}"),
        }
        self.query = QueryState::from_result(result);

        match fetch_categories(&self.conn) {
            Ok(categories) => self.categories = categories,
            Err(err) => {
                warn!("failed to load categories: {err:#}");
                self.set_status(
                    format!("Failed to load categories: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }

        self.sync_page();
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Filtering(prompt) => self.handle_title_prompt(code, prompt)?,
            Mode::Facet(picker) => self.handle_facet(code, picker)?,
            Mode::Creating(state) => self.handle_form(code, state)?,
            Mode::ConfirmStatus(confirm) => self.handle_confirm_status(code, confirm)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if matches!(self.screen, Screen::Detail(_)) {
            return self.handle_detail_key(code);
        }

        if self.query.data().is_none() {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    *exit = true;
                }
                KeyCode::Char('R') => self.reload(),
                _ => {}
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => {
                let page_len = self.page_len();
                self.list.move_cursor(-1, page_len);
            }
            KeyCode::Down => {
                let page_len = self.page_len();
                self.list.move_cursor(1, page_len);
            }
            KeyCode::Left => {
                if self.list.previous_page() {
                    self.sync_page();
                }
            }
            KeyCode::Right => {
                let total = self.filtered_total();
                if self.list.next_page(total) {
                    self.sync_page();
                }
            }
            KeyCode::Enter => match self.current_resource() {
                Some(resource) => {
                    debug!(id = %resource.id, "opening resource");
                    self.clear_status();
                    self.screen = Screen::Detail(DetailScreen::new(resource));
                }
                None => self.set_status("No resource selected.", StatusKind::Error),
            },
            KeyCode::Char(' ') => self.toggle_current_row(),
            KeyCode::Char('a') => self.toggle_page(),
            KeyCode::Char('/') => return Ok(self.open_title_prompt()),
            KeyCode::Char('t') => return Ok(self.open_facet(ColumnId::Type, "Filter by Type")),
            KeyCode::Char('c') => {
                return Ok(self.open_facet(ColumnId::Configuration, "Filter by Configuration"))
            }
            KeyCode::Char('g') => {
                return Ok(self.open_facet(ColumnId::Categories, "Filter by Category"))
            }
            KeyCode::Char('x') => {
                self.list.filters.clear_all();
                self.list.reset_page();
                self.sync_page();
                self.set_status("Filters cleared.", StatusKind::Info);
            }
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('h') => self.toggle_alternative_names(),
            KeyCode::Char('n') => return Ok(self.open_form(ResourceForm::new(), None)),
            KeyCode::Char('p') => return Ok(self.confirm_status(PublicationStatus::Published)),
            KeyCode::Char('r') => {
                return Ok(self.confirm_status(PublicationStatus::ReadyForReview))
            }
            KeyCode::Char('d') => return Ok(self.confirm_status(PublicationStatus::Draft)),
            KeyCode::Char('D') => return Ok(self.confirm_delete()),
            KeyCode::Char('A') => self.apply_proposal_at_cursor(),
            KeyCode::Char('R') => self.reload(),
            _ => {}
        }

        Ok(Mode::Normal)
    }

    fn handle_detail_key(&mut self, code: KeyCode) -> Result<Mode> {
        let Screen::Detail(detail) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
                self.screen = Screen::List;
            }
            KeyCode::Up => detail.scroll_by(-1),
            KeyCode::Down => detail.scroll_by(1),
            KeyCode::PageUp => detail.scroll_by(-10),
            KeyCode::PageDown => detail.scroll_by(10),
            KeyCode::Char('o') => {
                let video = detail.resource.video_url();
                self.open_video(video);
            }
            KeyCode::Char('e') => {
                let resource = detail.resource.clone();
                return Ok(self.open_proposal_form(&resource));
            }
            _ => {}
        }

        Ok(Mode::Normal)
    }

    fn handle_title_prompt(&mut self, code: KeyCode, mut prompt: TitlePrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                match prompt.previous.take() {
                    Some(previous) => self.list.filters.set_text(ColumnId::Title, previous),
                    None => self.list.filters.clear(ColumnId::Title),
                }
                self.list.reset_page();
                self.sync_page();
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Backspace => {
                prompt.query.pop();
            }
            KeyCode::Char(ch) => prompt.query.push(ch),
            _ => return Ok(Mode::Filtering(prompt)),
        }

        self.list
            .filters
            .set_text(ColumnId::Title, prompt.query.clone());
        self.list.reset_page();
        self.sync_page();
        Ok(Mode::Filtering(prompt))
    }

    fn handle_facet(&mut self, code: KeyCode, mut picker: FacetPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Char(' ') => {
                if let Some(option) = picker.current() {
                    let value = option.value.clone();
                    self.list.filters.toggle_value(picker.column, &value);
                    self.list.reset_page();
                    self.sync_page();
                }
            }
            KeyCode::Char('x') => {
                self.list.filters.clear(picker.column);
                self.list.reset_page();
                self.sync_page();
            }
            _ => {}
        }
        Ok(Mode::Facet(picker))
    }

    fn handle_form(&mut self, code: KeyCode, mut state: Box<FormState>) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => state.next_field(),
            KeyCode::BackTab | KeyCode::Up => state.previous_field(),
            KeyCode::Left => state.cycle(-1),
            KeyCode::Right => state.cycle(1),
            KeyCode::Enter => {
                if !state.commit_tag() {
                    return self.submit_form(state);
                }
            }
            KeyCode::Backspace => state.backspace(),
            KeyCode::Char(' ') => {
                if !state.toggle_option() {
                    state.push_char(' ');
                }
            }
            KeyCode::Char(ch) => {
                state.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Creating(state))
    }

    fn submit_form(&mut self, mut state: Box<FormState>) -> Result<Mode> {
        state.notice = None;
        let resource = match state.form.validate(state.status) {
            Ok(resource) => resource,
            Err(CatalogError::ValidationFailed(errors)) => {
                debug!(%errors, "form rejected");
                state.errors = errors;
                return Ok(Mode::Creating(state));
            }
            Err(err) => {
                state.notice = Some(err.to_string());
                return Ok(Mode::Creating(state));
            }
        };
        state.errors = FieldErrors::new();

        match create_resource(&self.conn, &resource) {
            Ok(()) => {
                let created = fetch_resource(&self.conn, &resource.id).unwrap_or(resource);
                self.refresh();
                let message = if created.is_edit_proposal() {
                    format!("Proposed changes saved as {}.", created.detail_path())
                } else {
                    format!("Created {}.", created.title)
                };
                self.set_status(message, StatusKind::Info);
                self.screen = Screen::Detail(DetailScreen::new(created));
                Ok(Mode::Normal)
            }
            Err(err) => {
                match err.downcast_ref::<CatalogError>() {
                    Some(CatalogError::DuplicateIdentifier(id)) => {
                        info!(id = %id, "identifier already taken");
                        state.notice = Some(DUPLICATE_NOTICE.to_string());
                    }
                    Some(CatalogError::ValidationFailed(errors)) => {
                        state.errors = errors.clone();
                    }
                    _ => {
                        error!("failed to create resource: {err:#}");
                        state.notice = Some(CREATE_FAILED_NOTICE.to_string());
                    }
                }
                Ok(Mode::Creating(state))
            }
        }
    }

    fn handle_confirm_status(&mut self, code: KeyCode, confirm: ConfirmStatus) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match set_publication_status(&self.conn, &confirm.ids, confirm.status) {
                    Ok(updated) => {
                        self.selection.clear();
                        self.refresh();
                        self.set_status(
                            format!(
                                "Marked {updated} resource(s) as {}.",
                                confirm.status.label()
                            ),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => self.set_status(
                        format!("Failed to update status: {}", surface_error(&err)),
                        StatusKind::Error,
                    ),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.clear_status();
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmStatus(confirm)),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_resources(&self.conn, &confirm.ids) {
                    Ok(deleted) => {
                        self.refresh();
                        self.set_status(
                            format!("Deleted {deleted} resource(s)."),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => self.set_status(
                        format!("Failed to delete: {}", surface_error(&err)),
                        StatusKind::Error,
                    ),
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.clear_status();
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Ctrl+R reloads from anywhere outside of dialogs.
    pub(crate) fn handle_ctrl_r(&mut self) {
        if matches!(self.mode, Mode::Normal) {
            self.reload();
        }
    }

    fn reload(&mut self) {
        self.refresh();
        if self.query.data().is_some() {
            self.set_status("Reloaded.", StatusKind::Info);
        }
    }

    fn toggle_current_row(&mut self) {
        if !self.list.columns.has_selection() {
            self.set_status("Selection is turned off.", StatusKind::Error);
            return;
        }
        if let Some(resource) = self.current_resource() {
            self.selection.toggle_row(&resource.id);
        }
    }

    fn toggle_page(&mut self) {
        if !self.list.columns.has_selection() {
            self.set_status("Selection is turned off.", StatusKind::Error);
            return;
        }
        let checked = !self.selection.is_all_selected();
        self.selection.toggle_all_on_page(checked);
    }

    fn open_title_prompt(&mut self) -> Mode {
        if !self.list.columns.filtering_enabled() {
            self.set_status("Filtering is turned off.", StatusKind::Error);
            return Mode::Normal;
        }
        Mode::Filtering(TitlePrompt::new(self.list.title_filter()))
    }

    fn open_facet(&mut self, column: ColumnId, title: &'static str) -> Mode {
        if !self.list.columns.toolbar_filters().contains(&column) {
            self.set_status("Filtering is turned off.", StatusKind::Error);
            return Mode::Normal;
        }
        let Some(rows) = self.query.data() else {
            return Mode::Normal;
        };
        let picker = FacetPicker::new(column, title, rows);
        if picker.options.is_empty() {
            self.set_status("Nothing to filter by.", StatusKind::Error);
            return Mode::Normal;
        }
        Mode::Facet(picker)
    }

    fn cycle_sort(&mut self) {
        match self.list.cycle_sort() {
            Some(sort) => {
                let header = self
                    .list
                    .columns
                    .get(sort.column)
                    .map_or("", |column| column.header);
                let direction = if sort.descending {
                    "descending"
                } else {
                    "ascending"
                };
                self.set_status(
                    format!("Sorted by {header} ({direction})."),
                    StatusKind::Info,
                );
            }
            None if self.list.columns.filtering_enabled() => {
                self.set_status("Showing stored order.", StatusKind::Info)
            }
            None => self.set_status("Sorting is turned off.", StatusKind::Error),
        }
        self.list.cursor = 0;
        self.sync_page();
    }

    fn toggle_alternative_names(&mut self) {
        if self
            .list
            .visibility
            .toggle(&self.list.columns, ColumnId::AlternativeNames)
        {
            self.clear_status();
        } else {
            self.set_status("This column cannot be hidden.", StatusKind::Error);
        }
    }

    fn open_form(&mut self, form: ResourceForm, exclude: Option<&str>) -> Mode {
        self.clear_status();
        let related_options = self.related_options(exclude);
        Mode::Creating(Box::new(FormState::new(
            form,
            self.categories.clone(),
            related_options,
        )))
    }

    fn open_proposal_form(&mut self, resource: &Resource) -> Mode {
        if resource.is_edit_proposal() {
            self.set_status(
                "This resource is already an edit proposal.",
                StatusKind::Error,
            );
            return Mode::Normal;
        }
        self.open_form(ResourceForm::propose_edit(resource), Some(&resource.id))
    }

    /// Published originals a new resource may link to.
    fn related_options(&self, exclude: Option<&str>) -> Vec<ResourceRef> {
        self.query
            .data()
            .map(|rows| {
                rows.iter()
                    .filter(|row| !row.is_edit_proposal())
                    .filter(|row| Some(row.id.as_str()) != exclude)
                    .map(|row| ResourceRef {
                        id: row.id.clone(),
                        title: row.title.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Status changes act on the selection, or on the row under the cursor
    /// when nothing is selected.
    fn target_rows(&self) -> Vec<(String, String)> {
        let selected: Vec<(String, String)> = self
            .selection
            .selected_rows()
            .into_iter()
            .map(|row| (row.id.clone(), row.title.clone()))
            .collect();
        if !selected.is_empty() {
            return selected;
        }
        self.current_resource()
            .map(|row| vec![(row.id, row.title)])
            .unwrap_or_default()
    }

    fn confirm_status(&mut self, status: PublicationStatus) -> Mode {
        let ids: Vec<String> = self.target_rows().into_iter().map(|(id, _)| id).collect();
        if ids.is_empty() {
            self.set_status("Nothing to update.", StatusKind::Error);
            return Mode::Normal;
        }
        Mode::ConfirmStatus(ConfirmStatus { status, ids })
    }

    fn confirm_delete(&mut self) -> Mode {
        let (ids, titles): (Vec<String>, Vec<String>) = self.target_rows().into_iter().unzip();
        if ids.is_empty() {
            self.set_status("Nothing to delete.", StatusKind::Error);
            return Mode::Normal;
        }
        Mode::ConfirmDelete(ConfirmDelete { ids, titles })
    }

    fn apply_proposal_at_cursor(&mut self) {
        let Some(resource) = self.current_resource() else {
            self.set_status("No resource selected.", StatusKind::Error);
            return;
        };
        if !resource.is_edit_proposal() {
            self.set_status("Only edit proposals can be applied.", StatusKind::Error);
            return;
        }
        match apply_edit_proposal(&self.conn, &resource.id) {
            Ok(original) => {
                self.refresh();
                self.set_status(
                    format!("Applied proposed changes to {}.", original.title),
                    StatusKind::Info,
                );
            }
            Err(err) => self.set_status(
                format!("Failed to apply proposal: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    fn open_video(&mut self, url: Option<String>) {
        let Some(url) = url else {
            self.set_status("This resource does not have a video.", StatusKind::Error);
            return;
        };
        if let Err(err) = open_link(&url) {
            self.set_status(format!("Failed to open video: {err}"), StatusKind::Error);
        } else {
            self.set_status("Opened video in the browser.", StatusKind::Info);
        }
    }

    /// Tell the selection tracker which ids are on screen after the page or
    /// the row set changed.
    fn sync_page(&mut self) {
        let Some(rows) = self.query.data() else {
            return;
        };
        let shaped = self.list.shaped_rows(rows);
        self.list.clamp(shaped.len());
        let ids: Vec<String> = self
            .list
            .page_of(&shaped)
            .iter()
            .map(|row| row.id.clone())
            .collect();
        self.selection.set_page(ids);
    }

    fn current_resource(&self) -> Option<Resource> {
        let rows = self.query.data()?;
        let shaped = self.list.shaped_rows(rows);
        self.list
            .page_of(&shaped)
            .get(self.list.cursor)
            .map(|row| (*row).clone())
    }

    fn page_len(&self) -> usize {
        self.query.data().map_or(0, |rows| {
            let shaped = self.list.shaped_rows(rows);
            self.list.page_of(&shaped).len()
        })
    }

    fn filtered_total(&self) -> usize {
        self.query
            .data()
            .map_or(0, |rows| self.list.shaped_rows(rows).len())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::List => self.draw_list(frame, content_area),
            Screen::Detail(detail) => self.draw_detail(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Filtering(prompt) => self.draw_title_prompt(frame, area, prompt),
            Mode::Facet(picker) => self.draw_facet(frame, area, picker),
            Mode::Creating(state) => self.draw_form(frame, area, state),
            Mode::ConfirmStatus(confirm) => self.draw_confirm_status(frame, area, confirm),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Resources").borders(Borders::ALL);
        match self.query.list_content(&self.settings.no_results_message) {
            ListContent::Loading => {
                self.draw_message(frame, area, block, vec![Line::from("Loading resources...")])
            }
            ListContent::Unavailable { title, message } => {
                let lines = vec![
                    Line::from(Span::styled(
                        title,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(message),
                ];
                self.draw_message(frame, area, block, lines);
            }
            ListContent::Empty { title, message } => {
                self.draw_message(frame, area, block, empty_lines(title, message))
            }
            ListContent::Rows(rows) => self.draw_table(frame, area, block, rows),
        }
    }

    fn draw_message<'a>(
        &self,
        frame: &mut Frame,
        area: Rect,
        block: Block<'a>,
        lines: Vec<Line<'a>>,
    ) {
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, block: Block, rows: &[Resource]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        frame.render_widget(Paragraph::new(self.filter_summary()), chunks[0]);

        let shaped = self.list.shaped_rows(rows);
        if shaped.is_empty() {
            let lines = empty_lines(EMPTY_TITLE, &self.settings.no_results_message);
            self.draw_message(frame, chunks[1], block, lines);
            return;
        }

        let compact = area.width < COMPACT_WIDTH;
        let columns = self
            .list
            .visibility
            .visible_columns(&self.list.columns, compact);
        let title_filter = self.list.title_filter();

        let header = Row::new(
            columns
                .iter()
                .map(|column| TableCell::from(self.header_text(column)))
                .collect::<Vec<_>>(),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let body: Vec<Row> = self
            .list
            .page_of(&shaped)
            .iter()
            .map(|resource| {
                let ctx = CellContext {
                    title_filter,
                    selected: self.selection.is_selected(&resource.id),
                };
                Row::new(
                    columns
                        .iter()
                        .map(|column| {
                            TableCell::from(cell_line(column.id, column.render(resource, &ctx)))
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let widths: Vec<Constraint> = columns
            .iter()
            .map(|column| column_constraint(column.id))
            .collect();

        let table = Table::new(body, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(self.list.cursor));
        frame.render_stateful_widget(table, chunks[1], &mut state);
    }

    fn header_text(&self, column: &ColumnDescriptor) -> String {
        if column.id == ColumnId::Select {
            return checkbox(self.selection.page_check_state()).to_string();
        }
        match self.list.sort {
            Some(sort) if sort.column == column.id => {
                let arrow = if sort.descending { "↓" } else { "↑" };
                format!("{} {arrow}", column.header)
            }
            _ => column.header.to_string(),
        }
    }

    fn filter_summary(&self) -> Line<'static> {
        let muted = Style::default().fg(Color::DarkGray);
        if !self.list.columns.filtering_enabled() {
            return Line::from("");
        }
        if self.list.filters.is_empty() {
            return Line::from(Span::styled(
                "No filters. Press / to search titles, t c g to filter by type, configuration or category.",
                muted,
            ));
        }

        let parts: Vec<String> = self
            .list
            .filters
            .iter()
            .filter(|(_, value)| value.is_active())
            .map(|(column, value)| match value {
                FilterValue::Text(text) => format!("{column}: \"{text}\""),
                FilterValue::AnyOf(values) => {
                    let labels: Vec<String> = values
                        .iter()
                        .map(|value| self.facet_label(column, value))
                        .collect();
                    format!("{column}: {}", labels.join(" | "))
                }
            })
            .collect();

        Line::from(vec![
            Span::styled("Filters ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(parts.join("  •  ")),
        ])
    }

    fn facet_label(&self, column: ColumnId, value: &str) -> String {
        let label = match column {
            ColumnId::Type => type_label_for_code(value).ok().map(str::to_string),
            ColumnId::Configuration => configuration_label_for_code(value).ok().map(str::to_string),
            ColumnId::Categories => self
                .categories
                .iter()
                .find(|category| category.id == value)
                .map(|category| category.name.clone()),
            _ => None,
        };
        label.unwrap_or_else(|| value.to_string())
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &DetailScreen) {
        let resource = &detail.resource;
        let heading = Style::default().add_modifier(Modifier::BOLD);
        let label = Style::default().fg(Color::Cyan);

        let mut lines = vec![
            Line::from(Span::styled(resource.title.clone(), heading)),
            Line::from(Span::styled(
                subtitle(resource),
                Style::default().fg(Color::Gray),
            )),
        ];

        if let Some(original) = &resource.edit_proposal_original_resource_id {
            lines.push(Line::from(Span::styled(
                format!("Proposed changes to /resource/{original}"),
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled("Status: ", label),
            Span::raw(resource.publication_status.label()),
        ]));
        lines.push(Line::from(""));
        lines.extend(
            resource
                .description
                .lines()
                .map(|line| Line::from(line.to_string())),
        );

        let mut section = |name: &str, values: Vec<String>| {
            if values.is_empty() {
                return;
            }
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(format!("{name}: "), label),
                Span::raw(values.join(", ")),
            ]));
        };

        section(
            "Categories",
            resource
                .categories
                .iter()
                .map(|category| category.name.clone())
                .collect(),
        );
        section("Also known as", resource.alternative_names());
        section(
            "Related",
            resource
                .related_refs()
                .into_iter()
                .map(|reference| reference.title)
                .collect(),
        );
        section(
            "Lesson plans",
            resource
                .lesson_plans
                .iter()
                .map(|plan| plan.title.clone())
                .collect(),
        );
        section(
            "Introduction",
            resource.show_introduction.iter().cloned().collect(),
        );
        section("Video", resource.video_url().into_iter().collect());

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(resource.detail_path())
                    .borders(Borders::ALL),
            )
            .wrap(Wrap { trim: false })
            .scroll((detail.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![
            status_line,
            self.list_info_line(),
            self.footer_instructions(),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn list_info_line(&self) -> Line<'static> {
        let Some(rows) = self.query.data() else {
            return Line::from("");
        };
        let total = self.list.shaped_rows(rows).len();
        let mut text = format!(
            "Page {} of {}  •  {} of {} resource(s)",
            self.list.page_index() + 1,
            self.list.page_count(total),
            total,
            rows.len()
        );

        let selected = self.selection_summary.borrow();
        if !selected.is_empty() {
            text.push_str(&format!("  •  {} selected", selected.len()));
            if selected.len() <= 3 {
                text.push_str(&format!(": {}", selected.join(", ")));
            }
        }
        Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Filtering(_)) => &[("[Enter]", "Keep"), ("[Esc]", "Restore")],
            (_, Mode::Facet(_)) => &[
                ("[↑↓]", "Navigate"),
                ("[Space]", "Toggle"),
                ("[x]", "Clear"),
                ("[Enter]", "Done"),
            ],
            (_, Mode::Creating(_)) => &[
                ("[Tab]", "Next field"),
                ("[←→]", "Choose"),
                ("[Space]", "Toggle"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ConfirmStatus(_)) | (_, Mode::ConfirmDelete(_)) => {
                &[("[Y]", "Confirm"), ("[N]", "Cancel")]
            }
            (Screen::Detail(_), Mode::Normal) => &[
                ("[↑↓]", "Scroll"),
                ("[o]", "Open video"),
                ("[e]", "Propose changes"),
                ("[Esc]", "Back"),
            ],
            (Screen::List, Mode::Normal) => &[
                ("[↑↓←→]", "Navigate"),
                ("[Enter]", "Open"),
                ("[Space/a]", "Select"),
                ("[/ t c g x]", "Filter"),
                ("[s]", "Sort"),
                ("[n]", "New"),
                ("[p r d]", "Publish/Pending/Draft"),
                ("[D]", "Delete"),
                ("[A]", "Apply proposal"),
                ("[q]", "Quit"),
            ],
        };

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, action) in hints {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_title_prompt(&self, frame: &mut Frame, area: Rect, prompt: &TitlePrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Filter titles");
        let paragraph = Paragraph::new(Span::raw(format!("Title: {}", prompt.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Title: ".len() as u16 + prompt.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_facet(&self, frame: &mut Frame, area: Rect, picker: &FacetPicker) {
        let popup_area = centered_rect(50, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(picker.title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = picker
            .options
            .iter()
            .map(|option| {
                let checked = self
                    .list
                    .filters
                    .is_value_selected(picker.column, &option.value);
                let mark = if checked { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {} ({})", option.label, option.count))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, state: &FormState) {
        let popup_area = centered_rect(70, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(state.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = Vec::new();
        if let Some(notice) = &state.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }

        let mut cursor = None;
        for field in state.fields() {
            if field == state.active && field.is_text() {
                let offset = field.label().len() + 2 + state.value_len(field);
                cursor = Some((inner.x + offset as u16, inner.y + lines.len() as u16));
            }
            lines.extend(state.build_lines(field));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • ←→ to choose • Space to toggle • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }

    fn draw_confirm_status(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmStatus) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Status Change")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Mark {} resource(s) as {}?",
                confirm.ids.len(),
                confirm.status.label()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let target = match confirm.titles.as_slice() {
            [title] => title.clone(),
            titles => format!("{} resources", titles.len()),
        };
        let lines = vec![
            Line::from(format!("Delete {target}?")),
            Line::from("Pending edit proposals for these resources are removed too."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

fn empty_lines<'a>(title: &'a str, message: &'a str) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::models::fixtures::exercise;

    fn app_with(resources: &[Resource]) -> App {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        for resource in resources {
            create_resource(&conn, resource).unwrap();
        }
        let mut app = App::new(conn, &AppConfig::default());
        app.refresh();
        app
    }

    fn press(app: &mut App, keys: &str) {
        for ch in keys.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn draft(id: &str, title: &str) -> Resource {
        let mut resource = exercise(id, title, &["focus"]);
        resource.publication_status = PublicationStatus::Draft;
        resource
    }

    #[test]
    fn starts_loading_until_refreshed() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let mut app = App::new(conn, &AppConfig::default());
        assert!(app.is_loading());
        app.refresh();
        assert!(!app.is_loading());
    }

    #[test]
    fn publishing_the_selection_clears_it() {
        let mut app = app_with(&[draft("zip-zap", "Zip Zap"), draft("yes-and", "Yes And")]);

        press(&mut app, " ");
        assert_eq!(app.selection_summary.borrow().len(), 1);

        press(&mut app, "p");
        assert!(matches!(app.mode, Mode::ConfirmStatus(_)));
        press(&mut app, "y");

        assert!(app.selection.is_empty());
        assert!(app.selection_summary.borrow().is_empty());
        let published = app
            .query
            .data()
            .unwrap()
            .iter()
            .filter(|row| row.publication_status == PublicationStatus::Published)
            .count();
        assert_eq!(published, 1);
    }

    #[test]
    fn escape_restores_previous_title_filter() {
        let mut app = app_with(&[draft("zip-zap", "Zip Zap"), draft("yes-and", "Yes And")]);

        press(&mut app, "/zip");
        assert_eq!(app.filtered_total(), 1);
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.filtered_total(), 2);
        assert!(app.list.title_filter().is_none());
    }

    #[test]
    fn duplicate_identifier_is_a_form_notice() {
        let mut app = app_with(&[draft("zip-zap", "Zip Zap")]);

        press(&mut app, "nZip Zap");
        if let Mode::Creating(state) = &mut app.mode {
            state.form.description = "Pass the energy around the circle.".into();
        }
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::Creating(state) => {
                assert_eq!(state.notice.as_deref(), Some(DUPLICATE_NOTICE));
                assert!(state.errors.is_empty());
            }
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn validation_errors_stay_on_their_fields() {
        let mut app = app_with(&[]);
        press(&mut app, "n");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::Creating(state) => {
                assert!(state.notice.is_none());
                assert!(state.errors.first("title").is_some());
            }
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn created_resource_opens_in_detail() {
        let mut app = app_with(&[]);
        press(&mut app, "nZip Zap");
        if let Mode::Creating(state) = &mut app.mode {
            state.form.description = "Pass the energy around the circle.".into();
        }
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        match &app.screen {
            Screen::Detail(detail) => assert_eq!(detail.resource.id, "zip-zap"),
            Screen::List => panic!("expected the detail screen"),
        }
        assert_eq!(app.query.data().map(Vec::len), Some(1));
    }
}
