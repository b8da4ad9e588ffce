use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::api::{
    ChartImage, ChartPoint, ChartRequest, ChatRequest, ChatResponse, IndexQuote, MarketOverview,
    SectorQuote, StockAnalysis, StockAnalysisRequest, StockQuote,
};
use crate::config::Config;
use crate::desktop;
use crate::dispatch::{self, Intent};
use crate::models::ModelId;
use crate::palette::{FunctionItem, FunctionTab};
use crate::state::{ChatMessage, ChatRole};

/// Tallest the input box grows before its content scrolls.
pub const MAX_INPUT_ROWS: u16 = 8;
/// Notifications stay up for this many ticks (300ms each).
const NOTIFICATION_TICKS: u8 = 10;

pub const ANALYSIS_SHORTCUT: &str = "/analyze 000001 technical analysis";
pub const CHART_SHORTCUT: &str = "/chart 30-day price trend";
pub const BACKTEST_SHORTCUT: &str = "Please backtest a 20-day momentum factor";
pub const RUN_ANALYSIS_DEFAULT: &str = "/analyze 000001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Chat,
    Functions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Checking,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub kind: NoticeKind,
    ticks_left: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartCard {
    pub title: String,
    /// Image source string as returned by the server.
    pub image: String,
    /// The series that was submitted, kept for the sparkline preview.
    pub series: Vec<ChartPoint>,
    /// Decoded byte length, `None` when the source is not a base64 data URL.
    pub image_size: Option<usize>,
}

impl ChartCard {
    pub fn new(title: impl Into<String>, image: String, series: Vec<ChartPoint>) -> Self {
        let image_size = desktop::decode_image_source(&image).ok().map(|bytes| bytes.len());
        Self {
            title: title.into(),
            image,
            series,
            image_size,
        }
    }
}

/// One item in the chat pane, in display order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Message(ChatMessage),
    Typing(u64),
    Analysis(StockAnalysis),
    Chart(ChartCard),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Chat(ChatRequest),
    Analysis(StockAnalysisRequest),
    Chart(ChartRequest),
}

/// A submission that is ready to go out, tagged with its typing indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub typing_id: u64,
    pub request: Request,
}

#[derive(Debug)]
pub enum Outcome {
    Chat(anyhow::Result<ChatResponse>),
    Analysis(anyhow::Result<StockAnalysis>),
    Chart {
        result: anyhow::Result<ChartImage>,
        series: Vec<ChartPoint>,
    },
}

/// Results delivered from background request tasks.
#[derive(Debug)]
pub enum BackendEvent {
    Completed { typing_id: u64, outcome: Outcome },
    ModelSwitched { model: ModelId, result: anyhow::Result<()> },
    Market(anyhow::Result<MarketOverview>),
    Status(anyhow::Result<()>),
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,

    // Message input
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Conversation
    pub current_model: ModelId,
    pub messages: Vec<ChatMessage>,
    pub transcript: Vec<Entry>,
    pub busy: bool,
    next_typing_id: u64,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat pane scrolling
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_area: Option<Rect>,

    // Market snapshot
    pub indices: Vec<IndexQuote>,
    pub sectors: Vec<SectorQuote>,
    pub hot_stocks: Vec<StockQuote>,
    pub market_sentiment: Option<String>,
    pub show_market_panel: bool,

    pub api_status: ApiStatus,

    // Model picker state
    pub show_model_picker: bool,
    pub model_picker_state: ListState,

    // Function palette state
    pub function_tab: FunctionTab,
    pub function_state: ListState,

    // Attach prompt state
    pub show_attach_input: bool,
    pub attach_input: String,
    pub attach_cursor: usize,

    pub notification: Option<Notification>,

    pub config: Config,
    config_path: Option<PathBuf>,
}

impl App {
    /// `config_path` is where model choices are persisted; `None` keeps them in memory.
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let mut function_state = ListState::default();
        function_state.select(Some(0));

        Self {
            should_quit: false,
            focus: Focus::Input,

            input: String::new(),
            input_cursor: 0,

            current_model: config.model(),
            messages: Vec::new(),
            transcript: Vec::new(),
            busy: false,
            next_typing_id: 0,
            animation_frame: 0,

            chat_scroll: 0,
            follow_tail: true,
            chat_area: None,

            indices: Vec::new(),
            sectors: Vec::new(),
            hot_stocks: Vec::new(),
            market_sentiment: None,
            show_market_panel: true,

            api_status: ApiStatus::Checking,

            show_model_picker: false,
            model_picker_state: ListState::default(),

            function_tab: FunctionTab::default(),
            function_state,

            show_attach_input: false,
            attach_input: String::new(),
            attach_cursor: 0,

            notification: None,

            config,
            config_path,
        }
    }

    // Input editing

    /// Whether Enter would send right now.
    pub fn can_send(&self) -> bool {
        !self.busy && !self.input.trim().is_empty()
    }

    pub fn input_rows(&self) -> u16 {
        let lines = self.input.split('\n').count().min(MAX_INPUT_ROWS as usize);
        (lines as u16).max(1)
    }

    /// (row, column) of the cursor within the input, in chars.
    pub fn input_cursor_position(&self) -> (usize, usize) {
        let before: String = self.input.chars().take(self.input_cursor).collect();
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
        (row, col)
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_before_cursor(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input.chars().count();
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.input_cursor = self.input.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
    }

    /// Fill the input with a canned command and focus it, without sending.
    pub fn insert_command(&mut self, command: &str) {
        self.set_input(command);
        self.focus = Focus::Input;
    }

    // Transcript

    fn push_entry(&mut self, entry: Entry) {
        self.transcript.push(entry);
        self.follow_tail = true;
    }

    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        let message = ChatMessage::new(role, content);
        self.messages.push(message.clone());
        self.push_entry(Entry::Message(message));
    }

    pub fn add_typing_indicator(&mut self) -> u64 {
        self.next_typing_id += 1;
        let id = self.next_typing_id;
        self.push_entry(Entry::Typing(id));
        id
    }

    pub fn remove_typing_indicator(&mut self, id: u64) {
        self.transcript
            .retain(|entry| !matches!(entry, Entry::Typing(t) if *t == id));
    }

    /// Queue the current input for sending.
    ///
    /// Returns `None` without touching anything when the input is blank or a
    /// request is already in flight. Otherwise the user message and a typing
    /// indicator are on screen before the returned request is executed.
    pub fn submit(&mut self) -> Option<Dispatch> {
        let message = self.input.trim().to_string();
        if message.is_empty() || self.busy {
            return None;
        }

        self.add_message(ChatRole::User, message.as_str());
        self.clear_input();
        self.busy = true;
        let typing_id = self.add_typing_indicator();

        let intent = dispatch::classify(&message);
        let request = match intent {
            Intent::Analysis => Request::Analysis(dispatch::analysis_request(&message)),
            Intent::Chart => {
                let series = dispatch::demo_series(&mut rand::thread_rng());
                Request::Chart(dispatch::chart_request(series))
            }
            Intent::Chat => Request::Chat(dispatch::chat_request(
                &message,
                self.current_model,
                &self.messages,
            )),
        };
        debug!(?intent, typing_id, "dispatching message");

        Some(Dispatch { typing_id, request })
    }

    /// Submit the input, or a default analysis command when it is blank.
    pub fn run_analysis(&mut self) -> Option<Dispatch> {
        if self.input.trim().is_empty() {
            self.set_input(RUN_ANALYSIS_DEFAULT);
        }
        self.submit()
    }

    /// Render the result of a dispatched request and release the busy flag.
    pub fn complete(&mut self, typing_id: u64, outcome: Outcome) {
        self.remove_typing_indicator(typing_id);

        match outcome {
            Outcome::Chat(Ok(response)) => {
                if response.success == Some(false) {
                    warn!(error = ?response.error, "chat reported failure");
                }
                self.add_message(ChatRole::Assistant, dispatch::reply_text(&response));
            }
            Outcome::Chat(Err(err)) => {
                warn!("chat request failed: {:#}", err);
                self.add_message(ChatRole::Assistant, format!("Sorry, processing failed: {}", err));
            }
            Outcome::Analysis(Ok(analysis)) => {
                self.push_entry(Entry::Analysis(analysis));
            }
            Outcome::Analysis(Err(err)) => {
                warn!("analysis request failed: {:#}", err);
                self.add_message(ChatRole::Assistant, format!("Analysis failed: {}", err));
            }
            Outcome::Chart { result: Ok(chart), series } => {
                self.push_entry(Entry::Chart(ChartCard::new(dispatch::CHART_TITLE, chart.image, series)));
            }
            Outcome::Chart { result: Err(err), .. } => {
                warn!("chart request failed: {:#}", err);
                self.add_message(ChatRole::Assistant, format!("Chart generation failed: {}", err));
            }
        }

        self.busy = false;
    }

    pub fn apply_backend(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Completed { typing_id, outcome } => self.complete(typing_id, outcome),
            BackendEvent::ModelSwitched { model, result } => self.model_switched(model, result),
            BackendEvent::Market(Ok(snapshot)) => self.replace_market(snapshot),
            BackendEvent::Market(Err(err)) => {
                warn!("loading market data failed: {:#}", err);
            }
            BackendEvent::Status(result) => self.set_status(result),
        }
    }

    // Market and status

    /// Swap in a new snapshot. All three lists are replaced together.
    pub fn replace_market(&mut self, snapshot: MarketOverview) {
        info!(
            indices = snapshot.indices.len(),
            sectors = snapshot.sectors.len(),
            hot_stocks = snapshot.hot_stocks.len(),
            "market snapshot loaded"
        );
        self.indices = snapshot.indices;
        self.sectors = snapshot.sectors;
        self.hot_stocks = snapshot.hot_stocks;
        self.market_sentiment = snapshot.market_sentiment;
    }

    pub fn set_status(&mut self, result: anyhow::Result<()>) {
        let status = match &result {
            Ok(()) => ApiStatus::Connected,
            Err(_) => ApiStatus::Disconnected,
        };
        if status != self.api_status {
            match result {
                Ok(()) => info!("backend reachable"),
                Err(err) => warn!("backend unreachable: {:#}", err),
            }
        }
        self.api_status = status;
    }

    pub fn toggle_market_panel(&mut self) {
        self.show_market_panel = !self.show_market_panel;
    }

    // Notifications and animation

    pub fn notify(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.notification = Some(Notification {
            text: text.into(),
            kind,
            ticks_left: NOTIFICATION_TICKS,
        });
    }

    /// Tick animation frame and expire notifications (called by Tick event)
    pub fn tick(&mut self) {
        if self.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        let expired = match self.notification.as_mut() {
            Some(notice) => {
                notice.ticks_left = notice.ticks_left.saturating_sub(1);
                notice.ticks_left == 0
            }
            None => false,
        };
        if expired {
            self.notification = None;
        }
    }

    // Model picker

    pub fn open_model_picker(&mut self) {
        self.model_picker_state.select(Some(self.current_model.index()));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = ModelId::all().len();
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Apply the highlighted picker entry. Returns the model to announce to the server.
    pub fn confirm_model_choice(&mut self) -> Option<ModelId> {
        self.show_model_picker = false;
        let model = self
            .model_picker_state
            .selected()
            .and_then(|i| ModelId::all().get(i).copied())?;
        self.select_model(model);
        Some(model)
    }

    pub fn select_model(&mut self, model: ModelId) {
        self.current_model = model;
        self.show_model_picker = false;
        if let Some(path) = &self.config_path {
            if let Err(err) = Config::save_default_model(path, model) {
                warn!("could not save model choice: {:#}", err);
            }
        }
    }

    pub fn model_switched(&mut self, model: ModelId, result: anyhow::Result<()>) {
        match result {
            Ok(()) => {
                info!(model = model.as_str(), "model switched");
                self.notify(format!("Switched to {}", model.display_name()), NoticeKind::Success);
            }
            Err(err) => {
                warn!("model switch failed: {:#}", err);
                self.notify("Model switch failed", NoticeKind::Error);
            }
        }
    }

    // Function palette

    pub fn set_function_tab(&mut self, tab: FunctionTab) {
        self.function_tab = tab;
        self.function_state.select(Some(0));
    }

    pub fn function_nav_down(&mut self) {
        let len = self.function_tab.items().len();
        if len > 0 {
            let i = self.function_state.selected().unwrap_or(0);
            self.function_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn function_nav_up(&mut self) {
        let i = self.function_state.selected().unwrap_or(0);
        self.function_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected_function(&self) -> Option<&'static FunctionItem> {
        self.function_state
            .selected()
            .and_then(|i| self.function_tab.items().get(i))
    }

    pub fn select_function(&mut self) {
        if let Some(item) = self.selected_function() {
            self.insert_command(item.prompt);
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Chat,
            Focus::Chat => Focus::Functions,
            Focus::Functions => Focus::Input,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Functions,
            Focus::Chat => Focus::Input,
            Focus::Functions => Focus::Chat,
        };
    }

    // Attachments

    pub fn open_attach_input(&mut self) {
        self.attach_input.clear();
        self.attach_cursor = 0;
        self.show_attach_input = true;
    }

    pub fn close_attach_input(&mut self) {
        self.show_attach_input = false;
        self.attach_input.clear();
        self.attach_cursor = 0;
    }

    pub fn attach_insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.attach_input, self.attach_cursor);
        self.attach_input.insert(byte_pos, c);
        self.attach_cursor += 1;
    }

    pub fn attach_backspace(&mut self) {
        if self.attach_cursor > 0 {
            self.attach_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.attach_input, self.attach_cursor);
            self.attach_input.remove(byte_pos);
        }
    }

    /// Prefix the input with the names of the listed files that exist.
    pub fn confirm_attach(&mut self) {
        let mut names = Vec::new();
        let mut missing = Vec::new();

        for raw in self.attach_input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let path = expand_home(raw);
            match path.file_name().filter(|_| path.is_file()) {
                Some(name) => names.push(name.to_string_lossy().into_owned()),
                None => missing.push(raw.to_string()),
            }
        }

        if !names.is_empty() {
            let prefix = format!("[Uploaded: {}]\n", names.join(", "));
            self.input.insert_str(0, &prefix);
            self.input_cursor += prefix.chars().count();
            self.focus = Focus::Input;
        }
        if !missing.is_empty() {
            self.notify(format!("Not found: {}", missing.join(", ")), NoticeKind::Error);
        }

        self.close_attach_input();
    }

    // Chart actions

    pub fn latest_chart(&self) -> Option<&ChartCard> {
        self.transcript.iter().rev().find_map(|entry| match entry {
            Entry::Chart(card) => Some(card),
            _ => None,
        })
    }

    pub fn save_latest_chart(&mut self) {
        let Some(image) = self.latest_chart().map(|card| card.image.clone()) else {
            self.notify("No chart to download", NoticeKind::Info);
            return;
        };
        let dir = self.config.download_dir();
        match desktop::save_chart(&image, &dir) {
            Ok(path) => {
                info!(path = %path.display(), "chart saved");
                self.notify(format!("Chart saved to {}", path.display()), NoticeKind::Success);
            }
            Err(err) => {
                warn!("saving chart failed: {:#}", err);
                self.notify(format!("Download failed: {}", err), NoticeKind::Error);
            }
        }
    }

    pub fn copy_latest_chart(&mut self) {
        let Some(image) = self.latest_chart().map(|card| card.image.clone()) else {
            self.notify("No chart to copy", NoticeKind::Info);
            return;
        };
        match desktop::copy_to_clipboard(&image) {
            Ok(()) => self.notify("Chart copied to clipboard", NoticeKind::Success),
            Err(err) => {
                warn!("copying chart failed: {:#}", err);
                self.notify(format!("Copy failed: {}", err), NoticeKind::Error);
            }
        }
    }

    pub fn open_workflow(&mut self) {
        let url = self.config.workflow_url.clone();
        match desktop::open_url(&url) {
            Ok(()) => self.notify(format!("Opened {}", url), NoticeKind::Info),
            Err(err) => {
                warn!("opening workflow tool failed: {:#}", err);
                self.notify(format!("Could not open {}", url), NoticeKind::Error);
            }
        }
    }

    // Chat scrolling

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    /// Scrolling past the end is clamped by the renderer, which also re-enables tail following.
    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_tail = false;
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.follow_tail = true;
    }
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| Path::new(raw).to_path_buf()),
        None => PathBuf::from(raw),
    }
}
