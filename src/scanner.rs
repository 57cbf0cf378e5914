pub mod extractors;
pub mod log_reader;
pub mod payload;
pub mod session;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use nanoid::nanoid;
use thiserror::Error;

use crate::dataset::{locate_dataset, CardDataset, Dataset};
use crate::draft_log::DraftLogRecorder;
use crate::limited_sets::SetList;
use crate::models::card::Card;
use crate::models::draft_data::{CardId, PackCoordinate, PickHistory, PickRecord, SeatPacks};
use crate::models::draft_session::{DraftSession, SessionEvent, DEFAULT_SEAT_COUNT};
use crate::ocr::{self, Recognizer};
use crate::opt::{log_if, warn_if, DbgFlg};
use extractors::{Channel, ChannelKind, DispatchPlan, Observation};
use log_reader::{file_size, scan_lines, Flow, Offsets};
use session::{classify_event, find_start_marker, parse_start_entry};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("payload not found: {0}")]
    MissingPayload(String),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

impl ScanError {
    fn io(path: &Path, source: io::Error) -> Self {
        ScanError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannerOptions {
    /// Stop each channel after its first applied line.
    pub step_through: bool,
    /// Expose ids missing from the dataset as placeholder cards.
    pub retrieve_unknown: bool,
    /// Premier drafts use the older `Draft.MakeHumanDraftPick` layout.
    pub legacy_premier: bool,
    pub ocr_timeout: Duration,
    /// Folder searched for the set file of each new session.
    pub sets_dir: Option<PathBuf>,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        ScannerOptions {
            step_through: false,
            retrieve_unknown: false,
            legacy_premier: false,
            ocr_timeout: Duration::from_secs(ocr::DEFAULT_TIMEOUT_SECS),
            sets_dir: None,
        }
    }
}

/// Copy of everything a reader may ask the scanner, taken between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub session: Option<SessionEvent>,
    pub coordinate: PackCoordinate,
    pub pack: Vec<CardId>,
    pub missing: Vec<CardId>,
    pub taken: Vec<CardId>,
    pub picked: Vec<CardId>,
    pub picks: Vec<PickRecord>,
}

/// Tails the client log and rebuilds the draft as it happens.
///
/// Callers poll [`Scanner::check_session`] and then [`Scanner::check_data`] on a timer.
/// The log file is opened and closed inside each call.
pub struct Scanner {
    log_path: PathBuf,
    sets: SetList,
    options: ScannerOptions,
    offsets: Offsets,
    file_size: u64,
    session: Option<DraftSession>,
    plan: Option<DispatchPlan>,
    coordinate: PackCoordinate,
    packs: SeatPacks,
    history: PickHistory,
    ocr_attempted: bool,
    ocr_seeded: bool,
    dataset: Option<Box<dyn Dataset>>,
    recognizer: Option<Arc<dyn Recognizer>>,
    recorder: DraftLogRecorder,
}

impl Scanner {
    pub fn new(
        log_path: impl Into<PathBuf>,
        sets: SetList,
        options: ScannerOptions,
        recorder: DraftLogRecorder,
    ) -> Self {
        Scanner {
            log_path: log_path.into(),
            sets,
            options,
            offsets: Offsets::default(),
            file_size: 0,
            session: None,
            plan: None,
            coordinate: PackCoordinate::default(),
            packs: SeatPacks::new(DEFAULT_SEAT_COUNT),
            history: PickHistory::new(DEFAULT_SEAT_COUNT),
            ocr_attempted: false,
            ocr_seeded: false,
            dataset: None,
            recognizer: None,
            recorder,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Switches to another log file and forgets everything read so far.
    pub fn set_log_path(&mut self, path: impl Into<PathBuf>) {
        self.log_path = path.into();
        self.full_reset();
    }

    pub fn set_dataset(&mut self, dataset: Box<dyn Dataset>) {
        self.dataset = Some(dataset);
    }

    pub fn set_recognizer(&mut self, recognizer: Arc<dyn Recognizer>) {
        self.recognizer = Some(recognizer);
    }

    pub fn set_draft_log_enabled(&mut self, enabled: bool) {
        self.recorder.set_enabled(enabled);
    }

    pub fn draft_log_enabled(&self) -> bool {
        self.recorder.is_enabled()
    }

    pub fn suspend_draft_log(&mut self, suspended: bool) {
        self.recorder.suspend(suspended);
    }

    pub fn draft_log_file(&self) -> Option<&Path> {
        self.recorder.current_file()
    }

    /// Looks for the start of a new event. Failures are logged and reported as "nothing new".
    pub fn check_session(&mut self) -> Option<SessionEvent> {
        self.try_check_session().unwrap_or_else(|err| {
            warn_if(&format!("Session search failed: {}", err), DbgFlg::Session);
            None
        })
    }

    pub fn try_check_session(&mut self) -> Result<Option<SessionEvent>, ScanError> {
        let path = self.log_path.clone();
        let size = file_size(&path).map_err(|err| ScanError::io(&path, err))?;
        if size < self.file_size {
            log_if(
                &format!(
                    "Log shrank from {} to {} bytes, starting over",
                    self.file_size, size
                ),
                DbgFlg::Session,
            );
            self.full_reset();
        }
        self.file_size = size;

        let mut latest = None;
        let end = scan_lines(&path, self.offsets.search, |line, end| {
            self.offsets.search = end;
            if let Some(event) = self.detect_start(line, end) {
                latest = Some(event);
            }
            Flow::Continue
        })
        .map_err(|err| ScanError::io(&path, err))?;
        self.offsets.search = end;

        Ok(latest)
    }

    /// Reads new pack, pick and pool lines for the active session. Returns whether anything changed.
    pub fn check_data(&mut self, use_ocr: bool) -> bool {
        self.try_check_data(use_ocr).unwrap_or_else(|err| {
            warn_if(&format!("Draft data search failed: {}", err), DbgFlg::Scanner);
            false
        })
    }

    pub fn try_check_data(&mut self, use_ocr: bool) -> Result<bool, ScanError> {
        let Some(plan) = self.plan.clone() else {
            return Ok(false);
        };
        let before = (self.coordinate, self.history.last_pick);

        let mut applied = false;
        if use_ocr && plan.uses_ocr {
            applied |= self.run_ocr_gate();
        }
        for channel in plan.channels.iter() {
            applied |= self.scan_channel(channel)?;
        }

        Ok(applied || before != (self.coordinate, self.history.last_pick))
    }

    fn detect_start(&mut self, line: &str, end: u64) -> Option<SessionEvent> {
        let marker = find_start_marker(line)?;
        let entry = match parse_start_entry(line, marker) {
            Ok(entry) => entry,
            Err(err) => {
                warn_if(&format!("Unreadable start line: {}", err), DbgFlg::Session);
                return None;
            }
        };
        log_if(&format!("Event found {}", entry.event_name), DbgFlg::Session);

        let Some(class) = classify_event(&entry.event_name, &self.sets, self.options.legacy_premier)
        else {
            log_if(
                &format!("Event {} is not a limited event", entry.event_name),
                DbgFlg::Session,
            );
            return None;
        };

        let session = DraftSession {
            format: class.format,
            set_codes: class.set_codes,
            seat_count: class.seat_count,
            session_id: entry.id.unwrap_or_else(|| nanoid!(10)),
            label: class.label,
            event_name: entry.event_name,
        };
        self.start_session(session, line, end);
        self.session.as_ref().map(SessionEvent::from)
    }

    fn start_session(&mut self, session: DraftSession, line: &str, end: u64) {
        self.reset_state(session.seat_count);
        self.offsets.draft_start = end;
        self.offsets.pack = end;
        self.offsets.pick = end;
        self.plan = Some(DispatchPlan::for_format(session.format));

        self.recorder
            .start(session.primary_set(), &session.label, &session.session_id);
        self.recorder.record(line);
        self.load_dataset(&session);

        log_if(
            &format!(
                "New draft detected {} {:?} ({} seats)",
                session.format, session.set_codes, session.seat_count
            ),
            DbgFlg::Session,
        );
        self.session = Some(session);
    }

    fn load_dataset(&mut self, session: &DraftSession) {
        self.dataset = None;
        let Some(dir) = self.options.sets_dir.as_ref() else {
            return;
        };
        let Some(path) = locate_dataset(dir, session.primary_set(), &session.label) else {
            log_if(
                &format!("No local dataset for {}", session.primary_set()),
                DbgFlg::Scanner,
            );
            return;
        };
        match CardDataset::load(&path) {
            Ok(dataset) => self.dataset = Some(Box::new(dataset)),
            Err(err) => warn_if(&err, DbgFlg::Scanner),
        }
    }

    fn scan_channel(&mut self, channel: &Channel) -> Result<bool, ScanError> {
        let path = self.log_path.clone();
        let event_name = self
            .session
            .as_ref()
            .map(|session| session.event_name.clone())
            .unwrap_or_default();
        let step = self.options.step_through;
        let start = self.channel_offset(channel.kind);

        let mut applied = false;
        let end = scan_lines(&path, start, |line, end| {
            self.set_channel_offset(channel.kind, end);

            let mut matched = false;
            for extractor in channel.extractors.iter() {
                match extractor.extract(line, &event_name) {
                    Ok(Some(observation)) => {
                        self.recorder.record(line);
                        log_if(
                            &format!("{}: {:?}", extractor.name(), observation),
                            DbgFlg::Scanner,
                        );
                        matched |= self.apply(observation);
                    }
                    Ok(None) => {}
                    Err(err) => warn_if(
                        &format!("{} skipped a line: {}", extractor.name(), err),
                        DbgFlg::Scanner,
                    ),
                }
            }

            applied |= matched;
            if step && matched {
                Flow::Stop
            } else {
                Flow::Continue
            }
        })
        .map_err(|err| ScanError::io(&path, err))?;
        self.set_channel_offset(channel.kind, end);

        Ok(applied)
    }

    fn channel_offset(&self, kind: ChannelKind) -> u64 {
        match kind {
            ChannelKind::Pack => self.offsets.pack,
            ChannelKind::Pick => self.offsets.pick,
        }
    }

    fn set_channel_offset(&mut self, kind: ChannelKind, offset: u64) {
        match kind {
            ChannelKind::Pack => self.offsets.pack = offset,
            ChannelKind::Pick => self.offsets.pick = offset,
        }
    }

    fn apply(&mut self, observation: Observation) -> bool {
        let seat_count = self.packs.seat_count();
        match observation {
            Observation::Pack {
                coordinate,
                cards,
                first_pick,
                picked,
            } => {
                let seat = coordinate.seat(seat_count);
                if first_pick && self.ocr_seeded {
                    // the log replaces whatever was read off the screen
                    self.packs.overwrite(seat, cards);
                    self.ocr_seeded = false;
                } else {
                    if coordinate.pack != self.coordinate.pack {
                        self.packs.clear_initial();
                    }
                    self.packs.observe(seat, cards);
                }

                if !first_pick || self.coordinate.is_unset() {
                    self.coordinate = coordinate;
                }
                self.history.seed_pool(picked);
                true
            }
            Observation::Pick { coordinate, cards } => {
                self.history.record(coordinate, cards);
                true
            }
            Observation::Pool(cards) => self.history.seed_pool(cards),
        }
    }

    /// Seeds P1P1 from the recognizer, once per session, before the log reports it.
    fn run_ocr_gate(&mut self) -> bool {
        if !self.coordinate.is_unset() || self.ocr_attempted {
            return false;
        }
        let Some(recognizer) = self.recognizer.clone() else {
            return false;
        };
        let Some(dataset) = self.dataset.as_ref() else {
            return false;
        };
        let names = dataset.all_names();
        if names.is_empty() {
            return false;
        }

        self.ocr_attempted = true;
        let found = match ocr::recognize_with_timeout(recognizer, names, self.options.ocr_timeout)
        {
            Ok(found) => found,
            Err(err) => {
                warn_if(&format!("OCR failed: {}", err), DbgFlg::Ocr);
                return false;
            }
        };

        let ids = dataset.ids_by_name(&found);
        if ids.is_empty() {
            log_if("OCR found no known cards", DbgFlg::Ocr);
            return false;
        }

        log_if(&format!("OCR seeded P1P1 with {} cards", ids.len()), DbgFlg::Ocr);
        self.packs.overwrite(0, ids);
        self.coordinate = PackCoordinate::new(1, 1);
        self.ocr_seeded = true;
        true
    }

    fn reset_state(&mut self, seat_count: usize) {
        self.session = None;
        self.plan = None;
        self.coordinate = PackCoordinate::default();
        self.packs = SeatPacks::new(seat_count);
        self.history = PickHistory::new(seat_count);
        self.ocr_attempted = false;
        self.ocr_seeded = false;
    }

    fn full_reset(&mut self) {
        self.offsets = Offsets::default();
        self.file_size = 0;
        self.dataset = None;
        self.reset_state(DEFAULT_SEAT_COUNT);
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    pub fn session(&self) -> Option<&DraftSession> {
        self.session.as_ref()
    }

    pub fn coordinate(&self) -> PackCoordinate {
        self.coordinate
    }

    /// (first set code, label) of the active session, empty when none.
    pub fn current_event(&self) -> (String, String) {
        self.session
            .as_ref()
            .map(|session| (session.primary_set().to_string(), session.label.clone()))
            .unwrap_or_default()
    }

    fn current_seat(&self) -> usize {
        self.coordinate.seat(self.packs.seat_count())
    }

    pub fn current_pack(&self) -> Vec<CardId> {
        self.packs.seat(self.current_seat()).current.clone()
    }

    pub fn missing(&self) -> Vec<CardId> {
        self.packs.missing(self.current_seat())
    }

    pub fn taken(&self) -> &[CardId] {
        &self.history.pool
    }

    /// Cards taken this pack from the pack seen at the latest pick.
    pub fn picked_this_pack(&self) -> Vec<CardId> {
        let seat = self.history.last_pick.seat(self.packs.seat_count());
        self.history.picked_this_pack(seat).to_vec()
    }

    pub fn picks(&self) -> &[PickRecord] {
        &self.history.records
    }

    fn resolve(&self, ids: &[CardId]) -> Vec<Card> {
        match self.dataset.as_ref() {
            Some(dataset) => dataset.cards_by_id(ids, self.options.retrieve_unknown),
            None if self.options.retrieve_unknown => ids.iter().map(|id| Card::unknown(id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn current_pack_cards(&self) -> Vec<Card> {
        self.resolve(&self.current_pack())
    }

    pub fn missing_cards(&self) -> Vec<Card> {
        self.resolve(&self.missing())
    }

    pub fn taken_cards(&self) -> Vec<Card> {
        self.resolve(self.taken())
    }

    pub fn picked_cards(&self) -> Vec<Card> {
        self.resolve(&self.picked_this_pack())
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            session: self.session.as_ref().map(SessionEvent::from),
            coordinate: self.coordinate,
            pack: self.current_pack(),
            missing: self.missing(),
            taken: self.taken().to_vec(),
            picked: self.picked_this_pack(),
            picks: self.picks().to_vec(),
        }
    }
}
