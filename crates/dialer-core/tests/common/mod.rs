//! Mock collaborators for dialer-core integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dialer_core::{
    AudioDevice, AudioMode, AudioOutput, AudioResult, AudioRouteError, CallCapabilities, CallDetails,
    CallHandle, CallLogProvider, CallPlacer, ContactEntry, ContactProvider, EventEmitter, HistoryError,
    HistoryResult, InCallAudio, LastDialed, PlatformCall, PlatformCallState, PlatformError,
    RawCallRecord, SessionConfig,
};
use dialer_core::{AudioRoute, CallSession};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Platform call that records every command it receives
pub struct MockCall {
    handle: CallHandle,
    details: Mutex<CallDetails>,
    state: Mutex<PlatformCallState>,
    pub commands: Mutex<Vec<&'static str>>,
    fail_commands: AtomicBool,
}

impl MockCall {
    pub fn new(number: &str, state: PlatformCallState) -> Arc<Self> {
        Arc::new(Self {
            handle: CallHandle::new_v4(),
            details: Mutex::new(CallDetails::new(number)),
            state: Mutex::new(state),
            commands: Mutex::new(Vec::new()),
            fail_commands: AtomicBool::new(false),
        })
    }

    pub fn holdable(number: &str, state: PlatformCallState) -> Arc<Self> {
        let call = Self::new(number, state);
        call.set_capabilities(CallCapabilities::from_bits(
            CallCapabilities::HOLD | CallCapabilities::SUPPORT_HOLD,
        ));
        call
    }

    pub fn set_state(&self, state: PlatformCallState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn set_display_name(&self, name: &str) {
        self.details.lock().unwrap().display_name = Some(name.to_string());
    }

    pub fn set_capabilities(&self, capabilities: CallCapabilities) {
        self.details.lock().unwrap().capabilities = capabilities;
    }

    pub fn fail_commands(&self) {
        self.fail_commands.store(true, Ordering::SeqCst);
    }

    pub fn commands(&self) -> Vec<&'static str> {
        self.commands.lock().unwrap().clone()
    }

    fn record(&self, command: &'static str) -> Result<(), PlatformError> {
        self.commands.lock().unwrap().push(command);
        if self.fail_commands.load(Ordering::SeqCst) {
            Err(PlatformError::rejected(format!("{command} not allowed")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlatformCall for MockCall {
    fn handle(&self) -> CallHandle {
        self.handle
    }

    fn details(&self) -> CallDetails {
        self.details.lock().unwrap().clone()
    }

    fn state(&self) -> PlatformCallState {
        *self.state.lock().unwrap()
    }

    async fn answer(&self) -> Result<(), PlatformError> {
        self.record("answer")
    }

    async fn disconnect(&self) -> Result<(), PlatformError> {
        self.record("disconnect")
    }

    async fn hold(&self) -> Result<(), PlatformError> {
        self.record("hold")
    }

    async fn unhold(&self) -> Result<(), PlatformError> {
        self.record("unhold")
    }
}

type PlaceHook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockPlacer {
    pub dialed: Mutex<Vec<String>>,
    reject: AtomicBool,
    /// Runs inside `place_call`, before it returns
    on_place: Mutex<Option<PlaceHook>>,
}

impl MockPlacer {
    pub fn rejecting() -> Arc<Self> {
        let placer = Self::default();
        placer.reject.store(true, Ordering::SeqCst);
        Arc::new(placer)
    }

    pub fn on_place(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_place.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn dialed(&self) -> Vec<String> {
        self.dialed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallPlacer for MockPlacer {
    async fn place_call(&self, number: &str) -> Result<(), PlatformError> {
        self.dialed.lock().unwrap().push(number.to_string());
        if self.reject.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied {
                reason: "CALL_PHONE not granted".to_string(),
            });
        }
        if let Some(hook) = self.on_place.lock().unwrap().as_ref() {
            hook();
        }
        Ok(())
    }
}

/// Audio manager stand-in
pub struct MockAudioDevice {
    pub mode: Mutex<AudioMode>,
    pub speakerphone: AtomicBool,
    pub mic_muted: AtomicBool,
    pub calls: Mutex<Vec<String>>,
    broken: bool,
}

impl MockAudioDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_broken(false))
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self::with_broken(true))
    }

    fn with_broken(broken: bool) -> Self {
        Self {
            mode: Mutex::new(AudioMode::Normal),
            speakerphone: AtomicBool::new(false),
            mic_muted: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            broken,
        }
    }

    pub fn mode(&self) -> AudioMode {
        *self.mode.lock().unwrap()
    }

    pub fn set_current_mode(&self, mode: AudioMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, call: String) -> AudioResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.broken {
            Err(AudioRouteError::device("audio service unavailable"))
        } else {
            Ok(())
        }
    }
}

impl AudioDevice for MockAudioDevice {
    fn set_microphone_mute(&self, muted: bool) -> AudioResult<()> {
        self.check(format!("mute:{muted}"))?;
        self.mic_muted.store(muted, Ordering::SeqCst);
        Ok(())
    }

    fn is_microphone_mute(&self) -> AudioResult<bool> {
        Ok(self.mic_muted.load(Ordering::SeqCst))
    }

    fn set_speakerphone_on(&self, on: bool) -> AudioResult<()> {
        self.check(format!("speaker:{on}"))?;
        self.speakerphone.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn is_speakerphone_on(&self) -> AudioResult<bool> {
        Ok(self.speakerphone.load(Ordering::SeqCst))
    }

    fn set_mode(&self, mode: AudioMode) -> AudioResult<()> {
        self.check(format!("mode:{mode:?}"))?;
        *self.mode.lock().unwrap() = mode;
        Ok(())
    }

    fn mode(&self) -> AudioResult<AudioMode> {
        Ok(*self.mode.lock().unwrap())
    }
}

/// In-call surface that records route requests
#[derive(Default)]
pub struct MockInCallAudio {
    pub requests: Mutex<Vec<String>>,
    fail: bool,
}

impl MockInCallAudio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: String) -> AudioResult<()> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            Err(AudioRouteError::Rejected {
                reason: "surface not in foreground".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl InCallAudio for MockInCallAudio {
    fn set_muted(&self, muted: bool) -> AudioResult<()> {
        self.record(format!("mute:{muted}"))
    }

    fn set_audio_route(&self, output: AudioOutput) -> AudioResult<()> {
        self.record(format!("route:{output:?}"))
    }
}

pub struct StaticCallLog(pub Mutex<Vec<RawCallRecord>>);

impl StaticCallLog {
    pub fn new(records: Vec<RawCallRecord>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(records)))
    }

    pub fn push(&self, record: RawCallRecord) {
        self.0.lock().unwrap().insert(0, record);
    }
}

#[async_trait]
impl CallLogProvider for StaticCallLog {
    async fn fetch_recent(&self, window: Option<usize>) -> HistoryResult<Vec<RawCallRecord>> {
        let records = self.0.lock().unwrap().clone();
        Ok(records.into_iter().take(window.unwrap_or(usize::MAX)).collect())
    }
}

pub struct FailingCallLog;

#[async_trait]
impl CallLogProvider for FailingCallLog {
    async fn fetch_recent(&self, _window: Option<usize>) -> HistoryResult<Vec<RawCallRecord>> {
        Err(HistoryError::provider_read_failed("call_log", "permission revoked"))
    }
}

pub struct StaticContacts(pub Vec<ContactEntry>);

#[async_trait]
impl ContactProvider for StaticContacts {
    async fn fetch_contacts(&self) -> HistoryResult<Vec<ContactEntry>> {
        Ok(self.0.clone())
    }
}

/// Session wired to mocks, plus handles to inspect them
pub struct Harness {
    pub session: Arc<CallSession>,
    pub placer: Arc<MockPlacer>,
    pub device: Arc<MockAudioDevice>,
    pub events: EventEmitter,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_placer(Arc::new(MockPlacer::default()))
    }

    pub fn with_placer(placer: Arc<MockPlacer>) -> Self {
        let device = MockAudioDevice::new();
        let events = EventEmitter::new(64);
        let session = Arc::new(CallSession::new(
            placer.clone(),
            Arc::new(AudioRoute::new(Some(device.clone()))),
            events.clone(),
            Arc::new(LastDialed::in_memory()),
            SessionConfig::default(),
        ));
        Self {
            session,
            placer,
            device,
            events,
        }
    }
}
