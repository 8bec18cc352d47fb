//! Call session state machine
//!
//! [`CallSession`] is the single source of truth for the current call. It
//! binds to at most one [`PlatformCall`], maps the platform's state changes
//! onto [`CallState`], drives audio side effects through [`AudioRoute`] and
//! forwards user commands to the platform.
//!
//! Every transition replaces the whole state in one `watch` send, so an
//! observer never sees a half-applied change. Platform events are applied in
//! arrival order (last writer wins).
//!
//! | platform event | state        | side effect                              |
//! |----------------|--------------|------------------------------------------|
//! | `Dialing`      | `Dialing`    |                                          |
//! | `Ringing`      | `Incoming`   |                                          |
//! | `Connecting`   | `Connecting` | engage call audio                        |
//! | `Active`       | `Active`     | engage call audio, start duration timer  |
//! | `Holding`      | `OnHold`     |                                          |
//! | `Disconnected` | `Ended`      | reset audio, clear call start            |
//!
//! Unregistering the call handle moves the session to `Idle`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::audio::{AudioPath, AudioRoute, InCallAudio};
use crate::call::{CallDetails, CallHandle, CallState, PlatformCallState, PlatformError};
use crate::config::SessionConfig;
use crate::error::{DialerError, DialerResult};
use crate::events::{DialerEvent, EventEmitter};
use crate::platform::{CallPlacer, PlatformCall};
use crate::prefs::LastDialed;

mod duration;

use duration::CallClock;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the state of the single current call
pub struct CallSession {
    state: watch::Sender<CallState>,
    clock: CallClock,
    call: Mutex<Option<Arc<dyn PlatformCall>>>,
    /// Hold state last requested from the platform, until the platform reports back
    requested_hold: Mutex<Option<bool>>,
    muted: AtomicBool,
    speaker_on: AtomicBool,
    placer: Arc<dyn CallPlacer>,
    audio: Arc<AudioRoute>,
    events: EventEmitter,
    last_dialed: Arc<LastDialed>,
    config: SessionConfig,
    runtime: Option<Handle>,
}

impl CallSession {
    /// Create an idle session.
    ///
    /// When called inside a tokio runtime, that runtime also hosts the
    /// duration timer for calls reported from non-runtime threads.
    pub fn new(
        placer: Arc<dyn CallPlacer>,
        audio: Arc<AudioRoute>,
        events: EventEmitter,
        last_dialed: Arc<LastDialed>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(CallState::Idle);
        Self {
            state,
            clock: CallClock::new(config.duration_tick()),
            call: Mutex::new(None),
            requested_hold: Mutex::new(None),
            muted: AtomicBool::new(false),
            speaker_on: AtomicBool::new(false),
            placer,
            audio,
            events,
            last_dialed,
            config,
            runtime: Handle::try_current().ok(),
        }
    }

    // ===== Observation =====

    pub fn state(&self) -> CallState {
        self.state.borrow().clone()
    }

    /// Receiver that always holds the latest state
    pub fn subscribe_state(&self) -> watch::Receiver<CallState> {
        self.state.subscribe()
    }

    /// Current state first, then every change
    pub fn state_stream(&self) -> WatchStream<CallState> {
        WatchStream::new(self.state.subscribe())
    }

    /// Elapsed seconds of the current call (0 when there is none)
    pub fn call_duration_secs(&self) -> u64 {
        self.clock.seconds()
    }

    pub fn subscribe_duration(&self) -> watch::Receiver<u64> {
        self.clock.subscribe()
    }

    pub fn duration_stream(&self) -> WatchStream<u64> {
        WatchStream::new(self.clock.subscribe())
    }

    /// When the current call first became active
    pub fn call_started_at(&self) -> Option<tokio::time::Instant> {
        self.clock.started_at()
    }

    /// Last requested microphone mute
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Last requested speaker state
    pub fn is_speaker_on(&self) -> bool {
        self.speaker_on.load(Ordering::SeqCst)
    }

    pub fn current_call(&self) -> Option<CallHandle> {
        lock(&self.call).as_ref().map(|call| call.handle())
    }

    pub fn audio_route(&self) -> &Arc<AudioRoute> {
        &self.audio
    }

    // ===== Platform side =====

    /// Bind `call` as the current call and apply its present state
    pub fn register_call(&self, call: Arc<dyn PlatformCall>) {
        let handle = call.handle();
        let platform_state = call.state();
        let details = call.details();
        {
            let mut slot = lock(&self.call);
            if let Some(previous) = slot.as_ref() {
                if previous.handle() != handle {
                    warn!(previous = %previous.handle(), handle = %handle, "replacing bound call");
                }
            }
            *slot = Some(call);
        }
        *lock(&self.requested_hold) = None;
        info!(handle = %handle, state = ?platform_state, "call registered");
        self.apply_platform_state(platform_state, &details);
    }

    /// Unbind the call; the session returns to `Idle`.
    ///
    /// Ignored when `handle` is not the bound call.
    pub fn unregister_call(&self, handle: CallHandle) {
        {
            let mut slot = lock(&self.call);
            match slot.as_ref() {
                Some(call) if call.handle() == handle => *slot = None,
                _ => {
                    debug!(handle = %handle, "unregister for unknown call ignored");
                    return;
                }
            }
        }
        *lock(&self.requested_hold) = None;
        self.audio.reset_audio();
        self.clock.reset();
        self.muted.store(false, Ordering::SeqCst);
        self.speaker_on.store(false, Ordering::SeqCst);
        info!(handle = %handle, "call unregistered");
        self.transition(CallState::Idle);
    }

    /// Platform callback: the call behind `handle` changed state.
    ///
    /// Safe to call from any thread. Events for a handle other than the
    /// bound call are ignored.
    pub fn on_call_state_changed(&self, handle: CallHandle, platform_state: PlatformCallState) {
        let call = match lock(&self.call).as_ref() {
            Some(call) if call.handle() == handle => Arc::clone(call),
            _ => {
                debug!(handle = %handle, state = ?platform_state, "state change for unbound call ignored");
                return;
            }
        };
        *lock(&self.requested_hold) = None;
        self.apply_platform_state(platform_state, &call.details());
    }

    fn apply_platform_state(&self, platform_state: PlatformCallState, details: &CallDetails) {
        let number = details.number.clone().unwrap_or_default();
        let unknown = &self.config.unknown_caller_label;

        match platform_state {
            PlatformCallState::New | PlatformCallState::Disconnecting => {
                debug!(state = ?platform_state, "transient platform state, no transition");
            }
            PlatformCallState::Dialing => {
                let display_name = self.display_name_for(details, &number, unknown);
                self.transition(CallState::Dialing { number, display_name });
            }
            PlatformCallState::Ringing => {
                let display_name =
                    self.display_name_for(details, &number, &self.config.unknown_incoming_label);
                self.transition(CallState::Incoming { number, display_name });
            }
            PlatformCallState::Connecting => {
                let display_name = self.display_name_for(details, &number, unknown);
                self.transition(CallState::Connecting { number, display_name });
                self.audio.engage_call_audio();
            }
            PlatformCallState::Active => {
                let display_name = self.display_name_for(details, &number, unknown);
                self.clock.mark_started();
                self.transition(CallState::Active { number, display_name });
                self.audio.engage_call_audio();
                self.clock.ensure_running(self.state.subscribe(), self.runtime.as_ref());
            }
            PlatformCallState::Holding => {
                let display_name = self.display_name_for(details, &number, unknown);
                self.transition(CallState::OnHold { number, display_name });
            }
            PlatformCallState::Disconnected => {
                self.transition(CallState::Ended);
                self.audio.reset_audio();
                self.clock.reset();
            }
        }
    }

    /// Platform name, else the name already shown for this number, else `fallback`
    fn display_name_for(&self, details: &CallDetails, number: &str, fallback: &str) -> String {
        if let Some(name) = details.display_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let current = self.state.borrow();
        match (current.number(), current.display_name()) {
            (Some(current_number), Some(name)) if current_number == number => name.to_string(),
            _ => fallback.to_string(),
        }
    }

    fn transition(&self, next: CallState) {
        let previous = self.state.send_replace(next.clone());
        if previous != next {
            info!(from = %previous, to = %next, "call state changed");
            self.events.emit(DialerEvent::CallStateChanged {
                previous,
                current: next,
                timestamp: Utc::now(),
            });
        }
    }

    fn bound_call(&self) -> DialerResult<Arc<dyn PlatformCall>> {
        lock(&self.call).as_ref().cloned().ok_or(DialerError::NoActiveCall)
    }

    // ===== User commands =====

    /// Ask the platform to dial `number`.
    ///
    /// Fails without touching the state for an empty number or while another
    /// call is live. If the platform rejects the request the state becomes
    /// [`CallState::Error`] and the error is returned.
    pub async fn start_call(&self, number: &str, display_name: Option<&str>) -> DialerResult<()> {
        let number = number.trim();
        if number.is_empty() {
            return Err(DialerError::invalid_number(number));
        }
        // Any platform report from here on marks `observer` changed
        let observer = self.state.subscribe();
        let current = observer.borrow().clone();
        if current.is_live() {
            return Err(DialerError::CallInProgress {
                state: current.name().to_string(),
            });
        }

        if let Err(e) = self.last_dialed.set(number).await {
            warn!(error = %e, "failed to remember last dialed number");
        }

        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.config.unknown_caller_label.as_str())
            .to_string();

        match self.placer.place_call(number).await {
            Ok(()) => {
                let dialing = CallState::Dialing {
                    number: number.to_string(),
                    display_name,
                };
                // The platform's own reports win over the optimistic Dialing
                let replaced = self.state.send_if_modified(|state| {
                    if observer.has_changed().unwrap_or(true) || *state != current {
                        false
                    } else {
                        *state = dialing.clone();
                        true
                    }
                });
                if replaced {
                    info!(from = %current, to = %dialing, "call state changed");
                    self.events.emit(DialerEvent::CallStateChanged {
                        previous: current,
                        current: dialing,
                        timestamp: Utc::now(),
                    });
                } else {
                    debug!(state = %self.state(), "platform reported the call before dial returned");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "platform rejected dial request");
                self.transition(CallState::Error { message: e.to_string() });
                Err(DialerError::call_setup_failed(e.to_string()))
            }
        }
    }

    /// Dial the last dialed number again
    pub async fn redial(&self) -> DialerResult<()> {
        let number = self
            .last_dialed
            .get()
            .await
            .ok_or_else(|| DialerError::invalid_number(""))?;
        self.start_call(&number, None).await
    }

    pub async fn last_dialed(&self) -> Option<String> {
        self.last_dialed.get().await
    }

    /// Answer the incoming call. The state follows the platform's report.
    pub async fn accept_call(&self) {
        if !matches!(self.state(), CallState::Incoming { .. }) {
            debug!(state = %self.state(), "accept ignored, no incoming call");
            return;
        }
        self.run_command("answer", |call| async move { call.answer().await }).await;
    }

    pub async fn decline_call(&self) {
        self.disconnect("decline").await;
    }

    pub async fn end_call(&self) {
        self.disconnect("end").await;
    }

    async fn disconnect(&self, reason: &'static str) {
        if self.state().is_terminal() {
            debug!(reason, state = %self.state(), "disconnect ignored, no live call");
            return;
        }
        self.run_command("disconnect", |call| async move { call.disconnect().await }).await;
    }

    /// Mute or unmute the microphone. Never fails; see [`AudioRoute`].
    pub fn toggle_mute(&self, muted: bool) -> AudioPath {
        let path = self.audio.set_muted(muted);
        self.muted.store(muted, Ordering::SeqCst);
        self.events.emit(DialerEvent::MicrophoneStateChanged { muted, path });
        path
    }

    /// Route call audio to the speaker or the earpiece. Never fails.
    pub fn toggle_speaker(&self, on: bool) -> AudioPath {
        let path = self.audio.set_speaker(on);
        self.speaker_on.store(on, Ordering::SeqCst);
        self.events.emit(DialerEvent::SpeakerStateChanged { on, path });
        path
    }

    /// Put the call on hold or resume it.
    ///
    /// Ignored when the call lacks the hold capability, or is already in
    /// the requested hold state (as reported by the platform or as
    /// requested earlier and not yet confirmed).
    pub async fn toggle_hold(&self, hold: bool) {
        let call = match self.bound_call() {
            Ok(call) => call,
            Err(e) => {
                debug!(error = %e, "hold ignored");
                return;
            }
        };
        if !self.state().is_in_call() {
            debug!(state = %self.state(), "hold ignored outside a connected call");
            return;
        }
        if !call.details().capabilities.can_hold() {
            warn!(handle = %call.handle(), "call does not support hold");
            return;
        }

        {
            let mut requested = lock(&self.requested_hold);
            let held = requested.unwrap_or(call.state() == PlatformCallState::Holding);
            if held == hold {
                debug!(hold, "hold state already as requested");
                return;
            }
            *requested = Some(hold);
        }

        let result = if hold { call.hold().await } else { call.unhold().await };
        match result {
            Ok(()) => self.events.emit(DialerEvent::HoldRequested { on_hold: hold }),
            Err(e) => {
                let err = DialerError::platform_command_failed(if hold { "hold" } else { "unhold" }, e.to_string());
                warn!(error = %err, "hold command failed");
                *lock(&self.requested_hold) = None;
            }
        }
    }

    /// Route audio through `surface` while it lives
    pub fn attach_in_call_surface(&self, surface: &Arc<dyn InCallAudio>) {
        self.audio.attach_in_call_surface(surface);
    }

    pub fn detach_in_call_surface(&self, surface: &Arc<dyn InCallAudio>) {
        self.audio.detach_in_call_surface(surface);
    }

    async fn run_command<F, Fut>(&self, command: &'static str, f: F)
    where
        F: FnOnce(Arc<dyn PlatformCall>) -> Fut,
        Fut: std::future::Future<Output = Result<(), PlatformError>>,
    {
        let call = match self.bound_call() {
            Ok(call) => call,
            Err(e) => {
                debug!(command, error = %e, "command ignored");
                return;
            }
        };
        let handle = call.handle();
        if let Err(e) = f(call).await {
            let err = DialerError::platform_command_failed(command, e.to_string());
            warn!(handle = %handle, error = %err, "platform command failed");
        }
    }
}
