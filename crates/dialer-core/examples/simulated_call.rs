//! Simulated Call Example
//!
//! Drives a `DialerManager` through one outgoing call against an in-process
//! platform: dial, connect, speaker, hold, hang up, and the call-history sync
//! that follows.
//!
//! Run with: cargo run --example simulated_call

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dialer_core::{
    AudioDevice, AudioMode, AudioResult, CallCapabilities, CallDetails, CallHandle, CallLogProvider, CallPlacer,
    CallType, ContactEntry, ContactProvider, DialerBuilder, DialerConfig, DialerEvent, HistoryResult,
    PlatformCall, PlatformCallState, PlatformError, RawCallRecord,
};
use futures::StreamExt;

/// A call the "platform" has placed
struct SimulatedCall {
    handle: CallHandle,
    number: String,
    state: Mutex<PlatformCallState>,
}

impl SimulatedCall {
    fn new(number: &str) -> Arc<Self> {
        Arc::new(Self {
            handle: CallHandle::new_v4(),
            number: number.to_string(),
            state: Mutex::new(PlatformCallState::Dialing),
        })
    }

    fn set_state(&self, state: PlatformCallState) {
        *self.state.lock().unwrap() = state;
    }
}

#[async_trait]
impl PlatformCall for SimulatedCall {
    fn handle(&self) -> CallHandle {
        self.handle
    }

    fn details(&self) -> CallDetails {
        CallDetails::new(self.number.clone()).with_capabilities(CallCapabilities::from_bits(
            CallCapabilities::HOLD | CallCapabilities::SUPPORT_HOLD,
        ))
    }

    fn state(&self) -> PlatformCallState {
        *self.state.lock().unwrap()
    }

    async fn answer(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), PlatformError> {
        println!("  📴 platform: disconnect requested");
        Ok(())
    }

    async fn hold(&self) -> Result<(), PlatformError> {
        println!("  ⏸️  platform: hold requested");
        Ok(())
    }

    async fn unhold(&self) -> Result<(), PlatformError> {
        println!("  ▶️  platform: unhold requested");
        Ok(())
    }
}

struct SimulatedPlacer;

#[async_trait]
impl CallPlacer for SimulatedPlacer {
    async fn place_call(&self, number: &str) -> Result<(), PlatformError> {
        println!("  📞 platform: placing call to {number}");
        Ok(())
    }
}

/// Prints every request it gets
#[derive(Default)]
struct ConsoleAudio {
    mode: Mutex<Option<AudioMode>>,
    speaker: AtomicBool,
    muted: AtomicBool,
}

impl AudioDevice for ConsoleAudio {
    fn set_microphone_mute(&self, muted: bool) -> AudioResult<()> {
        println!("  🎤 audio: microphone mute = {muted}");
        self.muted.store(muted, Ordering::SeqCst);
        Ok(())
    }

    fn is_microphone_mute(&self) -> AudioResult<bool> {
        Ok(self.muted.load(Ordering::SeqCst))
    }

    fn set_speakerphone_on(&self, on: bool) -> AudioResult<()> {
        println!("  🔊 audio: speakerphone = {on}");
        self.speaker.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn is_speakerphone_on(&self) -> AudioResult<bool> {
        Ok(self.speaker.load(Ordering::SeqCst))
    }

    fn set_mode(&self, mode: AudioMode) -> AudioResult<()> {
        println!("  🎚️  audio: mode = {mode:?}");
        *self.mode.lock().unwrap() = Some(mode);
        Ok(())
    }

    fn mode(&self) -> AudioResult<AudioMode> {
        Ok(self.mode.lock().unwrap().unwrap_or(AudioMode::Normal))
    }
}

#[derive(Default)]
struct InMemoryCallLog(Mutex<Vec<RawCallRecord>>);

#[async_trait]
impl CallLogProvider for InMemoryCallLog {
    async fn fetch_recent(&self, window: Option<usize>) -> HistoryResult<Vec<RawCallRecord>> {
        let records = self.0.lock().unwrap();
        Ok(records.iter().take(window.unwrap_or(usize::MAX)).cloned().collect())
    }
}

struct AddressBook;

#[async_trait]
impl ContactProvider for AddressBook {
    async fn fetch_contacts(&self) -> HistoryResult<Vec<ContactEntry>> {
        Ok(vec![ContactEntry::new("+1 555-1234", Some("Alex".to_string()), None)])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("📱 Simulated Call Example");
    println!("=========================\n");

    let call_log = Arc::new(InMemoryCallLog::default());
    let dialer = DialerBuilder::new()
        .call_placer(Arc::new(SimulatedPlacer))
        .audio_device(Arc::new(ConsoleAudio::default()))
        .call_log_provider(call_log.clone())
        .contact_provider(Arc::new(AddressBook))
        .config(DialerConfig::default().with_sync_on_start(false))
        .build()
        .await?;

    let mut events = dialer.subscribe_events();
    let printer = tokio::spawn(async move {
        while let Some(Ok(event)) = events.next().await {
            match event {
                DialerEvent::CallStateChanged { previous, current, .. } => {
                    println!("➡️  {previous} → {current}");
                }
                DialerEvent::HistorySynced { report } => {
                    println!("📚 history synced: {} numbers", report.merged);
                    break;
                }
                DialerEvent::HistorySyncFailed { reason } => {
                    println!("❌ history sync failed: {reason}");
                    break;
                }
                _ => {}
            }
        }
    });

    dialer.start();
    let session = dialer.session();

    session.start_call("+1 555-1234", Some("Alex")).await?;
    let call = SimulatedCall::new("+1 555-1234");
    session.register_call(call.clone());

    for state in [PlatformCallState::Connecting, PlatformCallState::Active] {
        tokio::time::sleep(Duration::from_millis(300)).await;
        call.set_state(state);
        session.on_call_state_changed(call.handle(), state);
    }

    tokio::time::sleep(Duration::from_millis(2100)).await;
    println!("⏱️  connected for {}s", session.call_duration_secs());

    session.toggle_speaker(true);
    session.toggle_hold(true).await;
    call.set_state(PlatformCallState::Holding);
    session.on_call_state_changed(call.handle(), PlatformCallState::Holding);
    session.toggle_hold(false).await;
    call.set_state(PlatformCallState::Active);
    session.on_call_state_changed(call.handle(), PlatformCallState::Active);

    session.end_call().await;
    call_log
        .0
        .lock()
        .unwrap()
        .insert(0, RawCallRecord::new("+1 555-1234", CallType::Outgoing, chrono::Utc::now().timestamp_millis()));
    call.set_state(PlatformCallState::Disconnected);
    session.on_call_state_changed(call.handle(), PlatformCallState::Disconnected);
    session.unregister_call(call.handle());

    printer.await?;

    println!("\n📋 Recent calls:");
    for record in dialer.recent_calls().await? {
        println!(
            "  {} {} ({}) {}s",
            record.call_type.label(),
            record.display_name.as_deref().unwrap_or("Unknown"),
            record.number,
            record.duration_secs
        );
    }

    dialer.stop();
    Ok(())
}
