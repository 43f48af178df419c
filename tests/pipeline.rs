//! End-to-end turn pipeline tests with stubbed collaborators.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use suara_backend::agent::{ChatCompletion, ResponseGenerator};
use suara_backend::asr::Transcriber;
use suara_backend::error::Stage;
use suara_backend::history::{ConversationTurn, HistoryStore, Role};
use suara_backend::orchestrator::TurnOrchestrator;
use suara_backend::tts::SpeechSynthesizer;

struct StubTranscriber {
    text: String,
    calls: AtomicUsize,
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, audio_path: &Path, _format_hint: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(audio_path.exists());
        Ok(self.text.clone())
    }
}

struct StubLlm {
    reply: String,
}

#[async_trait]
impl ChatCompletion for StubLlm {
    async fn complete(&self, _turns: &[ConversationTurn]) -> anyhow::Result<String> {
        Ok(self.reply.clone())
    }
}

struct StubSynthesizer {
    out_dir: PathBuf,
    calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    async fn synthesize(&self, _text: &str) -> anyhow::Result<PathBuf> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let path = self.out_dir.join(format!("reply_{}.wav", n));
        fs::write(&path, b"RIFF")?;
        Ok(path)
    }
}

struct FailingSynthesizer;

#[async_trait]
impl SpeechSynthesizer for FailingSynthesizer {
    async fn synthesize(&self, _text: &str) -> anyhow::Result<PathBuf> {
        Err(anyhow::anyhow!("synthesis engine offline"))
    }
}

struct Fixture {
    dir: TempDir,
    orchestrator: TurnOrchestrator,
    transcriber: Arc<StubTranscriber>,
    synthesizer: Arc<StubSynthesizer>,
}

fn fixture(transcript: &str, reply: &str) -> Fixture {
    let dir = tempdir().unwrap();
    let transcriber = Arc::new(StubTranscriber {
        text: transcript.to_string(),
        calls: AtomicUsize::new(0),
    });
    let synthesizer = Arc::new(StubSynthesizer {
        out_dir: dir.path().to_path_buf(),
        calls: AtomicUsize::new(0),
    });
    let responder = ResponseGenerator::new(
        Arc::new(StubLlm {
            reply: reply.to_string(),
        }),
        HistoryStore::new(dir.path().join("history")),
        "instruksi sistem".to_string(),
    );
    let orchestrator = TurnOrchestrator::new(
        transcriber.clone(),
        responder,
        synthesizer.clone(),
        dir.path().join("cache"),
        "wav",
    );
    Fixture {
        dir,
        orchestrator,
        transcriber,
        synthesizer,
    }
}

fn persisted(fixture: &Fixture, session_id: &str) -> Vec<ConversationTurn> {
    HistoryStore::new(fixture.dir.path().join("history")).load(session_id)
}

fn cache_is_empty(fixture: &Fixture) -> bool {
    match fs::read_dir(fixture.dir.path().join("cache")) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

#[tokio::test]
async fn end_to_end_turn_returns_audio_and_persists_history() {
    let f = fixture("Halo", "Hai, ada yang bisa saya bantu?");

    let outcome = f.orchestrator.handle("s1", b"B1", "voice.wav").await;
    let reply = outcome.result.expect("turn should succeed");

    assert!(reply.audio_path.exists());
    assert_eq!(reply.transcript, "Halo");
    assert_eq!(reply.reply_text, "Hai, ada yang bisa saya bantu?");
    assert!(!outcome.context.request_id.is_empty());

    let history = persisted(&f, "s1");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].role, Role::System);
    assert_eq!(history[1], ConversationTurn::new(Role::User, "Halo"));
    assert_eq!(
        history[2],
        ConversationTurn::new(Role::Assistant, "Hai, ada yang bisa saya bantu?")
    );
    assert!(cache_is_empty(&f));
}

#[tokio::test]
async fn history_grows_by_two_entries_per_turn() {
    let f = fixture("Halo", "Baik.");
    let turns = 3;

    for _ in 0..turns {
        let outcome = f.orchestrator.handle("s1", b"audio", "voice.wav").await;
        assert!(outcome.result.is_ok());
    }

    let history = persisted(&f, "s1");
    assert_eq!(history.len(), 2 * turns + 1);
    assert_eq!(history.iter().filter(|t| t.role == Role::System).count(), 1);
    assert_eq!(history[0].role, Role::System);

    // User and assistant entries strictly alternate after the bootstrap.
    for pair in history[1..].chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}

#[tokio::test]
async fn synthesis_failure_still_persists_the_turn() {
    // The documented non-transactional divergence: generation succeeded, so
    // history is already durable even though the caller gets no audio.
    let dir = tempdir().unwrap();
    let responder = ResponseGenerator::new(
        Arc::new(StubLlm {
            reply: "Baik.".to_string(),
        }),
        HistoryStore::new(dir.path().join("history")),
        "instruksi sistem".to_string(),
    );
    let orchestrator = TurnOrchestrator::new(
        Arc::new(StubTranscriber {
            text: "Halo".to_string(),
            calls: AtomicUsize::new(0),
        }),
        responder,
        Arc::new(FailingSynthesizer),
        dir.path().join("cache"),
        "wav",
    );

    let outcome = orchestrator.handle("s1", b"audio", "voice.wav").await;
    assert_eq!(outcome.result.unwrap_err().stage(), Stage::SpeechSynthesis);

    let history = HistoryStore::new(dir.path().join("history")).load("s1");
    assert_eq!(history.len(), 3);
    assert_eq!(history[1], ConversationTurn::new(Role::User, "Halo"));
    assert_eq!(history[2], ConversationTurn::new(Role::Assistant, "Baik."));
}

#[tokio::test]
async fn persistence_failure_still_returns_audio() {
    // Best-effort durability: a history dir occupied by a plain file makes
    // every save fail, but the caller still gets the synthesized reply.
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("history"), "occupied").unwrap();

    let responder = ResponseGenerator::new(
        Arc::new(StubLlm {
            reply: "Baik.".to_string(),
        }),
        HistoryStore::new(dir.path().join("history")),
        "instruksi sistem".to_string(),
    );
    let orchestrator = TurnOrchestrator::new(
        Arc::new(StubTranscriber {
            text: "Halo".to_string(),
            calls: AtomicUsize::new(0),
        }),
        responder,
        Arc::new(StubSynthesizer {
            out_dir: dir.path().to_path_buf(),
            calls: AtomicUsize::new(0),
        }),
        dir.path().join("cache"),
        "wav",
    );

    let outcome = orchestrator.handle("s1", b"audio", "voice.wav").await;
    let reply = outcome
        .result
        .expect("turn must succeed despite persistence failure");
    assert!(reply.audio_path.exists());
    assert!(HistoryStore::new(dir.path().join("history")).load("s1").is_empty());

    // The in-memory session carries on for the process's life.
    assert!(orchestrator.handle("s1", b"audio", "voice.wav").await.result.is_ok());
}

#[tokio::test]
async fn validation_failures_invoke_no_collaborators() {
    let f = fixture("Halo", "Baik.");

    let outcome = f.orchestrator.handle("s1", b"", "voice.wav").await;
    assert_eq!(outcome.result.unwrap_err().stage(), Stage::Validation);

    let outcome = f.orchestrator.handle("s1", b"audio", "voice.mp3").await;
    assert_eq!(outcome.result.unwrap_err().stage(), Stage::Validation);

    assert_eq!(f.transcriber.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.synthesizer.calls.load(Ordering::SeqCst), 0);
    assert!(persisted(&f, "s1").is_empty());
    assert!(cache_is_empty(&f));
}

#[tokio::test]
async fn sessions_keep_disjoint_histories() {
    let f = fixture("Halo", "Baik.");

    assert!(f.orchestrator.handle("alice", b"a", "a.wav").await.result.is_ok());
    assert!(f.orchestrator.handle("bob", b"b", "b.wav").await.result.is_ok());
    assert!(f.orchestrator.handle("alice", b"a", "a.wav").await.result.is_ok());

    assert_eq!(persisted(&f, "alice").len(), 5);
    assert_eq!(persisted(&f, "bob").len(), 3);
}

#[tokio::test]
async fn request_ids_are_unique_per_turn() {
    let f = fixture("Halo", "Baik.");

    let first = f.orchestrator.handle("s1", b"audio", "voice.wav").await;
    let second = f.orchestrator.handle("s1", b"audio", "voice.wav").await;

    assert_ne!(first.context.request_id, second.context.request_id);
}
