// Test screen behaviour: loading flag, duplicate triggers, alerts, rendering
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ping_libsignal::module::{
    LibSignalKeyPair, NativeModule, PingLibsignal, PreKeyBundle, SignedPreKey,
};
use ping_libsignal::screen::TestScreen;
use ping_libsignal::{LibsignalError, Result};
use tokio::sync::Semaphore;

/// Module whose identity generation blocks until the test releases it.
struct GatedModule {
    release: Semaphore,
    fail: bool,
    calls: AtomicUsize,
}

impl GatedModule {
    fn new(fail: bool) -> Self {
        Self {
            release: Semaphore::new(0),
            fail,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NativeModule for GatedModule {
    fn pi(&self) -> f64 {
        3.0
    }

    fn hello(&self) -> String {
        "hi".to_string()
    }

    async fn set_value_async(&self, _value: String) -> Result<()> {
        Ok(())
    }

    async fn test_lib_signal(&self) -> Result<LibSignalKeyPair> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release
            .acquire()
            .await
            .expect("semaphore closed")
            .forget();
        if self.fail {
            return Err(LibsignalError::InvalidKey("boom"));
        }
        Ok(LibSignalKeyPair {
            public: "cHVi".to_string(),
            private: "cHJpdg==".to_string(),
        })
    }

    async fn generate_pre_keys(&self, _count: u32) -> Result<PreKeyBundle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LibsignalError::NotImplemented("generatePreKeys"))
    }

    async fn generate_signed_pre_key(&self, _identity_private_key: &str) -> Result<SignedPreKey> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LibsignalError::NotImplemented("generateSignedPreKey"))
    }

    async fn generate_registration_id(&self) -> Result<u32> {
        Ok(1)
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached");
}

#[tokio::test]
async fn test_loading_flag_spans_the_call() {
    let module = Arc::new(GatedModule::new(false));
    let screen = TestScreen::new(Arc::clone(&module));
    assert!(!screen.is_loading());

    let task = tokio::spawn({
        let screen = screen.clone();
        async move { screen.test_lib_signal().await }
    });

    wait_until(|| screen.is_loading()).await;
    wait_until(|| module.calls() == 1).await;
    assert!(screen.is_loading());
    assert!(screen.render().contains("Loading..."));

    module.release.add_permits(1);
    assert!(task.await.unwrap());

    let state = screen.state();
    assert!(!state.is_loading);
    assert_eq!(
        state.lib_signal_result.map(|kp| kp.public),
        Some("cHVi".to_string())
    );
    assert!(state.alerts.is_empty());
}

#[tokio::test]
async fn test_loading_flag_clears_on_failure() {
    let module = Arc::new(GatedModule::new(true));
    module.release.add_permits(1);
    let screen = TestScreen::new(Arc::clone(&module));

    assert!(screen.test_lib_signal().await);

    let state = screen.state();
    assert!(!state.is_loading);
    assert!(state.lib_signal_result.is_none());
    assert_eq!(state.alerts.len(), 1);
    assert_eq!(state.alerts[0].title, "LibSignal Error");
    assert_eq!(
        state.alerts[0].message,
        "Failed to test LibSignal: invalid key: boom"
    );
}

#[tokio::test]
async fn test_duplicate_triggers_are_ignored() {
    let module = Arc::new(GatedModule::new(false));
    let screen = TestScreen::new(Arc::clone(&module));

    let task = tokio::spawn({
        let screen = screen.clone();
        async move { screen.test_lib_signal().await }
    });
    wait_until(|| module.calls() == 1).await;

    assert!(!screen.test_lib_signal().await);
    assert!(!screen.generate_pre_keys(3).await);
    assert_eq!(module.calls(), 1);
    assert!(screen.is_loading());

    module.release.add_permits(1);
    assert!(task.await.unwrap());
    assert!(!screen.is_loading());

    // Once settled, the next trigger goes through
    assert!(screen.generate_pre_keys(3).await);
    assert_eq!(module.calls(), 2);
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn test_full_flow_renders_cards() {
    let screen = TestScreen::new(Arc::new(PingLibsignal::default()));
    screen.initialize();

    assert!(screen.test_lib_signal().await);
    assert!(screen.generate_pre_keys(3).await);
    assert!(screen.generate_signed_pre_key().await);

    let state = screen.state();
    assert!(state.alerts.is_empty());
    assert_eq!(state.pre_keys_result.map(|b| b.pre_keys.len()), Some(3));
    assert!(state.signed_pre_key_result.is_some());

    let rendered = screen.render();
    assert!(rendered.contains("[Module Status]\nModule loaded successfully!"));
    assert!(rendered.contains(&format!("[PI Constant]\n{}", std::f64::consts::PI)));
    assert!(rendered.contains("[Hello Function]\nHello world! 👋"));
    assert!(rendered.contains("[LibSignal Result]\nPublic Key:"));
    assert!(rendered.contains("[Pre-Keys (3)]\n#1 "));
    assert!(rendered.contains("[Signed Pre-Key]"));
    assert!(!rendered.contains("Loading..."));
}

#[tokio::test]
async fn test_new_run_clears_previous_result() {
    let module = Arc::new(GatedModule::new(false));
    let screen = TestScreen::new(Arc::clone(&module));

    module.release.add_permits(1);
    assert!(screen.test_lib_signal().await);
    assert!(screen.state().lib_signal_result.is_some());

    let task = tokio::spawn({
        let screen = screen.clone();
        async move { screen.test_lib_signal().await }
    });
    wait_until(|| module.calls() == 2).await;
    assert!(screen.state().lib_signal_result.is_none());

    module.release.add_permits(1);
    assert!(task.await.unwrap());
    assert!(screen.state().lib_signal_result.is_some());
}

#[tokio::test]
async fn test_signed_pre_key_trigger_ignored_while_identity_in_flight() {
    let module = Arc::new(GatedModule::new(false));
    let screen = TestScreen::new(Arc::clone(&module));

    let task = tokio::spawn({
        let screen = screen.clone();
        async move { screen.test_lib_signal().await }
    });
    wait_until(|| module.calls() == 1).await;

    // No identity yet, but the in-flight gate must win over the missing-identity alert
    assert!(!screen.generate_signed_pre_key().await);
    assert!(screen.state().alerts.is_empty());
    assert!(screen.is_loading());
    assert_eq!(module.calls(), 1);

    module.release.add_permits(1);
    assert!(task.await.unwrap());
    assert!(screen.state().alerts.is_empty());
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn test_pre_keys_failure_raises_alert() {
    let module = Arc::new(GatedModule::new(false));
    let screen = TestScreen::new(Arc::clone(&module));

    assert!(screen.generate_pre_keys(3).await);

    let state = screen.state();
    assert!(!state.is_loading);
    assert!(state.pre_keys_result.is_none());
    assert_eq!(state.alerts.len(), 1);
    assert_eq!(state.alerts[0].title, "Pre-Key Error");
    assert_eq!(
        state.alerts[0].message,
        "Failed to generate pre-keys: generatePreKeys is not implemented"
    );
}

#[tokio::test]
async fn test_signed_pre_key_failure_raises_alert() {
    let module = Arc::new(GatedModule::new(false));
    module.release.add_permits(1);
    let screen = TestScreen::new(Arc::clone(&module));

    assert!(screen.test_lib_signal().await);
    assert!(screen.generate_signed_pre_key().await);
    assert_eq!(module.calls(), 2);

    let state = screen.state();
    assert!(!state.is_loading);
    assert!(state.signed_pre_key_result.is_none());
    assert_eq!(state.alerts.len(), 1);
    assert_eq!(state.alerts[0].title, "Signed Pre-Key Error");
    assert_eq!(
        state.alerts[0].message,
        "Failed to generate signed pre-key: generateSignedPreKey is not implemented"
    );
}
