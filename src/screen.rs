//! Headless test screen driving a [`NativeModule`].
//!
//! Display state lives behind a mutex shared by clones of the screen, so a
//! caller can trigger an operation on one task and watch the loading flag
//! from another. The lock is never held across an await.

use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::module::{LibSignalKeyPair, NativeModule, PreKeyBundle, SignedPreKey};

pub const TITLE: &str = "pingLibSignal Test Screen";

/// User-facing alert raised when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Everything the screen displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenState {
    pub module_status: String,
    pub pi_value: Option<f64>,
    pub hello_result: String,
    pub lib_signal_result: Option<LibSignalKeyPair>,
    pub pre_keys_result: Option<PreKeyBundle>,
    pub signed_pre_key_result: Option<SignedPreKey>,
    pub is_loading: bool,
    pub alerts: Vec<Alert>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            module_status: "Loading...".to_string(),
            pi_value: None,
            hello_result: String::new(),
            lib_signal_result: None,
            pre_keys_result: None,
            signed_pre_key_result: None,
            is_loading: false,
            alerts: Vec::new(),
        }
    }
}

pub struct TestScreen<M: NativeModule + ?Sized> {
    module: Arc<M>,
    state: Arc<Mutex<ScreenState>>,
}

impl<M: NativeModule + ?Sized> Clone for TestScreen<M> {
    fn clone(&self) -> Self {
        Self {
            module: Arc::clone(&self.module),
            state: Arc::clone(&self.state),
        }
    }
}

impl<M: NativeModule + ?Sized> TestScreen<M> {
    pub fn new(module: Arc<M>) -> Self {
        Self {
            module,
            state: Arc::new(Mutex::new(ScreenState::default())),
        }
    }

    /// Snapshot of the current display state.
    pub fn state(&self) -> ScreenState {
        self.state.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    /// Mount: reads `hello` and `PI` from the module.
    pub fn initialize(&self) {
        let hello = self.module.hello();
        let pi = self.module.pi();

        let mut state = self.state.lock();
        state.hello_result = hello;
        state.pi_value = Some(pi);
        state.module_status = "Module loaded successfully!".to_string();
        info!(module = self.module.name(), "module loaded");
    }

    /// Returns `false` without calling the module if another operation is
    /// in flight.
    pub async fn test_lib_signal(&self) -> bool {
        if !self.begin(|state| state.lib_signal_result = None) {
            return false;
        }
        let result = self.module.test_lib_signal().await;
        self.finish(result, "LibSignal Error", "Failed to test LibSignal", |state, key_pair| {
            state.lib_signal_result = Some(key_pair)
        });
        true
    }

    pub async fn generate_pre_keys(&self, count: u32) -> bool {
        if !self.begin(|state| state.pre_keys_result = None) {
            return false;
        }
        let result = self.module.generate_pre_keys(count).await;
        self.finish(result, "Pre-Key Error", "Failed to generate pre-keys", |state, bundle| {
            state.pre_keys_result = Some(bundle)
        });
        true
    }

    /// Signs a new pre-key with the identity key from the last
    /// [`TestScreen::test_lib_signal`] run.
    pub async fn generate_signed_pre_key(&self) -> bool {
        let mut identity_private = None;
        if !self.begin(|state| {
            state.signed_pre_key_result = None;
            identity_private = state
                .lib_signal_result
                .as_ref()
                .map(|key_pair| key_pair.private.clone());
        }) {
            return false;
        }
        let Some(identity_private) = identity_private else {
            self.abort(
                "Signed Pre-Key Error",
                "Generate an identity key pair first".to_string(),
            );
            return false;
        };

        let result = self.module.generate_signed_pre_key(&identity_private).await;
        self.finish(
            result,
            "Signed Pre-Key Error",
            "Failed to generate signed pre-key",
            |state, signed| state.signed_pre_key_result = Some(signed),
        );
        true
    }

    fn begin(&self, clear: impl FnOnce(&mut ScreenState)) -> bool {
        let mut state = self.state.lock();
        if state.is_loading {
            debug!("operation already in flight, ignoring trigger");
            return false;
        }
        state.is_loading = true;
        clear(&mut state);
        true
    }

    fn finish<T>(
        &self,
        result: Result<T>,
        title: &str,
        context: &str,
        store: impl FnOnce(&mut ScreenState, T),
    ) {
        let mut state = self.state.lock();
        match result {
            Ok(value) => store(&mut state, value),
            Err(err) => state.alerts.push(Alert {
                title: title.to_string(),
                message: format!("{}: {}", context, err),
            }),
        }
        state.is_loading = false;
    }

    /// Ends a started operation without calling the module.
    fn abort(&self, title: &str, message: String) {
        let mut state = self.state.lock();
        state.alerts.push(Alert {
            title: title.to_string(),
            message,
        });
        state.is_loading = false;
    }

    /// Renders the screen as plain text result cards.
    pub fn render(&self) -> String {
        let state = self.state();
        let mut out = String::new();
        let _ = writeln!(out, "{}", TITLE);

        card(&mut out, "Module Status", &state.module_status);
        let pi = state
            .pi_value
            .map(|pi| pi.to_string())
            .unwrap_or_else(|| "Not available".to_string());
        card(&mut out, "PI Constant", &pi);
        let hello = if state.hello_result.is_empty() {
            "Not tested"
        } else {
            state.hello_result.as_str()
        };
        card(&mut out, "Hello Function", hello);

        if let Some(key_pair) = &state.lib_signal_result {
            card(
                &mut out,
                "LibSignal Result",
                &format!(
                    "Public Key:\n{}\nPrivate Key:\n{}",
                    key_pair.public, key_pair.private
                ),
            );
        }

        if let Some(bundle) = &state.pre_keys_result {
            let mut body = String::new();
            for (i, pre_key) in bundle.pre_keys.iter().enumerate() {
                let _ = writeln!(body, "#{} {}", i + 1, pre_key);
            }
            card(
                &mut out,
                &format!("Pre-Keys ({})", bundle.pre_keys.len()),
                body.trim_end(),
            );
        }

        if let Some(signed) = &state.signed_pre_key_result {
            card(&mut out, "Signed Pre-Key", &signed.signed_pre_key);
        }

        for alert in &state.alerts {
            card(&mut out, &alert.title, &alert.message);
        }

        if state.is_loading {
            let _ = writeln!(out, "\nLoading...");
        }

        out
    }
}

fn card(out: &mut String, title: &str, content: &str) {
    let _ = write!(out, "\n[{}]\n{}\n", title, content);
}
